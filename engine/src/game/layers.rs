use crate::game::Game;
use common::ability::{Ability, StaticAbilityEffect};
use common::card_entities::{CardFace, PT};
use common::counters::{Counter, Counters};
use common::entities::{CardId, PlayerId, TargetId};
use common::spellabil::{Affected, ContEffect, Constraint, Layer};
use common::zones::Zone;
use log::debug;
use std::collections::HashMap;
use strum::IntoEnumIterator;

//The characteristics of an object after every continuous effect is applied
#[derive(Clone, Debug, PartialEq)]
pub struct Characteristics {
    pub face: CardFace,
    pub owner: PlayerId,
    pub controller: PlayerId,
    pub zone: Option<Zone>,
    pub tapped: bool,
    pub attacking: bool,
    pub counters: Counters,
    pub cant_attack: bool,
    pub cant_block: bool,
    pub timestamp: u64,
}

pub type View = HashMap<CardId, Characteristics>;

//A continuous effect waiting to be applied within one layer
#[derive(Clone, Debug, PartialEq)]
struct LayerEffect {
    source: CardId,
    controller: PlayerId,
    timestamp: u64,
    effect: ContEffect,
    affected: Affected,
    constraints: Vec<Constraint>,
    //Set for effects of static abilities, which exist only
    //while their source is on the battlefield with the ability
    from_static: Option<Ability>,
}

impl Game {
    pub fn characteristics(&self, id: CardId) -> Option<&Characteristics> {
        self.view.get(&id)
    }
    pub fn view(&self) -> &View {
        &self.view
    }
    pub fn refresh_view(&mut self) {
        self.view = self.compute_layers();
    }

    fn base_view(&self) -> View {
        let attacking: Vec<CardId> = self
            .combat
            .as_ref()
            .map(|combat| combat.attackers())
            .unwrap_or_default();
        self.cards_and_zones()
            .into_iter()
            .filter_map(|(id, zone)| {
                let card = self.cards.get(id)?;
                Some((
                    id,
                    Characteristics {
                        face: card.printed.clone(),
                        owner: card.owner,
                        controller: card.get_controller(),
                        zone: Some(zone),
                        tapped: card.tapped,
                        attacking: attacking.contains(&id),
                        counters: card.counters.clone(),
                        cant_attack: false,
                        cant_block: false,
                        timestamp: card.timestamp,
                    },
                ))
            })
            .collect()
    }

    //Applies every continuous effect, layer by layer.
    //Within a layer effects go in timestamp order unless one depends on another.
    pub fn compute_layers(&self) -> View {
        let mut view = self.base_view();
        for layer in Layer::iter() {
            if layer == Layer::Ability {
                add_land_abilities(&mut view);
            }
            let mut pending = self.layer_effects(&view, layer);
            pending.sort_by_key(|effect| effect.timestamp);
            while !pending.is_empty() {
                let next = self.next_effect(&view, &pending);
                let effect = pending.remove(next);
                if self.effect_exists(&view, &effect) {
                    self.apply_effect(&mut view, &effect);
                }
            }
            if layer == Layer::PTModifying {
                apply_counters(&mut view);
            }
        }
        view
    }

    fn layer_effects(&self, view: &View, layer: Layer) -> Vec<LayerEffect> {
        let mut effects: Vec<LayerEffect> = self
            .cont_effects
            .iter()
            .filter(|cont| cont.effect.layer() == layer)
            .map(|cont| LayerEffect {
                source: cont.source,
                controller: cont.controller,
                timestamp: cont.timestamp,
                effect: cont.effect.clone(),
                affected: cont.affected.clone(),
                constraints: cont.constraints.clone(),
                from_static: None,
            })
            .collect();
        for &id in &self.battlefield {
            let Some(card) = view.get(&id) else {
                continue;
            };
            for ability in &card.face.abilities {
                if let Ability::Static(stat) = ability {
                    if let StaticAbilityEffect::Continuous(cont) = &stat.effect {
                        if cont.effect.layer() == layer {
                            effects.push(LayerEffect {
                                source: id,
                                controller: card.controller,
                                timestamp: card.timestamp,
                                effect: cont.effect.clone(),
                                affected: cont.affected.clone(),
                                constraints: cont.constraints.clone(),
                                from_static: Some(ability.clone()),
                            });
                        }
                    }
                }
            }
        }
        effects
    }

    fn effect_exists(&self, view: &View, effect: &LayerEffect) -> bool {
        match &effect.from_static {
            None => true,
            Some(ability) => view
                .get(&effect.source)
                .map(|card| {
                    card.zone == Some(Zone::Battlefield) && card.face.abilities.contains(ability)
                })
                .unwrap_or(false),
        }
    }

    fn affected_objects(&self, view: &View, effect: &LayerEffect) -> Vec<CardId> {
        let candidates: Vec<CardId> = match &effect.affected {
            Affected::ManuallySet(targets) => {
                return targets
                    .iter()
                    .filter_map(|target| target.card())
                    .filter(|id| view.contains_key(id))
                    .collect();
            }
            Affected::Target(target) => {
                return target
                    .and_then(|target| target.card())
                    .filter(|id| view.contains_key(id))
                    .into_iter()
                    .collect();
            }
            Affected::Cardname => vec![effect.source],
            Affected::AttachedTo => self
                .cards
                .get(effect.source)
                .and_then(|card| card.attached_to)
                .into_iter()
                .collect(),
            Affected::All => self.battlefield.clone(),
            Affected::Controller | Affected::EachOpponent => Vec::new(),
        };
        candidates
            .into_iter()
            .filter(|&id| {
                view.get(&id)
                    .map(|card| card.zone == Some(Zone::Battlefield))
                    .unwrap_or(false)
                    && effect.constraints.iter().all(|constraint| {
                        self.passes_in(
                            view,
                            constraint,
                            effect.source,
                            Some(effect.controller),
                            TargetId::Card(id),
                        )
                    })
            })
            .collect()
    }

    //Does applying b first change whether a exists or what it applies to?
    fn depends_on(&self, view: &View, a: &LayerEffect, b: &LayerEffect) -> bool {
        if !self.effect_exists(view, b) {
            return false;
        }
        let exists_before = self.effect_exists(view, a);
        let affected_before = self.affected_objects(view, a);
        let mut simulated = view.clone();
        self.apply_effect(&mut simulated, b);
        exists_before != self.effect_exists(&simulated, a)
            || affected_before != self.affected_objects(&simulated, a)
    }

    //Picks the earliest effect that doesn't depend on another pending effect.
    //If every effect depends on another, they form a loop and go in timestamp order.
    fn next_effect(&self, view: &View, pending: &[LayerEffect]) -> usize {
        if pending.len() < 2 {
            return 0;
        }
        for (i, a) in pending.iter().enumerate() {
            let waits = pending
                .iter()
                .enumerate()
                .any(|(j, b)| i != j && self.depends_on(view, a, b));
            if !waits {
                return i;
            }
        }
        debug!("dependency loop between {} effects", pending.len());
        0
    }

    fn apply_effect(&self, view: &mut View, effect: &LayerEffect) {
        let affected = self.affected_objects(view, effect);
        let copied = match &effect.effect {
            ContEffect::CopyOf(original) => view.get(original).map(|card| card.face.clone()),
            _ => None,
        };
        for id in affected {
            let Some(card) = view.get_mut(&id) else {
                continue;
            };
            match &effect.effect {
                ContEffect::CopyOf(_) => {
                    if let Some(face) = &copied {
                        card.face = face.clone();
                    }
                }
                ContEffect::GainControl => card.controller = effect.controller,
                ContEffect::AddType(t) => {
                    card.face.types.insert(*t);
                }
                ContEffect::AddSubtype(t) => {
                    card.face.subtypes.insert(*t);
                }
                ContEffect::SetColors(colors) => {
                    card.face.colors = colors.iter().copied().collect();
                }
                ContEffect::ReplaceSubtype { from, to } => {
                    if card.face.subtypes.remove(from) {
                        card.face.subtypes.insert(*to);
                    }
                    for ability in &mut card.face.abilities {
                        ability.replace_subtype(*from, *to);
                    }
                    for clause in &mut card.face.effect {
                        clause.replace_subtype(*from, *to);
                    }
                }
                ContEffect::AddAbility(ability) => card.face.abilities.push((**ability).clone()),
                ContEffect::RemoveAbility(keyword) => card
                    .face
                    .abilities
                    .retain(|ability| ability.keyword() != Some(*keyword)),
                ContEffect::RemoveAllAbilities => card.face.abilities.clear(),
                ContEffect::SetPT(pt) => {
                    if card.face.pt.is_some() || card.face.types.is_creature() {
                        card.face.pt = Some(pt.clone());
                    }
                }
                ContEffect::ModifyPT(pt) => {
                    if let Some(current) = &mut card.face.pt {
                        current.power += pt.power;
                        current.toughness += pt.toughness;
                    }
                }
                ContEffect::CantAttackOrBlock => {
                    card.cant_attack = true;
                    card.cant_block = true;
                }
                ContEffect::CantBlock => card.cant_block = true,
            }
        }
    }
}

//Basic land types grant their mana ability
fn add_land_abilities(view: &mut View) {
    for card in view.values_mut() {
        let granted: Vec<Ability> = card
            .face
            .subtypes
            .iter()
            .filter_map(|subtype| Ability::for_land_type(*subtype))
            .collect();
        for ability in granted {
            if !card.face.abilities.contains(&ability) {
                card.face.abilities.push(ability);
            }
        }
    }
}

fn apply_counters(view: &mut View) {
    for card in view.values_mut() {
        let delta = card.counters.get(Counter::Plus1Plus1) - card.counters.get(Counter::Minus1Minus1);
        if delta != 0 {
            if let Some(pt) = &mut card.face.pt {
                *pt = PT {
                    power: pt.power + delta,
                    toughness: pt.toughness + delta,
                };
            }
        }
    }
}
