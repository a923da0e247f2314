use crate::client_message::{Ask, AskSelectN};
use crate::errors::MTGError;
use crate::event::Event;
use crate::game::{Game, GameOutcome};
use crate::log::FeedEvent;
use common::ability::{Ability, StaticAbilityEffect};
use common::cardtypes::{Subtype, Supertype};
use common::counters::Counter;
use common::entities::{CardId, PlayerId, TargetId};
use common::spellabil::{Constraint, KeywordAbility};
use common::zones::Zone;
use log::{debug, info};
use schemars::JsonSchema;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, JsonSchema)]
pub enum LoseReason {
    ZeroLife,
    DrewFromEmptyLibrary,
    Poison,
}

//A correction the game makes without using the stack
#[derive(Clone, Debug, PartialEq, Eq, Serialize, JsonSchema)]
pub enum StateBasedAction {
    LethalDamage(CardId),
    ZeroToughness(CardId),
    PlayerLoses(PlayerId, LoseReason),
    IllegalAura(CardId),
    UnattachEquipment(CardId),
    //Legendary permanents sharing a controller and a name
    LegendRule(Vec<CardId>),
    //Planeswalkers sharing a controller and a planeswalker type
    PlaneswalkerUniqueness(Vec<CardId>),
    //Pairs of +1/+1 and -1/-1 counters to remove
    CounterAnnihilation(CardId, i64),
    TokenCeasesToExist(CardId),
    ZeroLoyalty(CardId),
}

impl Game {
    //Every state based action that applies right now.
    //Doesn't change the game.
    pub fn check_state_based_actions(&self) -> Vec<StateBasedAction> {
        let mut actions = Vec::new();
        for &player in &self.turn_order {
            let Some(pl) = self.players.get(player) else {
                continue;
            };
            if pl.lost {
                continue;
            }
            if pl.life <= 0 {
                actions.push(StateBasedAction::PlayerLoses(player, LoseReason::ZeroLife));
            } else if pl.drew_from_empty {
                actions.push(StateBasedAction::PlayerLoses(
                    player,
                    LoseReason::DrewFromEmptyLibrary,
                ));
            } else if pl.counters.get(Counter::Poison) >= self.config.poison_threshold {
                actions.push(StateBasedAction::PlayerLoses(player, LoseReason::Poison));
            }
        }
        let mut legends: HashMap<(PlayerId, String), Vec<CardId>> = HashMap::new();
        let mut walkers: HashMap<(PlayerId, Subtype), Vec<CardId>> = HashMap::new();
        for &perm in &self.battlefield {
            let (Some(view), Some(card)) = (self.characteristics(perm), self.cards.get(perm)) else {
                continue;
            };
            let face = &view.face;
            if let Some(pt) = &face.pt {
                if face.types.is_creature() {
                    if pt.toughness <= 0 {
                        actions.push(StateBasedAction::ZeroToughness(perm));
                    } else if !face.has_keyword(KeywordAbility::Indestructible)
                        && (card.damaged >= pt.toughness || (card.deathtouched && card.damaged > 0))
                    {
                        actions.push(StateBasedAction::LethalDamage(perm));
                    }
                }
            }
            if face.types.is_planeswalker() && view.counters.get(Counter::Loyalty) <= 0 {
                actions.push(StateBasedAction::ZeroLoyalty(perm));
            }
            if let Some(enchant) = enchant_constraints(&face.abilities) {
                let legal = card.attached_to.map_or(false, |host| {
                    self.battlefield.contains(&host)
                        && self.passes_constraints(enchant, perm, TargetId::Card(host))
                });
                if !legal {
                    actions.push(StateBasedAction::IllegalAura(perm));
                }
            } else if face.subtypes.contains(&Subtype::Equipment) {
                if let Some(host) = card.attached_to {
                    let legal = self.battlefield.contains(&host)
                        && self
                            .characteristics(host)
                            .map_or(false, |host| host.face.types.is_creature());
                    if !legal {
                        actions.push(StateBasedAction::UnattachEquipment(perm));
                    }
                }
            }
            let pairs = view
                .counters
                .get(Counter::Plus1Plus1)
                .min(view.counters.get(Counter::Minus1Minus1));
            if pairs > 0 {
                actions.push(StateBasedAction::CounterAnnihilation(perm, pairs));
            }
            if face.supertypes.contains(&Supertype::Legendary) {
                legends
                    .entry((view.controller, face.name.clone()))
                    .or_default()
                    .push(perm);
            }
            if face.types.is_planeswalker() {
                for &subtype in face.subtypes.iter() {
                    if subtype.is_planeswalker_type() {
                        walkers.entry((view.controller, subtype)).or_default().push(perm);
                    }
                }
            }
        }
        let mut legends: Vec<Vec<CardId>> =
            legends.into_values().filter(|group| group.len() > 1).collect();
        legends.sort();
        actions.extend(legends.into_iter().map(StateBasedAction::LegendRule));
        let mut walkers: Vec<Vec<CardId>> =
            walkers.into_values().filter(|group| group.len() > 1).collect();
        walkers.sort();
        actions.extend(walkers.into_iter().map(StateBasedAction::PlaneswalkerUniqueness));
        for (id, zone) in self.cards_and_zones() {
            if zone != Zone::Battlefield && self.cards.is(id, |card| card.is_token()) {
                actions.push(StateBasedAction::TokenCeasesToExist(id));
            }
        }
        actions
    }

    //Performs state based actions until none apply.
    //Each pass is one simultaneous batch of events.
    pub async fn state_based_actions(&mut self) -> Result<Vec<StateBasedAction>, MTGError> {
        let mut performed = Vec::new();
        let mut passes = 0;
        loop {
            let actions = self.check_state_based_actions();
            if actions.is_empty() {
                return Ok(performed);
            }
            passes += 1;
            if passes > self.config.sba_iteration_cap {
                return Err(MTGError::InvariantViolation(format!(
                    "state based actions still applied after {} passes",
                    self.config.sba_iteration_cap
                )));
            }
            debug!("state based actions: {:?}", actions);
            let mut to_graveyard = Vec::new();
            let mut destroy = Vec::new();
            let mut events = Vec::new();
            let mut losers = Vec::new();
            for action in &actions {
                self.feed.push(FeedEvent::StateBasedAction(action.clone()));
                match action {
                    StateBasedAction::PlayerLoses(player, reason) => {
                        losers.push(*player);
                        events.push(Event::Lose {
                            player: *player,
                            reason: *reason,
                        });
                    }
                    StateBasedAction::LethalDamage(perm) => destroy.push(*perm),
                    StateBasedAction::ZeroToughness(perm)
                    | StateBasedAction::ZeroLoyalty(perm)
                    | StateBasedAction::IllegalAura(perm) => to_graveyard.push(*perm),
                    StateBasedAction::UnattachEquipment(perm) => {
                        events.push(Event::Unattach { attachment: *perm })
                    }
                    StateBasedAction::CounterAnnihilation(perm, pairs) => {
                        for counter in [Counter::Plus1Plus1, Counter::Minus1Minus1] {
                            events.push(Event::RemoveCounter {
                                affected: TargetId::Card(*perm),
                                counter,
                                quantity: *pairs,
                            });
                        }
                    }
                    StateBasedAction::TokenCeasesToExist(token) => {
                        events.push(Event::CeaseToExist { ents: vec![*token] })
                    }
                    StateBasedAction::LegendRule(group)
                    | StateBasedAction::PlaneswalkerUniqueness(group) => {
                        let keep = self.choose_one_to_keep(group).await?;
                        to_graveyard.extend(group.iter().copied().filter(|&perm| perm != keep));
                    }
                }
            }
            if !destroy.is_empty() {
                events.push(Event::Destroy { perms: destroy });
            }
            if !to_graveyard.is_empty() {
                events.push(Event::MoveZones {
                    ents: to_graveyard,
                    origin: Some(Zone::Battlefield),
                    dest: Zone::Graveyard,
                });
            }
            self.handle_events(events);
            self.update_outcome(&losers);
            performed.extend(actions);
            if self.outcome != GameOutcome::Ongoing {
                return Ok(performed);
            }
        }
    }

    //The controller keeps one of the permanents, the rest go to the graveyard
    async fn choose_one_to_keep(&self, group: &[CardId]) -> Result<CardId, MTGError> {
        let controller = group
            .first()
            .and_then(|&perm| self.get_controller(perm))
            .unwrap_or(self.active_player);
        let ask = AskSelectN {
            ents: group.to_vec(),
            min: 1,
            max: 1,
        };
        let choice = self.ask_selection(controller, Ask::LegendRule(ask)).await?;
        choice
            .first()
            .map(|&i| group[i])
            .ok_or(MTGError::UnresponsiveClient(controller))
    }

    fn update_outcome(&mut self, new_losers: &[PlayerId]) {
        if new_losers.is_empty() {
            return;
        }
        let remaining: Vec<PlayerId> = self
            .turn_order
            .iter()
            .copied()
            .filter(|&player| self.is_playing(player))
            .collect();
        match remaining.as_slice() {
            [] => self.outcome = GameOutcome::Tie,
            [winner] => self.outcome = GameOutcome::Winner(*winner),
            _ => {
                for &player in new_losers {
                    self.remove_player_objects(player);
                }
            }
        }
        if self.outcome != GameOutcome::Ongoing {
            info!("game decided: {:?}", self.outcome);
        }
    }

    //A player who lost leaves the game along with everything they own or control
    fn remove_player_objects(&mut self, player: PlayerId) {
        let mut owned: Vec<CardId> = self
            .all_cards()
            .into_iter()
            .filter(|&id| self.cards.is(id, |card| card.owner == player))
            .collect();
        owned.extend(
            self.stack
                .iter()
                .filter(|&id| self.get_controller(id) == Some(player)),
        );
        owned.sort();
        owned.dedup();
        if let Some(combat) = &mut self.combat {
            for &id in &owned {
                combat.remove(id);
            }
        }
        self.cont_effects.retain(|effect| effect.controller != player);
        self.pending_triggers
            .retain(|pending| pending.controller != player);
        self.extra_turns.retain(|&x| x != player);
        info!("{} leaves the game with {} objects", player, owned.len());
        self.handle_event(Event::CeaseToExist { ents: owned });
    }

    //Everything that happens before a player receives priority:
    //state based actions, then triggered abilities go on the stack,
    //repeated until neither has anything to do
    pub async fn layers_state_actions(&mut self) -> Result<(), MTGError> {
        loop {
            self.sweep_dead_references();
            self.refresh_view();
            self.check_invariants()?;
            self.state_based_actions().await?;
            if self.outcome != GameOutcome::Ongoing || self.pending_triggers.is_empty() {
                return Ok(());
            }
            self.place_abilities().await?;
        }
    }
}

fn enchant_constraints(abilities: &[Ability]) -> Option<&Vec<Constraint>> {
    abilities.iter().find_map(|ability| match ability {
        Ability::Static(stat) => match &stat.effect {
            StaticAbilityEffect::Enchant(constraints) => Some(constraints),
            _ => None,
        },
        _ => None,
    })
}
