use crate::actions::{Action, CastingOption};
use crate::game::Game;
use common::ability::Ability;
use common::cardtypes::Type;
use common::cost::Cost;
use common::entities::{CardId, PlayerId};
use common::spellabil::{Clause, ClauseEffect, KeywordAbility};
use common::zones::Zone;

fn mana_from_clause(clause: &Clause) -> usize {
    match &clause.effect {
        ClauseEffect::AddMana(mana) => mana.len(),
        ClauseEffect::Compound(clauses) => clauses.iter().map(mana_from_clause).sum(),
        _ => 0,
    }
}

impl Game {
    //For now, only count mana from tap abilities.
    fn max_mana_produce(&self, ent: CardId) -> usize {
        let Some(view) = self.characteristics(ent) else {
            return 0;
        };
        if !self.can_tap(ent) {
            return 0;
        }
        view.face
            .abilities
            .iter()
            .filter_map(|ability| match ability {
                Ability::Activated(abil) if abil.costs.contains(&Cost::Selftap) => {
                    Some(abil.effect.iter().map(mana_from_clause).sum())
                }
                _ => None,
            })
            .max()
            .unwrap_or(0)
    }
    //Don't prompt players to cast spells they can't pay for.
    //Colors aren't considered for untapped sources, only the quantity.
    fn maybe_can_pay(&self, costs: &[Cost], player: PlayerId, source: CardId) -> bool {
        let Some(pl) = self.players.get(player) else {
            return false;
        };
        let mana = Cost::mana_symbols(costs);
        if !mana.is_empty() && !pl.mana_pool.can_pay(&mana) {
            let available: usize = self
                .players_permanents(player)
                .into_iter()
                .map(|perm| self.max_mana_produce(perm))
                .sum::<usize>()
                + pl.mana_pool.total() as usize;
            if available < mana.len() {
                return false;
            }
        }
        costs.iter().all(|cost| match *cost {
            Cost::Mana(_) => true,
            Cost::Selftap => self.can_tap(source),
            Cost::Loyalty(amount) => amount >= 0 || self.loyalty(source) >= -amount,
        })
    }

    //The actions the player could take if they held priority
    pub fn compute_actions(&self, player: PlayerId) -> Vec<Action> {
        let mut actions = Vec::new();
        let Some(pl) = self.players.get(player) else {
            return actions;
        };
        let mut hand: Vec<CardId> = pl.hand.iter().copied().collect();
        hand.sort();
        actions.extend(self.play_land_actions(player, &hand));
        actions.extend(self.cast_actions(player, &hand));
        actions.extend(self.ability_actions(player));
        actions
    }

    fn play_land_actions(&self, player: PlayerId, hand: &[CardId]) -> Vec<Action> {
        if !self.sorcery_speed(player) || self.lands_played_this_turn >= self.land_play_limit {
            return Vec::new();
        }
        hand.iter()
            .copied()
            .filter(|&card| self.is_type(card, Type::Land))
            .map(Action::PlayLand)
            .collect()
    }

    fn cast_actions(&self, player: PlayerId, hand: &[CardId]) -> Vec<Action> {
        let mut actions = Vec::new();
        for &card_id in hand {
            let Some(view) = self.characteristics(card_id) else {
                continue;
            };
            let face = &view.face;
            if face.types.is_land() || face.types.is_empty() {
                continue;
            }
            if face.types.is_instant()
                || face.has_keyword(KeywordAbility::Flash)
                || self.sorcery_speed(player)
            {
                actions.push(Action::Cast(CastingOption {
                    source_card: card_id,
                    zone: Zone::Hand,
                    costs: face.costs.clone(),
                    player,
                    possible_to_take: self.maybe_can_pay(&face.costs, player, card_id),
                }));
            }
        }
        actions
    }

    fn ability_actions(&self, player: PlayerId) -> Vec<Action> {
        let mut actions = Vec::new();
        for perm in self.players_permanents(player) {
            let Some(view) = self.characteristics(perm) else {
                continue;
            };
            let used_loyalty = self.cards.is(perm, |card| card.loyalty_activated);
            for (index, ability) in view.face.abilities.iter().enumerate() {
                let Ability::Activated(abil) = ability else {
                    continue;
                };
                if (abil.sorcery_speed || abil.is_loyalty()) && !self.sorcery_speed(player) {
                    continue;
                }
                if abil.is_loyalty() && used_loyalty {
                    continue;
                }
                if !self.maybe_can_pay(&abil.costs, player, perm) {
                    continue;
                }
                actions.push(Action::ActivateAbility {
                    source: perm,
                    index,
                });
            }
        }
        actions
    }
}
