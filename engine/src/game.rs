use crate::config::GameConfig;
use crate::errors::MTGError;
use crate::log::{EventFeed, FeedEntry, FeedMark};
use crate::player::Player;
use common::card_entities::{CardEnt, CardFace};
use common::cardtypes::Type;
use common::counters::Counter;
use common::ent_maps::EntMap;
use common::entities::{CardId, PlayerId, TargetId};
use common::spellabil::{Affected, Continuous, KeywordAbility};
use common::steps::{Phase, Subphase};
use common::zones::Zone;
use derivative::Derivative;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use tokio::sync::broadcast;

use self::handle_event::combat::Combat;
use self::layers::View;
use self::stack::Stack;
use self::triggers::{PendingTrigger, TriggerRegistration};

pub mod build_game;
mod compute_actions;
mod event_generators;
pub mod handle_event;
pub mod layers;
pub mod priority;
mod resolve;
pub mod stack;
pub mod state_based;
pub mod targeting;
pub mod triggers;

pub type Players = EntMap<PlayerId, Player>;
pub type Cards = EntMap<CardId, CardEnt>;

#[derive(Clone, Derivative)]
#[derivative(Debug)]
pub struct Game {
    #[derivative(Debug = "ignore")]
    pub players: Players,
    #[derivative(Debug = "ignore")]
    pub cards: Cards,
    pub battlefield: Vec<CardId>,
    pub exile: Vec<CardId>,
    pub command: Vec<CardId>,
    pub stack: Stack,
    pub turn_order: VecDeque<PlayerId>,
    pub extra_turns: VecDeque<PlayerId>,
    pub phases: VecDeque<Phase>,
    pub subphases: VecDeque<Subphase>,
    pub phase: Option<Phase>,
    pub subphase: Option<Subphase>,
    pub outcome: GameOutcome,
    pub losers: Vec<PlayerId>,
    pub lands_played_this_turn: u32,
    pub land_play_limit: u32,
    //The player holding priority, if a priority window is open
    pub priority: Option<PlayerId>,
    pub active_player: PlayerId,
    pub turn_number: u32,
    //Effects from resolved spells and abilities.
    //Static abilities are read from the permanents themselves.
    pub cont_effects: Vec<Continuous>,
    pub pending_triggers: Vec<PendingTrigger>,
    pub registrations: Vec<TriggerRegistration>,
    pub combat: Option<Combat>,
    pub config: GameConfig,
    #[derivative(Debug = "ignore")]
    pub feed: EventFeed,
    #[derivative(Debug = "ignore")]
    view: View,
    timestamp: u64,
    #[derivative(Debug = "ignore")]
    backup: Option<Backup>,
    #[derivative(Debug = "ignore")]
    rng: StdRng,
}

//The game without its feed, which is rolled back by truncating instead
#[derive(Clone)]
struct Backup {
    game: Box<Game>,
    feed: FeedMark,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum GameOutcome {
    Ongoing,
    Tie,
    Winner(PlayerId),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameResult {
    pub outcome: GameOutcome,
    pub losers: Vec<PlayerId>,
}

impl Game {
    //Backs the game up in case an action fails part way through.
    //Only one backup is kept, so the old one is dropped first.
    pub fn backup(&mut self) {
        self.backup = None;
        let detached = self.feed.detached();
        let feed = std::mem::replace(&mut self.feed, detached);
        let game = Box::new(self.clone());
        self.feed = feed;
        self.backup = Some(Backup {
            game,
            feed: self.feed.mark(),
        });
    }
    pub fn restore(&mut self) {
        if let Some(backup) = self.backup.take() {
            let mut restored = *backup.game;
            std::mem::swap(&mut restored.feed, &mut self.feed);
            restored.feed.rollback(backup.feed);
            *self = restored;
        }
    }
    pub fn shuffle(&mut self, player: PlayerId) {
        if let Some(pl) = self.players.get_mut(player) {
            pl.library.shuffle(&mut self.rng);
        }
    }
    pub fn next_timestamp(&mut self) -> u64 {
        self.timestamp += 1;
        self.timestamp
    }
    pub fn subscribe(&self) -> broadcast::Receiver<FeedEntry> {
        self.feed.subscribe()
    }
    pub fn result(&self) -> GameResult {
        GameResult {
            outcome: self.outcome,
            losers: self.losers.clone(),
        }
    }

    pub fn cards_and_zones(&self) -> Vec<(CardId, Zone)> {
        let mut res = Vec::new();
        res.extend(self.battlefield.iter().map(|&e| (e, Zone::Battlefield)));
        res.extend(self.stack.iter().map(|e| (e, Zone::Stack)));
        res.extend(self.exile.iter().map(|&e| (e, Zone::Exile)));
        res.extend(self.command.iter().map(|&e| (e, Zone::Command)));
        for player_id in self.turn_order.iter() {
            if let Some(player) = self.players.get(*player_id) {
                res.extend(player.hand.iter().map(|&e| (e, Zone::Hand)));
                res.extend(player.graveyard.iter().map(|&e| (e, Zone::Graveyard)));
                res.extend(player.library.iter().map(|&e| (e, Zone::Library)));
            }
        }
        res
    }
    pub fn all_cards(&self) -> Vec<CardId> {
        self.cards_and_zones().into_iter().map(|(id, _)| id).collect()
    }
    pub fn locate_zone(&self, id: CardId) -> Option<Zone> {
        if self.battlefield.contains(&id) {
            return Some(Zone::Battlefield);
        }
        if self.stack.contains(id) {
            return Some(Zone::Stack);
        }
        let owner = self.cards.get(id)?.owner;
        if let Some(player) = self.players.get(owner) {
            if player.hand.contains(&id) {
                return Some(Zone::Hand);
            }
            if player.graveyard.contains(&id) {
                return Some(Zone::Graveyard);
            }
            if player.library.contains(&id) {
                return Some(Zone::Library);
            }
        }
        if self.exile.contains(&id) {
            return Some(Zone::Exile);
        }
        if self.command.contains(&id) {
            return Some(Zone::Command);
        }
        None
    }
    //Every object must be in exactly one zone, and every id in a zone must exist
    pub fn check_invariants(&self) -> Result<(), MTGError> {
        let mut seen = HashMap::new();
        for (id, zone) in self.cards_and_zones() {
            if !self.cards.contains(id) {
                return Err(MTGError::InvariantViolation(format!(
                    "{} is in the {:?} but doesn't exist",
                    id, zone
                )));
            }
            if let Some(other) = seen.insert(id, zone) {
                return Err(MTGError::InvariantViolation(format!(
                    "{} is in both the {:?} and the {:?}",
                    id, other, zone
                )));
            }
        }
        for (id, _) in self.cards.iter() {
            if !seen.contains_key(&id) {
                return Err(MTGError::InvariantViolation(format!(
                    "{} is in no zone",
                    id
                )));
            }
        }
        Ok(())
    }

    //takes in a card or permanent, returns its controller after
    //continuous effects, or the owner if it isn't on the battlefield
    pub fn get_controller(&self, ent: CardId) -> Option<PlayerId> {
        self.view
            .get(&ent)
            .map(|view| view.controller)
            .or_else(|| self.cards.get(ent).map(|card| card.get_controller()))
    }
    pub fn players_permanents(&self, player: PlayerId) -> Vec<CardId> {
        self.battlefield
            .iter()
            .copied()
            .filter(|&ent| self.get_controller(ent) == Some(player))
            .collect()
    }
    pub fn all_creatures(&self) -> Vec<CardId> {
        self.battlefield
            .iter()
            .copied()
            .filter(|&ent| self.is_type(ent, Type::Creature))
            .collect()
    }
    pub fn players_creatures(&self, player: PlayerId) -> Vec<CardId> {
        self.all_creatures()
            .into_iter()
            .filter(|&ent| self.get_controller(ent) == Some(player))
            .collect()
    }
    pub fn is_type(&self, ent: CardId, t: Type) -> bool {
        self.view
            .get(&ent)
            .map(|view| view.face.types.contains(&t))
            .unwrap_or(false)
    }
    pub fn has_keyword(&self, ent: CardId, keyword: KeywordAbility) -> bool {
        self.view
            .get(&ent)
            .map(|view| view.face.has_keyword(keyword))
            .unwrap_or(false)
    }
    //Can this permanent tap to attack or to pay a cost?
    //Doesn't include prevention effects, just if it can tap w/o them
    pub fn can_tap(&self, ent: CardId) -> bool {
        if let Some(card) = self.cards.get(ent) {
            if card.tapped || !self.battlefield.contains(&ent) {
                return false;
            }
            !self.is_type(ent, Type::Creature)
                || self.has_keyword(ent, KeywordAbility::Haste)
                || (!card.etb_this_cycle && card.controlled_since == self.get_controller(ent))
        } else {
            false
        }
    }
    pub fn remaining_lethal(&self, ent: CardId) -> Option<i64> {
        let toughness = self.view.get(&ent)?.face.pt.as_ref()?.toughness;
        let card = self.cards.get(ent)?;
        if card.deathtouched {
            return Some(0);
        }
        Some((toughness - card.damaged).max(0))
    }
    pub fn loyalty(&self, ent: CardId) -> i64 {
        self.cards
            .get(ent)
            .map(|card| card.counters.get(Counter::Loyalty))
            .unwrap_or(0)
    }
    //If this is an ability, return its originator. If not, return itself
    pub fn stack_ent_source(&self, id: CardId) -> CardId {
        if let Some(card) = self.cards.get(id) {
            card.source_of_ability.unwrap_or(id)
        } else {
            id
        }
    }
    pub fn name(&self, id: CardId) -> String {
        self.cards
            .get(id)
            .map(|card| card.name().to_owned())
            .unwrap_or_default()
    }

    pub fn sorcery_speed(&self, player_id: PlayerId) -> bool {
        player_id == self.active_player
            && self.stack.is_empty()
            && self.phase.map_or(false, |phase| phase.is_main())
            && self.subphase.is_none()
    }
    pub fn is_playing(&self, player: PlayerId) -> bool {
        self.players.is(player, |pl| !pl.lost)
    }
    pub fn opponents(&self, player: PlayerId) -> Vec<PlayerId> {
        self.turn_order
            .iter()
            .copied()
            .filter(|&x| x != player && self.is_playing(x))
            .collect()
    }
    //The players still in the game, starting with the given one
    pub fn turn_order_from_player(&self, player: PlayerId) -> VecDeque<PlayerId> {
        let mut order = self.turn_order.clone();
        if let Some(pos) = order.iter().position(|&x| x == player) {
            order.rotate_left(pos);
        }
        order.retain(|&x| self.is_playing(x));
        order
    }
    //Active player first, then the rest in turn order
    pub fn apnap_order(&self) -> VecDeque<PlayerId> {
        self.turn_order_from_player(self.active_player)
    }

    //Puts an object straight into a zone, for setting up a game state.
    //Nothing triggers and permanents aren't summoning sick.
    pub fn create_card(&mut self, face: CardFace, owner: PlayerId, zone: Zone) -> CardId {
        let timestamp = self.next_timestamp();
        let mut card = CardEnt::new(face, owner);
        card.timestamp = timestamp;
        if zone == Zone::Battlefield {
            card.controlled_since = Some(owner);
            if let Some(loyalty) = card.printed.loyalty {
                card.counters.add(Counter::Loyalty, loyalty);
            }
        }
        let (id, _) = self.cards.insert(card);
        self.place_in_zone(id, owner, zone);
        self.refresh_view();
        id
    }
    //Adds an id to the top of a zone
    fn place_in_zone(&mut self, id: CardId, owner: PlayerId, zone: Zone) {
        match zone {
            Zone::Battlefield => self.battlefield.push(id),
            Zone::Stack => self.stack.push(id),
            Zone::Exile => self.exile.push(id),
            Zone::Command => self.command.push(id),
            Zone::Hand | Zone::Library | Zone::Graveyard => {
                if let Some(pl) = self.players.get_mut(owner) {
                    match zone {
                        Zone::Hand => {
                            pl.hand.insert(id);
                        }
                        Zone::Library => pl.library.push(id),
                        _ => pl.graveyard.push(id),
                    }
                }
            }
        }
    }
    //Returns true if the id was in the zone
    fn remove_from_zone(&mut self, id: CardId, zone: Zone) -> bool {
        fn remove_vec(v: &mut Vec<CardId>, id: CardId) -> bool {
            let len = v.len();
            v.retain(|&x| x != id);
            v.len() != len
        }
        match zone {
            Zone::Battlefield => remove_vec(&mut self.battlefield, id),
            Zone::Stack => self.stack.remove(id),
            Zone::Exile => remove_vec(&mut self.exile, id),
            Zone::Command => remove_vec(&mut self.command, id),
            Zone::Hand | Zone::Library | Zone::Graveyard => {
                let owner = match self.cards.get(id) {
                    Some(card) => card.owner,
                    None => return false,
                };
                match self.players.get_mut(owner) {
                    Some(pl) => match zone {
                        Zone::Hand => pl.hand.remove(&id),
                        Zone::Library => remove_vec(&mut pl.library, id),
                        _ => remove_vec(&mut pl.graveyard, id),
                    },
                    None => false,
                }
            }
        }
    }
    pub fn add_continuous(&mut self, mut effect: Continuous) {
        effect.timestamp = self.next_timestamp();
        self.cont_effects.push(effect);
        self.refresh_view();
    }
    //Zone changes make new objects, so anything tied only to
    //the old ids can never apply again
    pub fn sweep_dead_references(&mut self) {
        let cards = &self.cards;
        let exists = |target: &TargetId| match target {
            TargetId::Card(id) => cards.contains(*id),
            TargetId::Player(_) => true,
        };
        self.registrations
            .retain(|registration| cards.contains(registration.source));
        self.cont_effects.retain(|effect| match &effect.affected {
            Affected::ManuallySet(targets) => targets.iter().any(exists),
            Affected::Target(Some(target)) => exists(target),
            Affected::Cardname | Affected::AttachedTo => cards.contains(effect.source),
            _ => true,
        });
    }
}
