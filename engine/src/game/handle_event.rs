pub mod combat;
pub mod phase_event;

use crate::event::{DamageReason, Event, EventResult, MoveZonesResult};
use crate::game::Game;
use crate::log::FeedEvent;
use common::ability::{Ability, ReplacementEffect};
use common::card_entities::{CardEnt, EntType};
use common::cardtypes::Type;
use common::counters::Counter;
use common::entities::{CardId, PlayerId, TargetId};
use common::spellabil::KeywordAbility;
use common::zones::Zone;
use log::debug;
use std::collections::VecDeque;

impl Game {
    pub fn handle_event(&mut self, event: Event) -> Vec<EventResult> {
        self.handle_events(vec![event])
    }
    //Applies a batch of simultaneous events. Events caused by the batch
    //are applied after it, then every trigger of the batch is collected.
    pub fn handle_events(&mut self, events: Vec<Event>) -> Vec<EventResult> {
        let snapshot = self.snapshot();
        let mut queue: VecDeque<Event> = events.into();
        let mut results = Vec::new();
        while let Some(event) = queue.pop_front() {
            debug!("handling {:?}", event);
            self.apply_event(event, &mut queue, &mut results);
        }
        self.refresh_view();
        self.collect_triggers(&results, &snapshot);
        results
    }

    fn apply_event(
        &mut self,
        event: Event,
        queue: &mut VecDeque<Event>,
        results: &mut Vec<EventResult>,
    ) {
        match event {
            Event::Draw { player } => {
                let top = match self.players.get_mut(player) {
                    Some(pl) => match pl.library.last() {
                        Some(&card) => card,
                        None => {
                            pl.drew_from_empty = true;
                            return;
                        }
                    },
                    None => return,
                };
                for moved in self.movezones(vec![top], Some(Zone::Library), Zone::Hand) {
                    if let Some(newent) = moved.newent {
                        results.push(EventResult::Draw(newent));
                    }
                }
            }
            Event::Damage {
                amount,
                target,
                source,
                reason,
            } => {
                if self.apply_damage(amount, target, source) {
                    let combat = reason == DamageReason::Combat;
                    self.feed.push(FeedEvent::Damage {
                        source,
                        target,
                        amount,
                        combat,
                    });
                    if self.has_keyword(source, KeywordAbility::Lifelink) {
                        if let Some(controller) = self.get_controller(source) {
                            queue.push_back(Event::GainLife {
                                player: controller,
                                amount,
                            });
                        }
                    }
                    results.push(EventResult::Damage {
                        source,
                        target,
                        amount,
                        combat,
                    });
                }
            }
            Event::Destroy { perms } => {
                let destroyed: Vec<CardId> = perms
                    .into_iter()
                    .filter(|&perm| {
                        self.battlefield.contains(&perm)
                            && !self.has_keyword(perm, KeywordAbility::Indestructible)
                    })
                    .collect();
                if !destroyed.is_empty() {
                    queue.push_back(Event::MoveZones {
                        ents: destroyed,
                        origin: Some(Zone::Battlefield),
                        dest: Zone::Graveyard,
                    });
                }
            }
            Event::Discard { player: _, cards } => {
                queue.push_back(Event::MoveZones {
                    ents: cards,
                    origin: Some(Zone::Hand),
                    dest: Zone::Graveyard,
                });
            }
            Event::Cast { player, spell } => {
                //Costs and targets were handled when the spell was put on the stack,
                //this is just for triggered abilities
                results.push(EventResult::Cast { player, spell });
            }
            Event::MoveZones { ents, origin, dest } => {
                let moved = self.movezones(ents, origin, dest);
                if !moved.is_empty() {
                    results.push(EventResult::MoveZones(moved));
                }
            }
            Event::Lose { player, reason } => {
                if let Some(pl) = self.players.get_mut(player) {
                    if !pl.lost {
                        pl.lost = true;
                        self.losers.push(player);
                        self.feed.push(FeedEvent::PlayerLost { player, reason });
                        results.push(EventResult::Lost(player));
                    }
                }
            }
            //Handle already being tapped as prevention effect
            Event::Tap { ent } => {
                if !self.battlefield.contains(&ent) {
                    return;
                }
                if let Some(card) = self.cards.get_mut(ent) {
                    if !card.tapped {
                        card.tapped = true;
                        results.push(EventResult::Tap(ent));
                    }
                }
            }
            Event::Untap { ent } => {
                if !self.battlefield.contains(&ent) {
                    return;
                }
                if let Some(card) = self.cards.get_mut(ent) {
                    if card.tapped {
                        card.tapped = false;
                        results.push(EventResult::Untap(ent));
                    }
                }
            }
            Event::GainLife { player, amount } => {
                if amount > 0 {
                    self.change_life(player, amount);
                }
            }
            Event::LoseLife { player, amount } => {
                if amount > 0 {
                    self.change_life(player, -amount);
                }
            }
            Event::PutCounter {
                affected,
                counter,
                quantity,
            } => match affected {
                TargetId::Card(card) => {
                    if let Some(card) = self.cards.get_mut(card) {
                        card.counters.add(counter, quantity);
                    }
                }
                TargetId::Player(player) => {
                    if let Some(pl) = self.players.get_mut(player) {
                        pl.counters.add(counter, quantity);
                    }
                }
            },
            Event::RemoveCounter {
                affected,
                counter,
                quantity,
            } => match affected {
                TargetId::Card(card) => {
                    if let Some(card) = self.cards.get_mut(card) {
                        card.counters.remove(counter, quantity);
                    }
                }
                TargetId::Player(player) => {
                    if let Some(pl) = self.players.get_mut(player) {
                        pl.counters.remove(counter, quantity);
                    }
                }
            },
            Event::PlayLand { player, land } => {
                self.lands_played_this_turn += 1;
                self.feed.push(FeedEvent::LandPlayed { player, land });
                queue.push_back(Event::MoveZones {
                    ents: vec![land],
                    origin: Some(Zone::Hand),
                    dest: Zone::Battlefield,
                });
            }
            Event::Attack { attacks } => {
                self.feed.push(FeedEvent::AttackersDeclared(attacks.clone()));
                results.push(EventResult::Attacks(attacks));
            }
            Event::Block { blocks } => {
                self.feed.push(FeedEvent::BlockersDeclared(blocks.clone()));
                results.push(EventResult::Blocks(blocks));
            }
            Event::BeginStep { subphase } => results.push(EventResult::BeginStep(subphase)),
            Event::CreateToken { player, face } => {
                let timestamp = self.next_timestamp();
                let mut token = CardEnt::new(face, player);
                token.ent_type = EntType::TokenCard;
                token.etb_this_cycle = true;
                token.timestamp = timestamp;
                let name = token.name().to_owned();
                let (id, _) = self.cards.insert(token);
                self.battlefield.push(id);
                self.feed.push(FeedEvent::ZoneMoved {
                    old: id,
                    new: Some(id),
                    name,
                    origin: None,
                    dest: Zone::Battlefield,
                });
                results.push(EventResult::MoveZones(vec![MoveZonesResult {
                    oldent: id,
                    newent: Some(id),
                    source: None,
                    dest: Zone::Battlefield,
                    controller: player,
                }]));
            }
            Event::Attach { attachment, target } => {
                if self.battlefield.contains(&target) {
                    if let Some(card) = self.cards.get_mut(attachment) {
                        card.attached_to = Some(target);
                    }
                }
            }
            Event::Unattach { attachment } => {
                if let Some(card) = self.cards.get_mut(attachment) {
                    card.attached_to = None;
                }
            }
            Event::CeaseToExist { ents } => {
                for ent in ents {
                    if let Some(zone) = self.locate_zone(ent) {
                        self.remove_from_zone(ent, zone);
                    }
                    self.cards.remove(ent);
                }
            }
        }
    }

    fn change_life(&mut self, player: PlayerId, amount: i64) {
        if let Some(pl) = self.players.get_mut(player) {
            pl.life += amount;
            let life = pl.life;
            self.feed.push(FeedEvent::LifeChanged { player, life });
        }
    }

    //Returns true if any damage was dealt
    fn apply_damage(&mut self, amount: i64, target: TargetId, source: CardId) -> bool {
        if amount <= 0 {
            return false;
        }
        match target {
            TargetId::Card(cardid) => {
                if !self.battlefield.contains(&cardid) {
                    return false;
                }
                let planeswalker = self.is_type(cardid, Type::Planeswalker);
                let creature = self.is_type(cardid, Type::Creature);
                let deathtouch = self.has_keyword(source, KeywordAbility::Deathtouch);
                match self.cards.get_mut(cardid) {
                    Some(card) => {
                        if planeswalker {
                            card.counters.remove(Counter::Loyalty, amount);
                        }
                        if creature {
                            card.damaged += amount;
                            card.deathtouched |= deathtouch;
                        }
                        planeswalker || creature
                    }
                    None => false,
                }
            }
            TargetId::Player(player) => {
                if self.players.contains(player) {
                    self.change_life(player, -amount);
                    true
                } else {
                    false
                }
            }
        }
    }

    //The replacement effects that apply to an object moving between zones.
    //The moving object's own self replacements apply along with
    //those of the permanents on the battlefield.
    fn zone_move_replacements(
        &self,
        ent: CardId,
        origin: Zone,
        dest: Zone,
    ) -> Vec<ReplacementEffect> {
        let mut res = Vec::new();
        if let Some(view) = self.characteristics(ent) {
            for ability in &view.face.abilities {
                if let Ability::Replacement(rep) = ability {
                    if rep.self_only && rep.trigger.matches(Some(origin), dest) {
                        res.push(rep.replacement.clone());
                    }
                }
            }
        }
        for &perm in &self.battlefield {
            let Some(view) = self.characteristics(perm) else {
                continue;
            };
            for ability in &view.face.abilities {
                if let Ability::Replacement(rep) = ability {
                    if !rep.self_only
                        && rep.trigger.matches(Some(origin), dest)
                        && self.passes_constraints(&rep.constraints, perm, TargetId::Card(ent))
                    {
                        res.push(rep.replacement.clone());
                    }
                }
            }
        }
        res
    }

    //Moves objects to a new zone. Every object that arrives gets a new id,
    //abilities and tokens that can't exist in the new zone are dropped.
    pub(crate) fn movezones(
        &mut self,
        ents: Vec<CardId>,
        origin: Option<Zone>,
        dest: Zone,
    ) -> Vec<MoveZonesResult> {
        let mut move_results = Vec::new();
        for ent in ents {
            let Some(zone) = self.locate_zone(ent) else {
                continue;
            };
            if origin.map_or(false, |origin| origin != zone) {
                continue;
            }
            let Some(card) = self.cards.get(ent).cloned() else {
                continue;
            };
            let controller = self.get_controller(ent).unwrap_or(card.owner);
            if card.is_ability() {
                self.remove_from_zone(ent, zone);
                self.cards.remove(ent);
                move_results.push(MoveZonesResult {
                    oldent: ent,
                    newent: None,
                    source: Some(zone),
                    dest,
                    controller,
                });
                continue;
            }
            let mut dest = dest;
            for replacement in self.zone_move_replacements(ent, zone, dest) {
                if let ReplacementEffect::ChangeDestination(new_dest) = replacement {
                    debug!("{} goes to the {:?} instead of the {:?}", ent, new_dest, dest);
                    dest = new_dest;
                    break;
                }
            }
            let enters = if dest == Zone::Battlefield {
                self.zone_move_replacements(ent, zone, dest)
            } else {
                Vec::new()
            };
            self.remove_from_zone(ent, zone);
            self.cards.remove(ent);
            if let Some(combat) = &mut self.combat {
                combat.remove(ent);
            }

            let timestamp = self.next_timestamp();
            let mut newcard = CardEnt::new(card.printed.clone(), card.owner);
            newcard.ent_type = card.ent_type;
            newcard.timestamp = timestamp;
            if zone == Zone::Stack || dest == Zone::Stack {
                newcard.set_controller(Some(controller));
            }
            if dest == Zone::Battlefield {
                newcard.etb_this_cycle = true;
                if let Some(loyalty) = newcard.printed.loyalty {
                    newcard.counters.add(Counter::Loyalty, loyalty);
                }
                for replacement in enters {
                    match replacement {
                        ReplacementEffect::EntersTapped => newcard.tapped = true,
                        ReplacementEffect::EntersWithCounters(counter, quantity) => {
                            newcard.counters.add(counter, quantity)
                        }
                        ReplacementEffect::ChangeDestination(_) => {}
                    }
                }
            }
            let name = newcard.name().to_owned();
            let owner = newcard.owner;
            let (newent, _) = self.cards.insert(newcard);
            self.place_in_zone(newent, owner, dest);
            self.feed.push(FeedEvent::ZoneMoved {
                old: ent,
                new: Some(newent),
                name,
                origin: Some(zone),
                dest,
            });
            move_results.push(MoveZonesResult {
                oldent: ent,
                newent: Some(newent),
                source: Some(zone),
                dest,
                controller,
            });
        }
        move_results
    }
}
