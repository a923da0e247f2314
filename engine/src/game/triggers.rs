use crate::client_message::{Ask, AskOrder};
use crate::errors::MTGError;
use crate::event::EventResult;
use crate::game::layers::View;
use crate::game::Game;
use crate::log::FeedEvent;
use common::ability::{Ability, AbilityTriggerType, TriggeredAbility};
use common::card_entities::{CardEnt, CardFace, EntType};
use common::entities::{CardId, PlayerId, TargetId};
use common::zones::Zone;
use log::debug;

//The game right before an event batch, for abilities that look back in time
#[derive(Clone, Debug)]
pub struct Snapshot {
    view: View,
    battlefield: Vec<CardId>,
}

//A triggered ability that listens while its source is in a zone.
//Abilities printed on permanents don't need one.
#[derive(Clone, Debug, PartialEq)]
pub struct TriggerRegistration {
    pub source: CardId,
    pub zone: Zone,
    pub ability: TriggeredAbility,
}

//A triggered ability waiting to be put on the stack
#[derive(Clone, Debug, PartialEq)]
pub struct PendingTrigger {
    pub source: CardId,
    pub controller: PlayerId,
    pub source_name: String,
    pub ability: TriggeredAbility,
}

struct Listener {
    source: CardId,
    controller: PlayerId,
    name: String,
    ability: TriggeredAbility,
}

impl Game {
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            view: self.view().clone(),
            battlefield: self.battlefield.clone(),
        }
    }
    pub fn register_trigger(&mut self, source: CardId, zone: Zone, ability: TriggeredAbility) {
        self.registrations.push(TriggerRegistration {
            source,
            zone,
            ability,
        });
    }

    fn listeners(&self, view: &View, battlefield: &[CardId]) -> Vec<Listener> {
        let mut res = Vec::new();
        for &perm in battlefield {
            let Some(card) = view.get(&perm) else {
                continue;
            };
            for ability in &card.face.abilities {
                if let Ability::Triggered(abil) = ability {
                    res.push(Listener {
                        source: perm,
                        controller: card.controller,
                        name: card.face.name.clone(),
                        ability: abil.clone(),
                    });
                }
            }
        }
        for registration in &self.registrations {
            let Some(card) = view.get(&registration.source) else {
                continue;
            };
            if card.zone == Some(registration.zone) {
                res.push(Listener {
                    source: registration.source,
                    controller: card.controller,
                    name: card.face.name.clone(),
                    ability: registration.ability.clone(),
                });
            }
        }
        res
    }

    fn object_passes(&self, view: &View, listener: &Listener, object: CardId) -> bool {
        listener.ability.trigger.constraint.iter().all(|constraint| {
            self.passes_in(
                view,
                constraint,
                listener.source,
                Some(listener.controller),
                TargetId::Card(object),
            )
        })
    }

    //How many times the listener triggers on one event result
    fn times_triggered(
        &self,
        view: &View,
        listener: &Listener,
        result: &EventResult,
        leaving: bool,
    ) -> usize {
        match (&listener.ability.trigger.trigger, result) {
            (AbilityTriggerType::ZoneMove(trig), EventResult::MoveZones(moves)) => moves
                .iter()
                .filter(|moved| {
                    (moved.source == Some(Zone::Battlefield)) == leaving
                        && trig.matches(moved.source, moved.dest)
                })
                .filter(|moved| {
                    //Leaving objects are checked as they last existed
                    let object = if leaving {
                        Some(moved.oldent)
                    } else {
                        moved.newent
                    };
                    object.map_or(false, |object| self.object_passes(view, listener, object))
                })
                .count(),
            (_, _) if leaving => 0,
            (AbilityTriggerType::Attacks, EventResult::Attacks(attacks)) => attacks
                .iter()
                .filter(|(attacker, _)| self.object_passes(view, listener, *attacker))
                .count(),
            (AbilityTriggerType::Blocks, EventResult::Blocks(blocks)) => blocks
                .iter()
                .filter(|(blocker, _)| self.object_passes(view, listener, *blocker))
                .count(),
            (
                AbilityTriggerType::DealsDamage { combat_only },
                EventResult::Damage { source, combat, .. },
            ) => usize::from(
                (*combat || !combat_only) && self.object_passes(view, listener, *source),
            ),
            (
                AbilityTriggerType::BeginningOfStep { subphase, yours },
                EventResult::BeginStep(step),
            ) => usize::from(
                step == subphase
                    && (!yours || listener.controller == self.active_player)
                    && self.object_passes(view, listener, listener.source),
            ),
            (AbilityTriggerType::SpellCast, EventResult::Cast { spell, .. }) => {
                usize::from(self.object_passes(view, listener, *spell))
            }
            _ => 0,
        }
    }

    //Queues every ability triggered by a batch of event results.
    //Abilities that trigger on leaving the battlefield look back at the snapshot.
    pub(crate) fn collect_triggers(&mut self, results: &[EventResult], snapshot: &Snapshot) {
        if results.is_empty() {
            return;
        }
        let current = self.listeners(self.view(), &self.battlefield);
        let lookback = self.listeners(&snapshot.view, &snapshot.battlefield);
        let mut fired = Vec::new();
        for result in results {
            for listener in &current {
                let times = self.times_triggered(self.view(), listener, result, false);
                fired.extend(std::iter::repeat(listener).take(times).map(pending));
            }
            for listener in &lookback {
                let times = self.times_triggered(&snapshot.view, listener, result, true);
                fired.extend(std::iter::repeat(listener).take(times).map(pending));
            }
        }
        for trigger in &fired {
            debug!("{} triggered", trigger.source_name);
        }
        self.pending_triggers.extend(fired);
    }

    //Puts queued triggers on the stack. The active player's go first
    //so they resolve last, each player ordering their own.
    pub async fn place_abilities(&mut self) -> Result<(), MTGError> {
        let pending = std::mem::take(&mut self.pending_triggers);
        for player in self.apnap_order() {
            let mut ents = Vec::new();
            for trigger in pending.iter().filter(|trigger| trigger.controller == player) {
                let timestamp = self.next_timestamp();
                let face = CardFace {
                    name: trigger.source_name.clone(),
                    ..Default::default()
                };
                let mut ent = CardEnt::new(face, player);
                ent.ent_type = EntType::TriggeredAbility;
                ent.source_of_ability = Some(trigger.source);
                ent.effect = trigger.ability.effect.clone();
                ent.timestamp = timestamp;
                ent.set_controller(Some(player));
                let (id, _) = self.cards.insert(ent);
                ents.push(id);
            }
            let ordered = self
                .ask_order(player, ents, |ents| Ask::TriggerOrder(AskOrder { ents }))
                .await?;
            for ability in ordered {
                self.stack.push(ability);
                self.refresh_view();
                let source = self.stack_ent_source(ability);
                match self.select_targets(player, ability).await {
                    Ok(()) => self.feed.push(FeedEvent::TriggerPlaced {
                        ability,
                        source,
                        controller: player,
                    }),
                    Err(error) if error.is_fatal() => return Err(error),
                    Err(error) => {
                        debug!("trigger of {} removed: {}", source, error);
                        let name = self.name(ability);
                        self.stack.remove(ability);
                        self.cards.remove(ability);
                        self.feed.push(FeedEvent::TriggerRemoved { source, name });
                    }
                }
            }
        }
        self.refresh_view();
        Ok(())
    }
}

fn pending(listener: &Listener) -> PendingTrigger {
    PendingTrigger {
        source: listener.source,
        controller: listener.controller,
        source_name: listener.name.clone(),
        ability: listener.ability.clone(),
    }
}
