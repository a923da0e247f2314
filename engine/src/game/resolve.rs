use crate::event::{DamageReason, Event, EventResult};
use crate::game::Game;
use crate::log::FeedEvent;
use common::card_entities::CardFace;
use common::entities::{CardId, TargetId};
use common::spellabil::{Affected, Clause, ClauseEffect, Constraint, Continuous};
use common::zones::Zone;
use log::{debug, info};

impl Game {
    //Resolves the top of the stack. Targets are checked again first,
    //and an entry whose targets are all illegal fizzles.
    pub fn resolve_top(&mut self) {
        let Some(entry) = self.stack.peek() else {
            return;
        };
        let Some(card) = self.cards.get(entry).cloned() else {
            self.stack.pop();
            return;
        };
        let name = card.name().to_owned();
        let targets = self.chosen_targets(entry);
        let mut effect = card.effect.clone();
        let mut any_legal = targets.is_empty();
        for (i, target) in targets {
            if self.is_valid_target(&effect[i], entry, target) {
                any_legal = true;
            } else {
                debug!("{} is no longer a legal target for {}", target, name);
                effect[i].affected = Affected::Target(None);
            }
        }
        if !any_legal {
            info!("{} fizzles", name);
            self.feed.push(FeedEvent::Fizzled { entry, name });
            self.leave_stack(entry);
            return;
        }
        if let Some(ent) = self.cards.get_mut(entry) {
            ent.effect = effect.clone();
        }
        info!("{} resolves", name);
        if !card.is_ability() && card.printed.types.is_permanent() {
            let host = effect.iter().find_map(|clause| match (&clause.effect, &clause.affected) {
                (ClauseEffect::Attach, Affected::Target(Some(TargetId::Card(host)))) => Some(*host),
                _ => None,
            });
            let results = self.move_zones(vec![entry], Zone::Stack, Zone::Battlefield);
            if let Some(host) = host {
                if let Some(attachment) = entered(&results) {
                    self.handle_event(Event::Attach {
                        attachment,
                        target: host,
                    });
                }
            }
        } else {
            self.resolve_effect(entry);
            self.leave_stack(entry);
        }
        self.feed.push(FeedEvent::Resolved { entry, name });
    }

    //Abilities cease to exist, cards go to their owner's graveyard
    fn leave_stack(&mut self, entry: CardId) {
        if self.cards.is(entry, |card| card.is_ability()) {
            self.handle_event(Event::CeaseToExist { ents: vec![entry] });
        } else {
            self.move_zones(vec![entry], Zone::Stack, Zone::Graveyard);
        }
    }

    pub(crate) fn resolve_effect(&mut self, entry: CardId) {
        let clauses = self
            .cards
            .get(entry)
            .map(|card| card.effect.clone())
            .unwrap_or_default();
        for clause in clauses {
            self.resolve_clause(clause, entry);
        }
    }

    pub fn calculate_affected(
        &self,
        entry: CardId,
        affected: &Affected,
        constraints: &[Constraint],
    ) -> Vec<TargetId> {
        let controller = self.get_controller(entry);
        let source = self.stack_ent_source(entry);
        let candidates: Vec<TargetId> = match affected {
            Affected::Controller => return controller.map(TargetId::Player).into_iter().collect(),
            Affected::EachOpponent => {
                return controller
                    .map(|controller| self.opponents(controller))
                    .unwrap_or_default()
                    .into_iter()
                    .map(TargetId::Player)
                    .collect()
            }
            Affected::Target(target) => return target.iter().copied().collect(),
            Affected::ManuallySet(targets) => return targets.clone(),
            Affected::Cardname => vec![TargetId::Card(source)],
            Affected::AttachedTo => self
                .cards
                .get(source)
                .and_then(|card| card.attached_to)
                .map(TargetId::Card)
                .into_iter()
                .collect(),
            Affected::All => self
                .turn_order
                .iter()
                .copied()
                .filter(|&player| self.is_playing(player))
                .map(TargetId::Player)
                .chain(self.battlefield.iter().copied().map(TargetId::Card))
                .collect(),
        };
        candidates
            .into_iter()
            .filter(|&target| self.passes_constraints(constraints, entry, target))
            .collect()
    }

    //Each clause is one batch of simultaneous events
    fn resolve_clause(&mut self, clause: Clause, entry: CardId) {
        let affected = self.calculate_affected(entry, &clause.affected, &clause.constraints);
        if affected.is_empty() {
            return;
        }
        let source = self.stack_ent_source(entry);
        let cards: Vec<CardId> = affected.iter().filter_map(|target| target.card()).collect();
        let players: Vec<_> = affected.iter().filter_map(|target| target.player()).collect();
        match clause.effect {
            ClauseEffect::Destroy => {
                self.destroy(cards);
            }
            ClauseEffect::Exile => {
                self.exile(cards);
            }
            ClauseEffect::DealDamage(amount) => {
                self.handle_events(
                    affected
                        .iter()
                        .map(|&target| Event::Damage {
                            amount,
                            target,
                            source,
                            reason: DamageReason::SpellAbility(entry),
                        })
                        .collect(),
                );
            }
            ClauseEffect::AddMana(mana) => {
                for player in players {
                    if let Some(pl) = self.players.get_mut(player) {
                        for &symbol in &mana {
                            pl.mana_pool.add_symbol(symbol);
                        }
                    }
                }
            }
            ClauseEffect::GainLife(amount) => {
                self.handle_events(
                    players
                        .into_iter()
                        .map(|player| Event::GainLife { player, amount })
                        .collect(),
                );
            }
            ClauseEffect::LoseLife(amount) => {
                self.handle_events(
                    players
                        .into_iter()
                        .map(|player| Event::LoseLife { player, amount })
                        .collect(),
                );
            }
            ClauseEffect::DrawCard => {
                for player in players {
                    self.draw(player);
                }
            }
            ClauseEffect::Compound(clauses) => {
                for mut subclause in clauses {
                    subclause.affected = Affected::ManuallySet(affected.clone());
                    self.resolve_clause(subclause, entry);
                }
            }
            ClauseEffect::SetTargetController(inner) => {
                let controllers: Vec<TargetId> = cards
                    .iter()
                    .filter_map(|&card| self.get_controller(card))
                    .map(TargetId::Player)
                    .collect();
                let mut inner = *inner;
                inner.affected = Affected::ManuallySet(controllers);
                self.resolve_clause(inner, entry);
            }
            ClauseEffect::CreateToken(attributes) => {
                let face = CardFace::from_token_attributes(&attributes);
                self.handle_events(
                    players
                        .into_iter()
                        .map(|player| Event::CreateToken {
                            player,
                            face: face.clone(),
                        })
                        .collect(),
                );
            }
            ClauseEffect::PutCounter(counter, quantity) => {
                self.handle_events(
                    affected
                        .iter()
                        .map(|&target| Event::PutCounter {
                            affected: target,
                            counter,
                            quantity,
                        })
                        .collect(),
                );
            }
            ClauseEffect::Tap => {
                self.handle_events(cards.into_iter().map(|ent| Event::Tap { ent }).collect());
            }
            ClauseEffect::Untap => {
                self.handle_events(cards.into_iter().map(|ent| Event::Untap { ent }).collect());
            }
            ClauseEffect::CounterSpell => {
                for countered in cards {
                    if !self.stack.contains(countered) {
                        continue;
                    }
                    let name = self.name(countered);
                    info!("{} is countered", name);
                    self.feed.push(FeedEvent::Countered {
                        entry: countered,
                        name,
                    });
                    self.leave_stack(countered);
                }
            }
            ClauseEffect::Attach => {
                if let Some(&target) = cards.first() {
                    self.handle_event(Event::Attach {
                        attachment: source,
                        target,
                    });
                }
            }
            ClauseEffect::Continuous(effect, duration) => {
                let Some(controller) = self.get_controller(entry) else {
                    return;
                };
                self.add_continuous(Continuous {
                    source,
                    controller,
                    timestamp: 0,
                    affected: Affected::ManuallySet(affected),
                    constraints: Vec::new(),
                    effect,
                    duration,
                });
            }
        }
    }
}

//The new id of the object a zone move put on the battlefield
fn entered(results: &[EventResult]) -> Option<CardId> {
    results.iter().find_map(|result| match result {
        EventResult::MoveZones(moved) => moved
            .iter()
            .find(|moved| moved.dest == Zone::Battlefield)
            .and_then(|moved| moved.newent),
        _ => None,
    })
}
