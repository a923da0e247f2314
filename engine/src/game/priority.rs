use crate::actions::{Action, ActionPriorityType};
use crate::client_message::{Ask, AskSelectN, Notification};
use crate::errors::MTGError;
use crate::event::Event;
use crate::game::{Game, GameOutcome};
use crate::log::FeedEvent;
use common::ability::Ability;
use common::card_entities::{CardEnt, EntType};
use common::cost::Cost;
use common::counters::Counter;
use common::entities::{CardId, PlayerId, TargetId};
use common::spellabil::KeywordAbility;
use common::zones::Zone;
use log::{debug, info, warn};
use std::collections::VecDeque;

//One round of priority. It ends once every player in it
//has passed in succession without anyone acting.
#[derive(Clone, Debug, PartialEq)]
pub struct PriorityRound {
    order: VecDeque<PlayerId>,
    passes: usize,
}

impl PriorityRound {
    pub fn new(order: VecDeque<PlayerId>) -> Self {
        Self { order, passes: 0 }
    }
    pub fn holder(&self) -> Option<PlayerId> {
        self.order.front().copied()
    }
    pub fn pass(&mut self, player: PlayerId) -> Result<(), MTGError> {
        if self.holder() != Some(player) {
            return Err(MTGError::NoPriority(player));
        }
        self.passes += 1;
        self.order.rotate_left(1);
        Ok(())
    }
    pub fn give_priority(&mut self, player: PlayerId) {
        if let Some(pos) = self.order.iter().position(|&x| x == player) {
            self.order.rotate_left(pos);
        }
    }
    //Whoever acts receives priority again and everyone must pass anew
    pub fn acted(&mut self, player: PlayerId) {
        self.passes = 0;
        self.give_priority(player);
    }
    pub fn has_all_passed(&self) -> bool {
        !self.order.is_empty() && self.passes >= self.order.len()
    }
    pub fn retain(&mut self, f: impl Fn(PlayerId) -> bool) {
        self.order.retain(|&player| f(player));
        self.passes = self.passes.min(self.order.len());
    }
}

impl Game {
    //Hands out priority until every player passes in succession with
    //an empty stack. Each time everyone passes, the top of the stack resolves
    //and the active player receives priority again.
    pub async fn cycle_priority(&mut self) -> Result<(), MTGError> {
        let mut round = PriorityRound::new(self.apnap_order());
        loop {
            self.layers_state_actions().await?;
            if self.outcome != GameOutcome::Ongoing {
                self.priority = None;
                self.feed.commit();
                return Ok(());
            }
            round.retain(|player| self.is_playing(player));
            if round.has_all_passed() {
                if self.stack.is_empty() {
                    self.priority = None;
                    self.feed.commit();
                    return Ok(());
                }
                self.resolve_top();
                round = PriorityRound::new(self.apnap_order());
                continue;
            }
            let Some(player) = round.holder() else {
                self.priority = None;
                return Ok(());
            };
            self.priority = Some(player);
            match self.grant_priority(player).await? {
                ActionPriorityType::Pass => round.pass(player)?,
                ActionPriorityType::ManaAbilOrSpecialAction => {
                    //The player keeps priority
                }
                ActionPriorityType::Action => round.acted(player),
            }
        }
    }

    //Asks the player what to do until they pass or take a legal action.
    //Illegal actions are rolled back and the player is asked again.
    async fn grant_priority(&mut self, player: PlayerId) -> Result<ActionPriorityType, MTGError> {
        self.feed.push(FeedEvent::PriorityGiven(player));
        self.feed.commit();
        let mut rejections = 0;
        loop {
            let actions = self.compute_actions(player);
            let ask = AskSelectN {
                ents: actions.clone(),
                min: 0,
                max: 1,
            };
            let choice = self.ask_selection(player, Ask::Action(ask)).await?;
            let Some(&index) = choice.first() else {
                debug!("{} passes", player);
                self.feed.push(FeedEvent::Passed(player));
                return Ok(ActionPriorityType::Pass);
            };
            let action = actions[index].clone();
            match self.attempt_action(player, action).await {
                Ok(kind) => {
                    self.feed.commit();
                    return Ok(kind);
                }
                Err(error) if error.is_fatal() => return Err(error),
                Err(error) => {
                    warn!("{} tried an illegal action: {}", player, error);
                    self.feed.push(FeedEvent::ActionRejected {
                        player,
                        error: error.clone(),
                    });
                    self.feed.commit();
                    self.notify(player, Notification::Rejected(error)).await?;
                    rejections += 1;
                    if rejections >= self.config.max_rejections {
                        self.feed.push(FeedEvent::Passed(player));
                        return Ok(ActionPriorityType::Pass);
                    }
                }
            }
        }
    }

    //Takes an action for a player. On a non fatal error
    //the game is left exactly as it was before the attempt.
    pub async fn attempt_action(
        &mut self,
        player: PlayerId,
        action: Action,
    ) -> Result<ActionPriorityType, MTGError> {
        if self.outcome != GameOutcome::Ongoing {
            return Err(MTGError::GameOver);
        }
        if self.priority != Some(player) {
            return Err(MTGError::NoPriority(player));
        }
        self.backup();
        self.feed.push(FeedEvent::ActionTaken {
            player,
            action: action.clone(),
        });
        let res = match action {
            Action::Cast(option) => self.cast_spell(player, option.source_card).await,
            Action::PlayLand(land) => self.play_land(player, land),
            Action::ActivateAbility { source, index } => {
                self.activate_ability(player, source, index).await
            }
        };
        if let Err(error) = &res {
            if !error.is_fatal() {
                self.restore();
            }
        }
        res
    }

    async fn cast_spell(
        &mut self,
        player: PlayerId,
        card: CardId,
    ) -> Result<ActionPriorityType, MTGError> {
        if !self.players.is(player, |pl| pl.hand.contains(&card)) {
            return Err(MTGError::NotInHand(card));
        }
        let face = self
            .characteristics(card)
            .map(|view| view.face.clone())
            .ok_or(MTGError::NotInHand(card))?;
        if face.types.is_land() {
            return Err(MTGError::CantActivate(card));
        }
        if !(face.types.is_instant()
            || face.has_keyword(KeywordAbility::Flash)
            || self.sorcery_speed(player))
        {
            return Err(MTGError::WrongTiming);
        }
        let spell = self
            .movezones(vec![card], Some(Zone::Hand), Zone::Stack)
            .into_iter()
            .find(|moved| moved.dest == Zone::Stack)
            .and_then(|moved| moved.newent)
            .ok_or(MTGError::CantActivate(card))?;
        if let Some(ent) = self.cards.get_mut(spell) {
            ent.set_controller(Some(player));
            ent.cast = true;
            ent.effect = face.effect.clone();
        }
        self.refresh_view();
        self.select_targets(player, spell).await?;
        self.pay_costs(player, spell, &face.costs)?;
        info!("{} casts {}", player, face.name);
        self.feed.push(FeedEvent::Cast {
            player,
            spell,
            name: face.name,
        });
        self.handle_event(Event::Cast { player, spell });
        Ok(ActionPriorityType::Action)
    }

    async fn activate_ability(
        &mut self,
        player: PlayerId,
        source: CardId,
        index: usize,
    ) -> Result<ActionPriorityType, MTGError> {
        let (face, controller, zone) = match self.characteristics(source) {
            Some(view) => (view.face.clone(), view.controller, view.zone),
            None => return Err(MTGError::CantActivate(source)),
        };
        if zone != Some(Zone::Battlefield) || controller != player {
            return Err(MTGError::CantActivate(source));
        }
        let Some(Ability::Activated(abil)) = face.abilities.get(index).cloned() else {
            return Err(MTGError::CantActivate(source));
        };
        if (abil.sorcery_speed || abil.is_loyalty()) && !self.sorcery_speed(player) {
            return Err(MTGError::WrongTiming);
        }
        if abil.is_loyalty() {
            let used = self
                .cards
                .get(source)
                .map_or(true, |card| card.loyalty_activated);
            if used {
                return Err(MTGError::CantActivate(source));
            }
            if let Some(card) = self.cards.get_mut(source) {
                card.loyalty_activated = true;
            }
        }
        let timestamp = self.next_timestamp();
        let mut ent = CardEnt::new(face, player);
        ent.ent_type = EntType::ActivatedAbility;
        ent.source_of_ability = Some(source);
        ent.timestamp = timestamp;
        ent.effect = abil.effect.clone();
        ent.set_controller(Some(player));
        let (id, _) = self.cards.insert(ent);

        //Mana abilities don't use the stack
        if abil.is_mana_ability() {
            self.pay_costs(player, id, &abil.costs)?;
            self.resolve_effect(id);
            self.cards.remove(id);
            return Ok(ActionPriorityType::ManaAbilOrSpecialAction);
        }
        self.stack.push(id);
        self.refresh_view();
        self.select_targets(player, id).await?;
        self.pay_costs(player, id, &abil.costs)?;
        info!("{} activates an ability of {}", player, source);
        self.feed.push(FeedEvent::Activated {
            player,
            ability: id,
            source,
        });
        Ok(ActionPriorityType::Action)
    }

    fn play_land(&mut self, player: PlayerId, land: CardId) -> Result<ActionPriorityType, MTGError> {
        if !self.players.is(player, |pl| pl.hand.contains(&land)) {
            return Err(MTGError::NotInHand(land));
        }
        if !self
            .characteristics(land)
            .map_or(false, |view| view.face.types.is_land())
        {
            return Err(MTGError::CantActivate(land));
        }
        if !self.sorcery_speed(player) {
            return Err(MTGError::WrongTiming);
        }
        if self.lands_played_this_turn >= self.land_play_limit {
            return Err(MTGError::LandLimit);
        }
        self.handle_event(Event::PlayLand { player, land });
        Ok(ActionPriorityType::ManaAbilOrSpecialAction)
    }

    //Pays every cost of a spell or ability, mana from the player's pool
    fn pay_costs(
        &mut self,
        player: PlayerId,
        stack_ent: CardId,
        costs: &[Cost],
    ) -> Result<(), MTGError> {
        let source = self.stack_ent_source(stack_ent);
        let mana = Cost::mana_symbols(costs);
        if !mana.is_empty() {
            let pl = self
                .players
                .get_mut(player)
                .ok_or(MTGError::PlayerDoesntExist(player))?;
            pl.mana_pool.pay(&mana).map_err(|_| MTGError::CostNotPaid)?;
        }
        let mut events = Vec::new();
        for cost in costs {
            match *cost {
                Cost::Mana(_) => {}
                Cost::Selftap => {
                    if !self.can_tap(source) {
                        return Err(MTGError::CostNotPaid);
                    }
                    events.push(Event::Tap { ent: source });
                }
                Cost::Loyalty(amount) => {
                    if amount > 0 {
                        events.push(Event::PutCounter {
                            affected: TargetId::Card(source),
                            counter: Counter::Loyalty,
                            quantity: amount,
                        });
                    } else if amount < 0 {
                        if self.loyalty(source) < -amount {
                            return Err(MTGError::CostNotPaid);
                        }
                        events.push(Event::RemoveCounter {
                            affected: TargetId::Card(source),
                            counter: Counter::Loyalty,
                            quantity: -amount,
                        });
                    }
                }
            }
        }
        if !events.is_empty() {
            self.handle_events(events);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroU64;

    fn players() -> Vec<PlayerId> {
        (1..=3)
            .map(|n| PlayerId::from(NonZeroU64::new(n).unwrap()))
            .collect()
    }

    #[test]
    fn round_ends_after_everyone_passes() {
        let p = players();
        let mut round = PriorityRound::new(p.iter().copied().collect());
        round.pass(p[0]).unwrap();
        round.pass(p[1]).unwrap();
        assert!(!round.has_all_passed());
        assert_eq!(round.holder(), Some(p[2]));
        round.pass(p[2]).unwrap();
        assert!(round.has_all_passed());
    }

    #[test]
    fn acting_resets_passes_and_keeps_priority() {
        let p = players();
        let mut round = PriorityRound::new(p.iter().copied().collect());
        round.pass(p[0]).unwrap();
        round.acted(p[1]);
        assert_eq!(round.holder(), Some(p[1]));
        round.pass(p[1]).unwrap();
        round.pass(p[2]).unwrap();
        assert!(!round.has_all_passed());
        round.pass(p[0]).unwrap();
        assert!(round.has_all_passed());
    }

    #[test]
    fn only_the_holder_may_pass() {
        let p = players();
        let mut round = PriorityRound::new(p.iter().copied().collect());
        assert_eq!(round.pass(p[1]), Err(MTGError::NoPriority(p[1])));
        round.retain(|player| player != p[0]);
        assert_eq!(round.holder(), Some(p[1]));
    }
}
