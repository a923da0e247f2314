use crate::client_message::{Ask, AskSelectN, Notification};
use crate::errors::{GameAborted, MTGError};
use crate::event::Event;
use crate::game::{Game, GameOutcome, GameResult};
use crate::log::FeedEvent;
use common::entities::{CardId, PlayerId};
use common::spellabil::ContDuration;
use common::steps::{Phase, Subphase, TURN_PHASES};
use log::{error, info, warn};

impl Game {
    //Plays the game to completion
    pub async fn run(&mut self) -> Result<GameResult, GameAborted> {
        match self.play().await {
            Ok(()) => Ok(self.result()),
            Err(error) => {
                error!("game aborted: {}", error);
                self.feed.commit();
                Err(GameAborted {
                    error,
                    recent_events: self.feed.recent(self.config.dump_length),
                })
            }
        }
    }
    async fn play(&mut self) -> Result<(), MTGError> {
        self.start_game();
        while self.outcome == GameOutcome::Ongoing {
            self.advance().await?;
        }
        self.end_game().await;
        Ok(())
    }
    pub fn start_game(&mut self) {
        let order: Vec<PlayerId> = self.turn_order.iter().copied().collect();
        let mut draws = Vec::new();
        for &player in &order {
            self.shuffle(player);
            for _ in 0..self.config.opening_hand {
                draws.push(Event::Draw { player });
            }
        }
        self.handle_events(draws);
        if let Some(&first) = order.first() {
            self.active_player = first;
        }
        info!("game started with {} players", order.len());
    }
    async fn end_game(&mut self) {
        info!("game over: {:?}", self.outcome);
        self.feed.push(FeedEvent::GameEnded(self.outcome));
        self.feed.commit();
        let players: Vec<PlayerId> = self.turn_order.iter().copied().collect();
        for player in players {
            if let Err(e) = self.notify(player, Notification::GameOver(self.outcome)).await {
                warn!("couldn't tell {} the game ended: {}", player, e);
            }
        }
    }

    //Moves the game to its next step, phase or turn
    pub async fn advance(&mut self) -> Result<(), MTGError> {
        if let Some(subphase) = self.subphases.pop_front() {
            self.subphase(subphase).await
        } else if let Some(phase) = self.phases.pop_front() {
            self.phase(phase).await
        } else if let Some(player) = self.extra_turns.pop_front() {
            self.turn(player, true);
            Ok(())
        } else {
            if self.turn_number > 0 {
                for _ in 0..self.turn_order.len() {
                    self.turn_order.rotate_left(1);
                    if self.is_playing(self.turn_order[0]) {
                        break;
                    }
                }
            }
            let player = self.turn_order[0];
            self.turn(player, false);
            Ok(())
        }
    }

    pub fn turn(&mut self, player: PlayerId, extra: bool) {
        self.active_player = player;
        self.turn_number += 1;
        self.feed.set_turn(self.turn_number);
        self.lands_played_this_turn = 0;
        self.land_play_limit = self.config.land_plays_per_turn;
        let ids: Vec<CardId> = self.cards.keys().collect();
        for id in ids {
            if let Some(card) = self.cards.get_mut(id) {
                card.loyalty_activated = false;
            }
        }
        self.phases.extend(TURN_PHASES);
        info!("turn {} begins for {}", self.turn_number, player);
        self.feed.push(FeedEvent::TurnBegan { player, extra });
    }

    pub async fn phase(&mut self, phase: Phase) -> Result<(), MTGError> {
        self.phase = Some(phase);
        self.subphase = None;
        info!("{:?} phase", phase);
        self.feed.push(FeedEvent::PhaseBegan(phase));
        self.subphases.extend(phase.subphases());
        if phase.is_main() {
            self.cycle_priority().await?;
        }
        self.drain_mana_pools();
        Ok(())
    }

    pub async fn subphase(&mut self, subphase: Subphase) -> Result<(), MTGError> {
        //The first strike damage step only exists if something in combat has first strike
        if subphase == Subphase::FirstStrikeDamage && !self.has_first_strike_combatant() {
            return Ok(());
        }
        self.subphase = Some(subphase);
        info!("{:?} step", subphase);
        self.feed.push(FeedEvent::StepBegan(subphase));
        if !matches!(subphase, Subphase::Untap | Subphase::Cleanup) {
            self.handle_event(Event::BeginStep { subphase });
        }
        match subphase {
            Subphase::Untap => {
                let perms = self.players_permanents(self.active_player);
                for &perm in &perms {
                    if let Some(card) = self.cards.get_mut(perm) {
                        card.etb_this_cycle = false;
                        card.controlled_since = Some(self.active_player);
                    }
                }
                self.handle_events(perms.into_iter().map(|ent| Event::Untap { ent }).collect());
                //No priority in untap
            }
            Subphase::Upkeep | Subphase::BeginCombat | Subphase::EndStep => {
                self.cycle_priority().await?
            }
            Subphase::Draw => {
                if !(self.turn_number == 1 && self.config.skip_first_draw) {
                    self.draw(self.active_player);
                }
                self.cycle_priority().await?
            }
            Subphase::Attackers => self.declare_attackers().await?,
            Subphase::Blockers => self.declare_blockers().await?,
            Subphase::FirstStrikeDamage => {
                self.combat_damage(true);
                self.cycle_priority().await?
            }
            Subphase::Damage => {
                self.combat_damage(false);
                self.cycle_priority().await?
            }
            Subphase::EndCombat => {
                self.cycle_priority().await?;
                self.combat = None;
                self.cont_effects
                    .retain(|effect| effect.duration != ContDuration::EndOfCombat);
                self.refresh_view();
            }
            Subphase::Cleanup => self.cleanup().await?,
        }
        self.drain_mana_pools();
        Ok(())
    }

    async fn cleanup(&mut self) -> Result<(), MTGError> {
        loop {
            self.discard_to_hand_size().await?;
            let perms = self.battlefield.clone();
            for perm in perms {
                if let Some(card) = self.cards.get_mut(perm) {
                    card.damaged = 0;
                    card.deathtouched = false;
                }
            }
            self.cont_effects
                .retain(|effect| effect.duration != ContDuration::EndOfTurn);
            self.refresh_view();
            //Players only get priority in cleanup if something happened,
            //and then there is another cleanup step
            let corrections = self.state_based_actions().await?;
            if corrections.is_empty() && self.pending_triggers.is_empty() {
                return Ok(());
            }
            if self.outcome != GameOutcome::Ongoing {
                return Ok(());
            }
            self.cycle_priority().await?;
        }
    }

    async fn discard_to_hand_size(&mut self) -> Result<(), MTGError> {
        let player = self.active_player;
        let (mut hand, max_handsize) = match self.players.get(player) {
            Some(pl) => (pl.hand.iter().copied().collect::<Vec<_>>(), pl.max_handsize),
            None => return Err(MTGError::PlayerDoesntExist(player)),
        };
        if hand.len() <= max_handsize {
            return Ok(());
        }
        hand.sort();
        let diff = hand.len() - max_handsize;
        let ask = AskSelectN {
            ents: hand.clone(),
            min: diff,
            max: diff,
        };
        let choice = self.ask_selection(player, Ask::DiscardToHandSize(ask)).await?;
        let to_discard = choice.into_iter().map(|i| hand[i]).collect();
        self.discard(player, to_discard);
        Ok(())
    }

    fn drain_mana_pools(&mut self) {
        let players: Vec<PlayerId> = self.turn_order.iter().copied().collect();
        for player in players {
            if let Some(pl) = self.players.get_mut(player) {
                pl.mana_pool.empty();
            }
        }
    }
}
