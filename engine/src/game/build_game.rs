use crate::config::GameConfig;
use crate::game::layers::View;
use crate::game::stack::Stack;
use crate::game::{Cards, Game, GameOutcome, Players};
use crate::log::EventFeed;
use crate::player::{Player, PlayerCon};
use anyhow::{bail, Result};
use common::card_entities::{CardEnt, CardFace};
use common::entities::{PlayerId, MIN_CARDID};
use std::collections::VecDeque;

pub struct GameBuilder {
    players: Players,
    cards: Cards,
    turn_order: VecDeque<PlayerId>,
    config: GameConfig,
}

impl Default for GameBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GameBuilder {
    pub fn new() -> Self {
        let mut cards = Cards::new();
        cards.skip_count(MIN_CARDID); //make sure they don't overlap with players
        GameBuilder {
            players: Players::new(),
            cards,
            turn_order: VecDeque::new(),
            config: GameConfig::default(),
        }
    }
    pub fn with_config(mut self, config: GameConfig) -> Self {
        self.config = config;
        self
    }
    //Players take turns in the order they are added.
    //The deck becomes the player's library, top card last.
    pub fn add_player(
        &mut self,
        name: &str,
        deck: &[CardFace],
        player_con: PlayerCon,
    ) -> Result<PlayerId> {
        if self.players.len() as u64 + 1 >= MIN_CARDID {
            bail!("at most {} players are supported", MIN_CARDID - 1);
        }
        let player = Player::new(
            name,
            self.config.starting_life,
            self.config.max_hand_size,
            player_con,
        );
        let (player_id, _) = self.players.insert(player);
        let mut library = Vec::with_capacity(deck.len());
        for face in deck {
            let (card_id, _card) = self.cards.insert(CardEnt::new(face.clone(), player_id));
            library.push(card_id);
        }
        if let Some(player) = self.players.get_mut(player_id) {
            player.library = library;
        }
        self.turn_order.push_back(player_id);
        Ok(player_id)
    }
    pub fn build(self) -> Result<Game> {
        if self.turn_order.len() < 2 {
            bail!("Game needs at least two players in initialization")
        };
        let start = self.turn_order[0];
        let mut game = Game {
            players: self.players,
            cards: self.cards,
            battlefield: Vec::new(),
            exile: Vec::new(),
            command: Vec::new(),
            stack: Stack::default(),
            turn_order: self.turn_order,
            extra_turns: VecDeque::new(),
            phases: VecDeque::new(),
            subphases: VecDeque::new(),
            phase: None,
            subphase: None,
            outcome: GameOutcome::Ongoing,
            losers: Vec::new(),
            lands_played_this_turn: 0,
            land_play_limit: self.config.land_plays_per_turn,
            priority: None,
            active_player: start,
            turn_number: 0,
            cont_effects: Vec::new(),
            pending_triggers: Vec::new(),
            registrations: Vec::new(),
            combat: None,
            feed: EventFeed::new(self.config.feed_capacity),
            view: View::new(),
            timestamp: 0,
            backup: None,
            rng: self.config.rng(),
            config: self.config,
        };
        game.refresh_view();
        Ok(game)
    }
}
