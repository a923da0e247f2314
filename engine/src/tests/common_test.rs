use crate::actions::Action;
use crate::client_message::{AskPair, AskSelectN};
use crate::config::GameConfig;
use crate::game::build_game::GameBuilder;
use crate::game::Game;
use crate::player::{MockClient, PlayerCon};
use anyhow::Result;
use common::card_entities::{CardBuilder, CardFace};
use common::cardtypes::{Subtype, Supertype};
use common::entities::{CardId, PlayerId, TargetId};
use common::mana::{Color, ManaCostSymbol};
use common::spellabil::{Clause, ClauseEffect, Constraint, KeywordAbility};
use common::steps::Phase;
use common::zones::Zone;
use std::collections::{HashMap, VecDeque};

//What a scripted client does the next time it gets priority
#[derive(Clone, Debug)]
pub enum Choice {
    Cast(&'static str),
    Activate(&'static str),
    PlayLand(&'static str),
    Pass,
}

#[derive(Clone, Debug)]
pub enum Aim {
    Me,
    Opponent,
    Named(&'static str),
}

//Plays from a script, then passes everything.
//Cards are picked by name since ids change as they move.
#[derive(Default)]
pub struct ScriptedClient {
    choices: VecDeque<Choice>,
    aims: VecDeque<Aim>,
    attackers: Vec<&'static str>,
    blocks: Vec<(&'static str, &'static str)>,
    invalid: bool,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn choose(mut self, choice: Choice) -> Self {
        self.choices.push_back(choice);
        self
    }
    pub fn aim(mut self, aim: Aim) -> Self {
        self.aims.push_back(aim);
        self
    }
    pub fn attack_with(mut self, name: &'static str) -> Self {
        self.attackers.push(name);
        self
    }
    pub fn block(mut self, blocker: &'static str, attacker: &'static str) -> Self {
        self.blocks.push((blocker, attacker));
        self
    }
    //Answers every priority ask out of range
    pub fn invalid_replies(mut self) -> Self {
        self.invalid = true;
        self
    }
}

fn matches_choice(game: &Game, action: &Action, choice: &Choice) -> bool {
    match (choice, action) {
        (Choice::Cast(name), Action::Cast(_))
        | (Choice::PlayLand(name), Action::PlayLand(_))
        | (Choice::Activate(name), Action::ActivateAbility { .. }) => {
            game.name(action.source()) == *name
        }
        _ => false,
    }
}

fn aims_at(game: &Game, player: PlayerId, target: TargetId, aim: &Aim) -> bool {
    match (aim, target) {
        (Aim::Me, TargetId::Player(pl)) => pl == player,
        (Aim::Opponent, TargetId::Player(pl)) => pl != player,
        (Aim::Named(name), TargetId::Card(card)) => game.name(card) == *name,
        _ => false,
    }
}

impl MockClient for ScriptedClient {
    fn select_action(
        &mut self,
        game: &Game,
        _player: PlayerId,
        ask: &AskSelectN<Action>,
    ) -> Vec<usize> {
        if self.invalid {
            return vec![ask.ents.len()];
        }
        let Some(choice) = self.choices.pop_front() else {
            return Vec::new();
        };
        ask.ents
            .iter()
            .position(|action| matches_choice(game, action, &choice))
            .into_iter()
            .collect()
    }
    fn select_targets(
        &mut self,
        game: &Game,
        player: PlayerId,
        ask: &AskSelectN<TargetId>,
    ) -> Vec<usize> {
        let found = self.aims.pop_front().and_then(|aim| {
            ask.ents
                .iter()
                .position(|&target| aims_at(game, player, target, &aim))
        });
        match found {
            Some(i) => vec![i],
            None => (0..ask.min).collect(),
        }
    }
    fn select_attackers(
        &mut self,
        game: &Game,
        _player: PlayerId,
        ask: &AskPair<TargetId>,
    ) -> HashMap<CardId, Vec<usize>> {
        ask.pairs
            .keys()
            .filter(|&&attacker| {
                let name = game.name(attacker);
                self.attackers.iter().any(|&wanted| wanted == name)
            })
            .map(|&attacker| (attacker, vec![0]))
            .collect()
    }
    fn select_blockers(
        &mut self,
        game: &Game,
        _player: PlayerId,
        ask: &AskPair<CardId>,
    ) -> HashMap<CardId, Vec<usize>> {
        let mut res = HashMap::new();
        for (&blocker, item) in &ask.pairs {
            let name = game.name(blocker);
            for &(blocker_name, attacker_name) in &self.blocks {
                if blocker_name != name {
                    continue;
                }
                if let Some(i) = item
                    .items
                    .iter()
                    .position(|&attacker| game.name(attacker) == attacker_name)
                {
                    res.insert(blocker, vec![i]);
                }
            }
        }
        res
    }
}

pub fn test_config() -> GameConfig {
    GameConfig {
        seed: Some(7),
        ..Default::default()
    }
}

pub fn game_with_libraries(
    p1: impl MockClient + 'static,
    p2: impl MockClient + 'static,
    library: usize,
) -> Result<(Game, PlayerId, PlayerId)> {
    let deck = vec![wastes(); library];
    let mut builder = GameBuilder::new().with_config(test_config());
    let p1 = builder.add_player("p1", &deck, PlayerCon::new_mock(p1))?;
    let p2 = builder.add_player("p2", &deck, PlayerCon::new_mock(p2))?;
    Ok((builder.build()?, p1, p2))
}

pub fn two_player_game(
    p1: impl MockClient + 'static,
    p2: impl MockClient + 'static,
) -> Result<(Game, PlayerId, PlayerId)> {
    game_with_libraries(p1, p2, 20)
}

pub fn passing_game() -> Result<(Game, PlayerId, PlayerId)> {
    two_player_game(ScriptedClient::new(), ScriptedClient::new())
}

//Puts the game in a main phase of the player's turn
pub fn main_phase(game: &mut Game, player: PlayerId) {
    game.active_player = player;
    game.turn_number = 1;
    game.phase = Some(Phase::FirstMain);
    game.subphase = None;
}

pub fn add_mana(game: &mut Game, player: PlayerId, color: Color, amount: u32) {
    if let Some(pl) = game.players.get_mut(player) {
        pl.mana_pool.add(color, amount);
    }
}

pub fn cards_named(game: &Game, name: &str) -> Vec<CardId> {
    let mut res: Vec<CardId> = game
        .cards_and_zones()
        .into_iter()
        .map(|(id, _)| id)
        .filter(|&id| game.name(id) == name)
        .collect();
    res.sort();
    res
}

pub fn on_battlefield(game: &Game, name: &str) -> Vec<CardId> {
    game.battlefield
        .iter()
        .copied()
        .filter(|&id| game.name(id) == name)
        .collect()
}

pub fn life(game: &Game, player: PlayerId) -> i64 {
    game.players.get(player).map_or(0, |pl| pl.life)
}

pub fn graveyard_names(game: &Game, player: PlayerId) -> Vec<String> {
    game.players
        .get(player)
        .map(|pl| pl.graveyard.iter().map(|&id| game.name(id)).collect())
        .unwrap_or_default()
}

pub fn power_toughness(game: &Game, id: CardId) -> Option<(i64, i64)> {
    game.characteristics(id)
        .and_then(|view| view.face.pt.as_ref())
        .map(|pt| (pt.power, pt.toughness))
}

pub fn wastes() -> CardFace {
    CardBuilder::new("Wastes")
        .land()
        .supertype(Supertype::Basic)
        .build()
}

pub fn mountain() -> CardFace {
    CardBuilder::new("Mountain")
        .land()
        .supertype(Supertype::Basic)
        .subtype(Subtype::Mountain)
        .build()
}

pub fn bear() -> CardFace {
    CardBuilder::new("Grizzly Bears")
        .creature(2, 2)
        .subtype(Subtype::Bear)
        .cost(&[ManaCostSymbol::Generic, ManaCostSymbol::Green])
        .build()
}

pub fn hill_giant() -> CardFace {
    CardBuilder::new("Hill Giant")
        .creature(3, 3)
        .cost(&[
            ManaCostSymbol::Generic,
            ManaCostSymbol::Generic,
            ManaCostSymbol::Generic,
            ManaCostSymbol::Red,
        ])
        .build()
}

pub fn creature_with(name: &str, power: i64, toughness: i64, keyword: KeywordAbility) -> CardFace {
    CardBuilder::new(name)
        .creature(power, toughness)
        .keyword(keyword)
        .build()
}

pub fn shock() -> CardFace {
    CardBuilder::new("Shock")
        .instant()
        .cost(&[ManaCostSymbol::Red])
        .effect(Clause::target(
            ClauseEffect::DealDamage(2),
            vec![Constraint::any_target()],
        ))
        .build()
}

pub fn counterspell() -> CardFace {
    CardBuilder::new("Counterspell")
        .instant()
        .cost(&[ManaCostSymbol::Blue, ManaCostSymbol::Blue])
        .effect(Clause::target(
            ClauseEffect::CounterSpell,
            vec![Constraint::InZone(Zone::Stack)],
        ))
        .build()
}
