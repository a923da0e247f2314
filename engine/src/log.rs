use common::entities::{CardId, PlayerId, TargetId};
use common::steps::{Phase, Subphase};
use common::zones::Zone;
use schemars::JsonSchema;
use serde::Serialize;
use tokio::sync::broadcast;

use crate::actions::Action;
use crate::errors::MTGError;
use crate::game::state_based::{LoseReason, StateBasedAction};
use crate::game::GameOutcome;

//Everything an observer of the game can see happen
#[derive(Clone, Debug, PartialEq, Serialize, JsonSchema)]
pub enum FeedEvent {
    TurnBegan {
        player: PlayerId,
        extra: bool,
    },
    PhaseBegan(Phase),
    StepBegan(Subphase),
    PriorityGiven(PlayerId),
    Passed(PlayerId),
    ActionTaken {
        player: PlayerId,
        action: Action,
    },
    ActionRejected {
        player: PlayerId,
        error: MTGError,
    },
    Cast {
        player: PlayerId,
        spell: CardId,
        name: String,
    },
    Activated {
        player: PlayerId,
        ability: CardId,
        source: CardId,
    },
    LandPlayed {
        player: PlayerId,
        land: CardId,
    },
    TriggerPlaced {
        ability: CardId,
        source: CardId,
        controller: PlayerId,
    },
    TriggerRemoved {
        source: CardId,
        name: String,
    },
    Resolved {
        entry: CardId,
        name: String,
    },
    Fizzled {
        entry: CardId,
        name: String,
    },
    Countered {
        entry: CardId,
        name: String,
    },
    ZoneMoved {
        old: CardId,
        new: Option<CardId>,
        name: String,
        origin: Option<Zone>,
        dest: Zone,
    },
    Damage {
        source: CardId,
        target: TargetId,
        amount: i64,
        combat: bool,
    },
    LifeChanged {
        player: PlayerId,
        life: i64,
    },
    AttackersDeclared(Vec<(CardId, TargetId)>),
    //Pairs of (blocker, attacker)
    BlockersDeclared(Vec<(CardId, CardId)>),
    StateBasedAction(StateBasedAction),
    PlayerLost {
        player: PlayerId,
        reason: LoseReason,
    },
    GameEnded(GameOutcome),
}

#[derive(Clone, Debug, PartialEq, Serialize, JsonSchema)]
pub struct FeedEntry {
    pub seq: u64,
    pub turn: u32,
    pub event: FeedEvent,
}

//Where the feed stood when the game was backed up
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeedMark {
    len: usize,
    published: usize,
    turn: u32,
}

//An ordered log of the game. Entries are recorded as they happen
//but only broadcast once committed, so subscribers never see the
//entries of an action that was rolled back.
#[derive(Clone, Debug)]
pub struct EventFeed {
    history: Vec<FeedEntry>,
    published: usize,
    turn: u32,
    sender: broadcast::Sender<FeedEntry>,
}

impl EventFeed {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            history: Vec::new(),
            published: 0,
            turn: 0,
            sender,
        }
    }
    pub fn push(&mut self, event: FeedEvent) {
        let entry = FeedEntry {
            seq: self.history.len() as u64,
            turn: self.turn,
            event,
        };
        self.history.push(entry);
    }
    pub fn set_turn(&mut self, turn: u32) {
        self.turn = turn;
    }
    //Publishes every entry recorded since the last commit
    pub fn commit(&mut self) {
        for entry in &self.history[self.published..] {
            //Having no subscribers isn't an error
            let _ = self.sender.send(entry.clone());
        }
        self.published = self.history.len();
    }
    pub fn subscribe(&self) -> broadcast::Receiver<FeedEntry> {
        self.sender.subscribe()
    }
    pub fn history(&self) -> &[FeedEntry] {
        &self.history
    }
    pub fn events(&self) -> impl Iterator<Item = &FeedEvent> {
        self.history.iter().map(|entry| &entry.event)
    }
    pub fn len(&self) -> usize {
        self.history.len()
    }
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
    pub fn mark(&self) -> FeedMark {
        FeedMark {
            len: self.history.len(),
            published: self.published,
            turn: self.turn,
        }
    }
    //Drops everything recorded after the mark was taken
    pub fn rollback(&mut self, mark: FeedMark) {
        self.history.truncate(mark.len);
        self.published = mark.published;
        self.turn = mark.turn;
    }
    //A feed on the same channel with none of the history
    pub fn detached(&self) -> Self {
        Self {
            history: Vec::new(),
            published: 0,
            turn: self.turn,
            sender: self.sender.clone(),
        }
    }
    pub fn recent(&self, n: usize) -> Vec<FeedEntry> {
        let start = self.history.len().saturating_sub(n);
        self.history[start..].to_vec()
    }
}
