use common::entities::{CardId, PlayerId, TargetId};
use schemars::JsonSchema;
use serde::Serialize;
use thiserror::Error;

use crate::log::FeedEntry;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, JsonSchema)]
pub enum MTGError {
    #[error("{0} does not hold priority")]
    NoPriority(PlayerId),
    #[error("that can only be done at sorcery speed")]
    WrongTiming,
    #[error("no land plays remain this turn")]
    LandLimit,
    #[error("{0} is not in its owner's hand")]
    NotInHand(CardId),
    #[error("{0} can't be cast or activated right now")]
    CantActivate(CardId),
    #[error("the cost could not be paid")]
    CostNotPaid,
    #[error("the game is already over")]
    GameOver,
    #[error("there are no legal targets")]
    NoValidTargets,
    #[error("{0} is not a legal target")]
    IllegalTarget(TargetId),
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
    #[error("{0} disconnected")]
    ClientDisconnected(PlayerId),
    #[error("{0} kept sending invalid replies")]
    UnresponsiveClient(PlayerId),
    #[error("{0} does not exist")]
    PlayerDoesntExist(PlayerId),
}

impl MTGError {
    //Fatal errors abort the game, the rest reject a single action
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            MTGError::InvariantViolation(_)
                | MTGError::ClientDisconnected(_)
                | MTGError::UnresponsiveClient(_)
                | MTGError::PlayerDoesntExist(_)
        )
    }
}

#[derive(Debug, Clone, Error)]
#[error("game aborted: {error}")]
pub struct GameAborted {
    pub error: MTGError,
    pub recent_events: Vec<FeedEntry>,
}
