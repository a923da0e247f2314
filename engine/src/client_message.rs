use crate::actions::Action;
use crate::errors::MTGError;
use crate::game::GameOutcome;
use common::entities::{CardId, TargetId};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct AskSelectN<T> {
    pub ents: Vec<T>,
    pub min: usize, //inclusive
    pub max: usize, //inclusive
}
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct AskPairItem<T> {
    pub items: Vec<T>,
    pub min: usize, //inclusive
    pub max: usize, //inclusive
}

//Pairs each key with a selection of its items. The reply maps a key to
//the indices of the chosen items.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct AskPair<T> {
    pub pairs: HashMap<CardId, AskPairItem<T>>,
}
//The reply is a permutation of the indices, first placed first
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct AskOrder<T> {
    pub ents: Vec<T>,
}
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub enum Ask {
    Action(AskSelectN<Action>),
    Target(AskSelectN<TargetId>),
    Attackers(AskPair<TargetId>),
    Blockers(AskPair<CardId>),
    DamageOrder {
        attacker: CardId,
        blockers: AskOrder<CardId>,
    },
    TriggerOrder(AskOrder<CardId>),
    DiscardToHandSize(AskSelectN<CardId>),
    LegendRule(AskSelectN<CardId>),
}

impl Ask {
    pub fn selection_bounds(&self) -> Option<(usize, usize, usize)> {
        match self {
            Ask::Action(ask) => Some((ask.ents.len(), ask.min, ask.max)),
            Ask::Target(ask) => Some((ask.ents.len(), ask.min, ask.max)),
            Ask::DiscardToHandSize(ask) | Ask::LegendRule(ask) => {
                Some((ask.ents.len(), ask.min, ask.max))
            }
            _ => None,
        }
    }
    pub fn pair_bounds(&self) -> Option<HashMap<CardId, (usize, usize, usize)>> {
        fn bounds<T>(ask: &AskPair<T>) -> HashMap<CardId, (usize, usize, usize)> {
            ask.pairs
                .iter()
                .map(|(id, item)| (*id, (item.items.len(), item.min, item.max)))
                .collect()
        }
        match self {
            Ask::Attackers(ask) => Some(bounds(ask)),
            Ask::Blockers(ask) => Some(bounds(ask)),
            _ => None,
        }
    }
    pub fn order_len(&self) -> Option<usize> {
        match self {
            Ask::DamageOrder { blockers, .. } => Some(blockers.ents.len()),
            Ask::TriggerOrder(ask) => Some(ask.ents.len()),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Serialize, JsonSchema)]
pub enum Notification {
    Rejected(MTGError),
    GameOver(GameOutcome),
}

#[derive(Clone, Debug, Serialize, JsonSchema)]
pub enum ClientMessage {
    AskUser(Ask),
    Notify(Notification),
}

//What a client answered, before it is validated
#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
    Selection(Vec<usize>),
    Pairing(HashMap<CardId, Vec<usize>>),
    Malformed,
}
