use common::cost::Cost;
use common::entities::{CardId, PlayerId};
use common::zones::Zone;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CastingOption {
    pub source_card: CardId,
    pub zone: Zone,
    pub costs: Vec<Cost>,
    pub player: PlayerId,
    //False when the player can't currently produce enough mana,
    //the client may still pick it and have it rejected
    pub possible_to_take: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub enum Action {
    Cast(CastingOption),
    PlayLand(CardId),
    //Index into the abilities of the source after continuous effects
    ActivateAbility { source: CardId, index: usize },
}

impl Action {
    pub fn source(&self) -> CardId {
        match self {
            Action::Cast(option) => option.source_card,
            Action::PlayLand(land) => *land,
            Action::ActivateAbility { source, .. } => *source,
        }
    }
}

//How an action interacts with the current priority round
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionPriorityType {
    Pass,
    ManaAbilOrSpecialAction,
    Action,
}
