use std::fmt;
use std::num::NonZeroU64;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde::{Deserializer, Serializer};

#[derive(
    Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Serialize, Deserialize, JsonSchema,
)]
pub struct PlayerId(NonZeroU64);
//A reference to a card, token, spell or ability on the stack.
//A new id is handed out every time an object changes zones.
#[derive(
    Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Serialize, Deserialize, JsonSchema,
)]
pub struct CardId(NonZeroU64);
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub enum TargetId {
    Player(PlayerId),
    Card(CardId),
}

//Players and cards occupy different numeric ranges, so a target
//serializes to a bare number and is disambiguated on the way back in.
pub const MIN_CARDID: u64 = 256;

impl serde::Serialize for TargetId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Player(player) => player.serialize(serializer),
            Self::Card(card) => card.serialize(serializer),
        }
    }
}

impl<'de> serde::Deserialize<'de> for TargetId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let val = u64::deserialize(deserializer)?;
        let v = NonZeroU64::try_from(val)
            .map_err(|_| serde::de::Error::custom("Value didn't fit in nonzero U64"))?;
        Ok(if v.get() < MIN_CARDID {
            TargetId::Player(PlayerId(v))
        } else {
            TargetId::Card(CardId(v))
        })
    }
}

impl schemars::JsonSchema for TargetId {
    fn schema_name() -> std::string::String {
        "TargetId".to_string()
    }
    fn json_schema(gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        <u64 as JsonSchema>::json_schema(gen)
    }
}

impl From<NonZeroU64> for PlayerId {
    fn from(x: NonZeroU64) -> Self {
        if x.get() >= MIN_CARDID {
            panic!("only {} players are supported", MIN_CARDID);
        }
        Self(x)
    }
}

impl From<NonZeroU64> for CardId {
    fn from(x: NonZeroU64) -> Self {
        if x.get() < MIN_CARDID {
            panic!("cardids must be >= {}", MIN_CARDID);
        }
        Self(x)
    }
}

impl From<PlayerId> for TargetId {
    fn from(x: PlayerId) -> Self {
        Self::Player(x)
    }
}

impl From<CardId> for TargetId {
    fn from(x: CardId) -> Self {
        Self::Card(x)
    }
}

impl TargetId {
    pub fn card(self) -> Option<CardId> {
        match self {
            Self::Card(card) => Some(card),
            Self::Player(_) => None,
        }
    }
    pub fn player(self) -> Option<PlayerId> {
        match self {
            Self::Player(player) => Some(player),
            Self::Card(_) => None,
        }
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player#{}", self.0)
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "card#{}", self.0)
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player(player) => player.fmt(f),
            Self::Card(card) => card.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_ids_round_trip_through_their_numeric_range() {
        let player = TargetId::from(PlayerId::from(NonZeroU64::new(3).unwrap()));
        let card = TargetId::from(CardId::from(NonZeroU64::new(MIN_CARDID + 4).unwrap()));
        let text = serde_json::to_string(&vec![player, card]).unwrap();
        assert_eq!(text, format!("[3,{}]", MIN_CARDID + 4));
        let back: Vec<TargetId> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, vec![player, card]);
    }
}
