use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct GameConfig {
    pub starting_life: i64,
    pub poison_threshold: i64,
    pub opening_hand: usize,
    pub max_hand_size: usize,
    pub land_plays_per_turn: u32,
    pub skip_first_draw: bool,
    //State based actions loop at most this many times before the game is aborted
    pub sba_iteration_cap: usize,
    //Rejected actions before a priority window counts as a pass
    pub max_rejections: usize,
    //Malformed replies before a client is considered unresponsive
    pub max_invalid_replies: usize,
    pub feed_capacity: usize,
    pub dump_length: usize,
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_life: 20,
            poison_threshold: 10,
            opening_hand: 7,
            max_hand_size: 7,
            land_plays_per_turn: 1,
            skip_first_draw: true,
            sba_iteration_cap: 100,
            max_rejections: 3,
            max_invalid_replies: 5,
            feed_capacity: 1024,
            dump_length: 20,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config = GameConfig::from_json(r#"{"starting_life": 30, "seed": 7}"#).unwrap();
        assert_eq!(config.starting_life, 30);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.opening_hand, 7);
        assert_eq!(config.poison_threshold, 10);
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(GameConfig::from_json(r#"{"starting_life": "lots"}"#).is_err());
    }
}
