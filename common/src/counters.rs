use enum_map::{Enum, EnumMap};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Enum)]
pub enum Counter {
    Plus1Plus1,
    Minus1Minus1,
    Loyalty,
    Poison,
}

//Counters on a permanent or a player
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Counters {
    counts: EnumMap<Counter, i64>,
}

impl Counters {
    pub fn get(&self, counter: Counter) -> i64 {
        self.counts[counter]
    }
    pub fn add(&mut self, counter: Counter, quantity: i64) {
        if quantity > 0 {
            self.counts[counter] += quantity;
        }
    }
    //Removes up to quantity counters, returns how many were removed
    pub fn remove(&mut self, counter: Counter, quantity: i64) -> i64 {
        let removed = quantity.clamp(0, self.counts[counter]);
        self.counts[counter] -= removed;
        removed
    }
    pub fn contains(&self, counter: Counter) -> bool {
        self.counts[counter] > 0
    }
    pub fn iter(&self) -> impl Iterator<Item = (Counter, i64)> + '_ {
        self.counts
            .iter()
            .filter(|(_, &count)| count > 0)
            .map(|(counter, &count)| (counter, count))
    }
}
