use crate::mana::ManaCostSymbol;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_derive::Serialize;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub enum Cost {
    Mana(ManaCostSymbol),
    Selftap,
    //Positive adds loyalty, negative removes it
    Loyalty(i64),
}
impl Cost {
    pub fn mana_symbols(costs: &[Cost]) -> Vec<ManaCostSymbol> {
        costs
            .iter()
            .filter_map(|cost| match cost {
                Cost::Mana(symbol) => Some(*symbol),
                _ => None,
            })
            .collect()
    }
}
