use enum_map::{Enum, EnumMap};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_derive::Serialize;
use strum::EnumString;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Enum, JsonSchema, EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum Color {
    White,
    Blue,
    Black,
    Red,
    Green,
    Colorless,
}

//This ordering is significant,
//because we want to sort generic mana to the bottom for
//fulfilling with mana symbols last
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash, PartialOrd, Ord, JsonSchema,
)]
pub enum ManaCostSymbol {
    White,
    Blue,
    Black,
    Red,
    Green,
    Colorless,
    Generic,
}
impl ManaCostSymbol {
    pub fn spendable_colors(self) -> Vec<Color> {
        match self {
            Self::White => vec![Color::White],
            Self::Blue => vec![Color::Blue],
            Self::Black => vec![Color::Black],
            Self::Red => vec![Color::Red],
            Self::Green => vec![Color::Green],
            Self::Colorless => vec![Color::Colorless],
            //Colorless first so colored mana is saved for later costs
            Self::Generic => vec![
                Color::Colorless,
                Color::White,
                Color::Blue,
                Color::Black,
                Color::Red,
                Color::Green,
            ],
        }
    }
    //The mana this symbol produces when an ability adds it
    pub fn produced_color(self) -> Color {
        match self {
            Self::White => Color::White,
            Self::Blue => Color::Blue,
            Self::Black => Color::Black,
            Self::Red => Color::Red,
            Self::Green => Color::Green,
            Self::Colorless | Self::Generic => Color::Colorless,
        }
    }
    pub fn color(self) -> Option<Color> {
        match self {
            Self::Colorless | Self::Generic => None,
            other => Some(other.produced_color()),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ManaPool {
    mana: EnumMap<Color, u32>,
}

impl ManaPool {
    pub fn add(&mut self, color: Color, amount: u32) {
        self.mana[color] += amount;
    }
    pub fn add_symbol(&mut self, symbol: ManaCostSymbol) {
        self.add(symbol.produced_color(), 1);
    }
    pub fn amount(&self, color: Color) -> u32 {
        self.mana[color]
    }
    pub fn total(&self) -> u32 {
        self.mana.values().sum()
    }
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
    pub fn can_pay(&self, costs: &[ManaCostSymbol]) -> bool {
        self.clone().pay(costs).is_ok()
    }
    //Pays all of the symbols or none of them.
    //On failure the first unpayable symbol is returned.
    pub fn pay(&mut self, costs: &[ManaCostSymbol]) -> Result<Vec<Color>, ManaCostSymbol> {
        let mut sorted = costs.to_vec();
        sorted.sort();
        let mut remaining = self.mana.clone();
        let mut spent = Vec::with_capacity(sorted.len());
        for symbol in sorted {
            let color = symbol
                .spendable_colors()
                .into_iter()
                .find(|color| remaining[*color] > 0)
                .ok_or(symbol)?;
            remaining[color] -= 1;
            spent.push(color);
        }
        self.mana = remaining;
        Ok(spent)
    }
    pub fn empty(&mut self) {
        self.mana = EnumMap::default();
    }
}
