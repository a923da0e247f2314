use schemars::JsonSchema;
use serde_derive::Deserialize;
use serde_derive::Serialize;
use strum_macros::EnumString;

use crate::hashset_obj::HashSetObj;

pub type Types = HashSetObj<Type>;
pub type Subtypes = HashSetObj<Subtype>;
pub type Supertypes = HashSetObj<Supertype>;
impl HashSetObj<Type> {
    pub fn is_creature(&self) -> bool {
        self.contains(&Type::Creature)
    }
    pub fn is_land(&self) -> bool {
        self.contains(&Type::Land)
    }
    pub fn is_instant(&self) -> bool {
        self.contains(&Type::Instant)
    }
    pub fn is_sorcery(&self) -> bool {
        self.contains(&Type::Sorcery)
    }
    pub fn is_artifact(&self) -> bool {
        self.contains(&Type::Artifact)
    }
    pub fn is_enchantment(&self) -> bool {
        self.contains(&Type::Enchantment)
    }
    pub fn is_planeswalker(&self) -> bool {
        self.contains(&Type::Planeswalker)
    }
    pub fn is_permanent(&self) -> bool {
        !self.is_instant() && !self.is_sorcery() && self.len() > 0
    }
}
#[derive(
    Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize, JsonSchema, EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum Type {
    Artifact,
    Enchantment,
    Planeswalker,
    Land,
    Creature,
    Instant,
    Sorcery,
}
#[derive(
    Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize, JsonSchema, EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum Supertype {
    Basic,
    World,
    Legendary,
    Snow,
}
#[derive(
    Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize, JsonSchema, EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum Subtype {
    //Creature types
    Angel,
    Bear,
    Beast,
    Bird,
    Cat,
    Dragon,
    Elf,
    Goblin,
    Human,
    Knight,
    Merfolk,
    Soldier,
    Spirit,
    Warrior,
    Wizard,
    Zombie,
    //Land types
    Plains,
    Island,
    Swamp,
    Mountain,
    Forest,
    //Artifact and enchantment types
    Aura,
    Equipment,
    //Planeswalker types
    Chandra,
    Jace,
    Liliana,
}
impl Subtype {
    pub fn is_planeswalker_type(self) -> bool {
        matches!(self, Subtype::Chandra | Subtype::Jace | Subtype::Liliana)
    }
    pub fn is_land_type(self) -> bool {
        matches!(
            self,
            Subtype::Plains | Subtype::Island | Subtype::Swamp | Subtype::Mountain | Subtype::Forest
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn types_parse_lowercase() {
        assert_eq!(Type::from_str("creature").unwrap(), Type::Creature);
        assert_eq!(Supertype::from_str("legendary").unwrap(), Supertype::Legendary);
        assert!(Subtype::from_str("Goblin").is_err());
    }

    #[test]
    fn spells_are_not_permanents() {
        let types: Types = [Type::Instant].into_iter().collect();
        assert!(!types.is_permanent());
        let types: Types = [Type::Artifact, Type::Creature].into_iter().collect();
        assert!(types.is_permanent());
    }
}
