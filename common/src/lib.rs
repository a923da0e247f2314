pub mod ability;
pub mod card_entities;
pub mod cardtypes;
pub mod cost;
pub mod counters;
pub mod ent_maps;
pub mod entities;
pub mod hashset_obj;
pub mod mana;
pub mod spellabil;
pub mod steps;
pub mod token_attribute;
pub mod zones;
