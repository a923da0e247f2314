use crate::{
    ability::Ability,
    cardtypes::{Subtype, Subtypes, Supertype, Supertypes, Type, Types},
    cost::Cost,
    counters::Counters,
    entities::{CardId, PlayerId, MIN_CARDID},
    hashset_obj::HashSetObj,
    mana::{Color, ManaCostSymbol},
    spellabil::{Clause, KeywordAbility},
    token_attribute::TokenAttribute,
};
use derivative::*;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_derive::Serialize;
use std::num::NonZeroU64;

#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema, Debug, Default)]
pub enum EntType {
    #[default]
    RealCard,
    TokenCard,
    ActivatedAbility,
    TriggeredAbility,
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct PT {
    pub power: i64,
    pub toughness: i64,
}

//The printed characteristics of a card or token.
//Abilities on the stack carry the face of their source.
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct CardFace {
    pub name: String,
    pub types: Types,
    pub subtypes: Subtypes,
    pub supertypes: Supertypes,
    pub colors: HashSetObj<Color>,
    pub costs: Vec<Cost>, //Casting costs
    pub pt: Option<PT>,
    pub loyalty: Option<i64>,
    pub abilities: Vec<Ability>,
    pub effect: Vec<Clause>, //Effect of an instant or sorcery, or the attach clause of an aura
}

impl CardFace {
    pub fn has_keyword(&self, keyword: KeywordAbility) -> bool {
        self.abilities
            .iter()
            .any(|ability| ability.keyword() == Some(keyword))
    }
    pub fn from_token_attributes(attributes: &[TokenAttribute]) -> Self {
        let mut face = CardFace::default();
        for attribute in attributes.iter().cloned() {
            match attribute {
                TokenAttribute::Name(name) => face.name = name,
                TokenAttribute::PT(pt) => face.pt = Some(pt),
                TokenAttribute::Type(t) => {
                    face.types.insert(t);
                }
                TokenAttribute::Subtype(t) => {
                    face.subtypes.insert(t);
                }
                TokenAttribute::HasColor(color) => {
                    face.colors.insert(color);
                }
                TokenAttribute::Ability(abil) => face.abilities.push(abil),
            }
        }
        if face.name.is_empty() {
            let mut list_types: Vec<String> =
                face.subtypes.iter().map(|t| format!("{:?}", t)).collect();
            list_types.sort();
            face.name = list_types.join(" ");
        }
        face
    }
}

fn unowned() -> PlayerId {
    PlayerId::from(NonZeroU64::new(MIN_CARDID - 1).unwrap_or(NonZeroU64::MIN))
}

#[derive(Derivative)]
#[derivative(Default, Debug)]
#[derive(Serialize, Deserialize, Clone)]
//Holds a card, token, or triggered/activated ability
pub struct CardEnt {
    pub printed: CardFace,
    #[derivative(Default(value = "unowned()"))]
    pub owner: PlayerId,
    controller: Option<PlayerId>,
    pub ent_type: EntType,
    pub tapped: bool,
    pub damaged: i64,
    pub deathtouched: bool, //Was this dealt damage by a source with deathtouch since the last check
    pub counters: Counters,
    pub etb_this_cycle: bool, //Summoning sickness
    //Who controlled this permanent at the start of their most recent turn
    pub controlled_since: Option<PlayerId>,
    pub effect: Vec<Clause>,  //Effect with targets chosen, for a spell or ability on the stack
    pub source_of_ability: Option<CardId>, //Holds the entity
    //that produced this triggered or activated ability
    pub attached_to: Option<CardId>,
    pub timestamp: u64,
    pub cast: bool,
    pub loyalty_activated: bool,
}
impl CardEnt {
    pub fn new(printed: CardFace, owner: PlayerId) -> Self {
        Self {
            printed,
            owner,
            ..Default::default()
        }
    }
    pub fn name(&self) -> &str {
        &self.printed.name
    }
    pub fn get_controller(&self) -> PlayerId {
        if let Some(pl) = self.controller {
            pl
        } else {
            self.owner
        }
    }
    pub fn set_controller(&mut self, controller: Option<PlayerId>) {
        self.controller = controller;
    }
    pub fn is_ability(&self) -> bool {
        matches!(
            self.ent_type,
            EntType::ActivatedAbility | EntType::TriggeredAbility
        )
    }
    pub fn is_token(&self) -> bool {
        self.ent_type == EntType::TokenCard
    }
}

//Builds the pre-compiled face of a card
#[derive(Clone, Debug, Default)]
pub struct CardBuilder {
    face: CardFace,
}

impl CardBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            face: CardFace {
                name: name.to_owned(),
                ..Default::default()
            },
        }
    }
    pub fn card_type(mut self, t: Type) -> Self {
        self.face.types.insert(t);
        self
    }
    pub fn creature(self, power: i64, toughness: i64) -> Self {
        self.card_type(Type::Creature).pt(power, toughness)
    }
    pub fn pt(mut self, power: i64, toughness: i64) -> Self {
        self.face.pt = Some(PT { power, toughness });
        self
    }
    pub fn instant(self) -> Self {
        self.card_type(Type::Instant)
    }
    pub fn sorcery(self) -> Self {
        self.card_type(Type::Sorcery)
    }
    pub fn artifact(self) -> Self {
        self.card_type(Type::Artifact)
    }
    pub fn enchantment(self) -> Self {
        self.card_type(Type::Enchantment)
    }
    pub fn land(self) -> Self {
        self.card_type(Type::Land)
    }
    pub fn planeswalker(mut self, loyalty: i64) -> Self {
        self.face.loyalty = Some(loyalty);
        self.card_type(Type::Planeswalker)
    }
    pub fn subtype(mut self, subtype: Subtype) -> Self {
        self.face.subtypes.insert(subtype);
        self
    }
    pub fn supertype(mut self, supertype: Supertype) -> Self {
        self.face.supertypes.insert(supertype);
        self
    }
    pub fn color(mut self, color: Color) -> Self {
        self.face.colors.insert(color);
        self
    }
    pub fn cost(mut self, symbols: &[ManaCostSymbol]) -> Self {
        for &symbol in symbols {
            self.face.costs.push(Cost::Mana(symbol));
            if let Some(color) = symbol.color() {
                self.face.colors.insert(color);
            }
        }
        self
    }
    pub fn keyword(self, keyword: KeywordAbility) -> Self {
        self.ability(Ability::from_keyword(keyword))
    }
    pub fn ability(mut self, ability: Ability) -> Self {
        self.face.abilities.push(ability);
        self
    }
    pub fn effect(mut self, clause: Clause) -> Self {
        self.face.effect.push(clause);
        self
    }
    pub fn build(self) -> CardFace {
        self.face
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cardtypes::Subtype;

    #[test]
    fn builder_derives_colors_from_cost() {
        let face = CardBuilder::new("Goblin Piker")
            .creature(2, 1)
            .subtype(Subtype::Goblin)
            .cost(&[ManaCostSymbol::Generic, ManaCostSymbol::Red])
            .build();
        assert!(face.colors.contains(&Color::Red));
        assert_eq!(face.colors.len(), 1);
        assert_eq!(face.pt, Some(PT { power: 2, toughness: 1 }));
        assert!(face.types.is_creature());
    }

    #[test]
    fn token_name_defaults_to_subtypes() {
        let face = CardFace::from_token_attributes(&[
            TokenAttribute::Type(Type::Creature),
            TokenAttribute::Subtype(Subtype::Soldier),
            TokenAttribute::PT(PT {
                power: 1,
                toughness: 1,
            }),
        ]);
        assert_eq!(face.name, "Soldier");
        let ent = CardEnt::new(face, PlayerId::from(NonZeroU64::MIN));
        assert_eq!(ent.get_controller(), ent.owner);
    }
}
