use crate::ability::Ability;
use crate::card_entities::PT;
use crate::cardtypes::{Subtype, Type};
use crate::counters::Counter;
use crate::entities::{CardId, PlayerId, TargetId};
use crate::mana::{Color, ManaCostSymbol};
use crate::token_attribute::TokenAttribute;
use crate::zones::Zone;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_derive::Serialize;
use strum_macros::{EnumIter, EnumString};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum KeywordAbility {
    FirstStrike,
    DoubleStrike,
    Deathtouch,
    Defender,
    Flash,
    Flying,
    Haste,
    Hexproof,
    Indestructible,
    Lifelink,
    Menace,
    Reach,
    Shroud,
    Trample,
    Vigilance,
}

//Restricts what a clause, trigger or continuous effect can touch.
//Constraints are checked against a candidate relative to a source object.
#[derive(Clone, Serialize, Deserialize, JsonSchema, Debug, PartialEq)]
pub enum Constraint {
    Player,
    Opponent,
    CardType(Type),
    Subtype(Subtype),
    HasKeyword(KeywordAbility),
    HasCounter(Counter),
    HasColor(Color),
    IsTapped,
    IsUntapped,
    YouControl,
    OpponentControls,
    Other,
    IsCardname,
    InZone(Zone),
    Attacking,
    Not(Box<Constraint>),
    And(Vec<Constraint>),
    Or(Vec<Constraint>),
}

impl Constraint {
    //Does this constraint name a zone anywhere inside it?
    //Cards are only considered off the battlefield when one does.
    pub fn mentions_zone(&self) -> bool {
        match self {
            Constraint::InZone(_) => true,
            Constraint::Not(inner) => inner.mentions_zone(),
            Constraint::And(inner) | Constraint::Or(inner) => {
                inner.iter().any(|c| c.mentions_zone())
            }
            _ => false,
        }
    }
    pub fn replace_subtype(&mut self, from: Subtype, to: Subtype) {
        match self {
            Constraint::Subtype(subtype) if *subtype == from => *subtype = to,
            Constraint::Not(inner) => inner.replace_subtype(from, to),
            Constraint::And(inner) | Constraint::Or(inner) => {
                for c in inner {
                    c.replace_subtype(from, to);
                }
            }
            _ => {}
        }
    }
    pub fn any_target() -> Self {
        Constraint::Or(vec![
            Constraint::Player,
            Constraint::CardType(Type::Creature),
            Constraint::CardType(Type::Planeswalker),
        ])
    }
}

#[derive(Clone, Serialize, Deserialize, JsonSchema, Debug, PartialEq)]
pub struct Clause {
    pub effect: ClauseEffect,
    pub affected: Affected,
    pub constraints: Vec<Constraint>,
}

impl Clause {
    pub fn new(effect: ClauseEffect, affected: Affected) -> Self {
        Self {
            effect,
            affected,
            constraints: Vec::new(),
        }
    }
    pub fn target(effect: ClauseEffect, constraints: Vec<Constraint>) -> Self {
        Self {
            effect,
            affected: Affected::Target(None),
            constraints,
        }
    }
    pub fn is_targeted(&self) -> bool {
        matches!(self.affected, Affected::Target(_))
    }
    pub fn replace_subtype(&mut self, from: Subtype, to: Subtype) {
        for constraint in &mut self.constraints {
            constraint.replace_subtype(from, to);
        }
        match &mut self.effect {
            ClauseEffect::Compound(clauses) => {
                for clause in clauses {
                    clause.replace_subtype(from, to);
                }
            }
            ClauseEffect::SetTargetController(clause) => clause.replace_subtype(from, to),
            _ => {}
        }
    }
}

#[derive(Clone, Serialize, Deserialize, JsonSchema, Debug, PartialEq)]
pub enum Affected {
    Controller,
    Cardname,
    Target(Option<TargetId>),
    ManuallySet(Vec<TargetId>),
    All,
    AttachedTo,
    EachOpponent,
}

#[derive(Clone, Serialize, Deserialize, JsonSchema, Debug, PartialEq)]
pub enum ClauseEffect {
    Destroy,
    Exile,
    DealDamage(i64),
    AddMana(Vec<ManaCostSymbol>),
    GainLife(i64),
    LoseLife(i64),
    DrawCard,
    //Subclauses share the affected objects of the parent clause
    Compound(Vec<Clause>),
    //Applies the inner clause to the controllers of the affected objects
    SetTargetController(Box<Clause>),
    CreateToken(Vec<TokenAttribute>),
    PutCounter(Counter, i64),
    Tap,
    Untap,
    CounterSpell,
    Attach,
    Continuous(ContEffect, ContDuration),
}

#[derive(Clone, Copy, Serialize, Deserialize, JsonSchema, Debug, PartialEq, Eq)]
pub enum ContDuration {
    EndOfTurn,
    EndOfCombat,
    Permanent,
}

//A continuous effect created by a resolved spell or ability.
//The objects it touches are fixed when it is created.
#[derive(Clone, Serialize, Deserialize, JsonSchema, Debug, PartialEq)]
pub struct Continuous {
    pub source: CardId,
    pub controller: PlayerId,
    pub timestamp: u64,
    pub affected: Affected,
    pub constraints: Vec<Constraint>,
    pub effect: ContEffect,
    pub duration: ContDuration,
}

#[derive(Clone, Serialize, Deserialize, JsonSchema, Debug, PartialEq)]
pub enum ContEffect {
    CopyOf(CardId),
    GainControl,
    AddType(Type),
    AddSubtype(Subtype),
    SetColors(Vec<Color>),
    ReplaceSubtype { from: Subtype, to: Subtype },
    AddAbility(Box<Ability>),
    RemoveAbility(KeywordAbility),
    RemoveAllAbilities,
    SetPT(PT),
    ModifyPT(PT),
    CantAttackOrBlock,
    CantBlock,
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, JsonSchema, EnumIter,
)]
pub enum Layer {
    Copy,
    Control,
    Type,
    Color,
    Text,
    Ability,
    PTSetting,
    PTModifying,
    Status,
}

impl ContEffect {
    pub fn layer(&self) -> Layer {
        match self {
            ContEffect::CopyOf(_) => Layer::Copy,
            ContEffect::GainControl => Layer::Control,
            ContEffect::AddType(_) | ContEffect::AddSubtype(_) => Layer::Type,
            ContEffect::SetColors(_) => Layer::Color,
            ContEffect::ReplaceSubtype { .. } => Layer::Text,
            ContEffect::AddAbility(_)
            | ContEffect::RemoveAbility(_)
            | ContEffect::RemoveAllAbilities => Layer::Ability,
            ContEffect::SetPT(_) => Layer::PTSetting,
            ContEffect::ModifyPT(_) => Layer::PTModifying,
            ContEffect::CantAttackOrBlock | ContEffect::CantBlock => Layer::Status,
        }
    }
}
