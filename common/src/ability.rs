use schemars::JsonSchema;
use serde::Deserialize;
use serde_derive::Serialize;

use crate::cardtypes::Subtype;
use crate::cost::Cost;
use crate::counters::Counter;
use crate::mana::ManaCostSymbol;
use crate::spellabil::{Affected, Clause, ClauseEffect, ContEffect, Constraint, KeywordAbility};
use crate::steps::Subphase;
use crate::zones::Zone;

#[derive(Clone, Serialize, Deserialize, JsonSchema, Debug, PartialEq)]
pub struct ZoneMoveTrigger {
    //These both must match for the ability to trigger
    pub origin: Option<Zone>,
    pub dest: Option<Zone>,
}
impl ZoneMoveTrigger {
    pub fn matches(&self, origin: Option<Zone>, dest: Zone) -> bool {
        self.origin.map_or(true, |zone| Some(zone) == origin)
            && self.dest.map_or(true, |zone| zone == dest)
    }
    pub fn leaves_battlefield(&self) -> bool {
        self.origin == Some(Zone::Battlefield)
    }
}
#[derive(Clone, Serialize, Deserialize, JsonSchema, Debug, PartialEq)]
pub enum AbilityTriggerType {
    ZoneMove(ZoneMoveTrigger),
    Attacks,
    Blocks,
    DealsDamage { combat_only: bool },
    //yours restricts the trigger to its controller's turns
    BeginningOfStep { subphase: Subphase, yours: bool },
    SpellCast,
}
//The constraints are checked against the object the event is about
#[derive(Clone, Serialize, Deserialize, JsonSchema, Debug, PartialEq)]
pub struct Trigger {
    pub trigger: AbilityTriggerType,
    pub constraint: Vec<Constraint>,
}

#[derive(Clone, Serialize, Deserialize, JsonSchema, Debug, PartialEq)]
pub struct TriggeredAbility {
    pub trigger: Trigger,
    pub effect: Vec<Clause>,
    pub keyword: Option<KeywordAbility>,
}

#[derive(Clone, Serialize, Deserialize, JsonSchema, Debug, PartialEq)]
pub struct ContAbility {
    pub effect: ContEffect,
    pub affected: Affected,
    pub constraints: Vec<Constraint>,
}

#[derive(Clone, Serialize, Deserialize, JsonSchema, Debug, PartialEq)]
pub enum StaticAbilityEffect {
    GivenByKeyword,
    Continuous(ContAbility),
    //An aura can only stay attached to objects passing these constraints
    Enchant(Vec<Constraint>),
}
#[derive(Clone, Serialize, Deserialize, JsonSchema, Debug, PartialEq)]
pub struct StaticAbility {
    pub keyword: Option<KeywordAbility>,
    pub effect: StaticAbilityEffect,
}
#[derive(Clone, Serialize, Deserialize, JsonSchema, Debug, PartialEq)]
pub struct ActivatedAbility {
    pub costs: Vec<Cost>,
    pub effect: Vec<Clause>,
    pub keyword: Option<KeywordAbility>,
    pub sorcery_speed: bool,
}
impl ActivatedAbility {
    pub fn is_loyalty(&self) -> bool {
        self.costs.iter().any(|cost| matches!(cost, Cost::Loyalty(_)))
    }
    pub fn is_mana_ability(&self) -> bool {
        !self.is_loyalty()
            && !self.effect.is_empty()
            && self.effect.iter().all(|clause| {
                matches!(clause.effect, ClauseEffect::AddMana(_)) && !clause.is_targeted()
            })
    }
}

#[derive(Clone, Serialize, Deserialize, JsonSchema, Debug, PartialEq)]
pub enum ReplacementEffect {
    EntersTapped,
    EntersWithCounters(Counter, i64),
    ChangeDestination(Zone),
}
//Replaces a zone move of an object passing the constraints.
//self_only replacements modify the object that carries them,
//and are read from the moving object instead of the battlefield.
#[derive(Clone, Serialize, Deserialize, JsonSchema, Debug, PartialEq)]
pub struct ReplacementAbility {
    pub trigger: ZoneMoveTrigger,
    pub constraints: Vec<Constraint>,
    pub replacement: ReplacementEffect,
    pub self_only: bool,
}

#[derive(Clone, Serialize, Deserialize, JsonSchema, Debug, PartialEq)]
pub enum Ability {
    Activated(ActivatedAbility),
    Triggered(TriggeredAbility),
    Static(StaticAbility),
    Replacement(ReplacementAbility),
}

impl Ability {
    pub fn keyword(&self) -> Option<KeywordAbility> {
        match self {
            Self::Activated(abil) => abil.keyword,
            Self::Static(abil) => abil.keyword,
            Self::Triggered(abil) => abil.keyword,
            Self::Replacement(_) => None,
        }
    }
    pub fn tap_for_mana(mana: Vec<ManaCostSymbol>) -> Self {
        Ability::Activated(ActivatedAbility {
            costs: vec![Cost::Selftap],
            effect: vec![Clause::new(ClauseEffect::AddMana(mana), Affected::Controller)],
            keyword: None,
            sorcery_speed: false,
        })
    }
    //The mana ability every basic land type grants
    pub fn for_land_type(subtype: Subtype) -> Option<Self> {
        let mana = match subtype {
            Subtype::Plains => ManaCostSymbol::White,
            Subtype::Island => ManaCostSymbol::Blue,
            Subtype::Swamp => ManaCostSymbol::Black,
            Subtype::Mountain => ManaCostSymbol::Red,
            Subtype::Forest => ManaCostSymbol::Green,
            _ => return None,
        };
        Some(Self::tap_for_mana(vec![mana]))
    }
    pub fn from_keyword(keyword: KeywordAbility) -> Self {
        Ability::Static(StaticAbility {
            keyword: Some(keyword),
            effect: StaticAbilityEffect::GivenByKeyword,
        })
    }
    pub fn equip(costs: Vec<Cost>) -> Self {
        Ability::Activated(ActivatedAbility {
            costs,
            effect: vec![Clause::target(
                ClauseEffect::Attach,
                vec![
                    Constraint::CardType(crate::cardtypes::Type::Creature),
                    Constraint::YouControl,
                ],
            )],
            keyword: None,
            sorcery_speed: true,
        })
    }
    pub fn loyalty(amount: i64, effect: Vec<Clause>) -> Self {
        Ability::Activated(ActivatedAbility {
            costs: vec![Cost::Loyalty(amount)],
            effect,
            keyword: None,
            sorcery_speed: true,
        })
    }
    //Constraints are checked against the object the event happened to,
    //IsCardname makes it a "when this ..." trigger
    pub fn triggered(
        trigger: AbilityTriggerType,
        constraint: Vec<Constraint>,
        effect: Vec<Clause>,
    ) -> Self {
        Ability::Triggered(TriggeredAbility {
            trigger: Trigger {
                trigger,
                constraint,
            },
            effect,
            keyword: None,
        })
    }
    pub fn anthem(effect: ContEffect, affected: Affected, constraints: Vec<Constraint>) -> Self {
        Ability::Static(StaticAbility {
            keyword: None,
            effect: StaticAbilityEffect::Continuous(ContAbility {
                effect,
                affected,
                constraints,
            }),
        })
    }
    pub fn replace_subtype(&mut self, from: Subtype, to: Subtype) {
        let clauses = match self {
            Ability::Activated(abil) => &mut abil.effect,
            Ability::Triggered(abil) => {
                for c in &mut abil.trigger.constraint {
                    c.replace_subtype(from, to);
                }
                &mut abil.effect
            }
            Ability::Static(abil) => {
                match &mut abil.effect {
                    StaticAbilityEffect::Continuous(cont) => {
                        for c in &mut cont.constraints {
                            c.replace_subtype(from, to);
                        }
                    }
                    StaticAbilityEffect::Enchant(constraints) => {
                        for c in constraints {
                            c.replace_subtype(from, to);
                        }
                    }
                    StaticAbilityEffect::GivenByKeyword => {}
                }
                return;
            }
            Ability::Replacement(abil) => {
                for c in &mut abil.constraints {
                    c.replace_subtype(from, to);
                }
                return;
            }
        };
        for clause in clauses {
            clause.replace_subtype(from, to);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mana_abilities_have_no_targets() {
        let Ability::Activated(abil) = Ability::tap_for_mana(vec![ManaCostSymbol::Green]) else {
            panic!("tap for mana is activated");
        };
        assert!(abil.is_mana_ability());
        let Ability::Activated(abil) = Ability::loyalty(1, vec![Clause::new(
            ClauseEffect::AddMana(vec![ManaCostSymbol::Red]),
            Affected::Controller,
        )]) else {
            panic!("loyalty abilities are activated");
        };
        assert!(!abil.is_mana_ability());
    }
}
