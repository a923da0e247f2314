use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
pub enum Phase {
    Begin,
    FirstMain,
    Combat,
    SecondMain,
    Ending,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
pub enum Subphase {
    Untap,
    Upkeep,
    Draw,
    BeginCombat,
    Attackers,
    Blockers,
    FirstStrikeDamage,
    Damage,
    EndCombat,
    EndStep,
    Cleanup,
}

impl Phase {
    pub fn is_main(self) -> bool {
        matches!(self, Phase::FirstMain | Phase::SecondMain)
    }
    pub fn subphases(self) -> &'static [Subphase] {
        match self {
            Phase::Begin => &[Subphase::Untap, Subphase::Upkeep, Subphase::Draw],
            Phase::FirstMain | Phase::SecondMain => &[],
            Phase::Combat => &[
                Subphase::BeginCombat,
                Subphase::Attackers,
                Subphase::Blockers,
                Subphase::FirstStrikeDamage,
                Subphase::Damage,
                Subphase::EndCombat,
            ],
            Phase::Ending => &[Subphase::EndStep, Subphase::Cleanup],
        }
    }
}

pub const TURN_PHASES: [Phase; 5] = [
    Phase::Begin,
    Phase::FirstMain,
    Phase::Combat,
    Phase::SecondMain,
    Phase::Ending,
];
