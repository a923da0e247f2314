use common::card_entities::CardFace;
use common::counters::Counter;
use common::entities::{CardId, PlayerId, TargetId};
use common::steps::Subphase;
use common::zones::Zone;

use crate::game::state_based::LoseReason;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DamageReason {
    Combat,
    SpellAbility(CardId),
}

//Events are the only way the engine mutates game objects.
//Each batch of events is followed by a trigger check.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Draw {
        player: PlayerId,
    },
    Damage {
        amount: i64,
        target: TargetId,
        source: CardId,
        reason: DamageReason,
    },
    Destroy {
        perms: Vec<CardId>,
    },
    Discard {
        player: PlayerId,
        cards: Vec<CardId>,
    },
    Cast {
        player: PlayerId,
        spell: CardId,
    },
    MoveZones {
        ents: Vec<CardId>,
        origin: Option<Zone>,
        dest: Zone,
    },
    Lose {
        player: PlayerId,
        reason: LoseReason,
    },
    Tap {
        ent: CardId,
    },
    Untap {
        ent: CardId,
    },
    GainLife {
        player: PlayerId,
        amount: i64,
    },
    LoseLife {
        player: PlayerId,
        amount: i64,
    },
    PutCounter {
        affected: TargetId,
        counter: Counter,
        quantity: i64,
    },
    RemoveCounter {
        affected: TargetId,
        counter: Counter,
        quantity: i64,
    },
    PlayLand {
        player: PlayerId,
        land: CardId,
    },
    //Attackers paired with the player or planeswalker they attack
    Attack {
        attacks: Vec<(CardId, TargetId)>,
    },
    //Blockers paired with the attacker they block
    Block {
        blocks: Vec<(CardId, CardId)>,
    },
    BeginStep {
        subphase: Subphase,
    },
    CreateToken {
        player: PlayerId,
        face: CardFace,
    },
    Attach {
        attachment: CardId,
        target: CardId,
    },
    Unattach {
        attachment: CardId,
    },
    //Tokens and abilities that left their zone
    CeaseToExist {
        ents: Vec<CardId>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct MoveZonesResult {
    pub oldent: CardId,
    pub newent: Option<CardId>,
    pub source: Option<Zone>,
    pub dest: Zone,
    pub controller: PlayerId,
}

#[derive(Clone, Debug, PartialEq)]
pub enum EventResult {
    Draw(CardId),
    MoveZones(Vec<MoveZonesResult>),
    Tap(CardId),
    Untap(CardId),
    Attacks(Vec<(CardId, TargetId)>),
    Blocks(Vec<(CardId, CardId)>),
    Damage {
        source: CardId,
        target: TargetId,
        amount: i64,
        combat: bool,
    },
    Cast {
        player: PlayerId,
        spell: CardId,
    },
    BeginStep(Subphase),
    Lost(PlayerId),
}
