use crate::client_message::{Ask, AskOrder, AskPair, AskPairItem, Notification};
use crate::errors::MTGError;
use crate::event::{DamageReason, Event};
use crate::game::Game;
use crate::log::FeedEvent;
use common::cardtypes::Type;
use common::entities::{CardId, PlayerId, TargetId};
use common::spellabil::KeywordAbility;
use common::steps::Subphase;
use log::{info, warn};
use std::collections::{HashMap, HashSet};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Combat {
    //Each attacker with the player or planeswalker it attacks
    pub attacks: Vec<(CardId, TargetId)>,
    //Each attacker's blockers in damage assignment order
    pub blocks: HashMap<CardId, Vec<CardId>>,
    //Each blocker with the attacker it blocks
    pub blocking: HashMap<CardId, CardId>,
    //Attackers stay blocked even if their blockers leave combat
    pub blocked: HashSet<CardId>,
    pub dealt_first_strike: HashSet<CardId>,
}

impl Combat {
    pub fn attackers(&self) -> Vec<CardId> {
        self.attacks.iter().map(|(attacker, _)| *attacker).collect()
    }
    pub fn attack_target(&self, attacker: CardId) -> Option<TargetId> {
        self.attacks
            .iter()
            .find(|(a, _)| *a == attacker)
            .map(|(_, target)| *target)
    }
    //Removes an object from combat
    pub fn remove(&mut self, ent: CardId) {
        self.attacks.retain(|(attacker, _)| *attacker != ent);
        self.blocks.remove(&ent);
        for blockers in self.blocks.values_mut() {
            blockers.retain(|&blocker| blocker != ent);
        }
        self.blocking.remove(&ent);
        self.blocking.retain(|_, attacker| *attacker != ent);
    }
}

impl Game {
    pub fn legal_attackers(&self, player: PlayerId) -> Vec<CardId> {
        self.players_creatures(player)
            .into_iter()
            .filter(|&creature| {
                self.can_tap(creature)
                    && !self.has_keyword(creature, KeywordAbility::Defender)
                    && !self
                        .characteristics(creature)
                        .map_or(true, |view| view.cant_attack)
            })
            .collect()
    }
    //The opponents of a player and the planeswalkers they control
    pub fn attack_targets(&self, player: PlayerId) -> Vec<TargetId> {
        let opponents = self.opponents(player);
        let mut targets: Vec<TargetId> = opponents.iter().copied().map(TargetId::Player).collect();
        for &opponent in &opponents {
            targets.extend(
                self.players_permanents(opponent)
                    .into_iter()
                    .filter(|&perm| self.is_type(perm, Type::Planeswalker))
                    .map(TargetId::Card),
            );
        }
        targets
    }
    pub fn can_block(&self, blocker: CardId, attacker: CardId) -> bool {
        let Some(view) = self.characteristics(blocker) else {
            return false;
        };
        if !self.battlefield.contains(&blocker)
            || !view.face.types.is_creature()
            || view.tapped
            || view.cant_block
        {
            return false;
        }
        if self.has_keyword(attacker, KeywordAbility::Flying) {
            return self.has_keyword(blocker, KeywordAbility::Flying)
                || self.has_keyword(blocker, KeywordAbility::Reach);
        }
        true
    }

    //Who is attacked by an attacker, or who controls the attacked planeswalker
    fn defending_player(&self, target: TargetId) -> Option<PlayerId> {
        match target {
            TargetId::Player(player) => Some(player),
            TargetId::Card(card) => self.get_controller(card),
        }
    }

    fn validate_attacks(&self, player: PlayerId, attacks: &[(CardId, TargetId)]) -> Result<(), MTGError> {
        let legal = self.legal_attackers(player);
        let targets = self.attack_targets(player);
        for &(attacker, target) in attacks {
            if !legal.contains(&attacker) {
                return Err(MTGError::IllegalTarget(TargetId::Card(attacker)));
            }
            if !targets.contains(&target) {
                return Err(MTGError::IllegalTarget(target));
            }
        }
        Ok(())
    }
    fn validate_blocks(&self, blocks: &[(CardId, CardId)]) -> Result<(), MTGError> {
        let mut count: HashMap<CardId, usize> = HashMap::new();
        for &(blocker, attacker) in blocks {
            if !self.can_block(blocker, attacker) {
                return Err(MTGError::IllegalTarget(TargetId::Card(blocker)));
            }
            *count.entry(attacker).or_default() += 1;
        }
        for (attacker, blockers) in count {
            if blockers < 2 && self.has_keyword(attacker, KeywordAbility::Menace) {
                return Err(MTGError::IllegalTarget(TargetId::Card(attacker)));
            }
        }
        Ok(())
    }
    async fn reject_declaration(&mut self, player: PlayerId, error: MTGError) -> Result<(), MTGError> {
        warn!("{} made an illegal declaration: {}", player, error);
        self.feed.push(FeedEvent::ActionRejected {
            player,
            error: error.clone(),
        });
        self.notify(player, Notification::Rejected(error)).await
    }

    pub async fn declare_attackers(&mut self) -> Result<(), MTGError> {
        let player = self.active_player;
        let attackers = self.legal_attackers(player);
        let targets = self.attack_targets(player);
        self.combat = Some(Default::default());
        let mut attacks = Vec::new();
        if !attackers.is_empty() && !targets.is_empty() {
            let ask = AskPair {
                pairs: attackers
                    .iter()
                    .map(|&attacker| {
                        (
                            attacker,
                            AskPairItem {
                                items: targets.clone(),
                                min: 0,
                                max: 1,
                            },
                        )
                    })
                    .collect(),
            };
            let mut rejections = 0;
            loop {
                let choice = self.ask_pairing(player, Ask::Attackers(ask.clone())).await?;
                let mut declared: Vec<(CardId, TargetId)> = choice
                    .iter()
                    .filter_map(|(&attacker, chosen)| {
                        chosen.first().map(|&i| (attacker, targets[i]))
                    })
                    .collect();
                declared.sort();
                match self.validate_attacks(player, &declared) {
                    Ok(()) => {
                        attacks = declared;
                        break;
                    }
                    Err(error) => {
                        self.reject_declaration(player, error).await?;
                        rejections += 1;
                        if rejections >= self.config.max_rejections {
                            break;
                        }
                    }
                }
            }
        }
        if attacks.is_empty() {
            //Skip the rest of combat
            self.subphases.retain(|&subphase| subphase == Subphase::EndCombat);
            return Ok(());
        }
        info!("{} attacks with {} creatures", player, attacks.len());
        let mut events: Vec<Event> = attacks
            .iter()
            .filter(|(attacker, _)| !self.has_keyword(*attacker, KeywordAbility::Vigilance))
            .map(|&(attacker, _)| Event::Tap { ent: attacker })
            .collect();
        events.push(Event::Attack {
            attacks: attacks.clone(),
        });
        if let Some(combat) = &mut self.combat {
            combat.attacks = attacks;
        }
        self.handle_events(events);
        self.cycle_priority().await
    }

    pub async fn declare_blockers(&mut self) -> Result<(), MTGError> {
        let attacks = match &self.combat {
            Some(combat) => combat.attacks.clone(),
            None => return Ok(()),
        };
        let mut all_blocks: Vec<(CardId, CardId)> = Vec::new();
        for defender in self.apnap_order() {
            if defender == self.active_player {
                continue;
            }
            let attackers: Vec<CardId> = attacks
                .iter()
                .filter(|(_, target)| self.defending_player(*target) == Some(defender))
                .map(|(attacker, _)| *attacker)
                .collect();
            let mut pairs = HashMap::new();
            let mut options = HashMap::new();
            for blocker in self.players_creatures(defender) {
                let blockable: Vec<CardId> = attackers
                    .iter()
                    .copied()
                    .filter(|&attacker| self.can_block(blocker, attacker))
                    .collect();
                if !blockable.is_empty() {
                    pairs.insert(
                        blocker,
                        AskPairItem {
                            items: blockable.clone(),
                            min: 0,
                            max: 1,
                        },
                    );
                    options.insert(blocker, blockable);
                }
            }
            if pairs.is_empty() {
                continue;
            }
            let ask = AskPair { pairs };
            let mut rejections = 0;
            loop {
                let choice = self.ask_pairing(defender, Ask::Blockers(ask.clone())).await?;
                let mut blocks: Vec<(CardId, CardId)> = choice
                    .iter()
                    .filter_map(|(blocker, chosen)| {
                        let attacker = options.get(blocker)?.get(*chosen.first()?)?;
                        Some((*blocker, *attacker))
                    })
                    .collect();
                blocks.sort();
                match self.validate_blocks(&blocks) {
                    Ok(()) => {
                        all_blocks.extend(blocks);
                        break;
                    }
                    Err(error) => {
                        self.reject_declaration(defender, error).await?;
                        rejections += 1;
                        if rejections >= self.config.max_rejections {
                            break;
                        }
                    }
                }
            }
        }
        let mut blocks: HashMap<CardId, Vec<CardId>> = HashMap::new();
        for &(blocker, attacker) in &all_blocks {
            blocks.entry(attacker).or_default().push(blocker);
        }
        for (&attacker, blockers) in blocks.iter_mut() {
            if blockers.len() > 1 {
                let controller = self.get_controller(attacker).unwrap_or(self.active_player);
                *blockers = self
                    .ask_order(controller, blockers.clone(), |ents| Ask::DamageOrder {
                        attacker,
                        blockers: AskOrder { ents },
                    })
                    .await?;
            }
        }
        if let Some(combat) = &mut self.combat {
            combat.blocked = blocks.keys().copied().collect();
            combat.blocking = all_blocks.iter().copied().collect();
            combat.blocks = blocks;
        }
        if !all_blocks.is_empty() {
            self.handle_event(Event::Block { blocks: all_blocks });
        }
        self.cycle_priority().await
    }

    pub fn has_first_strike_combatant(&self) -> bool {
        let Some(combat) = &self.combat else {
            return false;
        };
        combat
            .attackers()
            .into_iter()
            .chain(combat.blocking.keys().copied())
            .any(|ent| {
                self.has_keyword(ent, KeywordAbility::FirstStrike)
                    || self.has_keyword(ent, KeywordAbility::DoubleStrike)
            })
    }
    fn deals_damage_now(&self, combat: &Combat, ent: CardId, first_strike: bool) -> bool {
        let double = self.has_keyword(ent, KeywordAbility::DoubleStrike);
        if first_strike {
            double || self.has_keyword(ent, KeywordAbility::FirstStrike)
        } else {
            double || !combat.dealt_first_strike.contains(&ent)
        }
    }
    fn power(&self, ent: CardId) -> i64 {
        self.characteristics(ent)
            .and_then(|view| view.face.pt.as_ref())
            .map_or(0, |pt| pt.power.max(0))
    }

    //Deals the damage of one combat damage step as a single batch
    pub fn combat_damage(&mut self, first_strike: bool) {
        let Some(combat) = self.combat.clone() else {
            return;
        };
        let mut events = Vec::new();
        let mut dealt = Vec::new();
        for &(attacker, target) in &combat.attacks {
            if !self.battlefield.contains(&attacker)
                || !self.deals_damage_now(&combat, attacker, first_strike)
            {
                continue;
            }
            dealt.push(attacker);
            let mut remaining = self.power(attacker);
            let trample = self.has_keyword(attacker, KeywordAbility::Trample);
            let deathtouch = self.has_keyword(attacker, KeywordAbility::Deathtouch);
            if combat.blocked.contains(&attacker) {
                let blockers: Vec<CardId> = combat
                    .blocks
                    .get(&attacker)
                    .map(|blockers| {
                        blockers
                            .iter()
                            .copied()
                            .filter(|b| self.battlefield.contains(b))
                            .collect()
                    })
                    .unwrap_or_default();
                for (i, &blocker) in blockers.iter().enumerate() {
                    let lethal = self.remaining_lethal(blocker).unwrap_or(0);
                    let lethal = if deathtouch { lethal.min(1) } else { lethal };
                    let last = i + 1 == blockers.len();
                    let assigned = if last && !trample {
                        remaining
                    } else {
                        remaining.min(lethal)
                    };
                    if assigned > 0 {
                        events.push(Event::Damage {
                            amount: assigned,
                            target: TargetId::Card(blocker),
                            source: attacker,
                            reason: DamageReason::Combat,
                        });
                    }
                    remaining -= assigned;
                }
                if !trample {
                    remaining = 0;
                }
            }
            if remaining > 0 {
                events.push(Event::Damage {
                    amount: remaining,
                    target,
                    source: attacker,
                    reason: DamageReason::Combat,
                });
            }
        }
        for (&blocker, &attacker) in &combat.blocking {
            if !self.battlefield.contains(&blocker)
                || combat.attack_target(attacker).is_none()
                || !self.deals_damage_now(&combat, blocker, first_strike)
            {
                continue;
            }
            dealt.push(blocker);
            let amount = self.power(blocker);
            if amount > 0 {
                events.push(Event::Damage {
                    amount,
                    target: TargetId::Card(attacker),
                    source: blocker,
                    reason: DamageReason::Combat,
                });
            }
        }
        if first_strike {
            if let Some(combat) = &mut self.combat {
                combat.dealt_first_strike.extend(dealt);
            }
        }
        self.handle_events(events);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::entities::MIN_CARDID;
    use std::num::NonZeroU64;

    #[test]
    fn removed_blockers_leave_attacker_blocked() {
        let id = |n| CardId::from(NonZeroU64::new(MIN_CARDID + n).unwrap());
        let player = PlayerId::from(NonZeroU64::MIN);
        let mut combat = Combat {
            attacks: vec![(id(1), TargetId::Player(player))],
            ..Default::default()
        };
        combat.blocks.insert(id(1), vec![id(2), id(3)]);
        combat.blocking.insert(id(2), id(1));
        combat.blocking.insert(id(3), id(1));
        combat.blocked.insert(id(1));
        combat.remove(id(2));
        assert_eq!(combat.blocks[&id(1)], vec![id(3)]);
        assert!(!combat.blocking.contains_key(&id(2)));
        assert!(combat.blocked.contains(&id(1)));
        combat.remove(id(1));
        assert!(combat.attackers().is_empty());
        assert!(combat.blocking.is_empty());
    }
}
