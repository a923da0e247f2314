use crate::client_message::{Ask, AskSelectN};
use crate::errors::MTGError;
use crate::game::layers::View;
use crate::game::Game;
use common::entities::{CardId, PlayerId, TargetId};
use common::spellabil::{Affected, Clause, Constraint, KeywordAbility};
use log::debug;

impl Game {
    //Checks a constraint against a candidate, relative to the object
    //that carries the effect and that object's controller
    pub fn passes_in(
        &self,
        view: &View,
        constraint: &Constraint,
        source: CardId,
        controller: Option<PlayerId>,
        target: TargetId,
    ) -> bool {
        let card = target.card().and_then(|id| view.get(&id));
        match constraint {
            Constraint::Player => target.player().is_some(),
            Constraint::Opponent => match target {
                TargetId::Player(player) => controller.map_or(false, |pl| pl != player),
                TargetId::Card(_) => false,
            },
            Constraint::CardType(t) => card.map_or(false, |card| card.face.types.contains(t)),
            Constraint::Subtype(t) => card.map_or(false, |card| card.face.subtypes.contains(t)),
            Constraint::HasKeyword(keyword) => {
                card.map_or(false, |card| card.face.has_keyword(*keyword))
            }
            Constraint::HasCounter(counter) => {
                card.map_or(false, |card| card.counters.contains(*counter))
            }
            Constraint::HasColor(color) => card.map_or(false, |card| card.face.colors.contains(color)),
            Constraint::IsTapped => card.map_or(false, |card| card.tapped),
            Constraint::IsUntapped => card.map_or(false, |card| !card.tapped),
            Constraint::YouControl => match target {
                TargetId::Player(player) => controller == Some(player),
                TargetId::Card(_) => card.map_or(false, |card| Some(card.controller) == controller),
            },
            Constraint::OpponentControls => match target {
                TargetId::Player(player) => controller.map_or(false, |pl| pl != player),
                TargetId::Card(_) => card.map_or(false, |card| {
                    controller.map_or(false, |pl| pl != card.controller)
                }),
            },
            Constraint::Other => target != TargetId::Card(self.stack_ent_source(source)),
            Constraint::IsCardname => target == TargetId::Card(self.stack_ent_source(source)),
            Constraint::InZone(zone) => card.map_or(false, |card| card.zone == Some(*zone)),
            Constraint::Attacking => card.map_or(false, |card| card.attacking),
            Constraint::Not(inner) => !self.passes_in(view, inner, source, controller, target),
            Constraint::And(constraints) => constraints
                .iter()
                .all(|c| self.passes_in(view, c, source, controller, target)),
            Constraint::Or(constraints) => constraints
                .iter()
                .any(|c| self.passes_in(view, c, source, controller, target)),
        }
    }
    pub fn passes_constraint(
        &self,
        constraint: &Constraint,
        source: CardId,
        target: TargetId,
    ) -> bool {
        let controller = self.get_controller(source);
        self.passes_in(&self.view, constraint, source, controller, target)
    }
    pub fn passes_constraints(
        &self,
        constraints: &[Constraint],
        source: CardId,
        target: TargetId,
    ) -> bool {
        constraints
            .iter()
            .all(|constraint| self.passes_constraint(constraint, source, target))
    }

    //Every player and object the clause could legally target.
    //Objects off the battlefield are only considered if the clause names their zone.
    pub fn legal_targets(&self, clause: &Clause, source: CardId) -> Vec<TargetId> {
        let mut candidates: Vec<TargetId> = self
            .turn_order
            .iter()
            .copied()
            .filter(|&player| self.is_playing(player))
            .map(TargetId::Player)
            .collect();
        if clause.constraints.iter().any(|c| c.mentions_zone()) {
            candidates.extend(self.all_cards().into_iter().map(TargetId::Card));
        } else {
            candidates.extend(self.battlefield.iter().copied().map(TargetId::Card));
        }
        candidates
            .into_iter()
            .filter(|&target| target != TargetId::Card(source))
            .filter(|&target| self.is_valid_target(clause, source, target))
            .collect()
    }
    pub fn is_valid_target(&self, clause: &Clause, source: CardId, target: TargetId) -> bool {
        if let TargetId::Card(id) = target {
            if !self.cards.contains(id) {
                return false;
            }
            if self.has_keyword(id, KeywordAbility::Shroud) {
                return false;
            }
            if self.has_keyword(id, KeywordAbility::Hexproof)
                && self.get_controller(source) != self.get_controller(id)
            {
                return false;
            }
        } else if let TargetId::Player(player) = target {
            if !self.is_playing(player) {
                return false;
            }
        }
        self.passes_constraints(&clause.constraints, source, target)
    }
    pub fn validate_targets(
        &self,
        clause: &Clause,
        source: CardId,
        targets: &[TargetId],
    ) -> Result<(), MTGError> {
        for &target in targets {
            if !self.is_valid_target(clause, source, target) {
                return Err(MTGError::IllegalTarget(target));
            }
        }
        Ok(())
    }

    //Chooses the targets of every targeted clause of a stack entry
    pub async fn select_targets(&mut self, player: PlayerId, stack_ent: CardId) -> Result<(), MTGError> {
        let clauses = match self.cards.get(stack_ent) {
            Some(card) => card.effect.clone(),
            None => return Ok(()),
        };
        let mut selected = Vec::with_capacity(clauses.len());
        for clause in clauses {
            selected.push(self.clause_select_targets(player, stack_ent, clause).await?);
        }
        if let Some(card) = self.cards.get_mut(stack_ent) {
            card.effect = selected;
        }
        Ok(())
    }
    async fn clause_select_targets(
        &self,
        player: PlayerId,
        stack_ent: CardId,
        mut clause: Clause,
    ) -> Result<Clause, MTGError> {
        if let Affected::Target(_) = clause.affected {
            let valid = self.legal_targets(&clause, stack_ent);
            if valid.is_empty() {
                return Err(MTGError::NoValidTargets);
            }
            let ask = AskSelectN {
                ents: valid.clone(),
                min: 1,
                max: 1,
            };
            let choice = self.ask_selection(player, Ask::Target(ask)).await?;
            let target = choice
                .first()
                .and_then(|&i| valid.get(i).copied())
                .ok_or(MTGError::NoValidTargets)?;
            self.validate_targets(&clause, stack_ent, &[target])?;
            debug!("{} targets {}", stack_ent, target);
            clause.affected = Affected::Target(Some(target));
        }
        Ok(clause)
    }

    //The chosen targets of an entry, as (clause index, target)
    pub fn chosen_targets(&self, stack_ent: CardId) -> Vec<(usize, TargetId)> {
        self.cards
            .get(stack_ent)
            .map(|card| {
                card.effect
                    .iter()
                    .enumerate()
                    .filter_map(|(i, clause)| match clause.affected {
                        Affected::Target(Some(target)) => Some((i, target)),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}
