use crate::log::FeedEvent;
use crate::tests::common_test::{bear, life, passing_game};
use anyhow::Result;
use common::ability::{Ability, AbilityTriggerType, Trigger, TriggeredAbility, ZoneMoveTrigger};
use common::card_entities::{CardBuilder, CardFace};
use common::cardtypes::Type;
use common::entities::PlayerId;
use common::spellabil::{Affected, Clause, ClauseEffect, Constraint};
use common::steps::Subphase;
use common::zones::Zone;

fn dies() -> AbilityTriggerType {
    AbilityTriggerType::ZoneMove(ZoneMoveTrigger {
        origin: Some(Zone::Battlefield),
        dest: Some(Zone::Graveyard),
    })
}

fn upkeep_lifegain() -> CardFace {
    CardBuilder::new("Ajani's Pridemate Shrine")
        .enchantment()
        .ability(Ability::triggered(
            AbilityTriggerType::BeginningOfStep {
                subphase: Subphase::Upkeep,
                yours: false,
            },
            Vec::new(),
            vec![Clause::new(ClauseEffect::GainLife(1), Affected::Controller)],
        ))
        .build()
}

fn blood_artist() -> CardFace {
    CardBuilder::new("Blood Artist")
        .creature(0, 1)
        .ability(Ability::triggered(
            dies(),
            vec![Constraint::CardType(Type::Creature)],
            vec![Clause::new(ClauseEffect::LoseLife(1), Affected::EachOpponent)],
        ))
        .build()
}

#[test_log::test(tokio::test)]
async fn simultaneous_triggers_go_on_the_stack_in_apnap_order() -> Result<()> {
    let (mut game, p1, p2) = passing_game()?;
    game.active_player = p1;
    game.create_card(upkeep_lifegain(), p1, Zone::Battlefield);
    game.create_card(upkeep_lifegain(), p2, Zone::Battlefield);

    game.subphase(Subphase::Upkeep).await?;

    let placed: Vec<PlayerId> = game
        .feed
        .events()
        .filter_map(|event| match event {
            FeedEvent::TriggerPlaced { controller, .. } => Some(*controller),
            _ => None,
        })
        .collect();
    assert_eq!(placed, vec![p1, p2]);
    //The nonactive player's trigger is on top, so it resolves first
    let gained: Vec<PlayerId> = game
        .feed
        .events()
        .filter_map(|event| match event {
            FeedEvent::LifeChanged { player, .. } => Some(*player),
            _ => None,
        })
        .collect();
    assert_eq!(gained, vec![p2, p1]);
    assert_eq!(life(&game, p1), 21);
    assert_eq!(life(&game, p2), 21);
    assert!(game.stack.is_empty());
    Ok(())
}

#[test_log::test(tokio::test)]
async fn yours_only_triggers_on_its_controllers_turn() -> Result<()> {
    let (mut game, p1, p2) = passing_game()?;
    let shrine = CardBuilder::new("Phyrexian Arena")
        .enchantment()
        .ability(Ability::triggered(
            AbilityTriggerType::BeginningOfStep {
                subphase: Subphase::Upkeep,
                yours: true,
            },
            Vec::new(),
            vec![Clause::new(ClauseEffect::LoseLife(1), Affected::Controller)],
        ))
        .build();
    game.create_card(shrine, p2, Zone::Battlefield);
    game.active_player = p1;
    game.subphase(Subphase::Upkeep).await?;
    assert_eq!(life(&game, p2), 20);
    game.active_player = p2;
    game.subphase(Subphase::Upkeep).await?;
    assert_eq!(life(&game, p2), 19);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn leaving_the_battlefield_looks_back_in_time() -> Result<()> {
    let (mut game, p1, p2) = passing_game()?;
    game.active_player = p1;
    let artist = game.create_card(blood_artist(), p1, Zone::Battlefield);
    let first = game.create_card(bear(), p1, Zone::Battlefield);
    let second = game.create_card(bear(), p2, Zone::Battlefield);

    //The artist sees itself die along with the others
    game.destroy(vec![artist, first, second]);
    assert_eq!(game.pending_triggers.len(), 3);
    assert!(game
        .pending_triggers
        .iter()
        .all(|trigger| trigger.controller == p1 && trigger.source == artist));

    game.cycle_priority().await?;
    assert_eq!(life(&game, p2), 17);
    assert_eq!(life(&game, p1), 20);
    assert!(game.pending_triggers.is_empty());
    assert!(game.stack.is_empty());
    Ok(())
}

#[test_log::test(tokio::test)]
async fn enters_the_battlefield_triggers_use_the_new_object() -> Result<()> {
    let (mut game, p1, _p2) = passing_game()?;
    game.active_player = p1;
    let elf = CardBuilder::new("Elvish Visionary")
        .creature(1, 1)
        .ability(Ability::triggered(
            AbilityTriggerType::ZoneMove(ZoneMoveTrigger {
                origin: None,
                dest: Some(Zone::Battlefield),
            }),
            vec![Constraint::IsCardname],
            vec![Clause::new(ClauseEffect::DrawCard, Affected::Controller)],
        ))
        .build();
    let in_hand = game.create_card(elf, p1, Zone::Hand);
    //Another creature entering doesn't trigger it
    let bear_in_hand = game.create_card(bear(), p1, Zone::Hand);
    game.move_zones(vec![in_hand], Zone::Hand, Zone::Battlefield);
    assert_eq!(game.pending_triggers.len(), 1);
    game.move_zones(vec![bear_in_hand], Zone::Hand, Zone::Battlefield);
    assert_eq!(game.pending_triggers.len(), 1);

    game.cycle_priority().await?;
    assert_eq!(game.players.get(p1).unwrap().hand.len(), 1);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn triggers_without_legal_targets_are_removed() -> Result<()> {
    let (mut game, p1, _p2) = passing_game()?;
    game.active_player = p1;
    let seer = CardBuilder::new("Fervent Cathar")
        .creature(2, 1)
        .ability(Ability::triggered(
            AbilityTriggerType::ZoneMove(ZoneMoveTrigger {
                origin: None,
                dest: Some(Zone::Battlefield),
            }),
            vec![Constraint::IsCardname],
            vec![Clause::target(
                ClauseEffect::Destroy,
                vec![
                    Constraint::CardType(Type::Artifact),
                    Constraint::OpponentControls,
                ],
            )],
        ))
        .build();
    let in_hand = game.create_card(seer, p1, Zone::Hand);
    game.move_zones(vec![in_hand], Zone::Hand, Zone::Battlefield);
    game.layers_state_actions().await?;
    assert!(game.stack.is_empty());
    assert!(game
        .feed
        .events()
        .any(|event| matches!(event, FeedEvent::TriggerRemoved { name, .. } if name == "Fervent Cathar")));
    Ok(())
}

#[test_log::test(tokio::test)]
async fn registered_triggers_listen_from_their_zone() -> Result<()> {
    let (mut game, p1, p2) = passing_game()?;
    game.active_player = p1;
    let spirit = game.create_card(
        CardBuilder::new("Vengeful Spirit").creature(1, 1).build(),
        p1,
        Zone::Graveyard,
    );
    game.register_trigger(
        spirit,
        Zone::Graveyard,
        TriggeredAbility {
            trigger: Trigger {
                trigger: dies(),
                constraint: vec![Constraint::CardType(Type::Creature)],
            },
            effect: vec![Clause::new(ClauseEffect::GainLife(1), Affected::Controller)],
            keyword: None,
        },
    );
    let first = game.create_card(bear(), p2, Zone::Battlefield);
    let second = game.create_card(bear(), p2, Zone::Battlefield);

    game.destroy(vec![first]);
    assert_eq!(game.pending_triggers.len(), 1);
    game.cycle_priority().await?;
    assert_eq!(life(&game, p1), 21);

    //A new object in exile, the registration is gone with the old one
    game.exile(vec![spirit]);
    game.destroy(vec![second]);
    assert!(game.pending_triggers.is_empty());
    game.layers_state_actions().await?;
    assert!(game.registrations.is_empty());
    Ok(())
}
