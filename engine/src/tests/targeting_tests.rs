use crate::errors::MTGError;
use crate::log::FeedEvent;
use crate::tests::common_test::{
    add_mana, bear, creature_with, life, main_phase, passing_game, shock, two_player_game, Aim,
    Choice, ScriptedClient,
};
use anyhow::Result;
use common::card_entities::CardBuilder;
use common::cardtypes::Type;
use common::entities::TargetId;
use common::mana::Color;
use common::spellabil::{Clause, ClauseEffect, Constraint, KeywordAbility};
use common::zones::Zone;

fn damage_clause() -> Clause {
    shock().effect[0].clone()
}

#[test_log::test(tokio::test)]
async fn hexproof_only_stops_opponents() -> Result<()> {
    let (mut game, p1, p2) = passing_game()?;
    let warded = game.create_card(
        creature_with("Gladecover Scout", 1, 1, KeywordAbility::Hexproof),
        p2,
        Zone::Battlefield,
    );
    let mine = game.create_card(shock(), p1, Zone::Hand);
    let theirs = game.create_card(shock(), p2, Zone::Hand);
    let clause = damage_clause();

    let from_opponent = game.legal_targets(&clause, mine);
    assert_eq!(
        from_opponent,
        vec![TargetId::Player(p1), TargetId::Player(p2)]
    );
    assert!(game
        .legal_targets(&clause, theirs)
        .contains(&TargetId::Card(warded)));
    assert_eq!(
        game.validate_targets(&clause, mine, &[TargetId::Card(warded)]),
        Err(MTGError::IllegalTarget(TargetId::Card(warded)))
    );
    assert!(game
        .validate_targets(&clause, theirs, &[TargetId::Card(warded)])
        .is_ok());
    Ok(())
}

#[test_log::test(tokio::test)]
async fn shroud_stops_everyone() -> Result<()> {
    let (mut game, p1, p2) = passing_game()?;
    let shrouded = game.create_card(
        creature_with("Blastoderm", 5, 5, KeywordAbility::Shroud),
        p2,
        Zone::Battlefield,
    );
    let clause = damage_clause();
    for player in [p1, p2] {
        let source = game.create_card(shock(), player, Zone::Hand);
        assert!(!game.is_valid_target(&clause, source, TargetId::Card(shrouded)));
    }
    Ok(())
}

#[test_log::test(tokio::test)]
async fn zones_other_than_the_battlefield_must_be_named() -> Result<()> {
    let (mut game, p1, _p2) = passing_game()?;
    let on_field = game.create_card(bear(), p1, Zone::Battlefield);
    let buried = game.create_card(bear(), p1, Zone::Graveyard);
    let raise_dead = Clause::target(
        ClauseEffect::Destroy,
        vec![
            Constraint::InZone(Zone::Graveyard),
            Constraint::CardType(Type::Creature),
        ],
    );
    let source = game.create_card(shock(), p1, Zone::Hand);
    assert_eq!(
        game.legal_targets(&raise_dead, source),
        vec![TargetId::Card(buried)]
    );
    //Without a zone only the battlefield is searched
    let targets = game.legal_targets(&damage_clause(), source);
    assert!(targets.contains(&TargetId::Card(on_field)));
    assert!(!targets.contains(&TargetId::Card(buried)));
    Ok(())
}

#[test_log::test(tokio::test)]
async fn players_out_of_the_game_cant_be_targeted() -> Result<()> {
    let (mut game, p1, p2) = passing_game()?;
    let source = game.create_card(shock(), p1, Zone::Hand);
    game.players.get_mut(p2).unwrap().lost = true;
    assert_eq!(
        game.legal_targets(&damage_clause(), source),
        vec![TargetId::Player(p1)]
    );
    Ok(())
}

#[test_log::test(tokio::test)]
async fn players_may_target_themselves() -> Result<()> {
    let p1_client = ScriptedClient::new()
        .choose(Choice::Cast("Shock"))
        .aim(Aim::Me);
    let (mut game, p1, p2) = two_player_game(p1_client, ScriptedClient::new())?;
    main_phase(&mut game, p1);
    game.create_card(shock(), p1, Zone::Hand);
    add_mana(&mut game, p1, Color::Red, 1);

    game.cycle_priority().await?;

    assert_eq!(life(&game, p1), 18);
    assert_eq!(life(&game, p2), 20);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn spells_without_legal_targets_cant_be_cast() -> Result<()> {
    let p1_client = ScriptedClient::new().choose(Choice::Cast("Murder"));
    let (mut game, p1, _p2) = two_player_game(p1_client, ScriptedClient::new())?;
    main_phase(&mut game, p1);
    let murder = CardBuilder::new("Murder")
        .instant()
        .effect(Clause::target(
            ClauseEffect::Destroy,
            vec![Constraint::CardType(Type::Creature)],
        ))
        .build();
    let in_hand = game.create_card(murder, p1, Zone::Hand);

    game.cycle_priority().await?;

    assert!(game.players.get(p1).unwrap().hand.contains(&in_hand));
    assert!(game.feed.events().any(|event| matches!(
        event,
        FeedEvent::ActionRejected {
            error: MTGError::NoValidTargets,
            ..
        }
    )));
    Ok(())
}
