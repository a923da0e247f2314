use crate::event::{DamageReason, Event};
use crate::game::state_based::{LoseReason, StateBasedAction};
use crate::game::build_game::GameBuilder;
use crate::game::GameOutcome;
use crate::player::PlayerCon;
use crate::tests::common_test::{
    bear, creature_with, game_with_libraries, graveyard_names, hill_giant, on_battlefield,
    passing_game, power_toughness, test_config, wastes, ScriptedClient,
};
use anyhow::Result;
use common::card_entities::{CardBuilder, CardFace};
use common::cardtypes::{Subtype, Supertype, Type};
use common::counters::Counter;
use common::entities::{CardId, TargetId};
use common::spellabil::KeywordAbility;
use common::zones::Zone;

fn damage(amount: i64, target: TargetId, source: CardId) -> Event {
    Event::Damage {
        amount,
        target,
        source,
        reason: DamageReason::Combat,
    }
}

fn legend() -> CardFace {
    CardBuilder::new("Isamaru, Hound of Konda")
        .creature(2, 2)
        .supertype(Supertype::Legendary)
        .build()
}

#[test_log::test(tokio::test)]
async fn lethal_damage_waits_for_the_next_check() -> Result<()> {
    let (mut game, p1, p2) = passing_game()?;
    let source = game.create_card(hill_giant(), p1, Zone::Battlefield);
    let target = game.create_card(bear(), p2, Zone::Battlefield);
    game.handle_event(damage(3, TargetId::Card(target), source));
    assert!(game.battlefield.contains(&target));
    assert_eq!(
        game.check_state_based_actions(),
        vec![StateBasedAction::LethalDamage(target)]
    );
    let performed = game.state_based_actions().await?;
    assert_eq!(performed, vec![StateBasedAction::LethalDamage(target)]);
    assert!(!game.battlefield.contains(&target));
    assert_eq!(graveyard_names(&game, p2), vec!["Grizzly Bears"]);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn creatures_die_simultaneously() -> Result<()> {
    let (mut game, p1, p2) = passing_game()?;
    let giant = game.create_card(hill_giant(), p1, Zone::Battlefield);
    let first = game.create_card(bear(), p2, Zone::Battlefield);
    let second = game.create_card(bear(), p2, Zone::Battlefield);
    game.handle_events(vec![
        damage(2, TargetId::Card(first), giant),
        damage(2, TargetId::Card(second), giant),
    ]);
    let performed = game.state_based_actions().await?;
    assert_eq!(performed.len(), 2);
    assert_eq!(graveyard_names(&game, p2).len(), 2);
    assert_eq!(game.battlefield, vec![giant]);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn indestructible_creatures_survive_lethal_damage() -> Result<()> {
    let (mut game, p1, p2) = passing_game()?;
    let giant = game.create_card(hill_giant(), p1, Zone::Battlefield);
    let wall = game.create_card(
        creature_with("Darksteel Myr", 0, 1, KeywordAbility::Indestructible),
        p2,
        Zone::Battlefield,
    );
    game.handle_event(damage(5, TargetId::Card(wall), giant));
    assert!(game.state_based_actions().await?.is_empty());
    assert!(game.battlefield.contains(&wall));
    Ok(())
}

#[test_log::test(tokio::test)]
async fn zero_life_loses_the_game() -> Result<()> {
    let (mut game, p1, p2) = passing_game()?;
    let giant = game.create_card(hill_giant(), p1, Zone::Battlefield);
    game.handle_event(damage(25, TargetId::Player(p2), giant));
    let performed = game.state_based_actions().await?;
    assert_eq!(
        performed,
        vec![StateBasedAction::PlayerLoses(p2, LoseReason::ZeroLife)]
    );
    assert_eq!(game.outcome, GameOutcome::Winner(p1));
    assert_eq!(game.result().losers, vec![p2]);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn both_players_at_zero_is_a_tie() -> Result<()> {
    let (mut game, p1, p2) = passing_game()?;
    let giant = game.create_card(hill_giant(), p1, Zone::Battlefield);
    game.handle_events(vec![
        damage(20, TargetId::Player(p1), giant),
        damage(20, TargetId::Player(p2), giant),
    ]);
    game.state_based_actions().await?;
    assert_eq!(game.outcome, GameOutcome::Tie);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn poison_counters_lose_the_game() -> Result<()> {
    let (mut game, p1, p2) = passing_game()?;
    game.handle_event(Event::PutCounter {
        affected: TargetId::Player(p2),
        counter: Counter::Poison,
        quantity: 10,
    });
    let performed = game.state_based_actions().await?;
    assert_eq!(
        performed,
        vec![StateBasedAction::PlayerLoses(p2, LoseReason::Poison)]
    );
    assert_eq!(game.outcome, GameOutcome::Winner(p1));
    Ok(())
}

#[test_log::test(tokio::test)]
async fn drawing_from_an_empty_library_loses() -> Result<()> {
    let (mut game, p1, p2) = game_with_libraries(ScriptedClient::new(), ScriptedClient::new(), 1)?;
    assert_eq!(game.draw(p2).len(), 1);
    //Nothing happens until the state based check
    assert!(game.draw(p2).is_empty());
    assert_eq!(game.outcome, GameOutcome::Ongoing);
    let performed = game.state_based_actions().await?;
    assert_eq!(
        performed,
        vec![StateBasedAction::PlayerLoses(
            p2,
            LoseReason::DrewFromEmptyLibrary
        )]
    );
    assert_eq!(game.outcome, GameOutcome::Winner(p1));
    Ok(())
}

#[test_log::test(tokio::test)]
async fn plus_and_minus_counters_annihilate() -> Result<()> {
    let (mut game, p1, _p2) = passing_game()?;
    let creature = game.create_card(bear(), p1, Zone::Battlefield);
    game.handle_events(vec![
        Event::PutCounter {
            affected: TargetId::Card(creature),
            counter: Counter::Plus1Plus1,
            quantity: 2,
        },
        Event::PutCounter {
            affected: TargetId::Card(creature),
            counter: Counter::Minus1Minus1,
            quantity: 1,
        },
    ]);
    assert_eq!(power_toughness(&game, creature), Some((3, 3)));
    let performed = game.state_based_actions().await?;
    assert_eq!(
        performed,
        vec![StateBasedAction::CounterAnnihilation(creature, 1)]
    );
    let counters = &game.cards.get(creature).unwrap().counters;
    assert_eq!(counters.get(Counter::Plus1Plus1), 1);
    assert_eq!(counters.get(Counter::Minus1Minus1), 0);
    assert_eq!(power_toughness(&game, creature), Some((3, 3)));
    Ok(())
}

#[test_log::test(tokio::test)]
async fn zero_toughness_goes_to_the_graveyard() -> Result<()> {
    let (mut game, p1, _p2) = passing_game()?;
    let creature = game.create_card(bear(), p1, Zone::Battlefield);
    game.handle_event(Event::PutCounter {
        affected: TargetId::Card(creature),
        counter: Counter::Minus1Minus1,
        quantity: 2,
    });
    let performed = game.state_based_actions().await?;
    assert_eq!(performed, vec![StateBasedAction::ZeroToughness(creature)]);
    assert_eq!(graveyard_names(&game, p1), vec!["Grizzly Bears"]);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn legend_rule_keeps_one() -> Result<()> {
    let (mut game, p1, p2) = passing_game()?;
    let first = game.create_card(legend(), p1, Zone::Battlefield);
    let second = game.create_card(legend(), p1, Zone::Battlefield);
    //A different controller doesn't count
    let theirs = game.create_card(legend(), p2, Zone::Battlefield);
    let performed = game.state_based_actions().await?;
    assert_eq!(performed, vec![StateBasedAction::LegendRule(vec![first, second])]);
    assert!(game.battlefield.contains(&first));
    assert!(!game.battlefield.contains(&second));
    assert!(game.battlefield.contains(&theirs));
    assert_eq!(graveyard_names(&game, p1), vec!["Isamaru, Hound of Konda"]);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn planeswalkers_without_loyalty_are_put_into_the_graveyard() -> Result<()> {
    let (mut game, p1, p2) = passing_game()?;
    let walker = CardBuilder::new("Chandra, Novice Pyromancer")
        .planeswalker(3)
        .subtype(Subtype::Chandra)
        .build();
    let walker = game.create_card(walker, p2, Zone::Battlefield);
    assert_eq!(game.loyalty(walker), 3);
    let giant = game.create_card(hill_giant(), p1, Zone::Battlefield);
    game.handle_event(damage(3, TargetId::Card(walker), giant));
    assert_eq!(game.loyalty(walker), 0);
    let performed = game.state_based_actions().await?;
    assert_eq!(performed, vec![StateBasedAction::ZeroLoyalty(walker)]);
    assert_eq!(graveyard_names(&game, p2), vec!["Chandra, Novice Pyromancer"]);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn tokens_cease_to_exist_off_the_battlefield() -> Result<()> {
    let (mut game, p1, _p2) = passing_game()?;
    let soldier = CardBuilder::new("Soldier")
        .creature(1, 1)
        .subtype(Subtype::Soldier)
        .build();
    game.handle_event(Event::CreateToken {
        player: p1,
        face: soldier,
    });
    let tokens = on_battlefield(&game, "Soldier");
    assert_eq!(tokens.len(), 1);
    assert!(game.is_type(tokens[0], Type::Creature));
    game.destroy(tokens.clone());
    assert_eq!(graveyard_names(&game, p1), vec!["Soldier"]);
    let performed = game.state_based_actions().await?;
    assert_eq!(performed.len(), 1);
    assert!(graveyard_names(&game, p1).is_empty());
    game.check_invariants()?;
    Ok(())
}

#[test_log::test(tokio::test)]
async fn losing_player_leaves_with_their_objects() -> Result<()> {
    let mut builder = GameBuilder::new().with_config(test_config());
    let deck = vec![wastes(); 5];
    let mut players = Vec::new();
    for name in ["p1", "p2", "p3"] {
        players.push(builder.add_player(
            name,
            &deck,
            PlayerCon::new_mock(ScriptedClient::new()),
        )?);
    }
    let mut game = builder.build()?;
    let (p1, p2, p3) = (players[0], players[1], players[2]);
    let giant = game.create_card(hill_giant(), p1, Zone::Battlefield);
    game.create_card(bear(), p2, Zone::Battlefield);
    game.handle_event(damage(20, TargetId::Player(p2), giant));
    game.state_based_actions().await?;
    assert_eq!(game.outcome, GameOutcome::Ongoing);
    assert!(!game.is_playing(p2));
    assert!(on_battlefield(&game, "Grizzly Bears").is_empty());
    assert!(game.players.get(p2).unwrap().library.is_empty());
    assert_eq!(game.opponents(p1), vec![p3]);
    game.check_invariants()?;
    Ok(())
}
