use crate::client_message::{Ask, ClientMessage, Notification};
use crate::errors::MTGError;
use crate::game::build_game::GameBuilder;
use crate::game::state_based::LoseReason;
use crate::game::GameOutcome;
use crate::log::FeedEvent;
use crate::player::{PassingClient, PlayerCon};
use crate::tests::common_test::{game_with_libraries, passing_game, test_config, wastes, ScriptedClient};
use anyhow::Result;
use common::entities::PlayerId;
use common::steps::{Phase, TURN_PHASES};
use serde_json::{json, Value};
use std::time::Duration;

//The reply a client that never does anything would send
fn passing_reply(ask: &Ask) -> Value {
    if ask.pair_bounds().is_some() {
        return json!({});
    }
    if let Some((_, min, _)) = ask.selection_bounds() {
        return json!((0..min).collect::<Vec<usize>>());
    }
    let len = ask.order_len().unwrap_or(0);
    json!((0..len).collect::<Vec<usize>>())
}

fn turns_begun(events: &[FeedEvent]) -> Vec<PlayerId> {
    events
        .iter()
        .filter_map(|event| match event {
            FeedEvent::TurnBegan { player, .. } => Some(*player),
            _ => None,
        })
        .collect()
}

#[test_log::test(tokio::test)]
async fn decking_ends_a_full_game() -> Result<()> {
    //Seven cards to the opening hand leave one to draw
    let (mut game, p1, p2) = game_with_libraries(PassingClient, PassingClient, 8)?;
    let result = game.run().await?;
    assert_eq!(result.outcome, GameOutcome::Winner(p1));
    assert_eq!(result.losers, vec![p2]);
    assert_eq!(game.turn_number, 4);

    let events: Vec<FeedEvent> = game.feed.events().cloned().collect();
    assert_eq!(turns_begun(&events), vec![p1, p2, p1, p2]);
    assert!(events.contains(&FeedEvent::PlayerLost {
        player: p2,
        reason: LoseReason::DrewFromEmptyLibrary
    }));
    assert_eq!(events.last(), Some(&FeedEvent::GameEnded(GameOutcome::Winner(p1))));
    //Both discarded down to seven at the end of the turns they drew
    assert_eq!(game.players.get(p1).unwrap().hand.len(), 7);
    assert_eq!(game.players.get(p1).unwrap().graveyard.len(), 1);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn subscribers_see_every_committed_entry() -> Result<()> {
    let (mut game, _p1, _p2) = game_with_libraries(PassingClient, PassingClient, 8)?;
    let mut rx = game.subscribe();
    game.run().await?;
    let mut received = Vec::new();
    while let Ok(entry) = rx.try_recv() {
        received.push(entry);
    }
    assert_eq!(received.as_slice(), game.feed.history());
    assert!(received
        .windows(2)
        .all(|pair| pair[1].seq == pair[0].seq + 1));
    Ok(())
}

#[test_log::test(tokio::test)]
async fn channel_players_answer_from_another_task() -> Result<()> {
    let (con, mut rx) = PlayerCon::channel(8);
    let deck = vec![wastes(); 8];
    let mut builder = GameBuilder::new().with_config(test_config());
    let p1 = builder.add_player("p1", &deck, con)?;
    let p2 = builder.add_player("p2", &deck, PlayerCon::new_mock(PassingClient))?;
    let mut game = builder.build()?;

    let responder = async move {
        let mut answered = 0;
        while let Some(request) = rx.recv().await {
            assert_eq!(request.player, p1);
            match request.message {
                ClientMessage::Notify(Notification::GameOver(_)) => break,
                ClientMessage::Notify(_) => {}
                ClientMessage::AskUser(ask) => {
                    answered += 1;
                    if let Some(reply) = request.reply {
                        let _ = reply.send(passing_reply(&ask));
                    }
                }
            }
        }
        answered
    };
    let (result, answered) = tokio::time::timeout(Duration::from_secs(30), async {
        futures::join!(game.run(), responder)
    })
    .await?;
    let result = result?;
    assert_eq!(result.outcome, GameOutcome::Winner(p1));
    assert_eq!(result.losers, vec![p2]);
    assert!(answered > 0);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn unresponsive_clients_abort_the_game() -> Result<()> {
    let (mut game, p1, _p2) =
        game_with_libraries(ScriptedClient::new().invalid_replies(), PassingClient, 20)?;
    let aborted = match game.run().await {
        Ok(result) => panic!("game finished with {:?}", result),
        Err(aborted) => aborted,
    };
    assert_eq!(aborted.error, MTGError::UnresponsiveClient(p1));
    assert!(!aborted.recent_events.is_empty());
    assert!(aborted.recent_events.len() <= game.config.dump_length);
    assert_eq!(game.outcome, GameOutcome::Ongoing);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn extra_turns_come_before_the_normal_rotation() -> Result<()> {
    let (mut game, p1, p2) = passing_game()?;
    game.turn_number = 1;
    game.active_player = p1;
    game.extra_turns.push_back(p1);

    game.advance().await?;
    assert_eq!(game.active_player, p1);
    assert_eq!(game.turn_number, 2);
    assert_eq!(game.phases, TURN_PHASES.to_vec());
    assert!(game
        .feed
        .events()
        .any(|event| *event == FeedEvent::TurnBegan { player: p1, extra: true }));

    game.phases.clear();
    game.advance().await?;
    assert_eq!(game.active_player, p2);
    assert_eq!(game.turn_number, 3);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn players_who_lost_are_skipped() -> Result<()> {
    let mut builder = GameBuilder::new().with_config(test_config());
    let deck = vec![wastes(); 10];
    let mut players = Vec::new();
    for name in ["p1", "p2", "p3"] {
        players.push(builder.add_player(name, &deck, PlayerCon::new_mock(PassingClient))?);
    }
    let mut game = builder.build()?;
    game.turn_number = 1;
    game.players.get_mut(players[1]).unwrap().lost = true;

    game.advance().await?;
    assert_eq!(game.active_player, players[2]);
    game.phases.clear();
    game.advance().await?;
    assert_eq!(game.active_player, players[0]);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn the_first_player_skips_their_first_draw() -> Result<()> {
    let (mut game, p1, _p2) = passing_game()?;
    game.start_game();
    game.advance().await?;
    assert_eq!(game.turn_number, 1);
    game.advance().await?;
    assert_eq!(game.phase, Some(Phase::Begin));
    while !game.subphases.is_empty() {
        game.advance().await?;
    }
    assert_eq!(game.players.get(p1).unwrap().hand.len(), 7);
    assert_eq!(game.players.get(p1).unwrap().library.len(), 13);
    Ok(())
}
