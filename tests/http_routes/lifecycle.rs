// Matchmaker and sweeper lifecycle tests: forfeits, stalls, queue
// inactivity, and standard-agent pairing. Deadlines are triggered by
// backdating timestamps instead of sleeping through them.

use std::time::Duration;

use reqwest;
use serde_json::json;
use serial_test::serial;

use crate::common;

#[tokio::test]
#[serial]
async fn pending_turn_past_deadline_is_forfeited() {
    let app = common::spawn_app().await;
    let client = reqwest::Client::new();

    let token_a = common::register_agent(&app, "slow-a", "slow-a@example.com").await;
    let token_b = common::register_agent(&app, "slow-b", "slow-b@example.com").await;
    common::join_queue(&app, "slow-a", &token_a, "Nim-v0").await;
    common::join_queue(&app, "slow-b", &token_b, "Nim-v0").await;

    let match_a = common::poll_until_match(&app, "slow-a", &token_a, "Nim-v0", Duration::from_secs(30))
        .await
        .expect("slow-a was never matched");
    let game_id = match_a["game_id"].as_i64().unwrap();

    // Seat 0 owns the first turn; deliver its observation so a pending
    // turn exists, then never answer it.
    let first_mover = sqlx::query_scalar::<_, String>(
        "SELECT participant_name FROM player_games WHERE game_id = $1 AND player_id = 0",
    )
    .bind(game_id)
    .fetch_one(&app.pg_pool)
    .await
    .unwrap();
    let (name, token) = if first_mover == "slow-a" {
        ("slow-a", token_a.clone())
    } else {
        ("slow-b", token_b.clone())
    };

    let body: serde_json::Value = client
        .get(format!("{}/check_turn", app.base_url))
        .query(&[
            ("env_id", "Nim-v0".to_string()),
            ("model_name", name.to_string()),
            ("model_token", token.clone()),
            ("game_id", game_id.to_string()),
            ("player_id", "0".to_string()),
        ])
        .send()
        .await
        .expect("check_turn failed")
        .json()
        .await
        .expect("invalid check_turn payload");
    assert_eq!(body["status"], "Your turn");

    // Push the pending observation past the step deadline and let the
    // sweeper take the next tick.
    app.age_pending_turns(200.0).await;
    tokio::time::sleep(Duration::from_secs(5)).await;

    let (status, reason): (String, Option<String>) =
        sqlx::query_as("SELECT status, reason FROM games WHERE id = $1")
            .bind(game_id)
            .fetch_one(&app.pg_pool)
            .await
            .unwrap();
    assert_eq!(status, "finished");
    assert_eq!(reason.unwrap(), format!("Player '{}' timed out.", name));

    // Offender loses with -1, opponent wins with 0, ratings moved 16 each.
    let results: serde_json::Value = client
        .post(format!("{}/get_results", app.base_url))
        .json(&json!({ "game_id": game_id, "model_name": name, "env_id": "Nim-v0" }))
        .send()
        .await
        .expect("get_results failed")
        .json()
        .await
        .expect("invalid results payload");
    assert_eq!(results["outcome"], "Loss");
    assert_eq!(results["reward"], -1.0);
    assert_eq!(results["current_elo_score"], 984.0);

    app.stop().await;
}

#[tokio::test]
#[serial]
async fn game_with_no_observations_fails_on_stall() {
    let app = common::spawn_app().await;
    let client = reqwest::Client::new();

    let token_a = common::register_agent(&app, "stall-a", "stall-a@example.com").await;
    let token_b = common::register_agent(&app, "stall-b", "stall-b@example.com").await;
    common::join_queue(&app, "stall-a", &token_a, "Nim-v0").await;
    common::join_queue(&app, "stall-b", &token_b, "Nim-v0").await;

    let match_a = common::poll_until_match(&app, "stall-a", &token_a, "Nim-v0", Duration::from_secs(30))
        .await
        .expect("stall-a was never matched");
    let game_id = match_a["game_id"].as_i64().unwrap();

    // Nobody ever polls for a turn: no turn logs exist. Age the seats past
    // the deadline and sweep.
    app.age_seat_activity(200.0).await;
    tokio::time::sleep(Duration::from_secs(5)).await;

    let status: String = sqlx::query_scalar("SELECT status FROM games WHERE id = $1")
        .bind(game_id)
        .fetch_one(&app.pg_pool)
        .await
        .unwrap();
    assert_eq!(status, "failed");

    // No rewards were assigned and no ratings were written.
    let rated: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM player_games WHERE game_id = $1 AND reward IS NOT NULL",
    )
    .bind(game_id)
    .fetch_one(&app.pg_pool)
    .await
    .unwrap();
    assert_eq!(rated, 0);

    let ratings: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM ratings WHERE participant_name IN ('stall-a', 'stall-b')",
    )
    .fetch_one(&app.pg_pool)
    .await
    .unwrap();
    assert_eq!(ratings, 0);

    // Stepping into the failed game reports no active game.
    let resp = client
        .post(format!("{}/step", app.base_url))
        .json(&json!({
            "env_id": "Nim-v0",
            "model_name": "stall-a",
            "model_token": token_a,
            "game_id": game_id,
            "action_text": "[take 1]",
        }))
        .send()
        .await
        .expect("step failed");
    assert_eq!(resp.status(), 404);

    app.stop().await;
}

#[tokio::test]
#[serial]
async fn inactive_queue_entries_are_dropped() {
    let app = common::spawn_app().await;
    let client = reqwest::Client::new();

    let token = common::register_agent(&app, "idle-agent", "idle@example.com").await;
    common::join_queue(&app, "idle-agent", &token, "Nim-v0").await;

    // Stop polling and push the inactivity clock past the limit.
    app.age_queue_checks(31.0).await;
    tokio::time::sleep(Duration::from_secs(5)).await;

    let resp = client
        .get(format!("{}/check_matchmaking_status", app.base_url))
        .query(&[
            ("env_id", "Nim-v0"),
            ("model_name", "idle-agent"),
            ("model_token", token.as_str()),
        ])
        .send()
        .await
        .expect("status request failed");
    assert_eq!(resp.status(), 404);

    app.stop().await;
}

#[tokio::test]
#[serial]
async fn fresh_agent_does_not_get_a_standard_opponent_yet() {
    let app = common::spawn_app_with_agents(&["scripted/first-move"]).await;

    let token = common::register_agent(&app, "patient", "patient@example.com").await;
    common::join_queue(&app, "patient", &token, "Nim-v0").await;

    // Under the standard-agent waiting period every combination containing
    // the standard agent scores zero.
    let matched =
        common::poll_until_match(&app, "patient", &token, "Nim-v0", Duration::from_secs(8)).await;
    assert!(matched.is_none(), "standard agent was offered too early");

    app.stop().await;
}

#[tokio::test]
#[serial]
async fn waited_agent_plays_a_standard_opponent_to_completion() {
    let app = common::spawn_app_with_agents(&["scripted/first-move"]).await;
    let client = reqwest::Client::new();

    let token = common::register_agent(&app, "veteran", "veteran@example.com").await;
    common::join_queue(&app, "veteran", &token, "Nim-v0").await;

    // Skip the standard-agent waiting period.
    app.age_queue_entry("veteran", 120.0).await;

    let matched = common::poll_until_match(&app, "veteran", &token, "Nim-v0", Duration::from_secs(30))
        .await
        .expect("veteran was never matched against the standard agent");
    assert_eq!(matched["opponent_name"], "scripted/first-move");

    let game_id = matched["game_id"].as_i64().unwrap();
    let player_id = matched["player_id"].as_i64().unwrap();

    // The local seat plays synchronously inside our requests; we just keep
    // polling and stepping until the game ends.
    let final_payload = common::play_until_done(
        &app,
        "veteran",
        &token,
        "Nim-v0",
        game_id,
        player_id,
        "[take 1]",
        Duration::from_secs(30),
    )
    .await;
    assert_eq!(final_payload["done"], true);

    // The local seat logged complete turns (observation and action at once).
    let local_turns: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM turn_logs WHERE participant_name = 'scripted/first-move'
         AND ts_action IS NOT NULL",
    )
    .fetch_one(&app.pg_pool)
    .await
    .unwrap();
    assert!(local_turns > 0, "standard agent never logged a move");

    // Ratings moved for both sides; the standard agent uses the low K.
    let results: serde_json::Value = client
        .post(format!("{}/get_results", app.base_url))
        .json(&json!({ "game_id": game_id, "model_name": "veteran", "env_id": "Nim-v0" }))
        .send()
        .await
        .expect("get_results failed")
        .json()
        .await
        .expect("invalid results payload");
    assert!(results["outcome"] == "Win" || results["outcome"] == "Loss");

    let standard_rating: f64 = sqlx::query_scalar(
        "SELECT elo FROM ratings
        WHERE participant_name = 'scripted/first-move' AND environment_id = 'Nim-v0'
        ORDER BY updated_at DESC LIMIT 1",
    )
    .fetch_one(&app.pg_pool)
    .await
    .unwrap();
    // K = 8 for standard agents: a win or loss from 1000 moves exactly 4.
    assert!((standard_rating - 1004.0).abs() < 1e-6 || (standard_rating - 996.0).abs() < 1e-6);

    app.stop().await;
}
