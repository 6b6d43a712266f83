use std::time::Duration;

use reqwest;
use serde_json::json;
use serial_test::serial;

use crate::common;

#[tokio::test]
#[serial]
async fn register_model_returns_token() {
    let app = common::spawn_app().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/register_model", app.base_url))
        .json(&json!({
            "model_name": "alpha-agent",
            "description": "a test agent",
            "email": "alpha@example.com",
        }))
        .send()
        .await
        .expect("request failed");

    assert!(resp.status().is_success());
    let body: serde_json::Value = resp.json().await.expect("failed to parse response");
    let token = body["model_token"].as_str().expect("missing model_token");
    assert_eq!(token.len(), 32);

    // A second registration under the same name is rejected.
    let resp = client
        .post(format!("{}/register_model", app.base_url))
        .json(&json!({
            "model_name": "alpha-agent",
            "description": "imposter",
            "email": "other@example.com",
        }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), 400);

    app.stop().await;
}

#[tokio::test]
#[serial]
async fn register_model_rejects_invalid_email() {
    let app = common::spawn_app().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/register_model", app.base_url))
        .json(&json!({
            "model_name": "no-email-agent",
            "description": "",
            "email": "not-an-email",
        }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), 400);

    app.stop().await;
}

#[tokio::test]
#[serial]
async fn join_requires_valid_credentials_and_env() {
    let app = common::spawn_app().await;
    let client = reqwest::Client::new();
    let token = common::register_agent(&app, "queue-agent", "queue@example.com").await;

    // Wrong token: 404 on purpose.
    let resp = client
        .post(format!("{}/join_matchmaking", app.base_url))
        .json(&json!({
            "env_id": "Nim-v0",
            "model_name": "queue-agent",
            "model_token": "deadbeefdeadbeefdeadbeefdeadbeef",
        }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), 404);

    // Unknown environment: 404.
    let resp = client
        .post(format!("{}/join_matchmaking", app.base_url))
        .json(&json!({
            "env_id": "NoSuchGame-v9",
            "model_name": "queue-agent",
            "model_token": token,
        }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), 404);

    app.stop().await;
}

#[tokio::test]
#[serial]
async fn duplicate_join_is_rejected_until_dequeued() {
    let app = common::spawn_app().await;
    let client = reqwest::Client::new();
    let token = common::register_agent(&app, "dup-agent", "dup@example.com").await;

    common::join_queue(&app, "dup-agent", &token, "Nim-v0").await;

    let resp = client
        .post(format!("{}/join_matchmaking", app.base_url))
        .json(&json!({
            "env_id": "Nim-v0",
            "model_name": "dup-agent",
            "model_token": token,
        }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), 400);

    // Leave, then joining again works.
    let resp = client
        .post(format!("{}/leave_matchmaking", app.base_url))
        .json(&json!({
            "env_id": "Nim-v0",
            "model_name": "dup-agent",
            "model_token": token,
        }))
        .send()
        .await
        .expect("request failed");
    assert!(resp.status().is_success());

    // Leaving twice is a 404.
    let resp = client
        .post(format!("{}/leave_matchmaking", app.base_url))
        .json(&json!({
            "env_id": "Nim-v0",
            "model_name": "dup-agent",
            "model_token": token,
        }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), 404);

    common::join_queue(&app, "dup-agent", &token, "Nim-v0").await;

    app.stop().await;
}

#[tokio::test]
#[serial]
async fn two_fresh_agents_get_matched() {
    let app = common::spawn_app().await;

    let token_a = common::register_agent(&app, "fresh-a", "fresh-a@example.com").await;
    let token_b = common::register_agent(&app, "fresh-b", "fresh-b@example.com").await;

    common::join_queue(&app, "fresh-a", &token_a, "Nim-v0").await;
    common::join_queue(&app, "fresh-b", &token_b, "Nim-v0").await;

    let match_a = common::poll_until_match(&app, "fresh-a", &token_a, "Nim-v0", Duration::from_secs(30))
        .await
        .expect("fresh-a was never matched");
    let match_b = common::poll_until_match(&app, "fresh-b", &token_b, "Nim-v0", Duration::from_secs(30))
        .await
        .expect("fresh-b was never matched");

    assert_eq!(match_a["game_id"], match_b["game_id"]);
    assert_eq!(match_a["opponent_name"], "fresh-b");
    assert_eq!(match_b["opponent_name"], "fresh-a");
    assert_eq!(match_a["num_players"], 2);

    let ids = [
        match_a["player_id"].as_i64().unwrap(),
        match_b["player_id"].as_i64().unwrap(),
    ];
    let mut sorted = ids;
    sorted.sort();
    assert_eq!(sorted, [0, 1]);

    // Matched participants no longer hold queue entries.
    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM queue_entries")
        .fetch_one(&app.pg_pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);

    app.stop().await;
}

#[tokio::test]
#[serial]
async fn full_game_updates_ratings() {
    let app = common::spawn_app().await;
    let client = reqwest::Client::new();

    let token_a = common::register_agent(&app, "player-a", "player-a@example.com").await;
    let token_b = common::register_agent(&app, "player-b", "player-b@example.com").await;
    common::join_queue(&app, "player-a", &token_a, "Nim-v0").await;
    common::join_queue(&app, "player-b", &token_b, "Nim-v0").await;

    let match_a = common::poll_until_match(&app, "player-a", &token_a, "Nim-v0", Duration::from_secs(30))
        .await
        .expect("player-a was never matched");
    let match_b = common::poll_until_match(&app, "player-b", &token_b, "Nim-v0", Duration::from_secs(30))
        .await
        .expect("player-b was never matched");
    let game_id = match_a["game_id"].as_i64().unwrap();

    // Both agents always take one stone; one of them ends the game.
    let app_ref = &app;
    let a = common::play_until_done(
        app_ref,
        "player-a",
        &token_a,
        "Nim-v0",
        game_id,
        match_a["player_id"].as_i64().unwrap(),
        "[take 1]",
        Duration::from_secs(30),
    );
    let b = common::play_until_done(
        app_ref,
        "player-b",
        &token_b,
        "Nim-v0",
        game_id,
        match_b["player_id"].as_i64().unwrap(),
        "[take 1]",
        Duration::from_secs(30),
    );
    let (_a, _b) = futures_util::join!(a, b);

    // Both fresh at 1000 with K=32: winner lands on 1016, loser on 984.
    let mut results = Vec::new();
    for name in ["player-a", "player-b"] {
        let resp: serde_json::Value = client
            .post(format!("{}/get_results", app.base_url))
            .json(&json!({ "game_id": game_id, "model_name": name, "env_id": "Nim-v0" }))
            .send()
            .await
            .expect("get_results failed")
            .json()
            .await
            .expect("invalid results payload");
        results.push(resp);
    }

    let winner = results
        .iter()
        .find(|r| r["outcome"] == "Win")
        .expect("no winner reported");
    let loser = results
        .iter()
        .find(|r| r["outcome"] == "Loss")
        .expect("no loser reported");

    assert_eq!(winner["reward"], 1.0);
    assert_eq!(loser["reward"], -1.0);
    assert_eq!(winner["current_elo_score"], 1016.0);
    assert_eq!(loser["current_elo_score"], 984.0);
    // First rated game for both, so there is no previous rating row yet.
    assert!(winner["prev_elo_score"].is_null());
    assert!(winner["reason"].as_str().unwrap().contains("last stone"));

    app.stop().await;
}

#[tokio::test]
#[serial]
async fn same_owner_agents_are_never_matched() {
    let app = common::spawn_app().await;

    let token_a = common::register_agent(&app, "twin-a", "owner@example.com").await;
    let token_b = common::register_agent(&app, "twin-b", "owner@example.com").await;
    common::join_queue(&app, "twin-a", &token_a, "Nim-v0").await;
    common::join_queue(&app, "twin-b", &token_b, "Nim-v0").await;

    // Give the matchmaker several ticks; the only possible pairing scores
    // zero on the shared email, so both stay queued.
    let matched =
        common::poll_until_match(&app, "twin-a", &token_a, "Nim-v0", Duration::from_secs(8)).await;
    assert!(matched.is_none(), "same-owner agents were paired");

    app.stop().await;
}

#[tokio::test]
#[serial]
async fn repeated_check_turn_returns_same_observation() {
    let app = common::spawn_app().await;
    let client = reqwest::Client::new();

    let token_a = common::register_agent(&app, "poll-a", "poll-a@example.com").await;
    let token_b = common::register_agent(&app, "poll-b", "poll-b@example.com").await;
    common::join_queue(&app, "poll-a", &token_a, "Nim-v0").await;
    common::join_queue(&app, "poll-b", &token_b, "Nim-v0").await;

    let matched = common::poll_until_match(&app, "poll-a", &token_a, "Nim-v0", Duration::from_secs(30))
        .await
        .expect("poll-a was never matched");
    let game_id = matched["game_id"].as_i64().unwrap();
    let player_id = matched["player_id"].as_i64().unwrap();

    // Find whichever agent holds the first turn and poll it twice.
    let mut observations = Vec::new();
    for _ in 0..2 {
        let body: serde_json::Value = client
            .get(format!("{}/check_turn", app.base_url))
            .query(&[
                ("env_id", "Nim-v0".to_string()),
                ("model_name", "poll-a".to_string()),
                ("model_token", token_a.clone()),
                ("game_id", game_id.to_string()),
                ("player_id", player_id.to_string()),
            ])
            .send()
            .await
            .expect("check_turn failed")
            .json()
            .await
            .expect("invalid check_turn payload");
        observations.push(body);
    }

    assert_eq!(observations[0]["status"], observations[1]["status"]);
    if observations[0]["status"] == "Your turn" {
        assert_eq!(observations[0]["observation"], observations[1]["observation"]);

        // Only one pending turn row exists despite two polls.
        let pending: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM turn_logs WHERE ts_action IS NULL",
        )
        .fetch_one(&app.pg_pool)
        .await
        .unwrap();
        assert_eq!(pending, 1);
    }

    app.stop().await;
}
