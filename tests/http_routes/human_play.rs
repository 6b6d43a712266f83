use std::time::Duration;

use reqwest;
use serde_json::json;
use serial_test::serial;

use crate::common;

#[tokio::test]
#[serial]
async fn register_human_is_idempotent_per_ip() {
    let app = common::spawn_app().await;
    let client = reqwest::Client::new();

    let first: serde_json::Value = client
        .post(format!("{}/human/register", app.base_url))
        .send()
        .await
        .expect("register failed")
        .json()
        .await
        .expect("invalid register payload");
    let second: serde_json::Value = client
        .post(format!("{}/human/register", app.base_url))
        .send()
        .await
        .expect("register failed")
        .json()
        .await
        .expect("invalid register payload");

    assert_eq!(first["human_id"], second["human_id"]);

    app.stop().await;
}

#[tokio::test]
#[serial]
async fn human_queue_rejects_duplicates() {
    let app = common::spawn_app().await;
    let client = reqwest::Client::new();

    client
        .post(format!("{}/human/register", app.base_url))
        .send()
        .await
        .expect("register failed");

    let resp = client
        .post(format!("{}/human/join_matchmaking", app.base_url))
        .send()
        .await
        .expect("join failed");
    assert!(resp.status().is_success());

    let resp = client
        .post(format!("{}/human/join_matchmaking", app.base_url))
        .send()
        .await
        .expect("join failed");
    assert_eq!(resp.status(), 400);

    let status: serde_json::Value = client
        .get(format!("{}/human/check_matchmaking_status", app.base_url))
        .send()
        .await
        .expect("status failed")
        .json()
        .await
        .expect("invalid status payload");
    assert_eq!(status["status"], "Searching");

    app.stop().await;
}

#[tokio::test]
#[serial]
async fn human_plays_an_agent_to_completion() {
    let app = common::spawn_app().await;
    let client = reqwest::Client::new();

    // An agent waits in the default environment; the human joins it.
    let token = common::register_agent(&app, "versus-human", "versus@example.com").await;
    common::join_queue(&app, "versus-human", &token, "Arcade-v0").await;

    client
        .post(format!("{}/human/register", app.base_url))
        .send()
        .await
        .expect("register failed");
    let resp = client
        .post(format!("{}/human/join_matchmaking", app.base_url))
        .send()
        .await
        .expect("join failed");
    assert!(resp.status().is_success());

    // Wait until the human's poll reports the match.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(30);
    let mut matched = None;
    while tokio::time::Instant::now() < deadline {
        let status: serde_json::Value = client
            .get(format!("{}/human/check_matchmaking_status", app.base_url))
            .send()
            .await
            .expect("status failed")
            .json()
            .await
            .expect("invalid status payload");
        if status["status"] == "Match found" {
            matched = Some(status);
            break;
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }
    let matched = matched.expect("human was never matched");
    assert_eq!(matched["opponent_name"], "versus-human");
    // The meta environment resolved to a concrete variant.
    assert_eq!(matched["env_id"], "Nim-v0");

    let game_id = matched["game_id"].as_i64().unwrap();
    let agent_player_id = 1 - matched["player_id"].as_i64().unwrap();

    // Drive both sides until someone ends the game.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(30);
    let mut game_over = false;
    while tokio::time::Instant::now() < deadline && !game_over {
        // Human side.
        let turn: serde_json::Value = client
            .get(format!("{}/human/check_turn", app.base_url))
            .query(&[("game_id", game_id)])
            .send()
            .await
            .expect("human check_turn failed")
            .json()
            .await
            .expect("invalid human check_turn payload");
        match turn["status"].as_str().unwrap() {
            "Game concluded" => {
                game_over = true;
                continue;
            }
            "Your turn" => {
                let mv: serde_json::Value = client
                    .post(format!("{}/human/make_move", app.base_url))
                    .json(&json!({ "game_id": game_id, "move": "[take 1]" }))
                    .send()
                    .await
                    .expect("make_move failed")
                    .json()
                    .await
                    .expect("invalid make_move payload");
                if mv["status"] == "Game completed" {
                    assert!(mv["reward"].is_number());
                    game_over = true;
                    continue;
                }
                assert_eq!(mv["status"], "Move accepted");
            }
            _ => {}
        }

        // Agent side.
        let turn: serde_json::Value = client
            .get(format!("{}/check_turn", app.base_url))
            .query(&[
                ("env_id", "Arcade-v0".to_string()),
                ("model_name", "versus-human".to_string()),
                ("model_token", token.clone()),
                ("game_id", game_id.to_string()),
                ("player_id", agent_player_id.to_string()),
            ])
            .send()
            .await
            .expect("agent check_turn failed")
            .json()
            .await
            .expect("invalid agent check_turn payload");
        match turn["status"].as_str().unwrap() {
            "Game concluded" => {
                game_over = true;
            }
            "Your turn" => {
                let step: serde_json::Value = client
                    .post(format!("{}/step", app.base_url))
                    .json(&json!({
                        "env_id": "Arcade-v0",
                        "model_name": "versus-human",
                        "model_token": token,
                        "game_id": game_id,
                        "action_text": "[take 1]",
                    }))
                    .send()
                    .await
                    .expect("step failed")
                    .json()
                    .await
                    .expect("invalid step payload");
                if step["done"] == true {
                    game_over = true;
                }
            }
            _ => {}
        }

        tokio::time::sleep(Duration::from_millis(200)).await;
    }
    assert!(game_over, "game never finished");

    // Outcome is recorded for the human seat.
    let outcome: serde_json::Value = client
        .get(format!("{}/human/get_match_outcome", app.base_url))
        .query(&[
            ("player_id", matched["player_id"].as_i64().unwrap()),
            ("game_id", game_id),
        ])
        .send()
        .await
        .expect("get_match_outcome failed")
        .json()
        .await
        .expect("invalid outcome payload");
    let recorded = outcome["outcome"].as_str().unwrap();
    assert!(recorded == "Win" || recorded == "Loss" || recorded == "Draw");

    // Stats reflect the finished game.
    let stats: serde_json::Value = client
        .get(format!("{}/human/get_stats", app.base_url))
        .send()
        .await
        .expect("get_stats failed")
        .json()
        .await
        .expect("invalid stats payload");
    assert_eq!(stats["games_played"], 1);
    assert_eq!(stats["recent_games"][0]["environment"], "Nim-v0");
    assert_eq!(stats["recent_games"][0]["opponent"], "versus-human");

    app.stop().await;
}

#[tokio::test]
#[serial]
async fn stats_are_empty_for_unknown_ip() {
    let app = common::spawn_app().await;
    let client = reqwest::Client::new();

    let stats: serde_json::Value = client
        .get(format!("{}/human/get_stats", app.base_url))
        .send()
        .await
        .expect("get_stats failed")
        .json()
        .await
        .expect("invalid stats payload");

    assert_eq!(stats["games_played"], 0);
    assert_eq!(stats["wins"], 0);
    assert_eq!(stats["recent_games"].as_array().unwrap().len(), 0);

    app.stop().await;
}
