// Terminal transitions for games.
//
// Finalization must be atomic from a reader's perspective: the moment a
// game reads as `finished`, every seat has its reward and outcome and the
// rating history includes the new rows. Everything runs in one transaction
// guarded by the `status = 'active'` check, which is what makes the update
// run exactly once under concurrent submitters and the sweeper.

use crate::elo;
use crate::errors::AppError;
use crate::games::{Rewards, StepInfo};
use crate::models::db::{GameStatus, Outcome, PlayerGame};
use crate::session::StepResult;
use crate::state::AppState;

const NO_REASON: &str = "No reason provided";

/// Handle a finished `StepResult`: no-op for ongoing games, full
/// finalization otherwise. Convenience for the handlers.
pub async fn conclude_game(
    state: &AppState,
    game_id: i64,
    result: &StepResult,
) -> Result<bool, AppError> {
    match result {
        StepResult::Ongoing => Ok(false),
        StepResult::Finished { rewards, info } => {
            finalize_game(state, game_id, rewards, info).await?;
            Ok(true)
        }
    }
}

/// Move an active game to `finished`, assign rewards and outcomes, append
/// rating rows, and drop the session. Safe to call more than once; only
/// the caller that wins the status transition does the work.
pub async fn finalize_game(
    state: &AppState,
    game_id: i64,
    rewards: &Rewards,
    info: &StepInfo,
) -> Result<(), AppError> {
    let reason = info.reason.as_deref().unwrap_or(NO_REASON);

    let mut tx = state
        .postgres
        .begin()
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to begin finalize tx: {}", e)))?;

    let environment_id = sqlx::query_scalar::<_, String>(
        "UPDATE games SET status = $1, reason = $2
        WHERE id = $3 AND status = $4
        RETURNING environment_id",
    )
    .bind(GameStatus::Finished.as_str())
    .bind(reason)
    .bind(game_id)
    .bind(GameStatus::Active.as_str())
    .fetch_optional(&mut *tx)
    .await
    .map_err(|e| AppError::DatabaseError(format!("Failed to finish game: {}", e)))?;

    let Some(environment_id) = environment_id else {
        // Someone else already finalized; nothing left to do.
        state.sessions.remove(game_id).await;
        return Ok(());
    };

    let players = sqlx::query_as::<_, PlayerGame>(
        "SELECT id, game_id, participant_name, player_id, reward, outcome,
                last_action_time, is_human, human_ip
        FROM player_games
        WHERE game_id = $1
        ORDER BY player_id",
    )
    .bind(game_id)
    .fetch_all(&mut *tx)
    .await
    .map_err(|e| AppError::DatabaseError(format!("Failed to load seats: {}", e)))?;

    let min_reward = rewards.values().cloned().fold(f64::INFINITY, f64::min);
    let max_reward = rewards.values().cloned().fold(f64::NEG_INFINITY, f64::max);

    for player in &players {
        let reward = rewards.get(&player.player_id).copied().unwrap_or(0.0);
        let outcome = Outcome::classify(reward, min_reward, max_reward);

        sqlx::query("UPDATE player_games SET reward = $1, outcome = $2 WHERE id = $3")
            .bind(reward)
            .bind(outcome.as_str())
            .bind(player.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to set reward: {}", e)))?;
    }

    elo::apply_rating_updates(&mut tx, game_id, &environment_id, &state.agents).await?;

    tx.commit()
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to commit finalize tx: {}", e)))?;

    state.sessions.remove(game_id).await;
    tracing::info!("Game {} finished: {}", game_id, reason);
    Ok(())
}

/// Terminal failure: the rules engine misbehaved or the game never loaded.
/// No rewards are assigned and ratings are untouched.
pub async fn fail_game(state: &AppState, game_id: i64, reason: Option<&str>) -> Result<(), AppError> {
    let marked = crate::db::game::GameRepository::new(state.postgres.clone())
        .mark_failed(game_id, reason)
        .await?;

    state.sessions.remove(game_id).await;
    if marked {
        tracing::warn!(
            "Game {} failed: {}",
            game_id,
            reason.unwrap_or("no reason recorded")
        );
    }
    Ok(())
}
