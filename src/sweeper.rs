// Timeout sweeper: bounds turn time, game load time, and queue inactivity.
//
// Runs at the start of every matchmaking tick. Deadlines are data, not
// task cancellation: nothing in-flight is interrupted, the sweep just
// forces the recorded state to a terminal answer once a clock runs out.

use sqlx::PgConnection;

use crate::config::{MATCHMAKING_INACTIVITY_TIMEOUT, STEP_TIMEOUT, now_ts};
use crate::db::player_game::PlayerGameRepository;
use crate::db::queue::QueueRepository;
use crate::db::turn_log::TurnLogRepository;
use crate::elo;
use crate::errors::AppError;
use crate::models::db::{GameStatus, Outcome};
use crate::session::fail_game;
use crate::state::AppState;

/// One full sweep: turn timeouts, load stalls, queue inactivity.
pub async fn run(state: &AppState) -> Result<(), AppError> {
    enforce_turn_timeouts(state).await?;
    enforce_load_stalls(state).await?;
    enforce_queue_inactivity(state).await?;
    Ok(())
}

/// Forfeit every game whose pending turn has been owed longer than
/// `STEP_TIMEOUT`.
async fn enforce_turn_timeouts(state: &AppState) -> Result<(), AppError> {
    let cutoff = now_ts() - STEP_TIMEOUT;
    let expired = TurnLogRepository::new(state.postgres.clone())
        .expired_pending(cutoff)
        .await?;

    let seats = PlayerGameRepository::new(state.postgres.clone());
    for log in expired {
        let seat = match seats.find_by_id(log.player_game_id).await {
            Ok(seat) => seat,
            Err(e) => {
                tracing::error!("Skipping expired turn {}: {}", log.id, e);
                continue;
            }
        };

        match forfeit_game(state, seat.game_id, &seat.participant_name).await {
            Ok(true) => {}
            Ok(false) => {} // lost the race against a concurrent finish
            Err(e) => {
                tracing::error!("Failed to forfeit game {}: {}", seat.game_id, e);
            }
        }
    }
    Ok(())
}

/// Force-finish an active game against the participant that timed out.
/// The offender loses with reward -1; everyone still unrewarded wins with
/// reward 0. Returns false when the game already reached a terminal state.
pub async fn forfeit_game(
    state: &AppState,
    game_id: i64,
    offender_name: &str,
) -> Result<bool, AppError> {
    let reason = format!("Player '{}' timed out.", offender_name);

    let mut tx = state
        .postgres
        .begin()
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to begin forfeit tx: {}", e)))?;

    let environment_id = sqlx::query_scalar::<_, String>(
        "UPDATE games SET status = $1, reason = $2
        WHERE id = $3 AND status = $4
        RETURNING environment_id",
    )
    .bind(GameStatus::Finished.as_str())
    .bind(&reason)
    .bind(game_id)
    .bind(GameStatus::Active.as_str())
    .fetch_optional(&mut *tx)
    .await
    .map_err(|e| AppError::DatabaseError(format!("Failed to finish game: {}", e)))?;

    let Some(environment_id) = environment_id else {
        return Ok(false);
    };

    assign_forfeit_rewards(&mut tx, game_id, offender_name).await?;
    elo::apply_rating_updates(&mut tx, game_id, &environment_id, &state.agents).await?;

    tx.commit()
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to commit forfeit tx: {}", e)))?;

    state.sessions.remove(game_id).await;
    tracing::info!("Player '{}' in game {} timed out. Game concluded.", offender_name, game_id);
    Ok(true)
}

async fn assign_forfeit_rewards(
    conn: &mut PgConnection,
    game_id: i64,
    offender_name: &str,
) -> Result<(), AppError> {
    sqlx::query(
        "UPDATE player_games SET reward = -1, outcome = $1
        WHERE game_id = $2 AND participant_name = $3",
    )
    .bind(Outcome::Loss.as_str())
    .bind(game_id)
    .bind(offender_name)
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::DatabaseError(format!("Failed to assign forfeit loss: {}", e)))?;

    sqlx::query(
        "UPDATE player_games SET reward = 0, outcome = $1
        WHERE game_id = $2 AND participant_name <> $3 AND reward IS NULL",
    )
    .bind(Outcome::Win.as_str())
    .bind(game_id)
    .bind(offender_name)
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::DatabaseError(format!("Failed to assign forfeit wins: {}", e)))?;

    Ok(())
}

/// Fail games that never produced a single observation: the session was
/// initialized but nothing came out within `STEP_TIMEOUT`. No rewards, no
/// rating movement; participants learn of it through the results endpoint.
async fn enforce_load_stalls(state: &AppState) -> Result<(), AppError> {
    let cutoff = now_ts() - STEP_TIMEOUT;
    let stalled = PlayerGameRepository::new(state.postgres.clone())
        .stalled_seats(cutoff)
        .await?;

    let mut failed_games = std::collections::HashSet::new();
    for seat in stalled {
        if !failed_games.insert(seat.game_id) {
            continue;
        }
        if let Err(e) = fail_game(state, seat.game_id, None).await {
            tracing::error!("Failed to mark game {} as failed: {}", seat.game_id, e);
        }
    }
    Ok(())
}

/// Drop queue entries whose owner stopped polling.
async fn enforce_queue_inactivity(state: &AppState) -> Result<(), AppError> {
    let queue = QueueRepository::new(state.postgres.clone());
    let now = now_ts();

    for entry in queue.list_all().await? {
        if now - entry.last_checked > MATCHMAKING_INACTIVITY_TIMEOUT {
            if queue.delete_by_id(entry.id).await? {
                tracing::info!(
                    "Removed '{}' from '{}' matchmaking due to inactivity",
                    entry.participant_name,
                    entry.environment_id
                );
            }
        }
    }
    Ok(())
}
