// Rating updates, applied exactly once per finished game.
//
// Each player is compared against the mean of their opponents' previous
// ratings; the K-factor depends on who is playing. New values are appended
// to the rating history inside the caller's finalization transaction so a
// finished game and its ratings become visible together.

use sqlx::PgConnection;

use crate::agents::AgentRoster;
use crate::config::{
    DEFAULT_ELO, GAMES_THRESHOLD, HUMAN_K_FACTOR, HUMANITY_NAME, INITIAL_K, REDUCED_K,
    STANDARD_AGENT_K_FACTOR, now_ts,
};
use crate::errors::AppError;
use crate::models::db::{Outcome, PlayerGame};

/// Everything needed to rate one player of a finished game.
#[derive(Debug, Clone)]
pub struct RatingInput {
    pub participant_name: String,
    pub score: f64,
    pub prev_elo: f64,
    pub k_factor: f64,
}

/// K-factor schedule: fixed low K for the shared human participant and for
/// standard agents, a fast-moving K for new agents, and a settled K once
/// enough games are on record.
pub fn dynamic_k(participant_name: &str, is_standard: bool, games_played: i64) -> f64 {
    if participant_name == HUMANITY_NAME {
        return HUMAN_K_FACTOR;
    }
    if is_standard {
        return STANDARD_AGENT_K_FACTOR;
    }
    if games_played < GAMES_THRESHOLD {
        INITIAL_K
    } else {
        REDUCED_K
    }
}

/// New rating per player, in input order, rounded to two decimals.
pub fn compute_new_ratings(players: &[RatingInput]) -> Vec<f64> {
    players
        .iter()
        .map(|player| {
            let opponents: Vec<f64> = players
                .iter()
                .filter(|p| p.participant_name != player.participant_name)
                .map(|p| p.prev_elo)
                .collect();
            let avg_opp = if opponents.is_empty() {
                DEFAULT_ELO
            } else {
                opponents.iter().sum::<f64>() / opponents.len() as f64
            };

            let expected = 1.0 / (1.0 + 10f64.powf((avg_opp - player.prev_elo) / 400.0));
            let new_elo = player.prev_elo + player.k_factor * (player.score - expected);
            (new_elo * 100.0).round() / 100.0
        })
        .collect()
}

/// Recompute and append ratings for every player of a finished game.
///
/// Runs on the finalization transaction: reads the rewarded player_games,
/// classifies outcomes from the reward spread, and appends one rating row
/// per player. The rating history itself is never mutated.
pub async fn apply_rating_updates(
    conn: &mut PgConnection,
    game_id: i64,
    environment_id: &str,
    roster: &AgentRoster,
) -> Result<(), AppError> {
    let players = sqlx::query_as::<_, PlayerGame>(
        "SELECT id, game_id, participant_name, player_id, reward, outcome,
                last_action_time, is_human, human_ip
        FROM player_games
        WHERE game_id = $1
        ORDER BY player_id",
    )
    .bind(game_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| AppError::DatabaseError(format!("Failed to load players for rating: {}", e)))?;

    if players.is_empty() {
        return Ok(());
    }

    let rewards: Vec<f64> = players.iter().map(|p| p.reward.unwrap_or(0.0)).collect();
    let min_reward = rewards.iter().cloned().fold(f64::INFINITY, f64::min);
    let max_reward = rewards.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    let mut inputs = Vec::with_capacity(players.len());
    for (player, reward) in players.iter().zip(&rewards) {
        let prev_elo = sqlx::query_scalar::<_, f64>(
            "SELECT elo FROM ratings
            WHERE participant_name = $1 AND environment_id = $2
            ORDER BY updated_at DESC
            LIMIT 1",
        )
        .bind(&player.participant_name)
        .bind(environment_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to read rating: {}", e)))?
        .unwrap_or(DEFAULT_ELO);

        let games_played = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM player_games WHERE participant_name = $1",
        )
        .bind(&player.participant_name)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to count games: {}", e)))?;

        inputs.push(RatingInput {
            participant_name: player.participant_name.clone(),
            score: Outcome::classify(*reward, min_reward, max_reward).score(),
            prev_elo,
            k_factor: dynamic_k(
                &player.participant_name,
                roster.is_standard(&player.participant_name),
                games_played,
            ),
        });
    }

    let new_elos = compute_new_ratings(&inputs);
    let now = now_ts();
    for (input, new_elo) in inputs.iter().zip(new_elos) {
        sqlx::query(
            "INSERT INTO ratings (participant_name, environment_id, elo, updated_at)
            VALUES ($1, $2, $3, $4)",
        )
        .bind(&input.participant_name)
        .bind(environment_id)
        .bind(new_elo)
        .bind(now)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to append rating: {}", e)))?;

        tracing::info!(
            "Rating update - {}: {} -> {}",
            input.participant_name,
            input.prev_elo,
            new_elo
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, score: f64, prev_elo: f64, k: f64) -> RatingInput {
        RatingInput {
            participant_name: name.to_string(),
            score,
            prev_elo,
            k_factor: k,
        }
    }

    #[test]
    fn even_match_moves_sixteen_points() {
        // Two fresh 1000-rated players, winner takes 1000 + 32 * 0.5.
        let players = vec![
            input("a", 1.0, 1000.0, INITIAL_K),
            input("b", 0.0, 1000.0, INITIAL_K),
        ];
        assert_eq!(compute_new_ratings(&players), vec![1016.0, 984.0]);
    }

    #[test]
    fn draw_between_equals_changes_nothing() {
        let players = vec![
            input("a", 0.5, 1000.0, INITIAL_K),
            input("b", 0.5, 1000.0, INITIAL_K),
        ];
        assert_eq!(compute_new_ratings(&players), vec![1000.0, 1000.0]);
    }

    #[test]
    fn three_way_draw_changes_nothing() {
        let players = vec![
            input("a", 0.5, 1000.0, INITIAL_K),
            input("b", 0.5, 1000.0, INITIAL_K),
            input("c", 0.5, 1000.0, INITIAL_K),
        ];
        assert_eq!(compute_new_ratings(&players), vec![1000.0, 1000.0, 1000.0]);
    }

    #[test]
    fn underdog_gains_more_than_favorite_would() {
        let players = vec![
            input("underdog", 1.0, 900.0, INITIAL_K),
            input("favorite", 0.0, 1100.0, INITIAL_K),
        ];
        let updated = compute_new_ratings(&players);
        assert!(updated[0] - 900.0 > 16.0);
        assert!(1100.0 - updated[1] > 16.0);
    }

    #[test]
    fn k_schedule_by_participant_type() {
        assert_eq!(dynamic_k(HUMANITY_NAME, false, 0), HUMAN_K_FACTOR);
        assert_eq!(dynamic_k("scripted/bot", true, 0), STANDARD_AGENT_K_FACTOR);
        assert_eq!(dynamic_k("fresh-agent", false, 0), INITIAL_K);
        assert_eq!(dynamic_k("fresh-agent", false, GAMES_THRESHOLD - 1), INITIAL_K);
        assert_eq!(dynamic_k("veteran", false, GAMES_THRESHOLD), REDUCED_K);
    }
}
