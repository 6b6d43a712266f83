// Matchmaker: per-environment pairing of queued participants.
//
// Every tick the queue (plus the always-available standard agents) is
// scored over all seat-count-sized combinations. Scores blend skill
// proximity, waiting time, and how recently the participants already met;
// hard gates zero out same-owner pairs, oversized rating gaps, and
// premature standard-agent games. Selection walks the combinations from
// best to worst, claiming participants greedily with a Bernoulli draw at
// the combination's score, which keeps pairing fair under load.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::config::{
    DEFAULT_ELO, MAX_ELO_DELTA, MIN_WAIT_FOR_STANDARD, NUM_RECENT_GAMES_CAP, PCT_TIME_BASE, now_ts,
};
use crate::db::game::GameRepository;
use crate::db::participant::ParticipantRepository;
use crate::db::queue::QueueRepository;
use crate::db::rating::RatingRepository;
use crate::errors::AppError;
use crate::models::db::Environment;
use crate::session::fail_game;
use crate::state::AppState;

/// One matchable entity: a queued participant or a synthesized standard
/// agent (always available, never actually in the queue).
#[derive(Debug, Clone)]
pub struct Candidate {
    pub queue_id: Option<i64>,
    pub name: String,
    pub email: String,
    pub elo: f64,
    pub time_in_queue: f64,
    pub pct_queue: f64,
    pub is_human: bool,
    pub human_ip: Option<String>,
    pub is_standard: bool,
}

impl Candidate {
    /// Identity used when claiming candidates into disjoint matches.
    /// Humanity is claimable once per source IP, everyone else by name.
    fn claim_key(&self) -> (String, Option<String>) {
        (self.name.clone(), self.human_ip.clone())
    }
}

/// Hard gates: a combination failing any of these scores zero.
pub fn passes_gates(combo: &[&Candidate]) -> bool {
    for (i, a) in combo.iter().enumerate() {
        for b in &combo[i + 1..] {
            // Same owner plays itself: never pair.
            if a.email == b.email {
                return false;
            }
            if (a.elo - b.elo).abs() > MAX_ELO_DELTA {
                return false;
            }
        }
    }

    let has_standard = combo.iter().any(|c| c.is_standard);
    let has_human = combo.iter().any(|c| c.is_human);
    if has_standard && !has_human {
        // Give real opponents a chance to show up first.
        if !combo.iter().any(|c| c.time_in_queue > MIN_WAIT_FOR_STANDARD) {
            return false;
        }
    }

    true
}

/// Match quality in [0, 1] for a combination that passed the gates.
pub fn score_combination(combo: &[&Candidate], recent_meetings: i64) -> f64 {
    let mut max_delta: f64 = 0.0;
    for (i, a) in combo.iter().enumerate() {
        for b in &combo[i + 1..] {
            max_delta = max_delta.max((a.elo - b.elo).abs());
        }
    }

    let max_pct = combo.iter().map(|c| c.pct_queue).fold(0.0, f64::max);

    let elo_component = (1.0 - max_delta / MAX_ELO_DELTA).powi(2);
    let time_component = PCT_TIME_BASE + max_pct * (1.0 - PCT_TIME_BASE);
    let recent_component = 1.0
        - (recent_meetings.min(NUM_RECENT_GAMES_CAP) as f64)
            / ((NUM_RECENT_GAMES_CAP * 2) as f64);

    elo_component * time_component * recent_component
}

/// All k-sized index combinations of 0..n, in lexicographic order.
pub(crate) fn combinations(n: usize, k: usize) -> Vec<Vec<usize>> {
    fn extend(start: usize, n: usize, k: usize, current: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
        if current.len() == k {
            out.push(current.clone());
            return;
        }
        for i in start..n {
            current.push(i);
            extend(i + 1, n, k, current, out);
            current.pop();
        }
    }

    let mut out = Vec::new();
    if k <= n {
        extend(0, n, k, &mut Vec::new(), &mut out);
    }
    out
}

/// Run one matchmaking pass for an environment.
pub async fn run_for_environment(
    state: &AppState,
    environment: &Environment,
) -> Result<(), AppError> {
    let mut candidates = load_candidates(state, environment).await?;
    let seats = environment.num_players as usize;
    if candidates.len() < seats {
        return Ok(());
    }

    // Tie-breaking fairness: equal scores resolve in shuffled order.
    candidates.shuffle(&mut rand::rng());

    let game_repo = GameRepository::new(state.postgres.clone());
    let mut scored: Vec<(f64, Vec<usize>)> = Vec::new();
    for indices in combinations(candidates.len(), seats) {
        let combo: Vec<&Candidate> = indices.iter().map(|&i| &candidates[i]).collect();
        if !passes_gates(&combo) {
            continue;
        }

        // Rematch pressure is pairwise; the most-replayed pairing counts.
        let mut recent_meetings = 0i64;
        for (i, a) in combo.iter().enumerate() {
            for b in &combo[i + 1..] {
                let count = game_repo.recent_meetings(&a.name, &b.name).await?;
                recent_meetings = recent_meetings.max(count);
            }
        }

        let score = score_combination(&combo, recent_meetings);
        if score > 0.0 {
            scored.push((score, indices));
        }
    }

    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut claimed = std::collections::HashSet::new();
    for (score, indices) in scored {
        let combo: Vec<&Candidate> = indices.iter().map(|&i| &candidates[i]).collect();
        if combo.iter().any(|c| claimed.contains(&c.claim_key())) {
            continue;
        }

        if !rand::rng().random_bool(score.clamp(0.0, 1.0)) {
            continue;
        }

        for c in &combo {
            claimed.insert(c.claim_key());
        }
        if let Err(e) = commit_match(state, environment, &combo).await {
            tracing::error!(
                "Failed to commit match in '{}': {}",
                environment.environment_id,
                e
            );
        }
    }

    Ok(())
}

async fn load_candidates(
    state: &AppState,
    environment: &Environment,
) -> Result<Vec<Candidate>, AppError> {
    let queue = QueueRepository::new(state.postgres.clone());
    let ratings = RatingRepository::new(state.postgres.clone());
    let participants = ParticipantRepository::new(state.postgres.clone());
    let now = now_ts();

    let mut candidates = Vec::new();
    for entry in queue.list_for_environment(&environment.environment_id).await? {
        let elo = ratings
            .current_elo(&entry.participant_name, &environment.environment_id)
            .await?;
        let email = participants
            .find_by_name(&entry.participant_name)
            .await?
            .email;
        let time_in_queue = now - entry.joined_at;

        candidates.push(Candidate {
            queue_id: Some(entry.id),
            name: entry.participant_name,
            email,
            elo,
            time_in_queue,
            pct_queue: time_in_queue / entry.time_limit,
            is_human: entry.is_human,
            human_ip: entry.human_ip,
            is_standard: false,
        });
    }

    // Standard agents are always available without queueing.
    for name in state.agents.names() {
        let elo = ratings
            .current_elo(name, &environment.environment_id)
            .await
            .unwrap_or(DEFAULT_ELO);
        candidates.push(Candidate {
            queue_id: None,
            name: name.clone(),
            email: " ".to_string(),
            elo,
            time_in_queue: -1.0,
            pct_queue: 0.0,
            is_human: false,
            human_ip: None,
            is_standard: true,
        });
    }

    Ok(candidates)
}

/// Atomically create the game and seats and consume the queue rows, then
/// initialize the session (which records the concrete rules variant).
async fn commit_match(
    state: &AppState,
    environment: &Environment,
    combo: &[&Candidate],
) -> Result<(), AppError> {
    let mut tx = state
        .postgres
        .begin()
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to begin match tx: {}", e)))?;

    let game_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO games (environment_id, started_at, status)
        VALUES ($1, $2, 'active')
        RETURNING id",
    )
    .bind(&environment.environment_id)
    .bind(now_ts())
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| AppError::DatabaseError(format!("Failed to create game: {}", e)))?;

    for (seat, candidate) in combo.iter().enumerate() {
        sqlx::query(
            "INSERT INTO player_games
                (game_id, participant_name, player_id, last_action_time, is_human, human_ip)
            VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(game_id)
        .bind(&candidate.name)
        .bind(seat as i32)
        .bind(now_ts())
        .bind(candidate.is_human)
        .bind(&candidate.human_ip)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to seat player: {}", e)))?;

        if let Some(queue_id) = candidate.queue_id {
            sqlx::query("DELETE FROM queue_entries WHERE id = $1")
                .bind(queue_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::DatabaseError(format!("Failed to consume queue entry: {}", e))
                })?;
        }
    }

    tx.commit()
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to commit match tx: {}", e)))?;

    let names: Vec<&str> = combo.iter().map(|c| c.name.as_str()).collect();
    tracing::info!(
        "Matched {} in '{}' as game {}",
        names.join(" vs "),
        environment.environment_id,
        game_id
    );

    // Bring the session up now so a load failure surfaces immediately
    // instead of on the first poll.
    if let Err(e) = state.sessions.get_or_create(state, game_id).await {
        tracing::error!("Session init failed for game {}: {}", game_id, e);
        fail_game(state, game_id, Some(&format!("engine error: {}", e))).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str, email: &str, elo: f64) -> Candidate {
        Candidate {
            queue_id: Some(1),
            name: name.to_string(),
            email: email.to_string(),
            elo,
            time_in_queue: 10.0,
            pct_queue: 10.0 / 300.0,
            is_human: false,
            human_ip: None,
            is_standard: false,
        }
    }

    #[test]
    fn same_email_is_gated() {
        let a = candidate("a", "owner@example.com", 1000.0);
        let b = candidate("b", "owner@example.com", 1000.0);
        assert!(!passes_gates(&[&a, &b]));
    }

    #[test]
    fn rating_gap_gate_is_strict() {
        let a = candidate("a", "a@example.com", 1000.0);
        let at_limit = candidate("b", "b@example.com", 1000.0 + MAX_ELO_DELTA);
        let over_limit = candidate("c", "c@example.com", 1000.0 + MAX_ELO_DELTA + 1.0);

        assert!(passes_gates(&[&a, &at_limit]));
        assert!(!passes_gates(&[&a, &over_limit]));
    }

    #[test]
    fn fresh_queue_does_not_get_a_standard_opponent() {
        let mut real = candidate("a", "a@example.com", 1000.0);
        real.time_in_queue = 10.0;
        let mut standard = candidate("s", " ", 1000.0);
        standard.is_standard = true;
        standard.time_in_queue = -1.0;
        standard.pct_queue = 0.0;

        assert!(!passes_gates(&[&real, &standard]));

        real.time_in_queue = MIN_WAIT_FOR_STANDARD + 1.0;
        assert!(passes_gates(&[&real, &standard]));
    }

    #[test]
    fn humans_exempt_the_standard_wait() {
        let mut human = candidate("Humanity", "humans@example.com", 1000.0);
        human.is_human = true;
        human.human_ip = Some("203.0.113.9".to_string());
        human.time_in_queue = 1.0;
        let mut standard = candidate("s", " ", 1000.0);
        standard.is_standard = true;
        standard.time_in_queue = -1.0;

        assert!(passes_gates(&[&human, &standard]));
    }

    #[test]
    fn equal_ratings_score_from_time_and_recency_only() {
        let a = candidate("a", "a@example.com", 1000.0);
        let b = candidate("b", "b@example.com", 1000.0);
        let combo = [&a, &b];

        let expected_time = PCT_TIME_BASE + (10.0 / 300.0) * (1.0 - PCT_TIME_BASE);
        let score = score_combination(&combo, 0);
        assert!((score - expected_time).abs() < 1e-9);
    }

    #[test]
    fn rating_gap_at_limit_scores_zero() {
        let a = candidate("a", "a@example.com", 1000.0);
        let b = candidate("b", "b@example.com", 1000.0 + MAX_ELO_DELTA);
        assert_eq!(score_combination(&[&a, &b], 0), 0.0);
    }

    #[test]
    fn rematch_penalty_caps_at_half() {
        let a = candidate("a", "a@example.com", 1000.0);
        let b = candidate("b", "b@example.com", 1000.0);
        let fresh = score_combination(&[&a, &b], 0);
        let capped = score_combination(&[&a, &b], NUM_RECENT_GAMES_CAP * 10);
        assert!((capped - fresh * 0.5).abs() < 1e-9);
    }

    #[test]
    fn combination_enumeration() {
        assert_eq!(combinations(3, 2), vec![vec![0, 1], vec![0, 2], vec![1, 2]]);
        assert_eq!(combinations(4, 3).len(), 4);
        assert_eq!(combinations(2, 3).len(), 0);
        assert_eq!(combinations(3, 3), vec![vec![0, 1, 2]]);
    }
}
