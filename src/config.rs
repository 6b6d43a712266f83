// Tuning constants for matchmaking, timeouts, and ratings.

/// Rating assumed for a participant with no rating history in an environment.
pub const DEFAULT_ELO: f64 = 1000.0;

// K-factor settings
pub const INITIAL_K: f64 = 32.0;
pub const REDUCED_K: f64 = 16.0;
pub const GAMES_THRESHOLD: i64 = 50;
pub const HUMAN_K_FACTOR: f64 = 8.0;
pub const STANDARD_AGENT_K_FACTOR: f64 = 8.0;

// Timeouts, in seconds
pub const STEP_TIMEOUT: f64 = 180.0;
pub const MATCHMAKING_INACTIVITY_TIMEOUT: f64 = 30.0;

// Matchmaking
pub const MATCHMAKING_INTERVAL_SECS: u64 = 3;
pub const MAX_ELO_DELTA: f64 = 400.0;
pub const PCT_TIME_BASE: f64 = 0.5;
pub const NUM_RECENT_GAMES_CAP: i64 = 25;
pub const MIN_WAIT_FOR_STANDARD: f64 = 60.0;
/// Window over which prior meetings between two participants count against
/// a rematch (3 hours).
pub const RECENCY_WINDOW: f64 = 3.0 * 3600.0;
/// Backoff applied when a background pass fails, so a bad tick cannot spin.
pub const LOOP_ERROR_BACKOFF_SECS: u64 = 5;

/// Default queue lifetime when a join request does not specify one.
pub const DEFAULT_QUEUE_TIME_LIMIT: f64 = 300.0;

/// Shared pseudo-participant representing all human players.
pub const HUMANITY_NAME: &str = "Humanity";

/// Environment humans are queued into.
pub const DEFAULT_ENV_ID: &str = "Arcade-v0";

/// Sender id used in observation tuples for messages from the game itself.
pub const GAME_SENDER_ID: i32 = -1;

/// Current wall time in seconds since the Unix epoch.
///
/// All persisted timestamps come from here so ordering comparisons are
/// consistent across components.
pub fn now_ts() -> f64 {
    let now = chrono::Utc::now();
    now.timestamp() as f64 + f64::from(now.timestamp_subsec_millis()) / 1000.0
}
