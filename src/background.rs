// Background ticker: sweeper pass, then one matchmaking pass per
// environment. A failure anywhere logs, backs off briefly, and never
// stops the loop; one bad environment must not starve the others.

use std::time::Duration;

use crate::config::{LOOP_ERROR_BACKOFF_SECS, MATCHMAKING_INTERVAL_SECS};
use crate::db::environment::EnvironmentRepository;
use crate::errors::AppError;
use crate::matchmaking;
use crate::state::AppState;
use crate::sweeper;

/// Spawn the matchmaking/sweeper loop. Runs until process shutdown.
pub fn start_background_tasks(state: AppState) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(MATCHMAKING_INTERVAL_SECS));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        tracing::info!("Background matchmaking loop started");
        loop {
            interval.tick().await;
            if let Err(e) = tick(&state).await {
                tracing::error!("Error in matchmaking loop: {}", e);
                tokio::time::sleep(Duration::from_secs(LOOP_ERROR_BACKOFF_SECS)).await;
            }
        }
    });
}

async fn tick(state: &AppState) -> Result<(), AppError> {
    sweeper::run(state).await?;

    let environments = EnvironmentRepository::new(state.postgres.clone())
        .all()
        .await?;
    for environment in &environments {
        if let Err(e) = matchmaking::run_for_environment(state, environment).await {
            tracing::error!(
                "Matchmaking failed for '{}': {}",
                environment.environment_id,
                e
            );
        }
    }
    Ok(())
}
