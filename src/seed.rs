// Startup seeding: environment catalog, the Humanity pseudo-participant,
// and the configured standard agents, each with initial rating rows.
// Everything here is idempotent; the server reseeds on every boot.

use crate::auth::generate_token;
use crate::config::{DEFAULT_ELO, HUMANITY_NAME};
use crate::db::environment::EnvironmentRepository;
use crate::db::participant::ParticipantRepository;
use crate::db::rating::RatingRepository;
use crate::errors::AppError;
use crate::state::AppState;

pub async fn run(state: &AppState) -> Result<(), AppError> {
    let environments = EnvironmentRepository::new(state.postgres.clone());
    for spec in state.envs.all() {
        environments
            .register(spec.environment_id, spec.num_players)
            .await?;
    }

    seed_participant(
        state,
        HUMANITY_NAME,
        "Shared pseudo-participant for human players",
        "humans@agent-arena.local",
    )
    .await?;

    for name in state.agents.names().to_vec() {
        // Standard agents share a blank placeholder email; the matchmaker
        // treats equal emails as one owner, which keeps them from being
        // paired against each other.
        seed_participant(state, &name, "In-process standard agent", " ").await?;
    }

    tracing::info!(
        "Seeded {} environments and {} standard agents",
        state.envs.all().count(),
        state.agents.names().len()
    );
    Ok(())
}

async fn seed_participant(
    state: &AppState,
    name: &str,
    description: &str,
    email: &str,
) -> Result<(), AppError> {
    ParticipantRepository::new(state.postgres.clone())
        .create_if_absent(name, description, email, &generate_token())
        .await?;

    let ratings = RatingRepository::new(state.postgres.clone());
    for spec in state.envs.all() {
        if ratings.latest(name, spec.environment_id).await?.is_none() {
            ratings
                .append(name, spec.environment_id, DEFAULT_ELO)
                .await?;
        }
    }
    Ok(())
}
