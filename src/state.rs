use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::agents::AgentRoster;
use crate::games::{EnvRegistry, create_env_registry};
use crate::session::SessionRegistry;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    /// Participant names the server plays in-process.
    pub standard_agents: Vec<String>,
    pub openrouter_api_key: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub postgres: PgPool,
    pub sessions: SessionRegistry,
    pub envs: Arc<EnvRegistry>,
    pub agents: Arc<AgentRoster>,
}

impl AppState {
    /// Create a new AppState by connecting to PostgreSQL.
    pub async fn new() -> Result<Self, Box<dyn std::error::Error>> {
        // Read essential configuration from the environment and group it.
        let database_url = std::env::var("DATABASE_URL")?;
        let standard_agents = std::env::var("STANDARD_AGENTS")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        let openrouter_api_key = std::env::var("OPENROUTER_API_KEY").ok();

        let config = AppConfig {
            database_url,
            standard_agents,
            openrouter_api_key,
        };

        // PostgreSQL connection pool built from config.database_url
        let postgres = PgPoolOptions::new()
            .max_connections(50)
            .min_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(1800))
            .connect(&config.database_url)
            .await?;

        let envs = Arc::new(create_env_registry());
        let agents = Arc::new(AgentRoster::new(
            config.standard_agents.clone(),
            config.openrouter_api_key.clone(),
        ));

        Ok(Self {
            config,
            postgres,
            sessions: SessionRegistry::new(),
            envs,
            agents,
        })
    }
}
