// Live game sessions.
//
// A `Session` owns the in-memory rules instance for one active game and
// serializes every rules call behind its own lock, so a turn can never be
// observed halfway through a step. The registry creates sessions lazily on
// first use and guards concurrent first uses so both callers share one
// session.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::agents::LocalAgent;
use crate::db::game::GameRepository;
use crate::errors::AppError;
use crate::games::{GameRules, Observation, Rewards, StepInfo};
use crate::state::AppState;

mod finalize;
mod local;

pub use finalize::{conclude_game, fail_game, finalize_game};

/// Result of submitting an action to a session.
pub enum StepResult {
    Ongoing,
    Finished { rewards: Rewards, info: StepInfo },
}

/// Seat driven by an in-process standard agent.
pub(crate) struct LocalSeat {
    pub(crate) agent: Box<dyn LocalAgent>,
    pub(crate) player_id: i32,
    pub(crate) player_game_id: i64,
    pub(crate) participant_name: String,
    /// Every message addressed to the local seat so far; the agent always
    /// sees the whole conversation.
    pub(crate) transcript: Observation,
}

pub(crate) struct SessionInner {
    pub(crate) rules: Box<dyn GameRules>,
    pub(crate) local: Option<LocalSeat>,
    bootstrapped: bool,
}

pub struct Session {
    pub game_id: i64,
    pub environment_id: String,
    inner: Mutex<SessionInner>,
}

impl Session {
    /// Whether the game is waiting on this player.
    pub async fn is_player_turn(&self, player_id: i32) -> bool {
        let inner = self.inner.lock().await;
        !inner.rules.is_done() && inner.rules.current_player() == player_id
    }

    pub async fn is_done(&self) -> bool {
        self.inner.lock().await.rules.is_done()
    }

    /// Messages the player has not acted on yet.
    pub async fn observation(&self, player_id: i32) -> Result<Observation, AppError> {
        let inner = self.inner.lock().await;
        Ok(inner.rules.observation(player_id)?)
    }

    /// Full message history, valid even after termination.
    pub async fn force_observation(&self, player_id: i32) -> Observation {
        let inner = self.inner.lock().await;
        inner.rules.force_observation(player_id)
    }

    /// Apply a remote participant's action, then synchronously play any
    /// local turns it hands over, so the next poll already sees the
    /// post-local state.
    pub async fn submit_action(
        &self,
        state: &AppState,
        player_id: i32,
        action: &str,
    ) -> Result<StepResult, AppError> {
        let mut inner = self.inner.lock().await;

        if inner.rules.is_done() {
            let rewards = inner.rules.close()?;
            return Ok(StepResult::Finished {
                rewards,
                info: StepInfo::default(),
            });
        }
        if inner.rules.current_player() != player_id {
            return Err(AppError::NotYourTurn);
        }

        let (done, info) = inner.rules.step(action)?;
        let mut final_info = info;

        if !done {
            if let Some(local_info) =
                local::drive_local_turns(&mut inner, state, self.game_id).await?
            {
                final_info = local_info;
            }
        }

        if inner.rules.is_done() {
            let rewards = inner.rules.close()?;
            return Ok(StepResult::Finished {
                rewards,
                info: final_info,
            });
        }
        Ok(StepResult::Ongoing)
    }

    /// Play the local seat's opening turns, once. A freshly reset game may
    /// start on the local player; the remote participant's first poll must
    /// already see the position after those moves.
    async fn ensure_bootstrapped(&self, state: &AppState) -> Result<(), AppError> {
        let mut inner = self.inner.lock().await;
        if inner.bootstrapped {
            return Ok(());
        }
        inner.bootstrapped = true;

        if let Some(info) = local::drive_local_turns(&mut inner, state, self.game_id).await? {
            // Local play alone can end the game (e.g. an illegal move).
            let rewards = inner.rules.close()?;
            drop(inner);
            finalize::finalize_game(state, self.game_id, &rewards, &info).await?;
        }
        Ok(())
    }
}

/// In-memory map of live sessions, keyed by game id.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    inner: Arc<Mutex<HashMap<i64, Arc<Session>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session for a game if one is live. Never constructs.
    pub async fn peek(&self, game_id: i64) -> Option<Arc<Session>> {
        self.inner.lock().await.get(&game_id).cloned()
    }

    pub async fn remove(&self, game_id: i64) {
        self.inner.lock().await.remove(&game_id);
    }

    /// Session for a game, constructing it on first use.
    ///
    /// Construction picks the local variant iff one of the game's seats is
    /// a configured standard agent, writes the concrete variant id back to
    /// the game row, and plays any local opening turns.
    pub async fn get_or_create(
        &self,
        state: &AppState,
        game_id: i64,
    ) -> Result<Arc<Session>, AppError> {
        let existing = self.peek(game_id).await;
        let session = match existing {
            Some(session) => session,
            None => self.create(state, game_id).await?,
        };

        session.ensure_bootstrapped(state).await?;
        Ok(session)
    }

    async fn create(&self, state: &AppState, game_id: i64) -> Result<Arc<Session>, AppError> {
        let game_repo = GameRepository::new(state.postgres.clone());
        let game = game_repo.find_by_id(game_id).await?;
        if !game.is_active() {
            return Err(AppError::BadRequest("Game is not active.".into()));
        }

        let players = crate::db::player_game::PlayerGameRepository::new(state.postgres.clone())
            .for_game(game_id)
            .await?;

        let local = players
            .iter()
            .find(|p| state.agents.is_standard(&p.participant_name))
            .map(|p| -> Result<LocalSeat, AppError> {
                Ok(LocalSeat {
                    agent: state.agents.make_agent(&p.participant_name)?,
                    player_id: p.player_id,
                    player_game_id: p.id,
                    participant_name: p.participant_name.clone(),
                    transcript: Vec::new(),
                })
            })
            .transpose()?;

        let mut map = self.inner.lock().await;
        // Lost the race: someone constructed it while we were loading.
        if let Some(session) = map.get(&game_id) {
            return Ok(session.clone());
        }

        let rules = state.envs.make_rules(&game.environment_id)?;
        let specific_env_id = rules.specific_env_id().to_string();

        let session = Arc::new(Session {
            game_id,
            environment_id: game.environment_id.clone(),
            inner: Mutex::new(SessionInner {
                rules,
                local,
                bootstrapped: false,
            }),
        });
        map.insert(game_id, session.clone());
        drop(map);

        game_repo
            .set_specific_env_id(game_id, &specific_env_id)
            .await?;

        tracing::debug!(
            "Session created for game {} ({} -> {})",
            game_id,
            game.environment_id,
            specific_env_id
        );
        Ok(session)
    }
}

/// Wire/storage encoding of an observation: a JSON array of
/// `[sender_id, text]` pairs.
pub fn encode_observation(observation: &Observation) -> Result<String, AppError> {
    serde_json::to_string(observation)
        .map_err(|e| AppError::Serialization(format!("Failed to encode observation: {}", e)))
}

pub fn decode_observation(raw: &str) -> Result<serde_json::Value, AppError> {
    serde_json::from_str(raw)
        .map_err(|e| AppError::Serialization(format!("Failed to decode observation: {}", e)))
}
