// Synchronous drive of the in-process standard agent.

use crate::config::{GAME_SENDER_ID, now_ts};
use crate::db::player_game::PlayerGameRepository;
use crate::db::turn_log::TurnLogRepository;
use crate::errors::AppError;
use crate::games::{Observation, StepInfo};
use crate::session::{SessionInner, encode_observation};
use crate::state::AppState;

/// Render the local seat's accumulated messages as prompt text.
pub(crate) fn render_transcript(transcript: &Observation) -> String {
    if transcript.is_empty() {
        return "No observation.".to_string();
    }

    let mut rendered = String::new();
    for (sender_id, message) in transcript {
        let sender = if *sender_id == GAME_SENDER_ID {
            "GAME".to_string()
        } else {
            format!("Player {}", sender_id)
        };
        rendered.push_str(&format!("\n[{}] {}", sender, message));
    }
    rendered
}

/// Play local turns until control leaves the local seat or the game ends.
///
/// Runs inside the session lock, within whatever request handed the turn
/// over. Each move writes a complete turn log (observation and action in
/// one row) and refreshes the local seat's activity clock. Returns the
/// terminal info when local play ended the game.
pub(crate) async fn drive_local_turns(
    inner: &mut SessionInner,
    state: &AppState,
    game_id: i64,
) -> Result<Option<StepInfo>, AppError> {
    let Some(local) = inner.local.as_mut() else {
        return Ok(None);
    };

    let turn_logs = TurnLogRepository::new(state.postgres.clone());
    let player_games = PlayerGameRepository::new(state.postgres.clone());

    while !inner.rules.is_done() && inner.rules.current_player() == local.player_id {
        let ts_observation = now_ts();
        let fresh = inner.rules.observation(local.player_id)?;
        local.transcript.extend(fresh.iter().cloned());

        let prompt = render_transcript(&local.transcript);
        let action = local.agent.act(&prompt).await?;
        let ts_action = now_ts();

        turn_logs
            .create_complete(
                local.player_game_id,
                &local.participant_name,
                &encode_observation(&fresh)?,
                ts_observation,
                &action,
                ts_action,
            )
            .await?;
        player_games
            .touch_last_action(local.player_game_id)
            .await?;

        let (done, info) = inner.rules.step(&action)?;
        tracing::debug!(
            "Local agent '{}' moved in game {}",
            local.participant_name,
            game_id
        );
        if done {
            return Ok(Some(info));
        }
    }

    Ok(None)
}
