use async_trait::async_trait;

use crate::agents::LocalAgent;
use crate::errors::AppError;

/// Deterministic agent that plays the most recently offered bracketed move.
///
/// Environments advertise currently legal moves as `[...]` tokens and the
/// rendered observation ends with the newest prompt, so the last move token
/// is always playable. Sender tags (`[GAME]`, `[Player 0]`) also use
/// brackets and must be skipped. Used in tests and as a zero-dependency
/// fallback opponent.
pub struct ScriptedAgent;

impl ScriptedAgent {
    pub fn new() -> Self {
        Self
    }

    fn last_move_token(observation: &str) -> Option<String> {
        let mut result = None;
        let mut rest = observation;
        while let Some(start) = rest.find('[') {
            let after = &rest[start + 1..];
            let Some(end) = after.find(']') else { break };
            let inner = &after[..end];
            if inner != "GAME" && !inner.starts_with("Player ") {
                result = Some(format!("[{}]", inner));
            }
            rest = &after[end + 1..];
        }
        result
    }
}

impl Default for ScriptedAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LocalAgent for ScriptedAgent {
    async fn act(&self, observation: &str) -> Result<String, AppError> {
        Ok(Self::last_move_token(observation).unwrap_or_else(|| "pass".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn picks_newest_offered_move() {
        let agent = ScriptedAgent::new();
        let action = agent
            .act("\n[GAME] Welcome. Available moves: [take 1], [take 2]\n[GAME] You go first.")
            .await
            .unwrap();
        assert_eq!(action, "[take 2]");
    }

    #[tokio::test]
    async fn skips_sender_tags() {
        let agent = ScriptedAgent::new();
        let action = agent
            .act("\n[GAME] Moves: [take 1]\n[Player 0] hello\n[GAME] your turn")
            .await
            .unwrap();
        assert_eq!(action, "[take 1]");
    }

    #[tokio::test]
    async fn passes_when_no_moves_are_offered() {
        let agent = ScriptedAgent::new();
        assert_eq!(agent.act("nothing to see here").await.unwrap(), "pass");
    }
}
