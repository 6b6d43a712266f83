// In-process "standard" agents.
//
// A standard agent is a participant the server can move on behalf of,
// synchronously, inside the request that handed it the turn. The roster
// maps participant names from configuration to agent implementations.

use async_trait::async_trait;

use crate::errors::AppError;

mod openrouter;
mod scripted;

pub use openrouter::OpenRouterAgent;
pub use scripted::ScriptedAgent;

/// Prefix selecting the deterministic built-in agent instead of an LLM.
const SCRIPTED_PREFIX: &str = "scripted/";

#[async_trait]
pub trait LocalAgent: Send + Sync {
    /// Produce an action for the rendered observation text.
    async fn act(&self, observation: &str) -> Result<String, AppError>;
}

/// Configured standard agents and how to build them.
pub struct AgentRoster {
    names: Vec<String>,
    openrouter_api_key: Option<String>,
}

impl AgentRoster {
    pub fn new(names: Vec<String>, openrouter_api_key: Option<String>) -> Self {
        Self {
            names,
            openrouter_api_key,
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_standard(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Build the agent behind a configured standard participant name.
    pub fn make_agent(&self, name: &str) -> Result<Box<dyn LocalAgent>, AppError> {
        if !self.is_standard(name) {
            return Err(AppError::AgentError(format!(
                "'{}' is not a configured standard agent",
                name
            )));
        }

        if name.starts_with(SCRIPTED_PREFIX) {
            return Ok(Box::new(ScriptedAgent::new()));
        }

        let api_key = self.openrouter_api_key.clone().ok_or_else(|| {
            AppError::AgentError("OPENROUTER_API_KEY is not configured".to_string())
        })?;
        Ok(Box::new(OpenRouterAgent::new(name.to_string(), api_key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roster_membership() {
        let roster = AgentRoster::new(vec!["scripted/first-move".to_string()], None);
        assert!(roster.is_standard("scripted/first-move"));
        assert!(!roster.is_standard("someone-else"));
    }

    #[test]
    fn scripted_agents_need_no_api_key() {
        let roster = AgentRoster::new(vec!["scripted/first-move".to_string()], None);
        assert!(roster.make_agent("scripted/first-move").is_ok());
    }

    #[test]
    fn llm_agents_require_api_key() {
        let roster = AgentRoster::new(vec!["some/model".to_string()], None);
        assert!(roster.make_agent("some/model").is_err());
    }
}
