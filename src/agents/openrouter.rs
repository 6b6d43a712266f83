use async_trait::async_trait;
use serde_json::json;

use crate::agents::LocalAgent;
use crate::errors::AppError;

const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Standard agent backed by an OpenRouter-hosted model. The participant
/// name doubles as the provider model id.
pub struct OpenRouterAgent {
    client: reqwest::Client,
    model: String,
    api_key: String,
}

impl OpenRouterAgent {
    pub fn new(model: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            model,
            api_key,
        }
    }
}

#[async_trait]
impl LocalAgent for OpenRouterAgent {
    async fn act(&self, observation: &str) -> Result<String, AppError> {
        let body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": observation }],
        });

        let response = self
            .client
            .post(OPENROUTER_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::AgentError(format!("OpenRouter request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::AgentError(format!(
                "OpenRouter returned {}",
                response.status()
            )));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::AgentError(format!("Invalid OpenRouter response: {}", e)))?;

        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| {
                AppError::AgentError("OpenRouter response carried no completion".to_string())
            })
    }
}
