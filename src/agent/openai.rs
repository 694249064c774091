//! OpenAI-compatible chat-completions agent with structured output.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::{AgentError, AgentRequest, PayloadAgent};
use crate::config::AgentConfig;

/// Calls `{base_url}/chat/completions` with a `json_schema` response format.
pub struct OpenAiAgent {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

impl OpenAiAgent {
    /// Create an agent from configuration. Fails when no API key is set.
    pub fn new(config: &AgentConfig) -> Result<Self, AgentError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AgentError::NotConfigured {
                message: "no API key (set OPENAI_API_KEY or agent.api_key)".to_string(),
            })?;

        let client = Client::builder()
            .user_agent("abstracta-assist")
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn body(request: &AgentRequest) -> Value {
        json!({
            "model": request.model,
            "messages": [
                {"role": "system", "content": request.instructions},
                {"role": "user", "content": request.input},
            ],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": request.agent_name,
                    "schema": request.schema,
                    "strict": false,
                },
            },
        })
    }
}

#[async_trait]
impl PayloadAgent for OpenAiAgent {
    async fn run(&self, request: &AgentRequest) -> Result<Value, AgentError> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&Self::body(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(AgentError::EmptyResponse)?;

        serde_json::from_str(&content).map_err(AgentError::Malformed)
    }
}
