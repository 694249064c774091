//! Configuration schema.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! configuration pointing at a local Abstracta installation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistConfig {
    /// Abstracta backend endpoints and credentials.
    pub backend: BackendConfig,
    /// Payload agent settings.
    pub agent: AgentConfig,
    /// Step executor settings.
    pub executor: ExecutorConfig,
}

/// Abstracta backend settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Query API base, e.g. `http://localhost:8080/rest/data/queryv2`.
    pub data_api_url: String,
    /// Metadata API base.
    pub metadata_api_url: String,
    /// Base of the service web pages.
    pub web_url: String,
    /// OpenID Connect token endpoint.
    pub auth_url: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub audience: Option<String>,
    /// Platform user queries run on behalf of; also granted access to new APIs.
    pub for_user: Option<String>,
    pub for_user_secret: Option<String>,
    /// `org/app/datasource` hosting the platform's own system tables.
    pub system_service: String,
    pub timeout_secs: u64,
    /// Rows fetched for a data preview.
    pub preview_rows: u32,
    /// Roles granted on newly created APIs.
    pub grant_roles: Vec<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            data_api_url: "http://localhost:8080/rest/data/queryv2".to_string(),
            metadata_api_url: "http://localhost:8080/rest/metadata".to_string(),
            web_url: "http://localhost/services".to_string(),
            auth_url: "http://localhost:8180/auth/realms/abstracta/protocol/openid-connect/token"
                .to_string(),
            client_id: None,
            client_secret: None,
            audience: None,
            for_user: None,
            for_user_secret: None,
            system_service: "ekahaa/abstracta/dq_repo".to_string(),
            timeout_secs: 30,
            preview_rows: 100,
            grant_roles: vec![
                "VIEWER".to_string(),
                "EDITOR".to_string(),
                "CREATOR".to_string(),
            ],
        }
    }
}

/// Payload agent settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// OpenAI-compatible API base.
    pub base_url: String,
    pub api_key: Option<String>,
    /// Model used for API builder payloads.
    pub api_model: String,
    /// Model used for data-quality-rule payloads.
    pub dq_rule_model: String,
    /// Model used for profile payloads.
    pub profile_model: String,
    pub timeout_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            api_model: "gpt-4o-mini".to_string(),
            dq_rule_model: "gpt-5-nano".to_string(),
            profile_model: "gpt-5-nano".to_string(),
            timeout_secs: 120,
        }
    }
}

/// Step executor settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Pause between emitted snapshots, in milliseconds.
    pub pacing_ms: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self { pacing_ms: 500 }
    }
}

impl ExecutorConfig {
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_gives_defaults() {
        let config: AssistConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, AssistConfig::default());
        assert_eq!(config.executor.pacing(), Duration::from_millis(500));
        assert_eq!(config.backend.grant_roles, vec!["VIEWER", "EDITOR", "CREATOR"]);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config: AssistConfig = serde_yaml::from_str(
            r#"
backend:
  for_user: svc_user
agent:
  api_model: gpt-4o
"#,
        )
        .unwrap();
        assert_eq!(config.backend.for_user.as_deref(), Some("svc_user"));
        assert_eq!(config.backend.timeout_secs, 30);
        assert_eq!(config.agent.api_model, "gpt-4o");
        assert_eq!(config.agent.dq_rule_model, "gpt-5-nano");
    }

    #[test]
    fn zero_pacing() {
        let config: AssistConfig = serde_yaml::from_str("executor:\n  pacing_ms: 0").unwrap();
        assert!(config.executor.pacing().is_zero());
    }
}
