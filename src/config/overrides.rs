//! Environment variable overrides.

use std::collections::HashMap;

use crate::config::schema::AssistConfig;
use crate::error::{AssistError, Result};

/// Apply recognised variables on top of the file configuration.
///
/// Reads `ABSTRACTA_CLIENT_ID`, `ABSTRACTA_CLIENT_SECRET`, `ABSTRACTA_AUDIENCE`,
/// `ABSTRACTA_FOR_USER`, `ABSTRACTA_FOR_USER_SECRET`, `OPENAI_API_KEY`,
/// `OPENAI_BASE_URL` and `ABSTRACTA_PACING_MS`.
///
/// Empty values are ignored so that a blank line in `.env` never wipes a
/// value set in the YAML config.
pub fn apply_env_overrides(config: &mut AssistConfig, vars: &HashMap<String, String>) -> Result<()> {
    let get = |name: &str| {
        vars.get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(String::from)
    };

    let backend = &mut config.backend;
    for (name, slot) in [
        ("ABSTRACTA_CLIENT_ID", &mut backend.client_id),
        ("ABSTRACTA_CLIENT_SECRET", &mut backend.client_secret),
        ("ABSTRACTA_AUDIENCE", &mut backend.audience),
        ("ABSTRACTA_FOR_USER", &mut backend.for_user),
        ("ABSTRACTA_FOR_USER_SECRET", &mut backend.for_user_secret),
    ] {
        if let Some(value) = get(name) {
            *slot = Some(value);
        }
    }

    if let Some(key) = get("OPENAI_API_KEY") {
        config.agent.api_key = Some(key);
    }
    if let Some(url) = get("OPENAI_BASE_URL") {
        config.agent.base_url = url;
    }
    if let Some(pacing) = get("ABSTRACTA_PACING_MS") {
        config.executor.pacing_ms = pacing.parse().map_err(|_| AssistError::ConfigValidationError {
            message: format!(
                "ABSTRACTA_PACING_MS must be a number of milliseconds, got '{}'",
                pacing
            ),
        })?;
    }

    Ok(())
}
