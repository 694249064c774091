//! Configuration validation rules.

use crate::config::schema::AssistConfig;
use crate::error::{AssistError, Result};

/// Collect every problem with a configuration.
pub fn validate_config(config: &AssistConfig) -> Vec<String> {
    let mut errors = Vec::new();

    let urls = [
        ("backend.data_api_url", &config.backend.data_api_url),
        ("backend.metadata_api_url", &config.backend.metadata_api_url),
        ("backend.web_url", &config.backend.web_url),
        ("backend.auth_url", &config.backend.auth_url),
        ("agent.base_url", &config.agent.base_url),
    ];
    for (name, url) in urls {
        if url.trim().is_empty() {
            errors.push(format!("{} must not be empty", name));
        } else if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(format!("{} must be an http(s) URL, got '{}'", name, url));
        }
    }

    if config.backend.system_service.trim_matches('/').split('/').count() != 3 {
        errors.push(format!(
            "backend.system_service must be org/app/datasource, got '{}'",
            config.backend.system_service
        ));
    }
    if config.backend.timeout_secs == 0 {
        errors.push("backend.timeout_secs must be greater than zero".to_string());
    }
    if config.agent.timeout_secs == 0 {
        errors.push("agent.timeout_secs must be greater than zero".to_string());
    }
    if config.backend.preview_rows == 0 {
        errors.push("backend.preview_rows must be greater than zero".to_string());
    }

    errors
}

/// Validate a configuration, reporting all problems in one error.
pub fn validate(config: &AssistConfig) -> Result<()> {
    let errors = validate_config(config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AssistError::ConfigValidationError {
            message: errors.join("; "),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate(&AssistConfig::default()).is_ok());
    }

    #[test]
    fn empty_url_is_rejected() {
        let mut config = AssistConfig::default();
        config.backend.metadata_api_url = String::new();
        let errors = validate_config(&config);
        assert_eq!(errors, vec!["backend.metadata_api_url must not be empty"]);
    }

    #[test]
    fn non_http_url_is_rejected() {
        let mut config = AssistConfig::default();
        config.agent.base_url = "ftp://models".into();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut config = AssistConfig::default();
        config.backend.timeout_secs = 0;
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("backend.timeout_secs"));
    }

    #[test]
    fn reports_all_problems() {
        let mut config = AssistConfig::default();
        config.backend.timeout_secs = 0;
        config.agent.timeout_secs = 0;
        config.backend.system_service = "only/two".into();
        assert_eq!(validate_config(&config).len(), 3);
    }
}
