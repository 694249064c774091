//! The Abstracta REST backend.
//!
//! Flows only see the [`AbstractaBackend`] trait; [`HttpBackend`] is the
//! real implementation and tests substitute in-memory fakes.

mod http;
mod query;

pub use http::HttpBackend;
pub use query::QueryRequest;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::agent::{ApiBuilderPayload, DqRuleBuilderPayload, ProfileBuilderPayload};

/// Errors raised by backend calls.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The HTTP client could not be created.
    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request did not complete.
    #[error("Request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-success HTTP status.
    #[error("Failed to {action}: {status} {body}")]
    Status {
        action: String,
        status: u16,
        body: String,
    },

    /// HTTP 200 but the status envelope reports a failure.
    #[error("Failed to {action}: {code} {message}")]
    Rejected {
        action: String,
        code: i64,
        message: String,
    },

    /// A lookup by name found nothing.
    #[error("Unable to find a match for {what} {name}")]
    NotFound { what: String, name: String },

    /// The response does not have the expected shape.
    #[error("Unexpected response while trying to {action}: {message}")]
    InvalidResponse { action: String, message: String },

    /// The request could not be built from the given input.
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// A service path string is malformed.
    #[error("Invalid service path '{input}': expected org/app/datasource/service/version")]
    InvalidServicePath { input: String },
}

/// Bearer token returned by [`AbstractaBackend::authenticate`].
///
/// `Debug` never prints the token.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for the `Authorization` header.
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Fully qualified API version: `org/app/datasource/service/version`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServicePath {
    pub org: String,
    pub app: String,
    pub datasource: String,
    pub service: String,
    pub version: String,
}

impl ServicePath {
    pub fn new(
        org: impl Into<String>,
        app: impl Into<String>,
        datasource: impl Into<String>,
        service: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            org: org.into(),
            app: app.into(),
            datasource: datasource.into(),
            service: service.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for ServicePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}/{}",
            self.org, self.app, self.datasource, self.service, self.version
        )
    }
}

impl FromStr for ServicePath {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().trim_matches('/').split('/').collect();
        match parts.as_slice() {
            [org, app, ds, service, version] if parts.iter().all(|p| !p.trim().is_empty()) => {
                Ok(Self::new(*org, *app, *ds, *service, *version))
            }
            _ => Err(BackendError::InvalidServicePath {
                input: s.to_string(),
            }),
        }
    }
}

/// A data source inside an application, used to scope service listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSourceRef {
    pub org: String,
    pub app: String,
    pub datasource: String,
}

/// Operations the flows and the CLI need from the backend.
#[async_trait]
pub trait AbstractaBackend: Send + Sync {
    /// Exchange client credentials for an access token.
    async fn authenticate(&self) -> Result<AccessToken, BackendError>;

    /// Create a new API version; returns the backend's creation response.
    async fn create_api(
        &self,
        token: &AccessToken,
        payload: &ApiBuilderPayload,
    ) -> Result<Value, BackendError>;

    /// Grant `roles` on a service version to `users`.
    async fn grant_service_access(
        &self,
        token: &AccessToken,
        path: &ServicePath,
        users: &[String],
        roles: &[String],
    ) -> Result<Value, BackendError>;

    /// Attach a data-quality check to a field of a service version.
    async fn add_data_quality_rule(
        &self,
        token: &AccessToken,
        payload: &DqRuleBuilderPayload,
    ) -> Result<Value, BackendError>;

    /// Create a data-security profile in an organization.
    async fn add_profile(
        &self,
        token: &AccessToken,
        payload: &ProfileBuilderPayload,
    ) -> Result<Value, BackendError>;

    /// Assign an existing profile to the named users; returns the users assigned.
    async fn assign_profile_to_users(
        &self,
        token: &AccessToken,
        payload: &ProfileBuilderPayload,
    ) -> Result<Vec<String>, BackendError>;

    /// Fetch a preview of the data a service version returns.
    async fn fetch_data(&self, token: &AccessToken, path: &ServicePath)
        -> Result<Value, BackendError>;

    async fn list_organizations(&self, token: &AccessToken) -> Result<Vec<String>, BackendError>;

    async fn list_applications(
        &self,
        token: &AccessToken,
        org: &str,
    ) -> Result<Vec<String>, BackendError>;

    async fn list_data_sources(
        &self,
        token: &AccessToken,
        org: &str,
        app: &str,
    ) -> Result<Vec<String>, BackendError>;

    /// List service versions, newest first when unscoped.
    async fn list_services(
        &self,
        token: &AccessToken,
        scope: Option<&DataSourceRef>,
    ) -> Result<Vec<ServicePath>, BackendError>;

    /// Query endpoint of a service version.
    fn api_url(&self, path: &ServicePath) -> String;

    /// Web page of a service version.
    fn web_url(&self, path: &ServicePath) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_path_round_trips_through_display() {
        let path: ServicePath = "demo_org_001/demo_app_001/demo_ds_001/salesorderitems/0.0.0"
            .parse()
            .unwrap();
        assert_eq!(path.service, "salesorderitems");
        assert_eq!(path.version, "0.0.0");
        assert_eq!(
            path.to_string(),
            "demo_org_001/demo_app_001/demo_ds_001/salesorderitems/0.0.0"
        );
    }

    #[test]
    fn service_path_tolerates_surrounding_slashes() {
        let path: ServicePath = "/o/a/d/s/1.0.0/".parse().unwrap();
        assert_eq!(path.org, "o");
    }

    #[test]
    fn service_path_rejects_wrong_segment_count() {
        assert!("o/a/d/s".parse::<ServicePath>().is_err());
        assert!("o/a/d/s/v/x".parse::<ServicePath>().is_err());
        assert!("o//d/s/v".parse::<ServicePath>().is_err());
    }

    #[test]
    fn access_token_debug_is_redacted() {
        let token = AccessToken::new("eyJsecret");
        assert_eq!(format!("{:?}", token), "AccessToken(***)");
        assert_eq!(token.secret(), "eyJsecret");
    }

    #[test]
    fn error_messages() {
        let err = BackendError::Rejected {
            action: "add profile".into(),
            code: 409,
            message: "exists".into(),
        };
        assert_eq!(err.to_string(), "Failed to add profile: 409 exists");

        let err = BackendError::NotFound {
            what: "org".into(),
            name: "acme".into(),
        };
        assert_eq!(err.to_string(), "Unable to find a match for org acme");
    }
}
