//! Create an API from a prose description, grant access to it and preview its data.

use std::sync::Arc;

use anyhow::{anyhow, bail};
use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use super::channels::{self, all_hidden, hidden, markdown, stashed_json, table};
use super::common::{access_token, Authenticate, ConstructPayload, AUTH, PAYLOAD};
use super::{FlowServices, FlowSettings, FlowStep};
use crate::agent::ApiBuilderPayload;
use crate::backend::{AbstractaBackend, ServicePath};
use crate::display::strip_key_recursive;
use crate::steps::{RunContext, StepDescriptor, StepOperation};

pub const CREATE_API: &str = "create_api";
pub const GRANT_ACCESS: &str = "grant_api_access";
pub const API_URL: &str = "gen_api_url";
pub const WEB_URL: &str = "gen_web_url";
pub const FETCH_DATA: &str = "fetch_data";

/// Banner shown before the first step.
pub const BANNER: &str = "Building API ... please wait.";

/// Version the backend assigned to the API it just created.
pub fn created_version(response: &Value) -> anyhow::Result<String> {
    let version = response
        .pointer("/service-info/tables/0/dtbl_version")
        .ok_or_else(|| anyhow!("create API response has no service-info.tables[0].dtbl_version"))?;
    match version {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => bail!("unexpected dtbl_version {}", other),
    }
}

/// Path of the service version created in this run.
fn created_path(context: &RunContext<Value>) -> anyhow::Result<ServicePath> {
    let payload: ApiBuilderPayload = context.decode(PAYLOAD)?;
    let version = created_version(context.require(CREATE_API)?)?;
    Ok(ServicePath::new(
        payload.org_name,
        payload.app_name,
        payload.datasource_name,
        payload.service_name,
        version,
    ))
}

struct CreateApi {
    backend: Arc<dyn AbstractaBackend>,
}

#[async_trait]
impl StepOperation<Value> for CreateApi {
    async fn run(&self, context: &RunContext<Value>) -> anyhow::Result<Value> {
        let token = access_token(context)?;
        let payload: ApiBuilderPayload = context.decode(PAYLOAD)?;
        let response = self.backend.create_api(&token, &payload).await?;
        info!("Created API {}", payload.service_name);
        Ok(response)
    }
}

struct GrantAccess {
    backend: Arc<dyn AbstractaBackend>,
    users: Vec<String>,
    roles: Vec<String>,
}

#[async_trait]
impl StepOperation<Value> for GrantAccess {
    async fn run(&self, context: &RunContext<Value>) -> anyhow::Result<Value> {
        if self.users.is_empty() {
            bail!("no user to grant access to; set backend.for_user or ABSTRACTA_FOR_USER");
        }
        let token = access_token(context)?;
        let path = created_path(context)?;
        let response = self
            .backend
            .grant_service_access(&token, &path, &self.users, &self.roles)
            .await?;
        info!("Granted {} on {} to {}", self.roles.join(", "), path, self.users.join(", "));
        Ok(response)
    }
}

#[derive(Clone, Copy)]
enum UrlKind {
    Api,
    Web,
}

struct GenerateUrl {
    backend: Arc<dyn AbstractaBackend>,
    kind: UrlKind,
}

#[async_trait]
impl StepOperation<Value> for GenerateUrl {
    async fn run(&self, context: &RunContext<Value>) -> anyhow::Result<Value> {
        let path = created_path(context)?;
        Ok(match self.kind {
            UrlKind::Api => channels::link("API URL", &self.backend.api_url(&path)),
            UrlKind::Web => channels::link("Web URL", &self.backend.web_url(&path)),
        })
    }
}

struct FetchData {
    backend: Arc<dyn AbstractaBackend>,
}

#[async_trait]
impl StepOperation<Value> for FetchData {
    async fn run(&self, context: &RunContext<Value>) -> anyhow::Result<Value> {
        let token = access_token(context)?;
        let path = created_path(context)?;
        let data = self.backend.fetch_data(&token, &path).await?;
        Ok(strip_key_recursive(&data, "_dq"))
    }
}

/// The seven steps of the API builder flow.
pub fn steps(services: &FlowServices, settings: &FlowSettings, requirements: &str) -> Vec<FlowStep> {
    let backend = &services.backend;
    vec![
        StepDescriptor::new(
            PAYLOAD,
            "Constructing API Builder Payload",
            ConstructPayload::<ApiBuilderPayload>::new(
                services.agent.clone(),
                &settings.model,
                requirements,
            ),
        )
        .with_display(all_hidden()),
        StepDescriptor::new(
            AUTH,
            "Authenticating to Abstracta API",
            Authenticate::new(backend.clone()),
        )
        .with_display(all_hidden()),
        StepDescriptor::new(
            CREATE_API,
            "Creating API",
            CreateApi {
                backend: backend.clone(),
            },
        )
        .with_display(all_hidden()),
        StepDescriptor::new(
            GRANT_ACCESS,
            "Grant API Access",
            GrantAccess {
                backend: backend.clone(),
                users: settings.grant_users.clone(),
                roles: settings.grant_roles.clone(),
            },
        )
        .with_display(all_hidden()),
        StepDescriptor::new(
            API_URL,
            "Generate API URL",
            GenerateUrl {
                backend: backend.clone(),
                kind: UrlKind::Api,
            },
        )
        .with_display(vec![markdown(API_URL), hidden(), hidden(), hidden()]),
        StepDescriptor::new(
            WEB_URL,
            "Generate Web URL",
            GenerateUrl {
                backend: backend.clone(),
                kind: UrlKind::Web,
            },
        )
        .with_display(vec![markdown(API_URL), markdown(WEB_URL), hidden(), hidden()]),
        StepDescriptor::new(
            FETCH_DATA,
            "Fetching data from API",
            FetchData {
                backend: backend.clone(),
            },
        )
        .with_display(vec![
            markdown(API_URL),
            markdown(WEB_URL),
            stashed_json(FETCH_DATA),
            table(FETCH_DATA, None),
        ]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn version_from_string() {
        let response = json!({"service-info": {"tables": [{"dtbl_version": "1.2.0"}]}});
        assert_eq!(created_version(&response).unwrap(), "1.2.0");
    }

    #[test]
    fn version_from_number() {
        let response = json!({"service-info": {"tables": [{"dtbl_version": 3}]}});
        assert_eq!(created_version(&response).unwrap(), "3");
    }

    #[test]
    fn missing_version_is_error() {
        let err = created_version(&json!({"service-info": {"tables": []}})).unwrap_err();
        assert!(err.to_string().contains("dtbl_version"));
    }
}
