//! Add a data-quality rule to an existing API version and preview the checked data.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use super::channels::{self, all_hidden, hidden, markdown, stashed_json, table};
use super::common::{access_token, Authenticate, ConstructPayload, AUTH, PAYLOAD};
use super::{FlowServices, FlowSettings, FlowStep};
use crate::agent::DqRuleBuilderPayload;
use crate::backend::{AbstractaBackend, ServicePath};
use crate::steps::{RunContext, StepDescriptor, StepOperation};

pub const CREATE_RULE: &str = "create_dq_rule";
pub const API_URL: &str = "gen_api_url";
pub const WEB_URL: &str = "gen_web_url";
pub const FETCH_DATA: &str = "fetch_data";

pub const BANNER: &str = "Building Data Quality Rules ... please wait.";

/// Data-quality annotations attached to each fetched record.
const DQ_KEY: &str = "_dq";

fn rule_path(context: &RunContext<Value>) -> anyhow::Result<ServicePath> {
    let payload: DqRuleBuilderPayload = context.decode(PAYLOAD)?;
    Ok(ServicePath::new(
        payload.org_name,
        payload.app_name,
        payload.datasource_name,
        payload.service_name,
        payload.version,
    ))
}

struct CreateRule {
    backend: Arc<dyn AbstractaBackend>,
}

#[async_trait]
impl StepOperation<Value> for CreateRule {
    async fn run(&self, context: &RunContext<Value>) -> anyhow::Result<Value> {
        let token = access_token(context)?;
        let payload: DqRuleBuilderPayload = context.decode(PAYLOAD)?;
        let response = self.backend.add_data_quality_rule(&token, &payload).await?;
        info!(
            "Added {} on field {} of {}",
            payload.dq_check_name, payload.field_name, payload.service_name
        );
        Ok(response)
    }
}

struct ApiUrl(Arc<dyn AbstractaBackend>);

#[async_trait]
impl StepOperation<Value> for ApiUrl {
    async fn run(&self, context: &RunContext<Value>) -> anyhow::Result<Value> {
        Ok(channels::link("API URL", &self.0.api_url(&rule_path(context)?)))
    }
}

struct WebUrl(Arc<dyn AbstractaBackend>);

#[async_trait]
impl StepOperation<Value> for WebUrl {
    async fn run(&self, context: &RunContext<Value>) -> anyhow::Result<Value> {
        Ok(channels::link("Web URL", &self.0.web_url(&rule_path(context)?)))
    }
}

struct FetchData(Arc<dyn AbstractaBackend>);

#[async_trait]
impl StepOperation<Value> for FetchData {
    async fn run(&self, context: &RunContext<Value>) -> anyhow::Result<Value> {
        let token = access_token(context)?;
        Ok(self.0.fetch_data(&token, &rule_path(context)?).await?)
    }
}

/// The six steps of the data-quality-rule flow.
pub fn steps(services: &FlowServices, settings: &FlowSettings, requirements: &str) -> Vec<FlowStep> {
    let backend = &services.backend;
    vec![
        StepDescriptor::new(
            PAYLOAD,
            "Constructing Data Quality Rule Builder Payload",
            ConstructPayload::<DqRuleBuilderPayload>::new(
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
            CREATE_RULE,
            "Creating Data Quality Rule",
            CreateRule {
                backend: backend.clone(),
            },
        )
        .with_display(all_hidden()),
        StepDescriptor::new(API_URL, "Generate API URL", ApiUrl(backend.clone()))
            .with_display(vec![markdown(API_URL), hidden(), hidden(), hidden()]),
        StepDescriptor::new(WEB_URL, "Generate Web URL", WebUrl(backend.clone()))
            .with_display(vec![markdown(API_URL), markdown(WEB_URL), hidden(), hidden()]),
        StepDescriptor::new(FETCH_DATA, "Fetching data from API", FetchData(backend.clone()))
            .with_display(vec![
                markdown(API_URL),
                markdown(WEB_URL),
                stashed_json(FETCH_DATA),
                table(FETCH_DATA, Some(DQ_KEY)),
            ]),
    ]
}
