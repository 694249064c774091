//! Turning user prose into structured builder payloads.
//!
//! A [`PayloadAgent`] is asked to fill a JSON schema derived from a
//! [`BuilderPayload`] type. [`build_payload`] runs the agent, decodes the
//! answer and validates it, so a step either gets a usable payload or fails.

mod checks;
mod openai;
mod payload;

pub use checks::{catalog_json, CheckParameter, DqCheck, DqCheckId, ParameterKind, DQ_CHECKS};
pub use openai::OpenAiAgent;
pub use payload::{
    ApiBuilderPayload, BuilderPayload, ConnectorType, DqRuleBuilderPayload, ProfileBuilderPayload,
    ServiceType, VersionType,
};

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised while producing a payload.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The agent is missing required settings, such as an API key.
    #[error("Agent is not configured: {message}")]
    NotConfigured { message: String },

    /// The request never got a response.
    #[error("Agent request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The model endpoint answered with a non-success status.
    #[error("Agent returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The model answered without any content.
    #[error("Agent returned no content")]
    EmptyResponse,

    /// The answer is not JSON, or not the JSON the payload expects.
    #[error("Agent returned malformed payload: {0}")]
    Malformed(#[source] serde_json::Error),

    /// The payload decoded but breaks a rule the schema cannot express.
    #[error("Invalid payload: {message}")]
    InvalidPayload { message: String },
}

/// Everything an agent needs for one structured-output call.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentRequest {
    pub agent_name: String,
    pub model: String,
    pub instructions: String,
    pub input: String,
    pub schema: Value,
}

impl AgentRequest {
    /// Build the request for payload type `P`.
    pub fn for_payload<P: BuilderPayload>(model: &str, input: &str) -> Self {
        let schema = serde_json::to_value(schemars::schema_for!(P)).unwrap_or(Value::Null);
        Self {
            agent_name: P::AGENT_NAME.to_string(),
            model: model.to_string(),
            instructions: P::instructions(),
            input: input.to_string(),
            schema,
        }
    }
}

/// Produces a JSON document matching a request's schema.
#[async_trait]
pub trait PayloadAgent: Send + Sync {
    async fn run(&self, request: &AgentRequest) -> Result<Value, AgentError>;
}

/// Run `agent` on `requirements` and return a validated payload.
pub async fn build_payload<P: BuilderPayload>(
    agent: &dyn PayloadAgent,
    model: &str,
    requirements: &str,
) -> Result<P, AgentError> {
    let request = AgentRequest::for_payload::<P>(model, requirements);
    info!("Running {} with model {}", request.agent_name, request.model);

    let value = agent.run(&request).await?;
    debug!("{} answered: {}", request.agent_name, value);

    let payload: P = serde_json::from_value(value).map_err(AgentError::Malformed)?;
    payload.validate()?;
    Ok(payload)
}
