//! Steps every flow starts with.

use std::marker::PhantomData;
use std::sync::Arc;

use anyhow::Context as _;
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::agent::{build_payload, BuilderPayload, PayloadAgent};
use crate::backend::{AbstractaBackend, AccessToken};
use crate::steps::{RunContext, StepOperation};

/// Context key of the agent's payload.
pub const PAYLOAD: &str = "construct_payload";
/// Context key of the access token.
pub const AUTH: &str = "abstracta_auth";

/// Ask the agent for a payload of type `P` and store it as JSON.
pub struct ConstructPayload<P> {
    agent: Arc<dyn PayloadAgent>,
    model: String,
    requirements: String,
    payload: PhantomData<fn() -> P>,
}

impl<P> ConstructPayload<P> {
    pub fn new(agent: Arc<dyn PayloadAgent>, model: &str, requirements: &str) -> Self {
        Self {
            agent,
            model: model.to_string(),
            requirements: requirements.to_string(),
            payload: PhantomData,
        }
    }
}

#[async_trait]
impl<P: BuilderPayload + 'static> StepOperation<Value> for ConstructPayload<P> {
    async fn run(&self, _context: &RunContext<Value>) -> anyhow::Result<Value> {
        let payload: P = build_payload(self.agent.as_ref(), &self.model, &self.requirements).await?;
        Ok(serde_json::to_value(payload)?)
    }
}

/// Obtain an access token.
pub struct Authenticate {
    backend: Arc<dyn AbstractaBackend>,
}

impl Authenticate {
    pub fn new(backend: Arc<dyn AbstractaBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl StepOperation<Value> for Authenticate {
    async fn run(&self, _context: &RunContext<Value>) -> anyhow::Result<Value> {
        let token = self.backend.authenticate().await?;
        debug!("Obtained access token");
        Ok(Value::String(token.secret().to_string()))
    }
}

/// The token stored by [`Authenticate`].
pub fn access_token(context: &RunContext<Value>) -> anyhow::Result<AccessToken> {
    let token: String = context.decode(AUTH).context("no access token in this run")?;
    Ok(AccessToken::new(token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn access_token_reads_auth_entry() {
        let mut ctx = RunContext::new();
        ctx.insert(AUTH, json!("tok-123"));
        assert_eq!(access_token(&ctx).unwrap().secret(), "tok-123");
    }

    #[test]
    fn access_token_missing_is_error() {
        let ctx = RunContext::new();
        let err = access_token(&ctx).unwrap_err();
        assert!(err.to_string().contains("no access token"));
    }
}
