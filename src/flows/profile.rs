//! Create a data-security profile and assign it to users.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use super::channels::all_hidden;
use super::common::{access_token, Authenticate, ConstructPayload, AUTH, PAYLOAD};
use super::{FlowServices, FlowSettings, FlowStep};
use crate::agent::ProfileBuilderPayload;
use crate::backend::AbstractaBackend;
use crate::steps::{RunContext, StepDescriptor, StepOperation};

pub const CREATE_PROFILE: &str = "create_profile";
pub const ASSIGN_PROFILE: &str = "assign_profile";

pub const BANNER: &str = "Creating Profile ... please wait.";

struct CreateProfile(Arc<dyn AbstractaBackend>);

#[async_trait]
impl StepOperation<Value> for CreateProfile {
    async fn run(&self, context: &RunContext<Value>) -> anyhow::Result<Value> {
        let token = access_token(context)?;
        let payload: ProfileBuilderPayload = context.decode(PAYLOAD)?;
        let response = self.0.add_profile(&token, &payload).await?;
        info!("Created profile {} in {}", payload.profile_name(), payload.org_name);
        Ok(response)
    }
}

struct AssignProfile(Arc<dyn AbstractaBackend>);

#[async_trait]
impl StepOperation<Value> for AssignProfile {
    async fn run(&self, context: &RunContext<Value>) -> anyhow::Result<Value> {
        let token = access_token(context)?;
        let payload: ProfileBuilderPayload = context.decode(PAYLOAD)?;
        let assigned = self.0.assign_profile_to_users(&token, &payload).await?;
        info!("Assigned {} to {}", payload.profile_name(), assigned.join(", "));
        Ok(Value::from(assigned))
    }
}

/// The four steps of the profile flow. None of them shows anything.
pub fn steps(services: &FlowServices, settings: &FlowSettings, requirements: &str) -> Vec<FlowStep> {
    let backend = &services.backend;
    vec![
        StepDescriptor::new(
            PAYLOAD,
            "Constructing Profiles Builder Payload",
            ConstructPayload::<ProfileBuilderPayload>::new(
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
            CREATE_PROFILE,
            "Creating Profile",
            CreateProfile(backend.clone()),
        )
        .with_display(all_hidden()),
        StepDescriptor::new(
            ASSIGN_PROFILE,
            "Assigning Profile to users",
            AssignProfile(backend.clone()),
        )
        .with_display(all_hidden()),
    ]
}
