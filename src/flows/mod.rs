//! The three flows built on the step executor.
//!
//! Each flow turns a prose request into a step list:
//!
//! - [`api_builder`] - create an API, grant access, preview its data
//! - [`dq_rules`] - add a data-quality rule to an API and preview the checks
//! - [`profile`] - create a data-security profile and assign it to users
//!
//! All flows share the channel layout in [`channels`], start with a visible
//! banner and finish with [`channels::FINAL_MESSAGE`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use abstracta_assist::agent::OpenAiAgent;
//! use abstracta_assist::backend::HttpBackend;
//! use abstracta_assist::config::AssistConfig;
//! use abstracta_assist::flows::{FlowKind, FlowServices, FlowSettings};
//! use abstracta_assist::progress::HtmlProgressRenderer;
//!
//! # fn demo() -> anyhow::Result<()> {
//! let config = AssistConfig::default();
//! let services = FlowServices {
//!     backend: Arc::new(HttpBackend::new(config.backend.clone())?),
//!     agent: Arc::new(OpenAiAgent::new(&config.agent)?),
//! };
//! let settings = FlowSettings::from_config(FlowKind::Api, &config);
//! let executor = FlowKind::Api.build(
//!     &services,
//!     &settings,
//!     "Create an API for the salesorderitems table",
//!     HtmlProgressRenderer::new(),
//! )?;
//! assert_eq!(executor.step_names().len(), 7);
//! # Ok(())
//! # }
//! ```

pub mod api_builder;
pub mod channels;
pub mod common;
pub mod dq_rules;
pub mod profile;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::agent::PayloadAgent;
use crate::backend::AbstractaBackend;
use crate::config::AssistConfig;
use crate::display::ChannelUpdate;
use crate::error::Result;
use crate::progress::ProgressRenderer;
use crate::steps::{StepDescriptor, StepExecutor};

/// A step of any flow.
pub type FlowStep = StepDescriptor<Value, ChannelUpdate>;

/// Executor type every flow builds.
pub type FlowExecutor = StepExecutor<Value, ChannelUpdate>;

/// External collaborators the flow steps call.
#[derive(Clone)]
pub struct FlowServices {
    pub backend: Arc<dyn AbstractaBackend>,
    pub agent: Arc<dyn PayloadAgent>,
}

/// Per-run settings taken from the configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowSettings {
    /// Model the agent uses for this flow's payload.
    pub model: String,
    /// Pause between emitted snapshots.
    pub pacing: Duration,
    /// Users granted access to a newly created API.
    pub grant_users: Vec<String>,
    /// Roles granted to those users.
    pub grant_roles: Vec<String>,
}

impl FlowSettings {
    pub fn from_config(kind: FlowKind, config: &AssistConfig) -> Self {
        Self {
            model: kind.model(config).to_string(),
            pacing: config.executor.pacing(),
            grant_users: config.backend.for_user.iter().cloned().collect(),
            grant_roles: config.backend.grant_roles.clone(),
        }
    }
}

/// Which flow to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    Api,
    DqRule,
    Profile,
}

impl FlowKind {
    /// Every flow, in menu order.
    pub const ALL: [FlowKind; 3] = [FlowKind::Api, FlowKind::DqRule, FlowKind::Profile];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::DqRule => "dq-rule",
            Self::Profile => "profile",
        }
    }

    /// Human-readable name.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Api => "API builder",
            Self::DqRule => "Data quality rule builder",
            Self::Profile => "Profile builder",
        }
    }

    /// Visible message emitted before the first step.
    pub fn banner(&self) -> &'static str {
        match self {
            Self::Api => api_builder::BANNER,
            Self::DqRule => dq_rules::BANNER,
            Self::Profile => profile::BANNER,
        }
    }

    /// Agent model configured for this flow.
    pub fn model<'a>(&self, config: &'a AssistConfig) -> &'a str {
        match self {
            Self::Api => &config.agent.api_model,
            Self::DqRule => &config.agent.dq_rule_model,
            Self::Profile => &config.agent.profile_model,
        }
    }

    /// The flow's step list.
    pub fn steps(
        &self,
        services: &FlowServices,
        settings: &FlowSettings,
        requirements: &str,
    ) -> Vec<FlowStep> {
        match self {
            Self::Api => api_builder::steps(services, settings, requirements),
            Self::DqRule => dq_rules::steps(services, settings, requirements),
            Self::Profile => profile::steps(services, settings, requirements),
        }
    }

    /// Assemble the executor for one run of this flow.
    pub fn build(
        &self,
        services: &FlowServices,
        settings: &FlowSettings,
        requirements: &str,
        renderer: impl ProgressRenderer + 'static,
    ) -> Result<FlowExecutor> {
        StepExecutor::builder()
            .steps(self.steps(services, settings, requirements))
            .initial_snapshot(channels::banner(self.banner()))
            .clear_channels(channels::cleared())
            .final_message(channels::FINAL_MESSAGE)
            .progress_renderer(renderer)
            .pacing(settings.pacing)
            .build()
    }
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlowKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown flow '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_follow_config() {
        let mut config = AssistConfig::default();
        config.backend.for_user = Some("svc".into());
        config.executor.pacing_ms = 0;

        let settings = FlowSettings::from_config(FlowKind::DqRule, &config);
        assert_eq!(settings.model, "gpt-5-nano");
        assert!(settings.pacing.is_zero());
        assert_eq!(settings.grant_users, vec!["svc"]);
        assert_eq!(settings.grant_roles, vec!["VIEWER", "EDITOR", "CREATOR"]);
    }

    #[test]
    fn no_for_user_means_no_grantees() {
        let settings = FlowSettings::from_config(FlowKind::Api, &AssistConfig::default());
        assert!(settings.grant_users.is_empty());
        assert_eq!(settings.model, "gpt-4o-mini");
    }

    #[test]
    fn kind_round_trips_through_str() {
        for kind in FlowKind::ALL {
            assert_eq!(kind.as_str().parse::<FlowKind>().unwrap(), kind);
        }
        assert!("report".parse::<FlowKind>().is_err());
    }
}
