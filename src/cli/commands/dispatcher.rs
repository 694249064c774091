//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::backend::{AbstractaBackend, HttpBackend};
use crate::cli::args::{Cli, Commands};
use crate::config::{load_settings, AssistConfig, LoadOptions};
use crate::display::{should_use_colors, AssistTheme};
use crate::error::Result;
use crate::flows::FlowKind;

use super::examples::ExamplesCommand;
use super::list::ListCommand;
use super::preview::PreviewCommand;
use super::run::RunCommand;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
#[async_trait]
pub trait Command {
    /// Execute the command.
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    async fn execute(&self) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    project_root: PathBuf,
}

impl CommandDispatcher {
    /// Create a new dispatcher for the given project root.
    pub fn new(project_root: PathBuf) -> Self {
        Self { project_root }
    }

    /// Get the project root path.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Load settings for a run, applying the global flags.
    pub fn load_config(&self, cli: &Cli) -> Result<AssistConfig> {
        let options = LoadOptions {
            config_file: cli.config.clone(),
            env_file: cli.env_file.clone(),
        };
        let mut config = load_settings(&self.project_root, &options)?;
        if let Some(pacing_ms) = cli.pacing_ms {
            config.executor.pacing_ms = pacing_ms;
        }
        debug!("Resolved configuration: {:?}", redacted(&config));
        Ok(config)
    }

    /// Dispatch and execute a command.
    ///
    /// Routes the CLI subcommand to the appropriate command implementation
    /// and executes it.
    pub async fn dispatch(&self, cli: &Cli) -> Result<CommandResult> {
        let theme = AssistTheme::for_colors(!cli.no_color && should_use_colors());

        match &cli.command {
            Commands::Examples(args) => ExamplesCommand::new(args, theme)?.execute().await,
            Commands::Api(args) => {
                let config = self.load_config(cli)?;
                RunCommand::new(FlowKind::Api, args.clone(), config, theme)
                    .execute()
                    .await
            }
            Commands::DqRule(args) => {
                let config = self.load_config(cli)?;
                RunCommand::new(FlowKind::DqRule, args.clone(), config, theme)
                    .execute()
                    .await
            }
            Commands::Profile(args) => {
                let config = self.load_config(cli)?;
                RunCommand::new(FlowKind::Profile, args.clone(), config, theme)
                    .execute()
                    .await
            }
            Commands::Preview(args) => {
                let backend = self.backend(cli)?;
                PreviewCommand::new(args, backend, theme)?.execute().await
            }
            Commands::List(args) => {
                let backend = self.backend(cli)?;
                ListCommand::new(args.target.clone(), backend, theme)
                    .execute()
                    .await
            }
        }
    }

    fn backend(&self, cli: &Cli) -> Result<Arc<dyn AbstractaBackend>> {
        let config = self.load_config(cli)?;
        Ok(Arc::new(HttpBackend::new(config.backend)?))
    }
}

/// Copy of `config` safe to log.
fn redacted(config: &AssistConfig) -> AssistConfig {
    let mut config = config.clone();
    let hide = |slot: &mut Option<String>| {
        if slot.is_some() {
            *slot = Some("***".to_string());
        }
    };
    hide(&mut config.backend.client_secret);
    hide(&mut config.backend.for_user_secret);
    hide(&mut config.agent.api_key);
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn command_result_success() {
        let result = CommandResult::success();
        assert!(result.success);
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn command_result_failure() {
        let result = CommandResult::failure(1);
        assert!(!result.success);
        assert_eq!(result.exit_code, 1);
    }

    #[test]
    fn dispatcher_creation() {
        let dispatcher = CommandDispatcher::new(PathBuf::from("/test"));
        assert_eq!(dispatcher.project_root(), Path::new("/test"));
    }

    #[test]
    fn pacing_flag_overrides_config() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("assist.yml");
        std::fs::write(&config_path, "executor:\n  pacing_ms: 250\n").unwrap();

        let cli = Cli::parse_from([
            "abstracta-assist",
            "examples",
            "--config",
            config_path.to_str().unwrap(),
            "--pacing-ms",
            "0",
        ]);
        let config = CommandDispatcher::new(temp.path().to_path_buf())
            .load_config(&cli)
            .unwrap();
        assert_eq!(config.executor.pacing_ms, 0);
    }

    #[test]
    fn redacted_hides_secrets() {
        let mut config = AssistConfig::default();
        config.backend.client_secret = Some("s3cret".into());
        config.agent.api_key = Some("sk-live".into());
        let logged = format!("{:?}", redacted(&config));
        assert!(!logged.contains("s3cret"));
        assert!(!logged.contains("sk-live"));
        assert!(logged.contains("***"));
    }
}
