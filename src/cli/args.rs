//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// abstracta-assist - Build Abstracta APIs, data-quality rules and profiles from plain English.
#[derive(Debug, Parser)]
#[command(name = "abstracta-assist")]
#[command(
    author,
    version,
    about = "Build Abstracta APIs, data-quality rules and profiles from plain English",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides default .abstracta-assist/config.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to a .env file with credentials (default: ./.env if present)
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    /// Path to project root (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Pause between progress updates, in milliseconds
    #[arg(long, global = true)]
    pub pacing_ms: Option<u64>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create an API from a description, grant access and preview its data
    Api(FlowArgs),

    /// Add a data-quality rule to an existing API version
    DqRule(FlowArgs),

    /// Create a data-security profile and assign it to users
    Profile(FlowArgs),

    /// Show example requests
    Examples(ExamplesArgs),

    /// Preview the data of an API version
    Preview(PreviewArgs),

    /// List organizations, applications, data sources or services
    List(ListArgs),
}

/// Arguments shared by the flow commands.
#[derive(Debug, Clone, Default, Args)]
pub struct FlowArgs {
    /// The request in plain English; `-` reads it from stdin
    pub request: Vec<String>,

    /// Read the request from a file
    #[arg(short, long, conflicts_with = "request")]
    pub file: Option<PathBuf>,
}

/// Arguments for the `examples` command.
#[derive(Debug, Clone, Default, Args)]
pub struct ExamplesArgs {
    /// Only show examples for this flow (api, dq-rule, profile)
    #[arg(long)]
    pub flow: Option<String>,
}

/// Arguments for the `preview` command.
#[derive(Debug, Clone, Args)]
pub struct PreviewArgs {
    /// Service version as org/app/datasource/service/version
    pub service: String,

    /// Print the raw JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `list` command.
#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    #[command(subcommand)]
    pub target: ListTarget,
}

/// What to list.
#[derive(Debug, Clone, Subcommand)]
pub enum ListTarget {
    /// Organizations
    Orgs,

    /// Applications in an organization
    Apps {
        /// Organization name
        org: String,
    },

    /// Data sources in an application
    Datasources {
        /// Organization name
        org: String,
        /// Application name
        app: String,
    },

    /// Service versions, optionally scoped to a data source
    Services {
        /// Organization name
        #[arg(requires_all = ["app", "datasource"])]
        org: Option<String>,
        /// Application name
        app: Option<String>,
        /// Data source name
        datasource: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn help_describes_the_tool() {
        let about = Cli::command().get_about().map(|a| a.to_string());
        assert_eq!(
            about.as_deref(),
            Some("Build Abstracta APIs, data-quality rules and profiles from plain English")
        );
    }

    #[test]
    fn parses_flow_request_words() {
        let cli = Cli::parse_from(["abstracta-assist", "api", "build", "an", "API"]);
        let Commands::Api(args) = cli.command else {
            panic!("expected api");
        };
        assert_eq!(args.request, vec!["build", "an", "API"]);
        assert!(args.file.is_none());
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "abstracta-assist",
            "examples",
            "--pacing-ms",
            "0",
            "--no-color",
        ]);
        assert_eq!(cli.pacing_ms, Some(0));
        assert!(cli.no_color);
    }

    #[test]
    fn parses_list_services_scope() {
        let cli = Cli::parse_from(["abstracta-assist", "list", "services", "o", "a", "d"]);
        let Commands::List(ListArgs {
            target: ListTarget::Services { org, app, datasource },
        }) = cli.command
        else {
            panic!("expected list services");
        };
        assert_eq!(org.as_deref(), Some("o"));
        assert_eq!(app.as_deref(), Some("a"));
        assert_eq!(datasource.as_deref(), Some("d"));
    }

    #[test]
    fn partial_service_scope_is_rejected() {
        let result = Cli::try_parse_from(["abstracta-assist", "list", "services", "o"]);
        assert!(result.is_err());
    }

    #[test]
    fn file_conflicts_with_request() {
        let result =
            Cli::try_parse_from(["abstracta-assist", "profile", "words", "--file", "req.txt"]);
        assert!(result.is_err());
    }
}
