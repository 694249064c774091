//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations. This allows:
//! - Single binary with subcommands (`abstracta-assist api`, `abstracta-assist list`)
//! - Shared configuration loading
//! - Consistent global flag handling

pub mod dispatcher;
pub mod examples;
pub mod list;
pub mod preview;
pub mod run;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
