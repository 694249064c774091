//! abstracta-assist - Build Abstracta APIs, data-quality rules and profiles from plain English.
//!
//! A request in prose is turned into a structured payload by an agent, then a
//! sequence of steps calls the Abstracta backend to create the artifact and
//! preview its data. Every run streams progress snapshots to a view.
//!
//! # Modules
//!
//! - [`steps`] - Sequential step executor producing snapshot streams
//! - [`progress`] - Progress renderers (HTML and terminal)
//! - [`display`] - Display channel values, tables and theme
//! - [`flows`] - API builder, data-quality-rule and profile flows
//! - [`backend`] - Abstracta REST backend
//! - [`agent`] - Payload types and the agent that fills them
//! - [`config`] - Configuration loading, merging and validation
//! - [`ui`] - Snapshot consumers
//! - [`cli`] - Command-line interface and argument parsing
//! - [`prompts`] - Example requests
//! - [`error`] - Error types and result aliases
//!
//! # Example
//!
//! ```
//! use abstracta_assist::progress::{percent_complete, HtmlProgressRenderer};
//!
//! let names = vec!["fetch".to_string(), "build".to_string(), "submit".to_string()];
//! let html = HtmlProgressRenderer::new().render_frame(&names, 1, None);
//! assert!(html.contains("width:33%"));
//! assert_eq!(percent_complete(2, 3), 66);
//! ```

pub mod agent;
pub mod backend;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod flows;
pub mod progress;
pub mod prompts;
pub mod steps;
pub mod ui;

pub use error::{AssistError, Result};
