//! Configuration loading, parsing, and validation.
//!
//! This module handles all aspects of configuration:
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Deep merging in [`merger`]
//! - `.env` parsing in [`env_file`]
//! - Environment variable overrides in [`overrides`]
//! - Validation in [`validator`]
//!
//! # Example
//!
//! ```
//! use abstracta_assist::config::{load_config, validate};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! let dir = temp.path().join(".abstracta-assist");
//! fs::create_dir_all(&dir).unwrap();
//! fs::write(dir.join("config.yml"), "executor:\n  pacing_ms: 0\n").unwrap();
//!
//! let path = dir.join("config.yml");
//! let config = load_config(temp.path(), Some(&path)).unwrap();
//! validate(&config).unwrap();
//! assert_eq!(config.executor.pacing_ms, 0);
//! ```
//!
//! # Configuration Sources
//!
//! Settings are layered in this order, later sources winning:
//! 1. Built-in defaults
//! 2. User global config (`~/.abstracta-assist/config.yml`)
//! 3. Project config (`.abstracta-assist/config.yml`)
//! 4. Local overrides (`.abstracta-assist/config.local.yml`)
//! 5. `.env` file
//! 6. Process environment

pub mod env_file;
pub mod loader;
pub mod merger;
pub mod overrides;
pub mod schema;
pub mod validator;

pub use schema::{AgentConfig, AssistConfig, BackendConfig, ExecutorConfig};

pub use loader::{
    load_config, load_config_value, load_from_paths, load_settings, ConfigPaths, LoadOptions,
    CONFIG_DIR,
};

pub use merger::{deep_merge, merge_layers};

pub use overrides::apply_env_overrides;

pub use validator::{validate, validate_config};

pub use env_file::EnvFileParser;
