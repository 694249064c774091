//! Configuration file discovery and loading.

use crate::config::env_file::EnvFileParser;
use crate::config::merger::merge_layers;
use crate::config::overrides::apply_env_overrides;
use crate::config::schema::AssistConfig;
use crate::config::validator::validate;
use crate::error::{AssistError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the per-user and per-project config directory.
pub const CONFIG_DIR: &str = ".abstracta-assist";

/// Paths to configuration files in priority order (later overrides earlier).
///
/// Merge order:
/// 1. User global config (`~/.abstracta-assist/config.yml`)
/// 2. Project config (`.abstracta-assist/config.yml`)
/// 3. Local overrides (`.abstracta-assist/config.local.yml`)
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    pub user_global: Option<PathBuf>,
    pub project: Option<PathBuf>,
    pub project_local: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover config files for the given project root.
    pub fn discover(project_root: &Path) -> Self {
        Self {
            user_global: dirs::home_dir().and_then(|home| existing(home.join(CONFIG_DIR).join("config.yml"))),
            ..Self::discover_project(project_root)
        }
    }

    /// Discover only the project-level files, ignoring the user's home.
    pub fn discover_project(project_root: &Path) -> Self {
        let dir = project_root.join(CONFIG_DIR);
        Self {
            user_global: None,
            project: existing(dir.join("config.yml")),
            project_local: existing(dir.join("config.local.yml")),
        }
    }

    /// Returns all existing config paths in merge order.
    pub fn all_existing(&self) -> Vec<&PathBuf> {
        [&self.user_global, &self.project, &self.project_local]
            .into_iter()
            .flatten()
            .collect()
    }
}

fn existing(path: PathBuf) -> Option<PathBuf> {
    path.exists().then_some(path)
}

/// Load a config file as raw YAML Value (for merging).
pub fn load_config_value(path: &Path) -> Result<serde_yaml::Value> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AssistError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            AssistError::Io(e)
        }
    })?;

    serde_yaml::from_str(&content).map_err(|e| AssistError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Deep-merge the given files and parse the result.
///
/// No files at all is not an error; the defaults apply.
pub fn load_from_paths(paths: &ConfigPaths) -> Result<AssistConfig> {
    let existing = paths.all_existing();
    let mut values = Vec::with_capacity(existing.len());
    for path in &existing {
        debug!("Loading config from {}", path.display());
        values.push(load_config_value(path)?);
    }

    let merged = merge_layers(&values);
    serde_yaml::from_value(merged).map_err(|e| AssistError::ConfigParseError {
        path: existing
            .last()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR)),
        message: format!("Failed to parse merged config: {}", e),
    })
}

/// Load config with optional path override.
///
/// If `config_override` is provided, loads only that file without merging.
/// Otherwise, discovers and merges all config files.
pub fn load_config(project_root: &Path, config_override: Option<&Path>) -> Result<AssistConfig> {
    match config_override {
        Some(path) => {
            let value = load_config_value(path)?;
            serde_yaml::from_value(merge_layers(&[value])).map_err(|e| {
                AssistError::ConfigParseError {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                }
            })
        }
        None => load_from_paths(&ConfigPaths::discover(project_root)),
    }
}

/// Where to look for settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Load exactly this YAML file instead of discovering.
    pub config_file: Option<PathBuf>,
    /// Read this `.env` file; it must exist. Defaults to `<project>/.env` if present.
    pub env_file: Option<PathBuf>,
}

/// Load the YAML config, layer `.env` and process environment on top, validate.
pub fn load_settings(project_root: &Path, options: &LoadOptions) -> Result<AssistConfig> {
    let mut config = load_config(project_root, options.config_file.as_deref())?;

    let mut vars = match &options.env_file {
        Some(path) => EnvFileParser::load(path)?,
        None => EnvFileParser::load_optional(&project_root.join(".env"))?,
    };
    vars.extend(std::env::vars());

    apply_env_overrides(&mut config, &vars)?;
    validate(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, name: &str, content: &str) -> PathBuf {
        let dir = root.join(CONFIG_DIR);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn discover_finds_project_files() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "config.yml", "{}");
        write(temp.path(), "config.local.yml", "{}");

        let paths = ConfigPaths::discover_project(temp.path());
        assert!(paths.project.is_some());
        assert!(paths.project_local.is_some());
        assert_eq!(paths.all_existing().len(), 2);
    }

    #[test]
    fn no_files_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = load_from_paths(&ConfigPaths::discover_project(temp.path())).unwrap();
        assert_eq!(config, AssistConfig::default());
    }

    #[test]
    fn local_overrides_project() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "config.yml",
            "backend:\n  for_user: project_user\n  preview_rows: 20\n",
        );
        write(temp.path(), "config.local.yml", "backend:\n  for_user: local_user\n");

        let config = load_from_paths(&ConfigPaths::discover_project(temp.path())).unwrap();
        assert_eq!(config.backend.for_user.as_deref(), Some("local_user"));
        assert_eq!(config.backend.preview_rows, 20);
    }

    #[test]
    fn override_path_loads_single_file() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "config.yml", "executor:\n  pacing_ms: 10\n");
        let other = temp.path().join("other.yml");
        fs::write(&other, "executor:\n  pacing_ms: 0\n").unwrap();

        let config = load_config(temp.path(), Some(&other)).unwrap();
        assert_eq!(config.executor.pacing_ms, 0);
    }

    #[test]
    fn missing_override_is_not_found() {
        let temp = TempDir::new().unwrap();
        let err = load_config(temp.path(), Some(&temp.path().join("nope.yml"))).unwrap_err();
        assert!(matches!(err, AssistError::ConfigNotFound { .. }));
    }

    #[test]
    fn invalid_yaml_is_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = write(temp.path(), "config.yml", "backend: [unclosed");
        let err = load_config_value(&path).unwrap_err();
        assert!(matches!(err, AssistError::ConfigParseError { .. }));
    }

    #[test]
    fn wrong_type_is_parse_error() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "config.yml", "backend:\n  timeout_secs: soon\n");
        let err = load_from_paths(&ConfigPaths::discover_project(temp.path())).unwrap_err();
        assert!(err.to_string().contains("Failed to parse merged config"));
    }

    #[test]
    fn settings_read_env_file() {
        let temp = TempDir::new().unwrap();
        let env = temp.path().join("custom.env");
        fs::write(&env, "ABSTRACTA_AUDIENCE=assist-audience\n").unwrap();
        let other = temp.path().join("empty.yml");
        fs::write(&other, "{}").unwrap();

        let config = load_settings(
            temp.path(),
            &LoadOptions {
                config_file: Some(other),
                env_file: Some(env),
            },
        )
        .unwrap();
        assert_eq!(config.backend.audience.as_deref(), Some("assist-audience"));
    }

    #[test]
    fn settings_require_explicit_env_file() {
        let temp = TempDir::new().unwrap();
        let other = temp.path().join("empty.yml");
        fs::write(&other, "{}").unwrap();
        let result = load_settings(
            temp.path(),
            &LoadOptions {
                config_file: Some(other),
                env_file: Some(temp.path().join("missing.env")),
            },
        );
        assert!(result.is_err());
    }
}
