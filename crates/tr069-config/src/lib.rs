//! Shared configuration for the tr069 tools.
//!
//! A TOML file plus `TR069_*` environment overrides, layered with figment,
//! and translation into `tr069_core::ModelOptions`.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use tr069_core::ModelOptions;
use tr069_core::model::Alias;

/// Prefix of environment overrides. Nested keys use `__`:
/// `TR069_MODEL__MAX_ENTRIES=32`.
pub const ENV_PREFIX: &str = "TR069_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Output defaults for the CLI.
    #[serde(default)]
    pub defaults: Defaults,

    /// Table behaviour.
    #[serde(default)]
    pub model: ModelSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ModelSection {
    /// Prefix of device-assigned aliases.
    #[serde(default = "default_alias_prefix")]
    pub alias_prefix: String,

    /// Row limit per table; absent means unbounded.
    pub max_entries: Option<usize>,
}

impl Default for ModelSection {
    fn default() -> Self {
        Self {
            alias_prefix: default_alias_prefix(),
            max_entries: None,
        }
    }
}

fn default_alias_prefix() -> String {
    tr069_core::config::DEFAULT_ALIAS_PREFIX.into()
}

impl Config {
    /// Validated model options for tables built by the tools.
    pub fn model_options(&self) -> Result<ModelOptions, ConfigError> {
        let prefix = &self.model.alias_prefix;
        // The prefix must itself start a valid alias.
        Alias::new(format!("{prefix}1")).map_err(|e| ConfigError::Validation {
            field: "model.alias_prefix".into(),
            reason: e.to_string(),
        })?;

        if self.model.max_entries == Some(0) {
            return Err(ConfigError::Validation {
                field: "model.max_entries".into(),
                reason: "must be at least 1".into(),
            });
        }

        Ok(ModelOptions {
            alias_prefix: prefix.clone(),
            max_entries: self.model.max_entries,
        })
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "tr069", "tr069").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("tr069");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from `path` + environment. A missing file is not
/// an error; defaults apply.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if it cannot be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use figment::Jail;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        Jail::expect_with(|jail| {
            let config = load_config_from(&jail.directory().join("absent.toml")).unwrap();
            assert_eq!(config, Config::default());
            assert_eq!(config.model_options().unwrap(), ModelOptions::default());
            Ok(())
        });
    }

    #[test]
    fn file_then_environment() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                    [defaults]
                    output = "json"

                    [model]
                    alias_prefix = "gw-"
                    max_entries = 16
                "#,
            )?;
            jail.set_env("TR069_MODEL__MAX_ENTRIES", "32");

            let config = load_config_from(&jail.directory().join("config.toml")).unwrap();
            assert_eq!(config.defaults.output, "json");
            assert_eq!(config.defaults.color, "auto");

            let options = config.model_options().unwrap();
            assert_eq!(options.alias_prefix, "gw-");
            assert_eq!(options.max_entries, Some(32));
            Ok(())
        });
    }

    #[test]
    fn invalid_model_section_is_rejected() {
        let mut config = Config::default();
        config.model.alias_prefix = "1-".into();
        assert!(matches!(
            config.model_options(),
            Err(ConfigError::Validation { field, .. }) if field == "model.alias_prefix"
        ));

        let mut config = Config::default();
        config.model.max_entries = Some(0);
        assert!(config.model_options().is_err());
    }

    #[test]
    fn save_then_load() {
        Jail::expect_with(|jail| {
            let path = jail.directory().join("nested").join("config.toml");
            let mut config = Config::default();
            config.model.max_entries = Some(8);
            save_config_to(&config, &path).unwrap();

            let loaded = load_config_from(&path).unwrap();
            assert_eq!(loaded, config);
            Ok(())
        });
    }
}
