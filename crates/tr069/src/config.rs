//! CLI configuration: thin wrapper around `tr069_config` shared types.
//!
//! Adds resolution of the effective settings, where `GlobalOpts` flags
//! take priority over the config file and `TR069_*` overrides.

use std::path::PathBuf;

use clap::ValueEnum;

use tr069_core::ModelOptions;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

pub use tr069_config::{Config, config_path, load_config_from, save_config_to};

/// Effective settings for one invocation.
#[derive(Debug, Clone)]
pub struct Context {
    pub output: OutputFormat,
    pub color: ColorMode,
    pub quiet: bool,
    pub yes: bool,
    pub options: ModelOptions,
}

/// `--config` if given, else the platform config path.
pub fn resolve_path(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(config_path)
}

/// Load the config, treating a missing file as all defaults.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    let path = resolve_path(global);
    tracing::debug!(path = %path.display(), "loading config");
    Ok(load_config_from(&path)?)
}

impl Context {
    pub fn resolve(global: &GlobalOpts, cfg: &Config) -> Result<Self, CliError> {
        let output = match global.output {
            Some(output) => output,
            None => parse_setting("defaults.output", &cfg.defaults.output)?,
        };
        let color = match global.color {
            Some(color) => color,
            None => parse_setting("defaults.color", &cfg.defaults.color)?,
        };

        Ok(Self {
            output,
            color,
            quiet: global.quiet,
            yes: global.yes,
            options: cfg.model_options()?,
        })
    }
}

fn parse_setting<T: ValueEnum>(field: &str, raw: &str) -> Result<T, CliError> {
    T::from_str(raw, true).map_err(|reason| CliError::Validation {
        field: field.into(),
        reason,
    })
}
