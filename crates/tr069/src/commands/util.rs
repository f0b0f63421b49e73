//! Shared helpers for command handlers.

use std::path::Path;

use serde::Serialize;
use tabled::Tabled;

use tr069_core::model::InstanceNumber;
use tr069_core::{CoreError, ModelOptions};

use super::objects::RowStore;
use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::output;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Split `Name=Value` arguments. The value may be empty or contain `=`.
pub fn parse_assignments(raw: &[String]) -> Result<Vec<(String, String)>, CliError> {
    raw.iter()
        .map(|arg| {
            arg.split_once('=')
                .filter(|(name, _)| !name.is_empty())
                .map(|(name, value)| (name.to_owned(), value.to_owned()))
                .ok_or_else(|| CliError::Validation {
                    field: "assignment".into(),
                    reason: format!("expected Name=Value, got '{arg}'"),
                })
        })
        .collect()
}

/// Resolve a row argument: an instance number, or else an alias.
pub fn resolve_row<S: RowStore>(store: &S, row: &str) -> Result<InstanceNumber, CoreError> {
    match row.parse::<u32>().ok().and_then(InstanceNumber::new) {
        Some(instance) => Ok(instance),
        None => store.table().resolve(row),
    }
}

// ── Parameter listings ──────────────────────────────────────────────

/// One `(path, value)` pair of a parameter listing.
#[derive(Debug, Serialize, Tabled)]
pub struct ParamEntry {
    #[tabled(rename = "Parameter")]
    pub parameter: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

impl ParamEntry {
    pub fn new(parameter: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
            value: value.into(),
        }
    }
}

/// Text rendering of a listing: `Name=Value` lines for plain, else a table.
pub fn param_listing(format: OutputFormat, entries: &[ParamEntry]) -> String {
    if format == OutputFormat::Plain {
        entries
            .iter()
            .map(|e| format!("{}={}", e.parameter, e.value))
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        output::render_table(entries)
    }
}

// ── Table documents ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => Self::Yaml,
            _ => Self::Json,
        }
    }
}

/// Read a table document and apply the configured model options.
pub fn load_document<S: RowStore>(path: &Path, options: &ModelOptions) -> Result<S, CliError> {
    let contents = std::fs::read_to_string(path)?;
    let mut store: S = parse_document(path, &contents)?;
    store.configure(options.clone());
    tracing::debug!(path = %path.display(), rows = store.table().len(), "document loaded");
    Ok(store)
}

/// Like [`load_document`], but a missing file is an empty table.
pub fn load_or_create_document<S: RowStore>(
    path: &Path,
    options: &ModelOptions,
) -> Result<S, CliError> {
    if path.exists() {
        return load_document(path, options);
    }
    let mut store = S::default();
    store.configure(options.clone());
    Ok(store)
}

fn parse_document<S: RowStore>(path: &Path, contents: &str) -> Result<S, CliError> {
    let parsed = match DocumentFormat::for_path(path) {
        DocumentFormat::Yaml => serde_yaml::from_str(contents).map_err(|e| e.to_string()),
        DocumentFormat::Json => serde_json::from_str(contents).map_err(|e| e.to_string()),
    };
    parsed.map_err(|reason| CliError::Document {
        path: path.display().to_string(),
        reason,
    })
}

/// Write a table document in the format its extension names.
pub fn save_document<S: RowStore>(path: &Path, store: &S) -> Result<(), CliError> {
    let rendered = match DocumentFormat::for_path(path) {
        DocumentFormat::Yaml => serde_yaml::to_string(store).map_err(|e| e.to_string()),
        DocumentFormat::Json => serde_json::to_string_pretty(store)
            .map(|json| json + "\n")
            .map_err(|e| e.to_string()),
    };
    let rendered = rendered.map_err(CliError::Render)?;
    std::fs::write(path, rendered)?;
    tracing::info!(path = %path.display(), rows = store.table().len(), "document written");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn assignments_split_on_first_equals() {
        let parsed = parse_assignments(&["Description=a=b".into(), "RemoteHost=".into()]).unwrap();
        assert_eq!(
            parsed,
            vec![
                ("Description".to_owned(), "a=b".to_owned()),
                ("RemoteHost".to_owned(), String::new()),
            ]
        );
        assert!(parse_assignments(&["=5".into()]).is_err());
        assert!(parse_assignments(&["Enable".into()]).is_err());
    }

    #[test]
    fn document_format_follows_extension() {
        assert_eq!(DocumentFormat::for_path(Path::new("rules.yml")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::for_path(Path::new("rules.yaml")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::for_path(Path::new("rules.json")), DocumentFormat::Json);
        assert_eq!(DocumentFormat::for_path(Path::new("rules")), DocumentFormat::Json);
    }
}
