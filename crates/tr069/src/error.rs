//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use tr069_config::ConfigError;
use tr069_core::{CoreError, SetFault};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const REJECTED: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Parameter writes ─────────────────────────────────────────────
    #[error("SetParameterValues rejected ({code}): {fault}")]
    #[diagnostic(
        code(tr069::rejected),
        help("Run: tr069 schema {object} to see access modes, bounds and gates")
    )]
    Rejected {
        object: String,
        code: u32,
        fault: SetFault,
    },

    #[error("{object} rows are created by the device")]
    #[diagnostic(
        code(tr069::device_owned),
        help("Pass --as-device to add the row as the device would")
    )]
    DeviceOwned { object: String },

    #[error("Document failed validation: {count} problem(s)")]
    #[diagnostic(code(tr069::invalid_document))]
    InvalidDocument { count: usize },

    // ── Rows ─────────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(tr069::not_found),
        help("Run: tr069 params {object} <FILE> to see the rows in the document")
    )]
    NotFound { object: String, message: String },

    #[error("{message}")]
    #[diagnostic(code(tr069::conflict))]
    Conflict { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(tr069::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration file already exists")]
    #[diagnostic(
        code(tr069::config_exists),
        help("Edit it directly, or remove it and run: tr069 config init\nPath: {path}")
    )]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(tr069::config))]
    Config(#[from] ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(tr069::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid document {path}: {reason}")]
    #[diagnostic(
        code(tr069::document),
        help("A table document maps instance numbers to rows keyed by wire name.")
    )]
    Document { path: String, reason: String },

    #[error("Could not render output: {0}")]
    #[diagnostic(code(tr069::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Rejected { .. } | Self::DeviceOwned { .. } | Self::InvalidDocument { .. } => {
                exit_code::REJECTED
            }
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } | Self::ConfigExists { .. } => exit_code::CONFLICT,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Attach the object type a core error came from.
    pub fn from_core(err: CoreError, object: &str) -> Self {
        let code = err.fault_code().code();
        match err {
            CoreError::SetParameterValues(fault) => Self::Rejected {
                object: object.into(),
                code,
                fault,
            },
            CoreError::Parameter(fault) => Self::Rejected {
                object: object.into(),
                code,
                fault: SetFault::new(vec![fault]),
            },
            CoreError::InstanceNotFound { .. } | CoreError::AliasNotFound { .. } => Self::NotFound {
                object: object.into(),
                message: err.to_string(),
            },
            CoreError::DuplicateAlias { .. }
            | CoreError::UniqueConstraint { .. }
            | CoreError::TableFull { .. } => Self::Conflict {
                message: format!("{err} ({code})"),
            },
            CoreError::InvalidAlias { alias, reason } => Self::Validation {
                field: "Alias".into(),
                reason: format!("'{alias}': {reason}"),
            },
            CoreError::InvalidOrder { parameter, value } => Self::Validation {
                field: parameter.into(),
                reason: format!("{value} is not a rank; orders start at 1"),
            },
            CoreError::Serialization(e) => Self::Render(e.to_string()),
        }
    }
}
