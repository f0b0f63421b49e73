// ── Core error types ──
//
// Two layers live here. `FaultCode` / `ParameterFault` / `SetFault` are the
// CWMP-facing fault vocabulary: every rejected parameter write is attributed
// to the parameter that caused it. `CoreError` wraps those plus the table
// and identity errors that have no single offending parameter.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::InstanceNumber;

// ── FaultCode ───────────────────────────────────────────────────────

/// CWMP fault codes (TR-069 Annex A, table "Fault codes").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaultCode {
    /// 9003 -- the request as a whole is malformed (also the umbrella code
    /// for a SetParameterValues fault carrying per-parameter details).
    InvalidArguments,
    /// 9004 -- a table has reached its maximum number of entries.
    ResourcesExceeded,
    /// 9005 -- no such parameter on this object.
    InvalidParameterName,
    /// 9006 -- the value text cannot be read as the parameter's type.
    InvalidParameterType,
    /// 9007 -- well-typed but out of range, too long, not an enumerated value,
    /// or in violation of a table uniqueness rule.
    InvalidParameterValue,
    /// 9008 -- read-only parameter, or a gated parameter outside its mode.
    NonWritableParameter,
    /// 9009 -- the requested notification level is refused for this parameter.
    NotificationRequestRejected,
}

impl FaultCode {
    pub fn code(self) -> u32 {
        match self {
            Self::InvalidArguments => 9003,
            Self::ResourcesExceeded => 9004,
            Self::InvalidParameterName => 9005,
            Self::InvalidParameterType => 9006,
            Self::InvalidParameterValue => 9007,
            Self::NonWritableParameter => 9008,
            Self::NotificationRequestRejected => 9009,
        }
    }
}

impl fmt::Display for FaultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ── ParameterFault ──────────────────────────────────────────────────

/// One rejected parameter, as reported in a SetParameterValuesFault entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{parameter}: {message} ({code})")]
pub struct ParameterFault {
    /// Wire name (or full path, once a table has prefixed it).
    pub parameter: String,
    pub code: FaultCode,
    pub message: String,
}

impl ParameterFault {
    pub fn new(parameter: impl Into<String>, code: FaultCode, message: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
            code,
            message: message.into(),
        }
    }
}

/// A rejected batch write. Nothing from the batch was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetFault {
    pub code: FaultCode,
    pub faults: Vec<ParameterFault>,
}

impl SetFault {
    pub fn new(faults: Vec<ParameterFault>) -> Self {
        Self {
            code: FaultCode::InvalidArguments,
            faults,
        }
    }

    /// Wire names of every offending parameter, in request order.
    pub fn parameters(&self) -> Vec<&str> {
        self.faults.iter().map(|f| f.parameter.as_str()).collect()
    }
}

impl fmt::Display for SetFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} parameter(s) rejected", self.faults.len())?;
        for fault in &self.faults {
            write!(f, "; {fault}")?;
        }
        Ok(())
    }
}

impl std::error::Error for SetFault {}

// ── CoreError ───────────────────────────────────────────────────────

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Table errors ─────────────────────────────────────────────────
    #[error("{object} instance {instance} not found")]
    InstanceNotFound {
        object: &'static str,
        instance: InstanceNumber,
    },

    #[error("{object} alias '{alias}' not found")]
    AliasNotFound { object: &'static str, alias: String },

    #[error("{object} alias '{alias}' is already in use")]
    DuplicateAlias { object: &'static str, alias: String },

    #[error("Invalid alias '{alias}': {reason}")]
    InvalidAlias { alias: String, reason: String },

    #[error("Invalid {parameter} value {value}: orders start at 1")]
    InvalidOrder { parameter: &'static str, value: u32 },

    #[error("{object} table is full ({max_entries} entries)")]
    TableFull {
        object: &'static str,
        max_entries: usize,
    },

    #[error("{object} row violates uniqueness of ({})", .parameters.join(", "))]
    UniqueConstraint {
        object: &'static str,
        parameters: Vec<String>,
    },

    // ── Parameter errors ─────────────────────────────────────────────
    #[error("SetParameterValues rejected: {0}")]
    SetParameterValues(SetFault),

    #[error(transparent)]
    Parameter(#[from] ParameterFault),

    // ── Serialization ────────────────────────────────────────────────
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    /// The CWMP fault code a session layer would report for this error.
    pub fn fault_code(&self) -> FaultCode {
        match self {
            Self::InstanceNotFound { .. } | Self::AliasNotFound { .. } => {
                FaultCode::InvalidParameterName
            }
            Self::DuplicateAlias { .. }
            | Self::InvalidAlias { .. }
            | Self::InvalidOrder { .. }
            | Self::UniqueConstraint { .. } => FaultCode::InvalidParameterValue,
            Self::TableFull { .. } => FaultCode::ResourcesExceeded,
            Self::SetParameterValues(fault) => fault.code,
            Self::Parameter(fault) => fault.code,
            Self::Serialization(_) => FaultCode::InvalidArguments,
        }
    }

    /// Per-parameter faults carried by this error, if any.
    pub fn parameter_faults(&self) -> &[ParameterFault] {
        match self {
            Self::SetParameterValues(fault) => &fault.faults,
            Self::Parameter(fault) => std::slice::from_ref(fault),
            _ => &[],
        }
    }
}

impl From<SetFault> for CoreError {
    fn from(fault: SetFault) -> Self {
        Self::SetParameterValues(fault)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fault_codes_match_annex_a() {
        assert_eq!(FaultCode::InvalidArguments.code(), 9003);
        assert_eq!(FaultCode::NonWritableParameter.code(), 9008);
        assert_eq!(FaultCode::NotificationRequestRejected.to_string(), "9009");
    }

    #[test]
    fn set_fault_lists_every_parameter() {
        let fault = SetFault::new(vec![
            ParameterFault::new("ExternalPort", FaultCode::InvalidParameterValue, "duplicate"),
            ParameterFault::new("RemoteHost", FaultCode::InvalidParameterValue, "duplicate"),
        ]);
        assert_eq!(fault.parameters(), vec!["ExternalPort", "RemoteHost"]);
        assert_eq!(CoreError::from(fault).parameter_faults().len(), 2);
    }
}
