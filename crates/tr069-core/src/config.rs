// ── Runtime model options ──
//
// These knobs shape how tables hand out identities and how large they may
// grow. Core never touches disk: `tr069-config` (or any embedding program)
// constructs a `ModelOptions` and hands it to the tables it creates.

use serde::{Deserialize, Serialize};

/// Prefix TR-069 reserves for device-assigned aliases.
pub const DEFAULT_ALIAS_PREFIX: &str = "cpe-";

/// Options applied to every table created with them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelOptions {
    /// Prefix for aliases the device assigns to rows created without one.
    pub alias_prefix: String,
    /// Upper bound on rows per table. `None` means unbounded.
    pub max_entries: Option<usize>,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            alias_prefix: DEFAULT_ALIAS_PREFIX.into(),
            max_entries: None,
        }
    }
}
