// ── Parameter schema ──
//
// Every entity carries a static table of `FieldDescriptor`s: the wire name,
// semantic type and bounds, access mode, notification policy and mode gates
// of each parameter. The generic routines in `validate`, `wire` and
// `notify` consult that table instead of per-field code.

pub mod value;
pub mod validate;
pub mod wire;

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;

pub use validate::{Origin, check_value, set_parameter_values, validate};
pub use value::{INFINITE_TIME, ParamType, ParamValue, UNKNOWN_TIME, infinite_time, unknown_time};
pub use wire::{from_parameter_map, to_parameter_map};

// ── Descriptor building blocks ──────────────────────────────────────

/// Who may write a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AccessMode {
    /// Set only by the managed device itself.
    ReadOnly,
    /// Settable by the managing controller.
    ReadWrite,
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ReadOnly => "R",
            Self::ReadWrite => "W",
        })
    }
}

/// Active-notification policy of a parameter (TR-106 `activeNotify`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum NotifyPolicy {
    #[default]
    Normal,
    /// The device may refuse requests for active notification.
    CanDeny,
    /// Active notification is always on and cannot be turned off.
    ForceEnabled,
    /// Active notification starts on but the controller may change it.
    ForceDefaultEnabled,
}

impl fmt::Display for NotifyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Normal => "normal",
            Self::CanDeny => "canDeny",
            Self::ForceEnabled => "forceEnabled",
            Self::ForceDefaultEnabled => "forceDefaultEnabled",
        })
    }
}

/// Upper bound of the TR-106 `unsignedInt` type.
pub const UINT_MAX: u64 = 4_294_967_295;

/// Upper bound of the TR-106 `int` type.
pub const INT_MAX: i64 = 2_147_483_647;

/// Semantic type of a parameter, with its validation bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParamKind {
    Boolean,
    /// Signed integer. Fields documenting a `-1` sentinel include it in range.
    Int { min: i64, max: i64 },
    UnsignedInt { min: u64, max: u64 },
    /// String with an optional maximum length in characters.
    String { max_len: Option<usize> },
    /// One of a fixed set of wire strings.
    Enum(&'static [&'static str]),
    DateTime,
    /// Dotted-quad IPv4 address; empty means unset.
    Ipv4Address,
    /// MAC address; empty means unset.
    MacAddress,
    /// Comma-separated list, bounded on its total text length.
    List { max_len: Option<usize> },
}

impl ParamKind {
    pub const fn string(max_len: usize) -> Self {
        Self::String {
            max_len: Some(max_len),
        }
    }

    pub const fn list(max_len: usize) -> Self {
        Self::List {
            max_len: Some(max_len),
        }
    }

    pub const fn int(min: i64, max: i64) -> Self {
        Self::Int { min, max }
    }

    pub const fn uint(min: u64, max: u64) -> Self {
        Self::UnsignedInt { min, max }
    }

    /// TR-106 type name, as shown in schema listings.
    pub fn type_name(&self) -> String {
        match self {
            Self::Boolean => "boolean".into(),
            Self::Int { min, max } => format!("int[{min}:{max}]"),
            Self::UnsignedInt { min, max } => format!("unsignedInt[{min}:{max}]"),
            Self::String { max_len: Some(n) } => format!("string({n})"),
            Self::String { max_len: None } => "string".into(),
            Self::Enum(values) => format!("string{{{}}}", values.join("|")),
            Self::DateTime => "dateTime".into(),
            Self::Ipv4Address => "IPv4Address".into(),
            Self::MacAddress => "MACAddress".into(),
            Self::List { max_len: Some(n) } => format!("list({n})"),
            Self::List { max_len: None } => "list".into(),
        }
    }
}

/// Writability condition on a sibling "mode" parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Gate {
    /// Wire name of the mode parameter on the same object.
    pub mode: &'static str,
    /// Wire values of the mode under which the gated field is writable.
    pub allowed: &'static [&'static str],
}

impl Gate {
    pub const fn new(mode: &'static str, allowed: &'static [&'static str]) -> Self {
        Self { mode, allowed }
    }

    /// Whether `entity`'s current mode value opens this gate.
    pub fn is_open<E: ManagedEntity>(&self, entity: &E) -> bool {
        entity
            .get(self.mode)
            .is_some_and(|mode| self.allowed.contains(&mode.to_string().as_str()))
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.mode, self.allowed.join("|"))
    }
}

/// Metadata for one parameter of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    /// External (wire) name: the actual protocol contract.
    pub name: &'static str,
    pub kind: ParamKind,
    pub access: AccessMode,
    pub notify: NotifyPolicy,
    /// All gates must be open for a controller write to be accepted.
    pub gates: &'static [Gate],
    /// Write-only value (passwords, keys); reads return an empty string.
    pub secret: bool,
}

impl FieldDescriptor {
    pub const fn rw(name: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            kind,
            access: AccessMode::ReadWrite,
            notify: NotifyPolicy::Normal,
            gates: &[],
            secret: false,
        }
    }

    pub const fn ro(name: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            kind,
            access: AccessMode::ReadOnly,
            notify: NotifyPolicy::Normal,
            gates: &[],
            secret: false,
        }
    }

    pub const fn notify(self, notify: NotifyPolicy) -> Self {
        Self { notify, ..self }
    }

    pub const fn gated(self, gates: &'static [Gate]) -> Self {
        Self { gates, ..self }
    }

    pub const fn secret(self) -> Self {
        Self {
            secret: true,
            ..self
        }
    }

    pub fn is_writable(&self) -> bool {
        self.access == AccessMode::ReadWrite
    }

    /// The value a reader (GetParameterValues, notifications) sees.
    pub fn read<E: ManagedEntity>(&self, entity: &E) -> Option<ParamValue> {
        let value = entity.get(self.name)?;
        if self.secret {
            return Some(ParamValue::String(String::new()));
        }
        Some(value)
    }
}

// ── ManagedEntity ───────────────────────────────────────────────────

/// One configurable object, or one row of a configurable table.
///
/// `get` / `put` map wire names onto typed fields; `put` stores without any
/// policy checks, which belong to [`validate`].
pub trait ManagedEntity:
    Clone + Default + PartialEq + fmt::Debug + Serialize + DeserializeOwned + 'static
{
    /// Object path in TR-106 notation, e.g. `Device.Firewall.Chain.{i}.Rule.{i}.`
    const OBJECT_NAME: &'static str;

    fn descriptors() -> &'static [FieldDescriptor];

    fn descriptor(name: &str) -> Option<&'static FieldDescriptor> {
        Self::descriptors().iter().find(|d| d.name == name)
    }

    fn get(&self, name: &str) -> Option<ParamValue>;

    fn put(&mut self, name: &str, value: ParamValue) -> Result<(), String>;

    /// Parameter tuples that must be unique across all rows of a table.
    fn unique_keys() -> &'static [&'static [&'static str]] {
        &[]
    }

    /// Disabled rows are exempt from `unique_keys()`.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Current alias for table rows that carry one.
    fn alias(&self) -> Option<&str> {
        None
    }

    fn set_alias(&mut self, _alias: String) {}
}

/// Generates `get` / `put` for a `ManagedEntity` impl from a wire-name to
/// field mapping.
macro_rules! entity_params {
    ($($wire:literal => $field:ident),* $(,)?) => {
        fn get(&self, name: &str) -> Option<$crate::schema::ParamValue> {
            match name {
                $($wire => Some($crate::schema::ParamType::to_param(&self.$field)),)*
                _ => None,
            }
        }

        fn put(&mut self, name: &str, value: $crate::schema::ParamValue) -> Result<(), String> {
            match name {
                $($wire => self.$field = $crate::schema::ParamType::from_param(value)?,)*
                _ => return Err(format!("unknown parameter '{name}'")),
            }
            Ok(())
        }
    };
}

pub(crate) use entity_params;
