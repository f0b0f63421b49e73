// ── Parameter values ──
//
// `ParamValue` is the typed, wire-neutral form of a parameter value.
// `ParamType` bridges it with the Rust types entity fields are declared as.

use std::fmt;
use std::net::Ipv4Addr;

use chrono::{DateTime, SecondsFormat, Utc};

use super::ParamKind;
use crate::model::MacAddress;

/// Wire text of the "unknown time" sentinel.
pub const UNKNOWN_TIME: &str = "0001-01-01T00:00:00Z";

/// Wire text of the "infinite time" sentinel (never expires).
pub const INFINITE_TIME: &str = "9999-12-31T23:59:59Z";

/// `0001-01-01T00:00:00Z`
pub fn unknown_time() -> DateTime<Utc> {
    DateTime::from_timestamp(-62_135_596_800, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// `9999-12-31T23:59:59Z`
pub fn infinite_time() -> DateTime<Utc> {
    DateTime::from_timestamp(253_402_300_799, 0).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// A typed parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Boolean(bool),
    Int(i64),
    UnsignedInt(u64),
    String(String),
    DateTime(DateTime<Utc>),
    List(Vec<String>),
}

impl ParamValue {
    /// Parse wire text as a value of `kind`.
    pub fn parse(kind: ParamKind, text: &str) -> Result<Self, String> {
        match kind {
            ParamKind::Boolean => match text.trim() {
                "true" | "1" => Ok(Self::Boolean(true)),
                "false" | "0" => Ok(Self::Boolean(false)),
                other => Err(format!("'{other}' is not a boolean")),
            },
            ParamKind::Int { .. } => text
                .trim()
                .parse()
                .map(Self::Int)
                .map_err(|_| format!("'{text}' is not an integer")),
            ParamKind::UnsignedInt { .. } => text
                .trim()
                .parse()
                .map(Self::UnsignedInt)
                .map_err(|_| format!("'{text}' is not an unsigned integer")),
            ParamKind::DateTime => DateTime::parse_from_rfc3339(text.trim())
                .map(|dt| Self::DateTime(dt.with_timezone(&Utc)))
                .map_err(|e| format!("'{text}' is not a dateTime: {e}")),
            ParamKind::List { .. } => Ok(Self::List(split_list(text))),
            ParamKind::String { .. }
            | ParamKind::Enum(_)
            | ParamKind::Ipv4Address
            | ParamKind::MacAddress => Ok(Self::String(text.to_owned())),
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "boolean",
            Self::Int(_) => "int",
            Self::UnsignedInt(_) => "unsignedInt",
            Self::String(_) => "string",
            Self::DateTime(_) => "dateTime",
            Self::List(_) => "list",
        }
    }

    fn mismatch(&self, expected: &str) -> String {
        format!("expected {expected}, got {}", self.kind_name())
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::UnsignedInt(u) => write!(f, "{u}"),
            Self::String(s) => f.write_str(s),
            Self::DateTime(dt) => f.write_str(&dt.to_rfc3339_opts(SecondsFormat::Secs, true)),
            Self::List(items) => f.write_str(&items.join(",")),
        }
    }
}

/// Split a comma-separated list value, trimming whitespace around items.
pub(crate) fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}

// ── ParamType ───────────────────────────────────────────────────────

/// Conversion between an entity field's Rust type and `ParamValue`.
pub trait ParamType: Sized {
    fn to_param(&self) -> ParamValue;
    fn from_param(value: ParamValue) -> Result<Self, String>;
}

impl ParamType for bool {
    fn to_param(&self) -> ParamValue {
        ParamValue::Boolean(*self)
    }

    fn from_param(value: ParamValue) -> Result<Self, String> {
        match value {
            ParamValue::Boolean(b) => Ok(b),
            other => Err(other.mismatch("boolean")),
        }
    }
}

impl ParamType for i32 {
    fn to_param(&self) -> ParamValue {
        ParamValue::Int(i64::from(*self))
    }

    fn from_param(value: ParamValue) -> Result<Self, String> {
        match value {
            ParamValue::Int(i) => Self::try_from(i).map_err(|_| format!("{i} does not fit int")),
            other => Err(other.mismatch("int")),
        }
    }
}

impl ParamType for u32 {
    fn to_param(&self) -> ParamValue {
        ParamValue::UnsignedInt(u64::from(*self))
    }

    fn from_param(value: ParamValue) -> Result<Self, String> {
        match value {
            ParamValue::UnsignedInt(u) => {
                Self::try_from(u).map_err(|_| format!("{u} does not fit unsignedInt"))
            }
            other => Err(other.mismatch("unsignedInt")),
        }
    }
}

impl ParamType for String {
    fn to_param(&self) -> ParamValue {
        ParamValue::String(self.clone())
    }

    fn from_param(value: ParamValue) -> Result<Self, String> {
        match value {
            ParamValue::String(s) => Ok(s),
            other => Err(other.mismatch("string")),
        }
    }
}

impl ParamType for Vec<String> {
    fn to_param(&self) -> ParamValue {
        ParamValue::List(self.clone())
    }

    fn from_param(value: ParamValue) -> Result<Self, String> {
        match value {
            ParamValue::List(items) => Ok(items),
            ParamValue::String(s) => Ok(split_list(&s)),
            other => Err(other.mismatch("list")),
        }
    }
}

impl ParamType for DateTime<Utc> {
    fn to_param(&self) -> ParamValue {
        ParamValue::DateTime(*self)
    }

    fn from_param(value: ParamValue) -> Result<Self, String> {
        match value {
            ParamValue::DateTime(dt) => Ok(dt),
            other => Err(other.mismatch("dateTime")),
        }
    }
}

impl ParamType for Option<Ipv4Addr> {
    fn to_param(&self) -> ParamValue {
        ParamValue::String(self.map(|ip| ip.to_string()).unwrap_or_default())
    }

    fn from_param(value: ParamValue) -> Result<Self, String> {
        match value {
            ParamValue::String(s) if s.is_empty() => Ok(None),
            ParamValue::String(s) => s
                .parse()
                .map(Some)
                .map_err(|_| format!("'{s}' is not an IPv4 address")),
            other => Err(other.mismatch("IPv4Address")),
        }
    }
}

impl ParamType for Option<MacAddress> {
    fn to_param(&self) -> ParamValue {
        ParamValue::String(self.map(|mac| mac.to_string()).unwrap_or_default())
    }

    fn from_param(value: ParamValue) -> Result<Self, String> {
        match value {
            ParamValue::String(s) if s.is_empty() => Ok(None),
            ParamValue::String(s) => MacAddress::parse(&s).map(Some).map_err(|e| e.to_string()),
            other => Err(other.mismatch("MACAddress")),
        }
    }
}

/// Wires a strum-derived enum into the schema: `ParamType` plus serde
/// impls that use the same wire strings as `Display` / `FromStr`.
macro_rules! wire_enum {
    ($($ty:ty),* $(,)?) => {$(
        impl $crate::schema::ParamType for $ty {
            fn to_param(&self) -> $crate::schema::ParamValue {
                $crate::schema::ParamValue::String(self.to_string())
            }

            fn from_param(value: $crate::schema::ParamValue) -> Result<Self, String> {
                let text = value.to_string();
                text.parse()
                    .map_err(|_| format!("'{text}' is not a valid {}", stringify!($ty)))
            }
        }

        impl ::serde::Serialize for $ty {
            fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $ty {
            fn deserialize<D: ::serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let text = <String as ::serde::Deserialize>::deserialize(deserializer)?;
                text.parse().map_err(|_| {
                    ::serde::de::Error::custom(format!(
                        "'{text}' is not a valid {}",
                        stringify!($ty)
                    ))
                })
            }
        }
    )*};
}

pub(crate) use wire_enum;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_render_as_documented() {
        assert_eq!(ParamValue::DateTime(infinite_time()).to_string(), INFINITE_TIME);
        assert_eq!(ParamValue::DateTime(unknown_time()).to_string(), UNKNOWN_TIME);
    }

    #[test]
    fn boolean_accepts_numeric_forms() {
        assert_eq!(
            ParamValue::parse(ParamKind::Boolean, "1").unwrap(),
            ParamValue::Boolean(true)
        );
        assert!(ParamValue::parse(ParamKind::Boolean, "yes").is_err());
    }

    #[test]
    fn list_text_is_comma_separated() {
        let value = ParamValue::parse(ParamKind::List { max_len: None }, "8.8.8.8, 1.1.1.1,").unwrap();
        assert_eq!(
            value,
            ParamValue::List(vec!["8.8.8.8".into(), "1.1.1.1".into()])
        );
        assert_eq!(value.to_string(), "8.8.8.8,1.1.1.1");
    }

    #[test]
    fn empty_address_is_unset() {
        let ip = <Option<Ipv4Addr>>::from_param(ParamValue::String(String::new())).unwrap();
        assert!(ip.is_none());
        assert!(<Option<Ipv4Addr>>::from_param(ParamValue::String("300.1.1.1".into())).is_err());
    }

    #[test]
    fn negative_sentinel_round_trips() {
        let v = (-1i32).to_param();
        assert_eq!(v.to_string(), "-1");
        assert_eq!(i32::from_param(v).unwrap(), -1);
    }
}
