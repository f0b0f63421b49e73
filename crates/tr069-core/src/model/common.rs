// ── Common types shared across the object model ──

use strum::{Display, EnumString, VariantNames};

use crate::schema::value::wire_enum;

/// Operational status of an enableable row (`Status` parameters).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, VariantNames)]
pub enum Status {
    #[default]
    Disabled,
    Enabled,
    /// The row is enabled but its configuration cannot be applied.
    #[strum(serialize = "Error_Misconfigured")]
    ErrorMisconfigured,
    Error,
}

wire_enum!(Status);

/// Value-matching mode of `VendorClassID` criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, VariantNames)]
pub enum VendorClassIdMode {
    #[default]
    Exact,
    Prefix,
    Suffix,
    Substring,
}

wire_enum!(VendorClassIdMode);

impl VendorClassIdMode {
    /// Compare a configured vendor class against the one a client sent.
    pub fn matches(self, configured: &str, seen: &str) -> bool {
        match self {
            Self::Exact => seen == configured,
            Self::Prefix => seen.starts_with(configured),
            Self::Suffix => seen.ends_with(configured),
            Self::Substring => seen.contains(configured),
        }
    }
}
