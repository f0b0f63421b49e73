// ── Core identity types ──
//
// Table rows are identified positionally by an instance number the device
// allocates, and optionally by an alias that survives renumbering.
// MacAddress lives here too: it is the hardware identity that DHCP pools,
// static leases and firewall rules key on.

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::CoreError;

// ── InstanceNumber ──────────────────────────────────────────────────

/// Positional identity of a table row (`Device.Firewall.Chain.{i}`).
///
/// Allocated by the owning table, starting at 1 and never reused within
/// that table, so an instance number never silently points at a new row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceNumber(NonZeroU32);

impl InstanceNumber {
    pub const FIRST: Self = Self(NonZeroU32::MIN);

    pub fn new(n: u32) -> Option<Self> {
        NonZeroU32::new(n).map(Self)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// The instance number allocated after this one.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for InstanceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for InstanceNumber {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<NonZeroU32>().map(Self)
    }
}

// ── Alias ───────────────────────────────────────────────────────────

/// Maximum alias length (TR-069 Alias data type: string(64)).
pub const ALIAS_MAX_LEN: usize = 64;

/// Stable, user-visible name for a table row.
///
/// Must start with a letter and contain only ASCII letters, digits, `-`
/// and `_`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Alias(String);

impl Alias {
    pub fn new(raw: impl Into<String>) -> Result<Self, CoreError> {
        let raw = raw.into();
        if let Some(reason) = alias_problem(&raw) {
            return Err(CoreError::InvalidAlias { alias: raw, reason });
        }
        Ok(Self(raw))
    }

    /// Alias the device assigns to a row created without one.
    pub fn device_assigned(prefix: &str, instance: InstanceNumber) -> Result<Self, CoreError> {
        Self::new(format!("{prefix}{instance}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn alias_problem(raw: &str) -> Option<String> {
    let Some(first) = raw.chars().next() else {
        return Some("must not be empty".into());
    };
    if raw.len() > ALIAS_MAX_LEN {
        return Some(format!("longer than {ALIAS_MAX_LEN} characters"));
    }
    if !first.is_ascii_alphabetic() {
        return Some("must start with a letter".into());
    }
    if let Some(bad) = raw
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        return Some(format!("contains '{bad}'"));
    }
    None
}

impl TryFrom<String> for Alias {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Alias> for String {
    fn from(alias: Alias) -> Self {
        alias.0
    }
}

impl fmt::Display for Alias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── MacAddress ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid MAC address '{0}'")]
pub struct MacAddressError(pub String);

/// MAC address, rendered in lowercase colon-separated form (aa:bb:cc:dd:ee:ff).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    /// All-ones mask: compare every bit.
    pub const FULL_MASK: Self = Self([0xff; 6]);

    pub const fn from_octets(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    /// Parse any common format: colon-separated, dash-separated, or bare hex.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, MacAddressError> {
        let raw = raw.as_ref();
        let hex: String = raw
            .chars()
            .filter(|c| !matches!(c, ':' | '-'))
            .collect();
        if hex.len() != 12 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(MacAddressError(raw.to_owned()));
        }
        let mut octets = [0u8; 6];
        for (i, octet) in octets.iter_mut().enumerate() {
            let pair = hex.get(i * 2..i * 2 + 2).ok_or_else(|| MacAddressError(raw.to_owned()))?;
            *octet = u8::from_str_radix(pair, 16).map_err(|_| MacAddressError(raw.to_owned()))?;
        }
        Ok(Self(octets))
    }

    pub fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// True when both addresses agree on every bit set in `mask`.
    pub fn matches_masked(&self, other: &Self, mask: &Self) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .zip(mask.0.iter())
            .all(|((a, b), m)| a & m == b & m)
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl FromStr for MacAddress {
    type Err = MacAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MacAddress {
    type Error = MacAddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<MacAddress> for String {
    fn from(mac: MacAddress) -> Self {
        mac.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn instance_number_rejects_zero() {
        assert!(InstanceNumber::new(0).is_none());
        assert_eq!(InstanceNumber::FIRST.next().get(), 2);
    }

    #[test]
    fn instance_number_from_str() {
        let n: InstanceNumber = "7".parse().unwrap();
        assert_eq!(n.get(), 7);
        assert!("0".parse::<InstanceNumber>().is_err());
    }

    #[test]
    fn alias_rules() {
        assert!(Alias::new("wan-rule_1").is_ok());
        assert!(Alias::new("").is_err());
        assert!(Alias::new("1st").is_err());
        assert!(Alias::new("has space").is_err());
        assert!(Alias::new("a".repeat(65)).is_err());
    }

    #[test]
    fn device_assigned_alias_uses_prefix() {
        let alias = Alias::device_assigned("cpe-", InstanceNumber::new(3).unwrap()).unwrap();
        assert_eq!(alias.as_str(), "cpe-3");
    }

    #[test]
    fn mac_address_normalizes_dashes() {
        let mac = MacAddress::parse("AA-BB-CC-DD-EE-FF").unwrap();
        assert_eq!(mac.to_string(), "aa:bb:cc:dd:ee:ff");
    }

    #[test]
    fn mac_address_accepts_bare_hex() {
        let mac: MacAddress = "0011223344AA".parse().unwrap();
        assert_eq!(mac.to_string(), "00:11:22:33:44:aa");
    }

    #[test]
    fn mac_address_rejects_garbage() {
        assert!(MacAddress::parse("00:11:22").is_err());
        assert!(MacAddress::parse("zz:11:22:33:44:55").is_err());
    }

    #[test]
    fn masked_match_ignores_unmasked_bits() {
        let a = MacAddress::parse("00:11:22:33:44:55").unwrap();
        let b = MacAddress::parse("00:11:22:99:99:99").unwrap();
        let oui = MacAddress::parse("ff:ff:ff:00:00:00").unwrap();
        assert!(a.matches_masked(&b, &oui));
        assert!(!a.matches_masked(&b, &MacAddress::FULL_MASK));
    }
}
