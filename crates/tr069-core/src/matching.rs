// ── Match criteria ──
//
// Classification rows (DHCP pools, firewall rules) express each criterion
// as a value plus an `...Exclude` flag. A criterion with no value does not
// take part; otherwise it matches on equality (or masked equality), and the
// exclude flag inverts the result. A row matches when all its criteria do.

use std::net::Ipv4Addr;

use crate::model::MacAddress;

/// Value + exclude-flag criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Criterion<T> {
    value: Option<T>,
    exclude: bool,
}

impl<T: PartialEq + Copy> Criterion<T> {
    pub fn new(value: Option<T>, exclude: bool) -> Self {
        Self { value, exclude }
    }

    pub fn is_active(&self) -> bool {
        self.value.is_some()
    }

    pub fn matches(&self, candidate: Option<T>) -> bool {
        self.matches_with(candidate, |configured, seen| configured == seen)
    }

    /// Like [`matches`](Self::matches) with a custom comparison
    /// (`configured`, `candidate`).
    pub fn matches_with(&self, candidate: Option<T>, eq: impl Fn(T, T) -> bool) -> bool {
        match self.value {
            None => true,
            Some(configured) => {
                let hit = candidate.is_some_and(|seen| eq(configured, seen));
                hit != self.exclude
            }
        }
    }
}

impl<'a> Criterion<&'a str> {
    /// Text criterion; the empty string means "not configured".
    pub fn text(value: &'a str, exclude: bool) -> Self {
        Self::new(Some(value).filter(|v| !v.is_empty()), exclude)
    }
}

impl Criterion<i32> {
    /// Numeric criterion; `-1` means "not configured".
    pub fn numeric(value: i32, exclude: bool) -> Self {
        Self::new(Some(value).filter(|v| *v != -1), exclude)
    }
}

// ── Masked criteria ─────────────────────────────────────────────────

/// Values comparable under a bit mask.
pub trait Maskable: Copy {
    /// Mask that compares every bit, used when no mask is configured.
    const FULL_MASK: Self;

    fn eq_masked(&self, other: &Self, mask: &Self) -> bool;
}

impl Maskable for Ipv4Addr {
    const FULL_MASK: Self = Ipv4Addr::BROADCAST;

    fn eq_masked(&self, other: &Self, mask: &Self) -> bool {
        let mask = u32::from(*mask);
        u32::from(*self) & mask == u32::from(*other) & mask
    }
}

impl Maskable for MacAddress {
    const FULL_MASK: Self = MacAddress::FULL_MASK;

    fn eq_masked(&self, other: &Self, mask: &Self) -> bool {
        self.matches_masked(other, mask)
    }
}

/// Address + mask + exclude-flag criterion (`SourceIP`/`SourceMask`,
/// `Chaddr`/`ChaddrMask`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskedCriterion<T> {
    value: Option<T>,
    mask: T,
    exclude: bool,
}

impl<T: Maskable> MaskedCriterion<T> {
    pub fn new(value: Option<T>, mask: Option<T>, exclude: bool) -> Self {
        Self {
            value,
            mask: mask.unwrap_or(T::FULL_MASK),
            exclude,
        }
    }

    pub fn is_active(&self) -> bool {
        self.value.is_some()
    }

    pub fn matches(&self, candidate: Option<T>) -> bool {
        match self.value {
            None => true,
            Some(configured) => {
                let hit = candidate.is_some_and(|seen| configured.eq_masked(&seen, &self.mask));
                hit != self.exclude
            }
        }
    }
}

/// Port or port-range criterion (`DestPort` / `DestPortRangeMax` /
/// `DestPortExclude`). `-1` disables the port; a range max of `-1` means a
/// single port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortCriterion {
    port: i32,
    range_max: i32,
    exclude: bool,
}

impl PortCriterion {
    pub fn new(port: i32, range_max: i32, exclude: bool) -> Self {
        Self {
            port,
            range_max,
            exclude,
        }
    }

    pub fn is_active(&self) -> bool {
        self.port != -1
    }

    pub fn matches(&self, candidate: Option<u16>) -> bool {
        if !self.is_active() {
            return true;
        }
        let upper = if self.range_max == -1 {
            self.port
        } else {
            self.range_max
        };
        let hit = candidate.is_some_and(|p| (self.port..=upper).contains(&i32::from(p)));
        hit != self.exclude
    }
}

// ── Candidates ──────────────────────────────────────────────────────

/// A row that can classify candidates of type `C`.
pub trait Matches<C> {
    fn matches(&self, candidate: &C) -> bool;
}

/// The classification-relevant parts of a DHCP DISCOVER/REQUEST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DhcpRequest {
    /// Path of the interface the request arrived on.
    pub interface: String,
    /// Option 60.
    pub vendor_class_id: Option<String>,
    /// Option 61.
    pub client_id: Option<String>,
    /// Option 77.
    pub user_class_id: Option<String>,
    pub chaddr: MacAddress,
}

/// The classification-relevant parts of an IPv4 packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketInfo {
    /// Path of the ingress interface.
    pub source_interface: Option<String>,
    pub source_ip: Ipv4Addr,
    pub dest_ip: Ipv4Addr,
    /// IP protocol number.
    pub protocol: u8,
    pub source_port: Option<u16>,
    pub dest_port: Option<u16>,
    pub dscp: u8,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn unset_value_matches_regardless_of_exclude() {
        assert!(Criterion::text("", false).matches(Some("anything")));
        assert!(Criterion::text("", true).matches(Some("anything")));
        assert!(Criterion::text("", true).matches(None));
    }

    #[test]
    fn exclude_inverts_equality() {
        let include = Criterion::text("X", false);
        let exclude = Criterion::text("X", true);
        assert!(include.matches(Some("X")));
        assert!(!exclude.matches(Some("X")));
        assert!(!include.matches(Some("Y")));
        assert!(exclude.matches(Some("Y")));
    }

    #[test]
    fn missing_candidate_only_matches_excluded() {
        assert!(!Criterion::text("X", false).matches(None));
        assert!(Criterion::text("X", true).matches(None));
    }

    #[test]
    fn numeric_sentinel_disables_criterion() {
        let any = Criterion::numeric(-1, true);
        assert!(!any.is_active());
        assert!(any.matches(Some(6)));
        assert!(Criterion::numeric(6, false).matches(Some(6)));
    }

    #[test]
    fn ipv4_mask_widens_match() {
        let subnet = MaskedCriterion::new(
            Some(Ipv4Addr::new(192, 168, 1, 0)),
            Some(Ipv4Addr::new(255, 255, 255, 0)),
            false,
        );
        assert!(subnet.matches(Some(Ipv4Addr::new(192, 168, 1, 77))));
        assert!(!subnet.matches(Some(Ipv4Addr::new(192, 168, 2, 1))));
    }

    #[test]
    fn missing_mask_means_exact_match() {
        let host = MaskedCriterion::new(Some(Ipv4Addr::new(10, 0, 0, 1)), None, false);
        assert!(host.matches(Some(Ipv4Addr::new(10, 0, 0, 1))));
        assert!(!host.matches(Some(Ipv4Addr::new(10, 0, 0, 2))));
    }

    #[test]
    fn mac_oui_match_with_exclude() {
        let not_vendor = MaskedCriterion::new(
            Some(MacAddress::parse("00:11:22:00:00:00").unwrap()),
            Some(MacAddress::parse("ff:ff:ff:00:00:00").unwrap()),
            true,
        );
        assert!(!not_vendor.matches(Some(MacAddress::parse("00:11:22:aa:bb:cc").unwrap())));
        assert!(not_vendor.matches(Some(MacAddress::parse("00:11:23:aa:bb:cc").unwrap())));
    }

    #[test]
    fn port_ranges() {
        assert!(PortCriterion::new(-1, -1, false).matches(None));
        assert!(PortCriterion::new(80, -1, false).matches(Some(80)));
        assert!(!PortCriterion::new(80, -1, false).matches(Some(81)));
        assert!(PortCriterion::new(8000, 8080, false).matches(Some(8042)));
        assert!(!PortCriterion::new(8000, 8080, true).matches(Some(8042)));
    }
}
