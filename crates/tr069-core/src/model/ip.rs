// ── TR-181 Device.IP.Interface ──

use std::net::Ipv4Addr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, VariantNames};

use super::common::Status;
use crate::schema::value::wire_enum;
use crate::schema::wire::optional_text;
use crate::schema::{
    FieldDescriptor, Gate, ManagedEntity, NotifyPolicy, ParamKind, entity_params, infinite_time,
    unknown_time,
};
use crate::store::{Expiring, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, VariantNames)]
pub enum InterfaceType {
    #[default]
    Normal,
    Loopback,
    Tunnel,
    Tunneled,
}

/// How an IPv4 address row came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, VariantNames)]
pub enum AddressingType {
    #[strum(serialize = "DHCP")]
    Dhcp,
    #[strum(serialize = "AutoIP")]
    AutoIp,
    #[strum(serialize = "IPCP")]
    Ipcp,
    #[default]
    Static,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, VariantNames)]
pub enum PrefixStatus {
    Preferred,
    Deprecated,
    Invalid,
    Inaccessible,
    #[default]
    Unknown,
}

/// How an IPv6 prefix row came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, VariantNames)]
pub enum PrefixOrigin {
    AutoConfigured,
    PrefixDelegation,
    RouterAdvertisement,
    WellKnown,
    #[default]
    Static,
}

/// Where a static prefix gets its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, VariantNames)]
pub enum StaticType {
    /// Configured directly in `Prefix`.
    #[default]
    Static,
    Inapplicable,
    PrefixDelegation,
    /// Derived from `ParentPrefix` and `ChildPrefixBits`.
    Child,
}

wire_enum!(InterfaceType, AddressingType, PrefixStatus, PrefixOrigin, StaticType);

// ── Interface ───────────────────────────────────────────────────────

/// `Device.IP.Interface.{i}.`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpInterface {
    #[serde(rename = "Enable")]
    pub enable: bool,
    #[serde(rename = "IPv4Enable")]
    pub ipv4_enable: bool,
    #[serde(rename = "IPv6Enable")]
    pub ipv6_enable: bool,
    #[serde(rename = "Status")]
    pub status: Status,
    #[serde(rename = "Alias")]
    pub alias: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "LowerLayers")]
    pub lower_layers: String,
    #[serde(rename = "Type")]
    pub interface_type: InterfaceType,
    #[serde(rename = "Loopback")]
    pub loopback: bool,
    #[serde(rename = "MaxMTUSize")]
    pub max_mtu_size: u32,

    #[serde(rename = "IPv4Address")]
    pub ipv4_addresses: Table<Ipv4AddressEntry>,
    #[serde(rename = "IPv6Prefix")]
    pub ipv6_prefixes: Table<Ipv6Prefix>,
}

impl Default for IpInterface {
    fn default() -> Self {
        Self {
            enable: false,
            ipv4_enable: true,
            ipv6_enable: true,
            status: Status::Disabled,
            alias: String::new(),
            name: String::new(),
            lower_layers: String::new(),
            interface_type: InterfaceType::Normal,
            loopback: false,
            max_mtu_size: 1500,
            ipv4_addresses: Table::new(),
            ipv6_prefixes: Table::new(),
        }
    }
}

static INTERFACE_PARAMS: &[FieldDescriptor] = &[
    FieldDescriptor::rw("Enable", ParamKind::Boolean),
    FieldDescriptor::rw("IPv4Enable", ParamKind::Boolean),
    FieldDescriptor::rw("IPv6Enable", ParamKind::Boolean),
    FieldDescriptor::ro("Status", ParamKind::Enum(Status::VARIANTS))
        .notify(NotifyPolicy::ForceDefaultEnabled),
    FieldDescriptor::rw("Alias", ParamKind::string(64)),
    FieldDescriptor::ro("Name", ParamKind::string(64)),
    FieldDescriptor::rw("LowerLayers", ParamKind::string(1024)),
    FieldDescriptor::ro("Type", ParamKind::Enum(InterfaceType::VARIANTS)),
    FieldDescriptor::rw("Loopback", ParamKind::Boolean),
    FieldDescriptor::rw("MaxMTUSize", ParamKind::uint(64, 65535)),
];

impl ManagedEntity for IpInterface {
    const OBJECT_NAME: &'static str = "Device.IP.Interface.{i}.";

    fn descriptors() -> &'static [FieldDescriptor] {
        INTERFACE_PARAMS
    }

    entity_params! {
        "Enable" => enable,
        "IPv4Enable" => ipv4_enable,
        "IPv6Enable" => ipv6_enable,
        "Status" => status,
        "Alias" => alias,
        "Name" => name,
        "LowerLayers" => lower_layers,
        "Type" => interface_type,
        "Loopback" => loopback,
        "MaxMTUSize" => max_mtu_size,
    }

    fn alias(&self) -> Option<&str> {
        Some(&self.alias)
    }

    fn set_alias(&mut self, alias: String) {
        self.alias = alias;
    }
}

// ── IPv4 addresses ──────────────────────────────────────────────────

/// `Device.IP.Interface.{i}.IPv4Address.{i}.`
///
/// Address and mask are controller-writable only on static rows; rows
/// learned through DHCP, AutoIP or IPCP are maintained by the device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ipv4AddressEntry {
    #[serde(rename = "Enable")]
    pub enable: bool,
    #[serde(rename = "Status")]
    pub status: Status,
    #[serde(rename = "Alias")]
    pub alias: String,
    #[serde(rename = "IPAddress", with = "optional_text")]
    pub ip_address: Option<Ipv4Addr>,
    #[serde(rename = "SubnetMask", with = "optional_text")]
    pub subnet_mask: Option<Ipv4Addr>,
    #[serde(rename = "AddressingType")]
    pub addressing_type: AddressingType,
}

const STATIC_ADDRESSING: &[Gate] = &[Gate::new("AddressingType", &["Static"])];

static IPV4_ADDRESS_PARAMS: &[FieldDescriptor] = &[
    FieldDescriptor::rw("Enable", ParamKind::Boolean),
    FieldDescriptor::ro("Status", ParamKind::Enum(Status::VARIANTS)),
    FieldDescriptor::rw("Alias", ParamKind::string(64)),
    FieldDescriptor::rw("IPAddress", ParamKind::Ipv4Address).gated(STATIC_ADDRESSING),
    FieldDescriptor::rw("SubnetMask", ParamKind::Ipv4Address).gated(STATIC_ADDRESSING),
    FieldDescriptor::ro("AddressingType", ParamKind::Enum(AddressingType::VARIANTS)),
];

impl ManagedEntity for Ipv4AddressEntry {
    const OBJECT_NAME: &'static str = "Device.IP.Interface.{i}.IPv4Address.{i}.";

    fn descriptors() -> &'static [FieldDescriptor] {
        IPV4_ADDRESS_PARAMS
    }

    entity_params! {
        "Enable" => enable,
        "Status" => status,
        "Alias" => alias,
        "IPAddress" => ip_address,
        "SubnetMask" => subnet_mask,
        "AddressingType" => addressing_type,
    }

    fn alias(&self) -> Option<&str> {
        Some(&self.alias)
    }

    fn set_alias(&mut self, alias: String) {
        self.alias = alias;
    }
}

// ── IPv6 prefixes ───────────────────────────────────────────────────

/// `Device.IP.Interface.{i}.IPv6Prefix.{i}.`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ipv6Prefix {
    #[serde(rename = "Enable")]
    pub enable: bool,
    #[serde(rename = "Status")]
    pub status: Status,
    #[serde(rename = "PrefixStatus")]
    pub prefix_status: PrefixStatus,
    #[serde(rename = "Alias")]
    pub alias: String,
    /// `prefix/length`; empty when unknown.
    #[serde(rename = "Prefix")]
    pub prefix: String,
    #[serde(rename = "Origin")]
    pub origin: PrefixOrigin,
    #[serde(rename = "StaticType")]
    pub static_type: StaticType,
    #[serde(rename = "ParentPrefix")]
    pub parent_prefix: String,
    #[serde(rename = "ChildPrefixBits")]
    pub child_prefix_bits: String,
    #[serde(rename = "OnLink")]
    pub on_link: bool,
    #[serde(rename = "Autonomous")]
    pub autonomous: bool,
    #[serde(rename = "PreferredLifetime")]
    pub preferred_lifetime: DateTime<Utc>,
    #[serde(rename = "ValidLifetime")]
    pub valid_lifetime: DateTime<Utc>,
}

impl Default for Ipv6Prefix {
    fn default() -> Self {
        Self {
            enable: false,
            status: Status::Disabled,
            prefix_status: PrefixStatus::Unknown,
            alias: String::new(),
            prefix: String::new(),
            origin: PrefixOrigin::Static,
            static_type: StaticType::Static,
            parent_prefix: String::new(),
            child_prefix_bits: String::new(),
            on_link: false,
            autonomous: false,
            preferred_lifetime: unknown_time(),
            valid_lifetime: unknown_time(),
        }
    }
}

impl Ipv6Prefix {
    /// Device hook for when the prefix referenced by `ParentPrefix` goes
    /// away or becomes invalid: a child prefix loses its value.
    pub fn invalidate_parent(&mut self) {
        if self.static_type == StaticType::Child {
            tracing::debug!(parent = %self.parent_prefix, "parent prefix invalidated");
            self.prefix.clear();
            self.prefix_status = PrefixStatus::Invalid;
        }
    }
}

const STATIC_ORIGIN: Gate = Gate::new("Origin", &["Static"]);
const STATIC_PREFIX: &[Gate] = &[STATIC_ORIGIN, Gate::new("StaticType", &["Static"])];
const CHILD_PREFIX: &[Gate] = &[STATIC_ORIGIN, Gate::new("StaticType", &["Child"])];
const STATIC_ROW: &[Gate] = &[STATIC_ORIGIN];

static IPV6_PREFIX_PARAMS: &[FieldDescriptor] = &[
    FieldDescriptor::rw("Enable", ParamKind::Boolean),
    FieldDescriptor::ro("Status", ParamKind::Enum(Status::VARIANTS)),
    FieldDescriptor::ro("PrefixStatus", ParamKind::Enum(PrefixStatus::VARIANTS))
        .notify(NotifyPolicy::ForceEnabled),
    FieldDescriptor::rw("Alias", ParamKind::string(64)),
    FieldDescriptor::rw("Prefix", ParamKind::string(49)).gated(STATIC_PREFIX),
    FieldDescriptor::ro("Origin", ParamKind::Enum(PrefixOrigin::VARIANTS)),
    FieldDescriptor::rw("StaticType", ParamKind::Enum(StaticType::VARIANTS)).gated(STATIC_ROW),
    FieldDescriptor::rw("ParentPrefix", ParamKind::string(256)).gated(CHILD_PREFIX),
    FieldDescriptor::rw("ChildPrefixBits", ParamKind::string(49)).gated(CHILD_PREFIX),
    FieldDescriptor::rw("OnLink", ParamKind::Boolean).gated(STATIC_ROW),
    FieldDescriptor::rw("Autonomous", ParamKind::Boolean).gated(STATIC_ROW),
    FieldDescriptor::rw("PreferredLifetime", ParamKind::DateTime)
        .gated(STATIC_ROW)
        .notify(NotifyPolicy::CanDeny),
    FieldDescriptor::rw("ValidLifetime", ParamKind::DateTime)
        .gated(STATIC_ROW)
        .notify(NotifyPolicy::CanDeny),
];

impl ManagedEntity for Ipv6Prefix {
    const OBJECT_NAME: &'static str = "Device.IP.Interface.{i}.IPv6Prefix.{i}.";

    fn descriptors() -> &'static [FieldDescriptor] {
        IPV6_PREFIX_PARAMS
    }

    entity_params! {
        "Enable" => enable,
        "Status" => status,
        "PrefixStatus" => prefix_status,
        "Alias" => alias,
        "Prefix" => prefix,
        "Origin" => origin,
        "StaticType" => static_type,
        "ParentPrefix" => parent_prefix,
        "ChildPrefixBits" => child_prefix_bits,
        "OnLink" => on_link,
        "Autonomous" => autonomous,
        "PreferredLifetime" => preferred_lifetime,
        "ValidLifetime" => valid_lifetime,
    }

    fn alias(&self) -> Option<&str> {
        Some(&self.alias)
    }

    fn set_alias(&mut self, alias: String) {
        self.alias = alias;
    }
}

impl Expiring for Ipv6Prefix {
    fn expires_at(&self) -> Option<DateTime<Utc>> {
        let lifetime = self.valid_lifetime;
        (lifetime != unknown_time() && lifetime != infinite_time()).then_some(lifetime)
    }
}
