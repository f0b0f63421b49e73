// ── TR-181 Device.Firewall ──

use std::net::Ipv4Addr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, VariantNames};

use super::common::Status;
use crate::matching::{Criterion, MaskedCriterion, Matches, PacketInfo, PortCriterion};
use crate::schema::value::wire_enum;
use crate::schema::wire::optional_text;
use crate::schema::{
    FieldDescriptor, Gate, ManagedEntity, NotifyPolicy, ParamKind, UINT_MAX, entity_params, infinite_time,
    unknown_time,
};
use crate::store::{Expiring, Ordered, PrecedenceTable, Table};

/// Firewall protection level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, VariantNames)]
pub enum FirewallLevel {
    High,
    #[default]
    Low,
    Off,
    /// Rules come from the `Chain` table.
    Advanced,
}

/// Who created a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, VariantNames)]
pub enum ChainCreator {
    Defaults,
    PortMapping,
    #[strum(serialize = "WANIPv6FirewallControl")]
    WanIpv6FirewallControl,
    #[default]
    #[strum(serialize = "ACS")]
    Acs,
    UserInterface,
    Other,
}

/// What a matching rule does with the packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, VariantNames)]
pub enum RuleTarget {
    #[default]
    Drop,
    Accept,
    Reject,
    Return,
    /// Continue in the chain named by `TargetChain`.
    TargetChain,
}

wire_enum!(FirewallLevel, ChainCreator, RuleTarget);

// ── Firewall ────────────────────────────────────────────────────────

/// `Device.Firewall.`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Firewall {
    #[serde(rename = "Enable")]
    pub enable: bool,
    #[serde(rename = "Config")]
    pub config: FirewallLevel,
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(rename = "LastChange")]
    pub last_change: DateTime<Utc>,
    #[serde(rename = "Chain")]
    pub chains: Table<Chain>,
}

impl Default for Firewall {
    fn default() -> Self {
        Self {
            enable: false,
            config: FirewallLevel::Low,
            version: String::new(),
            last_change: unknown_time(),
            chains: Table::new(),
        }
    }
}

static FIREWALL_PARAMS: &[FieldDescriptor] = &[
    FieldDescriptor::rw("Enable", ParamKind::Boolean),
    FieldDescriptor::rw("Config", ParamKind::Enum(FirewallLevel::VARIANTS)),
    FieldDescriptor::ro("Version", ParamKind::string(16)),
    FieldDescriptor::ro("LastChange", ParamKind::DateTime),
];

impl ManagedEntity for Firewall {
    const OBJECT_NAME: &'static str = "Device.Firewall.";

    fn descriptors() -> &'static [FieldDescriptor] {
        FIREWALL_PARAMS
    }

    entity_params! {
        "Enable" => enable,
        "Config" => config,
        "Version" => version,
        "LastChange" => last_change,
    }
}

// ── Chain ───────────────────────────────────────────────────────────

/// `Device.Firewall.Chain.{i}.`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Chain {
    #[serde(rename = "Enable")]
    pub enable: bool,
    #[serde(rename = "Alias")]
    pub alias: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Creator")]
    pub creator: ChainCreator,
    #[serde(rename = "Rule")]
    pub rules: PrecedenceTable<FirewallRule>,
}

impl Default for Chain {
    fn default() -> Self {
        Self {
            enable: false,
            alias: String::new(),
            name: String::new(),
            creator: ChainCreator::Acs,
            rules: PrecedenceTable::new(),
        }
    }
}

static CHAIN_PARAMS: &[FieldDescriptor] = &[
    FieldDescriptor::rw("Enable", ParamKind::Boolean),
    FieldDescriptor::rw("Alias", ParamKind::string(64)),
    FieldDescriptor::rw("Name", ParamKind::string(64)),
    FieldDescriptor::ro("Creator", ParamKind::Enum(ChainCreator::VARIANTS)),
];

impl ManagedEntity for Chain {
    const OBJECT_NAME: &'static str = "Device.Firewall.Chain.{i}.";

    fn descriptors() -> &'static [FieldDescriptor] {
        CHAIN_PARAMS
    }

    entity_params! {
        "Enable" => enable,
        "Alias" => alias,
        "Name" => name,
        "Creator" => creator,
    }

    fn alias(&self) -> Option<&str> {
        Some(&self.alias)
    }

    fn set_alias(&mut self, alias: String) {
        self.alias = alias;
    }
}

// ── Rule ────────────────────────────────────────────────────────────

/// `Device.Firewall.Chain.{i}.Rule.{i}.`
///
/// Integer criteria use `-1` for "not configured"; address criteria use an
/// empty value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirewallRule {
    #[serde(rename = "Enable")]
    pub enable: bool,
    #[serde(rename = "Status")]
    pub status: Status,
    #[serde(rename = "Order")]
    pub order: u32,
    #[serde(rename = "Alias")]
    pub alias: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Target")]
    pub target: RuleTarget,
    #[serde(rename = "TargetChain")]
    pub target_chain: String,
    #[serde(rename = "Log")]
    pub log: bool,
    #[serde(rename = "CreationDate")]
    pub creation_date: DateTime<Utc>,
    #[serde(rename = "ExpiryDate")]
    pub expiry_date: DateTime<Utc>,

    #[serde(rename = "SourceInterface")]
    pub source_interface: String,
    #[serde(rename = "SourceInterfaceExclude")]
    pub source_interface_exclude: bool,

    #[serde(rename = "DestIP", with = "optional_text")]
    pub dest_ip: Option<Ipv4Addr>,
    #[serde(rename = "DestMask", with = "optional_text")]
    pub dest_mask: Option<Ipv4Addr>,
    #[serde(rename = "DestIPExclude")]
    pub dest_ip_exclude: bool,
    #[serde(rename = "SourceIP", with = "optional_text")]
    pub source_ip: Option<Ipv4Addr>,
    #[serde(rename = "SourceMask", with = "optional_text")]
    pub source_mask: Option<Ipv4Addr>,
    #[serde(rename = "SourceIPExclude")]
    pub source_ip_exclude: bool,

    #[serde(rename = "Protocol")]
    pub protocol: i32,
    #[serde(rename = "ProtocolExclude")]
    pub protocol_exclude: bool,
    #[serde(rename = "DestPort")]
    pub dest_port: i32,
    #[serde(rename = "DestPortRangeMax")]
    pub dest_port_range_max: i32,
    #[serde(rename = "DestPortExclude")]
    pub dest_port_exclude: bool,
    #[serde(rename = "SourcePort")]
    pub source_port: i32,
    #[serde(rename = "SourcePortRangeMax")]
    pub source_port_range_max: i32,
    #[serde(rename = "SourcePortExclude")]
    pub source_port_exclude: bool,
    #[serde(rename = "DSCP")]
    pub dscp: i32,
    #[serde(rename = "DSCPExclude")]
    pub dscp_exclude: bool,
    #[serde(rename = "IPVersion")]
    pub ip_version: i32,
}

impl Default for FirewallRule {
    fn default() -> Self {
        Self {
            enable: false,
            status: Status::Disabled,
            order: 1,
            alias: String::new(),
            description: String::new(),
            target: RuleTarget::Drop,
            target_chain: String::new(),
            log: false,
            creation_date: unknown_time(),
            expiry_date: infinite_time(),
            source_interface: String::new(),
            source_interface_exclude: false,
            dest_ip: None,
            dest_mask: None,
            dest_ip_exclude: false,
            source_ip: None,
            source_mask: None,
            source_ip_exclude: false,
            protocol: -1,
            protocol_exclude: false,
            dest_port: -1,
            dest_port_range_max: -1,
            dest_port_exclude: false,
            source_port: -1,
            source_port_range_max: -1,
            source_port_exclude: false,
            dscp: -1,
            dscp_exclude: false,
            ip_version: -1,
        }
    }
}

const TARGET_CHAIN: &[Gate] = &[Gate::new("Target", &["TargetChain"])];

static RULE_PARAMS: &[FieldDescriptor] = &[
    FieldDescriptor::rw("Enable", ParamKind::Boolean),
    FieldDescriptor::ro("Status", ParamKind::Enum(Status::VARIANTS))
        .notify(NotifyPolicy::ForceDefaultEnabled),
    FieldDescriptor::rw("Order", ParamKind::uint(1, UINT_MAX)),
    FieldDescriptor::rw("Alias", ParamKind::string(64)),
    FieldDescriptor::rw("Description", ParamKind::string(256)),
    FieldDescriptor::rw("Target", ParamKind::Enum(RuleTarget::VARIANTS)),
    FieldDescriptor::rw("TargetChain", ParamKind::string(256)).gated(TARGET_CHAIN),
    FieldDescriptor::rw("Log", ParamKind::Boolean),
    FieldDescriptor::ro("CreationDate", ParamKind::DateTime),
    FieldDescriptor::rw("ExpiryDate", ParamKind::DateTime),
    FieldDescriptor::rw("SourceInterface", ParamKind::string(256)),
    FieldDescriptor::rw("SourceInterfaceExclude", ParamKind::Boolean),
    FieldDescriptor::rw("DestIP", ParamKind::Ipv4Address),
    FieldDescriptor::rw("DestMask", ParamKind::Ipv4Address),
    FieldDescriptor::rw("DestIPExclude", ParamKind::Boolean),
    FieldDescriptor::rw("SourceIP", ParamKind::Ipv4Address),
    FieldDescriptor::rw("SourceMask", ParamKind::Ipv4Address),
    FieldDescriptor::rw("SourceIPExclude", ParamKind::Boolean),
    FieldDescriptor::rw("Protocol", ParamKind::int(-1, 255)),
    FieldDescriptor::rw("ProtocolExclude", ParamKind::Boolean),
    FieldDescriptor::rw("DestPort", ParamKind::int(-1, 65535)),
    FieldDescriptor::rw("DestPortRangeMax", ParamKind::int(-1, 65535)),
    FieldDescriptor::rw("DestPortExclude", ParamKind::Boolean),
    FieldDescriptor::rw("SourcePort", ParamKind::int(-1, 65535)),
    FieldDescriptor::rw("SourcePortRangeMax", ParamKind::int(-1, 65535)),
    FieldDescriptor::rw("SourcePortExclude", ParamKind::Boolean),
    FieldDescriptor::rw("DSCP", ParamKind::int(-1, 63)),
    FieldDescriptor::rw("DSCPExclude", ParamKind::Boolean),
    FieldDescriptor::rw("IPVersion", ParamKind::int(-1, 15)),
];

impl ManagedEntity for FirewallRule {
    const OBJECT_NAME: &'static str = "Device.Firewall.Chain.{i}.Rule.{i}.";

    fn descriptors() -> &'static [FieldDescriptor] {
        RULE_PARAMS
    }

    entity_params! {
        "Enable" => enable,
        "Status" => status,
        "Order" => order,
        "Alias" => alias,
        "Description" => description,
        "Target" => target,
        "TargetChain" => target_chain,
        "Log" => log,
        "CreationDate" => creation_date,
        "ExpiryDate" => expiry_date,
        "SourceInterface" => source_interface,
        "SourceInterfaceExclude" => source_interface_exclude,
        "DestIP" => dest_ip,
        "DestMask" => dest_mask,
        "DestIPExclude" => dest_ip_exclude,
        "SourceIP" => source_ip,
        "SourceMask" => source_mask,
        "SourceIPExclude" => source_ip_exclude,
        "Protocol" => protocol,
        "ProtocolExclude" => protocol_exclude,
        "DestPort" => dest_port,
        "DestPortRangeMax" => dest_port_range_max,
        "DestPortExclude" => dest_port_exclude,
        "SourcePort" => source_port,
        "SourcePortRangeMax" => source_port_range_max,
        "SourcePortExclude" => source_port_exclude,
        "DSCP" => dscp,
        "DSCPExclude" => dscp_exclude,
        "IPVersion" => ip_version,
    }

    fn alias(&self) -> Option<&str> {
        Some(&self.alias)
    }

    fn set_alias(&mut self, alias: String) {
        self.alias = alias;
    }
}

impl Ordered for FirewallRule {
    const ORDER_PARAM: &'static str = "Order";

    fn order(&self) -> u32 {
        self.order
    }

    fn set_order(&mut self, order: u32) {
        self.order = order;
    }
}

impl Expiring for FirewallRule {
    fn expires_at(&self) -> Option<DateTime<Utc>> {
        (self.expiry_date != infinite_time()).then_some(self.expiry_date)
    }
}

impl Matches<PacketInfo> for FirewallRule {
    fn matches(&self, packet: &PacketInfo) -> bool {
        if !self.enable {
            return false;
        }
        if self.ip_version != -1 && self.ip_version != 4 {
            return false;
        }
        Criterion::text(&self.source_interface, self.source_interface_exclude)
            .matches(packet.source_interface.as_deref())
            && MaskedCriterion::new(self.dest_ip, self.dest_mask, self.dest_ip_exclude)
                .matches(Some(packet.dest_ip))
            && MaskedCriterion::new(self.source_ip, self.source_mask, self.source_ip_exclude)
                .matches(Some(packet.source_ip))
            && Criterion::numeric(self.protocol, self.protocol_exclude)
                .matches(Some(i32::from(packet.protocol)))
            && PortCriterion::new(self.dest_port, self.dest_port_range_max, self.dest_port_exclude)
                .matches(packet.dest_port)
            && PortCriterion::new(
                self.source_port,
                self.source_port_range_max,
                self.source_port_exclude,
            )
            .matches(packet.source_port)
            && Criterion::numeric(self.dscp, self.dscp_exclude).matches(Some(i32::from(packet.dscp)))
    }
}
