// ── TR-098 LANHostConfigManagement.DHCPConditionalServingPool ──

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, VariantNames};

use super::common::{Status, VendorClassIdMode};
use super::identity::MacAddress;
use crate::matching::{Criterion, DhcpRequest, MaskedCriterion, Matches};
use crate::schema::value::wire_enum;
use crate::schema::wire::{csv_list, optional_text};
use crate::schema::{
    FieldDescriptor, Gate, INT_MAX, ManagedEntity, ParamKind, UINT_MAX, entity_params,
};
use crate::store::Ordered;

/// How addresses handed out by a conditional pool relate to the WAN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, VariantNames)]
pub enum UseAllocatedWan {
    /// Serve from `MinAddress`..`MaxAddress`.
    #[default]
    Normal,
    /// Serve from the subnet allocated to `AssociatedConnection`.
    UseAllocatedSubnet,
    /// Hand the WAN address itself to the single client `PassthroughMACAddress`.
    Passthrough,
}

wire_enum!(UseAllocatedWan);

/// `InternetGatewayDevice.LANDevice.{i}.LANHostConfigManagement.DHCPConditionalServingPool.{i}.`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DhcpConditionalServingPool {
    #[serde(rename = "Enable")]
    pub enable: bool,
    #[serde(rename = "Status")]
    pub status: Status,
    #[serde(rename = "Alias")]
    pub alias: String,
    #[serde(rename = "PoolOrder")]
    pub pool_order: u32,
    #[serde(rename = "SourceInterface")]
    pub source_interface: String,

    #[serde(rename = "VendorClassID")]
    pub vendor_class_id: String,
    #[serde(rename = "VendorClassIDExclude")]
    pub vendor_class_id_exclude: bool,
    #[serde(rename = "VendorClassIDMode")]
    pub vendor_class_id_mode: VendorClassIdMode,
    #[serde(rename = "ClientID")]
    pub client_id: String,
    #[serde(rename = "ClientIDExclude")]
    pub client_id_exclude: bool,
    #[serde(rename = "UserClassID")]
    pub user_class_id: String,
    #[serde(rename = "UserClassIDExclude")]
    pub user_class_id_exclude: bool,
    #[serde(rename = "Chaddr", with = "optional_text")]
    pub chaddr: Option<MacAddress>,
    #[serde(rename = "ChaddrMask", with = "optional_text")]
    pub chaddr_mask: Option<MacAddress>,
    #[serde(rename = "ChaddrExclude")]
    pub chaddr_exclude: bool,

    #[serde(rename = "LocallyServed")]
    pub locally_served: bool,
    #[serde(rename = "MinAddress", with = "optional_text")]
    pub min_address: Option<Ipv4Addr>,
    #[serde(rename = "MaxAddress", with = "optional_text")]
    pub max_address: Option<Ipv4Addr>,
    #[serde(rename = "ReservedAddresses", with = "csv_list")]
    pub reserved_addresses: Vec<String>,
    #[serde(rename = "SubnetMask", with = "optional_text")]
    pub subnet_mask: Option<Ipv4Addr>,
    #[serde(rename = "DNSServers", with = "csv_list")]
    pub dns_servers: Vec<String>,
    #[serde(rename = "DomainName")]
    pub domain_name: String,
    #[serde(rename = "IPRouters", with = "csv_list")]
    pub ip_routers: Vec<String>,
    #[serde(rename = "DHCPLeaseTime")]
    pub dhcp_lease_time: i32,
    #[serde(rename = "UseAllocatedWAN")]
    pub use_allocated_wan: UseAllocatedWan,
    #[serde(rename = "AssociatedConnection")]
    pub associated_connection: String,
    #[serde(rename = "DHCPServerIPAddress", with = "optional_text")]
    pub dhcp_server_ip_address: Option<Ipv4Addr>,
    /// Seconds.
    #[serde(rename = "PassthroughLease")]
    pub passthrough_lease: u32,
    #[serde(rename = "PassthroughMACAddress", with = "optional_text")]
    pub passthrough_mac_address: Option<MacAddress>,
}

impl Default for DhcpConditionalServingPool {
    fn default() -> Self {
        Self {
            enable: false,
            status: Status::Disabled,
            alias: String::new(),
            pool_order: 1,
            source_interface: String::new(),
            vendor_class_id: String::new(),
            vendor_class_id_exclude: false,
            vendor_class_id_mode: VendorClassIdMode::Exact,
            client_id: String::new(),
            client_id_exclude: false,
            user_class_id: String::new(),
            user_class_id_exclude: false,
            chaddr: None,
            chaddr_mask: None,
            chaddr_exclude: false,
            locally_served: true,
            min_address: None,
            max_address: None,
            reserved_addresses: Vec::new(),
            subnet_mask: None,
            dns_servers: Vec::new(),
            domain_name: String::new(),
            ip_routers: Vec::new(),
            dhcp_lease_time: 86_400,
            use_allocated_wan: UseAllocatedWan::Normal,
            associated_connection: String::new(),
            dhcp_server_ip_address: None,
            passthrough_lease: 600,
            passthrough_mac_address: None,
        }
    }
}

const PASSTHROUGH: &[Gate] = &[Gate::new("UseAllocatedWAN", &["Passthrough"])];
const RELAYED: &[Gate] = &[Gate::new("LocallyServed", &["false"])];

static CONDITIONAL_POOL_PARAMS: &[FieldDescriptor] = &[
    FieldDescriptor::rw("Enable", ParamKind::Boolean),
    FieldDescriptor::ro("Status", ParamKind::Enum(Status::VARIANTS)),
    FieldDescriptor::rw("Alias", ParamKind::string(64)),
    FieldDescriptor::rw("PoolOrder", ParamKind::uint(1, UINT_MAX)),
    FieldDescriptor::rw("SourceInterface", ParamKind::string(1024)),
    FieldDescriptor::rw("VendorClassID", ParamKind::string(255)),
    FieldDescriptor::rw("VendorClassIDExclude", ParamKind::Boolean),
    FieldDescriptor::rw("VendorClassIDMode", ParamKind::Enum(VendorClassIdMode::VARIANTS)),
    FieldDescriptor::rw("ClientID", ParamKind::string(255)),
    FieldDescriptor::rw("ClientIDExclude", ParamKind::Boolean),
    FieldDescriptor::rw("UserClassID", ParamKind::string(255)),
    FieldDescriptor::rw("UserClassIDExclude", ParamKind::Boolean),
    FieldDescriptor::rw("Chaddr", ParamKind::MacAddress),
    FieldDescriptor::rw("ChaddrMask", ParamKind::MacAddress),
    FieldDescriptor::rw("ChaddrExclude", ParamKind::Boolean),
    FieldDescriptor::rw("LocallyServed", ParamKind::Boolean),
    FieldDescriptor::rw("MinAddress", ParamKind::Ipv4Address),
    FieldDescriptor::rw("MaxAddress", ParamKind::Ipv4Address),
    FieldDescriptor::rw("ReservedAddresses", ParamKind::list(256)),
    FieldDescriptor::rw("SubnetMask", ParamKind::Ipv4Address),
    FieldDescriptor::rw("DNSServers", ParamKind::list(64)),
    FieldDescriptor::rw("DomainName", ParamKind::string(64)),
    FieldDescriptor::rw("IPRouters", ParamKind::list(64)),
    FieldDescriptor::rw("DHCPLeaseTime", ParamKind::int(-1, INT_MAX)),
    FieldDescriptor::rw("UseAllocatedWAN", ParamKind::Enum(UseAllocatedWan::VARIANTS)),
    FieldDescriptor::rw("AssociatedConnection", ParamKind::string(256)),
    FieldDescriptor::rw("DHCPServerIPAddress", ParamKind::Ipv4Address).gated(RELAYED),
    FieldDescriptor::rw("PassthroughLease", ParamKind::uint(0, UINT_MAX)).gated(PASSTHROUGH),
    FieldDescriptor::rw("PassthroughMACAddress", ParamKind::MacAddress).gated(PASSTHROUGH),
];

impl ManagedEntity for DhcpConditionalServingPool {
    const OBJECT_NAME: &'static str =
        "InternetGatewayDevice.LANDevice.{i}.LANHostConfigManagement.DHCPConditionalServingPool.{i}.";

    fn descriptors() -> &'static [FieldDescriptor] {
        CONDITIONAL_POOL_PARAMS
    }

    entity_params! {
        "Enable" => enable,
        "Status" => status,
        "Alias" => alias,
        "PoolOrder" => pool_order,
        "SourceInterface" => source_interface,
        "VendorClassID" => vendor_class_id,
        "VendorClassIDExclude" => vendor_class_id_exclude,
        "VendorClassIDMode" => vendor_class_id_mode,
        "ClientID" => client_id,
        "ClientIDExclude" => client_id_exclude,
        "UserClassID" => user_class_id,
        "UserClassIDExclude" => user_class_id_exclude,
        "Chaddr" => chaddr,
        "ChaddrMask" => chaddr_mask,
        "ChaddrExclude" => chaddr_exclude,
        "LocallyServed" => locally_served,
        "MinAddress" => min_address,
        "MaxAddress" => max_address,
        "ReservedAddresses" => reserved_addresses,
        "SubnetMask" => subnet_mask,
        "DNSServers" => dns_servers,
        "DomainName" => domain_name,
        "IPRouters" => ip_routers,
        "DHCPLeaseTime" => dhcp_lease_time,
        "UseAllocatedWAN" => use_allocated_wan,
        "AssociatedConnection" => associated_connection,
        "DHCPServerIPAddress" => dhcp_server_ip_address,
        "PassthroughLease" => passthrough_lease,
        "PassthroughMACAddress" => passthrough_mac_address,
    }

    fn alias(&self) -> Option<&str> {
        Some(&self.alias)
    }

    fn set_alias(&mut self, alias: String) {
        self.alias = alias;
    }
}

impl Ordered for DhcpConditionalServingPool {
    const ORDER_PARAM: &'static str = "PoolOrder";

    fn order(&self) -> u32 {
        self.pool_order
    }

    fn set_order(&mut self, order: u32) {
        self.pool_order = order;
    }
}

impl Matches<DhcpRequest> for DhcpConditionalServingPool {
    fn matches(&self, request: &DhcpRequest) -> bool {
        if !self.enable {
            return false;
        }
        let mode = self.vendor_class_id_mode;
        // SourceInterface may list several interfaces.
        let interface_ok = self.source_interface.is_empty()
            || self
                .source_interface
                .split(',')
                .any(|i| i.trim() == request.interface);
        interface_ok
            && Criterion::text(&self.vendor_class_id, self.vendor_class_id_exclude)
                .matches_with(request.vendor_class_id.as_deref(), |configured, seen| {
                    mode.matches(configured, seen)
                })
            && Criterion::text(&self.client_id, self.client_id_exclude)
                .matches(request.client_id.as_deref())
            && Criterion::text(&self.user_class_id, self.user_class_id_exclude)
                .matches(request.user_class_id.as_deref())
            && MaskedCriterion::new(self.chaddr, self.chaddr_mask, self.chaddr_exclude)
                .matches(Some(request.chaddr))
    }
}
