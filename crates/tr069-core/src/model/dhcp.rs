// ── TR-181 Device.DHCPv4.Server ──

use std::net::Ipv4Addr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::VariantNames;

use super::common::{Status, VendorClassIdMode};
use super::identity::MacAddress;
use crate::matching::{Criterion, DhcpRequest, MaskedCriterion, Matches};
use crate::schema::wire::{csv_list, optional_text};
use crate::schema::{
    FieldDescriptor, ManagedEntity, NotifyPolicy, INT_MAX, ParamKind, UINT_MAX, entity_params,
    unknown_time,
};
use crate::store::{Expiring, Ordered, Table};

/// `Device.DHCPv4.Server.Pool.{i}.`
///
/// Classification criteria follow the usual value + `...Exclude` pattern;
/// an empty value leaves the criterion out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DhcpServerPool {
    #[serde(rename = "Enable")]
    pub enable: bool,
    #[serde(rename = "Status")]
    pub status: Status,
    #[serde(rename = "Alias")]
    pub alias: String,
    #[serde(rename = "Order")]
    pub order: u32,
    #[serde(rename = "Interface")]
    pub interface: String,

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
    /// Seconds; `-1` is an infinite lease.
    #[serde(rename = "LeaseTime")]
    pub lease_time: i32,

    #[serde(rename = "StaticAddress")]
    pub static_addresses: Table<StaticAddress>,
    #[serde(rename = "Client")]
    pub clients: Table<DhcpClient>,
}

impl Default for DhcpServerPool {
    fn default() -> Self {
        Self {
            enable: false,
            status: Status::Disabled,
            alias: String::new(),
            order: 1,
            interface: String::new(),
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
            min_address: None,
            max_address: None,
            reserved_addresses: Vec::new(),
            subnet_mask: None,
            dns_servers: Vec::new(),
            domain_name: String::new(),
            ip_routers: Vec::new(),
            lease_time: 86_400,
            static_addresses: Table::new(),
            clients: Table::new(),
        }
    }
}

static POOL_PARAMS: &[FieldDescriptor] = &[
    FieldDescriptor::rw("Enable", ParamKind::Boolean),
    FieldDescriptor::ro("Status", ParamKind::Enum(Status::VARIANTS)),
    FieldDescriptor::rw("Alias", ParamKind::string(64)),
    FieldDescriptor::rw("Order", ParamKind::uint(1, UINT_MAX)),
    FieldDescriptor::rw("Interface", ParamKind::string(256)),
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
    FieldDescriptor::rw("MinAddress", ParamKind::Ipv4Address),
    FieldDescriptor::rw("MaxAddress", ParamKind::Ipv4Address),
    FieldDescriptor::rw("ReservedAddresses", ParamKind::list(512)),
    FieldDescriptor::rw("SubnetMask", ParamKind::Ipv4Address),
    FieldDescriptor::rw("DNSServers", ParamKind::list(64)),
    FieldDescriptor::rw("DomainName", ParamKind::string(64)),
    FieldDescriptor::rw("IPRouters", ParamKind::list(64)),
    FieldDescriptor::rw("LeaseTime", ParamKind::int(-1, INT_MAX)),
];

impl ManagedEntity for DhcpServerPool {
    const OBJECT_NAME: &'static str = "Device.DHCPv4.Server.Pool.{i}.";

    fn descriptors() -> &'static [FieldDescriptor] {
        POOL_PARAMS
    }

    entity_params! {
        "Enable" => enable,
        "Status" => status,
        "Alias" => alias,
        "Order" => order,
        "Interface" => interface,
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
        "MinAddress" => min_address,
        "MaxAddress" => max_address,
        "ReservedAddresses" => reserved_addresses,
        "SubnetMask" => subnet_mask,
        "DNSServers" => dns_servers,
        "DomainName" => domain_name,
        "IPRouters" => ip_routers,
        "LeaseTime" => lease_time,
    }

    fn alias(&self) -> Option<&str> {
        Some(&self.alias)
    }

    fn set_alias(&mut self, alias: String) {
        self.alias = alias;
    }
}

impl Ordered for DhcpServerPool {
    const ORDER_PARAM: &'static str = "Order";

    fn order(&self) -> u32 {
        self.order
    }

    fn set_order(&mut self, order: u32) {
        self.order = order;
    }
}

impl Matches<DhcpRequest> for DhcpServerPool {
    fn matches(&self, request: &DhcpRequest) -> bool {
        if !self.enable {
            return false;
        }
        let mode = self.vendor_class_id_mode;
        Criterion::text(&self.interface, false).matches(Some(request.interface.as_str()))
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

// ── Static addresses ────────────────────────────────────────────────

/// `Device.DHCPv4.Server.Pool.{i}.StaticAddress.{i}.`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticAddress {
    #[serde(rename = "Enable")]
    pub enable: bool,
    #[serde(rename = "Alias")]
    pub alias: String,
    #[serde(rename = "Chaddr", with = "optional_text")]
    pub chaddr: Option<MacAddress>,
    #[serde(rename = "Yiaddr", with = "optional_text")]
    pub yiaddr: Option<Ipv4Addr>,
}

static STATIC_ADDRESS_PARAMS: &[FieldDescriptor] = &[
    FieldDescriptor::rw("Enable", ParamKind::Boolean),
    FieldDescriptor::rw("Alias", ParamKind::string(64)),
    FieldDescriptor::rw("Chaddr", ParamKind::MacAddress),
    FieldDescriptor::rw("Yiaddr", ParamKind::Ipv4Address),
];

impl ManagedEntity for StaticAddress {
    const OBJECT_NAME: &'static str = "Device.DHCPv4.Server.Pool.{i}.StaticAddress.{i}.";

    fn descriptors() -> &'static [FieldDescriptor] {
        STATIC_ADDRESS_PARAMS
    }

    entity_params! {
        "Enable" => enable,
        "Alias" => alias,
        "Chaddr" => chaddr,
        "Yiaddr" => yiaddr,
    }

    fn unique_keys() -> &'static [&'static [&'static str]] {
        &[&["Chaddr"]]
    }

    fn is_enabled(&self) -> bool {
        self.enable
    }

    fn alias(&self) -> Option<&str> {
        Some(&self.alias)
    }

    fn set_alias(&mut self, alias: String) {
        self.alias = alias;
    }
}

// ── Clients ─────────────────────────────────────────────────────────

/// `Device.DHCPv4.Server.Pool.{i}.Client.{i}.`
///
/// Created and deleted by the DHCP server as leases are granted and
/// released; only the alias is controller-writable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DhcpClient {
    #[serde(rename = "Alias")]
    pub alias: String,
    #[serde(rename = "Chaddr", with = "optional_text")]
    pub chaddr: Option<MacAddress>,
    #[serde(rename = "Active")]
    pub active: bool,
    #[serde(rename = "IPAddress", with = "optional_text")]
    pub ip_address: Option<Ipv4Addr>,
    #[serde(rename = "LeaseTimeRemaining")]
    pub lease_time_remaining: DateTime<Utc>,
}

impl Default for DhcpClient {
    fn default() -> Self {
        Self {
            alias: String::new(),
            chaddr: None,
            active: false,
            ip_address: None,
            lease_time_remaining: unknown_time(),
        }
    }
}

static CLIENT_PARAMS: &[FieldDescriptor] = &[
    FieldDescriptor::rw("Alias", ParamKind::string(64)),
    FieldDescriptor::ro("Chaddr", ParamKind::MacAddress),
    FieldDescriptor::ro("Active", ParamKind::Boolean),
    FieldDescriptor::ro("IPAddress", ParamKind::Ipv4Address),
    FieldDescriptor::ro("LeaseTimeRemaining", ParamKind::DateTime).notify(NotifyPolicy::CanDeny),
];

impl ManagedEntity for DhcpClient {
    const OBJECT_NAME: &'static str = "Device.DHCPv4.Server.Pool.{i}.Client.{i}.";

    fn descriptors() -> &'static [FieldDescriptor] {
        CLIENT_PARAMS
    }

    entity_params! {
        "Alias" => alias,
        "Chaddr" => chaddr,
        "Active" => active,
        "IPAddress" => ip_address,
        "LeaseTimeRemaining" => lease_time_remaining,
    }

    fn alias(&self) -> Option<&str> {
        Some(&self.alias)
    }

    fn set_alias(&mut self, alias: String) {
        self.alias = alias;
    }
}

impl Expiring for DhcpClient {
    /// The unknown-time sentinel means no lease is known yet.
    fn expires_at(&self) -> Option<DateTime<Utc>> {
        (self.lease_time_remaining != unknown_time()).then_some(self.lease_time_remaining)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request() -> DhcpRequest {
        DhcpRequest {
            interface: "Device.IP.Interface.1".into(),
            vendor_class_id: Some("MSFT 5.0".into()),
            client_id: None,
            user_class_id: None,
            chaddr: MacAddress::parse("00:11:22:33:44:55").unwrap(),
        }
    }

    #[test]
    fn pool_defaults() {
        let pool = DhcpServerPool::default();
        assert_eq!(pool.lease_time, 86_400);
        assert_eq!(pool.vendor_class_id_mode, VendorClassIdMode::Exact);
        assert!(pool.static_addresses.is_empty());
        assert!(pool.clients.is_empty());
    }

    #[test]
    fn vendor_class_prefix_mode() {
        let pool = DhcpServerPool {
            enable: true,
            vendor_class_id: "MSFT".into(),
            vendor_class_id_mode: VendorClassIdMode::Prefix,
            ..DhcpServerPool::default()
        };
        assert!(pool.matches(&request()));

        let exact = DhcpServerPool {
            vendor_class_id_mode: VendorClassIdMode::Exact,
            ..pool.clone()
        };
        assert!(!exact.matches(&request()));

        let excluded = DhcpServerPool {
            vendor_class_id_exclude: true,
            ..pool
        };
        assert!(!excluded.matches(&request()));
    }

    #[test]
    fn chaddr_mask_selects_vendor_oui() {
        let pool = DhcpServerPool {
            enable: true,
            chaddr: MacAddress::parse("00:11:22:00:00:00").ok(),
            chaddr_mask: MacAddress::parse("ff:ff:ff:00:00:00").ok(),
            ..DhcpServerPool::default()
        };
        assert!(pool.matches(&request()));
    }

    #[test]
    fn static_addresses_unique_on_chaddr_when_enabled() {
        let mut pool = DhcpServerPool::default();
        let chaddr = MacAddress::parse("00:11:22:33:44:55").ok();
        let reservation = StaticAddress {
            enable: true,
            chaddr,
            yiaddr: Some(Ipv4Addr::new(192, 168, 1, 10)),
            ..StaticAddress::default()
        };
        pool.static_addresses.add(reservation.clone()).unwrap();
        assert!(pool.static_addresses.add(reservation.clone()).is_err());

        // Disabled rows do not take part.
        let disabled = StaticAddress {
            enable: false,
            ..reservation
        };
        assert!(pool.static_addresses.add(disabled).is_ok());
    }

    #[test]
    fn released_leases_are_purged() {
        let mut clients: Table<DhcpClient> = Table::new();
        let now = Utc::now();
        clients
            .add(DhcpClient {
                active: true,
                lease_time_remaining: now - chrono::Duration::seconds(1),
                ..DhcpClient::default()
            })
            .unwrap();
        let live = clients
            .add(DhcpClient {
                active: true,
                lease_time_remaining: now + chrono::Duration::hours(1),
                ..DhcpClient::default()
            })
            .unwrap();

        let purged = clients.purge_expired(now);
        assert_eq!(purged.len(), 1);
        assert_eq!(clients.instance_numbers(), vec![live]);
    }
}
