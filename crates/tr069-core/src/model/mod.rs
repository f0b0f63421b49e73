// ── CWMP object model ──
//
// Every type in this module is one object (or one table row) of the
// TR-098 / TR-135 / TR-181 data models. Fields are plain data for the
// device code that owns them; controller writes go through the schema's
// validation layer and the tables in `store`.

pub mod common;
pub mod identity;

pub mod conditional_pool;
pub mod dhcp;
pub mod firewall;
pub mod ip;
pub mod mqtt;
pub mod port_mapping;
pub mod stb;

// ── Re-exports ──────────────────────────────────────────────────────
// Flat access: `use tr069_core::model::*` gives you everything.

// Core identity
pub use identity::{ALIAS_MAX_LEN, Alias, InstanceNumber, MacAddress, MacAddressError};

// Common building blocks
pub use common::{Status, VendorClassIdMode};

// Firewall
pub use firewall::{Chain, ChainCreator, Firewall, FirewallLevel, FirewallRule, RuleTarget};

// DHCP
pub use conditional_pool::{DhcpConditionalServingPool, UseAllocatedWan};
pub use dhcp::{DhcpClient, DhcpServerPool, StaticAddress};

// NAT
pub use port_mapping::{PortMapping, PortMappingProtocol};

// IP
pub use ip::{
    AddressingType, InterfaceType, IpInterface, Ipv4AddressEntry, Ipv6Prefix, PrefixOrigin,
    PrefixStatus, StaticType,
};

// MQTT
pub use mqtt::{ClientStatus, MqttClient, ProtocolVersion, Subscription, SubscriptionStatus, TransportProtocol};

// Set-top box
pub use stb::{AudioFormat, AudioOutput};
