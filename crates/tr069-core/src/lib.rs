//! Typed CWMP (TR-069) data-model entities and the rules that govern them.
//!
//! This crate owns the object model and its invariants; it does no I/O and
//! speaks no wire protocol:
//!
//! - **Schema** ([`schema`]): every entity publishes a static table of
//!   [`FieldDescriptor`]s (wire name, type and bounds, access mode, notify
//!   policy, mode gates). [`set_parameter_values`] is the single validation
//!   layer for controller writes and reports every offending parameter with
//!   its CWMP fault code.
//!
//! - **Tables** ([`store`]): [`Table<T>`] keeps rows by instance number with
//!   alias and uniqueness enforcement; [`PrecedenceTable<T>`] adds a dense
//!   1-based rank with first-match evaluation. [`SharedTable`] gives one
//!   writer and many `watch` subscribers.
//!
//! - **Matching** ([`matching`]): value + exclude-flag criteria used by DHCP
//!   pools and firewall rules to classify requests and packets.
//!
//! - **Notification** ([`notify`]): per-parameter notification levels
//!   honoring each descriptor's notify policy.
//!
//! - **Object model** ([`model`]): TR-181 firewall, DHCPv4 server, IP
//!   interface and MQTT client objects, TR-098 conditional serving pools and
//!   port mappings, and TR-135 audio outputs.

pub mod config;
pub mod error;
pub mod matching;
pub mod model;
pub mod notify;
pub mod schema;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::ModelOptions;
pub use error::{CoreError, FaultCode, ParameterFault, SetFault};
pub use matching::{Criterion, DhcpRequest, MaskedCriterion, Matches, PacketInfo, PortCriterion};
pub use notify::{NotificationAttributes, NotificationLevel, ValueChange, value_changes};
pub use schema::{
    AccessMode, FieldDescriptor, Gate, ManagedEntity, NotifyPolicy, Origin, ParamKind, ParamValue,
    from_parameter_map, set_parameter_values, to_parameter_map, validate,
};
pub use store::{Expiring, Ordered, PrecedenceTable, SharedTable, Table};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    Alias, AudioOutput, Chain, DhcpConditionalServingPool, DhcpServerPool, Firewall,
    FirewallRule, InstanceNumber, IpInterface, Ipv4AddressEntry, Ipv6Prefix, MacAddress,
    MqttClient, PortMapping, StaticAddress, Subscription,
};
