// ── TR-098 WANIPConnection.PortMapping ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, VariantNames};

use crate::schema::value::wire_enum;
use crate::schema::{FieldDescriptor, ManagedEntity, ParamKind, UINT_MAX, entity_params};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, VariantNames)]
pub enum PortMappingProtocol {
    #[default]
    #[strum(serialize = "TCP")]
    Tcp,
    #[strum(serialize = "UDP")]
    Udp,
}

wire_enum!(PortMappingProtocol);

/// `InternetGatewayDevice.WANDevice.{i}.WANConnectionDevice.{i}.WANIPConnection.{i}.PortMapping.{i}.`
///
/// An empty `RemoteHost` and an `ExternalPort` of 0 are wildcards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortMapping {
    #[serde(rename = "PortMappingEnabled")]
    pub enabled: bool,
    #[serde(rename = "Alias")]
    pub alias: String,
    /// Seconds remaining; 0 is a static mapping.
    #[serde(rename = "PortMappingLeaseDuration")]
    pub lease_duration: u32,
    #[serde(rename = "RemoteHost")]
    pub remote_host: String,
    #[serde(rename = "ExternalPort")]
    pub external_port: u32,
    #[serde(rename = "ExternalPortEndRange")]
    pub external_port_end_range: u32,
    #[serde(rename = "InternalPort")]
    pub internal_port: u32,
    #[serde(rename = "PortMappingProtocol")]
    pub protocol: PortMappingProtocol,
    #[serde(rename = "InternalClient")]
    pub internal_client: String,
    #[serde(rename = "PortMappingDescription")]
    pub description: String,
}

impl Default for PortMapping {
    fn default() -> Self {
        Self {
            enabled: false,
            alias: String::new(),
            lease_duration: 0,
            remote_host: String::new(),
            external_port: 0,
            external_port_end_range: 0,
            internal_port: 0,
            protocol: PortMappingProtocol::Tcp,
            internal_client: String::new(),
            description: String::new(),
        }
    }
}

static PORT_MAPPING_PARAMS: &[FieldDescriptor] = &[
    FieldDescriptor::rw("PortMappingEnabled", ParamKind::Boolean),
    FieldDescriptor::rw("Alias", ParamKind::string(64)),
    FieldDescriptor::rw("PortMappingLeaseDuration", ParamKind::uint(0, UINT_MAX)),
    FieldDescriptor::rw("RemoteHost", ParamKind::string(256)),
    FieldDescriptor::rw("ExternalPort", ParamKind::uint(0, 65535)),
    FieldDescriptor::rw("ExternalPortEndRange", ParamKind::uint(0, 65535)),
    FieldDescriptor::rw("InternalPort", ParamKind::uint(0, 65535)),
    FieldDescriptor::rw("PortMappingProtocol", ParamKind::Enum(PortMappingProtocol::VARIANTS)),
    FieldDescriptor::rw("InternalClient", ParamKind::string(256)),
    FieldDescriptor::rw("PortMappingDescription", ParamKind::string(256)),
];

impl ManagedEntity for PortMapping {
    const OBJECT_NAME: &'static str = "InternetGatewayDevice.WANDevice.{i}.WANConnectionDevice.{i}.WANIPConnection.{i}.PortMapping.{i}.";

    fn descriptors() -> &'static [FieldDescriptor] {
        PORT_MAPPING_PARAMS
    }

    entity_params! {
        "PortMappingEnabled" => enabled,
        "Alias" => alias,
        "PortMappingLeaseDuration" => lease_duration,
        "RemoteHost" => remote_host,
        "ExternalPort" => external_port,
        "ExternalPortEndRange" => external_port_end_range,
        "InternalPort" => internal_port,
        "PortMappingProtocol" => protocol,
        "InternalClient" => internal_client,
        "PortMappingDescription" => description,
    }

    fn unique_keys() -> &'static [&'static [&'static str]] {
        &[&["RemoteHost", "ExternalPort", "PortMappingProtocol"]]
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn alias(&self) -> Option<&str> {
        Some(&self.alias)
    }

    fn set_alias(&mut self, alias: String) {
        self.alias = alias;
    }
}
