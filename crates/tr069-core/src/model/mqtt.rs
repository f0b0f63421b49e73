// ── TR-181 Device.MQTT.Client ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, VariantNames};

use crate::schema::value::wire_enum;
use crate::schema::{
    FieldDescriptor, Gate, ManagedEntity, NotifyPolicy, ParamKind, UINT_MAX, entity_params,
};
use crate::store::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, VariantNames)]
pub enum ClientStatus {
    Connecting,
    Connected,
    #[default]
    Disconnected,
    #[strum(serialize = "Error_Misconfigured")]
    ErrorMisconfigured,
    #[strum(serialize = "Error_BrokerUnreachable")]
    ErrorBrokerUnreachable,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, VariantNames)]
pub enum ProtocolVersion {
    #[default]
    #[strum(serialize = "3.1")]
    V3_1,
    #[strum(serialize = "3.1.1")]
    V3_1_1,
    #[strum(serialize = "5.0")]
    V5_0,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, VariantNames)]
pub enum TransportProtocol {
    #[default]
    #[strum(serialize = "TCP/IP")]
    TcpIp,
    #[strum(serialize = "TLS")]
    Tls,
    WebSocket,
    #[strum(serialize = "WebSocketTLS")]
    WebSocketTls,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, VariantNames)]
pub enum SubscriptionStatus {
    #[default]
    Unsubscribed,
    Subscribed,
    Subscribing,
    Unsubscribing,
    Error,
}

wire_enum!(ClientStatus, ProtocolVersion, TransportProtocol, SubscriptionStatus);

/// `Device.MQTT.Client.{i}.`
///
/// The `Will*` parameters only mean something, and are only writable,
/// while `WillEnable` is true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttClient {
    #[serde(rename = "Enable")]
    pub enable: bool,
    #[serde(rename = "Status")]
    pub status: ClientStatus,
    #[serde(rename = "Alias")]
    pub alias: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "ClientID")]
    pub client_id: String,
    #[serde(rename = "Username")]
    pub username: String,
    #[serde(rename = "Password")]
    pub password: String,
    #[serde(rename = "TransportProtocol")]
    pub transport_protocol: TransportProtocol,
    #[serde(rename = "ProtocolVersion")]
    pub protocol_version: ProtocolVersion,
    #[serde(rename = "CleanSession")]
    pub clean_session: bool,
    #[serde(rename = "BrokerAddress")]
    pub broker_address: String,
    #[serde(rename = "BrokerPort")]
    pub broker_port: u32,
    /// Seconds.
    #[serde(rename = "KeepAliveTime")]
    pub keep_alive_time: u32,

    #[serde(rename = "WillEnable")]
    pub will_enable: bool,
    #[serde(rename = "WillTopic")]
    pub will_topic: String,
    #[serde(rename = "WillValue")]
    pub will_value: String,
    #[serde(rename = "WillQoS")]
    pub will_qos: u32,
    #[serde(rename = "WillRetain")]
    pub will_retain: bool,

    #[serde(rename = "Subscription")]
    pub subscriptions: Table<Subscription>,
}

impl Default for MqttClient {
    fn default() -> Self {
        Self {
            enable: false,
            status: ClientStatus::Disconnected,
            alias: String::new(),
            name: String::new(),
            client_id: String::new(),
            username: String::new(),
            password: String::new(),
            transport_protocol: TransportProtocol::TcpIp,
            protocol_version: ProtocolVersion::V3_1,
            clean_session: true,
            broker_address: String::new(),
            broker_port: 1883,
            keep_alive_time: 60,
            will_enable: false,
            will_topic: String::new(),
            will_value: String::new(),
            will_qos: 0,
            will_retain: false,
            subscriptions: Table::new(),
        }
    }
}

const WILL: &[Gate] = &[Gate::new("WillEnable", &["true"])];

static CLIENT_PARAMS: &[FieldDescriptor] = &[
    FieldDescriptor::rw("Enable", ParamKind::Boolean),
    FieldDescriptor::ro("Status", ParamKind::Enum(ClientStatus::VARIANTS))
        .notify(NotifyPolicy::ForceDefaultEnabled),
    FieldDescriptor::rw("Alias", ParamKind::string(64)),
    FieldDescriptor::rw("Name", ParamKind::string(64)),
    FieldDescriptor::rw("ClientID", ParamKind::string(65535)),
    FieldDescriptor::rw("Username", ParamKind::string(256)),
    FieldDescriptor::rw("Password", ParamKind::string(256)).secret(),
    FieldDescriptor::rw("TransportProtocol", ParamKind::Enum(TransportProtocol::VARIANTS)),
    FieldDescriptor::rw("ProtocolVersion", ParamKind::Enum(ProtocolVersion::VARIANTS)),
    FieldDescriptor::rw("CleanSession", ParamKind::Boolean),
    FieldDescriptor::rw("BrokerAddress", ParamKind::string(256)),
    FieldDescriptor::rw("BrokerPort", ParamKind::uint(1, 65535)),
    FieldDescriptor::rw("KeepAliveTime", ParamKind::uint(0, UINT_MAX)),
    FieldDescriptor::rw("WillEnable", ParamKind::Boolean),
    FieldDescriptor::rw("WillTopic", ParamKind::string(65535)).gated(WILL),
    FieldDescriptor::rw("WillValue", ParamKind::string(65535)).gated(WILL),
    FieldDescriptor::rw("WillQoS", ParamKind::uint(0, 2)).gated(WILL),
    FieldDescriptor::rw("WillRetain", ParamKind::Boolean).gated(WILL),
];

impl ManagedEntity for MqttClient {
    const OBJECT_NAME: &'static str = "Device.MQTT.Client.{i}.";

    fn descriptors() -> &'static [FieldDescriptor] {
        CLIENT_PARAMS
    }

    entity_params! {
        "Enable" => enable,
        "Status" => status,
        "Alias" => alias,
        "Name" => name,
        "ClientID" => client_id,
        "Username" => username,
        "Password" => password,
        "TransportProtocol" => transport_protocol,
        "ProtocolVersion" => protocol_version,
        "CleanSession" => clean_session,
        "BrokerAddress" => broker_address,
        "BrokerPort" => broker_port,
        "KeepAliveTime" => keep_alive_time,
        "WillEnable" => will_enable,
        "WillTopic" => will_topic,
        "WillValue" => will_value,
        "WillQoS" => will_qos,
        "WillRetain" => will_retain,
    }

    fn alias(&self) -> Option<&str> {
        Some(&self.alias)
    }

    fn set_alias(&mut self, alias: String) {
        self.alias = alias;
    }
}

// ── Subscriptions ───────────────────────────────────────────────────

/// `Device.MQTT.Client.{i}.Subscription.{i}.`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Subscription {
    #[serde(rename = "Enable")]
    pub enable: bool,
    #[serde(rename = "Status")]
    pub status: SubscriptionStatus,
    #[serde(rename = "Alias")]
    pub alias: String,
    #[serde(rename = "Topic")]
    pub topic: String,
    #[serde(rename = "QoS")]
    pub qos: u32,
}

static SUBSCRIPTION_PARAMS: &[FieldDescriptor] = &[
    FieldDescriptor::rw("Enable", ParamKind::Boolean),
    FieldDescriptor::ro("Status", ParamKind::Enum(SubscriptionStatus::VARIANTS)),
    FieldDescriptor::rw("Alias", ParamKind::string(64)),
    FieldDescriptor::rw("Topic", ParamKind::string(65535)),
    FieldDescriptor::rw("QoS", ParamKind::uint(0, 2)),
];

impl ManagedEntity for Subscription {
    const OBJECT_NAME: &'static str = "Device.MQTT.Client.{i}.Subscription.{i}.";

    fn descriptors() -> &'static [FieldDescriptor] {
        SUBSCRIPTION_PARAMS
    }

    entity_params! {
        "Enable" => enable,
        "Status" => status,
        "Alias" => alias,
        "Topic" => topic,
        "QoS" => qos,
    }

    fn unique_keys() -> &'static [&'static [&'static str]] {
        &[&["Topic"]]
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

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::FaultCode;
    use crate::schema::{Origin, set_parameter_values};

    #[test]
    fn client_defaults() {
        let client = MqttClient::default();
        assert_eq!(client.broker_port, 1883);
        assert!(client.clean_session);
        assert_eq!(client.keep_alive_time, 60);
        assert_eq!(client.protocol_version.to_string(), "3.1");
        assert_eq!(client.transport_protocol.to_string(), "TCP/IP");
    }

    #[test]
    fn will_parameters_follow_will_enable() {
        let mut client = MqttClient::default();
        let err = set_parameter_values(
            &mut client,
            &[("WillTopic", "gw/status"), ("WillQoS", "1")],
            Origin::Controller,
        )
        .unwrap_err();
        assert_eq!(err.parameters(), vec!["WillTopic", "WillQoS"]);
        assert!(err.faults.iter().all(|f| f.code == FaultCode::NonWritableParameter));

        set_parameter_values(
            &mut client,
            &[("WillEnable", "true"), ("WillTopic", "gw/status")],
            Origin::Controller,
        )
        .unwrap();
        assert_eq!(client.will_topic, "gw/status");
    }

    #[test]
    fn password_reads_back_empty() {
        let mut client = MqttClient::default();
        set_parameter_values(&mut client, &[("Password", "hunter2")], Origin::Controller).unwrap();
        assert_eq!(client.password, "hunter2");

        let params = crate::schema::to_parameter_map(&client);
        assert_eq!(params["Password"], "");
        assert_eq!(params["BrokerPort"], "1883");
    }

    #[test]
    fn broker_port_bounds() {
        let mut client = MqttClient::default();
        let err = set_parameter_values(&mut client, &[("BrokerPort", "0")], Origin::Controller)
            .unwrap_err();
        assert_eq!(err.faults[0].code, FaultCode::InvalidParameterValue);
        assert_eq!(client.broker_port, 1883);
    }
}
