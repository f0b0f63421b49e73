// ── Notification attributes ──
//
// The session layer asks two questions of the data model: may the
// controller set this notification level on this parameter, and which
// parameter changes must be reported. Both are answered from the
// descriptors' `NotifyPolicy`.

use std::collections::HashMap;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use crate::error::{FaultCode, ParameterFault};
use crate::schema::{ManagedEntity, NotifyPolicy, ParamValue};

/// Notification attribute value (SetParameterAttributes `Notification`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NotificationLevel {
    #[default]
    Off,
    Passive,
    Active,
}

impl NotificationLevel {
    pub fn code(self) -> u8 {
        match self {
            Self::Off => 0,
            Self::Passive => 1,
            Self::Active => 2,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Off),
            1 => Some(Self::Passive),
            2 => Some(Self::Active),
            _ => None,
        }
    }
}

/// Notification levels requested for the parameters of one entity type.
#[derive(Debug, Clone)]
pub struct NotificationAttributes<E> {
    levels: HashMap<&'static str, NotificationLevel>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: ManagedEntity> Default for NotificationAttributes<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ManagedEntity> NotificationAttributes<E> {
    /// Initial attributes: forced parameters start active, the rest off.
    pub fn new() -> Self {
        let levels = E::descriptors()
            .iter()
            .filter(|d| {
                matches!(
                    d.notify,
                    NotifyPolicy::ForceEnabled | NotifyPolicy::ForceDefaultEnabled
                )
            })
            .map(|d| (d.name, NotificationLevel::Active))
            .collect();
        Self {
            levels,
            _entity: PhantomData,
        }
    }

    /// Effective level of a parameter.
    pub fn level(&self, name: &str) -> NotificationLevel {
        match E::descriptor(name) {
            Some(d) if d.notify == NotifyPolicy::ForceEnabled => NotificationLevel::Active,
            Some(_) => self.levels.get(name).copied().unwrap_or_default(),
            None => NotificationLevel::Off,
        }
    }

    /// Request a notification level for a parameter.
    ///
    /// `CanDeny` parameters refuse active notification (9009). Requests on
    /// `ForceEnabled` parameters are accepted but leave them active.
    pub fn set(&mut self, name: &str, level: NotificationLevel) -> Result<(), ParameterFault> {
        let descriptor = E::descriptor(name).ok_or_else(|| {
            ParameterFault::new(
                name,
                FaultCode::InvalidParameterName,
                format!("no such parameter on {}", E::OBJECT_NAME),
            )
        })?;
        match descriptor.notify {
            NotifyPolicy::CanDeny if level == NotificationLevel::Active => {
                Err(ParameterFault::new(
                    name,
                    FaultCode::NotificationRequestRejected,
                    "active notification denied for this parameter",
                ))
            }
            NotifyPolicy::ForceEnabled => {
                tracing::debug!(parameter = name, ?level, "ignoring change to forced notification");
                Ok(())
            }
            _ => {
                self.levels.insert(descriptor.name, level);
                Ok(())
            }
        }
    }
}

/// A parameter change the session layer may have to report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueChange {
    pub parameter: &'static str,
    pub old: ParamValue,
    pub new: ParamValue,
    pub level: NotificationLevel,
}

/// Changed parameters between two states of an entity whose effective
/// notification level is not `Off`.
pub fn value_changes<E: ManagedEntity>(
    old: &E,
    new: &E,
    attributes: &NotificationAttributes<E>,
) -> Vec<ValueChange> {
    E::descriptors()
        .iter()
        .filter_map(|d| {
            let level = attributes.level(d.name);
            if level == NotificationLevel::Off {
                return None;
            }
            let before = d.read(old)?;
            let after = d.read(new)?;
            (before != after).then_some(ValueChange {
                parameter: d.name,
                old: before,
                new: after,
                level,
            })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{ClientStatus, DhcpClient, Ipv6Prefix, MqttClient};

    #[test]
    fn force_default_enabled_starts_active_but_can_change() {
        let mut attrs = NotificationAttributes::<MqttClient>::new();
        assert_eq!(attrs.level("Status"), NotificationLevel::Active);
        assert_eq!(attrs.level("BrokerPort"), NotificationLevel::Off);

        attrs.set("Status", NotificationLevel::Off).unwrap();
        assert_eq!(attrs.level("Status"), NotificationLevel::Off);
    }

    #[test]
    fn force_enabled_stays_active() {
        let mut attrs = NotificationAttributes::<Ipv6Prefix>::new();
        attrs.set("PrefixStatus", NotificationLevel::Off).unwrap();
        assert_eq!(attrs.level("PrefixStatus"), NotificationLevel::Active);
    }

    #[test]
    fn can_deny_rejects_active() {
        let mut attrs = NotificationAttributes::<DhcpClient>::new();
        let fault = attrs
            .set("LeaseTimeRemaining", NotificationLevel::Active)
            .unwrap_err();
        assert_eq!(fault.code, FaultCode::NotificationRequestRejected);
        attrs
            .set("LeaseTimeRemaining", NotificationLevel::Passive)
            .unwrap();
        assert_eq!(attrs.level("LeaseTimeRemaining"), NotificationLevel::Passive);
    }

    #[test]
    fn unknown_parameter_is_9005() {
        let mut attrs = NotificationAttributes::<MqttClient>::new();
        let fault = attrs.set("Bogus", NotificationLevel::Passive).unwrap_err();
        assert_eq!(fault.code, FaultCode::InvalidParameterName);
    }

    #[test]
    fn value_changes_reports_only_watched_parameters() {
        let mut attrs = NotificationAttributes::<MqttClient>::new();
        attrs.set("BrokerAddress", NotificationLevel::Passive).unwrap();

        let old = MqttClient::default();
        let new = MqttClient {
            status: ClientStatus::Connected,
            broker_address: "mqtt.example.net".into(),
            keep_alive_time: 30,
            ..old.clone()
        };

        let changes = value_changes(&old, &new, &attrs);
        let summary: Vec<_> = changes.iter().map(|c| (c.parameter, c.level)).collect();
        assert_eq!(
            summary,
            vec![
                ("Status", NotificationLevel::Active),
                ("BrokerAddress", NotificationLevel::Passive),
            ]
        );
        assert_eq!(changes[0].new, ParamValue::String("Connected".into()));
    }

    #[test]
    fn levels_round_trip_through_codes() {
        for level in [
            NotificationLevel::Off,
            NotificationLevel::Passive,
            NotificationLevel::Active,
        ] {
            assert_eq!(NotificationLevel::from_code(level.code()), Some(level));
        }
        assert_eq!(NotificationLevel::from_code(3), None);
    }
}
