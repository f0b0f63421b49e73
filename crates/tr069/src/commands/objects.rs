//! Object registry: maps `ObjectType` onto its row type and table kind.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tabled::Tabled;

use tr069_core::model::InstanceNumber;
use tr069_core::{CoreError, ManagedEntity, ModelOptions, Ordered, Origin, PrecedenceTable, Table};

use crate::cli::ObjectType;
use crate::config::Context;
use crate::error::CliError;
use crate::output;

// ── Table abstraction ───────────────────────────────────────────────

/// The table operations the document commands need, over plain and
/// precedence tables alike.
pub trait RowStore: Default + Serialize + DeserializeOwned {
    type Row: ManagedEntity;

    fn table(&self) -> &Table<Self::Row>;

    fn configure(&mut self, options: ModelOptions);

    fn add_row(&mut self, row: Self::Row, order: Option<u32>) -> Result<InstanceNumber, CoreError>;

    fn delete_row(&mut self, instance: InstanceNumber) -> Result<Self::Row, CoreError>;

    fn set_values(
        &mut self,
        instance: InstanceNumber,
        updates: &[(String, String)],
        origin: Origin,
    ) -> Result<(), CoreError>;

    /// Name of the rank parameter, if any.
    fn order_param() -> Option<&'static str> {
        None
    }
}

impl<T: ManagedEntity> RowStore for Table<T> {
    type Row = T;

    fn table(&self) -> &Table<T> {
        self
    }

    fn configure(&mut self, options: ModelOptions) {
        self.set_options(options);
    }

    fn add_row(&mut self, row: T, _order: Option<u32>) -> Result<InstanceNumber, CoreError> {
        self.add(row)
    }

    fn delete_row(&mut self, instance: InstanceNumber) -> Result<T, CoreError> {
        self.remove(instance)
    }

    fn set_values(
        &mut self,
        instance: InstanceNumber,
        updates: &[(String, String)],
        origin: Origin,
    ) -> Result<(), CoreError> {
        self.set_parameter_values(instance, updates, origin)
    }
}

impl<T: Ordered> RowStore for PrecedenceTable<T> {
    type Row = T;

    fn table(&self) -> &Table<T> {
        self
    }

    fn configure(&mut self, options: ModelOptions) {
        self.set_options(options);
    }

    fn add_row(&mut self, row: T, order: Option<u32>) -> Result<InstanceNumber, CoreError> {
        self.insert(row, order)
    }

    fn delete_row(&mut self, instance: InstanceNumber) -> Result<T, CoreError> {
        self.remove(instance)
    }

    fn set_values(
        &mut self,
        instance: InstanceNumber,
        updates: &[(String, String)],
        origin: Origin,
    ) -> Result<(), CoreError> {
        self.set_parameter_values(instance, updates, origin)
    }

    fn order_param() -> Option<&'static str> {
        Some(T::ORDER_PARAM)
    }
}

/// Call `$handler::<Store>(args..)` with the table type of `$object`.
macro_rules! for_object {
    ($object:expr, $handler:ident($($arg:expr),* $(,)?)) => {{
        use tr069_core::model as m;
        use tr069_core::{PrecedenceTable, Table};
        use $crate::cli::ObjectType;
        match $object {
            ObjectType::FirewallChain => $handler::<Table<m::Chain>>($($arg),*),
            ObjectType::FirewallRule => $handler::<PrecedenceTable<m::FirewallRule>>($($arg),*),
            ObjectType::DhcpPool => $handler::<PrecedenceTable<m::DhcpServerPool>>($($arg),*),
            ObjectType::DhcpStaticAddress => $handler::<Table<m::StaticAddress>>($($arg),*),
            ObjectType::DhcpClient => $handler::<Table<m::DhcpClient>>($($arg),*),
            ObjectType::ConditionalPool => {
                $handler::<PrecedenceTable<m::DhcpConditionalServingPool>>($($arg),*)
            }
            ObjectType::PortMapping => $handler::<Table<m::PortMapping>>($($arg),*),
            ObjectType::IpInterface => $handler::<Table<m::IpInterface>>($($arg),*),
            ObjectType::Ipv4Address => $handler::<Table<m::Ipv4AddressEntry>>($($arg),*),
            ObjectType::Ipv6Prefix => $handler::<Table<m::Ipv6Prefix>>($($arg),*),
            ObjectType::MqttClient => $handler::<Table<m::MqttClient>>($($arg),*),
            ObjectType::MqttSubscription => $handler::<Table<m::Subscription>>($($arg),*),
            ObjectType::AudioOutput => $handler::<Table<m::AudioOutput>>($($arg),*),
        }
    }};
}

pub(crate) use for_object;

/// Rows whose only controller-writable parameter is `Alias` exist because
/// the device created them (leases, auto-configured addresses).
pub fn device_created<E: ManagedEntity>() -> bool {
    E::descriptors()
        .iter()
        .all(|d| d.name == "Alias" || !d.is_writable())
}

/// The CLI name of an object type, as accepted on the command line.
pub fn object_name(object: ObjectType) -> String {
    clap::ValueEnum::to_possible_value(&object)
        .map(|value| value.get_name().to_owned())
        .unwrap_or_default()
}

/// Default path prefix of a table: parent placeholders set to instance 1,
/// the row placeholder dropped. `Device.IP.Interface.{i}.IPv4Address.{i}.`
/// becomes `Device.IP.Interface.1.IPv4Address.`.
pub fn default_prefix(object_path: &str) -> String {
    let table_path = object_path.strip_suffix("{i}.").unwrap_or(object_path);
    table_path.replace("{i}", "1")
}

// ── `objects` command ────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ObjectSummary {
    name: String,
    path: &'static str,
    parameters: usize,
    writable: usize,
    order_param: Option<&'static str>,
    unique: Vec<String>,
}

#[derive(Tabled)]
struct ObjectRow {
    #[tabled(rename = "Object")]
    name: String,
    #[tabled(rename = "Path")]
    path: &'static str,
    #[tabled(rename = "Params")]
    parameters: usize,
    #[tabled(rename = "Writable")]
    writable: usize,
    #[tabled(rename = "Ranked By")]
    order_param: String,
    #[tabled(rename = "Unique")]
    unique: String,
}

impl From<&ObjectSummary> for ObjectRow {
    fn from(s: &ObjectSummary) -> Self {
        Self {
            name: s.name.clone(),
            path: s.path,
            parameters: s.parameters,
            writable: s.writable,
            order_param: s.order_param.unwrap_or("-").into(),
            unique: if s.unique.is_empty() {
                "-".into()
            } else {
                s.unique.join("; ")
            },
        }
    }
}

fn summarize<S: RowStore>(object: ObjectType) -> ObjectSummary {
    let descriptors = S::Row::descriptors();
    ObjectSummary {
        name: object_name(object),
        path: S::Row::OBJECT_NAME,
        parameters: descriptors.len(),
        writable: descriptors.iter().filter(|d| d.is_writable()).count(),
        order_param: S::order_param(),
        unique: S::Row::unique_keys()
            .iter()
            .map(|tuple| tuple.join("+"))
            .collect(),
    }
}

pub fn handle(ctx: &Context) -> Result<(), CliError> {
    let summaries: Vec<ObjectSummary> = <ObjectType as clap::ValueEnum>::value_variants()
        .iter()
        .map(|object| for_object!(*object, summarize(*object)))
        .collect();

    let out = output::render_list(ctx.output, &summaries, |s| ObjectRow::from(s), |s| {
        format!("{}\t{}", s.name, s.path)
    })?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use tr069_core::model::{
        Chain, DhcpClient, DhcpConditionalServingPool, FirewallRule, Ipv4AddressEntry, MqttClient,
        PortMapping, Subscription,
    };

    use super::*;

    #[test]
    fn default_prefix_fills_parent_instances() {
        assert_eq!(
            default_prefix(Ipv4AddressEntry::OBJECT_NAME),
            "Device.IP.Interface.1.IPv4Address."
        );
        assert_eq!(default_prefix(MqttClient::OBJECT_NAME), "Device.MQTT.Client.");
    }

    #[test]
    fn ranked_objects_report_their_order_parameter() {
        let rule = summarize::<PrecedenceTable<FirewallRule>>(ObjectType::FirewallRule);
        assert_eq!(rule.order_param, Some("Order"));
        let pool = summarize::<PrecedenceTable<DhcpConditionalServingPool>>(ObjectType::ConditionalPool);
        assert_eq!(pool.order_param, Some("PoolOrder"));
        let chain = summarize::<Table<Chain>>(ObjectType::FirewallChain);
        assert_eq!(chain.order_param, None);
    }

    #[test]
    fn unique_tuples_are_listed() {
        let mapping = summarize::<Table<PortMapping>>(ObjectType::PortMapping);
        assert_eq!(mapping.unique, vec!["RemoteHost+ExternalPort+PortMappingProtocol"]);
        let subscription = summarize::<Table<Subscription>>(ObjectType::MqttSubscription);
        assert_eq!(subscription.unique, vec!["Topic"]);
        assert_eq!(object_name(ObjectType::DhcpStaticAddress), "dhcp-static-address");
    }

    #[test]
    fn only_lease_rows_are_device_created() {
        assert!(device_created::<DhcpClient>());
        assert!(!device_created::<PortMapping>());
        assert!(!device_created::<Subscription>());
    }

    #[test]
    fn every_object_resolves_to_a_table() {
        for object in <ObjectType as clap::ValueEnum>::value_variants() {
            let summary = for_object!(*object, summarize(*object));
            assert!(summary.path.ends_with("{i}."), "{}", summary.path);
            assert!(summary.writable > 0);
        }
    }
}
