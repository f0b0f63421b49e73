#![allow(clippy::unwrap_used)]
// Table, precedence-table and shared-store behaviour.

use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;

use tr069_core::model::{DhcpConditionalServingPool, FirewallRule, PortMapping, Subscription};
use tr069_core::{
    CoreError, DhcpRequest, FaultCode, InstanceNumber, MacAddress, ModelOptions, Origin,
    PrecedenceTable, SharedTable, Table,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn pool(name: &str) -> DhcpConditionalServingPool {
    DhcpConditionalServingPool {
        enable: true,
        domain_name: name.into(),
        ..DhcpConditionalServingPool::default()
    }
}

fn ranking(table: &PrecedenceTable<DhcpConditionalServingPool>) -> Vec<(String, u32)> {
    table
        .by_order()
        .into_iter()
        .map(|(_, p)| (p.domain_name.clone(), p.pool_order))
        .collect()
}

fn pools(names: &[&str]) -> (PrecedenceTable<DhcpConditionalServingPool>, Vec<InstanceNumber>) {
    let mut table = PrecedenceTable::new();
    let instances = names
        .iter()
        .map(|name| table.insert(pool(name), None).unwrap())
        .collect();
    (table, instances)
}

fn owned(pairs: &[(&str, u32)]) -> Vec<(String, u32)> {
    pairs.iter().map(|(n, o)| ((*n).to_owned(), *o)).collect()
}

// ── Precedence ──────────────────────────────────────────────────────

#[test]
fn test_insert_at_existing_rank_shifts_lower_precedence() {
    let (mut table, _) = pools(&["a", "b", "c"]);
    table.insert(pool("new"), Some(2)).unwrap();
    assert_eq!(
        ranking(&table),
        owned(&[("a", 1), ("new", 2), ("b", 3), ("c", 4)])
    );
}

#[test]
fn test_remove_compacts_ranking() {
    let (mut table, instances) = pools(&["a", "b", "c", "d"]);
    table.remove(instances[1]).unwrap();
    assert_eq!(ranking(&table), owned(&[("a", 1), ("c", 2), ("d", 3)]));
}

#[test]
fn test_first_match_uses_rank_not_creation_order() {
    let (mut table, instances) = pools(&["catch-all", "phones"]);
    table
        .set_parameter_values(
            instances[1],
            &[("VendorClassID", "android-dhcp"), ("VendorClassIDMode", "Prefix")],
            Origin::Controller,
        )
        .unwrap();

    let request = DhcpRequest {
        interface: "InternetGatewayDevice.LANDevice.1".into(),
        vendor_class_id: Some("android-dhcp-14".into()),
        client_id: None,
        user_class_id: None,
        chaddr: MacAddress::parse("02:00:00:00:00:01").unwrap(),
    };

    let (_, hit) = table.first_match_for(&request).unwrap();
    assert_eq!(hit.domain_name, "catch-all");

    table
        .set_parameter_values(instances[1], &[("PoolOrder", "1")], Origin::Controller)
        .unwrap();
    let (_, hit) = table.first_match_for(&request).unwrap();
    assert_eq!(hit.domain_name, "phones");
    assert_eq!(ranking(&table), owned(&[("phones", 1), ("catch-all", 2)]));
}

#[test]
fn test_controller_rank_zero_is_rejected() {
    let (mut table, instances) = pools(&["a", "b"]);
    let err = table
        .set_parameter_values(instances[0], &[("PoolOrder", "0")], Origin::Controller)
        .unwrap_err();
    assert_eq!(err.fault_code(), FaultCode::InvalidArguments);
    assert_eq!(err.parameter_faults()[0].code, FaultCode::InvalidParameterValue);
    assert_eq!(ranking(&table), owned(&[("a", 1), ("b", 2)]));
}

#[test]
fn test_expired_rules_are_purged_and_ranking_compacted() {
    let now = Utc::now();
    let mut rules = PrecedenceTable::new();
    rules.insert(FirewallRule::default(), None).unwrap();
    rules
        .insert(
            FirewallRule {
                expiry_date: now - Duration::minutes(5),
                ..FirewallRule::default()
            },
            None,
        )
        .unwrap();
    let last = rules.insert(FirewallRule::default(), None).unwrap();

    let purged = rules.purge_expired(now);
    assert_eq!(purged.len(), 1);
    assert_eq!(rules.get(last).unwrap().order, 2);
}

// ── Identity ────────────────────────────────────────────────────────

#[test]
fn test_instance_numbers_are_never_reused() {
    let mut table: Table<Subscription> = Table::new();
    let first = table.add(Subscription::default()).unwrap();
    let second = table.add(Subscription::default()).unwrap();
    table.remove(second).unwrap();
    let third = table.add(Subscription::default()).unwrap();

    assert_eq!(first.get(), 1);
    assert_eq!(third.get(), 3);
    assert_eq!(table.instance_numbers(), vec![first, third]);
}

#[test]
fn test_aliases_are_assigned_and_resolvable() {
    let options = ModelOptions {
        alias_prefix: "dev-".into(),
        ..ModelOptions::default()
    };
    let mut table: Table<Subscription> = Table::with_options(options);
    let auto = table.add(Subscription::default()).unwrap();
    let named = table
        .add(Subscription {
            alias: "telemetry".into(),
            ..Subscription::default()
        })
        .unwrap();

    assert_eq!(table.get(auto).unwrap().alias, "dev-1");
    assert_eq!(table.resolve("telemetry").unwrap(), named);
    assert!(matches!(
        table.resolve("nope"),
        Err(CoreError::AliasNotFound { .. })
    ));

    // Renaming keeps the index current.
    table
        .set_parameter_values(named, &[("Alias", "metrics")], Origin::Controller)
        .unwrap();
    assert!(table.get_by_alias("telemetry").is_none());
    assert_eq!(table.get_by_alias("metrics").unwrap().0, named);
}

#[test]
fn test_alias_clash_and_syntax_are_faults() {
    let mut table: Table<Subscription> = Table::new();
    let a = table.add(Subscription::default()).unwrap();
    table.add(Subscription::default()).unwrap();

    let err = table
        .set_parameter_values(a, &[("Alias", "cpe-2")], Origin::Controller)
        .unwrap_err();
    assert_eq!(err.parameter_faults()[0].parameter, "1.Alias");

    let err = table
        .set_parameter_values(a, &[("Alias", "9lives")], Origin::Controller)
        .unwrap_err();
    assert_eq!(err.parameter_faults()[0].code, FaultCode::InvalidParameterValue);

    assert!(matches!(
        table.add(Subscription {
            alias: "cpe-1".into(),
            ..Subscription::default()
        }),
        Err(CoreError::DuplicateAlias { .. })
    ));
}

#[test]
fn test_device_alias_skips_controller_chosen_names() {
    let mut table: Table<Subscription> = Table::new();
    let first = table.add(Subscription::default()).unwrap();
    table
        .set_parameter_values(first, &[("Alias", "cpe-2")], Origin::Controller)
        .unwrap();

    let second = table.add(Subscription::default()).unwrap();
    let third = table.add(Subscription::default()).unwrap();
    assert_eq!(table.get(second).unwrap().alias, "cpe-2-1");
    assert_eq!(table.get(third).unwrap().alias, "cpe-3");
    assert_eq!(table.resolve("cpe-2").unwrap(), first);
    assert_eq!(table.resolve("cpe-2-1").unwrap(), second);
}

fn shared_alias_table() -> Table<Subscription> {
    serde_json::from_value(serde_json::json!({
        "1": { "Enable": false, "Alias": "web", "Topic": "a/#" },
        "2": { "Enable": false, "Alias": "web", "Topic": "b/#" }
    }))
    .unwrap()
}

#[test]
fn test_removing_a_duplicate_alias_keeps_the_survivor_resolvable() {
    for doomed in [1, 2] {
        let mut table = shared_alias_table();
        let doomed = InstanceNumber::new(doomed).unwrap();
        table.remove(doomed).unwrap();

        let survivor = table.instance_numbers()[0];
        assert_eq!(table.resolve("web").unwrap(), survivor);
        assert!(table.invariant_violations().is_empty());
    }
}

#[test]
fn test_renaming_a_duplicate_alias_keeps_the_other_resolvable() {
    for renamed in [1, 2] {
        let mut table = shared_alias_table();
        let renamed = InstanceNumber::new(renamed).unwrap();
        table
            .update_with(renamed, |row| row.alias = "api".into())
            .unwrap();

        let other = table
            .instance_numbers()
            .into_iter()
            .find(|n| *n != renamed)
            .unwrap();
        assert_eq!(table.resolve("web").unwrap(), other);
        assert_eq!(table.resolve("api").unwrap(), renamed);
    }
}

#[test]
fn test_max_entries_is_resources_exceeded() {
    let mut table: Table<PortMapping> = Table::with_options(ModelOptions {
        max_entries: Some(1),
        ..ModelOptions::default()
    });
    table.add(PortMapping::default()).unwrap();
    let err = table.add(PortMapping::default()).unwrap_err();
    assert_eq!(err.fault_code(), FaultCode::ResourcesExceeded);
}

// ── Uniqueness ──────────────────────────────────────────────────────

#[test]
fn test_enabling_a_clashing_row_names_the_whole_tuple() {
    let mut table: Table<PortMapping> = Table::new();
    let live = PortMapping {
        enabled: true,
        external_port: 8080,
        ..PortMapping::default()
    };
    table.add(live.clone()).unwrap();
    let idle = table
        .add(PortMapping {
            enabled: false,
            ..live
        })
        .unwrap();

    let err = table
        .set_parameter_values(idle, &[("PortMappingEnabled", "true")], Origin::Controller)
        .unwrap_err();
    let names: Vec<_> = err
        .parameter_faults()
        .iter()
        .map(|f| f.parameter.clone())
        .collect();
    assert_eq!(
        names,
        vec![
            format!("{idle}.RemoteHost"),
            format!("{idle}.ExternalPort"),
            format!("{idle}.PortMappingProtocol"),
        ]
    );
    assert!(!table.get(idle).unwrap().enabled);
    assert!(table.invariant_violations().is_empty());
}

#[test]
fn test_parameter_paths_use_instance_numbers() {
    let mut table: Table<Subscription> = Table::new();
    table.add(Subscription::default()).unwrap();
    let names = table.parameter_names("Device.MQTT.Client.1.Subscription.");
    assert_eq!(names[0], "Device.MQTT.Client.1.Subscription.1.Enable");
    assert_eq!(names.len(), 5);
}

// ── Shared store ────────────────────────────────────────────────────

#[tokio::test]
async fn test_shared_table_publishes_committed_writes_only() {
    let shared = SharedTable::new(PrecedenceTable::<FirewallRule>::new());
    let mut rx = shared.subscribe();

    shared
        .write(|rules| rules.insert(FirewallRule::default(), None))
        .unwrap();
    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().len(), 1);
    assert_eq!(shared.version(), 1);

    let err = shared.write(|rules| {
        rules.insert(FirewallRule::default(), None)?;
        rules.insert(FirewallRule::default(), Some(0))
    });
    assert!(matches!(err, Err(CoreError::InvalidOrder { value: 0, .. })));
    assert!(!rx.has_changed().unwrap());
    assert_eq!(shared.read(|rules| rules.len()), 1);
    assert_eq!(shared.snapshot().len(), 1);
}
