//! Integration tests for the `tr069` CLI binary.
//!
//! Every test runs against table documents in a temporary directory, with
//! config lookup pointed away from the user's real configuration.
#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `tr069` binary with env isolation.
fn tr069_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("tr069");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("TR069_CONFIG")
        .env_remove("TR069_OUTPUT")
        .env_remove("TR069_MODEL__ALIAS_PREFIX")
        .env_remove("TR069_MODEL__MAX_ENTRIES")
        .env_remove("RUST_LOG");
    cmd
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Three firewall rules ranked 1..=3, written to `rules.json`.
fn three_rules(dir: &TempDir) -> PathBuf {
    let file = dir.path().join("rules.json");
    for description in ["web", "ssh", "dns"] {
        tr069_cmd(dir.path())
            .args(["add", "firewall-rule"])
            .arg(&file)
            .arg(format!("Description={description}"))
            .arg("--write")
            .assert()
            .success();
    }
    file
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let dir = TempDir::new().unwrap();
    let output = tr069_cmd(dir.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    tr069_cmd(dir.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("TR-069")
            .and(predicate::str::contains("schema"))
            .and(predicate::str::contains("validate")),
    );
}

#[test]
fn test_version_flag() {
    let dir = TempDir::new().unwrap();
    tr069_cmd(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("tr069"));
}

#[test]
fn test_completions_bash() {
    let dir = TempDir::new().unwrap();
    tr069_cmd(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Schema ──────────────────────────────────────────────────────────

#[test]
fn test_objects_lists_paths() {
    let dir = TempDir::new().unwrap();
    tr069_cmd(dir.path())
        .args(["objects", "-o", "plain"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("firewall-rule\tDevice.Firewall.Chain.{i}.Rule.{i}.")
                .and(predicate::str::contains("mqtt-subscription")),
        );
}

#[test]
fn test_schema_shows_types_and_access() {
    let dir = TempDir::new().unwrap();
    tr069_cmd(dir.path())
        .args(["schema", "port-mapping", "-o", "plain"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("ExternalPort\tunsignedInt[0:65535]\tW")
                .and(predicate::str::contains("PortMappingProtocol\tstring{TCP|UDP}\tW")),
        );
}

#[test]
fn test_defaults_use_wire_names() {
    let dir = TempDir::new().unwrap();
    let output = tr069_cmd(dir.path())
        .args(["defaults", "audio-output", "-o", "plain"])
        .output()
        .unwrap();
    assert!(output.status.success());
    insta::assert_snapshot!(String::from_utf8_lossy(&output.stdout).trim_end(), @r"
    Enable=false
    Status=Disabled
    Alias=
    Name=
    AudioFormat=ANALOG-2-CHANNEL
    AudioLevel=50
    CancelMute=false
    SCARTs=
    ");
}

#[test]
fn test_defaults_as_json() {
    let dir = TempDir::new().unwrap();
    let output = tr069_cmd(dir.path())
        .args(["defaults", "mqtt-client", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["BrokerPort"], 1883);
    assert_eq!(json["KeepAliveTime"], 60);
    assert_eq!(json["CleanSession"], true);
}

// ── add / set / delete ──────────────────────────────────────────────

#[test]
fn test_add_creates_document_with_device_alias() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("mappings.json");
    tr069_cmd(dir.path())
        .args(["add", "port-mapping"])
        .arg(&file)
        .args(["PortMappingEnabled=true", "ExternalPort=443", "InternalClient=10.0.0.2"])
        .arg("--write")
        .assert()
        .success()
        .stdout(predicate::str::contains("Added"));

    let json = read_json(&file);
    assert_eq!(json["1"]["Alias"], "cpe-1");
    assert_eq!(json["1"]["ExternalPort"], 443);
    assert_eq!(json["1"]["PortMappingProtocol"], "TCP");
}

#[test]
fn test_add_device_created_row_needs_as_device() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("leases.json");
    tr069_cmd(dir.path())
        .args(["add", "dhcp-client"])
        .arg(&file)
        .args(["Chaddr=00:11:22:33:44:55", "--write"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("created by the device"));
    assert!(!file.exists());

    tr069_cmd(dir.path())
        .args(["add", "dhcp-client"])
        .arg(&file)
        .args(["Chaddr=00:11:22:33:44:55", "IPAddress=192.168.1.20", "--as-device", "--write"])
        .assert()
        .success();
    let json = read_json(&file);
    assert_eq!(json["1"]["Chaddr"], "00:11:22:33:44:55");
    assert_eq!(json["1"]["Alias"], "cpe-1");
}

#[test]
fn test_add_duplicate_enabled_mapping_conflicts() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("mappings.json");
    let add = || {
        let mut cmd = tr069_cmd(dir.path());
        cmd.args(["add", "port-mapping"])
            .arg(&file)
            .args(["PortMappingEnabled=true", "ExternalPort=8080"])
            .arg("--write");
        cmd
    };
    add().assert().success();
    add()
        .assert()
        .code(6)
        .stderr(predicate::str::contains("uniqueness"));
    assert_eq!(read_json(&file).as_object().unwrap().len(), 1);
}

#[test]
fn test_set_read_only_parameter_is_rejected() {
    let dir = TempDir::new().unwrap();
    let file = three_rules(&dir);
    tr069_cmd(dir.path())
        .args(["set", "firewall-rule"])
        .arg(&file)
        .args(["1", "Status=Enabled"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("1.Status").and(predicate::str::contains("9008")));

    // The device itself may write it.
    tr069_cmd(dir.path())
        .args(["set", "firewall-rule"])
        .arg(&file)
        .args(["1", "Status=Enabled", "--as-device", "-o", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Device.Firewall.Chain.1.Rule.1.Status=Enabled"));
}

#[test]
fn test_set_gated_parameter_follows_its_mode() {
    let dir = TempDir::new().unwrap();
    let file = three_rules(&dir);
    tr069_cmd(dir.path())
        .args(["set", "firewall-rule"])
        .arg(&file)
        .args(["cpe-2", "TargetChain=Device.Firewall.Chain.2."])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("2.TargetChain"));

    tr069_cmd(dir.path())
        .args(["set", "firewall-rule"])
        .arg(&file)
        .args(["cpe-2", "Target=TargetChain", "TargetChain=Device.Firewall.Chain.2."])
        .arg("--write")
        .assert()
        .success();
    assert_eq!(read_json(&file)["2"]["TargetChain"], "Device.Firewall.Chain.2.");
}

#[test]
fn test_add_at_rank_shifts_later_rules() {
    let dir = TempDir::new().unwrap();
    let file = three_rules(&dir);
    tr069_cmd(dir.path())
        .args(["add", "firewall-rule"])
        .arg(&file)
        .args(["Description=first", "--order", "1", "--write"])
        .assert()
        .success();

    let json = read_json(&file);
    let ranks: Vec<(String, u64)> = ["1", "2", "3", "4"]
        .iter()
        .map(|i| {
            (
                json[i]["Description"].as_str().unwrap().to_owned(),
                json[i]["Order"].as_u64().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        ranks,
        vec![
            ("web".to_owned(), 2),
            ("ssh".to_owned(), 3),
            ("dns".to_owned(), 4),
            ("first".to_owned(), 1),
        ]
    );
}

#[test]
fn test_order_on_unranked_object_is_usage_error() {
    let dir = TempDir::new().unwrap();
    tr069_cmd(dir.path())
        .args(["add", "mqtt-client"])
        .arg(dir.path().join("clients.json"))
        .args(["--order", "1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not ranked"));
}

#[test]
fn test_delete_needs_confirmation_then_compacts() {
    let dir = TempDir::new().unwrap();
    let file = three_rules(&dir);
    tr069_cmd(dir.path())
        .args(["delete", "firewall-rule"])
        .arg(&file)
        .args(["1", "--write"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--yes"));

    tr069_cmd(dir.path())
        .args(["delete", "firewall-rule"])
        .arg(&file)
        .args(["1", "--write", "--yes"])
        .assert()
        .success();

    let json = read_json(&file);
    assert!(json.get("1").is_none());
    assert_eq!(json["2"]["Order"], 1);
    assert_eq!(json["3"]["Order"], 2);
}

#[test]
fn test_yaml_documents_round_trip() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("subscriptions.yaml");
    tr069_cmd(dir.path())
        .args(["add", "mqtt-subscription"])
        .arg(&file)
        .args(["Enable=true", "Topic=device/+/status", "QoS=1", "--write"])
        .assert()
        .success();

    let text = std::fs::read_to_string(&file).unwrap();
    assert!(text.contains("device/+/status"), "{text}");
    tr069_cmd(dir.path())
        .args(["params", "mqtt-subscription"])
        .arg(&file)
        .args(["-o", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Device.MQTT.Client.1.Subscription.1.QoS=1",
        ));
}

// ── validate ────────────────────────────────────────────────────────

#[test]
fn test_validate_reports_every_problem() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("rules.json");
    std::fs::write(
        &file,
        r#"{
            "1": { "Alias": "web", "Order": 1, "DestPort": 70000 },
            "2": { "Alias": "web", "Order": 2 }
        }"#,
    )
    .unwrap();

    let output = tr069_cmd(dir.path())
        .args(["validate", "firewall-rule"])
        .arg(&file)
        .args(["-o", "plain"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    let text = combined_output(&output);
    assert!(text.contains("DestPort\t9007"), "{text}");
    assert!(text.contains("Alias\t9007"), "{text}");
    assert!(text.contains("3 problem(s)"), "{text}");
}

#[test]
fn test_validate_accepts_written_document() {
    let dir = TempDir::new().unwrap();
    let file = three_rules(&dir);
    tr069_cmd(dir.path())
        .args(["validate", "firewall-rule"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("3 row(s) valid"));
}

#[test]
fn test_malformed_document_is_reported() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("broken.json");
    std::fs::write(&file, r#"{ "1": { "PortMappingProtocol": "SCTP" } }"#).unwrap();
    tr069_cmd(dir.path())
        .args(["params", "port-mapping"])
        .arg(&file)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid document"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_honors_flag() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("custom.toml");
    tr069_cmd(dir.path())
        .args(["config", "path", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("custom.toml"));
}

#[test]
fn test_config_init_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    tr069_cmd(dir.path())
        .args(["config", "init", "--config"])
        .arg(&path)
        .assert()
        .success();
    assert!(std::fs::read_to_string(&path).unwrap().contains("alias_prefix"));

    tr069_cmd(dir.path())
        .args(["config", "init", "--config"])
        .arg(&path)
        .assert()
        .code(6);
}

#[test]
fn test_alias_prefix_from_config_file() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "[model]\nalias_prefix = \"gw-\"\n").unwrap();
    let file = dir.path().join("clients.json");
    tr069_cmd(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["add", "mqtt-client"])
        .arg(&file)
        .arg("--write")
        .assert()
        .success();
    assert_eq!(read_json(&file)["1"]["Alias"], "gw-1");
}

#[test]
fn test_max_entries_from_env() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("outputs.json");
    let add = || {
        let mut cmd = tr069_cmd(dir.path());
        cmd.env("TR069_MODEL__MAX_ENTRIES", "1")
            .args(["add", "audio-output"])
            .arg(&file)
            .arg("--write");
        cmd
    };
    add().assert().success();
    add()
        .assert()
        .code(6)
        .stderr(predicate::str::contains("9004"));
}
