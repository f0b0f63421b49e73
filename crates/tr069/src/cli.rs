//! Clap derive structures for the `tr069` CLI.
//!
//! Also compiled by `build.rs` for man pages, so this file may only
//! depend on clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// tr069 -- inspect and edit TR-069 data-model tables
#[derive(Debug, Parser)]
#[command(
    name = "tr069",
    version,
    about = "Inspect and edit TR-069 data-model tables",
    long_about = "Inspect and edit TR-069 data-model tables.\n\n\
        Works on table documents (JSON or YAML maps of instance number to row)\n\
        for the CWMP objects this tool models. Writes are checked the way a\n\
        device checks SetParameterValues from its ACS: access mode, bounds,\n\
        mode gates, alias and uniqueness rules, and precedence ordering.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "TR069_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format (overrides `defaults.output` from the config)
    #[arg(long, short = 'o', env = "TR069_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output (overrides `defaults.color`)
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Object types ─────────────────────────────────────────────────────

/// Table objects the tool knows the schema of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ObjectType {
    /// Device.Firewall.Chain.{i}.
    #[value(alias = "chain")]
    FirewallChain,
    /// Device.Firewall.Chain.{i}.Rule.{i}.
    #[value(alias = "rule")]
    FirewallRule,
    /// Device.DHCPv4.Server.Pool.{i}.
    DhcpPool,
    /// Device.DHCPv4.Server.Pool.{i}.StaticAddress.{i}.
    DhcpStaticAddress,
    /// Device.DHCPv4.Server.Pool.{i}.Client.{i}.
    DhcpClient,
    /// DHCPConditionalServingPool.{i}.
    ConditionalPool,
    /// WANIPConnection.{i}.PortMapping.{i}.
    PortMapping,
    /// Device.IP.Interface.{i}.
    IpInterface,
    /// Device.IP.Interface.{i}.IPv4Address.{i}.
    Ipv4Address,
    /// Device.IP.Interface.{i}.IPv6Prefix.{i}.
    Ipv6Prefix,
    /// Device.MQTT.Client.{i}.
    MqttClient,
    /// Device.MQTT.Client.{i}.Subscription.{i}.
    MqttSubscription,
    /// STBService.{i}.Components.AudioOutput.{i}.
    AudioOutput,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the object types and their table rules
    #[command(alias = "ls")]
    Objects,

    /// Show the parameter schema of an object
    Schema(ObjectArgs),

    /// Show the default values of a new row
    Defaults(ObjectArgs),

    /// List every parameter path and value in a table document
    #[command(alias = "get")]
    Params(DocumentArgs),

    /// Check a table document against the schema and table rules
    Validate(DocumentArgs),

    /// Apply SetParameterValues to one row
    Set(SetArgs),

    /// Add a row (AddObject), optionally with initial values
    Add(AddArgs),

    /// Delete a row (DeleteObject)
    #[command(alias = "rm")]
    Delete(DeleteArgs),

    /// Manage the tr069 configuration file
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SCHEMA / DOCUMENTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ObjectArgs {
    /// Object type
    pub object: ObjectType,
}

#[derive(Debug, Args)]
pub struct DocumentArgs {
    /// Object type of the table's rows
    pub object: ObjectType,

    /// Table document (.json, .yaml or .yml)
    pub file: PathBuf,

    /// Path prefix for listed parameters (default: the object path with
    /// parent instances set to 1)
    #[arg(long)]
    pub prefix: Option<String>,
}

#[derive(Debug, Args)]
pub struct SetArgs {
    /// Object type of the table's rows
    pub object: ObjectType,

    /// Table document (.json, .yaml or .yml)
    pub file: PathBuf,

    /// Row to write: instance number or alias
    pub row: String,

    /// Parameter assignments (Name=Value)
    #[arg(required = true)]
    pub values: Vec<String>,

    /// Write as the device itself, bypassing access mode and mode gates
    #[arg(long)]
    pub as_device: bool,

    /// Save the result back to the document instead of printing it
    #[arg(long, short = 'w')]
    pub write: bool,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Object type of the table's rows
    pub object: ObjectType,

    /// Table document (.json, .yaml or .yml); created if missing
    pub file: PathBuf,

    /// Initial parameter values (Name=Value)
    pub values: Vec<String>,

    /// Rank of the new row in a precedence table (default: last)
    #[arg(long)]
    pub order: Option<u32>,

    /// Create the row as the device itself; required for device-created
    /// tables such as DHCP leases
    #[arg(long)]
    pub as_device: bool,

    /// Save the result back to the document instead of printing it
    #[arg(long, short = 'w')]
    pub write: bool,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Object type of the table's rows
    pub object: ObjectType,

    /// Table document (.json, .yaml or .yml)
    pub file: PathBuf,

    /// Row to delete: instance number or alias
    pub row: String,

    /// Save the result back to the document instead of printing it
    #[arg(long, short = 'w')]
    pub write: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a config file with the default settings
    Init,

    /// Display current resolved configuration
    Show,

    /// Print the config file path
    Path,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
