//! `schema` and `defaults`: descriptor tables and new-row values.

use tabled::Tabled;

use tr069_core::{FieldDescriptor, ManagedEntity, to_parameter_map};

use super::objects::{RowStore, for_object};
use super::util::{ParamEntry, param_listing};
use crate::cli::ObjectArgs;
use crate::config::Context;
use crate::error::CliError;
use crate::output;

// ── Schema ───────────────────────────────────────────────────────────

#[derive(Tabled)]
struct SchemaRow {
    #[tabled(rename = "Parameter")]
    name: &'static str,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Access")]
    access: String,
    #[tabled(rename = "Notify")]
    notify: String,
    #[tabled(rename = "Writable When")]
    gates: String,
}

fn schema_row(descriptor: &FieldDescriptor, color: bool) -> SchemaRow {
    let gates = if descriptor.gates.is_empty() {
        "-".into()
    } else {
        descriptor
            .gates
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };
    SchemaRow {
        name: descriptor.name,
        kind: descriptor.kind.type_name(),
        access: output::paint_access(descriptor.access, color),
        notify: descriptor.notify.to_string(),
        gates,
    }
}

fn show_schema<S: RowStore>(ctx: &Context) -> Result<String, CliError> {
    let color = output::should_color(ctx.color);
    output::render_list(
        ctx.output,
        S::Row::descriptors(),
        |d| schema_row(d, color),
        |d| format!("{}\t{}\t{}", d.name, d.kind.type_name(), d.access),
    )
}

pub fn handle_schema(args: &ObjectArgs, ctx: &Context) -> Result<(), CliError> {
    tracing::debug!(object = ?args.object, "rendering schema");
    let out = for_object!(args.object, show_schema(ctx))?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}

// ── Defaults ─────────────────────────────────────────────────────────

fn show_defaults<S: RowStore>(ctx: &Context) -> Result<String, CliError> {
    let row = S::Row::default();
    output::render_single(ctx.output, &row, |row| {
        let entries: Vec<ParamEntry> = to_parameter_map(row)
            .into_iter()
            .map(|(name, value)| ParamEntry::new(name, value))
            .collect();
        param_listing(ctx.output, &entries)
    })
}

pub fn handle_defaults(args: &ObjectArgs, ctx: &Context) -> Result<(), CliError> {
    let out = for_object!(args.object, show_defaults(ctx))?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}
