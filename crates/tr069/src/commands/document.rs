//! Document commands: `params`, `validate`, `set`, `add`, `delete`.
//!
//! Each loads a table document, runs one table operation against it and
//! either prints the result or, with `--write`, saves it back.

use std::path::Path;

use serde::Serialize;
use tabled::Tabled;

use tr069_core::model::InstanceNumber;
use tr069_core::{ManagedEntity, Origin, ParamValue, ParameterFault, set_parameter_values, validate};

use super::objects::{RowStore, default_prefix, device_created, for_object, object_name};
use super::util::{self, ParamEntry};
use crate::cli::{AddArgs, DeleteArgs, DocumentArgs, SetArgs};
use crate::config::Context;
use crate::error::CliError;
use crate::output;

// ── Shared rendering ─────────────────────────────────────────────────

/// `prefix` with a trailing dot, as table paths are written.
fn normalize_prefix(prefix: &str) -> String {
    if prefix.is_empty() || prefix.ends_with('.') {
        prefix.to_owned()
    } else {
        format!("{prefix}.")
    }
}

fn entries<S: RowStore>(store: &S, prefix: &str, only: Option<InstanceNumber>) -> Vec<ParamEntry> {
    let row_prefix = only.map(|instance| format!("{prefix}{instance}."));
    store
        .table()
        .parameters(prefix)
        .into_iter()
        .filter(|(path, _)| row_prefix.as_ref().is_none_or(|p| path.starts_with(p.as_str())))
        .map(|(path, value)| ParamEntry::new(path, value))
        .collect()
}

/// Print the changed document, or save it and report where.
fn finish<S: RowStore>(
    store: &S,
    path: &Path,
    write: bool,
    summary: &str,
    only: Option<InstanceNumber>,
    ctx: &Context,
) -> Result<String, CliError> {
    if write {
        util::save_document(path, store)?;
        return Ok(format!("{summary} ({})", path.display()));
    }
    let prefix = default_prefix(S::Row::OBJECT_NAME);
    output::render_single(ctx.output, store, |store| {
        util::param_listing(ctx.output, &entries(store, &prefix, only))
    })
}

// ── params ───────────────────────────────────────────────────────────

fn list_params<S: RowStore>(args: &DocumentArgs, ctx: &Context) -> Result<String, CliError> {
    let store: S = util::load_document(&args.file, &ctx.options)?;
    let prefix = args
        .prefix
        .as_deref()
        .map_or_else(|| default_prefix(S::Row::OBJECT_NAME), normalize_prefix);
    let listing = entries(&store, &prefix, None);
    output::render_single(ctx.output, &listing, |listing| {
        util::param_listing(ctx.output, listing)
    })
}

pub fn handle_params(args: &DocumentArgs, ctx: &Context) -> Result<(), CliError> {
    let out = for_object!(args.object, list_params(args, ctx))?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}

// ── validate ─────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct Finding {
    instance: u32,
    parameter: String,
    code: u32,
    message: String,
}

#[derive(Tabled)]
struct FindingRow {
    #[tabled(rename = "Row")]
    instance: u32,
    #[tabled(rename = "Parameter")]
    parameter: String,
    #[tabled(rename = "Fault")]
    code: String,
    #[tabled(rename = "Problem")]
    message: String,
}

impl Finding {
    fn from_fault(instance: InstanceNumber, fault: ParameterFault) -> Self {
        Self {
            instance: instance.get(),
            parameter: fault.parameter,
            code: fault.code.code(),
            message: fault.message,
        }
    }
}

fn findings<S: RowStore>(store: &S) -> Vec<Finding> {
    let table = store.table();
    let mut found: Vec<Finding> = table
        .iter()
        .flat_map(|(instance, row)| {
            validate(row)
                .into_iter()
                .map(move |fault| Finding::from_fault(instance, fault))
        })
        .collect();

    for (instance, faults) in table.invariant_violations() {
        found.extend(
            faults
                .into_iter()
                .map(|fault| Finding::from_fault(instance, fault)),
        );
    }
    found.sort_by_key(|f| f.instance);
    found
}

fn check_document<S: RowStore>(args: &DocumentArgs, ctx: &Context) -> Result<(String, usize), CliError> {
    let store: S = util::load_document(&args.file, &ctx.options)?;
    let found = findings(&store);
    tracing::debug!(rows = store.table().len(), problems = found.len(), "document checked");

    let color = output::should_color(ctx.color);
    let out = if found.is_empty() && matches!(ctx.output, crate::cli::OutputFormat::Table) {
        format!("{}: {} row(s) valid", args.file.display(), store.table().len())
    } else {
        output::render_list(
            ctx.output,
            &found,
            |f| FindingRow {
                instance: f.instance,
                parameter: f.parameter.clone(),
                code: output::paint_fault(f.code, color),
                message: f.message.clone(),
            },
            |f| format!("{}\t{}\t{}", f.parameter, f.code, f.message),
        )?
    };
    Ok((out, found.len()))
}

pub fn handle_validate(args: &DocumentArgs, ctx: &Context) -> Result<(), CliError> {
    let (out, count) = for_object!(args.object, check_document(args, ctx))?;
    output::print_output(&out, ctx.quiet);
    if count > 0 {
        return Err(CliError::InvalidDocument { count });
    }
    Ok(())
}

// ── set ──────────────────────────────────────────────────────────────

fn set_row<S: RowStore>(args: &SetArgs, ctx: &Context) -> Result<String, CliError> {
    let object = object_name(args.object);
    let mut store: S = util::load_document(&args.file, &ctx.options)?;
    let updates = util::parse_assignments(&args.values)?;
    let instance =
        util::resolve_row(&store, &args.row).map_err(|e| CliError::from_core(e, &object))?;
    let origin = if args.as_device {
        Origin::Device
    } else {
        Origin::Controller
    };

    store
        .set_values(instance, &updates, origin)
        .map_err(|e| CliError::from_core(e, &object))?;
    tracing::info!(%instance, count = updates.len(), ?origin, "parameters set");

    let summary = format!(
        "Set {} parameter(s) on {}{instance}.",
        updates.len(),
        default_prefix(S::Row::OBJECT_NAME)
    );
    finish(&store, &args.file, args.write, &summary, Some(instance), ctx)
}

pub fn handle_set(args: &SetArgs, ctx: &Context) -> Result<(), CliError> {
    let out = for_object!(args.object, set_row(args, ctx))?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}

// ── add ──────────────────────────────────────────────────────────────

/// Rank for a new row: `--order`, else an explicit rank assignment.
fn requested_order<S: RowStore>(
    args: &AddArgs,
    row: &S::Row,
    updates: &[(String, String)],
) -> Result<Option<u32>, CliError> {
    let Some(param) = S::order_param() else {
        if args.order.is_some() {
            return Err(CliError::Validation {
                field: "--order".into(),
                reason: format!("{} rows are not ranked", object_name(args.object)),
            });
        }
        return Ok(None);
    };
    if args.order.is_some() {
        return Ok(args.order);
    }
    if !updates.iter().any(|(name, _)| name == param) {
        return Ok(None);
    }
    Ok(match row.get(param) {
        Some(ParamValue::UnsignedInt(order)) => u32::try_from(order).ok(),
        _ => None,
    })
}

fn add_row<S: RowStore>(args: &AddArgs, ctx: &Context) -> Result<String, CliError> {
    let object = object_name(args.object);
    if !args.as_device && device_created::<S::Row>() {
        return Err(CliError::DeviceOwned { object });
    }
    let origin = if args.as_device {
        Origin::Device
    } else {
        Origin::Controller
    };
    let mut store: S = util::load_or_create_document(&args.file, &ctx.options)?;
    let updates = util::parse_assignments(&args.values)?;

    let mut row = S::Row::default();
    set_parameter_values(&mut row, &updates, origin)
        .map_err(|fault| CliError::from_core(fault.into(), &object))?;
    let order = requested_order::<S>(args, &row, &updates)?;

    let instance = store
        .add_row(row, order)
        .map_err(|e| CliError::from_core(e, &object))?;
    tracing::info!(%instance, ?order, "row added");

    let summary = format!("Added {}{instance}.", default_prefix(S::Row::OBJECT_NAME));
    finish(&store, &args.file, args.write, &summary, Some(instance), ctx)
}

pub fn handle_add(args: &AddArgs, ctx: &Context) -> Result<(), CliError> {
    let out = for_object!(args.object, add_row(args, ctx))?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}

// ── delete ───────────────────────────────────────────────────────────

fn delete_row<S: RowStore>(args: &DeleteArgs, ctx: &Context) -> Result<String, CliError> {
    let object = object_name(args.object);
    let mut store: S = util::load_document(&args.file, &ctx.options)?;
    let instance =
        util::resolve_row(&store, &args.row).map_err(|e| CliError::from_core(e, &object))?;
    let path = format!("{}{instance}.", default_prefix(S::Row::OBJECT_NAME));

    if args.write
        && !util::confirm(
            &format!("Delete {path} from {}?", args.file.display()),
            ctx.yes,
        )?
    {
        return Ok(String::new());
    }

    store
        .delete_row(instance)
        .map_err(|e| CliError::from_core(e, &object))?;
    tracing::info!(%instance, "row deleted");

    finish(&store, &args.file, args.write, &format!("Deleted {path}"), None, ctx)
}

pub fn handle_delete(args: &DeleteArgs, ctx: &Context) -> Result<(), CliError> {
    let out = for_object!(args.object, delete_row(args, ctx))?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tr069_core::model::{FirewallRule, PortMapping};
    use tr069_core::{PrecedenceTable, Table};

    use super::*;

    #[test]
    fn prefixes_gain_a_trailing_dot() {
        assert_eq!(normalize_prefix("Device.NAT.PortMapping"), "Device.NAT.PortMapping.");
        assert_eq!(normalize_prefix("Device.NAT.PortMapping."), "Device.NAT.PortMapping.");
        assert_eq!(normalize_prefix(""), "");
    }

    #[test]
    fn entries_can_focus_on_one_row() {
        let mut table = Table::<PortMapping>::new();
        let first = table.add(PortMapping::default()).unwrap();
        let second = table
            .add(PortMapping {
                external_port: 8080,
                ..PortMapping::default()
            })
            .unwrap();

        let all = entries(&table, "NAT.PortMapping.", None);
        let one = entries(&table, "NAT.PortMapping.", Some(second));
        assert_eq!(all.len(), 2 * one.len());
        assert!(one.iter().all(|e| e.parameter.starts_with("NAT.PortMapping.2.")));
        assert!(all.iter().any(|e| e.parameter == format!("NAT.PortMapping.{first}.Alias")));
    }

    #[test]
    fn findings_report_out_of_range_fields() {
        let table: PrecedenceTable<FirewallRule> = serde_json::from_value(serde_json::json!({
            "1": { "Alias": "web", "Order": 1, "DestPort": 70000 },
            "2": { "Alias": "ssh", "Order": 2 }
        }))
        .unwrap();
        let found = findings(&table);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].instance, 1);
        assert_eq!(found[0].parameter, "DestPort");
        assert_eq!(found[0].code, 9007);
    }

    #[test]
    fn findings_report_alias_clashes() {
        let table: Table<PortMapping> = serde_json::from_value(serde_json::json!({
            "1": { "Alias": "web", "ExternalPort": 80 },
            "2": { "Alias": "web", "ExternalPort": 81 },
            "3": { "Alias": "" }
        }))
        .unwrap();
        let found = findings(&table);
        let params: Vec<(u32, &str)> = found.iter().map(|f| (f.instance, f.parameter.as_str())).collect();
        assert_eq!(params, vec![(1, "Alias"), (2, "Alias"), (3, "Alias")]);
    }
}
