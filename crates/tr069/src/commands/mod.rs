//! Command dispatch: bridges CLI args to table operations and output.

pub mod config_cmd;
pub mod document;
pub mod objects;
pub mod schema;
pub mod util;

use crate::cli::Command;
use crate::config::Context;
use crate::error::CliError;

/// Dispatch a data-model command to its handler.
pub fn dispatch(cmd: &Command, ctx: &Context) -> Result<(), CliError> {
    match cmd {
        Command::Objects => objects::handle(ctx),
        Command::Schema(args) => schema::handle_schema(args, ctx),
        Command::Defaults(args) => schema::handle_defaults(args, ctx),
        Command::Params(args) => document::handle_params(args, ctx),
        Command::Validate(args) => document::handle_validate(args, ctx),
        Command::Set(args) => document::handle_set(args, ctx),
        Command::Add(args) => document::handle_add(args, ctx),
        Command::Delete(args) => document::handle_delete(args, ctx),
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
