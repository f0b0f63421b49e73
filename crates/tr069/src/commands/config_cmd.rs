//! Config subcommand handlers.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Context};
use crate::error::CliError;
use crate::output;

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::resolve_path(global);
    match args.command {
        ConfigCommand::Init => {
            if path.exists() {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }
            config::save_config_to(&Config::default(), &path)?;
            tracing::info!(path = %path.display(), "config written");
            output::print_output(&format!("Wrote {}", path.display()), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load(global)?;
            let ctx = Context::resolve(global, &cfg)?;
            let rendered = toml::to_string_pretty(&cfg)
                .map_err(|e| CliError::Render(e.to_string()))?;
            let out = output::render_single(ctx.output, &cfg, |_| rendered.trim_end().to_owned())?;
            output::print_output(&out, ctx.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }
    }
}
