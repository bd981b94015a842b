use anyhow::Result;

use crate::args::{Cli, Commands, ConfigCommand, KbCommand};
use crate::config::{Config, resolve_config_path};
use crate::context::ExecutionContext;
use crate::handlers;
use crate::presentation::FormatOpts;

pub fn run(cli: Cli) -> Result<()> {
    let config_path = resolve_config_path(cli.config.as_deref());
    let opts = FormatOpts::detect(cli.no_color);

    match cli.command {
        Commands::Config { command } => match command {
            ConfigCommand::Show => handlers::config::show(&config_path),
            ConfigCommand::Init { force } => handlers::config::init(&config_path, force),
        },

        Commands::Chat => {
            let config = Config::load_from(&config_path)?;
            let ctx = ExecutionContext::new(config)?;
            handlers::chat::handle(&ctx, &opts)
        }

        Commands::Kb { command } => {
            let config = Config::load_from(&config_path)?;
            let ctx = ExecutionContext::new(config)?;

            match command {
                KbCommand::Sync => handlers::kb::sync(&ctx),
                KbCommand::Upload { files, no_sync } => handlers::kb::upload(&ctx, files, no_sync),
                KbCommand::Fetch { url, no_sync } => handlers::kb::fetch(&ctx, &url, no_sync),
            }
        }
    }
}
