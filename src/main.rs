//! tools-cli - Register web UIs to be shown on the cockpit tools tab.

use clap::Parser;
use cockpit_tools::cli::{Cli, Commands};
use cockpit_tools::commands::{self, CommandResult};
use cockpit_tools::config::{
    ConfigOverrides, DEFAULT_LOG_FILTER, ResolvedConfig, resolve_config,
};
use cockpit_tools::storage::Store;
use cockpit_tools::{Error, Result};
use std::process;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // Store path: --file flag > COCKPIT_TOOLS_FILE env > /etc/cockpit-tools.xml
    let overrides = ConfigOverrides {
        store_path: cli.file,
    };
    let config = resolve_config(&overrides);

    init_logging(&config);
    debug!(
        path = %config.store_path().display(),
        source = %config.store_path.source,
        "resolved tools file"
    );

    if let Err(e) = run_command(cli.command, &config) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Install the stderr subscriber.
///
/// An unparsable filter falls back to the default level instead of aborting.
fn init_logging(config: &ResolvedConfig) {
    let filter = EnvFilter::try_new(config.log_filter())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.log_json() {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run_command(command: Option<Commands>, config: &ResolvedConfig) -> Result<()> {
    match command {
        None => {
            let store = open_for_read(config)?;
            println!("{}", commands::list(&store).to_json());
        }
        Some(Commands::Add { name, options }) => {
            let mut store = Store::initialize(config.store_path())?;
            let result = commands::add(&mut store, &name, &options)?;
            println!("{}", result.to_json());
        }
        Some(Commands::Del { name }) => {
            let mut store = Store::initialize(config.store_path())?;
            let result = commands::delete(&mut store, &name)?;
            println!("{}", result.to_json());
        }
        Some(Commands::Shw { name }) => {
            let store = open_for_read(config)?;
            println!("{}", commands::show(&store, &name)?.to_json());
        }
        Some(Commands::Lst) => {
            let store = open_for_read(config)?;
            let listed = commands::list(&store);
            if !listed.tools.is_empty() {
                println!("{}", listed.to_human());
            }
        }
        Some(Commands::Where) => {
            println!("{}", commands::location(config).to_human());
        }
    }
    Ok(())
}

/// Open the store for a read-only command.
///
/// A caller without the rights to create the tools file still gets an empty
/// listing instead of an error.
fn open_for_read(config: &ResolvedConfig) -> Result<Store> {
    match Store::initialize(config.store_path()) {
        Ok(store) => Ok(store),
        Err(e @ (Error::NotFound(_) | Error::PermissionDenied(_))) => {
            warn!(
                path = %config.store_path().display(),
                error = %e,
                "tools file unavailable, using an empty registry"
            );
            Ok(Store::in_memory())
        }
        Err(e) => Err(e),
    }
}
