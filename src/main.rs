//! disktool - Main entry point
//!
//! Interactive storage management menu. Every operation runs a standard Linux
//! utility; this binary only gathers input, confirms and reports.

use anyhow::{Context, Result};
use std::process::ExitCode;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use disktool::cli::Cli;
use disktool::config::ToolConfig;
use disktool::console::Console;
use disktool::menu;
use disktool::ops::Session;
use disktool::paths::HostPaths;
use disktool::privilege::{self, EffectiveUid, FixedPrivilege, PrivilegeCheck};
use disktool::process_guard;
use disktool::runner::SystemRunner;
use disktool::sanity;

/// Initialize the tracing subscriber; RUST_LOG overrides the default level
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    init_logging();
    info!("disktool starting up");

    // Terminate tracked dd/mkfs children if we are interrupted
    if let Err(e) = process_guard::init_signal_handlers() {
        warn!("Failed to initialize signal handlers: {}", e);
    }
    debug!("Signal handlers initialized");

    let cli = Cli::parse_args();
    debug!(?cli, "CLI arguments parsed");

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => {
            info!("Loading configuration from: {:?}", path);
            ToolConfig::load_from_file(path)?
        }
        None => ToolConfig::default(),
    };
    config.validate().context("Invalid configuration")?;

    let privilege: Box<dyn PrivilegeCheck> =
        if cli.skip_root_check || privilege::should_skip_root_check() {
            warn!("Root check skipped");
            Box::new(FixedPrivilege(true))
        } else {
            Box::new(EffectiveUid)
        };

    let report = sanity::inspect_host(&privilege);
    let runner = SystemRunner::new(privilege).with_dry_run(cli.dry_run);
    let paths = HostPaths;

    let mut console = Console::stdio();
    if cli.dry_run {
        console.say("[dry-run] Commands that need root or write files are reported instead of executed.")?;
    }
    sanity::print_startup_warnings(&mut console, &report)?;

    let mut session = Session::new(console, &runner, &paths, &config);
    menu::run_menu(&mut session)?;
    info!("disktool exiting");
    Ok(())
}
