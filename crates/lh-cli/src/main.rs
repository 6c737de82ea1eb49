use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use lh_cli::commands::util::load_snapshot;
use lh_cli::commands::{clear, import, peaks, series, show, status, summary, top};
use lh_cli::{Cli, Commands, Config};
use lh_db::Store;

/// Load config and open the store, ensuring the parent directory exists.
fn open_store(config_path: Option<&Path>) -> Result<(Store, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let store = Store::open(&config.database_path).context("failed to open database")?;
    Ok((store, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // try_init: tracing may already be initialized in tests
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let (mut store, config) = open_store(cli.config.as_deref())?;
    let mut out = std::io::stdout().lock();

    match command {
        Commands::Import { files } => import::run(&mut out, &mut store, files)?,
        Commands::Status => status::run(&mut out, &store, &config.database_path)?,
        Commands::Clear => clear::run(&mut out, &mut store)?,
        Commands::Summary { json } => {
            let snapshot = load_snapshot(&store, &config.aggregate_options())?;
            summary::run(&mut out, &snapshot, *json)?;
        }
        Commands::Top(args) => {
            let snapshot = load_snapshot(&store, &config.aggregate_options())?;
            top::run(&mut out, &snapshot, args)?;
        }
        Commands::Series(args) => {
            let snapshot = load_snapshot(&store, &config.aggregate_options())?;
            series::run(&mut out, &snapshot, args)?;
        }
        Commands::Peaks(args) => {
            let options = config.peak_options(args.threshold)?;
            let snapshot = load_snapshot(&store, &config.aggregate_options())?;
            peaks::run(&mut out, &snapshot, args, &options)?;
        }
        Commands::Artist { name } => {
            let snapshot = load_snapshot(&store, &config.aggregate_options())?;
            show::artist(&mut out, &snapshot, name)?;
        }
        Commands::Album { artist, album } => {
            let options = config.peak_options(None)?;
            let snapshot = load_snapshot(&store, &config.aggregate_options())?;
            show::album(&mut out, &snapshot, artist, album, options.week_start)?;
        }
    }

    Ok(())
}
