//! Teoremer CLI - Command-line interface for the Teoremer knowledge base.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use teoremer_cli::commands;
use teoremer_cli::{Cli, Command, Config, Formatter, Session};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = cli.config.as_ref().map(PathBuf::from);
    let mut config = Config::load(config_path.as_deref()).context("failed to load configuration")?;
    if config_path.is_none() && !Config::path()?.exists() {
        config.save(None).ok();
    }

    // Flags override the config file
    if let Some(db) = cli.db {
        config.database = Some(PathBuf::from(db));
    }
    if let Some(user) = cli.as_user {
        config.user = Some(user);
    }

    let format = cli.format.map(Into::into).unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    let db_path = config.database_path()?;
    if let Some(dir) = db_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    }
    let mut session = Session::open(&db_path, &config.scoring, config.user.clone())
        .with_context(|| format!("failed to open database {}", db_path.display()))?;
    tracing::debug!(database = %db_path.display(), user = ?config.user, "session opened");

    match cli.command {
        Command::User(args) => commands::execute_user(args, &mut session, &formatter)?,
        Command::Draft(args) => commands::execute_draft(args, &mut session, &formatter)?,
        Command::Item(args) => commands::execute_item(args, &mut session, &formatter)?,
        Command::Media(args) => commands::execute_media(args, &mut session, &formatter)?,
        Command::Source(args) => commands::execute_source(args, &mut session, &formatter)?,
        Command::Stats => commands::execute_stats(&session, &formatter)?,
    }

    Ok(())
}
