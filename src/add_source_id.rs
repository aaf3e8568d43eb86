use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod collection_store;
mod migrate;
mod sqlite_persistence;

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[command(about = "Adds the source_id column to the albums table, backfilled from source_uri")]
struct CliArgs {
    /// Path to the SQLite collection database file. Defaults to the
    /// application's support directory location when omitted.
    #[clap(value_parser = parse_path)]
    pub db_path: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let db_path = match cli_args.db_path {
        Some(path) => path,
        None => collection_store::default_db_path()
            .context("Could not determine the default database location")?,
    };

    if !db_path.exists() {
        anyhow::bail!(
            "Database not found: {:?} (pass the database path as an argument)",
            db_path
        );
    }

    info!("Starting migration for: {:?}", db_path);
    migrate::add_source_id_column(&db_path)?;
    Ok(())
}
