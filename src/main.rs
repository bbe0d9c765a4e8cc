//! fastprint-sync - Fastprint product catalog sync
//!
//! Authenticates against the Fastprint recruitment API with credentials
//! derived from the server clock, then syncs the returned product records
//! into a local SQLite database.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod api;
mod config;
mod credentials;
mod db;
mod hints;
mod models;

use config::Config;

#[derive(Parser)]
#[command(name = "fastprint-sync")]
#[command(about = "Syncs the Fastprint product catalog into a local SQLite database")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the product catalog and sync it into the local database
    Fetch {
        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Database path (overrides config)
        #[arg(short, long)]
        database: Option<PathBuf>,
    },

    /// Show what is stored in the local database
    Status {
        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Database path (overrides config)
        #[arg(short, long)]
        database: Option<PathBuf>,
    },

    /// Initialize a new config file
    Init {
        /// Output path for config file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fastprint_sync=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch { config, database } => {
            let cfg = load_config(config, database)?;
            run_fetch(cfg).await
        }

        Commands::Status { config, database } => {
            let cfg = load_config(config, database)?;
            run_status(&cfg)
        }

        Commands::Init { output } => {
            let path = output.unwrap_or_else(|| PathBuf::from("config.toml"));
            let cfg = Config::default();
            cfg.save_to(&path)?;

            println!("Created config file: {}", path.display());
            println!();
            println!("Next steps:");
            println!("  1. Adjust the [api] values if the service rules have drifted");
            println!(
                "  2. Run the sync: fastprint-sync fetch --config {}",
                path.display()
            );

            Ok(())
        }
    }
}

fn load_config(path: Option<PathBuf>, database: Option<PathBuf>) -> Result<Config> {
    let mut cfg = if let Some(path) = path {
        Config::load_from(&path)?
    } else {
        Config::load()?
    };

    // Override with CLI args
    if let Some(db_path) = database {
        cfg.database.path = db_path;
    }

    Ok(cfg)
}

/// The whole pipeline, strictly sequential: inspect, derive, probe, sync.
/// The database is only touched once login has produced product data.
async fn run_fetch(config: Config) -> Result<()> {
    let client = api::ApiClient::new(&config.api)?;

    let hints = client.inspect().await.context("Initial GET failed")?;

    let creds = credentials::derive(&hints, &config.api);
    tracing::info!(
        raw = %creds.password_raw,
        md5 = %creds.password_hash,
        "Derived password"
    );
    for (index, candidate) in creds.candidates.iter().enumerate() {
        tracing::info!(
            "Strategy {}/{}: {} -> {}",
            index + 1,
            creds.candidates.len(),
            candidate.strategy,
            candidate.username
        );
    }

    let login = client.login(&creds).await?;
    println!("✅ Login accepted as {}", login.username);

    let Some(data) = login.response.data.filter(|data| !data.is_empty()) else {
        bail!("Login succeeded but the response contained no product data");
    };
    println!("📦 Products in response: {}", data.len());

    let db = db::Database::open(&config.database.path).context("Failed to open database")?;
    let report = db.sync_products(&data)?;

    println!();
    println!("Sync complete:");
    println!("  created : {}", report.created);
    println!("  updated : {}", report.updated);
    println!("  total   : {}", report.total());
    if report.errors.is_empty() {
        println!("  errors  : none");
    } else {
        println!("  errors  : {}", report.errors.len());
        for error in &report.errors {
            println!("    - {error}");
        }
    }
    println!();

    print_lookup_summary(&db)
}

fn run_status(config: &Config) -> Result<()> {
    let db = db::Database::open(&config.database.path).context("Failed to open database")?;

    println!("Products  : {}", db.product_count()?);
    print_lookup_summary(&db)
}

fn print_lookup_summary(db: &db::Database) -> Result<()> {
    println!("Categories: {}", db.category_count()?);
    for (id, name) in db.list_categories()? {
        println!("  • {name} (ID: {id})");
    }

    println!("Statuses  : {}", db.status_count()?);
    for (id, name) in db.list_statuses()? {
        println!("  • {name} (ID: {id})");
    }

    Ok(())
}
