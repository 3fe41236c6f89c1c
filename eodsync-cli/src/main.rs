//! EodSync CLI — daily EOD sync and store management commands.
//!
//! Commands:
//! - `sync` — run the session pipeline until it catches up with today
//! - `status` — report cursor position, series count, and cache ages
//! - `rollback` — manually strip one date out of every series file
//! - `cleanup` — remove series files idle beyond the retention window
//!
//! Exit status: non-zero on any fatal pipeline error so an external
//! scheduler can distinguish abnormal termination from a clean run.

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use eodsync_core::cleanup;
use eodsync_core::config::PipelineConfig;
use eodsync_core::feed::NseFeed;
use eodsync_core::pipeline::Pipeline;
use eodsync_core::rollback;
use eodsync_core::store::SeriesStore;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "eodsync", about = "EodSync CLI — daily EOD data pipeline")]
struct Cli {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the data directory from the config.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the session pipeline for every pending trading date.
    Sync,
    /// Report cursor position, series count, and cache freshness.
    Status,
    /// Strip one date's rows out of every series file.
    Rollback {
        /// Session date to remove (YYYY-MM-DD).
        #[arg(long)]
        date: String,
    },
    /// Remove series files idle beyond the retention window.
    Cleanup {
        /// Override the configured retention window, in days.
        #[arg(long)]
        retention_days: Option<i64>,

        /// Actually delete (without this flag, only previews what would be removed).
        #[arg(long, default_value_t = false)]
        confirm: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref(), cli.data_dir)?;

    match cli.command {
        Commands::Sync => run_sync(&config),
        Commands::Status => run_status(&config),
        Commands::Rollback { date } => run_rollback(&config, &date),
        Commands::Cleanup {
            retention_days,
            confirm,
        } => run_cleanup(&config, retention_days, confirm),
    }
}

fn load_config(path: Option<&std::path::Path>, data_dir: Option<PathBuf>) -> Result<PipelineConfig> {
    let mut config = match path {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(dir) = data_dir {
        config.data_dir = dir;
    }
    Ok(config)
}

fn run_sync(config: &PipelineConfig) -> Result<()> {
    let feed = NseFeed::new(&config.base_url, &config.archive_url);
    let today = chrono::Local::now().date_naive();

    let mut pipeline = Pipeline::new(config, &feed, today)?;

    match pipeline.run() {
        Ok(summary) => {
            println!();
            println!("=== Sync Result ===");
            println!("Days completed:   {}", summary.days_completed);
            println!("Rows appended:    {}", summary.rows_appended);
            println!("Holidays skipped: {}", summary.holidays_skipped);
            println!("Weekends skipped: {}", summary.weekends_skipped);
            println!("Stale purged:     {}", summary.stale_purged);
            Ok(())
        }
        Err(err) => {
            eprintln!("Sync aborted: {err}");
            std::process::exit(1);
        }
    }
}

fn run_status(config: &PipelineConfig) -> Result<()> {
    let cursor_path = config.cursor_path();
    let last_completed = if cursor_path.exists() {
        std::fs::read_to_string(&cursor_path)?.trim().to_string()
    } else {
        "(no state — first run pending)".to_string()
    };

    let store = SeriesStore::new(config.daily_dir());
    let series_count = store.files()?.len();

    println!("Data dir:       {}", config.data_dir.display());
    println!("Last completed: {last_completed}");
    println!("Series files:   {series_count}");
    println!(
        "Holiday cache:  {}",
        cache_age(&config.holiday_cache_path())
    );
    println!("Action cache:   {}", cache_age(&config.action_cache_path()));
    Ok(())
}

fn run_rollback(config: &PipelineConfig, date: &str) -> Result<()> {
    let date: NaiveDate = date.parse()?;
    let store = SeriesStore::new(config.daily_dir());

    let reverted = rollback::rollback(&store, date)?;
    println!("Removed {date} from {reverted} series file(s).");
    Ok(())
}

fn run_cleanup(config: &PipelineConfig, retention_days: Option<i64>, confirm: bool) -> Result<()> {
    let retention = retention_days.unwrap_or(config.retention_days);
    let store = SeriesStore::new(config.daily_dir());
    let today = chrono::Local::now().date_naive();

    let stale = cleanup::find_stale(&store, today, retention)?;
    if stale.is_empty() {
        println!("No series idle for more than {retention} days.");
        return Ok(());
    }

    println!("Found {} series idle for more than {retention} days:", stale.len());
    for (path, last) in &stale {
        println!("  {} (last row {last})", path.display());
    }

    if !confirm {
        println!();
        println!("Dry run — pass --confirm to actually delete.");
        return Ok(());
    }

    let purged = cleanup::purge_stale(&store, today, retention)?;
    println!("Done. Removed {purged} series file(s).");
    Ok(())
}

fn cache_age(path: &std::path::Path) -> String {
    match std::fs::metadata(path).and_then(|meta| meta.modified()) {
        Ok(modified) => {
            let modified: chrono::DateTime<chrono::Local> = modified.into();
            format!("refreshed {}", modified.format("%Y-%m-%d %H:%M"))
        }
        Err(_) => "(not cached)".to_string(),
    }
}
