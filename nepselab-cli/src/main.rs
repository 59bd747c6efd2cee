//! NepseLab CLI: daily signal pipeline commands.
//!
//! Commands:
//! - `run`: process one date from its raw snapshots
//! - `backfill`: force-run every date in a range
//! - `reprocess`: force-run every date with raw snapshots
//! - `status`: historical store summary and last processed date
//! - `stats`: feature summary for one date
//! - `ingest`: write a JSON file of records as a raw snapshot
//! - `query`: read the historical store, optionally exporting CSV

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nepselab_core::domain::FeaturedSignal;
use nepselab_pipeline::{
    write_raw_snapshot, BackfillRunner, HistoricalQuery, PipelineConfig, PipelineRunOutcome,
    PipelineRunner, RunOptions, RunStatus,
};

#[derive(Parser)]
#[command(name = "nepselab", about = "NepseLab CLI: NEPSE technical-signal pipeline")]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding `data/`. Overrides `storage.base_path`.
    #[arg(long, global = true)]
    base_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process one date: validate, clean, score, aggregate, merge.
    Run {
        /// Date (YYYY-MM-DD). Defaults to today (UTC).
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Reprocess even if the date was already aggregated.
        #[arg(long, default_value_t = false)]
        force: bool,

        /// Stop after the cleaned store.
        #[arg(long, default_value_t = false)]
        skip_features: bool,
    },
    /// Force-run every date in an inclusive range.
    Backfill {
        /// First date (YYYY-MM-DD).
        #[arg(long)]
        start: NaiveDate,

        /// Last date (YYYY-MM-DD).
        #[arg(long)]
        end: NaiveDate,
    },
    /// Force-run every date that has raw snapshots (after a scoring change).
    Reprocess,
    /// Historical store summary and last processed date.
    Status,
    /// Feature summary of one date's featured store.
    Stats {
        /// Date (YYYY-MM-DD).
        #[arg(long)]
        date: NaiveDate,
    },
    /// Store a JSON file of scraped records as a raw snapshot.
    Ingest {
        /// JSON array of records, or a raw file with a `records` array.
        file: PathBuf,

        /// Scrape date (YYYY-MM-DD). Defaults to today (UTC).
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Source identifier for the snapshot header.
        #[arg(long)]
        source: Option<String>,
    },
    /// Query the historical store.
    Query {
        #[arg(long)]
        symbol: Option<String>,

        #[arg(long)]
        sector: Option<String>,

        /// Earliest date (YYYY-MM-DD), inclusive.
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Latest date (YYYY-MM-DD), inclusive.
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Maximum records (0 = all).
        #[arg(long, default_value_t = 0)]
        limit: usize,

        /// Only the most recent date (other filters ignored).
        #[arg(long, default_value_t = false)]
        latest: bool,

        /// Write results as CSV to this file instead of printing.
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nepselab=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref(), cli.base_path)?;
    let runner = PipelineRunner::new(config);

    match cli.command {
        Commands::Run {
            date,
            force,
            skip_features,
        } => run_cmd(
            &runner,
            RunOptions {
                date,
                force,
                skip_features,
            },
        ),
        Commands::Backfill { start, end } => backfill_cmd(runner, start, end),
        Commands::Reprocess => reprocess_cmd(runner),
        Commands::Status => status_cmd(&runner),
        Commands::Stats { date } => stats_cmd(&runner, date),
        Commands::Ingest { file, date, source } => {
            ingest_cmd(&runner, &file, date, source.as_deref())
        }
        Commands::Query {
            symbol,
            sector,
            start,
            end,
            limit,
            latest,
            csv,
        } => {
            let query = HistoricalQuery {
                symbol,
                sector,
                start_date: start,
                end_date: end,
                limit: Some(limit),
            };
            query_cmd(&runner, &query, latest, csv.as_deref())
        }
    }
}

/// File config (or defaults) with the `--base-path` override applied.
fn load_config(path: Option<&Path>, base_path: Option<PathBuf>) -> Result<PipelineConfig> {
    let mut config = match path {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(base_path) = base_path {
        config.storage.base_path = base_path;
    }
    Ok(config)
}

fn run_cmd(runner: &PipelineRunner, options: RunOptions) -> Result<()> {
    let outcome = runner.run(options);
    print_outcome(&outcome);
    if outcome.status == RunStatus::Error {
        std::process::exit(1);
    }
    Ok(())
}

fn backfill_cmd(runner: PipelineRunner, start: NaiveDate, end: NaiveDate) -> Result<()> {
    if start > end {
        bail!("--start ({start}) is after --end ({end})");
    }
    let result = BackfillRunner::new(runner).run(start, end);

    println!();
    println!("=== Backfill {} to {} ===", result.start_date, result.end_date);
    println!("Days processed: {}", result.days_processed);
    println!("Total records:  {}", result.total_records);
    if !result.errors.is_empty() {
        println!();
        println!("--- Failed dates ---");
        for err in &result.errors {
            println!("{}  {}", err.date, err.error);
        }
        std::process::exit(1);
    }
    Ok(())
}

fn reprocess_cmd(runner: PipelineRunner) -> Result<()> {
    let result = BackfillRunner::new(runner).reprocess_features();

    println!("Dates found:    {}", result.dates_found);
    println!("Dates updated:  {}", result.dates_updated);
    for err in &result.errors {
        eprintln!("{}: {}", err.date, err.error);
    }
    if !result.errors.is_empty() {
        std::process::exit(1);
    }
    Ok(())
}

fn status_cmd(runner: &PipelineRunner) -> Result<()> {
    let status = runner
        .get_status()
        .context("failed to read historical store")?;
    let h = &status.historical;

    println!("Store:          {}", runner.layout().data_dir().display());
    println!(
        "Last processed: {}",
        status
            .last_processed
            .map_or_else(|| "never".to_string(), |d| d.to_string())
    );
    println!("Records:        {}", h.total_records);
    println!("Symbols:        {}", h.unique_symbols);
    match h.date_range {
        Some(range) => println!("Date range:     {} to {}", range.start, range.end),
        None => println!("Date range:     (empty)"),
    }
    println!("Sectors:        {}", h.sectors.join(", "));
    Ok(())
}

fn stats_cmd(runner: &PipelineRunner, date: NaiveDate) -> Result<()> {
    let stats = runner
        .aggregator()
        .daily_stats(date)
        .with_context(|| format!("failed to read featured store for {date}"))?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

fn ingest_cmd(
    runner: &PipelineRunner,
    file: &Path,
    date: Option<NaiveDate>,
    source: Option<&str>,
) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", file.display()))?;

    let records = match value {
        Value::Array(records) => records,
        Value::Object(mut obj) => match obj.remove("records") {
            Some(Value::Array(records)) => records,
            _ => bail!("{} has no `records` array", file.display()),
        },
        _ => bail!("{} must hold an array of records", file.display()),
    };

    let written = write_raw_snapshot(runner.layout(), &records, date, source)
        .context("failed to write raw snapshot")?;
    info!(path = %written.path.display(), records = written.record_count, "ingested raw snapshot");
    println!("Wrote {} records to {}", written.record_count, written.path.display());
    Ok(())
}

fn query_cmd(
    runner: &PipelineRunner,
    query: &HistoricalQuery,
    latest: bool,
    csv_path: Option<&Path>,
) -> Result<()> {
    let historical = runner.historical();
    let records = if latest {
        historical.latest_records(query.limit.filter(|&n| n > 0).unwrap_or(usize::MAX))
    } else {
        historical.query(query)
    }
    .context("failed to query historical store")?;

    match csv_path {
        Some(path) => {
            let csv = records_to_csv(&records)?;
            std::fs::write(path, csv)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Wrote {} records to {}", records.len(), path.display());
        }
        None => print_records(&records),
    }
    Ok(())
}

const CSV_HEADER: [&str; 15] = [
    "symbol",
    "scrape_date",
    "sector",
    "ltp",
    "daily_gain_pct",
    "rsi_14",
    "macd_signal",
    "momentum_score",
    "trend_strength",
    "ma_alignment_score",
    "signal_composite",
    "volatility_ratio",
    "rsi_zone",
    "macd_zone",
    "technical_summary",
];

fn records_to_csv(records: &[FeaturedSignal]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(CSV_HEADER)?;
    for r in records {
        let s = &r.signal;
        wtr.write_record([
            s.symbol.clone(),
            s.scrape_date.to_string(),
            s.sector.clone(),
            format!("{:.2}", s.ltp),
            format!("{:.2}", s.daily_gain_pct),
            format!("{:.2}", s.rsi_14),
            s.macd_signal.to_string(),
            format!("{:.2}", r.momentum_score),
            format!("{:.2}", r.trend_strength),
            r.ma_alignment_score.to_string(),
            format!("{:.2}", r.signal_composite),
            format!("{:.4}", r.volatility_ratio),
            zone_label(&r.rsi_zone)?,
            zone_label(&r.macd_zone)?,
            s.technical_summary.to_string(),
        ])?;
    }
    let bytes = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output was not UTF-8")
}

/// The serde label of a zone enum (`"overbought"`, `"bullish"`, ...).
fn zone_label<T: serde::Serialize>(zone: &T) -> Result<String> {
    match serde_json::to_value(zone)? {
        Value::String(label) => Ok(label),
        other => bail!("unexpected zone encoding: {other}"),
    }
}

fn print_records(records: &[FeaturedSignal]) {
    println!(
        "{:<10} {:<11} {:>9} {:>9} {:>7} {:>10} {:<11}",
        "Symbol", "Date", "LTP", "Momentum", "Trend", "Composite", "RSI zone"
    );
    println!("{}", "-".repeat(72));
    for r in records {
        println!(
            "{:<10} {:<11} {:>9.2} {:>9.2} {:>7.2} {:>10.2} {:<11}",
            r.symbol(),
            r.signal.scrape_date,
            r.signal.ltp,
            r.momentum_score,
            r.trend_strength,
            r.signal_composite,
            zone_label(&r.rsi_zone).unwrap_or_default(),
        );
    }
    println!("{} record(s)", records.len());
}

fn print_outcome(outcome: &PipelineRunOutcome) {
    println!();
    println!("=== Pipeline Run {} ===", outcome.date);
    let status = match outcome.status {
        RunStatus::Success => "success",
        RunStatus::NoNewData => "no new data",
        RunStatus::Error => "error",
    };
    println!("Status:         {status}");
    if let Some(error) = &outcome.error {
        println!("Error:          {error}");
    }
    if outcome.status == RunStatus::Success {
        println!("Raw records:    {}", outcome.records_processed);
        println!("Invalid:        {}", outcome.records_invalid);
        println!("Cleaned:        {}", outcome.records_cleaned);
        println!("Featured:       {}", outcome.records_featured);
        println!("New historical: {}", outcome.historical_added);
    }
    println!("Duration:       {} ms", outcome.duration_ms);
    if let Some(hash) = &outcome.input_hash {
        println!("Input hash:     {hash}");
    }
}
