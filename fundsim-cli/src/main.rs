//! FundSim CLI — run, sweep and validate fund simulations.
//!
//! Commands:
//! - `run` — replay one fund through a signal file and save its artifacts
//! - `sweep` — replay several fund configurations and rank them by fund value
//! - `validate` — load and validate a fund configuration without running it

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use fundsim_core::engine::ReportSummary;
use fundsim_core::fingerprint::prefix;
use fundsim_runner::{
    load_signals, run_fund, save_artifacts, FundConfig, FundSweep, LoadOptions, SimulationReport,
};

#[derive(Parser)]
#[command(
    name = "fundsim",
    version,
    about = "FundSim CLI — replay a simulated fund through buy/sell/hold signals"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay one fund through a signal file.
    Run {
        /// Path to a TOML fund config file.
        #[arg(long)]
        config: PathBuf,

        /// Path to a CSV signal file.
        #[arg(long)]
        signals: PathBuf,

        /// Output directory for run artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,

        /// Replay rows in file order instead of date/confidence order.
        #[arg(long, default_value_t = false)]
        no_sort: bool,
    },
    /// Replay several fund configurations and rank them by fund value.
    Sweep {
        /// TOML fund config files, one per fund.
        #[arg(long = "config", required = true, num_args = 1..)]
        configs: Vec<PathBuf>,

        /// Path to a CSV signal file.
        #[arg(long)]
        signals: PathBuf,

        /// Run funds one at a time instead of in parallel.
        #[arg(long, default_value_t = false)]
        serial: bool,

        /// Also save each fund's artifacts under this directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Replay rows in file order instead of date/confidence order.
        #[arg(long, default_value_t = false)]
        no_sort: bool,
    },
    /// Load and validate a fund configuration.
    Validate {
        /// Path to a TOML fund config file.
        #[arg(long)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            signals,
            output_dir,
            no_sort,
        } => run_cmd(&config, &signals, &output_dir, no_sort),
        Commands::Sweep {
            configs,
            signals,
            serial,
            output_dir,
            no_sort,
        } => sweep_cmd(&configs, &signals, serial, output_dir.as_deref(), no_sort),
        Commands::Validate { config } => validate_cmd(&config),
    }
}

fn run_cmd(
    config_path: &Path,
    signals_path: &Path,
    output_dir: &Path,
    no_sort: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let signals = load_signals(signals_path, &LoadOptions { sort: !no_sort })
        .with_context(|| format!("failed to load signals from {}", signals_path.display()))?;

    let report = run_fund(&config, &signals.rows)?.with_rejected(signals.rejected);
    if report.error_count() > 0 {
        warn!(
            errors = report.errors.len(),
            rejected = report.rejected.len(),
            "some signal rows were skipped; see errors.csv and rejected.csv"
        );
    }
    print_summary(&report);

    let run_dir = save_artifacts(&report, output_dir)?;
    println!("Artifacts saved to: {}", run_dir.display());
    Ok(())
}

fn sweep_cmd(
    config_paths: &[PathBuf],
    signals_path: &Path,
    serial: bool,
    output_dir: Option<&Path>,
    no_sort: bool,
) -> Result<()> {
    let configs = config_paths
        .iter()
        .map(PathBuf::as_path)
        .map(load_config)
        .collect::<Result<Vec<_>>>()?;
    let signals = load_signals(signals_path, &LoadOptions { sort: !no_sort })
        .with_context(|| format!("failed to load signals from {}", signals_path.display()))?;

    if !signals.rejected.is_empty() {
        warn!(
            rejected = signals.rejected.len(),
            "signal lines with unknown labels were not replayed"
        );
    }
    let results = FundSweep::new()
        .with_parallelism(!serial)
        .sweep(&configs, &signals.rows)?;

    print!("{}", results.ranking_table());

    if let Some(dir) = output_dir {
        for report in results.all() {
            let report = report.clone().with_rejected(signals.rejected.clone());
            let run_dir = save_artifacts(&report, dir)?;
            println!("Artifacts saved to: {}", run_dir.display());
        }
    }
    Ok(())
}

fn validate_cmd(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    let run_id = config.run_id().context("failed to fingerprint config")?;
    println!("{} is valid", config_path.display());
    println!("  name:            {}", config.label());
    println!("  run id:          {}", prefix(&run_id, 12));
    println!("  starting value:  {}", config.fund.starting_value);
    println!(
        "  costs:           spread {}, fixed {}, stamp duty {} / {}",
        config.costs.spread,
        config.costs.fixed_trade_cost,
        config.costs.buy_stamp_duty_rate,
        config.costs.sell_stamp_duty_rate
    );
    println!(
        "  sizing:          {} of cash, min {}",
        config.sizing.max_investment_fraction, config.sizing.min_investment_value
    );
    println!("  period days:     {}", config.report.period_days);
    Ok(())
}

fn load_config(path: &Path) -> Result<FundConfig> {
    FundConfig::from_file(path).with_context(|| format!("invalid fund config {}", path.display()))
}

fn print_summary(report: &SimulationReport) {
    let s: &ReportSummary = &report.summary;
    println!();
    println!("Fund: {} ({})", report.name, report.short_id());
    println!("  signals:         {}", report.signal_count);
    println!(
        "  trades:          {} ({} buys, {} sells)",
        report.ledger.len(),
        report.stats.buys_executed,
        report.stats.sells_executed
    );
    println!("  starting value:  {}", s.starting_value);
    println!("  cash available:  {}", s.cash_available);
    println!("  invested (mark): {}", s.invested_mark_value);
    println!("  fund value:      {}", s.fund_value);
    println!("  overall ROI:     {:.2}%", s.overall_roi * 100.0);
    println!("  cost of business: {}", s.cost_of_doing_business);
    println!("  closed / open:   {} / {}", s.closed_trades, s.open_trades);
    if let Some(win_rate) = s.win_rate {
        println!("  win rate:        {:.1}%", win_rate * 100.0);
    }
    if !report.errors.is_empty() {
        println!("  row errors:      {} (see errors.csv)", report.errors.len());
    }
    if !report.rejected.is_empty() {
        println!("  rejected lines:  {} (see rejected.csv)", report.rejected.len());
    }
    println!();
}
