//! MoverScan CLI — scan the day's top movers and resolve trading pairs.
//!
//! Commands:
//! - `scan` — run one scan and print the ScanResult JSON on stdout
//! - `resolve` — map asset codes to exchange pairs through the symbol index
//!
//! Logs go to stderr (`RUST_LOG`, default `info`) so stdout stays pure JSON.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use moverscan_core::clock::{SystemClock, ThreadSleeper};
use moverscan_core::data::{live_providers, SymbolIndex};
use moverscan_core::{ScanConfig, Scanner};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "moverscan",
    version,
    about = "MoverScan — trade setups among the day's top crypto movers"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one scan and print the result as JSON.
    Scan {
        /// Account size in USD.
        #[arg(long)]
        account_size: f64,

        /// Fraction of the account risked per setup (0.02 = 2%).
        #[arg(long)]
        risk_pct: f64,

        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Seed for deterministic reasoning text (overrides the config).
        #[arg(long)]
        seed: Option<u64>,

        /// Pretty-print the JSON.
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },
    /// Resolve asset codes (e.g. sol, pepe) to tradable pairs.
    Resolve {
        #[arg(required = true)]
        assets: Vec<String>,

        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            account_size,
            risk_pct,
            config,
            seed,
            pretty,
        } => run_scan(account_size, risk_pct, config.as_deref(), seed, pretty),
        Commands::Resolve { assets, config } => run_resolve(&assets, config.as_deref()),
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<ScanConfig> {
    match path {
        Some(path) => ScanConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(ScanConfig::default()),
    }
}

fn run_scan(
    account_size: f64,
    risk_pct: f64,
    config: Option<&Path>,
    seed: Option<u64>,
    pretty: bool,
) -> Result<()> {
    let mut config = load_config(config)?;
    if seed.is_some() {
        config.reasoning.seed = seed;
    }

    let scanner = Scanner::live(config).context("building data providers")?;
    let result = scanner.run_scan(account_size, risk_pct)?;

    let json = if pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{json}");
    Ok(())
}

fn run_resolve(assets: &[String], config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let clock = Arc::new(SystemClock);
    let providers = live_providers(&config.data, clock.clone(), Arc::new(ThreadSleeper))?;

    let index = SymbolIndex::new(providers.exchange, clock)
        .with_quote_asset(config.data.quote_asset.clone())
        .with_ttl(config.data.symbol_ttl());
    let pairs = index.ensure_fresh().context("loading tradable universe")?;
    tracing::debug!(pairs, "universe loaded");

    let mut missing = 0usize;
    for asset in assets {
        match index.resolve(asset) {
            Ok(pair) => println!("{asset} -> {pair}"),
            Err(err) => {
                println!("{asset}: not found");
                tracing::debug!(error = %err, "resolve failed");
                missing += 1;
            }
        }
    }

    if missing > 0 {
        bail!("{missing} of {} assets have no {} pair", assets.len(), index.quote_asset());
    }
    Ok(())
}
