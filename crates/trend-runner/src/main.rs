//! # trend
//!
//! Polls the CoinMarketCap ticker on a fixed interval and writes each
//! currency snapshot to InfluxDB as a time-series point.
//!
//! # Usage
//!
//! ```bash
//! trend --influx http://localhost:8086 --db crypto --crypto bitcoin --convert aud
//! trend --config trend.json --log-level debug
//! ```
//!
//! Exit status is 0 after a signal-driven shutdown and non-zero when the
//! destination cannot be set up, a fetch fails, or a task dies.

mod supervisor;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use trend_core::config::{self, AppConfig};
use trend_core::shutdown::QuitSignal;
use trend_feed::coinmarketcap::CoinMarketCapClient;
use trend_sink::influx::InfluxClient;

use crate::supervisor::{Settings, Supervisor};

/// Cryptocurrency price collector for InfluxDB.
#[derive(Parser, Debug)]
#[command(name = "trend", about = "Cryptocurrency price collector for InfluxDB")]
struct Cli {
    /// Optional JSON configuration file. Flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address of influxdb.
    #[arg(long)]
    influx: Option<String>,

    /// Name of the influxdb database to push values to.
    #[arg(long)]
    db: Option<String>,

    /// Username for influxdb.
    #[arg(long)]
    user: Option<String>,

    /// Password for the influxdb user.
    #[arg(long)]
    pass: Option<String>,

    /// Crypto currency to track; empty tracks all available crypto currencies.
    #[arg(long)]
    crypto: Option<String>,

    /// Currency to convert to, i.e. BTC<->AUD.
    #[arg(long)]
    convert: Option<String>,

    /// Seconds between fetches.
    #[arg(long)]
    interval_secs: Option<u64>,

    /// Root URL of the quote API.
    #[arg(long)]
    quotes_url: Option<String>,

    /// Write precision (s, ms, u, ns).
    #[arg(long)]
    precision: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Optional log directory for file output.
    #[arg(long)]
    log_dir: Option<String>,
}

impl Cli {
    /// Defaults, then the config file, then flags.
    fn resolve_config(&self) -> Result<AppConfig> {
        let mut cfg = match &self.config {
            Some(path) => config::load_config(path)?,
            None => AppConfig::default(),
        };

        if let Some(v) = &self.influx {
            cfg.influx.addr = v.clone();
        }
        if let Some(v) = &self.db {
            cfg.influx.database = v.clone();
        }
        if let Some(v) = &self.user {
            cfg.influx.username = v.clone();
        }
        if let Some(v) = &self.pass {
            cfg.influx.password = v.clone();
        }
        if let Some(v) = &self.precision {
            cfg.influx.precision = v.parse()?;
        }
        if let Some(v) = &self.crypto {
            cfg.quotes.symbol = v.clone();
        }
        if let Some(v) = &self.convert {
            cfg.quotes.convert = v.clone();
        }
        if let Some(v) = &self.quotes_url {
            cfg.quotes.base_url = v.clone();
        }
        if let Some(v) = self.interval_secs {
            cfg.collect.interval_secs = v;
        }

        cfg.validate()?;
        Ok(cfg)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Initialize logging
    trend_core::logging::init_logging(&cli.log_level, cli.log_dir.as_deref(), "trend");

    // 2. Resolve configuration
    let cfg = cli.resolve_config()?;
    info!(
        "trend starting, influx={}, db={}, crypto='{}', convert='{}', interval={}s",
        cfg.influx.addr, cfg.influx.database, cfg.quotes.symbol, cfg.quotes.convert, cfg.collect.interval_secs,
    );

    // 3. Build the destination client once; without it nothing can be stored
    let sink = InfluxClient::new(&cfg.influx).context("cannot create influx client")?;
    let source = CoinMarketCapClient::new(cfg.quotes.base_url.clone());

    // 4. Quit on the first signal
    let quit = QuitSignal::new();
    let listener = quit.subscribe();
    tokio::spawn(supervisor::listen_for_signals(quit));

    // 5. Run until shutdown
    Supervisor::new(source, sink, Settings::from_config(&cfg)).run(listener).await?;

    info!("shutdown complete");
    Ok(())
}
