//! `hitepro-contract` - run the device contract suite against a hub
//!
//! Exit codes: 0 all checks passed or skipped, 1 a check failed or did not
//! run, 2 configuration error, 3 setup (directory fetch) error.

use anyhow::{Context, Result};
use clap::Parser;
use hp_client::HubClient;
use hp_config::{load_contract_table, ConfigResult, EnvFile, HubConfig};
use hp_contract::{run_suite, RunOptions};
use hp_core::ContractTable;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const EXIT_FAILED: u8 = 1;
const EXIT_CONFIG: u8 = 2;
const EXIT_SETUP: u8 = 3;

/// Validate a HitePro hub's device API against its contract table
#[derive(Debug, Parser)]
#[command(name = "hitepro-contract", version, about)]
struct Cli {
    /// Dotenv file consulted after the process environment
    #[arg(long, value_name = "PATH", default_value = ".env")]
    env_file: PathBuf,

    /// Hub base URL (overrides HITEPRO_BASE_URL)
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    request_timeout: Option<u64>,

    /// Overall run timeout in seconds
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    run_timeout: Option<u64>,

    /// Maximum checks in flight
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    concurrency: Option<u64>,

    /// YAML contract table replacing the built-in HitePro table
    #[arg(long, value_name = "PATH")]
    contracts: Option<PathBuf>,

    /// Directory for report.json and report.html
    #[arg(long, value_name = "DIR")]
    report_dir: Option<PathBuf>,

    /// Skip writing report artifacts
    #[arg(long)]
    no_report: bool,
}

impl Cli {
    fn load_config(&self) -> ConfigResult<HubConfig> {
        let env_file = EnvFile::load_if_exists(&self.env_file)?;
        let mut config = HubConfig::from_env_with(&env_file)?;

        if let Some(url) = &self.base_url {
            config = config.with_base_url(url)?;
        }
        if let Some(secs) = self.request_timeout {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.run_timeout {
            config.run_timeout = Duration::from_secs(secs);
        }
        if let Some(n) = self.concurrency {
            config.concurrency = n as usize;
        }
        if let Some(path) = &self.contracts {
            config.contracts_path = Some(path.clone());
        }
        if let Some(dir) = &self.report_dir {
            config.report_dir = dir.clone();
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install tracing subscriber: {}", e);
    }

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(EXIT_FAILED)
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let loaded = cli
        .load_config()
        .and_then(|config| -> ConfigResult<(HubConfig, ContractTable)> {
            let table = match &config.contracts_path {
                Some(path) => load_contract_table(path)?,
                None => ContractTable::hitepro(),
            };
            Ok((config, table))
        });
    let (config, table) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => {
            error!("Configuration error: {}", e);
            eprintln!("❌ Configuration error: {}", e);
            return Ok(ExitCode::from(EXIT_CONFIG));
        }
    };

    info!("Starting HitePro contract suite against {}", config.base_url);

    let client = HubClient::new(&config.base_url, &config.credentials, config.request_timeout)
        .context("failed to create hub client")?;
    let options = RunOptions {
        concurrency: config.concurrency,
        run_timeout: config.run_timeout,
    };

    let report = match run_suite(&client, &table, options).await {
        Ok(report) => report,
        Err(e) => {
            error!("Setup failed: {}", e);
            eprintln!("❌ Setup failed, no checks were run: {}", e);
            return Ok(ExitCode::from(EXIT_SETUP));
        }
    };

    report.print_summary();

    if !cli.no_report {
        let paths = report
            .write_artifacts(&config.report_dir)
            .context("failed to write report artifacts")?;
        for path in paths {
            println!("Report: {}", path.display());
        }
    }

    Ok(if report.success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_FAILED)
    })
}
