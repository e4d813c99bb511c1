//! CLI definition and dispatch.

use chrono::{Datelike, NaiveDate};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::system_clock::SystemClock;
use crate::adapters::upload_adapter::parse_upload;
use crate::domain::app_config::{AppConfig, DataProvider, build_app_config};
use crate::domain::batch::run_batch;
use crate::domain::calendar::BusinessCalendar;
use crate::domain::error::ProfitError;
use crate::domain::evaluator::ProfitEvaluator;
use crate::ports::clock_port::ClockPort;
use crate::ports::market_data_port::MarketDataPort;

#[derive(Parser, Debug)]
#[command(
    name = "profit-analyzer",
    about = "Checks when bought positions reached a profit target"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the web server
    Serve {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Evaluate a positions file and print the JSON report
    Evaluate {
        #[arg(short, long)]
        config: PathBuf,
        /// CSV or XLSX file with Ticker and BuyDate columns
        #[arg(short, long)]
        positions: PathBuf,
        /// Target profit in percent
        #[arg(short, long, allow_hyphen_values = true)]
        target: f64,
    },
    /// Print the market holidays of a year
    Holidays {
        #[arg(long)]
        year: i32,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    init_tracing();
    let result = match cli.command {
        Command::Serve { config } => run_serve(&config),
        Command::Evaluate {
            config,
            positions,
            target,
        } => run_evaluate(&config, &positions, target),
        Command::Holidays { year, config } => run_holidays(year, config.as_deref()),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Already installed when `run` is called more than once in-process.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn load_config(path: &Path, today: NaiveDate) -> Result<AppConfig, ProfitError> {
    info!(path = %path.display(), "loading config");
    let adapter = FileConfigAdapter::from_file(path)?;
    build_app_config(&adapter, today.year())
}

pub fn build_market_data(
    config: &AppConfig,
) -> Result<Arc<dyn MarketDataPort + Send + Sync>, ProfitError> {
    match &config.provider {
        DataProvider::Csv { dir } => {
            info!(dir = %dir.display(), "using CSV price files");
            Ok(Arc::new(CsvAdapter::new(dir.clone())))
        }
        #[cfg(feature = "yahoo")]
        DataProvider::Yahoo {
            base_url,
            timeout_secs,
        } => {
            let adapter = crate::adapters::yahoo_adapter::YahooAdapter::new(
                base_url,
                std::time::Duration::from_secs(*timeout_secs),
            )?;
            Ok(Arc::new(adapter))
        }
        #[cfg(not(feature = "yahoo"))]
        DataProvider::Yahoo { .. } => Err(ProfitError::ConfigInvalid {
            section: "data".to_string(),
            key: "provider".to_string(),
            reason: "built without the yahoo feature".to_string(),
        }),
    }
}

fn run_evaluate(config_path: &Path, positions: &Path, target: f64) -> Result<(), ProfitError> {
    let clock = SystemClock;
    let today = clock.today();
    let config = load_config(config_path, today)?;
    let market_data = build_market_data(&config)?;
    let evaluator = ProfitEvaluator::new(config.calendar());

    let file_name = positions
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let bytes = fs::read(positions)?;
    let rows = parse_upload(&file_name, &bytes)?;
    info!(rows = rows.len(), target, %today, "evaluating positions");

    let report = run_batch(&evaluator, market_data.as_ref(), &rows, target, today)?;
    let json = serde_json::to_string_pretty(&report)
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    println!("{json}");
    Ok(())
}

fn run_holidays(year: i32, config_path: Option<&Path>) -> Result<(), ProfitError> {
    let calendar = match config_path {
        Some(path) => {
            let config = load_config(path, SystemClock.today())?;
            if year < config.first_year || year > config.last_year {
                return Err(ProfitError::malformed(format!(
                    "year {year} is outside the configured calendar {}-{}",
                    config.first_year, config.last_year
                )));
            }
            config.calendar()
        }
        None => BusinessCalendar::us_federal(year, year),
    };
    for date in calendar.holidays_in(year) {
        println!("{} {}", date.format("%Y-%m-%d"), date.format("%a"));
    }
    Ok(())
}

fn run_serve(config_path: &Path) -> Result<(), ProfitError> {
    #[cfg(feature = "web")]
    {
        use crate::adapters::ticker_list_adapter::load_ticker_list;
        use crate::adapters::web::{AppState, build_router};

        let clock: Arc<dyn ClockPort + Send + Sync> = Arc::new(SystemClock);
        let config = load_config(config_path, clock.today())?;
        let market_data = build_market_data(&config)?;
        let calendar = config.calendar();
        info!(
            holidays = calendar.holiday_count(),
            first_year = config.first_year,
            last_year = config.last_year,
            "built business calendar"
        );
        let tickers = load_ticker_list(&config.tickers_path);

        let state = AppState {
            market_data: Arc::clone(&market_data),
            evaluator: Arc::new(ProfitEvaluator::new(calendar)),
            clock,
            tickers: Arc::new(tickers),
            static_dir: config.static_dir.clone(),
        };
        let router = build_router(state);
        let listen = config.listen.clone();

        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind(listen.as_str()).await?;
            info!(addr = %listen, "web server listening");
            axum::serve(listener, router).await
        })?;

        // The blocking HTTP client must be dropped outside the runtime.
        drop(runtime);
        drop(market_data);
        Ok(())
    }

    #[cfg(not(feature = "web"))]
    {
        let _ = config_path;
        Err(ProfitError::ConfigInvalid {
            section: "web".to_string(),
            key: "listen".to_string(),
            reason: "built without the web feature".to_string(),
        })
    }
}
