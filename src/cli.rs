//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

use crate::adapters::csv_adapter::CsvPriceAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::edgar_http_adapter::{
    EdgarHttpAdapter, EdgarSettings, DEFAULT_ARCHIVES_URL, DEFAULT_SUBMISSIONS_URL,
    DEFAULT_TICKERS_URL, DEFAULT_TIMEOUT_SECS,
};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::cik::CikTable;
use crate::domain::config_validation::{
    config_date, validate_edgar_config, validate_simulation_config, DEFAULT_END_DATE,
    DEFAULT_START_DATE,
};
use crate::domain::error::EdgarfolioError;
use crate::domain::filing::{Fetched, DEFAULT_FILING_WINDOW};
use crate::domain::filings::{collect_filings, FilingCollection, FilingSettings};
use crate::domain::portfolio::{
    SetupStrategy, WeightBands, DEFAULT_BEST_STOCK, DEFAULT_INITIAL_CASH, DEFAULT_MARKET_INDEX,
    MAX_WEIGHT, MIN_WEIGHT,
};
use crate::domain::price_history::PriceHistory;
use crate::domain::simulation::{run_simulation, RebalancePolicy, SimulationConfig};
use crate::domain::universe::{load_price_universe, parse_tickers};
use crate::ports::config_port::ConfigPort;
use crate::ports::filing_port::FilingSource;
use crate::ports::price_port::PricePort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(
    name = "edgarfolio",
    about = "Quarterly filing extraction and portfolio simulation"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract income-statement metrics from a ticker's quarterly filings
    Filings {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        ticker: String,
        /// Process at most this many index records (overrides filing_limit)
        #[arg(long)]
        limit: Option<usize>,
        /// Write extracted metrics to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run the portfolio simulation over historical closes
    Simulate {
        #[arg(short, long)]
        config: PathBuf,
        /// equal_weight, best_stock or market (overrides the config)
        #[arg(short, long)]
        strategy: Option<String>,
        /// Write the daily worth history to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write the trade ledger to this CSV file
        #[arg(long)]
        trades: Option<PathBuf>,
        /// Skip the daily portfolio description and print only the summary
        #[arg(short, long)]
        quiet: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Filings {
            config,
            ticker,
            limit,
            output,
        } => run_filings(&config, &ticker, limit, output.as_deref()),
        Command::Simulate {
            config,
            strategy,
            output,
            trades,
            quiet,
        } => run_simulate(
            &config,
            strategy.as_deref(),
            output.as_deref(),
            trades.as_deref(),
            !quiet,
        ),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = EdgarfolioError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn report_error(e: &EdgarfolioError) -> ExitCode {
    eprintln!("error: {e}");
    e.into()
}

pub fn build_edgar_settings(adapter: &dyn ConfigPort) -> Result<EdgarSettings, EdgarfolioError> {
    let user_agent =
        adapter
            .get_non_empty("edgar", "user_agent")
            .ok_or_else(|| EdgarfolioError::ConfigMissing {
                section: "edgar".into(),
                key: "user_agent".into(),
            })?;
    let url = |key: &str, default: &str| {
        adapter
            .get_non_empty("edgar", key)
            .unwrap_or_else(|| default.to_string())
    };

    Ok(EdgarSettings {
        user_agent,
        submissions_url: url("submissions_url", DEFAULT_SUBMISSIONS_URL),
        archives_url: url("archives_url", DEFAULT_ARCHIVES_URL),
        tickers_url: url("tickers_url", DEFAULT_TICKERS_URL),
        timeout_secs: adapter
            .get_int("edgar", "timeout_secs", DEFAULT_TIMEOUT_SECS as i64)
            .max(1) as u64,
    })
}

/// Filing window and limit from `[edgar]`. A `limit_override` replaces
/// `filing_limit`; a limit of zero means unbounded.
pub fn build_filing_settings(adapter: &dyn ConfigPort, limit_override: Option<usize>) -> FilingSettings {
    let window = adapter
        .get_int("edgar", "filing_window", DEFAULT_FILING_WINDOW as i64)
        .max(1) as usize;
    let configured = adapter.get_int("edgar", "filing_limit", 0).max(0) as usize;
    let limit = limit_override.unwrap_or(configured);

    FilingSettings {
        window,
        limit: (limit > 0).then_some(limit),
    }
}

pub fn build_simulation_config(
    adapter: &dyn ConfigPort,
    strategy_override: Option<&str>,
) -> Result<SimulationConfig, EdgarfolioError> {
    let start_date: NaiveDate = config_date(adapter, "start_date", DEFAULT_START_DATE)?;
    let end_date: NaiveDate = config_date(adapter, "end_date", DEFAULT_END_DATE)?;

    let strategy_name = strategy_override
        .map(str::to_string)
        .or_else(|| adapter.get_non_empty("simulation", "strategy"))
        .unwrap_or_else(|| "equal_weight".to_string());
    let best_stock = adapter
        .get_non_empty("simulation", "best_stock")
        .unwrap_or_else(|| DEFAULT_BEST_STOCK.to_string());
    let market_index = adapter
        .get_non_empty("simulation", "market_index")
        .unwrap_or_else(|| DEFAULT_MARKET_INDEX.to_string());
    let strategy =
        SetupStrategy::from_name(&strategy_name, &best_stock.to_uppercase(), &market_index.to_uppercase())
            .ok_or_else(|| EdgarfolioError::ConfigInvalid {
                section: "simulation".into(),
                key: "strategy".into(),
                reason: format!("unknown strategy '{strategy_name}'"),
            })?;

    let tickers = match adapter.get_non_empty("simulation", "tickers") {
        Some(list) => parse_tickers(&list)?,
        None => Vec::new(),
    };

    let rebalance = if adapter.get_bool("simulation", "rebalance", false) {
        RebalancePolicy::WeightBands
    } else {
        RebalancePolicy::Hold
    };

    Ok(SimulationConfig {
        initial_cash: adapter.get_double("simulation", "initial_cash", DEFAULT_INITIAL_CASH),
        start_date,
        end_date,
        tickers,
        strategy,
        rebalance,
        bands: WeightBands {
            max_weight: adapter.get_double("simulation", "max_weight", MAX_WEIGHT),
            min_weight: adapter.get_double("simulation", "min_weight", MIN_WEIGHT),
        },
    })
}

/// Load the identifier table from `tickers_file` when configured, otherwise
/// fetch it from the registry.
pub fn load_ticker_table(
    adapter: &dyn ConfigPort,
    source: &dyn FilingSource,
) -> Result<CikTable, EdgarfolioError> {
    let content = match adapter.get_non_empty("edgar", "tickers_file") {
        Some(path) => {
            info!(%path, "reading ticker table");
            fs::read_to_string(&path)?
        }
        None => match source.fetch_company_tickers() {
            Fetched::Retrieved(body) => body,
            Fetched::Unavailable(failure) => {
                return Err(EdgarfolioError::TickerTable {
                    reason: failure.to_string(),
                })
            }
        },
    };
    CikTable::from_json(&content)
}

fn run_filings(
    config_path: &Path,
    ticker: &str,
    limit: Option<usize>,
    output: Option<&Path>,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_edgar_config(&adapter) {
        return report_error(&e);
    }

    let source = match build_edgar_settings(&adapter).and_then(EdgarHttpAdapter::new) {
        Ok(s) => s,
        Err(e) => return report_error(&e),
    };

    let table = match load_ticker_table(&adapter, &source) {
        Ok(t) => t,
        Err(e) => return report_error(&e),
    };

    let settings = build_filing_settings(&adapter, limit);
    run_filings_pipeline(&source, &table, ticker, settings, output)
}

pub fn run_filings_pipeline(
    source: &dyn FilingSource,
    table: &CikTable,
    ticker: &str,
    settings: FilingSettings,
    output: Option<&Path>,
) -> ExitCode {
    eprintln!("Collecting filings for {ticker}...");
    let report = match collect_filings(source, table, ticker, settings) {
        Ok(FilingCollection::Processed(report)) => report,
        Ok(FilingCollection::IndexUnavailable { cik, failure }) => {
            eprintln!("Filing index for {ticker} (CIK {cik}) unavailable: {failure}");
            return ExitCode::from(5);
        }
        Err(e) => return report_error(&e),
    };

    eprintln!("\n=== Filings: {} (CIK {}) ===", report.ticker, report.cik);
    for (date, metrics) in report.extracted() {
        let found: Vec<String> = metrics
            .iter()
            .map(|(metric, value)| match value {
                Some(v) => format!("{metric}={v}"),
                None => format!("{metric}=?"),
            })
            .collect();
        eprintln!("  {}: {}", date, found.join(", "));
    }
    eprintln!(
        "Quarterly: {} extracted, {} unavailable; annual skipped: {}",
        report.extracted().count(),
        report.unavailable_count(),
        report.annual_skipped
    );

    if let Some(path) = output {
        if let Err(e) = CsvReportAdapter.write_filing_metrics(&report, path) {
            return report_error(&e);
        }
        eprintln!("\nMetrics written to: {}", path.display());
    }

    ExitCode::SUCCESS
}

fn run_simulate(
    config_path: &Path,
    strategy_override: Option<&str>,
    output: Option<&Path>,
    trades: Option<&Path>,
    describe: bool,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_simulation_config(&adapter) {
        return report_error(&e);
    }

    let config = match build_simulation_config(&adapter, strategy_override) {
        Ok(c) => c,
        Err(e) => return report_error(&e),
    };

    let price_dir = match adapter.get_non_empty("data", "price_dir") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let err = EdgarfolioError::ConfigMissing {
                section: "data".into(),
                key: "price_dir".into(),
            };
            return report_error(&err);
        }
    };

    let prices = CsvPriceAdapter::new(price_dir);
    run_simulation_pipeline(&prices, &config, output, trades, describe)
}

pub fn run_simulation_pipeline(
    price_port: &dyn PricePort,
    config: &SimulationConfig,
    output: Option<&Path>,
    trades: Option<&Path>,
    describe: bool,
) -> ExitCode {
    let tickers = config.traded_tickers();
    if tickers.is_empty() {
        eprintln!("error: no tickers configured");
        return ExitCode::from(2);
    }

    eprintln!(
        "Loading prices for {} tickers, {} to {}",
        tickers.len(),
        config.start_date,
        config.end_date
    );
    let universe =
        match load_price_universe(price_port, &tickers, config.start_date, config.end_date) {
            Ok(u) => u,
            Err(e) => return report_error(&e),
        };

    let mut config = config.clone();
    if config.strategy == SetupStrategy::EqualWeight && !universe.skipped.is_empty() {
        config.tickers = universe.loaded.clone();
        eprintln!(
            "Simulating {} of {} tickers",
            universe.loaded.len(),
            tickers.len()
        );
    }

    let history = PriceHistory::from_bars(universe.bars);
    eprintln!(
        "Running simulation: {} ({} trading days)",
        config.strategy.name(),
        history.len()
    );

    let result = match run_simulation(&history, &config, |portfolio| {
        if describe {
            println!("{portfolio}\n");
        }
    }) {
        Ok(r) => r,
        Err(e) => return report_error(&e),
    };

    let initial = result.initial_worth().unwrap_or(config.initial_cash);
    let change = if initial > 0.0 {
        (result.final_worth() / initial - 1.0) * 100.0
    } else {
        0.0
    };

    eprintln!("\n=== Simulation Results ===");
    eprintln!("Period:           {} to {}", result.first_day, result.last_day);
    eprintln!("Days:             {}", result.days);
    eprintln!("Initial Worth:    {:.2}", initial);
    eprintln!("Final Worth:      {:.2}", result.final_worth());
    eprintln!("Change:           {:.2}%", change);
    eprintln!("Cash:             {:.2}", result.portfolio.cash);
    for (ticker, position) in &result.portfolio.positions {
        eprintln!(
            "  {}:  {} shares @ {:.2}, weight {:.1}%",
            ticker,
            position.quantity,
            position.price,
            position.weight(result.portfolio.worth) * 100.0
        );
    }

    let reporter = CsvReportAdapter;
    if let Some(path) = output {
        if let Err(e) = reporter.write_worth_history(&result.portfolio, path) {
            return report_error(&e);
        }
        eprintln!("\nWorth history written to: {}", path.display());
    }
    if let Some(path) = trades {
        if let Err(e) = reporter.write_trades(&result.portfolio, path) {
            return report_error(&e);
        }
        eprintln!("Trade ledger written to: {}", path.display());
    }

    ExitCode::SUCCESS
}

fn run_validate(config_path: &Path) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let mut checked = 0;
    if adapter.get_string("edgar", "user_agent").is_some() {
        if let Err(e) = validate_edgar_config(&adapter) {
            return report_error(&e);
        }
        checked += 1;
        eprintln!("[edgar] OK");
    }
    if adapter.get_string("simulation", "tickers").is_some()
        || adapter.get_string("simulation", "strategy").is_some()
    {
        if let Err(e) = validate_simulation_config(&adapter) {
            return report_error(&e);
        }
        checked += 1;
        eprintln!("[simulation] OK");
    }

    if checked == 0 {
        eprintln!("error: no [edgar] or [simulation] settings found");
        return ExitCode::from(2);
    }

    eprintln!("Configuration valid.");
    ExitCode::SUCCESS
}
