//! CLI integration tests for command orchestration.
//!
//! Tests cover:
//! - Config parsing (build_edgar_settings, build_filing_settings, build_simulation_config)
//! - Ticker table loading from a local file and from the registry
//! - Validation with real INI files on disk
//! - Filing and simulation pipelines with mock ports, including CSV output

mod common;

use common::*;
use edgarfolio::adapters::file_config_adapter::FileConfigAdapter;
use edgarfolio::cli;
use edgarfolio::domain::cik::{Cik, CikTable};
use edgarfolio::domain::config_validation::{validate_edgar_config, validate_simulation_config};
use edgarfolio::domain::error::EdgarfolioError;
use edgarfolio::domain::filings::FilingSettings;
use edgarfolio::domain::portfolio::SetupStrategy;
use edgarfolio::domain::simulation::RebalancePolicy;
use std::io::Write;
use std::process::ExitCode;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const VALID_INI: &str = r#"
[edgar]
user_agent = Jane Doe jane@example.com
submissions_url = http://localhost:8080/submissions
timeout_secs = 5
filing_window = 12
filing_limit = 4

[simulation]
initial_cash = 50000
start_date = 2018-01-01
end_date = 2023-01-01
tickers = aapl, msft
strategy = equal_weight
rebalance = true
max_weight = 0.4
min_weight = 0.1

[data]
price_dir = /tmp/prices
"#;

fn adapter(content: &str) -> FileConfigAdapter {
    FileConfigAdapter::from_string(content).unwrap()
}

mod config_loading {
    use super::*;

    #[test]
    fn edgar_settings_from_config() {
        let settings = cli::build_edgar_settings(&adapter(VALID_INI)).unwrap();
        assert_eq!(settings.user_agent, "Jane Doe jane@example.com");
        assert_eq!(settings.submissions_url, "http://localhost:8080/submissions");
        assert_eq!(
            settings.archives_url,
            "https://www.sec.gov/Archives/edgar/data"
        );
        assert_eq!(settings.timeout_secs, 5);
    }

    #[test]
    fn edgar_settings_require_user_agent() {
        let err = cli::build_edgar_settings(&adapter("[edgar]\n")).unwrap_err();
        assert!(matches!(err, EdgarfolioError::ConfigMissing { key, .. } if key == "user_agent"));
    }

    #[test]
    fn filing_settings_from_config() {
        let settings = cli::build_filing_settings(&adapter(VALID_INI), None);
        assert_eq!(
            settings,
            FilingSettings {
                window: 12,
                limit: Some(4)
            }
        );
    }

    #[test]
    fn filing_limit_override_and_zero() {
        let cfg = adapter(VALID_INI);
        assert_eq!(cli::build_filing_settings(&cfg, Some(2)).limit, Some(2));
        assert_eq!(cli::build_filing_settings(&cfg, Some(0)).limit, None);
        assert_eq!(
            cli::build_filing_settings(&adapter("[edgar]\n"), None),
            FilingSettings::default()
        );
    }

    #[test]
    fn simulation_config_from_config() {
        let config = cli::build_simulation_config(&adapter(VALID_INI), None).unwrap();
        assert_eq!(config.initial_cash, 50_000.0);
        assert_eq!(config.start_date, date("2018-01-01"));
        assert_eq!(config.end_date, date("2023-01-01"));
        assert_eq!(config.tickers, vec!["AAPL", "MSFT"]);
        assert_eq!(config.strategy, SetupStrategy::EqualWeight);
        assert_eq!(config.rebalance, RebalancePolicy::WeightBands);
        assert_eq!(config.bands.max_weight, 0.4);
        assert_eq!(config.bands.min_weight, 0.1);
    }

    #[test]
    fn simulation_defaults() {
        let config = cli::build_simulation_config(&adapter("[simulation]\ntickers = NVDA\n"), None).unwrap();
        assert_eq!(config.initial_cash, 100_000.0);
        assert_eq!(config.start_date, date("2017-01-01"));
        assert_eq!(config.end_date, date("2024-01-01"));
        assert_eq!(config.rebalance, RebalancePolicy::Hold);
        assert_eq!(config.bands.max_weight, 0.5);
        assert_eq!(config.bands.min_weight, 0.05);
    }

    #[test]
    fn strategy_override_selects_single_stock() {
        let config = cli::build_simulation_config(&adapter(VALID_INI), Some("best_stock")).unwrap();
        assert_eq!(
            config.strategy,
            SetupStrategy::BestStock {
                ticker: "NVDA".into()
            }
        );
        assert_eq!(config.traded_tickers(), vec!["NVDA"]);

        let market = cli::build_simulation_config(&adapter(VALID_INI), Some("market")).unwrap();
        assert_eq!(market.traded_tickers(), vec!["^GSPC"]);
    }

    #[test]
    fn unknown_strategy_override_rejected() {
        let err = cli::build_simulation_config(&adapter(VALID_INI), Some("momentum")).unwrap_err();
        assert!(matches!(err, EdgarfolioError::ConfigInvalid { key, .. } if key == "strategy"));
    }
}

mod ticker_table {
    use super::*;

    #[test]
    fn loads_from_tickers_file() {
        let mut json = tempfile::NamedTempFile::new().unwrap();
        json.write_all(TICKERS_JSON.as_bytes()).unwrap();
        let ini = format!(
            "[edgar]\nuser_agent = x y@z.com\ntickers_file = {}\n",
            json.path().display()
        );
        let source = MockFilingSource::new();

        let table = cli::load_ticker_table(&adapter(&ini), &source).unwrap();

        assert_eq!(table.resolve("NVDA").unwrap(), Cik(1045810));
        assert!(source.requests.borrow().is_empty());
    }

    #[test]
    fn fetches_when_no_file_configured() {
        let source = MockFilingSource::new().with_tickers(TICKERS_JSON);
        let table = cli::load_ticker_table(&adapter(VALID_INI), &source).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(*source.requests.borrow(), vec!["tickers"]);
    }

    #[test]
    fn unavailable_registry_is_table_error() {
        let source = MockFilingSource::new();
        let err = cli::load_ticker_table(&adapter(VALID_INI), &source).unwrap_err();
        assert!(matches!(err, EdgarfolioError::TickerTable { .. }));
    }
}

mod validation_on_disk {
    use super::*;

    #[test]
    fn valid_ini_passes_both_sections() {
        let file = write_temp_ini(VALID_INI);
        let config = cli::load_config(file.path()).unwrap();
        assert!(validate_edgar_config(&config).is_ok());
        assert!(validate_simulation_config(&config).is_ok());
    }

    #[test]
    fn missing_file_maps_to_config_exit_code() {
        let result = cli::load_config(std::path::Path::new("/nonexistent/edgarfolio.ini"));
        assert_eq!(result.err(), Some(ExitCode::from(2)));
    }
}

mod pipelines {
    use super::*;

    #[test]
    fn filings_pipeline_writes_csv() {
        let submissions = submissions_json(&[("10-Q", "2023-07-01", "0000320193-23-000077")]);
        let source = MockFilingSource::new()
            .with_submissions(320193, &submissions)
            .with_filing(
                "0000320193-23-000077",
                &quarterly_submission("81,797", "(1,204)", "1.27"),
            );
        let table = CikTable::from_json(TICKERS_JSON).unwrap();
        let dir = tempfile::TempDir::new().unwrap();
        let output = dir.path().join("aapl.csv");

        let code = cli::run_filings_pipeline(
            &source,
            &table,
            "AAPL",
            FilingSettings::default(),
            Some(&output),
        );

        assert_eq!(code, ExitCode::SUCCESS);
        let content = std::fs::read_to_string(output).unwrap();
        assert_eq!(
            content,
            "report_date,revenue,gross_profit,operating_income,net_income,eps\n\
             2023-07-01,81797,36413,22998,-1204,1.27\n"
        );
    }

    #[test]
    fn filings_pipeline_unknown_ticker_exit_code() {
        let source = MockFilingSource::new();
        let table = CikTable::from_json(TICKERS_JSON).unwrap();
        let code = cli::run_filings_pipeline(&source, &table, "ZZZZ", FilingSettings::default(), None);
        assert_eq!(code, ExitCode::from(4));
    }

    #[test]
    fn filings_pipeline_missing_index_exit_code() {
        let source = MockFilingSource::new();
        let table = CikTable::from_json(TICKERS_JSON).unwrap();
        let code = cli::run_filings_pipeline(&source, &table, "AAPL", FilingSettings::default(), None);
        assert_eq!(code, ExitCode::from(5));
    }

    #[test]
    fn simulation_pipeline_skips_missing_ticker_and_writes_reports() {
        let port = MockPriceData::new()
            .with_closes(
                "AAPL",
                &[("2019-01-02", 39.48), ("2019-01-03", 35.55), ("2019-01-04", 37.06)],
            )
            .with_error("MSFT", "no file");
        let config = cli::build_simulation_config(&adapter(VALID_INI), None).unwrap();
        let dir = tempfile::TempDir::new().unwrap();
        let worth = dir.path().join("worth.csv");
        let trades = dir.path().join("trades.csv");

        let code = cli::run_simulation_pipeline(&port, &config, Some(&worth), Some(&trades), false);

        assert_eq!(code, ExitCode::SUCCESS);
        let worth = std::fs::read_to_string(worth).unwrap();
        assert_eq!(worth.lines().count(), 4);
        let trades = std::fs::read_to_string(trades).unwrap();
        assert!(trades.lines().nth(1).unwrap().starts_with("2019-01-02,AAPL,39.48,"));
        assert!(!trades.contains("MSFT"));
    }

    #[test]
    fn simulation_pipeline_without_prices_fails() {
        let port = MockPriceData::new();
        let config = cli::build_simulation_config(&adapter(VALID_INI), None).unwrap();
        let code = cli::run_simulation_pipeline(&port, &config, None, None, false);
        assert_eq!(code, ExitCode::from(2));
    }
}
