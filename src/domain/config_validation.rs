//! Configuration validation.
//!
//! Validates config fields before a command touches the network or prices.
//! Missing optional keys fall back to their defaults and pass.

use crate::domain::error::EdgarfolioError;
use crate::domain::portfolio::SetupStrategy;
use crate::domain::universe::parse_tickers;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const DEFAULT_START_DATE: &str = "2017-01-01";
pub const DEFAULT_END_DATE: &str = "2024-01-01";

pub fn validate_edgar_config(config: &dyn ConfigPort) -> Result<(), EdgarfolioError> {
    validate_user_agent(config)?;
    validate_positive_int(config, "edgar", "timeout_secs", 30)?;
    validate_positive_int(config, "edgar", "filing_window", 25)?;
    validate_filing_limit(config)?;
    Ok(())
}

pub fn validate_simulation_config(config: &dyn ConfigPort) -> Result<(), EdgarfolioError> {
    validate_initial_cash(config)?;
    validate_dates(config)?;
    validate_strategy(config)?;
    validate_weight_bands(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> EdgarfolioError {
    EdgarfolioError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_user_agent(config: &dyn ConfigPort) -> Result<(), EdgarfolioError> {
    match config.get_non_empty("edgar", "user_agent") {
        Some(_) => Ok(()),
        None => Err(EdgarfolioError::ConfigMissing {
            section: "edgar".to_string(),
            key: "user_agent".to_string(),
        }),
    }
}

fn validate_positive_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<(), EdgarfolioError> {
    if config.get_int(section, key, default) < 1 {
        return Err(invalid(section, key, &format!("{key} must be at least 1")));
    }
    Ok(())
}

fn validate_filing_limit(config: &dyn ConfigPort) -> Result<(), EdgarfolioError> {
    if config.get_int("edgar", "filing_limit", 0) < 0 {
        return Err(invalid(
            "edgar",
            "filing_limit",
            "filing_limit must be non-negative (0 means unbounded)",
        ));
    }
    Ok(())
}

fn validate_initial_cash(config: &dyn ConfigPort) -> Result<(), EdgarfolioError> {
    let value = config.get_double("simulation", "initial_cash", 100_000.0);
    if value <= 0.0 {
        return Err(invalid(
            "simulation",
            "initial_cash",
            "initial_cash must be positive",
        ));
    }
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), EdgarfolioError> {
    let start_date = config_date(config, "start_date", DEFAULT_START_DATE)?;
    let end_date = config_date(config, "end_date", DEFAULT_END_DATE)?;

    if start_date >= end_date {
        return Err(invalid(
            "simulation",
            "start_date",
            "start_date must be before end_date",
        ));
    }
    Ok(())
}

/// Read a `[simulation]` date, falling back to `default` when unset.
pub fn config_date(
    config: &dyn ConfigPort,
    field: &str,
    default: &str,
) -> Result<NaiveDate, EdgarfolioError> {
    let raw = config
        .get_non_empty("simulation", field)
        .unwrap_or_else(|| default.to_string());
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| {
        invalid(
            "simulation",
            field,
            &format!("invalid {field} format, expected YYYY-MM-DD"),
        )
    })
}

fn validate_strategy(config: &dyn ConfigPort) -> Result<(), EdgarfolioError> {
    let name = config
        .get_non_empty("simulation", "strategy")
        .unwrap_or_else(|| "equal_weight".to_string());
    let strategy = SetupStrategy::from_name(&name, "", "").ok_or_else(|| {
        invalid(
            "simulation",
            "strategy",
            "strategy must be one of equal_weight, best_stock, market",
        )
    })?;

    if strategy == SetupStrategy::EqualWeight {
        match config.get_non_empty("simulation", "tickers") {
            Some(list) => {
                parse_tickers(&list)?;
            }
            None => {
                return Err(EdgarfolioError::ConfigMissing {
                    section: "simulation".to_string(),
                    key: "tickers".to_string(),
                })
            }
        }
    }
    Ok(())
}

fn validate_weight_bands(config: &dyn ConfigPort) -> Result<(), EdgarfolioError> {
    let max_weight = config.get_double("simulation", "max_weight", 0.5);
    let min_weight = config.get_double("simulation", "min_weight", 0.05);
    if max_weight <= 0.0 || max_weight > 1.0 {
        return Err(invalid(
            "simulation",
            "max_weight",
            "max_weight must be in (0, 1]",
        ));
    }
    if min_weight <= 0.0 || min_weight >= max_weight {
        return Err(invalid(
            "simulation",
            "min_weight",
            "min_weight must be positive and below max_weight",
        ));
    }
    Ok(())
}
