//! Domain error types.
//!
//! An unreachable endpoint or a non-success status is not an error here; it
//! is reported through [`crate::domain::filing::Fetched`].

use chrono::NaiveDate;

use super::universe::UniverseError;

/// Top-level error type for edgarfolio.
#[derive(Debug, thiserror::Error)]
pub enum EdgarfolioError {
    #[error("ticker {ticker} not found in identifier table")]
    TickerNotFound { ticker: String },

    #[error("invalid ticker table: {reason}")]
    TickerTable { reason: String },

    #[error("http client error: {reason}")]
    Http { reason: String },

    #[error("price data error: {reason}")]
    PriceData { reason: String },

    #[error("no price for {ticker} on {date}")]
    MissingPrice { ticker: String, date: NaiveDate },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Universe(#[from] UniverseError),

    #[error("no data: {reason}")]
    NoData { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&EdgarfolioError> for std::process::ExitCode {
    fn from(err: &EdgarfolioError) -> Self {
        let code: u8 = match err {
            EdgarfolioError::Io(_) => 1,
            EdgarfolioError::ConfigParse { .. }
            | EdgarfolioError::ConfigMissing { .. }
            | EdgarfolioError::ConfigInvalid { .. }
            | EdgarfolioError::Universe(_) => 2,
            EdgarfolioError::PriceData { .. } | EdgarfolioError::MissingPrice { .. } => 3,
            EdgarfolioError::TickerNotFound { .. } | EdgarfolioError::TickerTable { .. } => 4,
            EdgarfolioError::NoData { .. } => 5,
            EdgarfolioError::Http { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
