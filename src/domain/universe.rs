//! Ticker universe for simulation runs.
//!
//! Parses ticker lists from configuration and loads closing prices for each,
//! skipping tickers the price source has nothing for.

use crate::domain::error::EdgarfolioError;
use crate::domain::price_history::PriceBar;
use crate::ports::price_port::PricePort;
use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::{info, warn};

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in ticker list")]
    EmptyToken,

    #[error("duplicate ticker: {0}")]
    DuplicateTicker(String),

    #[error("no prices for any of: {0}")]
    AllTickersFailed(String),
}

pub fn parse_tickers(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut tickers = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let ticker = trimmed.to_uppercase();
        if !seen.insert(ticker.clone()) {
            return Err(UniverseError::DuplicateTicker(ticker));
        }
        tickers.push(ticker);
    }

    Ok(tickers)
}

#[derive(Debug, Clone)]
pub struct SkippedTicker {
    pub ticker: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct LoadedUniverse {
    pub bars: Vec<PriceBar>,
    pub loaded: Vec<String>,
    pub skipped: Vec<SkippedTicker>,
}

/// Fetch closes for every ticker in `[start_date, end_date)`.
///
/// Fails only when no ticker yields any data.
pub fn load_price_universe(
    price_port: &dyn PricePort,
    tickers: &[String],
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<LoadedUniverse, EdgarfolioError> {
    let mut bars = Vec::new();
    let mut loaded = Vec::new();
    let mut skipped = Vec::new();

    for ticker in tickers {
        let reason = match price_port.fetch_closes(ticker, start_date, end_date) {
            Ok(series) if !series.is_empty() => {
                info!(%ticker, bars = series.len(), "prices loaded");
                bars.extend(series);
                loaded.push(ticker.clone());
                continue;
            }
            Ok(_) => "no data found".to_string(),
            Err(e) => e.to_string(),
        };
        warn!(%ticker, %reason, "skipping ticker");
        skipped.push(SkippedTicker {
            ticker: ticker.clone(),
            reason,
        });
    }

    if loaded.is_empty() {
        return Err(UniverseError::AllTickersFailed(tickers.join(",")).into());
    }

    Ok(LoadedUniverse {
        bars,
        loaded,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedPrices;

    impl PricePort for FixedPrices {
        fn fetch_closes(
            &self,
            ticker: &str,
            start_date: NaiveDate,
            _end_date: NaiveDate,
        ) -> Result<Vec<PriceBar>, EdgarfolioError> {
            match ticker {
                "AAPL" => Ok(vec![PriceBar {
                    ticker: ticker.to_string(),
                    date: start_date,
                    close: 10.0,
                }]),
                "EMPTY" => Ok(Vec::new()),
                _ => Err(EdgarfolioError::PriceData {
                    reason: format!("no file for {ticker}"),
                }),
            }
        }
    }

    fn span() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
        )
    }

    #[test]
    fn test_parse_tickers_basic() {
        let result = parse_tickers("AAPL,MSFT,NVDA").unwrap();
        assert_eq!(result, vec!["AAPL", "MSFT", "NVDA"]);
    }

    #[test]
    fn test_parse_tickers_trims_and_uppercases() {
        let result = parse_tickers("  aapl , msft ,^gspc").unwrap();
        assert_eq!(result, vec!["AAPL", "MSFT", "^GSPC"]);
    }

    #[test]
    fn test_parse_tickers_empty_token() {
        let result = parse_tickers("AAPL,,MSFT");
        assert!(matches!(result, Err(UniverseError::EmptyToken)));
    }

    #[test]
    fn test_parse_tickers_duplicate() {
        let result = parse_tickers("AAPL,MSFT,aapl");
        assert!(matches!(result, Err(UniverseError::DuplicateTicker(s)) if s == "AAPL"));
    }

    #[test]
    fn test_load_skips_missing_tickers() {
        let (start, end) = span();
        let tickers = vec!["AAPL".to_string(), "EMPTY".to_string(), "GONE".to_string()];
        let universe = load_price_universe(&FixedPrices, &tickers, start, end).unwrap();
        assert_eq!(universe.loaded, vec!["AAPL"]);
        assert_eq!(universe.bars.len(), 1);
        assert_eq!(universe.skipped.len(), 2);
        assert_eq!(universe.skipped[0].reason, "no data found");
    }

    #[test]
    fn test_load_fails_when_nothing_loads() {
        let (start, end) = span();
        let tickers = vec!["GONE".to_string()];
        let err = load_price_universe(&FixedPrices, &tickers, start, end).unwrap_err();
        assert!(matches!(
            err,
            EdgarfolioError::Universe(UniverseError::AllTickersFailed(_))
        ));
    }
}
