//! Daily closing prices keyed by date and ticker.
//!
//! Whatever shape the price source delivers, the simulation only ever sees
//! this per-ticker table, so single- and multi-ticker runs share one path.

use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::position::round_cents;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub ticker: String,
    pub date: NaiveDate,
    pub close: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceHistory {
    closes: BTreeMap<NaiveDate, HashMap<String, f64>>,
    tickers: BTreeSet<String>,
}

impl PriceHistory {
    /// Build the table, rounding every close to cents. A repeated
    /// (date, ticker) pair keeps the last bar.
    pub fn from_bars(bars: impl IntoIterator<Item = PriceBar>) -> Self {
        let mut history = PriceHistory::default();
        for bar in bars {
            history.tickers.insert(bar.ticker.clone());
            history
                .closes
                .entry(bar.date)
                .or_default()
                .insert(bar.ticker, round_cents(bar.close));
        }
        history
    }

    /// Trading dates across all tickers, ascending.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.closes.keys().copied()
    }

    pub fn closes_on(&self, date: NaiveDate) -> Option<&HashMap<String, f64>> {
        self.closes.get(&date)
    }

    pub fn close(&self, date: NaiveDate, ticker: &str) -> Option<f64> {
        self.closes.get(&date)?.get(ticker).copied()
    }

    /// First date on which every ticker in `tickers` has a close.
    pub fn first_complete_date(&self, tickers: &[String]) -> Option<NaiveDate> {
        self.closes
            .iter()
            .find(|(_, day)| tickers.iter().all(|t| day.contains_key(t)))
            .map(|(date, _)| *date)
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.tickers.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }
}
