//! Ticker to registry identifier (CIK) resolution.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

use super::error::EdgarfolioError;

/// Central Index Key of a filer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cik(pub u64);

impl Cik {
    /// Ten-digit zero-padded form expected by the submissions endpoint.
    pub fn padded(&self) -> String {
        format!("{:010}", self.0)
    }
}

impl fmt::Display for Cik {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TickerRow {
    pub ticker: String,
    pub cik_str: u64,
    #[serde(default)]
    pub title: String,
}

/// Exact-match lookup table from ticker symbol to CIK.
#[derive(Debug, Clone, Default)]
pub struct CikTable {
    rows: HashMap<String, Cik>,
}

impl CikTable {
    pub fn from_rows(rows: impl IntoIterator<Item = TickerRow>) -> Self {
        let mut table = HashMap::new();
        for row in rows {
            // company_tickers.json lists share classes in rank order; keep the first.
            table.entry(row.ticker).or_insert(Cik(row.cik_str));
        }
        Self { rows: table }
    }

    /// Parse the registry's `company_tickers.json` payload.
    ///
    /// Accepts either the published object form (`{"0": {...}, "1": {...}}`)
    /// or a plain array of rows.
    pub fn from_json(content: &str) -> Result<Self, EdgarfolioError> {
        let value: Value =
            serde_json::from_str(content).map_err(|e| EdgarfolioError::TickerTable {
                reason: e.to_string(),
            })?;

        let rows: Vec<Value> = match value {
            Value::Object(map) => {
                let mut entries: Vec<(String, Value)> = map.into_iter().collect();
                entries.sort_by_key(|(k, _)| k.parse::<u64>().unwrap_or(u64::MAX));
                entries.into_iter().map(|(_, v)| v).collect()
            }
            Value::Array(items) => items,
            _ => {
                return Err(EdgarfolioError::TickerTable {
                    reason: "expected a JSON object or array of ticker rows".into(),
                });
            }
        };

        let rows = rows
            .into_iter()
            .map(serde_json::from_value::<TickerRow>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| EdgarfolioError::TickerTable {
                reason: e.to_string(),
            })?;

        Ok(Self::from_rows(rows))
    }

    /// Resolve a ticker. No case folding and no fuzzy matching.
    pub fn resolve(&self, ticker: &str) -> Result<Cik, EdgarfolioError> {
        self.rows
            .get(ticker)
            .copied()
            .ok_or_else(|| EdgarfolioError::TickerNotFound {
                ticker: ticker.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
