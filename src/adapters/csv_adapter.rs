//! CSV price file adapter.
//!
//! One file per ticker at `{base}/{TICKER}.csv`. The header must name a
//! `date` column (YYYY-MM-DD) and a `close` column; `adj close` is used
//! when `close` is absent. Other columns are ignored.

use crate::domain::error::EdgarfolioError;
use crate::domain::price_history::PriceBar;
use crate::ports::price_port::PricePort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvPriceAdapter {
    base_path: PathBuf,
}

impl CsvPriceAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker))
    }
}

fn data_error(reason: String) -> EdgarfolioError {
    EdgarfolioError::PriceData { reason }
}

fn column(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    names.iter().find_map(|name| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    })
}

impl PricePort for CsvPriceAdapter {
    fn fetch_closes(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, EdgarfolioError> {
        let path = self.csv_path(ticker);
        let content = fs::read_to_string(&path)
            .map_err(|e| data_error(format!("failed to read {}: {}", path.display(), e)))?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| data_error(format!("CSV header error in {}: {}", path.display(), e)))?
            .clone();
        let date_col = column(&headers, &["date"])
            .ok_or_else(|| data_error(format!("{}: missing date column", path.display())))?;
        let close_col = column(&headers, &["close", "adj close", "adj_close"])
            .ok_or_else(|| data_error(format!("{}: missing close column", path.display())))?;

        let mut bars = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| data_error(format!("CSV parse error: {}", e)))?;

            let date_str = record.get(date_col).unwrap_or_default().trim();
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
                .map_err(|e| data_error(format!("invalid date {:?}: {}", date_str, e)))?;

            if date < start_date || date >= end_date {
                continue;
            }

            let close_str = record.get(close_col).unwrap_or_default().trim();
            let close: f64 = close_str
                .parse()
                .map_err(|e| data_error(format!("invalid close value {:?}: {}", close_str, e)))?;
            if !close.is_finite() || close <= 0.0 {
                return Err(data_error(format!(
                    "{}: close on {} must be positive, got {}",
                    path.display(),
                    date,
                    close_str
                )));
            }

            bars.push(PriceBar {
                ticker: ticker.to_string(),
                date,
                close,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}
