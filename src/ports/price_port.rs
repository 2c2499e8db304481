//! Historical price access port.

use crate::domain::error::EdgarfolioError;
use crate::domain::price_history::PriceBar;
use chrono::NaiveDate;

pub trait PricePort {
    /// Daily closes for `ticker` with `start <= date < end`, oldest first.
    fn fetch_closes(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, EdgarfolioError>;
}
