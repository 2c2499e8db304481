//! Remote filing registry port.

use crate::domain::cik::Cik;
use crate::domain::filing::{AccessionId, Fetched};

/// Source of registry payloads. Implementations report failed requests as
/// [`Fetched::Unavailable`] and never retry.
pub trait FilingSource {
    /// The ticker to CIK table (`company_tickers.json`).
    fn fetch_company_tickers(&self) -> Fetched<String>;

    /// The submissions JSON for one filer.
    fn fetch_submissions(&self, cik: Cik) -> Fetched<String>;

    /// The full text submission of one filing, all exhibits included.
    fn fetch_filing(&self, cik: Cik, accession: &AccessionId) -> Fetched<String>;
}
