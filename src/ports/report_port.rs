//! Report generation port.

use crate::domain::error::EdgarfolioError;
use crate::domain::filings::FilingReport;
use crate::domain::portfolio::Portfolio;
use std::path::Path;

/// Port for writing simulation and extraction results.
pub trait ReportPort {
    fn write_worth_history(&self, portfolio: &Portfolio, output: &Path) -> Result<(), EdgarfolioError>;

    fn write_trades(&self, portfolio: &Portfolio, output: &Path) -> Result<(), EdgarfolioError>;

    fn write_filing_metrics(&self, report: &FilingReport, output: &Path) -> Result<(), EdgarfolioError>;
}
