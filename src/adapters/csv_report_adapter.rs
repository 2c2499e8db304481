//! CSV report writer for simulation and filing results.

use crate::domain::error::EdgarfolioError;
use crate::domain::filings::FilingReport;
use crate::domain::income_statement::Metric;
use crate::domain::portfolio::Portfolio;
use crate::ports::report_port::ReportPort;
use std::path::Path;

pub struct CsvReportAdapter;

/// Cell for a metric whose row was found but whose value did not parse.
pub const NULL_CELL: &str = "null";

fn csv_error(output: &Path, e: csv::Error) -> EdgarfolioError {
    EdgarfolioError::Io(std::io::Error::other(format!(
        "failed to write {}: {}",
        output.display(),
        e
    )))
}

fn writer(output: &Path) -> Result<csv::Writer<std::fs::File>, EdgarfolioError> {
    csv::Writer::from_path(output).map_err(|e| csv_error(output, e))
}

impl ReportPort for CsvReportAdapter {
    fn write_worth_history(&self, portfolio: &Portfolio, output: &Path) -> Result<(), EdgarfolioError> {
        let mut wtr = writer(output)?;
        wtr.write_record(["date", "worth"])
            .map_err(|e| csv_error(output, e))?;
        for (date, worth) in &portfolio.worth_history {
            wtr.write_record([date.to_string(), format!("{:.2}", worth)])
                .map_err(|e| csv_error(output, e))?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn write_trades(&self, portfolio: &Portfolio, output: &Path) -> Result<(), EdgarfolioError> {
        let mut wtr = writer(output)?;
        wtr.write_record(["date", "ticker", "price", "quantity"])
            .map_err(|e| csv_error(output, e))?;
        for (date, day) in &portfolio.trades {
            for (ticker, trade) in day {
                wtr.write_record([
                    date.to_string(),
                    ticker.clone(),
                    format!("{:.2}", trade.price),
                    trade.quantity.to_string(),
                ])
                .map_err(|e| csv_error(output, e))?;
            }
        }
        wtr.flush()?;
        Ok(())
    }

    /// One row per extracted report date. A metric found with an unparsable
    /// value is written as `null`, an absent metric as an empty cell.
    fn write_filing_metrics(&self, report: &FilingReport, output: &Path) -> Result<(), EdgarfolioError> {
        let mut wtr = writer(output)?;
        let mut header = vec!["report_date"];
        header.extend(Metric::ALL.iter().map(|m| m.column()));
        wtr.write_record(&header).map_err(|e| csv_error(output, e))?;

        for (date, metrics) in report.extracted() {
            let mut row = vec![date.to_string()];
            row.extend(
                Metric::ALL
                    .iter()
                    .map(|m| match metrics.get(*m) {
                        Some(Some(v)) => v.to_string(),
                        Some(None) => NULL_CELL.to_string(),
                        None => String::new(),
                    }),
            );
            wtr.write_record(&row).map_err(|e| csv_error(output, e))?;
        }
        wtr.flush()?;
        Ok(())
    }
}
