//! Filing orchestration: resolve a ticker, load its filing index, and
//! extract metrics from each quarterly report.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::{info, warn};

use super::cik::{Cik, CikTable};
use super::error::EdgarfolioError;
use super::filing::{
    AccessionId, FetchFailure, Fetched, FilingIndex, FilingIndexOutcome, FormType,
    DEFAULT_FILING_WINDOW,
};
use super::income_statement::ExtractedMetrics;
use super::statement_parser::extract_income_statement;
use crate::ports::filing_port::FilingSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilingSettings {
    /// Most recent periodic filings kept in the index.
    pub window: usize,
    /// Records processed from the start of the index; `None` processes all.
    pub limit: Option<usize>,
}

impl Default for FilingSettings {
    fn default() -> Self {
        FilingSettings {
            window: DEFAULT_FILING_WINDOW,
            limit: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilingOutcome {
    Extracted(ExtractedMetrics),
    Unavailable(FetchFailure),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilingReport {
    pub ticker: String,
    pub cik: Cik,
    pub filings: BTreeMap<NaiveDate, FilingOutcome>,
    pub annual_skipped: usize,
}

impl FilingReport {
    pub fn extracted(&self) -> impl Iterator<Item = (&NaiveDate, &ExtractedMetrics)> {
        self.filings.iter().filter_map(|(date, outcome)| match outcome {
            FilingOutcome::Extracted(metrics) => Some((date, metrics)),
            FilingOutcome::Unavailable(_) => None,
        })
    }

    pub fn unavailable_count(&self) -> usize {
        self.filings
            .values()
            .filter(|o| matches!(o, FilingOutcome::Unavailable(_)))
            .count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilingCollection {
    Processed(FilingReport),
    /// The filer's index could not be loaded, so nothing was processed.
    IndexUnavailable { cik: Cik, failure: FetchFailure },
}

/// Fetch and build the filing index for `cik`.
pub fn load_filing_index(source: &dyn FilingSource, cik: Cik, window: usize) -> FilingIndexOutcome {
    match source.fetch_submissions(cik) {
        Fetched::Retrieved(body) => match FilingIndex::from_submissions_json(&body, window) {
            Ok(index) => {
                info!(%cik, filings = index.len(), "filing index loaded");
                FilingIndexOutcome::Ready(index)
            }
            Err(e) => {
                warn!(%cik, error = %e, "submissions payload could not be decoded");
                FilingIndexOutcome::Unavailable(FetchFailure {
                    url: format!("submissions for CIK{}", cik.padded()),
                    status: None,
                    reason: format!("decode error: {e}"),
                })
            }
        },
        Fetched::Unavailable(failure) => FilingIndexOutcome::Unavailable(failure),
    }
}

/// Fetch one quarterly report and extract its income-statement metrics.
pub fn process_quarterly(source: &dyn FilingSource, cik: Cik, accession: &AccessionId) -> FilingOutcome {
    match source.fetch_filing(cik, accession) {
        Fetched::Retrieved(body) => FilingOutcome::Extracted(extract_income_statement(&body)),
        Fetched::Unavailable(failure) => FilingOutcome::Unavailable(failure),
    }
}

/// Walk the index in order, parsing quarterly reports keyed by report date.
/// Annual reports are counted and skipped.
pub fn process_filings(
    source: &dyn FilingSource,
    ticker: &str,
    cik: Cik,
    index: &FilingIndex,
    limit: Option<usize>,
) -> FilingReport {
    let mut report = FilingReport {
        ticker: ticker.to_string(),
        cik,
        filings: BTreeMap::new(),
        annual_skipped: 0,
    };

    let take = limit.unwrap_or(usize::MAX);
    for record in index.iter().take(take) {
        match record.form {
            FormType::QuarterlyReport => {
                let outcome = process_quarterly(source, cik, &record.accession);
                if let FilingOutcome::Extracted(metrics) = &outcome {
                    info!(
                        %ticker,
                        report_date = %record.report_date,
                        metrics = metrics.len(),
                        "quarterly report processed"
                    );
                }
                report.filings.insert(record.report_date, outcome);
            }
            FormType::AnnualReport => {
                report.annual_skipped += 1;
            }
        }
    }

    report
}

/// Resolve `ticker`, load its index and process its filings.
///
/// An unknown ticker is an error; an unreachable registry is not.
pub fn collect_filings(
    source: &dyn FilingSource,
    table: &CikTable,
    ticker: &str,
    settings: FilingSettings,
) -> Result<FilingCollection, EdgarfolioError> {
    let cik = table.resolve(ticker)?;

    let index = match load_filing_index(source, cik, settings.window) {
        FilingIndexOutcome::Ready(index) => index,
        FilingIndexOutcome::Unavailable(failure) => {
            return Ok(FilingCollection::IndexUnavailable { cik, failure });
        }
    };

    Ok(FilingCollection::Processed(process_filings(
        source,
        ticker,
        cik,
        &index,
        settings.limit,
    )))
}
