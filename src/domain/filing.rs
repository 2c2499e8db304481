//! Filing records, the recent-filings index, and fetch outcomes.

use chrono::NaiveDate;
use serde::Deserialize;
use std::fmt;
use tracing::{debug, warn};

/// Number of most recent periodic filings kept. Older filings use a
/// different document layout and are not supported by the extractor.
pub const DEFAULT_FILING_WINDOW: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormType {
    QuarterlyReport,
    AnnualReport,
}

impl FormType {
    /// Map a registry form code. Amendments and every other form are ignored.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "10-Q" => Some(FormType::QuarterlyReport),
            "10-K" => Some(FormType::AnnualReport),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            FormType::QuarterlyReport => "10-Q",
            FormType::AnnualReport => "10-K",
        }
    }
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Opaque accession token, e.g. `0000320193-23-000077`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccessionId(pub String);

impl AccessionId {
    /// Directory segment used by the archive: the token without dashes.
    pub fn folder(&self) -> String {
        self.0.replace('-', "")
    }
}

impl fmt::Display for AccessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilingRecord {
    pub form: FormType,
    pub report_date: NaiveDate,
    pub accession: AccessionId,
}

/// Why a remote resource could not be obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub url: String,
    /// HTTP status when a response arrived; `None` for transport or decode failures.
    pub status: Option<u16>,
    pub reason: String,
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "[{}] {}: {}", status, self.url, self.reason),
            None => write!(f, "{}: {}", self.url, self.reason),
        }
    }
}

/// Result of a single outbound request. Failures are data, not errors.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    Retrieved(T),
    Unavailable(FetchFailure),
}

impl<T> Fetched<T> {
    pub fn ok(self) -> Option<T> {
        match self {
            Fetched::Retrieved(v) => Some(v),
            Fetched::Unavailable(_) => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct Submissions {
    filings: SubmissionFilings,
}

#[derive(Debug, Clone, Deserialize)]
struct SubmissionFilings {
    recent: RecentFilings,
}

/// The parallel-array `filings.recent` block of the submissions payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentFilings {
    #[serde(default)]
    pub form: Vec<String>,
    #[serde(default)]
    pub report_date: Vec<String>,
    #[serde(default)]
    pub accession_number: Vec<String>,
}

/// Periodic filings for one filer, oldest first, limited to the recent window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilingIndex {
    pub records: Vec<FilingRecord>,
}

impl FilingIndex {
    /// Build the index from registry rows, which arrive newest first.
    ///
    /// Keeps quarterly and annual reports only, reverses to oldest first and
    /// retains the last `window` records.
    pub fn from_recent(recent: &RecentFilings, window: usize) -> Self {
        let mut records: Vec<FilingRecord> = recent
            .form
            .iter()
            .zip(&recent.report_date)
            .zip(&recent.accession_number)
            .filter_map(|((form, report_date), accession)| {
                let form = FormType::from_code(form)?;
                match NaiveDate::parse_from_str(report_date, "%Y-%m-%d") {
                    Ok(report_date) => Some(FilingRecord {
                        form,
                        report_date,
                        accession: AccessionId(accession.clone()),
                    }),
                    Err(_) => {
                        warn!(%accession, report_date = %report_date, "skipping filing with unparsable report date");
                        None
                    }
                }
            })
            .collect();

        records.reverse();
        let excess = records.len().saturating_sub(window);
        records.drain(..excess);

        debug!(kept = records.len(), dropped = excess, "filing index built");
        Self { records }
    }

    /// Parse a submissions JSON body into an index.
    pub fn from_submissions_json(body: &str, window: usize) -> Result<Self, serde_json::Error> {
        let submissions: Submissions = serde_json::from_str(body)?;
        Ok(Self::from_recent(&submissions.filings.recent, window))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FilingRecord> {
        self.records.iter()
    }
}

/// Outcome of loading a filer's index. `Unavailable` means no index was set.
#[derive(Debug, Clone, PartialEq)]
pub enum FilingIndexOutcome {
    Ready(FilingIndex),
    Unavailable(FetchFailure),
}
