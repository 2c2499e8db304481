#![allow(dead_code)]

use chrono::NaiveDate;
use edgarfolio::domain::cik::Cik;
use edgarfolio::domain::error::EdgarfolioError;
use edgarfolio::domain::filing::{AccessionId, FetchFailure, Fetched};
pub use edgarfolio::domain::price_history::PriceBar;
use edgarfolio::ports::filing_port::FilingSource;
use edgarfolio::ports::price_port::PricePort;
use std::cell::RefCell;
use std::collections::HashMap;

pub struct MockFilingSource {
    pub tickers: Option<String>,
    pub submissions: HashMap<u64, String>,
    pub filings: HashMap<String, String>,
    pub requests: RefCell<Vec<String>>,
}

impl MockFilingSource {
    pub fn new() -> Self {
        Self {
            tickers: None,
            submissions: HashMap::new(),
            filings: HashMap::new(),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn with_tickers(mut self, json: &str) -> Self {
        self.tickers = Some(json.to_string());
        self
    }

    pub fn with_submissions(mut self, cik: u64, json: &str) -> Self {
        self.submissions.insert(cik, json.to_string());
        self
    }

    pub fn with_filing(mut self, accession: &str, body: &str) -> Self {
        self.filings.insert(accession.to_string(), body.to_string());
        self
    }

    fn not_found(url: String) -> Fetched<String> {
        Fetched::Unavailable(FetchFailure {
            url,
            status: Some(404),
            reason: "Not Found".into(),
        })
    }
}

impl FilingSource for MockFilingSource {
    fn fetch_company_tickers(&self) -> Fetched<String> {
        self.requests.borrow_mut().push("tickers".into());
        match &self.tickers {
            Some(body) => Fetched::Retrieved(body.clone()),
            None => Self::not_found("company_tickers.json".into()),
        }
    }

    fn fetch_submissions(&self, cik: Cik) -> Fetched<String> {
        self.requests
            .borrow_mut()
            .push(format!("CIK{}.json", cik.padded()));
        match self.submissions.get(&cik.0) {
            Some(body) => Fetched::Retrieved(body.clone()),
            None => Self::not_found(format!("CIK{}.json", cik.padded())),
        }
    }

    fn fetch_filing(&self, cik: Cik, accession: &AccessionId) -> Fetched<String> {
        self.requests.borrow_mut().push(accession.0.clone());
        match self.filings.get(&accession.0) {
            Some(body) => Fetched::Retrieved(body.clone()),
            None => Self::not_found(format!("{}/{}/{}.txt", cik, accession.folder(), accession)),
        }
    }
}

pub struct MockPriceData {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
}

impl MockPriceData {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_closes(mut self, ticker: &str, closes: &[(&str, f64)]) -> Self {
        let bars = closes
            .iter()
            .map(|(date, close)| make_bar(ticker, date, *close))
            .collect();
        self.data.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl PricePort for MockPriceData {
    fn fetch_closes(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, EdgarfolioError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(EdgarfolioError::PriceData {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(ticker)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start_date && b.date < end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn make_bar(ticker: &str, day: &str, close: f64) -> PriceBar {
    PriceBar {
        ticker: ticker.to_string(),
        date: date(day),
        close,
    }
}

pub const TICKERS_JSON: &str = r#"{
  "0": {"cik_str": 320193, "ticker": "AAPL", "title": "Apple Inc."},
  "1": {"cik_str": 789019, "ticker": "MSFT", "title": "MICROSOFT CORP"},
  "2": {"cik_str": 1045810, "ticker": "NVDA", "title": "NVIDIA CORP"}
}"#;

/// Submissions payload with `filings.recent` listed newest first.
pub fn submissions_json(rows: &[(&str, &str, &str)]) -> String {
    let forms: Vec<String> = rows.iter().map(|(f, _, _)| format!("\"{f}\"")).collect();
    let dates: Vec<String> = rows.iter().map(|(_, d, _)| format!("\"{d}\"")).collect();
    let accessions: Vec<String> = rows.iter().map(|(_, _, a)| format!("\"{a}\"")).collect();
    format!(
        r#"{{"cik": "320193", "name": "Apple Inc.", "filings": {{"recent": {{
  "form": [{}],
  "reportDate": [{}],
  "accessionNumber": [{}]
}}, "files": []}}}}"#,
        forms.join(","),
        dates.join(","),
        accessions.join(",")
    )
}

/// A full-text submission whose report carries a cover page and an
/// income statement page.
pub fn quarterly_submission(revenue: &str, net_income: &str, eps: &str) -> String {
    format!(
        r#"<SEC-DOCUMENT>
<DOCUMENT>
<TYPE>10-Q
<FILENAME>acme-20230701.htm
<TEXT>
<div style="text-align:center"><b>UNITED STATES SECURITIES AND EXCHANGE COMMISSION</b></div>
<hr style="page-break-after:always"/>
<div style="text-align: center"><span>CONDENSED CONSOLIDATED STATEMENTS OF OPERATIONS (Unaudited)</span></div>
<table style="border-collapse:collapse;display:inline-table;width:100.000%">
<tr><td>Net sales:</td><td></td></tr>
<tr><td>Total net sales</td><td>$</td><td>{revenue}</td></tr>
<tr><td>Gross margin</td><td>$</td><td>36,413</td></tr>
<tr><td>Operating income</td><td></td><td>22,998</td></tr>
<tr><td>Net income</td><td>$</td><td>{net_income}</td></tr>
<tr><td>Basic</td><td>$</td><td>{eps}</td></tr>
</table>
<hr style="page-break-after:always"/>
<div style="text-align:center">CONDENSED CONSOLIDATED STATEMENTS OF COMPREHENSIVE INCOME</div>
<table style="width:100%"><tr><td>Total revenue</td><td>1</td></tr></table>
</TEXT>
</DOCUMENT>
<DOCUMENT>
<TYPE>EX-31.1
<TEXT>
<p>Certification</p>
</TEXT>
</DOCUMENT>
</SEC-DOCUMENT>"#
    )
}
