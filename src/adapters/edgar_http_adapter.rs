//! Blocking HTTP adapter for the EDGAR registry.
//!
//! Every request carries the configured identifying user agent. A non-2xx
//! status or a transport failure is logged and returned as
//! [`Fetched::Unavailable`]; nothing is retried or cached.

use crate::domain::cik::Cik;
use crate::domain::error::EdgarfolioError;
use crate::domain::filing::{AccessionId, FetchFailure, Fetched};
use crate::ports::filing_port::FilingSource;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT_ENCODING, HeaderMap, HeaderValue, USER_AGENT};
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_SUBMISSIONS_URL: &str = "https://data.sec.gov/submissions";
pub const DEFAULT_ARCHIVES_URL: &str = "https://www.sec.gov/Archives/edgar/data";
pub const DEFAULT_TICKERS_URL: &str = "https://www.sec.gov/files/company_tickers.json";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgarSettings {
    pub user_agent: String,
    pub submissions_url: String,
    pub archives_url: String,
    pub tickers_url: String,
    pub timeout_secs: u64,
}

impl EdgarSettings {
    pub fn new(user_agent: &str) -> Self {
        EdgarSettings {
            user_agent: user_agent.to_string(),
            submissions_url: DEFAULT_SUBMISSIONS_URL.to_string(),
            archives_url: DEFAULT_ARCHIVES_URL.to_string(),
            tickers_url: DEFAULT_TICKERS_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn submissions_endpoint(&self, cik: Cik) -> String {
        format!(
            "{}/CIK{}.json",
            self.submissions_url.trim_end_matches('/'),
            cik.padded()
        )
    }

    pub fn filing_endpoint(&self, cik: Cik, accession: &AccessionId) -> String {
        format!(
            "{}/{}/{}/{}.txt",
            self.archives_url.trim_end_matches('/'),
            cik,
            accession.folder(),
            accession
        )
    }
}

pub struct EdgarHttpAdapter {
    http: Client,
    settings: EdgarSettings,
}

impl EdgarHttpAdapter {
    pub fn new(settings: EdgarSettings) -> Result<Self, EdgarfolioError> {
        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(&settings.user_agent).map_err(|e| EdgarfolioError::Http {
            reason: format!("invalid user agent: {e}"),
        })?;
        headers.insert(USER_AGENT, agent);
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));

        let http = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| EdgarfolioError::Http {
                reason: e.to_string(),
            })?;

        Ok(Self { http, settings })
    }

    pub fn settings(&self) -> &EdgarSettings {
        &self.settings
    }

    fn get_text(&self, url: &str, what: &str) -> Fetched<String> {
        let response = match self.http.get(url).send() {
            Ok(response) => response,
            Err(e) => {
                warn!(%url, error = %e, "Request failed, couldn't obtain {what}.");
                return Fetched::Unavailable(FetchFailure {
                    url: url.to_string(),
                    status: None,
                    reason: e.to_string(),
                });
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(%url, "Response: [{}], couldn't obtain {what}.", status.as_u16());
            return Fetched::Unavailable(FetchFailure {
                url: url.to_string(),
                status: Some(status.as_u16()),
                reason: status.canonical_reason().unwrap_or("unsuccessful status").to_string(),
            });
        }

        match response.text() {
            Ok(body) => {
                info!(%url, "Response: [{}], {what} obtained successfully.", status.as_u16());
                Fetched::Retrieved(body)
            }
            Err(e) => {
                warn!(%url, error = %e, "Response body unreadable, couldn't obtain {what}.");
                Fetched::Unavailable(FetchFailure {
                    url: url.to_string(),
                    status: Some(status.as_u16()),
                    reason: e.to_string(),
                })
            }
        }
    }
}

impl FilingSource for EdgarHttpAdapter {
    fn fetch_company_tickers(&self) -> Fetched<String> {
        self.get_text(&self.settings.tickers_url, "ticker table")
    }

    fn fetch_submissions(&self, cik: Cik) -> Fetched<String> {
        let url = self.settings.submissions_endpoint(cik);
        self.get_text(&url, "metadata")
    }

    fn fetch_filing(&self, cik: Cik, accession: &AccessionId) -> Fetched<String> {
        let url = self.settings.filing_endpoint(cik, accession);
        self.get_text(&url, "filing")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submissions_endpoint_pads_cik() {
        let settings = EdgarSettings::new("Jane Doe jane@example.com");
        assert_eq!(
            settings.submissions_endpoint(Cik(320193)),
            "https://data.sec.gov/submissions/CIK0000320193.json"
        );
    }

    #[test]
    fn filing_endpoint_uses_unpadded_cik_and_folder() {
        let settings = EdgarSettings::new("Jane Doe jane@example.com");
        let accession = AccessionId("0000320193-23-000077".into());
        assert_eq!(
            settings.filing_endpoint(Cik(320193), &accession),
            "https://www.sec.gov/Archives/edgar/data/320193/000032019323000077/0000320193-23-000077.txt"
        );
    }

    #[test]
    fn trailing_slash_in_base_is_ignored() {
        let mut settings = EdgarSettings::new("x");
        settings.submissions_url = "http://localhost:8080/sub/".into();
        assert_eq!(
            settings.submissions_endpoint(Cik(1)),
            "http://localhost:8080/sub/CIK0000000001.json"
        );
    }

    #[test]
    fn invalid_user_agent_rejected() {
        let result = EdgarHttpAdapter::new(EdgarSettings::new("bad\nagent"));
        assert!(matches!(result, Err(EdgarfolioError::Http { .. })));
    }

    #[test]
    fn unreachable_host_is_unavailable_not_error() {
        let mut settings = EdgarSettings::new("Jane Doe jane@example.com");
        settings.submissions_url = "http://127.0.0.1:9".into();
        settings.timeout_secs = 2;
        let adapter = EdgarHttpAdapter::new(settings).unwrap();
        match adapter.fetch_submissions(Cik(1)) {
            Fetched::Unavailable(failure) => {
                assert!(failure.status.is_none());
                assert!(failure.url.ends_with("CIK0000000001.json"));
            }
            Fetched::Retrieved(_) => panic!("expected an unavailable outcome"),
        }
    }
}
