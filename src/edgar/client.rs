use anyhow::{anyhow, Result};
use log::debug;
use reqwest::Client;
use serde_json::Value;
use url::Url;

use super::filing::{CompanyFilings, FilingReference};
use super::locator::accession_base_url;
use super::manifest::Manifest;
use crate::utils::rate_limit::RateLimiter;

pub const EDGAR_DATA_URL: &str = "https://data.sec.gov";
pub const USER_AGENT: &str = "FundTracker/0.1 (software@example.com)";

/// HTTP client for the EDGAR endpoints the tracker consumes. Every request
/// waits on the process-wide rate limiter and carries the SEC-required
/// `User-Agent` header.
pub struct EdgarClient {
    client: Client,
    user_agent: String,
}

impl EdgarClient {
    pub fn new(user_agent: impl Into<String>) -> Self {
        EdgarClient {
            client: Client::new(),
            user_agent: user_agent.into(),
        }
    }

    async fn get(&self, url: &Url) -> Result<reqwest::Response> {
        RateLimiter::edgar().wait().await;
        debug!("Fetching URL: {}", url);

        let response = self
            .client
            .get(url.as_str())
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .header(reqwest::header::ACCEPT_ENCODING, "gzip, deflate")
            .send()
            .await?;

        debug!("Response status for {}: {}", url, response.status());
        Ok(response)
    }

    /// Full submissions feed for one filer.
    pub async fn company_filings(&self, cik: &str) -> Result<CompanyFilings> {
        let padded_cik = format!("{:0>10}", cik);
        let url = Url::parse(&format!(
            "{}/submissions/CIK{}.json",
            EDGAR_DATA_URL, padded_cik
        ))?;

        let response = self.get(&url).await?;
        if !response.status().is_success() {
            return Err(anyhow!(
                "submissions request for CIK {} failed with status {}",
                padded_cik,
                response.status()
            ));
        }

        Ok(response.json::<CompanyFilings>().await?)
    }

    /// The accession's `index.json`, normalized. Absence of a manifest is
    /// tolerated — the locator falls back to its static patterns — so every
    /// failure here maps to `None` rather than an error.
    pub async fn accession_manifest(&self, filing: &FilingReference) -> Option<Manifest> {
        let url = Url::parse(&format!("{}/index.json", accession_base_url(filing))).ok()?;
        let response = match self.get(&url).await {
            Ok(response) => response,
            Err(err) => {
                debug!("manifest fetch failed for {}: {}", filing.accession_number, err);
                return None;
            }
        };
        if !response.status().is_success() {
            debug!(
                "no manifest for accession {} ({})",
                filing.accession_number,
                response.status()
            );
            return None;
        }

        let value = response.json::<Value>().await.ok()?;
        let manifest = Manifest::from_json(&value);
        if manifest.is_empty() {
            None
        } else {
            Some(manifest)
        }
    }

    /// Raw content of one candidate document. `Ok(None)` signals an absent
    /// document (non-success status); `Err` is reserved for transport
    /// failures.
    pub async fn fetch_document(&self, url: &Url) -> Result<Option<String>> {
        let response = self.get(url).await?;
        if !response.status().is_success() {
            return Ok(None);
        }
        Ok(Some(response.text().await?))
    }
}
