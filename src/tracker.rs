use anyhow::Result;
use log::{debug, info, warn};
use std::collections::HashSet;
use url::Url;

use crate::edgar::client::EdgarClient;
use crate::edgar::filing::{recent_holdings_filings, FilingReference};
use crate::edgar::holdings::{parse_holdings, FundHoldings, HoldingRecord};
use crate::edgar::locator::{candidates, CandidateDocument, DiscoveryStrategy};
use crate::funds::FUNDS;

/// Content fetch is an external collaborator's job: the cascade driver only
/// needs raw content plus an availability signal per candidate.
#[allow(async_fn_in_trait)]
pub trait DocumentSource {
    async fn document(&self, url: &Url) -> Result<Option<String>>;
}

impl DocumentSource for EdgarClient {
    async fn document(&self, url: &Url) -> Result<Option<String>> {
        self.fetch_document(url).await
    }
}

/// Feeds candidates one at a time into the parser until one yields a
/// non-empty record set, which short-circuits the rest of the cascade.
/// Candidates whose path was already attempted are skipped, and fetch
/// failures advance the cascade rather than aborting it.
pub async fn resolve_candidates<S: DocumentSource>(
    source: &S,
    cascade: impl Iterator<Item = CandidateDocument>,
    attempted: &mut HashSet<String>,
) -> Option<(CandidateDocument, Vec<HoldingRecord>)> {
    for candidate in cascade {
        if !attempted.insert(candidate.url.to_string()) {
            continue;
        }
        let content = match source.document(&candidate.url).await {
            Ok(Some(content)) => content,
            Ok(None) => continue,
            Err(err) => {
                debug!("fetch failed for {}: {}", candidate.url, err);
                continue;
            }
        };
        let records = parse_holdings(&content);
        if !records.is_empty() {
            return Some((candidate, records));
        }
    }
    None
}

/// Ties the EDGAR client, the candidate cascade and the parser together.
pub struct Tracker {
    client: EdgarClient,
}

impl Tracker {
    pub fn new(client: EdgarClient) -> Self {
        Tracker { client }
    }

    /// Recent holdings reports for one fund, newest first.
    pub async fn recent_filings(
        &self,
        fund_name: &str,
        cik: &str,
        count: usize,
    ) -> Result<Vec<FilingReference>> {
        let company = self.client.company_filings(cik).await?;
        Ok(recent_holdings_filings(&company, fund_name, cik, count))
    }

    pub async fn latest_filing(
        &self,
        fund_name: &str,
        cik: &str,
    ) -> Result<Option<FilingReference>> {
        Ok(self.recent_filings(fund_name, cik, 1).await?.pop())
    }

    /// Latest holdings report for every fund on the roster. A fund whose
    /// listing fails is logged and skipped; one bad filer never aborts the
    /// batch.
    pub async fn all_latest_filings(&self) -> Vec<FilingReference> {
        let mut filings = Vec::new();
        for &(fund_name, cik) in FUNDS {
            info!("Processing: {} (CIK: {})", fund_name, cik);
            match self.latest_filing(fund_name, cik).await {
                Ok(Some(filing)) => filings.push(filing),
                Ok(None) => info!("No 13F filings found for {}", fund_name),
                Err(err) => warn!("Error fetching filings for {}: {}", fund_name, err),
            }
        }
        filings
    }

    /// Drives the candidate cascade for one filing. The declared primary
    /// document is probed before spending a request on the accession
    /// manifest, since it resolves most filings on its own; the manifest and
    /// static tiers follow, skipping any path already attempted. Exhaustion
    /// yields an empty record set, not an error.
    pub async fn fetch_holdings(&self, filing: &FilingReference) -> FundHoldings {
        let mut attempted: HashSet<String> = HashSet::new();

        let primary_only = candidates(filing, None)
            .take_while(|c| c.strategy == DiscoveryStrategy::PrimaryDocument);
        if let Some((_, records)) =
            resolve_candidates(&self.client, primary_only, &mut attempted).await
        {
            return FundHoldings {
                filing: filing.clone(),
                records,
            };
        }

        let manifest = self.client.accession_manifest(filing).await;
        if let Some((candidate, records)) = resolve_candidates(
            &self.client,
            candidates(filing, manifest.as_ref()),
            &mut attempted,
        )
        .await
        {
            info!(
                "resolved accession {} via {:?} candidate #{}",
                filing.accession_number, candidate.strategy, candidate.ordinal
            );
            return FundHoldings {
                filing: filing.clone(),
                records,
            };
        }

        info!(
            "no information table found for accession {}",
            filing.accession_number
        );
        FundHoldings {
            filing: filing.clone(),
            records: Vec::new(),
        }
    }

    /// Latest holdings for one fund, sorted by position value descending.
    pub async fn fund_holdings(&self, fund_name: &str, cik: &str) -> Result<Option<FundHoldings>> {
        let filing = match self.latest_filing(fund_name, cik).await? {
            Some(filing) => filing,
            None => {
                info!("No filings found for {}", fund_name);
                return Ok(None);
            }
        };

        info!(
            "Parsing {} filed on {} for {}",
            filing.form_type, filing.filing_date, fund_name
        );
        let mut holdings = self.fetch_holdings(&filing).await;
        holdings.records.sort_by(|a, b| b.value.cmp(&a.value));
        Ok(Some(holdings))
    }

    /// Latest holdings for every fund on the roster. Funds without a filing
    /// or whose listing fails are skipped; funds whose cascade exhausts are
    /// kept with an empty record set so AUM reports still list them.
    pub async fn all_fund_holdings(&self) -> Vec<FundHoldings> {
        let mut all = Vec::new();
        for &(fund_name, cik) in FUNDS {
            info!("Processing: {}", fund_name);
            match self.fund_holdings(fund_name, cik).await {
                Ok(Some(holdings)) => all.push(holdings),
                Ok(None) => {}
                Err(err) => warn!("Error fetching holdings for {}: {}", fund_name, err),
            }
        }
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edgar::filing::FormType;
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TABLE: &str = "<informationTable><infoTable>\
        <nameOfIssuer>Acme Corp</nameOfIssuer><cusip>000111000</cusip>\
        <value>100</value><sshPrnamt>50</sshPrnamt>\
        </infoTable></informationTable>";

    struct FakeRegistry {
        docs: HashMap<String, String>,
        probes: AtomicUsize,
    }

    impl FakeRegistry {
        fn new(docs: &[(&str, &str)]) -> Self {
            FakeRegistry {
                docs: docs
                    .iter()
                    .map(|(url, content)| (url.to_string(), content.to_string()))
                    .collect(),
                probes: AtomicUsize::new(0),
            }
        }

        fn probes(&self) -> usize {
            self.probes.load(Ordering::SeqCst)
        }
    }

    impl DocumentSource for FakeRegistry {
        async fn document(&self, url: &Url) -> Result<Option<String>> {
            self.probes.fetch_add(1, Ordering::SeqCst);
            Ok(self.docs.get(url.as_str()).cloned())
        }
    }

    fn filing(primary_document: Option<&str>) -> FilingReference {
        FilingReference {
            fund_name: "Test Fund".to_string(),
            cik: "0001346824".to_string(),
            accession_number: "0001346824-24-000008".to_string(),
            form_type: FormType::Form13FHR,
            filing_date: NaiveDate::from_ymd_opt(2024, 5, 15).unwrap(),
            primary_document: primary_document.map(str::to_string),
        }
    }

    const BASE: &str = "https://www.sec.gov/Archives/edgar/data/1346824/000134682424000008";

    #[tokio::test]
    async fn first_success_short_circuits_the_cascade() {
        let filing = filing(Some("table.xml"));
        let registry = FakeRegistry::new(&[(format!("{}/table.xml", BASE).as_str(), TABLE)]);

        let mut attempted = HashSet::new();
        let resolved = resolve_candidates(&registry, candidates(&filing, None), &mut attempted)
            .await
            .unwrap();

        assert_eq!(resolved.1.len(), 1);
        assert_eq!(resolved.0.strategy, DiscoveryStrategy::PrimaryDocument);
        // No probe happens beyond the first success.
        assert_eq!(registry.probes(), 1);
    }

    #[tokio::test]
    async fn cascade_advances_past_absent_and_empty_candidates() {
        // Primary document exists but carries no table; a later static
        // pattern has the real one.
        let filing = filing(Some("cover.xml"));
        let registry = FakeRegistry::new(&[
            (format!("{}/cover.xml", BASE).as_str(), "<coverPage/>"),
            (format!("{}/infotable.xml", BASE).as_str(), TABLE),
        ]);

        let mut attempted = HashSet::new();
        let (candidate, records) =
            resolve_candidates(&registry, candidates(&filing, None), &mut attempted)
                .await
                .unwrap();

        assert_eq!(candidate.strategy, DiscoveryStrategy::StaticPattern);
        assert!(candidate.url.as_str().ends_with("/infotable.xml"));
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn attempted_paths_are_not_refetched_across_passes() {
        let filing = filing(Some("primary_doc.xml"));
        let registry = FakeRegistry::new(&[]);

        let mut attempted = HashSet::new();
        let primary_only = candidates(&filing, None)
            .take_while(|c| c.strategy == DiscoveryStrategy::PrimaryDocument);
        assert!(resolve_candidates(&registry, primary_only, &mut attempted)
            .await
            .is_none());
        assert_eq!(registry.probes(), 1);

        // Second pass walks the full cascade; primary_doc.xml is both the
        // primary document and a static pattern, but was already attempted.
        assert!(
            resolve_candidates(&registry, candidates(&filing, None), &mut attempted)
                .await
                .is_none()
        );
        let static_patterns = candidates(&filing, None).count();
        assert_eq!(registry.probes(), static_patterns);
    }

    #[tokio::test]
    async fn exhausted_cascade_returns_none() {
        let registry = FakeRegistry::new(&[]);
        let mut attempted = HashSet::new();
        let resolved =
            resolve_candidates(&registry, candidates(&filing(None), None), &mut attempted).await;
        assert!(resolved.is_none());
    }
}
