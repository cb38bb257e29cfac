use std::collections::HashSet;
use url::Url;

use super::filing::FilingReference;
use super::manifest::Manifest;

pub const EDGAR_ARCHIVES_URL: &str = "https://www.sec.gov/Archives/edgar/data";

/// Conventional information-table filenames observed across historical
/// accessions, tried when neither the primary document nor the manifest
/// resolves the table.
const STATIC_PATTERNS: &[&str] = &[
    "infotable.xml",
    "form13fInfoTable.xml",
    "primary_doc.xml",
    "informationtable.xml",
    "Form13FInfoTable.xml",
    "InfoTable.xml",
    "InformationTable.xml",
    "xml_filing.xml",
];

// Covers filer-specific names like "affinity.inftab.xml".
const TABLE_NAME_KEYWORDS: &[&str] = &[
    "infotable",
    "inftab",
    "form13f",
    "informationtable",
    "info_table",
    "xml_filing",
];

/// Which tier of the cascade produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryStrategy {
    PrimaryDocument,
    ManifestDescription,
    ManifestKeyword,
    ManifestRemainder,
    StaticPattern,
}

/// A resolvable document location paired with the strategy that produced it
/// and its position in the cascade.
#[derive(Debug, Clone)]
pub struct CandidateDocument {
    pub url: Url,
    pub strategy: DiscoveryStrategy,
    pub ordinal: usize,
}

/// Root URL of the accession's archive directory, without a trailing slash.
pub fn accession_base_url(filing: &FilingReference) -> String {
    format!(
        "{}/{}/{}",
        EDGAR_ARCHIVES_URL,
        filing.short_cik(),
        filing.accession_compact()
    )
}

struct CascadeBuilder {
    base: String,
    seen: HashSet<String>,
    out: Vec<CandidateDocument>,
}

impl CascadeBuilder {
    fn new(filing: &FilingReference) -> Self {
        CascadeBuilder {
            base: accession_base_url(filing),
            seen: HashSet::new(),
            out: Vec::new(),
        }
    }

    /// Appends one relative path, skipping paths already in the cascade and
    /// anything that does not form a valid URL.
    fn push(&mut self, path: &str, strategy: DiscoveryStrategy) {
        let path = path.trim_start_matches('/');
        if path.is_empty() || !self.seen.insert(path.to_string()) {
            return;
        }
        if let Ok(url) = Url::parse(&format!("{}/{}", self.base, path)) {
            self.out.push(CandidateDocument {
                url,
                strategy,
                ordinal: self.out.len(),
            });
        }
    }
}

/// Ordered, finite sequence of candidate locations for one filing's
/// information table. Restartable by calling [`candidates`] again; the
/// caller drives it step by step so fetches stop at the first success.
pub struct CandidateCascade {
    inner: std::vec::IntoIter<CandidateDocument>,
}

impl Iterator for CandidateCascade {
    type Item = CandidateDocument;

    fn next(&mut self) -> Option<CandidateDocument> {
        self.inner.next()
    }
}

/// Enumerates plausible locations of the holdings table, in priority order:
/// the declared primary document, then manifest-derived candidates, then the
/// static filename patterns at the accession root and (when the primary
/// document lives in a subdirectory) inside that subdirectory. Performs no
/// I/O and raises no errors; missing inputs only shrink the sequence.
pub fn candidates(filing: &FilingReference, manifest: Option<&Manifest>) -> CandidateCascade {
    let mut builder = CascadeBuilder::new(filing);

    if let Some(primary) = &filing.primary_document {
        builder.push(primary, DiscoveryStrategy::PrimaryDocument);
    }

    if let Some(manifest) = manifest {
        push_manifest_candidates(&mut builder, manifest);
    }

    for pattern in STATIC_PATTERNS {
        builder.push(pattern, DiscoveryStrategy::StaticPattern);
    }
    let primary_dir = filing
        .primary_document
        .as_deref()
        .and_then(|doc| doc.rsplit_once('/'))
        .map(|(dir, _)| dir);
    if let Some(dir) = primary_dir {
        for pattern in STATIC_PATTERNS {
            builder.push(&format!("{}/{}", dir, pattern), DiscoveryStrategy::StaticPattern);
        }
    }

    CandidateCascade {
        inner: builder.out.into_iter(),
    }
}

fn push_manifest_candidates(builder: &mut CascadeBuilder, manifest: &Manifest) {
    // Entries explicitly described as the information table come first.
    let described: Vec<&str> = manifest
        .entries
        .iter()
        .filter(|entry| {
            entry
                .description
                .as_deref()
                .map_or(false, |d| d.to_lowercase().contains("information table"))
                && entry.name.ends_with(".xml")
        })
        .map(|entry| entry.name.as_str())
        .collect();
    if !described.is_empty() {
        for name in described {
            builder.push(name, DiscoveryStrategy::ManifestDescription);
        }
        return;
    }

    // Otherwise fall back to filenames that look like a table file.
    let keyword_matches: Vec<&str> = manifest
        .entries
        .iter()
        .filter(|entry| {
            let lower = entry.name.to_lowercase();
            TABLE_NAME_KEYWORDS.iter().any(|kw| lower.contains(kw))
        })
        .map(|entry| entry.name.as_str())
        .collect();
    if !keyword_matches.is_empty() {
        for name in keyword_matches {
            builder.push(name, DiscoveryStrategy::ManifestKeyword);
        }
        return;
    }

    // Still nothing: any remaining XML file in the accession.
    for entry in manifest.entries.iter().filter(|e| e.name.ends_with(".xml")) {
        builder.push(&entry.name, DiscoveryStrategy::ManifestRemainder);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edgar::filing::FormType;
    use crate::edgar::manifest::ManifestEntry;
    use chrono::NaiveDate;

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

    fn manifest(entries: &[(&str, Option<&str>)]) -> Manifest {
        Manifest {
            entries: entries
                .iter()
                .map(|(name, description)| ManifestEntry {
                    name: name.to_string(),
                    description: description.map(str::to_string),
                })
                .collect(),
        }
    }

    fn paths(cascade: CandidateCascade) -> Vec<String> {
        cascade.map(|c| c.url.to_string()).collect()
    }

    #[test]
    fn base_url_strips_zeros_and_dashes() {
        assert_eq!(
            accession_base_url(&filing(None)),
            "https://www.sec.gov/Archives/edgar/data/1346824/000134682424000008"
        );
    }

    #[test]
    fn primary_document_comes_first() {
        let cascade: Vec<CandidateDocument> =
            candidates(&filing(Some("boxer13f.xml")), None).collect();
        assert_eq!(cascade[0].strategy, DiscoveryStrategy::PrimaryDocument);
        assert_eq!(cascade[0].ordinal, 0);
        assert!(cascade[0].url.as_str().ends_with("/boxer13f.xml"));
        assert!(cascade[1..]
            .iter()
            .all(|c| c.strategy == DiscoveryStrategy::StaticPattern));
    }

    #[test]
    fn described_entry_beats_decoy() {
        let manifest = manifest(&[
            ("other.xml", None),
            ("holdings_table.xml", Some("INFORMATION TABLE")),
        ]);
        let cascade: Vec<CandidateDocument> = candidates(&filing(None), Some(&manifest)).collect();
        assert_eq!(cascade[0].strategy, DiscoveryStrategy::ManifestDescription);
        assert!(cascade[0].url.as_str().ends_with("/holdings_table.xml"));
        // The decoy is never proposed by the manifest tier.
        assert!(cascade
            .iter()
            .all(|c| !c.url.as_str().ends_with("/other.xml")));
    }

    #[test]
    fn keyword_tier_used_when_nothing_is_described() {
        let manifest = manifest(&[
            ("cover.htm", Some("COVER PAGE")),
            ("affinity.inftab.xml", None),
        ]);
        let cascade: Vec<CandidateDocument> = candidates(&filing(None), Some(&manifest)).collect();
        assert_eq!(cascade[0].strategy, DiscoveryStrategy::ManifestKeyword);
        assert!(cascade[0].url.as_str().ends_with("/affinity.inftab.xml"));
    }

    #[test]
    fn remaining_xml_tier_is_last_manifest_resort() {
        let manifest = manifest(&[("cover.htm", None), ("mystery.xml", None)]);
        let cascade: Vec<CandidateDocument> = candidates(&filing(None), Some(&manifest)).collect();
        assert_eq!(cascade[0].strategy, DiscoveryStrategy::ManifestRemainder);
        assert!(cascade[0].url.as_str().ends_with("/mystery.xml"));
    }

    #[test]
    fn static_patterns_cover_root_and_primary_subdirectory() {
        let all = paths(candidates(&filing(Some("xslForm13F_X02/doc.xml")), None));
        let base = "https://www.sec.gov/Archives/edgar/data/1346824/000134682424000008";
        assert!(all.contains(&format!("{}/infotable.xml", base)));
        assert!(all.contains(&format!("{}/xslForm13F_X02/infotable.xml", base)));
    }

    #[test]
    fn no_path_is_proposed_twice() {
        // primary_doc.xml is both the declared primary document and a static
        // pattern; the cascade must only carry it once.
        let manifest = manifest(&[("primary_doc.xml", Some("INFORMATION TABLE"))]);
        let all = paths(candidates(&filing(Some("primary_doc.xml")), Some(&manifest)));
        let unique: std::collections::HashSet<&String> = all.iter().collect();
        assert_eq!(all.len(), unique.len());
        let hits = all
            .iter()
            .filter(|u| u.ends_with("/primary_doc.xml"))
            .count();
        assert_eq!(hits, 1);
    }

    #[test]
    fn ordinals_follow_cascade_order() {
        let cascade: Vec<CandidateDocument> = candidates(&filing(Some("doc.xml")), None).collect();
        for (i, candidate) in cascade.iter().enumerate() {
            assert_eq!(candidate.ordinal, i);
        }
    }

    #[test]
    fn no_inputs_still_yields_static_patterns() {
        let cascade: Vec<CandidateDocument> = candidates(&filing(None), None).collect();
        assert_eq!(cascade.len(), STATIC_PATTERNS.len());
        assert!(cascade
            .iter()
            .all(|c| c.strategy == DiscoveryStrategy::StaticPattern));
    }

    #[test]
    fn cascade_is_restartable() {
        let filing = filing(Some("doc.xml"));
        let first = paths(candidates(&filing, None));
        let second = paths(candidates(&filing, None));
        assert_eq!(first, second);
    }
}
