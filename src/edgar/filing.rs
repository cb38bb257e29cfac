use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Form type of one EDGAR submission. Only holdings reports (13F-HR and
/// their amendments) are of interest; everything else is carried as `Other`
/// so the submissions feed always deserializes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FormType {
    Form13FHR,
    Form13FHRAmendment,
    Other(String),
}

impl FormType {
    pub fn is_holdings_report(&self) -> bool {
        matches!(self, FormType::Form13FHR | FormType::Form13FHRAmendment)
    }
}

impl TryFrom<String> for FormType {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        FormType::from_str(&s)
    }
}

impl FromStr for FormType {
    type Err = String;

    fn from_str(s: &str) -> Result<FormType, String> {
        match s.to_uppercase().as_str() {
            "13F-HR" => Ok(FormType::Form13FHR),
            "13F-HR/A" => Ok(FormType::Form13FHRAmendment),
            _ => Ok(FormType::Other(s.to_string())),
        }
    }
}

impl From<FormType> for String {
    fn from(form: FormType) -> String {
        form.to_string()
    }
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormType::Form13FHR => write!(f, "13F-HR"),
            FormType::Form13FHRAmendment => write!(f, "13F-HR/A"),
            FormType::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Recent filings from the submissions API. The feed is column-oriented:
/// position `i` across all vectors describes one filing.
#[derive(Debug, Serialize, Deserialize)]
pub struct RecentFilings {
    #[serde(rename = "accessionNumber")]
    pub accession_number: Vec<String>,
    #[serde(rename = "filingDate")]
    pub filing_date: Vec<NaiveDate>,
    #[serde(rename = "form")]
    pub form: Vec<FormType>,
    #[serde(rename = "primaryDocument")]
    pub primary_document: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FilingsData {
    pub recent: RecentFilings,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompanyFilings {
    pub cik: String,
    pub name: String,
    pub filings: FilingsData,
}

/// Identifies one disclosure instance. Immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilingReference {
    pub fund_name: String,
    pub cik: String,
    pub accession_number: String,
    pub form_type: FormType,
    pub filing_date: NaiveDate,
    pub primary_document: Option<String>,
}

impl FilingReference {
    /// CIK padded to 10 digits, as the submissions API expects.
    pub fn padded_cik(&self) -> String {
        format!("{:0>10}", self.cik)
    }

    /// CIK without leading zeros, as archive URLs expect.
    pub fn short_cik(&self) -> &str {
        self.cik.trim_start_matches('0')
    }

    /// Accession number without dashes, the accession's directory name.
    pub fn accession_compact(&self) -> String {
        self.accession_number.replace('-', "")
    }
}

/// Selects up to `count` recent holdings reports for one fund out of the
/// submissions feed. Rows whose columns are misaligned are skipped.
pub fn recent_holdings_filings(
    company: &CompanyFilings,
    fund_name: &str,
    cik: &str,
    count: usize,
) -> Vec<FilingReference> {
    let recent = &company.filings.recent;
    let mut filings = Vec::new();

    for (i, form) in recent.form.iter().enumerate() {
        if !form.is_holdings_report() {
            continue;
        }
        let accession_number = match recent.accession_number.get(i) {
            Some(accession) => accession.clone(),
            None => continue,
        };
        let filing_date = match recent.filing_date.get(i) {
            Some(date) => *date,
            None => continue,
        };
        let primary_document = recent
            .primary_document
            .get(i)
            .filter(|doc| !doc.is_empty())
            .cloned();

        filings.push(FilingReference {
            fund_name: fund_name.to_string(),
            cik: cik.to_string(),
            accession_number,
            form_type: form.clone(),
            filing_date,
            primary_document,
        });

        if filings.len() >= count {
            break;
        }
    }

    filings
}
