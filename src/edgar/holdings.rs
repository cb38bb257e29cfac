use log::debug;
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

use super::filing::FilingReference;

/// Namespace EDGAR declares for 13F information tables.
const INFO_TABLE_NS: &str = "http://www.sec.gov/edgar/document/thirteenf/informationtable";

/// Local name of one per-position row element.
const ROW_TAG: &str = "infoTable";

/// One normalized position line. Unrecoverable text fields are carried as
/// empty strings and unrecoverable numeric fields as zero, never omitted:
/// downstream aggregation tolerates defaults but not missing rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldingRecord {
    pub name: String,
    pub cusip: String,
    /// Reported in thousands by the registry; scaled to dollars at parse time.
    pub value: i64,
    pub shares: i64,
}

/// Holdings recovered from one filing, in document order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundHoldings {
    pub filing: FilingReference,
    pub records: Vec<HoldingRecord>,
}

impl FundHoldings {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn total_value(&self) -> i64 {
        self.records.iter().map(|r| r.value).sum()
    }
}

/// Extracts holding records from one candidate document. Total: every
/// failure mode degrades to fewer or no records, never an error.
///
/// Strict parsing is attempted first; when the content is not well-formed
/// standalone XML (embedded table, trailing bytes, multiple roots), the
/// table fragment is sliced out of the raw text, wrapped in a synthetic
/// root, and parsed on its own.
pub fn parse_holdings(content: &str) -> Vec<HoldingRecord> {
    match Document::parse(content) {
        Ok(doc) => records_from_document(&doc),
        Err(err) => {
            debug!("strict parse failed ({}), trying fragment extraction", err);
            match extract_table_fragment(content) {
                Some(fragment) => {
                    let wrapped = format!("<root>{}</root>", fragment);
                    match Document::parse(&wrapped) {
                        Ok(doc) => records_from_document(&doc),
                        Err(err) => {
                            debug!("fragment parse failed: {}", err);
                            Vec::new()
                        }
                    }
                }
                None => Vec::new(),
            }
        }
    }
}

fn records_from_document(doc: &Document) -> Vec<HoldingRecord> {
    find_rows(doc)
        .into_iter()
        .filter_map(record_from_row)
        .collect()
}

/// Collects row elements with a three-tier lookup: namespace-qualified,
/// then unqualified, then any element whose local name ends with the row
/// tag (covers unanticipated namespaces). The first tier that matches
/// anything wins.
fn find_rows<'a, 'input>(doc: &'a Document<'input>) -> Vec<Node<'a, 'input>> {
    let qualified: Vec<Node> = doc
        .descendants()
        .filter(|n| {
            n.is_element()
                && n.tag_name().name() == ROW_TAG
                && n.tag_name().namespace() == Some(INFO_TABLE_NS)
        })
        .collect();
    if !qualified.is_empty() {
        return qualified;
    }

    let unqualified: Vec<Node> = doc
        .descendants()
        .filter(|n| {
            n.is_element() && n.tag_name().name() == ROW_TAG && n.tag_name().namespace().is_none()
        })
        .collect();
    if !unqualified.is_empty() {
        return unqualified;
    }

    doc.descendants()
        .filter(|n| n.is_element() && n.tag_name().name().ends_with(ROW_TAG))
        .collect()
}

/// Looks up one field under a row with the same three-tier strategy as
/// [`find_rows`]. The first tier that finds an element wins, even when that
/// element carries no text.
fn field_text<'a>(row: Node<'a, '_>, local: &str) -> Option<&'a str> {
    row.descendants()
        .find(|n| {
            n.is_element()
                && n.tag_name().name() == local
                && n.tag_name().namespace() == Some(INFO_TABLE_NS)
        })
        .or_else(|| {
            row.descendants().find(|n| {
                n.is_element()
                    && n.tag_name().name() == local
                    && n.tag_name().namespace().is_none()
            })
        })
        .or_else(|| {
            row.descendants()
                .find(|n| n.is_element() && n.tag_name().name().ends_with(local))
        })
        .and_then(|n| n.text())
}

/// Builds one record from a row element. Missing fields default; a numeric
/// field that is present but unparseable drops the whole row — the only
/// case where a row is dropped rather than defaulted, kept because changing
/// it would alter record counts observably.
fn record_from_row(row: Node) -> Option<HoldingRecord> {
    let name = field_text(row, "nameOfIssuer").unwrap_or("").to_string();
    let cusip = field_text(row, "cusip").unwrap_or("").to_string();
    let value = match field_text(row, "value") {
        // Scaling can overflow even when the raw text parses; that is a
        // row-level fault like any other.
        Some(text) => text.trim().parse::<i64>().ok()?.checked_mul(1000)?,
        None => 0,
    };
    let shares = match field_text(row, "sshPrnamt") {
        Some(text) => text.trim().parse::<i64>().ok()?,
        None => 0,
    };

    Some(HoldingRecord {
        name,
        cusip,
        value,
        shares,
    })
}

/// Slices the information-table fragment out of malformed or non-standalone
/// content: first opening marker for either known root tag, last matching
/// closing marker ("last" tolerates nested false positives), inclusive.
fn extract_table_fragment(text: &str) -> Option<&str> {
    for local in ["informationTable", ROW_TAG] {
        if let Some(start) = find_open_marker(text, local) {
            let end = find_close_marker_end(text, local)?;
            if end > start {
                return Some(&text[start..end]);
            }
            return None;
        }
    }
    None
}

/// Byte offset of the `<` opening the first element named `local`,
/// tolerating an optional namespace prefix. Closing tags do not count: a
/// stray `</informationTable>` ahead of the real table must not anchor
/// the fragment.
fn find_open_marker(text: &str, local: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    text.match_indices(local).find_map(|(idx, _)| {
        let start = tag_start(text, idx)?;
        if bytes.get(start + 1) == Some(&b'/') {
            return None;
        }
        Some(start)
    })
}

/// Byte offset one past the `>` of the last `</local>` (or `</prefix:local>`)
/// closing tag.
fn find_close_marker_end(text: &str, local: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    for (idx, _) in text.rmatch_indices(local) {
        let is_close = match tag_start(text, idx) {
            // tag_start lands on '<'; a closing tag has '/' right after it.
            Some(start) => bytes.get(start + 1) == Some(&b'/'),
            None => idx >= 2 && bytes[idx - 1] == b'/' && bytes[idx - 2] == b'<',
        };
        if !is_close {
            continue;
        }
        let mut end = idx + local.len();
        while end < bytes.len() && bytes[end].is_ascii_whitespace() {
            end += 1;
        }
        if end < bytes.len() && bytes[end] == b'>' {
            return Some(end + 1);
        }
    }
    None
}

/// Walks left from a tag-name occurrence to the `<` that would open it,
/// skipping one optional `prefix:`. Returns the offset of the `<`, or `None`
/// when the occurrence is not at the start of a tag name.
fn tag_start(text: &str, name_idx: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if name_idx == 0 {
        return None;
    }
    match bytes[name_idx - 1] {
        b'<' => Some(name_idx - 1),
        b':' => {
            let mut i = name_idx - 1;
            while i > 0 && is_name_byte(bytes[i - 1]) {
                i -= 1;
            }
            if i >= 2 && bytes[i - 1] == b'/' && bytes[i - 2] == b'<' {
                Some(i - 2)
            } else if i >= 1 && bytes[i - 1] == b'<' {
                Some(i - 1)
            } else {
                None
            }
        }
        b'/' if name_idx >= 2 && bytes[name_idx - 2] == b'<' => Some(name_idx - 2),
        _ => None,
    }
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-' || b == b'.'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragment_extraction_spans_first_open_to_last_close() {
        let text = "junk <infoTable><a>1</a></infoTable><infoTable><a>2</a></infoTable> junk";
        let fragment = extract_table_fragment(text).unwrap();
        assert!(fragment.starts_with("<infoTable>"));
        assert!(fragment.ends_with("</infoTable>"));
        assert_eq!(fragment.matches("<infoTable>").count(), 2);
    }

    #[test]
    fn fragment_extraction_prefers_information_table() {
        let text = "<informationTable><infoTable/></informationTable>trailing";
        let fragment = extract_table_fragment(text).unwrap();
        assert_eq!(fragment, "<informationTable><infoTable/></informationTable>");
    }

    #[test]
    fn fragment_extraction_tolerates_namespace_prefix() {
        let text = "garbage <ns1:informationTable xmlns:ns1=\"x\"><ns1:infoTable/></ns1:informationTable> garbage";
        let fragment = extract_table_fragment(text).unwrap();
        assert!(fragment.starts_with("<ns1:informationTable"));
        assert!(fragment.ends_with("</ns1:informationTable>"));
    }

    #[test]
    fn fragment_extraction_fails_without_close_marker() {
        assert_eq!(extract_table_fragment("<infoTable><a>1</a>"), None);
        assert_eq!(extract_table_fragment("no table here"), None);
    }

    #[test]
    fn stray_closing_tag_does_not_anchor_the_fragment() {
        // A leftover closing tag ahead of the real table must not be taken
        // for the opening marker.
        let text = "</informationTable> header noise \
                    <informationTable><infoTable><a>1</a></infoTable></informationTable> tail";
        let fragment = extract_table_fragment(text).unwrap();
        assert!(fragment.starts_with("<informationTable>"));
        assert!(fragment.ends_with("</informationTable>"));
        assert_eq!(fragment.matches("</informationTable>").count(), 1);
    }

    #[test]
    fn open_marker_ignores_plain_text_mentions() {
        // "infoTable" appearing outside a tag must not anchor the fragment.
        let text = "the infoTable is below <infoTable><a>1</a></infoTable>";
        let fragment = extract_table_fragment(text).unwrap();
        assert!(fragment.starts_with("<infoTable>"));
    }
}
