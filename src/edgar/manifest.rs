use serde_json::Value;
use std::collections::HashSet;

/// One document declared in an accession's `index.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub name: String,
    pub description: Option<String>,
}

/// Normalized view of an accession manifest. EDGAR serves the file list in
/// more than one shape; `from_json` flattens whichever shape arrived into a
/// plain entry list for the locator.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    pub entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn from_json(value: &Value) -> Manifest {
        // Preferred shape: document list with per-file descriptions.
        if let Some(files) = value
            .pointer("/filing/document_format_files")
            .and_then(Value::as_array)
        {
            let entries: Vec<ManifestEntry> = files
                .iter()
                .filter_map(|doc| {
                    let name = doc.get("document_url")?.as_str()?.to_string();
                    let description = doc
                        .get("description")
                        .and_then(Value::as_str)
                        .map(str::to_string);
                    Some(ManifestEntry { name, description })
                })
                .collect();
            if !entries.is_empty() {
                return Manifest { entries };
            }
        }

        // Directory listing shape: names only.
        if let Some(items) = value.pointer("/directory/item").and_then(Value::as_array) {
            let entries: Vec<ManifestEntry> = items
                .iter()
                .filter_map(|item| {
                    let name = item.get("name")?.as_str()?.to_string();
                    Some(ManifestEntry {
                        name,
                        description: None,
                    })
                })
                .collect();
            if !entries.is_empty() {
                return Manifest { entries };
            }
        }

        // Last resort: pick up any name-like string anywhere in the payload.
        let mut names = Vec::new();
        collect_filenames(value, &mut names);
        let mut seen = HashSet::new();
        let entries = names
            .into_iter()
            .filter(|name| seen.insert(name.clone()))
            .map(|name| ManifestEntry {
                name,
                description: None,
            })
            .collect();
        Manifest { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn collect_filenames(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                if key == "name" || key == "document_url" {
                    if let Some(s) = val.as_str() {
                        out.push(s.to_string());
                        continue;
                    }
                }
                collect_filenames(val, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_filenames(item, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_document_format_files() {
        let value = json!({
            "filing": {
                "document_format_files": [
                    {"document_url": "boxer13f.xml", "description": "INFORMATION TABLE"},
                    {"document_url": "cover.htm", "description": "COVER PAGE"},
                    {"document_url": "weird.bin"}
                ]
            }
        });
        let manifest = Manifest::from_json(&value);
        assert_eq!(manifest.entries.len(), 3);
        assert_eq!(manifest.entries[0].name, "boxer13f.xml");
        assert_eq!(
            manifest.entries[0].description.as_deref(),
            Some("INFORMATION TABLE")
        );
        assert_eq!(manifest.entries[2].description, None);
    }

    #[test]
    fn reads_directory_listing() {
        let value = json!({
            "directory": {
                "name": "/Archives/edgar/data/1346824/000134682424000008",
                "item": [
                    {"name": "primary_doc.xml", "type": "text.gif"},
                    {"name": "infotable.xml", "type": "text.gif"}
                ]
            }
        });
        let manifest = Manifest::from_json(&value);
        assert_eq!(manifest.entries.len(), 2);
        assert_eq!(manifest.entries[0].name, "primary_doc.xml");
        assert!(manifest.entries.iter().all(|e| e.description.is_none()));
    }

    #[test]
    fn falls_back_to_generic_name_scan() {
        let value = json!({
            "unexpected": [
                {"wrapper": {"name": "a.xml"}},
                {"document_url": "b.xml"},
                {"wrapper": {"name": "a.xml"}}
            ]
        });
        let manifest = Manifest::from_json(&value);
        let names: Vec<&str> = manifest.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.xml", "b.xml"]);
    }

    #[test]
    fn empty_payload_gives_empty_manifest() {
        let manifest = Manifest::from_json(&json!({}));
        assert!(manifest.is_empty());
    }
}
