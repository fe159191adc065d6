//! Portable template documents (export / import).
//!
//! ```json
//! { "name": "rack-a", "elements": [ ... ], "version": "1.0", "created": "2024-05-01T12:00:00.000Z" }
//! ```
//!
//! Import only requires `elements` to be an array of valid elements; the
//! other keys are informational.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::element::Element;
use crate::error::{Result, TapecraftError};
use crate::template::Template;

/// Document format version written on export.
pub const DOCUMENT_VERSION: &str = "1.0";

/// Name used when an export is not given one.
pub const DEFAULT_EXPORT_NAME: &str = "label-template";

/// A self-contained template document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateDocument {
    pub name: String,
    pub elements: Vec<Element>,
    pub version: String,
    /// ISO-8601 UTC timestamp.
    pub created: String,
}

impl TemplateDocument {
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Build an export document for `elements`.
///
/// A missing or blank name falls back to [`DEFAULT_EXPORT_NAME`].
pub fn export(name: Option<&str>, elements: &[Element]) -> TemplateDocument {
    let name = name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_EXPORT_NAME);
    TemplateDocument {
        name: name.to_string(),
        elements: elements.to_vec(),
        version: DOCUMENT_VERSION.to_string(),
        created: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

/// Download file name for a document: `<slug>.json`.
pub fn export_file_name(name: &str) -> String {
    let mut slug = String::new();
    for c in name.trim().chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        format!("{}.json", DEFAULT_EXPORT_NAME)
    } else {
        format!("{}.json", slug)
    }
}

/// What an import yielded.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedDocument {
    pub name: Option<String>,
    pub elements: Vec<Element>,
}

/// Validate a parsed document.
pub fn parse_value(value: &Value) -> Result<ImportedDocument> {
    let obj = value
        .as_object()
        .ok_or_else(|| TapecraftError::Format("document must be a JSON object".into()))?;
    let raw = obj
        .get("elements")
        .ok_or_else(|| TapecraftError::Format("document has no \"elements\"".into()))?;
    let items = raw
        .as_array()
        .ok_or_else(|| TapecraftError::Format("\"elements\" must be an array".into()))?;

    let elements = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            Element::deserialize(item)
                .map_err(|e| TapecraftError::Format(format!("element {}: {}", i, e)))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ImportedDocument {
        name: obj.get("name").and_then(Value::as_str).map(str::to_string),
        elements,
    })
}

/// Parse and validate document text.
pub fn parse_str(text: &str) -> Result<ImportedDocument> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| TapecraftError::Format(format!("not valid JSON: {}", e)))?;
    parse_value(&value)
}

/// Replace the live template's elements with the document's.
///
/// Nothing changes unless the whole document validates.
pub fn import_into(template: &mut Template, value: &Value) -> Result<ImportedDocument> {
    let doc = parse_value(value)?;
    template.load_elements(&doc.elements);
    tracing::info!(
        name = doc.name.as_deref().unwrap_or(""),
        count = doc.elements.len(),
        "template imported"
    );
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementType;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_export_defaults() {
        let doc = export(None, &[]);
        assert_eq!(doc.name, "label-template");
        assert_eq!(doc.version, "1.0");
        assert!(chrono::DateTime::parse_from_rfc3339(&doc.created).is_ok());
        assert_eq!(export(Some("   "), &[]).name, "label-template");
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name("Rack A / U12"), "rack-a-u12.json");
        assert_eq!(export_file_name("--"), "label-template.json");
        assert_eq!(export_file_name("server"), "server.json");
    }

    #[test]
    fn test_import_roundtrip_through_text() {
        let el = crate::element::Element::editor_default(ElementType::Barcode);
        let text = export(Some("codes"), std::slice::from_ref(&el))
            .to_json_pretty()
            .unwrap();
        let doc = parse_str(&text).unwrap();
        assert_eq!(doc.name.as_deref(), Some("codes"));
        assert_eq!(doc.elements, vec![el]);
    }

    #[test]
    fn test_import_rejects_bad_shapes() {
        for bad in [
            json!([]),
            json!({"name": "x"}),
            json!({"elements": {"type": "text"}}),
            json!({"elements": [{"type": "hologram"}]}),
        ] {
            let err = parse_value(&bad).unwrap_err();
            assert_eq!(err.kind(), "format", "{}", bad);
        }
        assert_eq!(parse_str("nope").unwrap_err().kind(), "format");
    }

    #[test]
    fn test_failed_import_leaves_template() {
        let mut t = Template::from_starter("device").unwrap();
        let before = t.clone();
        assert!(import_into(&mut t, &json!({"elements": "x"})).is_err());
        assert_eq!(t, before);
    }

    #[test]
    fn test_import_replaces_and_clears_selection() {
        let mut t = Template::new();
        t.add_element(ElementType::Rect);
        let value = json!({
            "elements": [{"id": 1700000000000u64, "type": "text", "x": 1, "y": 2, "text": "hi"}]
        });
        let doc = import_into(&mut t, &value).unwrap();
        assert_eq!(doc.name, None);
        assert_eq!(t.elements().len(), 1);
        assert_eq!(t.elements()[0].id.as_str(), "1700000000000");
        assert!(t.selected_id().is_none());
    }
}
