//! Data model for the list index and per-entity detail documents
//!
//! Both documents come from an upstream pipeline that is loose about types:
//! ids may be numbers, optional fields may be `null`, `NaN`-derived nulls or
//! sentinel strings, and nested objects are sometimes replaced by scalars.
//! Deserialization here never fails on those shapes; it reads scalars as
//! text and drops values of the wrong shape.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::text::present;

/// Reads any JSON scalar as text; `null`, arrays and objects become `None`.
fn loose_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| scalar_text(&v)))
}

/// Reads a nested object, ignoring values of any other shape.
fn loose_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(v @ Value::Object(_)) => serde_json::from_value(v).ok(),
        _ => None,
    })
}

/// Reads a list of records. Non-list values read as empty; entries that are
/// not objects keep their slot as an empty record so positions stay stable.
fn loose_records<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(_) => serde_json::from_value(item).unwrap_or_default(),
                _ => T::default(),
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// Text form of a JSON scalar.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A tracked parliamentarian from the list index
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Entity {
    /// Stable identity key
    #[serde(default, deserialize_with = "loose_text")]
    pub id: Option<String>,
    /// Detail document path, relative to the details directory
    #[serde(default, deserialize_with = "loose_text")]
    pub filename: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub prenom: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub nom: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub parti: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub departement: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub commune: Option<String>,
    /// Human-reported position (free text)
    #[serde(default, deserialize_with = "loose_text")]
    pub position: Option<String>,
}

impl Entity {
    /// Trimmed id, `None` when absent or empty
    pub fn key(&self) -> Option<&str> {
        self.id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    /// Detail document filename, `None` when missing or a sentinel
    pub fn detail_file(&self) -> Option<&str> {
        present(self.filename.as_deref())
    }
}

/// Identity override carried by a detail document
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Identity {
    #[serde(default, deserialize_with = "loose_text")]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub prenom: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub nom: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub parti: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub departement: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub commune: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub position: Option<String>,
}

/// AI analysis block of a detail document
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Analysis {
    #[serde(default, deserialize_with = "loose_text")]
    pub status: Option<String>,
    /// French spelling used by older producers
    #[serde(default, deserialize_with = "loose_text")]
    pub statut: Option<String>,
    /// Free text, or a list of `{source, explication}` entries or strings
    #[serde(default)]
    pub justification: Option<Value>,
    /// Indices of the articles the analysis relied on, in several shapes
    #[serde(default)]
    pub used_sources: Option<Value>,
    #[serde(default, deserialize_with = "loose_text")]
    pub analysis_at: Option<String>,
}

impl Analysis {
    /// `status` when non-empty, else `statut`
    pub fn raw_status(&self) -> Option<&str> {
        self.status
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.statut.as_deref())
    }
}

/// News article supporting an analysis
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Article {
    #[serde(default, deserialize_with = "loose_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub snippet: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub link: Option<String>,
}

/// Per-entity detail document
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DetailDocument {
    #[serde(default, deserialize_with = "loose_object")]
    pub identity: Option<Identity>,
    #[serde(default, deserialize_with = "loose_object")]
    pub analysis: Option<Analysis>,
    #[serde(default, deserialize_with = "loose_records")]
    pub search_results: Vec<Article>,
}

impl DetailDocument {
    /// Reads a detail document from parsed JSON; only a top-level object is accepted.
    pub fn from_json(value: Value) -> crate::Result<Self> {
        match value {
            Value::Object(_) => serde_json::from_value(value).map_err(|e| crate::Error::Parse {
                url: String::new(),
                message: e.to_string(),
            }),
            other => Err(crate::Error::Parse {
                url: String::new(),
                message: format!("expected an object, found {}", json_kind(&other)),
            }),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Reads the list index. A non-array document yields an empty list; records
/// that are not objects are skipped.
pub fn parse_list_index(value: Value) -> Vec<Entity> {
    let Value::Array(records) = value else {
        warn!("List index is not an array, treating as empty");
        return Vec::new();
    };

    records
        .into_iter()
        .enumerate()
        .filter_map(|(position, record)| {
            if !record.is_object() {
                warn!(position, "Skipping list index record that is not an object");
                return None;
            }
            match serde_json::from_value::<Entity>(record) {
                Ok(entity) => Some(entity),
                Err(e) => {
                    warn!(position, error = %e, "Skipping unreadable list index record");
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entity_reads_numeric_id_and_nulls() {
        let entity: Entity = serde_json::from_value(json!({
            "id": 42,
            "full_name": null,
            "parti": "LR",
            "commune": ["not", "text"]
        }))
        .unwrap();
        assert_eq!(entity.key(), Some("42"));
        assert_eq!(entity.full_name, None);
        assert_eq!(entity.parti.as_deref(), Some("LR"));
        assert_eq!(entity.commune, None);
        assert_eq!(entity.detail_file(), None);
    }

    #[test]
    fn test_entity_blank_id_has_no_key() {
        let entity: Entity = serde_json::from_value(json!({"id": "  ", "filename": "nan"})).unwrap();
        assert_eq!(entity.key(), None);
        assert_eq!(entity.detail_file(), None);
    }

    #[test]
    fn test_list_index_non_array_is_empty() {
        assert!(parse_list_index(json!({"id": "1"})).is_empty());
    }

    #[test]
    fn test_list_index_skips_scalars() {
        let list = parse_list_index(json!([{"id": "1"}, "junk", 3, {"id": "2"}]));
        let ids: Vec<_> = list.iter().filter_map(Entity::key).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn test_detail_document_tolerates_odd_shapes() {
        let doc = DetailDocument::from_json(json!({
            "identity": "oops",
            "analysis": {"statut": "NON", "justification": "Voir Source 2"},
            "search_results": [{"title": "A"}, "junk", {"title": "C"}]
        }))
        .unwrap();
        assert!(doc.identity.is_none());
        assert_eq!(doc.analysis.as_ref().unwrap().raw_status(), Some("NON"));
        assert_eq!(doc.search_results.len(), 3);
        assert_eq!(doc.search_results[1], Article::default());
        assert_eq!(doc.search_results[2].title.as_deref(), Some("C"));
    }

    #[test]
    fn test_search_results_not_a_list() {
        let doc = DetailDocument::from_json(json!({"search_results": {"title": "A"}})).unwrap();
        assert!(doc.search_results.is_empty());
    }

    #[test]
    fn test_detail_document_rejects_array() {
        assert!(DetailDocument::from_json(json!([1, 2])).is_err());
    }

    #[test]
    fn test_raw_status_prefers_non_empty_status() {
        let analysis = Analysis {
            status: Some(String::new()),
            statut: Some("OUI".to_string()),
            ..Default::default()
        };
        assert_eq!(analysis.raw_status(), Some("OUI"));

        let analysis = Analysis {
            status: Some("NON".to_string()),
            statut: Some("OUI".to_string()),
            ..Default::default()
        };
        assert_eq!(analysis.raw_status(), Some("NON"));
    }
}
