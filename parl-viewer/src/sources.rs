//! Article indices cited by an AI analysis
//!
//! Producers record citations in several shapes: a `used_sources` field
//! (numbers, digit strings, lists, `{source_index}` objects) and "Source N"
//! mentions inside the justification text. All of them are merged here.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use parl_common::DetailDocument;
use regex::Regex;
use serde_json::Value;

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());
static SOURCE_MENTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)Source\s*(\d+)").unwrap());

/// 1-based article indices cited by the analysis, within `1..=total_articles`, ascending.
pub fn used_source_indices(details: Option<&DetailDocument>, total_articles: usize) -> Vec<usize> {
    let Some(analysis) = details.and_then(|d| d.analysis.as_ref()) else {
        return Vec::new();
    };

    let mut indices = BTreeSet::new();
    if let Some(used) = &analysis.used_sources {
        collect_indices(used, &mut indices);
    }

    match &analysis.justification {
        Some(Value::Array(entries)) => {
            for entry in entries {
                match entry {
                    Value::Object(fields) => {
                        if let Some(reference) = source_reference(fields) {
                            collect_indices(reference, &mut indices);
                        }
                        if let Some(Value::String(text)) = fields.get("explication") {
                            collect_mentions(text, &mut indices);
                        }
                    }
                    Value::String(text) => collect_mentions(text, &mut indices),
                    _ => {}
                }
            }
        }
        Some(Value::String(text)) => collect_mentions(text, &mut indices),
        _ => {}
    }

    indices
        .into_iter()
        .filter(|&index| index <= total_articles)
        .collect()
}

/// `source_index` when it holds a meaningful value, else `source`.
fn source_reference(fields: &serde_json::Map<String, Value>) -> Option<&Value> {
    fields
        .get("source_index")
        .filter(|value| is_truthy(value))
        .or_else(|| fields.get("source"))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn collect_indices(value: &Value, indices: &mut BTreeSet<usize>) {
    match value {
        Value::Number(n) => {
            if let Some(index) = n.as_f64().map(f64::floor).filter(|f| *f >= 1.0) {
                indices.insert(index as usize);
            }
        }
        Value::String(text) => {
            for digits in DIGITS.find_iter(text) {
                insert_positive(digits.as_str(), indices);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_indices(item, indices);
            }
        }
        Value::Object(fields) => {
            if let Some(reference) = source_reference(fields) {
                collect_indices(reference, indices);
            }
        }
        Value::Null | Value::Bool(_) => {}
    }
}

fn collect_mentions(text: &str, indices: &mut BTreeSet<usize>) {
    for captures in SOURCE_MENTION.captures_iter(text) {
        if let Some(digits) = captures.get(1) {
            insert_positive(digits.as_str(), indices);
        }
    }
}

fn insert_positive(digits: &str, indices: &mut BTreeSet<usize>) {
    if let Ok(index) = digits.parse::<usize>() {
        if index > 0 {
            indices.insert(index);
        }
    }
}
