//! Project context: flat, read-only site data supplied by the host

use crate::answers::ComparisonText;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Flat mapping from project field name to value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectContext {
    fields: BTreeMap<String, Value>,
}

impl ProjectContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Text of a field for condition comparison
    pub fn comparison_text(&self, key: &str) -> ComparisonText {
        match self.fields.get(key) {
            None | Some(Value::Null) => ComparisonText::Absent,
            Some(Value::String(s)) => ComparisonText::Text(s.clone()),
            Some(Value::Number(n)) => ComparisonText::Text(n.to_string()),
            Some(Value::Bool(b)) => ComparisonText::Text(b.to_string()),
            Some(Value::Array(_)) => ComparisonText::Unsupported("array"),
            Some(Value::Object(_)) => ComparisonText::Unsupported("object"),
        }
    }

    /// Numeric value of a field; missing or unparseable fields count as zero
    pub fn number(&self, key: &str) -> f64 {
        match self.fields.get(key) {
            Some(Value::Number(n)) => n.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0),
            Some(Value::String(s)) => parse_lenient_number(s),
            Some(Value::Bool(true)) => 1.0,
            _ => 0.0,
        }
    }
}

impl FromIterator<(String, Value)> for ProjectContext {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Parse a number the way site spreadsheets write them.
///
/// Surrounding whitespace is ignored and a comma is accepted as decimal
/// separator (`"2,5"` is 2.5). Anything that still fails to parse, or is not
/// finite, is zero.
pub fn parse_lenient_number(raw: &str) -> f64 {
    raw.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}
