use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Raw entry handed over by a data source, before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Candidate {
    Text(String),
    Record(CandidateRecord),
    /// Anything else a JSON source produced (`null`, numbers, arrays). Dropped on normalize.
    Other(Value),
}

/// Scalar fields accept any JSON scalar (numbers and booleans are stringified) and
/// `alias` accepts a single string, so a record with a usable label is not lost
/// over one oddly typed field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, deserialize_with = "lenient_alias", skip_serializing_if = "Option::is_none")]
    pub alias: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(scalar_text))
}

fn lenient_alias<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let aliases = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(entries)) => Some(entries.into_iter().filter_map(scalar_text).collect()),
        Some(other) => scalar_text(other).map(|alias| vec![alias]),
        None => None,
    };
    Ok(aliases)
}

impl From<&str> for Candidate {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Candidate {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<CandidateRecord> for Candidate {
    fn from(value: CandidateRecord) -> Self {
        Self::Record(value)
    }
}

/// A highlighted run inside a label, counted in chars.
///
/// `Range(start, end)` is half-open; `Offset(start)` emphasizes a single char.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Highlight {
    Range(usize, usize),
    Offset(usize),
}

impl Highlight {
    pub fn start(&self) -> usize {
        match *self {
            Self::Range(start, _) | Self::Offset(start) => start,
        }
    }

    pub fn len(&self) -> usize {
        match *self {
            Self::Range(start, end) => end.saturating_sub(start),
            Self::Offset(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedItem {
    pub label: String,
    pub value: String,
    pub target: String,
    #[serde(default)]
    pub alias: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight_index: Option<Vec<Highlight>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl NormalizedItem {
    pub fn from_text(text: &str) -> Self {
        Self {
            label: text.to_string(),
            value: text.to_string(),
            target: text.to_string(),
            alias: Vec::new(),
            highlight_index: None,
            extra: BTreeMap::new(),
        }
    }

    /// `value` followed by every alias, skipping empty strings.
    pub fn match_keys(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.value.as_str())
            .chain(self.alias.iter().map(String::as_str))
            .filter(|key| !key.is_empty())
    }
}

pub fn normalize(candidates: Vec<Candidate>) -> Vec<NormalizedItem> {
    candidates
        .into_iter()
        .filter_map(normalize_candidate)
        .collect()
}

fn normalize_candidate(candidate: Candidate) -> Option<NormalizedItem> {
    match candidate {
        Candidate::Text(text) if text.is_empty() => None,
        Candidate::Text(text) => Some(NormalizedItem::from_text(&text)),
        Candidate::Record(record) => normalize_record(record),
        Candidate::Other(_) => None,
    }
}

fn normalize_record(record: CandidateRecord) -> Option<NormalizedItem> {
    let label = non_empty(record.label);
    let value = non_empty(record.value);

    let (label, value) = match (label, value) {
        (None, None) => return None,
        (Some(label), None) => (label.clone(), label),
        (None, Some(value)) => (value.clone(), value),
        (Some(label), Some(value)) => (label, value),
    };
    let target = non_empty(record.target).unwrap_or_else(|| label.clone());

    Some(NormalizedItem {
        label,
        value,
        target,
        alias: record.alias.unwrap_or_default(),
        highlight_index: None,
        extra: record.extra,
    })
}

fn non_empty(field: Option<String>) -> Option<String> {
    field.filter(|s| !s.is_empty())
}
