use std::fmt;
use std::sync::Arc;

use crate::model::{Highlight, NormalizedItem};

pub type FilterFn = dyn Fn(Vec<NormalizedItem>, &str) -> Vec<NormalizedItem> + Send + Sync;

/// Turns the normalized data-source response into the visible result set.
#[derive(Clone)]
pub enum Filter {
    /// Registry name `default`: keeps everything the source returned.
    Identity,
    /// Registry name `startsWith`: case-insensitive literal prefix.
    StartsWith,
    /// Registry name `stringMatch`: case-sensitive substring.
    StringMatch,
    Custom(Arc<FilterFn>),
}

impl Default for Filter {
    fn default() -> Self {
        Self::StartsWith
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Filter({})", self.name())
    }
}

impl Filter {
    /// Looks a filter up in the built-in registry. Unknown names select [`Filter::Identity`].
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "startsWith" => Self::StartsWith,
            "stringMatch" => Self::StringMatch,
            _ => Self::Identity,
        }
    }

    /// No name at all means prefix matching.
    pub fn resolve(name: Option<&str>) -> Self {
        name.map(Self::from_name).unwrap_or_default()
    }

    pub fn custom<F>(filter: F) -> Self
    where
        F: Fn(Vec<NormalizedItem>, &str) -> Vec<NormalizedItem> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(filter))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Identity => "default",
            Self::StartsWith => "startsWith",
            Self::StringMatch => "stringMatch",
            Self::Custom(_) => "custom",
        }
    }

    pub fn apply(&self, items: Vec<NormalizedItem>, query: &str) -> Vec<NormalizedItem> {
        match self {
            Self::Identity => filter_default(items, query),
            Self::StartsWith => filter_starts_with(items, query),
            Self::StringMatch => filter_string_match(items, query),
            Self::Custom(filter) => filter(items, query),
        }
    }
}

pub fn filter_default(items: Vec<NormalizedItem>, _query: &str) -> Vec<NormalizedItem> {
    items
}

pub fn filter_starts_with(items: Vec<NormalizedItem>, query: &str) -> Vec<NormalizedItem> {
    if query.is_empty() {
        return Vec::new();
    }

    let lowered_query: String = query.chars().flat_map(char::to_lowercase).collect();
    let query_len = query.chars().count();

    items
        .into_iter()
        .filter_map(|mut item| {
            let matched_label = {
                let matched = item
                    .match_keys()
                    .find(|key| starts_with_ignore_case(key, &lowered_query))?;
                matched == item.label
            };
            // Highlighting only makes sense when the matched text is what gets displayed.
            item.highlight_index = matched_label.then(|| vec![Highlight::Range(0, query_len)]);
            Some(item)
        })
        .collect()
}

pub fn filter_string_match(items: Vec<NormalizedItem>, query: &str) -> Vec<NormalizedItem> {
    if query.is_empty() {
        return Vec::new();
    }

    items
        .into_iter()
        .filter_map(|mut item| {
            let matched_label = {
                let matched = item.match_keys().find(|key| key.contains(query))?;
                matched == item.label
            };
            item.highlight_index =
                matched_label.then(|| string_match_ranges(&item.label, query));
            Some(item)
        })
        .collect()
}

/// Walks `label` consuming `query` chars in order, restarting the query on any
/// mismatch; every time the whole query has been consumed, records the
/// query-wide window ending at the current char.
///
/// Windows are counted in chars, ascending and disjoint.
pub fn string_match_ranges(label: &str, query: &str) -> Vec<Highlight> {
    let query: Vec<char> = query.chars().collect();
    if query.is_empty() {
        return Vec::new();
    }

    let mut ranges = Vec::new();
    let mut query_index = 0;
    for (position, ch) in label.chars().enumerate() {
        if ch != query[query_index] {
            query_index = 0;
            continue;
        }

        if query_index == query.len() - 1 {
            ranges.push(Highlight::Range(position + 1 - query.len(), position + 1));
            query_index = 0;
            continue;
        }

        query_index += 1;
    }

    ranges
}

fn starts_with_ignore_case(key: &str, lowered_query: &str) -> bool {
    let mut key_chars = key.chars().flat_map(char::to_lowercase);
    lowered_query.chars().all(|q| key_chars.next() == Some(q))
}
