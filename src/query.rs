//! Upstream query strings.

use serde::Serialize;

/// Ordered query-string pairs for one upstream request.
///
/// Keys may repeat; OpenStates reads list filters such as `include` as
/// repeated parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct UpstreamQuery {
    pairs: Vec<(String, String)>,
}

impl UpstreamQuery {
    /// An empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one pair.
    pub fn push(&mut self, key: &str, value: impl ToString) -> &mut Self {
        self.pairs.push((key.to_string(), value.to_string()));
        self
    }

    /// Append a pair when the value is present.
    pub fn push_opt<V: ToString>(&mut self, key: &str, value: Option<V>) -> &mut Self {
        if let Some(v) = value {
            self.push(key, v);
        }
        self
    }

    /// Append one pair per list element.
    pub fn push_all(&mut self, key: &str, values: Option<Vec<String>>) -> &mut Self {
        for v in values.into_iter().flatten() {
            self.push(key, v);
        }
        self
    }

    /// All pairs in insertion order.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Values for a key in insertion order.
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// True when no pairs have been added.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
