//! Autocomplete lists of previously used values

use serde::{Deserialize, Serialize};

/// Deduplicated, append-only list of free-text values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SuggestionList {
    values: Vec<String>,
}

impl SuggestionList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value if it is non-blank and not already known.
    /// Returns true if the list grew.
    pub fn remember(&mut self, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() || self.values.iter().any(|v| v == value) {
            return false;
        }
        self.values.push(value.to_string());
        true
    }

    /// Known values containing `term`, case-insensitively, in insertion order
    pub fn matching(&self, term: &str) -> Vec<&str> {
        let term = term.trim().to_lowercase();
        self.values
            .iter()
            .filter(|v| term.is_empty() || v.to_lowercase().contains(&term))
            .map(String::as_str)
            .collect()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
