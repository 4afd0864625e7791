//! Extractor output: mention strings grouped by category

use super::{Label, LabelSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mapping from category label to the mentions emitted under it
///
/// Mentions keep extractor emission order and may repeat within or
/// across categories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategorizedMentions(BTreeMap<Label, Vec<String>>);

impl CategorizedMentions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a mention under `label`
    pub fn push(&mut self, label: Label, mention: impl Into<String>) {
        self.0.entry(label).or_default().push(mention.into());
    }

    /// Builder-style variant of [`push`](Self::push) for a whole list
    pub fn with(mut self, label: Label, mentions: &[&str]) -> Self {
        for mention in mentions {
            self.push(label, *mention);
        }
        self
    }

    /// Mentions emitted under `label`
    pub fn get(&self, label: Label) -> &[String] {
        self.0.get(&label).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Labels that carry at least one mention
    pub fn labels(&self) -> LabelSet {
        self.0
            .iter()
            .filter(|(_, mentions)| !mentions.is_empty())
            .map(|(label, _)| *label)
            .collect()
    }

    /// Total mention count, duplicates included
    pub fn mention_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.mention_count() == 0
    }

    /// Parse the JSON object form `{"person": ["..."], ...}`
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
