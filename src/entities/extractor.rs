//! Entity extractor boundary
//!
//! The extractor itself is an external collaborator (a hosted language
//! model). This module defines the contract and validates whatever comes
//! back against the closed label set.

use super::{CategorizedMentions, Label, LabelSet};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractorError {
    #[error("Entity extractor unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Malformed extractor response: {0}")]
    MalformedResponse(String),

    #[error("Entity extractor misconfigured: {0}")]
    Configuration(String),
}

/// Produces categorized mentions for a text
///
/// Conforming implementations only return labels drawn from `labels`, and
/// every mention is a verbatim substring of `text`.
#[async_trait]
pub trait EntityExtractor: Send + Sync {
    async fn extract(
        &self,
        text: &str,
        labels: &LabelSet,
    ) -> Result<CategorizedMentions, ExtractorError>;
}

/// Reject any label outside the requested set
pub(crate) fn ensure_labels_within(
    mentions: &CategorizedMentions,
    labels: &LabelSet,
) -> Result<(), ExtractorError> {
    let stray: Vec<Label> = mentions
        .labels()
        .iter()
        .filter(|label| !labels.contains(*label))
        .collect();

    if stray.is_empty() {
        Ok(())
    } else {
        Err(ExtractorError::MalformedResponse(format!(
            "labels outside requested set: {}",
            stray
                .iter()
                .map(|l| l.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )))
    }
}

/// Extractor backed by mentions that were computed ahead of time
///
/// Used when the mapping comes from a file or an earlier model call.
pub struct PrecomputedExtractor {
    mentions: CategorizedMentions,
}

impl PrecomputedExtractor {
    pub fn new(mentions: CategorizedMentions) -> Self {
        Self { mentions }
    }
}

#[async_trait]
impl EntityExtractor for PrecomputedExtractor {
    async fn extract(
        &self,
        _text: &str,
        labels: &LabelSet,
    ) -> Result<CategorizedMentions, ExtractorError> {
        ensure_labels_within(&self.mentions, labels)?;
        Ok(self.mentions.clone())
    }
}
