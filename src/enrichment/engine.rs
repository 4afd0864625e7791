//! Enrichment engine: select, resolve, rewrite

use super::{rewrite, select_candidates, LinkOutcome, MentionLinkMap, UnresolvedReason};
use crate::entities::{CategorizedMentions, EntityExtractor, LabelSet};
use crate::error::{EnlinkError, Result};
use crate::resolver::{ReferenceResolver, RetryPolicy};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, info_span, Instrument};

/// Result of one enrichment call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrichment {
    /// Input text with resolved mentions wrapped in link markup
    pub text: String,
    /// Outcome for every distinct candidate mention
    pub links: MentionLinkMap,
}

/// Links entity mentions in text to canonical references
///
/// Each call owns its candidate set and link map; nothing is shared
/// between calls. Dropping the returned future cancels the call and
/// discards any partial resolution.
pub struct EnrichmentEngine {
    resolver: Arc<dyn ReferenceResolver>,
    retry: RetryPolicy,
    max_concurrent: usize,
}

impl EnrichmentEngine {
    /// Create a new engine
    ///
    /// # Arguments
    /// * `resolver` - Reference resolver (knowledge base lookup)
    /// * `retry` - Retry policy wrapped around every resolver call
    /// * `max_concurrent` - Maximum resolver calls in flight
    pub fn new(
        resolver: Arc<dyn ReferenceResolver>,
        retry: RetryPolicy,
        max_concurrent: usize,
    ) -> Self {
        Self {
            resolver,
            retry,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Enrich `text`, returning only the rewritten text
    pub async fn enrich(
        &self,
        text: &str,
        mentions: &CategorizedMentions,
        whitelist: &LabelSet,
    ) -> Result<String> {
        Ok(self.enrich_with_report(text, mentions, whitelist).await?.text)
    }

    /// Enrich `text` and report how each candidate mention resolved
    ///
    /// Fails with `ResolutionUnavailable` only when every candidate ran
    /// out of retries; any other mix of outcomes yields a result.
    pub async fn enrich_with_report(
        &self,
        text: &str,
        mentions: &CategorizedMentions,
        whitelist: &LabelSet,
    ) -> Result<Enrichment> {
        let candidates = select_candidates(mentions, whitelist);
        let call_id = uuid::Uuid::new_v4();
        let span = info_span!("enrich", %call_id, candidates = candidates.len());

        async move {
            if candidates.is_empty() {
                debug!("No link-worthy mentions, returning input unchanged");
                return Ok(Enrichment {
                    text: text.to_string(),
                    links: MentionLinkMap::new(),
                });
            }

            let links = self.resolve_all(candidates).await;

            if links.is_total_outage() {
                return Err(EnlinkError::ResolutionUnavailable {
                    candidates: links.len(),
                });
            }

            let enriched = rewrite(text, &links);

            info!(
                resolved = links.resolved_count(),
                not_found = links.count_unresolved(UnresolvedReason::NotFound),
                rejected = links.count_unresolved(UnresolvedReason::Rejected),
                unavailable = links.count_unresolved(UnresolvedReason::Unavailable),
                "Enrichment complete"
            );

            Ok(Enrichment {
                text: enriched,
                links,
            })
        }
        .instrument(span)
        .await
    }

    /// Run the extractor first, then enrich its output
    ///
    /// Extractor failures are returned as-is.
    pub async fn extract_and_enrich(
        &self,
        extractor: &dyn EntityExtractor,
        text: &str,
        labels: &LabelSet,
        whitelist: &LabelSet,
    ) -> Result<Enrichment> {
        let mentions = extractor.extract(text, labels).await?;
        self.enrich_with_report(text, &mentions, whitelist).await
    }

    /// Resolve a single mention under the retry policy
    pub async fn resolve_one(&self, mention: &str) -> LinkOutcome {
        let result = self
            .retry
            .run(mention, || self.resolver.resolve(mention))
            .await;
        debug!(
            resolver = self.resolver.name(),
            mention,
            resolved = result.is_ok(),
            "Resolved mention"
        );
        LinkOutcome::from(result)
    }

    /// Resolve every distinct candidate exactly once
    async fn resolve_all(&self, candidates: Vec<String>) -> MentionLinkMap {
        stream::iter(candidates)
            .map(|mention| async move {
                let outcome = self.resolve_one(&mention).await;
                (mention, outcome)
            })
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await
    }
}
