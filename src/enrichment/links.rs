//! Per-call mention -> reference map

use crate::resolver::{Reference, ResolveFailure};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Final resolution outcome for one distinct mention
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LinkOutcome {
    Resolved { reference: Reference },
    Unresolved { reason: UnresolvedReason },
}

impl LinkOutcome {
    pub fn resolved(reference: Reference) -> Self {
        LinkOutcome::Resolved { reference }
    }

    pub fn unresolved(reason: UnresolvedReason) -> Self {
        LinkOutcome::Unresolved { reason }
    }

    pub fn reference(&self) -> Option<&Reference> {
        match self {
            LinkOutcome::Resolved { reference } => Some(reference),
            LinkOutcome::Unresolved { .. } => None,
        }
    }
}

/// Why a mention is left unlinked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedReason {
    /// The knowledge base had no hit
    NotFound,
    /// The resolver rejected the query or answered with garbage
    Rejected,
    /// Transient failures on every attempt
    Unavailable,
}

impl From<Result<Reference, ResolveFailure>> for LinkOutcome {
    fn from(result: Result<Reference, ResolveFailure>) -> Self {
        match result {
            Ok(reference) => LinkOutcome::Resolved { reference },
            Err(failure) => LinkOutcome::Unresolved {
                reason: match failure {
                    ResolveFailure::NotFound => UnresolvedReason::NotFound,
                    ResolveFailure::Malformed(_) => UnresolvedReason::Rejected,
                    ResolveFailure::Transient(_) => UnresolvedReason::Unavailable,
                },
            },
        }
    }
}

/// Outcome for every candidate mention of one enrichment call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MentionLinkMap(BTreeMap<String, LinkOutcome>);

impl MentionLinkMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, mention: impl Into<String>, outcome: LinkOutcome) {
        self.0.insert(mention.into(), outcome);
    }

    pub fn get(&self, mention: &str) -> Option<&LinkOutcome> {
        self.0.get(mention)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LinkOutcome)> {
        self.0.iter().map(|(mention, outcome)| (mention.as_str(), outcome))
    }

    /// Mentions that resolved, with their references
    pub fn resolved(&self) -> impl Iterator<Item = (&str, &Reference)> {
        self.iter()
            .filter_map(|(mention, outcome)| outcome.reference().map(|r| (mention, r)))
    }

    pub fn resolved_count(&self) -> usize {
        self.resolved().count()
    }

    pub fn count_unresolved(&self, reason: UnresolvedReason) -> usize {
        self.0
            .values()
            .filter(|outcome| matches!(outcome, LinkOutcome::Unresolved { reason: r } if *r == reason))
            .count()
    }

    /// True when there were candidates and every one ran out of retries
    pub fn is_total_outage(&self) -> bool {
        !self.is_empty() && self.count_unresolved(UnresolvedReason::Unavailable) == self.len()
    }
}

impl Extend<(String, LinkOutcome)> for MentionLinkMap {
    fn extend<I: IntoIterator<Item = (String, LinkOutcome)>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl FromIterator<(String, LinkOutcome)> for MentionLinkMap {
    fn from_iter<I: IntoIterator<Item = (String, LinkOutcome)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
