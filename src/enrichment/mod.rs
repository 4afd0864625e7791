//! Entity-to-link enrichment
//!
//! Takes the extractor's categorized mentions, keeps the whitelisted
//! categories, resolves each distinct mention once and rewrites the text
//! with `[mention](reference)` markup.

mod engine;
mod links;
mod rewrite;
mod selection;

pub use engine::{Enrichment, EnrichmentEngine};
pub use links::{LinkOutcome, MentionLinkMap, UnresolvedReason};
pub use rewrite::rewrite;
pub use selection::select_candidates;
