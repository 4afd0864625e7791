//! enlink - Named-entity link enrichment
//!
//! Takes the category -> mentions mapping produced by an entity extractor,
//! resolves link-worthy mentions against a knowledge base and rewrites the
//! source text with `[mention](reference)` links.

pub mod cli;
pub mod config;
pub mod enrichment;
pub mod entities;
pub mod error;
pub mod resolver;

pub use enrichment::{Enrichment, EnrichmentEngine};
pub use error::{EnlinkError, Result};
