//! Reference resolution
//!
//! Maps a mention string to a canonical external reference. The resolver
//! is an external collaborator; failures come back as typed values so the
//! retry policy can tell a transient outage from "nothing found".

mod retry;
mod wikipedia;

pub use retry::RetryPolicy;
pub use wikipedia::WikipediaResolver;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Canonical address chosen to represent an entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Reference(String);

impl Reference {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a single resolution attempt produced no reference
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveFailure {
    /// Resolver temporarily unavailable; worth retrying
    #[error("transient resolver failure: {0}")]
    Transient(String),

    /// The search index has no hit for the mention
    #[error("no reference found")]
    NotFound,

    /// The request or response was unusable; retrying will not help
    #[error("malformed resolution: {0}")]
    Malformed(String),
}

impl ResolveFailure {
    pub fn is_transient(&self) -> bool {
        matches!(self, ResolveFailure::Transient(_))
    }
}

/// Looks up the canonical reference for a mention
#[async_trait]
pub trait ReferenceResolver: Send + Sync {
    /// Single attempt, no retries
    async fn resolve(&self, mention: &str) -> Result<Reference, ResolveFailure>;

    /// Short name used in logs
    fn name(&self) -> &str;
}
