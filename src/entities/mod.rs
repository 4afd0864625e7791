//! Entity categories and the extractor boundary
//!
//! This module provides:
//! - The closed `Label` enum and `LabelSet` used for whitelisting
//! - `CategorizedMentions`, the extractor's label -> mentions mapping
//! - The `EntityExtractor` trait with precomputed and chat-completion backends

mod chat;
mod extractor;
mod label;
mod mentions;

pub use chat::ChatCompletionExtractor;
pub use extractor::{EntityExtractor, ExtractorError, PrecomputedExtractor};
pub use label::{Label, LabelSet, UnknownLabel};
pub use mentions::CategorizedMentions;
