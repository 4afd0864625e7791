//! Candidate selection from whitelisted categories

use crate::entities::{CategorizedMentions, LabelSet};
use std::collections::BTreeSet;

/// Distinct mentions across the whitelisted categories
///
/// Deduplication is exact and case-sensitive. Blank mentions are dropped:
/// they would match everywhere in the text.
pub fn select_candidates(mentions: &CategorizedMentions, whitelist: &LabelSet) -> Vec<String> {
    let mut seen = BTreeSet::new();

    for label in whitelist.iter() {
        for mention in mentions.get(label) {
            if mention.trim().is_empty() {
                continue;
            }
            seen.insert(mention.as_str());
        }
    }

    seen.into_iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Label;

    #[test]
    fn test_only_whitelisted_categories() {
        let mentions = CategorizedMentions::new()
            .with(Label::Gpe, &["Germany"])
            .with(Label::Date, &["1440"])
            .with(Label::Person, &["Johannes Gutenberg"]);
        let whitelist: LabelSet = [Label::Gpe, Label::Person].into_iter().collect();

        let candidates = select_candidates(&mentions, &whitelist);
        assert_eq!(candidates, vec!["Germany", "Johannes Gutenberg"]);
    }

    #[test]
    fn test_exact_deduplication() {
        let mentions = CategorizedMentions::new()
            .with(Label::Org, &["Apple", "Apple", "apple"])
            .with(Label::Product, &["Apple"]);

        let candidates = select_candidates(&mentions, &LabelSet::LINKABLE);
        assert_eq!(candidates, vec!["Apple", "apple"]);
    }

    #[test]
    fn test_blank_mentions_dropped() {
        let mentions = CategorizedMentions::new().with(Label::Person, &["", "  ", "Ada"]);
        assert_eq!(select_candidates(&mentions, &LabelSet::LINKABLE), vec!["Ada"]);
    }

    #[test]
    fn test_empty_whitelist_selects_nothing() {
        let mentions = CategorizedMentions::new().with(Label::Person, &["Ada"]);
        assert!(select_candidates(&mentions, &LabelSet::empty()).is_empty());
    }
}
