//! Single-pass link rewriting
//!
//! Replacement spans are planned against the original text and applied
//! once, so inserted markup is never rescanned. Longer mentions claim their
//! spans first; a shorter mention occurrence that overlaps a claimed span
//! is skipped.

use super::MentionLinkMap;
use crate::resolver::Reference;
use std::collections::BTreeMap;

/// One planned replacement, in byte offsets of the original text
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Placement<'a> {
    pub start: usize,
    pub end: usize,
    pub mention: &'a str,
    pub reference: &'a Reference,
}

/// Plan every replacement for the resolved mentions in `links`
///
/// Returned placements are sorted by start offset and never overlap.
pub(crate) fn plan_placements<'a>(text: &str, links: &'a MentionLinkMap) -> Vec<Placement<'a>> {
    let mut resolved: Vec<(&str, &Reference)> = links.resolved().collect();
    // longest first, ties broken lexically so the plan is deterministic
    resolved.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    let mut claimed: BTreeMap<usize, Placement<'a>> = BTreeMap::new();

    for (mention, reference) in resolved {
        if mention.is_empty() {
            continue;
        }
        for (start, _) in text.match_indices(mention) {
            let end = start + mention.len();
            if overlaps_claimed(&claimed, start, end) {
                continue;
            }
            claimed.insert(
                start,
                Placement {
                    start,
                    end,
                    mention,
                    reference,
                },
            );
        }
    }

    claimed.into_values().collect()
}

/// Claimed spans are disjoint, so only the last one starting before `end`
/// can reach past `start`.
fn overlaps_claimed(claimed: &BTreeMap<usize, Placement<'_>>, start: usize, end: usize) -> bool {
    claimed
        .range(..end)
        .next_back()
        .map_or(false, |(_, placed)| placed.end > start)
}

/// Apply planned placements to the original text in one pass
pub(crate) fn apply_placements(text: &str, placements: &[Placement<'_>]) -> String {
    let extra: usize = placements
        .iter()
        .map(|p| p.reference.as_str().len() + 4)
        .sum();
    let mut out = String::with_capacity(text.len() + extra);
    let mut cursor = 0;

    for placement in placements {
        out.push_str(&text[cursor..placement.start]);
        out.push('[');
        out.push_str(placement.mention);
        out.push_str("](");
        out.push_str(placement.reference.as_str());
        out.push(')');
        cursor = placement.end;
    }
    out.push_str(&text[cursor..]);

    out
}

/// Wrap every resolved mention occurrence in `[mention](reference)` markup
pub fn rewrite(text: &str, links: &MentionLinkMap) -> String {
    let placements = plan_placements(text, links);
    apply_placements(text, &placements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::{LinkOutcome, UnresolvedReason};

    fn links(entries: &[(&str, Option<&str>)]) -> MentionLinkMap {
        entries
            .iter()
            .map(|(mention, reference)| {
                let outcome = match reference {
                    Some(r) => LinkOutcome::resolved(Reference::new(*r)),
                    None => LinkOutcome::unresolved(UnresolvedReason::NotFound),
                };
                (mention.to_string(), outcome)
            })
            .collect()
    }

    #[test]
    fn test_replaces_every_occurrence() {
        let map = links(&[("Rust", Some("R"))]);
        assert_eq!(
            rewrite("Rust and Rust again", &map),
            "[Rust](R) and [Rust](R) again"
        );
    }

    #[test]
    fn test_unresolved_left_alone() {
        let map = links(&[("Ada", None), ("Grace", Some("G"))]);
        assert_eq!(rewrite("Ada met Grace", &map), "Ada met [Grace](G)");
    }

    #[test]
    fn test_longer_mention_wins_overlap() {
        let map = links(&[("Gutenberg", Some("G")), ("Johannes Gutenberg", Some("JG"))]);
        assert_eq!(
            rewrite("Johannes Gutenberg, then Gutenberg", &map),
            "[Johannes Gutenberg](JG), then [Gutenberg](G)"
        );
    }

    #[test]
    fn test_longer_wins_even_when_shorter_starts_first() {
        let map = links(&[("New York", Some("NY")), ("York City Hall", Some("YCH"))]);
        assert_eq!(
            rewrite("New York City Hall", &map),
            "New [York City Hall](YCH)"
        );
    }

    #[test]
    fn test_reference_text_is_not_rescanned() {
        // the reference for "Paris" contains the candidate "wiki"
        let map = links(&[("Paris", Some("https://wiki/Paris")), ("wiki", Some("W"))]);
        assert_eq!(
            rewrite("Paris has a wiki", &map),
            "[Paris](https://wiki/Paris) has a [wiki](W)"
        );
    }

    #[test]
    fn test_placements_sorted_and_disjoint() {
        let map = links(&[("ab", Some("1")), ("bc", Some("2")), ("c", Some("3"))]);
        let placements = plan_placements("abcabc c", &map);

        let spans: Vec<(usize, usize)> = placements.iter().map(|p| (p.start, p.end)).collect();
        // "ab" wins over "bc" (lexical tie-break), "c" fills the gaps
        assert_eq!(spans, vec![(0, 2), (2, 3), (3, 5), (5, 6), (7, 8)]);
    }

    #[test]
    fn test_multibyte_text() {
        let map = links(&[("Zürich", Some("Z"))]);
        assert_eq!(rewrite("Grüße aus Zürich!", &map), "Grüße aus [Zürich](Z)!");
    }

    #[test]
    fn test_no_links_returns_input() {
        let text = "nothing to see";
        assert_eq!(rewrite(text, &MentionLinkMap::new()), text);
    }
}
