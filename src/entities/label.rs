//! Closed set of entity category labels

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Entity category recognized by the extractor
///
/// Serialized as the lowercase snake_case tag the extractor emits
/// (`person`, `work_of_art`, ...). Deserialization goes through
/// [`FromStr`], so tags are matched case-insensitively everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Label {
    Person,
    Fac,
    Org,
    Gpe,
    Loc,
    Product,
    Event,
    WorkOfArt,
    Law,
    Language,
    Date,
    Time,
    Percent,
    Money,
    Quantity,
    Ordinal,
    Cardinal,
}

impl Label {
    /// Every label, in declaration order
    pub const ALL: [Label; 17] = [
        Label::Person,
        Label::Fac,
        Label::Org,
        Label::Gpe,
        Label::Loc,
        Label::Product,
        Label::Event,
        Label::WorkOfArt,
        Label::Law,
        Label::Language,
        Label::Date,
        Label::Time,
        Label::Percent,
        Label::Money,
        Label::Quantity,
        Label::Ordinal,
        Label::Cardinal,
    ];

    /// Wire tag for this label
    pub fn as_str(self) -> &'static str {
        match self {
            Label::Person => "person",
            Label::Fac => "fac",
            Label::Org => "org",
            Label::Gpe => "gpe",
            Label::Loc => "loc",
            Label::Product => "product",
            Label::Event => "event",
            Label::WorkOfArt => "work_of_art",
            Label::Law => "law",
            Label::Language => "language",
            Label::Date => "date",
            Label::Time => "time",
            Label::Percent => "percent",
            Label::Money => "money",
            Label::Quantity => "quantity",
            Label::Ordinal => "ordinal",
            Label::Cardinal => "cardinal",
        }
    }

    /// Human description, used when prompting the extractor
    pub fn description(self) -> &'static str {
        match self {
            Label::Person => "people, including fictional characters",
            Label::Fac => "buildings, airports, highways, bridges",
            Label::Org => "organizations, companies, agencies, institutions",
            Label::Gpe => "geopolitical entities like countries, cities, states",
            Label::Loc => "non-gpe locations",
            Label::Product => "vehicles, foods, apparel, appliances, software, toys",
            Label::Event => "named sports, scientific milestones, historical events",
            Label::WorkOfArt => "titles of books, songs, movies",
            Label::Law => "named laws, acts, or legislations",
            Label::Language => "any named language",
            Label::Date => "absolute or relative dates or periods",
            Label::Time => "time units smaller than a day",
            Label::Percent => "percentage (e.g., \"twenty percent\", \"18%\")",
            Label::Money => "monetary values, including unit",
            Label::Quantity => "measurements, e.g., weight or distance",
            Label::Ordinal => "\"first\", \"second\", etc.",
            Label::Cardinal => "numerals that do not fall under another category",
        }
    }

    fn bit(self) -> u32 {
        1 << (self as u32)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized label tag
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown entity label: '{0}'")]
pub struct UnknownLabel(pub String);

impl FromStr for Label {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase();
        Label::ALL
            .iter()
            .copied()
            .find(|label| label.as_str() == tag)
            .ok_or_else(|| UnknownLabel(s.to_string()))
    }
}

impl TryFrom<String> for Label {
    type Error = UnknownLabel;

    fn try_from(tag: String) -> Result<Self, Self::Error> {
        tag.parse()
    }
}

/// Set of labels, stored as a bitmask
///
/// Serializes as a list of label tags in declaration order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Label>", into = "Vec<Label>")]
pub struct LabelSet(u32);

impl LabelSet {
    /// Categories whose mentions are worth linking to an external reference
    pub const LINKABLE: LabelSet = LabelSet(
        (1 << Label::Event as u32)
            | (1 << Label::Gpe as u32)
            | (1 << Label::Org as u32)
            | (1 << Label::Person as u32)
            | (1 << Label::Product as u32)
            | (1 << Label::WorkOfArt as u32),
    );

    pub const fn empty() -> Self {
        LabelSet(0)
    }

    pub fn all() -> Self {
        Label::ALL.iter().copied().collect()
    }

    pub fn insert(&mut self, label: Label) {
        self.0 |= label.bit();
    }

    pub fn contains(&self, label: Label) -> bool {
        self.0 & label.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Labels in declaration order
    pub fn iter(&self) -> impl Iterator<Item = Label> + '_ {
        Label::ALL.iter().copied().filter(|l| self.contains(*l))
    }

    /// Parse a comma-separated list such as `"person,org,gpe"`
    pub fn parse_list(s: &str) -> Result<Self, UnknownLabel> {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(Label::from_str)
            .collect()
    }
}

impl FromIterator<Label> for LabelSet {
    fn from_iter<I: IntoIterator<Item = Label>>(iter: I) -> Self {
        let mut set = LabelSet::empty();
        for label in iter {
            set.insert(label);
        }
        set
    }
}

impl From<Vec<Label>> for LabelSet {
    fn from(labels: Vec<Label>) -> Self {
        labels.into_iter().collect()
    }
}

impl From<LabelSet> for Vec<Label> {
    fn from(set: LabelSet) -> Self {
        set.iter().collect()
    }
}

impl fmt::Debug for LabelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_tags() {
        for label in Label::ALL {
            assert_eq!(label.as_str().parse::<Label>().unwrap(), label);
        }
        assert_eq!("WORK_OF_ART".parse::<Label>().unwrap(), Label::WorkOfArt);
    }

    #[test]
    fn test_unknown_label() {
        let err = "organisation".parse::<Label>().unwrap_err();
        assert_eq!(err, UnknownLabel("organisation".to_string()));
    }

    #[test]
    fn test_linkable_set() {
        let linkable = LabelSet::LINKABLE;
        assert_eq!(linkable.len(), 6);
        assert!(linkable.contains(Label::Person));
        assert!(linkable.contains(Label::WorkOfArt));
        assert!(!linkable.contains(Label::Date));
        assert!(!linkable.contains(Label::Percent));
        assert!(!linkable.contains(Label::Quantity));
    }

    #[test]
    fn test_parse_list() {
        let set = LabelSet::parse_list("gpe, person,,product").unwrap();
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![Label::Person, Label::Gpe, Label::Product]
        );
        assert!(LabelSet::parse_list("gpe,planet").is_err());
    }

    #[test]
    fn test_set_basics() {
        assert!(LabelSet::empty().is_empty());
        assert_eq!(LabelSet::all().len(), Label::ALL.len());
        assert!(LabelSet::all().contains(Label::Cardinal));
    }

    #[test]
    fn test_serde_as_list() {
        let set: LabelSet = [Label::Org, Label::Event].into_iter().collect();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["org","event"]"#);
        let back: LabelSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
        assert!(serde_json::from_str::<LabelSet>(r#"["planet"]"#).is_err());
    }

    #[test]
    fn test_deserialize_matches_from_str() {
        for tag in ["PERSON", "Work_Of_Art", " gpe "] {
            let parsed: Label = tag.parse().unwrap();
            let json = serde_json::to_string(tag).unwrap();
            assert_eq!(serde_json::from_str::<Label>(&json).unwrap(), parsed);
        }
        assert!(serde_json::from_str::<Label>(r#""planet""#).is_err());
    }
}
