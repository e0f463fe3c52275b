//! Weighted keyword vocabularies and the scoring built on them.
//!
//! A [`KeywordWeightTable`] maps lowercase phrases to positive weights.
//! Phrases match as case-insensitive substrings, not tokens, so overlapping
//! phrases such as `"rain"` and `"heavy rain"` both count on the same text.
//!
//! Table order is significant: it is the order phrases are listed in the
//! configuration, and [`KeywordWeightTable::dominant`] breaks ties by it.

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;

/// A single phrase and its weight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordWeight {
    pub phrase: String,
    pub weight: u32,
}

/// Immutable, ordered phrase → weight mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordWeightTable {
    entries: Vec<KeywordWeight>,
}

impl KeywordWeightTable {
    /// Build a table from `(phrase, weight)` pairs.
    ///
    /// Phrases are trimmed and lowercased. Empty phrases are dropped since
    /// they would match everywhere. A repeated phrase keeps the position of
    /// its first occurrence and takes the weight of its last.
    pub fn new<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: AsRef<str>,
    {
        let mut entries: Vec<KeywordWeight> = Vec::new();
        for (phrase, weight) in pairs {
            let phrase = phrase.as_ref().trim().to_lowercase();
            if phrase.is_empty() {
                continue;
            }
            match entries.iter_mut().find(|e| e.phrase == phrase) {
                Some(existing) => existing.weight = weight,
                None => entries.push(KeywordWeight { phrase, weight }),
            }
        }
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeywordWeight> {
        self.entries.iter()
    }

    /// Sum over all phrases of `occurrences × weight`.
    ///
    /// Occurrences are non-overlapping, case-insensitive substring matches.
    /// Empty text scores 0.
    pub fn score(&self, text: &str) -> u64 {
        let text = text.to_lowercase();
        self.iter()
            .map(|e| occurrences(&text, &e.phrase) as u64 * u64::from(e.weight))
            .sum()
    }

    /// Whether any phrase occurs in `text` (case-insensitive).
    pub fn matches_any(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.iter().any(|e| text.contains(&e.phrase))
    }

    /// The phrase with the most occurrences in `text`.
    ///
    /// Ties go to the phrase listed first in the table. Returns `None` only
    /// for an empty table; when nothing matches, the first phrase is returned.
    pub fn dominant(&self, text: &str) -> Option<&str> {
        let text = text.to_lowercase();
        let mut best: Option<(&str, usize)> = None;
        for entry in self.iter() {
            let count = occurrences(&text, &entry.phrase);
            match best {
                Some((_, best_count)) if count <= best_count => {}
                _ => best = Some((entry.phrase.as_str(), count)),
            }
        }
        best.map(|(phrase, _)| phrase)
    }
}

/// Non-overlapping occurrences of `needle` in `haystack`.
fn occurrences(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

impl<'de> Deserialize<'de> for KeywordWeightTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = KeywordWeightTable;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a mapping of keyword phrase to positive integer weight")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut pairs = Vec::new();
                while let Some((phrase, weight)) = map.next_entry::<String, u32>()? {
                    if weight == 0 {
                        return Err(de::Error::custom(format!(
                            "keyword {phrase:?} has weight 0; weights must be positive"
                        )));
                    }
                    pairs.push((phrase, weight));
                }
                Ok(KeywordWeightTable::new(pairs))
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}
