use std::collections::BTreeMap;

use crate::text::{contains_phrase, fold};

/// Maps heading strings to canonical category keys.
///
/// Phrases are checked longest first so that "volunteer experience" wins
/// over "experience" and "language skills" over "skills".
#[derive(Debug, Clone, Default)]
pub struct SynonymNormalizer {
    /// (phrase, canonical key), longest phrase first.
    phrases: Vec<(String, String)>,
}

impl SynonymNormalizer {
    pub fn new(table: &BTreeMap<String, Vec<String>>) -> Self {
        let mut phrases: Vec<(String, String)> = Vec::new();
        for (key, synonyms) in table {
            let canonical = fold(key);
            for phrase in std::iter::once(key).chain(synonyms.iter()) {
                let phrase = fold(phrase);
                if !phrase.is_empty() && !phrases.iter().any(|(p, _)| *p == phrase) {
                    phrases.push((phrase, canonical.clone()));
                }
            }
        }
        // Stable sort keeps table order among equal lengths.
        phrases.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()));
        Self { phrases }
    }

    /// Canonical key for `heading`, or `None` when no phrase applies.
    pub fn normalize(&self, heading: &str) -> Option<&str> {
        let folded = fold(heading);
        if folded.is_empty() {
            return None;
        }
        self.phrases
            .iter()
            .find(|(phrase, _)| folded == *phrase || contains_phrase(&folded, phrase))
            .map(|(_, canonical)| canonical.as_str())
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}
