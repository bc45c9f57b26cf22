//! Data tables driving classification and presence matching.
//!
//! Tables are plain data: the built-in set lives in `defaults` and any of
//! them can be replaced from a JSON file without touching the algorithms.

pub mod defaults;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::text::contains_term;

/// Version tag of the built-in tables. Bump when `defaults` changes.
pub const TABLES_VERSION: &str = "2024.1";

/// Content rule for one canonical category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub keywords: Vec<String>,
    #[serde(default = "default_min_matches")]
    pub min_matches: usize,
    /// Longest content (in characters) this category accepts.
    #[serde(default)]
    pub max_length: Option<usize>,
    /// Regex patterns; each one that matches counts as one match.
    #[serde(default)]
    pub patterns: Vec<String>,
    /// Receives the positional bias for headless opening sections.
    #[serde(default)]
    pub summary_like: bool,
}

fn default_min_matches() -> usize {
    2
}

impl CategoryRule {
    pub fn new(keywords: &[&str], min_matches: usize) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            min_matches,
            max_length: None,
            patterns: Vec::new(),
            summary_like: false,
        }
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn with_patterns(mut self, patterns: &[&str]) -> Self {
        self.patterns = patterns.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn summary_like(mut self) -> Self {
        self.summary_like = true;
        self
    }
}

/// Symmetric lookup over synonym groups: every member of a group is
/// interchangeable with every other member.
#[derive(Debug, Clone, Default)]
pub struct SynonymIndex {
    groups: BTreeMap<String, BTreeSet<String>>,
}

impl SynonymIndex {
    pub fn new(table: &BTreeMap<String, Vec<String>>) -> Self {
        let mut groups: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (key, synonyms) in table {
            let members: BTreeSet<String> = std::iter::once(key)
                .chain(synonyms.iter())
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect();
            for member in &members {
                let entry = groups.entry(member.clone()).or_default();
                entry.extend(members.iter().filter(|m| *m != member).cloned());
            }
        }
        Self { groups }
    }

    /// Interchangeable terms for `term`, excluding the term itself.
    pub fn synonyms_of(&self, term: &str) -> impl Iterator<Item = &str> {
        self.groups
            .get(&term.to_lowercase())
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// Finds `term` or one of its synonyms in already-lowercased text.
    /// Returns the form that matched.
    pub fn find_in<'a>(&'a self, text: &str, term: &'a str) -> Option<&'a str> {
        if contains_term(text, term) {
            return Some(term);
        }
        self.synonyms_of(term).find(|syn| contains_term(text, syn))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> SynonymIndex {
        let mut table = BTreeMap::new();
        table.insert(
            "troubleshoot".to_string(),
            vec!["debug".to_string(), "diagnose".to_string(), "Fix".to_string()],
        );
        SynonymIndex::new(&table)
    }

    #[test]
    fn test_synonyms_are_symmetric() {
        let idx = index();
        let from_key: Vec<_> = idx.synonyms_of("troubleshoot").collect();
        assert!(from_key.contains(&"debug"));
        let from_member: Vec<_> = idx.synonyms_of("debug").collect();
        assert!(from_member.contains(&"troubleshoot"));
        assert!(from_member.contains(&"fix"));
        assert!(!from_member.contains(&"debug"));
    }

    #[test]
    fn test_find_in_reports_matched_form() {
        let idx = index();
        assert_eq!(
            idx.find_in("diagnosed line faults", "troubleshoot"),
            Some("diagnose")
        );
        assert_eq!(idx.find_in("troubleshooting", "troubleshoot"), Some("troubleshoot"));
        assert_eq!(idx.find_in("wrote documentation", "troubleshoot"), None);
    }

    #[test]
    fn test_unknown_term_has_no_synonyms() {
        assert_eq!(index().synonyms_of("splice").count(), 0);
    }

    #[test]
    fn test_rule_defaults_from_json() {
        let rule: CategoryRule = serde_json::from_str(r#"{"keywords": ["degree"]}"#).unwrap();
        assert_eq!(rule.min_matches, 2);
        assert!(rule.max_length.is_none());
        assert!(!rule.summary_like);
    }
}
