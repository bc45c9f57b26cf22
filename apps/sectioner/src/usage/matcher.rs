//! Skill Presence Matcher — is an item evidenced in a record's description?
//!
//! Rule: two or more matched keywords, or exactly one when that keyword is a
//! specific/technical term (a named tool, protocol or certification). A lone
//! generic word like "managed" is not enough.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::tables::SynonymIndex;

/// Matches needed when none of them is a specific term.
pub const MIN_GENERIC_MATCHES: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceMatch {
    pub matches: usize,
    /// Keywords that matched, directly or through a synonym.
    pub matched: Vec<String>,
    pub present: bool,
}

#[derive(Debug, Clone)]
pub struct PresenceMatcher {
    synonyms: Arc<SynonymIndex>,
    specific_terms: BTreeSet<String>,
}

impl PresenceMatcher {
    pub fn new(synonyms: Arc<SynonymIndex>, specific_terms: &BTreeSet<String>) -> Self {
        Self {
            synonyms,
            specific_terms: specific_terms
                .iter()
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    pub fn is_specific(&self, term: &str) -> bool {
        self.specific_terms.contains(&term.to_lowercase())
    }

    pub fn check(&self, keywords: &BTreeSet<String>, description: &str) -> PresenceMatch {
        let text = description.to_lowercase();
        let mut matched = Vec::new();
        let mut specific_hit = false;

        for keyword in keywords {
            let keyword = keyword.to_lowercase();
            if let Some(form) = self.synonyms.find_in(&text, &keyword) {
                specific_hit |= self.is_specific(&keyword) || self.is_specific(form);
                matched.push(keyword.clone());
            }
        }

        let matches = matched.len();
        let present = matches >= MIN_GENERIC_MATCHES || (matches == 1 && specific_hit);
        PresenceMatch {
            matches,
            matched,
            present,
        }
    }

    pub fn is_present(&self, keywords: &BTreeSet<String>, description: &str) -> bool {
        self.check(keywords, description).present
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::defaults;

    fn matcher() -> PresenceMatcher {
        PresenceMatcher::new(
            Arc::new(SynonymIndex::new(&defaults::synonym_groups())),
            &defaults::specific_terms(),
        )
    }

    fn keywords(words: &[&str]) -> BTreeSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_two_generic_matches_are_present() {
        let m = matcher().check(&keywords(&["fiber", "splicing"]), "Fiber splicing crew lead");
        assert_eq!(m.matches, 2);
        assert!(m.present);
    }

    #[test]
    fn test_single_generic_match_is_insufficient() {
        let m = matcher().check(&keywords(&["manage", "budget"]), "Managed the warehouse");
        assert_eq!(m.matches, 1);
        assert!(!m.present);
    }

    #[test]
    fn test_single_specific_term_is_sufficient() {
        let m = matcher().check(&keywords(&["otdr", "fiber", "splicing"]), "OTDR testing");
        assert_eq!(m.matches, 1);
        assert!(m.present);
    }

    #[test]
    fn test_synonym_counts_as_match() {
        let m = matcher().check(
            &keywords(&["troubleshoot", "network"]),
            "Diagnosed network outages",
        );
        assert_eq!(m.matched, vec!["network".to_string(), "troubleshoot".to_string()]);
        assert!(m.present);
    }

    #[test]
    fn test_specific_synonym_form_counts() {
        // "splice" reaches the specific term "fusion splicing" through its group.
        let m = matcher().check(&keywords(&["splice"]), "Certified in fusion splicing");
        assert_eq!(m.matches, 1);
        assert!(m.present);
    }

    #[test]
    fn test_no_keywords_never_present() {
        let m = matcher().check(&BTreeSet::new(), "OTDR fiber splicing");
        assert_eq!(m.matches, 0);
        assert!(!m.present);
    }

    #[test]
    fn test_specific_terms_are_case_insensitive() {
        let mut terms = BTreeSet::new();
        terms.insert("OTDR".to_string());
        let m = PresenceMatcher::new(Arc::new(SynonymIndex::default()), &terms);
        assert!(m.is_specific("otdr"));
        assert!(m.is_present(&keywords(&["otdr"]), "otdr traces"));
    }
}
