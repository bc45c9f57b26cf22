use std::collections::BTreeMap;
use std::sync::Arc;

use regex::Regex;

use crate::classification::normalizer::SynonymNormalizer;
use crate::errors::EngineError;
use crate::models::{ClassificationResult, Method};
use crate::tables::{CategoryRule, SynonymIndex};
use crate::text::fold;

/// Headless sections at or before this position get the summary bias.
pub const SUMMARY_BIAS_MAX_POSITION: usize = 2;

/// A `CategoryRule` with its patterns compiled.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    keywords: Vec<String>,
    min_matches: usize,
    max_length: Option<usize>,
    patterns: Vec<Regex>,
    summary_like: bool,
}

impl CompiledRule {
    pub fn compile(key: &str, rule: &CategoryRule) -> Result<Self, EngineError> {
        let patterns = rule
            .patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| {
                    EngineError::InvalidConfiguration(format!(
                        "category_rules.{key} has an invalid pattern '{p}': {e}"
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            keywords: rule
                .keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            min_matches: rule.min_matches,
            max_length: rule.max_length,
            patterns,
            summary_like: rule.summary_like,
        })
    }

    /// Keywords (or a synonym of each) found, plus patterns that match.
    /// `text` must already be lowercase.
    pub fn count_matches(&self, text: &str, synonyms: &SynonymIndex) -> usize {
        let keyword_hits = self
            .keywords
            .iter()
            .filter(|k| synonyms.find_in(text, k).is_some())
            .count();
        let pattern_hits = self.patterns.iter().filter(|p| p.is_match(text)).count();
        keyword_hits + pattern_hits
    }

    fn accepts_length(&self, chars: usize) -> bool {
        self.max_length.map_or(true, |max| chars <= max)
    }
}

/// Maps a match count to a confidence.
///
/// - 3+ matches, above the rule's floor → 0.95
/// - exactly at the floor → 0.75
/// - in between → 0.85
pub fn calibrate(count: usize, min_matches: usize) -> f64 {
    if count >= 3 && count > min_matches {
        0.95
    } else if count <= min_matches {
        0.75
    } else {
        0.85
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate<'c> {
    category: &'c String,
    count: usize,
    min_matches: usize,
    biased: bool,
}

/// Scores section bodies against per-category keyword/pattern rules.
#[derive(Debug, Clone)]
pub struct ContentClassifier {
    rules: BTreeMap<String, CompiledRule>,
    normalizer: Arc<SynonymNormalizer>,
    synonyms: Arc<SynonymIndex>,
}

impl ContentClassifier {
    pub fn new(
        rules: &BTreeMap<String, CategoryRule>,
        normalizer: Arc<SynonymNormalizer>,
        synonyms: Arc<SynonymIndex>,
    ) -> Result<Self, EngineError> {
        let rules = rules
            .iter()
            .map(|(key, rule)| -> Result<_, EngineError> {
                Ok((fold(key), CompiledRule::compile(key, rule)?))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        Ok(Self {
            rules,
            normalizer,
            synonyms,
        })
    }

    /// Rule for a target category: by its own name, else by its canonical key.
    pub fn rule_for(&self, category: &str) -> Option<&CompiledRule> {
        self.rules.get(&fold(category)).or_else(|| {
            self.normalizer
                .normalize(category)
                .and_then(|key| self.rules.get(key))
        })
    }

    pub fn classify(
        &self,
        content: &str,
        position: usize,
        has_heading: bool,
        categories: &[String],
    ) -> ClassificationResult {
        let text = content.to_lowercase();
        if text.trim().is_empty() {
            return ClassificationResult::no_match(Method::Content);
        }
        let length = text.chars().count();
        let bias_eligible = !has_heading && position <= SUMMARY_BIAS_MAX_POSITION;

        let mut best: Option<Candidate> = None;
        let mut best_unbiased: Option<Candidate> = None;

        for category in categories {
            let Some(rule) = self.rule_for(category) else {
                continue;
            };
            if !rule.accepts_length(length) {
                continue;
            }

            let raw = rule.count_matches(&text, &self.synonyms);
            // The bias nudges; it never creates evidence from nothing.
            let biased = bias_eligible && rule.summary_like && raw > 0;
            let count = raw + usize::from(biased);

            if raw >= rule.min_matches {
                let candidate = Candidate {
                    category,
                    count: raw,
                    min_matches: rule.min_matches,
                    biased: false,
                };
                if best_unbiased.map_or(true, |b| raw > b.count) {
                    best_unbiased = Some(candidate);
                }
            }
            if count >= rule.min_matches && best.map_or(true, |b| count > b.count) {
                best = Some(Candidate {
                    category,
                    count,
                    min_matches: rule.min_matches,
                    biased,
                });
            }
        }

        let Some(winner) = best else {
            return ClassificationResult::no_match(Method::Content);
        };

        let bias_decided = winner.biased
            && best_unbiased.map_or(true, |b| b.category != winner.category);
        let method = if bias_decided {
            Method::Rule
        } else {
            Method::Content
        };

        ClassificationResult::matched(
            winner.category,
            calibrate(winner.count, winner.min_matches),
            method,
        )
    }
}
