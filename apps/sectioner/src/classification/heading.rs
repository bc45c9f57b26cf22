use std::sync::Arc;

use tracing::debug;

use crate::classification::normalizer::SynonymNormalizer;
use crate::classification::semantic::SemanticModel;
use crate::models::{ClassificationResult, Method};
use crate::text::{fold, similarity_ratio};

pub const EXACT_CONFIDENCE: f64 = 1.0;
pub const SYNONYM_CONFIDENCE: f64 = 0.75;

/// Semantic tier settings, present only when a model loaded.
#[derive(Clone)]
pub struct SemanticTier {
    pub model: Arc<dyn SemanticModel>,
    pub threshold: f64,
    pub confidence_scale: f64,
}

/// Scores a heading against the target categories.
///
/// Strategy order, first success wins:
/// 1. exact (case-insensitive) → 1.0
/// 2. synonym-normalized → 0.75
/// 3. fuzzy edit-distance ratio ≥ `fuzzy_threshold` → the ratio
/// 4. semantic similarity ≥ tier threshold → similarity × scale
///    (only when `allow_semantic` and a model is loaded)
#[derive(Clone)]
pub struct HeadingClassifier {
    normalizer: Arc<SynonymNormalizer>,
    fuzzy_threshold: f64,
    semantic: Option<SemanticTier>,
}

impl HeadingClassifier {
    pub fn new(
        normalizer: Arc<SynonymNormalizer>,
        fuzzy_threshold: f64,
        semantic: Option<SemanticTier>,
    ) -> Self {
        Self {
            normalizer,
            fuzzy_threshold,
            semantic,
        }
    }

    pub fn has_semantic(&self) -> bool {
        self.semantic.is_some()
    }

    pub fn classify(
        &self,
        heading: Option<&str>,
        categories: &[String],
        allow_semantic: bool,
    ) -> ClassificationResult {
        let Some(heading) = heading.map(fold).filter(|h| !h.is_empty()) else {
            return ClassificationResult::no_match(Method::Heading);
        };

        if let Some(category) = categories.iter().find(|c| fold(c) == heading) {
            return ClassificationResult::matched(category, EXACT_CONFIDENCE, Method::Heading);
        }

        if let Some(category) = self.synonym_match(&heading, categories) {
            return ClassificationResult::matched(category, SYNONYM_CONFIDENCE, Method::Heading);
        }

        if let Some((category, ratio)) = self.fuzzy_match(&heading, categories) {
            return ClassificationResult::matched(category, ratio, Method::Heading);
        }

        if allow_semantic {
            if let Some((category, confidence)) = self.semantic_match(&heading, categories) {
                return ClassificationResult::matched(category, confidence, Method::Heading);
            }
        }

        ClassificationResult::no_match(Method::Heading)
    }

    fn synonym_match<'c>(&self, heading: &str, categories: &'c [String]) -> Option<&'c String> {
        let canonical = self.normalizer.normalize(heading)?;
        categories.iter().find(|c| {
            fold(c) == canonical || self.normalizer.normalize(c) == Some(canonical)
        })
    }

    fn fuzzy_match<'c>(&self, heading: &str, categories: &'c [String]) -> Option<(&'c String, f64)> {
        let (category, ratio) = best_by(categories, |c| similarity_ratio(heading, &fold(c)))?;
        (ratio >= self.fuzzy_threshold).then_some((category, ratio))
    }

    fn semantic_match<'c>(&self, heading: &str, categories: &'c [String]) -> Option<(&'c String, f64)> {
        let tier = self.semantic.as_ref()?;
        let (category, similarity) = best_by(categories, |c| tier.model.similarity(heading, c))?;
        debug!(
            "Semantic heading score '{heading}' → '{category}' = {similarity:.3} ({})",
            tier.model.name()
        );
        (similarity >= tier.threshold).then(|| (category, similarity * tier.confidence_scale))
    }
}

/// Highest-scoring category; ties keep the earlier one.
fn best_by<'c>(categories: &'c [String], score: impl Fn(&str) -> f64) -> Option<(&'c String, f64)> {
    categories
        .iter()
        .map(|c| (c, score(c.as_str())))
        .fold(None, |best, (c, s)| match best {
            Some((_, b)) if b >= s => best,
            _ => Some((c, s)),
        })
}
