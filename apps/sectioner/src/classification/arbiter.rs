//! Confidence Arbiter — reconciles heading and content evidence.
//!
//! Decision table:
//! - both name the same category → accept it at the higher confidence
//! - they disagree and content clears the threshold → content wins
//! - content below threshold, heading clears it → heading wins
//! - neither clears it → uncertain, no category
//!
//! Content outranks the heading because mislabeled headings are the common
//! failure in real documents. `prefer_content_on_conflict = false` flips the
//! tie-break when both sides clear the threshold.

use tracing::info;

use crate::models::ClassificationResult;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArbiterPolicy {
    pub confidence_threshold: f64,
    pub prefer_content_on_conflict: bool,
}

impl Default for ArbiterPolicy {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.6,
            prefer_content_on_conflict: true,
        }
    }
}

pub fn arbitrate(
    heading: &ClassificationResult,
    content: &ClassificationResult,
    policy: &ArbiterPolicy,
) -> ClassificationResult {
    let threshold = policy.confidence_threshold;

    if heading.is_match() && heading.category == content.category {
        let winner = if content.confidence > heading.confidence {
            content
        } else {
            heading
        };
        return settle(winner, threshold);
    }

    let heading_ok = heading.is_match() && heading.confidence >= threshold;
    let content_ok = content.is_match() && content.confidence >= threshold;

    match (heading_ok, content_ok) {
        (true, true) if !policy.prefer_content_on_conflict => heading.clone(),
        (_, true) => {
            if let Some(labelled) = heading.category.as_deref() {
                info!(
                    "Content overrides heading: '{}' → '{}' (heading {:.2}, content {:.2})",
                    labelled,
                    content.category.as_deref().unwrap_or_default(),
                    heading.confidence,
                    content.confidence
                );
            }
            content.clone()
        }
        (true, false) => heading.clone(),
        (false, false) => {
            let strongest = if content.confidence > heading.confidence {
                content
            } else {
                heading
            };
            uncertain(strongest)
        }
    }
}

fn settle(result: &ClassificationResult, threshold: f64) -> ClassificationResult {
    if result.confidence >= threshold {
        result.clone()
    } else {
        uncertain(result)
    }
}

fn uncertain(strongest: &ClassificationResult) -> ClassificationResult {
    ClassificationResult {
        category: None,
        confidence: strongest.confidence,
        method: strongest.method,
        uncertain: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Method;

    fn heading(category: &str, confidence: f64) -> ClassificationResult {
        ClassificationResult::matched(category, confidence, Method::Heading)
    }

    fn content(category: &str, confidence: f64) -> ClassificationResult {
        ClassificationResult::matched(category, confidence, Method::Content)
    }

    #[test]
    fn test_agreement_takes_max_confidence() {
        let r = arbitrate(
            &heading("SKILLS", 0.75),
            &content("SKILLS", 0.95),
            &ArbiterPolicy::default(),
        );
        assert_eq!(r.category.as_deref(), Some("SKILLS"));
        assert_eq!(r.confidence, 0.95);
        assert_eq!(r.method, Method::Content);
        assert!(!r.uncertain);
    }

    #[test]
    fn test_agreement_prefers_heading_method_on_equal_confidence() {
        let r = arbitrate(
            &heading("SKILLS", 0.75),
            &content("SKILLS", 0.75),
            &ArbiterPolicy::default(),
        );
        assert_eq!(r.method, Method::Heading);
    }

    #[test]
    fn test_confident_content_overrides_heading() {
        let r = arbitrate(
            &heading("CERTIFICATIONS", 1.0),
            &content("EMPLOYMENT HISTORY", 0.95),
            &ArbiterPolicy::default(),
        );
        assert_eq!(r.category.as_deref(), Some("EMPLOYMENT HISTORY"));
        assert_eq!(r.method, Method::Content);
    }

    #[test]
    fn test_content_override_can_be_disabled() {
        let policy = ArbiterPolicy {
            prefer_content_on_conflict: false,
            ..ArbiterPolicy::default()
        };
        let r = arbitrate(
            &heading("CERTIFICATIONS", 1.0),
            &content("EMPLOYMENT HISTORY", 0.95),
            &policy,
        );
        assert_eq!(r.category.as_deref(), Some("CERTIFICATIONS"));
    }

    #[test]
    fn test_weak_content_defers_to_heading() {
        let policy = ArbiterPolicy {
            confidence_threshold: 0.8,
            ..ArbiterPolicy::default()
        };
        let r = arbitrate(&heading("SUMMARY", 0.85), &content("SKILLS", 0.75), &policy);
        assert_eq!(r.category.as_deref(), Some("SUMMARY"));
    }

    #[test]
    fn test_content_alone_accepted() {
        let r = arbitrate(
            &ClassificationResult::no_match(Method::Heading),
            &content("EDUCATION", 0.75),
            &ArbiterPolicy::default(),
        );
        assert_eq!(r.category.as_deref(), Some("EDUCATION"));
    }

    #[test]
    fn test_neither_clears_threshold_is_uncertain() {
        let policy = ArbiterPolicy {
            confidence_threshold: 0.9,
            ..ArbiterPolicy::default()
        };
        let r = arbitrate(&heading("SUMMARY", 0.82), &content("SKILLS", 0.75), &policy);
        assert!(r.uncertain);
        assert!(r.category.is_none());
        assert_eq!(r.confidence, 0.82);
    }

    #[test]
    fn test_agreement_below_threshold_is_uncertain() {
        let policy = ArbiterPolicy {
            confidence_threshold: 0.9,
            ..ArbiterPolicy::default()
        };
        let r = arbitrate(&heading("SKILLS", 0.8), &content("SKILLS", 0.85), &policy);
        assert!(r.uncertain);
        assert!(r.category.is_none());
    }

    #[test]
    fn test_nothing_matched_is_uncertain() {
        let r = arbitrate(
            &ClassificationResult::no_match(Method::Heading),
            &ClassificationResult::no_match(Method::Content),
            &ArbiterPolicy::default(),
        );
        assert!(r.uncertain);
        assert!(r.category.is_none());
        assert_eq!(r.confidence, 0.0);
    }
}
