use serde::{Deserialize, Serialize};

/// One segment of a source document, as produced by the upstream segmenter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub heading: Option<String>,
    #[serde(default)]
    pub content: String,
    /// Order in the source document. Heuristic signal only.
    #[serde(default)]
    pub position: usize,
}

impl Section {
    pub fn new(heading: Option<&str>, content: &str, position: usize) -> Self {
        Self {
            heading: heading.map(str::to_string),
            content: content.to_string(),
            position,
        }
    }

    /// The heading, if present and not blank.
    pub fn heading_text(&self) -> Option<&str> {
        self.heading
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
    }
}

/// Which strategy produced a classification decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    Heading,
    Content,
    /// Positional rule decided the outcome (headless opening section).
    Rule,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: Option<String>,
    pub confidence: f64, // 0.0 – 1.0
    pub method: Method,
    pub uncertain: bool,
}

impl ClassificationResult {
    pub fn matched(category: &str, confidence: f64, method: Method) -> Self {
        Self {
            category: Some(category.to_string()),
            confidence: confidence.clamp(0.0, 1.0),
            method,
            uncertain: false,
        }
    }

    /// No strategy fired.
    pub fn no_match(method: Method) -> Self {
        Self {
            category: None,
            confidence: 0.0,
            method,
            uncertain: false,
        }
    }

    pub fn is_match(&self) -> bool {
        self.category.is_some()
    }
}

/// Audit record of how one input section was decided.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionDecision {
    pub position: usize,
    pub heading: Option<String>,
    pub heading_result: ClassificationResult,
    pub content_result: ClassificationResult,
    pub result: ClassificationResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_heading_is_absent() {
        let s = Section::new(Some("   "), "text", 0);
        assert!(s.heading_text().is_none());
    }

    #[test]
    fn test_section_deserializes_without_heading() {
        let s: Section = serde_json::from_str(r#"{"content": "Rust, Go", "position": 3}"#).unwrap();
        assert!(s.heading.is_none());
        assert_eq!(s.position, 3);
    }

    #[test]
    fn test_method_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Method::Rule).unwrap(), r#""rule""#);
    }

    #[test]
    fn test_matched_clamps_confidence() {
        let r = ClassificationResult::matched("SKILLS", 1.4, Method::Content);
        assert_eq!(r.confidence, 1.0);
        assert!(r.is_match());
    }
}
