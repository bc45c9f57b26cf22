//! Section Merger — folds classified sections into the category map.
//!
//! CRITICAL: append-only. An occupied slot is never overwritten; new content
//! goes after a blank line. Uncertain sections are kept aside, never dropped
//! and never forced into a category.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::models::{ClassificationResult, Section};

pub const SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Slot {
    category: String,
    content: String,
}

/// Ordered category → content mapping. Serializes as a JSON object in slot
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryMap {
    slots: Vec<Slot>,
}

impl CategoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, category: &str) -> Option<&str> {
        self.slots
            .iter()
            .find(|s| s.category == category)
            .map(|s| s.content.as_str())
    }

    /// Creates the slot, or appends to it after a blank line. Blank content
    /// is ignored.
    pub fn append(&mut self, category: &str, content: &str) {
        if content.trim().is_empty() {
            return;
        }
        match self.slots.iter_mut().find(|s| s.category == category) {
            Some(slot) if slot.content.is_empty() => slot.content.push_str(content),
            Some(slot) => {
                slot.content.push_str(SEPARATOR);
                slot.content.push_str(content);
            }
            None => self.slots.push(Slot {
                category: category.to_string(),
                content: content.to_string(),
            }),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.slots
            .iter()
            .map(|s| (s.category.as_str(), s.content.as_str()))
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|s| s.category.as_str())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Reorders slots to follow `order`; unknown categories keep their
    /// relative order at the end.
    pub fn sort_by_order(&mut self, order: &[String]) {
        self.slots.sort_by_key(|s| {
            order
                .iter()
                .position(|c| *c == s.category)
                .unwrap_or(usize::MAX)
        });
    }
}

impl Serialize for CategoryMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl<'de> Deserialize<'de> for CategoryMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CategoryMapVisitor;

        impl<'de> Visitor<'de> for CategoryMapVisitor {
            type Value = CategoryMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of category to content")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<CategoryMap, A::Error> {
                let mut map = CategoryMap::new();
                while let Some((category, content)) = access.next_entry::<String, String>()? {
                    map.append(&category, &content);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(CategoryMapVisitor)
    }
}

/// Accumulates `(Section, ClassificationResult)` pairs.
#[derive(Debug, Clone, Default)]
pub struct SectionMerger {
    map: CategoryMap,
    uncertain: Vec<Section>,
}

impl SectionMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from content the caller already holds. Existing slots are
    /// appended to, never replaced.
    pub fn with_existing(map: CategoryMap) -> Self {
        Self {
            map,
            uncertain: Vec::new(),
        }
    }

    pub fn push(&mut self, section: &Section, result: &ClassificationResult) {
        match result.category.as_deref() {
            Some(category) if !result.uncertain => self.map.append(category, &section.content),
            _ => self.uncertain.push(section.clone()),
        }
    }

    pub fn finish(mut self, order: &[String]) -> (CategoryMap, Vec<Section>) {
        self.map.sort_by_order(order);
        (self.map, self.uncertain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Method;
    use proptest::prelude::*;

    fn accepted(category: &str) -> ClassificationResult {
        ClassificationResult::matched(category, 0.9, Method::Content)
    }

    fn rejected() -> ClassificationResult {
        ClassificationResult {
            category: None,
            confidence: 0.3,
            method: Method::Heading,
            uncertain: true,
        }
    }

    #[test]
    fn test_second_section_is_appended_after_blank_line() {
        let mut m = SectionMerger::new();
        m.push(&Section::new(Some("Experience"), "Acme 2019-2021", 1), &accepted("EMPLOYMENT"));
        m.push(&Section::new(Some("Jobs"), "Globex 2021-2023", 4), &accepted("EMPLOYMENT"));
        let (map, uncertain) = m.finish(&[]);
        assert_eq!(map.get("EMPLOYMENT"), Some("Acme 2019-2021\n\nGlobex 2021-2023"));
        assert!(uncertain.is_empty());
    }

    #[test]
    fn test_uncertain_sections_are_kept_aside() {
        let mut m = SectionMerger::new();
        let odd = Section::new(Some("Misc"), "Enjoys chess", 7);
        m.push(&odd, &rejected());
        let (map, uncertain) = m.finish(&[]);
        assert!(map.is_empty());
        assert_eq!(uncertain, vec![odd]);
    }

    #[test]
    fn test_existing_content_is_never_overwritten() {
        let mut existing = CategoryMap::new();
        existing.append("SKILLS", "Rust");
        let mut m = SectionMerger::with_existing(existing);
        m.push(&Section::new(None, "OTDR", 2), &accepted("SKILLS"));
        let (map, _) = m.finish(&[]);
        assert_eq!(map.get("SKILLS"), Some("Rust\n\nOTDR"));
    }

    #[test]
    fn test_blank_content_is_ignored() {
        let mut map = CategoryMap::new();
        map.append("SKILLS", "   ");
        assert!(map.is_empty());
    }

    #[test]
    fn test_finish_orders_by_caller_categories() {
        let mut m = SectionMerger::new();
        m.push(&Section::new(None, "b", 0), &accepted("SKILLS"));
        m.push(&Section::new(None, "x", 1), &accepted("EXTRA"));
        m.push(&Section::new(None, "a", 2), &accepted("SUMMARY"));
        let order = vec!["SUMMARY".to_string(), "SKILLS".to_string()];
        let (map, _) = m.finish(&order);
        let cats: Vec<_> = map.categories().collect();
        assert_eq!(cats, vec!["SUMMARY", "SKILLS", "EXTRA"]);
    }

    #[test]
    fn test_serializes_as_ordered_object() {
        let mut map = CategoryMap::new();
        map.append("SUMMARY", "a");
        map.append("EDUCATION", "b");
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"SUMMARY":"a","EDUCATION":"b"}"#);
        let back: CategoryMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }

    proptest! {
        #[test]
        fn prop_merge_never_loses_content(
            contents in prop::collection::vec("[a-zA-Z0-9 ]{0,40}", 1..8),
        ) {
            let mut m = SectionMerger::new();
            for (i, c) in contents.iter().enumerate() {
                m.push(&Section::new(None, c, i), &accepted("SKILLS"));
            }
            let (map, _) = m.finish(&[]);
            let merged = map.get("SKILLS").unwrap_or("");
            let kept: Vec<&String> = contents.iter().filter(|c| !c.trim().is_empty()).collect();
            let total: usize = kept.iter().map(|c| c.len()).sum();
            prop_assert!(merged.len() >= total);
            for c in kept {
                prop_assert!(merged.contains(c.as_str()));
            }
        }
    }
}
