use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::errors::EngineError;
use crate::text::tokenize;

/// Years a record may carry. Anything outside is rejected on construction
/// and on deserialization.
pub const MIN_YEAR: i32 = 1;
pub const MAX_YEAR: i32 = 9999;

/// A dated entry (a job, a project) whose description may evidence items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RecordFields")]
pub struct TimeRangedRecord {
    pub start_year: i32,
    /// `None` means the record is ongoing.
    pub end_year: Option<i32>,
    pub description: String,
}

/// Wire shape of a record. Inverted spans are tolerated here; out-of-range
/// years are not.
#[derive(Deserialize)]
struct RecordFields {
    start_year: i32,
    #[serde(default)]
    end_year: Option<i32>,
    #[serde(default)]
    description: String,
}

impl TryFrom<RecordFields> for TimeRangedRecord {
    type Error = EngineError;

    fn try_from(fields: RecordFields) -> Result<Self, Self::Error> {
        check_year(fields.start_year)?;
        if let Some(end) = fields.end_year {
            check_year(end)?;
        }
        Ok(Self {
            start_year: fields.start_year,
            end_year: fields.end_year,
            description: fields.description,
        })
    }
}

fn check_year(year: i32) -> Result<(), EngineError> {
    if (MIN_YEAR..=MAX_YEAR).contains(&year) {
        Ok(())
    } else {
        Err(EngineError::YearOutOfRange(year))
    }
}

impl TimeRangedRecord {
    /// Checked constructor: rejects out-of-range years and
    /// `start_year > end_year`.
    pub fn new(
        start_year: i32,
        end_year: Option<i32>,
        description: &str,
    ) -> Result<Self, EngineError> {
        check_year(start_year)?;
        if let Some(end) = end_year {
            check_year(end)?;
            if start_year > end {
                return Err(EngineError::InvalidRecord {
                    start: start_year,
                    end,
                });
            }
        }
        Ok(Self {
            start_year,
            end_year,
            description: description.to_string(),
        })
    }

    /// Inclusive year span. Ongoing records run to `current_year` and are
    /// empty when they start after it; an inverted closed span collapses to
    /// the start year.
    pub fn span(&self, current_year: i32) -> RangeInclusive<i32> {
        let end = match self.end_year {
            Some(end) => end.max(self.start_year),
            None => current_year.min(MAX_YEAR),
        };
        self.start_year..=end
    }

    pub fn is_ongoing(&self) -> bool {
        self.end_year.is_none()
    }
}

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "as", "at", "by", "for", "from", "in", "into", "of", "on", "or", "the",
    "to", "with", "using", "via", "including", "other", "various",
];

/// The thing whose usage over time is tracked, e.g. a skill line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemStatement {
    pub text: String,
    #[serde(default)]
    pub keywords: BTreeSet<String>,
}

impl ItemStatement {
    pub fn new<I, S>(text: &str, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            text: text.to_string(),
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// Derives the keyword set from the statement text: lowercase word
    /// tokens of two or more characters, stop words removed.
    pub fn from_text(text: &str) -> Self {
        let keywords = tokenize(text)
            .into_iter()
            .filter(|t| t.chars().count() >= 2 && !STOP_WORDS.contains(&t.as_str()))
            .collect();
        Self {
            text: text.to_string(),
            keywords,
        }
    }

    /// Fills in keywords from the text when the caller supplied none.
    pub fn with_derived_keywords(self) -> Self {
        if self.keywords.is_empty() {
            Self::from_text(&self.text)
        } else {
            self
        }
    }
}

/// Usage summary handed to the renderer. Both fields are empty when the
/// item was never evidenced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UsageResult {
    /// Positive integer, suffixed with `+` when the item is ongoing.
    pub years_used: String,
    pub last_used: String,
}

impl UsageResult {
    pub fn new(years_used: impl Into<String>, last_used: impl Into<String>) -> Self {
        Self {
            years_used: years_used.into(),
            last_used: last_used.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.years_used.is_empty() && self.last_used.is_empty()
    }
}

/// Per-item analysis with the evidence behind the summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemUsage {
    pub item: ItemStatement,
    pub usage: UsageResult,
    pub active_years: BTreeSet<i32>,
    /// Indices of the records in which the item was present.
    pub evidence: Vec<usize>,
}

/// Usage for a batch of items, in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageReport {
    pub items: Vec<ItemUsage>,
}

impl UsageReport {
    /// Looks up an item's usage by its statement text.
    pub fn get(&self, text: &str) -> Option<&UsageResult> {
        self.items
            .iter()
            .find(|u| u.item.text == text)
            .map(|u| &u.usage)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_rejects_inverted_span() {
        let err = TimeRangedRecord::new(2020, Some(2018), "x").unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidRecord {
                start: 2020,
                end: 2018
            }
        ));
    }

    #[test]
    fn test_record_same_start_and_end_is_valid() {
        let r = TimeRangedRecord::new(2021, Some(2021), "x").unwrap();
        assert_eq!(r.span(2025), 2021..=2021);
    }

    #[test]
    fn test_ongoing_record_runs_to_current_year() {
        let r = TimeRangedRecord::new(2022, None, "x").unwrap();
        assert!(r.is_ongoing());
        assert_eq!(r.span(2025), 2022..=2025);
    }

    #[test]
    fn test_inverted_deserialized_record_collapses() {
        let r: TimeRangedRecord =
            serde_json::from_str(r#"{"start_year": 2020, "end_year": 2018}"#).unwrap();
        assert_eq!(r.span(2025), 2020..=2020);
    }

    #[test]
    fn test_future_ongoing_record_has_empty_span() {
        let r = TimeRangedRecord::new(2027, None, "x").unwrap();
        assert!(r.span(2025).is_empty());
    }

    #[test]
    fn test_out_of_range_years_rejected() {
        assert!(matches!(
            TimeRangedRecord::new(i32::MIN, Some(2020), "x"),
            Err(EngineError::YearOutOfRange(i32::MIN))
        ));
        assert!(matches!(
            TimeRangedRecord::new(2020, Some(i32::MAX), "x"),
            Err(EngineError::YearOutOfRange(i32::MAX))
        ));
        let parsed = serde_json::from_str::<TimeRangedRecord>(
            r#"{"start_year": -2000000000, "end_year": 2025}"#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn test_record_json_keeps_defaults() {
        let r: TimeRangedRecord = serde_json::from_str(r#"{"start_year": 2019}"#).unwrap();
        assert_eq!(r, TimeRangedRecord::new(2019, None, "").unwrap());
    }

    #[test]
    fn test_from_text_drops_stop_words() {
        let item = ItemStatement::from_text("Fiber splicing and OTDR testing");
        let expected: BTreeSet<String> = ["fiber", "splicing", "otdr", "testing"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(item.keywords, expected);
    }

    #[test]
    fn test_new_lowercases_keywords() {
        let item = ItemStatement::new("OTDR", ["OTDR", " Fiber ", ""]);
        assert!(item.keywords.contains("otdr"));
        assert!(item.keywords.contains("fiber"));
        assert_eq!(item.keywords.len(), 2);
    }

    #[test]
    fn test_with_derived_keywords_keeps_explicit_set() {
        let item = ItemStatement::new("Fiber splicing", ["otdr"]).with_derived_keywords();
        assert_eq!(item.keywords.len(), 1);
    }

    #[test]
    fn test_usage_report_lookup_by_text() {
        let report = UsageReport {
            items: vec![ItemUsage {
                item: ItemStatement::new("Rust", ["rust"]),
                usage: UsageResult::new("3", "2020"),
                active_years: BTreeSet::from([2018, 2019, 2020]),
                evidence: vec![0],
            }],
        };
        assert_eq!(report.get("Rust"), Some(&UsageResult::new("3", "2020")));
        assert!(report.get("Go").is_none());
    }
}
