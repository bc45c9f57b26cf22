//! Temporal Usage Analyzer.
//!
//! Reasons at record granularity: when an item is present in a record, every
//! year of that record's span counts as active, even if the description only
//! mentions it in passing.

use std::collections::BTreeSet;

use tracing::debug;

use crate::models::{ItemStatement, ItemUsage, TimeRangedRecord, UsageResult};
use crate::usage::matcher::PresenceMatcher;

/// Active years, duration and last-used year for one item.
pub fn analyze_item(
    item: &ItemStatement,
    records: &[TimeRangedRecord],
    current_year: i32,
    matcher: &PresenceMatcher,
) -> ItemUsage {
    let mut active_years = BTreeSet::new();
    let mut evidence = Vec::new();

    for (index, record) in records.iter().enumerate() {
        let presence = matcher.check(&item.keywords, &record.description);
        if presence.present {
            debug!(
                "'{}' present in record {index} ({}–{:?}) via {:?}",
                item.text, record.start_year, record.end_year, presence.matched
            );
            active_years.extend(record.span(current_year));
            evidence.push(index);
        }
    }

    ItemUsage {
        item: item.clone(),
        usage: summarize(&active_years, current_year),
        active_years,
        evidence,
    }
}

/// Collapses an active-year set into the renderer-facing summary.
///
/// Duration spans first to last active year inclusive; gaps count. The `+`
/// marks an item still in use (last active year within one year of now).
pub fn summarize(active_years: &BTreeSet<i32>, current_year: i32) -> UsageResult {
    let (Some(&first), Some(&last)) = (active_years.first(), active_years.last()) else {
        return UsageResult::default();
    };

    let years_used_count = i64::from(last) - i64::from(first) + 1;
    let ongoing = i64::from(last) >= i64::from(current_year) - 1;
    let years_used = if ongoing {
        format!("{years_used_count}+")
    } else {
        years_used_count.to_string()
    };

    UsageResult::new(years_used, last.to_string())
}
