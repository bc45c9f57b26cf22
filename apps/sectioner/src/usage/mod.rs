// Temporal usage analysis.
// Presence matcher decides per record; the analyzer turns present records
// into active years, duration and last-used year.

pub mod analyzer;
pub mod matcher;

pub use analyzer::{analyze_item, summarize};
pub use matcher::{PresenceMatch, PresenceMatcher};
