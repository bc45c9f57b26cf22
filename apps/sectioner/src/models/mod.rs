pub mod record;
pub mod section;

pub use record::{ItemStatement, ItemUsage, TimeRangedRecord, UsageReport, UsageResult};
pub use section::{ClassificationResult, Method, Section, SectionDecision};
