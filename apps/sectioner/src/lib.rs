//! Section classification and temporal usage analysis for segmented
//! documents such as resumes.
//!
//! Two independent pipelines share one `EngineContext`:
//! - `classify`: sections → canonical category map plus an uncertain bucket
//! - `analyze_usage`: dated records + item statements → years used / last used

pub mod batch;
pub mod classification;
pub mod config;
pub mod engine;
pub mod errors;
pub mod models;
pub mod tables;
pub mod text;
pub mod usage;

pub use batch::{BatchRunner, Document};
pub use classification::CategoryMap;
pub use config::{EngineConfig, SemanticConfig, Settings};
pub use engine::{analyze_usage, classify, Classification, EngineContext};
pub use errors::EngineError;
pub use models::{
    ClassificationResult, ItemStatement, ItemUsage, Method, Section, SectionDecision,
    TimeRangedRecord, UsageReport, UsageResult,
};
pub use tables::TABLES_VERSION;
