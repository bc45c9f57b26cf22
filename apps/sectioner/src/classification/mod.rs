// Section classification pipeline.
// Normalizer → {heading, content} classifiers → arbiter → merger.
// Every stage is a pure function of its inputs plus the read-only EngineContext.

pub mod arbiter;
pub mod content;
pub mod heading;
pub mod merger;
pub mod normalizer;
pub mod semantic;

// Re-export the public API consumed by the engine and the batch runner.
pub use arbiter::{arbitrate, ArbiterPolicy};
pub use content::ContentClassifier;
pub use heading::{HeadingClassifier, SemanticTier};
pub use merger::{CategoryMap, SectionMerger};
pub use normalizer::SynonymNormalizer;
pub use semantic::{build_semantic_model, HashEmbedder, SemanticModel};
