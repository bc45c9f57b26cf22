//! Engine context and the two library entry points.
//!
//! `EngineContext` is the compiled, validated form of an `EngineConfig` plus
//! the optional semantic model. Build it once, wrap it in `Arc`, share it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::classification::{
    arbitrate, build_semantic_model, ArbiterPolicy, CategoryMap, ContentClassifier,
    HeadingClassifier, SectionMerger, SemanticModel, SemanticTier, SynonymNormalizer,
};
use crate::config::EngineConfig;
use crate::errors::EngineError;
use crate::models::{
    ItemStatement, ItemUsage, Section, SectionDecision, TimeRangedRecord, UsageReport,
};
use crate::tables::SynonymIndex;
use crate::usage::{analyze_item, PresenceMatcher};

/// Output of a classification run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Accepted content by category, in the caller's category order.
    pub categories: CategoryMap,
    /// Sections no category could be assigned to with enough confidence.
    pub uncertain: Vec<Section>,
    /// One entry per input section, in input order.
    pub decisions: Vec<SectionDecision>,
}

pub struct EngineContext {
    config: EngineConfig,
    heading: HeadingClassifier,
    content: ContentClassifier,
    matcher: PresenceMatcher,
    policy: ArbiterPolicy,
}

impl EngineContext {
    /// Validates `config` and compiles it. A semantic model that fails to
    /// load is logged and left out; only an invalid config is an error.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let model = match build_semantic_model(&config.semantic) {
            Ok(model) => Some(model),
            Err(e) => {
                warn!("{e}; continuing with exact, synonym and fuzzy heading matching");
                None
            }
        };
        Self::compile(config, model)
    }

    /// Like `new`, with the semantic model supplied by the caller.
    pub fn with_semantic_model(
        config: EngineConfig,
        model: Option<Arc<dyn SemanticModel>>,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        Self::compile(config, model)
    }

    /// `config` must already be validated.
    fn compile(
        config: EngineConfig,
        model: Option<Arc<dyn SemanticModel>>,
    ) -> Result<Self, EngineError> {
        let normalizer = Arc::new(SynonymNormalizer::new(&config.synonym_table));
        let synonyms = Arc::new(SynonymIndex::new(&config.synonym_groups));

        let semantic = model.map(|model| SemanticTier {
            model,
            threshold: config.semantic.threshold,
            confidence_scale: config.semantic.confidence_scale,
        });
        if let Some(tier) = &semantic {
            info!("Semantic heading model loaded: {}", tier.model.name());
        }

        let heading = HeadingClassifier::new(normalizer.clone(), config.fuzzy_threshold, semantic);
        let content = ContentClassifier::new(&config.category_rules, normalizer, synonyms.clone())?;
        let matcher = PresenceMatcher::new(synonyms, &config.specific_terms);
        let policy = ArbiterPolicy {
            confidence_threshold: config.confidence_threshold,
            prefer_content_on_conflict: config.prefer_content_on_conflict,
        };

        debug!(
            "Engine context ready: {} category rules, {} heading synonym groups",
            config.category_rules.len(),
            config.synonym_table.len()
        );

        Ok(Self {
            config,
            heading,
            content,
            matcher,
            policy,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn has_semantic(&self) -> bool {
        self.heading.has_semantic()
    }

    /// Full pipeline, semantic heading strategy included when loaded.
    pub fn classify(&self, sections: &[Section], categories: &[String]) -> Classification {
        self.classify_with(sections, categories, true)
    }

    /// `allow_semantic = false` runs only the cheap strategies.
    pub fn classify_with(
        &self,
        sections: &[Section],
        categories: &[String],
        allow_semantic: bool,
    ) -> Classification {
        let mut merger = SectionMerger::new();
        let mut decisions = Vec::with_capacity(sections.len());

        for section in sections {
            let heading = section.heading_text();
            let heading_result = self.heading.classify(heading, categories, allow_semantic);
            let content_result = self.content.classify(
                &section.content,
                section.position,
                heading.is_some(),
                categories,
            );
            let result = arbitrate(&heading_result, &content_result, &self.policy);

            debug!(
                "Section {} ({:?}) → {:?} at {:.2} via {:?}",
                section.position, heading, result.category, result.confidence, result.method
            );

            merger.push(section, &result);
            decisions.push(SectionDecision {
                position: section.position,
                heading: section.heading.clone(),
                heading_result,
                content_result,
                result,
            });
        }

        let (categories, uncertain) = merger.finish(categories);
        if !uncertain.is_empty() {
            info!("{} section(s) left uncertain", uncertain.len());
        }

        Classification {
            categories,
            uncertain,
            decisions,
        }
    }

    /// Usage per statement, in input order. Statements without keywords get
    /// them derived from their text.
    pub fn analyze_usage(
        &self,
        statements: &[ItemStatement],
        records: &[TimeRangedRecord],
        current_year: i32,
    ) -> UsageReport {
        let items = statements
            .iter()
            .map(|statement| self.analyze_statement(statement, records, current_year))
            .collect();
        UsageReport { items }
    }

    pub(crate) fn analyze_statement(
        &self,
        statement: &ItemStatement,
        records: &[TimeRangedRecord],
        current_year: i32,
    ) -> ItemUsage {
        let item = statement.clone().with_derived_keywords();
        analyze_item(&item, records, current_year, &self.matcher)
    }
}

/// One-shot classification. Builds a context from `config` first.
pub fn classify(
    sections: &[Section],
    categories: &[String],
    config: &EngineConfig,
) -> Result<Classification, EngineError> {
    let context = EngineContext::new(config.clone())?;
    Ok(context.classify(sections, categories))
}

/// One-shot usage analysis. Builds a context from `config` first.
pub fn analyze_usage(
    statements: &[ItemStatement],
    records: &[TimeRangedRecord],
    current_year: i32,
    config: &EngineConfig,
) -> Result<UsageReport, EngineError> {
    let context = EngineContext::new(config.clone())?;
    Ok(context.analyze_usage(statements, records, current_year))
}
