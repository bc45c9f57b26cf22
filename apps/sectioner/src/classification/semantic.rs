//! Semantic similarity — the slow, optional heading strategy.
//!
//! Default backend: `HashEmbedder` (FNV-1a hashed word and character-trigram
//! features, cosine similarity). Deterministic, no model files.
//!
//! `EngineContext` holds an `Option<Arc<dyn SemanticModel>>`; `None` means the
//! model failed to initialize and the cheaper strategies carry on alone.

use std::sync::Arc;

use crate::config::SemanticConfig;
use crate::errors::EngineError;
use crate::text::tokenize;

/// Pluggable similarity backend. Implementations must be cheap to share
/// across worker threads.
pub trait SemanticModel: Send + Sync {
    fn name(&self) -> &str;

    /// Similarity in [0, 1].
    fn similarity(&self, a: &str, b: &str) -> f64;
}

/// Builds the semantic model described by `config`.
pub fn build_semantic_model(config: &SemanticConfig) -> Result<Arc<dyn SemanticModel>, EngineError> {
    if !config.enabled {
        return Err(EngineError::ModelUnavailable(
            "semantic strategy disabled by configuration".to_string(),
        ));
    }
    if config.dims == 0 {
        return Err(EngineError::ModelUnavailable(
            "semantic.dims must be greater than 0".to_string(),
        ));
    }
    Ok(Arc::new(HashEmbedder::new(config.dims)))
}

pub struct HashEmbedder {
    dims: usize,
}

impl HashEmbedder {
    pub fn new(dims: usize) -> Self {
        Self { dims }
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    /// L2-normalized embedding. Empty text embeds to the zero vector.
    pub fn embed(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0; self.dims];
        if self.dims == 0 {
            return embedding;
        }

        for token in tokenize(text) {
            accumulate(&mut embedding, &token, 1.0);
            // Character trigrams let "experiance" land near "experience".
            let padded: Vec<char> = format!(" {token} ").chars().collect();
            for window in padded.windows(3) {
                let trigram: String = window.iter().collect();
                accumulate(&mut embedding, &trigram, 0.5);
            }
        }

        l2_normalize(&mut embedding);
        embedding
    }
}

impl SemanticModel for HashEmbedder {
    fn name(&self) -> &str {
        "hash"
    }

    fn similarity(&self, a: &str, b: &str) -> f64 {
        let ea = self.embed(a);
        let eb = self.embed(b);
        let dot: f32 = ea.iter().zip(eb.iter()).map(|(x, y)| x * y).sum();
        f64::from(dot).clamp(0.0, 1.0)
    }
}

fn accumulate(embedding: &mut [f32], feature: &str, weight: f32) {
    let hash = fnv1a_hash(feature.as_bytes());
    let dim = (hash >> 1) as usize % embedding.len();
    let sign = if hash & 1 == 0 { weight } else { -weight };
    embedding[dim] += sign;
}

fn fnv1a_hash(data: &[u8]) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    let mut hash = FNV_OFFSET;
    for byte in data {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

fn l2_normalize(vec: &mut [f32]) {
    let norm = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in vec.iter_mut() {
            *value /= norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fnv1a_hash_known_value() {
        assert_eq!(fnv1a_hash(b"hello"), 0xa430d84680aabd0b);
    }

    #[test]
    fn test_embedding_normalized() {
        let e = HashEmbedder::new(128).embed("employment history");
        let norm = e.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_empty_text_has_zero_similarity() {
        let model = HashEmbedder::new(64);
        assert_eq!(model.similarity("", "skills"), 0.0);
    }

    #[test]
    fn test_identical_text_is_fully_similar() {
        let model = HashEmbedder::new(256);
        let s = model.similarity("Technical Skills", "technical skills");
        assert!((s - 1.0).abs() < 1e-4, "similarity was {s}");
    }

    #[test]
    fn test_related_text_scores_above_unrelated() {
        let model = HashEmbedder::new(256);
        let related = model.similarity("education history", "EDUCATION");
        let unrelated = model.similarity("education history", "REFERENCES");
        assert!(related > unrelated, "{related} <= {unrelated}");
    }

    #[test]
    fn test_zero_dims_is_unavailable() {
        let config = SemanticConfig {
            dims: 0,
            ..SemanticConfig::default()
        };
        assert!(matches!(
            build_semantic_model(&config),
            Err(EngineError::ModelUnavailable(_))
        ));
    }

    #[test]
    fn test_disabled_is_unavailable() {
        let config = SemanticConfig {
            enabled: false,
            ..SemanticConfig::default()
        };
        assert!(build_semantic_model(&config).is_err());
    }

    #[test]
    fn test_default_config_builds_hash_model() {
        let model = build_semantic_model(&SemanticConfig::default()).unwrap();
        assert_eq!(model.name(), "hash");
    }
}
