//! Embedding port and its implementations.
//!
//! The production adapter runs a BGE-M3 model through candle; the
//! deterministic [`HashEmbedder`] stands in wherever loading a model is
//! unwanted (tests, CI).

pub mod device;
pub mod model;
pub mod pool;
pub mod tokenize;

use std::hash::{Hash, Hasher};

use ragdb_core::error::{Error, Result};
use twox_hash::XxHash64;

/// Converts text to fixed-dimension vectors, singly or batched.
pub trait Embedder: Send + Sync {
    /// Embed one text. Fails on empty input.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed many texts, order-preserving. Fails on an empty slice or any
    /// empty element.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        validate_batch(texts)?;
        texts.iter().map(|t| self.embed(t)).collect()
    }

    fn dimensions(&self) -> usize;

    fn model_name(&self) -> &str;
}

pub(crate) fn validate_batch(texts: &[String]) -> Result<()> {
    if texts.is_empty() {
        return Err(Error::InvalidParameter("embed_batch given an empty list".into()));
    }
    if texts.iter().any(String::is_empty) {
        return Err(Error::InvalidParameter(
            "embed_batch given a list containing an empty text".into(),
        ));
    }
    Ok(())
}

/// Deterministic token-hashing embedder.
///
/// Distinct inputs land on distinct directions often enough for retrieval
/// tests; identical inputs always produce identical vectors. Output is
/// L2-normalized so cosine scoring behaves like the real model's.
pub struct HashEmbedder {
    dim: usize,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl Embedder for HashEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.is_empty() {
            return Err(Error::InvalidParameter("cannot embed empty text".into()));
        }
        let mut v = vec![0f32; self.dim];
        for (i, token) in text.split_whitespace().enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            #[allow(clippy::cast_precision_loss)]
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            #[allow(clippy::cast_precision_loss)]
            {
                v[idx] += val + (i as f32 % 3.0) * 0.01;
            }
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt().max(1e-6);
        for x in &mut v {
            *x /= norm;
        }
        Ok(v)
    }

    fn dimensions(&self) -> usize {
        self.dim
    }

    fn model_name(&self) -> &str {
        "hash-embedder"
    }
}

/// Build the process-wide embedder.
///
/// `RAGDB_USE_HASH_EMBEDDINGS=1` selects the hash embedder so tests and
/// smoke runs never pay model-loading time; otherwise the BGE-M3 model is
/// loaded eagerly, surfacing any model problem here rather than on the
/// first embed call.
pub fn default_embedder() -> anyhow::Result<Box<dyn Embedder>> {
    let use_hash = std::env::var("RAGDB_USE_HASH_EMBEDDINGS")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if use_hash {
        tracing::info!("using deterministic hash embedder");
        return Ok(Box::new(HashEmbedder::new(model::EMBEDDING_DIM)));
    }
    Ok(Box::new(model::EmbeddingModel::load()?))
}
