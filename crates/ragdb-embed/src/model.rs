//! BGE-M3 embedding model on candle.
//!
//! Loading is explicit: [`EmbeddingModel::load`] returns a ready handle or
//! an error, so callers never hit a hidden first-call latency spike.

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use std::time::Instant;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::xlm_roberta::{Config as XLMRobertaConfig, XLMRobertaModel};
use tokenizers::Tokenizer;

use crate::device::select_device;
use crate::pool::masked_mean_l2;
use crate::tokenize::tokenize_on_device;
use crate::Embedder;
use ragdb_core::error::Error;

pub const EMBEDDING_DIM: usize = 1024;
pub const MODEL_NAME: &str = "bge-m3";
const MAX_TOKENS: usize = 256;

pub struct EmbeddingModel {
    model: XLMRobertaModel,
    tokenizer: Tokenizer,
    device: Device,
}

impl EmbeddingModel {
    /// Load tokenizer, config and weights from the model directory.
    pub fn load() -> Result<Self> {
        let device = select_device();
        let model_dir = resolve_model_dir()?;
        tracing::info!(dir = %model_dir.display(), "loading BGE-M3 model");

        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;

        let config_path = model_dir.join("config.json");
        let config: XLMRobertaConfig = serde_json::from_str(&std::fs::read_to_string(&config_path)?)?;

        let weights_path = model_dir.join("pytorch_model.bin");
        let weights = candle_core::pickle::read_all(&weights_path)?;
        let weights_map: std::collections::HashMap<String, Tensor> = weights.into_iter().collect();
        let vb = VarBuilder::from_tensors(weights_map, DType::F32, &device);
        let model = XLMRobertaModel::new(&config, vb)?;

        tracing::info!("BGE-M3 model ready");
        Ok(Self { model, tokenizer, device })
    }

    fn forward(&self, text: &str) -> Result<Vec<f32>> {
        let start = Instant::now();
        let (input_ids, attention_mask) =
            tokenize_on_device(&self.tokenizer, text, MAX_TOKENS, &self.device)?;
        let token_type_ids = Tensor::zeros((1, MAX_TOKENS), DType::I64, &self.device)?;
        let hidden = self
            .model
            .forward(&input_ids, &attention_mask, &token_type_ids, None, None, None)?;
        let pooled = masked_mean_l2(&hidden, &attention_mask)?;
        let emb: Vec<f32> = pooled.to_device(&Device::Cpu)?.squeeze(0)?.to_vec1()?;
        if emb.len() != EMBEDDING_DIM {
            return Err(anyhow!("unexpected embedding width {}", emb.len()));
        }
        let elapsed = start.elapsed();
        if elapsed.as_millis() > 100 {
            tracing::warn!(ms = elapsed.as_millis(), "slow embedding");
        }
        Ok(emb)
    }
}

impl Embedder for EmbeddingModel {
    fn embed(&self, text: &str) -> ragdb_core::error::Result<Vec<f32>> {
        if text.is_empty() {
            return Err(Error::InvalidParameter("cannot embed empty text".into()));
        }
        self.forward(text).map_err(|e| Error::Embedding(e.to_string()))
    }

    fn dimensions(&self) -> usize {
        EMBEDDING_DIM
    }

    fn model_name(&self) -> &str {
        MODEL_NAME
    }
}

fn resolve_model_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("RAGDB_MODEL_DIR") {
        let p = PathBuf::from(&dir);
        if p.exists() {
            return Ok(p);
        }
    }
    let local = Path::new("models/bge-m3");
    if local.exists() {
        return Ok(local.to_path_buf());
    }
    let sibling = Path::new("../models/bge-m3");
    if sibling.exists() {
        return Ok(sibling.to_path_buf());
    }
    Err(anyhow!(
        "could not locate the BGE-M3 model directory; set RAGDB_MODEL_DIR"
    ))
}
