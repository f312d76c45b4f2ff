//! Candle-backed multilingual sentence encoder (XLM-RoBERTa, mean pooling).
//!
//! Runs on CPU from a local model directory. Ge'ez-script coverage in the
//! public multilingual checkpoints is poor, so the provider routes Amharic
//! text to the hashing fallback instead of through here.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::xlm_roberta::{Config as XlmRobertaConfig, XLMRobertaModel};
use tokenizers::Tokenizer;
use tracing::info;

const MAX_SEQ_LEN: usize = 256;

pub struct EncoderEmbedder {
    model: XLMRobertaModel,
    tokenizer: Tokenizer,
    device: Device,
    dim: usize,
}

impl EncoderEmbedder {
    pub fn load(model_dir: &Path) -> Result<Self> {
        let device = Device::Cpu;

        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;

        let config_path = model_dir.join("config.json");
        let config: XlmRobertaConfig =
            serde_json::from_str(&std::fs::read_to_string(&config_path)?)?;
        let dim = config.hidden_size;

        let weights_path = model_dir.join("pytorch_model.bin");
        let weights = candle_core::pickle::read_all(&weights_path)?;
        let weights_map: std::collections::HashMap<String, Tensor> =
            weights.into_iter().collect();
        let vb = VarBuilder::from_tensors(weights_map, DType::F32, &device);
        let model = XLMRobertaModel::new(&config, vb)?;

        info!(model_dir = %model_dir.display(), dim, "loaded sentence encoder");
        Ok(Self { model, tokenizer, device, dim })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Mask-weighted mean pooling over the last hidden states, then L2
    /// normalization to keep vectors comparable with the hash path.
    pub fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let enc = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow!("Tokenization failed: {}", e))?;
        let mut ids = enc.get_ids().to_vec();
        let mut mask = enc.get_attention_mask().to_vec();
        if ids.len() > MAX_SEQ_LEN {
            ids.truncate(MAX_SEQ_LEN);
            mask.truncate(MAX_SEQ_LEN);
        }
        if ids.len() < MAX_SEQ_LEN {
            let pad = MAX_SEQ_LEN - ids.len();
            ids.extend(std::iter::repeat(1).take(pad));
            mask.extend(std::iter::repeat(0).take(pad));
        }

        let input_ids = Tensor::from_iter(ids, &self.device)?.reshape((1, MAX_SEQ_LEN))?;
        let attention_mask = Tensor::from_iter(mask, &self.device)?.reshape((1, MAX_SEQ_LEN))?;
        let token_type_ids = Tensor::zeros((1, MAX_SEQ_LEN), DType::I64, &self.device)?;

        let hidden = self
            .model
            .forward(&input_ids, &attention_mask, &token_type_ids, None, None, None)?;

        let mask = attention_mask.to_dtype(hidden.dtype())?;
        let mask_3d = mask.unsqueeze(2)?;
        let mask_b = mask_3d.broadcast_as(hidden.shape())?;
        let summed = (&hidden * &mask_b)?.sum(1)?;
        let lens = mask.sum(1)?.unsqueeze(1)?.to_dtype(summed.dtype())?;
        let mean = summed.broadcast_div(&lens)?;

        let norm = mean.sqr()?.sum_keepdim(1)?.sqrt()?;
        let eps = Tensor::new(&[1e-12f32], &self.device)?.unsqueeze(0)?;
        let norm = norm.broadcast_add(&eps)?;
        let unit = mean.broadcast_div(&norm)?;

        let out: Vec<f32> = unit.squeeze(0)?.to_vec1()?;
        Ok(out)
    }
}

/// Locate a model directory from the environment or conventional paths.
pub fn resolve_model_dir() -> Option<PathBuf> {
    for var in ["APP_MODEL_DIR", "MODEL_DIR"] {
        if let Ok(dir) = std::env::var(var) {
            let p = PathBuf::from(&dir);
            if p.exists() {
                return Some(p);
            }
        }
    }
    let conventional = Path::new("models/sentence-encoder");
    if conventional.exists() {
        return Some(conventional.to_path_buf());
    }
    None
}
