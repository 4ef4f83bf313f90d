//! Sentence embeddings via a multilingual MiniLM model and candle.
//!
//! Downloads model artifacts from HuggingFace on first use, then runs BERT
//! inference with mean pooling to produce sentence vectors for the semantic
//! analyzer.
//!
//! # Feature Gate
//!
//! This module requires the `embeddings` feature:
//!
//! ```bash
//! cargo build --features embeddings
//! ```

use crate::analysis::semantic::SentenceEncoder;
use crate::error::{CallwardenError, Result};

use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig, DTYPE};
use hf_hub::api::sync::Api;
use tokenizers::Tokenizer;

/// Default sentence-embedding model: multilingual, covers English and Hindi.
pub const DEFAULT_EMBEDDING_REPO: &str =
    "sentence-transformers/paraphrase-multilingual-MiniLM-L12-v2";

/// Sentence encoder backed by a candle BERT model.
pub struct CandleSentenceEncoder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
}

impl CandleSentenceEncoder {
    /// Load the default multilingual model from the HuggingFace cache.
    pub fn load_default() -> Result<Self> {
        Self::load(DEFAULT_EMBEDDING_REPO)
    }

    /// Load a sentence-transformers model from HuggingFace cache.
    ///
    /// Downloads model weights, config, and tokenizer on first call.
    pub fn load(repo_id: &str) -> Result<Self> {
        let device = Device::Cpu;
        let api = Api::new().map_err(|e| CallwardenError::Embedding {
            message: format!("HF Hub API init: {e}"),
        })?;
        let repo = api.model(repo_id.to_string());

        let config_path = repo.get("config.json").map_err(|e| CallwardenError::Embedding {
            message: format!("Download config.json: {e}"),
        })?;
        let tokenizer_path =
            repo.get("tokenizer.json")
                .map_err(|e| CallwardenError::Embedding {
                    message: format!("Download tokenizer.json: {e}"),
                })?;
        let weights_path =
            repo.get("model.safetensors")
                .map_err(|e| CallwardenError::Embedding {
                    message: format!("Download model.safetensors: {e}"),
                })?;

        let config_bytes = std::fs::read(&config_path).map_err(|e| CallwardenError::Embedding {
            message: format!("Read config {}: {e}", config_path.display()),
        })?;
        let config: BertConfig =
            serde_json::from_slice(&config_bytes).map_err(|e| CallwardenError::Embedding {
                message: format!("Parse BERT config: {e}"),
            })?;

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], DTYPE, &device).map_err(|e| {
                CallwardenError::Embedding {
                    message: format!("Load safetensors: {e}"),
                }
            })?
        };
        let model = BertModel::load(vb, &config).map_err(|e| CallwardenError::Embedding {
            message: format!("Init BERT model: {e}"),
        })?;

        let tokenizer =
            Tokenizer::from_file(&tokenizer_path).map_err(|e| CallwardenError::Embedding {
                message: format!("Load tokenizer {}: {e}", tokenizer_path.display()),
            })?;

        Ok(Self {
            model,
            tokenizer,
            device,
        })
    }
}

impl SentenceEncoder for CandleSentenceEncoder {
    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| CallwardenError::Embedding {
                message: format!("Tokenize: {e}"),
            })?;

        let ids: Vec<u32> = encoding.get_ids().to_vec();
        let input_ids = Tensor::new(ids.as_slice(), &self.device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(|e| CallwardenError::Embedding {
                message: format!("Create input tensor: {e}"),
            })?;
        let token_type_ids =
            input_ids
                .zeros_like()
                .map_err(|e| CallwardenError::Embedding {
                    message: format!("Create type-id tensor: {e}"),
                })?;

        // [1, seq, hidden]
        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, None)
            .map_err(|e| CallwardenError::Embedding {
                message: format!("BERT forward: {e}"),
            })?;

        // Mean pooling over the sequence dimension, then L2 normalization,
        // the same readout sentence-transformers applies.
        let pooled = hidden
            .mean(1)
            .and_then(|t| t.squeeze(0))
            .map_err(|e| CallwardenError::Embedding {
                message: format!("Mean pooling: {e}"),
            })?;

        let vector: Vec<f32> = pooled.to_vec1().map_err(|e| CallwardenError::Embedding {
            message: format!("Read embedding: {e}"),
        })?;

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm <= f32::EPSILON {
            return Ok(vector);
        }
        Ok(vector.into_iter().map(|x| x / norm).collect())
    }
}

#[cfg(test)]
mod tests {
    // Loading the model needs network access and a ~470MB download; encoder
    // behavior against the analyzer is covered with stub encoders in
    // `semantic.rs` tests.
}
