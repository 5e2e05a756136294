//! DistilBERT encoder with a sequence classification head.
//!
//! DistilBERT is a six-layer distillation of BERT. The sentiment checkpoint
//! used here classifies the `[CLS]` position into `NEGATIVE` / `POSITIVE`:
//! - learned absolute position embeddings (512 positions)
//! - post-norm transformer blocks with GELU feed-forward layers
//! - `pre_classifier` → ReLU → `classifier` head
//!
//! # Quick Start
//! ```rust,no_run
//! use comment_sentiment::models::{DistilBertCheckpoint, SentimentDistilBertModel};
//! use comment_sentiment::pipelines::sentiment_analysis_pipeline::SentimentAnalysisModel;
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let device = candle_core::Device::Cpu;
//! let model = SentimentDistilBertModel::new(DistilBertCheckpoint::Sst2English, device).await?;
//! let tokenizer = SentimentDistilBertModel::get_tokenizer(DistilBertCheckpoint::Sst2English).await?;
//! let result = model.predict_with_score(&tokenizer, "What a lovely day")?;
//! println!("{} ({:.3})", result.label, result.score);
//! # Ok(())
//! # }
//! ```

use candle_core::{DType, Device, IndexOp, Module, Result, Tensor, D};
use candle_nn::{embedding, layer_norm, linear, ops::softmax, Embedding, LayerNorm, Linear, VarBuilder};
use serde::Deserialize;
use std::collections::HashMap;

const LAYER_NORM_EPS: f64 = 1e-12;
const MASK_FILL: f64 = f32::MIN as f64;

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HiddenAct {
    #[default]
    Gelu,
    Relu,
}

impl HiddenAct {
    fn apply(&self, xs: &Tensor) -> Result<Tensor> {
        match self {
            HiddenAct::Gelu => xs.gelu_erf(),
            HiddenAct::Relu => xs.relu(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    pub vocab_size: usize,
    pub dim: usize,
    pub n_layers: usize,
    pub n_heads: usize,
    pub hidden_dim: usize,
    #[serde(default)]
    pub activation: HiddenAct,
    pub max_position_embeddings: usize,
    #[serde(default)]
    pub pad_token_id: u32,
    #[serde(default)]
    pub id2label: HashMap<String, String>,
}

/// Word and position embeddings followed by LayerNorm.
#[derive(Debug, Clone)]
struct Embeddings {
    word_embeddings: Embedding,
    position_embeddings: Embedding,
    layer_norm: LayerNorm,
    span: tracing::Span,
}

impl Embeddings {
    fn load(vb: VarBuilder, config: &Config) -> Result<Self> {
        let word_embeddings = embedding(config.vocab_size, config.dim, vb.pp("word_embeddings"))?;
        let position_embeddings = embedding(
            config.max_position_embeddings,
            config.dim,
            vb.pp("position_embeddings"),
        )?;
        let layer_norm = layer_norm(config.dim, LAYER_NORM_EPS, vb.pp("LayerNorm"))?;

        Ok(Self {
            word_embeddings,
            position_embeddings,
            layer_norm,
            span: tracing::span!(tracing::Level::TRACE, "embeddings"),
        })
    }

    fn forward(&self, input_ids: &Tensor) -> Result<Tensor> {
        let _enter = self.span.enter();
        let (_batch, seq_len) = input_ids.dims2()?;

        let positions = Tensor::arange(0u32, seq_len as u32, input_ids.device())?.unsqueeze(0)?;
        let words = self.word_embeddings.forward(input_ids)?;
        let positions = self.position_embeddings.forward(&positions)?;

        words.broadcast_add(&positions)?.apply(&self.layer_norm)
    }
}

/// Multi-head self-attention with a padding mask.
#[derive(Debug, Clone)]
struct MultiHeadSelfAttention {
    q_lin: Linear,
    k_lin: Linear,
    v_lin: Linear,
    out_lin: Linear,
    n_heads: usize,
    head_dim: usize,
    span: tracing::Span,
}

impl MultiHeadSelfAttention {
    fn load(vb: VarBuilder, config: &Config) -> Result<Self> {
        let dim = config.dim;
        Ok(Self {
            q_lin: linear(dim, dim, vb.pp("q_lin"))?,
            k_lin: linear(dim, dim, vb.pp("k_lin"))?,
            v_lin: linear(dim, dim, vb.pp("v_lin"))?,
            out_lin: linear(dim, dim, vb.pp("out_lin"))?,
            n_heads: config.n_heads,
            head_dim: dim / config.n_heads,
            span: tracing::span!(tracing::Level::TRACE, "attention"),
        })
    }

    fn split_heads(&self, xs: &Tensor) -> Result<Tensor> {
        let (batch, seq_len, _) = xs.dims3()?;
        xs.reshape((batch, seq_len, self.n_heads, self.head_dim))?
            .transpose(1, 2)?
            .contiguous()
    }

    fn forward(&self, hidden_states: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
        let _enter = self.span.enter();
        let (batch, seq_len, dim) = hidden_states.dims3()?;

        let q = self.split_heads(&hidden_states.apply(&self.q_lin)?)?;
        let k = self.split_heads(&hidden_states.apply(&self.k_lin)?)?;
        let v = self.split_heads(&hidden_states.apply(&self.v_lin)?)?;

        let q = (q * (self.head_dim as f64).powf(-0.5))?;
        let scores = q.matmul(&k.transpose(D::Minus2, D::Minus1)?.contiguous()?)?;
        let scores = scores.broadcast_add(attention_mask)?;
        let probs = softmax(&scores, D::Minus1)?;

        probs
            .matmul(&v)?
            .transpose(1, 2)?
            .reshape((batch, seq_len, dim))?
            .apply(&self.out_lin)
    }
}

#[derive(Debug, Clone)]
struct FeedForward {
    lin1: Linear,
    lin2: Linear,
    activation: HiddenAct,
    span: tracing::Span,
}

impl FeedForward {
    fn load(vb: VarBuilder, config: &Config) -> Result<Self> {
        Ok(Self {
            lin1: linear(config.dim, config.hidden_dim, vb.pp("lin1"))?,
            lin2: linear(config.hidden_dim, config.dim, vb.pp("lin2"))?,
            activation: config.activation,
            span: tracing::span!(tracing::Level::TRACE, "ffn"),
        })
    }
}

impl Module for FeedForward {
    fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        let _enter = self.span.enter();
        let xs = xs.apply(&self.lin1)?;
        self.activation.apply(&xs)?.apply(&self.lin2)
    }
}

/// Post-norm transformer block.
#[derive(Debug, Clone)]
struct TransformerBlock {
    attention: MultiHeadSelfAttention,
    sa_layer_norm: LayerNorm,
    ffn: FeedForward,
    output_layer_norm: LayerNorm,
}

impl TransformerBlock {
    fn load(vb: VarBuilder, config: &Config) -> Result<Self> {
        Ok(Self {
            attention: MultiHeadSelfAttention::load(vb.pp("attention"), config)?,
            sa_layer_norm: layer_norm(config.dim, LAYER_NORM_EPS, vb.pp("sa_layer_norm"))?,
            ffn: FeedForward::load(vb.pp("ffn"), config)?,
            output_layer_norm: layer_norm(config.dim, LAYER_NORM_EPS, vb.pp("output_layer_norm"))?,
        })
    }

    fn forward(&self, hidden_states: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
        let attended = self.attention.forward(hidden_states, attention_mask)?;
        let hidden_states = (attended + hidden_states)?.apply(&self.sa_layer_norm)?;

        let ffn_output = self.ffn.forward(&hidden_states)?;
        (ffn_output + hidden_states)?.apply(&self.output_layer_norm)
    }
}

/// Bare DistilBERT encoder producing per-token hidden states.
#[derive(Debug, Clone)]
pub struct DistilBertModel {
    embeddings: Embeddings,
    layers: Vec<TransformerBlock>,
    device: Device,
}

impl DistilBertModel {
    pub fn load(vb: VarBuilder, config: &Config) -> Result<Self> {
        let embeddings = Embeddings::load(vb.pp("embeddings"), config)?;
        let layers = (0..config.n_layers)
            .map(|i| TransformerBlock::load(vb.pp(format!("transformer.layer.{i}")), config))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            embeddings,
            layers,
            device: vb.device().clone(),
        })
    }

    /// Turn a `(batch, seq_len)` 0/1 mask into an additive `(batch, 1, 1, seq_len)` mask.
    fn extended_attention_mask(&self, attention_mask: &Tensor) -> Result<Tensor> {
        let (batch, seq_len) = attention_mask.dims2()?;
        attention_mask
            .to_dtype(DType::F32)?
            .affine(-1.0, 1.0)?
            .affine(MASK_FILL, 0.0)?
            .reshape((batch, 1, 1, seq_len))
    }

    pub fn forward(&self, input_ids: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
        let mask = self.extended_attention_mask(attention_mask)?;
        let mut hidden_states = self.embeddings.forward(input_ids)?;
        for layer in &self.layers {
            hidden_states = layer.forward(&hidden_states, &mask)?;
        }
        Ok(hidden_states)
    }

    pub fn device(&self) -> &Device {
        &self.device
    }
}

/// DistilBERT with the `pre_classifier` / `classifier` head on `[CLS]`.
#[derive(Debug, Clone)]
pub struct DistilBertForSequenceClassification {
    distilbert: DistilBertModel,
    pre_classifier: Linear,
    classifier: Linear,
}

impl DistilBertForSequenceClassification {
    pub fn load(vb: VarBuilder, config: &Config) -> Result<Self> {
        let distilbert = DistilBertModel::load(vb.pp("distilbert"), config)?;
        let pre_classifier = linear(config.dim, config.dim, vb.pp("pre_classifier"))?;
        let classifier = linear(config.dim, config.id2label.len(), vb.pp("classifier"))?;

        Ok(Self {
            distilbert,
            pre_classifier,
            classifier,
        })
    }

    /// Returns `(batch, num_labels)` logits.
    pub fn forward(&self, input_ids: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
        let hidden_states = self.distilbert.forward(input_ids, attention_mask)?;
        hidden_states
            .i((.., 0, ..))?
            .apply(&self.pre_classifier)?
            .relu()?
            .apply(&self.classifier)
    }

    pub fn device(&self) -> &Device {
        self.distilbert.device()
    }
}

/*
Pipeline Implementations
*/

use crate::core::SentimentError;
use crate::loaders::{ModelConfigLoader, SafetensorsLoader, TokenizerLoader};
use crate::pipelines::sentiment_analysis_pipeline::{SentimentAnalysisModel, SentimentResult};
use anyhow::Result as AnyhowResult;
use tokenizers::Tokenizer;

/// Available DistilBERT sentiment checkpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DistilBertCheckpoint {
    /// `distilbert-base-uncased` fine-tuned on SST-2 (`NEGATIVE` / `POSITIVE`).
    #[default]
    Sst2English,
}

impl DistilBertCheckpoint {
    pub fn model_repo(&self) -> &'static str {
        match self {
            DistilBertCheckpoint::Sst2English => {
                "distilbert/distilbert-base-uncased-finetuned-sst-2-english"
            }
        }
    }

    /// The fine-tuned repo ships only `vocab.txt`; the base model has the same
    /// vocabulary as a `tokenizer.json`.
    pub fn tokenizer_repo(&self) -> &'static str {
        match self {
            DistilBertCheckpoint::Sst2English => "distilbert/distilbert-base-uncased",
        }
    }
}

impl std::fmt::Display for DistilBertCheckpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DistilBertCheckpoint::Sst2English => "distilbert-sst2-english",
        };
        write!(f, "{name}")
    }
}

impl crate::core::ModelOptions for DistilBertCheckpoint {
    fn cache_key(&self) -> String {
        self.to_string()
    }
}

/// Sentiment analysis model using DistilBERT.
#[derive(Clone)]
pub struct SentimentDistilBertModel {
    model: DistilBertForSequenceClassification,
    device: Device,
    id2label: HashMap<String, String>,
    max_position_embeddings: usize,
}

impl SentimentDistilBertModel {
    pub fn id2label(&self) -> &HashMap<String, String> {
        &self.id2label
    }
}

impl SentimentAnalysisModel for SentimentDistilBertModel {
    type Options = DistilBertCheckpoint;

    async fn new(options: Self::Options, device: Device) -> AnyhowResult<Self> {
        let repo = options.model_repo();

        let config: Config = ModelConfigLoader::new(repo, "config.json").load().await?;
        if config.id2label.is_empty() {
            anyhow::bail!("Model config for {repo} has no id2label map");
        }
        let weights = SafetensorsLoader::new(repo, "model.safetensors").load().await?;

        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[weights], DType::F32, &device)? };
        let model = DistilBertForSequenceClassification::load(vb, &config)?;

        tracing::info!(checkpoint = %options, device = ?device.location(), "loaded sentiment classifier");

        Ok(Self {
            model,
            device,
            id2label: config.id2label,
            max_position_embeddings: config.max_position_embeddings,
        })
    }

    fn predict(&self, tokenizer: &Tokenizer, text: &str) -> AnyhowResult<String> {
        Ok(self.predict_with_score(tokenizer, text)?.label)
    }

    fn predict_with_score(&self, tokenizer: &Tokenizer, text: &str) -> AnyhowResult<SentimentResult> {
        let tokens = tokenizer
            .encode(text, true)
            .map_err(|e| SentimentError::Tokenization(e.to_string()))?;
        let token_ids = tokens.get_ids();
        if token_ids.len() > self.max_position_embeddings {
            return Err(SentimentError::InputTooLong {
                tokens: token_ids.len(),
                max: self.max_position_embeddings,
            }
            .into());
        }

        let input_ids = Tensor::new(token_ids, &self.device)?.unsqueeze(0)?;
        let attention_mask = Tensor::new(tokens.get_attention_mask(), &self.device)?.unsqueeze(0)?;

        let logits = self.model.forward(&input_ids, &attention_mask)?;
        let probs = softmax(&logits, D::Minus1)?.squeeze(0)?.to_vec1::<f32>()?;

        let (pred_id, score) = probs
            .iter()
            .copied()
            .enumerate()
            .fold((0usize, f32::MIN), |best, (id, p)| if p > best.1 { (id, p) } else { best });
        let pred_id = pred_id as u32;

        let label = self
            .id2label
            .get(&pred_id.to_string())
            .ok_or(SentimentError::UnknownLabel(pred_id))?
            .clone();

        Ok(SentimentResult { label, score })
    }

    async fn get_tokenizer(options: Self::Options) -> AnyhowResult<Tokenizer> {
        let mut tokenizer = TokenizerLoader::new(options.tokenizer_repo(), "tokenizer.json")
            .load()
            .await?;
        // Length gating needs the full token count, so drop any baked-in
        // truncation or padding.
        tokenizer
            .with_truncation(None)
            .map_err(anyhow::Error::msg)?;
        tokenizer.with_padding(None);
        Ok(tokenizer)
    }

    fn max_input_tokens(&self) -> usize {
        self.max_position_embeddings
    }

    fn device(&self) -> &Device {
        &self.device
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_nn::VarMap;

    fn tiny_config() -> Config {
        serde_json::from_str(
            r#"{
                "vocab_size": 16,
                "dim": 8,
                "n_layers": 2,
                "n_heads": 2,
                "hidden_dim": 16,
                "activation": "gelu",
                "dropout": 0.1,
                "max_position_embeddings": 12,
                "pad_token_id": 0,
                "id2label": {"0": "NEGATIVE", "1": "POSITIVE"}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn config_parses_hub_layout() {
        let config = tiny_config();
        assert_eq!(config.n_layers, 2);
        assert_eq!(config.activation, HiddenAct::Gelu);
        assert_eq!(config.id2label.get("1").map(String::as_str), Some("POSITIVE"));
    }

    #[test]
    fn classification_logits_have_one_column_per_label() {
        let config = tiny_config();
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let model = DistilBertForSequenceClassification::load(vb, &config).unwrap();

        let input_ids = Tensor::new(&[[1u32, 5, 7, 2]], &Device::Cpu).unwrap();
        let attention_mask = Tensor::new(&[[1u32, 1, 1, 1]], &Device::Cpu).unwrap();
        let logits = model.forward(&input_ids, &attention_mask).unwrap();

        assert_eq!(logits.dims(), &[1, 2]);
    }

    #[test]
    fn padding_mask_is_additive() {
        let config = tiny_config();
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let model = DistilBertModel::load(vb, &config).unwrap();

        let mask = Tensor::new(&[[1u32, 0]], &Device::Cpu).unwrap();
        let extended = model
            .extended_attention_mask(&mask)
            .unwrap()
            .flatten_all()
            .unwrap()
            .to_vec1::<f32>()
            .unwrap();

        assert_eq!(extended[0], 0.0);
        assert_eq!(extended[1], f32::MIN);
    }

    #[test]
    fn checkpoint_cache_key_is_stable() {
        use crate::core::ModelOptions;
        assert_eq!(
            DistilBertCheckpoint::Sst2English.cache_key(),
            "distilbert-sst2-english"
        );
    }
}
