//! Model and tokenizer loading utilities for Hugging Face Hub integration.
//!
//! This module downloads (or finds in the local Hub cache) the files a
//! classifier needs:
//! - Tokenizers (`tokenizer.json`)
//! - Model configuration (`config.json`)
//! - Model weights (`model.safetensors`)
//!
//! ## Main Types
//!
//! - [`HfLoader`] - Generic Hugging Face file loader with retry logic
//! - [`TokenizerLoader`] - Loads tokenizers from Hugging Face repositories
//! - [`ModelConfigLoader`] - Loads and deserializes `config.json`
//! - [`SafetensorsLoader`] - Resolves safetensors weight files
//!
//! All loaders retry when the Hub cache lock is held by another process.

use serde::de::DeserializeOwned;
use std::path::PathBuf;
use tokenizers::Tokenizer;

const MAX_RETRIES: u32 = 3;

#[derive(Debug, Clone)]
pub struct HfLoader {
    pub repo: String,
    pub filename: String,
}

impl HfLoader {
    pub fn new(repo: &str, filename: &str) -> Self {
        Self {
            repo: repo.into(),
            filename: filename.into(),
        }
    }

    pub async fn load(&self) -> anyhow::Result<PathBuf> {
        let hf_api = hf_hub::api::tokio::ApiBuilder::new()
            .with_chunk_size(None)
            .build()?;
        let hf_api = hf_api.model(self.repo.clone());

        let mut attempt = 0;
        loop {
            match hf_api.get(self.filename.as_str()).await {
                Ok(path) => return Ok(path),
                Err(e)
                    if e.to_string().contains("Lock acquisition failed")
                        && attempt < MAX_RETRIES - 1 =>
                {
                    // Exponential backoff: 100ms, 200ms.
                    let wait_time = std::time::Duration::from_millis(100 * (1 << attempt));
                    tracing::warn!(
                        repo = %self.repo,
                        file = %self.filename,
                        attempt,
                        "hub cache lock busy, retrying in {wait_time:?}"
                    );
                    tokio::time::sleep(wait_time).await;
                    attempt += 1;
                }
                Err(e) => {
                    return Err(anyhow::Error::from(e)
                        .context(format!("failed to fetch {}/{}", self.repo, self.filename)))
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct TokenizerLoader {
    pub tokenizer_file_loader: HfLoader,
}

impl TokenizerLoader {
    pub fn new(repo: &str, filename: &str) -> Self {
        Self {
            tokenizer_file_loader: HfLoader::new(repo, filename),
        }
    }

    pub async fn load(&self) -> anyhow::Result<Tokenizer> {
        let tokenizer_file_path = self.tokenizer_file_loader.load().await?;

        let tokenizer = Tokenizer::from_file(tokenizer_file_path).map_err(anyhow::Error::msg)?;

        Ok(tokenizer)
    }
}

/// Loads a model's `config.json` into any deserializable config type.
#[derive(Debug, Clone)]
pub struct ModelConfigLoader {
    pub config_file_loader: HfLoader,
}

impl ModelConfigLoader {
    pub fn new(repo: &str, filename: &str) -> Self {
        Self {
            config_file_loader: HfLoader::new(repo, filename),
        }
    }

    pub async fn load<C: DeserializeOwned>(&self) -> anyhow::Result<C> {
        let config_file_path = self.config_file_loader.load().await?;

        let config_content = std::fs::read_to_string(&config_file_path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file {config_file_path:?}: {e}")
        })?;

        serde_json::from_str(&config_content)
            .map_err(|e| anyhow::anyhow!("Failed to parse model config: {e}"))
    }
}

#[derive(Debug, Clone)]
pub struct SafetensorsLoader {
    pub weights_file_loader: HfLoader,
}

impl SafetensorsLoader {
    pub fn new(repo: &str, filename: &str) -> Self {
        Self {
            weights_file_loader: HfLoader::new(repo, filename),
        }
    }

    pub async fn load(&self) -> anyhow::Result<PathBuf> {
        let weights_path = self.weights_file_loader.load().await?;

        if !weights_path
            .extension()
            .is_some_and(|ext| ext == "safetensors")
        {
            anyhow::bail!("Unsupported weight file format: {:?}", weights_path);
        }

        Ok(weights_path)
    }
}
