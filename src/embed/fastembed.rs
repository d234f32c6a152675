//! Local sentence-transformer embeddings via `fastembed`.
//!
//! Runs the ONNX export of the model in-process; weights are downloaded into
//! the cache directory on first use.

use super::{EmbeddingProvider, ProviderError};
use fastembed::{EmbeddingModel, TextEmbedding, TextInitOptions};
use std::path::PathBuf;
use std::sync::Mutex;

/// `fastembed`-backed provider.
pub struct FastEmbedProvider {
    // `TextEmbedding::embed` needs `&mut self`.
    model: Mutex<TextEmbedding>,
    model_name: String,
    dim: usize,
}

impl FastEmbedProvider {
    /// Load `model` (default all-MiniLM-L6-v2), caching weights in `cache_dir`.
    pub fn new(
        model: Option<EmbeddingModel>,
        cache_dir: Option<PathBuf>,
    ) -> Result<Self, ProviderError> {
        let model_type = model.unwrap_or(EmbeddingModel::AllMiniLML6V2);
        let model_name = format!("{model_type:?}");
        let dim = model_dimension(&model_type)?;

        let mut options = TextInitOptions::new(model_type);
        if let Some(dir) = cache_dir {
            options = options.with_cache_dir(dir);
        }

        tracing::info!(model = %model_name, dim, "loading embedding model");
        let embedding = TextEmbedding::try_new(options)?;

        Ok(Self {
            model: Mutex::new(embedding),
            model_name,
            dim,
        })
    }
}

/// Output dimension of `model`, from fastembed's model registry.
pub fn model_dimension(model: &EmbeddingModel) -> Result<usize, ProviderError> {
    Ok(TextEmbedding::get_model_info(model)?.dim)
}

impl EmbeddingProvider for FastEmbedProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let mut model = self
            .model
            .lock()
            .map_err(|_| "embedding model lock poisoned")?;

        model
            .embed(vec![text], None)?
            .into_iter()
            .next()
            .ok_or_else(|| "model returned no embedding".into())
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

impl std::fmt::Debug for FastEmbedProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastEmbedProvider")
            .field("model_name", &self.model_name)
            .field("dim", &self.dim)
            .finish()
    }
}
