//! Local sentence-embedding provider backed by `fastembed` ONNX models.
//!
//! Defaults to all-MiniLM-L6-v2, a compact model well suited to batched
//! offline ingestion. The first construction downloads the model weights.

use crate::embed::EmbeddingsProvider;
use crate::errors::IngestError;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::{Arc, Mutex};
use tracing::info;

/// Sentence embedder over a locally-run ONNX model.
pub struct SentenceEmbedder {
    model: Arc<Mutex<TextEmbedding>>,
    dim: usize,
}

impl SentenceEmbedder {
    /// Loads the default model (all-MiniLM-L6-v2).
    pub fn new() -> Result<Self, IngestError> {
        Self::with_model(EmbeddingModel::AllMiniLML6V2)
    }

    /// Loads a specific fastembed model.
    pub fn with_model(model: EmbeddingModel) -> Result<Self, IngestError> {
        info!("loading embedding model {:?}", model);
        let options = InitOptions::new(model).with_show_download_progress(true);
        let mut embedding = TextEmbedding::try_new(options)
            .map_err(|e| IngestError::Embedding(format!("model init failed: {e}")))?;

        // The output dimension fixes the collection's vector size for the
        // whole run; probe it once instead of trusting a static table.
        let probe = embedding
            .embed(vec!["dimension probe"], None)
            .map_err(|e| IngestError::Embedding(format!("model probe failed: {e}")))?;
        let dim = probe
            .first()
            .map(|v| v.len())
            .ok_or_else(|| IngestError::Embedding("model probe returned no vector".into()))?;

        info!("embedding dimension is {dim}");
        Ok(Self {
            model: Arc::new(Mutex::new(embedding)),
            dim,
        })
    }

    fn encode(&self, texts: Vec<&str>) -> Result<Vec<Vec<f32>>, IngestError> {
        let mut model = self
            .model
            .lock()
            .map_err(|_| IngestError::Embedding("embedding model lock poisoned".into()))?;
        model
            .embed(texts, None)
            .map_err(|e| IngestError::Embedding(e.to_string()))
    }
}

impl EmbeddingsProvider for SentenceEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed<'a>(
        &'a self,
        text: &'a str,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Vec<f32>, IngestError>> + Send + 'a>,
    > {
        Box::pin(async move {
            let mut out = self.encode(vec![text])?;
            out.pop()
                .ok_or_else(|| IngestError::Embedding("no embedding returned".into()))
        })
    }

    fn embed_batch<'a>(
        &'a self,
        texts: &'a [String],
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Vec<Vec<f32>>, IngestError>> + Send + 'a>,
    > {
        Box::pin(async move {
            let refs: Vec<&str> = texts.iter().map(|s| s.as_str()).collect();
            self.encode(refs)
        })
    }
}
