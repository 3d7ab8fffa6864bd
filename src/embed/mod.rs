//! Embedding provider seam.
//!
//! The pipeline only needs a fixed output dimension and an order-preserving
//! batch call; anything satisfying that can stand in for the real model,
//! which keeps the driver testable with a fake provider.

use crate::errors::IngestError;
use std::{future::Future, pin::Pin};

/// Provider interface for embedding generation.
///
/// Implement this trait to plug in your own backend (local ONNX model,
/// HTTP embedding server, a test fake).
pub trait EmbeddingsProvider: Send + Sync {
    /// Fixed output dimension of the model, read once at startup.
    fn dim(&self) -> usize;

    /// Embeds a single text.
    fn embed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, IngestError>> + Send + 'a>>;

    /// Embeds a batch of texts; output order matches input order.
    fn embed_batch<'a>(
        &'a self,
        texts: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Vec<f32>>, IngestError>> + Send + 'a>>;
}

pub mod minilm;
