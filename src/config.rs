//! Runtime and collection configuration.

use crate::errors::IngestError;
use std::path::PathBuf;

/// Distance function used for the vector space.
#[derive(Clone, Copy, Debug)]
pub enum DistanceKind {
    /// Cosine distance (recommended for sentence embeddings).
    Cosine,
    /// Dot product (useful for normalized vectors).
    Dot,
    /// Euclidean distance (L2).
    Euclid,
}

/// Describes the vector space of the collection.
#[derive(Clone, Debug)]
pub struct VectorSpace {
    /// Dimensionality of vectors.
    pub size: usize,
    /// Distance function.
    pub distance: DistanceKind,
}

/// Configuration for case ingestion and retrieval.
#[derive(Clone, Debug)]
pub struct IngestConfig {
    /// Qdrant HTTP endpoint, e.g. `http://localhost:6334`.
    pub qdrant_url: String,
    /// Optional API key for Qdrant Cloud.
    pub qdrant_api_key: Option<String>,
    /// Target collection name.
    pub collection: String,
    /// Distance function (Cosine by default).
    pub distance: DistanceKind,
    /// Data directory holding volume metadata and downloaded archives.
    pub data_dir: PathBuf,
}

impl IngestConfig {
    /// Creates a sane default config for a given collection name and Qdrant endpoint.
    pub fn new_default(url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            qdrant_url: url.into(),
            qdrant_api_key: None,
            collection: collection.into(),
            distance: DistanceKind::Cosine,
            data_dir: PathBuf::from("./data"),
        }
    }

    /// Builds a config from environment variables, falling back to defaults.
    ///
    /// Recognized variables: `QDRANT_URL`, `QDRANT_API_KEY`, `CASE_COLLECTION`,
    /// `CASE_DATA_DIR`.
    pub fn from_env() -> Self {
        let url =
            std::env::var("QDRANT_URL").unwrap_or_else(|_| "http://localhost:6334".to_string());
        let collection =
            std::env::var("CASE_COLLECTION").unwrap_or_else(|_| "cases".to_string());
        let mut cfg = Self::new_default(url, collection);
        cfg.qdrant_api_key = std::env::var("QDRANT_API_KEY").ok();
        if let Ok(dir) = std::env::var("CASE_DATA_DIR") {
            cfg.data_dir = PathBuf::from(dir);
        }
        cfg
    }

    /// Directory where reporter-volume archives are downloaded to.
    pub fn downloads_dir(&self) -> PathBuf {
        self.data_dir.join("downloads")
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), IngestError> {
        if self.qdrant_url.trim().is_empty() {
            return Err(IngestError::Config("qdrant_url is empty".into()));
        }
        if self.collection.trim().is_empty() {
            return Err(IngestError::Config("collection is empty".into()));
        }
        Ok(())
    }
}
