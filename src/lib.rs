//! Bulk legal-case ingestion into Qdrant.
//!
//! This crate downloads reporter-volume archives, selects the canonical
//! opinion of each case, embeds the opinion text with a local sentence
//! model, and upserts vector + metadata points into a Qdrant collection.
//! Store contents are the single source of truth for "already ingested",
//! so re-running after a crash is safe.

mod archive;
mod assembler;
mod config;
mod download;
mod embed;
mod errors;
mod index;
mod loader;
mod pipeline;
mod qdrant_facade;
mod record;
mod writer;

pub use config::{DistanceKind, IngestConfig, VectorSpace};
pub use download::{FetchReport, fetch_volumes};
pub use embed::{EmbeddingsProvider, minilm::SentenceEmbedder};
pub use errors::IngestError;
pub use index::CaseIndex;
pub use loader::OpinionRanking;
pub use pipeline::PipelineReport;
pub use record::{
    CaseBody, CaseRecord, Citation, CourtMeta, EncodedCase, Jurisdiction, JurisdictionManifest,
    LoadedCase, Opinion, Reporter, ReporterVolume,
};

use tracing::trace;

/// High-level facade wiring configuration and the Qdrant client.
///
/// Constructed once at startup; components receive it by reference rather
/// than reaching for process-wide singletons.
pub struct CaseVec {
    cfg: IngestConfig,
    client: qdrant_facade::QdrantFacade,
    ranking: OpinionRanking,
}

impl CaseVec {
    /// Connects to the store with the default opinion ranking table.
    ///
    /// # Errors
    /// Returns `IngestError::Config`/`IngestError::Qdrant` if client
    /// initialization fails. This is the only fatal phase of a run.
    pub fn new(cfg: IngestConfig) -> Result<Self, IngestError> {
        Self::with_ranking(cfg, OpinionRanking::default_table())
    }

    /// Connects with a caller-supplied opinion ranking table.
    pub fn with_ranking(cfg: IngestConfig, ranking: OpinionRanking) -> Result<Self, IngestError> {
        trace!("CaseVec::new collection={}", cfg.collection);
        let client = qdrant_facade::QdrantFacade::new(&cfg)?;
        Ok(Self {
            cfg,
            client,
            ranking,
        })
    }

    /// Ingests every volume archive under the configured downloads
    /// directory.
    ///
    /// # Errors
    /// Per-case and per-archive failures are recovered locally; only store
    /// failures surface.
    pub async fn ingest(
        &self,
        provider: &dyn EmbeddingsProvider,
    ) -> Result<PipelineReport, IngestError> {
        pipeline::run(&self.cfg, &self.client, provider, &self.ranking).await
    }

    /// Embeds a query string and returns the top-k `(score, payload)` hits.
    pub async fn search(
        &self,
        provider: &dyn EmbeddingsProvider,
        query: &str,
        limit: u64,
    ) -> Result<Vec<(f32, serde_json::Value)>, IngestError> {
        trace!("CaseVec::search limit={limit}");
        let vector = provider.embed(query).await?;
        self.client.search(vector, limit).await
    }
}
