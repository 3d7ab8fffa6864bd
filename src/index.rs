//! Vector-store seam used by the pipeline.
//!
//! The driver talks to the store through this trait so tests can substitute
//! an in-memory fake; the production implementation is
//! [`QdrantFacade`](crate::qdrant_facade::QdrantFacade).

use crate::config::VectorSpace;
use crate::errors::IngestError;
use qdrant_client::qdrant::PointStruct;
use std::collections::HashSet;
use std::{future::Future, pin::Pin};

/// Point upsert-by-id, id lookup, and collection bootstrap.
pub trait CaseIndex: Send + Sync {
    /// Creates the collection when missing; an existing collection is reused
    /// as-is, no schema migration.
    fn ensure_collection<'a>(
        &'a self,
        space: &'a VectorSpace,
    ) -> Pin<Box<dyn Future<Output = Result<(), IngestError>> + Send + 'a>>;

    /// Which of the given ids already exist in the store. One batched call,
    /// the sole de-duplication mechanism of the pipeline.
    fn existing_ids<'a>(
        &'a self,
        ids: &'a [u64],
    ) -> Pin<Box<dyn Future<Output = Result<HashSet<u64>, IngestError>> + Send + 'a>>;

    /// Upserts a batch of points, waiting for acknowledgement so progress
    /// accounting reflects committed state.
    fn upsert<'a>(
        &'a self,
        points: Vec<PointStruct>,
    ) -> Pin<Box<dyn Future<Output = Result<(), IngestError>> + Send + 'a>>;
}
