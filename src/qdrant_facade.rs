//! Thin adapter around `qdrant-client` to isolate API usage.
//!
//! This facade concentrates all Qdrant interactions behind a minimal API,
//! hiding the verbose builder pattern and keeping the rest of the pipeline
//! decoupled from `qdrant-client`.

use crate::config::{DistanceKind, IngestConfig, VectorSpace};
use crate::errors::IngestError;
use crate::index::CaseIndex;

use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, GetPointsBuilder, PointId, PointStruct,
    SearchPointsBuilder, UpsertPointsBuilder, Value as QValue, VectorParamsBuilder,
    point_id::PointIdOptions,
};
use std::collections::HashSet;
use std::{future::Future, pin::Pin};
use tracing::{debug, info};

/// A facade over the Qdrant client holding the target collection name and
/// distance function.
pub struct QdrantFacade {
    client: Qdrant,
    collection: String,
    distance: DistanceKind,
}

impl QdrantFacade {
    /// Creates a new facade from the given configuration.
    ///
    /// Uses the builder-based API of `qdrant-client` and supports optional
    /// API key authentication.
    pub fn new(cfg: &IngestConfig) -> Result<Self, IngestError> {
        cfg.validate()?;

        let mut builder = Qdrant::from_url(&cfg.qdrant_url);
        if let Some(key) = &cfg.qdrant_api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder
            .build()
            .map_err(|e| IngestError::Qdrant(e.to_string()))?;

        Ok(Self {
            client,
            collection: cfg.collection.clone(),
            distance: cfg.distance,
        })
    }

    async fn ensure_collection_impl(&self, space: &VectorSpace) -> Result<(), IngestError> {
        let exists = self
            .client
            .collection_exists(&self.collection)
            .await
            .map_err(|e| IngestError::Qdrant(e.to_string()))?;
        if exists {
            debug!("collection '{}' already exists", self.collection);
            return Ok(());
        }

        let distance = match self.distance {
            DistanceKind::Cosine => Distance::Cosine,
            DistanceKind::Dot => Distance::Dot,
            DistanceKind::Euclid => Distance::Euclid,
        };

        info!(
            "creating collection '{}' size={} distance={:?}",
            self.collection, space.size, distance
        );
        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection)
                    .vectors_config(VectorParamsBuilder::new(space.size as u64, distance)),
            )
            .await
            .map_err(|e| IngestError::Qdrant(e.to_string()))?;
        Ok(())
    }

    async fn existing_ids_impl(&self, ids: &[u64]) -> Result<HashSet<u64>, IngestError> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }

        let point_ids: Vec<PointId> = ids.iter().map(|&id| PointId::from(id)).collect();
        let res = self
            .client
            .get_points(
                GetPointsBuilder::new(&self.collection, point_ids)
                    .with_payload(false)
                    .with_vectors(false),
            )
            .await
            .map_err(|e| IngestError::Qdrant(e.to_string()))?;

        let mut out = HashSet::with_capacity(res.result.len());
        for point in res.result {
            if let Some(PointIdOptions::Num(id)) =
                point.id.and_then(|p| p.point_id_options)
            {
                out.insert(id);
            }
        }
        debug!("{} of {} ids already stored", out.len(), ids.len());
        Ok(out)
    }

    async fn upsert_impl(&self, points: Vec<PointStruct>) -> Result<(), IngestError> {
        if points.is_empty() {
            debug!("no points provided for upsert");
            return Ok(());
        }

        info!(
            "upserting {} points into collection '{}'",
            points.len(),
            self.collection
        );
        // wait=true: the batch is reported stored only once committed.
        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
            .await
            .map_err(|e| IngestError::Qdrant(e.to_string()))?;
        Ok(())
    }

    /// Nearest-neighbor search returning `(score, payload)` tuples.
    pub async fn search(
        &self,
        vector: Vec<f32>,
        limit: u64,
    ) -> Result<Vec<(f32, serde_json::Value)>, IngestError> {
        let res = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, vector, limit).with_payload(true),
            )
            .await
            .map_err(|e| IngestError::Qdrant(e.to_string()))?;

        let mut out = Vec::with_capacity(res.result.len());
        for hit in res.result {
            out.push((hit.score, qpayload_to_json(hit.payload)));
        }
        Ok(out)
    }
}

impl CaseIndex for QdrantFacade {
    fn ensure_collection<'a>(
        &'a self,
        space: &'a VectorSpace,
    ) -> Pin<Box<dyn Future<Output = Result<(), IngestError>> + Send + 'a>> {
        Box::pin(self.ensure_collection_impl(space))
    }

    fn existing_ids<'a>(
        &'a self,
        ids: &'a [u64],
    ) -> Pin<Box<dyn Future<Output = Result<HashSet<u64>, IngestError>> + Send + 'a>> {
        Box::pin(self.existing_ids_impl(ids))
    }

    fn upsert<'a>(
        &'a self,
        points: Vec<PointStruct>,
    ) -> Pin<Box<dyn Future<Output = Result<(), IngestError>> + Send + 'a>> {
        Box::pin(self.upsert_impl(points))
    }
}

/// Converts a Qdrant payload map into JSON, recursing into nested
/// structs/lists (case payloads nest jurisdiction and court objects).
fn qpayload_to_json(p: std::collections::HashMap<String, QValue>) -> serde_json::Value {
    let mut m = serde_json::Map::new();
    for (k, v) in p {
        m.insert(k, qvalue_to_json(v));
    }
    serde_json::Value::Object(m)
}

fn qvalue_to_json(v: QValue) -> serde_json::Value {
    use qdrant_client::qdrant::value::Kind as K;
    match v.kind {
        Some(K::StringValue(s)) => serde_json::Value::String(s),
        Some(K::IntegerValue(i)) => serde_json::Value::Number(i.into()),
        Some(K::DoubleValue(f)) => serde_json::json!(f),
        Some(K::BoolValue(b)) => serde_json::Value::Bool(b),
        Some(K::ListValue(list)) => {
            serde_json::Value::Array(list.values.into_iter().map(qvalue_to_json).collect())
        }
        Some(K::StructValue(st)) => {
            let mut m = serde_json::Map::new();
            for (k, v) in st.fields {
                m.insert(k, qvalue_to_json(v));
            }
            serde_json::Value::Object(m)
        }
        Some(K::NullValue(_)) | None => serde_json::Value::Null,
    }
}
