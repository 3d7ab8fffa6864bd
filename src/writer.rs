//! Ingestion Writer: converts encoded cases into Qdrant points and performs
//! one batched, acknowledged upsert per archive.

use crate::errors::IngestError;
use crate::index::CaseIndex;
use crate::record::EncodedCase;

use qdrant_client::qdrant::{
    ListValue, PointStruct, Struct, Value as QValue, Vector, Vectors, value, vectors,
};
use std::collections::HashMap;
use tracing::debug;

/// Builds Qdrant points for a batch of encoded cases.
///
/// The point id is the case id, which is the sole idempotence mechanism:
/// upsert-by-id tolerates an accidental re-submission.
///
/// # Errors
/// Returns `IdOutOfRange` for a case id that does not fit the signed
/// integer payload field.
pub fn build_points(encoded: &[EncodedCase]) -> Result<Vec<PointStruct>, IngestError> {
    let mut pts = Vec::with_capacity(encoded.len());

    for e in encoded {
        let case = &e.case.case;
        let case_id =
            i64::try_from(case.id).map_err(|_| IngestError::IdOutOfRange(case.id))?;

        let mut payload: HashMap<String, QValue> = HashMap::new();
        payload.insert("case_id".into(), qint(case_id));
        payload.insert("date".into(), qstring(&case.decision_date));

        let cites: Vec<QValue> = case.citations.iter().map(|c| qstring(&c.cite)).collect();
        payload.insert(
            "citations".into(),
            QValue {
                kind: Some(value::Kind::ListValue(ListValue { values: cites })),
            },
        );

        payload.insert(
            "jurisdiction".into(),
            json_to_qvalue(serde_json::json!(case.jurisdiction)),
        );
        payload.insert("court".into(), json_to_qvalue(serde_json::json!(case.court)));
        payload.insert("first_page".into(), qstring(&case.first_page));
        payload.insert("last_page".into(), qstring(&case.last_page));
        payload.insert("file_name".into(), qstring(&case.file_name));
        payload.insert("name_short".into(), qstring(&case.name_abbreviation));
        payload.insert("name".into(), qstring(&case.name));
        payload.insert("opinion_type".into(), qstring(&e.case.opinion_kind));

        let vectors = Vectors {
            vectors_options: Some(vectors::VectorsOptions::Vector(Vector {
                data: e.vector.clone(),
                indices: None,
                vectors_count: None,
                vector: None,
            })),
        };

        pts.push(PointStruct {
            id: Some(case.id.into()),
            payload,
            vectors: Some(vectors),
            ..Default::default()
        });
    }

    Ok(pts)
}

/// Upserts the whole batch in one acknowledged call.
pub async fn persist(index: &dyn CaseIndex, encoded: Vec<EncodedCase>) -> Result<(), IngestError> {
    debug!("persisting {} encoded cases", encoded.len());
    let points = build_points(&encoded)?;
    index.upsert(points).await
}

/// Wraps a string into a Qdrant `Value`.
fn qstring(s: &str) -> QValue {
    QValue {
        kind: Some(value::Kind::StringValue(s.to_string())),
    }
}

/// Wraps an integer into a Qdrant `Value`.
fn qint(i: i64) -> QValue {
    QValue {
        kind: Some(value::Kind::IntegerValue(i)),
    }
}

/// Converts `serde_json::Value` into Qdrant `Value` (handles arrays/objects).
fn json_to_qvalue(v: serde_json::Value) -> QValue {
    use value::Kind as K;
    match v {
        serde_json::Value::String(s) => QValue {
            kind: Some(K::StringValue(s)),
        },
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                QValue {
                    kind: Some(K::IntegerValue(i)),
                }
            } else if let Some(f) = n.as_f64() {
                QValue {
                    kind: Some(K::DoubleValue(f)),
                }
            } else {
                QValue {
                    kind: Some(K::StringValue(n.to_string())),
                }
            }
        }
        serde_json::Value::Bool(b) => QValue {
            kind: Some(K::BoolValue(b)),
        },
        serde_json::Value::Array(arr) => {
            let vals: Vec<QValue> = arr.into_iter().map(json_to_qvalue).collect();
            QValue {
                kind: Some(K::ListValue(ListValue { values: vals })),
            }
        }
        serde_json::Value::Object(map) => {
            let fields = map
                .into_iter()
                .map(|(k, v)| (k, json_to_qvalue(v)))
                .collect();
            QValue {
                kind: Some(K::StructValue(Struct { fields })),
            }
        }
        serde_json::Value::Null => QValue { kind: None },
    }
}
