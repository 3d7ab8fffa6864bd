//! Core data models used by the library.
//!
//! The case record shapes follow the bulk caselaw export format: one JSON
//! document per case, with court/jurisdiction metadata and an ordered list of
//! opinions inside the case body.

use serde::{Deserialize, Serialize};

/// Court metadata attached to a case record.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CourtMeta {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub name_abbreviation: String,
}

/// Jurisdiction metadata attached to a case record.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Jurisdiction {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub name_long: String,
}

/// A single citation, e.g. `{ "type": "official", "cite": "8 Cal. App. 5th Supp. 1" }`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Citation {
    #[serde(rename = "type")]
    pub kind: String,
    pub cite: String,
}

/// A distinct textual ruling within one case, tagged with a type such as
/// "majority" or "dissent".
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Opinion {
    #[serde(default)]
    pub text: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub author: Option<String>,
}

/// The case body: an ordered list of opinions.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CaseBody {
    #[serde(default)]
    pub opinions: Vec<Opinion>,
}

/// One judicial decision's full metadata plus its opinions, as downloaded.
///
/// Case ids are globally unique across the corpus and serve as the join key
/// between every pipeline stage and the dedup check against the store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CaseRecord {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub name_abbreviation: String,
    #[serde(default)]
    pub decision_date: String,
    pub court: CourtMeta,
    #[serde(default)]
    pub citations: Vec<Citation>,
    #[serde(default)]
    pub file_name: String,
    pub jurisdiction: Jurisdiction,
    #[serde(default)]
    pub first_page: String,
    #[serde(default)]
    pub last_page: String,
    #[serde(default)]
    pub casebody: CaseBody,
}

/// A case whose canonical opinion passed selection and the content filter.
///
/// `text` is non-empty, at least 5 line segments and 150 characters;
/// `opinion_kind` is drawn from the record's own opinion list.
#[derive(Clone, Debug)]
pub struct LoadedCase {
    pub case: CaseRecord,
    pub opinion_kind: String,
    pub text: String,
}

/// A loaded case paired with its embedding vector.
#[derive(Clone, Debug)]
pub struct EncodedCase {
    pub case: LoadedCase,
    pub vector: Vec<f32>,
}

// ---- bulk-export volume metadata (used by the fetcher) ----

/// One reporter series inside a jurisdiction manifest.
#[derive(Clone, Debug, Deserialize)]
pub struct Reporter {
    pub id: i64,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub short_name: String,
    pub slug: String,
}

/// A jurisdiction manifest (`Jurisdiction.*.json`) listing its reporters.
#[derive(Clone, Debug, Deserialize)]
pub struct JurisdictionManifest {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub name_long: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub reporters: Vec<Reporter>,
}

/// Reference to a jurisdiction by id inside a volume entry.
#[derive(Clone, Debug, Deserialize)]
pub struct JurisdictionRef {
    pub id: i64,
}

/// One reporter volume from `VolumesMetadata.json`.
#[derive(Clone, Debug, Deserialize)]
pub struct ReporterVolume {
    #[serde(default)]
    pub volume_number: String,
    #[serde(default)]
    pub reporter_slug: String,
    #[serde(default)]
    pub jurisdictions: Vec<JurisdictionRef>,
}
