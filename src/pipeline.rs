//! Pipeline Driver: iterates volume archives and orchestrates
//! load → dedup → embed → write, with per-case progress accounting.
//!
//! Archives are processed strictly one at a time; within an archive every
//! case file is loaded before the single batched embedding call. No archive
//! or case failure terminates the run.

use crate::archive::{CaseArchive, archive_label, volume_archives};
use crate::assembler::dedup_against_store;
use crate::config::{IngestConfig, VectorSpace};
use crate::embed::EmbeddingsProvider;
use crate::errors::IngestError;
use crate::index::CaseIndex;
use crate::loader::{self, OpinionRanking};
use crate::record::{EncodedCase, LoadedCase};

use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::{info, warn};

/// End-of-run accounting, reported to the operator.
#[derive(Clone, Copy, Debug, Default)]
pub struct PipelineReport {
    /// Every case file seen across all archives, whatever its outcome.
    pub processed: u64,
    /// Cases excluded before embedding because their id was already stored.
    pub skipped: u64,
    /// Points durably written during this run.
    pub stored: u64,
    /// Archives that failed to open and were passed over.
    pub bad_archives: u64,
}

/// Runs the full ingestion over every archive under the downloads directory.
pub async fn run(
    cfg: &IngestConfig,
    index: &dyn CaseIndex,
    provider: &dyn EmbeddingsProvider,
    ranking: &OpinionRanking,
) -> Result<PipelineReport, IngestError> {
    let archives = volume_archives(cfg.downloads_dir())?;
    info!("ingesting {} volume archives", archives.len());

    index
        .ensure_collection(&VectorSpace {
            size: provider.dim(),
            distance: cfg.distance,
        })
        .await?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {pos} cases  {msg}")
            .expect("static progress template"),
    );

    let mut report = PipelineReport::default();
    for path in &archives {
        pb.set_message(archive_label(path));
        if let Err(e) = ingest_archive(path, index, provider, ranking, &pb, &mut report).await {
            match e {
                IngestError::BadArchive(msg) => {
                    warn!("skipping bad archive: {msg}");
                    report.bad_archives += 1;
                }
                fatal => return Err(fatal),
            }
        }
    }

    pb.finish_with_message("done");
    info!(
        "run complete: processed={} skipped={} stored={} bad_archives={}",
        report.processed, report.skipped, report.stored, report.bad_archives
    );
    Ok(report)
}

/// Processes one archive end to end.
async fn ingest_archive(
    path: &Path,
    index: &dyn CaseIndex,
    provider: &dyn EmbeddingsProvider,
    ranking: &OpinionRanking,
    pb: &ProgressBar,
    report: &mut PipelineReport,
) -> Result<(), IngestError> {
    let mut archive = CaseArchive::open(path)?;

    let mut loaded: Vec<LoadedCase> = Vec::new();
    for n in 0..archive.len() {
        match archive.parse_case(n) {
            Ok(case) => {
                if let Some(l) = loader::load(case, ranking) {
                    loaded.push(l);
                }
            }
            Err(e) => warn!("{}: unreadable case entry: {e}", path.display()),
        }
        // Every case file seen advances the counter, accepted or not.
        report.processed += 1;
        pb.inc(1);
    }

    let (stored, skipped) = ingest_batch(loaded, index, provider).await?;
    report.stored += stored;
    report.skipped += skipped;
    Ok(())
}

/// Dedups, embeds, and writes one archive's accepted cases.
///
/// Returns `(stored, skipped)`. An empty post-dedup batch skips the
/// embedding call entirely.
pub async fn ingest_batch(
    cases: Vec<LoadedCase>,
    index: &dyn CaseIndex,
    provider: &dyn EmbeddingsProvider,
) -> Result<(u64, u64), IngestError> {
    let (fresh, skipped) = dedup_against_store(index, cases).await?;
    if fresh.is_empty() {
        return Ok((0, skipped as u64));
    }

    let texts: Vec<String> = fresh.iter().map(|c| c.text.clone()).collect();
    let vectors = provider.embed_batch(&texts).await?;
    if vectors.len() != fresh.len() {
        return Err(IngestError::Embedding(format!(
            "batch returned {} vectors for {} texts",
            vectors.len(),
            fresh.len()
        )));
    }

    let want = provider.dim();
    // Positional zip: batch order is preserved end to end.
    let mut encoded = Vec::with_capacity(fresh.len());
    for (case, vector) in fresh.into_iter().zip(vectors) {
        if vector.len() != want {
            return Err(IngestError::VectorSizeMismatch {
                got: vector.len(),
                want,
            });
        }
        encoded.push(EncodedCase { case, vector });
    }

    let stored = encoded.len() as u64;
    crate::writer::persist(index, encoded).await?;
    Ok((stored, skipped as u64))
}
