//! Reporter-volume archives: ZIP containers with one JSON record per case
//! under a `json/` directory.

use crate::errors::IngestError;
use crate::record::CaseRecord;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use zip::ZipArchive;

/// An opened reporter-volume archive.
pub struct CaseArchive {
    zip: ZipArchive<File>,
    /// Entry indices of `json/<case>.json` files, in archive order.
    case_entries: Vec<usize>,
}

impl CaseArchive {
    /// Opens a volume archive and indexes its case entries.
    ///
    /// # Errors
    /// Returns [`IngestError::BadArchive`] when the container cannot be
    /// opened or read as a ZIP file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, IngestError> {
        let path = path.as_ref();
        // An unopenable container (dangling symlink, file removed after
        // enumeration) skips this archive only, like any other bad archive.
        let file = File::open(path)
            .map_err(|e| IngestError::BadArchive(format!("{}: {e}", path.display())))?;
        let mut zip = ZipArchive::new(file)
            .map_err(|e| IngestError::BadArchive(format!("{}: {e}", path.display())))?;

        let mut case_entries = Vec::new();
        for i in 0..zip.len() {
            let entry = zip
                .by_index(i)
                .map_err(|e| IngestError::BadArchive(format!("{}: {e}", path.display())))?;
            let name = entry.name();
            if !entry.is_dir() && name.starts_with("json/") && name.ends_with(".json") {
                case_entries.push(i);
            }
        }

        debug!("opened {:?}: {} case entries", path, case_entries.len());
        Ok(Self { zip, case_entries })
    }

    /// Number of case files inside the archive.
    pub fn len(&self) -> usize {
        self.case_entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.case_entries.is_empty()
    }

    /// Parses the `n`-th case entry.
    ///
    /// A malformed JSON entry inside an otherwise valid archive is not a
    /// `BadArchive`; it surfaces as a `Parse` error so the caller can skip
    /// just that case.
    pub fn parse_case(&mut self, n: usize) -> Result<CaseRecord, IngestError> {
        let idx = self.case_entries[n];
        let entry = self
            .zip
            .by_index(idx)
            .map_err(|e| IngestError::BadArchive(e.to_string()))?;
        let case = serde_json::from_reader(entry)?;
        Ok(case)
    }
}

/// Enumerates `<downloads>/<reporter_slug>/<volume>.zip`, sorted for a
/// deterministic processing order.
pub fn volume_archives(downloads_dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, IngestError> {
    let downloads_dir = downloads_dir.as_ref();
    let mut out = Vec::new();

    if !downloads_dir.exists() {
        warn!("downloads directory {:?} does not exist", downloads_dir);
        return Ok(out);
    }

    for reporter in std::fs::read_dir(downloads_dir)? {
        let reporter = reporter?;
        if !reporter.file_type()?.is_dir() {
            continue;
        }
        for entry in std::fs::read_dir(reporter.path())? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("zip") {
                out.push(path);
            }
        }
    }

    out.sort();
    debug!("found {} volume archives", out.len());
    Ok(out)
}

/// Short `reporter/volume` label for progress display.
pub fn archive_label(path: &Path) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    match path.parent().and_then(|p| p.file_name()).and_then(|s| s.to_str()) {
        Some(reporter) => format!("{reporter}/{stem}"),
        None => stem.to_string(),
    }
}
