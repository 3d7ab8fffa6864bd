//! Resumable bulk-archive fetcher.
//!
//! Enumerates reporter volumes from the jurisdiction manifests and
//! `VolumesMetadata.json` in the data directory, then downloads each
//! `<reporter_slug>/<volume>.zip` from the bulk endpoint. Partial downloads
//! land in a `.zip.dl` sidecar and resume via byte-range requests; the
//! sidecar is renamed into place only once complete.

use crate::config::IngestConfig;
use crate::errors::IngestError;
use crate::record::{JurisdictionManifest, ReporterVolume};

use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::StatusCode;
use reqwest::header::RANGE;
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info, warn};

/// Bulk caselaw export endpoint.
const BULK_BASE_URL: &str = "https://static.case.law";

/// End-of-run accounting for the fetcher.
#[derive(Clone, Copy, Debug, Default)]
pub struct FetchReport {
    pub downloaded: u64,
    pub skipped: u64,
}

/// Downloads every volume of the configured jurisdictions, skipping volumes
/// already present on disk.
pub async fn fetch_volumes(cfg: &IngestConfig) -> Result<FetchReport, IngestError> {
    let volumes = planned_volumes(&cfg.data_dir)?;
    info!("{} volumes to consider", volumes.len());

    let client = reqwest::Client::builder().build()?;
    let downloads = cfg.downloads_dir();

    let pb = ProgressBar::new(volumes.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
            .expect("static progress template"),
    );

    let mut report = FetchReport::default();
    for vol in &volumes {
        pb.set_message(format!("{}/{}", vol.reporter_slug, vol.volume_number));
        match download_volume(&client, BULK_BASE_URL, vol, &downloads).await {
            Ok(true) => report.downloaded += 1,
            Ok(false) => report.skipped += 1,
            // One unreachable volume never aborts the fetch run.
            Err(e) => warn!(
                "{}/{}: download failed: {e}",
                vol.reporter_slug, vol.volume_number
            ),
        }
        pb.inc(1);
    }

    pb.finish_with_message("done");
    info!(
        "fetch complete: downloaded={} skipped={}",
        report.downloaded, report.skipped
    );
    Ok(report)
}

/// Reads `Jurisdiction.*.json` manifests and filters `VolumesMetadata.json`
/// down to volumes belonging to those jurisdictions.
pub fn planned_volumes(data_dir: &Path) -> Result<Vec<ReporterVolume>, IngestError> {
    let mut jurisdiction_ids: HashSet<i64> = HashSet::new();
    for entry in std::fs::read_dir(data_dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with("Jurisdiction.") && name.ends_with(".json") {
            let manifest: JurisdictionManifest =
                serde_json::from_reader(File::open(entry.path())?)?;
            jurisdiction_ids.insert(manifest.id);
        }
    }
    if jurisdiction_ids.is_empty() {
        return Err(IngestError::Config(format!(
            "no Jurisdiction.*.json manifests under {}",
            data_dir.display()
        )));
    }

    let volumes_file = data_dir.join("VolumesMetadata.json");
    let all: Vec<ReporterVolume> = serde_json::from_reader(File::open(&volumes_file)?)?;

    let planned: Vec<ReporterVolume> = all
        .into_iter()
        .filter(|v| v.jurisdictions.iter().any(|j| jurisdiction_ids.contains(&j.id)))
        .collect();
    debug!("{} volumes match the configured jurisdictions", planned.len());
    Ok(planned)
}

/// Fetches one volume archive. Returns `false` when it is already on disk.
async fn download_volume(
    client: &reqwest::Client,
    base_url: &str,
    vol: &ReporterVolume,
    downloads_dir: &Path,
) -> Result<bool, IngestError> {
    let output_path = downloads_dir
        .join(&vol.reporter_slug)
        .join(format!("{}.zip", vol.volume_number));
    if output_path.exists() {
        return Ok(false);
    }
    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let sidecar = downloads_dir
        .join(&vol.reporter_slug)
        .join(format!("{}.zip.dl", vol.volume_number));
    let resume_from = match std::fs::metadata(&sidecar) {
        Ok(meta) => meta.len(),
        Err(_) => 0,
    };

    let url = format!("{base_url}/{}/{}.zip", vol.reporter_slug, vol.volume_number);
    let resp = client
        .get(&url)
        .header(RANGE, format!("bytes={resume_from}-"))
        .send()
        .await?;

    // A crash between the last write and the rename leaves a complete
    // sidecar; the next range request then starts past the end and the
    // server answers 416. The sidecar is the whole volume, so finish it.
    if resp.status() == StatusCode::RANGE_NOT_SATISFIABLE && resume_from > 0 {
        debug!("sidecar for {url} already complete, renaming into place");
        std::fs::rename(&sidecar, &output_path)?;
        return Ok(true);
    }
    let resp = resp.error_for_status()?;

    // A server ignoring the range replies 200 with the full body; restart
    // the sidecar from scratch in that case.
    let mut output = if resp.status() == StatusCode::PARTIAL_CONTENT && resume_from > 0 {
        debug!("resuming {url} at byte {resume_from}");
        OpenOptions::new().append(true).open(&sidecar)?
    } else {
        File::create(&sidecar)?
    };

    let mut stream = resp.bytes_stream();
    while let Some(chunk) = stream.next().await {
        output.write_all(&chunk?)?;
    }
    output.flush()?;
    drop(output);

    std::fs::rename(&sidecar, &output_path)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("case-vec-download-tests").join(name);
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn volumes_filtered_by_jurisdiction() {
        let dir = scratch("plan");
        std::fs::write(
            dir.join("Jurisdiction.cal.json"),
            r#"{"id": 30, "name": "Cal.", "name_long": "California", "slug": "cal",
                "reporters": [{"id": 1, "full_name": "California Reports",
                               "short_name": "Cal.", "slug": "cal"}]}"#,
        )
        .unwrap();
        std::fs::write(
            dir.join("VolumesMetadata.json"),
            r#"[
                {"volume_number": "1", "reporter_slug": "cal",
                 "jurisdictions": [{"id": 30}]},
                {"volume_number": "2", "reporter_slug": "us",
                 "jurisdictions": [{"id": 39}]},
                {"volume_number": "3", "reporter_slug": "cal-2d",
                 "jurisdictions": [{"id": 30}, {"id": 39}]}
            ]"#,
        )
        .unwrap();

        let planned = planned_volumes(&dir).unwrap();
        let slugs: Vec<&str> = planned.iter().map(|v| v.reporter_slug.as_str()).collect();
        assert_eq!(slugs, vec!["cal", "cal-2d"]);
    }

    /// One-shot HTTP responder returning a fixed status line.
    async fn serve_once(response: &'static [u8]) -> std::net::SocketAddr {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 2048];
            let _ = sock.read(&mut buf).await;
            sock.write_all(response).await.unwrap();
            let _ = sock.shutdown().await;
        });
        addr
    }

    #[tokio::test]
    async fn complete_sidecar_finishes_on_range_not_satisfiable() {
        let downloads = scratch("finish-416");
        let reporter = downloads.join("rep");
        std::fs::create_dir_all(&reporter).unwrap();
        std::fs::write(reporter.join("9.zip.dl"), b"whole volume bytes").unwrap();

        let addr = serve_once(
            b"HTTP/1.1 416 Range Not Satisfiable\r\ncontent-length: 0\r\n\r\n",
        )
        .await;

        let vol = ReporterVolume {
            volume_number: "9".into(),
            reporter_slug: "rep".into(),
            jurisdictions: vec![],
        };
        let client = reqwest::Client::new();
        let downloaded = download_volume(&client, &format!("http://{addr}"), &vol, &downloads)
            .await
            .unwrap();

        assert!(downloaded);
        assert!(!reporter.join("9.zip.dl").exists());
        assert_eq!(
            std::fs::read(reporter.join("9.zip")).unwrap(),
            b"whole volume bytes"
        );
    }

    #[test]
    fn missing_manifests_are_a_config_error() {
        let dir = scratch("empty");
        assert!(matches!(
            planned_volumes(&dir),
            Err(IngestError::Config(_))
        ));
    }
}
