//! Persists representatives: one `<i>.json` snapshot tree per cluster plus a
//! `summary.json` manifest.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use replayscope_cluster_sampler::{viewer_url, Representative, RepresentativeSummary};
use replayscope_core_types::RunId;

use crate::errors::{PipelineError, PipelineResult};
use crate::metrics::RunStats;
use crate::pipeline::RunOutcome;

pub const SUMMARY_FILE: &str = "summary.json";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: RunId,
    pub created_at: DateTime<Utc>,
    pub seed: u64,
    pub viewer_url: String,
    pub stats: RunStats,
    pub representatives: Vec<ManifestEntry>,
    /// Compact list handed to the viewer.
    pub summaries: Vec<RepresentativeSummary>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub file: String,
    pub cluster: usize,
    pub cluster_size: usize,
    pub session: String,
    pub url: String,
    pub timestamp: i64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WrittenOutput {
    pub snapshots: Vec<PathBuf>,
    pub summary: Option<PathBuf>,
}

pub fn summaries(representatives: &[Representative]) -> Vec<RepresentativeSummary> {
    representatives.iter().map(Representative::summary).collect()
}

pub fn manifest(outcome: &RunOutcome, viewer_base_url: &str) -> PipelineResult<RunManifest> {
    let summaries = summaries(&outcome.representatives);
    let viewer = viewer_url(viewer_base_url, &summaries)?;
    let representatives = outcome
        .representatives
        .iter()
        .enumerate()
        .map(|(index, rep)| ManifestEntry {
            file: snapshot_file_name(index),
            cluster: rep.cluster,
            cluster_size: rep.cluster_size,
            session: rep.session.to_string(),
            url: rep.url.clone(),
            timestamp: rep.timestamp,
        })
        .collect();
    Ok(RunManifest {
        run_id: outcome.run_id.clone(),
        created_at: Utc::now(),
        seed: outcome.seed,
        viewer_url: viewer.to_string(),
        stats: outcome.stats.clone(),
        representatives,
        summaries,
    })
}

fn snapshot_file_name(index: usize) -> String {
    format!("{index}.json")
}

/// Writes the representatives' snapshot trees, replacing numbered files left
/// by an earlier run, and the manifest when given.
pub fn write_outputs(
    dir: &Path,
    representatives: &[Representative],
    manifest: Option<&RunManifest>,
) -> PipelineResult<WrittenOutput> {
    fs::create_dir_all(dir).map_err(|err| PipelineError::write(dir, err))?;
    clear_previous(dir).map_err(|err| PipelineError::write(dir, err))?;

    let mut snapshots = Vec::with_capacity(representatives.len());
    for (index, rep) in representatives.iter().enumerate() {
        let path = dir.join(snapshot_file_name(index));
        let data = serde_json::to_vec(rep.snapshot.as_ref()).map_err(|err| {
            PipelineError::Encode {
                what: "snapshot",
                reason: err.to_string(),
            }
        })?;
        let path = write_atomic(path.clone(), &data).map_err(|err| PipelineError::write(path, err))?;
        debug!(path = %path.display(), cluster = rep.cluster, "representative written");
        snapshots.push(path);
    }

    let summary = match manifest {
        Some(manifest) => {
            let path = dir.join(SUMMARY_FILE);
            let data = serde_json::to_vec_pretty(manifest).map_err(|err| PipelineError::Encode {
                what: "summary",
                reason: err.to_string(),
            })?;
            Some(write_atomic(path.clone(), &data).map_err(|err| PipelineError::write(path, err))?)
        }
        None => None,
    };

    info!(dir = %dir.display(), snapshots = snapshots.len(), "outputs written");
    Ok(WrittenOutput { snapshots, summary })
}

fn clear_previous(dir: &Path) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(stem) = name.to_str().and_then(|n| n.strip_suffix(".json")) else {
            continue;
        };
        if !stem.is_empty() && stem.bytes().all(|b| b.is_ascii_digit()) {
            fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}

fn write_atomic(path: PathBuf, data: &[u8]) -> io::Result<PathBuf> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&tmp)?;
    file.write_all(data)?;
    file.sync_all()?;
    fs::rename(tmp, &path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use replayscope_core_types::SessionId;
    use replayscope_dom_vector::SnapshotNode;
    use tempfile::tempdir;

    fn rep(cluster: usize, tag: &str) -> Representative {
        Representative {
            cluster,
            cluster_size: 1,
            corpus_index: cluster,
            session: SessionId::new(format!("s{cluster}")),
            url: format!("https://replays.test/{cluster}"),
            timestamp: 100 + cluster as i64,
            snapshot: Arc::new(SnapshotNode::element(tag)),
        }
    }

    #[test]
    fn writes_numbered_snapshots_and_removes_stale_ones() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("7.json"), b"{}").unwrap();
        fs::write(dir.path().join("notes.json"), b"{}").unwrap();

        let written = write_outputs(dir.path(), &[rep(0, "main"), rep(1, "nav")], None).unwrap();
        assert_eq!(written.snapshots.len(), 2);
        assert!(written.summary.is_none());
        assert!(!dir.path().join("7.json").exists());
        assert!(dir.path().join("notes.json").exists());

        let raw = fs::read_to_string(dir.path().join("1.json")).unwrap();
        let node: SnapshotNode = serde_json::from_str(&raw).unwrap();
        assert_eq!(node.tag(), Some("nav"));
    }

    #[test]
    fn atomic_write_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let path = write_atomic(dir.path().join("nested/0.json"), b"[]").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"[]");
        assert!(!dir.path().join("nested/0.json.tmp").exists());
    }
}
