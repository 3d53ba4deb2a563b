//! Filesystem session source and bounded-concurrency loading.
//!
//! A session directory holds one file per session, `<id>.json` or the zstd
//! compressed `<id>.json.zst`. A file is either an envelope
//! `{"url": "...", "events": [...]}` or a bare array of recorded events.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};
use url::Url;

use replayscope_backdrop_corpus::{
    RecordedEvent, SessionRecord, SessionSource, SourceError, SourceResult,
};
use replayscope_core_types::SessionId;

use crate::metrics::LoadCounters;
use crate::stack::spawn_deep;

const PLAIN_SUFFIX: &str = ".json";
const ZSTD_SUFFIX: &str = ".json.zst";

#[derive(Deserialize)]
#[serde(untagged)]
enum SessionFile {
    Events(Vec<RecordedEvent>),
    Envelope {
        #[serde(default)]
        url: Option<String>,
        events: Vec<RecordedEvent>,
    },
}

impl SessionFile {
    fn into_parts(self) -> (Option<String>, Vec<RecordedEvent>) {
        match self {
            SessionFile::Envelope { url, events } => (url, events),
            SessionFile::Events(events) => (None, events),
        }
    }
}

#[derive(Clone, Debug)]
pub struct FsSessionSource {
    root: PathBuf,
}

impl FsSessionSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn session_id(file_name: &str) -> Option<&str> {
        file_name
            .strip_suffix(ZSTD_SUFFIX)
            .or_else(|| file_name.strip_suffix(PLAIN_SUFFIX))
            .filter(|id| !id.is_empty())
    }

    async fn locate(&self, id: &SessionId) -> Option<PathBuf> {
        for suffix in [PLAIN_SUFFIX, ZSTD_SUFFIX] {
            let path = self.root.join(format!("{}{}", id.as_str(), suffix));
            if tokio::fs::metadata(&path).await.is_ok() {
                return Some(path);
            }
        }
        None
    }

    /// Playback URL used when the file carries none: the file itself.
    async fn file_url(path: &Path) -> Option<String> {
        let absolute = tokio::fs::canonicalize(path).await.ok()?;
        Url::from_file_path(absolute).ok().map(String::from)
    }
}

fn decode_file(path: &Path, bytes: Vec<u8>) -> Result<SessionFile, String> {
    let raw = if path.to_string_lossy().ends_with(ZSTD_SUFFIX) {
        zstd::stream::decode_all(bytes.as_slice()).map_err(|err| format!("zstd: {err}"))?
    } else {
        bytes
    };
    // Recorded trees routinely nest deeper than serde_json's default limit.
    let mut de = serde_json::Deserializer::from_slice(&raw);
    de.disable_recursion_limit();
    let file = SessionFile::deserialize(&mut de).map_err(|err| format!("json: {err}"))?;
    de.end().map_err(|err| format!("json: {err}"))?;
    Ok(file)
}

#[async_trait]
impl SessionSource for FsSessionSource {
    async fn list(&self) -> SourceResult<Vec<SessionId>> {
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let name = entry.file_name();
            let Some(id) = name.to_str().and_then(Self::session_id) else {
                continue;
            };
            ids.push(SessionId::new(id));
        }
        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    /// Unreadable or undecodable files yield a record without events.
    async fn load(&self, id: &SessionId) -> SourceResult<SessionRecord> {
        let Some(path) = self.locate(id).await else {
            return Err(SourceError::NotFound(id.clone()));
        };
        let fallback_url = Self::file_url(&path).await;

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(session = %id, path = %path.display(), %err, "failed to read session file");
                return Ok(SessionRecord::failed(id.clone(), fallback_url));
            }
        };

        let decode_path = path.clone();
        let decoded =
            spawn_deep("replayscope-decode", move || decode_file(&decode_path, bytes)).await?;

        match decoded {
            Ok(file) => {
                let (url, events) = file.into_parts();
                debug!(session = %id, events = events.len(), "session loaded");
                Ok(SessionRecord::new(id.clone(), url.or(fallback_url), events))
            }
            Err(reason) => {
                warn!(session = %id, path = %path.display(), %reason, "failed to decode session file");
                Ok(SessionRecord::failed(id.clone(), fallback_url))
            }
        }
    }

    fn describe(&self) -> String {
        format!("directory {}", self.root.display())
    }
}

/// Loads `ids` with at most `concurrency` loads in flight. Records come back
/// sorted by session id; a load error becomes a record without events.
pub async fn load_all(
    source: Arc<dyn SessionSource>,
    ids: Vec<SessionId>,
    concurrency: usize,
    counters: &LoadCounters,
) -> SourceResult<Vec<SessionRecord>> {
    if concurrency == 0 {
        return Err(SourceError::Internal("concurrency must be > 0".into()));
    }
    let limit = Arc::new(Semaphore::new(concurrency));
    let mut join_set = JoinSet::new();

    for id in ids {
        let source = Arc::clone(&source);
        let limit = Arc::clone(&limit);
        join_set.spawn(async move {
            let permit = match limit.acquire_owned().await {
                Ok(permit) => permit,
                Err(err) => {
                    return SourceResult::Err(SourceError::Internal(format!(
                        "load cancelled: {err}"
                    )))
                }
            };
            let record = match source.load(&id).await {
                Ok(record) => record,
                Err(err) => {
                    warn!(session = %id, %err, "session load failed");
                    SessionRecord::failed(id, None)
                }
            };
            drop(permit);
            SourceResult::Ok(record)
        });
    }

    let mut records = Vec::new();
    while let Some(result) = join_set.join_next().await {
        let record: SessionRecord =
            result.map_err(|err| SourceError::Internal(err.to_string()))??;
        if record.is_decoded() {
            counters.record_loaded();
        } else {
            counters.record_failed();
        }
        records.push(record);
    }
    records.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_map_to_session_ids() {
        assert_eq!(FsSessionSource::session_id("abc.json"), Some("abc"));
        assert_eq!(FsSessionSource::session_id("abc.json.zst"), Some("abc"));
        assert_eq!(FsSessionSource::session_id(".json"), None);
        assert_eq!(FsSessionSource::session_id("notes.txt"), None);
    }

    #[test]
    fn bare_arrays_and_envelopes_both_decode() {
        let bare = br#"[{"type":4,"timestamp":1,"data":{}}]"#.to_vec();
        let (url, events) = decode_file(Path::new("a.json"), bare).unwrap().into_parts();
        assert!(url.is_none());
        assert_eq!(events.len(), 1);

        let envelope = br#"{"url":"https://r.test/1","events":[]}"#.to_vec();
        let (url, events) = decode_file(Path::new("b.json"), envelope)
            .unwrap()
            .into_parts();
        assert_eq!(url.as_deref(), Some("https://r.test/1"));
        assert!(events.is_empty());
    }

    #[test]
    fn zstd_files_are_decompressed() {
        let raw = br#"{"events":[{"type":2,"timestamp":5,"data":{}}]}"#;
        let packed = zstd::stream::encode_all(&raw[..], 3).unwrap();
        let (_, events) = decode_file(Path::new("c.json.zst"), packed)
            .unwrap()
            .into_parts();
        assert_eq!(events[0].timestamp, 5);
    }
}
