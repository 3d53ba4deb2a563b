use std::sync::Arc;

use serde::{Deserialize, Serialize};

use replayscope_core_types::SessionId;
use replayscope_dom_vector::{FeatureVector, SnapshotNode};

use crate::events::RecordedEvent;

/// One vectorized full snapshot at a point of a session's timeline.
#[derive(Clone, Debug, PartialEq)]
pub struct Backdrop {
    pub timestamp: i64,
    pub vector: FeatureVector,
    pub snapshot: Arc<SnapshotNode>,
}

/// Upstream view of one session. `events` is `None` when fetch or decode failed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: SessionId,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub events: Option<Vec<RecordedEvent>>,
}

impl SessionRecord {
    pub fn new(id: impl Into<SessionId>, url: Option<String>, events: Vec<RecordedEvent>) -> Self {
        Self {
            id: id.into(),
            url,
            events: Some(events),
        }
    }

    /// Record for a session whose recording could not be obtained.
    pub fn failed(id: impl Into<SessionId>, url: Option<String>) -> Self {
        Self {
            id: id.into(),
            url,
            events: None,
        }
    }

    pub fn is_decoded(&self) -> bool {
        self.events.is_some()
    }
}

/// Backdrops extracted from one session, still carrying unpadded vectors.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionBackdrops {
    pub session: SessionId,
    pub url: Option<String>,
    pub backdrops: Vec<Backdrop>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CorpusEntry {
    pub session: SessionId,
    pub url: String,
    pub backdrop: Backdrop,
}

impl CorpusEntry {
    pub fn vector(&self) -> &[u32] {
        self.backdrop.vector.as_slice()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyStats {
    pub sessions: usize,
    pub sessions_without_url: usize,
    pub backdrops: usize,
}

/// Flat backdrop collection whose vectors all have length `dimension`.
///
/// Only [`crate::CorpusAssembler::finish`] builds one, so a `Corpus` is always
/// padded.
#[derive(Clone, Debug, PartialEq)]
pub struct Corpus {
    pub(crate) entries: Vec<CorpusEntry>,
    pub(crate) dimension: usize,
    pub(crate) stats: AssemblyStats,
}

impl Corpus {
    pub fn entries(&self) -> &[CorpusEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&CorpusEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn stats(&self) -> &AssemblyStats {
        &self.stats
    }

    pub fn vectors(&self) -> Vec<&[u32]> {
        self.entries.iter().map(CorpusEntry::vector).collect()
    }

    pub fn into_entries(self) -> Vec<CorpusEntry> {
        self.entries
    }
}
