use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use replayscope_dom_vector::SnapshotNode;

/// Recorder event categories, keyed by the numeric `type` field.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EventKind {
    DomContentLoaded,
    Load,
    FullSnapshot,
    IncrementalSnapshot,
    Meta,
    Custom,
    Plugin,
    Other(u64),
}

impl EventKind {
    pub fn from_code(code: u64) -> Self {
        match code {
            0 => Self::DomContentLoaded,
            1 => Self::Load,
            2 => Self::FullSnapshot,
            3 => Self::IncrementalSnapshot,
            4 => Self::Meta,
            5 => Self::Custom,
            6 => Self::Plugin,
            other => Self::Other(other),
        }
    }

    pub fn code(&self) -> u64 {
        match self {
            Self::DomContentLoaded => 0,
            Self::Load => 1,
            Self::FullSnapshot => 2,
            Self::IncrementalSnapshot => 3,
            Self::Meta => 4,
            Self::Custom => 5,
            Self::Plugin => 6,
            Self::Other(code) => *code,
        }
    }
}

/// One event of a decoded session recording.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordedEvent {
    #[serde(rename = "type")]
    pub kind_code: u64,
    #[serde(default)]
    pub data: Value,
    pub timestamp: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RecordedEvent {
    pub fn new(kind: EventKind, timestamp: i64, data: Value) -> Self {
        Self {
            kind_code: kind.code(),
            data,
            timestamp,
            extra: Map::new(),
        }
    }

    /// Full snapshot event wrapping `node`.
    pub fn full_snapshot(timestamp: i64, node: &SnapshotNode) -> Self {
        let node = serde_json::to_value(node).unwrap_or(Value::Null);
        let mut data = Map::new();
        data.insert("node".into(), node);
        Self::new(EventKind::FullSnapshot, timestamp, Value::Object(data))
    }

    pub fn kind(&self) -> EventKind {
        EventKind::from_code(self.kind_code)
    }

    pub fn is_full_snapshot(&self) -> bool {
        self.kind() == EventKind::FullSnapshot
    }

    /// Moves the embedded snapshot tree out of a full snapshot payload.
    pub fn take_snapshot(self) -> Result<SnapshotNode, String> {
        match self.data {
            Value::Object(mut map) => match map.remove("node") {
                Some(node) => serde_json::from_value(node).map_err(|err| err.to_string()),
                None => Err("payload has no `node` field".to_string()),
            },
            other => Err(format!("payload is not an object: {other}")),
        }
    }
}
