use std::sync::Arc;

use tracing::{debug, warn};

use replayscope_dom_vector::{FeatureDictionary, SnapshotVectorizer};

use crate::events::RecordedEvent;
use crate::model::{Backdrop, SessionBackdrops, SessionRecord};

/// Vectorizes every full snapshot event, in source order.
///
/// Full snapshot events whose payload has no decodable tree are skipped.
pub fn extract_backdrops(
    events: Vec<RecordedEvent>,
    dictionary: &mut FeatureDictionary,
) -> Vec<Backdrop> {
    let mut vectorizer = SnapshotVectorizer::new(dictionary);
    let mut backdrops = Vec::new();
    for event in events.into_iter().filter(RecordedEvent::is_full_snapshot) {
        let timestamp = event.timestamp;
        let snapshot = match event.take_snapshot() {
            Ok(node) => node,
            Err(reason) => {
                warn!(timestamp, %reason, "skipping malformed full snapshot");
                continue;
            }
        };
        let vector = vectorizer.vectorize(&snapshot);
        debug!(timestamp, elements = vector.total(), "full snapshot vectorized");
        backdrops.push(Backdrop {
            timestamp,
            vector,
            snapshot: Arc::new(snapshot),
        });
    }
    backdrops
}

/// Extracts one session. Undecoded sessions and sessions without a playback
/// URL yield no backdrops and leave the dictionary untouched.
pub fn extract_session(record: SessionRecord, dictionary: &mut FeatureDictionary) -> SessionBackdrops {
    let SessionRecord { id, url, events } = record;
    let backdrops = match (events, url.is_some()) {
        (_, false) => {
            debug!(session = %id, "session has no playback url; not vectorized");
            Vec::new()
        }
        (None, true) => {
            debug!(session = %id, "session has no decoded events");
            Vec::new()
        }
        (Some(events), true) => extract_backdrops(events, dictionary),
    };
    debug!(
        session = %id,
        backdrops = backdrops.len(),
        features = dictionary.size(),
        "extracted session backdrops"
    );
    SessionBackdrops {
        session: id,
        url,
        backdrops,
    }
}
