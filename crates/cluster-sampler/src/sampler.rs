use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use tracing::warn;

use replayscope_backdrop_corpus::Corpus;
use replayscope_core_types::SessionId;
use replayscope_dom_vector::SnapshotNode;

use crate::kmeans::Partition;
use crate::summary::RepresentativeSummary;

/// The backdrop standing in for one cluster.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Representative {
    pub cluster: usize,
    pub cluster_size: usize,
    pub corpus_index: usize,
    pub session: SessionId,
    pub url: String,
    pub timestamp: i64,
    #[serde(skip_serializing)]
    pub snapshot: Arc<SnapshotNode>,
}

impl Representative {
    pub fn summary(&self) -> RepresentativeSummary {
        RepresentativeSummary {
            timestamp: self.timestamp,
            url: self.url.clone(),
        }
    }
}

/// One uniformly chosen member per non-empty cluster, in partition order.
pub fn sample_representatives<R>(
    corpus: &Corpus,
    partition: &Partition,
    rng: &mut R,
) -> Vec<Representative>
where
    R: Rng + ?Sized,
{
    partition
        .clusters
        .iter()
        .enumerate()
        .filter_map(|(cluster, members)| {
            let &corpus_index = members.choose(rng)?;
            let Some(entry) = corpus.get(corpus_index) else {
                warn!(cluster, corpus_index, "partition refers past the corpus end");
                return None;
            };
            Some(Representative {
                cluster,
                cluster_size: members.len(),
                corpus_index,
                session: entry.session.clone(),
                url: entry.url.clone(),
                timestamp: entry.backdrop.timestamp,
                snapshot: Arc::clone(&entry.backdrop.snapshot),
            })
        })
        .collect()
}
