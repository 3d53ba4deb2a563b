use tracing::{debug, info};

use replayscope_dom_vector::FeatureDictionary;

use crate::errors::{CorpusError, CorpusResult};
use crate::model::{AssemblyStats, Corpus, CorpusEntry, SessionBackdrops};

/// Collects per-session backdrops and pads them once all sessions are in.
#[derive(Debug, Default)]
pub struct CorpusAssembler {
    sessions: Vec<SessionBackdrops>,
}

impl CorpusAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, session: SessionBackdrops) {
        self.sessions.push(session);
    }

    /// Flattens the collected sessions and right-pads every vector to the
    /// dictionary's final size.
    ///
    /// Call only after every session has been vectorized against
    /// `dictionary`. Sessions without a playback URL are dropped.
    pub fn finish(self, dictionary: &FeatureDictionary) -> CorpusResult<Corpus> {
        let dimension = dictionary.size();
        let mut stats = AssemblyStats {
            sessions: self.sessions.len(),
            ..AssemblyStats::default()
        };
        let mut entries = Vec::new();

        for SessionBackdrops {
            session,
            url,
            backdrops,
        } in self.sessions
        {
            let Some(url) = url else {
                debug!(session = %session, "dropping session without playback url");
                stats.sessions_without_url += 1;
                continue;
            };
            for mut backdrop in backdrops {
                let len = backdrop.vector.len();
                if len > dimension {
                    return Err(CorpusError::VectorOverflow {
                        session,
                        len,
                        dimension,
                    });
                }
                backdrop.vector.pad_to(dimension);
                entries.push(CorpusEntry {
                    session: session.clone(),
                    url: url.clone(),
                    backdrop,
                });
            }
        }

        stats.backdrops = entries.len();
        info!(
            sessions = stats.sessions,
            backdrops = stats.backdrops,
            dimension,
            "corpus assembled"
        );
        Ok(Corpus {
            entries,
            dimension,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract_session;
    use crate::{RecordedEvent, SessionRecord};
    use replayscope_dom_vector::SnapshotNode;

    fn record(id: &str, url: Option<&str>, tags: &[&str]) -> SessionRecord {
        let node = SnapshotNode::element("body")
            .with_children(tags.iter().map(|t| SnapshotNode::element(*t)));
        SessionRecord::new(
            id,
            url.map(str::to_string),
            vec![RecordedEvent::full_snapshot(1, &node)],
        )
    }

    #[test]
    fn pads_early_vectors_to_final_dimension() {
        let mut dict = FeatureDictionary::new();
        let mut assembler = CorpusAssembler::new();
        assembler.push(extract_session(record("a", Some("ua"), &["div"]), &mut dict));
        assembler.push(extract_session(record("b", Some("ub"), &["p", "ul", "li"]), &mut dict));
        let first_len = 2;

        let corpus = assembler.finish(&dict).unwrap();
        assert_eq!(corpus.dimension(), dict.size());
        assert_eq!(corpus.len(), 2);
        for entry in corpus.entries() {
            assert_eq!(entry.vector().len(), dict.size());
        }
        let early = corpus.get(0).unwrap().vector();
        assert!(early[first_len..].iter().all(|&v| v == 0));
        assert_eq!(corpus.get(1).unwrap().url, "ub");
    }

    #[test]
    fn sessions_without_url_are_dropped() {
        let mut dict = FeatureDictionary::new();
        let mut assembler = CorpusAssembler::new();
        assembler.push(extract_session(record("a", None, &["nav"]), &mut dict));
        assembler.push(extract_session(record("b", Some("ub"), &["div"]), &mut dict));
        let corpus = assembler.finish(&dict).unwrap();
        assert!(dict.lookup("nav", "", "").is_none());
        assert_eq!(corpus.dimension(), 2);
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.stats().sessions, 2);
        assert_eq!(corpus.stats().sessions_without_url, 1);
        assert_eq!(corpus.get(0).unwrap().session.as_str(), "b");
    }

    #[test]
    fn vectors_from_a_foreign_dictionary_are_rejected() {
        let mut big = FeatureDictionary::new();
        let mut assembler = CorpusAssembler::new();
        assembler.push(extract_session(record("a", Some("u"), &["div", "p"]), &mut big));
        let small = FeatureDictionary::new();
        let err = assembler.finish(&small).unwrap_err();
        // body, div and p
        assert!(matches!(err, CorpusError::VectorOverflow { len: 3, dimension: 0, .. }));
    }

    #[test]
    fn empty_assembly_yields_empty_corpus() {
        let corpus = CorpusAssembler::new().finish(&FeatureDictionary::new()).unwrap();
        assert!(corpus.is_empty());
        assert_eq!(corpus.dimension(), 0);
    }
}
