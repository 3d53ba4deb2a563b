use std::collections::BTreeMap;

use async_trait::async_trait;

use replayscope_core_types::SessionId;

use crate::errors::{SourceError, SourceResult};
use crate::model::SessionRecord;
use crate::ports::SessionSource;

/// Session source backed by records held in memory.
#[derive(Clone, Debug, Default)]
pub struct MemorySessionSource {
    records: BTreeMap<SessionId, SessionRecord>,
}

impl MemorySessionSource {
    pub fn new(records: impl IntoIterator<Item = SessionRecord>) -> Self {
        Self {
            records: records
                .into_iter()
                .map(|record| (record.id.clone(), record))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl SessionSource for MemorySessionSource {
    async fn list(&self) -> SourceResult<Vec<SessionId>> {
        Ok(self.records.keys().cloned().collect())
    }

    async fn load(&self, id: &SessionId) -> SourceResult<SessionRecord> {
        self.records
            .get(id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(id.clone()))
    }

    fn describe(&self) -> String {
        format!("memory({} sessions)", self.records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lists_in_id_order_and_loads() {
        let source = MemorySessionSource::new([
            SessionRecord::failed("b", None),
            SessionRecord::failed("a", Some("ua".into())),
        ]);
        let ids = source.list().await.unwrap();
        assert_eq!(ids, vec![SessionId::from("a"), SessionId::from("b")]);
        let record = source.load(&SessionId::from("a")).await.unwrap();
        assert_eq!(record.url.as_deref(), Some("ua"));
        assert!(matches!(
            source.load(&SessionId::from("zz")).await,
            Err(SourceError::NotFound(_))
        ));
    }
}
