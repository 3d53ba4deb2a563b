use async_trait::async_trait;

use replayscope_core_types::SessionId;

use crate::errors::SourceResult;
use crate::model::SessionRecord;

/// Upstream provider of decoded session recordings.
#[async_trait]
pub trait SessionSource: Send + Sync {
    /// Identifiers of every session the source can load.
    async fn list(&self) -> SourceResult<Vec<SessionId>>;

    /// Loads one session. A session whose recording cannot be decoded may be
    /// reported either as an error or as a record with `events: None`.
    async fn load(&self, id: &SessionId) -> SourceResult<SessionRecord>;

    fn describe(&self) -> String;
}
