//! Turns decoded session recordings into a padded corpus of backdrops.

pub mod assemble;
pub mod errors;
pub mod events;
pub mod extract;
pub mod memory;
pub mod model;
pub mod ports;

pub use assemble::CorpusAssembler;
pub use errors::{CorpusError, CorpusResult, SourceError, SourceResult};
pub use events::{EventKind, RecordedEvent};
pub use extract::{extract_backdrops, extract_session};
pub use memory::MemorySessionSource;
pub use model::{AssemblyStats, Backdrop, Corpus, CorpusEntry, SessionBackdrops, SessionRecord};
pub use ports::SessionSource;
