//! Structural feature vectors for recorded DOM snapshots.
//!
//! A [`FeatureDictionary`] assigns every distinct `(tag, class, src)` triple a
//! stable index the first time it is seen; the vectorizer walks a snapshot tree
//! and counts occurrences per index.

pub mod dictionary;
pub mod model;
pub mod vectorizer;

pub use dictionary::{FeatureDictionary, FeatureEntry, FeatureKey, IGNORED_TAGS};
pub use model::SnapshotNode;
pub use vectorizer::{vectorize, FeatureVector, SnapshotVectorizer};
