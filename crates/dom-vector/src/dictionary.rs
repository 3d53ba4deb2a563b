use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Tags that never produce a feature. Their children are still visited.
pub const IGNORED_TAGS: [&str; 7] = [
    "script", "noscript", "meta", "iframe", "head", "html", "style",
];

/// Uniqueness key of a feature. Inline style is deliberately not part of it.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct FeatureKey {
    pub tag: String,
    pub class: String,
    pub src: String,
}

impl FeatureKey {
    pub fn new(tag: &str, class: &str, src: &str) -> Self {
        Self {
            tag: tag.to_string(),
            class: class.to_string(),
            src: src.to_string(),
        }
    }
}

/// A registered feature. `style` is the inline style seen at first registration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureEntry {
    pub key: FeatureKey,
    pub style: String,
}

/// Append-only registry of features for one sampling run.
///
/// Indices are positions of first registration and never change. Create one
/// per run and drop it when the run ends.
#[derive(Clone, Debug, Default)]
pub struct FeatureDictionary {
    entries: Vec<FeatureEntry>,
    lookup: HashMap<FeatureKey, usize>,
}

impl FeatureDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ignored(tag: &str) -> bool {
        IGNORED_TAGS.contains(&tag)
    }

    /// Returns the index of `(tag, class, src)`, registering it first if it is
    /// new. Ignored tags return `None` and never allocate a slot.
    pub fn register_or_lookup(
        &mut self,
        tag: &str,
        class: &str,
        style: &str,
        src: &str,
    ) -> Option<usize> {
        if Self::is_ignored(tag) {
            return None;
        }
        let key = FeatureKey::new(tag, class, src);
        if let Some(&index) = self.lookup.get(&key) {
            return Some(index);
        }
        let index = self.entries.len();
        self.lookup.insert(key.clone(), index);
        self.entries.push(FeatureEntry {
            key,
            style: style.to_string(),
        });
        Some(index)
    }

    /// Index of an already registered feature.
    pub fn lookup(&self, tag: &str, class: &str, src: &str) -> Option<usize> {
        self.lookup.get(&FeatureKey::new(tag, class, src)).copied()
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FeatureEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[FeatureEntry] {
        &self.entries
    }
}
