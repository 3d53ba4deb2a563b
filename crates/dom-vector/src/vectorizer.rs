use serde::{Deserialize, Serialize};

use crate::dictionary::FeatureDictionary;
use crate::model::SnapshotNode;

/// Occurrence counts indexed by feature dictionary position.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(Vec<u32>);

impl FeatureVector {
    pub fn zeroed(len: usize) -> Self {
        Self(vec![0; len])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    /// Count at `index`; positions past the end read as zero.
    pub fn get(&self, index: usize) -> u32 {
        self.0.get(index).copied().unwrap_or(0)
    }

    /// Right-pads with zeros up to `len`. Never truncates.
    pub fn pad_to(&mut self, len: usize) {
        if self.0.len() < len {
            self.0.resize(len, 0);
        }
    }

    pub fn increment(&mut self, index: usize) {
        self.pad_to(index + 1);
        self.0[index] += 1;
    }

    pub fn total(&self) -> u64 {
        self.0.iter().map(|&v| u64::from(v)).sum()
    }
}

impl From<Vec<u32>> for FeatureVector {
    fn from(value: Vec<u32>) -> Self {
        Self(value)
    }
}

/// Walks snapshot trees and counts features into a shared dictionary.
pub struct SnapshotVectorizer<'d> {
    dictionary: &'d mut FeatureDictionary,
}

impl<'d> SnapshotVectorizer<'d> {
    pub fn new(dictionary: &'d mut FeatureDictionary) -> Self {
        Self { dictionary }
    }

    /// Pre-order depth-first count of every non-ignored element in `root`.
    ///
    /// The vector starts at the dictionary size observed now and widens as
    /// new features are registered during the walk.
    pub fn vectorize(&mut self, root: &SnapshotNode) -> FeatureVector {
        let mut vector = FeatureVector::zeroed(self.dictionary.size());
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if let Some(tag) = node.tag() {
                let index = self.dictionary.register_or_lookup(
                    tag,
                    node.attr("class"),
                    node.attr("style"),
                    node.attr("src"),
                );
                if let Some(index) = index {
                    vector.increment(index);
                }
            }
            stack.extend(node.children().iter().rev());
        }
        vector
    }
}

/// Shorthand for a one-off [`SnapshotVectorizer::vectorize`].
pub fn vectorize(dictionary: &mut FeatureDictionary, root: &SnapshotNode) -> FeatureVector {
    SnapshotVectorizer::new(dictionary).vectorize(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn div(class: &str) -> SnapshotNode {
        SnapshotNode::element("div").with_attr("class", class)
    }

    #[test]
    fn counts_repeated_features() {
        let mut dict = FeatureDictionary::new();
        let root = SnapshotNode::untagged().with_children([div("x"), div("x"), div("x")]);
        let vector = vectorize(&mut dict, &root);
        let idx = dict.lookup("div", "x", "").unwrap();
        assert_eq!(vector.get(idx), 3);
        assert_eq!(vector.total(), 3);
        assert_eq!(vector.len(), dict.size());
    }

    #[test]
    fn ignored_root_still_visits_children() {
        let mut dict = FeatureDictionary::new();
        let root = SnapshotNode::element("script").with_child(div(""));
        let vector = vectorize(&mut dict, &root);
        assert_eq!(dict.size(), 1);
        assert_eq!(dict.get(0).unwrap().key.tag, "div");
        assert_eq!(vector.as_slice(), &[1]);
    }

    #[test]
    fn pre_order_walk_registers_parents_before_children() {
        let mut dict = FeatureDictionary::new();
        let root = SnapshotNode::element("html").with_children([
            SnapshotNode::element("head").with_child(SnapshotNode::element("title")),
            SnapshotNode::element("body").with_children([
                SnapshotNode::element("main").with_child(SnapshotNode::element("h1")),
                SnapshotNode::element("footer"),
            ]),
        ]);
        vectorize(&mut dict, &root);
        let tags: Vec<&str> = dict.entries().iter().map(|e| e.key.tag.as_str()).collect();
        assert_eq!(tags, vec!["title", "body", "main", "h1", "footer"]);
    }

    #[test]
    fn later_vectors_start_at_current_dictionary_size() {
        let mut dict = FeatureDictionary::new();
        let first = vectorize(&mut dict, &div("a"));
        let second = vectorize(&mut dict, &div("b"));
        assert_eq!(first.as_slice(), &[1]);
        assert_eq!(second.as_slice(), &[0, 1]);

        let empty = vectorize(&mut dict, &SnapshotNode::untagged());
        assert_eq!(empty.as_slice(), &[0, 0]);
    }

    #[test]
    fn pad_never_truncates() {
        let mut vector = FeatureVector::from(vec![1, 2, 3]);
        vector.pad_to(2);
        assert_eq!(vector.as_slice(), &[1, 2, 3]);
        vector.pad_to(5);
        assert_eq!(vector.as_slice(), &[1, 2, 3, 0, 0]);
    }
}
