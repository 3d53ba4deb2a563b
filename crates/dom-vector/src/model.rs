use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One node of a recorded DOM snapshot.
///
/// Only the fields the vectorizer reads are typed; everything else the
/// recorder emitted (node ids, node type, text content, ...) is kept in
/// `extra` so the tree serializes back without loss.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_nodes: Option<Vec<SnapshotNode>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SnapshotNode {
    /// Element node with the given tag and no attributes.
    pub fn element(tag: impl Into<String>) -> Self {
        Self {
            tag_name: Some(tag.into()),
            attributes: None,
            child_nodes: None,
            extra: Map::new(),
        }
    }

    /// Node without a tag name, e.g. a document or text node.
    pub fn untagged() -> Self {
        Self::default()
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes
            .get_or_insert_with(Map::new)
            .insert(name.into(), Value::String(value.into()));
        self
    }

    pub fn with_child(mut self, child: SnapshotNode) -> Self {
        self.child_nodes.get_or_insert_with(Vec::new).push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = SnapshotNode>) -> Self {
        self.child_nodes
            .get_or_insert_with(Vec::new)
            .extend(children);
        self
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag_name.as_deref()
    }

    /// String attribute value, or `""` when the bag or the key is missing or
    /// the recorded value is not a string.
    pub fn attr(&self, name: &str) -> &str {
        self.attributes
            .as_ref()
            .and_then(|attrs| attrs.get(name))
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    pub fn children(&self) -> &[SnapshotNode] {
        self.child_nodes.as_deref().unwrap_or(&[])
    }
}

/// Releases deep trees without recursing once per level.
impl Drop for SnapshotNode {
    fn drop(&mut self) {
        let Some(mut pending) = self.child_nodes.take() else {
            return;
        };
        while let Some(mut node) = pending.pop() {
            if let Some(children) = node.child_nodes.take() {
                pending.extend(children);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_recorded_node_and_keeps_unknown_fields() {
        let raw = json!({
            "type": 2,
            "id": 14,
            "tagName": "img",
            "attributes": { "class": "hero", "src": "/a.png", "alt": "banner" },
            "childNodes": [ { "type": 3, "id": 15, "textContent": "hi" } ],
            "isSVG": false
        });
        let node: SnapshotNode = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(node.tag(), Some("img"));
        assert_eq!(node.attr("class"), "hero");
        assert_eq!(node.attr("src"), "/a.png");
        assert_eq!(node.attr("style"), "");
        assert_eq!(node.children().len(), 1);
        assert_eq!(node.children()[0].tag(), None);

        let back = serde_json::to_value(&node).unwrap();
        assert_eq!(back, raw);
    }

    #[test]
    fn missing_or_non_string_attributes_read_as_empty() {
        let node: SnapshotNode = serde_json::from_value(json!({
            "tagName": "div",
            "attributes": { "class": true }
        }))
        .unwrap();
        assert_eq!(node.attr("class"), "");
        assert_eq!(SnapshotNode::element("div").attr("src"), "");
    }

    #[test]
    fn very_deep_tree_drops_without_overflow() {
        let mut node = SnapshotNode::element("span");
        for _ in 0..200_000 {
            node = SnapshotNode::element("div").with_child(node);
        }
        drop(node);
    }
}
