use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Serialized DOM fragment posted by the extension.
///
/// Text nodes are bare strings; elements carry their tag, attributes, live
/// `value` (for controls) and children in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SnapshotNode {
    Text(String),
    Element {
        tag: String,
        #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
        attrs: IndexMap<String, String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<SnapshotNode>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
pub struct Element {
    pub tag_name: String,
    pub attrs: IndexMap<String, String>,
    pub value: String,
    /// Lowercased `type` of an `input` (`text` when absent); empty for other tags.
    pub input_type: String,
    /// Events dispatched on this element during the pass, in order.
    pub events: Vec<&'static str>,
    has_value: bool,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn attr_or_empty(&self, name: &str) -> &str {
        self.attr(name).unwrap_or("")
    }
}

#[derive(Debug, Clone)]
enum NodeType {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    node_type: NodeType,
}

/// Arena-backed document built from a snapshot. Node ids are stable for the
/// lifetime of the document and follow document order.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    id_index: HashMap<String, NodeId>,
}

impl Document {
    pub fn from_snapshot(snapshot: &SnapshotNode) -> Self {
        let mut doc = Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                node_type: NodeType::Document,
            }],
            root: NodeId(0),
            id_index: HashMap::new(),
        };
        doc.append_snapshot(doc.root, snapshot);
        doc
    }

    fn append_snapshot(&mut self, parent: NodeId, snapshot: &SnapshotNode) {
        match snapshot {
            SnapshotNode::Text(text) => {
                self.create_node(parent, NodeType::Text(text.clone()));
            }
            SnapshotNode::Element {
                tag,
                attrs,
                value,
                children,
            } => {
                let tag_name = tag.to_lowercase();
                let input_type = match tag_name.as_str() {
                    "input" => attrs
                        .get("type")
                        .map(|t| t.trim().to_lowercase())
                        .filter(|t| !t.is_empty())
                        .unwrap_or_else(|| "text".to_string()),
                    _ => String::new(),
                };
                let element = Element {
                    tag_name,
                    input_type,
                    value: value
                        .clone()
                        .or_else(|| attrs.get("value").cloned())
                        .unwrap_or_default(),
                    has_value: value.is_some(),
                    attrs: attrs.clone(),
                    events: Vec::new(),
                };
                let id = self.create_node(parent, NodeType::Element(element));
                if let Some(id_attr) = attrs.get("id").filter(|s| !s.is_empty()) {
                    self.id_index.entry(id_attr.clone()).or_insert(id);
                }
                for child in children {
                    self.append_snapshot(id, child);
                }
            }
        }
    }

    fn create_node(&mut self, parent: NodeId, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            node_type,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Rebuilds the snapshot, including any values written during the pass.
    pub fn to_snapshot(&self) -> Option<SnapshotNode> {
        self.nodes[self.root.0]
            .children
            .first()
            .map(|&id| self.snapshot_of(id))
    }

    fn snapshot_of(&self, id: NodeId) -> SnapshotNode {
        match &self.nodes[id.0].node_type {
            NodeType::Text(text) => SnapshotNode::Text(text.clone()),
            NodeType::Element(element) => SnapshotNode::Element {
                tag: element.tag_name.clone(),
                attrs: element.attrs.clone(),
                value: (element.has_value || !element.value.is_empty())
                    .then(|| element.value.clone()),
                children: self.nodes[id.0]
                    .children
                    .iter()
                    .map(|&child| self.snapshot_of(child))
                    .collect(),
            },
            NodeType::Document => SnapshotNode::Text(String::new()),
        }
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id.0].node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[id.0].node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].node_type {
            NodeType::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.tag_name.as_str())
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|e| e.attr(name))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent.filter(|p| *p != self.root)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.0].node_type {
            NodeType::Text(text) => out.push_str(text),
            NodeType::Element(_) | NodeType::Document => {
                for &child in &self.nodes[id.0].children {
                    self.collect_text(child, out);
                }
            }
        }
    }

    /// All elements in document order.
    pub fn elements(&self) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|&id| self.element(id).is_some())
            .collect()
    }

    /// Preorder descendants of `id`, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[id.0].children.iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.nodes[current.0].children.iter().rev().copied());
        }
        out
    }

    pub fn by_id(&self, id_attr: &str) -> Option<NodeId> {
        self.id_index.get(id_attr).copied()
    }

    /// Nearest inclusive ancestor with the given tag.
    pub fn closest(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if self.tag_name(current) == Some(tag) {
                return Some(current);
            }
            cursor = self.parent(current);
        }
        None
    }

    /// First descendant element with the given tag, in document order.
    pub fn find_descendant(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        self.descendants(id)
            .into_iter()
            .find(|&d| self.tag_name(d) == Some(tag))
    }

    /// First `<label for="...">` in the document that points at `id_attr`.
    pub fn label_for(&self, id_attr: &str) -> Option<NodeId> {
        if id_attr.is_empty() {
            return None;
        }
        self.elements()
            .into_iter()
            .find(|&e| self.tag_name(e) == Some("label") && self.attr(e, "for") == Some(id_attr))
    }

    /// Element siblings before `id`, nearest first.
    pub fn previous_element_siblings(&self, id: NodeId) -> Vec<NodeId> {
        let Some(parent) = self.nodes[id.0].parent else {
            return Vec::new();
        };
        let siblings = &self.nodes[parent.0].children;
        let position = siblings.iter().position(|&s| s == id).unwrap_or(0);
        siblings[..position]
            .iter()
            .rev()
            .copied()
            .filter(|&s| self.element(s).is_some())
            .collect()
    }

    /// Child indices from the snapshot root down to `id`, for locating the
    /// element again on the live page.
    pub fn path(&self, id: NodeId) -> Vec<usize> {
        let mut path = Vec::new();
        let mut current = id;
        while let Some(parent) = self.nodes[current.0].parent {
            if parent == self.root {
                break;
            }
            let index = self.nodes[parent.0]
                .children
                .iter()
                .position(|&c| c == current)
                .unwrap_or(0);
            path.push(index);
            current = parent;
        }
        path.reverse();
        path
    }
}
