//! Arena-backed object graphs.
//!
//! The graph being validated is held in a flat arena; a `NodeId` is the
//! identity of one node. Identity is what cycle detection and per-node
//! overrides key on, so two structurally equal subtrees stay distinct
//! while one node reachable through several parents is recognized as the
//! same node. Sharing is legal and is not a cycle; a cycle exists only
//! when a node is its own ancestor.
//!
//! Map entries are first-class `Entry` nodes: the pair itself has an
//! identity and can be handed to a validator as a small composite with
//! `key` and `value` fields.

use std::fmt;

use crate::scalar::Scalar;

/// Field name under which an `Entry` node exposes its key.
pub const ENTRY_KEY_FIELD: &str = "key";
/// Field name under which an `Entry` node exposes its value.
pub const ENTRY_VALUE_FIELD: &str = "value";

/// Opaque handle identifying one node of an `ObjectGraph`.
///
/// Ids are only meaningful together with the graph that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Payload of one graph node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    /// A leaf value.
    Scalar(Scalar),
    /// Ordered elements.
    Sequence(Vec<NodeId>),
    /// Keyed entries in insertion order. Elements are always `Entry` nodes.
    Map(Vec<NodeId>),
    /// One map entry; `key` always refers to a `Scalar` node.
    Entry { key: NodeId, value: NodeId },
    /// Named fields in insertion order.
    Record(Vec<(String, NodeId)>),
}

/// Arena of nodes forming one object graph.
#[derive(Debug, Clone, Default)]
pub struct ObjectGraph {
    nodes: Vec<NodeData>,
}

impl ObjectGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(data);
        id
    }

    /// Add a leaf node.
    pub fn add_scalar(&mut self, value: impl Into<Scalar>) -> NodeId {
        self.push(NodeData::Scalar(value.into()))
    }

    /// Add a sequence node over existing children.
    pub fn add_sequence(&mut self, children: Vec<NodeId>) -> NodeId {
        self.push(NodeData::Sequence(children))
    }

    /// Add a record node over existing field values.
    pub fn add_record(&mut self, fields: Vec<(&str, NodeId)>) -> NodeId {
        let fields = fields
            .into_iter()
            .map(|(name, id)| (name.to_string(), id))
            .collect();
        self.push(NodeData::Record(fields))
    }

    /// Add one map entry. The key scalar gets its own node, so the entry
    /// invariant (key refers to a `Scalar`) holds by construction.
    pub fn add_entry(&mut self, key: impl Into<Scalar>, value: NodeId) -> NodeId {
        let key = self.add_scalar(key);
        self.push(NodeData::Entry { key, value })
    }

    /// Add a map node, materializing an `Entry` node per pair.
    pub fn add_map(&mut self, entries: Vec<(Scalar, NodeId)>) -> NodeId {
        let entries = entries
            .into_iter()
            .map(|(key, value)| self.add_entry(key, value))
            .collect();
        self.push(NodeData::Map(entries))
    }

    /// Append a child to a sequence. This is how cyclic graphs are built:
    /// create the sequence first, then push a node that (transitively)
    /// contains it.
    pub fn push_child(&mut self, sequence: NodeId, child: NodeId) {
        if let Some(NodeData::Sequence(children)) = self.nodes.get_mut(sequence.0 as usize) {
            children.push(child);
        } else {
            debug_assert!(false, "push_child target {sequence} is not a sequence");
        }
    }

    /// Set or replace a record field. Like [`push_child`], usable after
    /// construction to close a cycle.
    ///
    /// [`push_child`]: ObjectGraph::push_child
    pub fn set_field(&mut self, record: NodeId, name: &str, child: NodeId) {
        if let Some(NodeData::Record(fields)) = self.nodes.get_mut(record.0 as usize) {
            match fields.iter_mut().find(|(n, _)| n == name) {
                Some((_, id)) => *id = child,
                None => fields.push((name.to_string(), child)),
            }
        } else {
            debug_assert!(false, "set_field target {record} is not a record");
        }
    }

    /// Payload of a node, if the id belongs to this graph.
    pub fn node(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.0 as usize)
    }

    /// The scalar carried by a leaf node.
    pub fn scalar(&self, id: NodeId) -> Option<&Scalar> {
        match self.node(id) {
            Some(NodeData::Scalar(s)) => Some(s),
            _ => None,
        }
    }

    /// Ordered elements of a sequence or map; empty for other kinds.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.node(id) {
            Some(NodeData::Sequence(children)) | Some(NodeData::Map(children)) => children,
            _ => &[],
        }
    }

    /// Field lookup on records; entries expose `key` and `value`.
    pub fn field(&self, id: NodeId, name: &str) -> Option<NodeId> {
        match self.node(id)? {
            NodeData::Record(fields) => fields
                .iter()
                .find(|(n, _)| n == name)
                .map(|&(_, child)| child),
            NodeData::Entry { key, value } => match name {
                ENTRY_KEY_FIELD => Some(*key),
                ENTRY_VALUE_FIELD => Some(*value),
                _ => None,
            },
            _ => None,
        }
    }

    /// Find the entry of a map whose key scalar equals `key`.
    pub fn map_lookup(&self, map: NodeId, key: &Scalar) -> Option<NodeId> {
        let entries = match self.node(map)? {
            NodeData::Map(entries) => entries,
            _ => return None,
        };
        entries.iter().copied().find(|&entry| {
            self.entry_parts(entry)
                .and_then(|(k, _)| self.scalar(k))
                .is_some_and(|k| k == key)
        })
    }

    /// The `(key, value)` node pair of an entry.
    pub fn entry_parts(&self, id: NodeId) -> Option<(NodeId, NodeId)> {
        match self.node(id)? {
            NodeData::Entry { key, value } => Some((*key, *value)),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ingest a JSON value as graph nodes and return the root id. Arrays
    /// become sequences, objects become records, everything else a scalar.
    /// Build maps explicitly via [`add_map`] when entry semantics matter.
    ///
    /// [`add_map`]: ObjectGraph::add_map
    pub fn add_json(&mut self, json: &serde_json::Value) -> NodeId {
        match json {
            serde_json::Value::Null => self.add_scalar(Scalar::Null),
            serde_json::Value::Bool(b) => self.add_scalar(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    self.add_scalar(i)
                } else if let Some(f) = n.as_f64() {
                    self.add_scalar(f)
                } else {
                    self.add_scalar(n.to_string())
                }
            }
            serde_json::Value::String(s) => self.add_scalar(s.as_str()),
            serde_json::Value::Array(items) => {
                let children = items.iter().map(|item| self.add_json(item)).collect();
                self.add_sequence(children)
            }
            serde_json::Value::Object(fields) => {
                let fields = fields
                    .iter()
                    .map(|(name, value)| (name.clone(), self.add_json(value)))
                    .collect();
                self.push(NodeData::Record(fields))
            }
        }
    }
}
