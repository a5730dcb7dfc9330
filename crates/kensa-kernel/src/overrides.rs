//! Per-node traversal overrides.
//!
//! An override replaces how one specific node is handled, keyed by node
//! identity: the report key it appears under, the metadata it is validated
//! against, the strategy that produces its children, or whether it is
//! validated at all. The visitor consults the map once per node on the way
//! in; overrides are read-only during a walk.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use kensa_types::{Metadata, NodeId};

use crate::strategy::TraversalStrategy;

/// Replacement instructions for one node.
#[derive(Default)]
pub struct NodeOverride {
    /// Report the node under this key instead of the one composed by its
    /// parent.
    pub key: Option<String>,
    /// Validate the node against this metadata instead.
    pub metadata: Option<Arc<Metadata>>,
    /// Produce the node's children with this strategy instead of the
    /// kind default.
    pub strategy: Option<Arc<dyn TraversalStrategy>>,
    /// Skip the node and everything under it; existing report entries in
    /// the subtree become `Skipped`.
    pub suppress: bool,
}

impl NodeOverride {
    pub fn new() -> Self {
        Self::default()
    }

    /// An override that only suppresses the node.
    pub fn suppressed() -> Self {
        NodeOverride {
            suppress: true,
            ..Self::default()
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Arc<Metadata>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_strategy(mut self, strategy: impl TraversalStrategy + 'static) -> Self {
        self.strategy = Some(Arc::new(strategy));
        self
    }

    /// Like [`with_strategy`] for a strategy that's already in an `Arc`.
    ///
    /// [`with_strategy`]: NodeOverride::with_strategy
    pub fn with_strategy_arc(mut self, strategy: Arc<dyn TraversalStrategy>) -> Self {
        self.strategy = Some(strategy);
        self
    }
}

impl fmt::Debug for NodeOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeOverride")
            .field("key", &self.key)
            .field(
                "metadata",
                &self.metadata.as_ref().map(|m| m.type_tag().to_string()),
            )
            .field("strategy", &self.strategy.is_some())
            .field("suppress", &self.suppress)
            .finish()
    }
}

/// Overrides for a walk, keyed by node identity.
#[derive(Default)]
pub struct OverrideMap {
    entries: HashMap<NodeId, NodeOverride>,
}

impl OverrideMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach replacement instructions to a node. A second insert for the
    /// same node replaces the first.
    pub fn insert(&mut self, node: NodeId, replacement: NodeOverride) {
        self.entries.insert(node, replacement);
    }

    /// Shorthand for suppressing a node outright.
    pub fn suppress(&mut self, node: NodeId) {
        self.insert(node, NodeOverride::suppressed());
    }

    pub fn get(&self, node: NodeId) -> Option<&NodeOverride> {
        self.entries.get(&node)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for OverrideMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut nodes: Vec<_> = self.entries.keys().collect();
        nodes.sort();
        f.debug_struct("OverrideMap").field("nodes", &nodes).finish()
    }
}

#[cfg(test)]
mod tests {
    use kensa_types::ObjectGraph;

    use crate::strategy::ExplicitIndexCollectionStrategy;

    use super::*;

    #[test]
    fn insert_and_get() {
        let mut g = ObjectGraph::new();
        let node = g.add_scalar(1i64);
        let other = g.add_scalar(2i64);

        let mut map = OverrideMap::new();
        map.insert(node, NodeOverride::new().with_key("renamed"));

        assert_eq!(map.get(node).and_then(|o| o.key.as_deref()), Some("renamed"));
        assert!(map.get(other).is_none());
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn suppress_shorthand() {
        let mut g = ObjectGraph::new();
        let node = g.add_scalar(1i64);

        let mut map = OverrideMap::new();
        map.suppress(node);
        assert!(map.get(node).is_some_and(|o| o.suppress));
    }

    #[test]
    fn chained_construction() {
        let ov = NodeOverride::new()
            .with_key("k")
            .with_metadata(Metadata::leaf("t"))
            .with_strategy(ExplicitIndexCollectionStrategy::new(["a"]));
        assert_eq!(ov.key.as_deref(), Some("k"));
        assert!(ov.metadata.is_some());
        assert!(ov.strategy.is_some());
        assert!(!ov.suppress);

        let dbg = format!("{:?}", ov);
        assert!(dbg.contains("strategy: true"));
    }
}
