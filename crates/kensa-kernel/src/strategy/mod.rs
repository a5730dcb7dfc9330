//! Traversal strategies: how a node produces its children for validation.
//!
//! A strategy turns one parent node into an ordered, finite stream of
//! [`ValidationEntry`] values: the child's fully composed report key, the
//! metadata to validate it against, and the child node itself (`None` when
//! the position exists but no data does). Strategies never fail and never
//! mutate the graph; a position with nothing behind it either yields no
//! entry at all or an entry without a model, depending on the strategy.
//!
//! The visitor picks [`DefaultCollectionStrategy`] for enumerables and
//! [`DefaultRecordStrategy`] for composites unless a per-node override
//! supplies something else.

mod collection;
mod dictionary;
mod record;

pub use collection::{DefaultCollectionStrategy, ExplicitIndexCollectionStrategy};
pub use dictionary::{ExplicitIndexMapStrategy, ExplicitIndexMapValueStrategy};
pub use record::DefaultRecordStrategy;

use std::sync::Arc;

use kensa_types::{Metadata, NodeId, ObjectGraph};

/// One child position produced by a strategy.
#[derive(Debug, Clone)]
pub struct ValidationEntry {
    /// Fully composed report key for the child.
    pub key: String,
    /// Metadata the child is validated against.
    pub metadata: Arc<Metadata>,
    /// The child node; `None` when the position has no data.
    pub model: Option<NodeId>,
}

/// Produces the children of one node for the visitor to walk.
pub trait TraversalStrategy: Send + Sync {
    /// Ordered children of `model`. `key_prefix` is the parent's report
    /// key; the returned entries carry fully composed keys.
    fn children<'g>(
        &'g self,
        graph: &'g ObjectGraph,
        metadata: &Arc<Metadata>,
        key_prefix: &str,
        model: NodeId,
    ) -> Box<dyn Iterator<Item = ValidationEntry> + 'g>;
}
