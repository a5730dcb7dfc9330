//! Collection strategies: positional and explicit-index element walks.

use std::sync::Arc;

use kensa_types::{key, Metadata, NodeId, ObjectGraph};

use super::{TraversalStrategy, ValidationEntry};

/// Walks every element of a sequence or map in order, keyed by position:
/// `items[0]`, `items[1]`, ... Every element shares the enumerable's
/// element descriptor.
pub struct DefaultCollectionStrategy;

impl TraversalStrategy for DefaultCollectionStrategy {
    fn children<'g>(
        &'g self,
        graph: &'g ObjectGraph,
        metadata: &Arc<Metadata>,
        key_prefix: &str,
        model: NodeId,
    ) -> Box<dyn Iterator<Item = ValidationEntry> + 'g> {
        let Some(element) = metadata.element() else {
            debug_assert!(false, "enumerable metadata without an element descriptor");
            return Box::new(std::iter::empty());
        };
        let prefix = key_prefix.to_string();
        Box::new(
            graph
                .children(model)
                .iter()
                .enumerate()
                .map(move |(index, &child)| ValidationEntry {
                    key: key::append_index(&prefix, index),
                    metadata: element.clone(),
                    model: Some(child),
                }),
        )
    }
}

/// Walks elements in lockstep with a caller-supplied label list: the first
/// element gets the first label, and the walk stops when either side runs
/// out. Unpaired labels and unlabeled elements are simply not visited.
pub struct ExplicitIndexCollectionStrategy {
    labels: Vec<String>,
}

impl ExplicitIndexCollectionStrategy {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ExplicitIndexCollectionStrategy {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }
}

impl TraversalStrategy for ExplicitIndexCollectionStrategy {
    fn children<'g>(
        &'g self,
        graph: &'g ObjectGraph,
        metadata: &Arc<Metadata>,
        key_prefix: &str,
        model: NodeId,
    ) -> Box<dyn Iterator<Item = ValidationEntry> + 'g> {
        let Some(element) = metadata.element() else {
            debug_assert!(false, "enumerable metadata without an element descriptor");
            return Box::new(std::iter::empty());
        };
        let prefix = key_prefix.to_string();
        Box::new(
            self.labels
                .iter()
                .zip(graph.children(model).iter())
                .map(move |(label, &child)| ValidationEntry {
                    key: key::append_index(&prefix, label),
                    metadata: element.clone(),
                    model: Some(child),
                }),
        )
    }
}
