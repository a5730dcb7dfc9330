//! Map strategies: explicit-index walks addressing entries by key.
//!
//! Both strategies take `(label, actual key)` mappings: the label becomes
//! the report index (`prefix[label]`), the actual key is looked up in the
//! map. A key with no matching entry yields nothing at all, so its slot
//! stays unvalidated; absence is left for node-level rules on the parent
//! to judge, not treated as a traversal error.

use std::sync::Arc;

use kensa_types::{key, Metadata, NodeId, ObjectGraph, Scalar};

use super::{TraversalStrategy, ValidationEntry};

/// Pair form: each produced child is the matched *entry node itself*, so
/// the visitor validates the key/value pair as a small composite against
/// the map's element descriptor.
pub struct ExplicitIndexMapStrategy {
    mappings: Vec<(String, Scalar)>,
}

impl ExplicitIndexMapStrategy {
    pub fn new<I, S, K>(mappings: I) -> Self
    where
        I: IntoIterator<Item = (S, K)>,
        S: Into<String>,
        K: Into<Scalar>,
    {
        ExplicitIndexMapStrategy {
            mappings: mappings
                .into_iter()
                .map(|(label, actual)| (label.into(), actual.into()))
                .collect(),
        }
    }
}

impl TraversalStrategy for ExplicitIndexMapStrategy {
    fn children<'g>(
        &'g self,
        graph: &'g ObjectGraph,
        metadata: &Arc<Metadata>,
        key_prefix: &str,
        model: NodeId,
    ) -> Box<dyn Iterator<Item = ValidationEntry> + 'g> {
        let Some(element) = metadata.element() else {
            debug_assert!(false, "map metadata without an element descriptor");
            return Box::new(std::iter::empty());
        };
        let prefix = key_prefix.to_string();
        Box::new(self.mappings.iter().filter_map(move |(label, actual)| {
            let entry = graph.map_lookup(model, actual)?;
            Some(ValidationEntry {
                key: key::append_index(&prefix, label),
                metadata: element.clone(),
                model: Some(entry),
            })
        }))
    }
}

/// Value form: each produced child is the matched entry's *value* node,
/// validated against one caller-supplied value descriptor instead of the
/// map's declared element. Useful when the interesting shape is the value
/// alone and the declared element metadata does not fit.
pub struct ExplicitIndexMapValueStrategy {
    mappings: Vec<(String, Scalar)>,
    value_metadata: Arc<Metadata>,
}

impl ExplicitIndexMapValueStrategy {
    pub fn new<I, S, K>(mappings: I, value_metadata: Arc<Metadata>) -> Self
    where
        I: IntoIterator<Item = (S, K)>,
        S: Into<String>,
        K: Into<Scalar>,
    {
        ExplicitIndexMapValueStrategy {
            mappings: mappings
                .into_iter()
                .map(|(label, actual)| (label.into(), actual.into()))
                .collect(),
            value_metadata,
        }
    }
}

impl TraversalStrategy for ExplicitIndexMapValueStrategy {
    fn children<'g>(
        &'g self,
        graph: &'g ObjectGraph,
        _metadata: &Arc<Metadata>,
        key_prefix: &str,
        model: NodeId,
    ) -> Box<dyn Iterator<Item = ValidationEntry> + 'g> {
        let prefix = key_prefix.to_string();
        let value_metadata = self.value_metadata.clone();
        Box::new(self.mappings.iter().filter_map(move |(label, actual)| {
            let entry = graph.map_lookup(model, actual)?;
            let (_, value) = graph.entry_parts(entry)?;
            Some(ValidationEntry {
                key: key::append_index(&prefix, label),
                metadata: value_metadata.clone(),
                model: Some(value),
            })
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores_map() -> (ObjectGraph, NodeId, Arc<Metadata>) {
        let mut g = ObjectGraph::new();
        let v1 = g.add_scalar(10i64);
        let v2 = g.add_scalar(20i64);
        let map = g.add_map(vec![
            (Scalar::String("east".into()), v1),
            (Scalar::String("west".into()), v2),
        ]);
        let md = Metadata::enumerable(
            "map<string,int>",
            Metadata::entry("entry", Metadata::leaf("string"), Metadata::leaf("int")),
        );
        (g, map, md)
    }

    #[test]
    fn pair_form_yields_entry_nodes() {
        let (g, map, md) = scores_map();
        let strategy = ExplicitIndexMapStrategy::new([("e", "east"), ("w", "west")]);
        let entries: Vec<_> = strategy.children(&g, &md, "scores", map).collect();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].key, "scores[e]");
        let pair = entries[0].model.unwrap();
        let (k, v) = g.entry_parts(pair).unwrap();
        assert_eq!(g.scalar(k), Some(&Scalar::String("east".into())));
        assert_eq!(g.scalar(v), Some(&Scalar::Int(10)));
        assert!(entries[0].metadata.is_composite());
    }

    #[test]
    fn pair_form_skips_absent_keys() {
        let (g, map, md) = scores_map();
        let strategy =
            ExplicitIndexMapStrategy::new([("e", "east"), ("n", "north"), ("w", "west")]);
        let keys: Vec<_> = strategy
            .children(&g, &md, "scores", map)
            .map(|e| e.key)
            .collect();
        assert_eq!(keys, ["scores[e]", "scores[w]"]);
    }

    #[test]
    fn value_form_yields_bare_values_with_supplied_metadata() {
        let (g, map, md) = scores_map();
        let value_md = Metadata::leaf("score");
        let strategy =
            ExplicitIndexMapValueStrategy::new([("w", "west")], value_md.clone());
        let entries: Vec<_> = strategy.children(&g, &md, "scores", map).collect();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key, "scores[w]");
        assert_eq!(g.scalar(entries[0].model.unwrap()), Some(&Scalar::Int(20)));
        assert!(Arc::ptr_eq(&entries[0].metadata, &value_md));
    }

    #[test]
    fn value_form_skips_absent_keys() {
        let (g, map, _) = scores_map();
        let md = Metadata::enumerable("opaque", Metadata::leaf("unused"));
        let strategy =
            ExplicitIndexMapValueStrategy::new([("missing", "north")], Metadata::leaf("score"));
        assert_eq!(strategy.children(&g, &md, "scores", map).count(), 0);
    }

    #[test]
    fn integer_keys_look_up_like_any_scalar() {
        let mut g = ObjectGraph::new();
        let v = g.add_scalar("one");
        let map = g.add_map(vec![(Scalar::Int(1), v)]);
        let md = Metadata::enumerable(
            "map<int,string>",
            Metadata::entry("entry", Metadata::leaf("int"), Metadata::leaf("string")),
        );

        let strategy = ExplicitIndexMapStrategy::new([("one", 1i64)]);
        let entries: Vec<_> = strategy.children(&g, &md, "m", map).collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key, "m[one]");
    }
}
