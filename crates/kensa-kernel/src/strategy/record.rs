//! Record strategy: the default property walk for composites.

use std::sync::Arc;

use kensa_types::{key, Metadata, NodeId, ObjectGraph};

use super::{TraversalStrategy, ValidationEntry};

/// Walks the properties declared by the composite's metadata, in
/// declaration order. A property the node has no data for still yields an
/// entry with `model: None`; required rules have to see the absence.
///
/// Entry nodes expose their `key` and `value` parts as fields, so this
/// strategy also drives the default walk into map pairs.
pub struct DefaultRecordStrategy;

impl TraversalStrategy for DefaultRecordStrategy {
    fn children<'g>(
        &'g self,
        graph: &'g ObjectGraph,
        metadata: &Arc<Metadata>,
        key_prefix: &str,
        model: NodeId,
    ) -> Box<dyn Iterator<Item = ValidationEntry> + 'g> {
        let prefix = key_prefix.to_string();
        let properties = metadata.properties().to_vec();
        Box::new(properties.into_iter().filter_map(move |property| {
            let Some(metadata) = property.metadata() else {
                debug_assert!(false, "dangling descriptor for property '{}'", property.name);
                return None;
            };
            Some(ValidationEntry {
                key: key::append_property(&prefix, &property.name),
                model: graph.field(model, &property.name),
                metadata,
            })
        }))
    }
}

#[cfg(test)]
mod tests {
    use kensa_types::Scalar;

    use super::*;

    #[test]
    fn walks_properties_in_declaration_order() {
        let mut g = ObjectGraph::new();
        let name = g.add_scalar("ada");
        let age = g.add_scalar(36i64);
        let rec = g.add_record(vec![("name", name), ("age", age)]);
        let md = Metadata::record(
            "person",
            vec![
                ("name", Metadata::leaf("string")),
                ("age", Metadata::leaf("int")),
            ],
        );

        let entries: Vec<_> = DefaultRecordStrategy.children(&g, &md, "owner", rec).collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].key, "owner.name");
        assert_eq!(entries[0].model, Some(name));
        assert_eq!(entries[1].key, "owner.age");
        assert_eq!(entries[1].model, Some(age));
    }

    #[test]
    fn absent_fields_yield_modelless_entries() {
        let mut g = ObjectGraph::new();
        let rec = g.add_record(vec![]);
        let md = Metadata::record("person", vec![("name", Metadata::leaf("string"))]);

        let entries: Vec<_> = DefaultRecordStrategy.children(&g, &md, "", rec).collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key, "name");
        assert_eq!(entries[0].model, None);
    }

    #[test]
    fn walks_entry_nodes_through_key_and_value() {
        let mut g = ObjectGraph::new();
        let value = g.add_scalar(7i64);
        let entry = g.add_entry(Scalar::String("k".into()), value);
        let md = Metadata::entry("entry", Metadata::leaf("string"), Metadata::leaf("int"));

        let entries: Vec<_> = DefaultRecordStrategy.children(&g, &md, "m[0]", entry).collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].key, "m[0].key");
        assert_eq!(g.scalar(entries[0].model.unwrap()), Some(&Scalar::String("k".into())));
        assert_eq!(entries[1].key, "m[0].value");
        assert_eq!(entries[1].model, Some(value));
    }
}
