//! Shape metadata for object graphs.
//!
//! Every node position being validated carries a `Metadata` describing how
//! it should be treated: as a leaf, as an enumerable of elements, or as a
//! composite with named properties. The three kinds are mutually exclusive
//! and fixed at construction. Descriptors are shared via `Arc`; a
//! collection reuses one element descriptor for every element.
//!
//! Recursive shapes (an employee whose `manager` is another employee) are
//! built with [`Metadata::cyclic_record`]; the self-reference is held as a
//! weak back-link, so descriptor graphs never leak.

use std::fmt;
use std::sync::{Arc, Weak};

use crate::graph::{ENTRY_KEY_FIELD, ENTRY_VALUE_FIELD};

/// How a node is traversed and validated. Exactly one per descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// No children; only node-level rules apply.
    Leaf,
    /// Ordered elements described by a single element descriptor.
    Enumerable,
    /// Named properties, each with its own descriptor.
    Composite,
}

/// Interned type name. Cheap to clone, compare and hash.
///
/// Tags drive rule lookup and exclusion checks; the engine never parses
/// them, so any naming scheme the embedder likes works (`"user.Profile"`,
/// `"i64"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeTag(Arc<str>);

impl TypeTag {
    pub fn new(name: impl AsRef<str>) -> Self {
        TypeTag(Arc::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TypeTag {
    fn from(s: &str) -> Self {
        TypeTag::new(s)
    }
}

impl From<String> for TypeTag {
    fn from(s: String) -> Self {
        TypeTag(Arc::from(s.as_str()))
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Link to a child descriptor. Recursive shapes point back at an
/// enclosing descriptor weakly; everything else holds its child directly.
#[derive(Debug, Clone)]
enum MetadataLink {
    Strong(Arc<Metadata>),
    Back(Weak<Metadata>),
}

impl MetadataLink {
    fn resolve(&self) -> Option<Arc<Metadata>> {
        match self {
            MetadataLink::Strong(md) => Some(md.clone()),
            MetadataLink::Back(weak) => weak.upgrade(),
        }
    }
}

/// Reference to a child descriptor, accepted by the constructors. Built
/// from an `Arc<Metadata>` or from [`SelfHandle::same`] inside
/// [`Metadata::cyclic_record`].
#[derive(Debug, Clone)]
pub struct MetadataRef(MetadataLink);

impl From<Arc<Metadata>> for MetadataRef {
    fn from(md: Arc<Metadata>) -> Self {
        MetadataRef(MetadataLink::Strong(md))
    }
}

impl From<&Arc<Metadata>> for MetadataRef {
    fn from(md: &Arc<Metadata>) -> Self {
        MetadataRef(MetadataLink::Strong(md.clone()))
    }
}

/// Handle to the descriptor under construction in
/// [`Metadata::cyclic_record`].
pub struct SelfHandle(Weak<Metadata>);

impl SelfHandle {
    /// A reference to the descriptor being built.
    pub fn same(&self) -> MetadataRef {
        MetadataRef(MetadataLink::Back(self.0.clone()))
    }
}

/// A named property of a composite descriptor.
#[derive(Debug, Clone)]
pub struct Property {
    pub name: String,
    link: MetadataLink,
}

impl Property {
    /// The property's descriptor. `None` only when a recursive
    /// back-link's target has been dropped, which cannot happen while the
    /// descriptor it points to is still being walked.
    pub fn metadata(&self) -> Option<Arc<Metadata>> {
        self.link.resolve()
    }
}

/// Shape descriptor for one node position.
#[derive(Debug, Clone)]
pub struct Metadata {
    kind: NodeKind,
    type_tag: TypeTag,
    element: Option<MetadataLink>,
    properties: Vec<Property>,
}

impl Metadata {
    /// A leaf descriptor: no children, rules only.
    pub fn leaf(tag: impl Into<TypeTag>) -> Arc<Self> {
        Arc::new(Metadata {
            kind: NodeKind::Leaf,
            type_tag: tag.into(),
            element: None,
            properties: Vec::new(),
        })
    }

    /// An enumerable descriptor whose elements all share `element`.
    pub fn enumerable(tag: impl Into<TypeTag>, element: impl Into<MetadataRef>) -> Arc<Self> {
        Arc::new(Metadata {
            kind: NodeKind::Enumerable,
            type_tag: tag.into(),
            element: Some(element.into().0),
            properties: Vec::new(),
        })
    }

    /// A composite descriptor with named properties, in declaration order.
    pub fn record<R: Into<MetadataRef>>(
        tag: impl Into<TypeTag>,
        properties: Vec<(&str, R)>,
    ) -> Arc<Self> {
        Arc::new(Metadata {
            kind: NodeKind::Composite,
            type_tag: tag.into(),
            element: None,
            properties: collect_properties(properties),
        })
    }

    /// A composite descriptor whose children may refer back to it, for
    /// recursive shapes:
    ///
    /// ```
    /// use std::sync::Arc;
    /// use kensa_types::Metadata;
    ///
    /// let employee = Metadata::cyclic_record("employee", |me| {
    ///     vec![
    ///         ("name", Metadata::leaf("string").into()),
    ///         ("manager", me.same()),
    ///     ]
    /// });
    /// let manager = employee.property("manager").unwrap();
    /// assert!(Arc::ptr_eq(&manager.metadata().unwrap(), &employee));
    /// ```
    pub fn cyclic_record(
        tag: impl Into<TypeTag>,
        build: impl FnOnce(&SelfHandle) -> Vec<(&str, MetadataRef)>,
    ) -> Arc<Self> {
        let type_tag = tag.into();
        Arc::new_cyclic(|weak| {
            let handle = SelfHandle(weak.clone());
            Metadata {
                kind: NodeKind::Composite,
                type_tag,
                element: None,
                properties: collect_properties(build(&handle)),
            }
        })
    }

    /// A map-entry descriptor: a composite with `key` and `value`
    /// properties. Use as the element of an enumerable describing a map,
    /// so the default walk validates each pair as a small composite.
    pub fn entry(
        tag: impl Into<TypeTag>,
        key: impl Into<MetadataRef>,
        value: impl Into<MetadataRef>,
    ) -> Arc<Self> {
        Metadata::record(
            tag,
            vec![
                (ENTRY_KEY_FIELD, key.into()),
                (ENTRY_VALUE_FIELD, value.into()),
            ],
        )
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_enumerable(&self) -> bool {
        self.kind == NodeKind::Enumerable
    }

    pub fn is_composite(&self) -> bool {
        self.kind == NodeKind::Composite
    }

    pub fn type_tag(&self) -> &TypeTag {
        &self.type_tag
    }

    /// Element descriptor of an enumerable; `None` for other kinds (or
    /// for a dropped back-link, like [`Property::metadata`]).
    pub fn element(&self) -> Option<Arc<Metadata>> {
        self.element.as_ref().and_then(MetadataLink::resolve)
    }

    /// Properties of a composite, in declaration order; empty otherwise.
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Look up a property by name.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }
}

fn collect_properties<R: Into<MetadataRef>>(properties: Vec<(&str, R)>) -> Vec<Property> {
    properties
        .into_iter()
        .map(|(name, child)| Property {
            name: name.to_string(),
            link: child.into().0,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_exclusive() {
        let leaf = Metadata::leaf("i64");
        assert_eq!(leaf.kind(), NodeKind::Leaf);
        assert!(!leaf.is_enumerable());
        assert!(!leaf.is_composite());
        assert!(leaf.element().is_none());
        assert!(leaf.properties().is_empty());

        let seq = Metadata::enumerable("vec<i64>", Metadata::leaf("i64"));
        assert!(seq.is_enumerable());
        assert!(seq.element().is_some());

        let rec = Metadata::record("point", vec![("x", Metadata::leaf("i64"))]);
        assert!(rec.is_composite());
        assert!(rec.element().is_none());
    }

    #[test]
    fn entry_exposes_key_and_value_properties() {
        let e = Metadata::entry("entry", Metadata::leaf("string"), Metadata::leaf("i64"));
        assert!(e.is_composite());
        assert_eq!(e.properties().len(), 2);
        assert!(e.property("key").is_some());
        assert!(e.property("value").is_some());
        assert!(e.property("other").is_none());
    }

    #[test]
    fn cyclic_record_resolves_to_itself() {
        let employee = Metadata::cyclic_record("employee", |me| {
            vec![
                ("name", Metadata::leaf("string").into()),
                ("manager", me.same()),
            ]
        });

        let manager = employee.property("manager").unwrap().metadata().unwrap();
        assert!(Arc::ptr_eq(&manager, &employee));
        assert_eq!(employee.property("name").unwrap().metadata().unwrap().kind(), NodeKind::Leaf);
    }

    #[test]
    fn recursion_through_an_enumerable() {
        let tree = Metadata::cyclic_record("tree", |me| {
            vec![
                ("label", Metadata::leaf("string").into()),
                ("children", Metadata::enumerable("vec<tree>", me.same()).into()),
            ]
        });

        let children = tree.property("children").unwrap().metadata().unwrap();
        assert!(children.is_enumerable());
        assert!(Arc::ptr_eq(&children.element().unwrap(), &tree));
    }

    #[test]
    fn back_links_do_not_leak() {
        let employee = Metadata::cyclic_record("employee", |me| vec![("manager", me.same())]);
        assert_eq!(Arc::strong_count(&employee), 1);
    }

    #[test]
    fn type_tags_intern_cheaply() {
        let a = TypeTag::new("user.Profile");
        let b = a.clone();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "user.Profile");
        assert_eq!(TypeTag::from("x").as_str(), "x");
    }
}
