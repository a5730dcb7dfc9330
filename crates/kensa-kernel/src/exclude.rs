//! Type-based traversal exclusion.
//!
//! Some composite types are opaque to validation (framework types, rich
//! value objects); an exclude filter stops the visitor from descending
//! into them. Node-level rules still run for excluded nodes.

use std::collections::HashSet;

use kensa_types::TypeTag;

/// Decides whether the interior of a composite type is off-limits.
pub trait TypeExcludeFilter: Send + Sync {
    fn is_excluded(&self, tag: &TypeTag) -> bool;
}

/// Exact-match set of excluded type tags.
#[derive(Debug, Clone, Default)]
pub struct TypeExcludeSet {
    tags: HashSet<TypeTag>,
}

impl TypeExcludeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of<I, T>(tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TypeTag>,
    {
        TypeExcludeSet {
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    pub fn insert(&mut self, tag: impl Into<TypeTag>) {
        self.tags.insert(tag.into());
    }
}

impl TypeExcludeFilter for TypeExcludeSet {
    fn is_excluded(&self, tag: &TypeTag) -> bool {
        self.tags.contains(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_exact_tags_only() {
        let set = TypeExcludeSet::of(["time.Instant", "uri"]);
        assert!(set.is_excluded(&TypeTag::new("uri")));
        assert!(!set.is_excluded(&TypeTag::new("uri.Builder")));
        assert!(!set.is_excluded(&TypeTag::new("user")));
    }

    #[test]
    fn insert_after_construction() {
        let mut set = TypeExcludeSet::new();
        assert!(!set.is_excluded(&TypeTag::new("blob")));
        set.insert("blob");
        assert!(set.is_excluded(&TypeTag::new("blob")));
    }
}
