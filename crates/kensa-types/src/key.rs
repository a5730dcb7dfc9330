//! Field key composition.
//!
//! Report keys mirror the external path convention: property accesses are
//! joined with `.`, index accesses are wrapped in `[...]`. The root key is
//! the empty string, so the first property composes to a bare name and a
//! top-level element to `[0]`.

use std::fmt;

/// Compose a property access onto a key prefix.
///
/// Empty parts collapse: `("", "name")` is `name`, `("user", "")` is
/// `user`, `("user", "name")` is `user.name`.
pub fn append_property(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else if name.is_empty() {
        prefix.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

/// Compose an index access onto a key prefix: `("items", 0)` is
/// `items[0]`, `("lookup", "east")` is `lookup[east]`.
pub fn append_index(prefix: &str, label: impl fmt::Display) -> String {
    format!("{}[{}]", prefix, label)
}

/// Structural prefix test used by prefix scans and subtree suppression.
///
/// The empty prefix covers every key. Otherwise `key` is covered when it
/// equals `prefix` or extends it at a path boundary (`.` or `[`), so
/// `items` covers `items[0]` and `items.len` but never `itemsX`.
pub fn is_path_prefix(prefix: &str, key: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    if !key.starts_with(prefix) {
        return false;
    }
    match key.as_bytes().get(prefix.len()) {
        None => true,
        Some(b'.') | Some(b'[') => true,
        Some(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::both_empty("", "", "")]
    #[case::root_property("", "name", "name")]
    #[case::empty_name("user", "", "user")]
    #[case::nested("user", "name", "user.name")]
    #[case::deep("order.lines", "sku", "order.lines.sku")]
    fn property_composition(#[case] prefix: &str, #[case] name: &str, #[case] want: &str) {
        assert_eq!(append_property(prefix, name), want);
    }

    #[rstest]
    #[case::root_index("", "0", "[0]")]
    #[case::positional("items", "2", "items[2]")]
    #[case::label("lookup", "east", "lookup[east]")]
    fn index_composition(#[case] prefix: &str, #[case] label: &str, #[case] want: &str) {
        assert_eq!(append_index(prefix, label), want);
    }

    #[test]
    fn numeric_labels_format_bare() {
        assert_eq!(append_index("items", 0), "items[0]");
        assert_eq!(append_index("items", 12usize), "items[12]");
    }

    #[rstest]
    #[case::exact("items", "items", true)]
    #[case::index("items", "items[0]", true)]
    #[case::property("items", "items.len", true)]
    #[case::nested("items", "items[0].name", true)]
    #[case::sibling("items", "itemsX", false)]
    #[case::unrelated("items", "orders[0]", false)]
    #[case::shorter("items", "item", false)]
    #[case::empty_covers_all("", "anything[3].x", true)]
    #[case::empty_covers_root("", "", true)]
    fn structural_prefix(#[case] prefix: &str, #[case] key: &str, #[case] want: bool) {
        assert_eq!(is_path_prefix(prefix, key), want);
    }
}
