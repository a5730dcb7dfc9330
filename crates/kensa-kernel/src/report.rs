//! Per-field validation report.
//!
//! The report is the accumulator the visitor writes into: one entry per
//! touched field key, each with a status and its error messages, plus the
//! global error budget. Keys are ordered, so everything under a subtree
//! can be found with a structural prefix scan (`items` covers `items[0]`
//! and `items.len` but not `itemsX`).

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Bound;

use kensa_types::key;
use serde::Serialize;

/// Default cap on recorded error messages per report.
pub const DEFAULT_MAX_ERRORS: usize = 200;

/// Validation status of one field key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldStatus {
    /// Not examined, or deliberately left untouched.
    Unvalidated,
    /// Examined and passed.
    Valid,
    /// At least one recorded error.
    Invalid,
    /// Deliberately not validated (suppressed or over budget).
    Skipped,
}

impl fmt::Display for FieldStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldStatus::Unvalidated => write!(f, "unvalidated"),
            FieldStatus::Valid => write!(f, "valid"),
            FieldStatus::Invalid => write!(f, "invalid"),
            FieldStatus::Skipped => write!(f, "skipped"),
        }
    }
}

/// Report entry for one field key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldEntry {
    pub status: FieldStatus,
    pub errors: Vec<String>,
}

impl Default for FieldEntry {
    fn default() -> Self {
        FieldEntry {
            status: FieldStatus::Unvalidated,
            errors: Vec::new(),
        }
    }
}

/// Ordered per-field report with an error budget.
///
/// Status transitions are one-way in practice: `Invalid` is never
/// rewritten to `Valid` by success bookkeeping, and once the budget is
/// exhausted further work only produces `Skipped`.
#[derive(Debug, Clone, Serialize)]
pub struct FieldReport {
    entries: BTreeMap<String, FieldEntry>,
    #[serde(skip)]
    max_errors: usize,
    #[serde(skip)]
    error_count: usize,
}

impl FieldReport {
    pub fn new() -> Self {
        Self::with_max_errors(DEFAULT_MAX_ERRORS)
    }

    /// A report that stops recording after `max_errors` messages.
    pub fn with_max_errors(max_errors: usize) -> Self {
        FieldReport {
            entries: BTreeMap::new(),
            max_errors,
            error_count: 0,
        }
    }

    pub fn max_errors(&self) -> usize {
        self.max_errors
    }

    /// Number of recorded error messages across all keys.
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// True once the budget is spent; from here on touched keys are only
    /// ever marked `Skipped`.
    pub fn budget_exhausted(&self) -> bool {
        self.error_count >= self.max_errors
    }

    /// Status of exactly this key. Missing keys are `Unvalidated`.
    pub fn status(&self, key: &str) -> FieldStatus {
        self.entries
            .get(key)
            .map(|e| e.status)
            .unwrap_or(FieldStatus::Unvalidated)
    }

    /// Aggregate status of a key and everything structurally under it:
    /// no entries at all is `Unvalidated`, any `Invalid` wins, otherwise
    /// `Valid`. An error recorded under `user.name` makes the field
    /// status of `user` invalid.
    pub fn field_status(&self, key: &str) -> FieldStatus {
        let mut seen = false;
        for (_, entry) in self.entries_with_prefix(key) {
            if entry.status == FieldStatus::Invalid {
                return FieldStatus::Invalid;
            }
            seen = true;
        }
        if seen {
            FieldStatus::Valid
        } else {
            FieldStatus::Unvalidated
        }
    }

    /// Set the status of a key, creating the entry if needed.
    pub fn set_status(&mut self, key: &str, status: FieldStatus) {
        self.entries.entry(key.to_string()).or_default().status = status;
    }

    /// Record an error message under a key.
    ///
    /// With the budget exhausted the key is marked `Skipped` instead and
    /// nothing is recorded. A message already present under the key is
    /// not duplicated and consumes no budget. Returns whether the message
    /// was recorded.
    pub fn add_error(&mut self, key: &str, message: impl Into<String>) -> bool {
        if self.budget_exhausted() {
            self.set_status(key, FieldStatus::Skipped);
            return false;
        }
        let entry = self.entries.entry(key.to_string()).or_default();
        let message = message.into();
        if entry.errors.contains(&message) {
            return false;
        }
        entry.errors.push(message);
        entry.status = FieldStatus::Invalid;
        self.error_count += 1;
        true
    }

    /// Mark a key `Valid`, creating the entry if needed. An `Invalid`
    /// entry stays invalid.
    pub fn mark_field_valid(&mut self, key: &str) {
        let entry = self.entries.entry(key.to_string()).or_default();
        if entry.status != FieldStatus::Invalid {
            entry.status = FieldStatus::Valid;
        }
    }

    /// Mark a key `Valid` only when an entry already exists; success never
    /// creates entries. An `Invalid` entry stays invalid.
    pub fn mark_valid_if_present(&mut self, key: &str) {
        if let Some(entry) = self.entries.get_mut(key) {
            if entry.status != FieldStatus::Invalid {
                entry.status = FieldStatus::Valid;
            }
        }
    }

    /// Mark every existing entry structurally under `prefix` as `Skipped`.
    /// Keys without entries stay absent; suppression never creates them.
    pub fn mark_subtree_skipped(&mut self, prefix: &str) {
        for (_, entry) in self
            .entries
            .range_mut::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|(k, _)| k.starts_with(prefix))
            .filter(|(k, _)| key::is_path_prefix(prefix, k))
        {
            entry.status = FieldStatus::Skipped;
        }
    }

    fn entries_with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a FieldEntry)> {
        self.entries
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(move |(k, _)| k.starts_with(prefix))
            .filter(move |(k, _)| key::is_path_prefix(prefix, k))
            .map(|(k, entry)| (k.as_str(), entry))
    }

    /// Keys structurally under `prefix`, in order. The empty prefix
    /// covers every key.
    pub fn keys_with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> {
        self.entries_with_prefix(prefix).map(|(k, _)| k)
    }

    /// Error messages recorded under exactly this key.
    pub fn errors_for(&self, key: &str) -> &[String] {
        self.entries
            .get(key)
            .map(|e| e.errors.as_slice())
            .unwrap_or(&[])
    }

    pub fn get(&self, key: &str) -> Option<&FieldEntry> {
        self.entries.get(key)
    }

    /// All entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldEntry)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    /// True while no key is `Invalid`.
    pub fn is_valid(&self) -> bool {
        self.entries
            .values()
            .all(|e| e.status != FieldStatus::Invalid)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for FieldReport {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FieldReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, entry) in &self.entries {
            let key = if key.is_empty() { "(root)" } else { key };
            write!(f, "{}: {}", key, entry.status)?;
            for error in &entry.errors {
                write!(f, "\n  - {}", error)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_are_unvalidated() {
        let report = FieldReport::new();
        assert_eq!(report.status("nope"), FieldStatus::Unvalidated);
        assert_eq!(report.field_status("nope"), FieldStatus::Unvalidated);
        assert!(report.is_valid());
        assert!(report.is_empty());
    }

    #[test]
    fn add_error_marks_invalid() {
        let mut report = FieldReport::new();
        assert!(report.add_error("user.name", "required"));
        assert_eq!(report.status("user.name"), FieldStatus::Invalid);
        assert_eq!(report.errors_for("user.name"), ["required"]);
        assert_eq!(report.error_count(), 1);
        assert!(!report.is_valid());
    }

    #[test]
    fn duplicate_messages_are_dropped() {
        let mut report = FieldReport::new();
        assert!(report.add_error("k", "bad"));
        assert!(!report.add_error("k", "bad"));
        assert!(report.add_error("k", "worse"));
        assert_eq!(report.errors_for("k"), ["bad", "worse"]);
        assert_eq!(report.error_count(), 2);
    }

    #[test]
    fn budget_stops_recording() {
        let mut report = FieldReport::with_max_errors(2);
        assert!(report.add_error("a", "one"));
        assert!(report.add_error("b", "two"));
        assert!(report.budget_exhausted());

        assert!(!report.add_error("c", "three"));
        assert_eq!(report.status("c"), FieldStatus::Skipped);
        assert!(report.errors_for("c").is_empty());
        assert_eq!(report.error_count(), 2);
    }

    #[test]
    fn invalid_is_never_rewritten_to_valid() {
        let mut report = FieldReport::new();
        report.add_error("k", "bad");
        report.mark_field_valid("k");
        assert_eq!(report.status("k"), FieldStatus::Invalid);
        report.mark_valid_if_present("k");
        assert_eq!(report.status("k"), FieldStatus::Invalid);
    }

    #[test]
    fn mark_field_valid_creates_entries() {
        let mut report = FieldReport::new();
        report.mark_field_valid("k");
        assert_eq!(report.status("k"), FieldStatus::Valid);
    }

    #[test]
    fn mark_valid_if_present_never_creates() {
        let mut report = FieldReport::new();
        report.mark_valid_if_present("k");
        assert_eq!(report.status("k"), FieldStatus::Unvalidated);
        assert!(report.get("k").is_none());

        report.set_status("k", FieldStatus::Unvalidated);
        report.mark_valid_if_present("k");
        assert_eq!(report.status("k"), FieldStatus::Valid);
    }

    #[test]
    fn field_status_aggregates_subtree() {
        let mut report = FieldReport::new();
        report.set_status("user", FieldStatus::Valid);
        report.add_error("user.name", "required");
        assert_eq!(report.field_status("user"), FieldStatus::Invalid);
        assert_eq!(report.status("user"), FieldStatus::Valid);

        let mut clean = FieldReport::new();
        clean.set_status("user.name", FieldStatus::Valid);
        assert_eq!(clean.field_status("user"), FieldStatus::Valid);
    }

    #[test]
    fn prefix_scan_is_structural() {
        let mut report = FieldReport::new();
        report.set_status("items", FieldStatus::Valid);
        report.set_status("items[0]", FieldStatus::Valid);
        report.set_status("items[0].name", FieldStatus::Valid);
        report.set_status("items.len", FieldStatus::Valid);
        report.set_status("itemsX", FieldStatus::Valid);

        let keys: Vec<_> = report.keys_with_prefix("items").collect();
        assert_eq!(keys, ["items", "items.len", "items[0]", "items[0].name"]);
    }

    #[test]
    fn subtree_skip_only_touches_existing() {
        let mut report = FieldReport::new();
        report.set_status("items[0]", FieldStatus::Valid);
        report.add_error("items[1]", "bad");
        report.set_status("itemsX", FieldStatus::Valid);

        report.mark_subtree_skipped("items");
        assert_eq!(report.status("items[0]"), FieldStatus::Skipped);
        assert_eq!(report.status("items[1]"), FieldStatus::Skipped);
        assert_eq!(report.status("itemsX"), FieldStatus::Valid);
        assert_eq!(report.status("items"), FieldStatus::Unvalidated);
        assert!(report.get("items").is_none());
    }

    #[test]
    fn empty_prefix_skips_everything() {
        let mut report = FieldReport::new();
        report.set_status("a", FieldStatus::Valid);
        report.set_status("b[0]", FieldStatus::Valid);
        report.mark_subtree_skipped("");
        assert_eq!(report.status("a"), FieldStatus::Skipped);
        assert_eq!(report.status("b[0]"), FieldStatus::Skipped);
    }

    #[test]
    fn serializes_entries_in_key_order() {
        let mut report = FieldReport::new();
        report.add_error("b", "bad");
        report.set_status("a", FieldStatus::Valid);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["entries"]["a"]["status"], "Valid");
        assert_eq!(json["entries"]["b"]["errors"][0], "bad");
    }

    #[test]
    fn display_renders_root_and_messages() {
        let mut report = FieldReport::new();
        report.add_error("", "broken");
        report.set_status("x", FieldStatus::Skipped);
        let text = report.to_string();
        assert!(text.contains("(root): invalid"));
        assert!(text.contains("- broken"));
        assert!(text.contains("x: skipped"));
    }
}
