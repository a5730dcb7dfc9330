//! Validation rules and their providers.
//!
//! Rules are matched to nodes by the provider, not hard-wired: the visitor
//! asks its [`RuleProvider`] for the rules applying to a node's metadata
//! and runs them, required rules first. Findings land in the report under
//! the node's key, or under a member key composed onto it.
//!
//! [`RuleSet`] is the plain registry provider (rules keyed by type tag)
//! and [`FnRule`] wraps a closure, which together cover embedding and
//! testing; anything fancier implements the traits directly.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use kensa_types::{Metadata, NodeId, ObjectGraph, TypeTag};

/// One problem found by a rule.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleFinding {
    /// Member the finding belongs to, composed onto the node's key as a
    /// property access; empty means the node's own key.
    pub member: String,
    pub message: String,
}

impl RuleFinding {
    pub fn new(member: impl Into<String>, message: impl Into<String>) -> Self {
        RuleFinding {
            member: member.into(),
            message: message.into(),
        }
    }

    /// A finding on the node itself.
    pub fn here(message: impl Into<String>) -> Self {
        RuleFinding::new("", message)
    }
}

/// What a rule gets to look at.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'g> {
    pub graph: &'g ObjectGraph,
    /// The node containing the one under validation, when there is one.
    pub container: Option<NodeId>,
    /// The node under validation; `None` when the position has no data.
    pub model: Option<NodeId>,
    pub metadata: &'g Metadata,
}

/// A single validation rule.
pub trait Rule: Send + Sync {
    /// Required rules run before all other rules of a node.
    fn is_required(&self) -> bool {
        false
    }

    /// Inspect the node and report findings. Empty means pass.
    fn check(&self, ctx: &RuleContext<'_>) -> Vec<RuleFinding>;
}

/// Source of the rules applying to a node.
pub trait RuleProvider: Send + Sync {
    fn rules_for(&self, metadata: &Metadata) -> Vec<Arc<dyn Rule>>;
}

/// Order rules for execution: required rules first, provider order
/// preserved within each group.
pub fn order_rules(rules: &mut [Arc<dyn Rule>]) {
    rules.sort_by_key(|rule| !rule.is_required());
}

/// Registry provider: rules keyed by type tag.
#[derive(Default)]
pub struct RuleSet {
    rules: HashMap<TypeTag, Vec<Arc<dyn Rule>>>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule for every node tagged with `tag`.
    pub fn register(&mut self, tag: impl Into<TypeTag>, rule: impl Rule + 'static) {
        self.register_arc(tag, Arc::new(rule));
    }

    /// Register a rule that's already in an `Arc`.
    pub fn register_arc(&mut self, tag: impl Into<TypeTag>, rule: Arc<dyn Rule>) {
        self.rules.entry(tag.into()).or_default().push(rule);
    }

    /// Total number of registered rules.
    pub fn len(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl RuleProvider for RuleSet {
    fn rules_for(&self, metadata: &Metadata) -> Vec<Arc<dyn Rule>> {
        self.rules
            .get(metadata.type_tag())
            .cloned()
            .unwrap_or_default()
    }
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<_> = self
            .rules
            .iter()
            .map(|(tag, rules)| (tag.to_string(), rules.len()))
            .collect();
        tags.sort();
        f.debug_struct("RuleSet").field("tags", &tags).finish()
    }
}

/// Closure-backed rule.
pub struct FnRule<F> {
    required: bool,
    check: F,
}

impl<F> FnRule<F>
where
    F: Fn(&RuleContext<'_>) -> Vec<RuleFinding> + Send + Sync,
{
    pub fn new(check: F) -> Self {
        FnRule {
            required: false,
            check,
        }
    }

    /// A rule that runs before non-required rules of the same node.
    pub fn required(check: F) -> Self {
        FnRule {
            required: true,
            check,
        }
    }
}

impl<F> Rule for FnRule<F>
where
    F: Fn(&RuleContext<'_>) -> Vec<RuleFinding> + Send + Sync,
{
    fn is_required(&self) -> bool {
        self.required
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<RuleFinding> {
        (self.check)(ctx)
    }
}
