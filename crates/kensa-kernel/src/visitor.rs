//! The validation visitor.
//!
//! One `Visitor` drives one depth-first walk over an object graph: it
//! resolves per-node overrides, asks a strategy for each node's children,
//! runs node-level rules through the provider, and writes statuses and
//! errors into the borrowed [`FieldReport`].
//!
//! Traversal context travels *down* as an immutable `Frame` value per
//! recursive call; unwinding restores it for free. The only shared
//! mutable traversal state is the active-path set used for cycle
//! detection and the depth counter, and both are restored on every exit
//! path.

use std::collections::HashSet;
use std::sync::Arc;

use kensa_types::{key, Metadata, NodeId, NodeKind, ObjectGraph};
use thiserror::Error;

use crate::exclude::TypeExcludeFilter;
use crate::overrides::{NodeOverride, OverrideMap};
use crate::report::{FieldReport, FieldStatus};
use crate::rules::{order_rules, RuleContext, RuleProvider};
use crate::strategy::{
    DefaultCollectionStrategy, DefaultRecordStrategy, TraversalStrategy, ValidationEntry,
};

/// Default cap on recursion depth.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Fatal abort: the walk went deeper than the configured limit.
///
/// Unlike validation failures, which are data in the report, this aborts
/// the whole top-level call; the report must not be treated as complete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation aborted: depth limit {limit} exceeded at '{key}'")]
pub struct DepthLimitExceeded {
    /// The configured limit.
    pub limit: usize,
    /// Report key at which the walk stopped.
    pub key: String,
}

/// Traversal context for one node, built by the parent and consumed by
/// the recursive call.
struct Frame {
    container: Option<NodeId>,
    key: String,
    metadata: Arc<Metadata>,
    model: Option<NodeId>,
    strategy: Option<Arc<dyn TraversalStrategy>>,
}

/// Depth-first validation walk over one object graph.
///
/// A visitor drives one top-level [`validate`] call at a time; run
/// independent walks with independent visitors. The report borrow makes
/// the single-writer rule a compile-time guarantee.
///
/// [`validate`]: Visitor::validate
pub struct Visitor<'a> {
    graph: &'a ObjectGraph,
    rules: &'a dyn RuleProvider,
    report: &'a mut FieldReport,
    overrides: Option<&'a OverrideMap>,
    exclude_filters: Vec<Arc<dyn TypeExcludeFilter>>,
    max_depth: usize,
    active_path: HashSet<NodeId>,
    depth: usize,
}

impl<'a> Visitor<'a> {
    pub fn new(
        graph: &'a ObjectGraph,
        rules: &'a dyn RuleProvider,
        report: &'a mut FieldReport,
    ) -> Self {
        Visitor {
            graph,
            rules,
            report,
            overrides: None,
            exclude_filters: Vec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            active_path: HashSet::new(),
            depth: 0,
        }
    }

    /// Consult `overrides` for per-node replacements during the walk.
    pub fn with_overrides(mut self, overrides: &'a OverrideMap) -> Self {
        self.overrides = Some(overrides);
        self
    }

    /// Add one exclude filter.
    pub fn with_exclude_filter(mut self, filter: impl TypeExcludeFilter + 'static) -> Self {
        self.exclude_filters.push(Arc::new(filter));
        self
    }

    /// Replace the exclude filter list, e.g. with one shared across
    /// visitors.
    pub fn with_exclude_filters(mut self, filters: Vec<Arc<dyn TypeExcludeFilter>>) -> Self {
        self.exclude_filters = filters;
        self
    }

    /// Cap recursion depth; exceeding it aborts with
    /// [`DepthLimitExceeded`].
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Validate `model` against `metadata`, reporting under `key` (empty
    /// for the root). Returns whether the validated subtree is free of
    /// errors.
    ///
    /// An absent model marks the field valid (unless already invalid) and
    /// succeeds: absence is judged by rules on the *containing* node, not
    /// here. With the error budget already spent, the subtree is skipped
    /// and the call reports failure without recording anything.
    pub fn validate(
        &mut self,
        metadata: &Arc<Metadata>,
        key: &str,
        model: Option<NodeId>,
    ) -> Result<bool, DepthLimitExceeded> {
        let Some(model) = model else {
            self.report.mark_field_valid(key);
            return Ok(true);
        };

        let replacement = self.lookup_override(model);
        let key = replacement
            .and_then(|o| o.key.as_deref())
            .unwrap_or(key)
            .to_string();
        let metadata = replacement
            .and_then(|o| o.metadata.clone())
            .unwrap_or_else(|| metadata.clone());
        let strategy = replacement.and_then(|o| o.strategy.clone());

        if replacement.is_some_and(|o| o.suppress) || self.report.budget_exhausted() {
            self.suppress_subtree(&key);
            return Ok(false);
        }

        self.visit(Frame {
            container: None,
            key,
            metadata,
            model: Some(model),
            strategy,
        })
    }

    fn visit(&mut self, frame: Frame) -> Result<bool, DepthLimitExceeded> {
        if self.depth >= self.max_depth {
            return Err(DepthLimitExceeded {
                limit: self.max_depth,
                key: frame.key,
            });
        }

        if let Some(model) = frame.model {
            // A model already on the active path is a cycle; assume the
            // ancestor visit answers for it.
            if !self.active_path.insert(model) {
                tracing::trace!("cycle at {}, skipping revisit of '{}'", model, frame.key);
                return Ok(true);
            }
        }

        self.depth += 1;
        let result = match frame.metadata.kind() {
            NodeKind::Enumerable => self.visit_enumerable(&frame),
            NodeKind::Composite => self.visit_composite(&frame),
            NodeKind::Leaf => Ok(self.visit_leaf(&frame)),
        };
        self.depth -= 1;

        if let Some(model) = frame.model {
            self.active_path.remove(&model);
        }
        result
    }

    fn visit_enumerable(&mut self, frame: &Frame) -> Result<bool, DepthLimitExceeded> {
        let mut is_valid = true;

        if let Some(model) = frame.model {
            let graph = self.graph;
            let strategy: &dyn TraversalStrategy = match &frame.strategy {
                Some(s) => s.as_ref(),
                None => &DefaultCollectionStrategy,
            };
            for entry in strategy.children(graph, &frame.metadata, &frame.key, model) {
                if !self.visit_child(frame, entry)? {
                    is_valid = false;
                }
            }
        }

        Ok(self.finish_node(frame, is_valid))
    }

    fn visit_composite(&mut self, frame: &Frame) -> Result<bool, DepthLimitExceeded> {
        let mut is_valid = true;

        if let Some(model) = frame.model {
            if self.is_type_excluded(&frame.metadata) {
                self.suppress_subtree(&frame.key);
            } else {
                let graph = self.graph;
                let strategy: &dyn TraversalStrategy = match &frame.strategy {
                    Some(s) => s.as_ref(),
                    None => &DefaultRecordStrategy,
                };
                for entry in strategy.children(graph, &frame.metadata, &frame.key, model) {
                    if !self.visit_child(frame, entry)? {
                        is_valid = false;
                    }
                }
            }
        }

        Ok(self.finish_node(frame, is_valid))
    }

    fn visit_leaf(&mut self, frame: &Frame) -> bool {
        if self.report.budget_exhausted() {
            self.suppress_subtree(&frame.key);
            return false;
        }
        self.validate_node(frame)
    }

    /// One child position: resolve its override, then suppress or recurse.
    fn visit_child(
        &mut self,
        parent: &Frame,
        entry: ValidationEntry,
    ) -> Result<bool, DepthLimitExceeded> {
        let ValidationEntry {
            key,
            metadata,
            model,
        } = entry;

        let replacement = model.and_then(|m| self.lookup_override(m));
        let key = replacement.and_then(|o| o.key.clone()).unwrap_or(key);
        let metadata = replacement
            .and_then(|o| o.metadata.clone())
            .unwrap_or(metadata);
        let strategy = replacement.and_then(|o| o.strategy.clone());

        if replacement.is_some_and(|o| o.suppress) || self.report.budget_exhausted() {
            // Suppressed children do not count against the parent.
            self.suppress_subtree(&key);
            return Ok(true);
        }

        self.visit(Frame {
            container: parent.model,
            key,
            metadata,
            model,
            strategy,
        })
    }

    /// Trailing node-rule step shared by enumerables and composites. The
    /// budget is re-checked because a child may have spent it.
    fn finish_node(&mut self, frame: &Frame, mut is_valid: bool) -> bool {
        if is_valid && !self.report.budget_exhausted() {
            is_valid &= self.validate_node(frame);
        }
        is_valid
    }

    /// Run node-level rules for the current frame and fold the outcome
    /// into the report.
    fn validate_node(&mut self, frame: &Frame) -> bool {
        let mut rules = self.rules.rules_for(&frame.metadata);
        if !rules.is_empty() {
            order_rules(&mut rules);

            let ctx = RuleContext {
                graph: self.graph,
                container: frame.container,
                model: frame.model,
                metadata: &frame.metadata,
            };
            let mut findings = Vec::new();
            for rule in &rules {
                findings.extend(rule.check(&ctx));
            }
            for finding in findings {
                let key = key::append_property(&frame.key, &finding.member);
                self.report.add_error(&key, finding.message);
            }
        }

        // Anything invalid under this key, including member keys the
        // rules just wrote, makes the node invalid.
        if self.report.field_status(&frame.key) == FieldStatus::Invalid {
            return false;
        }
        self.report.mark_valid_if_present(&frame.key);
        true
    }

    fn suppress_subtree(&mut self, key: &str) {
        tracing::debug!("suppressing validation under '{}'", key);
        self.report.mark_subtree_skipped(key);
    }

    fn is_type_excluded(&self, metadata: &Metadata) -> bool {
        self.exclude_filters
            .iter()
            .any(|f| f.is_excluded(metadata.type_tag()))
    }

    fn lookup_override(&self, model: NodeId) -> Option<&'a NodeOverride> {
        self.overrides.and_then(|map| map.get(model))
    }
}
