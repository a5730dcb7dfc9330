//! kensa-kernel (検査): The validation engine of kensa.
//!
//! This crate provides:
//!
//! - **Report**: per-field statuses and error messages behind a global
//!   error budget
//! - **Strategies**: pluggable producers of a node's children
//!   (positional, explicit-index, map pair/value forms, record
//!   properties)
//! - **Rules**: type-matched validation rules and their providers
//! - **Overrides**: per-node replacement of key, metadata or strategy,
//!   or outright suppression
//! - **Visitor**: the depth-first walk tying it together, with identity
//!   cycle detection and a recursion depth limit
//!
//! # Example
//!
//! ```
//! use kensa_kernel::{
//!     FieldReport, FieldStatus, FnRule, RuleContext, RuleFinding, RuleSet, Visitor,
//! };
//! use kensa_kernel::{Metadata, ObjectGraph, Scalar};
//!
//! let mut graph = ObjectGraph::new();
//! let name = graph.add_scalar("");
//! let user = graph.add_record(vec![("name", name)]);
//!
//! let metadata = Metadata::record("user", vec![("name", Metadata::leaf("name"))]);
//!
//! let mut rules = RuleSet::new();
//! rules.register(
//!     "name",
//!     FnRule::required(|ctx: &RuleContext<'_>| {
//!         match ctx.model.and_then(|m| ctx.graph.scalar(m)) {
//!             Some(Scalar::String(s)) if s.is_empty() => {
//!                 vec![RuleFinding::here("must not be empty")]
//!             }
//!             _ => vec![],
//!         }
//!     }),
//! );
//!
//! let mut report = FieldReport::new();
//! let ok = Visitor::new(&graph, &rules, &mut report)
//!     .validate(&metadata, "user", Some(user))
//!     .unwrap();
//!
//! assert!(!ok);
//! assert_eq!(report.status("user.name"), FieldStatus::Invalid);
//! ```

pub mod exclude;
pub mod overrides;
pub mod report;
pub mod rules;
pub mod strategy;
pub mod visitor;

pub use exclude::{TypeExcludeFilter, TypeExcludeSet};
pub use overrides::{NodeOverride, OverrideMap};
pub use report::{FieldEntry, FieldReport, FieldStatus, DEFAULT_MAX_ERRORS};
pub use rules::{FnRule, Rule, RuleContext, RuleFinding, RuleProvider, RuleSet};
pub use strategy::{
    DefaultCollectionStrategy, DefaultRecordStrategy, ExplicitIndexCollectionStrategy,
    ExplicitIndexMapStrategy, ExplicitIndexMapValueStrategy, TraversalStrategy, ValidationEntry,
};
pub use visitor::{DepthLimitExceeded, Visitor, DEFAULT_MAX_DEPTH};

// Re-exported so embedders can depend on this crate alone.
pub use kensa_types::{
    key, Metadata, MetadataRef, NodeData, NodeId, NodeKind, ObjectGraph, Property, Scalar,
    SelfHandle, TypeTag,
};
