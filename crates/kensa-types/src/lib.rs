//! kensa-types: Pure data types for kensa (検査).
//!
//! This crate provides:
//!
//! - **Scalars**: leaf values carried by graph nodes
//! - **Object graph**: an arena of nodes with identity, the thing being
//!   validated
//! - **Metadata**: shape descriptors (leaf / enumerable / composite) that
//!   tell the engine how to traverse each position
//! - **Keys**: field-key composition mirroring the external path
//!   convention (`user.name`, `items[0]`)
//!
//! Nothing here validates anything; the engine lives in `kensa-kernel`.

pub mod graph;
pub mod key;
pub mod metadata;
pub mod scalar;

pub use graph::{NodeData, NodeId, ObjectGraph};
pub use metadata::{Metadata, MetadataRef, NodeKind, Property, SelfHandle, TypeTag};
pub use scalar::Scalar;
