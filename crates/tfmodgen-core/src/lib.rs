//! Schema resolution engine behind `tfmodgen`.
//!
//! Works on an in-memory [`SchemaGraph`] built by the caller and never does
//! I/O. The entry points are:
//!
//! - [`ShapeResolver`]: `allOf` composition with conflict and cycle detection
//! - [`are_equivalent`]: the tolerant structural equality used for conflicts
//! - [`ConstraintResolver`]: most-restrictive-wins validation constraints
//! - [`SchemaFlags`]: writability and secrecy predicates

pub mod classify;
pub mod constraints;
pub mod equivalence;
pub mod error;
pub mod graph;
pub mod resolver;

pub use classify::{SchemaFlags, is_secret, is_writable};
pub use constraints::{Bound, ConstraintResolver, ConstraintSet, resolve_constraints};
pub use equivalence::{EquivalenceChecker, are_equivalent};
pub use error::ResolveError;
pub use graph::{SchemaGraph, SchemaId, SchemaKind, SchemaNode};
pub use resolver::{EffectiveShape, ResolverStats, ShapeResolver, resolve_effective_shape};

#[cfg(test)]
mod tests;
