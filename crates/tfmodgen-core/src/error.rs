use thiserror::Error;

/// Fatal errors raised while computing an effective shape.
///
/// Either one aborts the whole generation run; there is no partial output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
  #[error(
    "conflicting definitions for property {property:?} in allOf: component {index} defines it differently than \
     previous definition. First defined with type={first_kind}, description={first_description:?}; conflicting \
     definition has type={conflicting_kind}, description={conflicting_description:?}"
  )]
  Conflict {
    property: String,
    index: usize,
    first_kind: String,
    first_description: String,
    conflicting_kind: String,
    conflicting_description: String,
  },

  #[error("circular reference detected in allOf chain: {path}")]
  Cycle { path: String },
}

impl ResolveError {
  /// Property named by a conflict, `None` for cycles.
  #[must_use]
  pub fn property(&self) -> Option<&str> {
    match self {
      Self::Conflict { property, .. } => Some(property),
      Self::Cycle { .. } => None,
    }
  }

  #[must_use]
  pub const fn is_conflict(&self) -> bool {
    matches!(self, Self::Conflict { .. })
  }

  #[must_use]
  pub const fn is_cycle(&self) -> bool {
    matches!(self, Self::Cycle { .. })
  }
}
