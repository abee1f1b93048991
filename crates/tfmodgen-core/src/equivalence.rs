use std::{
  collections::{BTreeSet, HashSet},
  rc::Rc,
};

use crate::{
  constraints::{ConstraintResolver, ConstraintSet},
  error::ResolveError,
  graph::{SchemaGraph, SchemaId, enum_literal},
  resolver::{EffectiveShape, ShapeResolver},
};

/// Structural comparison used to decide whether two `allOf` declarations of
/// the same property agree.
///
/// Both sides are compared as composed: kinds, flags, properties, required,
/// items and map values come from the effective shape, format and every
/// scalar constraint from the `allOf` closure. Documentation is ignored.
#[derive(Debug)]
pub struct EquivalenceChecker<'r, 'g> {
  resolver: &'r mut ShapeResolver<'g>,
  assumed: HashSet<(SchemaId, SchemaId)>,
}

impl<'r, 'g> EquivalenceChecker<'r, 'g> {
  #[must_use]
  pub fn new(resolver: &'r mut ShapeResolver<'g>) -> Self {
    Self {
      resolver,
      assumed: HashSet::new(),
    }
  }

  pub fn equivalent(&mut self, a: SchemaId, b: SchemaId) -> Result<bool, ResolveError> {
    if a == b {
      return Ok(true);
    }

    // A pair already being compared higher up the stack is assumed equal.
    let pair = if a < b { (a, b) } else { (b, a) };
    if !self.assumed.insert(pair) {
      return Ok(true);
    }

    let result = self.compare(a, b);
    self.assumed.remove(&pair);
    result
  }

  fn compare(&mut self, a: SchemaId, b: SchemaId) -> Result<bool, ResolveError> {
    let left = self.shape_of(a)?;
    let right = self.shape_of(b)?;

    if left.kinds != right.kinds || left.read_only != right.read_only || left.write_only != right.write_only {
      return Ok(false);
    }

    let graph = self.resolver.graph();
    if effective_format(graph, a) != effective_format(graph, b) {
      return Ok(false);
    }

    let constraints = ConstraintResolver::new(graph);
    if !constraints_match(&constraints.resolve(a), &constraints.resolve(b)) {
      return Ok(false);
    }

    let objects = left.is_object() || right.is_object() || !left.properties.is_empty() || !right.properties.is_empty();
    if objects && !self.objects_match(&left, &right)? {
      return Ok(false);
    }

    if (left.is_array() || right.is_array()) && !self.optional_match(left.items, right.items)? {
      return Ok(false);
    }

    Ok(true)
  }

  fn objects_match(&mut self, a: &EffectiveShape, b: &EffectiveShape) -> Result<bool, ResolveError> {
    if a.properties.len() != b.properties.len() || a.required != b.required {
      return Ok(false);
    }

    for (name, &left) in &a.properties {
      let Some(&right) = b.properties.get(name) else {
        return Ok(false);
      };
      if !self.equivalent(left, right)? {
        return Ok(false);
      }
    }

    self.optional_match(a.additional_properties, b.additional_properties)
  }

  fn optional_match(&mut self, a: Option<SchemaId>, b: Option<SchemaId>) -> Result<bool, ResolveError> {
    match (a, b) {
      (None, None) => Ok(true),
      (Some(left), Some(right)) => self.equivalent(left, right),
      _ => Ok(false),
    }
  }

  /// Effective shape of `id`. A node that reaches a composition still being
  /// resolved further up is read as declared: getting there through a
  /// property is recursion, and a real cycle is reported when the node
  /// itself is resolved.
  fn shape_of(&mut self, id: SchemaId) -> Result<Rc<EffectiveShape>, ResolveError> {
    match self.resolver.resolve(id) {
      Err(ResolveError::Cycle { .. }) => Ok(Rc::new(EffectiveShape::from_node(self.resolver.node(id)))),
      result => result,
    }
  }
}

/// Own format, else the first non-empty one found through `allOf`.
fn effective_format(graph: &SchemaGraph, id: SchemaId) -> Option<&str> {
  let mut visited = HashSet::new();
  let mut pending = vec![id];
  while let Some(current) = pending.pop() {
    if !visited.insert(current) {
      continue;
    }
    let node = graph.node(current);
    if let Some(format) = node.format.as_deref().filter(|f| !f.is_empty()) {
      return Some(format);
    }
    pending.extend(node.all_of.iter().rev());
  }
  None
}

fn constraints_match(a: &ConstraintSet, b: &ConstraintSet) -> bool {
  a.minimum == b.minimum
    && a.maximum == b.maximum
    && a.min_length == b.min_length
    && a.max_length == b.max_length
    && a.min_items == b.min_items
    && a.max_items == b.max_items
    && a.unique_items == b.unique_items
    && a.multiple_of.len() == b.multiple_of.len()
    && a.multiple_of.iter().all(|divisor| b.multiple_of.contains(divisor))
    && enum_set(a) == enum_set(b)
}

fn enum_set(set: &ConstraintSet) -> Option<BTreeSet<String>> {
  set
    .enum_values
    .as_ref()
    .map(|values| values.iter().map(enum_literal).collect())
}

/// Compares two nodes with a throwaway resolver.
pub fn are_equivalent(graph: &SchemaGraph, a: SchemaId, b: SchemaId) -> Result<bool, ResolveError> {
  let mut resolver = ShapeResolver::new(graph);
  EquivalenceChecker::new(&mut resolver).equivalent(a, b)
}
