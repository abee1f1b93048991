use std::collections::HashSet;

use serde_json::Value;

use crate::graph::{SchemaGraph, SchemaId, SchemaNode, enum_literal};

pub const ENUM_EXTENSION: &str = "x-ms-enum";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
  pub value: f64,
  pub exclusive: bool,
}

impl Bound {
  #[must_use]
  pub const fn inclusive(value: f64) -> Self {
    Self { value, exclusive: false }
  }

  #[must_use]
  pub const fn exclusive(value: f64) -> Self {
    Self { value, exclusive: true }
  }
}

/// Most restrictive constraints across every declaration of one property.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstraintSet {
  pub minimum: Option<Bound>,
  pub maximum: Option<Bound>,
  pub min_length: Option<u64>,
  pub max_length: Option<u64>,
  pub min_items: Option<u64>,
  pub max_items: Option<u64>,
  pub unique_items: bool,
  /// Distinct divisors in declaration order; every one must hold.
  pub multiple_of: Vec<f64>,
  /// `None` when nothing declares an enum. `Some(vec![])` means the
  /// declared sets have no common member.
  pub enum_values: Option<Vec<Value>>,
}

impl ConstraintSet {
  #[must_use]
  pub fn is_empty(&self) -> bool {
    *self == Self::default()
  }

  pub fn absorb(&mut self, node: &SchemaNode) {
    if let Some(value) = node.minimum {
      self.tighten_minimum(Bound {
        value,
        exclusive: node.exclusive_minimum,
      });
    }
    if let Some(value) = node.maximum {
      self.tighten_maximum(Bound {
        value,
        exclusive: node.exclusive_maximum,
      });
    }

    raise(&mut self.min_length, node.min_length);
    lower(&mut self.max_length, node.max_length);
    raise(&mut self.min_items, node.min_items);
    lower(&mut self.max_items, node.max_items);
    self.unique_items |= node.unique_items;

    if let Some(divisor) = node.multiple_of
      && !self.multiple_of.contains(&divisor)
    {
      self.multiple_of.push(divisor);
    }

    let declared = declared_enum(node);
    if !declared.is_empty() {
      self.intersect_enum(declared);
    }
  }

  fn tighten_minimum(&mut self, candidate: Bound) {
    let replace = match self.minimum {
      None => true,
      Some(current) => {
        candidate.value > current.value
          || (candidate.value == current.value && candidate.exclusive && !current.exclusive)
      }
    };
    if replace {
      self.minimum = Some(candidate);
    }
  }

  fn tighten_maximum(&mut self, candidate: Bound) {
    let replace = match self.maximum {
      None => true,
      Some(current) => {
        candidate.value < current.value
          || (candidate.value == current.value && candidate.exclusive && !current.exclusive)
      }
    };
    if replace {
      self.maximum = Some(candidate);
    }
  }

  fn intersect_enum(&mut self, declared: Vec<Value>) {
    if let Some(current) = self.enum_values.as_mut() {
      let allowed = declared.iter().map(enum_literal).collect::<HashSet<_>>();
      current.retain(|value| allowed.contains(&enum_literal(value)));
      return;
    }

    let mut seen = HashSet::new();
    self.enum_values = Some(
      declared
        .into_iter()
        .filter(|value| seen.insert(enum_literal(value)))
        .collect(),
    );
  }
}

fn raise(slot: &mut Option<u64>, candidate: Option<u64>) {
  if let Some(value) = candidate {
    *slot = Some(slot.map_or(value, |current| current.max(value)));
  }
}

fn lower(slot: &mut Option<u64>, candidate: Option<u64>) {
  if let Some(value) = candidate {
    *slot = Some(slot.map_or(value, |current| current.min(value)));
  }
}

fn declared_enum(node: &SchemaNode) -> Vec<Value> {
  if !node.enum_values.is_empty() {
    return node.enum_values.clone();
  }

  node
    .extensions
    .get(ENUM_EXTENSION)
    .and_then(|ext| ext.get("values"))
    .and_then(Value::as_array)
    .map(|values| values.iter().filter_map(|entry| entry.get("value").cloned()).collect())
    .unwrap_or_default()
}

/// Walks a node and its `allOf` components, unflattened, tightening every
/// constraint kind independently.
#[derive(Debug, Clone, Copy)]
pub struct ConstraintResolver<'g> {
  graph: &'g SchemaGraph,
}

impl<'g> ConstraintResolver<'g> {
  #[must_use]
  pub fn new(graph: &'g SchemaGraph) -> Self {
    Self { graph }
  }

  #[must_use]
  pub fn resolve(&self, id: SchemaId) -> ConstraintSet {
    self.resolve_all([id])
  }

  /// Resolves across several declaration sites of the same property.
  #[must_use]
  pub fn resolve_all(&self, ids: impl IntoIterator<Item = SchemaId>) -> ConstraintSet {
    let mut set = ConstraintSet::default();
    let mut visited = HashSet::new();
    for id in ids {
      self.collect(id, &mut set, &mut visited);
    }
    set
  }

  fn collect(&self, id: SchemaId, set: &mut ConstraintSet, visited: &mut HashSet<SchemaId>) {
    if !visited.insert(id) {
      return;
    }
    let node = self.graph.node(id);
    set.absorb(node);
    for &component in &node.all_of {
      self.collect(component, set, visited);
    }
  }
}

#[must_use]
pub fn resolve_constraints(graph: &SchemaGraph, id: SchemaId) -> ConstraintSet {
  ConstraintResolver::new(graph).resolve(id)
}
