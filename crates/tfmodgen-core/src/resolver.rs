use std::{
  collections::{BTreeMap, BTreeSet, HashMap},
  rc::Rc,
};

use indexmap::IndexMap;
use itertools::Itertools;
use serde_json::Value;

use crate::{
  equivalence::EquivalenceChecker,
  error::ResolveError,
  graph::{SchemaGraph, SchemaId, SchemaKind, SchemaNode, kind_label},
};

/// Merged view of a node and everything it composes through `allOf`.
///
/// Property values are still ids into the graph; nested nodes are resolved
/// lazily by whoever walks the tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectiveShape {
  pub kinds: BTreeSet<SchemaKind>,
  pub properties: BTreeMap<String, SchemaId>,
  /// Sorted, without duplicates.
  pub required: Vec<String>,
  /// Every node that declared each property, first-seen first.
  pub declarations: BTreeMap<String, Vec<SchemaId>>,
  pub read_only: bool,
  pub write_only: bool,
  pub description: Option<String>,
  pub extensions: BTreeMap<String, Value>,
  pub items: Option<SchemaId>,
  pub additional_properties: Option<SchemaId>,
}

impl EffectiveShape {
  pub(crate) fn from_node(node: &SchemaNode) -> Self {
    let mut shape = Self {
      kinds: node.kinds.clone(),
      properties: node.properties.clone(),
      required: node.required.clone(),
      declarations: node
        .properties
        .iter()
        .map(|(name, &id)| (name.clone(), vec![id]))
        .collect(),
      read_only: node.read_only,
      write_only: node.write_only,
      description: node.description.clone().filter(|d| !d.is_empty()),
      extensions: node.extensions.clone(),
      items: node.items,
      additional_properties: node.additional_properties,
    };
    shape.normalize_required();
    shape
  }

  fn normalize_required(&mut self) {
    self.required.sort();
    self.required.dedup();
  }

  #[must_use]
  pub fn property(&self, name: &str) -> Option<SchemaId> {
    self.properties.get(name).copied()
  }

  #[must_use]
  pub fn is_required(&self, name: &str) -> bool {
    self.required.binary_search_by(|r| r.as_str().cmp(name)).is_ok()
  }

  #[must_use]
  pub fn declarations_of(&self, name: &str) -> &[SchemaId] {
    self.declarations.get(name).map_or(&[], Vec::as_slice)
  }

  #[must_use]
  pub fn has_kind(&self, kind: SchemaKind) -> bool {
    self.kinds.contains(&kind)
  }

  #[must_use]
  pub fn is_object(&self) -> bool {
    self.has_kind(SchemaKind::Object)
  }

  #[must_use]
  pub fn is_array(&self) -> bool {
    self.has_kind(SchemaKind::Array)
  }

  /// Required names that no property declares anywhere in the composition.
  pub fn undeclared_required(&self) -> impl Iterator<Item = &str> {
    self
      .required
      .iter()
      .filter(|name| !self.properties.contains_key(name.as_str()))
      .map(String::as_str)
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolverStats {
  /// Shapes merged from scratch.
  pub computed: usize,
  /// Lookups answered from the memo cache.
  pub cache_hits: usize,
}

/// Per-run composition resolver.
///
/// Owns the memo cache and the in-progress stack for one generation pass;
/// build a fresh one for every run.
#[derive(Debug)]
pub struct ShapeResolver<'g> {
  graph: &'g SchemaGraph,
  cache: HashMap<SchemaId, Rc<EffectiveShape>>,
  /// Nodes on the active resolution stack, with the `allOf` index they were entered through.
  in_progress: IndexMap<SchemaId, Option<usize>>,
  stats: ResolverStats,
}

impl<'g> ShapeResolver<'g> {
  #[must_use]
  pub fn new(graph: &'g SchemaGraph) -> Self {
    Self {
      graph,
      cache: HashMap::new(),
      in_progress: IndexMap::new(),
      stats: ResolverStats::default(),
    }
  }

  #[must_use]
  pub fn graph(&self) -> &'g SchemaGraph {
    self.graph
  }

  #[must_use]
  pub fn node(&self, id: SchemaId) -> &'g SchemaNode {
    self.graph.node(id)
  }

  #[must_use]
  pub fn stats(&self) -> ResolverStats {
    self.stats
  }

  pub fn resolve(&mut self, id: SchemaId) -> Result<Rc<EffectiveShape>, ResolveError> {
    self.resolve_via(id, None)
  }

  fn resolve_via(&mut self, id: SchemaId, via: Option<usize>) -> Result<Rc<EffectiveShape>, ResolveError> {
    if let Some(shape) = self.cache.get(&id) {
      self.stats.cache_hits += 1;
      return Ok(Rc::clone(shape));
    }

    if self.in_progress.contains_key(&id) {
      return Err(ResolveError::Cycle {
        path: self.cycle_path(id, via),
      });
    }

    self.in_progress.insert(id, via);
    let composed = self.compose(id);
    self.in_progress.pop();

    let shape = Rc::new(composed?);
    self.stats.computed += 1;
    self.cache.insert(id, Rc::clone(&shape));
    Ok(shape)
  }

  fn compose(&mut self, id: SchemaId) -> Result<EffectiveShape, ResolveError> {
    let node = self.graph.node(id);
    let mut shape = EffectiveShape::from_node(node);

    for (index, &component_id) in node.all_of.iter().enumerate() {
      let component = self.resolve_via(component_id, Some(index))?;
      self.absorb(&mut shape, index, &component)?;
    }

    shape.normalize_required();
    Ok(shape)
  }

  fn absorb(&mut self, shape: &mut EffectiveShape, index: usize, component: &EffectiveShape) -> Result<(), ResolveError> {
    for (name, &candidate) in &component.properties {
      let Some(&existing) = shape.properties.get(name) else {
        shape.properties.insert(name.clone(), candidate);
        shape
          .declarations
          .insert(name.clone(), component.declarations_of(name).to_vec());
        continue;
      };

      if !EquivalenceChecker::new(self).equivalent(existing, candidate)? {
        return Err(self.conflict(name, index, existing, candidate));
      }

      let sites = shape.declarations.entry(name.clone()).or_default();
      for &site in component.declarations_of(name) {
        if !sites.contains(&site) {
          sites.push(site);
        }
      }
    }

    shape.required.extend(component.required.iter().cloned());

    if shape.kinds.is_empty() {
      shape.kinds.clone_from(&component.kinds);
    }
    shape.read_only |= component.read_only;
    shape.write_only |= component.write_only;
    if shape.description.is_none() {
      shape.description.clone_from(&component.description);
    }
    for (key, value) in &component.extensions {
      shape.extensions.entry(key.clone()).or_insert_with(|| value.clone());
    }
    shape.items = shape.items.or(component.items);
    shape.additional_properties = shape.additional_properties.or(component.additional_properties);

    Ok(())
  }

  fn conflict(&self, property: &str, index: usize, existing: SchemaId, candidate: SchemaId) -> ResolveError {
    let (first_kind, first_description) = self.summary(existing);
    let (conflicting_kind, conflicting_description) = self.summary(candidate);
    ResolveError::Conflict {
      property: property.to_string(),
      index,
      first_kind,
      first_description,
      conflicting_kind,
      conflicting_description,
    }
  }

  /// Kind label and description of a declaration, composed when it has been resolved.
  fn summary(&self, id: SchemaId) -> (String, String) {
    match self.cache.get(&id) {
      Some(shape) => (kind_label(&shape.kinds), shape.description.clone().unwrap_or_default()),
      None => {
        let node = self.graph.node(id);
        (kind_label(&node.kinds), node.description.clone().unwrap_or_default())
      }
    }
  }

  fn cycle_path(&self, reentered: SchemaId, via: Option<usize>) -> String {
    let start = self.in_progress.get_index_of(&reentered).unwrap_or_default();
    let hops = self
      .in_progress
      .iter()
      .skip(start)
      .map(|(&id, &entered)| (id, entered))
      .skip(1)
      .chain(std::iter::once((reentered, via)))
      .map(|(id, entered)| match entered {
        Some(index) => format!("allOf[{index}] {}", self.graph.display_name(id)),
        None => self.graph.display_name(id),
      });

    std::iter::once(self.graph.display_name(reentered)).chain(hops).join(" -> ")
  }
}

/// Resolves a single node with a throwaway resolver.
pub fn resolve_effective_shape(graph: &SchemaGraph, id: SchemaId) -> Result<EffectiveShape, ResolveError> {
  let shape = ShapeResolver::new(graph).resolve(id)?;
  Ok(Rc::unwrap_or_clone(shape))
}
