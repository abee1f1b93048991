use std::{
  collections::{BTreeMap, BTreeSet},
  fmt,
  ops::Index,
};

use itertools::Itertools;
use serde_json::Value;
use strum::{Display, EnumString};

/// Identity of a node inside a [`SchemaGraph`].
///
/// Two properties that point at the same id alias the same schema; two ids
/// with structurally identical nodes are still distinct schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SchemaId(usize);

impl SchemaId {
  #[must_use]
  pub const fn index(self) -> usize {
    self.0
  }
}

impl fmt::Display for SchemaId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "#{}", self.0)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum SchemaKind {
  String,
  Number,
  Integer,
  Boolean,
  Object,
  Array,
}

/// A single JSON-Schema-like node.
///
/// An empty `kinds` set marks the node as unresolved, which every consumer
/// treats permissively.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaNode {
  /// Component name the node was loaded from, used only for diagnostics.
  pub name: Option<String>,
  pub kinds: BTreeSet<SchemaKind>,
  pub properties: BTreeMap<String, SchemaId>,
  pub required: Vec<String>,
  pub all_of: Vec<SchemaId>,
  pub items: Option<SchemaId>,
  pub additional_properties: Option<SchemaId>,
  pub min_length: Option<u64>,
  pub max_length: Option<u64>,
  pub minimum: Option<f64>,
  pub exclusive_minimum: bool,
  pub maximum: Option<f64>,
  pub exclusive_maximum: bool,
  pub multiple_of: Option<f64>,
  pub min_items: Option<u64>,
  pub max_items: Option<u64>,
  pub unique_items: bool,
  pub enum_values: Vec<Value>,
  pub format: Option<String>,
  pub read_only: bool,
  pub write_only: bool,
  pub description: Option<String>,
  pub title: Option<String>,
  pub extensions: BTreeMap<String, Value>,
}

impl SchemaNode {
  #[must_use]
  pub fn of_kind(kind: SchemaKind) -> Self {
    Self {
      kinds: BTreeSet::from([kind]),
      ..Default::default()
    }
  }

  #[must_use]
  pub fn object() -> Self {
    Self::of_kind(SchemaKind::Object)
  }

  #[must_use]
  pub fn named(mut self, name: impl Into<String>) -> Self {
    self.name = Some(name.into());
    self
  }

  #[must_use]
  pub fn with_property(mut self, name: impl Into<String>, id: SchemaId) -> Self {
    self.properties.insert(name.into(), id);
    self
  }

  #[must_use]
  pub fn with_required<I, S>(mut self, names: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.required.extend(names.into_iter().map(Into::into));
    self
  }

  #[must_use]
  pub fn with_all_of(mut self, components: impl IntoIterator<Item = SchemaId>) -> Self {
    self.all_of.extend(components);
    self
  }

  #[must_use]
  pub fn with_items(mut self, items: SchemaId) -> Self {
    self.items = Some(items);
    self
  }

  #[must_use]
  pub fn with_description(mut self, description: impl Into<String>) -> Self {
    self.description = Some(description.into());
    self
  }

  #[must_use]
  pub fn with_extension(mut self, key: impl Into<String>, value: Value) -> Self {
    self.extensions.insert(key.into(), value);
    self
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

  #[must_use]
  pub fn is_unresolved(&self) -> bool {
    self.kinds.is_empty()
  }

  #[must_use]
  pub fn kind_label(&self) -> String {
    kind_label(&self.kinds)
  }
}

/// Human readable summary of a kind set, `unknown` when unresolved.
#[must_use]
pub fn kind_label(kinds: &BTreeSet<SchemaKind>) -> String {
  if kinds.is_empty() {
    "unknown".to_string()
  } else {
    kinds.iter().join("|")
  }
}

/// String form used whenever enum members are compared generically, so that
/// the number `1` and the string `"1"` are the same member.
#[must_use]
pub fn enum_literal(value: &Value) -> String {
  match value {
    Value::String(s) => s.clone(),
    other => other.to_string(),
  }
}

/// Arena owning every node of one generation run.
///
/// Links between nodes are [`SchemaId`]s, so aliasing and cycles need no
/// shared ownership. The graph is only mutated while it is being built.
#[derive(Debug, Clone, Default)]
pub struct SchemaGraph {
  nodes: Vec<SchemaNode>,
}

impl SchemaGraph {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  pub fn add(&mut self, node: SchemaNode) -> SchemaId {
    self.nodes.push(node);
    SchemaId(self.nodes.len() - 1)
  }

  /// Reserves an id for a node whose links are not known yet.
  ///
  /// The slot holds an unresolved node until [`SchemaGraph::replace`] fills it.
  pub fn reserve(&mut self) -> SchemaId {
    self.add(SchemaNode::default())
  }

  pub fn replace(&mut self, id: SchemaId, node: SchemaNode) -> SchemaNode {
    std::mem::replace(&mut self.nodes[id.0], node)
  }

  #[must_use]
  pub fn node(&self, id: SchemaId) -> &SchemaNode {
    &self.nodes[id.0]
  }

  #[must_use]
  pub fn get(&self, id: SchemaId) -> Option<&SchemaNode> {
    self.nodes.get(id.0)
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (SchemaId, &SchemaNode)> {
    self.nodes.iter().enumerate().map(|(i, node)| (SchemaId(i), node))
  }

  /// Component name of the node, or its id when it was declared inline.
  #[must_use]
  pub fn display_name(&self, id: SchemaId) -> String {
    self
      .get(id)
      .and_then(|node| node.name.clone())
      .unwrap_or_else(|| id.to_string())
  }
}

impl Index<SchemaId> for SchemaGraph {
  type Output = SchemaNode;

  fn index(&self, id: SchemaId) -> &Self::Output {
    self.node(id)
  }
}
