mod classify_tests;

use crate::graph::{SchemaGraph, SchemaId, SchemaKind, SchemaNode};

pub(super) fn string_node(graph: &mut SchemaGraph) -> SchemaId {
  graph.add(SchemaNode::of_kind(SchemaKind::String))
}

pub(super) fn integer_node(graph: &mut SchemaGraph) -> SchemaId {
  graph.add(SchemaNode::of_kind(SchemaKind::Integer))
}

pub(super) fn described(graph: &mut SchemaGraph, kind: SchemaKind, description: &str) -> SchemaId {
  graph.add(SchemaNode::of_kind(kind).with_description(description))
}

pub(super) fn object_with(graph: &mut SchemaGraph, name: &str, properties: &[(&str, SchemaId)]) -> SchemaId {
  let node = properties
    .iter()
    .fold(SchemaNode::object().named(name), |node, (prop, id)| {
      node.with_property(*prop, *id)
    });
  graph.add(node)
}
