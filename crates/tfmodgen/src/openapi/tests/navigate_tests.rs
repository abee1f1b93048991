use serde_json::json;
use tfmodgen_core::ShapeResolver;

use super::{storage_spec, store};
use crate::openapi::{GraphBuilder, navigate};

#[test]
fn test_navigate_through_references() {
  let store = store(storage_spec());
  let mut builder = GraphBuilder::new(&store);
  let root = builder.build(store.root_key(), &json!({ "$ref": "#/definitions/StorageAccountCreateParameters" }));
  let (graph, _) = builder.finish();
  let mut resolver = ShapeResolver::new(&graph);

  assert_eq!(navigate(&mut resolver, root, "").unwrap(), Some(root));

  let properties = navigate(&mut resolver, root, "properties").unwrap().unwrap();
  assert_eq!(graph.node(properties).name.as_deref(), Some("StorageAccountPropertiesCreateParameters"));

  let tier = navigate(&mut resolver, root, "properties.accessTier").unwrap().unwrap();
  assert_eq!(graph.node(tier).enum_values.len(), 2);
}

#[test]
fn test_navigate_stops_at_read_only_segment() {
  let store = store(storage_spec());
  let mut builder = GraphBuilder::new(&store);
  let root = builder.build(store.root_key(), &json!({ "$ref": "#/definitions/StorageAccountCreateParameters" }));
  let (graph, _) = builder.finish();
  let mut resolver = ShapeResolver::new(&graph);

  assert_eq!(navigate(&mut resolver, root, "sku.tier").unwrap(), None);
  assert_eq!(navigate(&mut resolver, root, "properties.primaryEndpoints").unwrap(), None);
}

#[test]
fn test_navigate_errors() {
  let store = store(storage_spec());
  let mut builder = GraphBuilder::new(&store);
  let root = builder.build(store.root_key(), &json!({ "$ref": "#/definitions/StorageAccountCreateParameters" }));
  let (graph, _) = builder.finish();
  let mut resolver = ShapeResolver::new(&graph);

  let missing = navigate(&mut resolver, root, "properties.nope").unwrap_err();
  assert_eq!(missing.to_string(), "property nope not found");

  let leaf = navigate(&mut resolver, root, "location.value").unwrap_err();
  assert_eq!(leaf.to_string(), "path segment value not found: schema has no properties");
}

#[test]
fn test_navigate_sees_inherited_properties() {
  let store = store(json!({
    "definitions": {
      "Base": { "type": "object", "properties": { "identity": { "$ref": "#/definitions/Identity" } } },
      "Identity": { "type": "object", "properties": { "type": { "type": "string" } } },
      "Derived": { "allOf": [{ "$ref": "#/definitions/Base" }] }
    }
  }));
  let mut builder = GraphBuilder::new(&store);
  let root = builder.build(store.root_key(), &json!({ "$ref": "#/definitions/Derived" }));
  let (graph, _) = builder.finish();
  let mut resolver = ShapeResolver::new(&graph);

  assert!(navigate(&mut resolver, root, "identity.type").unwrap().is_some());
}
