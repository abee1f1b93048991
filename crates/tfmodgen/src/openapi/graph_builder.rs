use std::collections::{BTreeSet, HashMap};

use serde_json::{Map, Value};
use tfmodgen_core::{SchemaGraph, SchemaId, SchemaKind, SchemaNode};

use super::locate::LocatedResource;
use crate::{generator::metrics::GenerationWarning, utils::spec::DocumentStore};

const MAX_REF_HOPS: usize = 32;

/// Identity of a schema inside the document store: document key plus pointer.
type RefKey = (String, String);

/// Builds a [`SchemaGraph`] out of the JSON documents in a [`DocumentStore`].
///
/// Every `$ref` target is built once, so two references to the same
/// definition alias one node and a self-referencing definition becomes a
/// cycle in the graph.
pub(crate) struct GraphBuilder<'s> {
  store: &'s DocumentStore,
  graph: SchemaGraph,
  built: HashMap<RefKey, SchemaId>,
  warnings: Vec<GenerationWarning>,
}

impl<'s> GraphBuilder<'s> {
  pub(crate) fn new(store: &'s DocumentStore) -> Self {
    Self {
      store,
      graph: SchemaGraph::new(),
      built: HashMap::new(),
      warnings: Vec::new(),
    }
  }

  /// Builds the schema `value`, found inside the document `document`.
  pub(crate) fn build(&mut self, document: &str, value: &Value) -> SchemaId {
    if let Some(reference) = value.get("$ref").and_then(Value::as_str) {
      return self.build_ref(document, reference);
    }

    let id = self.graph.reserve();
    let node = self.node_from(document, value, None);
    self.graph.replace(id, node);
    id
  }

  /// Builds the request body schema of a located resource.
  pub(crate) fn build_located(&mut self, located: &LocatedResource) -> SchemaId {
    self.build_ref(&located.document, &located.reference())
  }

  pub(crate) fn finish(self) -> (SchemaGraph, Vec<GenerationWarning>) {
    (self.graph, self.warnings)
  }

  fn build_ref(&mut self, document: &str, reference: &str) -> SchemaId {
    let store = self.store;
    let mut aliases = Vec::new();
    let mut current_doc = document.to_string();
    let mut current_ref = reference.to_string();

    for _ in 0..MAX_REF_HOPS {
      let target = store.resolve_ref(&current_doc, &current_ref);
      let (Some(target_doc), Some(value)) = (target.document, target.value) else {
        return self.unresolved(&aliases, reference);
      };

      let key = (target_doc.to_string(), target.pointer.to_string());
      if let Some(&id) = self.built.get(&key) {
        for alias in aliases {
          self.built.insert(alias, id);
        }
        return id;
      }
      aliases.push(key);

      match value.get("$ref").and_then(Value::as_str) {
        Some(next) => {
          current_doc = target_doc.to_string();
          current_ref = next.to_string();
        }
        None => {
          let id = self.graph.reserve();
          for alias in aliases {
            self.built.insert(alias, id);
          }
          let node = self.node_from(target_doc, value, pointer_name(target.pointer));
          self.graph.replace(id, node);
          return id;
        }
      }
    }

    self.unresolved(&aliases, reference)
  }

  fn unresolved(&mut self, aliases: &[RefKey], reference: &str) -> SchemaId {
    self.warnings.push(GenerationWarning::UnresolvedReference {
      reference: reference.to_string(),
    });
    let name = reference.rsplit('/').next().filter(|name| !name.is_empty());
    let id = self.graph.add(SchemaNode {
      name: name.map(str::to_string),
      ..Default::default()
    });
    for alias in aliases {
      self.built.insert(alias.clone(), id);
    }
    id
  }

  fn node_from(&mut self, document: &str, value: &Value, name: Option<String>) -> SchemaNode {
    let Some(object) = value.as_object() else {
      return SchemaNode {
        name,
        ..Default::default()
      };
    };

    let mut node = SchemaNode {
      name,
      kinds: parse_kinds(object.get("type")),
      required: string_list(object.get("required")),
      min_length: object.get("minLength").and_then(Value::as_u64),
      max_length: object.get("maxLength").and_then(Value::as_u64),
      minimum: object.get("minimum").and_then(Value::as_f64),
      maximum: object.get("maximum").and_then(Value::as_f64),
      multiple_of: object.get("multipleOf").and_then(Value::as_f64),
      min_items: object.get("minItems").and_then(Value::as_u64),
      max_items: object.get("maxItems").and_then(Value::as_u64),
      unique_items: flag(object, "uniqueItems"),
      enum_values: object.get("enum").and_then(Value::as_array).cloned().unwrap_or_default(),
      format: object.get("format").and_then(Value::as_str).map(str::to_string),
      read_only: flag(object, "readOnly"),
      write_only: flag(object, "writeOnly"),
      description: object
        .get("description")
        .and_then(Value::as_str)
        .filter(|d| !d.is_empty())
        .map(str::to_string),
      title: object.get("title").and_then(Value::as_str).map(str::to_string),
      extensions: object
        .iter()
        .filter(|(key, _)| key.starts_with("x-"))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect(),
      ..Default::default()
    };

    (node.minimum, node.exclusive_minimum) = exclusive_bound(object, "minimum", "exclusiveMinimum", node.minimum, f64::ge);
    (node.maximum, node.exclusive_maximum) = exclusive_bound(object, "maximum", "exclusiveMaximum", node.maximum, f64::le);

    if let Some(properties) = object.get("properties").and_then(Value::as_object) {
      for (key, schema) in properties {
        let id = self.build(document, schema);
        node.properties.insert(key.clone(), id);
      }
    }

    if let Some(components) = object.get("allOf").and_then(Value::as_array) {
      for component in components {
        let id = self.build(document, component);
        node.all_of.push(id);
      }
    }

    if let Some(items) = object.get("items").filter(|items| items.is_object()) {
      node.items = Some(self.build(document, items));
    }

    if let Some(additional) = object.get("additionalProperties").filter(|value| value.is_object()) {
      node.additional_properties = Some(self.build(document, additional));
    }

    if node.kinds.is_empty() && (!node.properties.is_empty() || node.additional_properties.is_some()) {
      node.kinds.insert(SchemaKind::Object);
    }

    node
  }
}

fn parse_kinds(value: Option<&Value>) -> BTreeSet<SchemaKind> {
  let names: Vec<&str> = match value {
    Some(Value::String(name)) => vec![name.as_str()],
    Some(Value::Array(names)) => names.iter().filter_map(Value::as_str).collect(),
    _ => Vec::new(),
  };
  names.into_iter().filter_map(|name| name.parse().ok()).collect()
}

fn string_list(value: Option<&Value>) -> Vec<String> {
  value
    .and_then(Value::as_array)
    .map(|items| items.iter().filter_map(Value::as_str).map(str::to_string).collect())
    .unwrap_or_default()
}

fn flag(object: &Map<String, Value>, key: &str) -> bool {
  object.get(key).and_then(Value::as_bool).unwrap_or(false)
}

/// Reads a bound in either dialect: Swagger 2 pairs `minimum` with a boolean
/// `exclusiveMinimum`, OpenAPI 3.1 carries the exclusive bound as a number.
fn exclusive_bound(
  object: &Map<String, Value>,
  inclusive_key: &str,
  exclusive_key: &str,
  inclusive: Option<f64>,
  tighter_or_equal: fn(&f64, &f64) -> bool,
) -> (Option<f64>, bool) {
  match object.get(exclusive_key) {
    Some(Value::Bool(exclusive)) => (inclusive, *exclusive && object.contains_key(inclusive_key)),
    Some(value) => match (value.as_f64(), inclusive) {
      (Some(bound), Some(current)) if !tighter_or_equal(&bound, &current) => (Some(current), false),
      (Some(bound), _) => (Some(bound), true),
      (None, _) => (inclusive, false),
    },
    None => (inclusive, false),
  }
}

fn pointer_name(pointer: &str) -> Option<String> {
  pointer
    .rsplit('/')
    .next()
    .filter(|segment| !segment.is_empty())
    .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
}
