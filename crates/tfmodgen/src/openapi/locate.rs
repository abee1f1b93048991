use anyhow::bail;
use serde_json::Value;

use crate::utils::spec::DocumentStore;

const PATH_SECTIONS: [&str; 2] = ["paths", "x-ms-paths"];
const SCHEMA_SECTIONS: [&str; 2] = ["/definitions", "/components/schemas"];
const MAX_REF_HOPS: usize = 32;

/// Where the request body schema of a resource type lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LocatedResource {
  /// The PUT path it was found under, `None` for the definition-name fallback.
  pub path: Option<String>,
  pub document: String,
  pub pointer: String,
}

impl LocatedResource {
  /// A local `$ref` to the schema, relative to [`LocatedResource::document`].
  pub(crate) fn reference(&self) -> String {
    format!("#{}", self.pointer)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResourceEntry {
  pub resource_type: String,
  pub path: String,
  /// Name of the body schema, `inline` when declared in place and `None`
  /// when the operation has no JSON body.
  pub schema: Option<String>,
}

/// Finds the PUT request body schema for `resource_type`.
///
/// ARM instance paths match when their derived type equals the requested one
/// ignoring case; other paths need the type as a `/`-delimited substring with at
/// most one trailing segment. A path ending in a `{name}` parameter wins
/// outright, otherwise the last match in document order is used. When no path
/// matches, a schema named after the last type segment is tried.
pub(crate) fn find_resource(store: &DocumentStore, resource_type: &str) -> anyhow::Result<LocatedResource> {
  let search = strip_placeholder(resource_type);
  let mut best = None;

  for (section, path, item) in put_paths(store.root()) {
    let matched = match arm_instance_type(path) {
      Some(derived) => derived.eq_ignore_ascii_case(search),
      None => substring_match(path, search),
    };
    if !matched {
      continue;
    }

    let operation = format!("/{section}/{}/put", escape_pointer(path));
    let Some((document, pointer)) = request_body(store, &operation, &item["put"]) else {
      continue;
    };

    let located = LocatedResource {
      path: Some(path.to_string()),
      document,
      pointer,
    };
    if path.ends_with('}') {
      return Ok(located);
    }
    best = Some(located);
  }

  if let Some(located) = best {
    return Ok(located);
  }

  if let Some(located) = find_named_schema(store, search) {
    return Ok(located);
  }

  bail!("resource type {resource_type} not found in spec")
}

/// Every ARM instance type that has a PUT operation, sorted by type.
pub(crate) fn list_resource_types(store: &DocumentStore) -> Vec<ResourceEntry> {
  let mut entries = put_paths(store.root())
    .filter_map(|(section, path, item)| {
      let resource_type = arm_instance_type(path)?;
      let operation = format!("/{section}/{}/put", escape_pointer(path));
      Some(ResourceEntry {
        resource_type,
        path: path.to_string(),
        schema: body_schema_name(store, &operation, &item["put"]),
      })
    })
    .collect::<Vec<_>>();

  entries.sort_by(|a, b| {
    a.resource_type
      .to_lowercase()
      .cmp(&b.resource_type.to_lowercase())
      .then_with(|| a.path.cmp(&b.path))
  });
  entries
}

/// API version declared in the document's `info` block.
pub(crate) fn api_version(root: &Value) -> Option<String> {
  root
    .pointer("/info/version")
    .and_then(Value::as_str)
    .map(str::trim)
    .filter(|version| !version.is_empty())
    .map(str::to_string)
}

/// Derives `Provider/type[/child...]` from an ARM instance path such as
/// `/subscriptions/{id}/providers/Microsoft.KeyVault/vaults/{vaultName}`.
///
/// Segments after the provider must alternate between a type and a
/// parameter, consume the whole path and name at least one type.
pub(crate) fn arm_instance_type(path: &str) -> Option<String> {
  let trimmed = path.trim_matches('/');
  if trimmed.is_empty() {
    return None;
  }

  let segments = trimmed.split('/').collect::<Vec<_>>();
  let providers = segments.iter().position(|s| s.eq_ignore_ascii_case("providers"))?;
  let provider = *segments.get(providers + 1).filter(|p| !p.is_empty())?;

  let rest = &segments[providers + 2..];
  if rest.is_empty() || rest.len() % 2 != 0 {
    return None;
  }

  let mut types = Vec::with_capacity(rest.len() / 2);
  for pair in rest.chunks_exact(2) {
    if is_path_param(pair[0]) || !is_path_param(pair[1]) {
      return None;
    }
    types.push(pair[0]);
  }

  Some(format!("{provider}/{}", types.join("/")))
}

fn is_path_param(segment: &str) -> bool {
  segment.starts_with('{') && segment.ends_with('}')
}

fn strip_placeholder(resource_type: &str) -> &str {
  if resource_type.ends_with('}')
    && let Some(idx) = resource_type.rfind("/{")
  {
    return &resource_type[..idx];
  }
  resource_type
}

fn substring_match(path: &str, search: &str) -> bool {
  let path = path.to_lowercase();
  let search = search.to_lowercase();
  let Some(idx) = path.find(&search) else {
    return false;
  };
  if idx > 0 && path.as_bytes()[idx - 1] != b'/' {
    return false;
  }

  let suffix = &path[idx + search.len()..];
  match suffix.strip_prefix('/') {
    None => suffix.is_empty(),
    Some("") => true,
    Some(rest) => !rest.contains('/'),
  }
}

fn put_paths(root: &Value) -> impl Iterator<Item = (&'static str, &str, &Value)> {
  PATH_SECTIONS.into_iter().flat_map(move |section| {
    root
      .get(section)
      .and_then(Value::as_object)
      .into_iter()
      .flatten()
      .filter(|(_, item)| item.get("put").is_some())
      .map(move |(path, item)| (section, path.as_str(), item))
  })
}

/// Location of the JSON request body schema of a PUT operation: the OpenAPI 3
/// `requestBody`, else the Swagger 2 `in: body` parameter.
fn request_body(store: &DocumentStore, operation: &str, put: &Value) -> Option<(String, String)> {
  let root = store.root_key().to_string();

  if let Some(body) = put.get("requestBody") {
    let (document, pointer, body) = follow_refs(store, root.clone(), format!("{operation}/requestBody"), body)?;
    if body.pointer("/content/application~1json/schema").is_some() {
      return Some((document, format!("{pointer}/content/application~1json/schema")));
    }
  }

  let parameters = put.get("parameters").and_then(Value::as_array)?;
  parameters.iter().enumerate().find_map(|(index, parameter)| {
    let (document, pointer, parameter) =
      follow_refs(store, root.clone(), format!("{operation}/parameters/{index}"), parameter)?;
    let is_body = parameter.get("in").and_then(Value::as_str) == Some("body");
    (is_body && parameter.get("schema").is_some()).then(|| (document, format!("{pointer}/schema")))
  })
}

/// Follows `$ref` hops from `value`, tracking the document and pointer it ends at.
fn follow_refs<'s>(
  store: &'s DocumentStore,
  mut document: String,
  mut pointer: String,
  mut value: &'s Value,
) -> Option<(String, String, &'s Value)> {
  for _ in 0..MAX_REF_HOPS {
    let Some(reference) = value.get("$ref").and_then(Value::as_str) else {
      return Some((document, pointer, value));
    };
    let target = store.resolve_ref(&document, reference);
    let next_document = target.document?.to_string();
    value = target.value?;
    pointer = target.pointer.to_string();
    document = next_document;
  }
  None
}

fn body_schema_name(store: &DocumentStore, operation: &str, put: &Value) -> Option<String> {
  let (document, pointer) = request_body(store, operation, put)?;
  let schema = store.get(&document)?.value.pointer(&pointer)?;
  Some(match schema.get("$ref").and_then(Value::as_str) {
    Some(reference) => reference.rsplit('/').next().unwrap_or(reference).to_string(),
    None => "inline".to_string(),
  })
}

fn find_named_schema(store: &DocumentStore, search: &str) -> Option<LocatedResource> {
  let name = search.rsplit('/').next().filter(|name| !name.is_empty())?;
  let candidates = [name, name.strip_suffix('s').unwrap_or(name)];
  let root = store.root();

  for candidate in candidates {
    for prefix in SCHEMA_SECTIONS {
      let Some(schemas) = root.pointer(prefix).and_then(Value::as_object) else {
        continue;
      };
      if let Some(found) = schemas.keys().find(|key| key.eq_ignore_ascii_case(candidate)) {
        return Some(LocatedResource {
          path: None,
          document: store.root_key().to_string(),
          pointer: format!("{prefix}/{}", escape_pointer(found)),
        });
      }
    }
  }

  None
}

fn escape_pointer(segment: &str) -> String {
  segment.replace('~', "~0").replace('/', "~1")
}
