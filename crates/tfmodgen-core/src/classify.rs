use serde_json::Value;

use crate::{graph::SchemaNode, resolver::EffectiveShape};

pub const MUTABILITY_EXTENSION: &str = "x-ms-mutability";
pub const SECRET_EXTENSION: &str = "x-ms-secret";

const NEVER_RETURNED: &str = "never be returned";

/// Writability and secrecy predicates.
///
/// Implemented for raw nodes and for effective shapes, so a flag inherited
/// through `allOf` is visible once the shape is resolved.
pub trait SchemaFlags {
  fn read_only(&self) -> bool;
  fn write_only(&self) -> bool;
  fn description(&self) -> Option<&str>;
  fn extension(&self, key: &str) -> Option<&Value>;

  /// Lowercased entries of `x-ms-mutability`. Malformed values read as empty.
  fn mutability(&self) -> Vec<String> {
    let entries = match self.extension(MUTABILITY_EXTENSION) {
      Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).map(str::to_string).collect(),
      Some(Value::String(raw)) => serde_json::from_str::<Vec<String>>(raw).unwrap_or_default(),
      _ => Vec::new(),
    };

    entries
      .into_iter()
      .map(|entry| entry.trim().to_lowercase())
      .filter(|entry| !entry.is_empty())
      .collect()
  }

  fn is_writable(&self) -> bool {
    if self.read_only() {
      return false;
    }
    let mutability = self.mutability();
    mutability.is_empty() || mutability.iter().any(|m| m == "create" || m == "update")
  }

  fn is_secret(&self) -> bool {
    self.write_only()
      || self
        .description()
        .is_some_and(|d| d.to_lowercase().contains(NEVER_RETURNED))
      || matches!(self.extension(SECRET_EXTENSION), Some(Value::Bool(true)))
  }
}

impl SchemaFlags for SchemaNode {
  fn read_only(&self) -> bool {
    self.read_only
  }

  fn write_only(&self) -> bool {
    self.write_only
  }

  fn description(&self) -> Option<&str> {
    self.description.as_deref()
  }

  fn extension(&self, key: &str) -> Option<&Value> {
    self.extensions.get(key)
  }
}

impl SchemaFlags for EffectiveShape {
  fn read_only(&self) -> bool {
    self.read_only
  }

  fn write_only(&self) -> bool {
    self.write_only
  }

  fn description(&self) -> Option<&str> {
    self.description.as_deref()
  }

  fn extension(&self, key: &str) -> Option<&Value> {
    self.extensions.get(key)
  }
}

#[must_use]
pub fn is_writable(schema: &impl SchemaFlags) -> bool {
  schema.is_writable()
}

#[must_use]
pub fn is_secret(schema: &impl SchemaFlags) -> bool {
  schema.is_secret()
}
