use std::collections::BTreeMap;

use super::{
  naming::quoted,
  render::{api_object, object},
  types::TypeExpr,
  walker::Schema,
};

/// A secret lifted out of the body into `sensitive_body`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SecretField {
  /// Dotted API path, e.g. `properties.administratorLoginPassword`.
  pub path: String,
  pub var_name: String,
  pub description: Option<String>,
  pub ty: TypeExpr,
}

impl SecretField {
  pub(crate) fn version_var(&self) -> String {
    format!("{}_version", self.var_name)
  }

  /// The same secret seen from one object level further up.
  pub(crate) fn nested_under(&self, parent: &str) -> Self {
    Self {
      path: format!("{parent}.{}", self.path),
      ..self.clone()
    }
  }
}

/// Secrets reachable from the root through object nesting, parents first
/// and siblings in name order. A secret object is lifted whole.
pub(crate) fn collect_secrets(root: &Schema) -> Vec<SecretField> {
  let mut secrets = Vec::new();
  collect_into(root, "", &mut secrets);
  secrets
}

fn collect_into(schema: &Schema, prefix: &str, secrets: &mut Vec<SecretField>) {
  for field in schema.fields() {
    let path = if prefix.is_empty() {
      field.name.clone()
    } else {
      format!("{prefix}.{}", field.name)
    };

    if field.schema.secret {
      secrets.push(SecretField {
        path,
        var_name: field.snake.clone(),
        description: field.schema.description.clone(),
        ty: TypeExpr::from_schema(&field.schema, false),
      });
    } else {
      collect_into(&field.schema, &path, secrets);
    }
  }
}

#[derive(Default)]
struct SensitiveNode<'a> {
  children: BTreeMap<&'a str, SensitiveNode<'a>>,
  secret: Option<&'a SecretField>,
}

impl SensitiveNode<'_> {
  fn render(&self, level: usize) -> String {
    let entries = self
      .children
      .iter()
      .map(|(key, child)| {
        let value = match child.secret {
          Some(secret) if child.children.is_empty() => format!("var.{}", secret.var_name),
          _ => child.render(level + 1),
        };
        (*key, value)
      })
      .collect();
    api_object(entries, level)
  }
}

/// The `sensitive_body` object: secret paths rebuilt as nested objects.
pub(crate) fn sensitive_body(secrets: &[SecretField], level: usize) -> String {
  let mut root = SensitiveNode::default();
  for secret in secrets {
    let node = secret
      .path
      .split('.')
      .map(str::trim)
      .filter(|segment| !segment.is_empty())
      .fold(&mut root, |node, segment| node.children.entry(segment).or_default());
    node.secret = Some(secret);
  }
  root.render(level)
}

/// The `sensitive_body_version` map from secret path to its version variable.
pub(crate) fn sensitive_body_version(secrets: &[SecretField], level: usize) -> String {
  let entries = secrets
    .iter()
    .map(|secret| (quoted(&secret.path), format!("var.{}", secret.version_var())))
    .collect::<Vec<_>>();
  object(&entries, level)
}
