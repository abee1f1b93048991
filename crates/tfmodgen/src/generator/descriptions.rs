use itertools::Itertools;

use super::walker::{Field, Schema, Shape};

/// Description of a top-level variable.
///
/// Objects append a bullet list of their writable children; maps of objects
/// do the same for the value type under a `Map values:` heading.
pub(crate) fn variable_description(field: &Field, lifting: bool) -> String {
  let summary = field
    .schema
    .description
    .clone()
    .unwrap_or_else(|| format!("The {} of the resource.", field.name));

  let (documented, is_map) = match &field.schema.shape {
    Shape::Object(fields) if !fields.is_empty() => (&field.schema, false),
    Shape::Map(values) if values.is_object() && !values.fields().is_empty() => (values.as_ref(), true),
    _ => return summary,
  };

  let mut out = summary;
  out.push_str("\n\n");
  if is_map {
    out.push_str("Map values:\n");
  }
  out.push_str(&nested_description(documented, "", lifting && !is_map));
  out
}

/// One `- \`snake\` - description` line per writable child, sorted by
/// Terraform name, nested objects indented below their parent.
pub(crate) fn nested_description(schema: &Schema, indent: &str, lifting: bool) -> String {
  let mut out = String::new();
  let children = schema
    .fields()
    .iter()
    .filter(|field| !field.is_lifted(lifting))
    .sorted_by(|a, b| a.snake.cmp(&b.snake));

  for field in children {
    let description = field
      .schema
      .description
      .clone()
      .unwrap_or_else(|| format!("The {} property.", field.name))
      .replace('\n', " ");
    out.push_str(&format!("{indent}- `{}` - {description}\n", field.snake));

    if !field.schema.fields().is_empty() {
      out.push_str(&nested_description(&field.schema, &format!("{indent}  "), lifting));
    }
  }
  out
}
