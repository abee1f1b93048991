use anyhow::{Context, bail};
use tfmodgen_core::{SchemaFlags, SchemaId, ShapeResolver};

/// Walks a dot-separated property path through composed shapes.
///
/// Returns `Ok(None)` when a segment on the way is not writable, since
/// nothing below it can be set by a module.
pub(crate) fn navigate(resolver: &mut ShapeResolver<'_>, root: SchemaId, path: &str) -> anyhow::Result<Option<SchemaId>> {
  if path.is_empty() {
    return Ok(Some(root));
  }

  let mut current = root;
  let mut walked = Vec::new();
  for segment in path.split('.') {
    let shape = resolver
      .resolve(current)
      .with_context(|| format!("failed to resolve {}", display_path(&walked)))?;
    if shape.properties.is_empty() {
      bail!("path segment {segment} not found: schema has no properties");
    }
    let Some(child) = shape.property(segment) else {
      bail!("property {segment} not found");
    };

    walked.push(segment);
    let child_shape = resolver
      .resolve(child)
      .with_context(|| format!("failed to resolve {}", display_path(&walked)))?;
    if !child_shape.is_writable() {
      return Ok(None);
    }
    current = child;
  }

  Ok(Some(current))
}

fn display_path(segments: &[&str]) -> String {
  if segments.is_empty() {
    "the root schema".to_string()
  } else {
    segments.join(".")
  }
}
