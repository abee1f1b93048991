use hcl::{
  Attribute, Block, Body,
  expr::{Expression, RawExpression},
};

use super::naming::{escape_template, object_key, quoted};

const HEREDOC_MARKER: &str = "DESCRIPTION";

/// Indentation unit of generated files.
pub(crate) const INDENT: &str = "  ";

pub(crate) fn pad(level: usize) -> String {
  INDENT.repeat(level)
}

/// An expression emitted verbatim.
///
/// Multi-line text must carry the absolute indentation of the line it ends
/// up on; `level` arguments elsewhere in this module are nesting depths of
/// the attribute the text is assigned to.
pub(crate) fn raw(text: impl Into<String>) -> Expression {
  Expression::Raw(RawExpression::new(text.into()))
}

pub(crate) fn attribute(key: &str, text: impl Into<String>) -> Attribute {
  Attribute::new(key, raw(text))
}

pub(crate) fn string_attribute(key: &str, text: &str) -> Attribute {
  attribute(key, quoted(text))
}

/// A description literal: a quoted string, or an indented heredoc when the
/// text spans several lines.
pub(crate) fn description(text: &str, level: usize) -> String {
  let text = text.trim_end();
  if !text.contains('\n') {
    return quoted(text);
  }

  let inner = pad(level + 1);
  let mut out = format!("<<-{HEREDOC_MARKER}\n");
  for line in escape_template(text).lines() {
    if !line.trim().is_empty() {
      out.push_str(&inner);
      out.push_str(line);
    }
    out.push('\n');
  }
  out.push_str(&pad(level));
  out.push_str(HEREDOC_MARKER);
  out
}

/// Multi-line object literal with `=` aligned like `terraform fmt`.
///
/// Keys are written as given; values are already rendered for `level + 1`.
pub(crate) fn object(entries: &[(String, String)], level: usize) -> String {
  if entries.is_empty() {
    return "{}".to_string();
  }

  let width = entries.iter().map(|(key, _)| key.chars().count()).max().unwrap_or(0);
  let inner = pad(level + 1);
  let mut out = String::from("{\n");
  for (key, value) in entries {
    out.push_str(&format!("{inner}{key:<width$} = {value}\n"));
  }
  out.push_str(&pad(level));
  out.push('}');
  out
}

/// Object literal keyed by API names, quoting keys that are not identifiers.
pub(crate) fn api_object(entries: Vec<(&str, String)>, level: usize) -> String {
  let entries = entries
    .into_iter()
    .map(|(key, value)| (object_key(key), value))
    .collect::<Vec<_>>();
  object(&entries, level)
}

pub(crate) fn to_hcl(body: &Body) -> anyhow::Result<String> {
  let mut text = hcl::format::to_string(body)?;
  if !text.ends_with('\n') {
    text.push('\n');
  }
  Ok(text)
}

/// Formats top-level blocks one after another, separated by a blank line.
pub(crate) fn blocks_to_hcl(blocks: impl IntoIterator<Item = Block>) -> anyhow::Result<String> {
  let rendered = blocks
    .into_iter()
    .map(|block| to_hcl(&Body::builder().add_block(block).build()))
    .collect::<anyhow::Result<Vec<_>>>()?;
  Ok(rendered.join("\n"))
}
