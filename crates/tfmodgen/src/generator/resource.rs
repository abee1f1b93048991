use itertools::Itertools;

use super::{
  locals::{TopLevel, ValueExpr},
  naming::quoted,
  render::{attribute, object, string_attribute},
  secrets::{SecretField, sensitive_body, sensitive_body_version},
};

const TERRAFORM_VERSION: &str = "~> 1.12";
const AZAPI_SOURCE: &str = "azure/azapi";
const AZAPI_VERSION: &str = "~> 2.7";
const API_VERSION_PLACEHOLDER: &str = "apiVersion";

/// Level of attributes inside a top-level block.
const ATTRIBUTE_LEVEL: usize = 1;

/// How `main.tf` feeds the generated local into `body`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BodySource {
  /// No schema was found; the body is `{}`.
  Empty,
  /// The local already is the full resource body.
  Local,
  /// The local holds what goes under `properties` (a `--root` generation).
  PropertiesLocal,
}

/// Drops `{placeholder}` segments from a resource type.
pub(crate) fn clean_resource_type(resource_type: &str) -> String {
  resource_type
    .split('/')
    .filter(|segment| !(segment.starts_with('{') && segment.ends_with('}')))
    .join("/")
}

/// The `type` argument: `<type>@<apiVersion>`, with a placeholder version
/// when none is known.
pub(crate) fn versioned_type(resource_type: &str, api_version: Option<&str>) -> String {
  let version = api_version
    .map(str::trim)
    .filter(|version| !version.is_empty())
    .unwrap_or(API_VERSION_PLACEHOLDER);
  format!("{}@{version}", clean_resource_type(resource_type))
}

pub(crate) fn terraform_block() -> hcl::Block {
  let azapi = object(
    &[
      ("source".to_string(), quoted(AZAPI_SOURCE)),
      ("version".to_string(), quoted(AZAPI_VERSION)),
    ],
    ATTRIBUTE_LEVEL + 1,
  );

  hcl::Block::builder("terraform")
    .add_attribute(string_attribute("required_version", TERRAFORM_VERSION))
    .add_block(
      hcl::Block::builder("required_providers")
        .add_attribute(attribute("azapi", azapi))
        .build(),
    )
    .build()
}

pub(crate) fn locals_block(local_name: &str, value: &ValueExpr) -> hcl::Block {
  hcl::Block::builder("locals")
    .add_attribute(attribute(local_name, value.render(ATTRIBUTE_LEVEL)))
    .build()
}

/// The `azapi_resource "this"` block of `main.tf`.
pub(crate) struct ResourceBlock<'a> {
  pub resource_type: &'a str,
  pub api_version: Option<&'a str>,
  pub local_name: &'a str,
  pub body: BodySource,
  pub top_level: TopLevel,
  pub secrets: &'a [SecretField],
}

impl ResourceBlock<'_> {
  pub(crate) fn to_block(&self) -> hcl::Block {
    let mut block = hcl::Block::builder("resource")
      .add_label("azapi_resource")
      .add_label("this")
      .add_attribute(string_attribute(
        "type",
        &versioned_type(self.resource_type, self.api_version),
      ))
      .add_attribute(attribute("name", "var.name"))
      .add_attribute(attribute("parent_id", "var.parent_id"))
      .add_attribute(attribute("ignore_null_property", "true"));

    if self.top_level.location {
      block = block.add_attribute(attribute("location", "var.location"));
    }

    let local = format!("local.{}", self.local_name);
    let body = match self.body {
      BodySource::Empty => "{}".to_string(),
      BodySource::Local => local,
      BodySource::PropertiesLocal => object(&[("properties".to_string(), local)], ATTRIBUTE_LEVEL),
    };
    block = block.add_attribute(attribute("body", body));

    if !self.secrets.is_empty() {
      block = block
        .add_attribute(attribute("sensitive_body", sensitive_body(self.secrets, ATTRIBUTE_LEVEL)))
        .add_attribute(attribute(
          "sensitive_body_version",
          sensitive_body_version(self.secrets, ATTRIBUTE_LEVEL),
        ));
    }

    if self.top_level.tags {
      block = block.add_attribute(attribute("tags", "var.tags"));
    }

    block
      .add_attribute(attribute("response_export_values", "[]"))
      .build()
  }
}

pub(crate) fn output_blocks() -> Vec<hcl::Block> {
  [
    ("resource_id", "The ID of the created resource.", "azapi_resource.this.id"),
    ("name", "The name of the created resource.", "azapi_resource.this.name"),
  ]
  .into_iter()
  .map(|(name, description, value)| {
    hcl::Block::builder("output")
      .add_label(name)
      .add_attribute(string_attribute("description", description))
      .add_attribute(attribute("value", value))
      .build()
  })
  .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_clean_resource_type_drops_placeholders() {
    assert_eq!(
      clean_resource_type("Microsoft.App/managedEnvironments/{environmentName}"),
      "Microsoft.App/managedEnvironments"
    );
    assert_eq!(clean_resource_type("Microsoft.Storage/storageAccounts"), "Microsoft.Storage/storageAccounts");
  }

  #[test]
  fn test_versioned_type_uses_placeholder_without_version() {
    assert_eq!(
      versioned_type("Microsoft.Storage/storageAccounts", Some("2023-01-01")),
      "Microsoft.Storage/storageAccounts@2023-01-01"
    );
    assert_eq!(
      versioned_type("Microsoft.Storage/storageAccounts", Some("  ")),
      "Microsoft.Storage/storageAccounts@apiVersion"
    );
    assert_eq!(versioned_type("A.B/c", None), "A.B/c@apiVersion");
  }
}
