mod body_tests;

use hcl::{
  Block, Body,
  expr::{Expression, ObjectKey},
};
use serde_json::{Value, json};

use super::{GeneratedModule, ModuleConfig, ModuleFile, ModuleGenerator};
use crate::utils::spec::{DocumentStore, SpecSource};

pub(super) const WIDGET_TYPE: &str = "Microsoft.Test/widgets";

pub(super) fn widget_spec() -> Value {
  json!({
    "swagger": "2.0",
    "info": { "title": "WidgetClient", "version": "2024-01-01" },
    "paths": {
      "/subscriptions/{subscriptionId}/resourceGroups/{resourceGroupName}/providers/Microsoft.Test/widgets/{widgetName}": {
        "put": {
          "parameters": [
            { "name": "widget", "in": "body", "required": true, "schema": { "$ref": "#/definitions/Widget" } }
          ]
        }
      }
    },
    "definitions": {
      "TrackedResource": {
        "type": "object",
        "required": ["location"],
        "properties": {
          "id": { "type": "string", "readOnly": true },
          "name": { "type": "string", "readOnly": true },
          "type": { "type": "string", "readOnly": true },
          "location": { "type": "string", "x-ms-mutability": ["read", "create"] },
          "tags": { "type": "object", "additionalProperties": { "type": "string" } }
        }
      },
      "Widget": {
        "type": "object",
        "allOf": [{ "$ref": "#/definitions/TrackedResource" }],
        "properties": {
          "properties": { "$ref": "#/definitions/WidgetProperties", "x-ms-client-flatten": true },
          "sku": { "$ref": "#/definitions/Sku" }
        }
      },
      "Sku": {
        "type": "object",
        "required": ["name"],
        "properties": {
          "name": { "type": "string", "description": "The SKU name." },
          "tier": { "type": "string", "readOnly": true }
        }
      },
      "WidgetProperties": {
        "type": "object",
        "required": ["displayName"],
        "properties": {
          "displayName": { "type": "string", "minLength": 3, "maxLength": 24, "description": "Friendly name." },
          "capacity": { "type": "integer", "minimum": 1, "maximum": 10 },
          "tier": { "type": "string", "enum": ["Basic", "Premium"] },
          "adminPassword": { "type": "string", "x-ms-secret": true, "description": "Administrator password." },
          "credentials": {
            "type": "object",
            "description": "Service credentials.",
            "properties": {
              "clientId": { "type": "string", "description": "The client ID." },
              "clientSecret": { "type": "string", "description": "The client secret. It will never be returned." }
            }
          },
          "odata.type": { "type": "string" },
          "rules": { "type": "array", "items": { "$ref": "#/definitions/Rule" } },
          "labels": { "type": "object", "additionalProperties": { "type": "string" } },
          "settings": {
            "type": "object",
            "description": "Per-setting overrides.",
            "additionalProperties": {
              "type": "object",
              "properties": {
                "value": { "type": "string" },
                "enabled": { "type": "boolean" }
              }
            }
          },
          "provisioningState": { "type": "string", "readOnly": true }
        }
      },
      "Rule": {
        "type": "object",
        "required": ["name"],
        "properties": {
          "name": { "type": "string" },
          "priority": { "type": "integer" }
        }
      }
    }
  })
}

/// A spec whose single resource `Microsoft.Test/widgets` has `body` as its
/// PUT schema and no other definitions.
pub(super) fn single_body_spec(body: Value) -> Value {
  json!({
    "swagger": "2.0",
    "info": { "title": "WidgetClient", "version": "2024-01-01" },
    "paths": {
      "/subscriptions/{s}/resourceGroups/{rg}/providers/Microsoft.Test/widgets/{widgetName}": {
        "put": { "parameters": [{ "name": "widget", "in": "body", "schema": body }] }
      }
    }
  })
}

pub(super) fn config() -> ModuleConfig {
  ModuleConfig::builder().resource_type(WIDGET_TYPE).build()
}

pub(super) fn try_generate(spec: Value, config: ModuleConfig) -> anyhow::Result<GeneratedModule> {
  let store = DocumentStore::from_documents(SpecSource::parse("spec.json"), spec, []);
  ModuleGenerator::new(&store, config).generate()
}

pub(super) fn generate(spec: Value, config: ModuleConfig) -> GeneratedModule {
  try_generate(spec, config).unwrap()
}

pub(super) fn parse_file(module: &GeneratedModule, file: ModuleFile) -> Body {
  let text = module.file(file).unwrap_or_else(|| panic!("{file} was not generated"));
  hcl::parse(text).unwrap_or_else(|err| panic!("{file} does not parse: {err}\n{text}"))
}

pub(super) fn block<'b>(body: &'b Body, identifier: &str, labels: &[&str]) -> &'b Block {
  body
    .blocks()
    .find(|block| {
      block.identifier() == identifier
        && block.labels().iter().map(|label| label.as_str()).eq(labels.iter().copied())
    })
    .unwrap_or_else(|| panic!("missing block {identifier} {labels:?}"))
}

pub(super) fn attr<'b>(body: &'b Body, key: &str) -> &'b Expression {
  body
    .attributes()
    .find(|attr| attr.key() == key)
    .map(|attr| attr.expr())
    .unwrap_or_else(|| panic!("missing attribute {key}"))
}

pub(super) fn has_attr(body: &Body, key: &str) -> bool {
  body.attributes().any(|attr| attr.key() == key)
}

/// Parses `text` as an expression, for structural comparison.
pub(super) fn expr(text: &str) -> Expression {
  let body = hcl::parse(&format!("x = {text}\n")).unwrap_or_else(|err| panic!("bad expression {text}: {err}"));
  attr(&body, "x").clone()
}

pub(super) fn object_entry<'e>(expression: &'e Expression, key: &str) -> &'e Expression {
  let Expression::Object(object) = expression else {
    panic!("expected an object, got {expression:?}");
  };
  object
    .iter()
    .find(|(name, _)| match name {
      ObjectKey::Identifier(ident) => ident.as_str() == key,
      ObjectKey::Expression(Expression::String(text)) => text == key,
      _ => false,
    })
    .map(|(_, value)| value)
    .unwrap_or_else(|| panic!("missing key {key}"))
}

pub(super) fn variable_names(body: &Body) -> Vec<String> {
  body
    .blocks()
    .filter(|block| block.identifier() == "variable")
    .filter_map(|block| block.labels().first())
    .map(|label| label.as_str().to_string())
    .collect()
}
