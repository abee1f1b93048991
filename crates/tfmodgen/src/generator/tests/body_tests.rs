use serde_json::json;

use super::{attr, block, config, expr, generate, has_attr, object_entry, parse_file, single_body_spec, widget_spec};
use crate::generator::{ModuleConfig, ModuleFile};

#[test]
fn test_locals_rebuild_api_body() {
  let module = generate(widget_spec(), config());
  let body = parse_file(&module, ModuleFile::Locals);
  let locals = block(&body, "locals", &[]).body();

  let expected = expr(
    r#"{
      properties = {
        capacity = var.capacity
        credentials = var.credentials == null ? null : {
          clientId = var.credentials.client_id
        }
        displayName = var.display_name
        labels = var.labels
        "odata.type" = var.odata_type
        rules = var.rules == null ? null : [for item in var.rules : item == null ? null : {
          name = item.name
          priority = item.priority
        }]
        settings = var.settings == null ? null : {for k, value in var.settings : k => value == null ? null : {
          enabled = value.enabled
          value = value.value
        }}
        tier = var.tier
      }
      sku = var.sku == null ? null : {
        name = var.sku.name
      }
    }"#,
  );
  assert_eq!(attr(locals, "resource_body"), &expected);
}

#[test]
fn test_locals_quote_non_identifier_keys() {
  let module = generate(widget_spec(), config());
  let text = module.file(ModuleFile::Locals).unwrap();
  assert!(text.contains(r#""odata.type" = var.odata_type"#));
}

#[test]
fn test_locals_use_configured_name() {
  let config = ModuleConfig::builder()
    .resource_type("Microsoft.Test/widgets")
    .local_name("widget_body")
    .build();
  let module = generate(widget_spec(), config);

  let locals = parse_file(&module, ModuleFile::Locals);
  assert!(has_attr(block(&locals, "locals", &[]).body(), "widget_body"));
  let main = parse_file(&module, ModuleFile::Main);
  let resource = block(&main, "resource", &["azapi_resource", "this"]).body();
  assert_eq!(attr(resource, "body"), &expr("local.widget_body"));
}

#[test]
fn test_main_resource_block() {
  let module = generate(widget_spec(), config());
  let body = parse_file(&module, ModuleFile::Main);
  let resource = block(&body, "resource", &["azapi_resource", "this"]).body();

  assert_eq!(attr(resource, "type"), &expr(r#""Microsoft.Test/widgets@2024-01-01""#));
  assert_eq!(attr(resource, "name"), &expr("var.name"));
  assert_eq!(attr(resource, "parent_id"), &expr("var.parent_id"));
  assert_eq!(attr(resource, "ignore_null_property"), &expr("true"));
  assert_eq!(attr(resource, "location"), &expr("var.location"));
  assert_eq!(attr(resource, "tags"), &expr("var.tags"));
  assert_eq!(attr(resource, "body"), &expr("local.resource_body"));
  assert_eq!(attr(resource, "response_export_values"), &expr("[]"));

  let keys = resource.attributes().map(|attr| attr.key().to_string()).collect::<Vec<_>>();
  assert_eq!(
    keys,
    [
      "type",
      "name",
      "parent_id",
      "ignore_null_property",
      "location",
      "body",
      "sensitive_body",
      "sensitive_body_version",
      "tags",
      "response_export_values",
    ]
  );
}

#[test]
fn test_main_sensitive_body() {
  let module = generate(widget_spec(), config());
  let body = parse_file(&module, ModuleFile::Main);
  let resource = block(&body, "resource", &["azapi_resource", "this"]).body();

  let sensitive = attr(resource, "sensitive_body");
  assert_eq!(
    sensitive,
    &expr(
      r"{
        properties = {
          adminPassword = var.admin_password
          credentials = {
            clientSecret = var.client_secret
          }
        }
      }"
    )
  );
  let properties = object_entry(sensitive, "properties");
  assert_eq!(object_entry(properties, "adminPassword"), &expr("var.admin_password"));

  assert_eq!(
    attr(resource, "sensitive_body_version"),
    &expr(
      r#"{
        "properties.adminPassword" = var.admin_password_version
        "properties.credentials.clientSecret" = var.client_secret_version
      }"#
    )
  );
}

#[test]
fn test_main_without_tags_or_location() {
  let spec = single_body_spec(json!({
    "type": "object",
    "properties": {
      "properties": { "type": "object", "properties": { "size": { "type": "integer" } } }
    }
  }));
  let module = generate(spec, config());
  let body = parse_file(&module, ModuleFile::Main);
  let resource = block(&body, "resource", &["azapi_resource", "this"]).body();

  assert!(!has_attr(resource, "location"));
  assert!(!has_attr(resource, "tags"));
  assert!(!has_attr(resource, "sensitive_body"));
  assert!(!has_attr(resource, "sensitive_body_version"));
}

#[test]
fn test_root_path_wraps_local_in_properties() {
  let config = ModuleConfig::builder()
    .resource_type("Microsoft.Test/widgets")
    .root_path("properties")
    .build();
  let module = generate(widget_spec(), config);

  let main = parse_file(&module, ModuleFile::Main);
  let resource = block(&main, "resource", &["azapi_resource", "this"]).body();
  assert_eq!(attr(resource, "body"), &expr("{ properties = local.resource_body }"));
  assert_eq!(
    attr(resource, "sensitive_body"),
    &expr("{ properties = {\n adminPassword = var.admin_password\n credentials = { clientSecret = var.client_secret }\n} }")
  );
  assert_eq!(
    object_entry(attr(resource, "sensitive_body_version"), "properties.adminPassword"),
    &expr("var.admin_password_version")
  );

  let locals = parse_file(&module, ModuleFile::Locals);
  let value = attr(block(&locals, "locals", &[]).body(), "resource_body");
  assert_eq!(object_entry(value, "capacity"), &expr("var.capacity"));
  assert_eq!(object_entry(value, "displayName"), &expr("var.display_name"));
}

#[test]
fn test_list_of_scalars_passes_through() {
  let spec = single_body_spec(json!({
    "type": "object",
    "properties": {
      "zones": { "type": "array", "items": { "type": "string" } },
      "limits": { "type": "object", "additionalProperties": { "type": "integer" } }
    }
  }));
  let module = generate(spec, config());
  let body = parse_file(&module, ModuleFile::Locals);
  let value = attr(block(&body, "locals", &[]).body(), "resource_body");

  assert_eq!(object_entry(value, "zones"), &expr("var.zones"));
  assert_eq!(object_entry(value, "limits"), &expr("var.limits"));

  let main = parse_file(&module, ModuleFile::Main);
  let resource = block(&main, "resource", &["azapi_resource", "this"]).body();
  assert_eq!(attr(resource, "body"), &expr("{ properties = local.resource_body }"));
}
