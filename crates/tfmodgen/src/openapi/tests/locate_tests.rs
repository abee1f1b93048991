use serde_json::json;

use super::{storage_spec, store};
use crate::openapi::{
  ResourceEntry, find_resource, list_resource_types,
  locate::{api_version, arm_instance_type},
};

const ACCOUNT_PATH: &str =
  "/subscriptions/{subscriptionId}/resourceGroups/{resourceGroupName}/providers/Microsoft.Storage/storageAccounts/{accountName}";

#[test]
fn test_arm_instance_type() {
  let cases = [
    (ACCOUNT_PATH, Some("Microsoft.Storage/storageAccounts")),
    (
      "/subscriptions/{s}/resourceGroups/{rg}/providers/Microsoft.KeyVault/vaults/{vaultName}/secrets/{secretName}",
      Some("Microsoft.KeyVault/vaults/secrets"),
    ),
    ("/{scope}/providers/Microsoft.Authorization/roleAssignments/{id}", Some("Microsoft.Authorization/roleAssignments")),
    ("/subscriptions/{s}/providers/Microsoft.Storage/checkNameAvailability", None),
    ("/subscriptions/{s}/providers/Microsoft.Web/sites/{name}/config/web", None),
    ("/subscriptions/{s}/providers/Microsoft.Web", None),
    ("/providers/Microsoft.Web/{a}/{b}", None),
    ("/widgets/{id}", None),
    ("/", None),
  ];

  for (path, expected) in cases {
    assert_eq!(arm_instance_type(path).as_deref(), expected, "path {path}");
  }
}

#[test]
fn test_find_resource_follows_body_parameter() {
  let store = store(storage_spec());
  let located = find_resource(&store, "Microsoft.Storage/storageAccounts").unwrap();

  assert_eq!(located.path.as_deref(), Some(ACCOUNT_PATH));
  let schema = store.root().pointer(&located.pointer).unwrap();
  assert_eq!(schema, &json!({ "$ref": "#/definitions/StorageAccountCreateParameters" }));
}

#[test]
fn test_find_resource_ignores_case_and_placeholder() {
  let store = store(storage_spec());
  let plain = find_resource(&store, "Microsoft.Storage/storageAccounts").unwrap();
  let variant = find_resource(&store, "microsoft.storage/STORAGEACCOUNTS/{name}").unwrap();
  assert_eq!(plain, variant);
}

#[test]
fn test_find_resource_reads_openapi3_request_body() {
  let store = store(json!({
    "openapi": "3.0.1",
    "paths": {
      "/widgets/{widgetId}": {
        "put": {
          "requestBody": { "$ref": "#/components/requestBodies/Widget" }
        }
      }
    },
    "components": {
      "requestBodies": {
        "Widget": {
          "content": { "application/json": { "schema": { "type": "object" } } }
        }
      }
    }
  }));

  let located = find_resource(&store, "widgets").unwrap();
  assert_eq!(located.pointer, "/components/requestBodies/Widget/content/application~1json/schema");
  assert_eq!(located.reference(), "#/components/requestBodies/Widget/content/application~1json/schema");
}

#[test]
fn test_substring_match_is_bounded() {
  let body = json!({ "parameters": [{ "in": "body", "name": "b", "schema": { "type": "object" } }] });
  let store = store(json!({
    "paths": {
      "/api/bigwidgets/{id}": { "put": body.clone() },
      "/api/widgets/{id}/parts/{part}": { "put": body.clone() }
    }
  }));

  assert!(find_resource(&store, "widgets").is_err());
  assert!(find_resource(&store, "widgets/{id}/parts").is_ok());
}

#[test]
fn test_path_ending_in_parameter_wins() {
  let store = store(json!({
    "paths": {
      "/things/{id}": { "put": { "parameters": [{ "in": "body", "name": "a", "schema": { "title": "instance" } }] } },
      "/things/default": { "put": { "parameters": [{ "in": "body", "name": "b", "schema": { "title": "singleton" } }] } }
    }
  }));

  let located = find_resource(&store, "things").unwrap();
  assert_eq!(located.path.as_deref(), Some("/things/{id}"));
}

#[test]
fn test_falls_back_to_schema_name() {
  let store = store(json!({
    "paths": {},
    "definitions": { "ManagedCluster": { "type": "object" } }
  }));

  let located = find_resource(&store, "Microsoft.ContainerService/managedClusters").unwrap();
  assert_eq!(located.path, None);
  assert_eq!(located.pointer, "/definitions/ManagedCluster");
}

#[test]
fn test_missing_resource_type_errors() {
  let store = store(storage_spec());
  let err = find_resource(&store, "Microsoft.Storage/nothingHere").unwrap_err();
  assert_eq!(err.to_string(), "resource type Microsoft.Storage/nothingHere not found in spec");
}

#[test]
fn test_list_resource_types() {
  let store = store(storage_spec());
  assert_eq!(
    list_resource_types(&store),
    vec![ResourceEntry {
      resource_type: "Microsoft.Storage/storageAccounts".to_string(),
      path: ACCOUNT_PATH.to_string(),
      schema: Some("StorageAccountCreateParameters".to_string()),
    }]
  );
}

#[test]
fn test_api_version_from_info() {
  assert_eq!(api_version(&storage_spec()).as_deref(), Some("2023-05-01"));
  assert_eq!(api_version(&json!({ "info": { "version": " " } })), None);
}
