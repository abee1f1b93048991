mod locate_tests;
mod navigate_tests;

use serde_json::Value;

use crate::utils::spec::{DocumentStore, SpecSource};

pub(super) fn store(root: Value) -> DocumentStore {
  DocumentStore::from_documents(SpecSource::parse("spec.json"), root, [])
}

pub(super) fn storage_spec() -> Value {
  serde_json::json!({
    "swagger": "2.0",
    "info": { "title": "StorageManagementClient", "version": "2023-05-01" },
    "paths": {
      "/subscriptions/{subscriptionId}/resourceGroups/{resourceGroupName}/providers/Microsoft.Storage/storageAccounts/{accountName}": {
        "put": {
          "parameters": [
            { "$ref": "#/parameters/AccountNameParameter" },
            {
              "name": "parameters",
              "in": "body",
              "required": true,
              "schema": { "$ref": "#/definitions/StorageAccountCreateParameters" }
            }
          ]
        },
        "get": {}
      },
      "/subscriptions/{subscriptionId}/providers/Microsoft.Storage/checkNameAvailability": {
        "post": {}
      }
    },
    "parameters": {
      "AccountNameParameter": { "name": "accountName", "in": "path", "type": "string" }
    },
    "definitions": {
      "StorageAccountCreateParameters": {
        "type": "object",
        "required": ["location", "sku"],
        "properties": {
          "sku": { "$ref": "#/definitions/Sku" },
          "location": { "type": "string" },
          "tags": { "type": "object", "additionalProperties": { "type": "string" } },
          "properties": { "$ref": "#/definitions/StorageAccountPropertiesCreateParameters" }
        }
      },
      "Sku": {
        "type": "object",
        "required": ["name"],
        "properties": {
          "name": { "type": "string", "enum": ["Standard_LRS", "Premium_LRS"] },
          "tier": { "type": "string", "readOnly": true }
        }
      },
      "StorageAccountPropertiesCreateParameters": {
        "properties": {
          "accessTier": { "type": "string", "enum": ["Hot", "Cool"] },
          "minimumTlsVersion": { "type": "string" },
          "primaryEndpoints": { "type": "object", "readOnly": true, "properties": {} }
        }
      }
    }
  })
}
