use serde_json::json;

use crate::{
  classify::{SchemaFlags, is_secret, is_writable},
  graph::{SchemaKind, SchemaNode},
};

fn string() -> SchemaNode {
  SchemaNode::of_kind(SchemaKind::String)
}

#[test]
fn test_plain_property_is_writable() {
  assert!(is_writable(&string()));
  assert!(!is_secret(&string()));
}

#[test]
fn test_read_only_is_not_writable() {
  let node = SchemaNode {
    read_only: true,
    ..string()
  };
  assert!(!node.is_writable());
}

#[test]
fn test_mutability_annotation() {
  let cases = [
    (json!(["create", "read", "update"]), true),
    (json!(["create"]), true),
    (json!([" Update "]), true),
    (json!(["read"]), false),
    (json!([]), true),
    (json!("not a list"), true),
    (json!("[\"read\"]"), false),
    (json!(42), true),
  ];

  for (value, expected) in cases {
    let node = string().with_extension("x-ms-mutability", value.clone());
    assert_eq!(node.is_writable(), expected, "mutability {value}");
  }
}

#[test]
fn test_secret_markers() {
  let write_only = SchemaNode {
    write_only: true,
    ..string()
  };
  let never_returned = string().with_description("The password. It will Never Be Returned in responses.");
  let flagged = string().with_extension("x-ms-secret", json!(true));
  let flagged_as_text = string().with_extension("x-ms-secret", json!("true"));
  let flagged_false = string().with_extension("x-ms-secret", json!(false));

  assert!(write_only.is_secret());
  assert!(never_returned.is_secret());
  assert!(flagged.is_secret());
  assert!(!flagged_as_text.is_secret());
  assert!(!flagged_false.is_secret());
}
