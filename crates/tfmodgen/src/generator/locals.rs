use super::{
  render::api_object,
  walker::{Field, Schema, Shape},
};

/// Root keys handled by dedicated `azapi_resource` arguments.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct TopLevel {
  pub location: bool,
  pub tags: bool,
}

impl TopLevel {
  pub(crate) fn handles(self, key: &str) -> bool {
    (self.location && key == "location") || (self.tags && key == "tags")
  }
}

/// Expression rebuilding the API body from snake_case variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ValueExpr {
  /// The value as-is, e.g. `var.sku` or `item.name`.
  Access(String),
  /// Keys are API names; values rebuild each field.
  Object(Vec<(String, ValueExpr)>),
  /// `access == null ? null : value`
  NullGuard { access: String, value: Box<ValueExpr> },
  /// `[for item in access : item]`
  ForList { access: String, item: Box<ValueExpr> },
  /// `{for k, value in access : k => value}`
  ForMap { access: String, value: Box<ValueExpr> },
}

impl ValueExpr {
  /// Builds the body for `root`, whose fields map to `var.<snake>`.
  ///
  /// The root `properties` bag is flattened: its children are variables of
  /// their own. Lifted secrets are left for `sensitive_body`.
  pub(crate) fn for_root(root: &Schema, top_level: TopLevel) -> Self {
    let entries = root
      .fields()
      .iter()
      .filter(|field| !field.is_lifted(true) && !top_level.handles(&field.name))
      .map(|field| {
        let value = if field.name == "properties" && field.schema.is_object() {
          flattened_bag(field)
        } else {
          Self::for_schema(&field.schema, format!("var.{}", field.snake), true)
        };
        (field.name.clone(), value)
      })
      .collect();
    Self::Object(entries)
  }

  fn for_schema(schema: &Schema, access: String, lifting: bool) -> Self {
    match &schema.shape {
      Shape::Object(fields) => {
        let entries = fields
          .iter()
          .filter(|field| !field.is_lifted(lifting))
          .map(|field| {
            let child = format!("{access}.{}", field.snake);
            (field.name.clone(), Self::for_schema(&field.schema, child, lifting))
          })
          .collect();
        Self::NullGuard {
          access,
          value: Box::new(Self::Object(entries)),
        }
      }
      Shape::List(Some(items)) => {
        let item = Self::for_schema(items, "item".to_string(), false);
        if item.is_access_of("item") {
          return Self::Access(access);
        }
        Self::NullGuard {
          access: access.clone(),
          value: Box::new(Self::ForList {
            access,
            item: Box::new(item),
          }),
        }
      }
      Shape::Map(values) => {
        let value = Self::for_schema(values, "value".to_string(), false);
        if value.is_access_of("value") {
          return Self::Access(access);
        }
        Self::NullGuard {
          access: access.clone(),
          value: Box::new(Self::ForMap {
            access,
            value: Box::new(value),
          }),
        }
      }
      _ => Self::Access(access),
    }
  }

  fn is_access_of(&self, name: &str) -> bool {
    matches!(self, Self::Access(access) if access == name)
  }

  /// Renders the expression for an attribute at nesting depth `level`.
  pub(crate) fn render(&self, level: usize) -> String {
    match self {
      Self::Access(access) => access.clone(),
      Self::Object(entries) => {
        let entries = entries
          .iter()
          .map(|(key, value)| (key.as_str(), value.render(level + 1)))
          .collect();
        api_object(entries, level)
      }
      Self::NullGuard { access, value } => format!("{access} == null ? null : {}", value.render(level)),
      Self::ForList { access, item } => format!("[for item in {access} : {}]", item.render(level)),
      Self::ForMap { access, value } => format!("{{for k, value in {access} : k => {}}}", value.render(level)),
    }
  }
}

fn flattened_bag(bag: &Field) -> ValueExpr {
  let entries = bag
    .schema
    .fields()
    .iter()
    .filter(|field| !field.is_lifted(true))
    .map(|field| {
      let access = format!("var.{}", field.snake);
      (field.name.clone(), ValueExpr::for_schema(&field.schema, access, true))
    })
    .collect();
  ValueExpr::Object(entries)
}
