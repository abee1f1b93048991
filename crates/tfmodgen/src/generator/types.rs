use super::{
  render::object,
  walker::{ScalarKind, Schema, Shape},
};

/// A Terraform type constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TypeExpr {
  Any,
  String,
  Number,
  Bool,
  List(Box<TypeExpr>),
  Map(Box<TypeExpr>),
  Object(Vec<ObjectAttr>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ObjectAttr {
  pub name: String,
  pub ty: TypeExpr,
  pub optional: bool,
}

impl TypeExpr {
  /// Maps a schema to its type. Lifted secrets are left out of object types
  /// since they travel in their own variables.
  pub(crate) fn from_schema(schema: &Schema, lifting: bool) -> Self {
    match &schema.shape {
      Shape::Scalar(ScalarKind::String) => Self::String,
      Shape::Scalar(ScalarKind::Number) => Self::Number,
      Shape::Scalar(ScalarKind::Bool) => Self::Bool,
      Shape::Any | Shape::Recursive => Self::Any,
      Shape::List(items) => Self::List(Box::new(
        items.as_deref().map_or(Self::Any, |items| Self::from_schema(items, false)),
      )),
      Shape::Map(values) => Self::Map(Box::new(Self::from_schema(values, false))),
      Shape::FreeMap => Self::Map(Box::new(Self::String)),
      Shape::Object(fields) => Self::Object(
        fields
          .iter()
          .filter(|field| !field.is_lifted(lifting))
          .map(|field| ObjectAttr {
            name: field.snake.clone(),
            ty: Self::from_schema(&field.schema, lifting),
            optional: !field.required,
          })
          .collect(),
      ),
    }
  }

  /// Renders the type for an attribute at nesting depth `level`.
  pub(crate) fn render(&self, level: usize) -> String {
    match self {
      Self::Any => "any".to_string(),
      Self::String => "string".to_string(),
      Self::Number => "number".to_string(),
      Self::Bool => "bool".to_string(),
      Self::List(inner) => format!("list({})", inner.render(level)),
      Self::Map(inner) => format!("map({})", inner.render(level)),
      Self::Object(attrs) => {
        let entries = attrs
          .iter()
          .map(|attr| {
            let ty = attr.ty.render(level + 1);
            let ty = if attr.optional { format!("optional({ty})") } else { ty };
            (attr.name.clone(), ty)
          })
          .collect::<Vec<_>>();
        format!("object({})", object(&entries, level))
      }
    }
  }
}
