use std::collections::HashSet;

use anyhow::Context;
use tfmodgen_core::{EffectiveShape, SchemaFlags, SchemaId, SchemaKind, ShapeResolver};

use super::{metrics::GenerationWarning, naming::to_snake_case};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScalarKind {
  String,
  Number,
  Bool,
}

/// What a schema turns into once composition is resolved.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Shape {
  Scalar(ScalarKind),
  /// Untyped, or a node whose composition left no type.
  Any,
  /// A node already being expanded further up the tree.
  Recursive,
  /// An object declaring properties; only the writable ones are kept.
  Object(Vec<Field>),
  /// An object whose values follow `additionalProperties`.
  Map(Box<Schema>),
  /// An object with neither properties nor a value schema.
  FreeMap,
  List(Option<Box<Schema>>),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Schema {
  pub id: SchemaId,
  pub shape: Shape,
  pub description: Option<String>,
  pub secret: bool,
  /// Every node declaring this property, for constraint tightening.
  pub declarations: Vec<SchemaId>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Field {
  pub name: String,
  pub snake: String,
  pub required: bool,
  pub schema: Schema,
}

impl Field {
  /// Whether the field is moved out of the body into `sensitive_body`.
  ///
  /// Only secrets reachable through plain object nesting can be addressed
  /// there; `lifting` turns false below lists and maps.
  pub(crate) fn is_lifted(&self, lifting: bool) -> bool {
    lifting && self.schema.secret
  }
}

impl Schema {
  pub(crate) fn fields(&self) -> &[Field] {
    match &self.shape {
      Shape::Object(fields) => fields,
      _ => &[],
    }
  }

  pub(crate) fn field(&self, name: &str) -> Option<&Field> {
    self.fields().iter().find(|field| field.name == name)
  }

  pub(crate) fn is_object(&self) -> bool {
    matches!(self.shape, Shape::Object(_))
  }

  pub(crate) fn scalar(&self) -> Option<ScalarKind> {
    match self.shape {
      Shape::Scalar(kind) => Some(kind),
      _ => None,
    }
  }

  /// Whether a secret sits somewhere below this schema without being lifted.
  pub(crate) fn has_unlifted_secret(&self, lifting: bool) -> bool {
    match &self.shape {
      Shape::Object(fields) => fields.iter().any(|field| {
        if field.schema.secret {
          !lifting
        } else {
          field.schema.has_unlifted_secret(lifting)
        }
      }),
      Shape::Map(values) => values.secret || values.has_unlifted_secret(false),
      Shape::List(Some(items)) => items.secret || items.has_unlifted_secret(false),
      _ => false,
    }
  }
}

/// Expands the effective shape of a node into a [`Schema`] tree.
///
/// Composition is resolved lazily through the shared [`ShapeResolver`], so
/// each node is merged once however often it is reached. A node met again
/// while it is still being expanded becomes [`Shape::Recursive`].
pub(crate) struct SchemaWalker<'r, 'g> {
  resolver: &'r mut ShapeResolver<'g>,
  stack: Vec<SchemaId>,
  reported: HashSet<SchemaId>,
  warnings: Vec<GenerationWarning>,
}

impl<'r, 'g> SchemaWalker<'r, 'g> {
  pub(crate) fn new(resolver: &'r mut ShapeResolver<'g>) -> Self {
    Self {
      resolver,
      stack: Vec::new(),
      reported: HashSet::new(),
      warnings: Vec::new(),
    }
  }

  pub(crate) fn walk(&mut self, root: SchemaId) -> anyhow::Result<Schema> {
    self.schema(root, vec![root], "")
  }

  pub(crate) fn into_warnings(self) -> Vec<GenerationWarning> {
    self.warnings
  }

  fn schema(&mut self, id: SchemaId, declarations: Vec<SchemaId>, path: &str) -> anyhow::Result<Schema> {
    let shape = self
      .resolver
      .resolve(id)
      .with_context(|| format!("failed to resolve {}", display_path(path)))?;
    self.report_undeclared(id, &shape);

    let kind = if self.stack.contains(&id) {
      Shape::Recursive
    } else {
      self.stack.push(id);
      let kind = self.shape(&shape, path);
      self.stack.pop();
      kind?
    };

    Ok(Schema {
      id,
      shape: kind,
      description: shape.description.clone(),
      secret: shape.is_secret(),
      declarations,
    })
  }

  fn shape(&mut self, shape: &EffectiveShape, path: &str) -> anyhow::Result<Shape> {
    if shape.has_kind(SchemaKind::String) {
      return Ok(Shape::Scalar(ScalarKind::String));
    }
    if shape.has_kind(SchemaKind::Integer) || shape.has_kind(SchemaKind::Number) {
      return Ok(Shape::Scalar(ScalarKind::Number));
    }
    if shape.has_kind(SchemaKind::Boolean) {
      return Ok(Shape::Scalar(ScalarKind::Bool));
    }

    if shape.is_array() {
      let items = match shape.items {
        Some(items) => Some(Box::new(self.schema(items, vec![items], &format!("{path}[]"))?)),
        None => None,
      };
      return Ok(Shape::List(items));
    }

    if shape.is_object() {
      if !shape.properties.is_empty() {
        return self.fields(shape, path).map(Shape::Object);
      }
      return Ok(match shape.additional_properties {
        Some(values) => Shape::Map(Box::new(self.schema(values, vec![values], &format!("{path}{{}}"))?)),
        None => Shape::FreeMap,
      });
    }

    Ok(Shape::Any)
  }

  fn fields(&mut self, shape: &EffectiveShape, path: &str) -> anyhow::Result<Vec<Field>> {
    let mut fields = Vec::with_capacity(shape.properties.len());
    for (name, &child) in &shape.properties {
      let child_path = if path.is_empty() {
        name.clone()
      } else {
        format!("{path}.{name}")
      };

      let child_shape = self
        .resolver
        .resolve(child)
        .with_context(|| format!("failed to resolve {child_path}"))?;
      if !child_shape.is_writable() {
        continue;
      }

      let schema = self.schema(child, shape.declarations_of(name).to_vec(), &child_path)?;
      fields.push(Field {
        name: name.clone(),
        snake: to_snake_case(name),
        required: shape.is_required(name),
        schema,
      });
    }
    Ok(fields)
  }

  fn report_undeclared(&mut self, id: SchemaId, shape: &EffectiveShape) {
    if shape.undeclared_required().next().is_none() || !self.reported.insert(id) {
      return;
    }
    let schema = self.resolver.graph().display_name(id);
    for property in shape.undeclared_required() {
      self.warnings.push(GenerationWarning::UndeclaredRequired {
        schema: schema.clone(),
        property: property.to_string(),
      });
    }
  }
}

fn display_path(path: &str) -> &str {
  if path.is_empty() { "the root schema" } else { path }
}
