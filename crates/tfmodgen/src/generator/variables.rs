use std::collections::HashMap;

use anyhow::bail;
use tfmodgen_core::ConstraintResolver;

use super::{
  descriptions::variable_description,
  locals::TopLevel,
  metrics::GenerationWarning,
  render::{attribute, description},
  secrets::SecretField,
  types::TypeExpr,
  validation::{Validation, ValueKind, build_validation, has_empty_enum},
  walker::{Field, Schema, Shape},
};

/// Level of attributes inside a `variable` block.
const ATTRIBUTE_LEVEL: usize = 1;

/// One `variable` block of `variables.tf`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Variable {
  pub name: String,
  pub description: String,
  pub ty: TypeExpr,
  pub default_null: bool,
  pub ephemeral: bool,
  pub sensitive: bool,
  pub validations: Vec<Validation>,
}

impl Variable {
  fn new(name: &str, description: impl Into<String>, ty: TypeExpr) -> Self {
    Self {
      name: name.to_string(),
      description: description.into(),
      ty,
      default_null: false,
      ephemeral: false,
      sensitive: false,
      validations: Vec::new(),
    }
  }

  fn optional(mut self) -> Self {
    self.default_null = true;
    self
  }

  pub(crate) fn to_block(&self) -> hcl::Block {
    let mut block = hcl::Block::builder("variable")
      .add_label(self.name.as_str())
      .add_attribute(attribute("description", description(&self.description, ATTRIBUTE_LEVEL)))
      .add_attribute(attribute("type", self.ty.render(ATTRIBUTE_LEVEL)));

    if self.default_null {
      block = block.add_attribute(attribute("default", "null"));
    }
    if self.ephemeral {
      block = block.add_attribute(attribute("ephemeral", "true"));
    }
    if self.sensitive {
      block = block.add_attribute(attribute("sensitive", "true"));
    }
    for validation in &self.validations {
      block = block.add_block(validation.to_block());
    }
    block.build()
  }
}

/// Collects the module's variables in file order, rejecting name collisions.
pub(crate) struct VariableSet<'g> {
  constraints: ConstraintResolver<'g>,
  variables: Vec<Variable>,
  /// Variable name to the API path it was derived from.
  origins: HashMap<String, String>,
  warnings: Vec<GenerationWarning>,
}

impl<'g> VariableSet<'g> {
  pub(crate) fn new(constraints: ConstraintResolver<'g>) -> Self {
    Self {
      constraints,
      variables: Vec::new(),
      origins: HashMap::new(),
      warnings: Vec::new(),
    }
  }

  /// Builds every variable: the fixed resource arguments, one per writable
  /// root field (the `properties` bag flattened), nested secrets and their
  /// version trackers.
  pub(crate) fn build(
    mut self,
    root: Option<&Schema>,
    top_level: TopLevel,
    secrets: &[SecretField],
  ) -> anyhow::Result<(Vec<Variable>, Vec<GenerationWarning>)> {
    self.fixed("name", Variable::new("name", "The name of the resource.", TypeExpr::String));
    self.fixed(
      "parent_id",
      Variable::new("parent_id", "The parent resource ID for this resource.", TypeExpr::String),
    );
    if top_level.location {
      self.fixed(
        "location",
        Variable::new("location", "The location of the resource.", TypeExpr::String),
      );
    }
    if top_level.tags {
      self.fixed(
        "tags",
        Variable::new("tags", "Tags to apply to the resource.", TypeExpr::Map(Box::new(TypeExpr::String))).optional(),
      );
    }

    if let Some(root) = root {
      for field in root.fields() {
        if top_level.handles(&field.name) {
          continue;
        }
        if field.name == "properties" && field.schema.is_object() && !field.schema.secret {
          for child in field.schema.fields() {
            self.field(child, format!("properties.{}", child.name))?;
          }
          continue;
        }
        self.field(field, field.name.clone())?;
      }
    }

    for secret in secrets {
      self.secret(secret)?;
    }
    for secret in secrets {
      self.version(secret)?;
    }

    Ok((self.variables, self.warnings))
  }

  fn fixed(&mut self, name: &str, variable: Variable) {
    self.origins.insert(name.to_string(), name.to_string());
    self.variables.push(variable);
  }

  fn claim(&mut self, name: &str, path: &str, origin: &str) -> anyhow::Result<()> {
    if name.is_empty() {
      bail!("could not derive terraform variable name for {path}");
    }
    if self.origins.contains_key(name) {
      bail!("terraform variable name collision: {name:?} (from {origin})");
    }
    self.origins.insert(name.to_string(), path.to_string());
    Ok(())
  }

  fn field(&mut self, field: &Field, path: String) -> anyhow::Result<()> {
    self.claim(&field.snake, &path, &path)?;

    let secret = field.schema.secret;
    let mut variable = Variable::new(
      &field.snake,
      variable_description(field, !secret),
      TypeExpr::from_schema(&field.schema, !secret),
    );
    variable.default_null = !field.required;
    variable.ephemeral = secret;
    variable.sensitive = !secret && field.schema.has_unlifted_secret(true);

    let constraints = self
      .constraints
      .resolve_all(field.schema.declarations.iter().copied());
    if has_empty_enum(&constraints) {
      self.warnings.push(GenerationWarning::EmptyEnumIntersection {
        variable: field.snake.clone(),
      });
    }
    variable
      .validations
      .extend(build_validation(&field.snake, value_kind(&field.schema), field.required, &constraints));

    self.variables.push(variable);
    Ok(())
  }

  fn secret(&mut self, secret: &SecretField) -> anyhow::Result<()> {
    // Top-level secrets already have their variable.
    if self.origins.get(&secret.var_name) == Some(&secret.path) {
      return Ok(());
    }
    self.claim(&secret.var_name, &secret.path, &secret.path)?;

    let leaf = secret.path.rsplit('.').next().unwrap_or(&secret.path);
    let description = secret
      .description
      .clone()
      .unwrap_or_else(|| format!("The {leaf} of the resource."));
    let mut variable = Variable::new(&secret.var_name, description, secret.ty.clone()).optional();
    variable.ephemeral = true;
    self.variables.push(variable);
    Ok(())
  }

  fn version(&mut self, secret: &SecretField) -> anyhow::Result<()> {
    let name = secret.version_var();
    self.claim(&name, &secret.path, "secret version var")?;

    let var = &secret.var_name;
    let mut variable = Variable::new(
      &name,
      format!("Version tracker for {var}. Must be set when {var} is provided."),
      TypeExpr::Number,
    )
    .optional();
    variable.validations.push(Validation {
      condition: format!("var.{var} == null || var.{name} != null"),
      error_message: format!("When {var} is set, {name} must also be set."),
    });
    self.variables.push(variable);
    Ok(())
  }
}

fn value_kind(schema: &Schema) -> ValueKind {
  match &schema.shape {
    Shape::Scalar(kind) => ValueKind::Scalar(*kind),
    Shape::List(_) => ValueKind::List,
    _ => ValueKind::Other,
  }
}
