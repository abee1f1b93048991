//! Terraform module generation for one azapi resource type.
//!
//! [`ModuleGenerator`] runs the whole pipeline over a loaded
//! [`DocumentStore`]: it locates the PUT body of the resource, builds the
//! schema graph, resolves composition lazily while walking the writable
//! properties and renders `terraform.tf`, `variables.tf`, `locals.tf`,
//! `main.tf` and `outputs.tf`.

pub(crate) mod descriptions;
pub(crate) mod locals;
pub mod metrics;
pub(crate) mod naming;
pub(crate) mod render;
pub(crate) mod resource;
pub(crate) mod secrets;
pub(crate) mod types;
pub(crate) mod validation;
pub(crate) mod variables;
pub(crate) mod walker;

use std::path::Path;

use anyhow::Context;
use strum::{Display, EnumIter};
use tfmodgen_core::{ConstraintResolver, SchemaFlags, SchemaId, ShapeResolver};

use self::{
  locals::{TopLevel, ValueExpr},
  metrics::{GenerationStats, GenerationWarning},
  render::blocks_to_hcl,
  resource::{BodySource, ResourceBlock, locals_block, output_blocks, terraform_block},
  secrets::collect_secrets,
  variables::{Variable, VariableSet},
  walker::SchemaWalker,
};
use crate::{
  openapi::{GraphBuilder, find_resource, locate::api_version, navigate},
  utils::spec::DocumentStore,
};

pub const DEFAULT_LOCAL_NAME: &str = "resource_body";

#[derive(Debug, Clone, bon::Builder)]
pub struct ModuleConfig {
  /// Resource type such as `Microsoft.KeyVault/vaults`.
  #[builder(into)]
  pub resource_type: String,
  #[builder(into, default = DEFAULT_LOCAL_NAME.to_string())]
  pub local_name: String,
  /// Overrides the version read from the document's `info` block.
  #[builder(into)]
  pub api_version: Option<String>,
  /// Dotted path below the request body to generate from, e.g. `properties`.
  #[builder(into)]
  pub root_path: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum ModuleFile {
  #[strum(to_string = "terraform.tf")]
  Terraform,
  #[strum(to_string = "variables.tf")]
  Variables,
  #[strum(to_string = "locals.tf")]
  Locals,
  #[strum(to_string = "main.tf")]
  Main,
  #[strum(to_string = "outputs.tf")]
  Outputs,
}

#[derive(Debug, Clone)]
pub struct GeneratedModule {
  pub files: Vec<(ModuleFile, String)>,
  pub stats: GenerationStats,
}

impl GeneratedModule {
  #[must_use]
  pub fn file(&self, kind: ModuleFile) -> Option<&str> {
    self
      .files
      .iter()
      .find(|(file, _)| *file == kind)
      .map(|(_, text)| text.as_str())
  }

  pub async fn write_to(&self, dir: &Path) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(dir)
      .await
      .with_context(|| format!("failed to create {}", dir.display()))?;

    for (file, text) in &self.files {
      let path = dir.join(file.to_string());
      tokio::fs::write(&path, text)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    }
    Ok(())
  }
}

pub struct ModuleGenerator<'s> {
  store: &'s DocumentStore,
  config: ModuleConfig,
}

impl<'s> ModuleGenerator<'s> {
  #[must_use]
  pub fn new(store: &'s DocumentStore, config: ModuleConfig) -> Self {
    Self { store, config }
  }

  pub fn generate(&self) -> anyhow::Result<GeneratedModule> {
    let mut stats = GenerationStats::default();
    stats.record_warnings(
      self
        .store
        .failures()
        .iter()
        .map(|(source, error)| GenerationWarning::DocumentUnavailable {
          source: source.clone(),
          error: error.clone(),
        }),
    );

    let located = find_resource(self.store, &self.config.resource_type)?;
    let mut builder = GraphBuilder::new(self.store);
    let body = builder.build_located(&located);
    let (graph, warnings) = builder.finish();
    stats.record_graph(graph.len(), self.store.len());
    stats.record_warnings(warnings);

    let mut resolver = ShapeResolver::new(&graph);
    let top_level = TopLevel {
      location: has_writable(&mut resolver, body, "location")?,
      tags: has_writable(&mut resolver, body, "tags")?,
    };

    let root_path = self.config.root_path.as_deref().unwrap_or("");
    let root = navigate(&mut resolver, body, root_path)
      .with_context(|| format!("failed to navigate to root path {root_path:?}"))?;
    if root.is_none() {
      stats.record_warning(GenerationWarning::ReadOnlyRoot {
        path: root_path.to_string(),
      });
    }

    let (schema, body_source) = match root {
      Some(id) => {
        let mut walker = SchemaWalker::new(&mut resolver);
        let schema = walker.walk(id)?;
        stats.record_warnings(walker.into_warnings());

        let source = if resolver.resolve(id)?.property("properties").is_some() {
          BodySource::Local
        } else {
          BodySource::PropertiesLocal
        };
        (Some(schema), source)
      }
      None => (None, BodySource::Empty),
    };
    stats.record_resolver(resolver.stats());

    let secrets = schema.as_ref().map(collect_secrets).unwrap_or_default();
    stats.record_secrets(secrets.len());

    let (variables, warnings) =
      VariableSet::new(ConstraintResolver::new(&graph)).build(schema.as_ref(), top_level, &secrets)?;
    stats.record_warnings(warnings);
    for variable in &variables {
      stats.record_variable(!variable.validations.is_empty());
    }

    let version = self
      .config
      .api_version
      .clone()
      .or_else(|| api_version(self.store.root()));
    // Secret paths are relative to the generation root; `sensitive_body`
    // merges into the full request body.
    let body_secrets = if body_source == BodySource::PropertiesLocal {
      secrets.iter().map(|secret| secret.nested_under("properties")).collect()
    } else {
      secrets.clone()
    };
    let main = ResourceBlock {
      resource_type: &self.config.resource_type,
      api_version: version.as_deref(),
      local_name: &self.config.local_name,
      body: body_source,
      top_level,
      secrets: &body_secrets,
    };

    let mut files = vec![
      (ModuleFile::Terraform, blocks_to_hcl([terraform_block()])?),
      (
        ModuleFile::Variables,
        blocks_to_hcl(variables.iter().map(Variable::to_block))?,
      ),
    ];
    if let Some(schema) = &schema {
      let value = ValueExpr::for_root(schema, top_level);
      files.push((
        ModuleFile::Locals,
        blocks_to_hcl([locals_block(&self.config.local_name, &value)])?,
      ));
      stats.record_local();
    }
    files.push((ModuleFile::Main, blocks_to_hcl([main.to_block()])?));
    files.push((ModuleFile::Outputs, blocks_to_hcl(output_blocks())?));
    for _ in &files {
      stats.record_file();
    }

    Ok(GeneratedModule { files, stats })
  }
}

fn has_writable(resolver: &mut ShapeResolver<'_>, id: SchemaId, name: &str) -> anyhow::Result<bool> {
  let Some(child) = resolver.resolve(id)?.property(name) else {
    return Ok(false);
  };
  Ok(resolver.resolve(child)?.is_writable())
}

#[cfg(test)]
mod tests;
