use std::path::PathBuf;

use chrono::{Local, Timelike};
use crossterm::style::Stylize;

use crate::{
  generator::{
    ModuleConfig, ModuleGenerator,
    metrics::{GenerationStats, GenerationWarning},
  },
  ui::{Colors, GenerateCommand},
  utils::spec::{DocumentStore, SpecSource},
};

fn format_timestamp() -> String {
  let now = Local::now();
  format!("[{:02}:{:02}:{:02}]", now.hour(), now.minute(), now.second())
}

#[derive(Debug, Clone)]
pub struct GenerateConfig {
  pub source: SpecSource,
  pub output: PathBuf,
  pub module: ModuleConfig,
  pub verbose: bool,
  pub quiet: bool,
}

impl GenerateConfig {
  pub fn from_command(command: GenerateCommand) -> anyhow::Result<Self> {
    let GenerateCommand {
      spec,
      resource,
      output,
      root,
      local_name,
      api_version,
      verbose,
      quiet,
    } = command;

    let resource = resource.trim();
    if resource.is_empty() {
      anyhow::bail!("Resource type (-r) must not be empty");
    }
    let local_name = local_name.trim();
    if !crate::generator::naming::is_hcl_identifier(local_name) {
      anyhow::bail!("Invalid local name '{local_name}': expected an HCL identifier");
    }

    let module = ModuleConfig::builder()
      .resource_type(resource)
      .local_name(local_name)
      .maybe_api_version(non_blank(api_version))
      .maybe_root_path(non_blank(root))
      .build();

    Ok(Self {
      source: SpecSource::parse(&spec),
      output,
      module,
      verbose,
      quiet,
    })
  }
}

fn non_blank(value: Option<String>) -> Option<String> {
  value
    .map(|value| value.trim().to_string())
    .filter(|value| !value.is_empty())
}

struct GenerateLogger<'a> {
  config: &'a GenerateConfig,
  colors: &'a Colors,
}

impl<'a> GenerateLogger<'a> {
  fn new(config: &'a GenerateConfig, colors: &'a Colors) -> Self {
    Self { config, colors }
  }

  fn info(&self, message: &str) {
    if !self.config.quiet {
      println!("{} {message}", format_timestamp().with(self.colors.timestamp()));
    }
  }

  fn stat(&self, label: &str, value: String) {
    if !self.config.quiet {
      println!(
        "            {:<25} {}",
        label.with(self.colors.label()),
        value.with(self.colors.value())
      );
    }
  }

  fn log_loading(&self) {
    self.info(
      &format!("Loading specification from: {}", self.config.source)
        .with(self.colors.primary())
        .to_string(),
    );
  }

  fn log_generating(&self) {
    self.info(
      &format!("Generating module for {}...", self.config.module.resource_type)
        .with(self.colors.primary())
        .to_string(),
    );
  }

  fn print_statistics(&self, stats: &GenerationStats) {
    if self.config.quiet {
      return;
    }

    self.stat("Variables generated:", stats.variables_generated.to_string());
    if stats.validations_generated > 0 {
      self.stat("", format!("{} with validation", stats.validations_generated));
    }
    if stats.secrets_detected > 0 {
      self.stat("Secrets detected:", stats.secrets_detected.to_string());
    }
    self.stat("Files generated:", stats.files_generated.to_string());

    if self.config.verbose {
      self.stat("Documents loaded:", stats.documents_loaded.to_string());
      self.stat("Schema nodes:", stats.schema_nodes.to_string());
      self.stat(
        "Shapes resolved:",
        format!("{} ({} cache hits)", stats.shapes_resolved, stats.shape_cache_hits),
      );
    }

    if !stats.warnings.is_empty() {
      self.stat("Warnings:", stats.warnings.len().to_string());
    }
    self.print_warnings(&stats.warnings);
  }

  fn print_warnings(&self, warnings: &[GenerationWarning]) {
    let mut printed_header = false;
    for warning in warnings {
      if !(warning.is_degraded_input() || self.config.verbose) {
        continue;
      }

      if !printed_header {
        println!();
        printed_header = true;
      }
      eprintln!(
        "{} {}",
        "Warning:".with(self.colors.accent()),
        warning.to_string().with(self.colors.primary())
      );
    }
  }

  fn log_writing(&self) {
    self.info(
      &format!("Writing to: {}", self.config.output.display())
        .with(self.colors.primary())
        .to_string(),
    );
  }

  fn log_success(&self) {
    if !self.config.quiet {
      println!();
      println!(
        "{} {}",
        format_timestamp().with(self.colors.timestamp()),
        "Successfully generated Terraform module".with(self.colors.success())
      );
    }
  }
}

pub async fn generate_module(config: GenerateConfig, colors: &Colors) -> anyhow::Result<()> {
  let logger = GenerateLogger::new(&config, colors);

  logger.log_loading();
  let store = DocumentStore::load(config.source.clone()).await?;

  logger.log_generating();
  let module = ModuleGenerator::new(&store, config.module.clone()).generate()?;
  logger.print_statistics(&module.stats);

  logger.log_writing();
  module.write_to(&config.output).await?;

  logger.log_success();
  Ok(())
}
