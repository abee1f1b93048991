use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::colors::{ColorMode, ThemeMode};

#[derive(Parser, Debug)]
#[command(name = "tfmodgen")]
#[command(author, version, about = "Azure OpenAPI to azapi Terraform module generator")]
pub struct Cli {
  #[command(subcommand)]
  pub command: Commands,

  /// Control color output
  #[arg(long, value_enum, default_value = "auto", global = true)]
  pub color: ColorMode,

  /// Terminal theme (dark or light background)
  #[arg(long, value_enum, default_value = "auto", global = true)]
  pub theme: ThemeMode,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
  /// List information from an Azure OpenAPI specification
  List {
    #[command(subcommand)]
    list_command: ListCommands,
  },
  /// Generate an azapi Terraform module for one resource type
  Generate(GenerateCommand),
}

#[derive(Args, Debug)]
pub struct GenerateCommand {
  /// Path or URL of the OpenAPI/Swagger specification (JSON or YAML)
  #[arg(short, long, value_name = "SPEC")]
  pub spec: String,

  /// Resource type to generate, e.g. Microsoft.KeyVault/vaults
  #[arg(short, long, value_name = "TYPE")]
  pub resource: String,

  /// Directory the module files are written to
  #[arg(short, long, value_name = "DIR", default_value = ".")]
  pub output: PathBuf,

  /// Dotted property path to generate from instead of the whole request body
  #[arg(long, value_name = "PATH")]
  pub root: Option<String>,

  /// Name of the local holding the rebuilt request body
  #[arg(long, value_name = "NAME", default_value = crate::generator::DEFAULT_LOCAL_NAME)]
  pub local_name: String,

  /// API version for the azapi type, defaults to the specification's info.version
  #[arg(long, value_name = "VERSION")]
  pub api_version: Option<String>,

  /// Enable verbose output with detailed progress information
  #[arg(short, long, default_value_t = false)]
  pub verbose: bool,

  /// Suppress non-essential output (errors only)
  #[arg(short, long, default_value_t = false)]
  pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum ListCommands {
  /// List every resource type with a PUT operation
  Resources {
    /// Path or URL of the OpenAPI/Swagger specification (JSON or YAML)
    #[arg(short, long, value_name = "SPEC")]
    spec: String,
  },
}
