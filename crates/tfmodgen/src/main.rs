//! `tfmodgen` writes azapi Terraform module scaffolding for one resource type
//! of an Azure OpenAPI/Swagger document.

#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
use clap::Parser;

use crate::ui::{
  Cli, Colors, Commands, ListCommands, colors,
  commands::{GenerateConfig, generate_module, list_resources},
};

mod generator;
mod openapi;
mod ui;
mod utils;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();
  let colors = Colors::new(colors::colors_enabled(cli.color), colors::detect_theme(cli.theme));

  match cli.command {
    Commands::List {
      list_command: ListCommands::Resources { spec },
    } => list_resources(&spec, &colors).await,
    Commands::Generate(command) => generate_module(GenerateConfig::from_command(command)?, &colors).await,
  }
}
