pub mod cli;
pub mod colors;
pub mod commands;

pub use cli::{Cli, Commands, GenerateCommand, ListCommands};
pub use colors::Colors;

/// Terminal width for tables, 80 columns when stdout is not a terminal.
fn term_width() -> u16 {
  crossterm::terminal::size().map_or(80, |(width, _)| width)
}
