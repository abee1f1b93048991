#![allow(clippy::fn_params_excessive_bools)]

pub mod generate;
pub mod list;

pub use generate::{GenerateConfig, generate_module};
pub use list::list_resources;
