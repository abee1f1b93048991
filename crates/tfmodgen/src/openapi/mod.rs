//! Bridges raw specification documents and the schema graph.
//!
//! [`GraphBuilder`] turns JSON schemas into a [`tfmodgen_core::SchemaGraph`],
//! [`locate`] finds the request body of a resource type and [`navigate`]
//! walks dotted property paths through composed shapes.

pub(crate) mod graph_builder;
pub(crate) mod locate;
pub(crate) mod navigate;

pub(crate) use graph_builder::GraphBuilder;
pub(crate) use locate::{LocatedResource, ResourceEntry, find_resource, list_resource_types};
pub(crate) use navigate::navigate;

#[cfg(test)]
mod tests;
