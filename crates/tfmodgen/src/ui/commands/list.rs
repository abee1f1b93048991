use comfy_table::{Attribute, Cell, ContentArrangement, Row, Table};

use crate::{
  openapi::{ResourceEntry, list_resource_types},
  ui::{Colors, colors::table_color, term_width},
  utils::spec::{DocumentStore, SpecSource},
};

fn resource_table(entries: &[ResourceEntry], colors: &Colors, width: u16) -> Table {
  let mut table = Table::new();
  table
    .load_preset("  ── ──            ")
    .set_content_arrangement(ContentArrangement::Dynamic)
    .set_width(width);

  let mut header = Row::new();
  for title in ["RESOURCE TYPE", "BODY SCHEMA", "PATH"] {
    header.add_cell(Cell::new(title).fg(table_color(colors.label())));
  }
  table.set_header(header);

  for entry in entries {
    let mut row = Row::new();
    row.add_cell(
      Cell::new(&entry.resource_type)
        .fg(table_color(colors.value()))
        .add_attribute(Attribute::Bold),
    );
    row.add_cell(Cell::new(entry.schema.as_deref().unwrap_or("-")).fg(table_color(colors.accent())));
    row.add_cell(Cell::new(&entry.path).fg(table_color(colors.primary())));
    table.add_row(row);
  }

  table
}

pub async fn list_resources(spec: &str, colors: &Colors) -> anyhow::Result<()> {
  let store = DocumentStore::load(SpecSource::parse(spec)).await?;
  let entries = list_resource_types(&store);

  if entries.is_empty() {
    println!("No resource types with a PUT operation found.");
    return Ok(());
  }

  println!("{}", resource_table(&entries, colors, term_width()));
  Ok(())
}
