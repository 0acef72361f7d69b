//! `nexus tools`: print the tool catalog

use crate::catalog::ToolCatalog;
use crate::error::{NexusError, Result};
use crate::service::CatalogListing;
use colored::Colorize;
use prettytable::{row, Table};

/// Handle `nexus tools [--json]`
pub fn handle_tools(json: bool) -> Result<()> {
    let catalog = ToolCatalog::builtin();

    if json {
        let listing = CatalogListing::new(&catalog);
        let rendered =
            serde_json::to_string_pretty(&listing).map_err(NexusError::Serialization)?;
        println!("{}", rendered);
        return Ok(());
    }

    println!("\nAvailable tools ({}):\n", catalog.len());
    catalog_table(&catalog).printstd();
    println!();
    Ok(())
}

fn catalog_table(catalog: &ToolCatalog) -> Table {
    let mut table = Table::new();
    table.add_row(row!["Category", "Tool", "Name", "Description"]);

    for category in catalog.categories() {
        for entry in catalog.in_category(*category) {
            table.add_row(row![
                category.as_str().bold(),
                entry.id.cyan(),
                entry.name,
                entry.description
            ]);
        }
    }

    table
}
