//! Category display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::Category;

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Active")]
    active: String,
    #[tabled(rename = "Description")]
    description: String,
}

/// Format the category registry as a table
pub fn format_category_table(categories: &[Category]) -> String {
    if categories.is_empty() {
        return "No categories found.\n\nRun 'costsplit init' to create default categories."
            .to_string();
    }

    let rows: Vec<CategoryRow> = categories
        .iter()
        .map(|c| CategoryRow {
            name: c.name.clone(),
            active: if c.active { "yes" } else { "no" }.to_string(),
            description: c.description.clone(),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::sharp());
    table.to_string()
}
