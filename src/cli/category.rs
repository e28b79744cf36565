//! Category CLI commands

use clap::Subcommand;

use crate::display::format_category_table;
use crate::error::CostsplitResult;
use crate::models::Identity;
use crate::services::CategoryService;
use crate::storage::Storage;

/// Category subcommands
#[derive(Subcommand)]
pub enum CategoryCommands {
    /// List registry categories
    List {
        /// Include deactivated categories
        #[arg(long)]
        all: bool,
    },

    /// Add a new category to the registry
    Add {
        /// Category name
        name: String,
        /// Description
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Deactivate a category
    Disable {
        /// Category name
        name: String,
    },
}

/// Handle a category command
pub fn handle_category_command(
    storage: &Storage,
    identity: &Identity,
    cmd: CategoryCommands,
) -> CostsplitResult<()> {
    let service = CategoryService::new(storage);

    match cmd {
        CategoryCommands::List { all } => {
            let categories = if all {
                service.list_all()?
            } else {
                service.list_active()?
            };
            println!("{}", format_category_table(&categories));
        }

        CategoryCommands::Add { name, description } => {
            let category = service.create(&name, description.as_deref(), identity)?;
            println!("Created category '{}'", category.name);
        }

        CategoryCommands::Disable { name } => {
            let category = service.deactivate(&name, identity)?;
            println!("Deactivated category '{}'", category.name);
        }
    }

    Ok(())
}
