use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use costsplit::cli::{
    handle_category_command, handle_expense_command, handle_export_command,
    handle_segment_command, CategoryCommands, ExpenseCommands, ExportCommands, SegmentCommands,
};
use costsplit::config::{Paths, Settings};
use costsplit::models::{Identity, Role, UserId};
use costsplit::services::CategoryService;
use costsplit::storage::Storage;

#[derive(Parser)]
#[command(
    name = "costsplit",
    version,
    about = "Terminal-based expense segmentation tool",
    long_about = "costsplit tracks submitted expenses and splits each one across \
                  spending categories. Segment amounts must reconcile to the \
                  expense total and percentage shares are derived automatically."
)]
struct Cli {
    /// Acting user id (UUID)
    #[arg(long, global = true, env = "COSTSPLIT_USER")]
    user: Option<String>,

    /// Acting role: employee, manager, finance, admin
    #[arg(long, global = true, env = "COSTSPLIT_ROLE", default_value = "employee")]
    role: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Expense management commands
    #[command(subcommand)]
    Expense(ExpenseCommands),

    /// Segment management commands
    #[command(subcommand, alias = "seg")]
    Segment(SegmentCommands),

    /// Category registry commands
    #[command(subcommand, alias = "cat")]
    Category(CategoryCommands),

    /// Data export commands
    #[command(subcommand)]
    Export(ExportCommands),

    /// Initialize the data directory with default categories
    Init,

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let identity = resolve_identity(&cli)?;

    let paths = Paths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    let mut storage = Storage::new(paths)?;
    storage.load_all()?;

    match cli.command {
        Commands::Expense(cmd) => handle_expense_command(&storage, &identity, cmd)?,
        Commands::Segment(cmd) => handle_segment_command(&storage, &identity, cmd)?,
        Commands::Category(cmd) => handle_category_command(&storage, &identity, cmd)?,
        Commands::Export(cmd) => handle_export_command(&storage, cmd)?,

        Commands::Init => {
            // Bootstrap runs with registry-management rights regardless of
            // the acting role; later changes go through the capability gate.
            let bootstrap = Identity::new(identity.user_id, Role::Admin);
            let service = CategoryService::new(&storage);
            let created = service.seed_defaults(&bootstrap)?;
            if created.is_empty() {
                println!("Categories already initialized.");
            } else {
                println!("Created {} default categories.", created.len());
            }
        }

        Commands::Config => {
            println!("Base directory: {}", storage.paths().base_dir().display());
            println!("Data directory: {}", storage.paths().data_dir().display());
            println!("Audit log:      {}", storage.paths().audit_log().display());
            println!("Currency:       {}", settings.currency_symbol);
            println!("Date format:    {}", settings.date_format);
            println!("Acting as:      {}", identity);
        }
    }

    Ok(())
}

/// Resolve the acting identity from --user/--role (or their env vars)
///
/// Without an explicit user id, a stable all-zero id stands in for the
/// local single user.
fn resolve_identity(cli: &Cli) -> Result<Identity> {
    let user_id = match &cli.user {
        Some(raw) => UserId::parse(raw)
            .map_err(|_| anyhow::anyhow!("Invalid user id (expected a UUID): {}", raw))?,
        None => UserId::from_uuid(Uuid::nil()),
    };

    let role: Role = cli
        .role
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    Ok(Identity::new(user_id, role))
}
