//! Expense CLI commands

use chrono::{NaiveDate, Utc};
use clap::Subcommand;

use crate::display::{format_expense_details, format_expense_table};
use crate::error::{CostsplitError, CostsplitResult};
use crate::models::{ExpenseId, ExpenseStatus, ExpenseType, Identity, Money};
use crate::services::ExpenseService;
use crate::storage::Storage;

/// Expense subcommands
#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// Submit a new expense
    Add {
        /// Vendor name
        vendor: String,
        /// Total amount (e.g., "100" or "100.00")
        amount: String,
        /// Business date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
        /// Submission kind: expense or invoice
        #[arg(short, long, default_value = "expense")]
        kind: String,
        /// Free-form description
        #[arg(long)]
        description: Option<String>,
    },

    /// List visible expenses
    List,

    /// Show expense details
    Show {
        /// Expense ID
        expense: String,
    },

    /// Change an expense's workflow status
    #[command(name = "set-status")]
    SetStatus {
        /// Expense ID
        expense: String,
        /// New status: submitted, pending-review, approved, rejected
        status: String,
    },
}

/// Handle an expense command
pub fn handle_expense_command(
    storage: &Storage,
    identity: &Identity,
    cmd: ExpenseCommands,
) -> CostsplitResult<()> {
    let service = ExpenseService::new(storage);

    match cmd {
        ExpenseCommands::Add {
            vendor,
            amount,
            date,
            kind,
            description,
        } => {
            let amount = Money::parse(&amount)
                .map_err(|e| CostsplitError::Validation(e.to_string()))?;
            let date = match date {
                Some(s) => parse_date(&s)?,
                None => Utc::now().date_naive(),
            };
            let kind: ExpenseType = kind
                .parse()
                .map_err(CostsplitError::Validation)?;

            let expense =
                service.create(date, &vendor, amount, kind, description.as_deref(), identity)?;
            println!("Created expense {} for {}", expense.id, expense.amount);
        }

        ExpenseCommands::List => {
            let expenses = service.list(identity)?;
            println!("{}", format_expense_table(&expenses));
        }

        ExpenseCommands::Show { expense } => {
            let expense_id = parse_expense_id(&expense)?;
            let expense = service.get(expense_id, identity)?;
            print!("{}", format_expense_details(&expense));
        }

        ExpenseCommands::SetStatus { expense, status } => {
            let expense_id = parse_expense_id(&expense)?;
            let status: ExpenseStatus = status
                .parse()
                .map_err(CostsplitError::Validation)?;

            let expense = service.set_status(expense_id, status, identity)?;
            println!("Expense {} is now {}", expense.id.short(), expense.status);
        }
    }

    Ok(())
}

/// Parse an expense ID argument
pub fn parse_expense_id(s: &str) -> CostsplitResult<ExpenseId> {
    s.parse()
        .map_err(|_| CostsplitError::Validation(format!("Invalid expense id: {}", s)))
}

/// Parse a YYYY-MM-DD date argument
pub fn parse_date(s: &str) -> CostsplitResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| CostsplitError::Validation(format!("Invalid date (expected YYYY-MM-DD): {}", s)))
}
