//! Segment CLI commands
//!
//! Bridges clap argument parsing to the segmentation engine. Proposed sets
//! are written inline as CATEGORY:AMOUNT[:PERCENT] specs or imported from
//! CSV.

use std::fs::File;
use std::path::PathBuf;

use clap::Subcommand;

use crate::display::{format_segment_details, format_segment_table};
use crate::error::{CostsplitError, CostsplitResult};
use crate::models::{Identity, Money, Percentage, SegmentId, SegmentInput};
use crate::services::{import::parse_segments_csv, ExpenseService, SegmentationService};
use crate::storage::Storage;

use super::expense::parse_expense_id;

/// Segment subcommands
#[derive(Subcommand)]
pub enum SegmentCommands {
    /// List an expense's segments
    List {
        /// Expense ID
        expense: String,
    },

    /// Create the first and only segment (must cover the full total)
    Add {
        /// Expense ID
        expense: String,
        /// Category name
        category: String,
        /// Amount (must equal the expense total)
        amount: String,
        /// Expected percentage, checked against the derived value
        #[arg(short, long)]
        percentage: Option<String>,
    },

    /// Create a segment set on an unsegmented expense
    Create {
        /// Expense ID
        expense: String,
        /// Segment specs as CATEGORY:AMOUNT[:PERCENT]
        #[arg(required = true)]
        segments: Vec<String>,
    },

    /// Replace an expense's entire segment set
    Replace {
        /// Expense ID
        expense: String,
        /// Segment specs as CATEGORY:AMOUNT[:PERCENT]
        #[arg(conflicts_with = "from_csv")]
        segments: Vec<String>,
        /// Read the proposed set from a CSV file (category,amount[,percentage])
        #[arg(long)]
        from_csv: Option<PathBuf>,
    },

    /// Edit the one segment of a single-segment expense
    Update {
        /// Expense ID
        expense: String,
        /// Segment ID
        segment: String,
        /// New category name
        #[arg(short, long)]
        category: Option<String>,
        /// New amount
        #[arg(short, long)]
        amount: Option<String>,
    },

    /// Delete a segment
    Remove {
        /// Expense ID
        expense: String,
        /// Segment ID
        segment: String,
    },
}

/// Handle a segment command
pub fn handle_segment_command(
    storage: &Storage,
    identity: &Identity,
    cmd: SegmentCommands,
) -> CostsplitResult<()> {
    let service = SegmentationService::new(storage);
    let expenses = ExpenseService::new(storage);

    match cmd {
        SegmentCommands::List { expense } => {
            let expense_id = parse_expense_id(&expense)?;
            let expense = expenses.get(expense_id, identity)?;
            let segments = service.list_segments(expense_id, identity)?;
            println!("{}", format_segment_table(&expense, &segments));
        }

        SegmentCommands::Add {
            expense,
            category,
            amount,
            percentage,
        } => {
            let expense_id = parse_expense_id(&expense)?;
            let amount = Money::parse(&amount)
                .map_err(|e| CostsplitError::Validation(e.to_string()))?;
            let percentage = percentage
                .map(|p| Percentage::parse(&p))
                .transpose()
                .map_err(|e| CostsplitError::Validation(e.to_string()))?;

            let input = SegmentInput {
                category,
                amount,
                percentage,
            };
            let segment = service.create_segment(expense_id, input, identity)?;
            print!("{}", format_segment_details(&segment));
        }

        SegmentCommands::Create { expense, segments } => {
            let expense_id = parse_expense_id(&expense)?;
            let inputs = parse_segment_specs(&segments)?;

            let created = service.create_segments(expense_id, inputs, identity)?;
            let expense = expenses.get(expense_id, identity)?;
            println!("{}", format_segment_table(&expense, &created));
        }

        SegmentCommands::Replace {
            expense,
            segments,
            from_csv,
        } => {
            let expense_id = parse_expense_id(&expense)?;
            let inputs = match from_csv {
                Some(path) => {
                    let file = File::open(&path).map_err(|e| {
                        CostsplitError::Import(format!("Failed to open {}: {}", path.display(), e))
                    })?;
                    parse_segments_csv(file)?
                }
                None => parse_segment_specs(&segments)?,
            };

            let replaced = service.replace_segments(expense_id, inputs, identity)?;
            let expense = expenses.get(expense_id, identity)?;
            println!("{}", format_segment_table(&expense, &replaced));
        }

        SegmentCommands::Update {
            expense,
            segment,
            category,
            amount,
        } => {
            let expense_id = parse_expense_id(&expense)?;
            let segment_id = parse_segment_id(&segment)?;

            // Unspecified fields keep their stored values
            let existing = service
                .list_segments(expense_id, identity)?
                .into_iter()
                .find(|s| s.id == segment_id)
                .ok_or_else(|| CostsplitError::segment_not_found(segment_id.short()))?;

            let category = category.unwrap_or(existing.category);
            let amount = match amount {
                Some(s) => Money::parse(&s)
                    .map_err(|e| CostsplitError::Validation(e.to_string()))?,
                None => existing.amount,
            };

            let updated = service.update_segment(
                expense_id,
                segment_id,
                SegmentInput::new(category, amount),
                identity,
            )?;
            print!("{}", format_segment_details(&updated));
        }

        SegmentCommands::Remove { expense, segment } => {
            let expense_id = parse_expense_id(&expense)?;
            let segment_id = parse_segment_id(&segment)?;

            service.delete_segment(expense_id, segment_id, identity)?;
            println!("Deleted segment {}", segment_id.short());
        }
    }

    Ok(())
}

/// Parse a segment ID argument
fn parse_segment_id(s: &str) -> CostsplitResult<SegmentId> {
    s.parse()
        .map_err(|_| CostsplitError::Validation(format!("Invalid segment id: {}", s)))
}

/// Parse CATEGORY:AMOUNT[:PERCENT] specs into segment inputs
fn parse_segment_specs(specs: &[String]) -> CostsplitResult<Vec<SegmentInput>> {
    if specs.is_empty() {
        return Err(CostsplitError::Validation(
            "At least one CATEGORY:AMOUNT spec is required".into(),
        ));
    }

    specs.iter().map(|spec| parse_segment_spec(spec)).collect()
}

fn parse_segment_spec(spec: &str) -> CostsplitResult<SegmentInput> {
    let parts: Vec<&str> = spec.split(':').collect();

    let (category, amount, percentage) = match parts.as_slice() {
        [category, amount] => (*category, *amount, None),
        [category, amount, percentage] => (*category, *amount, Some(*percentage)),
        _ => {
            return Err(CostsplitError::Validation(format!(
                "Invalid segment spec '{}' (expected CATEGORY:AMOUNT or CATEGORY:AMOUNT:PERCENT)",
                spec
            )))
        }
    };

    let amount =
        Money::parse(amount).map_err(|e| CostsplitError::Validation(e.to_string()))?;
    let percentage = percentage
        .map(Percentage::parse)
        .transpose()
        .map_err(|e| CostsplitError::Validation(e.to_string()))?;

    Ok(SegmentInput {
        category: category.to_string(),
        amount,
        percentage,
    })
}
