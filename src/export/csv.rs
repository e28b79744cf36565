//! CSV export functionality
//!
//! Exports the segment ledger to CSV format: one row per segment joined
//! with its parent expense header.

use std::io::Write;

use crate::error::{CostsplitError, CostsplitResult};
use crate::storage::Storage;

/// Export all segments with their expense context to CSV
pub fn export_segments_csv<W: Write>(storage: &Storage, writer: &mut W) -> CostsplitResult<()> {
    writeln!(
        writer,
        "Expense ID,Date,Vendor,Expense Total,Status,Segment ID,Category,Amount,Percentage"
    )
    .map_err(|e| CostsplitError::Export(e.to_string()))?;

    for expense in storage.expenses.get_all()? {
        for segment in storage.segments.get_for_expense(expense.id)? {
            writeln!(
                writer,
                "{},{},{},{},{},{},{},{},{}",
                expense.id,
                expense.date,
                escape_csv(&expense.vendor),
                expense.amount.to_decimal_string(),
                expense.status,
                segment.id,
                escape_csv(&segment.category),
                segment.amount.to_decimal_string(),
                segment.percentage,
            )
            .map_err(|e| CostsplitError::Export(e.to_string()))?;
        }
    }

    Ok(())
}

/// Quote a CSV field if it contains separators or quotes
fn escape_csv(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
