//! JSON export functionality
//!
//! Machine-readable full dump of expenses, segments, and the category
//! registry under a schema version.

use std::io::Write;

use serde::Serialize;

use crate::error::{CostsplitError, CostsplitResult};
use crate::models::{Category, Expense, Segment};
use crate::storage::Storage;

/// Schema version stamped into full exports
pub const EXPORT_SCHEMA_VERSION: u32 = 1;

/// Complete data dump
#[derive(Debug, Serialize)]
pub struct FullExport {
    pub schema_version: u32,
    pub expenses: Vec<Expense>,
    pub segments: Vec<Segment>,
    pub categories: Vec<Category>,
}

/// Collect the full dataset for export
pub fn collect_full_export(storage: &Storage) -> CostsplitResult<FullExport> {
    let expenses = storage.expenses.get_all()?;

    let mut segments = Vec::new();
    for expense in &expenses {
        segments.extend(storage.segments.get_for_expense(expense.id)?);
    }

    Ok(FullExport {
        schema_version: EXPORT_SCHEMA_VERSION,
        expenses,
        segments,
        categories: storage.categories.get_all()?,
    })
}

/// Export the full dataset as pretty-printed JSON
pub fn export_full_json<W: Write>(storage: &Storage, writer: &mut W) -> CostsplitResult<()> {
    let export = collect_full_export(storage)?;
    serde_json::to_writer_pretty(&mut *writer, &export)
        .map_err(|e| CostsplitError::Export(e.to_string()))?;
    writeln!(writer).map_err(|e| CostsplitError::Export(e.to_string()))?;
    Ok(())
}
