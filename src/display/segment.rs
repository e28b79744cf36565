//! Segment display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::{Expense, Money, Percentage, Segment};

#[derive(Tabled)]
struct SegmentRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Share")]
    percentage: String,
}

/// Format an expense's segments as a table with a reconciliation footer
pub fn format_segment_table(expense: &Expense, segments: &[Segment]) -> String {
    if segments.is_empty() {
        return format!(
            "Expense {} ({}) is unsegmented.\n\nUse 'costsplit segment replace' to split it across categories.",
            expense.id.short(),
            expense.amount
        );
    }

    let rows: Vec<SegmentRow> = segments
        .iter()
        .map(|s| SegmentRow {
            id: s.id.short(),
            category: s.category.clone(),
            amount: s.amount.to_string(),
            percentage: s.percentage.to_string(),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::sharp());

    let total: Money = segments.iter().map(|s| s.amount).sum();
    let total_pct: Percentage = segments.iter().map(|s| s.percentage).sum();

    format!(
        "{}\n{} segments, {} of {} ({})",
        table,
        segments.len(),
        total,
        expense.amount,
        total_pct
    )
}

/// Format one segment with full identifiers
pub fn format_segment_details(segment: &Segment) -> String {
    let mut output = String::new();
    output.push_str(&format!("Segment:    {}\n", segment.id));
    output.push_str(&format!("Expense:    {}\n", segment.expense_id));
    output.push_str(&format!("Category:   {}\n", segment.category));
    output.push_str(&format!("Amount:     {}\n", segment.amount));
    output.push_str(&format!("Share:      {}\n", segment.percentage));
    output.push_str(&format!(
        "Created:    {}\n",
        segment.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    output
}
