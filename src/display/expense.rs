//! Expense display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::Expense;

#[derive(Tabled)]
struct ExpenseRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Vendor")]
    vendor: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Status")]
    status: String,
}

/// Format a list of expenses as a table
pub fn format_expense_table(expenses: &[Expense]) -> String {
    if expenses.is_empty() {
        return "No expenses found.\n\nUse 'costsplit expense add' to submit one.".to_string();
    }

    let rows: Vec<ExpenseRow> = expenses
        .iter()
        .map(|e| ExpenseRow {
            id: e.id.short(),
            date: e.date.to_string(),
            vendor: e.vendor.clone(),
            amount: e.amount.to_string(),
            kind: e.kind.to_string(),
            status: e.status.to_string(),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::sharp());
    table.to_string()
}

/// Format one expense with full identifiers
pub fn format_expense_details(expense: &Expense) -> String {
    let mut output = String::new();
    output.push_str(&format!("Expense:     {}\n", expense.id));
    output.push_str(&format!("Date:        {}\n", expense.date));
    output.push_str(&format!("Vendor:      {}\n", expense.vendor));
    output.push_str(&format!("Amount:      {}\n", expense.amount));
    output.push_str(&format!("Type:        {}\n", expense.kind));
    output.push_str(&format!("Status:      {}\n", expense.status));
    output.push_str(&format!("Owner:       {}\n", expense.owner));
    if !expense.description.is_empty() {
        output.push_str(&format!("Description: {}\n", expense.description));
    }
    output.push_str(&format!(
        "Created:     {}\n",
        expense.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    output
}
