//! Terminal output formatting
//!
//! Table views for lists and hand-formatted detail views; no interactive UI.

pub mod category;
pub mod expense;
pub mod segment;

pub use category::format_category_table;
pub use expense::{format_expense_details, format_expense_table};
pub use segment::{format_segment_details, format_segment_table};
