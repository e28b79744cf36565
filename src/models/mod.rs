//! Core data models for costsplit

pub mod category;
pub mod expense;
pub mod identity;
pub mod ids;
pub mod money;
pub mod percentage;
pub mod segment;

pub use category::{Category, CategoryValidationError};
pub use expense::{Expense, ExpenseStatus, ExpenseType, ExpenseValidationError};
pub use identity::{Identity, Role};
pub use ids::{CategoryId, ExpenseId, SegmentId, UserId};
pub use money::{Money, MoneyParseError};
pub use percentage::{Percentage, PercentageParseError};
pub use segment::{Segment, SegmentInput, SegmentValidationError};
