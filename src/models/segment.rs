//! Segment model
//!
//! A segment is one named-category slice of an expense's total amount. Its
//! percentage share is always derived from the amount and the parent total;
//! the value a caller supplies is only ever a consistency check.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{ExpenseId, SegmentId};
use super::money::Money;
use super::percentage::Percentage;

/// A category slice of an expense
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    /// Unique identifier, stable after creation
    pub id: SegmentId,

    /// Parent expense, immutable once set
    pub expense_id: ExpenseId,

    /// Category name, unique within the parent expense (case-insensitive)
    pub category: String,

    /// Slice amount, 0 < amount <= parent total
    pub amount: Money,

    /// Derived share of the parent total
    pub percentage: Percentage,

    /// When the segment was created
    pub created_at: DateTime<Utc>,

    /// When the segment was last modified
    pub updated_at: DateTime<Utc>,
}

impl Segment {
    /// Create a new segment with a freshly assigned identifier
    pub fn new(
        expense_id: ExpenseId,
        category: impl Into<String>,
        amount: Money,
        percentage: Percentage,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: SegmentId::new(),
            expense_id,
            category: category.into(),
            amount,
            percentage,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rewrite category, amount, and percentage in place
    pub fn apply(&mut self, category: impl Into<String>, amount: Money, percentage: Percentage) {
        self.category = category.into();
        self.amount = amount;
        self.percentage = percentage;
        self.updated_at = Utc::now();
    }

    /// Validate segment-local constraints
    pub fn validate(&self) -> Result<(), SegmentValidationError> {
        if self.category.trim().is_empty() {
            return Err(SegmentValidationError::EmptyCategory);
        }

        if self.category.len() > 100 {
            return Err(SegmentValidationError::CategoryTooLong(self.category.len()));
        }

        if !self.amount.is_positive() {
            return Err(SegmentValidationError::NonPositiveAmount(self.amount));
        }

        Ok(())
    }
}

/// A proposed segment as submitted by a caller
///
/// Percentage is optional; when present it must agree with the value derived
/// from amount and the parent expense total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentInput {
    pub category: String,
    pub amount: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<Percentage>,
}

impl SegmentInput {
    /// Convenience constructor without an explicit percentage
    pub fn new(category: impl Into<String>, amount: Money) -> Self {
        Self {
            category: category.into(),
            amount,
            percentage: None,
        }
    }

    /// Constructor with an explicit percentage to be consistency-checked
    pub fn with_percentage(
        category: impl Into<String>,
        amount: Money,
        percentage: Percentage,
    ) -> Self {
        Self {
            category: category.into(),
            amount,
            percentage: Some(percentage),
        }
    }
}

/// Validation errors for segments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentValidationError {
    EmptyCategory,
    CategoryTooLong(usize),
    NonPositiveAmount(Money),
}

impl fmt::Display for SegmentValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentValidationError::EmptyCategory => write!(f, "Category cannot be empty"),
            SegmentValidationError::CategoryTooLong(len) => {
                write!(f, "Category name too long ({} chars, max 100)", len)
            }
            SegmentValidationError::NonPositiveAmount(amount) => {
                write!(f, "Segment amount must be positive, got {}", amount)
            }
        }
    }
}

impl std::error::Error for SegmentValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_segment() {
        let expense_id = ExpenseId::new();
        let segment = Segment::new(
            expense_id,
            "Travel",
            Money::from_cents(6000),
            Percentage::from_hundredths(6000),
        );

        assert_eq!(segment.expense_id, expense_id);
        assert_eq!(segment.category, "Travel");
        assert!(segment.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_category() {
        let mut segment = Segment::new(
            ExpenseId::new(),
            "Travel",
            Money::from_cents(100),
            Percentage::zero(),
        );
        segment.category = "  ".into();
        assert_eq!(segment.validate(), Err(SegmentValidationError::EmptyCategory));
    }

    #[test]
    fn test_validate_rejects_zero_amount() {
        let segment = Segment::new(
            ExpenseId::new(),
            "Travel",
            Money::zero(),
            Percentage::zero(),
        );
        assert!(matches!(
            segment.validate(),
            Err(SegmentValidationError::NonPositiveAmount(_))
        ));
    }

    #[test]
    fn test_apply_touches_updated_at() {
        let mut segment = Segment::new(
            ExpenseId::new(),
            "Travel",
            Money::from_cents(100),
            Percentage::zero(),
        );
        let id = segment.id;
        segment.apply("Meals", Money::from_cents(200), Percentage::from_hundredths(2000));

        assert_eq!(segment.id, id);
        assert_eq!(segment.category, "Meals");
        assert_eq!(segment.amount.cents(), 200);
    }
}
