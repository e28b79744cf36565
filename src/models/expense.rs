//! Expense header model
//!
//! An expense is the parent record a segment set reconciles against. The
//! segmentation engine treats expenses as read-only: it consumes the total
//! amount, the owner, and the lifecycle status.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ids::{ExpenseId, UserId};
use super::money::Money;

/// Approval workflow state of an expense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseStatus {
    /// Newly submitted, awaiting review
    #[default]
    Submitted,
    /// Picked up by a reviewer
    PendingReview,
    /// Approved; locked against further segmentation changes
    Approved,
    /// Rejected; locked against further segmentation changes
    Rejected,
}

impl ExpenseStatus {
    /// Whether segments of an expense in this status may still be changed
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Submitted | Self::PendingReview)
    }
}

impl fmt::Display for ExpenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpenseStatus::Submitted => write!(f, "submitted"),
            ExpenseStatus::PendingReview => write!(f, "pending-review"),
            ExpenseStatus::Approved => write!(f, "approved"),
            ExpenseStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl FromStr for ExpenseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "submitted" => Ok(Self::Submitted),
            "pending-review" | "pending" => Ok(Self::PendingReview),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown expense status: {}", other)),
        }
    }
}

/// Kind of submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseType {
    #[default]
    Expense,
    Invoice,
}

impl fmt::Display for ExpenseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpenseType::Expense => write!(f, "expense"),
            ExpenseType::Invoice => write!(f, "invoice"),
        }
    }
}

impl FromStr for ExpenseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "expense" => Ok(Self::Expense),
            "invoice" => Ok(Self::Invoice),
            other => Err(format!("unknown expense type: {}", other)),
        }
    }
}

/// A submitted expense or invoice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    /// Unique identifier
    pub id: ExpenseId,

    /// Business date of the spend
    pub date: NaiveDate,

    /// Vendor the money went to
    pub vendor: String,

    /// Total amount, always positive
    pub amount: Money,

    /// Free-form description
    #[serde(default)]
    pub description: String,

    /// Expense or invoice
    #[serde(default)]
    pub kind: ExpenseType,

    /// User who submitted the expense
    pub owner: UserId,

    /// Approval workflow state
    #[serde(default)]
    pub status: ExpenseStatus,

    /// When the expense was created
    pub created_at: DateTime<Utc>,

    /// When the expense was last modified
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    /// Create a new expense owned by `owner`
    pub fn new(
        date: NaiveDate,
        vendor: impl Into<String>,
        amount: Money,
        kind: ExpenseType,
        owner: UserId,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ExpenseId::new(),
            date,
            vendor: vendor.into(),
            amount,
            description: String::new(),
            kind,
            owner,
            status: ExpenseStatus::Submitted,
            created_at: now,
            updated_at: now,
        }
    }

    /// Move to a new workflow status
    pub fn set_status(&mut self, status: ExpenseStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    /// Validate the expense header
    pub fn validate(&self) -> Result<(), ExpenseValidationError> {
        if self.vendor.trim().is_empty() {
            return Err(ExpenseValidationError::EmptyVendor);
        }

        if self.vendor.len() > 255 {
            return Err(ExpenseValidationError::VendorTooLong(self.vendor.len()));
        }

        if !self.amount.is_positive() {
            return Err(ExpenseValidationError::NonPositiveAmount(self.amount));
        }

        Ok(())
    }
}

/// Validation errors for expenses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpenseValidationError {
    EmptyVendor,
    VendorTooLong(usize),
    NonPositiveAmount(Money),
}

impl fmt::Display for ExpenseValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpenseValidationError::EmptyVendor => write!(f, "Vendor cannot be empty"),
            ExpenseValidationError::VendorTooLong(len) => {
                write!(f, "Vendor name too long ({} chars, max 255)", len)
            }
            ExpenseValidationError::NonPositiveAmount(amount) => {
                write!(f, "Expense amount must be positive, got {}", amount)
            }
        }
    }
}

impl std::error::Error for ExpenseValidationError {}
