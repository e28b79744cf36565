//! Expense service
//!
//! Business logic for expense headers: creation, lookup, listing, and
//! workflow status changes. The segmentation engine treats this store as
//! read-only; all header mutation happens here.

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::access;
use crate::audit::EntityType;
use crate::error::{CostsplitError, CostsplitResult};
use crate::models::{Expense, ExpenseId, ExpenseStatus, ExpenseType, Identity, Money, Role};
use crate::storage::Storage;

/// Service for expense header management
pub struct ExpenseService<'a> {
    storage: &'a Storage,
}

impl<'a> ExpenseService<'a> {
    /// Create a new expense service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Submit a new expense owned by the requesting identity
    pub fn create(
        &self,
        date: NaiveDate,
        vendor: &str,
        amount: Money,
        kind: ExpenseType,
        description: Option<&str>,
        identity: &Identity,
    ) -> CostsplitResult<Expense> {
        let mut expense = Expense::new(date, vendor.trim(), amount, kind, identity.user_id);
        if let Some(description) = description {
            expense.description = description.trim().to_string();
        }

        expense
            .validate()
            .map_err(|e| CostsplitError::Validation(e.to_string()))?;

        self.storage.expenses.insert(expense.clone())?;
        self.storage.expenses.save()?;

        self.storage.log_create(
            EntityType::Expense,
            expense.id.to_string(),
            Some(expense.vendor.clone()),
            &expense,
        )?;
        info!(
            expense = %expense.id.short(),
            vendor = %expense.vendor,
            amount = %expense.amount,
            "created expense"
        );

        Ok(expense)
    }

    /// Fetch one expense, gated on view capability
    pub fn get(&self, expense_id: ExpenseId, identity: &Identity) -> CostsplitResult<Expense> {
        let expense = self
            .storage
            .expenses
            .get(expense_id)?
            .ok_or_else(|| CostsplitError::expense_not_found(expense_id.short()))?;

        if !access::can_view_expense(identity, &expense) {
            return Err(CostsplitError::forbidden(
                "view",
                format!("expense {}", expense_id.short()),
            ));
        }

        Ok(expense)
    }

    /// List expenses visible to the identity, newest first
    ///
    /// Employees see their own submissions; reviewing roles see everything.
    pub fn list(&self, identity: &Identity) -> CostsplitResult<Vec<Expense>> {
        let all = self.storage.expenses.get_all()?;

        let visible = match identity.role {
            Role::Employee => all
                .into_iter()
                .filter(|e| e.owner == identity.user_id)
                .collect(),
            Role::Manager | Role::Finance | Role::Admin => all,
        };

        debug!(count = visible.len(), user = %identity.user_id.short(), "listed expenses");
        Ok(visible)
    }

    /// Move an expense to a new workflow status
    ///
    /// Restricted to reviewing roles; owners cannot approve their own
    /// submissions by virtue of being owners.
    pub fn set_status(
        &self,
        expense_id: ExpenseId,
        status: ExpenseStatus,
        identity: &Identity,
    ) -> CostsplitResult<Expense> {
        if !access::can_review_expense(identity) {
            return Err(CostsplitError::forbidden(
                "review",
                format!("expense {}", expense_id.short()),
            ));
        }

        let mut expense = self
            .storage
            .expenses
            .get(expense_id)?
            .ok_or_else(|| CostsplitError::expense_not_found(expense_id.short()))?;

        let before = expense.clone();
        expense.set_status(status);

        self.storage.expenses.update(expense.clone())?;
        self.storage.expenses.save()?;

        self.storage.log_update(
            EntityType::Expense,
            expense.id.to_string(),
            Some(expense.vendor.clone()),
            &before,
            &expense,
        )?;
        info!(
            expense = %expense.id.short(),
            status = %expense.status,
            "changed expense status"
        );

        Ok(expense)
    }
}
