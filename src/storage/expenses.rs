//! Expense repository for JSON storage
//!
//! The expense record store. The segmentation engine only ever reads from
//! it; header creation and status changes come from the expense service.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::{CostsplitError, CostsplitResult};
use crate::models::{Expense, ExpenseId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable expense data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ExpenseData {
    pub expenses: Vec<Expense>,
}

/// Repository for expense persistence
pub struct ExpenseRepository {
    path: PathBuf,
    expenses: RwLock<HashMap<ExpenseId, Expense>>,
}

impl ExpenseRepository {
    /// Create a new expense repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            expenses: RwLock::new(HashMap::new()),
        }
    }

    /// Load expenses from disk
    pub fn load(&self) -> CostsplitResult<()> {
        let file_data: ExpenseData = read_json(&self.path)?;

        let mut expenses = self.write_guard()?;
        expenses.clear();

        for expense in file_data.expenses {
            expenses.insert(expense.id, expense);
        }

        Ok(())
    }

    /// Save expenses to disk
    pub fn save(&self) -> CostsplitResult<()> {
        let expenses = self.read_guard()?;

        let mut list: Vec<_> = expenses.values().cloned().collect();
        list.sort_by_key(|e| (e.created_at, e.id));

        write_json_atomic(&self.path, &ExpenseData { expenses: list })
    }

    /// Get an expense by ID
    pub fn get(&self, id: ExpenseId) -> CostsplitResult<Option<Expense>> {
        let expenses = self.read_guard()?;
        Ok(expenses.get(&id).cloned())
    }

    /// Get all expenses, newest first
    pub fn get_all(&self) -> CostsplitResult<Vec<Expense>> {
        let expenses = self.read_guard()?;

        let mut list: Vec<_> = expenses.values().cloned().collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }

    /// Insert a new expense
    pub fn insert(&self, expense: Expense) -> CostsplitResult<()> {
        let mut expenses = self.write_guard()?;

        if expenses.contains_key(&expense.id) {
            return Err(CostsplitError::Duplicate {
                entity_type: "Expense",
                identifier: expense.id.to_string(),
            });
        }

        expenses.insert(expense.id, expense);
        Ok(())
    }

    /// Update an existing expense
    pub fn update(&self, expense: Expense) -> CostsplitResult<()> {
        let mut expenses = self.write_guard()?;

        if !expenses.contains_key(&expense.id) {
            return Err(CostsplitError::expense_not_found(expense.id.short()));
        }

        expenses.insert(expense.id, expense);
        Ok(())
    }

    fn read_guard(
        &self,
    ) -> CostsplitResult<std::sync::RwLockReadGuard<'_, HashMap<ExpenseId, Expense>>> {
        self.expenses
            .read()
            .map_err(|e| CostsplitError::Transient(format!("Failed to acquire read lock: {}", e)))
    }

    fn write_guard(
        &self,
    ) -> CostsplitResult<std::sync::RwLockWriteGuard<'_, HashMap<ExpenseId, Expense>>> {
        self.expenses
            .write()
            .map_err(|e| CostsplitError::Transient(format!("Failed to acquire write lock: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExpenseType, Money, UserId};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn repo() -> (TempDir, ExpenseRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = ExpenseRepository::new(temp_dir.path().join("expenses.json"));
        (temp_dir, repo)
    }

    fn expense(vendor: &str) -> Expense {
        Expense::new(
            NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            vendor,
            Money::from_cents(10000),
            ExpenseType::Expense,
            UserId::new(),
        )
    }

    #[test]
    fn test_insert_and_get() {
        let (_tmp, repo) = repo();
        let e = expense("Acme");
        let id = e.id;

        repo.insert(e).unwrap();
        assert_eq!(repo.get(id).unwrap().unwrap().vendor, "Acme");
    }

    #[test]
    fn test_insert_duplicate_rejected() {
        let (_tmp, repo) = repo();
        let e = expense("Acme");

        repo.insert(e.clone()).unwrap();
        let err = repo.insert(e).unwrap_err();
        assert!(matches!(err, CostsplitError::Duplicate { .. }));
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let (_tmp, repo) = repo();
        let err = repo.update(expense("Acme")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let (_tmp, repo) = repo();
        let e = expense("Acme");
        let id = e.id;

        repo.insert(e).unwrap();
        repo.save().unwrap();

        repo.load().unwrap();
        assert!(repo.get(id).unwrap().is_some());
    }
}
