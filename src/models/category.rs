//! Category registry model
//!
//! The registry is the set of labels a segment may carry. Lookups are
//! case-insensitive and only active categories are valid for new segments;
//! deactivated ones stay on record for old data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::CategoryId;

/// A registry-controlled spending category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier
    pub id: CategoryId,

    /// Category name, unique in the registry (case-insensitive)
    pub name: String,

    /// Free-form description
    #[serde(default)]
    pub description: String,

    /// Whether the category may be used on new segments
    pub active: bool,

    /// When the category was created
    pub created_at: DateTime<Utc>,

    /// When the category was last modified
    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// Create a new active category
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: CategoryId::new(),
            name: name.into(),
            description: String::new(),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a new category with a description
    pub fn with_description(name: impl Into<String>, description: impl Into<String>) -> Self {
        let mut category = Self::new(name);
        category.description = description.into();
        category
    }

    /// Deactivate the category
    pub fn deactivate(&mut self) {
        self.active = false;
        self.updated_at = Utc::now();
    }

    /// Validate the category
    pub fn validate(&self) -> Result<(), CategoryValidationError> {
        if self.name.trim().is_empty() {
            return Err(CategoryValidationError::EmptyName);
        }

        if self.name.len() > 100 {
            return Err(CategoryValidationError::NameTooLong(self.name.len()));
        }

        Ok(())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Validation errors for categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryValidationError {
    EmptyName,
    NameTooLong(usize),
}

impl fmt::Display for CategoryValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryValidationError::EmptyName => write!(f, "Category name cannot be empty"),
            CategoryValidationError::NameTooLong(len) => {
                write!(f, "Category name too long ({} chars, max 100)", len)
            }
        }
    }
}

impl std::error::Error for CategoryValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_category_is_active() {
        let category = Category::new("Travel");
        assert!(category.active);
        assert!(category.validate().is_ok());
    }

    #[test]
    fn test_deactivate() {
        let mut category = Category::new("Travel");
        category.deactivate();
        assert!(!category.active);
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        let category = Category::new("   ");
        assert_eq!(category.validate(), Err(CategoryValidationError::EmptyName));
    }

    #[test]
    fn test_validate_rejects_long_name() {
        let category = Category::new("x".repeat(101));
        assert!(matches!(
            category.validate(),
            Err(CategoryValidationError::NameTooLong(101))
        ));
    }
}
