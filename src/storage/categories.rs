//! Category registry repository for JSON storage
//!
//! The registry of valid segment categories. Name lookups are
//! case-insensitive; only active categories validate for new segments.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::{CostsplitError, CostsplitResult};
use crate::models::{Category, CategoryId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable category data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct CategoryData {
    pub categories: Vec<Category>,
}

/// Repository for category persistence
pub struct CategoryRepository {
    path: PathBuf,
    categories: RwLock<HashMap<CategoryId, Category>>,
}

impl CategoryRepository {
    /// Create a new category repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            categories: RwLock::new(HashMap::new()),
        }
    }

    /// Load categories from disk
    pub fn load(&self) -> CostsplitResult<()> {
        let file_data: CategoryData = read_json(&self.path)?;

        let mut categories = self.write_guard()?;
        categories.clear();

        for category in file_data.categories {
            categories.insert(category.id, category);
        }

        Ok(())
    }

    /// Save categories to disk
    pub fn save(&self) -> CostsplitResult<()> {
        let categories = self.read_guard()?;

        let mut list: Vec<_> = categories.values().cloned().collect();
        list.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

        write_json_atomic(&self.path, &CategoryData { categories: list })
    }

    /// Get a category by ID
    pub fn get(&self, id: CategoryId) -> CostsplitResult<Option<Category>> {
        let categories = self.read_guard()?;
        Ok(categories.get(&id).cloned())
    }

    /// Get a category by name (case-insensitive)
    pub fn get_by_name(&self, name: &str) -> CostsplitResult<Option<Category>> {
        let categories = self.read_guard()?;

        let name_lower = name.trim().to_lowercase();
        Ok(categories
            .values()
            .find(|c| c.name.to_lowercase() == name_lower)
            .cloned())
    }

    /// Get all categories sorted by name
    pub fn get_all(&self) -> CostsplitResult<Vec<Category>> {
        let categories = self.read_guard()?;

        let mut list: Vec<_> = categories.values().cloned().collect();
        list.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(list)
    }

    /// Get all active categories sorted by name
    pub fn get_active(&self) -> CostsplitResult<Vec<Category>> {
        Ok(self.get_all()?.into_iter().filter(|c| c.active).collect())
    }

    /// Whether `name` resolves to an active registry category
    pub fn is_valid_name(&self, name: &str) -> CostsplitResult<bool> {
        Ok(self.get_by_name(name)?.is_some_and(|c| c.active))
    }

    /// Insert or update a category
    pub fn upsert(&self, category: Category) -> CostsplitResult<()> {
        let mut categories = self.write_guard()?;
        categories.insert(category.id, category);
        Ok(())
    }

    fn read_guard(
        &self,
    ) -> CostsplitResult<std::sync::RwLockReadGuard<'_, HashMap<CategoryId, Category>>> {
        self.categories
            .read()
            .map_err(|e| CostsplitError::Transient(format!("Failed to acquire read lock: {}", e)))
    }

    fn write_guard(
        &self,
    ) -> CostsplitResult<std::sync::RwLockWriteGuard<'_, HashMap<CategoryId, Category>>> {
        self.categories
            .write()
            .map_err(|e| CostsplitError::Transient(format!("Failed to acquire write lock: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn repo() -> (TempDir, CategoryRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = CategoryRepository::new(temp_dir.path().join("categories.json"));
        (temp_dir, repo)
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let (_tmp, repo) = repo();
        repo.upsert(Category::new("Travel")).unwrap();

        assert!(repo.get_by_name("travel").unwrap().is_some());
        assert!(repo.get_by_name("TRAVEL").unwrap().is_some());
        assert!(repo.get_by_name(" travel ").unwrap().is_some());
        assert!(repo.get_by_name("Meals").unwrap().is_none());
    }

    #[test]
    fn test_inactive_category_is_invalid() {
        let (_tmp, repo) = repo();
        let mut category = Category::new("Travel");
        category.deactivate();
        repo.upsert(category).unwrap();

        assert!(repo.get_by_name("Travel").unwrap().is_some());
        assert!(!repo.is_valid_name("Travel").unwrap());
    }

    #[test]
    fn test_get_active_filters() {
        let (_tmp, repo) = repo();
        repo.upsert(Category::new("Travel")).unwrap();
        let mut old = Category::new("Faxes");
        old.deactivate();
        repo.upsert(old).unwrap();

        let active = repo.get_active().unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "Travel");

        assert_eq!(repo.get_all().unwrap().len(), 2);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let (_tmp, repo) = repo();
        repo.upsert(Category::new("Travel")).unwrap();
        repo.save().unwrap();

        repo.load().unwrap();
        assert!(repo.is_valid_name("travel").unwrap());
    }
}
