//! Category registry service
//!
//! Business logic for the category registry: listing, creation, and
//! deactivation. Registry management is restricted to reviewing roles;
//! segments reference categories by validated name only.

use tracing::info;

use crate::access;
use crate::audit::EntityType;
use crate::error::{CostsplitError, CostsplitResult};
use crate::models::{Category, Identity};
use crate::storage::Storage;

/// Service for category registry management
pub struct CategoryService<'a> {
    storage: &'a Storage,
}

impl<'a> CategoryService<'a> {
    /// Create a new category service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// List active categories sorted by name
    pub fn list_active(&self) -> CostsplitResult<Vec<Category>> {
        self.storage.categories.get_active()
    }

    /// List all categories including deactivated ones
    pub fn list_all(&self) -> CostsplitResult<Vec<Category>> {
        self.storage.categories.get_all()
    }

    /// Find a category by name (case-insensitive)
    pub fn find(&self, name: &str) -> CostsplitResult<Option<Category>> {
        self.storage.categories.get_by_name(name)
    }

    /// Create a new registry category
    pub fn create(
        &self,
        name: &str,
        description: Option<&str>,
        identity: &Identity,
    ) -> CostsplitResult<Category> {
        if !access::can_manage_categories(identity) {
            return Err(CostsplitError::forbidden("manage", "categories".to_string()));
        }

        let name = name.trim();
        if name.is_empty() {
            return Err(CostsplitError::Validation(
                "Category name cannot be empty".into(),
            ));
        }

        // Names are unique in the registry regardless of case
        if self.storage.categories.get_by_name(name)?.is_some() {
            return Err(CostsplitError::Duplicate {
                entity_type: "Category",
                identifier: name.to_string(),
            });
        }

        let category = match description {
            Some(description) => Category::with_description(name, description.trim()),
            None => Category::new(name),
        };

        category
            .validate()
            .map_err(|e| CostsplitError::Validation(e.to_string()))?;

        self.storage.categories.upsert(category.clone())?;
        self.storage.categories.save()?;

        self.storage.log_create(
            EntityType::Category,
            category.id.to_string(),
            Some(category.name.clone()),
            &category,
        )?;
        info!(category = %category.name, "created category");

        Ok(category)
    }

    /// Deactivate a category so new segments can no longer use it
    ///
    /// Existing segments keep the name on record.
    pub fn deactivate(&self, name: &str, identity: &Identity) -> CostsplitResult<Category> {
        if !access::can_manage_categories(identity) {
            return Err(CostsplitError::forbidden("manage", "categories".to_string()));
        }

        let mut category = self
            .storage
            .categories
            .get_by_name(name)?
            .ok_or_else(|| CostsplitError::category_not_found(name))?;

        let before = category.clone();
        category.deactivate();

        self.storage.categories.upsert(category.clone())?;
        self.storage.categories.save()?;

        self.storage.log_update(
            EntityType::Category,
            category.id.to_string(),
            Some(category.name.clone()),
            &before,
            &category,
        )?;
        info!(category = %category.name, "deactivated category");

        Ok(category)
    }

    /// Seed the registry with a default category set
    ///
    /// Used by `costsplit init`; existing names are left untouched.
    pub fn seed_defaults(&self, identity: &Identity) -> CostsplitResult<Vec<Category>> {
        const DEFAULTS: [&str; 6] = [
            "Travel",
            "Meals",
            "Lodging",
            "Supplies",
            "Software",
            "Other",
        ];

        let mut created = Vec::new();
        for name in DEFAULTS {
            if self.storage.categories.get_by_name(name)?.is_none() {
                created.push(self.create(name, None, identity)?);
            }
        }

        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Paths;
    use crate::models::{Role, UserId};
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = Paths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn admin() -> Identity {
        Identity::new(UserId::new(), Role::Admin)
    }

    #[test]
    fn test_create_category() {
        let (_tmp, storage) = create_test_storage();
        let service = CategoryService::new(&storage);

        let category = service.create("Travel", None, &admin()).unwrap();
        assert_eq!(category.name, "Travel");
        assert!(category.active);
    }

    #[test]
    fn test_create_duplicate_rejected_case_insensitive() {
        let (_tmp, storage) = create_test_storage();
        let service = CategoryService::new(&storage);

        service.create("Travel", None, &admin()).unwrap();
        let err = service.create("travel", None, &admin()).unwrap_err();
        assert!(matches!(err, CostsplitError::Duplicate { .. }));
    }

    #[test]
    fn test_employee_cannot_manage() {
        let (_tmp, storage) = create_test_storage();
        let service = CategoryService::new(&storage);
        let employee = Identity::new(UserId::new(), Role::Employee);

        let err = service.create("Travel", None, &employee).unwrap_err();
        assert!(err.is_forbidden());
    }

    #[test]
    fn test_deactivate() {
        let (_tmp, storage) = create_test_storage();
        let service = CategoryService::new(&storage);

        service.create("Travel", None, &admin()).unwrap();
        let deactivated = service.deactivate("travel", &admin()).unwrap();
        assert!(!deactivated.active);

        assert!(service.list_active().unwrap().is_empty());
        assert_eq!(service.list_all().unwrap().len(), 1);
    }

    #[test]
    fn test_deactivate_missing_not_found() {
        let (_tmp, storage) = create_test_storage();
        let service = CategoryService::new(&storage);

        let err = service.deactivate("Travel", &admin()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_seed_defaults_is_idempotent() {
        let (_tmp, storage) = create_test_storage();
        let service = CategoryService::new(&storage);

        let first = service.seed_defaults(&admin()).unwrap();
        assert_eq!(first.len(), 6);

        let second = service.seed_defaults(&admin()).unwrap();
        assert!(second.is_empty());
    }
}
