//! Storage layer for costsplit
//!
//! Provides JSON file storage with atomic writes and automatic directory
//! creation. The Storage coordinator owns one repository per entity plus the
//! audit logger the services record through.

pub mod categories;
pub mod expenses;
pub mod file_io;
pub mod segments;

pub use categories::CategoryRepository;
pub use expenses::ExpenseRepository;
pub use file_io::{read_json, write_json_atomic};
pub use segments::SegmentRepository;

use serde::Serialize;

use crate::audit::{generate_diff, AuditEntry, AuditLogger, EntityType};
use crate::config::Paths;
use crate::error::CostsplitResult;

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: Paths,
    audit: AuditLogger,
    pub expenses: ExpenseRepository,
    pub segments: SegmentRepository,
    pub categories: CategoryRepository,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: Paths) -> CostsplitResult<Self> {
        // Ensure directories exist
        paths.ensure_directories()?;

        Ok(Self {
            audit: AuditLogger::new(paths.audit_log()),
            expenses: ExpenseRepository::new(paths.expenses_file()),
            segments: SegmentRepository::new(paths.segments_file()),
            categories: CategoryRepository::new(paths.categories_file()),
            paths,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    /// Get the audit logger
    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Load all data from disk
    pub fn load_all(&mut self) -> CostsplitResult<()> {
        self.expenses.load()?;
        self.segments.load()?;
        self.categories.load()?;
        Ok(())
    }

    /// Save all data to disk
    pub fn save_all(&self) -> CostsplitResult<()> {
        self.expenses.save()?;
        self.segments.save()?;
        self.categories.save()?;
        Ok(())
    }

    // Audit helpers used by the service layer

    /// Record a create operation in the audit log
    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: String,
        entity_name: Option<String>,
        entity: &T,
    ) -> CostsplitResult<()> {
        self.audit
            .log(&AuditEntry::create(entity_type, entity_id, entity_name, entity))
    }

    /// Record an update operation in the audit log with a field diff
    pub fn log_update<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: String,
        entity_name: Option<String>,
        before: &T,
        after: &T,
    ) -> CostsplitResult<()> {
        let diff = match (serde_json::to_value(before), serde_json::to_value(after)) {
            (Ok(b), Ok(a)) => generate_diff(&b, &a),
            _ => None,
        };
        self.audit.log(&AuditEntry::update(
            entity_type,
            entity_id,
            entity_name,
            before,
            after,
            diff,
        ))
    }

    /// Record a delete operation in the audit log
    pub fn log_delete<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: String,
        entity_name: Option<String>,
        entity: &T,
    ) -> CostsplitResult<()> {
        self.audit
            .log(&AuditEntry::delete(entity_type, entity_id, entity_name, entity))
    }

    /// Record a batch of entries in one flush
    pub fn log_batch(&self, entries: &[AuditEntry]) -> CostsplitResult<()> {
        self.audit.log_batch(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_storage_creation() {
        let temp_dir = TempDir::new().unwrap();
        let paths = Paths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();

        assert!(temp_dir.path().join("data").exists());
        assert!(!storage.paths().is_initialized());
    }

    #[test]
    fn test_load_all_on_empty_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = Paths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();

        storage.load_all().unwrap();
        assert!(storage.expenses.get_all().unwrap().is_empty());
        assert!(storage.categories.get_all().unwrap().is_empty());
    }
}
