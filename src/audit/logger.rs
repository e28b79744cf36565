//! Audit logger for append-only audit log
//!
//! Provides the AuditLogger struct that writes audit entries to a log file.
//! Each entry is written as a single JSON line and flushed immediately.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use crate::error::{CostsplitError, CostsplitResult};

use super::entry::AuditEntry;

/// Handles writing audit entries to the audit log file
///
/// The log file uses a line-delimited JSON format (JSONL) where each line
/// is a complete JSON object representing one audit entry.
pub struct AuditLogger {
    /// Path to the audit log file
    log_path: PathBuf,
}

impl AuditLogger {
    /// Create a new AuditLogger that writes to the specified path
    pub fn new(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    /// Log an audit entry
    ///
    /// Appends the entry as a JSON line to the audit log file.
    /// Each write is flushed immediately to ensure durability.
    pub fn log(&self, entry: &AuditEntry) -> CostsplitResult<()> {
        let mut file = self.open_for_append()?;

        let json = serde_json::to_string(entry)
            .map_err(|e| CostsplitError::Json(format!("Failed to serialize audit entry: {}", e)))?;

        writeln!(file, "{}", json)
            .map_err(|e| CostsplitError::Io(format!("Failed to write audit entry: {}", e)))?;

        file.flush()
            .map_err(|e| CostsplitError::Io(format!("Failed to flush audit log: {}", e)))?;

        Ok(())
    }

    /// Log multiple audit entries, flushing once at the end
    ///
    /// Used by whole-set replaces so the delete and create entries land
    /// together.
    pub fn log_batch(&self, entries: &[AuditEntry]) -> CostsplitResult<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut file = self.open_for_append()?;

        for entry in entries {
            let json = serde_json::to_string(entry).map_err(|e| {
                CostsplitError::Json(format!("Failed to serialize audit entry: {}", e))
            })?;

            writeln!(file, "{}", json)
                .map_err(|e| CostsplitError::Io(format!("Failed to write audit entry: {}", e)))?;
        }

        file.flush()
            .map_err(|e| CostsplitError::Io(format!("Failed to flush audit log: {}", e)))?;

        Ok(())
    }

    /// Read all audit entries from the log file
    ///
    /// Returns entries in chronological order (oldest first). Malformed
    /// lines are skipped rather than failing the whole read.
    pub fn read_all(&self) -> CostsplitResult<Vec<AuditEntry>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.log_path)
            .map_err(|e| CostsplitError::Io(format!("Failed to open audit log: {}", e)))?;

        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for line in reader.lines() {
            let line =
                line.map_err(|e| CostsplitError::Io(format!("Failed to read audit log: {}", e)))?;
            if line.trim().is_empty() {
                continue;
            }
            if let Ok(entry) = serde_json::from_str(&line) {
                entries.push(entry);
            }
        }

        Ok(entries)
    }

    fn open_for_append(&self) -> CostsplitResult<File> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| CostsplitError::Io(format!("Failed to open audit log: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::entry::EntityType;
    use tempfile::TempDir;

    fn logger() -> (TempDir, AuditLogger) {
        let temp_dir = TempDir::new().unwrap();
        let logger = AuditLogger::new(temp_dir.path().join("audit.log"));
        (temp_dir, logger)
    }

    #[test]
    fn test_log_and_read_back() {
        let (_tmp, logger) = logger();

        let entry = AuditEntry::create(
            EntityType::Segment,
            "seg-12345678",
            Some("Travel".to_string()),
            &serde_json::json!({"category": "Travel"}),
        );
        logger.log(&entry).unwrap();

        let entries = logger.read_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].entity_id, "seg-12345678");
    }

    #[test]
    fn test_log_batch() {
        let (_tmp, logger) = logger();

        let entries: Vec<_> = (0..3)
            .map(|i| {
                AuditEntry::create(
                    EntityType::Segment,
                    format!("seg-{:08}", i),
                    None,
                    &serde_json::json!({}),
                )
            })
            .collect();
        logger.log_batch(&entries).unwrap();

        assert_eq!(logger.read_all().unwrap().len(), 3);
    }

    #[test]
    fn test_read_missing_file_is_empty() {
        let (_tmp, logger) = logger();
        assert!(logger.read_all().unwrap().is_empty());
    }
}
