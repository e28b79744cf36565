//! YAML export functionality
//!
//! Human-readable full dump, same shape as the JSON export.

use std::io::Write;

use crate::error::{CostsplitError, CostsplitResult};
use crate::storage::Storage;

use super::json::collect_full_export;

/// Export the full dataset as YAML
pub fn export_full_yaml<W: Write>(storage: &Storage, writer: &mut W) -> CostsplitResult<()> {
    let export = collect_full_export(storage)?;
    serde_yaml::to_writer(writer, &export).map_err(|e| CostsplitError::Export(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Paths;
    use tempfile::TempDir;

    #[test]
    fn test_export_yaml_has_schema_version() {
        let temp_dir = TempDir::new().unwrap();
        let paths = Paths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();

        let mut buffer = Vec::new();
        export_full_yaml(&storage, &mut buffer).unwrap();
        let output = String::from_utf8(buffer).unwrap();
        assert!(output.contains("schema_version: 1"));
    }
}
