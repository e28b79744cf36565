//! User settings for costsplit
//!
//! Small schema-versioned JSON config: display preferences only, no
//! behavioral knobs.

use serde::{Deserialize, Serialize};

use super::paths::Paths;
use crate::error::CostsplitError;
use crate::storage::file_io::{read_json, write_json_atomic};

/// User settings for costsplit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Default currency symbol
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            currency_symbol: default_currency(),
            date_format: default_date_format(),
        }
    }
}

impl Settings {
    /// Load settings from disk, creating the file with defaults if absent
    pub fn load_or_create(paths: &Paths) -> Result<Self, CostsplitError> {
        let path = paths.settings_file();

        if path.exists() {
            read_json(&path)
        } else {
            let settings = Settings::default();
            settings.save(paths)?;
            Ok(settings)
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &Paths) -> Result<(), CostsplitError> {
        paths.ensure_directories()?;
        write_json_atomic(paths.settings_file(), self)
    }
}
