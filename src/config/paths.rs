//! Path management for costsplit
//!
//! Provides XDG-compliant path resolution for configuration and data.
//!
//! ## Path Resolution Order
//!
//! 1. `COSTSPLIT_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/costsplit` or `~/.config/costsplit`
//! 3. Windows: `%APPDATA%\costsplit`

use std::path::PathBuf;

use crate::error::CostsplitError;

/// Manages all paths used by costsplit
#[derive(Debug, Clone)]
pub struct Paths {
    /// Base directory for all costsplit data
    base_dir: PathBuf,
}

impl Paths {
    /// Create a new Paths instance
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, CostsplitError> {
        let base_dir = if let Ok(custom) = std::env::var("COSTSPLIT_DATA_DIR") {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create Paths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the data directory
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the audit log
    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    /// Get the path to expenses.json
    pub fn expenses_file(&self) -> PathBuf {
        self.data_dir().join("expenses.json")
    }

    /// Get the path to segments.json
    pub fn segments_file(&self) -> PathBuf {
        self.data_dir().join("segments.json")
    }

    /// Get the path to categories.json
    pub fn categories_file(&self) -> PathBuf {
        self.data_dir().join("categories.json")
    }

    /// Ensure all required directories exist
    pub fn ensure_directories(&self) -> Result<(), CostsplitError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| CostsplitError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| CostsplitError::Io(format!("Failed to create data directory: {}", e)))?;

        Ok(())
    }

    /// Check if costsplit has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

/// Resolve the default data directory path based on platform
#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, CostsplitError> {
    // Unix (Linux/macOS): Use XDG_CONFIG_HOME if set, otherwise ~/.config
    let config_base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| {
            std::env::var("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .map_err(|_| {
                    CostsplitError::Config("Could not determine home directory".into())
                })
        })?;
    Ok(config_base.join("costsplit"))
}

/// Resolve the default data directory path based on platform
#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, CostsplitError> {
    // Windows: Use APPDATA
    let appdata = std::env::var("APPDATA")
        .map_err(|_| CostsplitError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("costsplit"))
}
