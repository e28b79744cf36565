//! Export CLI commands

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::Subcommand;

use crate::error::{CostsplitError, CostsplitResult};
use crate::export::{export_full_json, export_full_yaml, export_segments_csv};
use crate::storage::Storage;

/// Export subcommands
#[derive(Subcommand)]
pub enum ExportCommands {
    /// Export the segment ledger as CSV
    Segments {
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export the full dataset
    Full {
        /// Output format: json or yaml
        #[arg(short, long, default_value = "json")]
        format: String,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Handle an export command
pub fn handle_export_command(storage: &Storage, cmd: ExportCommands) -> CostsplitResult<()> {
    match cmd {
        ExportCommands::Segments { output } => {
            let mut writer = open_output(output)?;
            export_segments_csv(storage, &mut writer)
        }

        ExportCommands::Full { format, output } => {
            let mut writer = open_output(output)?;
            match format.to_lowercase().as_str() {
                "json" => export_full_json(storage, &mut writer),
                "yaml" | "yml" => export_full_yaml(storage, &mut writer),
                other => Err(CostsplitError::Export(format!(
                    "Unknown export format '{}' (expected json or yaml)",
                    other
                ))),
            }
        }
    }
}

fn open_output(path: Option<PathBuf>) -> CostsplitResult<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(&path).map_err(|e| {
                CostsplitError::Export(format!("Failed to create {}: {}", path.display(), e))
            })?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(io::stdout())),
    }
}
