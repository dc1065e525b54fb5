use crate::utils::DEFAULT_LOG_FILE;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("No cancer types configured")]
    NoRosters,
}

fn default_log_file() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_FILE)
}

/// Roster sheets carry a title row above the header row
fn default_roster_header_row() -> usize {
    1
}

fn default_ledger_extensions() -> Vec<String> {
    vec!["xlsx".to_string(), "csv".to_string()]
}

/// Reconciler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileConfig {
    /// Directory holding the batch folders and the acquisition ledger
    pub source_root: PathBuf,
    /// Directory receiving `{cancerType}/{patientID}/...`
    pub destination_root: PathBuf,
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
    /// Cancer type -> roster spreadsheet. Processed in key order.
    pub rosters: BTreeMap<String, PathBuf>,
    /// Zero-based row index of the roster header
    #[serde(default = "default_roster_header_row")]
    pub roster_header_row: usize,
    /// File extensions recognised as a ledger, without the dot
    #[serde(default = "default_ledger_extensions")]
    pub ledger_extensions: Vec<String>,
}

impl ReconcileConfig {
    pub fn new(source_root: PathBuf, destination_root: PathBuf) -> Self {
        Self {
            source_root,
            destination_root,
            log_file: default_log_file(),
            rosters: BTreeMap::new(),
            roster_header_row: default_roster_header_row(),
            ledger_extensions: default_ledger_extensions(),
        }
    }

    /// Register the roster of one cancer type
    pub fn with_roster(mut self, cancer_type: impl Into<String>, roster: impl Into<PathBuf>) -> Self {
        self.rosters.insert(cancer_type.into(), roster.into());
        self
    }
}

/// Read the configuration file
pub fn read_config(config_path: &Path) -> Result<ReconcileConfig, ConfigError> {
    let content = std::fs::read_to_string(config_path)?;
    let config: ReconcileConfig = serde_json::from_str(&content)?;

    if config.rosters.is_empty() {
        return Err(ConfigError::NoRosters);
    }

    Ok(config)
}
