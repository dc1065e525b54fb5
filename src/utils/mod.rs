use std::path::{Path, PathBuf};

/// Default name of the persistent event log
pub const DEFAULT_LOG_FILE: &str = "log.log";

/// Extension of per-patient record documents
pub const RECORD_EXTENSION: &str = "json";

/// Placeholder stored for ledger cells that carry no value
pub const MISSING_VALUE: &str = "None";

/// Get the directory holding one cancer type's patients
pub fn get_cancer_type_path(destination_root: &Path, cancer_type: &str) -> PathBuf {
    destination_root.join(cancer_type)
}

/// Get current timestamp in ISO 8601 format
pub fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Parse an identifier as an unsigned integer, ignoring surrounding whitespace
pub fn numeric_id(value: &str) -> Option<u64> {
    let trimmed = value.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    trimmed.parse().ok()
}

/// Canonical form used to index identifiers: the integer when numeric,
/// otherwise the trimmed text.
pub fn identifier_key(value: &str) -> String {
    match numeric_id(value) {
        Some(n) => n.to_string(),
        None => value.trim().to_string(),
    }
}

/// Compare two identifiers numerically when both are integers
pub fn same_identifier(a: &str, b: &str) -> bool {
    identifier_key(a) == identifier_key(b)
}

/// Date part of a ledger timestamp as used in folder names.
///
/// Takes the first ten characters and drops punctuation, so
/// `2023-01-01 10:00:00` becomes `20230101`.
pub fn folder_date(exam_date_time: &str) -> String {
    exam_date_time
        .chars()
        .take(10)
        .filter(|c| c.is_alphanumeric())
        .collect()
}
