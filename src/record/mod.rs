mod storage;
mod types;

pub use storage::RecordStore;
pub use types::{ExamKey, ExaminationEntry, PatientRecord};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Record {path} belongs to patient '{found}', expected '{expected}'")]
    PatientMismatch {
        path: String,
        expected: String,
        found: String,
    },
}
