use super::types::PatientRecord;
use super::RecordError;
use crate::utils::{same_identifier, RECORD_EXTENSION};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs;
use std::path::PathBuf;

/// Patient records of one cancer type.
///
/// Each record lives next to the patient's examination folders:
/// `{root}/{patientID}/{patientID}.json`.
#[derive(Debug, Clone)]
pub struct RecordStore {
    root: PathBuf,
}

impl RecordStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding a patient's examination folders and record
    pub fn patient_dir(&self, patient_id: &str) -> PathBuf {
        self.root.join(patient_id)
    }

    pub fn record_path(&self, patient_id: &str) -> PathBuf {
        self.patient_dir(patient_id)
            .join(format!("{patient_id}.{RECORD_EXTENSION}"))
    }

    /// Read a patient's record, or an empty one if none was saved yet
    pub fn load(&self, patient_id: &str) -> Result<PatientRecord, RecordError> {
        let path = self.record_path(patient_id);

        if !path.exists() {
            return Ok(PatientRecord::new(patient_id));
        }

        let content = fs::read_to_string(&path)?;
        let record: PatientRecord = serde_json::from_str(&content)?;

        if !same_identifier(&record.patient_id, patient_id) {
            return Err(RecordError::PatientMismatch {
                path: path.display().to_string(),
                expected: patient_id.to_string(),
                found: record.patient_id,
            });
        }

        Ok(record)
    }

    /// Overwrite a patient's record in full.
    ///
    /// The file location follows `patient_id`, the key the record was loaded
    /// under, not the identifier spelling stored inside it.
    pub fn save(&self, patient_id: &str, record: &PatientRecord) -> Result<(), RecordError> {
        let path = self.record_path(patient_id);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write atomically using temp file + rename
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, to_pretty_json(record)?)?;
        fs::rename(&temp_path, &path)?;

        Ok(())
    }
}

/// Four-space indented JSON; non-ASCII text is written as-is
fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut buffer = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer)?;
    Ok(buffer)
}
