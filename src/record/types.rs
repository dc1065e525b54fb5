use crate::ledger::ExamRecord;
use serde::{Deserialize, Serialize};

/// Persisted examination history of one patient, stored as `{PatientID}.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PatientRecord {
    #[serde(rename = "PatientID")]
    pub patient_id: String,
    pub patient_name: String,
    pub sex: String,
    /// Append-only, in discovery order
    pub examinations: Vec<ExaminationEntry>,
}

impl PatientRecord {
    /// Template for a patient seen for the first time
    pub fn new(patient_id: impl Into<String>) -> Self {
        Self {
            patient_id: patient_id.into(),
            patient_name: String::new(),
            sex: String::new(),
            examinations: Vec::new(),
        }
    }

    /// Whether an examination with this identity key is already recorded
    pub fn contains(&self, key: &ExamKey<'_>) -> bool {
        self.examinations.iter().any(|exam| exam.key() == *key)
    }
}

/// Identity of an examination within a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExamKey<'a> {
    pub exam_date_time: &'a str,
    pub modality: &'a str,
    pub exam_name: &'a str,
}

impl<'a> From<&'a ExamRecord> for ExamKey<'a> {
    fn from(record: &'a ExamRecord) -> Self {
        Self {
            exam_date_time: &record.exam_date_time,
            modality: &record.modality,
            exam_name: &record.exam_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExaminationEntry {
    pub exam_date_time: String,
    pub modality: String,
    pub exam_name: String,
    pub exam_code: String,
    pub machine_name: String,
    pub conclusion: String,
    pub finding: String,
    /// Examination folder relative to the record's directory
    pub location: String,
    /// Empty when absent or when the probed modality disagreed with the ledger
    #[serde(rename = "StudyInstanceUID", default)]
    pub study_instance_uid: String,
}

impl ExaminationEntry {
    pub fn from_exam(record: &ExamRecord, location: String, study_instance_uid: String) -> Self {
        Self {
            exam_date_time: record.exam_date_time.clone(),
            modality: record.modality.clone(),
            exam_name: record.exam_name.clone(),
            exam_code: record.exam_code.clone(),
            machine_name: record.machine_name.clone(),
            conclusion: record.conclusion.clone(),
            finding: record.finding.clone(),
            location,
            study_instance_uid,
        }
    }

    pub fn key(&self) -> ExamKey<'_> {
        ExamKey {
            exam_date_time: &self.exam_date_time,
            modality: &self.modality,
            exam_name: &self.exam_name,
        }
    }
}
