use crate::utils::numeric_id;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Malformed exam folder name '{0}', expected '{{examNumber}}_{{patientID}}_{{examDate}}'")]
pub struct FolderNameError(pub String);

/// Parsed source exam folder name: `{examNumber}_{patientID}_{examDate}`.
///
/// Segments after the third are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderNameKey {
    pub exam_number: String,
    pub patient_id: String,
    pub exam_date: String,
    /// `patient_id` as used for roster membership
    pub patient_number: u64,
}

impl FolderNameKey {
    pub fn parse(name: &str) -> Result<Self, FolderNameError> {
        let malformed = || FolderNameError(name.to_string());

        let mut parts = name.split('_');
        let exam_number = parts.next().filter(|p| !p.is_empty()).ok_or_else(malformed)?;
        let patient_id = parts.next().ok_or_else(malformed)?;
        let exam_date = parts.next().ok_or_else(malformed)?;
        let patient_number = numeric_id(patient_id).ok_or_else(malformed)?;

        Ok(Self {
            exam_number: exam_number.to_string(),
            patient_id: patient_id.to_string(),
            exam_date: exam_date.to_string(),
            patient_number,
        })
    }
}

impl FromStr for FolderNameKey {
    type Err = FolderNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FolderNameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.exam_number, self.patient_id, self.exam_date)
    }
}
