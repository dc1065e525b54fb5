use crate::utils::folder_date;

/// One row of the acquisition ledger.
///
/// Absent cells hold the literal `"None"`, never an empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamRecord {
    pub exam_number: String,
    pub patient_id: String,
    pub patient_name: String,
    pub exam_code: String,
    pub exam_name: String,
    pub modality: String,
    pub machine_name: String,
    /// Acquisition timestamp; only its date prefix is significant for naming
    pub exam_date_time: String,
    pub gender: String,
    pub conclusion: String,
    pub finding: String,
}

impl ExamRecord {
    /// Folder name the examination is expected under at the destination
    pub fn expected_folder_name(&self) -> String {
        format!(
            "{}_{}_{}",
            folder_date(&self.exam_date_time),
            self.modality,
            self.exam_name
        )
    }
}
