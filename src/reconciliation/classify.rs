use super::folder_name::FolderNameKey;
use crate::ledger::ExamRecord;
use crate::probe::{probe_modality, HeaderReader, ProbeError};
use std::path::Path;

/// Destination folder name of an examination.
///
/// Without a probed modality (empty source folder) the modality segment is
/// left out: `{examDate}_{examName}`.
pub fn canonical_folder_name(exam_date: &str, modality: Option<&str>, exam_name: &str) -> String {
    match modality {
        Some(modality) => format!("{exam_date}_{modality}_{exam_name}"),
        None => format!("{exam_date}_{exam_name}"),
    }
}

/// Name the destination of a source exam folder.
///
/// The date comes from the source folder name, the exam name from the
/// ledger row and the modality from the folder's sample imaging file. The
/// probed modality is not compared with the ledger here.
pub fn classify(
    reader: &dyn HeaderReader,
    exam_folder: &Path,
    key: &FolderNameKey,
    exam: &ExamRecord,
) -> Result<String, ProbeError> {
    let modality = probe_modality(reader, exam_folder)?;
    Ok(canonical_folder_name(
        &key.exam_date,
        modality.as_deref(),
        &exam.exam_name,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::SampleHeader;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Reports the file's text content as its modality
    struct TextHeaderReader;

    impl HeaderReader for TextHeaderReader {
        fn read_header(&self, file: &Path) -> Result<SampleHeader, ProbeError> {
            let modality = std::fs::read_to_string(file).map_err(|e| ProbeError::HeaderError {
                path: file.display().to_string(),
                cause: e.to_string(),
            })?;
            Ok(SampleHeader {
                modality,
                study_instance_uid: String::new(),
            })
        }
    }

    fn exam(name: &str, modality: &str) -> ExamRecord {
        ExamRecord {
            exam_number: "5".to_string(),
            patient_id: "12345".to_string(),
            patient_name: "None".to_string(),
            exam_code: "None".to_string(),
            exam_name: name.to_string(),
            modality: modality.to_string(),
            machine_name: "None".to_string(),
            exam_date_time: "2023-01-01 10:00:00".to_string(),
            gender: "None".to_string(),
            conclusion: "None".to_string(),
            finding: "None".to_string(),
        }
    }

    fn exam_folder(temp: &TempDir, files: &[(&str, &str)]) -> PathBuf {
        let folder = temp.path().join("5_12345_20230101");
        std::fs::create_dir_all(&folder).unwrap();
        for (name, content) in files {
            std::fs::write(folder.join(name), content).unwrap();
        }
        folder
    }

    #[test]
    fn test_classify_uses_probed_modality() {
        let temp = TempDir::new().unwrap();
        let folder = exam_folder(&temp, &[("1.dcm", "MR")]);
        let key = FolderNameKey::parse("5_12345_20230101").unwrap();

        // The ledger says CT; the folder name follows the imaging header
        let name = classify(&TextHeaderReader, &folder, &key, &exam("CT_Chest", "CT")).unwrap();
        assert_eq!(name, "20230101_MR_CT_Chest");
    }

    #[test]
    fn test_classify_empty_folder_drops_modality() {
        let temp = TempDir::new().unwrap();
        let folder = exam_folder(&temp, &[]);
        let key = FolderNameKey::parse("5_12345_20230101").unwrap();

        let name = classify(&TextHeaderReader, &folder, &key, &exam("CT_Chest", "CT")).unwrap();
        assert_eq!(name, "20230101_CT_Chest");
    }

    #[test]
    fn test_classify_propagates_probe_error() {
        let temp = TempDir::new().unwrap();
        let key = FolderNameKey::parse("5_12345_20230101").unwrap();

        let result = classify(
            &TextHeaderReader,
            &temp.path().join("missing"),
            &key,
            &exam("CT_Chest", "CT"),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_canonical_folder_name() {
        assert_eq!(
            canonical_folder_name("20230101", Some("CT"), "Chest"),
            "20230101_CT_Chest"
        );
        assert_eq!(canonical_folder_name("20230101", None, "Chest"), "20230101_Chest");
    }
}
