//! Merging ledger rows into a patient's persisted record.
//!
//! Every touch re-derives the patient's examinations from the whole ledger.
//! Rows whose identity key (ExamDateTime, Modality, ExamName) is already in
//! the record are skipped, so repeated merges never duplicate history.

use crate::events::{Event, EventSink};
use crate::ledger::{ExamRecord, Ledger};
use crate::probe::{probe_sample, HeaderReader, ProbeError};
use crate::record::{ExamKey, ExaminationEntry, RecordError, RecordStore};
use std::path::Path;
use tracing::{info, warn};

/// Result of merging one patient
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The record was rewritten
    Updated {
        appended: usize,
        already_recorded: usize,
        skipped: usize,
    },
    /// The ledger has no row for the patient; nothing was written
    NoLedgerRows,
}

/// What became of a single ledger row
enum RowOutcome {
    Appended(ExaminationEntry),
    NoImagingFiles,
}

pub struct MergeEngine<'a> {
    reader: &'a dyn HeaderReader,
    sink: &'a dyn EventSink,
}

impl<'a> MergeEngine<'a> {
    pub fn new(reader: &'a dyn HeaderReader, sink: &'a dyn EventSink) -> Self {
        Self { reader, sink }
    }

    /// Append the patient's unrecorded ledger examinations to their record.
    ///
    /// Rows are processed in ledger order. A row whose destination folder is
    /// empty or unreadable is reported and skipped without affecting the
    /// others. Name and sex are overwritten from the patient's first row.
    pub fn merge(
        &self,
        store: &RecordStore,
        patient_id: &str,
        ledger: &Ledger,
    ) -> Result<MergeOutcome, RecordError> {
        let mut record = store.load(patient_id)?;

        let rows: Vec<&ExamRecord> = ledger.rows_for_patient(patient_id).collect();
        let first = match rows.first() {
            Some(first) => *first,
            None => {
                info!(
                    "No examination data found for patient {}. Record will not be updated.",
                    patient_id
                );
                return Ok(MergeOutcome::NoLedgerRows);
            }
        };

        let patient_dir = store.patient_dir(patient_id);
        let mut appended = 0;
        let mut already_recorded = 0;
        let mut skipped = 0;

        for row in rows {
            if record.contains(&ExamKey::from(row)) {
                info!(
                    "Skipping recorded examination of patient '{}', date is {}",
                    patient_id, row.exam_date_time
                );
                already_recorded += 1;
                continue;
            }

            // The folder sits next to the record, so its relative path is its name
            let folder_name = row.expected_folder_name();
            let folder = patient_dir.join(&folder_name);

            match self.examine(patient_id, row, &folder, folder_name.clone()) {
                Ok(RowOutcome::Appended(entry)) => {
                    info!(
                        "Recorded examination of patient '{}', date is {}",
                        patient_id, row.exam_date_time
                    );
                    record.examinations.push(entry);
                    appended += 1;
                }
                Ok(RowOutcome::NoImagingFiles) => {
                    warn!(
                        "No imaging files found for '{}' examination of patient '{}'.",
                        row.exam_name, patient_id
                    );
                    self.sink.record(&Event::NoImagingFiles {
                        patient_id: patient_id.to_string(),
                        exam_name: row.exam_name.clone(),
                    });
                    skipped += 1;
                }
                Err(e) => {
                    warn!(
                        "Error occurred while recording '{}' of patient '{}': {}",
                        folder_name, patient_id, e
                    );
                    self.sink.record(&Event::ExaminationFailed {
                        patient_id: patient_id.to_string(),
                        folder: folder_name,
                        cause: e.to_string(),
                    });
                    skipped += 1;
                }
            }
        }

        record.patient_name = first.patient_name.clone();
        record.sex = first.gender.clone();
        store.save(patient_id, &record)?;

        Ok(MergeOutcome::Updated {
            appended,
            already_recorded,
            skipped,
        })
    }

    fn examine(
        &self,
        patient_id: &str,
        row: &ExamRecord,
        folder: &Path,
        location: String,
    ) -> Result<RowOutcome, ProbeError> {
        let sample = match probe_sample(self.reader, folder)? {
            Some(sample) => sample,
            None => return Ok(RowOutcome::NoImagingFiles),
        };

        let mut study_instance_uid = sample.study_instance_uid;
        if sample.modality != row.modality {
            warn!(
                "Modality from imaging header '{}' does not match ledger modality '{}' for '{}' examination of patient '{}'.",
                sample.modality, row.modality, row.exam_name, patient_id
            );
            self.sink.record(&Event::ModalityMismatch {
                patient_id: patient_id.to_string(),
                exam_name: row.exam_name.clone(),
                probed: sample.modality,
                recorded: row.modality.clone(),
            });
            study_instance_uid.clear();
        }

        Ok(RowOutcome::Appended(ExaminationEntry::from_exam(
            row,
            location,
            study_instance_uid,
        )))
    }
}
