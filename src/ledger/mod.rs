//! Batch acquisition ledger.
//!
//! The ledger spreadsheet uses Korean headers; they are mapped onto
//! [`ExamRecord`] fields here. Columns outside the mapping (검사나이, 나이,
//! 검날날짜 and anything else) are ignored.

mod types;

pub use types::ExamRecord;

use crate::tabular::{extension_of, read_table, Table, TabularError};
use crate::utils::{identifier_key, MISSING_VALUE};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const EXAM_NUMBER_HEADER: &str = "검사번호";
pub const PATIENT_ID_HEADER: &str = "환자번호";
pub const PATIENT_NAME_HEADER: &str = "환자명";
pub const EXAM_CODE_HEADER: &str = "검사코드";
pub const EXAM_NAME_HEADER: &str = "검사명";
pub const MODALITY_HEADER: &str = "Modality";
pub const MACHINE_NAME_HEADER: &str = "Machine Name";
pub const EXAM_DATE_TIME_HEADER: &str = "검사일자시간";
pub const GENDER_HEADER: &str = "성별";
pub const CONCLUSION_HEADER: &str = "CONCLUSION";
pub const FINDING_HEADER: &str = "FINDING";

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Tabular error: {0}")]
    TabularError(#[from] TabularError),

    #[error("No ledger file found in {0}")]
    NotFound(String),

    #[error("Ledger {path} has no '{header}' column")]
    MissingColumn { path: String, header: String },
}

/// Ledger rows in file order, indexed by patient and exam number
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    records: Vec<ExamRecord>,
    by_patient: HashMap<String, Vec<usize>>,
    by_exam_number: HashMap<String, Vec<usize>>,
}

impl Ledger {
    pub fn new(records: Vec<ExamRecord>) -> Self {
        let mut by_patient: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_exam_number: HashMap<String, Vec<usize>> = HashMap::new();

        for (index, record) in records.iter().enumerate() {
            by_patient
                .entry(identifier_key(&record.patient_id))
                .or_default()
                .push(index);
            by_exam_number
                .entry(identifier_key(&record.exam_number))
                .or_default()
                .push(index);
        }

        Self {
            records,
            by_patient,
            by_exam_number,
        }
    }

    pub fn records(&self) -> &[ExamRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows of one patient, in ledger order
    pub fn rows_for_patient<'a>(
        &'a self,
        patient_id: &str,
    ) -> impl Iterator<Item = &'a ExamRecord> + 'a {
        self.by_patient
            .get(&identifier_key(patient_id))
            .into_iter()
            .flatten()
            .map(move |&index| &self.records[index])
    }

    /// The row for an exam number.
    ///
    /// Returns `None` when the number is absent, or when it appears on
    /// several rows that disagree on the exam name.
    pub fn find_exam(&self, exam_number: &str) -> Option<&ExamRecord> {
        let indices = self.by_exam_number.get(&identifier_key(exam_number))?;
        let first = &self.records[*indices.first()?];

        indices
            .iter()
            .all(|&index| self.records[index].exam_name == first.exam_name)
            .then_some(first)
    }
}

/// Pick the ledger of a source directory: the first file, in name order,
/// whose extension is recognised.
pub fn find_ledger_file(source_dir: &Path, extensions: &[String]) -> Result<PathBuf, LedgerError> {
    let mut candidates: Vec<PathBuf> = std::fs::read_dir(source_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            extension_of(path)
                .map(|ext| extensions.iter().any(|known| known.eq_ignore_ascii_case(&ext)))
                .unwrap_or(false)
        })
        .collect();

    candidates.sort();
    candidates
        .into_iter()
        .next()
        .ok_or_else(|| LedgerError::NotFound(source_dir.display().to_string()))
}

/// Load a ledger whose header is on the first row
pub fn load_ledger(path: &Path) -> Result<Ledger, LedgerError> {
    let table = read_table(path, 0)?;
    let records = records_from_table(&table, &path.display().to_string())?;
    Ok(Ledger::new(records))
}

fn records_from_table(table: &Table, source: &str) -> Result<Vec<ExamRecord>, LedgerError> {
    let required = |header: &str| {
        table.column(header).ok_or_else(|| LedgerError::MissingColumn {
            path: source.to_string(),
            header: header.to_string(),
        })
    };
    let exam_number = required(EXAM_NUMBER_HEADER)?;
    let patient_id = required(PATIENT_ID_HEADER)?;

    let patient_name = table.column(PATIENT_NAME_HEADER);
    let exam_code = table.column(EXAM_CODE_HEADER);
    let exam_name = table.column(EXAM_NAME_HEADER);
    let modality = table.column(MODALITY_HEADER);
    let machine_name = table.column(MACHINE_NAME_HEADER);
    let exam_date_time = table.column(EXAM_DATE_TIME_HEADER);
    let gender = table.column(GENDER_HEADER);
    let conclusion = table.column(CONCLUSION_HEADER);
    let finding = table.column(FINDING_HEADER);

    let records = (0..table.len())
        .map(|row| {
            let text = |column: Option<usize>| {
                column
                    .and_then(|c| table.cell(row, c))
                    .unwrap_or(MISSING_VALUE)
                    .to_string()
            };

            ExamRecord {
                exam_number: text(Some(exam_number)),
                patient_id: text(Some(patient_id)),
                patient_name: text(patient_name),
                exam_code: text(exam_code),
                exam_name: text(exam_name),
                modality: text(modality),
                machine_name: text(machine_name),
                exam_date_time: text(exam_date_time),
                gender: text(gender),
                conclusion: text(conclusion),
                finding: text(finding),
            }
        })
        .collect();

    Ok(records)
}
