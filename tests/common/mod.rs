#![allow(dead_code)]

use chrono::{Datelike, Timelike};
use dicom::core::{DataElement, PrimitiveValue, VR};
use dicom::dictionary_std::{tags, uids};
use dicom::object::{FileMetaTableBuilder, InMemDicomObject};
use imaging_reconciler::ReconcileConfig;
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const LEDGER_HEADER: &str = "검사번호,환자번호,환자명,검사코드,검사명,Modality,Machine Name,검사일자시간,성별,검사나이,나이,검날날짜,CONCLUSION,FINDING";

/// Create a temporary directory for testing
pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// One ledger row, written with the Korean headers
#[derive(Debug, Clone)]
pub struct LedgerRow {
    pub exam_number: &'static str,
    pub patient_id: &'static str,
    pub patient_name: &'static str,
    pub exam_name: &'static str,
    pub modality: &'static str,
    pub exam_date_time: &'static str,
    pub gender: &'static str,
}

impl LedgerRow {
    pub fn new(
        exam_number: &'static str,
        patient_id: &'static str,
        exam_name: &'static str,
        modality: &'static str,
        exam_date_time: &'static str,
    ) -> Self {
        Self {
            exam_number,
            patient_id,
            patient_name: "홍길동",
            exam_name,
            modality,
            exam_date_time,
            gender: "M",
        }
    }

    fn to_csv(&self) -> String {
        format!(
            "{},{},{},RC{},{},{},SOMATOM,{},{},61,61,,Stable,",
            self.exam_number,
            self.patient_id,
            self.patient_name,
            self.exam_number,
            self.exam_name,
            self.modality,
            self.exam_date_time,
            self.gender
        )
    }
}

pub fn write_ledger(path: &Path, rows: &[LedgerRow]) {
    let mut content = String::from(LEDGER_HEADER);
    for row in rows {
        content.push('\n');
        content.push_str(&row.to_csv());
    }
    fs::write(path, content).expect("Failed to write ledger");
}

/// Roster with a title row above the `ID` header
pub fn write_roster(path: &Path, ids: &[u64]) {
    let mut content = String::from("clinical include list,\nNo,ID\n");
    for (index, id) in ids.iter().enumerate() {
        content.push_str(&format!("{},{}\n", index + 1, id));
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create roster dir");
    }
    fs::write(path, content).expect("Failed to write roster");
}

/// Roster workbook: title on row 0, `No`/`ID` headers on row 1, numeric IDs
pub fn write_roster_workbook(path: &Path, ids: &[u64]) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "clinical include list").unwrap();
    sheet.write_string(1, 0, "No").unwrap();
    sheet.write_string(1, 1, "ID").unwrap();
    for (index, id) in ids.iter().enumerate() {
        let row = index as u32 + 2;
        sheet.write_number(row, 0, (index + 1) as f64).unwrap();
        sheet.write_number(row, 1, *id as f64).unwrap();
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create roster dir");
    }
    workbook.save(path).expect("Failed to write roster workbook");
}

/// Ledger workbook with numeric exam numbers and patient IDs and real
/// timestamp cells
pub fn write_ledger_workbook(path: &Path, rows: &[LedgerRow]) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (column, header) in LEDGER_HEADER.split(',').enumerate() {
        sheet.write_string(0, column as u16, header).unwrap();
    }

    let timestamp = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");
    for (index, row) in rows.iter().enumerate() {
        let line = index as u32 + 1;
        let exam_number: f64 = row.exam_number.parse().expect("numeric exam number");
        let patient_id: f64 = row.patient_id.parse().expect("numeric patient id");
        sheet.write_number(line, 0, exam_number).unwrap();
        sheet.write_number(line, 1, patient_id).unwrap();
        sheet.write_string(line, 2, row.patient_name).unwrap();
        sheet
            .write_string(line, 3, &format!("RC{}", row.exam_number))
            .unwrap();
        sheet.write_string(line, 4, row.exam_name).unwrap();
        sheet.write_string(line, 5, row.modality).unwrap();
        sheet.write_string(line, 6, "SOMATOM").unwrap();
        sheet
            .write_datetime_with_format(line, 7, &excel_timestamp(row.exam_date_time), &timestamp)
            .unwrap();
        sheet.write_string(line, 8, row.gender).unwrap();
        sheet.write_string(line, 12, "Stable").unwrap();
    }
    workbook.save(path).expect("Failed to write ledger workbook");
}

fn excel_timestamp(text: &str) -> ExcelDateTime {
    let parsed = chrono::NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
        .expect("ledger timestamp");
    ExcelDateTime::from_ymd(parsed.year() as u16, parsed.month() as u8, parsed.day() as u8)
        .unwrap()
        .and_hms(parsed.hour() as u16, parsed.minute() as u8, parsed.second())
        .unwrap()
}

/// Write a minimal DICOM file carrying a modality and study instance UID
pub fn write_dicom(path: &Path, modality: &str, study_uid: &str) {
    let obj = InMemDicomObject::from_element_iter([
        DataElement::new(
            tags::SOP_CLASS_UID,
            VR::UI,
            PrimitiveValue::from(uids::CT_IMAGE_STORAGE),
        ),
        DataElement::new(tags::SOP_INSTANCE_UID, VR::UI, PrimitiveValue::from("1.2.3.4.5")),
        DataElement::new(tags::STUDY_INSTANCE_UID, VR::UI, PrimitiveValue::from(study_uid)),
        DataElement::new(tags::MODALITY, VR::CS, PrimitiveValue::from(modality)),
    ]);

    let file = obj
        .with_meta(
            FileMetaTableBuilder::new()
                .transfer_syntax(uids::EXPLICIT_VR_LITTLE_ENDIAN)
                .media_storage_sop_class_uid(uids::CT_IMAGE_STORAGE)
                .media_storage_sop_instance_uid("1.2.3.4.5"),
        )
        .expect("Failed to build file meta");
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create dicom dir");
    }
    file.write_to_file(path).expect("Failed to write dicom");
}

/// Create a folder holding one DICOM file per (modality, uid) pair
pub fn write_exam_folder(folder: &Path, images: &[(&str, &str)]) {
    fs::create_dir_all(folder).expect("Failed to create exam folder");
    for (index, (modality, uid)) in images.iter().enumerate() {
        write_dicom(&folder.join(format!("IM{:04}.dcm", index)), modality, uid);
    }
}

/// Source tree, destination root and clinical rosters under one temp dir
pub struct Workspace {
    pub temp: TempDir,
    pub source_root: PathBuf,
    pub destination_root: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let temp = create_test_dir();
        let source_root = temp.path().join("raw");
        let destination_root = temp.path().join("result");
        fs::create_dir_all(&source_root).expect("Failed to create source root");
        Self {
            temp,
            source_root,
            destination_root,
        }
    }

    pub fn roster_path(&self, cancer_type: &str) -> PathBuf {
        self.temp
            .path()
            .join("clinical")
            .join(format!("{cancer_type}.csv"))
    }

    pub fn add_roster(&self, cancer_type: &str, ids: &[u64]) {
        write_roster(&self.roster_path(cancer_type), ids);
    }

    pub fn write_ledger(&self, rows: &[LedgerRow]) {
        write_ledger(&self.source_root.join("ledger.csv"), rows);
    }

    pub fn exam_folder(&self, batch: &str, name: &str) -> PathBuf {
        self.source_root.join(batch).join(name)
    }

    pub fn add_exam(&self, batch: &str, name: &str, images: &[(&str, &str)]) -> PathBuf {
        let folder = self.exam_folder(batch, name);
        write_exam_folder(&folder, images);
        folder
    }

    pub fn config(&self, cancer_types: &[&str]) -> ReconcileConfig {
        cancer_types.iter().fold(
            ReconcileConfig::new(self.source_root.clone(), self.destination_root.clone()),
            |config, cancer_type| config.with_roster(*cancer_type, self.roster_path(cancer_type)),
        )
    }

    pub fn patient_dir(&self, cancer_type: &str, patient_id: &str) -> PathBuf {
        self.destination_root.join(cancer_type).join(patient_id)
    }

    pub fn record_path(&self, cancer_type: &str, patient_id: &str) -> PathBuf {
        self.patient_dir(cancer_type, patient_id)
            .join(format!("{patient_id}.json"))
    }
}
