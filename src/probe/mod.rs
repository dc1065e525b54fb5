//! Imaging header probe.
//!
//! The first entry of a directory in name order is the sample whose header
//! is read. Only an empty directory has no sample; an entry that is not a
//! readable imaging file is an error. Only the modality and the study
//! instance UID are ever looked at.

use dicom::dictionary_std::tags;
use dicom::object::{open_file, DefaultDicomObject};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Cannot list {path}: {source}")]
    ListError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot read imaging header of {path}: {cause}")]
    HeaderError { path: String, cause: String },
}

/// Identifying fields of one imaging file. Absent fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleHeader {
    pub modality: String,
    pub study_instance_uid: String,
}

/// Reads the identifying fields out of one imaging file
pub trait HeaderReader {
    fn read_header(&self, file: &Path) -> Result<SampleHeader, ProbeError>;
}

/// Header reader for DICOM Part 10 files
#[derive(Debug, Clone, Copy, Default)]
pub struct DicomHeaderReader;

impl DicomHeaderReader {
    pub fn new() -> Self {
        Self
    }

    fn string_element(obj: &DefaultDicomObject, tag: dicom::core::Tag) -> String {
        match obj.element(tag) {
            Ok(element) => element
                .to_str()
                .map(|value| {
                    value
                        .trim_end_matches(|c: char| c == ' ' || c == '\0')
                        .to_string()
                })
                .unwrap_or_default(),
            _ => {
                debug!("Tag {:?} not present", tag);
                String::new()
            }
        }
    }
}

impl HeaderReader for DicomHeaderReader {
    fn read_header(&self, file: &Path) -> Result<SampleHeader, ProbeError> {
        let obj = open_file(file).map_err(|e| ProbeError::HeaderError {
            path: file.display().to_string(),
            cause: e.to_string(),
        })?;

        Ok(SampleHeader {
            modality: Self::string_element(&obj, tags::MODALITY),
            study_instance_uid: Self::string_element(&obj, tags::STUDY_INSTANCE_UID),
        })
    }
}

/// Entries of a directory, sorted by name
pub fn list_entries(dir: &Path) -> Result<Vec<PathBuf>, ProbeError> {
    let list_error = |source: std::io::Error| ProbeError::ListError {
        path: dir.display().to_string(),
        source,
    };

    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(list_error)? {
        entries.push(entry.map_err(list_error)?.path());
    }

    entries.sort();
    Ok(entries)
}

/// Header of the directory's sample entry, `None` if the directory is empty
pub fn probe_sample(
    reader: &dyn HeaderReader,
    dir: &Path,
) -> Result<Option<SampleHeader>, ProbeError> {
    let Some(sample) = list_entries(dir)?.into_iter().next() else {
        return Ok(None);
    };

    if !sample.is_file() {
        return Err(ProbeError::HeaderError {
            path: sample.display().to_string(),
            cause: "not a regular file".to_string(),
        });
    }

    reader.read_header(&sample).map(Some)
}

/// Modality declared by the directory's sample entry, `None` if the directory is empty
pub fn probe_modality(reader: &dyn HeaderReader, dir: &Path) -> Result<Option<String>, ProbeError> {
    Ok(probe_sample(reader, dir)?.map(|header| header.modality))
}
