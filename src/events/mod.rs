//! Run events and the sinks that record them.
//!
//! The reconciler never writes the log file directly. It hands every notable
//! event to an [`EventSink`]; [`FileEventLog`] persists the subset meant for
//! the operator's log and [`MemoryEventSink`] keeps everything in memory.

use crate::utils::now_iso;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use tracing::error;

/// Something that happened during a run
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The source exam folder vanished before it could be copied
    SourceMissing {
        cancer_type: String,
        patient_id: String,
        folder: String,
    },
    /// Copying an exam folder failed part way
    CopyFailed {
        cancer_type: String,
        patient_id: String,
        folder: String,
        cause: String,
    },
    /// The sample header of a source exam folder could not be read
    ProbeFailed {
        cancer_type: String,
        folder: String,
        cause: String,
    },
    /// The destination folder of a ledger row holds no imaging files
    NoImagingFiles { patient_id: String, exam_name: String },
    /// Recording one examination failed; the row was skipped
    ExaminationFailed {
        patient_id: String,
        folder: String,
        cause: String,
    },
    /// The probed modality disagrees with the ledger
    ModalityMismatch {
        patient_id: String,
        exam_name: String,
        probed: String,
        recorded: String,
    },
    /// A structural failure ended one cancer type's pass
    CancerTypeAborted { cancer_type: String, cause: String },
    RunCompleted { elapsed_secs: f64 },
}

impl Event {
    /// Whether the event belongs in the persistent log.
    /// Modality disagreements are console warnings only.
    pub fn is_persisted(&self) -> bool {
        !matches!(self, Event::ModalityMismatch { .. })
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::SourceMissing {
                cancer_type,
                patient_id,
                folder,
            } => write!(
                f,
                "Cancer type '{cancer_type}', Patient ID: '{patient_id}', file '{folder}' not found."
            ),
            Event::CopyFailed {
                cancer_type,
                patient_id,
                folder,
                cause,
            } => write!(
                f,
                "Cancer type '{cancer_type}', Patient ID: '{patient_id}', file '{folder}' copy failed. Error: {cause}."
            ),
            Event::ProbeFailed {
                cancer_type,
                folder,
                cause,
            } => write!(
                f,
                "Cancer type '{cancer_type}', could not read imaging header in '{folder}'. Error: {cause}."
            ),
            Event::NoImagingFiles {
                patient_id,
                exam_name,
            } => write!(
                f,
                "No imaging files found for '{exam_name}' examination of patient '{patient_id}'."
            ),
            Event::ExaminationFailed {
                patient_id,
                folder,
                cause,
            } => write!(
                f,
                "Error occurred while recording '{folder}' of patient '{patient_id}'. Error: {cause}. \
                 Check whether the ledger row matches the copied folder name."
            ),
            Event::ModalityMismatch {
                patient_id,
                exam_name,
                probed,
                recorded,
            } => write!(
                f,
                "Modality from imaging header '{probed}' does not match ledger modality '{recorded}' \
                 for '{exam_name}' examination of patient '{patient_id}'."
            ),
            Event::CancerTypeAborted { cancer_type, cause } => {
                write!(f, "Cancer type '{cancer_type}' aborted: {cause}")
            }
            Event::RunCompleted { elapsed_secs } => {
                write!(f, "Entire execution time: {elapsed_secs:.3} seconds")
            }
        }
    }
}

/// Receiver of run events
pub trait EventSink {
    fn record(&self, event: &Event);
}

/// Append-only text log, recreated when opened
pub struct FileEventLog {
    file: File,
}

impl FileEventLog {
    /// Truncate (or create) the log and write its header
    pub fn create(path: &Path) -> Result<Self, std::io::Error> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        file.write_all(b"Log File\n\n")?;

        Ok(Self { file })
    }
}

impl EventSink for FileEventLog {
    fn record(&self, event: &Event) {
        if !event.is_persisted() {
            return;
        }

        let line = format!("{} {}\n", now_iso(), event);
        if let Err(e) = (&self.file).write_all(line.as_bytes()) {
            error!("Failed to append to log file: {}", e);
        }
    }
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct MemoryEventSink {
    events: Mutex<Vec<Event>>,
}

impl MemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far
    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl EventSink for MemoryEventSink {
    fn record(&self, event: &Event) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_log_skips_console_only_events() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("logs").join("run.log");

        let log = FileEventLog::create(&path).unwrap();
        log.record(&Event::SourceMissing {
            cancer_type: "lung".to_string(),
            patient_id: "12345".to_string(),
            folder: "20230101_CT_Chest".to_string(),
        });
        log.record(&Event::ModalityMismatch {
            patient_id: "12345".to_string(),
            exam_name: "Chest".to_string(),
            probed: "MR".to_string(),
            recorded: "CT".to_string(),
        });

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("Log File\n\n"));
        assert_eq!(content.lines().count(), 3);
        assert!(content.contains("file '20230101_CT_Chest' not found."));
        assert!(!content.contains("does not match"));
    }

    #[test]
    fn test_file_log_truncates_previous_run() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("run.log");

        let log = FileEventLog::create(&path).unwrap();
        log.record(&Event::RunCompleted { elapsed_secs: 1.5 });
        drop(log);

        FileEventLog::create(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Log File\n\n");
    }

    #[test]
    fn test_memory_sink_keeps_order() {
        let sink = MemoryEventSink::new();
        sink.record(&Event::RunCompleted { elapsed_secs: 0.0 });
        sink.record(&Event::CancerTypeAborted {
            cancer_type: "meta".to_string(),
            cause: "boom".to_string(),
        });

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], Event::CancerTypeAborted { .. }));
    }
}
