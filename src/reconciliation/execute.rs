use super::classify::classify;
use super::copy::{CopyError, TreeCopier};
use super::folder_name::{FolderNameError, FolderNameKey};
use super::merge::{MergeEngine, MergeOutcome};
use crate::config::ReconcileConfig;
use crate::events::{Event, EventSink};
use crate::ledger::{find_ledger_file, load_ledger, Ledger, LedgerError};
use crate::probe::HeaderReader;
use crate::record::{RecordError, RecordStore};
use crate::roster::{load_roster, Roster, RosterError};
use crate::utils::get_cancer_type_path;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{error, info, warn};

/// Failures that end a cancer type's pass
#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Roster error: {0}")]
    RosterError(#[from] RosterError),

    #[error("Ledger error: {0}")]
    LedgerError(#[from] LedgerError),

    #[error("Record error: {0}")]
    RecordError(#[from] RecordError),

    #[error("{0}")]
    MalformedFolderName(#[from] FolderNameError),

    #[error("Exam number '{exam_number}' of folder '{folder}' has no unique ledger row")]
    UnknownExamNumber { exam_number: String, folder: String },
}

/// Counters for one cancer type's pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CancerTypeSummary {
    pub copied: usize,
    pub already_present: usize,
    pub source_missing: usize,
    pub copy_failed: usize,
    pub probe_failed: usize,
    pub not_in_roster: usize,
    pub records_updated: usize,
    pub records_untouched: usize,
}

/// Outcome of a whole run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub completed: BTreeMap<String, CancerTypeSummary>,
    /// Cancer type -> error that ended its pass
    pub aborted: BTreeMap<String, String>,
    pub elapsed: Duration,
}

/// Walks the source tree and maintains the destination tree and records
pub struct Reconciler<'a> {
    reader: &'a dyn HeaderReader,
    copier: &'a dyn TreeCopier,
    sink: &'a dyn EventSink,
}

/// Inputs of one cancer type's pass
struct Pass<'p> {
    cancer_type: &'p str,
    roster: &'p Roster,
    ledger: &'p Ledger,
    store: &'p RecordStore,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        reader: &'a dyn HeaderReader,
        copier: &'a dyn TreeCopier,
        sink: &'a dyn EventSink,
    ) -> Self {
        Self {
            reader,
            copier,
            sink,
        }
    }

    /// Run every configured cancer type.
    ///
    /// A failed cancer type is recorded and the run moves on to the next.
    pub fn reconcile_all(&self, config: &ReconcileConfig) -> RunSummary {
        let start = Instant::now();
        let mut summary = RunSummary::default();

        for (cancer_type, roster_path) in &config.rosters {
            info!("Processing cancer type '{}'", cancer_type);

            match self.reconcile_cancer_type(cancer_type, roster_path, config) {
                Ok(counts) => {
                    info!(
                        cancer_type = %cancer_type,
                        copied = counts.copied,
                        already_present = counts.already_present,
                        records_updated = counts.records_updated,
                        "Cancer type complete"
                    );
                    summary.completed.insert(cancer_type.clone(), counts);
                }
                Err(e) => {
                    error!("Cancer type '{}' aborted: {}", cancer_type, e);
                    self.sink.record(&Event::CancerTypeAborted {
                        cancer_type: cancer_type.clone(),
                        cause: e.to_string(),
                    });
                    summary.aborted.insert(cancer_type.clone(), e.to_string());
                }
            }
        }

        summary.elapsed = start.elapsed();
        info!("Entire execution time: {:?}", summary.elapsed);
        self.sink.record(&Event::RunCompleted {
            elapsed_secs: summary.elapsed.as_secs_f64(),
        });

        summary
    }

    /// One cancer type: load its roster and the batch ledger, then walk
    /// `{sourceRoot}/{batch}/{exam}` folders.
    pub fn reconcile_cancer_type(
        &self,
        cancer_type: &str,
        roster_path: &Path,
        config: &ReconcileConfig,
    ) -> Result<CancerTypeSummary, ReconcileError> {
        let roster = load_roster(roster_path, config.roster_header_row)?;
        let ledger_path = find_ledger_file(&config.source_root, &config.ledger_extensions)?;
        let ledger = load_ledger(&ledger_path)?;
        info!(
            "Loaded {} roster patients and {} ledger rows from {}",
            roster.len(),
            ledger.len(),
            ledger_path.display()
        );

        let store = RecordStore::new(get_cancer_type_path(&config.destination_root, cancer_type));
        let pass = Pass {
            cancer_type,
            roster: &roster,
            ledger: &ledger,
            store: &store,
        };

        let mut summary = CancerTypeSummary::default();
        for (_, batch_path) in sorted_subdirs(&config.source_root)? {
            for (folder_name, exam_path) in sorted_subdirs(&batch_path)? {
                self.reconcile_folder(&pass, &folder_name, &exam_path, &mut summary)?;
            }
        }

        Ok(summary)
    }

    fn reconcile_folder(
        &self,
        pass: &Pass<'_>,
        folder_name: &str,
        exam_path: &Path,
        summary: &mut CancerTypeSummary,
    ) -> Result<(), ReconcileError> {
        let key = FolderNameKey::parse(folder_name)?;
        let exam = pass
            .ledger
            .find_exam(&key.exam_number)
            .ok_or_else(|| ReconcileError::UnknownExamNumber {
                exam_number: key.exam_number.clone(),
                folder: folder_name.to_string(),
            })?;

        if !pass.roster.contains(key.patient_number) {
            summary.not_in_roster += 1;
            return Ok(());
        }

        let canonical = match classify(self.reader, exam_path, &key, exam) {
            Ok(name) => name,
            Err(e) => {
                warn!("Skipping '{}': {}", folder_name, e);
                self.sink.record(&Event::ProbeFailed {
                    cancer_type: pass.cancer_type.to_string(),
                    folder: folder_name.to_string(),
                    cause: e.to_string(),
                });
                summary.probe_failed += 1;
                return Ok(());
            }
        };

        let destination = pass.store.patient_dir(&key.patient_id).join(&canonical);
        let start = Instant::now();

        match self.copier.copy_tree(exam_path, &destination) {
            Ok(()) => {
                info!(">>> Execution time of file '{}': {:?}", canonical, start.elapsed());
                info!(
                    "Cancer type '{}', Patient ID: '{}', file '{}' copied successfully.",
                    pass.cancer_type, key.patient_id, canonical
                );
                summary.copied += 1;
            }
            Err(CopyError::DestinationExists(_)) => {
                info!(
                    "Cancer type '{}', Patient ID: '{}', file '{}' already exists. Skipping...",
                    pass.cancer_type, key.patient_id, canonical
                );
                summary.already_present += 1;
            }
            Err(CopyError::SourceMissing(_)) => {
                error!(
                    "Cancer type '{}', Patient ID: '{}', file '{}' not found.",
                    pass.cancer_type, key.patient_id, canonical
                );
                self.sink.record(&Event::SourceMissing {
                    cancer_type: pass.cancer_type.to_string(),
                    patient_id: key.patient_id.clone(),
                    folder: canonical,
                });
                summary.source_missing += 1;
                return Ok(());
            }
            Err(e) => {
                error!(
                    "Cancer type '{}', Patient ID: '{}', file '{}' copy failed: {}",
                    pass.cancer_type, key.patient_id, canonical, e
                );
                self.sink.record(&Event::CopyFailed {
                    cancer_type: pass.cancer_type.to_string(),
                    patient_id: key.patient_id.clone(),
                    folder: canonical,
                    cause: e.to_string(),
                });
                summary.copy_failed += 1;
                return Ok(());
            }
        }

        let engine = MergeEngine::new(self.reader, self.sink);
        match engine.merge(pass.store, &key.patient_id, pass.ledger)? {
            MergeOutcome::Updated { .. } => summary.records_updated += 1,
            MergeOutcome::NoLedgerRows => summary.records_untouched += 1,
        }

        Ok(())
    }
}

/// Subdirectories of a directory as (name, path), sorted by name
fn sorted_subdirs(dir: &Path) -> Result<Vec<(String, PathBuf)>, std::io::Error> {
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            dirs.push((entry.file_name().to_string_lossy().to_string(), path));
        }
    }

    dirs.sort();
    Ok(dirs)
}
