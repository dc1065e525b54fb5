pub mod config;
pub mod events;
pub mod ledger;
pub mod probe;
pub mod reconciliation;
pub mod record;
pub mod roster;
pub mod tabular;
pub mod utils;

// Re-export commonly used types
pub use config::{read_config, ConfigError, ReconcileConfig};
pub use events::{Event, EventSink, FileEventLog, MemoryEventSink};
pub use ledger::{find_ledger_file, load_ledger, ExamRecord, Ledger, LedgerError};
pub use probe::{
    probe_modality, probe_sample, DicomHeaderReader, HeaderReader, ProbeError, SampleHeader,
};
pub use reconciliation::{
    CancerTypeSummary, CopyError, FolderNameError, FolderNameKey, FsTreeCopier,
    MergeEngine, MergeOutcome, ReconcileError, Reconciler, RunSummary, TreeCopier,
};
pub use record::{ExaminationEntry, PatientRecord, RecordError, RecordStore};
pub use roster::{load_roster, Roster, RosterError};
