mod classify;
mod copy;
mod execute;
mod folder_name;
mod merge;

pub use classify::{canonical_folder_name, classify};
pub use copy::{CopyError, FsTreeCopier, TreeCopier};
pub use execute::{CancerTypeSummary, ReconcileError, Reconciler, RunSummary};
pub use folder_name::{FolderNameError, FolderNameKey};
pub use merge::{MergeEngine, MergeOutcome};
