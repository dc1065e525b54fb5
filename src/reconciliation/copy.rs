use std::fs;
use std::path::Path;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum CopyError {
    #[error("Destination already exists: {0}")]
    DestinationExists(String),

    #[error("Source not found: {0}")]
    SourceMissing(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Walk error: {0}")]
    WalkError(#[from] walkdir::Error),
}

/// Copies an exam folder tree to its destination
pub trait TreeCopier {
    /// Copy `source` to `destination`, which must not exist yet.
    /// Missing parents of `destination` are created.
    fn copy_tree(&self, source: &Path, destination: &Path) -> Result<(), CopyError>;
}

/// Recursive copy on the local filesystem.
///
/// An interrupted copy is not cleaned up; the next run sees the partial
/// destination as already present.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsTreeCopier;

impl FsTreeCopier {
    pub fn new() -> Self {
        Self
    }
}

impl TreeCopier for FsTreeCopier {
    fn copy_tree(&self, source: &Path, destination: &Path) -> Result<(), CopyError> {
        if !source.is_dir() {
            return Err(CopyError::SourceMissing(source.display().to_string()));
        }
        if destination.exists() {
            return Err(CopyError::DestinationExists(
                destination.display().to_string(),
            ));
        }

        for entry in WalkDir::new(source).sort_by_file_name() {
            let entry = entry?;
            let relative = match entry.path().strip_prefix(source) {
                Ok(relative) => relative,
                Err(_) => continue,
            };
            let target = destination.join(relative);

            if entry.file_type().is_dir() {
                fs::create_dir_all(&target)?;
            } else {
                fs::copy(entry.path(), &target)?;
            }
        }

        Ok(())
    }
}
