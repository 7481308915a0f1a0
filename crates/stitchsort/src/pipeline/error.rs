use std::path::PathBuf;

use thiserror::Error;

/// Hard precondition failures. Any of these aborts the whole batch
/// before a single file is touched; everything past the preconditions
/// is recorded per file instead of propagated.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Input directory does not exist: {0}")]
    InputDirectoryMissing(PathBuf),

    #[error("Input path is not a directory: {0}")]
    InputNotADirectory(PathBuf),

    #[error("Classification backend is not available")]
    BackendUnavailable,

    #[error("Failed to create output directory '{path}': {source}")]
    CreateOutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Scan failed: {0}")]
    Scan(#[from] crate::error::ScanError),
}
