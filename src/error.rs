use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::domain::SHARE_URL;

#[derive(Debug, Error, Diagnostic)]
pub enum SetupError {
    #[error("invalid Google Drive file id: {0}")]
    InvalidFileId(String),

    #[error("Drive request failed: {0}")]
    DriveHttp(String),

    #[error("Drive returned status {status}: {message}")]
    #[diagnostic(help("verify the share link permissions: {SHARE_URL}"))]
    DriveStatus { status: u16, message: String },

    #[error("Drive did not serve the file (permission or quota interstitial)")]
    #[diagnostic(help("download manually from {SHARE_URL}"))]
    DriveInterstitial,

    #[error("download reported success but no archive at {0}")]
    #[diagnostic(help("download manually from {SHARE_URL}"))]
    DownloadMissing(PathBuf),

    #[error("invalid zip archive: {0}")]
    Archive(String),

    #[error(
        "could not find the expected dataset structure after extraction \
         (train/val/test each containing NORMAL and PNEUMONIA)"
    )]
    #[diagnostic(help("check the archive contents, or re-download from {SHARE_URL}"))]
    StructureNotFound,

    #[error("{0} already exists")]
    #[diagnostic(help("use --force to overwrite existing split folders"))]
    SplitExists(PathBuf),

    #[error("destination leaf already exists: {0}")]
    LeafExists(PathBuf),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}
