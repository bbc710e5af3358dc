use std::path::Path;
use std::time::Duration;

use camino::Utf8PathBuf;
use serde::Serialize;
use tempfile::Builder;

use crate::domain::{FileId, Label, Split};
use crate::drive::DriveClient;
use crate::error::SetupError;
use crate::fs_util::{copy_dir_recursive, count_images, extract_zip};
use crate::layout::find_dataset_root;

#[derive(Debug, Clone)]
pub struct SetupRequest {
    pub file_id: FileId,
    pub zip_path: Utf8PathBuf,
    pub output_dir: Utf8PathBuf,
    pub force: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SetupResult {
    pub output_dir: String,
    pub archive: String,
    pub downloaded: bool,
    pub dataset_root: String,
    pub leaves: Vec<LeafCount>,
    pub total_images: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeafCount {
    pub split: Split,
    pub label: Label,
    pub images: usize,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

fn emit(sink: &dyn ProgressSink, message: String) {
    sink.event(ProgressEvent {
        message,
        elapsed: None,
    });
}

pub struct App<D: DriveClient> {
    drive: D,
}

impl<D: DriveClient> App<D> {
    pub fn new(drive: D) -> Self {
        Self { drive }
    }

    /// Runs the whole pipeline: acquire the archive, extract it into a
    /// scratch directory, locate the dataset root, copy the six leaves into
    /// the output layout, and count what landed there. The scratch
    /// directory is removed on every exit path.
    pub fn setup(
        &self,
        request: &SetupRequest,
        sink: &dyn ProgressSink,
    ) -> Result<SetupResult, SetupError> {
        let downloaded = self.acquire(request, sink)?;

        let scratch = Builder::new()
            .prefix("cxr-extract-")
            .tempdir()
            .map_err(|err| SetupError::Filesystem(err.to_string()))?;
        emit(
            sink,
            format!(
                "phase=Extract; unpacking {} into {}",
                request.zip_path,
                scratch.path().display()
            ),
        );
        extract_zip(request.zip_path.as_std_path(), scratch.path())?;

        let dataset_root =
            find_dataset_root(scratch.path())?.ok_or(SetupError::StructureNotFound)?;
        let root_in_archive = dataset_root
            .strip_prefix(scratch.path())
            .ok()
            .filter(|rel| !rel.as_os_str().is_empty())
            .map(|rel| rel.display().to_string())
            .unwrap_or_else(|| ".".to_string());
        emit(
            sink,
            format!("phase=Detect; dataset root at {root_in_archive}"),
        );

        copy_dataset(
            &dataset_root,
            request.output_dir.as_std_path(),
            request.force,
        )?;
        emit(
            sink,
            format!("phase=Copy; materialized splits under {}", request.output_dir),
        );

        let mut leaves = Vec::new();
        let mut total_images = 0;
        for split in Split::ALL {
            for label in Label::ALL {
                let leaf = request
                    .output_dir
                    .as_std_path()
                    .join(split.as_str())
                    .join(label.as_str());
                let images = count_images(&leaf)?;
                total_images += images;
                leaves.push(LeafCount {
                    split,
                    label,
                    images,
                });
            }
        }

        Ok(SetupResult {
            output_dir: request.output_dir.to_string(),
            archive: request.zip_path.to_string(),
            downloaded,
            dataset_root: root_in_archive,
            leaves,
            total_images,
        })
    }

    // Presence check only: an existing archive is reused as-is.
    fn acquire(
        &self,
        request: &SetupRequest,
        sink: &dyn ProgressSink,
    ) -> Result<bool, SetupError> {
        if request.zip_path.as_std_path().exists() {
            emit(
                sink,
                format!("phase=Acquire; using existing zip {}", request.zip_path),
            );
            return Ok(false);
        }

        emit(
            sink,
            format!(
                "phase=Acquire; downloading Drive file {} to {}",
                request.file_id, request.zip_path
            ),
        );
        self.drive
            .download_file(&request.file_id, request.zip_path.as_std_path())?;
        if !request.zip_path.as_std_path().exists() {
            return Err(SetupError::DownloadMissing(
                request.zip_path.as_std_path().to_path_buf(),
            ));
        }
        Ok(true)
    }
}

/// Mirrors the six source leaves into `output_dir`. Without `force` the
/// presence of any split folder at the destination is a hard error and the
/// destination is left untouched; with `force` existing split folders are
/// removed first. There is no rollback if a later leaf copy fails.
pub fn copy_dataset(src_root: &Path, output_dir: &Path, force: bool) -> Result<(), SetupError> {
    std::fs::create_dir_all(output_dir).map_err(|err| SetupError::Filesystem(err.to_string()))?;

    if !force {
        for split in Split::ALL {
            let split_dir = output_dir.join(split.as_str());
            if split_dir.exists() {
                return Err(SetupError::SplitExists(split_dir));
            }
        }
    } else {
        for split in Split::ALL {
            let split_dir = output_dir.join(split.as_str());
            if split_dir.exists() {
                std::fs::remove_dir_all(&split_dir)
                    .map_err(|err| SetupError::Filesystem(err.to_string()))?;
            }
        }
    }

    for split in Split::ALL {
        for label in Label::ALL {
            let src = src_root.join(split.as_str()).join(label.as_str());
            let dst = output_dir.join(split.as_str()).join(label.as_str());
            if let Some(parent) = dst.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|err| SetupError::Filesystem(err.to_string()))?;
            }
            copy_dir_recursive(&src, &dst)?;
        }
    }
    Ok(())
}
