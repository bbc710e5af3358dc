use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::domain::is_image_file;
use crate::error::SetupError;

pub fn extract_zip(zip_path: &Path, target_dir: &Path) -> Result<(), SetupError> {
    let file = fs::File::open(zip_path)
        .map_err(|err| SetupError::Filesystem(format!("open zip {}: {err}", zip_path.display())))?;
    let mut archive = ZipArchive::new(file).map_err(|err| SetupError::Archive(err.to_string()))?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|err| SetupError::Archive(err.to_string()))?;
        let entry_path = match entry.enclosed_name() {
            Some(path) => target_dir.join(path),
            None => {
                return Err(SetupError::Archive(
                    "zip entry path traversal detected".to_string(),
                ));
            }
        };

        if entry.is_dir() {
            fs::create_dir_all(&entry_path)
                .map_err(|err| SetupError::Filesystem(err.to_string()))?;
            continue;
        }

        if let Some(parent) = entry_path.parent() {
            fs::create_dir_all(parent).map_err(|err| SetupError::Filesystem(err.to_string()))?;
        }
        let mut outfile =
            fs::File::create(&entry_path).map_err(|err| SetupError::Filesystem(err.to_string()))?;
        io::copy(&mut entry, &mut outfile)
            .map_err(|err| SetupError::Filesystem(err.to_string()))?;
    }
    Ok(())
}

/// Copies `source` into `dest`. Refuses a pre-existing `dest` directory
/// rather than merging into it.
pub fn copy_dir_recursive(source: &Path, dest: &Path) -> Result<(), SetupError> {
    if dest.exists() {
        return Err(SetupError::LeafExists(dest.to_path_buf()));
    }
    fs::create_dir_all(dest).map_err(|err| SetupError::Filesystem(err.to_string()))?;
    for entry in walk_dir(source)? {
        let relative = entry.strip_prefix(source).unwrap();
        let target = dest.join(relative);
        if entry.is_dir() {
            fs::create_dir_all(&target).map_err(|err| SetupError::Filesystem(err.to_string()))?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)
                    .map_err(|err| SetupError::Filesystem(err.to_string()))?;
            }
            fs::copy(entry, &target).map_err(|err| SetupError::Filesystem(err.to_string()))?;
        }
    }
    Ok(())
}

pub fn count_images(folder: &Path) -> Result<usize, SetupError> {
    if !folder.is_dir() {
        return Ok(0);
    }
    let count = walk_dir(folder)?
        .into_iter()
        .filter(|path| path.is_file() && is_image_file(path))
        .count();
    Ok(count)
}

pub fn walk_dir(root: &Path) -> Result<Vec<PathBuf>, SetupError> {
    let mut items = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(path) = stack.pop() {
        let entries = fs::read_dir(&path).map_err(|err| SetupError::Filesystem(err.to_string()))?;
        for entry in entries {
            let entry = entry.map_err(|err| SetupError::Filesystem(err.to_string()))?;
            let path = entry.path();
            if path.is_dir() {
                stack.push(path.clone());
            }
            items.push(path);
        }
    }
    Ok(items)
}
