use std::path::{Path, PathBuf};

use crate::domain::{Label, Split};
use crate::error::SetupError;
use crate::fs_util::walk_dir;

/// A directory is a dataset root iff it holds all three split folders, each
/// holding both label folders. Structure only; file contents are ignored.
pub fn is_dataset_root(path: &Path) -> bool {
    if !path.is_dir() {
        return false;
    }
    for split in Split::ALL {
        let split_dir = path.join(split.as_str());
        if !split_dir.is_dir() {
            return false;
        }
        for label in Label::ALL {
            if !split_dir.join(label.as_str()).is_dir() {
                return false;
            }
        }
    }
    true
}

/// Checks the extraction root itself first (archive with no wrapping
/// folder), then every directory below it. First match wins; enumeration
/// order is whatever `read_dir` yields.
pub fn find_dataset_root(extract_root: &Path) -> Result<Option<PathBuf>, SetupError> {
    if is_dataset_root(extract_root) {
        return Ok(Some(extract_root.to_path_buf()));
    }

    let candidate = walk_dir(extract_root)?
        .into_iter()
        .find(|path| path.is_dir() && is_dataset_root(path));
    Ok(candidate)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn make_dataset_root(base: &Path) {
        for split in ["train", "val", "test"] {
            for label in ["NORMAL", "PNEUMONIA"] {
                fs::create_dir_all(base.join(split).join(label)).unwrap();
            }
        }
    }

    #[test]
    fn predicate_holds_for_complete_tree() {
        let temp = tempfile::tempdir().unwrap();
        make_dataset_root(temp.path());
        assert!(is_dataset_root(temp.path()));
    }

    #[test]
    fn predicate_rejects_missing_label() {
        let temp = tempfile::tempdir().unwrap();
        make_dataset_root(temp.path());
        fs::remove_dir(temp.path().join("val").join("PNEUMONIA")).unwrap();
        assert!(!is_dataset_root(temp.path()));
    }

    #[test]
    fn predicate_rejects_file_in_place_of_split() {
        let temp = tempfile::tempdir().unwrap();
        make_dataset_root(temp.path());
        fs::remove_dir_all(temp.path().join("test")).unwrap();
        fs::write(temp.path().join("test"), b"not a directory").unwrap();
        assert!(!is_dataset_root(temp.path()));
    }

    #[test]
    fn detection_at_extraction_root() {
        let temp = tempfile::tempdir().unwrap();
        make_dataset_root(temp.path());
        let found = find_dataset_root(temp.path()).unwrap().unwrap();
        assert_eq!(found, temp.path());
    }

    #[test]
    fn detection_in_nested_folder() {
        let temp = tempfile::tempdir().unwrap();
        let nested = temp.path().join("archive").join("chest_xray");
        make_dataset_root(&nested);
        fs::create_dir_all(temp.path().join("__MACOSX")).unwrap();
        let found = find_dataset_root(temp.path()).unwrap().unwrap();
        assert_eq!(found, nested);
    }

    #[test]
    fn detection_reports_none_without_structure() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir_all(temp.path().join("train").join("NORMAL")).unwrap();
        assert!(find_dataset_root(temp.path()).unwrap().is_none());
    }
}
