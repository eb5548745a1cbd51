//! Folder discovery.

use crate::file_organizer::{OrganizeError, OrganizeResult};
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// Every directory found under a root, root first.
#[derive(Debug, Default)]
pub struct FolderScan {
    pub folders: Vec<PathBuf>,
    /// Subtrees that could not be read; their folders are missing from `folders`.
    pub errors: Vec<OrganizeError>,
}

/// Recursively lists `root` and every directory below it.
///
/// Symbolic links are not followed. Fails only when the root itself cannot be
/// read; unreadable subdirectories are recorded in [`FolderScan::errors`].
pub fn scan_folders(root: &Path) -> OrganizeResult<FolderScan> {
    let mut scan = FolderScan::default();

    for entry in WalkDir::new(root).follow_links(false) {
        match entry {
            Ok(entry) if entry.file_type().is_dir() => scan.folders.push(entry.into_path()),
            Ok(_) => {}
            Err(e) => {
                let path = e.path().unwrap_or(root).to_path_buf();
                let is_root = e.depth() == 0;
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| io::Error::other("filesystem loop"));

                if is_root {
                    return Err(OrganizeError::InvalidRoot { path, source });
                }
                warn!("Skipping {}: {source}", path.display());
                scan.errors.push(OrganizeError::ScanFailed { path, source });
            }
        }
    }

    Ok(scan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_scan_includes_root_and_nested_dirs() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::create_dir_all(root.join("a").join("b")).expect("Failed to create dirs");
        fs::create_dir(root.join("c")).expect("Failed to create dir");
        fs::write(root.join("a").join("file.txt"), "x").expect("Failed to write file");

        let scan = scan_folders(root).expect("Scan failed");

        assert!(scan.errors.is_empty());
        assert_eq!(scan.folders[0], root);
        let mut folders = scan.folders.clone();
        folders.sort();
        assert_eq!(
            folders,
            vec![
                root.to_path_buf(),
                root.join("a"),
                root.join("a").join("b"),
                root.join("c"),
            ]
        );
    }

    #[test]
    fn test_scan_of_empty_root() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let scan = scan_folders(temp_dir.path()).expect("Scan failed");
        assert_eq!(scan.folders, vec![temp_dir.path().to_path_buf()]);
    }

    #[test]
    fn test_scan_missing_root_fails() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let result = scan_folders(&temp_dir.path().join("missing"));
        assert!(matches!(result, Err(OrganizeError::InvalidRoot { .. })));
    }
}
