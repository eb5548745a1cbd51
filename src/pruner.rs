//! Removal of directories emptied by the move phase.

use crate::file_organizer::OrganizeError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// What a pruning pass removed and what it could not.
#[derive(Debug, Default)]
pub struct PruneOutcome {
    pub removed: Vec<PathBuf>,
    pub errors: Vec<OrganizeError>,
}

/// Deletes every directory under `root` that has no entries left.
///
/// Children are visited before their parents, so a parent whose only content
/// was empty directories goes too. The root itself is never removed.
pub fn prune_empty_folders(root: &Path) -> PruneOutcome {
    let mut outcome = PruneOutcome::default();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .contents_first(true);

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().unwrap_or(root).to_path_buf();
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| io::Error::other("filesystem loop"));
                warn!("Cannot inspect {}: {source}", path.display());
                outcome.errors.push(OrganizeError::ScanFailed { path, source });
                continue;
            }
        };

        if !entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        match is_empty_dir(path) {
            Ok(true) => match fs::remove_dir(path) {
                Ok(()) => {
                    debug!("Removed empty folder {}", path.display());
                    outcome.removed.push(path.to_path_buf());
                }
                Err(e) => {
                    warn!("Cannot remove {}: {e}", path.display());
                    outcome.errors.push(OrganizeError::PruneFailed {
                        path: path.to_path_buf(),
                        source: e,
                    });
                }
            },
            Ok(false) => {}
            Err(e) => outcome.errors.push(OrganizeError::ReadDirFailed {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }

    outcome
}

fn is_empty_dir(path: &Path) -> io::Result<bool> {
    Ok(fs::read_dir(path)?.next().is_none())
}
