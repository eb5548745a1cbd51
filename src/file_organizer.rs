/// Moving files into their category folders.
///
/// This module owns the category folders under the root: it creates them,
/// guards each one with its own lock, and runs the per-folder move worker that
/// classifies, sanitizes and relocates every direct file of one folder.
use crate::archive::ArchiveError;
use crate::config::CompiledFilters;
use crate::conflict::NameSnapshot;
use crate::file_category::{Category, CategoryTable};
use crate::normalize::FileNormalizer;
use parking_lot::{Mutex, MutexGuard};
use std::collections::{BTreeSet, HashMap};
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info_span, warn};

/// Record of one file delivered to its category folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovedFile {
    /// Where the file was found.
    pub original_path: PathBuf,
    /// Where the file ended up.
    pub new_path: PathBuf,
    /// The category the file was moved to.
    pub category: Category,
}

/// Errors reported while organizing a tree.
///
/// Apart from [`OrganizeError::InvalidRoot`], none of these stop a run: they
/// are collected per file, folder or archive and returned in the run report.
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// The root directory is missing or not a directory.
    #[error("Invalid root path {}: {source}", path.display())]
    InvalidRoot { path: PathBuf, source: io::Error },

    /// A folder could not be listed.
    #[error("Failed to read directory {}: {source}", path.display())]
    ReadDirFailed { path: PathBuf, source: io::Error },

    /// Walking the tree hit an unreadable entry.
    #[error("Failed to scan {}: {source}", path.display())]
    ScanFailed { path: PathBuf, source: io::Error },

    /// Failed to create a category directory.
    #[error("Failed to create directory {}: {source}", path.display())]
    DirectoryCreationFailed { path: PathBuf, source: io::Error },

    /// A non-directory entry already uses a category folder's name.
    #[error("Category folder {} is occupied by a non-directory entry", path.display())]
    CategoryBlocked { path: PathBuf },

    /// The file's category folder could not be prepared, so it was left alone.
    #[error("Skipped {}: category folder {} is unavailable", file.display(), folder.display())]
    CategoryUnavailable { file: PathBuf, folder: PathBuf },

    /// Failed to rename a file inside its own folder.
    #[error("Failed to rename {} to {}: {source}", from.display(), to.display())]
    RenameFailed {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    /// Failed to move a file to its category directory.
    #[error("Failed to move {} to {}: {source}", from.display(), to.display())]
    FileMoveFailure {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    /// The chosen destination appeared before the move could happen.
    #[error("Destination {} already exists", path.display())]
    DestinationExists { path: PathBuf },

    /// An empty directory could not be removed.
    #[error("Failed to remove empty directory {}: {source}", path.display())]
    PruneFailed { path: PathBuf, source: io::Error },

    /// An archive could not be unpacked; it was left in place.
    #[error("Failed to extract {}: {source}", path.display())]
    Extraction {
        path: PathBuf,
        #[source]
        source: ArchiveError,
    },
}

/// Result type for file organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Checks that `root` exists and is a directory.
pub fn validate_root(root: &Path) -> OrganizeResult<()> {
    let metadata = fs::metadata(root).map_err(|e| OrganizeError::InvalidRoot {
        path: root.to_path_buf(),
        source: e,
    })?;

    if !metadata.is_dir() {
        return Err(OrganizeError::InvalidRoot {
            path: root.to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotADirectory, "root is not a directory"),
        });
    }

    Ok(())
}

/// The category folders of one root, each behind its own lock.
///
/// Holding a folder's lock makes "list names, pick a free one, move" a single
/// critical section for that folder within this process.
#[derive(Debug)]
pub struct CategoryFolders {
    root: PathBuf,
    locks: HashMap<Category, Mutex<()>>,
}

impl CategoryFolders {
    /// Ensures one directory per category exists directly under `root`.
    ///
    /// An existing directory is reused. A category whose name is taken by a
    /// file (or anything else that is not a directory) is reported and left
    /// without a lock, which makes every file of that category fail with
    /// [`OrganizeError::CategoryUnavailable`].
    pub fn initialize(root: &Path) -> (Self, Vec<OrganizeError>) {
        let mut locks = HashMap::new();
        let mut errors = Vec::new();

        for category in Category::ALL {
            let path = category.folder(root);
            match ensure_dir(&path) {
                Ok(()) => {
                    locks.insert(category, Mutex::new(()));
                }
                Err(e) => {
                    error!("{e}");
                    errors.push(e);
                }
            }
        }

        let folders = Self {
            root: root.to_path_buf(),
            locks,
        };
        (folders, errors)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether the folder of `category` was prepared successfully.
    pub fn is_available(&self, category: Category) -> bool {
        self.locks.contains_key(&category)
    }

    /// Locks the given categories in declaration order.
    ///
    /// Every caller takes its locks through here, so two workers never wait on
    /// each other in opposite orders.
    fn lock_all(&self, categories: &BTreeSet<Category>) -> Vec<MutexGuard<'_, ()>> {
        categories
            .iter()
            .filter_map(|category| self.locks.get(category))
            .map(|lock| lock.lock())
            .collect()
    }
}

fn ensure_dir(path: &Path) -> OrganizeResult<()> {
    match fs::create_dir(path) {
        Ok(()) => {
            debug!("Created category folder {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            // Also covers a differently-cased directory on case-insensitive filesystems.
            if path.is_dir() {
                Ok(())
            } else {
                Err(OrganizeError::CategoryBlocked {
                    path: path.to_path_buf(),
                })
            }
        }
        Err(e) => Err(OrganizeError::DirectoryCreationFailed {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// What one move worker did.
#[derive(Debug, Default)]
pub struct MoveOutcome {
    pub moved: Vec<MovedFile>,
    pub errors: Vec<OrganizeError>,
}

/// Moves the direct files of one folder into their category folders.
///
/// Shares the tables, the filters and the category locks with every other
/// worker of the same run; owns nothing but the folder it was given.
pub struct MoveWorker<'a> {
    pub table: &'a CategoryTable,
    pub normalizer: &'a FileNormalizer,
    pub filters: &'a CompiledFilters,
    pub folders: &'a CategoryFolders,
}

impl MoveWorker<'_> {
    /// Processes every direct file of `folder`.
    ///
    /// Failures are collected per file; one bad file never stops the rest.
    pub fn run(&self, folder: &Path) -> MoveOutcome {
        let span = info_span!("move_worker", folder = %folder.display());
        let _enter = span.enter();

        let mut outcome = MoveOutcome::default();

        let files = match list_files(folder) {
            Ok((files, entry_errors)) => {
                for e in entry_errors {
                    error!("{e}");
                    outcome.errors.push(e);
                }
                files
            }
            Err(e) => {
                error!("{e}");
                outcome.errors.push(e);
                return outcome;
            }
        };

        for file in files {
            let Some(name) = file.file_name().map(OsStr::to_os_string) else {
                continue;
            };
            let display_name = name.to_string_lossy();
            let relative = file.strip_prefix(self.folders.root()).unwrap_or(&file);
            if !self.filters.should_include(relative) {
                debug!("Excluded by filters: {display_name}");
                continue;
            }

            let category = self.table.categorize(&display_name);
            let destination = category.folder(self.folders.root());
            if destination == folder {
                continue;
            }

            match self.move_file(folder, &file, &name, category, &destination) {
                Ok(moved) => {
                    debug!("{} -> {}", moved.original_path.display(), moved.new_path.display());
                    outcome.moved.push(moved);
                }
                Err(e) => {
                    error!("{e}");
                    outcome.errors.push(e);
                }
            }
        }

        outcome
    }

    /// Sanitizes, deconflicts and moves one file.
    fn move_file(
        &self,
        folder: &Path,
        file: &Path,
        name: &OsStr,
        category: Category,
        destination: &Path,
    ) -> OrganizeResult<MovedFile> {
        if !self.folders.is_available(category) {
            return Err(OrganizeError::CategoryUnavailable {
                file: file.to_path_buf(),
                folder: destination.to_path_buf(),
            });
        }

        let mut held = BTreeSet::from([category]);
        if let Some(source_category) = self.table.category_of_folder(self.folders.root(), folder) {
            held.insert(source_category);
        }
        let _guards = self.folders.lock_all(&held);

        let current = self.rename_in_place(folder, file, name)?;
        let current_name = current
            .file_name()
            .map(OsStr::to_os_string)
            .unwrap_or_else(|| name.to_os_string());

        let final_name = NameSnapshot::of_dir(destination)
            .map_err(|e| OrganizeError::ReadDirFailed {
                path: destination.to_path_buf(),
                source: e,
            })?
            .resolve(&current_name);
        let target = destination.join(&final_name);

        // rename(2) would silently replace an entry created behind our back.
        if target.symlink_metadata().is_ok() {
            return Err(OrganizeError::DestinationExists { path: target });
        }

        fs::rename(&current, &target).map_err(|e| OrganizeError::FileMoveFailure {
            from: current.clone(),
            to: target.clone(),
            source: e,
        })?;

        Ok(MovedFile {
            original_path: file.to_path_buf(),
            new_path: target,
            category,
        })
    }

    /// Renames `file` to its sanitized name inside `folder`, if that changes it.
    fn rename_in_place(
        &self,
        folder: &Path,
        file: &Path,
        name: &OsStr,
    ) -> OrganizeResult<PathBuf> {
        let normalized = self.normalizer.normalize_os(name);
        if normalized.as_os_str() == name {
            return Ok(file.to_path_buf());
        }

        let free = NameSnapshot::of_dir(folder)
            .map_err(|e| OrganizeError::ReadDirFailed {
                path: folder.to_path_buf(),
                source: e,
            })?
            .resolve(&normalized);
        let renamed = folder.join(&free);

        if renamed.symlink_metadata().is_ok() {
            warn!(
                "{} appeared while renaming {}",
                renamed.display(),
                name.to_string_lossy()
            );
            return Err(OrganizeError::DestinationExists { path: renamed });
        }

        fs::rename(file, &renamed).map_err(|e| OrganizeError::RenameFailed {
            from: file.to_path_buf(),
            to: renamed.clone(),
            source: e,
        })?;

        Ok(renamed)
    }
}

/// Snapshot of the regular files directly inside `folder`.
///
/// Fails only if the folder itself cannot be listed. An unreadable entry is
/// skipped and reported next to the files that could be read.
fn list_files(folder: &Path) -> OrganizeResult<(Vec<PathBuf>, Vec<OrganizeError>)> {
    let entries = fs::read_dir(folder).map_err(|e| OrganizeError::ReadDirFailed {
        path: folder.to_path_buf(),
        source: e,
    })?;
    Ok(collect_files(folder, entries))
}

fn collect_files(
    folder: &Path,
    entries: impl IntoIterator<Item = io::Result<fs::DirEntry>>,
) -> (Vec<PathBuf>, Vec<OrganizeError>) {
    let mut files = Vec::new();
    let mut errors = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                errors.push(OrganizeError::ReadDirFailed {
                    path: folder.to_path_buf(),
                    source: e,
                });
                continue;
            }
        };
        if let Ok(file_type) = entry.file_type()
            && file_type.is_file()
        {
            files.push(entry.path());
        }
    }
    files.sort();
    (files, errors)
}
