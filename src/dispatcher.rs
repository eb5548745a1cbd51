//! Run orchestration.
//!
//! A run walks through [`Phase`]s strictly in order. The move phase and the
//! extraction phase fan out over a rayon pool and are joined completely before
//! the next phase starts; everything the workers report ends up in one
//! [`RunReport`].

use crate::archive::{ArchiveOutcome, extract_archive};
use crate::config::{CompiledFilters, Config, ConfigError};
use crate::file_category::{Category, CategoryTable};
use crate::file_organizer::{
    CategoryFolders, MoveOutcome, MoveWorker, MovedFile, OrganizeError, validate_root,
};
use crate::normalize::FileNormalizer;
use crate::pruner::prune_empty_folders;
use crate::scanner::scan_folders;
use crate::transliterate::Transliterator;
use indicatif::ProgressBar;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info};

/// Stages of a run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Scanning,
    Initializing,
    Moving,
    Pruning,
    ExtractingArchives,
    Done,
}

/// Failures that prevent a run from starting.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Organize(#[from] OrganizeError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Everything a run did, including every non-fatal error.
#[derive(Debug)]
pub struct RunReport {
    pub root: PathBuf,
    pub moved: Vec<MovedFile>,
    pub pruned: Vec<PathBuf>,
    pub extracted: Vec<PathBuf>,
    /// Files in the archive folder that are not a supported archive.
    pub skipped_archives: Vec<PathBuf>,
    pub archive_phase_ran: bool,
    pub errors: Vec<OrganizeError>,
}

impl RunReport {
    fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            moved: Vec::new(),
            pruned: Vec::new(),
            extracted: Vec::new(),
            skipped_archives: Vec::new(),
            archive_phase_ran: false,
            errors: Vec::new(),
        }
    }

    /// Number of files delivered per category.
    pub fn category_counts(&self) -> BTreeMap<Category, usize> {
        let mut counts = BTreeMap::new();
        for moved in &self.moved {
            *counts.entry(moved.category).or_insert(0) += 1;
        }
        counts
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Drives one run over one root directory.
pub struct Dispatcher {
    root: PathBuf,
    config: Config,
    table: CategoryTable,
    normalizer: FileNormalizer,
    progress: ProgressBar,
    phase: Phase,
}

impl Dispatcher {
    pub fn new(root: impl Into<PathBuf>, config: Config) -> Self {
        Self {
            root: root.into(),
            config,
            table: CategoryTable::new(),
            normalizer: FileNormalizer::new(Transliterator::new()),
            progress: ProgressBar::hidden(),
            phase: Phase::Scanning,
        }
    }

    /// Reports move-phase progress, one tick per finished folder.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn enter(&mut self, phase: Phase) {
        debug!("{:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }

    /// Runs every phase to completion.
    ///
    /// # Errors
    ///
    /// Fails only if the root is unusable, the filters do not compile or the
    /// worker pool cannot start. Per-file, per-folder and per-archive failures
    /// are returned inside the report instead.
    pub fn run(&mut self) -> Result<RunReport, RunError> {
        validate_root(&self.root)?;
        let filters = self.config.compile_filters()?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.workers.threads)
            .thread_name(|i| format!("junksort-worker-{i}"))
            .build()?;

        let mut report = RunReport::new(&self.root);

        self.enter(Phase::Scanning);
        let scan = scan_folders(&self.root)?;
        info!("Found {} folders under {}", scan.folders.len(), self.root.display());
        report.errors.extend(scan.errors);

        self.enter(Phase::Initializing);
        let (folders, init_errors) = CategoryFolders::initialize(&self.root);
        report.errors.extend(init_errors);

        self.enter(Phase::Moving);
        let outcomes = self.move_all(&pool, &scan.folders, &folders, &filters);
        for outcome in outcomes {
            report.moved.extend(outcome.moved);
            report.errors.extend(outcome.errors);
        }
        info!("Moved {} files", report.moved.len());

        self.enter(Phase::Pruning);
        let pruned = prune_empty_folders(&self.root);
        report.pruned = pruned.removed;
        report.errors.extend(pruned.errors);

        let archives_dir = Category::Archive.folder(&self.root);
        if archives_dir.is_dir() {
            self.enter(Phase::ExtractingArchives);
            report.archive_phase_ran = true;
            self.extract_all(&pool, &archives_dir, &mut report);
        }

        self.enter(Phase::Done);
        Ok(report)
    }

    /// One move worker per folder; returns once all of them have finished.
    fn move_all(
        &self,
        pool: &rayon::ThreadPool,
        to_visit: &[PathBuf],
        folders: &CategoryFolders,
        filters: &CompiledFilters,
    ) -> Vec<MoveOutcome> {
        let worker = MoveWorker {
            table: &self.table,
            normalizer: &self.normalizer,
            filters,
            folders,
        };

        self.progress.set_length(to_visit.len() as u64);
        let outcomes = pool.install(|| {
            to_visit
                .par_iter()
                .map(|folder| {
                    let outcome = worker.run(folder);
                    self.progress.inc(1);
                    outcome
                })
                .collect()
        });
        self.progress.finish_and_clear();
        outcomes
    }

    /// One archive worker per file present in `archives_dir` right now.
    fn extract_all(
        &self,
        pool: &rayon::ThreadPool,
        archives_dir: &Path,
        report: &mut RunReport,
    ) {
        let files = match list_archive_candidates(archives_dir) {
            Ok(files) => files,
            Err(e) => {
                report.errors.push(e);
                return;
            }
        };

        let results: Vec<_> = pool.install(|| {
            files
                .par_iter()
                .map(|file| extract_archive(file, archives_dir))
                .collect()
        });

        for result in results {
            match result {
                Ok(ArchiveOutcome::Extracted(path)) => report.extracted.push(path),
                Ok(ArchiveOutcome::Skipped(path)) => report.skipped_archives.push(path),
                Err(e) => {
                    error!("{e}");
                    report.errors.push(e);
                }
            }
        }
        info!("Extracted {} archives", report.extracted.len());
    }
}

fn list_archive_candidates(dir: &Path) -> Result<Vec<PathBuf>, OrganizeError> {
    let read_err = |e: std::io::Error| OrganizeError::ReadDirFailed {
        path: dir.to_path_buf(),
        source: e,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            files.push(entry.path());
        }
    }
    Ok(files)
}
