//! Archive extraction.
//!
//! Each archive is unpacked into the folder it lives in and deleted only once
//! its contents are out. A failed extraction leaves the archive untouched.

use crate::conflict::resolve_in_dir;
use crate::file_organizer::OrganizeError;
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, info_span, warn};

/// Why an archive could not be unpacked.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("7z error: {0}")]
    SevenZip(String),

    #[error("unsupported archive format")]
    UnsupportedFormat,

    /// Contents were extracted but the archive itself is still there.
    #[error("extracted, but the archive could not be deleted: {0}")]
    RemoveFailed(io::Error),
}

/// Container formats the extraction phase understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    Tar,
    TarGz,
    /// A single gzip-compressed file, or a tarball whose name lost its `.tar`.
    Gzip,
    SevenZip,
}

impl ArchiveFormat {
    /// Picks the format from the file name, case-insensitively.
    ///
    /// ```
    /// use junksort::archive::ArchiveFormat;
    ///
    /// assert_eq!(ArchiveFormat::from_name("Backup.TAR.GZ"), Some(ArchiveFormat::TarGz));
    /// assert_eq!(ArchiveFormat::from_name("notes.gz"), Some(ArchiveFormat::Gzip));
    /// assert_eq!(ArchiveFormat::from_name("song.mp3"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        if lower.ends_with(".tar.gz") || lower.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if lower.ends_with(".tar") {
            Some(Self::Tar)
        } else if lower.ends_with(".gz") {
            Some(Self::Gzip)
        } else if lower.ends_with(".zip") {
            Some(Self::Zip)
        } else if lower.ends_with(".7z") {
            Some(Self::SevenZip)
        } else {
            None
        }
    }
}

/// Result of one archive worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveOutcome {
    /// Unpacked and deleted.
    Extracted(PathBuf),
    /// Not an archive this tool can open; left in place.
    Skipped(PathBuf),
}

/// Unpacks `archive` into `dest` and deletes it.
pub fn extract_archive(archive: &Path, dest: &Path) -> Result<ArchiveOutcome, OrganizeError> {
    let span = info_span!("archive_worker", archive = %archive.display());
    let _enter = span.enter();

    let name = archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let Some(format) = ArchiveFormat::from_name(&name) else {
        warn!("Not a supported archive, leaving it in place");
        return Ok(ArchiveOutcome::Skipped(archive.to_path_buf()));
    };

    let wrap = |source: ArchiveError| OrganizeError::Extraction {
        path: archive.to_path_buf(),
        source,
    };

    unpack(format, archive, &name, dest).map_err(wrap)?;
    fs::remove_file(archive).map_err(|e| wrap(ArchiveError::RemoveFailed(e)))?;

    info!("Extracted {name}");
    Ok(ArchiveOutcome::Extracted(archive.to_path_buf()))
}

fn unpack(
    format: ArchiveFormat,
    archive: &Path,
    name: &str,
    dest: &Path,
) -> Result<(), ArchiveError> {
    match format {
        ArchiveFormat::Zip => {
            let mut zip = zip::ZipArchive::new(BufReader::new(File::open(archive)?))?;
            zip.extract(dest)?;
        }
        ArchiveFormat::Tar => {
            tar::Archive::new(BufReader::new(File::open(archive)?)).unpack(dest)?;
        }
        ArchiveFormat::TarGz => {
            let decoder = GzDecoder::new(BufReader::new(File::open(archive)?));
            tar::Archive::new(decoder).unpack(dest)?;
        }
        ArchiveFormat::Gzip => gunzip(archive, name, dest)?,
        ArchiveFormat::SevenZip => {
            sevenz_rust::decompress_file(archive, dest)
                .map_err(|e| ArchiveError::SevenZip(e.to_string()))?;
        }
    }
    Ok(())
}

/// Size of one tar header block.
const TAR_BLOCK: u64 = 512;

/// Where the `ustar` magic sits inside a tar header block.
const USTAR_MAGIC: std::ops::Range<usize> = 257..262;

/// Decompresses a `.gz` file next to itself, without the `.gz` suffix.
///
/// Sanitizing `logs.tar.gz` yields `logs_tar.gz`, so a gzip stream that starts
/// with a tar header is unpacked as a tarball whatever its name says.
fn gunzip(archive: &Path, name: &str, dest: &Path) -> io::Result<()> {
    let mut decoder = GzDecoder::new(BufReader::new(File::open(archive)?));
    let mut head = Vec::with_capacity(TAR_BLOCK as usize);
    (&mut decoder).take(TAR_BLOCK).read_to_end(&mut head)?;
    let is_tar = head.get(USTAR_MAGIC) == Some(b"ustar".as_slice());
    let mut stream = io::Cursor::new(head).chain(decoder);

    if is_tar {
        debug!("{name} holds a tarball");
        return tar::Archive::new(stream).unpack(dest);
    }

    let stem = &name[..name.len() - ".gz".len()];
    let stem = if stem.is_empty() { "unpacked" } else { stem };
    let target = dest.join(resolve_in_dir(dest, stem)?);

    let mut out = File::create_new(&target)?;
    if let Err(e) = io::copy(&mut stream, &mut out) {
        drop(out);
        let _ = fs::remove_file(&target);
        return Err(e);
    }
    Ok(())
}
