//! Collision-free naming inside a directory.

use crate::normalize::split_os_extension;
use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::Path;

/// Point-in-time view of the entry names of one directory.
///
/// The snapshot is not refreshed from disk; callers that must not race with
/// other writers hold the directory's lock while using it.
#[derive(Debug, Clone, Default)]
pub struct NameSnapshot {
    taken: HashSet<OsString>,
}

impl NameSnapshot {
    /// Lists `dir` once.
    pub fn of_dir(dir: &Path) -> io::Result<Self> {
        let mut taken = HashSet::new();
        for entry in fs::read_dir(dir)? {
            taken.insert(entry?.file_name());
        }
        Ok(Self { taken })
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            taken: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, name: impl AsRef<OsStr>) -> bool {
        self.taken.contains(name.as_ref())
    }

    /// Returns `candidate` if free, else the first free `base_N.ext` with N >= 1.
    ///
    /// ```
    /// use junksort::conflict::NameSnapshot;
    ///
    /// let snapshot = NameSnapshot::from_names(["a.txt", "a_1.txt"]);
    /// assert_eq!(snapshot.resolve("a.txt"), "a_2.txt");
    /// assert_eq!(snapshot.resolve("b.txt"), "b.txt");
    /// ```
    pub fn resolve(&self, candidate: impl AsRef<OsStr>) -> OsString {
        let candidate = candidate.as_ref();
        if !self.contains(candidate) {
            return candidate.to_os_string();
        }

        let (base, ext) = split_os_extension(candidate);
        (1u64..)
            .map(|n| {
                let mut name = OsString::from(format!("{base}_{n}"));
                name.push(&ext);
                name
            })
            .find(|name| !self.contains(name))
            .unwrap_or_else(|| candidate.to_os_string())
    }

    /// Resolves `candidate` and records the result as taken.
    pub fn claim(&mut self, candidate: impl AsRef<OsStr>) -> OsString {
        let name = self.resolve(candidate);
        self.taken.insert(name.clone());
        name
    }
}

/// Lists `dir` and resolves `candidate` against it.
pub fn resolve_in_dir(dir: &Path, candidate: impl AsRef<OsStr>) -> io::Result<OsString> {
    Ok(NameSnapshot::of_dir(dir)?.resolve(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_free_name_is_unchanged() {
        let snapshot = NameSnapshot::from_names(["b.txt"]);
        assert_eq!(snapshot.resolve("a.txt"), "a.txt");
    }

    #[test]
    fn test_suffix_goes_before_extension() {
        let snapshot = NameSnapshot::from_names(["photo.tar.gz"]);
        assert_eq!(snapshot.resolve("photo.tar.gz"), "photo.tar_1.gz");

        let snapshot = NameSnapshot::from_names(["Makefile"]);
        assert_eq!(snapshot.resolve("Makefile"), "Makefile_1");
    }

    #[test]
    fn test_claims_never_repeat() {
        let mut snapshot = NameSnapshot::from_names(["a.txt"]);
        assert_eq!(snapshot.claim("a.txt"), "a_1.txt");
        assert_eq!(snapshot.claim("a.txt"), "a_2.txt");
        assert_eq!(snapshot.claim("a.txt"), "a_3.txt");
        assert_eq!(snapshot.claim("b.txt"), "b.txt");
        assert_eq!(snapshot.claim("b.txt"), "b_1.txt");
    }

    #[test]
    fn test_gap_in_suffixes_is_reused() {
        let snapshot = NameSnapshot::from_names(["a.txt", "a_2.txt"]);
        assert_eq!(snapshot.resolve("a.txt"), "a_1.txt");
    }

    #[test]
    fn test_resolve_in_dir_reads_disk() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::write(temp_dir.path().join("a.txt"), "x").expect("Failed to write file");

        assert_eq!(
            resolve_in_dir(temp_dir.path(), "a.txt").expect("Failed to list dir"),
            "a_1.txt"
        );

        fs::write(temp_dir.path().join("a_1.txt"), "y").expect("Failed to write file");
        assert_eq!(
            resolve_in_dir(temp_dir.path(), "a.txt").expect("Failed to list dir"),
            "a_2.txt"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_suffix_keeps_raw_extension() {
        use std::os::unix::ffi::{OsStrExt, OsStringExt};

        let name = OsStr::from_bytes(b"clip.\xff\xfe");
        let snapshot = NameSnapshot::from_names([name]);
        assert_eq!(snapshot.resolve(name).into_vec(), b"clip_1.\xff\xfe".to_vec());
    }

    #[test]
    fn test_resolve_in_missing_dir_fails() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        assert!(resolve_in_dir(&temp_dir.path().join("missing"), "a.txt").is_err());
    }
}
