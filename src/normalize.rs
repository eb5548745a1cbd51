//! Filename sanitizing.
//!
//! Only the base name is rewritten; the extension is kept byte for byte.

use crate::transliterate::Transliterator;
use std::ffi::{OsStr, OsString};
use std::path::Path;

/// Splits a file name into base and extension, the extension keeping its dot.
///
/// Leading dots never start an extension, so `.bashrc` has none and
/// `archive.tar.gz` splits into `archive.tar` and `.gz`.
///
/// ```
/// use junksort::normalize::split_extension;
///
/// assert_eq!(split_extension("photo.JPG"), ("photo", ".JPG"));
/// assert_eq!(split_extension(".bashrc"), (".bashrc", ""));
/// assert_eq!(split_extension("archive.tar.gz"), ("archive.tar", ".gz"));
/// ```
pub fn split_extension(name: &str) -> (&str, &str) {
    let leading = name.len() - name.trim_start_matches('.').len();
    match name[leading..].rfind('.') {
        Some(idx) => name.split_at(leading + idx),
        None => (name, ""),
    }
}

/// Splits an OS file name like [`split_extension`].
///
/// The base is decoded lossily, since it is about to be sanitized anyway. The
/// extension keeps its raw bytes, dot included.
pub fn split_os_extension(name: &OsStr) -> (String, OsString) {
    let lossy = name.to_string_lossy();
    let (base, ext) = split_extension(&lossy);
    if ext.is_empty() {
        return (base.to_string(), OsString::new());
    }
    if name.to_str().is_some() {
        return (base.to_string(), OsString::from(ext));
    }

    // Decoding never adds or drops a '.', so the last dot is the same one.
    let mut raw = OsString::from(".");
    if let Some(tail) = Path::new(name).extension() {
        raw.push(tail);
    }
    (base.to_string(), raw)
}

/// Builds filesystem-safe names.
#[derive(Debug, Clone, Default)]
pub struct FileNormalizer {
    transliterator: Transliterator,
}

impl FileNormalizer {
    pub fn new(transliterator: Transliterator) -> Self {
        Self { transliterator }
    }

    /// Returns the sanitized form of `file_name`.
    ///
    /// Running it on its own output changes nothing.
    ///
    /// ```
    /// use junksort::normalize::FileNormalizer;
    ///
    /// let normalizer = FileNormalizer::default();
    /// assert_eq!(normalizer.normalize("фото.jpg"), "foto.jpg");
    /// assert_eq!(normalizer.normalize("my report (1).PDF"), "my_report__1_.PDF");
    /// ```
    pub fn normalize(&self, file_name: &str) -> String {
        let (base, ext) = split_extension(file_name);
        let mut out = self.sanitize_base(base);
        out.push_str(ext);
        out
    }

    /// [`normalize`](Self::normalize) for names that may not be valid UTF-8.
    ///
    /// Undecodable bytes in the base become `_`; the extension is copied as is.
    pub fn normalize_os(&self, file_name: &OsStr) -> OsString {
        let (base, ext) = split_os_extension(file_name);
        let mut out = OsString::from(self.sanitize_base(&base));
        out.push(ext);
        out
    }

    fn sanitize_base(&self, base: &str) -> String {
        let mut out = String::with_capacity(base.len());
        for c in base.chars() {
            self.transliterator.push_sanitized(c, &mut out);
        }

        // "ъ.txt" would otherwise become ".txt", a hidden file with no extension.
        if out.is_empty() {
            out.push('_');
        }
        out
    }
}
