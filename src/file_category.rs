/// File categorization by extension.
///
/// The category table is fixed: every file maps to exactly one [`Category`],
/// with [`Category::Other`] as the fallback for unknown or missing extensions.
///
/// # Examples
///
/// ```
/// use junksort::file_category::{Category, CategoryTable};
///
/// let table = CategoryTable::default();
/// assert_eq!(table.categorize("photo.PNG"), Category::Image);
/// assert_eq!(table.categorize("song.flac"), Category::Audio);
/// assert_eq!(table.categorize("README"), Category::Other);
/// ```
use crate::normalize::split_extension;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Represents a destination category.
///
/// The declaration order is also the lock order used by the move workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Archive files (ZIP, GZ, TAR, 7Z)
    Archive,
    /// Audio files (MP3, OGG, WAV, AMR, FLAC)
    Audio,
    /// Document files (DOC, DOCX, TXT, PDF, XLSX, PPTX, ODT)
    Document,
    /// Image files (JPEG, PNG, JPG, SVG, WEBP)
    Image,
    /// Video files (AVI, MP4, MOV, MKV)
    Video,
    /// Everything else
    Other,
}

impl Category {
    /// All categories in table order.
    pub const ALL: [Category; 6] = [
        Category::Archive,
        Category::Audio,
        Category::Document,
        Category::Image,
        Category::Video,
        Category::Other,
    ];

    /// Returns the directory name for this category.
    ///
    /// # Examples
    ///
    /// ```
    /// use junksort::file_category::Category;
    ///
    /// assert_eq!(Category::Image.dir_name(), "images");
    /// assert_eq!(Category::Video.dir_name(), "video");
    /// assert_eq!(Category::Other.dir_name(), "other");
    /// ```
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Archive => "archives",
            Category::Audio => "audio",
            Category::Document => "documents",
            Category::Image => "images",
            Category::Video => "video",
            Category::Other => "other",
        }
    }

    /// Extensions recognized for this category, lower-case and without the dot.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Category::Archive => &["zip", "gz", "tar", "7z"],
            Category::Audio => &["mp3", "ogg", "wav", "amr", "flac"],
            Category::Document => &["doc", "docx", "txt", "pdf", "xlsx", "pptx", "odt"],
            Category::Image => &["jpeg", "png", "jpg", "svg", "webp"],
            Category::Video => &["avi", "mp4", "mov", "mkv"],
            Category::Other => &[],
        }
    }

    /// Returns the folder of this category under `root`.
    pub fn folder(&self, root: &Path) -> PathBuf {
        root.join(self.dir_name())
    }
}

/// Maps file extensions to categories.
///
/// Built once at startup and shared by reference with every worker.
#[derive(Debug, Clone)]
pub struct CategoryTable {
    extension_map: HashMap<&'static str, Category>,
}

impl CategoryTable {
    /// Creates the table from the fixed per-category extension lists.
    pub fn new() -> Self {
        let extension_map = Category::ALL
            .iter()
            .flat_map(|category| {
                category
                    .extensions()
                    .iter()
                    .map(move |ext| (*ext, *category))
            })
            .collect();
        Self { extension_map }
    }

    /// Maps a bare extension (no dot) to a category, case-insensitively.
    ///
    /// ```
    /// use junksort::file_category::{Category, CategoryTable};
    ///
    /// let table = CategoryTable::default();
    /// assert_eq!(table.extension_to_category("PDF"), Some(Category::Document));
    /// assert_eq!(table.extension_to_category("rs"), None);
    /// ```
    pub fn extension_to_category(&self, ext: &str) -> Option<Category> {
        self.extension_map.get(ext.to_lowercase().as_str()).copied()
    }

    /// Returns the category of a file name. Never fails.
    pub fn categorize(&self, file_name: &str) -> Category {
        let (_, ext) = split_extension(file_name);
        let ext = ext.trim_start_matches('.');

        if !ext.is_empty()
            && let Some(category) = self.extension_to_category(ext)
        {
            return category;
        }

        Category::Other
    }

    /// Returns the absolute destination folder of `file_name` under `root`.
    pub fn destination(&self, root: &Path, file_name: &str) -> PathBuf {
        self.categorize(file_name).folder(root)
    }

    /// Finds the category whose folder is exactly `dir`, if any.
    pub fn category_of_folder(&self, root: &Path, dir: &Path) -> Option<Category> {
        Category::ALL
            .iter()
            .copied()
            .find(|category| category.folder(root) == dir)
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_dir_names() {
        assert_eq!(Category::Archive.dir_name(), "archives");
        assert_eq!(Category::Audio.dir_name(), "audio");
        assert_eq!(Category::Document.dir_name(), "documents");
        assert_eq!(Category::Image.dir_name(), "images");
        assert_eq!(Category::Video.dir_name(), "video");
        assert_eq!(Category::Other.dir_name(), "other");
    }

    #[test]
    fn test_dir_names_are_unique_and_lowercase() {
        let mut names: Vec<_> = Category::ALL.iter().map(|c| c.dir_name()).collect();
        assert!(names.iter().all(|n| n.to_lowercase() == *n));
        names.sort();
        names.dedup();
        assert_eq!(names.len(), Category::ALL.len());
    }

    #[test]
    fn test_every_extension_maps_back_to_its_category() {
        let table = CategoryTable::default();
        for category in Category::ALL {
            for ext in category.extensions() {
                assert_eq!(table.extension_to_category(ext), Some(category));
                assert_eq!(
                    table.categorize(&format!("file.{}", ext.to_uppercase())),
                    category
                );
            }
        }
    }

    #[test]
    fn test_categorize_defaults_to_other() {
        let table = CategoryTable::default();
        assert_eq!(table.categorize("Makefile"), Category::Other);
        assert_eq!(table.categorize("script.rs"), Category::Other);
        assert_eq!(table.categorize("trailing."), Category::Other);
        assert_eq!(table.categorize(".zip"), Category::Other);
    }

    #[test]
    fn test_categorize_uses_last_extension() {
        let table = CategoryTable::default();
        assert_eq!(table.categorize("backup.tar.gz"), Category::Archive);
        assert_eq!(table.categorize("notes.txt.mp3"), Category::Audio);
    }

    #[test]
    fn test_destination_is_under_root() {
        let table = CategoryTable::default();
        let root = Path::new("/data/junk");
        assert_eq!(
            table.destination(root, "clip.MKV"),
            PathBuf::from("/data/junk/video")
        );
        assert_eq!(
            table.destination(root, "thing.bin"),
            PathBuf::from("/data/junk/other")
        );
    }

    #[test]
    fn test_category_of_folder() {
        let table = CategoryTable::default();
        let root = Path::new("/data/junk");
        assert_eq!(
            table.category_of_folder(root, Path::new("/data/junk/images")),
            Some(Category::Image)
        );
        assert_eq!(
            table.category_of_folder(root, Path::new("/data/junk/holiday")),
            None
        );
    }
}
