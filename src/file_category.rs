//! Extension-based file classification.
//!
//! A [`CategoryTable`] is an ordered list of named categories, each owning a set
//! of lowercase extensions (dot included), plus one fallback category that
//! catches everything else. The table is an immutable value: build one with
//! [`CategoryTable::new`] or take the standard one from `Default`.
//!
//! # Examples
//!
//! ```
//! use dirsort::file_category::CategoryTable;
//!
//! let table = CategoryTable::default();
//! assert_eq!(table.classify("holiday.JPG"), "Images");
//! assert_eq!(table.classify("notes.txt"), "Documents");
//! assert_eq!(table.classify("Makefile"), "Others");
//! ```

use std::collections::HashSet;

/// Name of the fallback category in the standard table.
pub const FALLBACK_CATEGORY: &str = "Others";

/// A named bucket of file extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    name: String,
    extensions: HashSet<String>,
}

impl Category {
    /// Creates a category from a name and its extensions.
    ///
    /// Extensions are normalized to lowercase with a leading dot, so `"JPG"`
    /// and `".jpg"` are the same entry.
    pub fn new<I, S>(name: impl Into<String>, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name: name.into(),
            extensions: extensions
                .into_iter()
                .map(|ext| normalize_extension(ext.as_ref()))
                .collect(),
        }
    }

    /// The folder name files of this category are moved into.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if `extension` (normalized form, e.g. `".png"`) belongs here.
    pub fn contains(&self, extension: &str) -> bool {
        self.extensions.contains(extension)
    }
}

/// Ordered category lookup with a fallback.
#[derive(Debug, Clone)]
pub struct CategoryTable {
    categories: Vec<Category>,
    fallback: String,
}

impl CategoryTable {
    /// Creates a table from categories in lookup order and a fallback name.
    ///
    /// When extension sets overlap, the earliest category wins.
    pub fn new(categories: Vec<Category>, fallback: impl Into<String>) -> Self {
        Self {
            categories,
            fallback: fallback.into(),
        }
    }

    /// The standard table: images, videos, documents, music and archives.
    pub fn standard() -> Self {
        Self::new(
            vec![
                Category::new("Images", [".jpg", ".jpeg", ".png", ".gif"]),
                Category::new("Videos", [".mp4", ".mkv", ".avi", ".mov"]),
                Category::new("Documents", [".pdf", ".docx", ".txt", ".xlsx", ".pptx"]),
                Category::new("Music", [".mp3", ".wav", ".flac"]),
                Category::new("Archives", [".zip", ".rar", ".7z", ".tar"]),
            ],
            FALLBACK_CATEGORY,
        )
    }

    /// Categories in lookup order, excluding the fallback.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Name of the category used when nothing else matches.
    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Maps a normalized extension to a category name, if any category claims it.
    ///
    /// # Examples
    ///
    /// ```
    /// use dirsort::file_category::CategoryTable;
    ///
    /// let table = CategoryTable::default();
    /// assert_eq!(table.extension_to_category(".flac"), Some("Music"));
    /// assert_eq!(table.extension_to_category(".xyz"), None);
    /// ```
    pub fn extension_to_category(&self, extension: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|category| category.contains(extension))
            .map(Category::name)
    }

    /// Determines the category for a file name.
    ///
    /// The extension is everything from the last `.` on, lower-cased. Leading
    /// dots do not start an extension, so `.bashrc` has none. Files without a
    /// recognized extension land in the fallback category.
    pub fn classify(&self, file_name: &str) -> &str {
        extension_of(file_name)
            .and_then(|ext| self.extension_to_category(&ext))
            .unwrap_or(self.fallback.as_str())
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Extracts the lowercase extension of `file_name`, dot included.
///
/// Returns `None` when the name has no dot after its leading dots.
pub fn extension_of(file_name: &str) -> Option<String> {
    let stem_start = file_name.len() - file_name.trim_start_matches('.').len();
    let dot = file_name[stem_start..].rfind('.')?;
    Some(file_name[stem_start + dot..].to_lowercase())
}

fn normalize_extension(ext: &str) -> String {
    let ext = ext.to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{}", ext)
    }
}
