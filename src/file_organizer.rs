//! Scanning a directory and moving its files into category folders.
//!
//! [`FileOrganizer`] pairs a [`CategoryTable`] with the compiled exclusion
//! filters. It only looks at the direct entries of the target directory, so
//! files already sorted into category folders are never touched again.

use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::CompiledFilters;
use crate::file_category::CategoryTable;

/// Errors that can occur during file organization.
#[derive(Debug, Error)]
pub enum OrganizeError {
    #[error("The directory {} does not exist!", .path.display())]
    TargetNotFound { path: PathBuf },

    #[error("{} is not a directory", .path.display())]
    TargetNotDirectory { path: PathBuf },

    #[error("Error reading directory {}: {source}", .path.display())]
    ReadDirFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to create directory {}: {source}", .path.display())]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to move {} to {}: {source}", .from.display(), .to.display())]
    FileMoveFailure {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write move log {}: {source}", .path.display())]
    LogWriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type for file organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// A file found in the target directory and the category it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMove {
    /// File name as shown to the user and written to the log.
    pub file_name: String,
    /// Current location of the file.
    pub source: PathBuf,
    /// Category folder the file goes into.
    pub category: String,
}

/// A completed move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveRecord {
    pub file_name: String,
    pub category: String,
    pub destination: PathBuf,
}

/// Category folders known to exist under one target directory.
///
/// Avoids an existence check per file once a folder has been seen or created.
#[derive(Debug)]
pub struct CategoryFolders {
    root: PathBuf,
    known: HashSet<String>,
}

impl CategoryFolders {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            known: HashSet::new(),
        }
    }

    /// Returns the folder for `category`, creating it if needed.
    pub fn ensure(&mut self, category: &str) -> OrganizeResult<PathBuf> {
        let path = self.root.join(category);
        if self.known.contains(category) {
            return Ok(path);
        }

        if !path.is_dir() {
            fs::create_dir(&path).map_err(|source| OrganizeError::DirectoryCreationFailed {
                path: path.clone(),
                source,
            })?;
            tracing::debug!(path = %path.display(), "created category folder");
        }

        self.known.insert(category.to_string());
        Ok(path)
    }

    /// Number of folders seen or created so far.
    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}

/// Sorts the direct entries of a directory into category folders.
#[derive(Debug, Clone, Default)]
pub struct FileOrganizer {
    table: CategoryTable,
    filters: CompiledFilters,
}

impl FileOrganizer {
    /// Creates an organizer with the given table and filters.
    pub fn new(table: CategoryTable, filters: CompiledFilters) -> Self {
        Self { table, filters }
    }

    /// Creates an organizer that considers every file.
    pub fn with_table(table: CategoryTable) -> Self {
        Self::new(table, CompiledFilters::default())
    }

    pub fn table(&self) -> &CategoryTable {
        &self.table
    }

    /// Checks that `target` exists and is a directory.
    pub fn validate_target(target: &Path) -> OrganizeResult<()> {
        if !target.exists() {
            return Err(OrganizeError::TargetNotFound {
                path: target.to_path_buf(),
            });
        }
        if !target.is_dir() {
            return Err(OrganizeError::TargetNotDirectory {
                path: target.to_path_buf(),
            });
        }
        Ok(())
    }

    /// Lists the files of `target` that would be moved, sorted by name.
    ///
    /// Directories (and symlinks to directories) are skipped, as are files the
    /// filters exclude. Nothing on disk is changed.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dirsort::file_organizer::FileOrganizer;
    /// use std::path::Path;
    ///
    /// let organizer = FileOrganizer::default();
    /// for planned in organizer.plan(Path::new("/home/user/Downloads"))? {
    ///     println!("{} -> {}/", planned.file_name, planned.category);
    /// }
    /// # Ok::<(), dirsort::file_organizer::OrganizeError>(())
    /// ```
    pub fn plan(&self, target: &Path) -> OrganizeResult<Vec<PlannedMove>> {
        Self::validate_target(target)?;

        let entries = fs::read_dir(target).map_err(|source| OrganizeError::ReadDirFailed {
            path: target.to_path_buf(),
            source,
        })?;

        let mut planned = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| OrganizeError::ReadDirFailed {
                path: target.to_path_buf(),
                source,
            })?;
            let source = entry.path();
            if source.is_dir() {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy().into_owned();
            if self.filters.excludes(&file_name) {
                tracing::debug!(file = %file_name, "excluded by filters");
                continue;
            }

            let category = self.table.classify(&file_name).to_string();
            tracing::debug!(file = %file_name, category = %category, "classified");
            planned.push(PlannedMove {
                file_name,
                source,
                category,
            });
        }

        planned.sort_by(|a, b| a.source.cmp(&b.source));
        Ok(planned)
    }

    /// Moves one planned file into its category folder.
    ///
    /// The move is a rename; if source and destination live on different
    /// devices it falls back to copy and delete. A file of the same name in the
    /// destination folder is handled however the platform rename does it.
    pub fn execute(
        &self,
        planned: &PlannedMove,
        folders: &mut CategoryFolders,
    ) -> OrganizeResult<MoveRecord> {
        let category_path = folders.ensure(&planned.category)?;

        let name = planned
            .source
            .file_name()
            .ok_or_else(|| OrganizeError::FileMoveFailure {
                from: planned.source.clone(),
                to: category_path.clone(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "file has no name component"),
            })?;
        let destination = category_path.join(name);

        move_file(&planned.source, &destination).map_err(|source| {
            OrganizeError::FileMoveFailure {
                from: planned.source.clone(),
                to: destination.clone(),
                source,
            }
        })?;
        tracing::debug!(
            from = %planned.source.display(),
            to = %destination.display(),
            "moved file"
        );

        Ok(MoveRecord {
            file_name: planned.file_name.clone(),
            category: planned.category.clone(),
            destination,
        })
    }
}

/// Renames `from` to `to`, copying across devices when a rename cannot.
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            tracing::warn!(
                from = %from.display(),
                to = %to.display(),
                "rename crosses devices, copying instead"
            );
            copy_then_remove(from, to)
        }
        other => other,
    }
}

/// Moves `from` to `to` by copying, for when the two are on different devices.
///
/// A symlink is recreated at `to` rather than followed, so dangling links move
/// too. A regular file keeps its modification time. If the copy fails, nothing
/// is left at `to` and `from` is untouched.
fn copy_then_remove(from: &Path, to: &Path) -> io::Result<()> {
    let metadata = fs::symlink_metadata(from)?;
    if metadata.file_type().is_symlink() {
        copy_symlink(from, to)?;
    } else {
        copy_file(from, to, &metadata)?;
    }
    fs::remove_file(from)
}

#[cfg(unix)]
fn copy_symlink(from: &Path, to: &Path) -> io::Result<()> {
    let link_target = fs::read_link(from)?;
    // rename replaces an existing destination entry, so the copy does too.
    if fs::symlink_metadata(to).is_ok_and(|existing| !existing.is_dir()) {
        fs::remove_file(to)?;
    }
    std::os::unix::fs::symlink(link_target, to)
}

#[cfg(not(unix))]
fn copy_symlink(from: &Path, to: &Path) -> io::Result<()> {
    copy_file(from, to, &fs::metadata(from)?)
}

fn copy_file(from: &Path, to: &Path, metadata: &fs::Metadata) -> io::Result<()> {
    let copied = fs::copy(from, to).and_then(|_| {
        let modified = metadata.modified()?;
        fs::File::open(to)?.set_modified(modified)
    });

    if let Err(e) = copied {
        if let Err(cleanup) = fs::remove_file(to)
            && cleanup.kind() != io::ErrorKind::NotFound
        {
            tracing::warn!(
                path = %to.display(),
                error = %cleanup,
                "could not remove partial copy"
            );
        }
        return Err(e);
    }
    Ok(())
}
