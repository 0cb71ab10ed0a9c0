//! Date-partitioned, append-only log of file moves.
//!
//! Every run writes to one file under
//! `<root>/<YYYY>/<MM>/<DD>/log <MM-DD-YYYY hh-mmAM|PM>.txt`, where the date and
//! time are taken once when the run starts. Each move becomes a single line:
//!
//! ```text
//! [2024-03-07 14:05:31] Moved photo.jpg -> Images/
//! ```
//!
//! The file and its parent directories are only created when the first entry
//! is recorded, so a run that moves nothing leaves no trace on disk.

use chrono::{Local, NaiveDateTime};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Default log root, relative to the working directory.
pub const DEFAULT_LOG_ROOT: &str = "log";

const ENTRY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const FILE_TIMESTAMP_FORMAT: &str = "%m-%d-%Y %I-%M%p";

/// Builds the log file path for a run that started at `started`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use dirsort::move_log::log_file_path;
/// use std::path::Path;
///
/// let started = NaiveDate::from_ymd_opt(2024, 3, 7)
///     .unwrap()
///     .and_hms_opt(14, 5, 0)
///     .unwrap();
/// assert_eq!(
///     log_file_path(Path::new("log"), started),
///     Path::new("log/2024/03/07/log 03-07-2024 02-05PM.txt")
/// );
/// ```
pub fn log_file_path(root: &Path, started: NaiveDateTime) -> PathBuf {
    root.join(started.format("%Y").to_string())
        .join(started.format("%m").to_string())
        .join(started.format("%d").to_string())
        .join(format!("log {}.txt", started.format(FILE_TIMESTAMP_FORMAT)))
}

/// Formats one log line, without the trailing newline.
pub fn format_entry(at: NaiveDateTime, file_name: &str, category: &str) -> String {
    format!(
        "[{}] Moved {} -> {}/",
        at.format(ENTRY_TIMESTAMP_FORMAT),
        file_name,
        category
    )
}

/// The log of a single run.
///
/// The path is fixed at construction; the file handle is opened on the first
/// [`MoveLog::record`] and kept for the rest of the run.
#[derive(Debug)]
pub struct MoveLog {
    path: PathBuf,
    file: Option<File>,
    entries: usize,
}

impl MoveLog {
    /// Starts a run log under `root`, stamped with the current local time.
    pub fn start(root: &Path) -> Self {
        Self::start_at(root, Local::now().naive_local())
    }

    /// Starts a run log under `root`, stamped with `started`.
    pub fn start_at(root: &Path, started: NaiveDateTime) -> Self {
        let path = log_file_path(root, started);
        tracing::debug!(path = %path.display(), "move log path fixed for this run");
        Self {
            path,
            file: None,
            entries: 0,
        }
    }

    /// Path of this run's log file. It may not exist yet.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of entries written so far.
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Returns true once at least one entry was written.
    pub fn is_written(&self) -> bool {
        self.entries > 0
    }

    /// Appends an entry stamped with the current local time.
    pub fn record(&mut self, file_name: &str, category: &str) -> io::Result<()> {
        self.record_at(Local::now().naive_local(), file_name, category)
    }

    /// Appends an entry stamped with `at`.
    pub fn record_at(&mut self, at: NaiveDateTime, file_name: &str, category: &str) -> io::Result<()> {
        let mut line = format_entry(at, file_name, category);
        line.push('\n');

        // One write per line so a concurrent reader never sees half an entry.
        self.file()?.write_all(line.as_bytes())?;
        self.entries += 1;
        Ok(())
    }

    fn file(&mut self) -> io::Result<&mut File> {
        if self.file.is_none() {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)?;
            self.file = Some(file);
        }

        self.file
            .as_mut()
            .ok_or_else(|| io::Error::other("move log file is not open"))
    }
}
