//! Command-line orchestration for dirsort.
//!
//! Ties the pieces together for one run:
//! - target validation
//! - configuration loading
//! - planning and moving files
//! - writing the move log
//! - console, progress and JSON output

use crate::config::{Config, ConfigError};
use crate::file_category::CategoryTable;
use crate::file_organizer::{
    CategoryFolders, FileOrganizer, MoveRecord, OrganizeError, PlannedMove,
};
use crate::move_log::MoveLog;
use crate::output::OutputFormatter;
use indicatif::ProgressBar;
use serde::Serialize;
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Question asked when no directory is given on the command line.
pub const DIRECTORY_PROMPT: &str = "Enter the directory to organize: ";

/// Reported when a run finishes, including runs that had nothing to move.
pub const COMPLETION_MESSAGE: &str = "File organization complete!";

/// Reported when a dry run finishes.
pub const DRY_RUN_COMPLETION_MESSAGE: &str = "Dry run complete. No files were modified.";

/// Errors surfaced to the user by a CLI run.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Organize(#[from] OrganizeError),

    #[error("Error loading configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Error writing JSON summary: {0}")]
    Json(#[from] serde_json::Error),
}

/// Options for a single run.
#[derive(Debug, Clone, Default)]
pub struct OrganizeOptions {
    /// Only report what would happen.
    pub dry_run: bool,
    /// Print the run summary as JSON instead of console messages.
    pub json: bool,
    /// Overrides the configured log root.
    pub log_root: Option<PathBuf>,
}

/// What a run did (or, for a dry run, would do).
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub target: PathBuf,
    pub dry_run: bool,
    pub moves: Vec<MoveRecord>,
    /// The move log, if anything was written to it.
    pub log_file: Option<PathBuf>,
    pub category_counts: BTreeMap<String, usize>,
    /// Set once the run has finished without error.
    pub completion: Option<&'static str>,
}

impl RunSummary {
    fn new(target: &Path, dry_run: bool) -> Self {
        Self {
            target: target.to_path_buf(),
            dry_run,
            moves: Vec::new(),
            log_file: None,
            category_counts: BTreeMap::new(),
            completion: None,
        }
    }

    fn push(&mut self, record: MoveRecord) {
        *self
            .category_counts
            .entry(record.category.clone())
            .or_insert(0) += 1;
        self.moves.push(record);
    }

    /// Number of files moved (or planned to move).
    pub fn moved_count(&self) -> usize {
        self.moves.len()
    }
}

/// Runs dirsort on `dir_path`, looking up configuration in the default places.
///
/// # Examples
///
/// ```no_run
/// use dirsort::cli::{run_cli, OrganizeOptions};
/// use std::path::Path;
///
/// match run_cli(Path::new("/path/to/directory"), &OrganizeOptions::default()) {
///     Ok(summary) => println!("Moved {} files", summary.moved_count()),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_cli(dir_path: &Path, options: &OrganizeOptions) -> Result<RunSummary, CliError> {
    run_cli_with_config(dir_path, options, None)
}

/// Runs dirsort on `dir_path` with an optional explicit configuration file.
///
/// The target is validated before anything else so that a bad path never
/// leads to side effects. With `options.json` set, the summary is printed as
/// JSON on stdout.
pub fn run_cli_with_config(
    dir_path: &Path,
    options: &OrganizeOptions,
    config_path: Option<&Path>,
) -> Result<RunSummary, CliError> {
    FileOrganizer::validate_target(dir_path)?;

    let config = Config::load(config_path)?;
    let filters = config.filters.compile()?;
    let organizer = FileOrganizer::new(CategoryTable::default(), filters);
    let log_root = options.log_root.as_deref().unwrap_or(config.log.root.as_path());

    let summary = if options.dry_run {
        organize_directory_dry_run(dir_path, &organizer, options)?
    } else {
        organize_directory(dir_path, &organizer, log_root, options)?
    };

    if options.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(summary)
}

/// Moves every eligible file of `base_path` into its category folder.
///
/// The move log path under `log_root` is fixed when the run starts. The first
/// failing move or log write stops the run; files moved before it stay moved
/// and logged.
pub fn organize_directory(
    base_path: &Path,
    organizer: &FileOrganizer,
    log_root: &Path,
    options: &OrganizeOptions,
) -> Result<RunSummary, CliError> {
    let planned = organizer.plan(base_path)?;
    tracing::info!(
        target_dir = %base_path.display(),
        files = planned.len(),
        "organizing directory"
    );

    if !options.json {
        OutputFormatter::info(&format!("Organizing contents of: {}", base_path.display()));
    }

    let mut summary = RunSummary::new(base_path, false);
    let mut folders = CategoryFolders::new(base_path);
    let mut log = MoveLog::start(log_root);

    let pb = if options.json {
        ProgressBar::hidden()
    } else {
        OutputFormatter::create_progress_bar(planned.len() as u64)
    };

    for item in &planned {
        if let Err(e) = move_and_log(organizer, item, &mut folders, &mut log, &mut summary) {
            pb.abandon();
            tracing::info!(
                moved = summary.moved_count(),
                remaining = planned.len() - summary.moved_count(),
                "run stopped after a failure"
            );
            return Err(e.into());
        }

        if !options.json {
            pb.suspend(|| OutputFormatter::moved(&item.file_name, &item.category));
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    summary.log_file = written_log(&log);
    summary.completion = Some(COMPLETION_MESSAGE);
    tracing::info!(
        moved = summary.moved_count(),
        folders = folders.len(),
        "organization complete"
    );

    if !options.json {
        if !summary.category_counts.is_empty() {
            OutputFormatter::summary_table(&summary.category_counts);
        }
        if let Some(path) = &summary.log_file {
            OutputFormatter::info(&format!("Log written to {}", path.display()));
        }
        OutputFormatter::success(COMPLETION_MESSAGE);
    }

    Ok(summary)
}

/// Reports how `base_path` would be organized without touching anything.
pub fn organize_directory_dry_run(
    base_path: &Path,
    organizer: &FileOrganizer,
    options: &OrganizeOptions,
) -> Result<RunSummary, CliError> {
    let planned = organizer.plan(base_path)?;
    let mut summary = RunSummary::new(base_path, true);

    if !options.json {
        OutputFormatter::info(&format!("DRY RUN: Analyzing contents of: {}", base_path.display()));
    }

    for item in planned {
        if !options.json {
            OutputFormatter::would_move(&item.file_name, &item.category);
        }
        let destination = base_path.join(&item.category).join(
            item.source
                .file_name()
                .unwrap_or_else(|| OsStr::new(&item.file_name)),
        );
        summary.push(MoveRecord {
            file_name: item.file_name,
            category: item.category,
            destination,
        });
    }

    summary.completion = Some(DRY_RUN_COMPLETION_MESSAGE);
    if !options.json {
        if summary.moves.is_empty() {
            OutputFormatter::warning("No files found to organize.");
        } else {
            OutputFormatter::summary_table(&summary.category_counts);
        }
        OutputFormatter::success(DRY_RUN_COMPLETION_MESSAGE);
    }

    Ok(summary)
}

/// Asks for the directory to organize on `output` and reads the answer from
/// `input`. Returns `None` for an empty answer.
pub fn prompt_for_directory<R: BufRead, W: Write>(
    mut input: R,
    mut output: W,
) -> io::Result<Option<PathBuf>> {
    write!(output, "{}", DIRECTORY_PROMPT)?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    let answer = line.trim();

    Ok((!answer.is_empty()).then(|| PathBuf::from(answer)))
}

fn move_and_log(
    organizer: &FileOrganizer,
    item: &PlannedMove,
    folders: &mut CategoryFolders,
    log: &mut MoveLog,
    summary: &mut RunSummary,
) -> Result<(), OrganizeError> {
    let record = organizer.execute(item, folders)?;
    summary.push(record);

    log.record(&item.file_name, &item.category)
        .map_err(|source| OrganizeError::LogWriteFailed {
            path: log.path().to_path_buf(),
            source,
        })
}

fn written_log(log: &MoveLog) -> Option<PathBuf> {
    log.is_written().then(|| log.path().to_path_buf())
}
