//! dirsort - sort a directory's files into category folders by extension
//!
//! This library classifies files by extension, moves the direct entries of a
//! directory into category subfolders, and records every move in a
//! date-partitioned log.

pub mod cli;
pub mod config;
pub mod file_category;
pub mod file_organizer;
pub mod move_log;
pub mod output;

pub use config::{CompiledFilters, Config, ConfigError, FilterRules};
pub use file_category::{Category, CategoryTable};
pub use file_organizer::{FileOrganizer, MoveRecord, OrganizeError};
pub use move_log::MoveLog;

pub use cli::{CliError, OrganizeOptions, RunSummary, run_cli, run_cli_with_config};
