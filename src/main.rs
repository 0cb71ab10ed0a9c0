use clap::{ArgAction, Parser};
use dirsort::cli::{OrganizeOptions, prompt_for_directory, run_cli_with_config};
use dirsort::output::OutputFormatter;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Sort the files of a directory into category subfolders by extension.
#[derive(Debug, Parser)]
#[command(name = "dirsort", version, about)]
struct Cli {
    /// Directory to organize. Asked for interactively when omitted.
    directory: Option<PathBuf>,

    /// Show what would be moved without changing anything.
    #[arg(long)]
    dry_run: bool,

    /// Print the run summary as JSON.
    #[arg(long)]
    json: bool,

    /// Configuration file to use instead of the default lookup.
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Root of the move log tree (default: ./log).
    #[arg(long, value_name = "PATH")]
    log_dir: Option<PathBuf>,

    /// More diagnostic output on stderr (-v, -vv).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let directory = match cli.directory {
        Some(dir) => dir,
        None => match prompt_for_directory(io::stdin().lock(), io::stdout()) {
            Ok(Some(dir)) => dir,
            Ok(None) => {
                OutputFormatter::error("Invalid directory path. Please try again.");
                return ExitCode::FAILURE;
            }
            Err(e) => {
                OutputFormatter::error(&format!("Could not read directory path: {}", e));
                return ExitCode::FAILURE;
            }
        },
    };

    let options = OrganizeOptions {
        dry_run: cli.dry_run,
        json: cli.json,
        log_root: cli.log_dir,
    };

    match run_cli_with_config(&directory, &options, cli.config.as_deref()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            OutputFormatter::error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
