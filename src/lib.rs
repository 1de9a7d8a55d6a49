//! Core library entry for the `promptlink` CLI.
//!
//! Links a per-language set of agent files and skill directories into an
//! assistant's configuration directory, idempotently and without ever
//! overwriting files it did not create.

pub mod adapters;
pub mod cassette;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod enumerate;
pub mod error;
pub mod logging;
pub mod ports;
pub mod prune;
pub mod reconcile;
pub mod report;

use clap::error::ErrorKind;
use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// `--help` and `--version` print to stdout and return `Ok`.
///
/// # Errors
///
/// Returns an error string when argument parsing fails, configuration is
/// invalid, or any entry conflicted or failed to link.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match cli::Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            print!("{err}");
            return Ok(());
        }
        Err(err) => return Err(err.to_string().trim_end().to_string()),
    };
    logging::init_logging(if cli.verbose { "debug" } else { "warn" });
    commands::dispatch(&cli)
}
