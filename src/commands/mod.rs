//! Command dispatch and handlers.

pub mod link;

use std::env;
use std::path::PathBuf;

use crate::cli::Cli;
use crate::context::ServiceContext;

/// Environment variable that enables recording of filesystem calls.
pub const RECORD_ENV: &str = "PROMPTLINK_RECORD";

/// Dispatch a parsed command line to the link handler.
///
/// When `PROMPTLINK_RECORD` is set to a file path, every filesystem call is
/// recorded to a cassette at that path.
///
/// # Errors
///
/// Returns an error string if configuration is invalid, if any entry
/// conflicted or failed, or if the cassette cannot be written.
pub fn dispatch(cli: &Cli) -> Result<(), String> {
    let ctx = match env::var_os(RECORD_ENV) {
        Some(path) => ServiceContext::recording(&PathBuf::from(path)),
        None => ServiceContext::live(),
    };

    let result = link::run_with_context(&ctx, cli.settings(), cli.format);

    // Finish recording after the command completes (even on error)
    if let Some(path) = ctx.finish().map_err(|e| e.to_string())? {
        eprintln!("Recording saved to: {}", path.display());
    }

    result
}
