//! Binary entrypoint for the `promptlink` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    // PROMPTLINK_* settings may come from a local .env file.
    dotenvy::dotenv().ok();

    match promptlink::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
