//! Shared plumbing for the runnable demos.

use schema_args::{App, CliError};

/// Runs `app` against the process arguments, exiting like a regular CLI:
/// clap usage errors and `--help` through clap, everything else as
/// `error: <message>` with status 1.
pub fn run_or_exit(app: &App) {
    match app.run() {
        Ok(()) => {}
        Err(CliError::Parse(err)) => err.exit(),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}
