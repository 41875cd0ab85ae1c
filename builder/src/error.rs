//! Error type for command-line building, parsing and dispatch.

use thiserror::Error;

/// Boxed error returned by command handlers.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised by [`App`](crate::App) and the clap glue.
#[derive(Debug, Error)]
pub enum CliError {
    /// Compilation, conflict or reconstruction failure.
    #[error(transparent)]
    Core(#[from] schema_args_core::Error),

    /// clap rejected the command line (also carries `--help` output).
    #[error(transparent)]
    Parse(#[from] clap::Error),

    /// Parsed matches did not contain what the registered arguments declare.
    #[error("argument lookup failed: {0}")]
    Matches(#[from] clap::parser::MatchesError),

    /// A command handler returned an error.
    #[error("command handler failed: {0}")]
    Handler(HandlerError),
}

impl CliError {
    /// Returns the clap error if this is a command-line parse failure.
    pub fn as_parse_error(&self) -> Option<&clap::Error> {
        match self {
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

/// Convenience alias for results with [`CliError`].
pub type Result<T> = std::result::Result<T, CliError>;
