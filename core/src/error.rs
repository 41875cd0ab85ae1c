//! Error types for schema compilation and value reconstruction.
//!
//! Compile-time failures ([`Error::Schema`], [`Error::Collision`],
//! [`Error::InvalidFlag`]) abort compilation before anything is handed to the
//! argument parser. Invocation-time failures ([`Error::Conflict`],
//! [`Error::Validation`]) never leave a partially reconstructed value behind.

use thiserror::Error;

/// Errors raised while compiling a schema or rebuilding a value from it.
#[derive(Debug, Error)]
pub enum Error {
    /// A field's type cannot be mapped onto a command-line argument.
    #[error("unsupported schema for field `{field}`: {reason}")]
    Schema { field: String, reason: String },

    /// Two distinct field chains flatten to the same path or flag.
    #[error("flag collision on `{path}`: produced by both {first} and {second}")]
    Collision {
        path: String,
        first: String,
        second: String,
    },

    /// Both halves of a boolean flag pair were given in one invocation.
    #[error("conflicting flags for `{path}`: {enable} and {disable} cannot be used together")]
    Conflict {
        path: String,
        enable: String,
        disable: String,
    },

    /// The reconstructed value was rejected by the schema's constraints.
    #[error("validation failed at `{path}`: {message}")]
    Validation { path: String, message: String },

    /// The invoked command has no registration.
    #[error("command not found: {0}")]
    CommandNotFound(String),

    /// A command name was registered twice.
    #[error("duplicate command: {0}")]
    DuplicateCommand(String),

    /// Root and named commands were mixed, or nothing was registered.
    #[error("invalid command registration: {0}")]
    InvalidRegistration(String),

    /// A flag name or prefix is malformed or reserved by the parser.
    #[error("invalid flag `{flag}`: {reason}")]
    InvalidFlag { flag: String, reason: String },

    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    pub(crate) fn schema(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Schema {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn validation(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            path: path.into(),
            message: message.into(),
        }
    }

    pub(crate) fn invalid_flag(flag: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFlag {
            flag: flag.into(),
            reason: reason.into(),
        }
    }

    /// Returns `true` for errors that can only be raised while compiling.
    pub fn is_compile_error(&self) -> bool {
        matches!(
            self,
            Self::Schema { .. } | Self::Collision { .. } | Self::InvalidFlag { .. }
        )
    }
}

/// Convenience alias for results with [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
