//! Flag format validation.
//!
//! Checks the synthesized argument surface before it is handed to the
//! argument parser: malformed long flags (bad prefixes, whitespace, `=`),
//! short letters the parser cannot accept, names reserved for help output,
//! and duplicate spellings.
//!
//! # Examples
//!
//! ```
//! use schema_args_core::*;
//!
//! let mut spec = ArgumentSpec {
//!     path: FlatPath::root("name"),
//!     long: "--name".into(),
//!     disable: None,
//!     aliases: Vec::new(),
//!     short: Some('n'),
//!     arity: Arity::Single,
//!     converter: Converter::Scalar(ScalarKind::String),
//!     required: true,
//!     default: None,
//!     help: None,
//!     group: "Config".into(),
//! };
//! assert!(validate_arguments(std::slice::from_ref(&spec)).is_ok());
//!
//! // Long flag missing its leading dashes
//! spec.long = "name".into();
//! assert!(validate_arguments(&[spec]).is_err());
//! ```

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::types::ArgumentSpec;

const RESERVED_LONGS: [&str; 1] = ["help"];

/// Validates every flag spelling of `arguments`, stopping at the first
/// problem.
///
/// # Errors
///
/// Returns [`Error::InvalidFlag`] naming the offending flag.
pub fn validate_arguments(arguments: &[ArgumentSpec]) -> Result<()> {
    let mut seen = HashSet::new();

    for argument in arguments {
        let longs = std::iter::once(&argument.long)
            .chain(argument.disable.as_ref())
            .chain(&argument.aliases);
        for long in longs {
            validate_long(long)?;
            if !seen.insert(long.clone()) {
                return Err(Error::invalid_flag(long, "flag is declared twice"));
            }
        }

        if let Some(short) = argument.short {
            if !short.is_ascii_alphanumeric() {
                return Err(Error::invalid_flag(
                    format!("-{short}"),
                    "short flags must be a single ASCII letter or digit",
                ));
            }
            if !seen.insert(format!("-{short}")) {
                return Err(Error::invalid_flag(format!("-{short}"), "flag is declared twice"));
            }
        }
    }

    Ok(())
}

/// Returns `true` for long names (without dashes) the parser keeps for itself.
pub(crate) fn is_reserved_long(name: &str) -> bool {
    RESERVED_LONGS.contains(&name)
}

fn validate_long(long: &str) -> Result<()> {
    let Some(name) = long.strip_prefix("--") else {
        return Err(Error::invalid_flag(long, "long flags must start with `--`"));
    };
    if name.is_empty() || name.starts_with('-') {
        return Err(Error::invalid_flag(long, "long flag has no name after `--`"));
    }
    if name.chars().any(|c| c.is_whitespace() || c == '=') {
        return Err(Error::invalid_flag(
            long,
            "long flags cannot contain whitespace or `=`",
        ));
    }
    if is_reserved_long(name) {
        return Err(Error::invalid_flag(long, "flag is reserved for help output"));
    }
    Ok(())
}
