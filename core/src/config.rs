//! Command-line generation settings.
//!
//! [`CliConfig`] holds the knobs that apply to a whole compilation: boolean
//! flag prefixes, the word separator used in long flags, short-flag
//! synthesis, excluded paths, and per-path [`CliOverrides`].
//!
//! # Example YAML
//!
//! ```yaml
//! enable_prefix: "--on-"
//! disable_prefix: "--off-"
//! separator: kebab
//! auto_short: true
//! reserved_shorts: [v]
//! exclude:
//!   - internal.token
//! overrides:
//!   child.name:
//!     long: child-name
//!     short: c
//! ```

use std::collections::BTreeMap;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{CliOverrides, FlatPath};

/// Default prefix of the flag that forces a boolean to `true`.
pub const DEFAULT_ENABLE_PREFIX: &str = "--enable-";
/// Default prefix of the flag that forces a boolean to `false`.
pub const DEFAULT_DISABLE_PREFIX: &str = "--disable-";

/// Word separator used when turning field names into long flags.
///
/// # Examples
///
/// ```
/// use schema_args_core::Separator;
///
/// assert_eq!(Separator::default(), Separator::Kebab);
/// assert_eq!(Separator::Snake.as_char(), '_');
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Separator {
    /// `is_active` → `is-active`.
    #[default]
    Kebab,
    /// `isActive` → `is_active`.
    Snake,
}

impl Separator {
    pub fn as_char(&self) -> char {
        match self {
            Self::Kebab => '-',
            Self::Snake => '_',
        }
    }
}

/// Settings applied to every field of a compiled schema.
///
/// # Examples
///
/// ```
/// use schema_args_core::{CliConfig, CliOverrides};
///
/// let config = CliConfig::default()
///     .with_prefixes("--on-", "--off-")
///     .exclude("secret")
///     .with_override("child.name", CliOverrides { short: Some('c'), ..Default::default() });
///
/// assert_eq!(config.enable_prefix, "--on-");
/// assert!(config.is_excluded(&schema_args_core::FlatPath::root("secret")));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Prefix of boolean enable flags, dashes included.
    pub enable_prefix: String,
    /// Prefix of boolean disable flags, dashes included.
    pub disable_prefix: String,
    /// Word separator for long flags.
    pub separator: Separator,
    /// Synthesize short flags from field names.
    pub auto_short: bool,
    /// Short letters never synthesized (`h` is always reserved).
    pub reserved_shorts: Vec<char>,
    /// Dotted paths (or prefixes of nested subtrees) left off the command line.
    pub exclude: Vec<String>,
    /// Per-path overrides layered over those declared in the schema.
    pub overrides: BTreeMap<String, CliOverrides>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            enable_prefix: DEFAULT_ENABLE_PREFIX.to_string(),
            disable_prefix: DEFAULT_DISABLE_PREFIX.to_string(),
            separator: Separator::Kebab,
            auto_short: true,
            reserved_shorts: Vec::new(),
            exclude: Vec::new(),
            overrides: BTreeMap::new(),
        }
    }
}

impl CliConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::Error::Io) if the file cannot be read, or
    /// [`Yaml`](crate::Error::Yaml) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Sets both boolean prefixes.
    pub fn with_prefixes(mut self, enable: &str, disable: &str) -> Self {
        self.enable_prefix = enable.to_string();
        self.disable_prefix = disable.to_string();
        self
    }

    /// Sets the long-flag word separator.
    pub fn with_separator(mut self, separator: Separator) -> Self {
        self.separator = separator;
        self
    }

    /// Turns short-flag synthesis on or off.
    pub fn with_auto_short(mut self, enabled: bool) -> Self {
        self.auto_short = enabled;
        self
    }

    /// Leaves `path` (and everything nested under it) off the command line.
    pub fn exclude(mut self, path: &str) -> Self {
        self.exclude.push(path.to_string());
        self
    }

    /// Adds an override for the field at `path`.
    pub fn with_override(mut self, path: &str, overrides: CliOverrides) -> Self {
        self.overrides.insert(path.to_string(), overrides);
        self
    }

    /// Returns `true` if `path` or one of its ancestors is excluded.
    pub fn is_excluded(&self, path: &FlatPath) -> bool {
        let dotted = path.to_string();
        self.exclude.iter().any(|excluded| {
            dotted == *excluded
                || dotted
                    .strip_prefix(excluded.as_str())
                    .is_some_and(|rest| rest.starts_with('.'))
        })
    }

    /// Returns `true` if `letter` may never be synthesized as a short flag.
    pub fn is_reserved_short(&self, letter: char) -> bool {
        letter == 'h' || self.reserved_shorts.contains(&letter)
    }

    /// Overrides configured for `path`, if any.
    pub fn overrides_for(&self, path: &FlatPath) -> Option<&CliOverrides> {
        self.overrides.get(&path.to_string())
    }
}
