//! Schema-driven command lines on top of `clap`.
//!
//! Describe a command's input as a `serde` + `schemars` type, register it on
//! an [`App`], and get a flat command line for the whole nested structure:
//!
//! - nested fields become dotted flags (`--child.name`), grouped in help
//!   output under the nested type's name;
//! - booleans become `--enable-<path>` / `--disable-<path>` pairs;
//! - lists take repeated or space-separated values, maps take `key=value`;
//! - the parsed flags are rebuilt into the nested value and deserialized
//!   back into the type before the handler runs.
//!
//! The lower-level pieces ([`schema_of`], [`register`],
//! [`flat_from_matches`]) work with any `clap::Command`; the schema model
//! itself lives in the re-exported [`schema_args_core`].
//!
//! # Example
//!
//! ```
//! use schemars::JsonSchema;
//! use schema_args::App;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, JsonSchema)]
//! struct ChildConfig {
//!     name: String,
//!     #[serde(default = "default_age")]
//!     age: i64,
//!     is_active: bool,
//! }
//!
//! fn default_age() -> i64 {
//!     3
//! }
//!
//! #[derive(Deserialize, JsonSchema)]
//! struct Config {
//!     name: String,
//!     child: ChildConfig,
//! }
//!
//! let mut app = App::new("demo");
//! app.command(|config: Config| {
//!     assert_eq!(config.child.age, 3);
//!     assert!(config.child.is_active);
//!     Ok::<_, std::convert::Infallible>(())
//! })
//! .unwrap();
//!
//! app.run_from(["demo", "--name", "A", "--child.name", "B", "--enable-child.is-active"])
//!     .unwrap();
//! ```

mod app;
mod error;
mod matches;
mod register;
mod schema;

pub use app::{App, Invocation};
pub use error::{CliError, HandlerError, Result};
pub use matches::flat_from_matches;
pub use register::register;
pub use schema::schema_of;
pub use schema_args_core;
