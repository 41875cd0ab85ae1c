//! Schema-to-command-line compilation primitives.
//!
//! This crate maps a tree-shaped data schema onto a flat command-line
//! argument surface and rebuilds nested values from parsed arguments:
//!
//! - [`SchemaNode`] / [`FieldDescriptor`]: the typed schema tree, usually
//!   extracted from a JSON Schema document with [`extract_schema`].
//! - [`flatten`]: dotted [`FlatPath`]s and help groups for every leaf.
//! - [`synthesize`]: one [`ArgumentSpec`] per leaf with long and short flags,
//!   enable/disable pairs for booleans, arity and token conversion.
//! - [`reconstruct`]: the inverse direction, from a [`ParsedFlat`] mapping
//!   back to a nested JSON value.
//!
//! [`compile`] runs extraction output through flattening and synthesis in
//! one all-or-nothing step; [`CliConfig`] tunes prefixes, separators, short
//! flags, exclusions and per-field overrides.
//!
//! # Example
//!
//! ```
//! use schema_args_core::*;
//! use serde_json::json;
//!
//! let node = extract_schema(&json!({
//!     "title": "Config",
//!     "type": "object",
//!     "properties": {
//!         "name": { "type": "string" },
//!         "retries": { "type": "integer", "default": 3 }
//!     },
//!     "required": ["name"]
//! }))
//! .unwrap();
//!
//! let compiled = compile(node, &CliConfig::default()).unwrap();
//! assert_eq!(compiled.argument("retries").unwrap().long, "--retries");
//!
//! let mut flat = ParsedFlat::new();
//! flat.insert(FlatPath::root("name"), ParsedValue::Scalar(json!("demo")));
//! assert_eq!(
//!     compiled.reconstruct(&flat).unwrap(),
//!     json!({ "name": "demo", "retries": 3 })
//! );
//! ```

mod compile;
mod config;
mod convert;
mod error;
mod extract;
mod flatten;
mod reconstruct;
mod synthesize;
mod types;
mod validate;

pub use compile::{CompiledSchema, compile};
pub use config::{CliConfig, DEFAULT_DISABLE_PREFIX, DEFAULT_ENABLE_PREFIX, Separator};
pub use error::{Error, Result};
pub use extract::{CLI_EXTENSION, extract_schema, load_schema};
pub use flatten::{FlatLeaf, flatten};
pub use reconstruct::{construct, reconstruct};
pub use synthesize::{flag_word, long_name, synthesize};
pub use types::*;
pub use validate::validate_arguments;
