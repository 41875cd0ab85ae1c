//! Schema compilation: extraction, flattening and argument synthesis in one
//! step.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::CliConfig;
use crate::error::Result;
use crate::flatten::flatten;
use crate::reconstruct::{construct, reconstruct};
use crate::synthesize::synthesize;
use crate::types::{ArgumentSpec, FlatPath, ParsedFlat, SchemaNode};

/// A schema together with its argument surface.
///
/// Compilation is all-or-nothing: a `CompiledSchema` only exists when every
/// field mapped onto a valid, collision-free argument.
#[derive(Debug, Clone, Serialize)]
pub struct CompiledSchema {
    #[serde(rename = "schema", serialize_with = "serialize_name")]
    node: SchemaNode,
    arguments: Vec<ArgumentSpec>,
}

fn serialize_name<S: serde::Serializer>(
    node: &SchemaNode,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&node.name)
}

impl CompiledSchema {
    /// Compiles `node` under `config`.
    ///
    /// # Errors
    ///
    /// Returns the first compile-time error: [`Schema`](crate::Error::Schema),
    /// [`Collision`](crate::Error::Collision) or
    /// [`InvalidFlag`](crate::Error::InvalidFlag).
    pub fn compile(node: SchemaNode, config: &CliConfig) -> Result<Self> {
        let arguments = {
            let leaves = flatten(&node, config)?;
            synthesize(&leaves, config)?
        };
        debug!(schema = %node.name, arguments = arguments.len(), "Compiled schema");
        Ok(Self { node, arguments })
    }

    pub fn node(&self) -> &SchemaNode {
        &self.node
    }

    /// Argument specs in flattening order.
    pub fn arguments(&self) -> &[ArgumentSpec] {
        &self.arguments
    }

    /// Every flat path with an argument, in flattening order.
    pub fn flat_paths(&self) -> impl Iterator<Item = &FlatPath> {
        self.arguments.iter().map(|argument| &argument.path)
    }

    /// Looks up the argument of a dotted path.
    pub fn argument(&self, path: &str) -> Option<&ArgumentSpec> {
        self.arguments
            .iter()
            .find(|argument| argument.path.to_string() == path)
    }

    /// Rebuilds the nested value from parsed flat values.
    pub fn reconstruct(&self, flat: &ParsedFlat) -> Result<Value> {
        reconstruct(&self.node, flat)
    }

    /// Rebuilds the nested value and deserializes it into `T`.
    pub fn construct<T: DeserializeOwned>(&self, flat: &ParsedFlat) -> Result<T> {
        construct(&self.node, flat)
    }
}

/// Compiles `node` under `config`. See [`CompiledSchema::compile`].
///
/// # Examples
///
/// ```
/// use schema_args_core::{compile, CliConfig, FieldDescriptor, ScalarKind, SchemaNode, TypeKind};
///
/// let root = SchemaNode::new("Config")
///     .with_field(FieldDescriptor::new("name", TypeKind::Scalar(ScalarKind::String)))
///     .with_field(FieldDescriptor::new("verbose", TypeKind::Scalar(ScalarKind::Boolean)).nullable());
///
/// let compiled = compile(root, &CliConfig::default()).unwrap();
/// let flags: Vec<String> = compiled.arguments().iter().flat_map(|a| a.flags()).collect();
/// assert_eq!(
///     flags,
///     vec!["--name", "-n", "--enable-verbose", "--disable-verbose", "--verbose"]
/// );
/// ```
pub fn compile(node: SchemaNode, config: &CliConfig) -> Result<CompiledSchema> {
    CompiledSchema::compile(node, config)
}
