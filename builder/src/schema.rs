use schemars::JsonSchema;
use schema_args_core::{Result, SchemaNode, extract_schema};

/// Extracts the [`SchemaNode`] of a `schemars`-derived type.
///
/// Doc comments become help text, `#[serde(default = ...)]` values become
/// defaults and `Option<T>` fields become nullable. Per-field flag overrides
/// go in an `x-cli` extension:
///
/// ```
/// use schemars::JsonSchema;
/// use schema_args::schema_of;
///
/// #[derive(JsonSchema)]
/// struct Build {
///     /// Crate to build.
///     #[schemars(extend("x-cli" = { "short": "p" }))]
///     package: String,
///     jobs: Option<u32>,
/// }
///
/// let node = schema_of::<Build>().unwrap();
/// assert_eq!(node.name, "Build");
/// assert_eq!(node.fields[0].overrides.short, Some('p'));
/// assert_eq!(node.fields[0].help.as_deref(), Some("Crate to build."));
/// assert!(node.fields[1].nullable);
/// ```
///
/// # Errors
///
/// Returns [`Error::Schema`](schema_args_core::Error::Schema) for field
/// types that have no command-line form.
pub fn schema_of<T: JsonSchema>() -> Result<SchemaNode> {
    let schema = schemars::schema_for!(T);
    extract_schema(schema.as_value())
}
