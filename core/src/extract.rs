//! Field descriptor extraction from JSON Schema documents.
//!
//! Turns a JSON Schema object definition (as produced by `schemars`, or
//! written by hand) into a [`SchemaNode`] tree. Property order is kept, `$ref`
//! pointers into `$defs`/`definitions` are resolved, and `[T, null]` unions
//! become nullable fields. Anything that cannot be expressed as command-line
//! flags is rejected with [`Error::Schema`].
//!
//! # Examples
//!
//! ```
//! use schema_args_core::{extract_schema, ScalarKind, TypeKind};
//! use serde_json::json;
//!
//! let node = extract_schema(&json!({
//!     "title": "Config",
//!     "type": "object",
//!     "properties": {
//!         "name": { "type": "string", "description": "Your name" },
//!         "age": { "type": "integer", "default": 10 }
//!     },
//!     "required": ["name"]
//! }))
//! .unwrap();
//!
//! assert_eq!(node.name, "Config");
//! assert_eq!(node.fields[0].kind, TypeKind::Scalar(ScalarKind::String));
//! assert!(node.fields[0].is_required());
//! assert!(!node.fields[1].is_required());
//! ```

use std::collections::HashSet;
use std::io::BufReader;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::{CliOverrides, FieldDescriptor, ScalarKind, SchemaNode, TypeKind};

/// Property keyword carrying [`CliOverrides`].
pub const CLI_EXTENSION: &str = "x-cli";

const DEFAULT_TITLE: &str = "Schema";

/// Extracts the root [`SchemaNode`] of a JSON Schema document.
///
/// # Errors
///
/// Returns [`Error::Schema`] for unsupported field types: unions of distinct
/// types, free-form objects, lists of nested schemas, optional nested
/// schemas, recursive definitions and unresolved references.
pub fn extract_schema(document: &Value) -> Result<SchemaNode> {
    let root = document
        .as_object()
        .ok_or_else(|| Error::schema("<root>", "schema document must be an object"))?;
    let name = root
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_TITLE);

    let mut extractor = Extractor {
        defs: root
            .get("$defs")
            .or_else(|| root.get("definitions"))
            .and_then(Value::as_object),
        stack: Vec::new(),
    };
    let node = extractor.node(name, root)?;
    debug!(schema = %node.name, fields = node.fields.len(), leaves = node.leaf_count(), "Extracted schema");
    Ok(node)
}

/// Reads a JSON Schema file and extracts its root node.
pub fn load_schema(path: impl AsRef<Path>) -> Result<SchemaNode> {
    let file = std::fs::File::open(path)?;
    let document: Value = serde_json::from_reader(BufReader::new(file))?;
    extract_schema(&document)
}

impl SchemaNode {
    /// Shorthand for [`extract_schema`].
    pub fn from_json(document: &Value) -> Result<Self> {
        extract_schema(document)
    }
}

struct Extractor<'a> {
    defs: Option<&'a Map<String, Value>>,
    /// Definitions currently being expanded, for cycle detection.
    stack: Vec<String>,
}

impl Extractor<'_> {
    fn node(&mut self, name: &str, schema: &Map<String, Value>) -> Result<SchemaNode> {
        let required: HashSet<&str> = schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let mut node = SchemaNode::new(name);
        node.description = description(schema);

        if let Some(properties) = schema.get("properties") {
            let properties = properties
                .as_object()
                .ok_or_else(|| Error::schema(name, "`properties` must be an object"))?;
            for (field_name, property) in properties {
                let field = self.field(field_name, property, required.contains(field_name.as_str()))?;
                node.fields.push(field);
            }
        }

        Ok(node)
    }

    fn field(&mut self, name: &str, property: &Value, listed_required: bool) -> Result<FieldDescriptor> {
        let property = property
            .as_object()
            .ok_or_else(|| Error::schema(name, "property schema must be an object"))?;
        let (schema, explicitly_nullable) = unwrap_nullable(name, property)?;

        let default = schema.get("default").cloned();
        let overrides = match schema.get(CLI_EXTENSION) {
            Some(raw) => serde_json::from_value::<CliOverrides>(raw.clone())
                .map_err(|e| Error::schema(name, format!("invalid `{CLI_EXTENSION}` metadata: {e}")))?,
            None => CliOverrides::default(),
        };
        let kind = self.classify(name, &schema)?;

        let is_nested = matches!(kind, TypeKind::Nested(_));
        if is_nested && explicitly_nullable {
            return Err(Error::schema(name, "optional nested schemas are not supported"));
        }
        let nullable = explicitly_nullable
            || (!is_nested && !listed_required && default.is_none() && !kind.is_collection());

        let (minimum, maximum) = match kind {
            TypeKind::List(_) | TypeKind::Tuple(_) | TypeKind::Map(_) => {
                element_schema(&schema).map(bounds).unwrap_or_default()
            }
            _ => bounds(&schema),
        };
        let field = FieldDescriptor {
            name: name.to_string(),
            default,
            nullable,
            help: description(&schema),
            overrides,
            minimum,
            maximum,
            kind,
        };

        if field.overrides.skip && !is_nested && field.is_required() {
            return Err(Error::schema(name, "a skipped field needs a default or must be nullable"));
        }

        Ok(field)
    }

    fn classify(&mut self, name: &str, schema: &Map<String, Value>) -> Result<TypeKind> {
        if let Some(reference) = schema.get("$ref").and_then(Value::as_str) {
            return self.resolve(name, reference);
        }

        if let Some(all_of) = schema.get("allOf").and_then(Value::as_array) {
            return match all_of.as_slice() {
                [single] => {
                    let inner = single
                        .as_object()
                        .ok_or_else(|| Error::schema(name, "`allOf` entry must be an object"))?;
                    self.classify(name, inner)
                }
                _ => Err(Error::schema(name, "`allOf` compositions are not supported")),
            };
        }

        if let Some(choices) = enum_choices(name, schema)? {
            return Ok(TypeKind::Enum(choices));
        }

        let ty = match schema.get("type") {
            Some(Value::String(ty)) => ty.as_str(),
            Some(other) => {
                return Err(Error::schema(name, format!("union of types {other} is not supported")));
            }
            None => return Err(Error::schema(name, "schema has no `type`")),
        };

        match ty {
            "string" => Ok(TypeKind::Scalar(
                match schema.get("format").and_then(Value::as_str) {
                    Some("path") => ScalarKind::Path,
                    Some("date") => ScalarKind::Date,
                    Some("date-time") => ScalarKind::DateTime,
                    _ => ScalarKind::String,
                },
            )),
            "integer" => Ok(TypeKind::Scalar(ScalarKind::Integer)),
            "number" => Ok(TypeKind::Scalar(ScalarKind::Float)),
            "boolean" => Ok(TypeKind::Scalar(ScalarKind::Boolean)),
            "array" => self.classify_array(name, schema),
            "object" => self.classify_object(name, schema),
            other => Err(Error::schema(name, format!("type `{other}` is not supported"))),
        }
    }

    fn classify_array(&mut self, name: &str, schema: &Map<String, Value>) -> Result<TypeKind> {
        let positional = schema
            .get("prefixItems")
            .or_else(|| schema.get("items").filter(|items| items.is_array()))
            .and_then(Value::as_array);
        if let Some(items) = positional {
            let kinds = items
                .iter()
                .map(|item| self.element(name, item))
                .collect::<Result<Vec<_>>>()?;
            if kinds.windows(2).any(|pair| pair[0] != pair[1]) {
                return Err(Error::schema(name, "tuple elements must share one type"));
            }
            return Ok(TypeKind::Tuple(kinds));
        }

        let items = schema
            .get("items")
            .ok_or_else(|| Error::schema(name, "array schema has no `items`"))?;
        Ok(TypeKind::List(Box::new(self.element(name, items)?)))
    }

    fn classify_object(&mut self, name: &str, schema: &Map<String, Value>) -> Result<TypeKind> {
        if schema.contains_key("properties") {
            let title = schema.get("title").and_then(Value::as_str).unwrap_or(name);
            return self.node(title, schema).map(TypeKind::Nested);
        }
        match schema.get("additionalProperties") {
            Some(values) if values.is_object() => {
                Ok(TypeKind::Map(Box::new(self.element(name, values)?)))
            }
            _ => Err(Error::schema(name, "free-form objects are not supported")),
        }
    }

    fn element(&mut self, name: &str, item: &Value) -> Result<TypeKind> {
        let item = item
            .as_object()
            .ok_or_else(|| Error::schema(name, "element schema must be an object"))?;
        let kind = self.classify(name, item)?;
        match kind {
            TypeKind::Nested(_) => Err(Error::schema(name, "lists of nested schemas are not supported")),
            kind if kind.is_element() => Ok(kind),
            _ => Err(Error::schema(name, "nested collections are not supported")),
        }
    }

    fn resolve(&mut self, name: &str, reference: &str) -> Result<TypeKind> {
        let def_name = reference
            .strip_prefix("#/$defs/")
            .or_else(|| reference.strip_prefix("#/definitions/"))
            .ok_or_else(|| Error::schema(name, format!("unsupported reference `{reference}`")))?;
        let def = self
            .defs
            .and_then(|defs| defs.get(def_name))
            .and_then(Value::as_object)
            .ok_or_else(|| Error::schema(name, format!("unresolved reference `{reference}`")))?;

        if self.stack.iter().any(|open| open == def_name) {
            return Err(Error::schema(
                name,
                format!("recursive schema `{def_name}` cannot be flattened"),
            ));
        }

        self.stack.push(def_name.to_string());
        let kind = if def.contains_key("properties") {
            self.node(def_name, def).map(TypeKind::Nested)
        } else {
            self.classify(name, def)
        };
        self.stack.pop();
        kind
    }
}

/// Strips a `null` alternative from a property schema.
///
/// Handles both `"type": ["integer", "null"]` and `anyOf`/`oneOf` with a
/// `{"type": "null"}` branch. Keywords next to the union (description,
/// default, `x-cli`) are kept and win over those of the remaining branch.
fn unwrap_nullable(name: &str, schema: &Map<String, Value>) -> Result<(Map<String, Value>, bool)> {
    if let Some(Value::Array(types)) = schema.get("type") {
        let non_null: Vec<&Value> = types.iter().filter(|t| t.as_str() != Some("null")).collect();
        let nullable = non_null.len() < types.len();
        return match non_null.as_slice() {
            [single] => {
                let mut unwrapped = schema.clone();
                unwrapped.insert("type".to_string(), (*single).clone());
                Ok((unwrapped, nullable))
            }
            _ => Err(Error::schema(
                name,
                format!("union of types {} is not supported", Value::Array(types.clone())),
            )),
        };
    }

    for keyword in ["anyOf", "oneOf"] {
        let Some(variants) = schema.get(keyword).and_then(Value::as_array) else {
            continue;
        };
        let non_null: Vec<&Value> = variants.iter().filter(|v| !is_null_schema(v)).collect();
        if non_null.len() == variants.len() {
            continue;
        }
        let [single] = non_null.as_slice() else {
            return Err(Error::schema(name, format!("`{keyword}` unions are not supported")));
        };
        let mut unwrapped = single
            .as_object()
            .cloned()
            .ok_or_else(|| Error::schema(name, format!("`{keyword}` branch must be an object")))?;
        for (key, value) in schema {
            if key != keyword {
                unwrapped.insert(key.clone(), value.clone());
            }
        }
        return Ok((unwrapped, true));
    }

    Ok((schema.clone(), false))
}

fn is_null_schema(schema: &Value) -> bool {
    schema.get("type").and_then(Value::as_str) == Some("null")
}

/// Collects enum choices from `enum`, `const`, or a `oneOf`/`anyOf` of
/// constants (how documented enum variants are emitted).
fn enum_choices(name: &str, schema: &Map<String, Value>) -> Result<Option<Vec<String>>> {
    if let Some(values) = schema.get("enum").and_then(Value::as_array) {
        return string_choices(name, values.iter()).map(Some);
    }
    if let Some(value) = schema.get("const") {
        return string_choices(name, std::iter::once(value)).map(Some);
    }

    for keyword in ["oneOf", "anyOf"] {
        let Some(variants) = schema.get(keyword).and_then(Value::as_array) else {
            continue;
        };
        let mut constants = Vec::new();
        for variant in variants {
            match (variant.get("const"), variant.get("enum").and_then(Value::as_array)) {
                (Some(value), _) => constants.push(value),
                (None, Some(values)) => constants.extend(values.iter()),
                (None, None) => {
                    return Err(Error::schema(name, format!("`{keyword}` unions are not supported")));
                }
            }
        }
        return string_choices(name, constants.into_iter()).map(Some);
    }

    Ok(None)
}

fn string_choices<'v>(name: &str, values: impl Iterator<Item = &'v Value>) -> Result<Vec<String>> {
    values
        .map(|value| {
            value
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| Error::schema(name, format!("enum value {value} is not a string")))
        })
        .collect()
}

fn bounds(schema: &Map<String, Value>) -> (Option<f64>, Option<f64>) {
    (
        schema.get("minimum").and_then(Value::as_f64),
        schema.get("maximum").and_then(Value::as_f64),
    )
}

/// Inline schema of the elements of a list, tuple or map. Tuples report
/// their first element.
fn element_schema(schema: &Map<String, Value>) -> Option<&Map<String, Value>> {
    schema
        .get("prefixItems")
        .or_else(|| schema.get("items").filter(|items| items.is_array()))
        .and_then(Value::as_array)
        .and_then(|items| items.first())
        .or_else(|| schema.get("items"))
        .or_else(|| schema.get("additionalProperties"))
        .and_then(Value::as_object)
}

fn description(schema: &Map<String, Value>) -> Option<String> {
    schema
        .get("description")
        .and_then(Value::as_str)
        .map(str::to_string)
}
