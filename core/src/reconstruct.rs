//! Rebuilding nested values from flat parse results.
//!
//! The flat mapping is partitioned by first path segment. Leaf fields are
//! resolved directly; nested fields recurse with the segment stripped, so
//! every inner value is complete before its parent is assembled. Any error
//! aborts the whole reconstruction.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::{
    FieldDescriptor, FlatPath, ParsedFlat, ParsedValue, ScalarKind, SchemaNode, Toggle, TypeKind,
};

/// Rebuilds the nested value described by `node` from `flat`.
///
/// Absent paths fall back to the field default, then to `null` for
/// nullable fields and to an empty list or map for collections.
///
/// # Errors
///
/// Returns [`Error::Validation`] when a required value is missing, a value
/// has the wrong shape, or a choice or bound constraint is violated.
///
/// # Examples
///
/// ```
/// use schema_args_core::*;
/// use serde_json::json;
///
/// let child = SchemaNode::new("ChildConfig").with_field(
///     FieldDescriptor::new("age", TypeKind::Scalar(ScalarKind::Integer)).with_default(json!(10)),
/// );
/// let root = SchemaNode::new("Config")
///     .with_field(FieldDescriptor::new("name", TypeKind::Scalar(ScalarKind::String)))
///     .with_field(FieldDescriptor::new("child", TypeKind::Nested(child)));
///
/// let mut flat = ParsedFlat::new();
/// flat.insert(FlatPath::root("name"), ParsedValue::Scalar(json!("a")));
///
/// let value = reconstruct(&root, &flat).unwrap();
/// assert_eq!(value, json!({ "name": "a", "child": { "age": 10 } }));
/// ```
pub fn reconstruct(node: &SchemaNode, flat: &ParsedFlat) -> Result<Value> {
    let mut partitions: BTreeMap<&str, Vec<(&[String], &ParsedValue)>> = BTreeMap::new();
    for (path, value) in flat {
        if let Some((first, rest)) = path.segments().split_first() {
            partitions
                .entry(first.as_str())
                .or_default()
                .push((rest, value));
        }
    }
    let value = build(node, &partitions, &[])?;
    debug!(schema = %node.name, paths = flat.len(), "Reconstructed value");
    Ok(value)
}

/// Rebuilds a value with [`reconstruct`] and deserializes it into `T`.
///
/// # Errors
///
/// Reconstruction errors are passed through; a value that `T` still rejects
/// is reported as [`Error::Validation`] at the schema root.
pub fn construct<T: DeserializeOwned>(node: &SchemaNode, flat: &ParsedFlat) -> Result<T> {
    let value = reconstruct(node, flat)?;
    serde_json::from_value(value).map_err(|e| Error::validation(node.name.clone(), e.to_string()))
}

type Partitions<'a> = BTreeMap<&'a str, Vec<(&'a [String], &'a ParsedValue)>>;

fn build(node: &SchemaNode, partitions: &Partitions<'_>, prefix: &[String]) -> Result<Value> {
    let mut object = Map::new();

    for field in &node.fields {
        let entries = partitions
            .get(field.name.as_str())
            .map(Vec::as_slice)
            .unwrap_or_default();
        let mut segments = prefix.to_vec();
        segments.push(field.name.clone());

        let value = match &field.kind {
            TypeKind::Nested(nested) => {
                let mut inner: Partitions<'_> = BTreeMap::new();
                for &(rest, value) in entries {
                    if let Some((first, tail)) = rest.split_first() {
                        inner.entry(first.as_str()).or_default().push((tail, value));
                    }
                }
                build(nested, &inner, &segments)?
            }
            _ => {
                let parsed = entries
                    .iter()
                    .find(|(rest, _)| rest.is_empty())
                    .map(|&(_, value)| value);
                resolve_leaf(field, parsed, &display(&segments))?
            }
        };
        object.insert(field.name.clone(), value);
    }

    Ok(Value::Object(object))
}

fn display(segments: &[String]) -> String {
    FlatPath::from_segments(segments.iter().cloned())
        .map(|path| path.to_string())
        .unwrap_or_default()
}

fn resolve_leaf(field: &FieldDescriptor, parsed: Option<&ParsedValue>, path: &str) -> Result<Value> {
    let given = match parsed {
        Some(ParsedValue::Toggle(Toggle::ForcedTrue)) => Some(Value::Bool(true)),
        Some(ParsedValue::Toggle(Toggle::ForcedFalse)) => Some(Value::Bool(false)),
        Some(ParsedValue::Toggle(Toggle::Unset)) | None => None,
        Some(ParsedValue::Scalar(value)) => Some(value.clone()),
        Some(ParsedValue::List(values)) => Some(collect_many(&field.kind, values, path)?),
    };

    let value = match given {
        Some(value) => value,
        None => match (&field.default, &field.kind) {
            (Some(default), _) => default.clone(),
            (None, _) if field.nullable => Value::Null,
            (None, TypeKind::List(_)) => Value::Array(Vec::new()),
            (None, TypeKind::Map(_)) => Value::Object(Map::new()),
            (None, _) => return Err(Error::validation(path, "required value missing")),
        },
    };

    if !(value.is_null() && field.nullable) {
        check(&field.kind, field, &value, path)?;
    }
    Ok(value)
}

/// Assembles the values of a multi-value argument into a list, tuple or map.
fn collect_many(kind: &TypeKind, values: &[Value], path: &str) -> Result<Value> {
    match kind {
        TypeKind::Map(_) => {
            let mut map = Map::new();
            for entry in values {
                let Value::Object(pair) = entry else {
                    return Err(Error::validation(path, "expected `key=value` entries"));
                };
                map.extend(pair.clone());
            }
            Ok(Value::Object(map))
        }
        TypeKind::Tuple(elements) if elements.len() != values.len() => Err(Error::validation(
            path,
            format!("expected {} values, got {}", elements.len(), values.len()),
        )),
        TypeKind::List(_) | TypeKind::Tuple(_) => Ok(Value::Array(values.to_vec())),
        _ => Err(Error::validation(path, "field takes a single value")),
    }
}

fn check(kind: &TypeKind, field: &FieldDescriptor, value: &Value, path: &str) -> Result<()> {
    match (kind, value) {
        (TypeKind::Scalar(scalar), _) => check_scalar(*scalar, field, value, path),
        (TypeKind::Enum(choices), Value::String(choice)) => {
            if choices.contains(choice) {
                Ok(())
            } else {
                Err(Error::validation(
                    path,
                    format!("`{choice}` is not one of: {}", choices.join(", ")),
                ))
            }
        }
        (TypeKind::List(inner), Value::Array(items)) => items
            .iter()
            .try_for_each(|item| check(inner, field, item, path)),
        (TypeKind::Tuple(elements), Value::Array(items)) if elements.len() == items.len() => elements
            .iter()
            .zip(items)
            .try_for_each(|(element, item)| check(element, field, item, path)),
        (TypeKind::Map(inner), Value::Object(entries)) => entries
            .values()
            .try_for_each(|item| check(inner, field, item, path)),
        _ => Err(Error::validation(path, format!("unexpected value {value}"))),
    }
}

fn check_scalar(kind: ScalarKind, field: &FieldDescriptor, value: &Value, path: &str) -> Result<()> {
    let matches = match kind {
        ScalarKind::Boolean => value.is_boolean(),
        ScalarKind::Integer => value.is_i64() || value.is_u64(),
        ScalarKind::Float => value.is_number(),
        ScalarKind::String | ScalarKind::Path | ScalarKind::Date | ScalarKind::DateTime => {
            value.is_string()
        }
    };
    if !matches {
        return Err(Error::validation(
            path,
            format!("expected {}, got {value}", kind.value_name().to_lowercase()),
        ));
    }

    if let Some(number) = value.as_f64() {
        if field.minimum.is_some_and(|minimum| number < minimum) {
            return Err(Error::validation(
                path,
                format!("{value} is below the minimum of {}", field.minimum.unwrap_or_default()),
            ));
        }
        if field.maximum.is_some_and(|maximum| number > maximum) {
            return Err(Error::validation(
                path,
                format!("{value} is above the maximum of {}", field.maximum.unwrap_or_default()),
            ));
        }
    }
    Ok(())
}
