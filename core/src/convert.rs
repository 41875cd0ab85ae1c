//! Token converters handed to the argument parser.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Number, Value};

use crate::types::{Converter, ScalarKind, TypeKind};

const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

impl Converter {
    /// Converter for one element of a list, tuple or map value.
    pub fn for_element(kind: &TypeKind) -> Option<Converter> {
        match kind {
            TypeKind::Scalar(scalar) => Some(Converter::Scalar(*scalar)),
            TypeKind::Enum(choices) => Some(Converter::Choice(choices.clone())),
            _ => None,
        }
    }

    /// Converts one raw command-line token into a JSON value.
    ///
    /// # Examples
    ///
    /// ```
    /// use schema_args_core::{Converter, ScalarKind};
    /// use serde_json::json;
    ///
    /// let int = Converter::Scalar(ScalarKind::Integer);
    /// assert_eq!(int.convert("42").unwrap(), json!(42));
    /// assert!(int.convert("forty-two").is_err());
    ///
    /// let pair = Converter::KeyValue(Box::new(int));
    /// assert_eq!(pair.convert("retries=3").unwrap(), json!({ "retries": 3 }));
    /// ```
    pub fn convert(&self, raw: &str) -> Result<Value, String> {
        match self {
            Self::Scalar(kind) => convert_scalar(*kind, raw),
            Self::Choice(choices) => {
                if choices.iter().any(|choice| choice == raw) {
                    Ok(Value::String(raw.to_string()))
                } else {
                    Err(format!(
                        "invalid choice `{raw}` (expected one of: {})",
                        choices.join(", ")
                    ))
                }
            }
            Self::KeyValue(inner) => {
                let (key, value) = raw
                    .split_once('=')
                    .ok_or_else(|| format!("expected `key=value`, got `{raw}`"))?;
                if key.is_empty() {
                    return Err(format!("missing key in `{raw}`"));
                }
                let mut entry = Map::new();
                entry.insert(key.to_string(), inner.convert(value)?);
                Ok(Value::Object(entry))
            }
        }
    }

    /// Usage placeholder for values of this converter.
    pub fn value_name(&self) -> &'static str {
        match self {
            Self::Scalar(kind) => kind.value_name(),
            Self::Choice(_) => "CHOICE",
            Self::KeyValue(_) => "KEY=VALUE",
        }
    }
}

fn convert_scalar(kind: ScalarKind, raw: &str) -> Result<Value, String> {
    match kind {
        ScalarKind::String | ScalarKind::Path => Ok(Value::String(raw.to_string())),
        ScalarKind::Integer => {
            let digits = raw.trim();
            digits
                .parse::<i64>()
                .map(Value::from)
                .or_else(|_| digits.parse::<u64>().map(Value::from))
                .map_err(|_| format!("invalid integer `{raw}`"))
        }
        ScalarKind::Float => raw
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| format!("invalid number `{raw}`")),
        ScalarKind::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Value::Bool(true)),
            "false" | "0" | "no" | "off" => Ok(Value::Bool(false)),
            _ => Err(format!("invalid boolean `{raw}`")),
        },
        ScalarKind::Date => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map(|date| Value::String(date.to_string()))
            .map_err(|e| format!("invalid date `{raw}`: {e}")),
        ScalarKind::DateTime => convert_datetime(raw.trim()),
    }
}

fn convert_datetime(raw: &str) -> Result<Value, String> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Value::String(timestamp.to_rfc3339()));
    }
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|timestamp| Value::String(timestamp.format("%Y-%m-%dT%H:%M:%S%.f").to_string()))
        .ok_or_else(|| format!("invalid date-time `{raw}`"))
}
