//! Reading parsed values back out of `clap::ArgMatches`.

use clap::ArgMatches;
use schema_args_core::{ArgumentSpec, Arity, Error, ParsedFlat, ParsedValue, Toggle};
use serde_json::Value;
use tracing::debug;

use crate::error::Result;
use crate::register::{disable_id, enable_id, value_id};

/// Collects the values the user supplied for `arguments` into a flat mapping.
///
/// Only arguments actually given on the command line appear in the result;
/// defaults are applied later by reconstruction.
///
/// # Errors
///
/// Returns [`Error::Conflict`] (wrapped in [`CliError::Core`](crate::CliError::Core))
/// when both flags of a boolean pair were given.
pub fn flat_from_matches(matches: &ArgMatches, arguments: &[ArgumentSpec]) -> Result<ParsedFlat> {
    let mut flat = ParsedFlat::new();

    for spec in arguments {
        let value = match spec.arity {
            Arity::Toggle => {
                let enabled = matches.try_get_one::<bool>(&enable_id(spec))?.copied().unwrap_or(false);
                let disabled = match spec.disable {
                    Some(_) => matches.try_get_one::<bool>(&disable_id(spec))?.copied().unwrap_or(false),
                    None => false,
                };
                match (enabled, disabled) {
                    (true, true) => {
                        return Err(Error::Conflict {
                            path: spec.path.to_string(),
                            enable: spec.long.clone(),
                            disable: spec.disable.clone().unwrap_or_default(),
                        }
                        .into());
                    }
                    (true, false) => ParsedValue::Toggle(Toggle::ForcedTrue),
                    (false, true) => ParsedValue::Toggle(Toggle::ForcedFalse),
                    (false, false) => continue,
                }
            }
            Arity::Single => match matches.try_get_one::<Value>(&value_id(spec))? {
                Some(value) => ParsedValue::Scalar(value.clone()),
                None => continue,
            },
            Arity::Many | Arity::Exact(_) => match matches.try_get_many::<Value>(&value_id(spec))? {
                Some(values) => ParsedValue::List(values.cloned().collect()),
                None => continue,
            },
        };
        flat.insert(spec.path.clone(), value);
    }

    debug!(given = flat.len(), declared = arguments.len(), "Collected parsed values");
    Ok(flat)
}

#[cfg(test)]
mod tests {
    use clap::Command;
    use schema_args_core::{
        CliConfig, FieldDescriptor, FlatPath, ScalarKind, SchemaNode, TypeKind, compile,
    };
    use serde_json::json;

    use super::*;
    use crate::error::CliError;
    use crate::register::register;

    fn parse(node: SchemaNode, args: &[&str]) -> Result<ParsedFlat> {
        let compiled = compile(node, &CliConfig::default())?;
        let command = register(Command::new("demo"), &compiled);
        let matches = command.try_get_matches_from(std::iter::once("demo").chain(args.iter().copied()))?;
        flat_from_matches(&matches, compiled.arguments())
    }

    fn toggles() -> SchemaNode {
        SchemaNode::new("Config").with_field(
            FieldDescriptor::new("verbose", TypeKind::Scalar(ScalarKind::Boolean))
                .with_default(json!(true)),
        )
    }

    #[test]
    fn test_toggle_states() {
        let path = FlatPath::root("verbose");
        assert!(parse(toggles(), &[]).unwrap().is_empty());
        assert_eq!(
            parse(toggles(), &["--enable-verbose"]).unwrap()[&path],
            ParsedValue::Toggle(Toggle::ForcedTrue)
        );
        assert_eq!(
            parse(toggles(), &["--disable-verbose"]).unwrap()[&path],
            ParsedValue::Toggle(Toggle::ForcedFalse)
        );
    }

    #[test]
    fn test_both_toggle_flags_conflict() {
        let err = parse(toggles(), &["--enable-verbose", "--disable-verbose"]).unwrap_err();
        assert!(matches!(err, CliError::Core(Error::Conflict { ref path, .. }) if path == "verbose"));
    }

    #[test]
    fn test_lists_keep_order() {
        let node = SchemaNode::new("Config").with_field(FieldDescriptor::new(
            "tags",
            TypeKind::List(Box::new(TypeKind::Scalar(ScalarKind::String))),
        ));
        let flat = parse(node.clone(), &["--tags", "b", "a", "--tags", "c"]).unwrap();
        assert_eq!(
            flat[&FlatPath::root("tags")],
            ParsedValue::List(vec![json!("b"), json!("a"), json!("c")])
        );
        assert!(parse(node, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_token_is_parse_error() {
        let node = SchemaNode::new("Config")
            .with_field(FieldDescriptor::new("count", TypeKind::Scalar(ScalarKind::Integer)));
        let err = parse(node, &["--count", "many"]).unwrap_err();
        assert!(err.as_parse_error().is_some());
    }
}
