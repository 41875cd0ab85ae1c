//! Argument synthesis: one [`ArgumentSpec`] per flattened leaf.

use std::collections::{HashMap, HashSet};
use std::iter;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::{CliConfig, Separator};
use crate::error::{Error, Result};
use crate::flatten::FlatLeaf;
use crate::types::{Arity, ArgumentSpec, Converter, FlatPath, ScalarKind, TypeKind};
use crate::validate::{is_reserved_long, validate_arguments};

static ACRONYM_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z]+)([A-Z][a-z])").expect("static regex must compile"));
static CASE_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z0-9])([A-Z])").expect("static regex must compile"));
static WORD_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[_\-\s]+").expect("static regex must compile"));

/// Converts one field name into a flag word.
///
/// # Examples
///
/// ```
/// use schema_args_core::{flag_word, Separator};
///
/// assert_eq!(flag_word("is_active", Separator::Kebab), "is-active");
/// assert_eq!(flag_word("maxRetries", Separator::Kebab), "max-retries");
/// assert_eq!(flag_word("HTTPServer", Separator::Snake), "http_server");
/// ```
pub fn flag_word(segment: &str, separator: Separator) -> String {
    let sep = separator.as_char();
    let split = ACRONYM_BOUNDARY.replace_all(segment, "${1}_${2}");
    let split = CASE_BOUNDARY.replace_all(&split, "${1}_${2}");
    WORD_SEPARATORS
        .replace_all(&split, sep.to_string().as_str())
        .trim_matches(sep)
        .to_lowercase()
}

/// Long flag name for `path`, without dashes: each segment converted with
/// [`flag_word`], rejoined with `.`.
pub fn long_name(path: &FlatPath, separator: Separator) -> String {
    path.segments()
        .iter()
        .map(|segment| flag_word(segment, separator))
        .collect::<Vec<_>>()
        .join(".")
}

/// Derives the argument specs for `leaves`, in the same order.
///
/// Short flags are handed out first come, first served; a letter that is
/// reserved or already taken is silently omitted. Booleans also accept their
/// bare `--<path>` spelling as an alias of the enable flag.
///
/// # Errors
///
/// Returns [`Error::Collision`] when two leaves end up with the same long
/// flag (for example `is_active` and `is-active`), and
/// [`Error::InvalidFlag`] for malformed override names or prefixes.
pub fn synthesize(leaves: &[FlatLeaf<'_>], config: &CliConfig) -> Result<Vec<ArgumentSpec>> {
    let mut longs: HashMap<String, String> = HashMap::new();
    let mut shorts: HashSet<char> = HashSet::new();
    let mut arguments = Vec::with_capacity(leaves.len());

    for leaf in leaves {
        let argument = synthesize_leaf(leaf, config, &mut shorts)?;
        let flags = iter::once(&argument.long)
            .chain(argument.disable.as_ref())
            .chain(&argument.aliases);
        for flag in flags {
            if let Some(first) = longs.insert(flag.clone(), leaf.chain.clone()) {
                return Err(Error::Collision {
                    path: flag.clone(),
                    first,
                    second: leaf.chain.clone(),
                });
            }
        }
        debug!(
            path = %argument.path,
            long = %argument.long,
            short = ?argument.short,
            arity = ?argument.arity,
            required = argument.required,
            "Synthesized argument"
        );
        arguments.push(argument);
    }

    validate_arguments(&arguments)?;
    Ok(arguments)
}

fn synthesize_leaf(
    leaf: &FlatLeaf<'_>,
    config: &CliConfig,
    shorts: &mut HashSet<char>,
) -> Result<ArgumentSpec> {
    let field = leaf.field;
    let base = leaf
        .overrides
        .long
        .clone()
        .unwrap_or_else(|| long_name(&leaf.path, config.separator));
    let element = |kind: &TypeKind| {
        Converter::for_element(kind).ok_or_else(|| {
            Error::schema(leaf.path.to_string(), "collection elements must be scalars or enums")
        })
    };

    let (long, disable, arity, converter) = match &field.kind {
        TypeKind::Scalar(ScalarKind::Boolean) => {
            let disable_prefix = leaf
                .overrides
                .disable_prefix
                .as_deref()
                .unwrap_or(&config.disable_prefix);
            (
                format!("{}{base}", enable_prefix(leaf, config)),
                Some(format!("{disable_prefix}{base}")),
                Arity::Toggle,
                Converter::Scalar(ScalarKind::Boolean),
            )
        }
        TypeKind::Scalar(kind) => (format!("--{base}"), None, Arity::Single, Converter::Scalar(*kind)),
        TypeKind::Enum(choices) => (
            format!("--{base}"),
            None,
            Arity::Single,
            Converter::Choice(choices.clone()),
        ),
        TypeKind::List(inner) => (format!("--{base}"), None, Arity::Many, element(inner)?),
        TypeKind::Tuple(elements) => {
            let converter = match elements.first() {
                Some(first) => element(first)?,
                None => return Err(Error::schema(leaf.path.to_string(), "empty tuples take no values")),
            };
            (format!("--{base}"), None, Arity::Exact(elements.len()), converter)
        }
        TypeKind::Map(inner) => (
            format!("--{base}"),
            None,
            Arity::Many,
            Converter::KeyValue(Box::new(element(inner)?)),
        ),
        TypeKind::Nested(_) => {
            return Err(Error::schema(
                leaf.path.to_string(),
                "nested schemas are flattened, not turned into arguments",
            ));
        }
    };

    let default = match (&field.default, &field.kind) {
        (Some(default), _) => Some(default.clone()),
        (None, TypeKind::List(_)) => Some(Value::Array(Vec::new())),
        (None, TypeKind::Map(_)) => Some(Value::Object(Map::new())),
        _ => None,
    };

    let alias_prefix = match arity {
        Arity::Toggle => enable_prefix(leaf, config),
        _ => "--",
    };
    let mut aliases: Vec<String> = leaf
        .overrides
        .aliases
        .iter()
        .map(|alias| format!("{alias_prefix}{alias}"))
        .collect();
    if arity == Arity::Toggle {
        // The bare path also switches a toggle on, unless it is already taken.
        let bare = format!("--{base}");
        let taken = bare == long || disable.as_ref() == Some(&bare) || aliases.contains(&bare);
        if !taken && !is_reserved_long(&base) {
            aliases.push(bare);
        }
    }

    Ok(ArgumentSpec {
        path: leaf.path.clone(),
        short: assign_short(leaf, arity, config, shorts),
        long,
        disable,
        aliases,
        arity,
        converter,
        required: field.is_required(),
        default,
        help: field.help.clone(),
        group: leaf.group.clone(),
    })
}

fn enable_prefix<'a>(leaf: &'a FlatLeaf<'_>, config: &'a CliConfig) -> &'a str {
    leaf.overrides
        .enable_prefix
        .as_deref()
        .unwrap_or(&config.enable_prefix)
}

/// Picks the short flag of a leaf: the override letter, or the first letter
/// of the leaf name for non-boolean fields.
fn assign_short(
    leaf: &FlatLeaf<'_>,
    arity: Arity,
    config: &CliConfig,
    shorts: &mut HashSet<char>,
) -> Option<char> {
    if leaf.overrides.no_short {
        return None;
    }
    let explicit = leaf.overrides.short;
    let candidate = match explicit {
        Some(letter) => letter,
        None if config.auto_short && arity != Arity::Toggle => leaf
            .path
            .leaf()
            .chars()
            .next()
            .filter(char::is_ascii_alphabetic)?,
        None => return None,
    };

    if config.is_reserved_short(candidate) || !shorts.insert(candidate) {
        if explicit.is_some() {
            warn!(path = %leaf.path, short = %candidate, "Short flag is reserved or already taken; omitting it");
        } else {
            debug!(path = %leaf.path, short = %candidate, "Short flag unavailable");
        }
        return None;
    }
    Some(candidate)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::flatten::flatten;
    use crate::types::{CliOverrides, FieldDescriptor, SchemaNode};

    fn field(name: &str, kind: ScalarKind) -> FieldDescriptor {
        FieldDescriptor::new(name, TypeKind::Scalar(kind))
    }

    fn compile_specs(root: &SchemaNode, config: &CliConfig) -> Result<Vec<ArgumentSpec>> {
        let leaves = flatten(root, config)?;
        synthesize(&leaves, config)
    }

    fn nested_config() -> SchemaNode {
        let child = SchemaNode::new("ChildConfig")
            .with_field(field("name", ScalarKind::String))
            .with_field(field("age", ScalarKind::Integer).with_default(json!(10)))
            .with_field(field("is_active", ScalarKind::Boolean));
        SchemaNode::new("Config")
            .with_field(field("name", ScalarKind::String))
            .with_field(FieldDescriptor::new("child", TypeKind::Nested(child)))
    }

    #[test]
    fn test_nested_fields_get_dotted_kebab_flags() {
        let specs = compile_specs(&nested_config(), &CliConfig::default()).unwrap();
        let longs: Vec<&str> = specs.iter().map(|s| s.long.as_str()).collect();
        assert_eq!(
            longs,
            vec!["--name", "--child.name", "--child.age", "--enable-child.is-active"]
        );
        assert_eq!(specs[3].disable.as_deref(), Some("--disable-child.is-active"));
        assert_eq!(specs[3].aliases, vec!["--child.is-active"]);
        assert_eq!(specs[3].arity, Arity::Toggle);
        assert!(specs[3].required);
        assert!(!specs[2].required);
        assert_eq!(specs[2].default, Some(json!(10)));
        assert_eq!(specs[1].group, "ChildConfig");
    }

    #[test]
    fn test_short_flags_skip_taken_and_reserved_letters() {
        let root = SchemaNode::new("Config")
            .with_field(field("name", ScalarKind::String))
            .with_field(field("number", ScalarKind::Integer))
            .with_field(field("help_text", ScalarKind::String))
            .with_field(field("verbose", ScalarKind::Boolean));
        let specs = compile_specs(&root, &CliConfig::default()).unwrap();
        assert_eq!(specs[0].short, Some('n'));
        assert_eq!(specs[1].short, None);
        assert_eq!(specs[2].short, None);
        assert_eq!(specs[3].short, None);

        let config = CliConfig::default().with_auto_short(false);
        let specs = compile_specs(&root, &config).unwrap();
        assert!(specs.iter().all(|s| s.short.is_none()));
    }

    #[test]
    fn test_prefixes_from_config_and_field() {
        let root = SchemaNode::new("Config")
            .with_field(field("param", ScalarKind::Boolean))
            .with_field(field("switch", ScalarKind::Boolean).with_overrides(CliOverrides {
                enable_prefix: Some("--true-".into()),
                disable_prefix: Some("--false-".into()),
                ..Default::default()
            }));
        let config = CliConfig::default().with_prefixes("--on-", "--off-");
        let specs = compile_specs(&root, &config).unwrap();
        assert_eq!(specs[0].flags(), vec!["--on-param", "--off-param", "--param"]);
        assert_eq!(
            specs[1].flags(),
            vec!["--true-switch", "--false-switch", "--switch"]
        );
    }

    #[test]
    fn test_collections_are_optional_with_empty_defaults() {
        let root = SchemaNode::new("Config")
            .with_field(FieldDescriptor::new(
                "tags",
                TypeKind::List(Box::new(TypeKind::Scalar(ScalarKind::String))),
            ))
            .with_field(FieldDescriptor::new(
                "limits",
                TypeKind::Map(Box::new(TypeKind::Scalar(ScalarKind::Integer))),
            ))
            .with_field(FieldDescriptor::new(
                "point",
                TypeKind::Tuple(vec![TypeKind::Scalar(ScalarKind::Float); 3]),
            ));
        let specs = compile_specs(&root, &CliConfig::default()).unwrap();

        assert_eq!(specs[0].arity, Arity::Many);
        assert_eq!(specs[0].default, Some(json!([])));
        assert!(!specs[0].required);
        assert_eq!(
            specs[1].converter,
            Converter::KeyValue(Box::new(Converter::Scalar(ScalarKind::Integer)))
        );
        assert_eq!(specs[1].default, Some(json!({})));
        assert_eq!(specs[2].arity, Arity::Exact(3));
        assert!(specs[2].required);
    }

    #[test]
    fn test_case_converted_long_flags_collide() {
        let root = SchemaNode::new("Config")
            .with_field(field("is_active", ScalarKind::String))
            .with_field(field("isActive", ScalarKind::String));
        let err = compile_specs(&root, &CliConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Collision { ref path, .. } if path == "--is-active"));
    }

    #[test]
    fn test_snake_separator_and_long_override() {
        let root = SchemaNode::new("Config")
            .with_field(field("param_alias", ScalarKind::String))
            .with_field(field("title", ScalarKind::String).with_overrides(CliOverrides {
                long: Some("headline".into()),
                short: Some('H'),
                ..Default::default()
            }));
        let config = CliConfig::default().with_separator(Separator::Snake);
        let specs = compile_specs(&root, &config).unwrap();
        assert_eq!(specs[0].long, "--param_alias");
        assert_eq!(specs[1].long, "--headline");
        assert_eq!(specs[1].short, Some('H'));
    }

    #[test]
    fn test_invalid_prefix_is_rejected() {
        let root = SchemaNode::new("Config").with_field(field("flag", ScalarKind::Boolean));
        let config = CliConfig::default().with_prefixes("on-", "--off-");
        let err = compile_specs(&root, &config).unwrap_err();
        assert!(matches!(err, Error::InvalidFlag { ref flag, .. } if flag == "on-flag"));
    }

    #[test]
    fn test_bare_toggle_alias_is_skipped_when_prefix_is_bare() {
        let root = SchemaNode::new("Config").with_field(field("color", ScalarKind::Boolean));
        let config = CliConfig::default().with_prefixes("--", "--no-");
        let specs = compile_specs(&root, &config).unwrap();
        assert_eq!(specs[0].flags(), vec!["--color", "--no-color"]);
    }

    #[test]
    fn test_bare_toggle_alias_takes_part_in_collisions() {
        let root = SchemaNode::new("Config")
            .with_field(field("color", ScalarKind::Boolean))
            .with_field(field("Color", ScalarKind::String));
        let err = compile_specs(&root, &CliConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Collision { ref path, .. } if path == "--color"));
    }

    #[test]
    fn test_override_aliases_follow_the_flag_kind() {
        let root = SchemaNode::new("Config")
            .with_field(field("title", ScalarKind::String).with_overrides(CliOverrides {
                aliases: vec!["headline".into(), "caption".into()],
                ..Default::default()
            }))
            .with_field(field("is_active", ScalarKind::Boolean).with_overrides(CliOverrides {
                aliases: vec!["live".into()],
                ..Default::default()
            }));
        let specs = compile_specs(&root, &CliConfig::default()).unwrap();
        assert_eq!(specs[0].aliases, vec!["--headline", "--caption"]);
        assert_eq!(specs[1].aliases, vec!["--enable-live", "--is-active"]);
    }
}
