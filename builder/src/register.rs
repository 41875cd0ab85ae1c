//! Registration of compiled argument specs on a `clap::Command`.

use clap::builder::{PossibleValuesParser, TypedValueParser};
use clap::{Arg, ArgAction, ArgGroup, Command};
use schema_args_core::{ArgumentSpec, Arity, CompiledSchema, Converter, ScalarKind};
use serde_json::Value;
use tracing::debug;

/// clap id of the enable flag of a boolean pair.
pub(crate) fn enable_id(spec: &ArgumentSpec) -> String {
    format!("{}:enable", spec.path)
}

/// clap id of the disable flag of a boolean pair.
pub(crate) fn disable_id(spec: &ArgumentSpec) -> String {
    format!("{}:disable", spec.path)
}

/// clap id of a valued argument.
pub(crate) fn value_id(spec: &ArgumentSpec) -> String {
    spec.path.to_string()
}

/// Adds every argument of `compiled` to `command`, in flattening order.
///
/// Each argument is shown under a help heading named after the schema node
/// that owns it.
///
/// # Examples
///
/// ```
/// use schema_args::register;
/// use schema_args_core::{compile, CliConfig, FieldDescriptor, ScalarKind, SchemaNode, TypeKind};
///
/// let node = SchemaNode::new("Config")
///     .with_field(FieldDescriptor::new("name", TypeKind::Scalar(ScalarKind::String)));
/// let compiled = compile(node, &CliConfig::default()).unwrap();
///
/// let command = register(clap::Command::new("demo"), &compiled);
/// let matches = command.try_get_matches_from(["demo", "--name", "x"]).unwrap();
/// assert!(matches.contains_id("name"));
/// ```
pub fn register(mut command: Command, compiled: &CompiledSchema) -> Command {
    for spec in compiled.arguments() {
        command = if spec.is_toggle() {
            register_toggle(command, spec)
        } else {
            command.arg(valued_arg(spec))
        };
    }
    debug!(
        command = %command.get_name(),
        schema = %compiled.node().name,
        arguments = compiled.arguments().len(),
        "Registered arguments"
    );
    command
}

fn register_toggle(command: Command, spec: &ArgumentSpec) -> Command {
    let enable = Arg::new(enable_id(spec))
        .long(strip_dashes(&spec.long))
        .visible_aliases(spec.aliases.iter().map(|alias| strip_dashes(alias)))
        .action(ArgAction::SetTrue)
        .help(help_text(spec))
        .help_heading(spec.group.clone());
    let enable = match spec.short {
        Some(short) => enable.short(short),
        None => enable,
    };

    let mut command = command.arg(enable);
    if let Some(disable) = &spec.disable {
        command = command.arg(
            Arg::new(disable_id(spec))
                .long(strip_dashes(disable))
                .action(ArgAction::SetTrue)
                .help(format!("Set `{}` to false", spec.path))
                .help_heading(spec.group.clone()),
        );
    }

    if spec.required {
        let members: Vec<String> = std::iter::once(enable_id(spec))
            .chain(spec.disable.as_ref().map(|_| disable_id(spec)))
            .collect();
        command = command.group(
            ArgGroup::new(value_id(spec))
                .args(members)
                .required(true)
                .multiple(true),
        );
    }
    command
}

fn valued_arg(spec: &ArgumentSpec) -> Arg {
    let arg = Arg::new(value_id(spec))
        .long(strip_dashes(&spec.long))
        .visible_aliases(spec.aliases.iter().map(|alias| strip_dashes(alias)))
        .value_name(spec.converter.value_name())
        .required(spec.required)
        .help(help_text(spec))
        .help_heading(spec.group.clone());
    let arg = match spec.short {
        Some(short) => arg.short(short),
        None => arg,
    };
    let arg = match spec.arity {
        Arity::Single | Arity::Toggle => arg.num_args(1).action(ArgAction::Set),
        Arity::Many => arg.num_args(0..).action(ArgAction::Append),
        Arity::Exact(count) => arg.num_args(count).action(ArgAction::Set),
    };

    match &spec.converter {
        Converter::Scalar(ScalarKind::Integer | ScalarKind::Float) => {
            let converter = spec.converter.clone();
            arg.allow_negative_numbers(true)
                .value_parser(move |raw: &str| converter.convert(raw))
        }
        Converter::Choice(choices) => arg.value_parser(
            PossibleValuesParser::new(choices.iter().cloned()).map(Value::String),
        ),
        converter => {
            let converter = converter.clone();
            arg.value_parser(move |raw: &str| converter.convert(raw))
        }
    }
}

fn strip_dashes(long: &str) -> String {
    long.strip_prefix("--").unwrap_or(long).to_string()
}

fn help_text(spec: &ArgumentSpec) -> String {
    let help = spec.help.clone().unwrap_or_default();
    match &spec.default {
        Some(default) if help.is_empty() => format!("[default: {}]", display_default(default)),
        Some(default) => format!("{help} [default: {}]", display_default(default)),
        None => help,
    }
}

fn display_default(default: &Value) -> String {
    match default {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
