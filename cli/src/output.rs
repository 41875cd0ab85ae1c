//! Output formatting for compiled argument surfaces.

use schema_args_core::{ArgumentSpec, Arity, CompiledSchema, Converter};

/// Supported output formats.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
    Markdown,
    Table,
}

/// Formats a compiled schema in the requested output format.
pub fn format_compiled(compiled: &CompiledSchema, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(compiled)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(compiled).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Markdown => Ok(compiled_to_markdown(compiled)),
        OutputFormat::Table => Ok(compiled_to_table(compiled)),
    }
}

fn flag_names(spec: &ArgumentSpec) -> String {
    let mut names = Vec::new();
    if let Some(short) = spec.short {
        names.push(format!("-{short}"));
    }
    names.push(spec.long.clone());
    names.extend(spec.disable.clone());
    names.extend(spec.aliases.iter().cloned());
    names.join(", ")
}

fn value_hint(spec: &ArgumentSpec) -> String {
    let name = match &spec.converter {
        Converter::Choice(choices) => format!("{{{}}}", choices.join("|")),
        converter => converter.value_name().to_string(),
    };
    match spec.arity {
        Arity::Toggle => String::new(),
        Arity::Single => format!("<{name}>"),
        Arity::Many => format!("[<{name}>...]"),
        Arity::Exact(count) => vec![format!("<{name}>"); count].join(" "),
    }
}

fn notes(spec: &ArgumentSpec) -> String {
    let mut notes = Vec::new();
    if spec.required {
        notes.push("required".to_string());
    }
    if let Some(default) = &spec.default {
        notes.push(format!("default: {default}"));
    }
    if let Some(help) = &spec.help {
        notes.push(help.clone());
    }
    notes.join("; ")
}

fn compiled_to_markdown(compiled: &CompiledSchema) -> String {
    let node = compiled.node();
    let mut out = String::new();

    out.push_str(&format!("# {}\n\n", node.name));
    if let Some(ref desc) = node.description {
        out.push_str(&format!("{desc}\n\n"));
    }

    let mut group: Option<&str> = None;
    for spec in compiled.arguments() {
        if group != Some(spec.group.as_str()) {
            if group.is_some() {
                out.push('\n');
            }
            out.push_str(&format!("## {}\n\n", spec.group));
            out.push_str("| Flag | Value | Path | Notes |\n");
            out.push_str("|------|-------|------|-------|\n");
            group = Some(spec.group.as_str());
        }
        out.push_str(&format!(
            "| `{}` | {} | `{}` | {} |\n",
            flag_names(spec),
            value_hint(spec),
            spec.path,
            notes(spec)
        ));
    }

    out
}

fn compiled_to_table(compiled: &CompiledSchema) -> String {
    let node = compiled.node();
    let mut out = String::new();

    out.push_str(&format!(
        "Schema: {}  Arguments: {}\n",
        node.name,
        compiled.arguments().len()
    ));
    if let Some(ref desc) = node.description {
        out.push_str(&format!("  {desc}\n"));
    }

    let rows: Vec<(String, String, String)> = compiled
        .arguments()
        .iter()
        .map(|spec| {
            let usage = format!("{} {}", flag_names(spec), value_hint(spec));
            (spec.group.clone(), usage.trim_end().to_string(), notes(spec))
        })
        .collect();
    let width = rows.iter().map(|(_, usage, _)| usage.len()).max().unwrap_or(4);

    let mut group: Option<&str> = None;
    for (row_group, usage, notes) in &rows {
        if group != Some(row_group.as_str()) {
            out.push_str(&format!("\n{row_group}:\n"));
            group = Some(row_group.as_str());
        }
        out.push_str(&format!("  {usage:<width$}  {notes}\n"));
    }

    out
}

#[cfg(test)]
mod tests {
    use schema_args_core::{
        CliConfig, FieldDescriptor, ScalarKind, SchemaNode, TypeKind, compile,
    };
    use serde_json::json;

    use super::*;

    fn sample() -> CompiledSchema {
        let child = SchemaNode::new("ChildConfig")
            .with_field(FieldDescriptor::new("is_active", TypeKind::Scalar(ScalarKind::Boolean)))
            .with_field(FieldDescriptor::new(
                "level",
                TypeKind::Enum(vec!["low".into(), "high".into()]),
            ));
        let root = SchemaNode::new("Config")
            .with_description("Demo settings")
            .with_field(
                FieldDescriptor::new("retries", TypeKind::Scalar(ScalarKind::Integer))
                    .with_default(json!(3))
                    .with_help("Retry count"),
            )
            .with_field(FieldDescriptor::new("child", TypeKind::Nested(child)));
        compile(root, &CliConfig::default()).unwrap()
    }

    #[test]
    fn test_format_compiled_json() {
        let raw = format_compiled(&sample(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["schema"], json!("Config"));
        assert_eq!(value["arguments"].as_array().map(Vec::len), Some(3));
    }

    #[test]
    fn test_format_compiled_yaml() {
        let raw = format_compiled(&sample(), OutputFormat::Yaml).unwrap();
        assert!(raw.contains("schema: Config"));
        assert!(raw.contains("--retries"));
    }

    #[test]
    fn test_format_compiled_markdown() {
        let md = format_compiled(&sample(), OutputFormat::Markdown).unwrap();
        assert!(md.starts_with("# Config\n\nDemo settings"));
        assert!(md.contains("## ChildConfig"));
        assert!(md.contains("| `-r, --retries` | <INT> | `retries` | default: 3; Retry count |"));
    }

    #[test]
    fn test_format_compiled_table() {
        let table = format_compiled(&sample(), OutputFormat::Table).unwrap();
        assert!(table.starts_with("Schema: Config  Arguments: 3"));
        assert!(table.contains("--enable-child.is-active, --disable-child.is-active"));
        assert!(table.contains("--child.level <{low|high}>"));
        assert!(table.contains("\nChildConfig:\n"));
    }
}
