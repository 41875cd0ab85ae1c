mod output;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use schema_args::{App, CliError, HandlerError};
use schema_args_core::{CliConfig, SchemaNode, compile, load_schema};
use serde_json::{Value, json};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::output::{OutputFormat, format_compiled};

#[derive(Debug, Parser)]
#[command(name = "schema-args")]
#[command(about = "Inspect and try out command lines generated from JSON Schema files")]
struct Cli {
    /// Enable debug logging on stderr (overrides RUST_LOG).
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compile a schema file and print the generated arguments.
    Inspect(InspectArgs),
    /// Parse arguments against one or more schema files and print the value.
    Parse(ParseArgs),
}

#[derive(Debug, Args)]
struct InspectArgs {
    /// JSON Schema file describing the command input.
    #[arg(long)]
    schema: PathBuf,
    /// YAML file with prefixes, exclusions and per-field overrides.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output format.
    #[arg(long, default_value = "table")]
    format: OutputFormat,
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// JSON Schema file for a single root command.
    #[arg(long, conflicts_with = "commands", required_unless_present = "commands")]
    schema: Option<PathBuf>,
    /// Named subcommand as NAME=FILE; repeat for several commands.
    #[arg(long = "command", value_name = "NAME=FILE", value_parser = parse_command_spec)]
    commands: Vec<(String, PathBuf)>,
    /// YAML file with prefixes, exclusions and per-field overrides.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Arguments to parse, after `--`.
    #[arg(last = true)]
    args: Vec<String>,
}

fn parse_command_spec(raw: &str) -> Result<(String, PathBuf), String> {
    let (name, path) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=FILE, got '{raw}'"))?;
    if name.is_empty() || path.is_empty() {
        return Err(format!("expected NAME=FILE, got '{raw}'"));
    }
    Ok((name.to_string(), PathBuf::from(path)))
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Inspect(args) => run_inspect(args),
        Command::Parse(args) => run_parse(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<CliConfig, String> {
    match path {
        Some(path) => CliConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display())),
        None => Ok(CliConfig::default()),
    }
}

fn load_node(path: &Path) -> Result<SchemaNode, String> {
    load_schema(path).map_err(|err| format!("Failed to load schema '{}': {err}", path.display()))
}

fn run_inspect(args: InspectArgs) -> Result<(), String> {
    let config = load_config(args.config.as_ref())?;
    let node = load_node(&args.schema)?;
    let compiled = compile(node, &config).map_err(|e| e.to_string())?;
    let rendered = format_compiled(&compiled, args.format)?;
    print!("{rendered}");
    if !rendered.ends_with('\n') {
        println!();
    }
    Ok(())
}

fn run_parse(args: ParseArgs) -> Result<(), String> {
    let config = load_config(args.config.as_ref())?;
    let program = args
        .schema
        .as_ref()
        .and_then(|path| path.file_stem())
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "schema-args".to_string());

    let mut app = App::new(&program).with_config(config);
    match &args.schema {
        Some(path) => {
            app.command_schema(load_node(path)?, accept)
                .map_err(|e| e.to_string())?;
        }
        None => {
            for (name, path) in &args.commands {
                app.subcommand_schema(name, load_node(path)?, accept)
                    .map_err(|e| e.to_string())?;
            }
        }
    }

    debug!(program = %program, args = args.args.len(), "Parsing trailing arguments");
    let argv = std::iter::once(program).chain(args.args);
    let invocation = match app.parse_from(argv) {
        Ok(invocation) => invocation,
        Err(CliError::Parse(err)) => err.exit(),
        Err(err) => return Err(err.to_string()),
    };
    let value = app.value_of(&invocation).map_err(|e| e.to_string())?;

    let output = match invocation.command {
        Some(command) => json!({ "command": command, "value": value }),
        None => value,
    };
    let raw = serde_json::to_string_pretty(&output)
        .map_err(|err| format!("Failed to serialize value: {err}"))?;
    println!("{raw}");
    Ok(())
}

/// Handler for commands that are only parsed, never dispatched.
fn accept(_: Value) -> Result<(), HandlerError> {
    Ok(())
}
