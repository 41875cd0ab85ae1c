//! Registers a schema on a hand-built `clap::Command` and prints its help.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p schema-args-demos --example build_parser
//! ```

use clap::Command;
use schema_args::{register, schema_of};
use schema_args_core::{CliConfig, compile};
use schemars::JsonSchema;

#[derive(JsonSchema)]
#[allow(dead_code)]
struct Config {
    /// string parameter
    string: String,
    /// integer parameter
    integer: i64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let compiled = compile(schema_of::<Config>()?, &CliConfig::default())?;
    let mut command = register(Command::new("build_parser"), &compiled);
    command.print_help()?;
    Ok(())
}
