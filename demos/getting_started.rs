//! Two subcommands, each bound to its own input type.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p schema-args-demos --example getting_started -- command1 --string hi --integer 3
//! cargo run -p schema-args-demos --example getting_started -- command2 --help
//! ```

use schema_args::{App, HandlerError};
use schema_args_demos::run_or_exit;
use schemars::JsonSchema;
use serde::Deserialize;

#[derive(Debug, Deserialize, JsonSchema)]
struct ConfigCommand1 {
    /// string parameter
    string: String,
    /// integer parameter
    integer: i64,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct ConfigCommand2 {
    /// string parameter
    string: String,
}

fn command1(config: ConfigCommand1) -> Result<(), HandlerError> {
    println!("{config:?}");
    Ok(())
}

fn command2(config: ConfigCommand2) -> Result<(), HandlerError> {
    println!("{config:?}");
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::new("getting_started").about("Subcommands generated from two input types");
    app.subcommand("command1", command1)?
        .subcommand("command2", command2)?;
    run_or_exit(&app);
    Ok(())
}
