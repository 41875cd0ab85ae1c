//! A single root command: the schema's flags go directly on the program.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p schema-args-demos --example root_command -- --name Ada --age 36 --enable-is-active
//! ```

use schema_args::{App, HandlerError};
use schema_args_demos::run_or_exit;
use schemars::JsonSchema;
use serde::Deserialize;

#[derive(Debug, Deserialize, JsonSchema)]
struct Config {
    name: String,
    age: i64,
    is_active: bool,
}

fn launch(config: Config) -> Result<(), HandlerError> {
    println!("{config:?}");
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::new("root_command");
    app.command(launch)?;
    run_or_exit(&app);
    Ok(())
}
