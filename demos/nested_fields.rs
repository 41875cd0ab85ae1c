//! Nested input types flatten into dotted flags, grouped in help output.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p schema-args-demos --example nested_fields -- \
//!     --name parent --child.name kid --child.is-active
//! cargo run -p schema-args-demos --example nested_fields -- --help
//! ```

use schema_args::{App, HandlerError};
use schema_args_demos::run_or_exit;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
struct ChildConfig {
    name: String,
    #[serde(default = "default_age")]
    age: i64,
    is_active: bool,
}

fn default_age() -> i64 {
    10
}

/// Parent settings with one nested child.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
struct Config {
    name: String,
    child: ChildConfig,
}

fn run(config: Config) -> Result<(), HandlerError> {
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::new("nested_fields");
    app.command(run)?;
    run_or_exit(&app);
    Ok(())
}
