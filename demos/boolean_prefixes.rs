//! Custom enable/disable prefixes, globally and for a single field.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p schema-args-demos --example boolean_prefixes -- --on-param --false-switch
//! ```

use schema_args::{App, HandlerError};
use schema_args_core::CliConfig;
use schema_args_demos::run_or_exit;
use schemars::JsonSchema;
use serde::Deserialize;

#[derive(Debug, Deserialize, JsonSchema)]
struct Config {
    param: bool,
    #[schemars(extend("x-cli" = { "enable_prefix": "--true-", "disable_prefix": "--false-" }))]
    switch: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::default().with_prefixes("--on-", "--off-");
    let mut app = App::new("boolean_prefixes").with_config(config);
    app.command(|config: Config| {
        println!("{config:?}");
        Ok::<_, HandlerError>(())
    })?;
    run_or_exit(&app);
    Ok(())
}
