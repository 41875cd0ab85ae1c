//! Command registration and dispatch.
//!
//! An [`App`] holds either one root command (schema flags directly on the
//! program) or any number of named subcommands, each compiled from its own
//! schema. Parsing builds a fresh `clap::Command`, reads the invoked
//! command's flat values and hands the reconstructed value to its handler.

use std::ffi::OsString;

use clap::Command;
use schema_args_core::{CliConfig, CompiledSchema, Error, ParsedFlat, SchemaNode, compile};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{CliError, HandlerError, Result};
use crate::matches::flat_from_matches;
use crate::register::register;
use crate::schema::schema_of;

type Handler = Box<dyn Fn(Value) -> Result<()>>;

/// Subcommand clap adds on its own next to registered subcommands.
const HELP_COMMAND: &str = "help";

struct Registration {
    name: String,
    compiled: Option<CompiledSchema>,
    handler: Handler,
}

impl Registration {
    fn arguments(&self) -> &[schema_args_core::ArgumentSpec] {
        self.compiled.as_ref().map(CompiledSchema::arguments).unwrap_or_default()
    }

    fn value(&self, flat: &ParsedFlat) -> Result<Value> {
        match &self.compiled {
            Some(compiled) => Ok(compiled.reconstruct(flat)?),
            None => Ok(Value::Object(Map::new())),
        }
    }
}

/// The result of parsing a command line: which command was invoked and the
/// flat values given for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    /// Subcommand name; `None` for a root command.
    pub command: Option<String>,
    pub flat: ParsedFlat,
}

/// Schema-driven command-line application.
///
/// Schemas are compiled when they are registered, using the [`CliConfig`]
/// set at that point, so configure the app before registering commands.
///
/// # Examples
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// use schemars::JsonSchema;
/// use schema_args::App;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, JsonSchema)]
/// struct Greet {
///     name: String,
///     #[serde(default = "default_times")]
///     times: u32,
/// }
///
/// fn default_times() -> u32 {
///     1
/// }
///
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let sink = Rc::clone(&seen);
///
/// let mut app = App::new("hello");
/// app.subcommand("greet", move |greet: Greet| {
///     sink.borrow_mut().push(format!("{} x{}", greet.name, greet.times));
///     Ok::<_, std::convert::Infallible>(())
/// })
/// .unwrap();
///
/// app.run_from(["hello", "greet", "--name", "Ada"]).unwrap();
/// assert_eq!(seen.borrow().as_slice(), ["Ada x1"]);
/// ```
pub struct App {
    name: String,
    about: Option<String>,
    config: CliConfig,
    root: Option<Registration>,
    commands: Vec<Registration>,
}

impl App {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            about: None,
            config: CliConfig::default(),
            root: None,
            commands: Vec::new(),
        }
    }

    /// Sets the program description shown in help output.
    pub fn about(mut self, about: &str) -> Self {
        self.about = Some(about.to_string());
        self
    }

    /// Sets the configuration used to compile schemas registered afterwards.
    pub fn with_config(mut self, config: CliConfig) -> Self {
        self.config = config;
        self
    }

    /// Registers the root command from a `schemars`-derived type.
    ///
    /// # Errors
    ///
    /// Fails with a compile error from the schema, or with
    /// [`Error::InvalidRegistration`] if a root command or subcommands are
    /// already registered.
    pub fn command<T, F, E>(&mut self, handler: F) -> Result<&mut Self>
    where
        T: JsonSchema + DeserializeOwned,
        F: Fn(T) -> std::result::Result<(), E> + 'static,
        E: Into<HandlerError>,
    {
        let node = schema_of::<T>()?;
        let handler = typed_handler(node.name.clone(), handler);
        self.register_root(node, handler)
    }

    /// Registers the root command from a schema node; the handler receives
    /// the reconstructed JSON value.
    pub fn command_schema<F, E>(&mut self, node: SchemaNode, handler: F) -> Result<&mut Self>
    where
        F: Fn(Value) -> std::result::Result<(), E> + 'static,
        E: Into<HandlerError>,
    {
        self.register_root(node, value_handler(handler))
    }

    /// Registers a named subcommand from a `schemars`-derived type.
    ///
    /// # Errors
    ///
    /// Fails with a compile error from the schema, [`Error::DuplicateCommand`]
    /// if `name` is taken, or [`Error::InvalidRegistration`] if a root
    /// command is registered or `name` is empty or `help`.
    pub fn subcommand<T, F, E>(&mut self, name: &str, handler: F) -> Result<&mut Self>
    where
        T: JsonSchema + DeserializeOwned,
        F: Fn(T) -> std::result::Result<(), E> + 'static,
        E: Into<HandlerError>,
    {
        let node = schema_of::<T>()?;
        let handler = typed_handler(node.name.clone(), handler);
        self.register_named(name, Some(node), handler)
    }

    /// Registers a named subcommand from a schema node.
    pub fn subcommand_schema<F, E>(&mut self, name: &str, node: SchemaNode, handler: F) -> Result<&mut Self>
    where
        F: Fn(Value) -> std::result::Result<(), E> + 'static,
        E: Into<HandlerError>,
    {
        self.register_named(name, Some(node), value_handler(handler))
    }

    /// Registers a named subcommand that takes no arguments.
    pub fn subcommand_fn<F, E>(&mut self, name: &str, handler: F) -> Result<&mut Self>
    where
        F: Fn() -> std::result::Result<(), E> + 'static,
        E: Into<HandlerError>,
    {
        self.register_named(name, None, value_handler(move |_| handler()))
    }

    fn register_root(&mut self, node: SchemaNode, handler: Handler) -> Result<&mut Self> {
        if self.root.is_some() || !self.commands.is_empty() {
            return Err(Error::InvalidRegistration(
                "a root command cannot be combined with other commands".to_string(),
            )
            .into());
        }
        let compiled = compile(node, &self.config)?;
        debug!(app = %self.name, schema = %compiled.node().name, "Registered root command");
        self.root = Some(Registration {
            name: self.name.clone(),
            compiled: Some(compiled),
            handler,
        });
        Ok(self)
    }

    fn register_named(
        &mut self,
        name: &str,
        node: Option<SchemaNode>,
        handler: Handler,
    ) -> Result<&mut Self> {
        if self.root.is_some() {
            return Err(Error::InvalidRegistration(format!(
                "cannot add subcommand `{name}` next to a root command"
            ))
            .into());
        }
        if name.trim().is_empty() {
            return Err(Error::InvalidRegistration("command names cannot be empty".to_string()).into());
        }
        if name == HELP_COMMAND {
            return Err(Error::InvalidRegistration(format!(
                "`{HELP_COMMAND}` is generated by the parser and cannot be registered"
            ))
            .into());
        }
        if self.commands.iter().any(|registration| registration.name == name) {
            return Err(Error::DuplicateCommand(name.to_string()).into());
        }
        let compiled = node.map(|node| compile(node, &self.config)).transpose()?;
        debug!(app = %self.name, command = name, "Registered subcommand");
        self.commands.push(Registration {
            name: name.to_string(),
            compiled,
            handler,
        });
        Ok(self)
    }

    /// Names of the registered subcommands, in registration order.
    pub fn command_names(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().map(|registration| registration.name.as_str())
    }

    /// Builds the `clap::Command` for everything registered so far.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRegistration`] when nothing is registered.
    pub fn clap_command(&self) -> Result<Command> {
        let mut command = Command::new(self.name.clone());
        if let Some(about) = &self.about {
            command = command.about(about.clone());
        }

        if let Some(root) = &self.root {
            if let Some(compiled) = &root.compiled {
                command = register(command, compiled);
            }
            return Ok(command);
        }
        if self.commands.is_empty() {
            return Err(Error::InvalidRegistration("no commands registered".to_string()).into());
        }

        command = command.subcommand_required(true);
        for registration in &self.commands {
            let mut sub = Command::new(registration.name.clone());
            if let Some(compiled) = &registration.compiled {
                if let Some(description) = &compiled.node().description {
                    sub = sub.about(description.clone());
                }
                sub = register(sub, compiled);
            }
            command = command.subcommand(sub);
        }
        Ok(command)
    }

    /// Parses `args` (program name first) without running any handler.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Parse`] for anything clap rejects (including
    /// `--help`), and [`Error::Conflict`] for contradicting boolean flags.
    pub fn parse_from<I, T>(&self, args: I) -> Result<Invocation>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self.clap_command()?.try_get_matches_from(args)?;

        if let Some(root) = &self.root {
            let flat = flat_from_matches(&matches, root.arguments())?;
            return Ok(Invocation { command: None, flat });
        }

        let (name, sub_matches) = matches
            .subcommand()
            .ok_or_else(|| Error::CommandNotFound(String::new()))?;
        let registration = self.find(name)?;
        let flat = flat_from_matches(sub_matches, registration.arguments())?;
        Ok(Invocation {
            command: Some(name.to_string()),
            flat,
        })
    }

    /// Reconstructs the value of a parsed invocation.
    pub fn value_of(&self, invocation: &Invocation) -> Result<Value> {
        self.lookup(invocation.command.as_deref())?.value(&invocation.flat)
    }

    /// Reconstructs the value for `command` from `flat` and runs its handler.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CommandNotFound`] for unknown names, reconstruction
    /// errors, and [`CliError::Handler`] for handler failures.
    pub fn dispatch(&self, command: Option<&str>, flat: &ParsedFlat) -> Result<()> {
        let registration = self.lookup(command)?;
        let value = registration.value(flat)?;
        debug!(command = %registration.name, "Dispatching");
        (registration.handler)(value)
    }

    /// Parses `args` and dispatches to the invoked command.
    pub fn run_from<I, T>(&self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let invocation = self.parse_from(args)?;
        self.dispatch(invocation.command.as_deref(), &invocation.flat)
    }

    /// Parses the process arguments and dispatches.
    pub fn run(&self) -> Result<()> {
        self.run_from(std::env::args_os())
    }

    fn lookup(&self, command: Option<&str>) -> Result<&Registration> {
        match (command, &self.root) {
            (None, Some(root)) => Ok(root),
            (Some(name), None) => self.find(name),
            (None, None) => Err(Error::CommandNotFound(String::new()).into()),
            (Some(name), Some(_)) => Err(Error::CommandNotFound(name.to_string()).into()),
        }
    }

    fn find(&self, name: &str) -> Result<&Registration> {
        self.commands
            .iter()
            .find(|registration| registration.name == name)
            .ok_or_else(|| Error::CommandNotFound(name.to_string()).into())
    }
}

fn typed_handler<T, F, E>(schema: String, handler: F) -> Handler
where
    T: DeserializeOwned,
    F: Fn(T) -> std::result::Result<(), E> + 'static,
    E: Into<HandlerError>,
{
    Box::new(move |value| {
        let typed = serde_json::from_value::<T>(value).map_err(|e| Error::Validation {
            path: schema.clone(),
            message: e.to_string(),
        })?;
        handler(typed).map_err(|e| CliError::Handler(e.into()))
    })
}

fn value_handler<F, E>(handler: F) -> Handler
where
    F: Fn(Value) -> std::result::Result<(), E> + 'static,
    E: Into<HandlerError>,
{
    Box::new(move |value| handler(value).map_err(|e| CliError::Handler(e.into())))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use schema_args_core::{FieldDescriptor, ScalarKind, TypeKind};
    use serde_json::json;

    use super::*;

    fn named(field: &str, kind: ScalarKind) -> SchemaNode {
        SchemaNode::new("Args").with_field(FieldDescriptor::new(field, TypeKind::Scalar(kind)))
    }

    fn ok(_: Value) -> std::result::Result<(), HandlerError> {
        Ok(())
    }

    #[test]
    fn test_duplicate_subcommand_is_rejected() {
        let mut app = App::new("prog");
        app.subcommand_schema("run", named("a", ScalarKind::String), ok).unwrap();
        let err = app
            .subcommand_schema("run", named("b", ScalarKind::String), ok)
            .err()
            .unwrap();
        assert!(matches!(err, CliError::Core(Error::DuplicateCommand(ref name)) if name == "run"));
    }

    #[test]
    fn test_help_subcommand_is_reserved() {
        let mut app = App::new("prog");
        let err = app.subcommand_fn("help", || Ok::<_, HandlerError>(())).err().unwrap();
        assert!(matches!(err, CliError::Core(Error::InvalidRegistration(_))));
        assert!(app.subcommand_schema("help", named("a", ScalarKind::String), ok).is_err());
        assert_eq!(app.command_names().count(), 0);

        app.subcommand_fn("version", || Ok::<_, HandlerError>(())).unwrap();
        let err = app.parse_from(["prog", "help"]).unwrap_err();
        assert!(err.as_parse_error().is_some());
    }

    #[test]
    fn test_root_and_subcommands_do_not_mix() {
        let mut app = App::new("prog");
        app.command_schema(named("a", ScalarKind::String), ok).unwrap();
        assert!(matches!(
            app.subcommand_fn("other", || Ok::<_, HandlerError>(())).err(),
            Some(CliError::Core(Error::InvalidRegistration(_)))
        ));
    }

    #[test]
    fn test_compile_error_registers_nothing() {
        let node = named("is_active", ScalarKind::String)
            .with_field(FieldDescriptor::new("is-active", TypeKind::Scalar(ScalarKind::String)));
        let mut app = App::new("prog");
        assert!(app.subcommand_schema("run", node, ok).is_err());
        assert_eq!(app.command_names().count(), 0);
        assert!(app.clap_command().is_err());
    }

    #[test]
    fn test_root_command_parses_flags_directly() {
        let mut app = App::new("prog");
        app.command_schema(named("count", ScalarKind::Integer), ok).unwrap();
        let invocation = app.parse_from(["prog", "--count", "4"]).unwrap();
        assert_eq!(invocation.command, None);
        assert_eq!(app.value_of(&invocation).unwrap(), json!({ "count": 4 }));
    }

    #[test]
    fn test_schemaless_command_gets_empty_object() {
        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        let mut app = App::new("prog");
        app.subcommand_schema("run", named("a", ScalarKind::String), move |value| {
            sink.replace(Some(value));
            Ok::<_, HandlerError>(())
        })
        .unwrap();
        app.subcommand_fn("version", || Ok::<_, HandlerError>(())).unwrap();

        let invocation = app.parse_from(["prog", "version"]).unwrap();
        assert_eq!(app.value_of(&invocation).unwrap(), json!({}));
        app.run_from(["prog", "run", "--a", "x"]).unwrap();
        assert_eq!(*seen.borrow(), Some(json!({ "a": "x" })));
    }

    #[test]
    fn test_dispatch_unknown_command() {
        let mut app = App::new("prog");
        app.subcommand_fn("known", || Ok::<_, HandlerError>(())).unwrap();
        let err = app.dispatch(Some("missing"), &ParsedFlat::new()).unwrap_err();
        assert!(matches!(err, CliError::Core(Error::CommandNotFound(ref name)) if name == "missing"));
    }

    #[test]
    fn test_handler_errors_propagate() {
        let mut app = App::new("prog");
        app.subcommand_fn("fail", || Err::<(), _>("boom")).unwrap();
        let err = app.run_from(["prog", "fail"]).unwrap_err();
        assert!(matches!(err, CliError::Handler(_)));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_unknown_subcommand_is_parse_error() {
        let mut app = App::new("prog");
        app.subcommand_fn("known", || Ok::<_, HandlerError>(())).unwrap();
        assert!(app.parse_from(["prog", "unknown"]).unwrap_err().as_parse_error().is_some());
    }
}
