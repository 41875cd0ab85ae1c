//! Schema and argument type definitions.
//!
//! A [`SchemaNode`] is the tree side of the mapping: named, typed fields that
//! may nest further nodes. An [`ArgumentSpec`] is the flat side: one
//! command-line declaration per leaf [`FlatPath`]. [`ParsedFlat`] carries
//! parsed leaf values back from the argument parser.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Leaf value types a single command-line token can carry.
///
/// # Examples
///
/// ```
/// use schema_args_core::ScalarKind;
///
/// assert_eq!(ScalarKind::Integer.value_name(), "INT");
/// assert_eq!(ScalarKind::Path.value_name(), "PATH");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScalarKind {
    String,
    Integer,
    Float,
    Boolean,
    Path,
    /// Calendar date (`YYYY-MM-DD`).
    Date,
    /// RFC 3339 timestamp.
    DateTime,
}

impl ScalarKind {
    /// Placeholder shown in usage text for values of this kind.
    pub fn value_name(&self) -> &'static str {
        match self {
            Self::String => "TEXT",
            Self::Integer => "INT",
            Self::Float => "FLOAT",
            Self::Boolean => "BOOL",
            Self::Path => "PATH",
            Self::Date => "DATE",
            Self::DateTime => "DATETIME",
        }
    }
}

/// Declared type of a schema field.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    /// A single scalar value.
    Scalar(ScalarKind),
    /// One value out of a closed set of choices.
    Enum(Vec<String>),
    /// Zero or more values of a scalar or enum element type.
    List(Box<TypeKind>),
    /// A fixed number of positional element values.
    Tuple(Vec<TypeKind>),
    /// `key=value` pairs with a scalar or enum value type.
    Map(Box<TypeKind>),
    /// A nested schema, flattened under the field's name.
    Nested(SchemaNode),
}

impl TypeKind {
    /// Returns `true` if values of this kind can be element types of a list,
    /// tuple or map.
    pub fn is_element(&self) -> bool {
        matches!(self, Self::Scalar(_) | Self::Enum(_))
    }

    /// Returns `true` for boolean scalars, which become enable/disable pairs.
    pub fn is_boolean(&self) -> bool {
        matches!(self, Self::Scalar(ScalarKind::Boolean))
    }

    /// Returns `true` for kinds that are optional on the command line even
    /// without a default (they fall back to an empty collection).
    pub fn is_collection(&self) -> bool {
        matches!(self, Self::List(_) | Self::Map(_))
    }
}

/// Per-field command-line customization.
///
/// Read from an `x-cli` object on the property schema, or supplied through
/// [`CliConfig::overrides`](crate::CliConfig) keyed by flat path.
///
/// # Examples
///
/// ```
/// use schema_args_core::CliOverrides;
///
/// let from_schema = CliOverrides { short: Some('n'), ..Default::default() };
/// let from_config = CliOverrides { long: Some("title".into()), ..Default::default() };
///
/// let merged = from_schema.merged(&from_config);
/// assert_eq!(merged.short, Some('n'));
/// assert_eq!(merged.long.as_deref(), Some("title"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliOverrides {
    /// Long flag name without the leading dashes or boolean prefix.
    pub long: Option<String>,
    /// Extra long names accepted next to the main one, spelled like `long`.
    pub aliases: Vec<String>,
    /// Short flag letter.
    pub short: Option<char>,
    /// Enable-flag prefix for booleans (e.g. `--on-`).
    pub enable_prefix: Option<String>,
    /// Disable-flag prefix for booleans (e.g. `--off-`).
    pub disable_prefix: Option<String>,
    /// Leave the field off the command line entirely.
    pub skip: bool,
    /// Never synthesize a short flag for this field.
    pub no_short: bool,
}

impl CliOverrides {
    /// Layers `other` on top of `self`; values set in `other` win.
    pub fn merged(&self, other: &CliOverrides) -> CliOverrides {
        CliOverrides {
            long: other.long.clone().or_else(|| self.long.clone()),
            aliases: if other.aliases.is_empty() {
                self.aliases.clone()
            } else {
                other.aliases.clone()
            },
            short: other.short.or(self.short),
            enable_prefix: other
                .enable_prefix
                .clone()
                .or_else(|| self.enable_prefix.clone()),
            disable_prefix: other
                .disable_prefix
                .clone()
                .or_else(|| self.disable_prefix.clone()),
            skip: self.skip || other.skip,
            no_short: self.no_short || other.no_short,
        }
    }
}

/// One field of a [`SchemaNode`].
///
/// # Examples
///
/// ```
/// use schema_args_core::{FieldDescriptor, ScalarKind, TypeKind};
///
/// let age = FieldDescriptor::new("age", TypeKind::Scalar(ScalarKind::Integer))
///     .with_default(3.into())
///     .with_help("Age in years");
/// assert!(!age.is_required());
///
/// let name = FieldDescriptor::new("name", TypeKind::Scalar(ScalarKind::String));
/// assert!(name.is_required());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Field name, unique within its node.
    pub name: String,
    /// Declared type.
    pub kind: TypeKind,
    /// Default value, if the schema declares one.
    pub default: Option<Value>,
    /// The field accepts `null` (an `Option<T>` field).
    pub nullable: bool,
    /// Help text from the field's description.
    pub help: Option<String>,
    /// Command-line customization declared on the field.
    pub overrides: CliOverrides,
    /// Inclusive lower bound for numeric fields, or for every element of a
    /// numeric list, tuple or map.
    pub minimum: Option<f64>,
    /// Inclusive upper bound, applied like `minimum`.
    pub maximum: Option<f64>,
}

impl FieldDescriptor {
    /// Creates a required field with no help text or overrides.
    pub fn new(name: &str, kind: TypeKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            default: None,
            nullable: false,
            help: None,
            overrides: CliOverrides::default(),
            minimum: None,
            maximum: None,
        }
    }

    /// Sets the default value.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Sets the help text.
    pub fn with_help(mut self, help: &str) -> Self {
        self.help = Some(help.to_string());
        self
    }

    /// Marks the field as accepting `null`.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Replaces the command-line overrides.
    pub fn with_overrides(mut self, overrides: CliOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Sets inclusive numeric bounds.
    pub fn with_bounds(mut self, minimum: Option<f64>, maximum: Option<f64>) -> Self {
        self.minimum = minimum;
        self.maximum = maximum;
        self
    }

    /// A field is required when it has no default, is not nullable and is
    /// not a collection (collections default to empty).
    pub fn is_required(&self) -> bool {
        self.default.is_none() && !self.nullable && !self.kind.is_collection()
    }

    /// Returns the nested node if this field holds a sub-schema.
    pub fn nested(&self) -> Option<&SchemaNode> {
        match &self.kind {
            TypeKind::Nested(node) => Some(node),
            _ => None,
        }
    }
}

/// One structured-data definition: a named, ordered list of fields.
///
/// The name labels the help-output group of the node's own fields.
///
/// # Examples
///
/// ```
/// use schema_args_core::{FieldDescriptor, ScalarKind, SchemaNode, TypeKind};
///
/// let child = SchemaNode::new("ChildConfig")
///     .with_field(FieldDescriptor::new("name", TypeKind::Scalar(ScalarKind::String)));
/// let config = SchemaNode::new("Config")
///     .with_field(FieldDescriptor::new("child", TypeKind::Nested(child)));
///
/// assert_eq!(config.field("child").and_then(|f| f.nested()).map(|n| n.name.as_str()), Some("ChildConfig"));
/// assert_eq!(config.leaf_count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaNode {
    /// Display name (schema title or definition name).
    pub name: String,
    /// Description of the schema as a whole.
    pub description: Option<String>,
    /// Fields in declaration order.
    pub fields: Vec<FieldDescriptor>,
}

impl SchemaNode {
    /// Creates an empty node.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Appends a field.
    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Finds a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Number of non-nested fields across the whole subtree.
    pub fn leaf_count(&self) -> usize {
        self.fields
            .iter()
            .map(|f| f.nested().map_or(1, SchemaNode::leaf_count))
            .sum()
    }
}

/// Dot-joined path from the schema root to a leaf field.
///
/// # Examples
///
/// ```
/// use schema_args_core::FlatPath;
///
/// let path = FlatPath::root("child").child("is_active");
/// assert_eq!(path.to_string(), "child.is_active");
/// assert_eq!(path.leaf(), "is_active");
/// assert_eq!(path.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FlatPath(Vec<String>);

impl FlatPath {
    /// Creates a single-segment path.
    pub fn root(name: &str) -> Self {
        Self(vec![name.to_string()])
    }

    /// Creates a path from segments. Returns `None` for an empty list.
    pub fn from_segments<I, S>(segments: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            None
        } else {
            Some(Self(segments))
        }
    }

    /// Parses a dot-joined path (`child.age`).
    pub fn parse(dotted: &str) -> Option<Self> {
        Self::from_segments(dotted.split('.').filter(|s| !s.is_empty()))
    }

    /// Returns a new path with `name` appended.
    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(name.to_string());
        Self(segments)
    }

    /// All segments, root first.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// The last segment (the leaf field's own name).
    pub fn leaf(&self) -> &str {
        self.0.last().map(String::as_str).unwrap_or_default()
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; paths are never empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FlatPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl Serialize for FlatPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// How many values an argument consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Arity {
    /// Exactly one value.
    Single,
    /// No value; an enable/disable flag pair.
    Toggle,
    /// Zero or more values, repeatable.
    Many,
    /// A fixed number of values.
    Exact(usize),
}

/// Conversion applied by the argument parser to each raw token.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Converter {
    Scalar(ScalarKind),
    /// Value must be one of the listed choices.
    Choice(Vec<String>),
    /// `key=value`, with the value converted by the inner converter.
    KeyValue(Box<Converter>),
}

/// Command-line declaration for one leaf field.
///
/// For [`Arity::Toggle`] specs, `long` is the enable flag and `disable` holds
/// the disable flag; both address the same [`FlatPath`]. Aliases of a toggle
/// set it to true.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArgumentSpec {
    pub path: FlatPath,
    /// Long flag including its dashes (`--child.is-active`).
    pub long: String,
    /// Disable flag for boolean pairs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable: Option<String>,
    /// Further long spellings of `long`, dashes included.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short: Option<char>,
    pub arity: Arity,
    pub converter: Converter,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    /// Help-output group (name of the node owning the field).
    pub group: String,
}

impl ArgumentSpec {
    /// Returns `true` for enable/disable flag pairs.
    pub fn is_toggle(&self) -> bool {
        self.arity == Arity::Toggle
    }

    /// All flag spellings of this argument, long forms first.
    pub fn flags(&self) -> Vec<String> {
        let mut flags = vec![self.long.clone()];
        flags.extend(self.disable.clone());
        flags.extend(self.aliases.iter().cloned());
        flags.extend(self.short.map(|c| format!("-{c}")));
        flags
    }
}

/// Parsed state of a boolean flag pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Toggle {
    /// Neither flag was given; the schema default applies.
    #[default]
    Unset,
    ForcedTrue,
    ForcedFalse,
}

/// A parsed value for one flat path.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedValue {
    /// One converted value.
    Scalar(Value),
    /// Converted values of a multi-value argument, in input order.
    List(Vec<Value>),
    /// State of a boolean flag pair.
    Toggle(Toggle),
}

/// Flat mapping of parsed values keyed by path. Paths that were not given on
/// the command line are simply absent.
pub type ParsedFlat = BTreeMap<FlatPath, ParsedValue>;
