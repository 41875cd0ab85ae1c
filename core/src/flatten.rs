//! Path flattening of nested schemas.
//!
//! Every leaf field of a [`SchemaNode`] tree gets a [`FlatPath`] (field names
//! from the root, dot-joined) and the name of its owning node as display
//! group. Nested fields contribute no leaf of their own; their children are
//! visited with the field name appended to the prefix.

use std::collections::HashMap;

use tracing::debug;

use crate::config::CliConfig;
use crate::error::{Error, Result};
use crate::types::{CliOverrides, FieldDescriptor, FlatPath, SchemaNode};

/// A leaf field with its flat path and the context it was found in.
#[derive(Debug, Clone)]
pub struct FlatLeaf<'a> {
    pub path: FlatPath,
    /// Name of the node owning the field.
    pub group: String,
    /// Human-readable chain of `Node.field` hops from the root, used in
    /// collision reports.
    pub chain: String,
    pub field: &'a FieldDescriptor,
    /// Field overrides with the configured side table layered on top.
    pub overrides: CliOverrides,
}

/// Flattens `root` into leaves in discovery order.
///
/// Fields that are skipped (through their overrides or
/// [`CliConfig::exclude`]) are left out together with their subtrees.
///
/// # Errors
///
/// Returns [`Error::Collision`] when two field chains produce the same dotted
/// path, and [`Error::Schema`] when an excluded field cannot fall back to a
/// default.
///
/// # Examples
///
/// ```
/// use schema_args_core::{flatten, CliConfig, FieldDescriptor, ScalarKind, SchemaNode, TypeKind};
///
/// let child = SchemaNode::new("ChildConfig")
///     .with_field(FieldDescriptor::new("age", TypeKind::Scalar(ScalarKind::Integer)));
/// let root = SchemaNode::new("Config")
///     .with_field(FieldDescriptor::new("name", TypeKind::Scalar(ScalarKind::String)))
///     .with_field(FieldDescriptor::new("child", TypeKind::Nested(child)));
///
/// let leaves = flatten(&root, &CliConfig::default()).unwrap();
/// let paths: Vec<String> = leaves.iter().map(|l| l.path.to_string()).collect();
/// assert_eq!(paths, vec!["name", "child.age"]);
/// assert_eq!(leaves[1].group, "ChildConfig");
/// ```
pub fn flatten<'a>(root: &'a SchemaNode, config: &CliConfig) -> Result<Vec<FlatLeaf<'a>>> {
    let mut walker = Walker {
        config,
        seen: HashMap::new(),
        leaves: Vec::new(),
    };
    walker.visit(root, None, "")?;
    debug!(schema = %root.name, leaves = walker.leaves.len(), "Flattened schema");
    Ok(walker.leaves)
}

struct Walker<'a, 'c> {
    config: &'c CliConfig,
    /// Dotted path → chain that claimed it.
    seen: HashMap<String, String>,
    leaves: Vec<FlatLeaf<'a>>,
}

impl<'a> Walker<'a, '_> {
    fn visit(&mut self, node: &'a SchemaNode, prefix: Option<&FlatPath>, chain: &str) -> Result<()> {
        for field in &node.fields {
            let path = match prefix {
                Some(prefix) => prefix.child(&field.name),
                None => FlatPath::root(&field.name),
            };
            let link = if chain.is_empty() {
                format!("{}.{}", node.name, field.name)
            } else {
                format!("{chain} -> {}.{}", node.name, field.name)
            };

            let overrides = match self.config.overrides_for(&path) {
                Some(configured) => field.overrides.merged(configured),
                None => field.overrides.clone(),
            };
            if overrides.skip || self.config.is_excluded(&path) {
                let required = match field.nested() {
                    Some(nested) => has_required_leaf(nested),
                    None => field.is_required(),
                };
                if required {
                    return Err(Error::schema(
                        path.to_string(),
                        "an excluded field needs a default or must be nullable",
                    ));
                }
                debug!(path = %path, "Skipping excluded field");
                continue;
            }

            if let Some(nested) = field.nested() {
                self.visit(nested, Some(&path), &link)?;
                continue;
            }

            let dotted = path.to_string();
            if let Some(first) = self.seen.get(&dotted) {
                return Err(Error::Collision {
                    path: dotted,
                    first: first.clone(),
                    second: link,
                });
            }
            self.seen.insert(dotted, link.clone());

            self.leaves.push(FlatLeaf {
                path,
                group: node.name.clone(),
                chain: link,
                field,
                overrides,
            });
        }
        Ok(())
    }
}

fn has_required_leaf(node: &SchemaNode) -> bool {
    node.fields.iter().any(|field| match field.nested() {
        Some(nested) => has_required_leaf(nested),
        None => field.is_required(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CliOverrides, ScalarKind, TypeKind};

    fn string_field(name: &str) -> FieldDescriptor {
        FieldDescriptor::new(name, TypeKind::Scalar(ScalarKind::String))
    }

    fn config_tree() -> SchemaNode {
        let child = SchemaNode::new("ChildConfig")
            .with_field(string_field("name"))
            .with_field(
                FieldDescriptor::new("age", TypeKind::Scalar(ScalarKind::Integer))
                    .with_default(3.into()),
            );
        SchemaNode::new("Config")
            .with_field(string_field("name"))
            .with_field(FieldDescriptor::new("child", TypeKind::Nested(child)))
    }

    fn paths(leaves: &[FlatLeaf<'_>]) -> Vec<String> {
        leaves.iter().map(|l| l.path.to_string()).collect()
    }

    #[test]
    fn test_flatten_is_deterministic() {
        let root = config_tree();
        let config = CliConfig::default();
        let first = paths(&flatten(&root, &config).unwrap());
        let second = paths(&flatten(&root, &config).unwrap());
        assert_eq!(first, vec!["name", "child.name", "child.age"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_flatten_records_group_and_chain() {
        let root = config_tree();
        let leaves = flatten(&root, &CliConfig::default()).unwrap();
        assert_eq!(leaves[0].group, "Config");
        assert_eq!(leaves[1].group, "ChildConfig");
        assert_eq!(leaves[1].chain, "Config.child -> ChildConfig.name");
    }

    #[test]
    fn test_flatten_rejects_dotted_name_collision() {
        let root = config_tree().with_field(string_field("child.name"));
        let err = flatten(&root, &CliConfig::default()).unwrap_err();
        match err {
            Error::Collision {
                path,
                first,
                second,
            } => {
                assert_eq!(path, "child.name");
                assert_eq!(first, "Config.child -> ChildConfig.name");
                assert_eq!(second, "Config.child.name");
            }
            other => panic!("expected collision, got {other}"),
        }
    }

    #[test]
    fn test_flatten_skips_excluded_subtree() {
        let root = config_tree();
        let config = CliConfig::default().exclude("child.age");
        assert_eq!(paths(&flatten(&root, &config).unwrap()), vec!["name", "child.name"]);
    }

    #[test]
    fn test_flatten_rejects_excluding_required_field() {
        let root = config_tree();
        let config = CliConfig::default().exclude("name");
        assert!(matches!(
            flatten(&root, &config),
            Err(Error::Schema { .. })
        ));
    }

    #[test]
    fn test_flatten_rejects_excluding_subtree_with_required_leaf() {
        let root = config_tree();
        let config = CliConfig::default().exclude("child");
        assert!(flatten(&root, &config).is_err());
    }

    #[test]
    fn test_flatten_layers_configured_overrides() {
        let root = config_tree();
        let config = CliConfig::default().with_override(
            "child.name",
            CliOverrides {
                short: Some('c'),
                ..Default::default()
            },
        );
        let leaves = flatten(&root, &config).unwrap();
        assert_eq!(leaves[1].overrides.short, Some('c'));
        assert_eq!(leaves[0].overrides.short, None);
    }
}
