use tracing::debug;

use super::types::{Composition, Diagram, Object, Property, Relationship};
use crate::document::{Path, Value, is_object_schema};
use crate::error::{Error, Result};

/// Scalar constraints shown in a property's description, in display order.
const CONSTRAINT_FIELDS: &[&str] = &["format", "minLength", "maxLength", "description"];
const ENUM_FIELDS: &[&str] = &["enum", "x-namespaced-enum"];
const TRAILING_FIELDS: &[&str] = &["pattern", "minimum", "maximum", "minItems", "maxItems"];

/// Builds the composition tree for an already resolved schema, naming the
/// root `name`.
pub fn make_diagram(schema: &Value, name: &str) -> Result<Diagram> {
    make_diagram_at(schema, &Path::root().child(name), name)
}

/// Like [`make_diagram`] for a schema selected at `at`, which errors report in
/// full.
pub fn make_diagram_at(schema: &Value, at: &Path, name: &str) -> Result<Diagram> {
    if !schema.is_mapping() {
        return Err(Error::NotAnObject {
            path: at.to_string(),
        });
    }

    let mut root = Object::new(name);
    root.description = schema.get_str("description").unwrap_or_default().to_string();
    parse_properties(schema, &mut root, at)?;

    debug!(
        root = %root.name,
        objects = root.walk().len(),
        "translated schema"
    );
    Ok(Diagram { root })
}

/// Adds the properties of the object schema `node` to `parent`: scalars as
/// [`Property`] rows, objects and arrays of objects or arrays as composed
/// children.
///
/// Schemas without `type: object` contribute nothing. Properties are visited
/// in sorted key order.
pub fn parse_properties(node: &Value, parent: &mut Object, at: &Path) -> Result<()> {
    if !is_object_schema(node) {
        return Ok(());
    }
    let Some(properties) = node.get("properties") else {
        return Ok(());
    };
    let properties_at = at.child("properties");
    let required = required_names(node);

    // BTreeMap iteration is already lexicographic.
    for (key, schema) in properties.expect_mapping(&properties_at)? {
        let here = properties_at.child(key);
        schema.expect_mapping(&here)?;
        let is_required = required.iter().any(|name| same_name(name, key));

        match schema.get_str("type") {
            Some("object") => {
                let mut child = child_object(key, schema, None);
                parse_properties(schema, &mut child, &here)?;
                parent.composed_of.push(Composition {
                    relationship: Relationship::new(is_required, false),
                    object: child,
                });
            }
            Some("array") => {
                let relationship = Relationship::new(is_required, true);
                let items_at = here.child("items");
                let items = schema.get("items");
                if let Some(items) = items {
                    items.expect_mapping(&items_at)?;
                }

                match items {
                    Some(items) if is_composite(items) => {
                        let (element, element_at) = innermost_items(items, items_at)?;
                        let mut child = child_object(key, schema, Some(element));
                        parse_properties(element, &mut child, &element_at)?;
                        parent.composed_of.push(Composition {
                            relationship,
                            object: child,
                        });
                    }
                    items => parent.properties.push(Property {
                        name: key.clone(),
                        description: describe_array(schema, items),
                        relationship,
                    }),
                }
            }
            _ => parent.properties.push(Property {
                name: key.clone(),
                description: describe(schema.get_str("type"), |field| schema.get(field)),
                relationship: Relationship::new(is_required, false),
            }),
        }
    }

    Ok(())
}

fn required_names(node: &Value) -> Vec<&str> {
    node.get("required")
        .and_then(Value::as_sequence)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

fn is_composite(schema: &Value) -> bool {
    matches!(schema.get_str("type"), Some("object") | Some("array"))
}

fn child_object(name: &str, schema: &Value, items: Option<&Value>) -> Object {
    let mut child = Object::new(name);
    child.description = schema
        .get_str("description")
        .or_else(|| items.and_then(|items| items.get_str("description")))
        .unwrap_or_default()
        .to_string();
    child
}

/// Follows `items` through nested arrays down to the element schema, which
/// supplies the properties of an array-typed composition.
fn innermost_items(mut items: &Value, mut items_at: Path) -> Result<(&Value, Path)> {
    while items.get_str("type") == Some("array") {
        let Some(inner) = items.get("items") else {
            break;
        };
        items_at = items_at.child("items");
        inner.expect_mapping(&items_at)?;
        items = inner;
    }

    Ok((items, items_at))
}

fn describe_array(array: &Value, items: Option<&Value>) -> String {
    let type_label = match items.and_then(|items| items.get_str("type")) {
        Some(item_type) => format!("array of {}", item_type),
        None => "array".to_string(),
    };
    describe(Some(&type_label), |field| {
        array
            .get(field)
            .or_else(|| items.and_then(|items| items.get(field)))
    })
}

fn describe<'a>(type_label: Option<&str>, field: impl Fn(&str) -> Option<&'a Value>) -> String {
    let mut lines = Vec::new();

    if let Some(type_label) = type_label {
        lines.push(format!("type: {}", type_label));
    }
    for &name in CONSTRAINT_FIELDS {
        if let Some(value) = field(name) {
            lines.push(format!("{}: {}", name, value));
        }
    }
    for &name in ENUM_FIELDS {
        if let Some(values) = field(name).and_then(Value::as_sequence) {
            lines.push("Values:".to_string());
            lines.extend(values.iter().map(|value| format!("  - {}", value)));
        }
    }
    for &name in TRAILING_FIELDS {
        if let Some(value) = field(name) {
            lines.push(format!("{}: {}", name, value));
        }
    }

    lines.join("\n")
}
