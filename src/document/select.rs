use super::path::Path;
use super::value::Value;
use crate::error::{Error, Result};

/// Sub-document at `path`, or `ReferenceNotFound` naming the path.
pub fn select<'a>(document: &'a Value, path: &Path) -> Result<&'a Value> {
    document.lookup(path).ok_or_else(|| Error::ReferenceNotFound {
        path: path.to_string(),
    })
}

/// A schema node declaring `type: object`.
pub fn is_object_schema(value: &Value) -> bool {
    value.get_str("type") == Some("object")
}

/// Keys of `collection` whose schemas are object-typed, in sorted order.
/// Non-mappings list nothing.
pub fn object_names(collection: &Value) -> Vec<String> {
    collection
        .as_mapping()
        .map(|map| {
            map.iter()
                .filter(|(_, schema)| is_object_schema(schema))
                .map(|(name, _)| name.clone())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::path::Divider;

    fn yaml(src: &str) -> Value {
        Value::from(serde_yaml::from_str::<serde_yaml::Value>(src).expect("valid yaml"))
    }

    #[test]
    fn lists_only_object_schemas() {
        let schemas = yaml(
            "Zebra:\n  type: object\nId:\n  type: string\nAccount:\n  type: object\nLoose: 3\n",
        );
        assert_eq!(object_names(&schemas), vec!["Account", "Zebra"]);
        assert!(object_names(&Value::Null).is_empty());
    }

    #[test]
    fn select_reports_missing_paths() {
        let doc = yaml("components:\n  schemas: {}\n");
        assert!(select(&doc, &Path::parse("components.schemas", Divider::default())).is_ok());
        let err =
            select(&doc, &Path::parse("components.responses", Divider::default())).unwrap_err();
        assert_eq!(err.to_string(), "reference not found: 'components.responses'");
    }
}
