use std::collections::BTreeMap;

use tracing::debug;

use super::path::{Divider, Path};
use super::value::Value;
use crate::error::{Error, Result};

const REF_KEY: &str = "$ref";

/// Longest chain of nested references followed before giving up.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Knobs shared by resolution, selection and translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    pub divider: Divider,
    pub max_depth: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            divider: Divider::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Inlines local `$ref` pointers, reading from an immutable document.
///
/// The document is only borrowed, so any number of resolvers may share one
/// parsed source.
pub struct Resolver<'a> {
    document: &'a Value,
    options: ResolveOptions,
}

impl<'a> Resolver<'a> {
    pub fn new(document: &'a Value, options: ResolveOptions) -> Self {
        Self { document, options }
    }

    /// Returns the subtree at `path` with every reference replaced by its
    /// (recursively resolved) target.
    pub fn resolve(&self, path: &Path) -> Result<Value> {
        let node = self
            .document
            .lookup(path)
            .ok_or_else(|| Error::ReferenceNotFound {
                path: path.to_string(),
            })?;
        let mut chain = Vec::new();
        self.resolve_node(node, path, &mut chain)
    }

    fn resolve_node(&self, node: &Value, at: &Path, chain: &mut Vec<Path>) -> Result<Value> {
        match node {
            Value::Mapping(map) => {
                if let Some(reference) = map.get(REF_KEY) {
                    return self.follow(reference, at, chain);
                }

                let resolved = map
                    .iter()
                    .map(|(key, value)| {
                        let resolved = self.resolve_node(value, &at.child(key), chain)?;
                        Ok((key.clone(), resolved))
                    })
                    .collect::<Result<BTreeMap<_, _>>>()?;
                Ok(Value::Mapping(resolved))
            }
            Value::Sequence(items) => {
                let resolved = items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| self.resolve_node(item, &at.index(index), chain))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Value::Sequence(resolved))
            }
            scalar => Ok(scalar.clone()),
        }
    }

    // Sibling keys of `$ref` are dropped: the target replaces the whole node.
    fn follow(&self, reference: &Value, at: &Path, chain: &mut Vec<Path>) -> Result<Value> {
        let target = reference
            .as_str()
            .and_then(|r| Path::from_reference(r, self.options.divider))
            .ok_or_else(|| Error::UnsupportedReference {
                reference: reference.to_string(),
                at: at.to_string(),
            })?;

        if chain.contains(&target) {
            let mut names: Vec<String> = chain.iter().map(Path::to_string).collect();
            names.push(target.to_string());
            return Err(Error::CyclicReference {
                path: target.to_string(),
                chain: names,
            });
        }
        if chain.len() >= self.options.max_depth {
            return Err(Error::ReferenceTooDeep {
                path: target.to_string(),
                limit: self.options.max_depth,
            });
        }

        let node = self
            .document
            .lookup(&target)
            .ok_or_else(|| Error::ReferenceNotFound {
                path: target.to_string(),
            })?;
        debug!(from = %at, to = %target, "following reference");

        chain.push(target.clone());
        let resolved = self.resolve_node(node, &target, chain);
        chain.pop();
        resolved
    }
}

/// Resolves `path` within `document` in one call.
pub fn resolve(document: &Value, path: &Path, options: ResolveOptions) -> Result<Value> {
    Resolver::new(document, options).resolve(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn json(src: &str) -> Value {
        Value::from(serde_yaml::from_str::<serde_yaml::Value>(src).expect("valid json"))
    }

    fn path(text: &str) -> Path {
        Path::parse(text, Divider::default())
    }

    fn contains_ref(value: &Value) -> bool {
        match value {
            Value::Mapping(map) => map.contains_key(REF_KEY) || map.values().any(contains_ref),
            Value::Sequence(items) => items.iter().any(contains_ref),
            _ => false,
        }
    }

    #[test]
    fn reference_resolves_like_its_target() {
        let doc = json(r##"{"A": {"$ref": "#/B"}, "B": {"type": "object", "properties": {}}}"##);
        let via_ref = resolve(&doc, &path("A"), ResolveOptions::default()).expect("A");
        let direct = resolve(&doc, &path("B"), ResolveOptions::default()).expect("B");
        assert_eq!(via_ref, direct);
    }

    #[test]
    fn siblings_of_ref_are_discarded() {
        let doc = json(r##"{"A": {"$ref": "#/B", "description": "dropped"}, "B": {"type": "string"}}"##);
        let resolved = resolve(&doc, &path("A"), ResolveOptions::default()).expect("A");
        assert_eq!(resolved, json(r#"{"type": "string"}"#));
    }

    #[test]
    fn nested_and_listed_references_are_inlined() {
        let doc = json(
            r##"{
                "components": {"schemas": {
                    "Tag": {"type": "object", "properties": {"name": {"type": "string"}}},
                    "Pet": {"type": "object", "properties": {
                        "tag": {"$ref": "#/components/schemas/Tag"},
                        "tags": {"type": "array", "items": {"$ref": "#/components/schemas/Tag"}},
                        "alt": {"oneOf": [{"$ref": "#/components/schemas/Tag"}]}
                    }}
                }}
            }"##,
        );
        let pet = resolve(&doc, &path("components.schemas.Pet"), ResolveOptions::default())
            .expect("Pet");
        assert!(!contains_ref(&pet));
        let tag = doc.lookup(&path("components.schemas.Tag")).expect("Tag");
        assert_eq!(pet.lookup(&path("properties.tag")), Some(tag));
        assert_eq!(pet.lookup(&path("properties.tags.items")), Some(tag));
        assert_eq!(pet.lookup(&path("properties.alt.oneOf.0")), Some(tag));
    }

    #[test]
    fn shared_definition_resolves_identically_at_every_site() {
        let doc = json(
            r##"{"Money": {"type": "object", "properties": {"amount": {"type": "number"}}},
                 "Order": {"type": "object", "properties": {
                    "net": {"$ref": "#/Money"}, "gross": {"$ref": "#/Money"}}}}"##,
        );
        let first = resolve(&doc, &path("Order"), ResolveOptions::default()).expect("first");
        let second = resolve(&doc, &path("Order"), ResolveOptions::default()).expect("second");
        assert_eq!(first, second);
        assert_eq!(first.lookup(&path("properties.net")), first.lookup(&path("properties.gross")));
    }

    #[test]
    fn missing_target_names_the_path() {
        let doc = json(r##"{"A": {"$ref": "#/components/schemas/Nope"}}"##);
        let err = resolve(&doc, &path("A"), ResolveOptions::default()).unwrap_err();
        assert!(
            matches!(err, Error::ReferenceNotFound { ref path } if path == "components.schemas.Nope")
        );
    }

    #[test]
    fn missing_start_path_is_not_found() {
        let doc = json(r#"{"A": {}}"#);
        let err = resolve(&doc, &path("B.C"), ResolveOptions::default()).unwrap_err();
        assert!(matches!(err, Error::ReferenceNotFound { ref path } if path == "B.C"));
    }

    #[test]
    fn mutual_references_fail_instead_of_recursing() {
        let doc = json(r##"{"A": {"$ref": "#/B"}, "B": {"$ref": "#/A"}}"##);
        let err = resolve(&doc, &path("A"), ResolveOptions::default()).unwrap_err();
        assert!(matches!(err, Error::CyclicReference { .. }), "{err}");
    }

    #[test]
    fn self_referencing_schema_is_a_cycle() {
        let doc = json(
            r##"{"Node": {"type": "object", "properties": {
                    "value": {"type": "string"},
                    "children": {"type": "array", "items": {"$ref": "#/Node"}}}}}"##,
        );
        let err = resolve(&doc, &path("Node"), ResolveOptions::default()).unwrap_err();
        match err {
            Error::CyclicReference { path, chain } => {
                assert_eq!(path, "Node");
                assert_eq!(chain, vec!["Node".to_string(), "Node".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn long_chains_hit_the_depth_limit() {
        let doc = json(r##"{"A": {"$ref": "#/B"}, "B": {"$ref": "#/C"}, "C": {"$ref": "#/D"}, "D": {"type": "string"}}"##);
        let shallow = ResolveOptions {
            max_depth: 2,
            ..ResolveOptions::default()
        };
        let err = resolve(&doc, &path("A"), shallow).unwrap_err();
        assert!(matches!(err, Error::ReferenceTooDeep { limit: 2, .. }), "{err}");
        assert!(resolve(&doc, &path("A"), ResolveOptions::default()).is_ok());
    }

    #[test]
    fn non_local_reference_is_rejected() {
        let doc = json(r##"{"A": {"$ref": "other.yaml#/B"}}"##);
        let err = resolve(&doc, &path("A"), ResolveOptions::default()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedReference { .. }));
    }

    #[test]
    fn custom_divider_applies_to_references() {
        let doc = json(r##"{"defs": {"v1.0": {"type": "string"}}, "A": {"$ref": "#/defs/v1.0"}}"##);
        let options = ResolveOptions {
            divider: Divider::new(':'),
            ..ResolveOptions::default()
        };
        let resolved = resolve(&doc, &Path::parse("A", options.divider), options).expect("A");
        assert_eq!(resolved, json(r#"{"type": "string"}"#));
    }

    fn ref_free_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            (-1000i32..1000).prop_map(|n| Value::Number(n as f64)),
            "[a-z]{0,8}".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 32, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Sequence),
                prop::collection::btree_map("[a-z]{1,6}", inner, 0..4).prop_map(Value::Mapping),
            ]
        })
    }

    proptest! {
        #[test]
        fn ref_free_documents_resolve_verbatim(doc in ref_free_value()) {
            let resolved = resolve(&doc, &Path::root(), ResolveOptions::default()).expect("no refs");
            prop_assert_eq!(resolved, doc);
        }
    }
}
