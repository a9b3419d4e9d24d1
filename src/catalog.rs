use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::diagram::make_diagram_at;
use crate::document::{Path, ResolveOptions, Value, object_names, select};
use crate::error::{Error, Result};
use crate::theme::Theme;

/// Parsed documents kept for reuse across requests, keyed by collection name.
///
/// Rendering only reads the cached documents, so any number of renders run
/// under the shared lock; registering a collection takes it exclusively.
#[derive(Debug, Default)]
pub struct Catalog {
    collections: RwLock<HashMap<String, Arc<Value>>>,
    options: ResolveOptions,
}

impl Catalog {
    pub fn new(options: ResolveOptions) -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            options,
        }
    }

    pub fn options(&self) -> ResolveOptions {
        self.options
    }

    /// Adds or replaces `name` with an already resolved document.
    pub fn register(&self, name: &str, document: Value) {
        let objects = object_names(&document).len();
        self.collections
            .write()
            .insert(name.to_string(), Arc::new(document));
        info!(collection = name, objects, "registered collection");
    }

    /// Parses `bytes` once, resolves the sub-document at `schema_path` and
    /// registers it as `name`.
    pub fn register_source(&self, name: &str, bytes: &[u8], schema_path: &str) -> Result<()> {
        let document = crate::parse_document(bytes, schema_path, self.options)?;
        self.register(name, document);
        Ok(())
    }

    pub fn collection(&self, name: &str) -> Option<Arc<Value>> {
        self.collections.read().get(name).cloned()
    }

    pub fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Object-typed schemas of a collection, sorted.
    pub fn list_objects(&self, collection: &str) -> Option<Vec<String>> {
        let collections = self.collections.read();
        collections.get(collection).map(|document| object_names(document))
    }

    /// Renders `object` from `collection` into `dst`. Each call builds its
    /// own composition tree.
    pub fn render<W: Write>(
        &self,
        collection: &str,
        object: &str,
        theme: &Theme,
        dst: &mut W,
    ) -> Result<()> {
        let collections = self.collections.read();
        let document = collections
            .get(collection)
            .ok_or_else(|| Error::ReferenceNotFound {
                path: collection.to_string(),
            })?;
        let path = Path::parse(object, self.options.divider);
        let schema = select(document, &path)?;
        let mut diagram = make_diagram_at(schema, &path, path.last().unwrap_or(object))?;
        diagram.render(dst, theme)
    }
}
