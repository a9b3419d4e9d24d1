//! Renders JSON Schema object composition, as found in OpenAPI documents,
//! as UML-style class-box diagrams in SVG.
//!
//! The pipeline is `bytes -> Value -> resolved Value -> Diagram -> SVG`:
//!
//! ```no_run
//! # fn main() -> schemabox::Result<()> {
//! let source = std::fs::read("openapi.yaml").expect("readable");
//! let options = schemabox::ResolveOptions::default();
//! let mut diagram = schemabox::parse_to_diagram(&source, "components.schemas.Pet", options)?;
//! diagram.render(&mut std::io::stdout(), &schemabox::Theme::default())?;
//! # Ok(())
//! # }
//! ```
//!
//! To draw many diagrams from one source, resolve it once with
//! [`parse_document`] and call [`make_diagram`] per schema.

pub mod batch;
pub mod catalog;
pub mod diagram;
pub mod document;
mod error;
pub mod export;
pub mod logging;
pub mod source;
pub mod theme;

pub use catalog::Catalog;
pub use diagram::{Diagram, LayoutEngine, Object, make_diagram};
pub use document::{Divider, Path, ResolveOptions, Value};
pub use error::{Error, Result};
pub use theme::Theme;

/// Root name used when the whole document is selected.
const DOCUMENT_ROOT_NAME: &str = "document";

/// Deserializes `bytes` and resolves every reference below `path`.
pub fn parse_document(bytes: &[u8], path: &str, options: ResolveOptions) -> Result<Value> {
    let document = document::deserialize(bytes)?;
    document::resolve(&document, &Path::parse(path, options.divider), options)
}

/// One diagram for the schema at `selector`, its root named after the last
/// selector segment.
pub fn parse_to_diagram(bytes: &[u8], selector: &str, options: ResolveOptions) -> Result<Diagram> {
    let schema = parse_document(bytes, selector, options)?;
    let path = Path::parse(selector, options.divider);
    diagram::make_diagram_at(&schema, &path, path.last().unwrap_or(DOCUMENT_ROOT_NAME))
}
