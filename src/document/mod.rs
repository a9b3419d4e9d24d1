//! The generic document model: deserialization, addressing, `$ref`
//! resolution and selection.

mod path;
mod resolve;
mod select;
mod value;

pub use path::{Divider, Path};
pub use resolve::{DEFAULT_MAX_DEPTH, ResolveOptions, Resolver, resolve};
pub use select::{is_object_schema, object_names, select};
pub use value::{Value, format_number};

use crate::error::Result;

/// Deserializes YAML or JSON source bytes. An empty source is `Null`.
pub fn deserialize(bytes: &[u8]) -> Result<Value> {
    let raw: serde_yaml::Value = serde_yaml::from_slice(bytes)?;
    Ok(Value::from(raw))
}
