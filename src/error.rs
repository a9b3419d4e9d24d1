use std::path::PathBuf;

/// Everything that can go wrong between reading a source document and
/// writing the last byte of a diagram.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to deserialize source document: {0}")]
    Deserialize(#[from] serde_yaml::Error),

    #[error("reference not found: '{path}'")]
    ReferenceNotFound { path: String },

    #[error("unsupported reference '{reference}' at '{at}' (only local '#/...' pointers are resolved)")]
    UnsupportedReference { reference: String, at: String },

    #[error("cyclic reference to '{path}' (chain: {})", chain.join(" -> "))]
    CyclicReference { path: String, chain: Vec<String> },

    #[error("reference chain deeper than {limit} while resolving '{path}'")]
    ReferenceTooDeep { path: String, limit: usize },

    #[error("source is not an object: '{path}'")]
    NotAnObject { path: String },

    #[error("expected {expected} at '{path}', found {found}")]
    ShapeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("failed to write diagram: {0}")]
    Write(#[source] std::io::Error),

    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch '{url}': {source}")]
    Fetch {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },

    #[error("{0}")]
    Export(String),

    #[error("invalid batch manifest: {0}")]
    Manifest(String),

    #[error("invalid theme: {0}")]
    Theme(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
