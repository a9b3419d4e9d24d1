use std::io::Read;
use std::path::PathBuf;

use tracing::debug;

use crate::error::{Error, Result};

/// Where a source document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Stdin,
    File(PathBuf),
    Remote(String),
}

impl Source {
    /// `-` is stdin, `http(s)://` is fetched, `file://` and anything else is
    /// a local path.
    pub fn parse(spec: &str) -> Self {
        if spec == "-" {
            Source::Stdin
        } else if spec.starts_with("http://") || spec.starts_with("https://") {
            Source::Remote(spec.to_string())
        } else if let Some(path) = spec.strip_prefix("file://") {
            Source::File(PathBuf::from(path))
        } else {
            Source::File(PathBuf::from(spec))
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Source::Remote(_))
    }

    /// Reads the whole document. Remote sources must answer with a 2xx status.
    pub fn read(&self) -> Result<Vec<u8>> {
        match self {
            Source::Stdin => {
                let mut buffer = Vec::new();
                std::io::stdin()
                    .read_to_end(&mut buffer)
                    .map_err(|source| Error::Io {
                        path: PathBuf::from("-"),
                        source,
                    })?;
                Ok(buffer)
            }
            Source::File(path) => std::fs::read(path).map_err(|source| Error::Io {
                path: path.clone(),
                source,
            }),
            Source::Remote(url) => fetch(url),
        }
    }
}

fn fetch(url: &str) -> Result<Vec<u8>> {
    let fetch_error = |source: ureq::Error| Error::Fetch {
        url: url.to_string(),
        source: Box::new(source),
    };

    debug!(%url, "fetching source document");
    let mut response = ureq::get(url).call().map_err(fetch_error)?;
    response
        .body_mut()
        .with_config()
        .limit(64 * 1024 * 1024)
        .read_to_vec()
        .map_err(fetch_error)
}
