//! Bulk generation: many diagrams from a handful of source documents, each
//! source parsed and resolved once.

use std::collections::HashSet;
use std::path::{Path as FsPath, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::diagram::make_diagram;
use crate::document::ResolveOptions;
use crate::error::{Error, Result};
use crate::export::Format;
use crate::source::Source;
use crate::theme::Theme;

const DEFAULT_OUTPUT_DIR: &str = "diagrams";
const DEFAULT_SCHEMA_PATH: &str = "components.schemas";
const DEFAULT_PNG_SCALE: f32 = 1.0;

/// Batch manifest, read from TOML.
///
/// ```toml
/// output_dir = "diagrams"
/// format = "svg"
///
/// [[collection]]
/// name = "accounts"
/// src = "https://example.com/account-info-openapi.yaml"
/// diagrams = ["OBReadAccount6", "OBReadBalance1"]
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Manifest {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default = "default_png_scale")]
    pub png_scale: f32,
    #[serde(rename = "collection", default)]
    pub collections: Vec<CollectionSpec>,
}

/// One source document and the schemas to draw from it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CollectionSpec {
    pub name: String,
    pub src: String,
    #[serde(default = "default_schema_path")]
    pub schema_path: String,
    #[serde(default)]
    pub diagrams: Vec<String>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}
fn default_format() -> String {
    Format::Svg.extension().to_string()
}
fn default_png_scale() -> f32 {
    DEFAULT_PNG_SCALE
}
fn default_schema_path() -> String {
    DEFAULT_SCHEMA_PATH.to_string()
}

impl Manifest {
    pub fn from_toml(content: &str) -> Result<Self> {
        let manifest: Manifest =
            toml::from_str(content).map_err(|e| Error::Manifest(e.to_string()))?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn load(path: &FsPath) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn output_format(&self) -> Result<Format> {
        Format::from_extension(&self.format).map_err(|e| Error::Manifest(e.to_string()))
    }

    // Collections become directories, so names must be usable and distinct.
    fn validate(&self) -> Result<()> {
        self.output_format()?;
        let mut seen = HashSet::new();
        for collection in &self.collections {
            let name = collection.name.as_str();
            if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
                return Err(Error::Manifest(format!("invalid collection name '{}'", name)));
            }
            if !seen.insert(name) {
                return Err(Error::Manifest(format!("duplicate collection '{}'", name)));
            }
        }
        Ok(())
    }
}

/// What one collection produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionReport {
    pub collection: String,
    pub written: Vec<PathBuf>,
    /// Requested objects that the collection does not define.
    pub skipped: Vec<String>,
}

/// Settings shared by every collection of a run.
#[derive(Debug, Clone)]
pub struct BatchSettings {
    pub output_dir: PathBuf,
    pub format: Format,
    pub png_scale: f32,
    pub theme: Theme,
    pub options: ResolveOptions,
}

/// Renders every collection of `manifest` on its own thread. Results come
/// back in manifest order.
pub fn run(
    manifest: &Manifest,
    settings: &BatchSettings,
) -> Vec<(String, Result<CollectionReport>)> {
    std::thread::scope(|scope| {
        let handles: Vec<_> = manifest
            .collections
            .iter()
            .map(|spec| {
                let handle = scope.spawn(move || render_collection(spec, settings));
                (spec.name.clone(), handle)
            })
            .collect();

        handles
            .into_iter()
            .map(|(name, handle)| match handle.join() {
                Ok(result) => (name, result),
                Err(payload) => std::panic::resume_unwind(payload),
            })
            .collect()
    })
}

/// Parses one source and writes `<output_dir>/<collection>/<object>.<ext>`
/// for each requested object.
pub fn render_collection(
    spec: &CollectionSpec,
    settings: &BatchSettings,
) -> Result<CollectionReport> {
    let bytes = Source::parse(&spec.src).read()?;
    let document = crate::parse_document(&bytes, &spec.schema_path, settings.options)?;

    let dir = settings.output_dir.join(&spec.name);
    std::fs::create_dir_all(&dir).map_err(|source| Error::Io {
        path: dir.clone(),
        source,
    })?;

    let mut report = CollectionReport {
        collection: spec.name.clone(),
        ..CollectionReport::default()
    };

    for object in &spec.diagrams {
        let Some(schema) = document.get(object).filter(|schema| schema.is_mapping()) else {
            warn!(
                collection = %spec.name,
                object = %object,
                "can't find object in {}: '{}.{}'",
                spec.name,
                spec.schema_path,
                object
            );
            report.skipped.push(object.clone());
            continue;
        };

        let mut diagram = make_diagram(schema, object)?;
        let svg = diagram.to_svg(&settings.theme)?;
        let data = settings.format.encode(&svg, settings.png_scale)?;

        let path = dir.join(format!("{}.{}", object, settings.format.extension()));
        std::fs::write(&path, data).map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })?;
        report.written.push(path);
    }

    info!(
        collection = %spec.name,
        written = report.written.len(),
        skipped = report.skipped.len(),
        "collection rendered"
    );
    Ok(report)
}
