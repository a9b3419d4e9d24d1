use std::path::Path;

use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg;

use crate::error::{Error, Result};

/// Output encodings, chosen from the output file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Svg,
    Png,
    Pdf,
}

impl Format {
    pub fn from_extension(ext: &str) -> Result<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "svg" => Ok(Format::Svg),
            "png" => Ok(Format::Png),
            "pdf" => Ok(Format::Pdf),
            other => Err(Error::Export(format!(
                "Unsupported output format: .{} (use .svg, .png or .pdf)",
                other
            ))),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| Error::Export("Output file has no extension".to_string()))?;
        Self::from_extension(ext)
    }

    pub fn extension(self) -> &'static str {
        match self {
            Format::Svg => "svg",
            Format::Png => "png",
            Format::Pdf => "pdf",
        }
    }

    /// Converts a rendered SVG document into this format.
    pub fn encode(self, svg: &str, png_scale: f32) -> Result<Vec<u8>> {
        match self {
            Format::Svg => Ok(svg.as_bytes().to_vec()),
            Format::Png => svg_to_png(svg, png_scale),
            Format::Pdf => svg_to_pdf(svg),
        }
    }
}

pub fn svg_to_png(svg: &str, scale: f32) -> Result<Vec<u8>> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(Error::Export(format!("Invalid --png-scale value: {}", scale)));
    }

    let mut opts = usvg::Options::default();
    {
        let fontdb = opts.fontdb_mut();
        fontdb.load_system_fonts();
        let families: Vec<String> = fontdb
            .faces()
            .flat_map(|face| face.families.iter().map(|(family, _)| family.clone()))
            .collect();
        if let Some(family) = pick_monospace(&families) {
            fontdb.set_monospace_family(family);
        }
    }

    let tree = usvg::Tree::from_str(svg, &opts)
        .map_err(|e| Error::Export(format!("Failed to parse SVG: {}", e)))?;

    let width = (tree.size().width() * scale).ceil() as u32;
    let height = (tree.size().height() * scale).ceil() as u32;
    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| Error::Export("Failed to create pixmap".to_string()))?;

    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| Error::Export(format!("Failed to encode PNG: {}", e)))
}

pub fn svg_to_pdf(svg: &str) -> Result<Vec<u8>> {
    use svg2pdf::usvg::fontdb;

    let mut fontdb = fontdb::Database::new();
    fontdb.load_system_fonts();
    let families: Vec<String> = fontdb
        .faces()
        .flat_map(|face| face.families.iter().map(|(family, _)| family.clone()))
        .collect();
    if let Some(family) = pick_monospace(&families) {
        fontdb.set_monospace_family(family);
    }

    let opts = svg2pdf::usvg::Options {
        fontdb: std::sync::Arc::new(fontdb),
        ..Default::default()
    };
    let tree = svg2pdf::usvg::Tree::from_str(svg, &opts)
        .map_err(|e| Error::Export(format!("Failed to parse SVG: {}", e)))?;

    // Text as paths: viewers without the font still show the labels.
    let options = svg2pdf::ConversionOptions {
        embed_text: false,
        ..Default::default()
    };
    svg2pdf::to_pdf(&tree, options, svg2pdf::PageOptions::default())
        .map_err(|e| Error::Export(format!("Failed to convert SVG to PDF: {}", e)))
}

// Labels are laid out on a fixed character grid; prefer a real monospace
// face, then any sans face, then whatever is installed.
fn pick_monospace(families: &[String]) -> Option<&str> {
    let find = |needles: &[&str]| {
        families.iter().find(|family| {
            let lower = family.to_ascii_lowercase();
            needles.iter().any(|needle| lower.contains(needle))
        })
    };

    find(&["mono", "code"])
        .or_else(|| find(&["sans"]))
        .or_else(|| families.first())
        .map(String::as_str)
}
