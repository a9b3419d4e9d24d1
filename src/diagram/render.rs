use std::io::{self, Write};

use super::layout::LayoutEngine;
use super::types::{Composition, Diagram, Object};
use crate::error::{Error, Result};
use crate::theme::Theme;

const PREAMBLE: &str = r#"<?xml version="1.0" standalone="no"?>"#;

/// Writes laid out composition trees as SVG.
pub struct SvgRenderer<'a> {
    theme: &'a Theme,
    engine: &'a LayoutEngine,
}

impl<'a> SvgRenderer<'a> {
    pub fn new(theme: &'a Theme, engine: &'a LayoutEngine) -> Self {
        Self { theme, engine }
    }

    /// Writes the whole document for `root`, which must already be laid out
    /// with the same engine. On error the sink holds a partial document.
    pub fn render<W: Write>(&self, root: &Object, dst: &mut W) -> Result<()> {
        self.write_document(root, dst).map_err(Error::Write)
    }

    fn write_document<W: Write>(&self, root: &Object, dst: &mut W) -> io::Result<()> {
        let (width, height) = self.engine.canvas_size(root);
        writeln!(dst, "{}", PREAMBLE)?;
        writeln!(
            dst,
            r#"<svg xmlns="http://www.w3.org/2000/svg" font-family="{}" width="{:.2}em" height="{:.2}em">"#,
            escape_xml(&self.theme.font_family),
            width,
            height
        )?;
        self.write_defs(dst)?;
        self.write_objects(root, dst)?;
        self.write_connections(root, dst)?;
        writeln!(dst, "</svg>")?;
        dst.flush()
    }

    fn write_defs<W: Write>(&self, dst: &mut W) -> io::Result<()> {
        let fill = escape_xml(&self.theme.connector_color);
        writeln!(
            dst,
            r#"<defs>
<marker id="Triangle" viewBox="0 0 10 10" refX="0" refY="5" markerUnits="strokeWidth" markerWidth="15" markerHeight="10" orient="auto">
<path d="M 0 0 L 10 5 L 0 10 z" fill="{fill}"/>
</marker>
<marker id="Diamond" viewBox="0 0 16 10" refX="0" refY="5" markerUnits="strokeWidth" markerWidth="20" markerHeight="10" orient="auto">
<path d="M 0 5 L 8 10 L 16 5 L 8 0 z" fill="{fill}"/>
</marker>
</defs>"#
        )
    }

    fn write_objects<W: Write>(&self, object: &Object, dst: &mut W) -> io::Result<()> {
        self.write_object(object, dst)?;
        for composition in &object.composed_of {
            self.write_objects(&composition.object, dst)?;
        }
        Ok(())
    }

    fn write_object<W: Write>(&self, object: &Object, dst: &mut W) -> io::Result<()> {
        let theme = self.theme;
        let pos = object.position;

        writeln!(dst, r#"<g class="object">"#)?;
        writeln!(
            dst,
            r#"<rect x="{:.2}em" y="{:.2}em" width="{:.2}em" height="{:.2}em" fill="{}" stroke="{}" stroke-width="{}"/>"#,
            pos.x,
            pos.y,
            self.engine.width(object),
            self.engine.height(object),
            escape_xml(&theme.box_fill),
            escape_xml(&theme.stroke),
            theme.stroke_width
        )?;

        let name_at = self.engine.name_position(object);
        writeln!(
            dst,
            r#"<text style="font-weight:bold" text-anchor="middle" x="{:.2}em" y="{:.2}em" fill="{}">{}{}</text>"#,
            name_at.x,
            name_at.y,
            escape_xml(&theme.name_color),
            escape_xml(&object.name),
            title(&object.description)
        )?;

        for (index, property) in object.properties.iter().enumerate() {
            let field_at = self.engine.field_position(object, index);
            writeln!(
                dst,
                r#"<text x="{:.2}em" y="{:.2}em" fill="{}">{} [{}]{}</text>"#,
                field_at.x,
                field_at.y,
                escape_xml(&theme.property_color),
                escape_xml(&property.name),
                property.relationship,
                title(&property.description)
            )?;
        }

        writeln!(dst, "</g>")
    }

    fn write_connections<W: Write>(&self, parent: &Object, dst: &mut W) -> io::Result<()> {
        for composition in &parent.composed_of {
            self.write_connector(parent, composition, dst)?;
            self.write_connections(&composition.object, dst)?;
        }
        Ok(())
    }

    // Diamond at the owning side, arrow at the owned side.
    fn write_connector<W: Write>(
        &self,
        parent: &Object,
        composition: &Composition,
        dst: &mut W,
    ) -> io::Result<()> {
        let child = &composition.object;
        let [start, elbow, drop, end] = self.engine.connector_points(parent, child);
        let stroke = escape_xml(&self.theme.connector_color);
        let label_at = self.engine.relationship_label_position(child);

        writeln!(dst, r#"<g class="composition">"#)?;
        writeln!(
            dst,
            r#"<line x1="{:.2}em" y1="{:.2}em" x2="{:.2}em" y2="{:.2}em" stroke="{}" marker-start="url(#Diamond)"/>"#,
            start.x, start.y, elbow.x, elbow.y, stroke
        )?;
        writeln!(
            dst,
            r#"<line x1="{:.2}em" y1="{:.2}em" x2="{:.2}em" y2="{:.2}em" stroke="{}"/>"#,
            elbow.x, elbow.y, drop.x, drop.y, stroke
        )?;
        writeln!(
            dst,
            r#"<line x1="{:.2}em" y1="{:.2}em" x2="{:.2}em" y2="{:.2}em" stroke="{}" marker-end="url(#Triangle)"/>"#,
            drop.x, drop.y, end.x, end.y, stroke
        )?;
        writeln!(
            dst,
            r#"<text x="{:.2}em" y="{:.2}em" fill="{}">{}</text>"#,
            label_at.x,
            label_at.y,
            escape_xml(&self.theme.label_color),
            composition.relationship
        )?;
        writeln!(dst, "</g>")
    }
}

fn title(description: &str) -> String {
    if description.is_empty() {
        String::new()
    } else {
        format!("<title>{}</title>", escape_xml(description))
    }
}

/// XML 1.0 valid char ranges:
/// - 0x09, 0x0A, 0x0D
/// - 0x20..=0xD7FF
/// - 0xE000..=0xFFFD
/// - 0x10000..=0x10FFFF
fn is_valid_xml_char(c: char) -> bool {
    matches!(
        c as u32,
        0x09 | 0x0A | 0x0D | 0x20..=0xD7FF | 0xE000..=0xFFFD | 0x10000..=0x10FFFF
    )
}

/// Escapes markup characters and drops characters XML cannot carry at all.
pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars().filter(|&c| is_valid_xml_char(c)) {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

impl Diagram {
    /// Lays the tree out and writes it to `dst`.
    pub fn render<W: Write>(&mut self, dst: &mut W, theme: &Theme) -> Result<()> {
        let engine = LayoutEngine::default();
        engine.layout(&mut self.root);
        SvgRenderer::new(theme, &engine).render(&self.root, dst)
    }

    pub fn to_svg(&mut self, theme: &Theme) -> Result<String> {
        let mut out = Vec::new();
        self.render(&mut out, theme)?;
        String::from_utf8(out)
            .map_err(|e| Error::Write(io::Error::new(io::ErrorKind::InvalidData, e)))
    }
}
