use clap::Parser;
use schemabox::export::Format;
use schemabox::source::Source;
use schemabox::{Divider, ResolveOptions, Theme};
use std::io::Write;
use std::path::PathBuf;

/// Render a JSON Schema object from an OpenAPI document as an SVG class diagram
#[derive(Parser, Debug)]
#[command(name = "schemabox")]
#[command(version)]
#[command(about = "Generate SVG diagrams for JSON Schema objects", long_about = None)]
struct Args {
    /// Source document: a path, a file:// or http(s):// URI, or "-" for stdin
    #[arg(long, value_name = "SRC")]
    src: String,

    /// Selector of the object within the document (e.g. components.schemas.Pet)
    #[arg(long, value_name = "PATH")]
    path: String,

    /// Output file (extension selects .svg, .png or .pdf); SVG on stdout if omitted
    #[arg(short, long, value_name = "OUTPUT")]
    out: Option<PathBuf>,

    /// Character separating selector segments, for keys that contain dots
    #[arg(long, default_value_t = '.')]
    divider: char,

    /// Built-in theme name or path to a TOML/YAML theme file
    #[arg(short, long, value_name = "THEME")]
    theme: Option<String>,

    /// Longest chain of nested $ref pointers to follow
    #[arg(long, default_value_t = schemabox::document::DEFAULT_MAX_DEPTH)]
    max_ref_depth: usize,

    /// Raster scale multiplier for PNG output
    #[arg(long, default_value_t = 1.0)]
    png_scale: f32,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<(), String> {
    let args = Args::parse();
    schemabox::logging::init(args.verbose);

    let theme = match args.theme {
        Some(ref spec) => Theme::load(spec).map_err(|e| e.to_string())?,
        None => Theme::default(),
    };
    let options = ResolveOptions {
        divider: Divider::new(args.divider),
        max_depth: args.max_ref_depth,
    };

    let source = Source::parse(&args.src);
    let bytes = source.read().map_err(|e| e.to_string())?;

    let mut diagram =
        schemabox::parse_to_diagram(&bytes, &args.path, options).map_err(|e| e.to_string())?;
    let svg = diagram.to_svg(&theme).map_err(|e| e.to_string())?;

    match args.out {
        Some(ref out) => {
            let format = Format::from_path(out).map_err(|e| e.to_string())?;
            let data = format
                .encode(&svg, args.png_scale)
                .map_err(|e| e.to_string())?;
            std::fs::write(out, data)
                .map_err(|e| format!("Failed to write {}: {}", out.display(), e))?;
            eprintln!("{} saved to: {}", format.extension().to_uppercase(), out.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(svg.as_bytes())
                .and_then(|_| stdout.flush())
                .map_err(|e| format!("Failed to write SVG: {}", e))?;
        }
    }

    Ok(())
}
