use clap::Parser;
use schemabox::batch::{BatchSettings, Manifest};
use schemabox::{Divider, ResolveOptions, Theme};
use std::path::PathBuf;

/// Render many JSON Schema diagrams from a TOML manifest of source documents
#[derive(Parser, Debug)]
#[command(name = "schemabox-batch")]
#[command(version)]
#[command(about = "Generate SVG diagrams for every object listed in a manifest", long_about = None)]
struct Args {
    /// Batch manifest (TOML)
    #[arg(value_name = "MANIFEST")]
    manifest: PathBuf,

    /// Output directory, overriding the manifest's output_dir
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Built-in theme name or path to a TOML/YAML theme file
    #[arg(short, long, value_name = "THEME")]
    theme: Option<String>,

    /// Character separating schema_path segments
    #[arg(long, default_value_t = '.')]
    divider: char,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<(), String> {
    let args = Args::parse();
    schemabox::logging::init(args.verbose);

    let manifest = Manifest::load(&args.manifest).map_err(|e| e.to_string())?;
    let theme = match args.theme {
        Some(ref spec) => Theme::load(spec).map_err(|e| e.to_string())?,
        None => Theme::default(),
    };

    let settings = BatchSettings {
        output_dir: args.out_dir.unwrap_or_else(|| manifest.output_dir.clone()),
        format: manifest.output_format().map_err(|e| e.to_string())?,
        png_scale: manifest.png_scale,
        theme,
        options: ResolveOptions {
            divider: Divider::new(args.divider),
            ..ResolveOptions::default()
        },
    };

    let mut failed = Vec::new();
    for (name, result) in schemabox::batch::run(&manifest, &settings) {
        match result {
            Ok(report) => eprintln!(
                "{}: {} written, {} skipped",
                name,
                report.written.len(),
                report.skipped.len()
            ),
            Err(e) => {
                eprintln!("{}: {}", name, e);
                failed.push(name);
            }
        }
    }

    if failed.is_empty() {
        Ok(())
    } else {
        Err(format!("Failed collections: {}", failed.join(", ")))
    }
}
