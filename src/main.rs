//! # Certa CLI
//!
//! Command-line interface for rendering certificate templates.
//!
//! ## Usage
//!
//! ```bash
//! # Render the certificate side to PNG
//! certa render --layout template.json --fields andi.json \
//!     --font "Montserrat=fonts/Montserrat-Regular.ttf" \
//!     --font "Montserrat:700=fonts/Montserrat-Bold.ttf" \
//!     --image "bg.png=assets/bg.png" -o andi.png
//!
//! # Render the score side at a different resolution
//! certa render --layout template.json --fields andi.json --mode score --width 2246 -o back.png
//!
//! # Print the draw operations a render would issue, as JSON
//! certa layout --layout template.json --fields andi.json
//!
//! # Render many certificates in parallel
//! certa batch --layout template.json --fields batch.json --out-dir out/
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use certa::{
    CertaError, FontBook, RenderMode, RenderOptions, Renderer, TemplateLayoutConfig,
    render::{FieldValues, ImageStore},
    style::{FontStyle, parse_font_weight},
    surface::RecordingSurface,
};

/// Certa - certificate layout and rendering
#[derive(Parser, Debug)]
#[command(name = "certa")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render one certificate to PNG
    Render {
        #[command(flatten)]
        input: InputArgs,

        /// Field values JSON ({"values": {...}, "placeholders": {...}})
        #[arg(long, value_name = "FILE")]
        fields: Option<PathBuf>,

        /// Output PNG file
        #[arg(short, long, value_name = "FILE", default_value = "certificate.png")]
        output: PathBuf,
    },

    /// Print the draw operations of a render as JSON
    Layout {
        #[command(flatten)]
        input: InputArgs,

        /// Field values JSON
        #[arg(long, value_name = "FILE")]
        fields: Option<PathBuf>,
    },

    /// Render a JSON array of field value sets in parallel
    Batch {
        #[command(flatten)]
        input: InputArgs,

        /// JSON array of field value sets
        #[arg(long, value_name = "FILE")]
        fields: PathBuf,

        /// Directory for certificate-<n>.png files
        #[arg(long, value_name = "DIR", default_value = ".")]
        out_dir: PathBuf,
    },
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Template layout JSON
    #[arg(long, value_name = "FILE")]
    layout: PathBuf,

    /// Side to render: certificate or score
    #[arg(long, default_value = "certificate")]
    mode: RenderMode,

    /// Output width in pixels (defaults to the template canvas width)
    #[arg(long)]
    width: Option<u32>,

    /// Output height in pixels (defaults to keep the canvas aspect ratio)
    #[arg(long)]
    height: Option<u32>,

    /// Font face: "Family[:weight[:style]]=path.ttf" (repeatable)
    #[arg(long = "font", value_name = "SPEC")]
    fonts: Vec<String>,

    /// Image source: "src=path" (repeatable)
    #[arg(long = "image", value_name = "SPEC")]
    images: Vec<String>,

    /// Value for the {{CERTIFICATE_URL}} placeholder
    #[arg(long)]
    certificate_url: Option<String>,

    /// Apply the compact small-font layout adjustments
    #[arg(long)]
    compact: bool,

    /// Only render these layer ids (comma separated)
    #[arg(long, value_delimiter = ',')]
    layers: Vec<String>,

    /// Override the font scale factor
    #[arg(long)]
    scale: Option<f32>,
}

/// Everything a render needs, loaded from the command line.
struct Loaded {
    config: TemplateLayoutConfig,
    fonts: FontBook,
    images: ImageStore,
    options: RenderOptions,
    width: u32,
    height: u32,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize logging based on verbosity; RUST_LOG still wins.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_millis()
        .init();
}

fn run(command: Commands) -> Result<(), CertaError> {
    match command {
        Commands::Render {
            input,
            fields,
            output,
        } => {
            let loaded = load(&input)?;
            let fields = with_url(read_fields(fields.as_deref())?, &input);
            let renderer = Renderer::new(&loaded.config, &loaded.images).with_options(loaded.options.clone());
            let png = renderer.render_png(input.mode, &fields, &loaded.fonts, loaded.width, loaded.height)?;
            std::fs::write(&output, png)?;
            println!("Wrote {} ({}x{})", output.display(), loaded.width, loaded.height);
        }

        Commands::Layout { input, fields } => {
            let loaded = load(&input)?;
            let fields = with_url(read_fields(fields.as_deref())?, &input);
            let renderer = Renderer::new(&loaded.config, &loaded.images).with_options(loaded.options.clone());
            let mut surface = RecordingSurface::new(loaded.width, loaded.height);
            let report = renderer.render(input.mode, &fields, &mut surface)?;
            log::info!("drawn: {:?}, skipped: {:?}", report.drawn, report.skipped);
            println!("{}", serde_json::to_string_pretty(surface.ops())?);
        }

        Commands::Batch {
            input,
            fields,
            out_dir,
        } => {
            let loaded = load(&input)?;
            let json = std::fs::read_to_string(&fields)?;
            let batch: Vec<FieldValues> = serde_json::from_str(&json)?;
            let batch: Vec<FieldValues> = batch.into_iter().map(|f| with_url(f, &input)).collect();

            std::fs::create_dir_all(&out_dir)?;
            let renderer = Renderer::new(&loaded.config, &loaded.images).with_options(loaded.options.clone());
            let results = renderer.render_batch(input.mode, &batch, &loaded.fonts, loaded.width, loaded.height);

            let mut failed = 0;
            for (i, result) in results.into_iter().enumerate() {
                match result {
                    Ok(png) => {
                        let path = out_dir.join(format!("certificate-{}.png", i + 1));
                        std::fs::write(&path, png)?;
                        println!("Wrote {}", path.display());
                    }
                    Err(e) => {
                        failed += 1;
                        eprintln!("certificate {}: {}", i + 1, e);
                    }
                }
            }
            if failed > 0 {
                return Err(CertaError::Config(format!(
                    "{} of {} certificates failed",
                    failed,
                    batch.len()
                )));
            }
        }
    }

    Ok(())
}

fn load(input: &InputArgs) -> Result<Loaded, CertaError> {
    let json = std::fs::read_to_string(&input.layout)?;
    let config = TemplateLayoutConfig::from_json(&json)?;

    let mut fonts = FontBook::new();
    for spec in &input.fonts {
        let (family, weight, style, path) = parse_font_arg(spec)?;
        fonts.load_file(family, weight, style, path)?;
    }

    let mut images = ImageStore::new();
    for spec in &input.images {
        let (src, path) = spec
            .split_once('=')
            .ok_or_else(|| CertaError::Config(format!("expected src=path, got '{}'", spec)))?;
        images.load_file(src, path)?;
    }

    let (width, height) = output_size(&config, input.width, input.height);

    let mut options = RenderOptions::default().compact(input.compact);
    if let Some(scale) = input.scale {
        options = options.with_scale_factor(scale);
    }
    if !input.layers.is_empty() {
        options = options.with_layer_filter(input.layers.iter().cloned());
    }

    Ok(Loaded {
        config,
        fonts,
        images,
        options,
        width,
        height,
    })
}

/// Output size: explicit values win, a missing one keeps the canvas aspect ratio.
fn output_size(config: &TemplateLayoutConfig, width: Option<u32>, height: Option<u32>) -> (u32, u32) {
    let canvas = config.canvas;
    let aspect = canvas.height / canvas.width;
    match (width, height) {
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) => (w, (w as f32 * aspect).round().max(1.0) as u32),
        (None, Some(h)) => ((h as f32 / aspect).round().max(1.0) as u32, h),
        (None, None) => (
            canvas.width.round().max(1.0) as u32,
            canvas.height.round().max(1.0) as u32,
        ),
    }
}

/// Parse "Family[:weight[:style]]=path".
fn parse_font_arg(spec: &str) -> Result<(String, u16, FontStyle, PathBuf), CertaError> {
    let (face, path) = spec
        .split_once('=')
        .ok_or_else(|| CertaError::Config(format!("expected Family[:weight[:style]]=path, got '{}'", spec)))?;

    let mut parts = face.split(':');
    let family = parts.next().unwrap_or_default().trim();
    if family.is_empty() {
        return Err(CertaError::Config(format!("missing font family in '{}'", spec)));
    }
    let weight = parts.next().map(parse_font_weight).unwrap_or(400);
    let style = parts.next().map(FontStyle::parse).unwrap_or_default();

    Ok((family.to_string(), weight, style, PathBuf::from(path)))
}

fn read_fields(path: Option<&Path>) -> Result<FieldValues, CertaError> {
    match path {
        Some(path) => FieldValues::from_json(&std::fs::read_to_string(path)?),
        None => Ok(FieldValues::new()),
    }
}

fn with_url(fields: FieldValues, input: &InputArgs) -> FieldValues {
    match &input.certificate_url {
        Some(url) => fields.with_certificate_url(url.clone()),
        None => fields,
    }
}
