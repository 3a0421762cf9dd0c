use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use watermarker::adjust::Filter;
use watermarker::config::AppConfig;
use watermarker::export::{FileSink, FormatHint};
use watermarker::watermark::{parse_hex_color, Anchor, Color, WatermarkSpec};

/// Watermarker - add text watermarks to images
#[derive(Parser, Debug)]
#[command(name = "watermarker")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Watermark one image and export it
    Apply(ApplyArgs),

    /// Manage saved watermark templates
    Templates {
        #[command(subcommand)]
        action: TemplateAction,
    },

    /// List font families found in the configured font directories
    Fonts,
}

#[derive(Subcommand, Debug)]
enum TemplateAction {
    /// List template names
    List,
    /// Print a template as JSON
    Show { name: String },
    /// Delete a template
    Delete { name: String },
}

#[derive(Args, Debug)]
struct ApplyArgs {
    /// Source image
    #[arg(short, long)]
    input: PathBuf,

    /// Output file; its extension picks the format unless --format is given
    #[arg(short, long)]
    output: PathBuf,

    /// Start from a saved template instead of the configured defaults
    #[arg(short, long)]
    template: Option<String>,

    /// Save the final watermark settings under this template name
    #[arg(long)]
    save_template: Option<String>,

    #[arg(long)]
    text: Option<String>,

    /// Font family
    #[arg(long)]
    font: Option<String>,

    /// Font size in points
    #[arg(long)]
    size: Option<u32>,

    #[arg(long)]
    bold: bool,

    #[arg(long)]
    italic: bool,

    /// Text color as #RGB or #RRGGBB
    #[arg(long, value_parser = parse_color)]
    color: Option<Color>,

    /// Opacity in percent (0-100)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    opacity: Option<u8>,

    /// top-left, top-right, bottom-left, bottom-right or center
    #[arg(long)]
    anchor: Option<String>,

    /// Free-form position; overrides --anchor
    #[arg(long, requires = "y")]
    x: Option<i32>,

    #[arg(long, requires = "x")]
    y: Option<i32>,

    #[arg(long)]
    shadow: bool,

    #[arg(long)]
    outline: bool,

    #[arg(long, value_parser = parse_color)]
    outline_color: Option<Color>,

    /// Brightness factor (0.0-2.0, 1.0 unchanged)
    #[arg(long)]
    brightness: Option<f32>,

    /// Contrast factor (0.0-2.0, 1.0 unchanged)
    #[arg(long)]
    contrast: Option<f32>,

    /// Filter applied after brightness and contrast; repeatable
    #[arg(long)]
    filter: Vec<Filter>,

    /// same, jpeg, png, webp, bmp, gif or tiff
    #[arg(long)]
    format: Option<FormatHint>,

    /// JPEG quality (1-100)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: Option<u8>,

    /// Output size as WIDTHxHEIGHT
    #[arg(long, value_parser = parse_size)]
    resize: Option<(u32, u32)>,
}

fn parse_color(s: &str) -> Result<Color, String> {
    parse_hex_color(s).map_err(|e| e.to_string())
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
    let w = w.trim().parse::<u32>().map_err(|e| e.to_string())?;
    let h = h.trim().parse::<u32>().map_err(|e| e.to_string())?;
    if w == 0 || h == 0 {
        return Err("width and height must be positive".to_string());
    }
    Ok((w, h))
}

fn load_config(path: Option<&PathBuf>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::from_file(path)
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => AppConfig::default(),
    };
    config.validate().map_err(anyhow::Error::msg)?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_ref())?;

    watermarker::logging::init_subscriber(&config.logging)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::debug!(
        config_file = ?cli.config,
        templates = %config.templates.path.display(),
        "Configuration loaded"
    );

    match cli.command {
        Command::Apply(args) => apply(&config, args),
        Command::Templates { action } => templates(&config, action),
        Command::Fonts => fonts(&config),
    }
}

fn apply(config: &AppConfig, args: ApplyArgs) -> Result<()> {
    let store = config.template_store();
    let mut workspace = config.workspace();

    let report = workspace.add_paths([&args.input]);
    if let Some(err) = report.failed.into_iter().next() {
        return Err(err.into());
    }

    let base = match &args.template {
        Some(name) => match store.get(name) {
            Some(spec) => spec,
            None => bail!("Template '{}' not found in {}", name, store.path().display()),
        },
        None => config.watermark.defaults.clone(),
    };
    let spec = build_spec(base, &args);

    let compositor = workspace.compositor().clone();
    let entry = workspace
        .current_mut()
        .context("No image loaded")?;

    // Both flags apply together; contrast works on the brightened image
    if args.brightness.is_some() || args.contrast.is_some() {
        entry.set_brightness_contrast(
            args.brightness.unwrap_or(1.0),
            args.contrast.unwrap_or(1.0),
        );
    }
    for filter in &args.filter {
        entry.apply_filter(*filter);
    }

    entry.spec = spec;
    if let (Some(x), Some(y)) = (args.x, args.y) {
        let text = compositor.measure(&entry.spec);
        let image_size = entry.dimensions();
        entry.spec.place_custom(x, y, text.as_tuple(), image_size);
    }
    let final_spec = entry.spec.clone();

    let mut options = config.export_options();
    if let Some(format) = args.format {
        options.format = format;
    }
    if let Some(quality) = args.quality {
        options.quality = quality;
    }
    options.resize = args.resize;

    let report = workspace.export_current(&args.output, &options, &FileSink)?;
    println!(
        "Wrote {} ({}x{}, {}, {} bytes)",
        report.path.display(),
        report.dimensions.0,
        report.dimensions.1,
        report.format,
        report.bytes_written
    );

    if let Some(name) = &args.save_template {
        store
            .put(name, final_spec)
            .with_context(|| format!("Failed to save template '{}'", name))?;
        println!("Saved template '{}'", name);
    }

    Ok(())
}

fn build_spec(mut spec: WatermarkSpec, args: &ApplyArgs) -> WatermarkSpec {
    if let Some(text) = &args.text {
        spec.text = text.clone();
    }
    if let Some(font) = &args.font {
        spec.font_family = font.clone();
    }
    if let Some(size) = args.size {
        spec.font_size_pt = size.max(1);
    }
    spec.bold |= args.bold;
    spec.italic |= args.italic;
    if let Some(color) = args.color {
        spec.color = color;
    }
    if let Some(opacity) = args.opacity {
        spec.opacity_percent = opacity;
    }
    if let Some(anchor) = &args.anchor {
        spec.anchor = Anchor::parse_lenient(anchor);
    }
    spec.shadow |= args.shadow;
    spec.outline |= args.outline;
    if let Some(color) = args.outline_color {
        spec.outline_color = color;
    }
    spec
}

fn templates(config: &AppConfig, action: TemplateAction) -> Result<()> {
    let store = config.template_store();
    match action {
        TemplateAction::List => {
            for name in store.names() {
                println!("{}", name);
            }
        }
        TemplateAction::Show { name } => {
            let spec = store
                .get(&name)
                .with_context(|| format!("Template '{}' not found", name))?;
            println!("{}", serde_json::to_string_pretty(&spec)?);
        }
        TemplateAction::Delete { name } => {
            if !store.delete(&name)? {
                bail!("Template '{}' not found", name);
            }
            println!("Deleted template '{}'", name);
        }
    }
    Ok(())
}

fn fonts(config: &AppConfig) -> Result<()> {
    let resolver = config.font_resolver();
    let families = resolver.catalog().families();
    if families.is_empty() {
        println!("No fonts found; watermarks will use the built-in bitmap font");
    }
    for family in families {
        println!("{}", family);
    }
    Ok(())
}
