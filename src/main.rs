//! PDF Redaction CLI Application.
//!
//! Command-line driver for the redactor library: applies marked areas to a
//! document, and offers text extraction and page inspection for checking
//! inputs and results.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use redactor::domain::Area;
use redactor::{RedactionOptions, RedactionService, SourceDocument};

/// PDF Redaction Tool
///
/// Rasterizes every page that carries a marked area, paints the areas
/// opaque, and writes a document whose redacted pages hold no text.
/// Use the 'extract' and 'info' subcommands to inspect documents.
#[derive(Parser)]
#[command(name = "redactor")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Input PDF file path
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output PDF file path
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Area to redact as PAGE:X,Y,W,H[@CWxCH] (zero-based page, pixels of a
    /// CWxCH preview; can be specified multiple times)
    #[arg(short, long, value_name = "AREA")]
    area: Vec<Area>,

    /// Raster pixels per document point
    #[arg(long, value_name = "FACTOR")]
    scale: Option<f32>,

    /// Scale applied to areas given without a preview size
    #[arg(long, value_name = "FACTOR")]
    fallback_scale: Option<f64>,

    /// Mask color as RRGGBB hex
    #[arg(long, value_name = "RRGGBB", value_parser = parse_hex_color)]
    mask_color: Option<[u8; 3]>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract text from a PDF (for debugging and verification)
    Extract {
        /// Input PDF file path
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Output text file (optional, defaults to stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Print page count and page sizes
    Info {
        /// Input PDF file path
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,
    },
}

/// Parses `RRGGBB` (optionally prefixed with `#`) into RGB bytes.
fn parse_hex_color(s: &str) -> Result<[u8; 3], String> {
    let hex = s.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(format!("expected RRGGBB, got '{}'", s));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| format!("invalid hex color '{}'", s))
    };
    Ok([channel(0)?, channel(2)?, channel(4)?])
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Redaction command handler with dependency injection.
struct RedactionHandler {
    options: RedactionOptions,
    verbose: bool,
}

impl RedactionHandler {
    /// Creates a handler; the renderer is only set up for redaction.
    fn new(options: RedactionOptions, verbose: bool) -> Self {
        Self { options, verbose }
    }

    /// Executes a redaction operation.
    fn redact(&self, input: &Path, output: &Path, areas: &[Area]) -> Result<()> {
        if !input.exists() {
            anyhow::bail!("Input file does not exist: {}", input.display());
        }

        if areas.is_empty() {
            anyhow::bail!("No areas specified. Use --area PAGE:X,Y,W,H[@CWxCH].");
        }

        let service = RedactionService::with_default_renderer()
            .context("No page renderer available")?
            .with_options(self.options.clone());

        if self.verbose {
            println!("Input:    {}", input.display());
            println!("Output:   {}", output.display());
            println!("Areas:    {}", areas.len());
            println!("Renderer: {}", service.renderer_name());
        }

        let report = service
            .apply_file(input, output, areas)
            .with_context(|| "Redaction failed")?;

        if self.verbose {
            println!("\nRedaction Summary:");
            println!("  Pages processed:  {}", report.pages_processed);
            println!("  Pages rasterized: {}", report.pages_rasterized);
            println!("  Areas applied:    {}", report.areas_applied);
        }

        println!(
            "✓ Redacted {} area(s) on {} page(s) → {}",
            report.areas_applied,
            report.pages_rasterized,
            output.display()
        );

        Ok(())
    }

    /// Extracts text from a PDF.
    fn extract(&self, input: &Path, output: Option<&Path>) -> Result<()> {
        let bytes = read_input(input)?;
        let text = redactor::extract_text(&bytes).with_context(|| "Text extraction failed")?;

        if let Some(output_path) = output {
            std::fs::write(output_path, &text)
                .with_context(|| format!("Failed to write to {}", output_path.display()))?;
            println!(
                "✓ Extracted {} characters → {}",
                text.len(),
                output_path.display()
            );
        } else {
            println!("{}", text);
        }

        Ok(())
    }

    /// Prints the page count and each page's displayed size in points.
    fn info(&self, input: &Path) -> Result<()> {
        let bytes = read_input(input)?;
        let document = SourceDocument::load(&bytes)
            .with_context(|| format!("Failed to read {}", input.display()))?;

        println!("Pages: {}", document.page_count());
        for page in document.pages() {
            let size = page.size();
            if self.verbose {
                println!(
                    "  {}: {} x {} pt (rotate {})",
                    page.index, size.width, size.height, page.rotation
                );
            } else {
                println!("  {}: {} x {} pt", page.index, size.width, size.height);
            }
        }

        Ok(())
    }
}

fn read_input(input: &Path) -> Result<Vec<u8>> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }
    std::fs::read(input).with_context(|| format!("Failed to read {}", input.display()))
}

/// Builds redaction options from command-line overrides.
fn build_options(
    scale: Option<f32>,
    fallback_scale: Option<f64>,
    mask_color: Option<[u8; 3]>,
) -> RedactionOptions {
    let mut options = RedactionOptions::new();
    if let Some(scale) = scale {
        options = options.with_oversampling(scale);
    }
    if let Some(fallback) = fallback_scale {
        options = options.with_fallback_capture_scale(fallback);
    }
    if let Some(color) = mask_color {
        options = options.with_mask_color(color);
    }
    options
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = build_options(cli.scale, cli.fallback_scale, cli.mask_color);
    options.validate().context("Invalid options")?;
    let handler = RedactionHandler::new(options, cli.verbose);

    match &cli.command {
        Some(Commands::Extract { input, output }) => {
            handler.extract(input, output.as_deref())?;
        }
        Some(Commands::Info { input }) => {
            handler.info(input)?;
        }
        None => {
            // Default: redaction mode
            let input = cli
                .input
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("--input is required"))?;
            let output = cli
                .output
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("--output is required"))?;

            handler.redact(input, output, &cli.area)?;
        }
    }

    Ok(())
}
