//! Convert PNG, JPEG, BMP or GIF images into raw e-Paper frames
//!
//! The output is what the display downloads: one 1-bpp frame, rows top to
//! bottom, MSB first, white = 1.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, ensure};
use clap::{Parser, ValueEnum};
use env_logger::Env;
use http_image_display::config::{PANEL_4IN26_HEIGHT, PANEL_4IN26_WIDTH};
use http_image_display::raster::{Dither, pack_luma};
use image::imageops::FilterType;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DitherArg {
    /// Plain threshold
    None,
    /// Floyd–Steinberg error diffusion
    FloydSteinberg,
}

impl From<DitherArg> for Dither {
    fn from(arg: DitherArg) -> Self {
        match arg {
            DitherArg::None => Self::None,
            DitherArg::FloydSteinberg => Self::FloydSteinberg,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "image-converter")]
#[command(about = "Convert an image to a raw 1-bpp e-Paper frame", long_about = None)]
#[command(version)]
struct Cli {
    /// Input image (PNG, JPEG, BMP, GIF)
    input: PathBuf,
    /// Output file [default: <input>_epaper.bin]
    output: Option<PathBuf>,
    /// Panel width in pixels
    #[arg(long, default_value_t = u32::from(PANEL_4IN26_WIDTH))]
    width: u32,
    /// Panel height in pixels
    #[arg(long, default_value_t = u32::from(PANEL_4IN26_HEIGHT))]
    height: u32,
    /// Gray-to-monochrome reduction
    #[arg(long, value_enum, default_value_t = DitherArg::FloydSteinberg)]
    dither: DitherArg,
}

/// `photo.jpg` becomes `photo_epaper.bin` next to it
fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}_epaper.bin"))
}

fn convert(cli: &Cli) -> Result<PathBuf> {
    ensure!(
        cli.input.exists(),
        "Input file '{}' not found",
        cli.input.display()
    );
    ensure!(cli.width > 0 && cli.height > 0, "Panel size must be non-zero");

    log::info!("Opening image: {}", cli.input.display());
    let img = image::open(&cli.input)
        .with_context(|| format!("decoding {}", cli.input.display()))?;

    log::info!("Resizing to {}x{}", cli.width, cli.height);
    let gray = img
        .resize_exact(cli.width, cli.height, FilterType::Lanczos3)
        .into_luma8();

    log::info!("Converting to monochrome...");
    let frame = pack_luma(gray.as_raw(), cli.width, cli.height, cli.dither.into())?;

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output(&cli.input));
    fs::write(&output, &frame).with_context(|| format!("writing {}", output.display()))?;

    log::info!("Conversion successful");
    log::info!("  Output file: {}", output.display());
    log::info!("  File size: {} bytes", frame.len());
    log::info!(
        "  Expected size: {} bytes",
        (cli.width as usize).div_ceil(8) * cli.height as usize
    );
    Ok(output)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match convert(&cli) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
