//! Background matting pipeline for custom icons
//!
//! Turns an arbitrary raster image into an upload-ready icon:
//!
//! 1. normalize the color mode to RGBA
//! 2. trust existing transparency, or
//! 3. detect the background color from the border and
//! 4. synthesize a binary alpha channel from it
//! 5. crop, scale down and center the sprite on the target canvas
//! 6. re-encode losslessly (see [`encode_png`])
//!
//! Running the pipeline on its own output is a no-op.

pub mod background;
pub mod encode;
pub mod layout;

pub use background::{apply_matte, detect_background, has_transparency};
pub use encode::encode_png;
pub use layout::{content_bounds, fit_to_canvas};

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Icon dimensions expected by the game UI.
pub const DEFAULT_TARGET_WIDTH: u32 = 80;
pub const DEFAULT_TARGET_HEIGHT: u32 = 60;
/// Smallest source size that still yields a readable icon.
pub const MIN_SOURCE_WIDTH: u32 = 40;
pub const MIN_SOURCE_HEIGHT: u32 = 30;
/// Largest image the asset platform accepts on either axis.
pub const MAX_ASSET_SIZE: u32 = 1024;

/// Error type for the matting pipeline
#[derive(Debug, Error)]
pub enum PrepareError {
    /// Reading the source file failed
    #[error("Failed to read image: {0}")]
    Io(#[from] std::io::Error),
    /// The source bytes are not a decodable image
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    /// Requested target exceeds the platform limit
    #[error("Target size {width}x{height} exceeds the {limit}x{limit} asset limit")]
    SizeLimitExceeded { width: u32, height: u32, limit: u32 },
    /// Target has no room for a sprite inside its transparent margin
    #[error("Target size {width}x{height} leaves no room for a sprite inside a {margin}px margin")]
    NoRoomForSprite { width: u32, height: u32, margin: u32 },
    /// Lossless re-encode failed
    #[error("Failed to encode PNG: {0}")]
    Encode(String),
}

/// Resampling filter used when a sprite must be scaled down
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Resample {
    /// Keeps hard pixel edges and binary alpha
    #[default]
    Nearest,
    /// Smoother, introduces partial alpha on sprite edges
    Lanczos,
}

impl Resample {
    pub fn filter(self) -> FilterType {
        match self {
            Resample::Nearest => FilterType::Nearest,
            Resample::Lanczos => FilterType::Lanczos3,
        }
    }
}

/// Tunables for [`prepare`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepareConfig {
    pub target_width: u32,
    pub target_height: u32,
    /// Minimum transparent margin between sprite and canvas edge
    pub min_padding: u32,
    /// Per-channel distance at which a pixel still counts as background
    pub tolerance: u8,
    /// Write indexed color when the palette allows it
    pub optimize: bool,
    pub max_asset_size: u32,
    pub resample: Resample,
    /// Background color to use instead of border detection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<[u8; 3]>,
}

impl Default for PrepareConfig {
    fn default() -> Self {
        Self {
            target_width: DEFAULT_TARGET_WIDTH,
            target_height: DEFAULT_TARGET_HEIGHT,
            min_padding: 2,
            tolerance: 10,
            optimize: true,
            max_asset_size: MAX_ASSET_SIZE,
            resample: Resample::Nearest,
            background: None,
        }
    }
}

impl PrepareConfig {
    /// Transparent margin kept around the sprite. Never below 1 px, so a
    /// prepared icon always carries transparency.
    pub fn margin(&self) -> u32 {
        self.min_padding.max(1)
    }

    /// Reject targets the asset platform would refuse or that cannot hold a sprite.
    pub fn check_limits(&self) -> Result<(), PrepareError> {
        if self.target_width > self.max_asset_size || self.target_height > self.max_asset_size {
            return Err(PrepareError::SizeLimitExceeded {
                width: self.target_width,
                height: self.target_height,
                limit: self.max_asset_size,
            });
        }
        let shortest = self.target_width.min(self.target_height);
        if self.margin().saturating_mul(2) >= shortest {
            return Err(PrepareError::NoRoomForSprite {
                width: self.target_width,
                height: self.target_height,
                margin: self.margin(),
            });
        }
        Ok(())
    }
}

/// Color mode of a decoded source image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    /// Palette image; `transparency` is set when it carried a tRNS chunk
    Indexed { transparency: bool },
    Grayscale,
    GrayscaleAlpha,
    Rgb,
    Rgba,
}

impl ColorMode {
    pub fn from_color_type(color: image::ColorType) -> Self {
        match (color.has_color(), color.has_alpha()) {
            (true, true) => ColorMode::Rgba,
            (true, false) => ColorMode::Rgb,
            (false, true) => ColorMode::GrayscaleAlpha,
            (false, false) => ColorMode::Grayscale,
        }
    }

    /// Whether the source could express transparency at all
    pub fn has_alpha(self) -> bool {
        match self {
            ColorMode::Indexed { transparency } => transparency,
            ColorMode::GrayscaleAlpha | ColorMode::Rgba => true,
            ColorMode::Grayscale | ColorMode::Rgb => false,
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorMode::Indexed { transparency: true } => write!(f, "indexed+trns"),
            ColorMode::Indexed { transparency: false } => write!(f, "indexed"),
            ColorMode::Grayscale => write!(f, "grayscale"),
            ColorMode::GrayscaleAlpha => write!(f, "grayscale+alpha"),
            ColorMode::Rgb => write!(f, "rgb"),
            ColorMode::Rgba => write!(f, "rgba"),
        }
    }
}

/// A decoded image plus what is known about its source encoding
#[derive(Debug, Clone)]
pub struct RasterImage {
    pub image: DynamicImage,
    pub mode: ColorMode,
    /// Container format, when decoded from bytes
    pub format: Option<ImageFormat>,
}

impl RasterImage {
    pub fn new(image: DynamicImage) -> Self {
        let mode = ColorMode::from_color_type(image.color());
        Self { image, mode, format: None }
    }

    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self { image: DynamicImage::ImageRgba8(pixels), mode: ColorMode::Rgba, format: Some(ImageFormat::Png) }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    pub fn to_rgba8(&self) -> RgbaImage {
        self.image.to_rgba8()
    }
}

/// Decode image bytes, recording palette-based PNG sources as indexed.
pub fn decode(bytes: &[u8]) -> Result<RasterImage, PrepareError> {
    let format = image::guess_format(bytes)?;
    let image = image::load_from_memory_with_format(bytes, format)?;
    let mut raster = RasterImage::new(image);
    raster.format = Some(format);

    if format == ImageFormat::Png {
        if let Ok(reader) = png::Decoder::new(bytes).read_info() {
            let info = reader.info();
            if info.color_type == png::ColorType::Indexed {
                raster.mode = ColorMode::Indexed { transparency: info.trns.is_some() };
            }
        }
    }
    Ok(raster)
}

/// Read and decode an image file.
pub fn decode_file(path: &Path) -> Result<RasterImage, PrepareError> {
    let bytes = std::fs::read(path)?;
    decode(&bytes)
}

/// How the alpha channel of a prepared icon was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatteOutcome {
    /// Source transparency was kept as is
    Preserved,
    /// Background color found on the border
    Detected { background: [u8; 3], cleared: usize },
    /// Background color given by the caller
    Manual { background: [u8; 3], cleared: usize },
}

impl fmt::Display for MatteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatteOutcome::Preserved => write!(f, "kept existing transparency"),
            MatteOutcome::Detected { background: [r, g, b], cleared } => {
                write!(f, "removed detected background RGB({}, {}, {}) from {} pixels", r, g, b, cleared)
            }
            MatteOutcome::Manual { background: [r, g, b], cleared } => {
                write!(f, "removed background RGB({}, {}, {}) from {} pixels", r, g, b, cleared)
            }
        }
    }
}

/// What [`prepare`] found and changed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    pub source_mode: ColorMode,
    pub source_size: (u32, u32),
    pub output_size: (u32, u32),
    pub matte: MatteOutcome,
    pub fixes: Vec<String>,
    pub warnings: Vec<String>,
    /// Problems that need a human to look before upload
    pub issues: Vec<String>,
}

impl ReportEntry {
    pub fn new(source_mode: ColorMode, source_size: (u32, u32)) -> Self {
        Self {
            source_mode,
            source_size,
            output_size: source_size,
            matte: MatteOutcome::Preserved,
            fixes: Vec::new(),
            warnings: Vec::new(),
            issues: Vec::new(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Run the full matting pipeline on `image`.
pub fn prepare(image: RasterImage, config: &PrepareConfig) -> Result<(RasterImage, ReportEntry), PrepareError> {
    config.check_limits()?;

    let mut report = ReportEntry::new(image.mode, image.dimensions());
    inspect_source(&image, config, &mut report);

    let source_alpha = image.mode.has_alpha();
    if image.mode != ColorMode::Rgba {
        report.fixes.push(format!("Converted {} to rgba", image.mode));
    }
    let mut pixels = image.to_rgba8();

    report.matte = synthesize_alpha(&mut pixels, source_alpha, config);
    if report.matte != MatteOutcome::Preserved {
        report.fixes.push(capitalize(&report.matte.to_string()));
    }

    let pixels = fit_to_canvas(pixels, config, &mut report);
    report.output_size = pixels.dimensions();
    debug!(mode = %report.source_mode, fixes = report.fixes.len(), "prepared icon");

    Ok((RasterImage::from_rgba(pixels), report))
}

/// Stages 2-4: keep existing transparency or build a binary alpha from the background.
fn synthesize_alpha(pixels: &mut RgbaImage, source_alpha: bool, config: &PrepareConfig) -> MatteOutcome {
    if source_alpha && has_transparency(pixels) {
        return MatteOutcome::Preserved;
    }

    if let Some(background) = config.background {
        let cleared = apply_matte(pixels, background, config.tolerance);
        return MatteOutcome::Manual { background, cleared };
    }

    match detect_background(pixels) {
        Some(background) => {
            let cleared = apply_matte(pixels, background, config.tolerance);
            MatteOutcome::Detected { background, cleared }
        }
        None => MatteOutcome::Preserved,
    }
}

fn inspect_source(image: &RasterImage, config: &PrepareConfig, report: &mut ReportEntry) {
    let (width, height) = image.dimensions();

    if let Some(format) = image.format {
        if format != ImageFormat::Png {
            report.issues.push(format!("Source is {:?}, not PNG", format));
        }
    }

    if width < MIN_SOURCE_WIDTH || height < MIN_SOURCE_HEIGHT {
        report.warnings.push(format!(
            "Image {}x{} is below the {}x{} minimum",
            width, height, MIN_SOURCE_WIDTH, MIN_SOURCE_HEIGHT
        ));
    } else if width < config.target_width || height < config.target_height {
        report.warnings.push(format!(
            "Image {}x{} is smaller than the {}x{} target",
            width, height, config.target_width, config.target_height
        ));
    } else if width > config.max_asset_size || height > config.max_asset_size {
        report.fixes.push(format!(
            "Scaled down {}x{} source that exceeds the {}x{} asset limit",
            width, height, config.max_asset_size, config.max_asset_size
        ));
    }

    if width > 0 && height > 0 {
        let source_ratio = width as f64 / height as f64;
        let target_ratio = config.target_width as f64 / config.target_height as f64;
        if (source_ratio - target_ratio).abs() > 0.2 {
            report.warnings.push(format!(
                "Aspect ratio {:.2} differs from target {:.2}",
                source_ratio, target_ratio
            ));
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
