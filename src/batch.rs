//! Batch preparation of custom icons
//!
//! Discovers source images, runs the matting pipeline on each in parallel,
//! and writes the prepared PNGs together with an upload tracking CSV and a
//! preview sheet. A failure on one file is recorded and the batch moves on.

use crate::matte::{decode_file, encode_png, prepare, PrepareConfig, PrepareError, ReportEntry};
use crate::output::{save_png, write_atomic, write_csv, OutputError};
use crate::preview::render_preview;
use glob::{glob_with, MatchOptions};
use image::RgbaImage;
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Name of the tracking spreadsheet written next to the prepared icons
pub const TRACKING_CSV: &str = "upload_tracking.csv";
/// Name of the preview sheet written next to the prepared icons
pub const PREVIEW_SHEET: &str = "preview_sheet.png";

/// Error during batch preparation
#[derive(Debug, Error)]
pub enum BatchError {
    /// Input path does not exist
    #[error("Input not found: {0}")]
    NotFound(PathBuf),
    /// Directory holds no PNG files
    #[error("No PNG files found in {0}")]
    NoImages(PathBuf),
    /// Glob pattern could not be built from the input path
    #[error("Invalid glob pattern '{0}': {1}")]
    InvalidPattern(String, glob::PatternError),
    /// Preparing one file failed
    #[error("{}: {source}", .path.display())]
    Prepare {
        path: PathBuf,
        #[source]
        source: PrepareError,
    },
    /// Writing results failed
    #[error(transparent)]
    Output(#[from] OutputError),
}

/// One successfully prepared icon
#[derive(Debug, Clone)]
pub struct PreparedIcon {
    pub source: PathBuf,
    pub output: PathBuf,
    pub report: ReportEntry,
    /// Size of the written PNG
    pub bytes: u64,
    pub pixels: RgbaImage,
}

/// Everything a batch run produced
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub prepared: Vec<PreparedIcon>,
    pub failures: Vec<BatchError>,
    pub tracking_csv: Option<PathBuf>,
    pub preview: Option<PathBuf>,
}

impl BatchSummary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Row of the upload tracking spreadsheet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackingRow {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Type")]
    pub variant: String,
    #[serde(rename = "File")]
    pub file: String,
    #[serde(rename = "Size")]
    pub size: String,
    #[serde(rename = "Dimensions")]
    pub dimensions: String,
    #[serde(rename = "Ready")]
    pub ready: String,
    #[serde(rename = "Normal Asset ID")]
    pub normal_asset_id: String,
    #[serde(rename = "Shiny Asset ID")]
    pub shiny_asset_id: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Notes")]
    pub notes: String,
}

impl TrackingRow {
    pub fn from_icon(icon: &PreparedIcon) -> Self {
        let stem = icon.source.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        let (name, variant) = icon_label(stem);
        let (width, height) = icon.report.output_size;

        Self {
            name,
            variant: variant.to_string(),
            file: icon.source.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default(),
            size: format!("{} bytes", icon.bytes),
            dimensions: format!("{}x{}", width, height),
            ready: if icon.report.is_ready() { "yes" } else { "review" }.to_string(),
            normal_asset_id: String::new(),
            shiny_asset_id: String::new(),
            status: "Pending Upload".to_string(),
            notes: icon.report.issues.iter().take(2).cloned().collect::<Vec<_>>().join("; "),
        }
    }
}

/// Display name and variant derived from a file stem.
///
/// `mega_charizard_shiny` becomes ("Mega Charizard", "Shiny").
pub fn icon_label(stem: &str) -> (String, &'static str) {
    let lower = stem.to_lowercase();
    let variant = if lower.contains("shiny") { "Shiny" } else { "Normal" };
    let name = lower
        .replace("_normal", "")
        .replace("_shiny", "")
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ");
    (name, variant)
}

/// Sorted list of `*.png` files (any extension case) directly inside `dir`.
pub fn discover_inputs(dir: &Path) -> Result<Vec<PathBuf>, BatchError> {
    if !dir.is_dir() {
        return Err(BatchError::NotFound(dir.to_path_buf()));
    }

    let pattern = format!("{}/*.png", glob::Pattern::escape(&dir.to_string_lossy()));
    let options = MatchOptions { case_sensitive: false, ..MatchOptions::new() };
    let paths = glob_with(&pattern, options).map_err(|e| BatchError::InvalidPattern(pattern.clone(), e))?;

    let mut files = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => warn!("error reading path: {}", e),
        }
    }

    files.sort();
    Ok(files)
}

/// Prepare one file and write the result to `output`.
pub fn prepare_file(input: &Path, output: &Path, config: &PrepareConfig) -> Result<PreparedIcon, BatchError> {
    let wrap = |source: PrepareError| BatchError::Prepare { path: input.to_path_buf(), source };

    let raster = decode_file(input).map_err(wrap)?;
    let (prepared, report) = prepare(raster, config).map_err(wrap)?;
    let pixels = prepared.to_rgba8();
    let bytes = encode_png(&pixels, config.optimize).map_err(wrap)?;
    write_atomic(output, &bytes)?;

    info!(
        input = %input.display(),
        output = %output.display(),
        matte = %report.matte,
        "prepared icon"
    );

    Ok(PreparedIcon {
        source: input.to_path_buf(),
        output: output.to_path_buf(),
        report,
        bytes: bytes.len() as u64,
        pixels,
    })
}

/// Prepare every PNG in `input_dir`.
///
/// Outputs go to `output_dir`, or `<input_dir>/prepared` by default. The
/// tracking CSV and preview sheet are written when at least one file succeeds.
pub fn run_batch(
    input_dir: &Path,
    output_dir: Option<&Path>,
    config: &PrepareConfig,
) -> Result<BatchSummary, BatchError> {
    let inputs = discover_inputs(input_dir)?;
    if inputs.is_empty() {
        return Err(BatchError::NoImages(input_dir.to_path_buf()));
    }
    config.check_limits().map_err(|source| BatchError::Prepare { path: input_dir.to_path_buf(), source })?;

    let output_dir = output_dir.map(Path::to_path_buf).unwrap_or_else(|| input_dir.join("prepared"));
    info!(count = inputs.len(), output = %output_dir.display(), "preparing batch");

    let results: Vec<Result<PreparedIcon, BatchError>> = inputs
        .par_iter()
        .map(|input| {
            let name = input.file_name().map(PathBuf::from).unwrap_or_else(|| "icon.png".into());
            prepare_file(input, &output_dir.join(name), config)
        })
        .collect();

    let mut summary = BatchSummary::default();
    for result in results {
        match result {
            Ok(icon) => summary.prepared.push(icon),
            Err(e) => {
                warn!("{}", e);
                summary.failures.push(e);
            }
        }
    }

    if summary.prepared.is_empty() {
        return Ok(summary);
    }

    let rows: Vec<TrackingRow> = summary.prepared.iter().map(TrackingRow::from_icon).collect();
    let csv_path = output_dir.join(TRACKING_CSV);
    write_csv(&csv_path, &rows)?;
    summary.tracking_csv = Some(csv_path);

    let icons: Vec<RgbaImage> = summary.prepared.iter().map(|icon| icon.pixels.clone()).collect();
    if let Some(sheet) = render_preview(&icons) {
        let preview_path = output_dir.join(PREVIEW_SHEET);
        save_png(&sheet, &preview_path)?;
        summary.preview = Some(preview_path);
    }

    Ok(summary)
}
