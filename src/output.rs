//! File output: atomic writes, PNG saving, CSV reports and output naming

use image::RgbaImage;
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Error type for output operations
#[derive(Debug, Error)]
pub enum OutputError {
    /// IO error during file operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Image encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    /// CSV serialization error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// Renaming the temporary file over the target failed
    #[error("Failed to replace '{path}': {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn ensure_parent(path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Write `contents` to `path` atomically.
///
/// The bytes go to a temporary file in the target's directory which is then
/// renamed over the target, so a crash mid-write leaves the old file intact.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), OutputError> {
    ensure_parent(path)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(contents)?;
    temp.as_file().sync_all()?;
    temp.persist(path)
        .map_err(|e| OutputError::Persist { path: path.to_path_buf(), source: e.error })?;
    Ok(())
}

/// Save an RGBA image to a PNG file, creating parent directories.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), OutputError> {
    ensure_parent(path)?;
    image.save(path)?;
    Ok(())
}

/// Write serializable rows as a CSV file with a header line.
pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), OutputError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer.into_inner().map_err(|e| OutputError::Io(e.into_error()))?;
    write_atomic(path, &bytes)
}

/// Generate the output path for a prepared icon.
///
/// | Scenario | Output |
/// |----------|--------|
/// | No `-o` | `{input_stem}_prepared.png` next to the input |
/// | `-o out.png` | `out.png` |
/// | `-o dir/` or existing directory | `dir/{input_name}` |
pub fn prepared_output_path(input: &Path, output_arg: Option<&Path>) -> PathBuf {
    match output_arg {
        Some(output) => {
            let is_dir = output.as_os_str().to_string_lossy().ends_with('/') || output.is_dir();
            if is_dir {
                let name = input.file_name().map(PathBuf::from).unwrap_or_else(|| "icon.png".into());
                output.join(name.with_extension("png"))
            } else {
                output.to_path_buf()
            }
        }
        None => {
            let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("icon");
            let parent = input.parent().unwrap_or(Path::new(""));
            parent.join(format!("{}_prepared.png", stem))
        }
    }
}
