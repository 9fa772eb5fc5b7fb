//! Configuration loading and discovery for `iconsheet.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::IconsheetConfig;
use crate::matte::Resample;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Name of the configuration file looked for during discovery.
pub const CONFIG_FILE_NAME: &str = "iconsheet.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse iconsheet.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override target width
    pub width: Option<u32>,
    /// Override target height
    pub height: Option<u32>,
    /// Override minimum padding
    pub padding: Option<u32>,
    /// Override background tolerance
    pub tolerance: Option<u8>,
    /// Force a background color
    pub background: Option<[u8; 3]>,
    /// Disable indexed output
    pub no_optimize: bool,
    /// Override resampling filter
    pub resample: Option<Resample>,
    /// Override custom icon table path
    pub table: Option<PathBuf>,
}

/// Find iconsheet.toml by walking up from the current working directory.
///
/// Search order:
/// 1. Walk up from current directory looking for iconsheet.toml
/// 2. Check XDG_CONFIG_HOME/iconsheet/iconsheet.toml (or ~/.config/iconsheet/iconsheet.toml)
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find iconsheet.toml in the XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("iconsheet").join(CONFIG_FILE_NAME);
    if config_path.exists() {
        Some(config_path)
    } else {
        None
    }
}

/// Find iconsheet.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from an iconsheet.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses `find_config()`
/// to locate the config file. If no config file is found, returns the default
/// configuration.
///
/// # Example
/// ```ignore
/// let config = load_config(None)?;
/// let config = load_config(Some(Path::new("assets/iconsheet.toml")))?;
/// ```
pub fn load_config(path: Option<&Path>) -> Result<IconsheetConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => {
            debug!("no iconsheet.toml found, using defaults");
            Ok(default_config())
        }
    }
}

/// Load configuration from a specific file path.
///
/// A relative `table.path` is resolved against the config file's directory.
fn load_config_file(path: &Path) -> Result<IconsheetConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let mut config: IconsheetConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    if let Some(root) = config_root(path) {
        config.table.path = resolve_path(root, &config.table.path);
    }
    debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Configuration used when no iconsheet.toml is found.
pub fn default_config() -> IconsheetConfig {
    IconsheetConfig::default()
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(config: &mut IconsheetConfig, overrides: &CliOverrides) {
    let prepare = &mut config.prepare;

    if let Some(width) = overrides.width {
        prepare.target_width = width;
    }
    if let Some(height) = overrides.height {
        prepare.target_height = height;
    }
    if let Some(padding) = overrides.padding {
        prepare.min_padding = padding;
    }
    if let Some(tolerance) = overrides.tolerance {
        prepare.tolerance = tolerance;
    }
    if let Some(background) = overrides.background {
        prepare.background = Some(background);
    }
    if overrides.no_optimize {
        prepare.optimize = false;
    }
    if let Some(resample) = overrides.resample {
        prepare.resample = resample;
    }

    if let Some(ref table) = overrides.table {
        config.table.path = table.clone();
    }
}

/// Directory containing the config file.
pub fn config_root(config_path: &Path) -> Option<&Path> {
    config_path.parent().filter(|p| !p.as_os_str().is_empty())
}

/// Resolve a path relative to the config root.
///
/// If the path is absolute, returns it unchanged.
pub fn resolve_path(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
