//! Configuration schema types for `iconsheet.toml`
//!
//! Defines the structure and validation rules for iconsheet configuration.

use crate::matte::PrepareConfig;
use crate::resolver::SheetId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Asset ids of the five regular sheets, in sheet order.
pub const DEFAULT_REGULAR_ASSETS: [&str; 5] =
    ["17134745575", "17134749969", "17134753859", "17134757872", "17134761227"];

/// Asset id of the egg sheet.
pub const DEFAULT_EGG_ASSET: &str = "13039987315";

/// Asset ids for each sprite sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetsConfig {
    /// Regular sheet asset ids; entry `i` belongs to sheet `i + 1`
    pub regular: Vec<String>,
    /// Egg sheet asset id
    pub egg: String,
    /// Prefix turning an asset id into a loadable URI
    pub asset_prefix: String,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            regular: DEFAULT_REGULAR_ASSETS.iter().map(|id| id.to_string()).collect(),
            egg: DEFAULT_EGG_ASSET.to_string(),
            asset_prefix: "rbxassetid://".to_string(),
        }
    }
}

impl SheetsConfig {
    /// Asset id for `sheet`, or `None` if no asset is configured for it
    pub fn asset_for(&self, sheet: SheetId) -> Option<&str> {
        let id = match sheet {
            SheetId::Egg => self.egg.as_str(),
            SheetId::Regular(index) => {
                let slot = usize::from(index).checked_sub(1)?;
                self.regular.get(slot)?.as_str()
            }
        };
        (!id.is_empty()).then_some(id)
    }
}

/// Custom icon table location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Path to the TOML table, relative to the config file
    pub path: PathBuf,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self { path: PathBuf::from("custom_icons.toml") }
    }
}

/// Complete iconsheet.toml configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IconsheetConfig {
    /// Matting pipeline settings
    pub prepare: PrepareConfig,
    /// Custom icon table settings
    pub table: TableConfig,
    /// Sheet asset ids
    pub sheets: SheetsConfig,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "prepare.target_width")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "iconsheet.toml: '{}' {}", self.field, self.message)
    }
}

impl IconsheetConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();
        let prepare = &self.prepare;

        if prepare.target_width == 0 || prepare.target_height == 0 {
            errors.push(ConfigValidationError {
                field: "prepare.target_width".to_string(),
                message: "target dimensions must be positive".to_string(),
            });
        }

        if prepare.target_width > prepare.max_asset_size || prepare.target_height > prepare.max_asset_size {
            errors.push(ConfigValidationError {
                field: "prepare.max_asset_size".to_string(),
                message: format!(
                    "target {}x{} exceeds the limit of {}",
                    prepare.target_width, prepare.target_height, prepare.max_asset_size
                ),
            });
        }

        let shortest = prepare.target_width.min(prepare.target_height);
        if prepare.margin().saturating_mul(2) >= shortest && shortest > 0 {
            errors.push(ConfigValidationError {
                field: "prepare.min_padding".to_string(),
                message: format!("leaves no room for the sprite on a {} pixel axis", shortest),
            });
        }

        if self.sheets.regular.len() > 6 {
            errors.push(ConfigValidationError {
                field: "sheets.regular".to_string(),
                message: format!("has {} entries, at most 6 sheets exist", self.sheets.regular.len()),
            });
        }

        for (i, id) in self.sheets.regular.iter().enumerate() {
            if !id.is_empty() && !id.chars().all(|c| c.is_ascii_digit()) {
                errors.push(ConfigValidationError {
                    field: format!("sheets.regular[{}]", i),
                    message: "must be a numeric asset id".to_string(),
                });
            }
        }

        if self.table.path.as_os_str().is_empty() {
            errors.push(ConfigValidationError {
                field: "table.path".to_string(),
                message: "must be a non-empty path".to_string(),
            });
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matte::Resample;

    #[test]
    fn test_empty_config_parse() {
        let config: IconsheetConfig = toml::from_str("").unwrap();
        assert_eq!(config, IconsheetConfig::default());
        assert!(config.is_valid());
    }

    #[test]
    fn test_full_config_parse() {
        let toml = r#"
[prepare]
target_width = 120
target_height = 90
min_padding = 4
tolerance = 25
optimize = false
resample = "lanczos"
background = [0, 255, 0]

[table]
path = "data/icons.toml"

[sheets]
regular = ["1", "2"]
egg = "3"
asset_prefix = "asset://"
"#;
        let config: IconsheetConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.prepare.target_width, 120);
        assert_eq!(config.prepare.min_padding, 4);
        assert_eq!(config.prepare.tolerance, 25);
        assert!(!config.prepare.optimize);
        assert_eq!(config.prepare.resample, Resample::Lanczos);
        assert_eq!(config.prepare.background, Some([0, 255, 0]));
        assert_eq!(config.prepare.max_asset_size, 1024);
        assert_eq!(config.table.path, PathBuf::from("data/icons.toml"));
        assert_eq!(config.sheets.regular, vec!["1", "2"]);
        assert_eq!(config.sheets.asset_prefix, "asset://");
        assert!(config.is_valid());
    }

    #[test]
    fn test_asset_for() {
        let sheets = SheetsConfig::default();
        assert_eq!(sheets.asset_for(SheetId::Regular(1)), Some("17134745575"));
        assert_eq!(sheets.asset_for(SheetId::Regular(5)), Some("17134761227"));
        assert_eq!(sheets.asset_for(SheetId::Regular(6)), None);
        assert_eq!(sheets.asset_for(SheetId::Regular(0)), None);
        assert_eq!(sheets.asset_for(SheetId::Egg), Some("13039987315"));

        let blank = SheetsConfig { egg: String::new(), ..Default::default() };
        assert_eq!(blank.asset_for(SheetId::Egg), None);
    }

    #[test]
    fn test_validate_errors() {
        let mut config = IconsheetConfig::default();
        config.prepare.target_width = 2000;
        config.prepare.min_padding = 40;
        config.sheets.regular[0] = "abc".to_string();

        let errors = config.validate();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"prepare.max_asset_size"));
        assert!(fields.contains(&"prepare.min_padding"));
        assert!(fields.contains(&"sheets.regular[0]"));
    }

    #[test]
    fn test_zero_padding_needs_room_for_margin() {
        let mut config = IconsheetConfig::default();
        config.prepare.min_padding = 0;
        assert!(config.is_valid());

        config.prepare.target_width = 2;
        config.prepare.target_height = 2;
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.field == "prepare.min_padding"));
    }

    #[test]
    fn test_validation_error_display() {
        let err = ConfigValidationError {
            field: "table.path".to_string(),
            message: "must be a non-empty path".to_string(),
        };
        assert_eq!(err.to_string(), "iconsheet.toml: 'table.path' must be a non-empty path");
    }
}
