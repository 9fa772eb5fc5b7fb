//! Whole-sheet validation
//!
//! Checks a finished sprite sheet against the grid geometry the resolver
//! assumes and lists cells that hold no artwork.

use crate::matte::{ColorMode, RasterImage};
use crate::resolver::{EGG_CELL_HEIGHT, EGG_CELL_WIDTH, EGG_COLUMNS, REGULAR_CELL_HEIGHT, REGULAR_CELL_WIDTH, SPRITE_WIDTH};
use image::RgbaImage;
use serde::Serialize;
use std::fmt;

/// Width of a full regular sheet (21 cells).
pub const REGULAR_FULL_WIDTH: u32 = 1680;
/// Width of a split regular sheet (11 cells).
pub const REGULAR_SPLIT_WIDTH: u32 = 880;
/// Width of the egg sheet.
pub const EGG_SHEET_WIDTH: u32 = EGG_COLUMNS as u32 * EGG_CELL_WIDTH;

/// Sheet layout family
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SheetKind {
    #[default]
    Regular,
    Egg,
}

impl SheetKind {
    /// Size of one grid cell in pixels.
    pub fn cell_size(self) -> (u32, u32) {
        match self {
            SheetKind::Regular => (REGULAR_CELL_WIDTH, REGULAR_CELL_HEIGHT),
            SheetKind::Egg => (EGG_CELL_WIDTH, EGG_CELL_HEIGHT),
        }
    }
}

impl fmt::Display for SheetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetKind::Regular => write!(f, "regular"),
            SheetKind::Egg => write!(f, "egg"),
        }
    }
}

/// Which sprite of a cell is empty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CellPart {
    Normal,
    Shiny,
    Egg,
}

/// A sprite rectangle with every pixel fully transparent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmptyCell {
    pub part: CellPart,
    pub column: u32,
    pub row: u32,
    pub x: u32,
    pub y: u32,
}

impl fmt::Display for EmptyCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let part = match self.part {
            CellPart::Normal => "Normal",
            CellPart::Shiny => "Shiny",
            CellPart::Egg => "Egg",
        };
        write!(f, "{} col {} row {} at ({}, {})", part, self.column, self.row, self.x, self.y)
    }
}

/// Result of [`validate_sheet`]
#[derive(Debug, Clone, Serialize)]
pub struct SheetReport {
    pub kind: SheetKind,
    pub width: u32,
    pub height: u32,
    pub columns: u32,
    pub rows: u32,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub empty_cells: Vec<EmptyCell>,
}

impl SheetReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate a sheet image as the given kind.
pub fn validate_sheet(image: &RasterImage, kind: SheetKind) -> SheetReport {
    let (width, height) = image.dimensions();
    let (cell_w, cell_h) = kind.cell_size();
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    match kind {
        SheetKind::Regular => {
            if width != REGULAR_FULL_WIDTH && width != REGULAR_SPLIT_WIDTH {
                errors.push(format!(
                    "Width {}px is invalid. Should be {}px (full) or {}px (split)",
                    width, REGULAR_FULL_WIDTH, REGULAR_SPLIT_WIDTH
                ));
            }
        }
        SheetKind::Egg => {
            if width != EGG_SHEET_WIDTH {
                errors.push(format!("Width {}px is invalid. Should be {}px", width, EGG_SHEET_WIDTH));
            }
        }
    }
    if height % cell_h != 0 {
        errors.push(format!("Height {}px is not a multiple of {}px", height, cell_h));
    }

    if !image.mode.has_alpha() {
        warnings.push("Image has no alpha channel, background won't be transparent".to_string());
    }
    if image.mode != ColorMode::Rgba {
        warnings.push(format!("Image mode is {}, rgba is recommended", image.mode));
    }

    let pixels = image.to_rgba8();
    let columns = width / cell_w;
    let rows = height / cell_h;
    let mut empty_cells = Vec::new();

    for row in 0..rows {
        for column in 0..columns {
            let x = column * cell_w;
            let y = row * cell_h;
            let parts: &[(CellPart, u32, u32)] = match kind {
                SheetKind::Regular => &[(CellPart::Normal, 0, SPRITE_WIDTH), (CellPart::Shiny, SPRITE_WIDTH, SPRITE_WIDTH)],
                SheetKind::Egg => &[(CellPart::Egg, 0, EGG_CELL_WIDTH)],
            };
            for &(part, offset, part_w) in parts {
                if is_rect_empty(&pixels, x + offset, y, part_w, cell_h) {
                    empty_cells.push(EmptyCell { part, column, row, x: x + offset, y });
                }
            }
        }
    }

    SheetReport { kind, width, height, columns, rows, errors, warnings, empty_cells }
}

/// True if every pixel of the rectangle (clipped to the image) has alpha 0.
pub fn is_rect_empty(image: &RgbaImage, x: u32, y: u32, width: u32, height: u32) -> bool {
    let x_end = (x + width).min(image.width());
    let y_end = (y + height).min(image.height());
    (y..y_end).all(|py| (x..x_end).all(|px| image.get_pixel(px, py)[3] == 0))
}
