//! Blank guide sheets for drawing new icons

use crate::resolver::{EGG_CELL_HEIGHT, EGG_CELL_WIDTH, REGULAR_CELL_HEIGHT, REGULAR_CELL_WIDTH, SPRITE_WIDTH};
use crate::validate::{SheetKind, EGG_SHEET_WIDTH, REGULAR_FULL_WIDTH};
use image::{Rgba, RgbaImage};

/// Default number of rows in a generated template.
pub const DEFAULT_TEMPLATE_ROWS: u32 = 25;

/// Cell boundary color
pub const GRID_COLOR: Rgba<u8> = Rgba([100, 100, 100, 128]);
/// Normal/shiny divider color
pub const DIVIDER_COLOR: Rgba<u8> = Rgba([200, 50, 50, 180]);

/// Draw a transparent template sheet with cell guides.
///
/// Regular sheets are 1680 px wide with gray lines on every cell edge and a
/// red line between the normal and shiny halves. Egg sheets are 540 px wide
/// with gray cell lines only.
pub fn render_template(kind: SheetKind, rows: u32) -> RgbaImage {
    let (width, cell_w, cell_h) = match kind {
        SheetKind::Regular => (REGULAR_FULL_WIDTH, REGULAR_CELL_WIDTH, REGULAR_CELL_HEIGHT),
        SheetKind::Egg => (EGG_SHEET_WIDTH, EGG_CELL_WIDTH, EGG_CELL_HEIGHT),
    };
    let height = rows.max(1) * cell_h;
    let mut image = RgbaImage::new(width, height);

    for x in (0..width).step_by(cell_w as usize) {
        vertical_line(&mut image, x, GRID_COLOR);
    }
    if kind == SheetKind::Regular {
        for x in (SPRITE_WIDTH..width).step_by(cell_w as usize) {
            vertical_line(&mut image, x, DIVIDER_COLOR);
        }
    }
    for y in (0..height).step_by(cell_h as usize) {
        for x in 0..width {
            image.put_pixel(x, y, GRID_COLOR);
        }
    }

    image
}

fn vertical_line(image: &mut RgbaImage, x: u32, color: Rgba<u8>) {
    for y in 0..image.height() {
        image.put_pixel(x, y, color);
    }
}
