//! Preview sheet rendering - lays prepared icons out on a grid for review

use crate::matte::layout::fit_within;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

/// Maximum icons per preview row
pub const PREVIEW_COLUMNS: u32 = 8;
/// Side length of one preview cell
pub const CELL_SIZE: u32 = 100;
/// Gap between cells and around the grid
pub const GUTTER: u32 = 10;
/// Extra space below the grid
pub const FOOTER: u32 = 30;
/// Largest thumbnail drawn inside a cell
pub const THUMB_BOUNDS: (u32, u32) = (90, 70);

const BACKGROUND: Rgba<u8> = Rgba([40, 40, 40, 255]);
const CELL_FILL: Rgba<u8> = Rgba([60, 60, 60, 255]);
const CELL_OUTLINE: Rgba<u8> = Rgba([100, 100, 100, 255]);

/// Render icons into a dark preview grid.
///
/// Icons are placed left to right, at most [`PREVIEW_COLUMNS`] per row, each
/// on its own outlined cell. Icons larger than [`THUMB_BOUNDS`] are shrunk to
/// fit; smaller ones are drawn at their own size. The thumbnail is centered
/// horizontally in the cell and vertically in its top 70 pixels.
///
/// Returns `None` when there are no icons.
///
/// # Examples
///
/// ```
/// use image::RgbaImage;
/// use iconsheet::preview::render_preview;
///
/// let icon = RgbaImage::from_pixel(80, 60, image::Rgba([255, 0, 0, 255]));
/// let sheet = render_preview(&[icon.clone(), icon]).unwrap();
/// assert_eq!(sheet.width(), 2 * 110 + 10);
/// assert_eq!(sheet.height(), 110 + 10 + 30);
/// ```
pub fn render_preview(icons: &[RgbaImage]) -> Option<RgbaImage> {
    if icons.is_empty() {
        return None;
    }

    let count = icons.len() as u32;
    let columns = count.min(PREVIEW_COLUMNS);
    let rows = count.div_ceil(columns);

    let width = columns * (CELL_SIZE + GUTTER) + GUTTER;
    let height = rows * (CELL_SIZE + GUTTER) + GUTTER + FOOTER;
    let mut sheet = RgbaImage::from_pixel(width, height, BACKGROUND);

    for (i, icon) in icons.iter().enumerate() {
        let col = (i as u32) % columns;
        let row = (i as u32) / columns;
        let x = GUTTER + col * (CELL_SIZE + GUTTER);
        let y = GUTTER + row * (CELL_SIZE + GUTTER);

        draw_cell(&mut sheet, x, y);

        let thumb = thumbnail(icon);
        let icon_x = x + (CELL_SIZE - thumb.width()) / 2;
        let icon_y = y + (THUMB_BOUNDS.1 - thumb.height()) / 2;
        imageops::overlay(&mut sheet, &thumb, icon_x as i64, icon_y as i64);
    }

    Some(sheet)
}

fn draw_cell(sheet: &mut RgbaImage, x: u32, y: u32) {
    for dy in 0..CELL_SIZE {
        for dx in 0..CELL_SIZE {
            let edge = dx == 0 || dy == 0 || dx == CELL_SIZE - 1 || dy == CELL_SIZE - 1;
            sheet.put_pixel(x + dx, y + dy, if edge { CELL_OUTLINE } else { CELL_FILL });
        }
    }
}

/// Shrink (never enlarge) an icon to fit the thumbnail bounds.
fn thumbnail(icon: &RgbaImage) -> RgbaImage {
    let (max_w, max_h) = THUMB_BOUNDS;
    if icon.width() <= max_w && icon.height() <= max_h {
        return icon.clone();
    }
    let (w, h) = fit_within(icon.width(), icon.height(), max_w, max_h);
    imageops::resize(icon, w, h, FilterType::Lanczos3)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    #[test]
    fn test_empty_icons() {
        assert!(render_preview(&[]).is_none());
    }

    #[test]
    fn test_single_icon_centered() {
        let icon = RgbaImage::from_pixel(80, 60, RED);
        let sheet = render_preview(&[icon]).unwrap();

        assert_eq!(sheet.dimensions(), (120, 150));
        assert_eq!(*sheet.get_pixel(0, 0), BACKGROUND);
        assert_eq!(*sheet.get_pixel(10, 10), CELL_OUTLINE);
        assert_eq!(*sheet.get_pixel(12, 90), CELL_FILL);
        // x = 10 + (100 - 80) / 2, y = 10 + (70 - 60) / 2
        assert_eq!(*sheet.get_pixel(20, 15), RED);
        assert_eq!(*sheet.get_pixel(19, 15), CELL_FILL);
    }

    #[test]
    fn test_wraps_after_eight_columns() {
        let icons = vec![RgbaImage::from_pixel(10, 10, RED); 9];
        let sheet = render_preview(&icons).unwrap();

        assert_eq!(sheet.width(), 8 * 110 + 10);
        assert_eq!(sheet.height(), 2 * 110 + 10 + 30);
        // Ninth icon starts the second row.
        assert_eq!(*sheet.get_pixel(10, 120), CELL_OUTLINE);
    }

    #[test]
    fn test_transparent_icon_pixels_show_cell() {
        let icon = RgbaImage::new(80, 60);
        let sheet = render_preview(&[icon]).unwrap();
        assert_eq!(*sheet.get_pixel(50, 40), CELL_FILL);
    }

    #[test]
    fn test_large_icon_shrunk() {
        let thumb = thumbnail(&RgbaImage::from_pixel(180, 140, RED));
        assert_eq!(thumb.dimensions(), (90, 70));
    }
}
