//! Fitting a matted sprite onto the fixed-size icon canvas

use super::{PrepareConfig, ReportEntry};
use image::{imageops, RgbaImage};

/// Pixel bounding box as (x, y, width, height).
pub type Bounds = (u32, u32, u32, u32);

/// Bounding box of every pixel with non-zero alpha, or `None` if fully transparent.
pub fn content_bounds(image: &RgbaImage) -> Option<Bounds> {
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0;
    let mut max_y = 0;
    let mut found = false;

    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel[3] > 0 {
            found = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    found.then(|| (min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
}

/// Whether `bounds` keeps at least `padding` transparent pixels to every canvas edge.
pub fn respects_padding(bounds: Bounds, width: u32, height: u32, padding: u32) -> bool {
    let (x, y, w, h) = bounds;
    x >= padding
        && y >= padding
        && x as u64 + w as u64 + padding as u64 <= width as u64
        && y as u64 + h as u64 + padding as u64 <= height as u64
}

/// Largest size with the same aspect ratio as `width`x`height` that fits `max_w`x`max_h`.
pub fn fit_within(width: u32, height: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    let (w, h) = (width.max(1) as u64, height.max(1) as u64);
    let (max_w, max_h) = (max_w.max(1) as u64, max_h.max(1) as u64);
    let (new_w, new_h) = if w * max_h >= h * max_w {
        (max_w, h * max_w / w)
    } else {
        (w * max_h / h, max_h)
    };
    (new_w.max(1) as u32, new_h.max(1) as u32)
}

/// Place the visible content of `image` centered on a transparent target-size canvas.
///
/// An image already at the target size whose content respects the margin is
/// returned unchanged. Otherwise the content is cropped, scaled down (never
/// up) to fit inside the margin, and centered. The margin is
/// [`PrepareConfig::margin`], at least 1 px even when `min_padding` is 0.
pub fn fit_to_canvas(image: RgbaImage, config: &PrepareConfig, report: &mut ReportEntry) -> RgbaImage {
    let (target_w, target_h) = (config.target_width, config.target_height);
    let padding = config.margin();
    let bounds = content_bounds(&image);

    if image.dimensions() == (target_w, target_h)
        && bounds.map_or(true, |b| respects_padding(b, target_w, target_h, padding))
    {
        return image;
    }

    let mut canvas = RgbaImage::new(target_w, target_h);
    let Some((x, y, w, h)) = bounds else {
        report.fixes.push(format!("Replaced fully transparent image with blank {}x{} canvas", target_w, target_h));
        return canvas;
    };

    let mut sprite = imageops::crop_imm(&image, x, y, w, h).to_image();
    let avail_w = target_w.saturating_sub(padding.saturating_mul(2)).max(1);
    let avail_h = target_h.saturating_sub(padding.saturating_mul(2)).max(1);

    if w > avail_w || h > avail_h {
        let (new_w, new_h) = fit_within(w, h, avail_w, avail_h);
        sprite = imageops::resize(&sprite, new_w, new_h, config.resample.filter());
        report.fixes.push(format!("Scaled sprite from {}x{} to {}x{}", w, h, new_w, new_h));
    }

    let offset_x = target_w.saturating_sub(sprite.width()) / 2;
    let offset_y = target_h.saturating_sub(sprite.height()) / 2;
    imageops::replace(&mut canvas, &sprite, offset_x as i64, offset_y as i64);
    report.fixes.push(format!(
        "Centered on {}x{} canvas with at least {}px padding",
        target_w, target_h, padding
    ));
    canvas
}
