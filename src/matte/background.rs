//! Background color detection and binary alpha synthesis

use image::RgbaImage;
use std::collections::HashMap;

/// Border pixels in sampling order.
///
/// Corners come first (top-left, top-right, bottom-left, bottom-right), then
/// the full top, bottom, left and right edges. Corners are therefore counted
/// more than once, which biases detection toward them.
pub fn border_samples(image: &RgbaImage) -> Vec<[u8; 3]> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Vec::new();
    }
    let (right, bottom) = (width - 1, height - 1);
    let rgb = |x: u32, y: u32| {
        let p = image.get_pixel(x, y);
        [p[0], p[1], p[2]]
    };

    let mut samples = Vec::with_capacity(4 + 2 * (width + height) as usize);
    samples.extend([rgb(0, 0), rgb(right, 0), rgb(0, bottom), rgb(right, bottom)]);
    samples.extend((0..width).map(|x| rgb(x, 0)));
    samples.extend((0..width).map(|x| rgb(x, bottom)));
    samples.extend((0..height).map(|y| rgb(0, y)));
    samples.extend((0..height).map(|y| rgb(right, y)));
    samples
}

/// Most frequent exact RGB value on the border; ties go to the value seen first.
///
/// Returns `None` for an empty image.
pub fn detect_background(image: &RgbaImage) -> Option<[u8; 3]> {
    let samples = border_samples(image);
    let mut counts: HashMap<[u8; 3], usize> = HashMap::new();
    let mut first_seen: Vec<[u8; 3]> = Vec::new();

    for color in &samples {
        let count = counts.entry(*color).or_insert(0);
        if *count == 0 {
            first_seen.push(*color);
        }
        *count += 1;
    }

    let mut best: Option<([u8; 3], usize)> = None;
    for color in first_seen {
        let count = counts[&color];
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((color, count));
        }
    }
    best.map(|(color, _)| color)
}

/// True if any pixel is less than fully opaque.
pub fn has_transparency(image: &RgbaImage) -> bool {
    image.pixels().any(|p| p[3] < 255)
}

/// Whether `color` lies within `tolerance` of `background` on every channel.
pub fn is_background(color: [u8; 3], background: [u8; 3], tolerance: u8) -> bool {
    color.iter().zip(background.iter()).all(|(c, b)| c.abs_diff(*b) <= tolerance)
}

/// Set alpha to 0 for background pixels and 255 for everything else.
///
/// RGB values are left untouched. Returns the number of pixels cleared.
pub fn apply_matte(image: &mut RgbaImage, background: [u8; 3], tolerance: u8) -> usize {
    let mut cleared = 0;
    for pixel in image.pixels_mut() {
        if is_background([pixel[0], pixel[1], pixel[2]], background, tolerance) {
            pixel[3] = 0;
            cleared += 1;
        } else {
            pixel[3] = 255;
        }
    }
    cleared
}
