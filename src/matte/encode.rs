//! Lossless PNG encoding for prepared icons

use super::PrepareError;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ColorType, ImageEncoder, RgbaImage};
use std::collections::HashMap;

/// Maximum palette size for indexed output.
pub const MAX_PALETTE: usize = 256;

/// Encode `image` as PNG bytes.
///
/// With `optimize`, images with at most 256 distinct RGBA values are written
/// as indexed color with a tRNS chunk; everything else is written as RGBA at
/// maximum compression. Pixel values are never altered.
pub fn encode_png(image: &RgbaImage, optimize: bool) -> Result<Vec<u8>, PrepareError> {
    if optimize {
        if let Some((palette, indices)) = build_palette(image) {
            return encode_indexed(image.width(), image.height(), &palette, &indices);
        }
    }

    let compression = if optimize { CompressionType::Best } else { CompressionType::Default };
    let mut bytes = Vec::new();
    PngEncoder::new_with_quality(&mut bytes, compression, FilterType::Adaptive)
        .write_image(image.as_raw(), image.width(), image.height(), ColorType::Rgba8)
        .map_err(|e| PrepareError::Encode(e.to_string()))?;
    Ok(bytes)
}

/// Palette in first-seen order and one index per pixel, or `None` past 256 colors.
fn build_palette(image: &RgbaImage) -> Option<(Vec<[u8; 4]>, Vec<u8>)> {
    let mut lookup: HashMap<[u8; 4], u8> = HashMap::new();
    let mut palette: Vec<[u8; 4]> = Vec::new();
    let mut indices = Vec::with_capacity((image.width() * image.height()) as usize);

    for pixel in image.pixels() {
        let index = match lookup.get(&pixel.0) {
            Some(index) => *index,
            None => {
                if palette.len() == MAX_PALETTE {
                    return None;
                }
                let index = palette.len() as u8;
                palette.push(pixel.0);
                lookup.insert(pixel.0, index);
                index
            }
        };
        indices.push(index);
    }
    Some((palette, indices))
}

fn encode_indexed(
    width: u32,
    height: u32,
    palette: &[[u8; 4]],
    indices: &[u8],
) -> Result<Vec<u8>, PrepareError> {
    let rgb: Vec<u8> = palette.iter().flat_map(|c| [c[0], c[1], c[2]]).collect();
    let alpha: Vec<u8> = palette.iter().map(|c| c[3]).collect();
    let encode_err = |e: png::EncodingError| PrepareError::Encode(e.to_string());

    let mut bytes = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut bytes, width, height);
        encoder.set_color(png::ColorType::Indexed);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(png::Compression::Best);
        encoder.set_palette(rgb);
        if alpha.iter().any(|a| *a != 255) {
            encoder.set_trns(alpha);
        }
        let mut writer = encoder.write_header().map_err(encode_err)?;
        writer.write_image_data(indices).map_err(encode_err)?;
        writer.finish().map_err(encode_err)?;
    }
    Ok(bytes)
}
