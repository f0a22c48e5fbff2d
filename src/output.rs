use std::path::Path;

use image::{ImageResult, Rgb, RgbImage};
use whitted::{Color, Picture};

/// Writes an 8-bit PNG. Rows are flipped so the file matches the window, where row 0
/// is at the bottom.
pub fn save_png(picture: &Picture<Color>, path: &Path) -> ImageResult<()> {
    let pixels = picture.to_rgba8();
    let height = pixels.height();
    let image = RgbImage::from_fn(pixels.width(), height, |x, y| {
        let pixel = pixels.pixel(x, height - 1 - y);
        Rgb([pixel.r, pixel.g, pixel.b])
    });
    image.save(path)
}
