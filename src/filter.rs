//! Post-process box blur used as the renderer's only anti-aliasing.

use crate::picture::{Color, Picture};

/// 3x3 mean filter, each channel on its own. The outermost ring of pixels is copied
/// unchanged, and every average reads the unfiltered source.
pub fn box_blur(source: &Picture<Color>) -> Picture<Color> {
    let mut blurred = source.clone();
    let (width, height) = (source.width(), source.height());
    if width < 3 || height < 3 {
        return blurred;
    }

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let sum: Color = (y - 1..=y + 1)
                .flat_map(|ny| (x - 1..=x + 1).map(move |nx| (nx, ny)))
                .map(|(nx, ny)| *source.pixel(nx, ny))
                .sum();
            *blurred.pixel_mut(x, y) = sum / 9.0;
        }
    }
    blurred
}
