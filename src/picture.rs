use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul};

use bytemuck_derive::{AnyBitPattern, NoUninit};

/// Linear RGB color. Channels are nominally in `[0, 1]` but may exceed that while light
/// is being accumulated.
#[derive(Default, Debug, Copy, Clone, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Sum for Color {
    fn sum<I: Iterator<Item=Self>>(iter: I) -> Self {
        let mut acc = Color::BLACK;
        for color in iter {
            acc += color;
        }
        acc
    }
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);

    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Caps every channel at 1.0. There is no lower bound, negative channels are kept.
    pub fn clamped(self) -> Self {
        Color::new(self.r.min(1.0), self.g.min(1.0), self.b.min(1.0))
    }

    /// Channel-wise product, used to filter light through a surface color.
    pub fn modulate(self, rhs: Color) -> Self {
        Color::new(self.r * rhs.r, self.g * rhs.g, self.b * rhs.b)
    }
}

impl Add for Color {
    type Output = Color;

    fn add(self, rhs: Self) -> Self::Output {
        Color::new(
            self.r + rhs.r,
            self.g + rhs.g,
            self.b + rhs.b,
        )
    }
}

impl AddAssign for Color {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Mul<f64> for Color {
    type Output = Color;

    fn mul(self, rhs: f64) -> Self::Output {
        Color::new(
            self.r * rhs,
            self.g * rhs,
            self.b * rhs,
        )
    }
}

impl Div<f64> for Color {
    type Output = Color;

    fn div(self, rhs: f64) -> Self::Output {
        Color::new(
            self.r / rhs,
            self.g / rhs,
            self.b / rhs,
        )
    }
}

impl Mul<Color> for f64 {
    type Output = Color;

    fn mul(self, rhs: Color) -> Self::Output {
        rhs * self
    }
}

/// 8-bit display pixel, laid out to be uploaded straight into an `Rgba8Unorm` texture.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, AnyBitPattern, NoUninit)]
#[repr(C)]
pub struct RGBA8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl From<Color> for RGBA8 {
    fn from(value: Color) -> Self {
        RGBA8::new_norm(value.r, value.g, value.b)
    }
}

fn normalize(value: f64) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl RGBA8 {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        RGBA8 { r, g, b, a }
    }

    pub fn new_norm(r: f64, g: f64, b: f64) -> Self {
        RGBA8::new(normalize(r), normalize(g), normalize(b), u8::MAX)
    }
}

/// Dense row-major pixel grid indexed by `(x, y)`, `x` being the column.
#[derive(Clone, Debug, PartialEq)]
pub struct Picture<P> {
    pixels: Vec<P>,
    size: (u32, u32),
}

impl<P: Default + Clone> Picture<P> {
    /// Allocates a picture with every pixel set to `P::default()` (black for [`Color`]).
    pub fn new(width: u32, height: u32) -> Self {
        Picture {
            pixels: vec![P::default(); width as usize * height as usize],
            size: (width, height),
        }
    }
}

impl<P> Picture<P> {
    pub fn width(&self) -> u32 {
        self.size.0
    }

    pub fn height(&self) -> u32 {
        self.size.1
    }

    fn to_index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width() as usize + x as usize
    }

    pub fn pixel(&self, x: u32, y: u32) -> &P {
        &self.pixels[self.to_index(x, y)]
    }

    pub fn pixel_mut(&mut self, x: u32, y: u32) -> &mut P {
        let index = self.to_index(x, y);
        &mut self.pixels[index]
    }

    pub fn buffer(&self) -> &[P] {
        &self.pixels
    }

    /// Builds a picture of the same shape by converting every pixel.
    pub fn map<Q>(&self, f: impl FnMut(&P) -> Q) -> Picture<Q> {
        Picture {
            pixels: self.pixels.iter().map(f).collect(),
            size: self.size,
        }
    }
}

impl Picture<Color> {
    pub fn to_rgba8(&self) -> Picture<RGBA8> {
        self.map(|&color| RGBA8::from(color))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_caps_only_the_upper_bound() {
        let color = Color::new(1.7, 0.25, -0.5).clamped();
        assert_eq!(color, Color::new(1.0, 0.25, -0.5));
        assert_eq!(Color::new(1.0, 0.999, 0.0).clamped(), Color::new(1.0, 0.999, 0.0));
    }

    #[test]
    fn rgba8_conversion_saturates() {
        assert_eq!(RGBA8::from(Color::new(2.0, -1.0, 0.5)), RGBA8::new(255, 0, 128, 255));
    }

    #[test]
    fn picture_is_row_major_and_starts_black() {
        let mut picture = Picture::<Color>::new(3, 2);
        assert!(picture.buffer().iter().all(|&c| c == Color::BLACK));

        *picture.pixel_mut(2, 1) = Color::WHITE;
        assert_eq!(picture.buffer()[5], Color::WHITE);
        assert_eq!(*picture.pixel(2, 1), Color::WHITE);
    }
}
