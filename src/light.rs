use nalgebra::Point3;

use crate::picture::Color;

/// Point light. `color` filters the diffuse term, `intensity` scales the specular one.
#[derive(Clone, Debug, PartialEq)]
pub struct Light {
    pub position: Point3<f64>,
    pub color: Color,
    pub intensity: f64,
}

impl Light {
    pub fn new(position: Point3<f64>, color: Color, intensity: f64) -> Self {
        Light { position, color, intensity }
    }

    pub fn white(position: Point3<f64>, intensity: f64) -> Self {
        Light::new(position, Color::WHITE, intensity)
    }
}
