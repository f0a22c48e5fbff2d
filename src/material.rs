use crate::picture::Color;

/// Surface response to light under the Lambert + Blinn-Phong model.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub diffuse: Color,
    pub specular: Color,
    /// Fraction of the ray intensity carried into the mirror bounce.
    pub reflection: f64,
    /// Carried along with the material but not used by the shading loop.
    pub refraction: f64,
    /// Blinn-Phong exponent.
    pub shininess: f64,
}

impl Material {
    pub fn new(diffuse: Color, specular: Color, reflection: f64, shininess: f64) -> Self {
        Material {
            diffuse,
            specular,
            reflection,
            refraction: 0.0,
            shininess,
        }
    }

    /// Purely diffuse, non-reflective material.
    pub fn matte(diffuse: Color) -> Self {
        Material::new(diffuse, Color::BLACK, 0.0, 1.0)
    }

    pub fn with_refraction(mut self, refraction: f64) -> Self {
        self.refraction = refraction;
        self
    }
}
