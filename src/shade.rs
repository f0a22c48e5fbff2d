//! Local illumination at a ray hit: per-light shadow test, Lambert diffuse and a
//! Blinn-Phong style highlight.

use nalgebra::{Point3, Vector3};

use crate::light::Light;
use crate::material::Material;
use crate::picture::Color;
use crate::ray::Ray;
use crate::scene::Scene;

/// Light gathered at one hit and the intensity left for the mirror bounce.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shading {
    pub color: Color,
    pub intensity: f64,
}

/// Shades `point` on surface `surface` of the scene.
///
/// `normal` must be unit length and `incoming` is the unit direction of the ray that
/// arrived at the point, before it was reflected. `intensity` weights every contribution
/// and is scaled by the surface reflection coefficient on the way out.
pub fn shade(
    scene: &Scene,
    surface: usize,
    point: &Point3<f64>,
    normal: &Vector3<f64>,
    incoming: &Vector3<f64>,
    intensity: f64,
) -> Shading {
    let material = scene.surface(surface).material();
    let mut color = Color::BLACK;

    for light in scene.lights() {
        let to_light = light.position - point;
        if normal.dot(&to_light) <= 0.0 {
            continue;
        }
        let Some(shadow_ray) = Ray::new(*point, to_light) else {
            continue;
        };
        if scene.occluded(&shadow_ray, surface) {
            continue;
        }

        let light_dir = shadow_ray.direction;
        color += lambert(&light_dir, normal, intensity, light, material);
        if let Some(highlight) = blinn_phong(&light_dir, normal, incoming, intensity, light, material) {
            color += highlight;
        }
    }

    Shading {
        color,
        intensity: intensity * material.reflection,
    }
}

fn lambert(light_dir: &Vector3<f64>, normal: &Vector3<f64>, intensity: f64, light: &Light, material: &Material) -> Color {
    let lambert = light_dir.dot(normal) * intensity;
    lambert * light.color.modulate(material.diffuse)
}

/// `None` when the light and view directions coincide and the half vector vanishes.
fn blinn_phong(
    light_dir: &Vector3<f64>,
    normal: &Vector3<f64>,
    incoming: &Vector3<f64>,
    intensity: f64,
    light: &Light,
    material: &Material,
) -> Option<Color> {
    let view_projection = incoming.dot(normal);
    let light_projection = light_dir.dot(normal);
    let blinn_dir = light_dir - incoming;
    let len_sq = blinn_dir.dot(&blinn_dir);
    if len_sq == 0.0 {
        return None;
    }

    let blinn = (light_projection - view_projection).max(0.0) / len_sq.sqrt();
    let blinn = intensity * blinn.powf(material.shininess);
    Some(blinn * light.intensity * material.specular)
}
