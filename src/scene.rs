use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use float_ord::FloatOrd;
use log::debug;
use nalgebra::{point, Point3, Vector3};
use serde::Deserialize;

use crate::error::SceneError;
use crate::light::Light;
use crate::material::Material;
use crate::object::{Plane, Sphere, Surface};
use crate::picture::Color;
use crate::ray::{Hit, Ray};

/// Surfaces and lights of one frame. Both collections are fixed once the scene is built.
#[derive(Clone, Debug)]
pub struct Scene {
    surfaces: Vec<Surface>,
    lights: Vec<Light>,
}

impl Scene {
    pub fn builder() -> SceneBuilder {
        SceneBuilder::default()
    }

    /// Two spheres under a single white light, sized for an 800x600 orthographic frame.
    pub fn reference() -> Self {
        let blue = Material::new(Color::new(0.01, 0.05, 0.9), Color::new(0.1, 0.0, 1.0), 0.7, 0.2);
        let red = Material::new(Color::new(0.9, 0.1, 0.1), Color::new(0.8, 0.7, 0.6), 0.1, 0.8);

        Scene::builder()
            .surface(Sphere::new(point![100.0, 200.0, 0.0], 50.0, blue))
            .surface(Sphere::new(point![500.0, 300.0, 0.0], 80.0, red))
            .light(Light::white(point![300.0, 400.0, -1000.0], 1.0))
            .build()
    }

    pub fn surface(&self, index: usize) -> &Surface {
        &self.surfaces[index]
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    /// Closest surface in front of the ray. Equal distances resolve to the surface added
    /// first.
    pub fn nearest_hit(&self, ray: &Ray) -> Option<Hit> {
        self.surfaces.iter()
            .enumerate()
            .filter_map(|(surface, obj)| obj.intersect(ray).map(|t| Hit { surface, t }))
            .min_by_key(|hit| FloatOrd(hit.t))
    }

    /// Whether any surface other than `except` lies anywhere in front of the ray.
    pub fn occluded(&self, ray: &Ray, except: usize) -> bool {
        self.surfaces.iter()
            .enumerate()
            .any(|(index, obj)| index != except && obj.intersect(ray).is_some())
    }

    /// Reads a JSON scene description from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Scene, SceneError> {
        let file = File::open(path.as_ref())?;
        let scene = Scene::from_reader(BufReader::new(file))?;
        debug!(target: "app", "Loaded {}: {} surfaces, {} lights",
            path.as_ref().display(), scene.surface_count(), scene.light_count());
        Ok(scene)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Scene, SceneError> {
        let declaration: SceneDeclaration = serde_json::from_reader(reader)?;
        declaration.build()
    }

    pub fn from_json(text: &str) -> Result<Scene, SceneError> {
        let declaration: SceneDeclaration = serde_json::from_str(text)?;
        declaration.build()
    }
}

#[derive(Default)]
pub struct SceneBuilder {
    surfaces: Vec<Surface>,
    lights: Vec<Light>,
}

impl SceneBuilder {
    pub fn surface(mut self, surface: impl Into<Surface>) -> Self {
        self.surfaces.push(surface.into());
        self
    }

    pub fn light(mut self, light: Light) -> Self {
        self.lights.push(light);
        self
    }

    pub fn build(self) -> Scene {
        Scene {
            surfaces: self.surfaces,
            lights: self.lights,
        }
    }
}

fn default_shininess() -> f64 {
    1.0
}

#[derive(Debug, Deserialize)]
struct MaterialDeclaration {
    diffuse: [f64; 3],
    #[serde(default)]
    specular: [f64; 3],
    #[serde(default)]
    reflection: f64,
    #[serde(default)]
    refraction: f64,
    #[serde(default = "default_shininess")]
    shininess: f64,
}

impl From<&MaterialDeclaration> for Material {
    fn from(decl: &MaterialDeclaration) -> Self {
        let [dr, dg, db] = decl.diffuse;
        let [sr, sg, sb] = decl.specular;
        Material::new(Color::new(dr, dg, db), Color::new(sr, sg, sb), decl.reflection, decl.shininess)
            .with_refraction(decl.refraction)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase", tag = "shape")]
enum SurfaceDeclaration {
    Sphere {
        center: [f64; 3],
        radius: f64,
        material: MaterialDeclaration,
    },
    Plane {
        point: [f64; 3],
        normal: [f64; 3],
        material: MaterialDeclaration,
    },
}

#[derive(Debug, Deserialize)]
struct LightDeclaration {
    position: [f64; 3],
    #[serde(default = "white")]
    color: [f64; 3],
    intensity: f64,
}

fn white() -> [f64; 3] {
    [1.0, 1.0, 1.0]
}

#[derive(Debug, Deserialize)]
struct SceneDeclaration {
    surfaces: Vec<SurfaceDeclaration>,
    lights: Vec<LightDeclaration>,
}

impl SceneDeclaration {
    fn build(&self) -> Result<Scene, SceneError> {
        let mut builder = Scene::builder();
        for (index, decl) in self.surfaces.iter().enumerate() {
            builder = match decl {
                SurfaceDeclaration::Sphere { center, radius, material } => {
                    if *radius <= 0.0 {
                        return Err(SceneError::InvalidRadius { index, radius: *radius });
                    }
                    builder.surface(Sphere::new(Point3::from(*center), *radius, material.into()))
                }
                SurfaceDeclaration::Plane { point, normal, material } => {
                    let plane = Plane::new(Point3::from(*point), Vector3::from(*normal), material.into())
                        .ok_or(SceneError::DegenerateNormal { index })?;
                    builder.surface(plane)
                }
            };
        }
        for decl in &self.lights {
            let [r, g, b] = decl.color;
            builder = builder.light(Light::new(Point3::from(decl.position), Color::new(r, g, b), decl.intensity));
        }
        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::vector;

    use super::*;

    fn sphere_at(z: f64) -> Sphere {
        Sphere::new(point![0.0, 0.0, z], 1.0, Material::matte(Color::WHITE))
    }

    #[test]
    fn nearest_hit_picks_the_closest_surface() {
        let scene = Scene::builder()
            .surface(sphere_at(10.0))
            .surface(sphere_at(5.0))
            .surface(sphere_at(-5.0))
            .build();
        let ray = Ray::new(point![0.0, 0.0, 0.0], vector![0.0, 0.0, 1.0]).unwrap();

        let hit = scene.nearest_hit(&ray).expect("two spheres ahead");
        assert_eq!(hit.surface, 1);
        assert_eq!(hit.t, 4.0);
    }

    #[test]
    fn ties_go_to_the_first_surface() {
        let scene = Scene::builder()
            .surface(sphere_at(5.0))
            .surface(sphere_at(5.0))
            .build();
        let ray = Ray::new(point![0.0, 0.0, 0.0], vector![0.0, 0.0, 1.0]).unwrap();
        assert_eq!(scene.nearest_hit(&ray).unwrap().surface, 0);
    }

    #[test]
    fn empty_scene_has_no_hit() {
        let scene = Scene::builder().build();
        let ray = Ray::new(point![0.0, 0.0, 0.0], vector![0.0, 0.0, 1.0]).unwrap();
        assert!(scene.nearest_hit(&ray).is_none());
    }

    #[test]
    fn occlusion_ignores_the_excluded_surface() {
        let scene = Scene::builder()
            .surface(sphere_at(5.0))
            .surface(sphere_at(-5.0))
            .build();
        let ray = Ray::new(point![0.0, 0.0, 0.0], vector![0.0, 0.0, 1.0]).unwrap();
        assert!(scene.occluded(&ray, 1));
        assert!(!scene.occluded(&ray, 0));
    }

    #[test]
    fn reference_scene_counts() {
        let scene = Scene::reference();
        assert_eq!(scene.surface_count(), 2);
        assert_eq!(scene.light_count(), 1);
        assert_eq!(scene.surface(0).material().reflection, 0.7);
    }

    #[test]
    fn loads_json_declarations() {
        let scene = Scene::from_json(r#"{
            "surfaces": [
                { "shape": "sphere", "center": [1, 2, 3], "radius": 4,
                  "material": { "diffuse": [0.5, 0.5, 0.5], "reflection": 0.25 } },
                { "shape": "plane", "point": [0, -10, 0], "normal": [0, 2, 0],
                  "material": { "diffuse": [1, 1, 1], "specular": [0.2, 0.2, 0.2], "shininess": 8 } }
            ],
            "lights": [ { "position": [0, 100, -100], "intensity": 0.5 } ]
        }"#).unwrap();

        assert_eq!(scene.surface_count(), 2);
        match scene.surface(0) {
            Surface::Sphere(sphere) => {
                assert_eq!(sphere.center, point![1.0, 2.0, 3.0]);
                assert_eq!(sphere.material.reflection, 0.25);
                assert_eq!(sphere.material.shininess, 1.0);
            }
            other => panic!("expected a sphere, got {:?}", other),
        }
        match scene.surface(1) {
            Surface::Plane(plane) => assert_eq!(plane.normal, vector![0.0, 1.0, 0.0]),
            other => panic!("expected a plane, got {:?}", other),
        }
        assert_eq!(scene.lights()[0].color, Color::WHITE);
    }

    #[test]
    fn rejects_degenerate_geometry() {
        let flat = Scene::from_json(r#"{
            "surfaces": [ { "shape": "plane", "point": [0, 0, 0], "normal": [0, 0, 0],
                            "material": { "diffuse": [1, 1, 1] } } ],
            "lights": []
        }"#);
        assert!(matches!(flat, Err(SceneError::DegenerateNormal { index: 0 })));

        let dot = Scene::from_json(r#"{
            "surfaces": [ { "shape": "sphere", "center": [0, 0, 0], "radius": 0,
                            "material": { "diffuse": [1, 1, 1] } } ],
            "lights": []
        }"#);
        assert!(matches!(dot, Err(SceneError::InvalidRadius { index: 0, .. })));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(Scene::from_json("{ \"surfaces\": 3 }"), Err(SceneError::Parse(_))));
    }
}
