use std::time::Instant;

use log::{debug, info, trace};
use nalgebra::{point, vector, Vector3};

use crate::error::ConfigError;
use crate::picture::{Color, Picture};
use crate::ray::{reflect, Ray};
use crate::scene::Scene;
use crate::shade::shade;

pub const SCREEN_WIDTH: u32 = 800;
pub const SCREEN_HEIGHT: u32 = 600;
pub const MAX_DEPTH: u32 = 1;
/// Depth of the plane primary rays start from.
pub const EYE_Z: f64 = -1000.0;

/// Settings for one frame. Primary rays are orthographic: one per pixel, all sharing
/// `view_direction`, starting at `(x, y, eye_z)`.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    /// Mirror bounces allowed after the primary hit.
    pub max_depth: u32,
    pub eye_z: f64,
    pub view_direction: Vector3<f64>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            width: SCREEN_WIDTH,
            height: SCREEN_HEIGHT,
            max_depth: MAX_DEPTH,
            eye_z: EYE_Z,
            view_direction: vector![0.0, 0.0, 1.0],
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyImage { width: self.width, height: self.height });
        }
        if self.view_direction.magnitude_squared() == 0.0 {
            return Err(ConfigError::ZeroViewDirection);
        }
        Ok(())
    }

    pub fn primary_ray(&self, x: u32, y: u32) -> Option<Ray> {
        Ray::new(point![x as f64, y as f64, self.eye_z], self.view_direction)
    }
}

/// A light path in flight: the ray to follow next and what it has gathered so far.
#[derive(Clone, Debug, PartialEq)]
pub struct PathState {
    pub ray: Ray,
    /// Output pixel the path writes to, fixed for the whole path.
    pub pixel: (u32, u32),
    pub color: Color,
    /// Remaining energy, scaled down by every reflection.
    pub intensity: f64,
}

impl PathState {
    pub fn new(ray: Ray, pixel: (u32, u32)) -> Self {
        PathState {
            ray,
            pixel,
            color: Color::BLACK,
            intensity: 1.0,
        }
    }
}

/// Outcome of following a path for one segment.
#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    /// The path ends here with nothing added: no surface ahead, or the hit point has no
    /// usable normal.
    Escaped,
    /// A surface was shaded. The new state starts at the hit point along the mirror
    /// direction.
    Bounced(PathState),
}

/// Follows `state` to its nearest hit, reflects it and gathers the light found there.
pub fn step(scene: &Scene, state: &PathState) -> Step {
    let Some(hit) = scene.nearest_hit(&state.ray) else {
        return Step::Escaped;
    };
    let point = state.ray.at(hit.t);
    let Some(normal) = scene.surface(hit.surface).normal_at(&point) else {
        return Step::Escaped;
    };
    let Some(reflected) = Ray::new(point, reflect(&state.ray.direction, &normal)) else {
        return Step::Escaped;
    };

    let shading = shade(scene, hit.surface, &point, &normal, &state.ray.direction, state.intensity);
    Step::Bounced(PathState {
        ray: reflected,
        pixel: state.pixel,
        color: state.color + shading.color,
        intensity: shading.intensity,
    })
}

/// Final color of a path and the pixel it belongs to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Traced {
    pub pixel: (u32, u32),
    pub color: Color,
    /// Shading passes performed, zero for a path that hit nothing.
    pub passes: u32,
}

/// Traces a path until it escapes, runs out of intensity or has bounced `max_depth` times.
/// Each bounce is one turn of the loop, so stack use does not grow with `max_depth`.
pub fn trace(scene: &Scene, mut state: PathState, max_depth: u32) -> Traced {
    let mut passes = 0;
    loop {
        match step(scene, &state) {
            Step::Escaped => break,
            Step::Bounced(next) => {
                let depth = passes;
                passes += 1;
                state = next;
                if depth >= max_depth || state.intensity == 0.0 {
                    break;
                }
            }
        }
    }

    Traced {
        pixel: state.pixel,
        color: state.color.clamped(),
        passes,
    }
}

/// Counters collected while rendering a frame.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderStats {
    /// Pixels whose primary ray struck a surface.
    pub hits: u64,
    /// Longest chain of shading passes seen for a single pixel.
    pub deepest: u32,
}

impl RenderStats {
    fn record(&mut self, traced: &Traced) {
        if traced.passes > 0 {
            self.hits += 1;
        }
        self.deepest = self.deepest.max(traced.passes);
    }
}

/// Produces the color of a single pixel.
pub fn render_pixel(scene: &Scene, config: &RenderConfig, x: u32, y: u32) -> Traced {
    match config.primary_ray(x, y) {
        Some(ray) => trace(scene, PathState::new(ray, (x, y)), config.max_depth),
        None => Traced { pixel: (x, y), color: Color::BLACK, passes: 0 },
    }
}

/// Renders the whole frame, row by row.
pub fn render(scene: &Scene, config: &RenderConfig) -> Picture<Color> {
    render_with_stats(scene, config).0
}

pub fn render_with_stats(scene: &Scene, config: &RenderConfig) -> (Picture<Color>, RenderStats) {
    let mut picture = Picture::new(config.width, config.height);
    let mut stats = RenderStats::default();

    info!(target: "app", "Starting frame render: {}x{}, max depth {}, {} surfaces, {} lights",
        config.width, config.height, config.max_depth, scene.surface_count(), scene.light_count());
    let start = Instant::now();

    for y in 0..config.height {
        trace!(target: "app", "Rendering row {}", y);
        for x in 0..config.width {
            let traced = render_pixel(scene, config, x, y);
            stats.record(&traced);
            let (px, py) = traced.pixel;
            *picture.pixel_mut(px, py) = traced.color;
        }
    }

    let elapsed = start.elapsed();
    info!(target: "app", "Finished rendering. Took {:?}", elapsed);
    debug!(target: "app", "{} primary hits, deepest path {} passes", stats.hits, stats.deepest);

    (picture, stats)
}

#[cfg(test)]
mod tests {
    use nalgebra::Point3;

    use super::*;
    use crate::light::Light;
    use crate::material::Material;
    use crate::object::{Plane, Sphere};

    fn ray(origin: Point3<f64>, direction: Vector3<f64>) -> PathState {
        PathState::new(Ray::new(origin, direction).unwrap(), (3, 4))
    }

    /// Two parallel perfect mirrors facing each other across z = -50.
    fn mirror_corridor() -> Scene {
        let mirror = Material::new(Color::BLACK, Color::BLACK, 1.0, 1.0);
        Scene::builder()
            .surface(Plane::new(point![0.0, 0.0, 0.0], vector![0.0, 0.0, -1.0], mirror.clone()).unwrap())
            .surface(Plane::new(point![0.0, 0.0, -100.0], vector![0.0, 0.0, 1.0], mirror).unwrap())
            .build()
    }

    #[test]
    fn escaping_ray_keeps_its_initial_color() {
        let scene = Scene::reference();
        let traced = trace(&scene, ray(point![0.0, 0.0, -1000.0], vector![0.0, 0.0, 1.0]), 5);
        assert_eq!(traced, Traced { pixel: (3, 4), color: Color::BLACK, passes: 0 });
    }

    #[test]
    fn zero_reflection_stops_after_one_pass() {
        let dull = Material::new(Color::new(0.5, 0.5, 0.5), Color::BLACK, 0.0, 1.0);
        let mirror = Material::new(Color::BLACK, Color::BLACK, 1.0, 1.0);
        // the mirror sits right where the reflected ray goes
        let scene = Scene::builder()
            .surface(Sphere::new(point![0.0, 0.0, 0.0], 1.0, dull))
            .surface(Sphere::new(point![0.0, 0.0, -100.0], 10.0, mirror))
            .light(Light::white(point![0.0, 20.0, -10.0], 1.0))
            .build();

        for max_depth in [0, 1, 10, 100] {
            let traced = trace(&scene, ray(point![0.0, 0.0, -50.0], vector![0.0, 0.0, 1.0]), max_depth);
            assert_eq!(traced.passes, 1);
            assert!(traced.color.r > 0.0);
            assert_eq!(traced.color.r, traced.color.b);
        }
    }

    #[test]
    fn depth_caps_a_perfect_mirror() {
        let scene = mirror_corridor();
        for max_depth in [0, 1, 4] {
            let traced = trace(&scene, ray(point![0.0, 0.0, -50.0], vector![0.0, 0.0, 1.0]), max_depth);
            assert_eq!(traced.passes, max_depth + 1);
        }
    }

    #[test]
    fn very_deep_mirror_corridor_does_not_grow_the_stack() {
        let scene = mirror_corridor();
        let config = RenderConfig { width: 1, height: 1, max_depth: 1_000_000, eye_z: -50.0, ..RenderConfig::default() };
        assert!(config.validate().is_ok());

        let traced = render_pixel(&scene, &config, 0, 0);
        assert_eq!(traced.passes, 1_000_001);
        assert_eq!(traced.color, Color::BLACK);
    }

    #[test]
    fn step_reflects_and_scales_intensity() {
        let half = Material::new(Color::WHITE, Color::BLACK, 0.5, 1.0);
        let scene = Scene::builder()
            .surface(Plane::new(point![0.0, 0.0, 0.0], vector![0.0, 0.0, -1.0], half).unwrap())
            .build();

        let Step::Bounced(next) = step(&scene, &ray(point![0.0, 0.0, -50.0], vector![0.0, 0.0, 1.0])) else {
            panic!("the plane is straight ahead");
        };
        assert_eq!(next.ray.origin, point![0.0, 0.0, 0.0]);
        assert_eq!(next.ray.direction, vector![0.0, 0.0, -1.0]);
        assert_eq!(next.intensity, 0.5);
        assert_eq!(next.pixel, (3, 4));
        // no lights, so nothing gathered
        assert_eq!(next.color, Color::BLACK);
    }

    #[test]
    fn terminal_color_is_clamped() {
        let white = Material::new(Color::WHITE, Color::BLACK, 0.0, 1.0);
        let scene = Scene::builder()
            .surface(Sphere::new(point![0.0, 0.0, 0.0], 1.0, white))
            .light(Light::new(point![0.0, 0.0, -10.0], Color::new(5.0, 0.75, 1.0), 1.0))
            .build();

        let traced = trace(&scene, ray(point![0.0, 0.0, -50.0], vector![0.0, 0.0, 1.0]), 1);
        assert_eq!(traced.color, Color::new(1.0, 0.75, 1.0));
    }

    #[test]
    fn empty_scene_renders_black() {
        let config = RenderConfig { width: 16, height: 8, ..RenderConfig::default() };
        let (picture, stats) = render_with_stats(&Scene::builder().build(), &config);
        assert_eq!(picture, Picture::new(16, 8));
        assert_eq!(stats, RenderStats::default());
    }

    #[test]
    fn zero_view_direction_leaves_pixels_black() {
        let config = RenderConfig {
            width: 4,
            height: 4,
            view_direction: Vector3::zeros(),
            ..RenderConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroViewDirection));
        assert_eq!(render(&Scene::reference(), &config), Picture::new(4, 4));
    }

    #[test]
    fn config_rejects_empty_images() {
        let config = RenderConfig { width: 0, ..RenderConfig::default() };
        assert_eq!(config.validate(), Err(ConfigError::EmptyImage { width: 0, height: SCREEN_HEIGHT }));
        assert!(RenderConfig::default().validate().is_ok());
    }
}
