//! Whitted-style ray tracer: orthographic primary rays, Lambert and Blinn-Phong shading
//! under point lights, hard shadows and depth-bounded mirror reflection.

pub mod error;
pub mod filter;
pub mod light;
pub mod material;
pub mod object;
pub mod picture;
pub mod ray;
pub mod render;
pub mod scene;
pub mod shade;

pub use error::{ConfigError, SceneError};
pub use filter::box_blur;
pub use light::Light;
pub use material::Material;
pub use object::{Plane, Sphere, Surface};
pub use picture::{Color, Picture, RGBA8};
pub use ray::{Hit, Ray};
pub use render::{render, render_with_stats, RenderConfig, RenderStats};
pub use scene::Scene;
