use nalgebra::{Point3, Vector3};

use crate::material::Material;
use crate::ray::{unit, Ray, HIT_EPSILON};

/// Rays closer to parallel than this never hit a plane.
const PARALLEL_EPSILON: f64 = 1e-9;

#[derive(Clone, Debug)]
pub struct Sphere {
    pub center: Point3<f64>,
    pub radius: f64,
    pub material: Material,
}

impl Sphere {
    pub fn new(center: Point3<f64>, radius: f64, material: Material) -> Self {
        Sphere { center, radius, material }
    }

    /// Nearest root past [`HIT_EPSILON`] of `|origin + t * direction - center|² = radius²`.
    pub fn intersect(&self, ray: &Ray) -> Option<f64> {
        let oc = ray.origin - self.center;
        let a = ray.direction.magnitude_squared();
        let half_b = oc.dot(&ray.direction);
        let c = oc.magnitude_squared() - self.radius * self.radius;

        let discriminant = half_b * half_b - a * c;
        if discriminant < 0.0 {
            return None;
        }
        let sqrtd = discriminant.sqrt();

        // the smaller root first, the far one only when the origin is inside.
        let near = (-half_b - sqrtd) / a;
        if near > HIT_EPSILON {
            return Some(near);
        }
        let far = (-half_b + sqrtd) / a;
        (far > HIT_EPSILON).then_some(far)
    }

    pub fn normal_at(&self, point: &Point3<f64>) -> Option<Vector3<f64>> {
        unit(&(point - self.center))
    }
}

/// Infinite plane through `point` with a unit `normal`.
#[derive(Clone, Debug)]
pub struct Plane {
    pub point: Point3<f64>,
    pub normal: Vector3<f64>,
    pub material: Material,
}

impl Plane {
    /// Normalizes `normal`; a zero-length normal does not describe a plane.
    pub fn new(point: Point3<f64>, normal: Vector3<f64>, material: Material) -> Option<Self> {
        unit(&normal).map(|normal| Plane { point, normal, material })
    }

    /// Solves `(origin + t * direction - point) · normal = 0` for `t` past [`HIT_EPSILON`].
    pub fn intersect(&self, ray: &Ray) -> Option<f64> {
        let denom = ray.direction.dot(&self.normal);
        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }
        let t = (self.point - ray.origin).dot(&self.normal) / denom;
        (t > HIT_EPSILON).then_some(t)
    }
}

/// Every kind of geometry a scene can hold.
#[derive(Clone, Debug)]
pub enum Surface {
    Sphere(Sphere),
    Plane(Plane),
}

impl Surface {
    pub fn intersect(&self, ray: &Ray) -> Option<f64> {
        match self {
            Surface::Sphere(sphere) => sphere.intersect(ray),
            Surface::Plane(plane) => plane.intersect(ray),
        }
    }

    /// Unit shading normal at a point on the surface.
    pub fn normal_at(&self, point: &Point3<f64>) -> Option<Vector3<f64>> {
        match self {
            Surface::Sphere(sphere) => sphere.normal_at(point),
            Surface::Plane(plane) => Some(plane.normal),
        }
    }

    pub fn material(&self) -> &Material {
        match self {
            Surface::Sphere(sphere) => &sphere.material,
            Surface::Plane(plane) => &plane.material,
        }
    }
}

impl From<Sphere> for Surface {
    fn from(sphere: Sphere) -> Self {
        Surface::Sphere(sphere)
    }
}

impl From<Plane> for Surface {
    fn from(plane: Plane) -> Self {
        Surface::Plane(plane)
    }
}
