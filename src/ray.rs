use nalgebra::{Point3, Vector3};

/// Shortest vector length that can still be turned into a direction.
const MIN_NORM: f64 = f64::EPSILON;

/// Hits closer than this are rounding noise from a ray leaving the surface it starts on.
pub const HIT_EPSILON: f64 = 1e-6;

/// Normalizes `v`, or returns `None` when it is too short to carry a direction.
pub fn unit(v: &Vector3<f64>) -> Option<Vector3<f64>> {
    v.try_normalize(MIN_NORM)
}

/// Mirror reflection of `v` about the unit normal `n`.
pub fn reflect(v: &Vector3<f64>, n: &Vector3<f64>) -> Vector3<f64> {
    v - 2.0 * v.dot(n) * n
}

/// Half-line `origin + t * direction`. Constructed through [`Ray::new`] the direction is
/// always unit length.
#[derive(Clone, Debug, PartialEq)]
pub struct Ray {
    pub origin: Point3<f64>,
    pub direction: Vector3<f64>,
}

impl Ray {
    /// Builds a ray with a normalized direction, `None` for a zero-length direction.
    pub fn new(origin: Point3<f64>, direction: Vector3<f64>) -> Option<Self> {
        unit(&direction).map(|direction| Self { origin, direction })
    }

    pub fn at(&self, t: f64) -> Point3<f64> {
        self.origin + self.direction * t
    }
}

/// A surface of the scene, by index, struck at distance `t` along a ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    pub surface: usize,
    pub t: f64,
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;
    use nalgebra::{point, vector};

    use super::*;

    #[test]
    fn new_normalizes_direction() {
        let ray = Ray::new(point![1.0, 2.0, 3.0], vector![0.0, 0.0, 5.0]).unwrap();
        assert_eq!(ray.direction, vector![0.0, 0.0, 1.0]);
        assert_eq!(ray.at(2.0), point![1.0, 2.0, 5.0]);
    }

    #[test]
    fn zero_direction_is_rejected() {
        assert!(Ray::new(point![0.0, 0.0, 0.0], Vector3::zeros()).is_none());
        assert!(unit(&Vector3::zeros()).is_none());
    }

    #[test]
    fn reflect_flips_normal_component() {
        let d = vector![1.0, -1.0, 0.0].normalize();
        let r = reflect(&d, &vector![0.0, 1.0, 0.0]);
        assert!(approx_eq!(f64, r.x, d.x, ulps = 2));
        assert!(approx_eq!(f64, r.y, -d.y, ulps = 2));
        assert!(approx_eq!(f64, r.norm(), 1.0, epsilon = 1e-12));
    }
}
