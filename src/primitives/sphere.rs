use crate::{
    material::Material,
    math::{closest_point_on_segment, normalize_with_magnitude, refract},
    primitives::Collider,
    ray::{Intersection, Ray},
};
use glam::Vec3;

/// Pulls hits back off the surface so bounce and shadow rays don't
/// immediately hit the surface they start on.
pub const SURFACE_BIAS: f32 = 0.001;

/// Refraction index of the medium between colliders
const AIR_INDEX: f32 = 1.0;

#[derive(Clone, Debug)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
    radius_squared: f32,
    material: Material,
}

impl Sphere {
    /// The radius is expected to be positive, it is not checked here.
    pub fn new(center: Vec3, radius: f32, material: Material) -> Self {
        Self {
            center,
            radius,
            radius_squared: radius * radius,
            material,
        }
    }
}

impl Collider for Sphere {
    fn position(&self) -> Vec3 {
        self.center
    }

    fn set_position(&mut self, position: Vec3) {
        self.center = position;
    }

    fn material(&self) -> &Material {
        &self.material
    }

    fn bounding_radius(&self) -> f32 {
        self.radius
    }

    fn intersect(&self, origin: Vec3, dir: Vec3) -> Option<f32> {
        let diff = self.center - origin;
        let b = diff.dot(dir);

        // The center is behind the ray
        if b < 0.0 {
            return None;
        }

        let c = diff.length_squared() - self.radius_squared;
        let discriminant = b * b - c;

        if discriminant < 0.0 {
            return None;
        }

        // Negative means the origin is inside the sphere
        let hit = b - discriminant.sqrt() - SURFACE_BIAS;
        Some(hit.max(0.0))
    }

    fn normal_at(&self, point: Vec3) -> Vec3 {
        normalize_with_magnitude(point - self.center).0
    }

    fn refract_through(&self, ray: &mut Ray, intersection: &Intersection) {
        let index = self.material.refraction_index;
        let entry = intersection.position;
        let bent = refract(ray.direction, AIR_INDEX, index, intersection.normal);

        // The exit is approximated by mirroring the point of the probe
        // segment closest to the center about the entry point
        let probe_end = entry + 2.0 * self.radius * bent;
        let halfway = closest_point_on_segment(entry, probe_end, self.center);
        let exit = entry + 2.0 * (halfway - entry);
        let (exit_normal, _) = normalize_with_magnitude(exit - self.center);

        ray.origin = exit;
        ray.direction = refract(bent, index, AIR_INDEX, exit_normal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{color::Color, ray::ColliderId};

    fn sphere(center: Vec3, radius: f32) -> Sphere {
        Sphere::new(center, radius, Material::opaque(Color::WHITE))
    }

    #[test]
    fn hit_along_axis() {
        let s = sphere(Vec3::ZERO, 2.0);

        let t = s.intersect(Vec3::new(0.0, 0.0, 10.0), -Vec3::Z).unwrap();
        assert!((t - 8.0).abs() <= 2.0 * SURFACE_BIAS);
        assert!(t < 8.0);
    }

    #[test]
    fn miss_when_pointing_away() {
        let s = sphere(Vec3::ZERO, 2.0);

        assert_eq!(s.intersect(Vec3::new(0.0, 0.0, 10.0), Vec3::Z), None);
        assert_eq!(s.intersect(Vec3::new(5.0, 5.0, 5.0), Vec3::new(1.0, 1.0, 1.0).normalize()), None);
    }

    #[test]
    fn miss_when_passing_by() {
        let s = sphere(Vec3::ZERO, 1.0);
        assert_eq!(s.intersect(Vec3::new(0.0, 3.0, 10.0), -Vec3::Z), None);
    }

    #[test]
    fn inside_hit_is_clamped_to_zero() {
        let s = sphere(Vec3::ZERO, 5.0);

        assert_eq!(s.intersect(Vec3::new(0.0, 1.0, 0.0), -Vec3::Y), Some(0.0));
        assert_eq!(s.intersect(Vec3::new(0.0, 0.0, -1.0), Vec3::Z), Some(0.0));
    }

    #[test]
    fn normal_points_outward() {
        let s = sphere(Vec3::new(1.0, 1.0, 1.0), 3.0);
        let n = s.normal_at(Vec3::new(1.0, 4.0, 1.0));

        assert!((n - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn bounding_radius_is_the_radius() {
        let s = sphere(Vec3::ZERO, 3.0);

        assert_eq!(s.bounding_radius(), 3.0);
        let t = s.intersect(Vec3::new(0.0, 0.0, 10.0), -Vec3::Z).unwrap();
        assert!((t - 7.0).abs() <= 2.0 * SURFACE_BIAS);
    }

    #[test]
    fn head_on_refraction_passes_straight_through() {
        let s = Sphere::new(Vec3::ZERO, 1.0, Material::translucent(Color::WHITE, 0.5, 1.5));
        let mut ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z);
        let intersection = Intersection {
            position: Vec3::new(0.0, 0.0, 1.0),
            normal: Vec3::Z,
            distance: 4.0,
            collider: &s,
            id: ColliderId(0),
        };

        s.refract_through(&mut ray, &intersection);

        assert!((ray.origin - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
        assert_eq!(ray.direction.x, 0.0);
        assert_eq!(ray.direction.y, 0.0);
        assert!(ray.direction.z < 0.0);
    }

    #[test]
    fn oblique_refraction_exits_on_far_side() {
        let s = Sphere::new(Vec3::ZERO, 1.0, Material::translucent(Color::WHITE, 0.5, 1.5));
        let entry = Vec3::new(0.0, 0.5, 0.75f32.sqrt());
        let mut ray = Ray::new(entry + Vec3::Z * 4.0, -Vec3::Z);
        let intersection = Intersection {
            position: entry,
            normal: s.normal_at(entry),
            distance: 4.0,
            collider: &s,
            id: ColliderId(0),
        };

        s.refract_through(&mut ray, &intersection);

        assert!(ray.origin.z < 0.0);
        assert!((ray.origin.length() - 1.0).abs() < 0.05);
        assert!(ray.direction.z < 0.0);
    }
}
