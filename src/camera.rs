use glam::Vec3;
use serde::Deserialize;
use std::f32::consts::PI;

/// Maps output pixels to world-space rays.
pub trait Camera: Sync {
    /// World position of the eye
    fn position(&self) -> Vec3;

    fn near_plane(&self) -> f32;

    /// Ray through a pixel. The origin is the pixel's point on the plane
    /// `near` in front of the eye, the direction is unit length. Pixel
    /// `(0, 0)` is the bottom left corner.
    fn ray(&self, pixel_x: f32, pixel_y: f32, near: f32) -> (Vec3, Vec3);

    /// Ray through the center of a pixel on the camera's own near plane.
    fn pixel_ray(&self, x: u32, y: u32) -> (Vec3, Vec3) {
        self.ray(x as f32 + 0.5, y as f32 + 0.5, self.near_plane())
    }
}

/// A pinhole camera looking at a target.
#[derive(Clone, Debug)]
pub struct PerspectiveCamera {
    origin: Vec3,
    // Unit basis, w points backwards away from the target
    u: Vec3,
    v: Vec3,
    w: Vec3,
    half_width: f32,
    half_height: f32,
    width: u32,
    height: u32,
    near: f32,
}

impl PerspectiveCamera {
    pub fn new(
        origin: Vec3,
        target: Vec3,
        up: Vec3,
        vfov: f32,
        width: u32,
        height: u32,
        near: f32,
    ) -> Self {
        let aspect = width as f32 / height.max(1) as f32;
        let theta = vfov * PI / 180.0;
        let half_height = f32::tan(theta / 2.0);
        let half_width = aspect * half_height;
        let w = (origin - target).normalize_or_zero();
        let u = up.cross(w).normalize_or_zero();
        let v = w.cross(u);

        Self {
            origin,
            u,
            v,
            w,
            half_width,
            half_height,
            width,
            height,
            near,
        }
    }
}

impl Camera for PerspectiveCamera {
    fn position(&self) -> Vec3 {
        self.origin
    }

    fn near_plane(&self) -> f32 {
        self.near
    }

    fn ray(&self, pixel_x: f32, pixel_y: f32, near: f32) -> (Vec3, Vec3) {
        let s = 2.0 * pixel_x / self.width.max(1) as f32 - 1.0;
        let t = 2.0 * pixel_y / self.height.max(1) as f32 - 1.0;

        // Only the origin depends on `near`
        let toward = s * self.half_width * self.u + t * self.half_height * self.v - self.w;
        let point = self.origin + near * toward;

        (point, toward.normalize_or_zero())
    }
}

/// Camera placement as written in a config file. The resolution comes from
/// the render config.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CameraDescription {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees
    pub fov: f32,
    pub near: f32,
}

impl Default for CameraDescription {
    fn default() -> Self {
        Self {
            position: Vec3::new(5.0, 30.0, 35.0),
            target: Vec3::new(5.0, 5.0, 5.0),
            up: Vec3::Y,
            fov: 45.0,
            near: 0.3,
        }
    }
}

impl CameraDescription {
    pub fn build(&self, width: u32, height: u32) -> PerspectiveCamera {
        PerspectiveCamera::new(
            self.position,
            self.target,
            self.up,
            self.fov,
            width,
            height,
            self.near,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> PerspectiveCamera {
        PerspectiveCamera::new(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::Y, 90.0, 100, 100, 1.0)
    }

    #[test]
    fn center_ray_looks_at_target() {
        let cam = camera();
        let (origin, dir) = cam.ray(50.0, 50.0, cam.near_plane());

        assert!((dir - -Vec3::Z).length() < 1e-5);
        assert!((origin - Vec3::new(0.0, 0.0, 9.0)).length() < 1e-5);
        assert_eq!(cam.position(), Vec3::new(0.0, 0.0, 10.0));
    }

    #[test]
    fn directions_are_unit_length() {
        let cam = camera();

        for &(x, y) in &[(0, 0), (99, 0), (0, 99), (17, 63)] {
            let (_, dir) = cam.pixel_ray(x, y);
            assert!((dir.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn bottom_row_points_down() {
        let cam = camera();

        let (_, bottom) = cam.pixel_ray(50, 0);
        let (_, top) = cam.pixel_ray(50, 99);
        assert!(bottom.y < 0.0);
        assert!(top.y > 0.0);
    }

    #[test]
    fn origin_lies_on_near_plane() {
        let cam = camera();
        let (origin, _) = cam.ray(0.0, 0.0, 2.0);

        assert!((origin.z - 8.0).abs() < 1e-5);
        // 90 degree fov spans +-near at the edges
        assert!((origin.x - -2.0).abs() < 1e-5);
        assert!((origin.y - -2.0).abs() < 1e-5);
    }

    #[test]
    fn direction_ignores_near_plane() {
        let cam = |near| PerspectiveCamera::new(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::Y, 40.0, 8, 8, near);
        let (_, expected) = cam(0.3).pixel_ray(4, 4);

        for &near in &[0.0, -0.3, 5.0] {
            let (origin, dir) = cam(near).pixel_ray(4, 4);

            assert!((dir - expected).length() < 1e-6, "near {}: {:?}", near, dir);
            assert!((dir.length() - 1.0).abs() < 1e-5);
            assert!(dir.z < 0.0);
            assert!(origin.is_finite());
        }

        let (origin, _) = cam(0.0).pixel_ray(4, 4);
        assert_eq!(origin, Vec3::new(0.0, 0.0, 10.0));
    }
}
