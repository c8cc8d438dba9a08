//! The per-pixel bounce loop and the direct lighting model.
//!
//! Light is accumulated with `Color::combine` (the brightest channel wins),
//! never summed.

use crate::{
    camera::Camera,
    color::Color,
    frame::FrameBuffer,
    math::{normalize_with_magnitude, reflect},
    ray::{Intersection, Ray},
    scene::{Candidates, Scene},
    settings::QualitySettings,
};
use glam::Vec3;
use log::{debug, trace};
use rayon::prelude::*;
use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Instant,
};

/// A ray with this little energy left stops bouncing.
pub const MIN_ENERGY: f32 = 0.005;

/// Why a cast stopped bouncing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    /// Escaped the scene
    Sky,
    /// Hit an emissive collider
    Light,
    /// Used up its bounces
    Depth,
    /// Ran out of energy
    Energy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraceOutcome {
    pub termination: Termination,
    /// Times the loop queried the scene, at most `num_bounces + 1`
    pub iterations: u32,
    /// Rays cast including shadow rays
    pub casts: u64,
}

/// Renders frames, reusing one ray per pixel between them.
#[derive(Debug, Default)]
pub struct Tracer {
    rays: Vec<Ray>,
}

impl Tracer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Traces every pixel of `frame` and applies it.
    ///
    /// Rows are traced in parallel. Each task owns one row of the frame and
    /// the matching slice of the ray arena, the scene is only read.
    pub fn render(
        &mut self,
        frame: &mut FrameBuffer,
        scene: &Scene,
        camera: &dyn Camera,
        settings: &QualitySettings,
    ) {
        let width = frame.width() as usize;
        let height = frame.height();
        let pixel_count = width * height as usize;

        if width == 0 || height == 0 {
            frame.apply();
            return;
        }

        if self.rays.len() != pixel_count {
            trace!("Resizing ray arena from {} to {} slots", self.rays.len(), pixel_count);
            self.rays.resize(pixel_count, Ray::default());
        }

        let global_ray_count = AtomicU64::new(0);
        let start = Instant::now();

        frame
            .pixels_mut()
            .par_chunks_mut(width)
            .zip(self.rays.par_chunks_mut(width))
            .enumerate()
            .for_each(|(y, (row, rays))| {
                let screen_row = y as f32 / height as f32;
                let mut ray_count = 0;

                for (x, (pixel, ray)) in row.iter_mut().zip(rays.iter_mut()).enumerate() {
                    let (origin, direction) = camera.pixel_ray(x as u32, y as u32);
                    ray.reset(origin, direction);

                    ray_count += trace_ray(ray, screen_row, scene, settings).casts;
                    *pixel = ray.color.opaque();
                }

                global_ray_count.fetch_add(ray_count, Ordering::Relaxed);
            });

        frame.apply();

        let duration = start.elapsed();
        let rays = global_ray_count.load(Ordering::Relaxed) as f64 / 1_000_000.0;
        debug!(
            "Frame {} ({}x{}) in {:.2?}, {:.2}M rays, {:.2}M rays per second",
            frame.presented(),
            width,
            height,
            duration,
            rays,
            rays / duration.as_secs_f64().max(f64::EPSILON)
        );
    }
}

/// Background color for a ray that escaped, `screen_row` is 0 at the bottom
/// of the frame and 1 at the top.
pub fn sky_gradient(settings: &QualitySettings, screen_row: f32) -> Color {
    settings
        .sky_dark_color
        .lerp(settings.sky_color, screen_row.clamp(0.0, 1.0))
}

/// Runs the bounce loop for one freshly reset ray, leaving the result in
/// `ray.color`.
pub fn trace_ray(
    ray: &mut Ray,
    screen_row: f32,
    scene: &Scene,
    settings: &QualitySettings,
) -> TraceOutcome {
    let mut depth = 0;
    let mut previous = None;
    let mut casts = 0;

    let termination = loop {
        casts += 1;

        let hit = match scene.nearest_intersection(ray.origin, ray.direction, Candidates::All, previous) {
            Some(hit) => hit,
            None => {
                let sky = sky_gradient(settings, screen_row);
                ray.color = ray.color.combine(sky.scale(ray.energy));
                break Termination::Sky;
            }
        };

        let material = hit.collider.material();

        // Emitters are light sources, not shaded surfaces
        if material.is_emitter() {
            let glow = material.color.scale((ray.energy * material.emissive).min(1.0));
            ray.color = ray.color.combine(glow);
            break Termination::Light;
        }

        let surface = shade(ray, &hit, scene, settings, &mut casts);
        ray.color = ray.color.combine(surface.scale(ray.energy));
        ray.energy -= settings.energy_lost_per_unit * hit.distance;

        if depth >= settings.num_bounces {
            break Termination::Depth;
        }

        if material.is_opaque() {
            ray.origin = hit.position;
            ray.direction = reflect(ray.direction, hit.normal);
            ray.energy -= settings.energy_lost_per_roughness_on_reflect * material.roughness;
        } else {
            hit.collider.refract_through(ray, &hit);
            if settings.renormalize_refraction {
                ray.direction = normalize_with_magnitude(ray.direction).0;
            }
        }

        if ray.energy <= MIN_ENERGY {
            break Termination::Energy;
        }

        depth += 1;
        previous = Some(hit.id);
    };

    TraceOutcome {
        termination,
        iterations: depth + 1,
        casts,
    }
}

/// How much of a light reaches a point.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Transmission {
    Clear,
    /// Filtered by translucent colliders. Alpha is the fraction that
    /// passes untouched.
    Tinted(Color),
    Blocked,
}

/// Shadow test from `point` towards a light `distance` away. Lights never
/// occlude.
fn transmission(scene: &Scene, point: Vec3, dir: Vec3, distance: f32) -> Transmission {
    match scene.nearest_intersection(point, dir, Candidates::Surfaces, None) {
        Some(nearest) if nearest.distance < distance => {}
        _ => return Transmission::Clear,
    }

    let mut tint = Color::BLACK;
    let mut tinted = false;

    for occluder in scene.surfaces() {
        match occluder.intersect(point, dir) {
            Some(d) if d < distance => {}
            _ => continue,
        }

        let material = occluder.material();
        if material.is_opaque() {
            return Transmission::Blocked;
        }

        let remaining = (tint.a - material.opacity).max(0.0);
        tint = tint
            .combine(material.color.scale(material.opacity))
            .with_alpha(remaining);
        tinted = true;
    }

    if tinted {
        Transmission::Tinted(tint)
    } else {
        Transmission::Clear
    }
}

/// Direct lighting at a hit point. The result is opaque and not yet scaled
/// by the ray's energy.
pub fn shade(
    ray: &Ray,
    hit: &Intersection,
    scene: &Scene,
    settings: &QualitySettings,
    casts: &mut u64,
) -> Color {
    let material = hit.collider.material();
    let translucent = !material.is_opaque();
    let smoothness = 1.0 - material.roughness;
    let exponent = (64.0 * smoothness).max(1.0);
    let specular_strength = smoothness * (material.opacity * 2.0).min(1.0);

    let mut diffuse = Color::BLACK;
    let mut specular = Color::BLACK;

    for light in scene.lights() {
        let (light_dir, light_distance) = normalize_with_magnitude(light.position() - hit.position);
        let facing = light_dir.dot(hit.normal);

        if facing < 0.0 {
            continue;
        }

        *casts += 1;
        let emitted = light.material().color;
        let light_color = match transmission(scene, hit.position, light_dir, light_distance) {
            Transmission::Blocked => continue,
            Transmission::Clear => emitted,
            Transmission::Tinted(tint) => (emitted * tint.opaque()).combine(emitted.scale(tint.a)),
        };

        diffuse = diffuse.combine(light_color.scale(facing.max(0.0) * material.opacity));

        if translucent {
            let view = ray.direction.dot(reflect(light_dir, hit.normal));
            if view > 0.0 {
                let amount = view.powf(exponent).max(0.0) * specular_strength;
                specular = specular.combine(light_color.scale(amount));
            }
        }
    }

    let diffuse = diffuse.combine(settings.ambient_light);
    let surface = material.albedo_at(hit.position) * diffuse;

    if translucent {
        (surface + specular).opaque()
    } else {
        surface.opaque()
    }
}
