//! This module is full of primitives that all impl Collider

mod sphere;

pub use sphere::*;

use crate::{
    material::Material,
    ray::{Intersection, Ray},
};
use glam::Vec3;
use std::fmt::Debug;

/// A shape rays can hit. Every collider owns exactly one material.
pub trait Collider: Send + Sync + Debug {
    fn position(&self) -> Vec3;

    /// Moves the collider. Only called by the host between frames.
    fn set_position(&mut self, position: Vec3);

    fn material(&self) -> &Material;

    fn bounding_radius(&self) -> f32;

    /// Distance along `dir` from `origin` to the surface, or `None` on a miss.
    /// Never negative.
    fn intersect(&self, origin: Vec3, dir: Vec3) -> Option<f32>;

    /// Outward unit normal at a point on the surface
    fn normal_at(&self, point: Vec3) -> Vec3;

    /// Carries `ray` through the collider, leaving it at the exit point
    /// heading in the twice refracted direction.
    fn refract_through(&self, ray: &mut Ray, intersection: &Intersection);
}
