use crate::{color::Color, primitives::Collider};
use glam::Vec3;

/// Per-pixel trajectory state, carried through every bounce of a cast.
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length, except right after an unnormalized refraction
    pub direction: Vec3,
    /// Light gathered so far
    pub color: Color,
    /// Remaining light carrying capacity, starts at 1
    pub energy: f32,
}

impl Default for Ray {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::Z)
    }
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction,
            color: Color::BLACK,
            energy: 1.0,
        }
    }

    /// Starts a fresh cast from a camera ray, reusing this slot.
    pub fn reset(&mut self, origin: Vec3, direction: Vec3) {
        *self = Self::new(origin, direction);
    }
}

/// Index of a collider in the concatenated surfaces-then-lights sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ColliderId(pub usize);

/// The nearest hit of a ray, valid for one bounce.
#[derive(Clone, Copy, Debug)]
pub struct Intersection<'a> {
    pub position: Vec3,
    pub normal: Vec3,
    pub distance: f32,
    pub collider: &'a dyn Collider,
    pub id: ColliderId,
}
