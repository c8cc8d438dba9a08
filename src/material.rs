use crate::color::Color;
use glam::Vec3;
use serde::Deserialize;

/// World-space period of the checker pattern. Each half of the period is one cell.
const CHECKER_PERIOD: i64 = 6;

/// Surface appearance of a single collider.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Material {
    pub color: Color,
    /// 0 is a mirror, 1 is fully rough
    pub roughness: f32,
    /// Values below 1 make the surface refract instead of reflect
    pub opacity: f32,
    /// Only meaningful when `opacity < 1`
    pub refraction_index: f32,
    /// Anything above 0 turns the surface into a light source
    pub emissive: f32,
    pub checkered: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            roughness: 0.0,
            opacity: 1.0,
            refraction_index: 1.0,
            emissive: 0.0,
            checkered: false,
        }
    }
}

impl Material {
    pub fn opaque(color: Color) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }

    pub fn light(color: Color, emissive: f32) -> Self {
        Self {
            color,
            emissive,
            ..Self::default()
        }
    }

    pub fn translucent(color: Color, opacity: f32, refraction_index: f32) -> Self {
        Self {
            color,
            opacity,
            refraction_index,
            ..Self::default()
        }
    }

    pub fn with_roughness(self, roughness: f32) -> Self {
        Self { roughness, ..self }
    }

    pub fn with_checkers(self) -> Self {
        Self {
            checkered: true,
            ..self
        }
    }

    pub fn is_opaque(&self) -> bool {
        self.opacity >= 1.0
    }

    pub fn is_emitter(&self) -> bool {
        self.emissive > 0.0
    }

    /// Base color at a world-space point, with the checker pattern applied.
    pub fn albedo_at(&self, point: Vec3) -> Color {
        if self.checkered && checker_cell(point.x) == checker_cell(point.z) {
            self.color.scale(0.5).opaque()
        } else {
            self.color
        }
    }
}

// Which half of the checker period a coordinate falls in
fn checker_cell(v: f32) -> bool {
    (v.trunc() as i64).rem_euclid(CHECKER_PERIOD) < CHECKER_PERIOD / 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checker_repeats_every_six_units() {
        let floor = Material::opaque(Color::rgb(0.8, 0.8, 0.8)).with_checkers();

        let a = floor.albedo_at(Vec3::new(0.0, -1.0, 0.0));
        let b = floor.albedo_at(Vec3::new(6.0, -1.0, 0.0));
        let c = floor.albedo_at(Vec3::new(3.0, -1.0, 0.0));

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, Color::rgb(0.4, 0.4, 0.4));
        assert_eq!(c, Color::rgb(0.8, 0.8, 0.8));
    }

    #[test]
    fn checker_cells_are_three_units_wide() {
        let floor = Material::opaque(Color::WHITE).with_checkers();
        let halved = Color::rgb(0.5, 0.5, 0.5);

        // x = 1 shares the z = 0 cell, x = 4 falls in the other half
        assert_eq!(floor.albedo_at(Vec3::new(1.0, 0.0, 0.0)), halved);
        assert_eq!(floor.albedo_at(Vec3::new(2.9, 0.0, 0.0)), halved);
        assert_eq!(floor.albedo_at(Vec3::new(4.0, 0.0, 0.0)), Color::WHITE);
        assert_eq!(floor.albedo_at(Vec3::new(4.0, 0.0, 4.0)), halved);
    }

    #[test]
    fn checker_handles_negative_coordinates() {
        let floor = Material::opaque(Color::WHITE).with_checkers();

        assert_eq!(
            floor.albedo_at(Vec3::new(-6.0, 0.0, 1.0)),
            floor.albedo_at(Vec3::new(0.0, 0.0, 1.0))
        );
    }

    #[test]
    fn plain_material_ignores_position() {
        let m = Material::opaque(Color::rgb(1.0, 0.0, 0.0));
        assert_eq!(m.albedo_at(Vec3::ZERO), m.albedo_at(Vec3::new(3.0, 0.0, 0.0)));
    }

    #[test]
    fn deserialize_fills_defaults() {
        let m: Material = toml::from_str("color = [1.0, 0.0, 0.0]\nopacity = 0.5").unwrap();

        assert_eq!(m.color, Color::rgb(1.0, 0.0, 0.0));
        assert_eq!(m.opacity, 0.5);
        assert_eq!(m.refraction_index, 1.0);
        assert!(!m.is_opaque());
        assert!(!m.is_emitter());
    }
}
