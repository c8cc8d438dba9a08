use serde::Deserialize;
use std::ops::{Add, Mul};

/// An RGBA color. Channels are nominally in [0, 1] but may exceed 1 while
/// shading.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(try_from = "Vec<f32>")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Channel-wise maximum. Used in place of additive blending everywhere
    /// light is accumulated.
    pub fn combine(self, other: Color) -> Self {
        Self {
            r: self.r.max(other.r),
            g: self.g.max(other.g),
            b: self.b.max(other.b),
            a: self.a.max(other.a),
        }
    }

    /// Scales the color channels, leaving alpha alone.
    pub fn scale(self, s: f32) -> Self {
        Self {
            r: self.r * s,
            g: self.g * s,
            b: self.b * s,
            a: self.a,
        }
    }

    pub fn lerp(self, other: Color, t: f32) -> Self {
        Self {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn opaque(self) -> Self {
        self.with_alpha(1.0)
    }

    /// Clamps to [0, 1] and quantizes to 8 bits per channel.
    pub fn to_rgba8(self) -> [u8; 4] {
        let quantize = |c: f32| (255.0 * c.clamp(0.0, 1.0)).round() as u8;
        [quantize(self.r), quantize(self.g), quantize(self.b), quantize(self.a)]
    }
}

impl Mul for Color {
    type Output = Color;

    fn mul(self, rhs: Color) -> Color {
        Color::new(self.r * rhs.r, self.g * rhs.g, self.b * rhs.b, self.a * rhs.a)
    }
}

// Alpha is taken from the left hand side
impl Add for Color {
    type Output = Color;

    fn add(self, rhs: Color) -> Color {
        Color::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b, self.a)
    }
}

impl TryFrom<Vec<f32>> for Color {
    type Error = String;

    fn try_from(channels: Vec<f32>) -> Result<Self, Self::Error> {
        match channels[..] {
            [r, g, b] => Ok(Color::rgb(r, g, b)),
            [r, g, b, a] => Ok(Color::new(r, g, b, a)),
            _ => Err(format!("expected 3 or 4 color channels, got {}", channels.len())),
        }
    }
}
