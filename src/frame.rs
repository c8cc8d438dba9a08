use crate::color::Color;
use anyhow::{Context, Result};
use std::path::Path;

/// Row-major output colors. Row 0 is the bottom of the image.
#[derive(Clone, Debug)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
    presented: u64,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::BLACK; (width * height) as usize],
            presented: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    pub fn pixels_mut(&mut self) -> &mut [Color] {
        &mut self.pixels
    }

    /// Marks the current contents as a finished frame.
    pub fn apply(&mut self) {
        self.presented += 1;
    }

    /// Number of frames applied so far.
    pub fn presented(&self) -> u64 {
        self.presented
    }

    /// 8-bit RGBA bytes with the top row first, as image formats expect.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels
            .chunks_exact(self.width.max(1) as usize)
            .rev()
            .flatten()
            .flat_map(|color| color.to_rgba8())
            .collect()
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        image::save_buffer(
            path,
            &self.to_rgba8(),
            self.width,
            self.height,
            image::ColorType::Rgba8,
        )
        .with_context(|| format!("Failed to save image: {:?}", path))
    }
}
