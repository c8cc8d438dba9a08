//! Frame-wide render settings and the config file that carries them.

use crate::{camera::CameraDescription, color::Color, scene::SceneDescription};
use anyhow::{Context, Result};
use log::warn;
use serde::Deserialize;
use std::{fs, path::Path};

/// Bounces beyond this are not supported.
pub const MAX_BOUNCES: u32 = 4;

/// Quality knobs, read-only for the duration of a frame.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct QualitySettings {
    pub num_bounces: u32,
    pub energy_lost_per_unit: f32,
    pub energy_lost_per_roughness_on_reflect: f32,
    /// Top of the background gradient
    pub sky_color: Color,
    /// Bottom of the background gradient
    pub sky_dark_color: Color,
    pub ambient_light: Color,
    /// Renormalize ray directions after refracting through a collider
    pub renormalize_refraction: bool,
}

impl Default for QualitySettings {
    fn default() -> Self {
        Self {
            num_bounces: 1,
            energy_lost_per_unit: 0.005,
            energy_lost_per_roughness_on_reflect: 0.5,
            sky_color: Color::rgb(0.5, 0.7, 1.0),
            sky_dark_color: Color::rgb(0.1, 0.1, 0.15),
            ambient_light: Color::rgb(0.1, 0.1, 0.1),
            renormalize_refraction: false,
        }
    }
}

impl QualitySettings {
    /// Clamps out of range values, warning about each one.
    pub fn sanitized(mut self) -> Self {
        if self.num_bounces > MAX_BOUNCES {
            warn!("num_bounces {} clamped to {}", self.num_bounces, MAX_BOUNCES);
            self.num_bounces = MAX_BOUNCES;
        }
        if self.energy_lost_per_unit < 0.0 {
            warn!("negative energy_lost_per_unit clamped to 0");
            self.energy_lost_per_unit = 0.0;
        }
        if self.energy_lost_per_roughness_on_reflect < 0.0 {
            warn!("negative energy_lost_per_roughness_on_reflect clamped to 0");
            self.energy_lost_per_roughness_on_reflect = 0.0;
        }

        self
    }
}

/// The full contents of a render config file.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub camera: CameraDescription,
    pub quality: QualitySettings,
    /// Falls back to the built-in test scene when absent
    pub scene: Option<SceneDescription>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 360,
            camera: CameraDescription::default(),
            quality: QualitySettings::default(),
            scene: None,
        }
    }
}

impl RenderConfig {
    pub fn from_toml(source: &str) -> Result<Self> {
        let mut config: RenderConfig = toml::from_str(source).context("Invalid render config")?;
        anyhow::ensure!(
            config.width > 0 && config.height > 0,
            "Resolution must be non-zero, got {}x{}",
            config.width,
            config.height
        );
        anyhow::ensure!(
            config.camera.near > 0.0,
            "Camera near plane must be positive, got {}",
            config.camera.near
        );
        anyhow::ensure!(
            config.camera.fov > 0.0 && config.camera.fov < 180.0,
            "Camera fov must be between 0 and 180 degrees, got {}",
            config.camera.fov
        );
        config.quality = config.quality.sanitized();

        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;

        Self::from_toml(&source).with_context(|| format!("Failed to load config: {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_config_uses_defaults() {
        let config = RenderConfig::from_toml("").unwrap();

        assert_eq!(config.width, 640);
        assert_eq!(config.quality, QualitySettings::default());
        assert!(config.scene.is_none());
    }

    #[test]
    fn bounces_are_clamped() {
        let config = RenderConfig::from_toml("[quality]\nnum_bounces = 12").unwrap();
        assert_eq!(config.quality.num_bounces, MAX_BOUNCES);
    }

    #[test]
    fn zero_resolution_is_rejected() {
        assert!(RenderConfig::from_toml("width = 0").is_err());
    }

    #[test]
    fn non_positive_near_plane_is_rejected() {
        assert!(RenderConfig::from_toml("[camera]\nnear = 0.0").is_err());
        assert!(RenderConfig::from_toml("[camera]\nnear = -0.3").is_err());
        assert!(RenderConfig::from_toml("[camera]\nnear = 0.01").is_ok());
    }

    #[test]
    fn fov_outside_half_turn_is_rejected() {
        assert!(RenderConfig::from_toml("[camera]\nfov = 0.0").is_err());
        assert!(RenderConfig::from_toml("[camera]\nfov = 180.0").is_err());
        assert!(RenderConfig::from_toml("[camera]\nfov = -45.0").is_err());
        assert!(RenderConfig::from_toml("[camera]\nfov = 90.0").is_ok());
    }

    #[test]
    fn unknown_types_are_rejected() {
        assert!(RenderConfig::from_toml("[quality]\nnum_bounces = \"lots\"").is_err());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            width = 32
            height = 16

            [quality]
            num_bounces = 2
            sky_color = [0.0, 0.0, 1.0]
            renormalize_refraction = true

            [[scene.surfaces]]
            position = [0.0, 0.0, 0.0]
            radius = 1.0
            "#
        )
        .unwrap();

        let config = RenderConfig::load(file.path()).unwrap();
        assert_eq!((config.width, config.height), (32, 16));
        assert_eq!(config.quality.num_bounces, 2);
        assert_eq!(config.quality.sky_color, Color::rgb(0.0, 0.0, 1.0));
        assert!(config.quality.renormalize_refraction);
        assert_eq!(config.scene.unwrap().surfaces.len(), 1);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = RenderConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(format!("{:?}", err).contains("here.toml"));
    }
}
