use crate::{
    color::Color,
    material::Material,
    primitives::{Collider, Sphere},
    ray::{ColliderId, Intersection},
};
use anyhow::{ensure, Result};
use glam::{vec3, Vec3};
use serde::Deserialize;

/// Which colliders a nearest-hit query looks at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Candidates {
    /// Surfaces followed by lights
    All,
    Surfaces,
}

/// Everything a frame renders. Lights are colliders too: they can be hit
/// directly by camera and bounce rays.
#[derive(Debug, Default)]
pub struct Scene {
    surfaces: Vec<Box<dyn Collider>>,
    lights: Vec<Box<dyn Collider>>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_surface(&mut self, collider: impl Collider + 'static) -> ColliderId {
        self.surfaces.push(Box::new(collider));
        // Every light id shifts up by one
        ColliderId(self.surfaces.len() - 1)
    }

    pub fn add_light(&mut self, collider: impl Collider + 'static) -> ColliderId {
        self.lights.push(Box::new(collider));
        ColliderId(self.surfaces.len() + self.lights.len() - 1)
    }

    pub fn surfaces(&self) -> impl Iterator<Item = &(dyn Collider + 'static)> {
        self.surfaces.iter().map(Box::as_ref)
    }

    pub fn lights(&self) -> impl Iterator<Item = &(dyn Collider + 'static)> {
        self.lights.iter().map(Box::as_ref)
    }

    /// Surfaces followed by lights, each paired with its id.
    pub fn colliders(&self) -> impl Iterator<Item = (ColliderId, &(dyn Collider + 'static))> {
        self.surfaces
            .iter()
            .chain(self.lights.iter())
            .map(Box::as_ref)
            .enumerate()
            .map(|(i, c)| (ColliderId(i), c))
    }

    pub fn len(&self) -> usize {
        self.surfaces.len() + self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: ColliderId) -> Option<&dyn Collider> {
        let ColliderId(i) = id;
        match i.checked_sub(self.surfaces.len()) {
            None => self.surfaces.get(i).map(Box::as_ref),
            Some(light) => self.lights.get(light).map(Box::as_ref),
        }
    }

    /// Mutable access for moving things between frames.
    pub fn get_mut(&mut self, id: ColliderId) -> Option<&mut (dyn Collider + 'static)> {
        let ColliderId(i) = id;
        match i.checked_sub(self.surfaces.len()) {
            None => self.surfaces.get_mut(i).map(Box::as_mut),
            Some(light) => self.lights.get_mut(light).map(Box::as_mut),
        }
    }

    /// Brute force search for the closest collider along a ray, skipping
    /// `ignore` (usually the collider the ray just left).
    pub fn nearest_intersection(
        &self,
        origin: Vec3,
        dir: Vec3,
        candidates: Candidates,
        ignore: Option<ColliderId>,
    ) -> Option<Intersection<'_>> {
        let count = match candidates {
            Candidates::All => self.len(),
            Candidates::Surfaces => self.surfaces.len(),
        };

        let (id, collider, distance) = self
            .colliders()
            .take(count)
            .filter(|(id, _)| Some(*id) != ignore)
            .filter_map(|(id, collider)| {
                collider
                    .intersect(origin, dir)
                    .map(|distance| (id, collider, distance))
            })
            .min_by(|a, b| a.2.total_cmp(&b.2))?;

        let position = origin + distance * dir;

        Some(Intersection {
            position,
            normal: collider.normal_at(position),
            distance,
            collider,
            id,
        })
    }

    /// A single red sphere lit from above.
    pub fn test_scene() -> Self {
        let mut scene = Scene::new();

        scene.add_surface(Sphere::new(
            vec3(5.0, 5.0, 5.0),
            5.0,
            Material::opaque(Color::rgb(1.0, 0.0, 0.0)),
        ));
        scene.add_light(Sphere::new(
            vec3(0.0, 50.0, 0.0),
            5.0,
            Material::opaque(Color::WHITE),
        ));

        scene
    }
}

/// A sphere as written in a scene file.
#[derive(Clone, Debug, Deserialize)]
pub struct SphereDescription {
    pub position: Vec3,
    pub radius: f32,
    #[serde(default)]
    pub material: Material,
}

impl SphereDescription {
    fn build(&self) -> Result<Sphere> {
        ensure!(
            self.radius > 0.0,
            "sphere at {} has non-positive radius {}",
            self.position,
            self.radius
        );
        ensure!(
            self.material.is_opaque() || self.material.refraction_index > 0.0,
            "translucent sphere at {} has non-positive refraction index {}",
            self.position,
            self.material.refraction_index
        );

        Ok(Sphere::new(self.position, self.radius, self.material))
    }
}

/// Scene content as authored in a TOML file.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct SceneDescription {
    pub surfaces: Vec<SphereDescription>,
    pub lights: Vec<SphereDescription>,
}

impl SceneDescription {
    /// Validates the content and builds the scene.
    pub fn build(&self) -> Result<Scene> {
        let mut scene = Scene::new();

        for surface in &self.surfaces {
            scene.add_surface(surface.build()?);
        }
        for light in &self.lights {
            scene.add_light(light.build()?);
        }

        Ok(scene)
    }
}
