//! A small brute force ray tracer for scenes made of spheres.
//!
//! Each pixel casts one ray that bounces a bounded number of times, picking
//! up direct light with shadows on the way. Call [`Tracer::render`] once per
//! frame.

pub mod camera;
pub mod color;
pub mod frame;
pub mod material;
pub mod math;
pub mod primitives;
pub mod ray;
pub mod scene;
pub mod settings;
pub mod tracer;

pub use crate::{
    camera::{Camera, CameraDescription, PerspectiveCamera},
    color::Color,
    frame::FrameBuffer,
    material::Material,
    primitives::{Collider, Sphere},
    ray::{ColliderId, Intersection, Ray},
    scene::{Candidates, Scene, SceneDescription, SphereDescription},
    settings::{QualitySettings, RenderConfig},
    tracer::{Termination, TraceOutcome, Tracer},
};
