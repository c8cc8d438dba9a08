use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use glam::{vec3, Vec3};
use itertools::iproduct;
use log::{info, LevelFilter};
use rand::prelude::*;
use spheretrace::{
    CameraDescription, ColliderId, Color, FrameBuffer, Material, RenderConfig, Scene, Sphere,
    Tracer,
};
use std::{path::PathBuf, time::Instant};

type DefaultRng = rand_xoshiro::Xoshiro256Plus;

/// Height of the per-frame bob of the animated sphere
const BOB_AMPLITUDE: f32 = 0.5;

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Parser)]
#[command(name = "spheretrace")]
#[command(about = "Renders a scene of spheres to a PNG")]
struct Args {
    /// Render config in TOML, the built-in test scene is used without one
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long, default_value = "output.png")]
    output: PathBuf,

    /// Number of animated frames to render, only the last one is saved
    #[arg(short, long, default_value = "1")]
    frames: u32,

    /// Replace the scene with a random one generated from this seed
    #[arg(long)]
    random: Option<u64>,

    #[arg(long, default_value = "info")]
    log_level: LogLevel,
}

// Generate a semi random scene
fn random(seed: u64) -> Scene {
    let mut rng = DefaultRng::seed_from_u64(seed);
    let mut scene = Scene::new();

    // The floor
    let floor = Material::opaque(Color::rgb(0.8, 0.8, 0.8))
        .with_checkers()
        .with_roughness(0.9);
    scene.add_surface(Sphere::new(vec3(0.0, -1000.0, 0.0), 1000.0, floor));

    for (a, b) in iproduct!(-6..6, -6..6) {
        let center = vec3(
            2.0 * a as f32 + 1.6 * rng.gen::<f32>(),
            0.4,
            2.0 * b as f32 + 1.6 * rng.gen::<f32>(),
        );

        if (center - vec3(4.0, 0.4, 0.0)).length() < 1.8 {
            continue;
        }

        let color = Color::rgb(
            rng.gen::<f32>() * rng.gen::<f32>(),
            rng.gen::<f32>() * rng.gen::<f32>(),
            rng.gen::<f32>() * rng.gen::<f32>(),
        );
        let material = rng.gen::<f32>();

        // Rough
        let material = if material < 0.5 {
            Material::opaque(color).with_roughness(rng.gen())
        // Mirror
        } else if material < 0.8 {
            Material::opaque(color)
        // Glass
        } else {
            Material::translucent(color, 0.2 + 0.5 * rng.gen::<f32>(), 1.5)
        };

        scene.add_surface(Sphere::new(center, 0.4, material));
    }

    let glass = Material::translucent(Color::rgb(0.9, 0.9, 1.0), 0.3, 1.5);
    scene.add_surface(Sphere::new(vec3(-4.0, 1.0, 0.0), 1.0, glass));

    let mirror = Material::opaque(Color::rgb(0.7, 0.6, 0.5));
    scene.add_surface(Sphere::new(vec3(0.0, 1.0, 0.0), 1.0, mirror));

    let matte = Material::opaque(Color::rgb(0.6, 0.2, 0.9)).with_roughness(1.0);
    scene.add_surface(Sphere::new(vec3(4.0, 1.0, 0.0), 1.0, matte));

    scene.add_light(Sphere::new(vec3(-20.0, 40.0, 20.0), 4.0, Material::opaque(Color::WHITE)));
    scene.add_light(Sphere::new(
        vec3(6.0, 3.0, 6.0),
        0.5,
        Material::light(Color::rgb(1.0, 0.9, 0.6), 1.0),
    ));

    scene
}

fn random_camera() -> CameraDescription {
    CameraDescription {
        position: vec3(13.0, 3.0, 6.0),
        target: vec3(0.0, 0.5, 0.0),
        up: Vec3::Y,
        fov: 30.0,
        near: 0.1,
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.into())
        .init();

    let mut config = match &args.config {
        Some(path) => RenderConfig::load(path)?,
        None => RenderConfig::default(),
    };

    let mut scene = match (args.random, &config.scene) {
        (Some(seed), _) => {
            if args.config.is_none() {
                config.camera = random_camera();
            }
            random(seed)
        }
        (None, Some(description)) => description.build().context("Invalid scene")?,
        (None, None) => Scene::test_scene(),
    };

    let camera = config.camera.build(config.width, config.height);
    let mut frame = FrameBuffer::new(config.width, config.height);
    let mut tracer = Tracer::new();

    info!(
        "Rendering {}x{} with {} colliders and {} bounces",
        config.width,
        config.height,
        scene.len(),
        config.quality.num_bounces
    );

    // The first surface bobs up and down between frames
    let animated = (scene.surfaces().count() > 0).then_some(ColliderId(0));
    let rest = animated.and_then(|id| scene.get(id)).map(|c| c.position());

    let start = Instant::now();
    let frames = args.frames.max(1);

    for i in 0..frames {
        if let (Some(id), Some(rest)) = (animated, rest) {
            let offset = BOB_AMPLITUDE * (i as f32 * 0.25).sin();
            if let Some(collider) = scene.get_mut(id) {
                collider.set_position(rest + Vec3::Y * offset);
            }
        }

        tracer.render(&mut frame, &scene, &camera, &config.quality);
    }

    info!("Rendered {} frame(s) in {:.2?}", frames, start.elapsed());

    frame.save_png(&args.output)?;
    info!("Saved {:?}", args.output);

    Ok(())
}
