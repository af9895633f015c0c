//! Packed Circles demo entry point
//!
//! Headless chase scenario: a swarm of circles follows a target that orbits
//! the middle of the bounds while a fixed anchor sits in their way. Each frame
//! runs targeting then separation and copies positions back onto sprites, the
//! way a renderer host would.

use std::cell::RefCell;
use std::f32::consts::TAU;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use packed_circles::{
    BoundsRule, CircleDelegate, CircleSnapshot, ManagerSettings, PackedCircle,
    PackedCircleManager, SharedTarget,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless packed-circle chase demo", long_about = None)]
struct Args {
    /// Manager settings JSON (defaults are used when omitted)
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Number of chasing circles
    #[arg(short, long, default_value_t = 40)]
    circles: u32,

    /// Frames to simulate
    #[arg(short, long, default_value_t = 600)]
    ticks: u32,

    /// Scatter seed
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    #[arg(long, default_value_t = 6.0)]
    min_radius: f32,

    #[arg(long, default_value_t = 18.0)]
    max_radius: f32,

    /// Print final circle snapshots as JSON
    #[arg(long)]
    json: bool,
}

/// Stand-in for a renderer's visual object (drawn from its top-left corner)
#[derive(Debug)]
struct Sprite {
    top_left: Vec2,
    size: f32,
}

impl CircleDelegate for Sprite {
    fn position(&self) -> Vec2 {
        self.top_left + Vec2::splat(self.size / 2.0)
    }
}

type SpriteRef = Rc<RefCell<Sprite>>;

/// Uniform sample in `[low, high)`, or `low` for an empty range
fn sample(rng: &mut Pcg32, low: f32, high: f32) -> f32 {
    if low < high {
        rng.random_range(low..high)
    } else {
        low
    }
}

fn build_scene(args: &Args, settings: &ManagerSettings) -> (PackedCircleManager<SpriteRef>, SharedTarget) {
    let mut manager = PackedCircleManager::from_settings(settings);
    let bounds = manager.bounds();
    let cursor = SharedTarget::new(bounds.center());
    let mut rng = Pcg32::seed_from_u64(args.seed);

    // Immovable obstacle in the middle of the orbit
    let anchor_radius = args.max_radius * 2.0;
    let mut anchor = PackedCircle::new(0);
    anchor
        .set_radius(anchor_radius)
        .set_is_fixed(true)
        .set_delegate(Rc::new(RefCell::new(Sprite {
            top_left: bounds.center() - Vec2::splat(anchor_radius),
            size: anchor_radius * 2.0,
        })));
    manager.add_circle(anchor);

    for id in 1..=args.circles {
        let radius = sample(&mut rng, args.min_radius, args.max_radius);
        let top_left = Vec2::new(
            sample(&mut rng, bounds.left(), bounds.right()),
            sample(&mut rng, bounds.top(), bounds.bottom()),
        );
        let sprite = Rc::new(RefCell::new(Sprite {
            top_left,
            size: radius * 2.0,
        }));

        let mut circle = PackedCircle::new(id);
        circle
            .set_radius(radius)
            .set_target(cursor.clone())
            .set_target_chase_speed(sample(&mut rng, 0.01, 0.05))
            .set_bounds_rule(BoundsRule::Constrain)
            .set_delegate(sprite);
        manager.add_circle(circle);
    }

    // Start from where the sprites are, not the origin
    manager.force_circles_to_match_delegate_positions();
    (manager, cursor)
}

/// Copy simulated positions back onto the sprites
fn sync_sprites(manager: &PackedCircleManager<SpriteRef>) {
    for circle in manager.all_circles() {
        if let Some(sprite) = circle.delegate() {
            sprite.borrow_mut().top_left = circle.position() - Vec2::splat(circle.radius());
        }
    }
}

fn mean_distance_to_target(manager: &PackedCircleManager<SpriteRef>) -> f32 {
    let movers: Vec<f32> = manager
        .all_circles()
        .iter()
        .filter(|c| !c.is_fixed())
        .map(|c| c.distance_squared_to_target().sqrt())
        .collect();
    if movers.is_empty() {
        0.0
    } else {
        movers.iter().sum::<f32>() / movers.len() as f32
    }
}

fn run(args: &Args) -> Result<Vec<CircleSnapshot>> {
    let settings = match &args.settings {
        Some(path) => ManagerSettings::load(path)
            .with_context(|| format!("Could not load settings from {}", path.display()))?,
        None => ManagerSettings::default(),
    };
    log::info!(
        "Bounds {}x{}, {} collision / {} targeting passes, broad phase {:?}",
        settings.bounds.width,
        settings.bounds.height,
        settings.collision_passes,
        settings.targeting_passes,
        settings.broad_phase
    );

    let (mut manager, cursor) = build_scene(args, &settings);
    let bounds = manager.bounds();
    let orbit = bounds.width.min(bounds.height) * 0.3;

    for frame in 0..args.ticks {
        // The "pointer" circles the middle once every 600 frames
        let angle = frame as f32 / 600.0 * TAU;
        cursor.set(bounds.center() + Vec2::new(angle.cos(), angle.sin()) * orbit);

        manager.push_all_circles_toward_target();
        manager.handle_collisions();
        let destroyed = manager.handle_boundaries();
        if !destroyed.is_empty() {
            log::info!("Frame {}: {} circles left the bounds", frame, destroyed.len());
        }
        sync_sprites(&manager);

        if frame % 60 == 0 {
            log::info!(
                "Frame {}: overlap {:.2}, mean distance to target {:.1}",
                frame,
                manager.total_overlap(),
                mean_distance_to_target(&manager)
            );
        }
    }

    log::info!(
        "Done after {} frames: overlap {:.2}, mean distance to target {:.1}",
        args.ticks,
        manager.total_overlap(),
        mean_distance_to_target(&manager)
    );

    Ok(manager.all_circles().iter().map(PackedCircle::snapshot).collect())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    log::info!("Packed Circles demo starting with {} circles", args.circles);

    let snapshots = run(&args)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshots)?);
    }
    Ok(())
}
