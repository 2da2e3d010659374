//! Wildlife Sim - headless demo run
//!
//! Builds a small map with forest, meadow, hills and a lake, stocks it, then
//! walks a scripted hunter through it, shooting at whatever comes close.
//! Prints a summary (or JSON with `--format json`).

use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;

use wildlife_sim::core::types::{Rect, SceneId, Vec2};
use wildlife_sim::projectile::FireGate;
use wildlife_sim::species::SpeciesCatalog;
use wildlife_sim::terrain::{Habitat, HabitatRegion, TerrainClass, TerrainGrid};
use wildlife_sim::{Result, WildlifeConfig, WildlifeEvent, WildlifeSim};

/// Headless wildlife simulation
#[derive(Parser, Debug)]
#[command(name = "wildlife-sim")]
#[command(about = "Run the wildlife simulation with a scripted hunter")]
struct Args {
    /// Random seed (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 3600)]
    ticks: u32,

    /// Seconds per tick
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// TOML species catalog (defaults to the built-in species)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Output format: text or json
    #[arg(long, default_value = "text")]
    format: String,
}

#[derive(Debug, Default, Serialize)]
struct RunSummary {
    seed: u64,
    ticks: u32,
    spawned: usize,
    alive_at_end: usize,
    shots_fired: u32,
    kills: u32,
    coins: u32,
    player_hits_taken: u32,
    player_damage_taken: f32,
}

fn demo_map(bounds: Rect) -> TerrainGrid {
    TerrainGrid::from_fn(bounds, 25.0, |p| {
        let lake = Vec2::new(3000.0, 1000.0);
        if p.distance(&lake) < 500.0 {
            TerrainClass::Water
        } else if p.x < 2000.0 && p.y < 2000.0 {
            TerrainClass::Forest
        } else if p.y >= 2000.0 && p.x >= 2000.0 {
            TerrainClass::Hill
        } else if (1950.0..2050.0).contains(&p.y) {
            TerrainClass::Road
        } else {
            TerrainClass::Grass
        }
    })
}

fn demo_regions() -> Vec<HabitatRegion> {
    let scene = SceneId(0);
    vec![
        HabitatRegion::new("old forest", Habitat::Forest, Rect::new(0.0, 0.0, 2000.0, 2000.0), scene),
        HabitatRegion::new("meadow", Habitat::Plains, Rect::new(0.0, 2050.0, 2000.0, 4000.0), scene),
        HabitatRegion::new("ridge", Habitat::Hills, Rect::new(2000.0, 2050.0, 4000.0, 4000.0), scene),
        HabitatRegion::new("lake", Habitat::Water, Rect::new(2500.0, 500.0, 3500.0, 1500.0), scene),
    ]
}

/// Square patrol around the map centre
fn hunter_position(t: f32) -> Vec2 {
    let waypoints = [
        Vec2::new(1000.0, 1000.0),
        Vec2::new(1000.0, 3000.0),
        Vec2::new(3000.0, 3000.0),
        Vec2::new(3000.0, 1800.0),
    ];
    let leg_seconds = 40.0;
    let leg = (t / leg_seconds) as usize % waypoints.len();
    let progress = (t % leg_seconds) / leg_seconds;
    let a = waypoints[leg];
    let b = waypoints[(leg + 1) % waypoints.len()];
    a + (b - a) * progress
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wildlife_sim=info".into()),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => WildlifeConfig::load(path)?,
        None => WildlifeConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    let catalog = match &args.catalog {
        Some(path) => SpeciesCatalog::load(path)?,
        None => SpeciesCatalog::builtin(),
    };

    tracing::info!("Wildlife sim starting (seed {}, {} species)", config.seed, catalog.len());

    let terrain = demo_map(config.world_bounds);
    let mut gate = FireGate::new(config.projectile.fire_rate);
    let weapon_range = 350.0;
    let weapon_damage = 40.0;
    let mut summary = RunSummary {
        seed: config.seed,
        ticks: args.ticks,
        ..RunSummary::default()
    };

    let mut sim = WildlifeSim::new(config, catalog, terrain, demo_regions())?;
    sim.initialize_population(None);

    let scene = SceneId(0);
    for tick in 0..args.ticks {
        let t = tick as f32 * args.dt;
        let player = hunter_position(t);
        sim.update(args.dt, player, scene)?;

        // Shoot at the nearest living creature in range
        let nearest = sim
            .creatures()
            .into_iter()
            .filter(|c| c.health_fraction > 0.0)
            .map(|c| (c.position.distance(&player), c.position))
            .filter(|(d, _)| *d <= weapon_range)
            .min_by(|a, b| a.0.total_cmp(&b.0));
        if let Some((_, target)) = nearest {
            if gate.try_fire(t as f64) && sim.fire_projectile(player, target, weapon_damage).is_some() {
                summary.shots_fired += 1;
            }
        }
        sim.update_projectiles(args.dt)?;

        for event in sim.drain_events() {
            match event {
                WildlifeEvent::PlayerAttacked { damage, .. } => {
                    summary.player_hits_taken += 1;
                    summary.player_damage_taken += damage;
                }
                WildlifeEvent::CreatureKilled { species, reward, .. } => {
                    summary.kills += 1;
                    summary.coins += reward;
                    if let Ok(def) = sim.catalog().get(species) {
                        tracing::info!("t={:.1}s: killed {} (+{} coins)", t, def.name, reward);
                    }
                }
                WildlifeEvent::CreatureSpawned { .. } => summary.spawned += 1,
                _ => {}
            }
        }
    }
    summary.alive_at_end = sim.population().alive_count();

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("=== WILDLIFE RUN (seed {}) ===", summary.seed);
        println!("Ticks:            {}", summary.ticks);
        println!("Creatures spawned: {}", summary.spawned);
        println!("Alive at end:     {}", summary.alive_at_end);
        println!("Shots fired:      {}", summary.shots_fired);
        println!("Kills:            {} ({} coins)", summary.kills, summary.coins);
        println!(
            "Player hit:       {} times, {:.0} damage",
            summary.player_hits_taken, summary.player_damage_taken
        );
    }
    Ok(())
}
