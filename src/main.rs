//! Star Swoop headless driver: runs the simulation with the demo pilot at a
//! fixed 60 Hz step and reports what happened.
//!
//! Usage:
//!   star-swoop --level 3 --seed 42 --ticks 36000
//!   RUST_LOG=debug star-swoop --tuning balance.json

use std::fs;
use std::path::Path;
use std::time::Instant;

use clap::Parser;

use star_swoop::audio::{AudioManager, LogBackend};
use star_swoop::sim::{GameEvent, TickInput, World, tick};
use star_swoop::{RunSettings, Tuning};

#[derive(Parser)]
#[command(name = "star-swoop")]
#[command(about = "Run the Star Swoop simulation headless with the demo pilot")]
struct Args {
    /// Starting level (1-100; anything non-numeric means 1)
    #[arg(long)]
    level: Option<String>,

    /// RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 60 * 60 * 5)]
    ticks: u64,

    /// JSON file overriding balance values
    #[arg(long)]
    tuning: Option<String>,

    /// Player ignores fatal collisions
    #[arg(long)]
    invulnerable: bool,

    /// Print the active tuning as JSON and exit
    #[arg(long)]
    dump_tuning: bool,
}

/// Running totals over the drained events
#[derive(Debug, Default)]
struct RunSummary {
    dives: u32,
    kills: u32,
    deaths: u32,
    powerups: u32,
    best_chain: u32,
    columns_cleared: u32,
    levels_started: u32,
    highest_level: u32,
}

impl RunSummary {
    fn record(&mut self, events: &[GameEvent]) {
        use star_swoop::audio::SoundEffect;

        for event in events {
            match event {
                GameEvent::Sound(SoundEffect::DiveStarted) => self.dives += 1,
                GameEvent::Sound(SoundEffect::Hit) => self.kills += 1,
                GameEvent::Sound(SoundEffect::PowerUpCollected) => self.powerups += 1,
                GameEvent::WingLost(_) => self.kills += 1,
                GameEvent::PlayerDestroyed => self.deaths += 1,
                GameEvent::ChainChanged(chain) => self.best_chain = self.best_chain.max(*chain),
                GameEvent::ColumnCleared { .. } => self.columns_cleared += 1,
                GameEvent::LevelStarted(level) => {
                    self.levels_started += 1;
                    self.highest_level = self.highest_level.max(*level);
                }
                _ => {}
            }
        }
    }
}

fn load_tuning(path: Option<&str>) -> Tuning {
    let Some(path) = path else {
        return Tuning::default();
    };
    match fs::read_to_string(Path::new(path)) {
        Ok(json) => match Tuning::from_json(&json) {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path);
                tuning
            }
            Err(e) => {
                log::warn!("Failed to parse tuning {}: {}, using defaults", path, e);
                Tuning::default()
            }
        },
        Err(e) => {
            log::warn!("Failed to read tuning {}: {}, using defaults", path, e);
            Tuning::default()
        }
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let tuning = load_tuning(args.tuning.as_deref());
    if args.dump_tuning {
        match tuning.to_json() {
            Ok(json) => println!("{json}"),
            Err(e) => log::error!("Failed to serialize tuning: {}", e),
        }
        return;
    }

    let seed = args.seed.unwrap_or(RunSettings::default().seed);
    let settings = RunSettings {
        invulnerable: args.invulnerable,
        ..RunSettings::from_level_param(args.level.as_deref(), seed)
    };
    log::info!(
        "Star Swoop (headless) starting at level {} with seed 0x{:x}",
        settings.start_level,
        settings.seed
    );

    let mut world = World::new(settings, tuning);
    let mut audio = AudioManager::with_backend(Box::new(LogBackend));
    let mut summary = RunSummary::default();
    let input = TickInput {
        idle_mode: true,
        ..Default::default()
    };

    let start = Instant::now();
    for _ in 0..args.ticks {
        tick(&mut world, &input);
        let events = world.drain_events();
        audio.handle_events(&events);
        summary.record(&events);
    }
    let elapsed = start.elapsed();

    println!();
    println!("=== RUN SUMMARY ===");
    println!("  Ticks:          {}", args.ticks);
    println!("  Final level:    {}", world.level());
    println!("  Highest level:  {}", summary.highest_level);
    println!("  Levels started: {}", summary.levels_started);
    println!("  Dives:          {}", summary.dives);
    println!("  Kills:          {}", summary.kills);
    println!("  Columns:        {}", summary.columns_cleared);
    println!("  Power-ups:      {}", summary.powerups);
    println!("  Best chain:     {}", summary.best_chain);
    println!("  Deaths:         {}", summary.deaths);
    println!("  Enemies left:   {}", world.live_enemy_count());
    println!(
        "  ({:.1}s wall clock, {:.0} ticks/s)",
        elapsed.as_secs_f64(),
        args.ticks as f64 / elapsed.as_secs_f64().max(1e-9)
    );
}
