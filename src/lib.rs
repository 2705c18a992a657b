//! Star Swoop - formation-diving arcade shooter
//!
//! Core modules:
//! - `sim`: Frame-by-frame simulation (enemy dives, collisions, power-ups, level flow)
//! - `tuning`: Data-driven game balance
//! - `settings`: Run parameters (starting level, seed)
//! - `audio`: Sound notification sink that degrades silently without a backend

pub mod audio;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use settings::RunSettings;
pub use tuning::Tuning;

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    /// Play area half width (x runs from -HALF_WIDTH to +HALF_WIDTH)
    pub const PLAY_HALF_WIDTH: f32 = 10.0;
    /// Bullets above this line are gone
    pub const PLAY_TOP: f32 = 12.0;
    /// Power-ups below this line are gone
    pub const PLAY_BOTTOM: f32 = -12.0;

    /// Player spawn height
    pub const PLAYER_START_Y: f32 = -9.0;
    /// Horizontal player speed (units per tick)
    pub const PLAYER_SPEED: f32 = 0.25;
    /// Keep the ship (and its wings) inside the walls
    pub const PLAYER_MAX_X: f32 = PLAY_HALF_WIDTH - 1.0;
    /// Wing attachment offset from the ship center
    pub const WING_OFFSET_X: f32 = 0.9;

    /// Bullet speed (units per tick, upward)
    pub const BULLET_SPEED: f32 = 0.5;
    /// Muzzle offset above the ship / wing
    pub const MUZZLE_OFFSET_Y: f32 = 0.6;

    /// Formation grid at level 1
    pub const BASE_ROWS: u32 = 4;
    pub const BASE_COLS: u32 = 8;
    /// Formation grid cap
    pub const MAX_ROWS: u32 = 8;
    pub const MAX_COLS: u32 = 12;
    /// Top row height
    pub const FORMATION_TOP_Y: f32 = 9.0;
    /// Grid spacing at the base formation size
    pub const BASE_SPACING_X: f32 = 1.6;
    pub const BASE_SPACING_Y: f32 = 1.2;
    /// Enemy size at the base formation size
    pub const BASE_ENEMY_SIZE: f32 = 0.8;

    /// Cosmetic formation sway
    pub const DRIFT_AMPLITUDE_X: f32 = 0.3;
    pub const DRIFT_AMPLITUDE_Y: f32 = 0.15;
    pub const DRIFT_FREQUENCY: f32 = 0.03;

    /// Level bounds
    pub const MIN_LEVEL: u32 = 1;
    pub const MAX_LEVEL: u32 = 100;
}

/// Euclidean distance between two entity positions
#[inline]
pub fn distance(a: Vec3, b: Vec3) -> f32 {
    a.distance(b)
}

/// Linear interpolation, `t` in [0, 1]
#[inline]
pub fn lerp(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    a + (b - a) * t
}

/// Quadratic Bezier through start, control and end at parameter `t`
#[inline]
pub fn quadratic_bezier(start: Vec3, control: Vec3, end: Vec3, t: f32) -> Vec3 {
    let u = 1.0 - t;
    start * (u * u) + control * (2.0 * u * t) + end * (t * t)
}
