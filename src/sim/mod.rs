//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering, audio or platform dependencies (side effects leave as
//!   [`GameEvent`]s)

pub mod collision;
pub mod curve;
pub mod effects;
pub mod enemies;
pub mod flow;
pub mod player;
pub mod powerups;
pub mod resolve;
pub mod state;
pub mod tick;

pub use collision::{BulletHit, WingHit};
pub use curve::{DiveCurve, DivePattern, DiveTarget};
pub use effects::{Effects, ExplosionKind};
pub use enemies::{ColumnTracker, EnemyFleet, FormationLayout};
pub use flow::{Banner, FlowAction, LevelFlow};
pub use player::Player;
pub use powerups::PowerUpField;
pub use resolve::{ResolveOutcome, resolve};
pub use state::{
    Bullet, BulletOwner, Enemy, EnemyState, EntityId, EntityKind, GameEvent, GameFlags,
    IdAllocator, PowerUp, PowerUpKind, WingSide,
};
pub use tick::{TickInput, World, tick};
