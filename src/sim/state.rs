//! Entity records and shared simulation types
//!
//! Per-entity state is explicit: an enemy's dive data only exists while the
//! enemy is diving, its return data only while returning.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::curve::DiveCurve;
use crate::audio::SoundEffect;

/// Opaque handle for anything the scene layer draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Hands out unique entity ids for the lifetime of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdAllocator {
    next: u32,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }
}

/// Which side of the ship a wing sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WingSide {
    Left,
    Right,
}

impl WingSide {
    pub const BOTH: [WingSide; 2] = [WingSide::Left, WingSide::Right];

    /// -1 for left, +1 for right
    pub fn sign(self) -> f32 {
        match self {
            WingSide::Left => -1.0,
            WingSide::Right => 1.0,
        }
    }
}

/// Who fired a bullet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletOwner {
    /// Ship's main gun
    Main,
    /// Side gun on an attached wing
    Wing(WingSide),
}

/// A player bullet travelling straight up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub id: EntityId,
    pub pos: Vec3,
    pub owner: BulletOwner,
}

/// Enemy behaviour state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EnemyState {
    /// Holding (and swaying around) the formation slot
    Formation,
    /// Following a dive curve toward the player
    Diving {
        curve: DiveCurve,
        elapsed: u32,
        duration: u32,
    },
    /// Gliding back to the formation slot after a missed dive
    Returning {
        start: Vec3,
        elapsed: u32,
        duration: u32,
    },
}

impl EnemyState {
    pub fn is_formation(&self) -> bool {
        matches!(self, EnemyState::Formation)
    }

    pub fn is_diving(&self) -> bool {
        matches!(self, EnemyState::Diving { .. })
    }

    pub fn is_returning(&self) -> bool {
        matches!(self, EnemyState::Returning { .. })
    }

    /// The active dive curve, present only while diving
    pub fn dive_curve(&self) -> Option<&DiveCurve> {
        match self {
            EnemyState::Diving { curve, .. } => Some(curve),
            _ => None,
        }
    }
}

/// An enemy ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EntityId,
    /// Formation slot; fixed at spawn
    formation_x: f32,
    formation_y: f32,
    /// Grid column (all enemies in a column share `formation_x`)
    pub column: u32,
    pub row: u32,
    /// Visual size, shrinks as the formation grows
    pub size: f32,
    pub pos: Vec3,
    pub state: EnemyState,
    /// Set the moment a lethal hit lands so later checks in the same tick skip it
    pub destroyed: bool,
}

impl Enemy {
    pub fn new(id: EntityId, column: u32, row: u32, home: (f32, f32), size: f32) -> Self {
        Self {
            id,
            formation_x: home.0,
            formation_y: home.1,
            column,
            row,
            size,
            pos: Vec3::new(home.0, home.1, 0.0),
            state: EnemyState::Formation,
            destroyed: false,
        }
    }

    pub fn formation_x(&self) -> f32 {
        self.formation_x
    }

    pub fn formation_y(&self) -> f32 {
        self.formation_y
    }

    /// Formation slot as a gameplay-plane position
    pub fn home(&self) -> Vec3 {
        Vec3::new(self.formation_x, self.formation_y, 0.0)
    }

    /// Alive and not already claimed by a collision this tick
    pub fn is_targetable(&self) -> bool {
        !self.destroyed
    }
}

/// Power-up colours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Extends the chain
    Blue,
    /// Restores missing wings, breaks the chain
    Red,
}

/// A falling power-up capsule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: EntityId,
    pub kind: PowerUpKind,
    pub pos: Vec3,
    pub fall_speed: f32,
    /// Presentation-only pulse animation phase
    pub pulse: f32,
}

/// Top-level run flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameFlags {
    pub is_playing: bool,
    pub player_destroyed: bool,
    pub explosion_complete: bool,
}

impl Default for GameFlags {
    fn default() -> Self {
        Self {
            is_playing: true,
            player_destroyed: false,
            explosion_complete: false,
        }
    }
}

/// What a scene handle represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Bullet(BulletOwner),
    Enemy,
    PowerUp(PowerUpKind),
    Explosion,
}

/// Notifications for the presentation, audio and scene layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Fire-and-forget sound cue
    Sound(SoundEffect),
    /// Scene should create a visual for this handle
    Spawned {
        id: EntityId,
        kind: EntityKind,
        pos: Vec3,
    },
    /// Scene should drop the visual for this handle
    Despawned { id: EntityId },
    /// A Red power-up attached these wings
    WingsAdded { left: bool, right: bool },
    /// A wing was shot off
    WingLost(WingSide),
    /// Current Blue chain
    ChainChanged(u32),
    /// Every enemy of this formation column is gone (once per level)
    ColumnCleared { column: u32 },
    /// Fatal collision; the player ship is gone
    PlayerDestroyed,
    /// Game-over banner is up
    GameOverShown,
    /// Level-complete banner is up
    LevelCompleteShown,
    /// A fresh formation is on screen
    LevelStarted(u32),
}
