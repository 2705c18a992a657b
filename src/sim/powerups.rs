//! Power-up drops and the Blue chain

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{EntityId, EntityKind, GameEvent, IdAllocator, PowerUp, PowerUpKind};
use crate::consts::*;
use crate::tuning::Tuning;

const PULSE_SPEED: f32 = 0.1;
/// Keep periodic drops away from the side walls
const DROP_MARGIN: f32 = 1.0;

/// What the field needs to know from the rest of the world this tick
#[derive(Debug, Clone, Copy, Default)]
pub struct DropContext {
    /// Periodic drops only run while playing
    pub playing: bool,
    /// Player currently has both wings attached
    pub wings_full: bool,
}

/// All falling power-ups plus the spawn timer and chain count
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PowerUpField {
    powerups: Vec<PowerUp>,
    spawn_timer: u32,
    chain: u32,
}

impl PowerUpField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn powerups(&self) -> &[PowerUp] {
        &self.powerups
    }

    pub fn len(&self) -> usize {
        self.powerups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.powerups.is_empty()
    }

    pub fn chain(&self) -> u32 {
        self.chain
    }

    pub fn spawn_timer(&self) -> u32 {
        self.spawn_timer
    }

    /// Kind of the next periodic drop.
    ///
    /// A full set of wings makes Red useless, so it is always Blue then.
    pub fn choose_kind<R: Rng>(wings_full: bool, tuning: &Tuning, rng: &mut R) -> PowerUpKind {
        if !wings_full && rng.random_bool(tuning.red_powerup_chance) {
            PowerUpKind::Red
        } else {
            PowerUpKind::Blue
        }
    }

    /// Advance the spawn timer, drop capsules and cull the ones that fell out
    pub fn update<R: Rng>(
        &mut self,
        ctx: DropContext,
        tuning: &Tuning,
        rng: &mut R,
        ids: &mut IdAllocator,
        events: &mut Vec<GameEvent>,
    ) {
        if ctx.playing {
            self.spawn_timer += 1;
            if self.spawn_timer >= tuning.powerup_spawn_interval {
                self.spawn_timer = 0;
                let kind = Self::choose_kind(ctx.wings_full, tuning, rng);
                self.spawn_from_top(kind, tuning, rng, ids, events);
            }
        }

        for powerup in &mut self.powerups {
            powerup.pos.y -= powerup.fall_speed;
            powerup.pulse = (powerup.pulse + PULSE_SPEED) % std::f32::consts::TAU;
        }

        self.powerups.retain(|p| {
            let keep = p.pos.y >= PLAY_BOTTOM;
            if !keep {
                events.push(GameEvent::Despawned { id: p.id });
            }
            keep
        });
    }

    /// Drop a capsule from a random point along the top edge
    pub fn spawn_from_top<R: Rng>(
        &mut self,
        kind: PowerUpKind,
        tuning: &Tuning,
        rng: &mut R,
        ids: &mut IdAllocator,
        events: &mut Vec<GameEvent>,
    ) -> EntityId {
        let reach = PLAY_HALF_WIDTH - DROP_MARGIN;
        let x = rng.random_range(-reach..=reach);
        self.spawn_at(kind, Vec3::new(x, PLAY_TOP, 0.0), tuning, ids, events)
    }

    /// Drop a capsule at an exact position (column clears)
    pub fn spawn_at(
        &mut self,
        kind: PowerUpKind,
        pos: Vec3,
        tuning: &Tuning,
        ids: &mut IdAllocator,
        events: &mut Vec<GameEvent>,
    ) -> EntityId {
        let id = ids.next_id();
        self.powerups.push(PowerUp {
            id,
            kind,
            pos,
            fall_speed: tuning.powerup_fall_speed,
            pulse: 0.0,
        });
        events.push(GameEvent::Spawned {
            id,
            kind: EntityKind::PowerUp(kind),
            pos,
        });
        log::debug!("{:?} power-up {} at ({:.2}, {:.2})", kind, id.0, pos.x, pos.y);
        id
    }

    /// Remove a collected capsule
    pub fn take(&mut self, id: EntityId, events: &mut Vec<GameEvent>) -> Option<PowerUp> {
        let idx = self.powerups.iter().position(|p| p.id == id)?;
        events.push(GameEvent::Despawned { id });
        Some(self.powerups.remove(idx))
    }

    /// Update the chain for a collection; returns the new chain
    pub fn record_collected(&mut self, kind: PowerUpKind) -> u32 {
        self.chain = match kind {
            PowerUpKind::Blue => self.chain + 1,
            PowerUpKind::Red => 0,
        };
        self.chain
    }

    pub fn reset_chain(&mut self) {
        self.chain = 0;
    }

    /// Drop every capsule and restart the spawn timer
    pub fn clear_all(&mut self, events: &mut Vec<GameEvent>) {
        for powerup in self.powerups.drain(..) {
            events.push(GameEvent::Despawned { id: powerup.id });
        }
        self.spawn_timer = 0;
    }
}
