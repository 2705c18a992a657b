//! Explosion bookkeeping
//!
//! No particles: each explosion is a handle with a countdown. The only thing
//! the rest of the simulation cares about is when the player's explosion ends.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::state::{EntityId, EntityKind, GameEvent, IdAllocator};

/// What blew up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExplosionKind {
    Enemy,
    Wing,
    Player,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explosion {
    pub id: EntityId,
    pub kind: ExplosionKind,
    pub pos: Vec3,
    /// Ticks left before the effect is gone
    pub remaining: u32,
}

/// Result of advancing the effects by one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EffectsUpdate {
    pub finished: usize,
    pub player_explosion_completed: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Effects {
    explosions: Vec<Explosion>,
}

impl Effects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn explosions(&self) -> &[Explosion] {
        &self.explosions
    }

    pub fn len(&self) -> usize {
        self.explosions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.explosions.is_empty()
    }

    pub fn spawn(
        &mut self,
        kind: ExplosionKind,
        pos: Vec3,
        ticks: u32,
        ids: &mut IdAllocator,
        events: &mut Vec<GameEvent>,
    ) -> EntityId {
        let id = ids.next_id();
        self.explosions.push(Explosion {
            id,
            kind,
            pos,
            remaining: ticks.max(1),
        });
        events.push(GameEvent::Spawned {
            id,
            kind: EntityKind::Explosion,
            pos,
        });
        id
    }

    /// A player explosion is still playing
    pub fn player_explosion_pending(&self) -> bool {
        self.explosions
            .iter()
            .any(|e| e.kind == ExplosionKind::Player)
    }

    /// Count down every explosion and drop the finished ones
    pub fn update(&mut self, events: &mut Vec<GameEvent>) -> EffectsUpdate {
        let mut result = EffectsUpdate::default();
        self.explosions.retain_mut(|e| {
            e.remaining = e.remaining.saturating_sub(1);
            if e.remaining > 0 {
                return true;
            }
            result.finished += 1;
            if e.kind == ExplosionKind::Player {
                result.player_explosion_completed = true;
            }
            events.push(GameEvent::Despawned { id: e.id });
            false
        });
        result
    }

    pub fn clear_all(&mut self, events: &mut Vec<GameEvent>) {
        for explosion in self.explosions.drain(..) {
            events.push(GameEvent::Despawned { id: explosion.id });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explosion_counts_down() {
        let mut effects = Effects::new();
        let mut ids = IdAllocator::default();
        let mut events = Vec::new();
        let id = effects.spawn(ExplosionKind::Enemy, Vec3::ZERO, 3, &mut ids, &mut events);

        assert_eq!(effects.update(&mut events).finished, 0);
        assert_eq!(effects.update(&mut events).finished, 0);
        let done = effects.update(&mut events);
        assert_eq!(done.finished, 1);
        assert!(!done.player_explosion_completed);
        assert!(effects.is_empty());
        assert!(events.contains(&GameEvent::Despawned { id }));
    }

    #[test]
    fn test_player_explosion_completion_is_reported_once() {
        let mut effects = Effects::new();
        let mut ids = IdAllocator::default();
        let mut events = Vec::new();
        effects.spawn(ExplosionKind::Player, Vec3::ZERO, 2, &mut ids, &mut events);
        assert!(effects.player_explosion_pending());

        assert!(!effects.update(&mut events).player_explosion_completed);
        assert!(effects.update(&mut events).player_explosion_completed);
        assert!(!effects.player_explosion_pending());
        assert!(!effects.update(&mut events).player_explosion_completed);
    }

    #[test]
    fn test_zero_length_explosion_still_lasts_a_tick() {
        let mut effects = Effects::new();
        let mut ids = IdAllocator::default();
        let mut events = Vec::new();
        effects.spawn(ExplosionKind::Wing, Vec3::ZERO, 0, &mut ids, &mut events);
        assert_eq!(effects.len(), 1);
        assert_eq!(effects.update(&mut events).finished, 1);
    }

    #[test]
    fn test_clear_all() {
        let mut effects = Effects::new();
        let mut ids = IdAllocator::default();
        let mut events = Vec::new();
        effects.spawn(ExplosionKind::Player, Vec3::ZERO, 10, &mut ids, &mut events);
        effects.spawn(ExplosionKind::Enemy, Vec3::ONE, 10, &mut ids, &mut events);
        effects.clear_all(&mut events);
        assert!(effects.is_empty());
        assert!(!effects.player_explosion_pending());
    }
}
