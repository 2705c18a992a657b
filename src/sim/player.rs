//! The player ship, its guns and its wings

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::state::{Bullet, BulletOwner, EntityId, EntityKind, GameEvent, IdAllocator, WingSide};
use super::tick::TickInput;
use crate::audio::SoundEffect;
use crate::consts::*;
use crate::tuning::Tuning;

/// Player ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec3,
    /// Movement applied last tick (used by predictive dives)
    pub velocity: Vec3,
    pub bullets: Vec<Bullet>,
    pub wing_bullets: Vec<Bullet>,
    left_wing: bool,
    right_wing: bool,
    pub invulnerable: bool,
    /// Tick at which the guns are ready again
    next_shot_tick: u64,
}

impl Player {
    pub fn new(invulnerable: bool) -> Self {
        Self {
            pos: Vec3::new(0.0, PLAYER_START_Y, 0.0),
            velocity: Vec3::ZERO,
            bullets: Vec::new(),
            wing_bullets: Vec::new(),
            left_wing: false,
            right_wing: false,
            invulnerable,
            next_shot_tick: 0,
        }
    }

    /// Back to the start position (level start)
    pub fn reposition(&mut self) {
        self.pos = Vec3::new(0.0, PLAYER_START_Y, 0.0);
        self.velocity = Vec3::ZERO;
    }

    pub fn has_wing(&self, side: WingSide) -> bool {
        match side {
            WingSide::Left => self.left_wing,
            WingSide::Right => self.right_wing,
        }
    }

    pub fn has_both_wings(&self) -> bool {
        self.left_wing && self.right_wing
    }

    /// Attach a wing if it is missing; returns whether it was added
    pub fn attach_wing(&mut self, side: WingSide) -> bool {
        let slot = self.wing_slot(side);
        let added = !*slot;
        *slot = true;
        added
    }

    /// Detach a wing; returns whether one was there
    pub fn detach_wing(&mut self, side: WingSide) -> bool {
        std::mem::replace(self.wing_slot(side), false)
    }

    fn wing_slot(&mut self, side: WingSide) -> &mut bool {
        match side {
            WingSide::Left => &mut self.left_wing,
            WingSide::Right => &mut self.right_wing,
        }
    }

    /// World position of a wing segment
    pub fn wing_position(&self, side: WingSide) -> Vec3 {
        self.pos + Vec3::new(side.sign() * WING_OFFSET_X, 0.0, 0.0)
    }

    /// Attached wings with their world positions
    pub fn attached_wings(&self) -> Vec<(WingSide, Vec3)> {
        WingSide::BOTH
            .into_iter()
            .filter(|&side| self.has_wing(side))
            .map(|side| (side, self.wing_position(side)))
            .collect()
    }

    pub fn can_shoot(&self, now: u64) -> bool {
        now >= self.next_shot_tick
    }

    /// Move, shoot and fly bullets for one tick
    pub fn update(
        &mut self,
        input: &TickInput,
        now: u64,
        tuning: &Tuning,
        ids: &mut IdAllocator,
        events: &mut Vec<GameEvent>,
    ) {
        let mut dx = 0.0;
        if input.move_left {
            dx -= PLAYER_SPEED;
        }
        if input.move_right {
            dx += PLAYER_SPEED;
        }
        let old_x = self.pos.x;
        self.pos.x = (self.pos.x + dx).clamp(-PLAYER_MAX_X, PLAYER_MAX_X);
        self.velocity = Vec3::new(self.pos.x - old_x, 0.0, 0.0);

        if input.shoot && self.can_shoot(now) {
            self.shoot(ids, events);
            self.next_shot_tick = now.saturating_add(tuning.shoot_cooldown_ticks);
        }

        for bullet in self.bullets.iter_mut().chain(self.wing_bullets.iter_mut()) {
            bullet.pos.y += BULLET_SPEED;
        }
        cull_offscreen(&mut self.bullets, events);
        cull_offscreen(&mut self.wing_bullets, events);
    }

    fn shoot(&mut self, ids: &mut IdAllocator, events: &mut Vec<GameEvent>) {
        let muzzle = Vec3::new(0.0, MUZZLE_OFFSET_Y, 0.0);
        let bullet = spawn_bullet(ids, self.pos + muzzle, BulletOwner::Main, events);
        self.bullets.push(bullet);

        for (side, wing_pos) in self.attached_wings() {
            let bullet = spawn_bullet(ids, wing_pos + muzzle, BulletOwner::Wing(side), events);
            self.wing_bullets.push(bullet);
        }
        events.push(GameEvent::Sound(SoundEffect::Shoot));
    }

    /// Drop a main-gun bullet after a hit
    pub fn remove_bullet(&mut self, id: EntityId, events: &mut Vec<GameEvent>) -> bool {
        remove_by_id(&mut self.bullets, id, events)
    }

    /// Drop a wing-gun bullet after a hit
    pub fn remove_wing_bullet(&mut self, id: EntityId, events: &mut Vec<GameEvent>) -> bool {
        remove_by_id(&mut self.wing_bullets, id, events)
    }

    /// Drop every bullet in flight
    pub fn clear_all(&mut self, events: &mut Vec<GameEvent>) {
        for bullet in self.bullets.drain(..).chain(self.wing_bullets.drain(..)) {
            events.push(GameEvent::Despawned { id: bullet.id });
        }
    }
}

fn spawn_bullet(
    ids: &mut IdAllocator,
    pos: Vec3,
    owner: BulletOwner,
    events: &mut Vec<GameEvent>,
) -> Bullet {
    let bullet = Bullet {
        id: ids.next_id(),
        pos,
        owner,
    };
    events.push(GameEvent::Spawned {
        id: bullet.id,
        kind: EntityKind::Bullet(owner),
        pos,
    });
    bullet
}

fn cull_offscreen(bullets: &mut Vec<Bullet>, events: &mut Vec<GameEvent>) {
    bullets.retain(|b| {
        let keep = b.pos.y <= PLAY_TOP;
        if !keep {
            events.push(GameEvent::Despawned { id: b.id });
        }
        keep
    });
}

fn remove_by_id(bullets: &mut Vec<Bullet>, id: EntityId, events: &mut Vec<GameEvent>) -> bool {
    match bullets.iter().position(|b| b.id == id) {
        Some(idx) => {
            bullets.remove(idx);
            events.push(GameEvent::Despawned { id });
            true
        }
        None => false,
    }
}
