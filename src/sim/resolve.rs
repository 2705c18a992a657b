//! Collision resolution
//!
//! Runs one tick's collision steps in a fixed order:
//!
//! 1. main-gun bullet / enemy
//! 2. wing-gun bullet / enemy
//! 3. power-up pickup
//! 4. wing / enemy (left, then right)
//! 5. player / enemy (fatal, ends resolution)
//!
//! Each step detects against the fleet left by the steps before it, so an
//! enemy destroyed earlier in the tick is never matched again and a later
//! step is free to find a different enemy. Every enemy step still goes
//! through [`super::enemies::EnemyFleet::mark_destroyed`] before removal.

use super::collision::{self, BulletHit, WingHit};
use super::effects::ExplosionKind;
use super::enemies::Removal;
use super::powerups::PowerUpField;
use super::state::{EntityId, GameEvent, PowerUpKind, WingSide};
use super::tick::World;
use crate::audio::SoundEffect;

/// Which bullet list a hit came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gun {
    Main,
    Wing,
}

/// Summary of what resolution did this tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolveOutcome {
    pub enemies_destroyed: u32,
    /// Kind of the power-up picked up, if any (the chain is updated by the caller)
    pub collected: Option<PowerUpKind>,
    /// Wings attached by a Red pickup
    pub wings_added: Vec<WingSide>,
    pub wings_lost: Vec<WingSide>,
    pub fatal: bool,
}

/// Detect and apply this tick's collisions
pub fn resolve(world: &mut World) -> ResolveOutcome {
    let mut outcome = ResolveOutcome::default();

    for gun in [Gun::Main, Gun::Wing] {
        if let Some(hit) = bullet_hit(world, gun) {
            resolve_bullet_hit(world, hit, gun, &mut outcome);
        }
    }
    if let Some(id) = pickup(world) {
        resolve_pickup(world, id, &mut outcome);
    }
    for side in WingSide::BOTH {
        if let Some(hit) = wing_hit(world, side) {
            resolve_wing_hit(world, hit, &mut outcome);
        }
    }
    if let Some(enemy) = player_hit(world) {
        outcome.fatal = resolve_player_hit(world, enemy);
    }

    outcome
}

fn bullet_hit(world: &World, gun: Gun) -> Option<BulletHit> {
    let player = world.player.as_ref()?;
    let bullets = match gun {
        Gun::Main => &player.bullets,
        Gun::Wing => &player.wing_bullets,
    };
    collision::bullet_enemy_hit(bullets, world.fleet.enemies(), world.tuning.bullet_hit_radius)
}

fn pickup(world: &World) -> Option<EntityId> {
    let player = world.player.as_ref()?;
    collision::player_powerup_hit(
        player.pos,
        world.powerups.powerups(),
        world.tuning.powerup_pickup_radius,
    )
}

fn wing_hit(world: &World, side: WingSide) -> Option<WingHit> {
    let player = world.player.as_ref()?;
    collision::wing_enemy_hit(player, side, world.fleet.enemies(), world.tuning.wing_hit_radius)
}

fn player_hit(world: &World) -> Option<EntityId> {
    let player = world.player.as_ref()?;
    collision::player_enemy_hit(player.pos, world.fleet.enemies(), world.tuning.player_hit_radius)
}

fn resolve_bullet_hit(world: &mut World, hit: BulletHit, gun: Gun, outcome: &mut ResolveOutcome) {
    if !world.fleet.mark_destroyed(hit.enemy) {
        return;
    }
    if let Some(player) = world.player.as_mut() {
        match gun {
            Gun::Main => player.remove_bullet(hit.bullet, &mut world.events),
            Gun::Wing => player.remove_wing_bullet(hit.bullet, &mut world.events),
        };
    }
    if let Some(removal) = remove_enemy(world, hit.enemy) {
        let ticks = world.tuning.explosion_ticks;
        world.effects.spawn(
            ExplosionKind::Enemy,
            removal.enemy.pos,
            ticks,
            &mut world.ids,
            &mut world.events,
        );
    }
    world.events.push(GameEvent::Sound(SoundEffect::Hit));
    outcome.enemies_destroyed += 1;
}

fn resolve_pickup(world: &mut World, id: EntityId, outcome: &mut ResolveOutcome) {
    let Some(powerup) = world.powerups.take(id, &mut world.events) else {
        return;
    };
    if powerup.kind == PowerUpKind::Red {
        if let Some(player) = world.player.as_mut() {
            // Each side attaches independently, only if missing
            outcome.wings_added = WingSide::BOTH
                .into_iter()
                .filter(|&side| player.attach_wing(side))
                .collect();
        }
        world.events.push(GameEvent::WingsAdded {
            left: outcome.wings_added.contains(&WingSide::Left),
            right: outcome.wings_added.contains(&WingSide::Right),
        });
    }
    world.events.push(GameEvent::Sound(SoundEffect::PowerUpCollected));
    outcome.collected = Some(powerup.kind);
}

fn resolve_wing_hit(world: &mut World, hit: WingHit, outcome: &mut ResolveOutcome) {
    if !world.fleet.mark_destroyed(hit.enemy) {
        return;
    }
    let ticks = world.tuning.explosion_ticks;
    world
        .effects
        .spawn(ExplosionKind::Wing, hit.wing_pos, ticks, &mut world.ids, &mut world.events);
    remove_enemy(world, hit.enemy);
    if let Some(player) = world.player.as_mut() {
        player.detach_wing(hit.side);
    }
    world.events.push(GameEvent::WingLost(hit.side));
    world.events.push(GameEvent::Sound(SoundEffect::Explosion));
    outcome.enemies_destroyed += 1;
    outcome.wings_lost.push(hit.side);
}

/// Returns true if the hit was fatal
fn resolve_player_hit(world: &mut World, enemy: EntityId) -> bool {
    if !world.player.as_ref().is_some_and(|p| !p.invulnerable) {
        return false;
    }
    let Some(mut player) = world.player.take() else {
        return false;
    };
    player.clear_all(&mut world.events);
    let ticks = world.tuning.explosion_ticks;
    world
        .effects
        .spawn(ExplosionKind::Player, player.pos, ticks, &mut world.ids, &mut world.events);

    world.flags.player_destroyed = true;
    world.flags.is_playing = false;
    world.flags.explosion_complete = false;
    world.events.push(GameEvent::PlayerDestroyed);
    world.events.push(GameEvent::Sound(SoundEffect::Explosion));
    log::info!("Player destroyed by {:?} on level {}", enemy, world.level);
    true
}

/// Remove an already-marked enemy; a column's last enemy drops a power-up
/// where it died
fn remove_enemy(world: &mut World, id: EntityId) -> Option<Removal> {
    let removal = world.fleet.remove(id, &mut world.events)?;
    if removal.last_in_column {
        let wings_full = world.player.as_ref().is_some_and(|p| p.has_both_wings());
        let kind = PowerUpField::choose_kind(wings_full, &world.tuning, &mut world.rng);
        world.powerups.spawn_at(
            kind,
            removal.enemy.pos,
            &world.tuning,
            &mut world.ids,
            &mut world.events,
        );
        log::debug!("Column {} cleared", removal.enemy.column);
    }
    Some(removal)
}
