//! Collision detection
//!
//! Pure functions over the current snapshots. Nothing here mutates;
//! [`super::resolve`] calls each check against the fleet as it stands after
//! the previous step's removals.

use glam::Vec3;

use super::player::Player;
use super::state::{Bullet, Enemy, EntityId, PowerUp, WingSide};
use crate::distance;

/// A bullet overlapping an enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulletHit {
    pub bullet: EntityId,
    pub enemy: EntityId,
}

/// An attached wing overlapping an enemy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WingHit {
    pub side: WingSide,
    pub enemy: EntityId,
    /// Wing world position at detection time (explosion spawns here)
    pub wing_pos: Vec3,
}

/// First bullet/enemy overlap, scanning both lists newest-first.
///
/// Stops at the first match: at most one kill per bullet list per tick.
pub fn bullet_enemy_hit(bullets: &[Bullet], enemies: &[Enemy], radius: f32) -> Option<BulletHit> {
    bullets.iter().rev().find_map(|bullet| {
        enemies
            .iter()
            .rev()
            .filter(|e| e.is_targetable())
            .find(|e| distance(bullet.pos, e.pos) < radius)
            .map(|e| BulletHit {
                bullet: bullet.id,
                enemy: e.id,
            })
    })
}

/// First enemy touching the ship
pub fn player_enemy_hit(player_pos: Vec3, enemies: &[Enemy], radius: f32) -> Option<EntityId> {
    enemies
        .iter()
        .filter(|e| e.is_targetable())
        .find(|e| distance(player_pos, e.pos) < radius)
        .map(|e| e.id)
}

/// First power-up within pickup range
pub fn player_powerup_hit(player_pos: Vec3, powerups: &[PowerUp], radius: f32) -> Option<EntityId> {
    powerups
        .iter()
        .find(|p| distance(player_pos, p.pos) < radius)
        .map(|p| p.id)
}

/// First enemy touching the wing on `side`, if that wing is attached
pub fn wing_enemy_hit(
    player: &Player,
    side: WingSide,
    enemies: &[Enemy],
    radius: f32,
) -> Option<WingHit> {
    if !player.has_wing(side) {
        return None;
    }
    let wing_pos = player.wing_position(side);
    enemies
        .iter()
        .filter(|e| e.is_targetable())
        .find(|e| distance(wing_pos, e.pos) < radius)
        .map(|e| WingHit {
            side,
            enemy: e.id,
            wing_pos,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{BulletOwner, PowerUpKind};

    fn enemy(id: u32, x: f32, y: f32) -> Enemy {
        Enemy::new(EntityId(id), id, 0, (x, y), 0.8)
    }

    fn bullet(id: u32, x: f32, y: f32) -> Bullet {
        Bullet {
            id: EntityId(id),
            pos: Vec3::new(x, y, 0.0),
            owner: BulletOwner::Main,
        }
    }

    #[test]
    fn test_bullet_hit_and_miss() {
        let enemies = vec![enemy(1, 0.0, 5.0)];
        let hit = bullet_enemy_hit(&[bullet(10, 0.2, 5.0)], &enemies, 0.6);
        assert_eq!(
            hit,
            Some(BulletHit {
                bullet: EntityId(10),
                enemy: EntityId(1)
            })
        );
        assert!(bullet_enemy_hit(&[bullet(10, 3.0, 5.0)], &enemies, 0.6).is_none());
    }

    #[test]
    fn test_bullet_scan_is_newest_first_and_stops() {
        // Two bullets each overlapping a different enemy: only the newest pair is reported
        let enemies = vec![enemy(1, 0.0, 5.0), enemy(2, 4.0, 5.0)];
        let bullets = vec![bullet(10, 0.0, 5.0), bullet(11, 4.0, 5.0)];
        let hit = bullet_enemy_hit(&bullets, &enemies, 0.6);
        assert_eq!(
            hit,
            Some(BulletHit {
                bullet: EntityId(11),
                enemy: EntityId(2)
            })
        );
    }

    #[test]
    fn test_destroyed_enemies_are_ignored() {
        let mut target = enemy(1, 0.0, 5.0);
        target.destroyed = true;
        let enemies = vec![target];
        assert!(bullet_enemy_hit(&[bullet(10, 0.0, 5.0)], &enemies, 0.6).is_none());
        assert!(player_enemy_hit(Vec3::new(0.0, 5.0, 0.0), &enemies, 0.9).is_none());
    }

    #[test]
    fn test_z_is_part_of_distance() {
        let mut target = enemy(1, 0.0, 5.0);
        target.pos.z = 1.0;
        assert!(bullet_enemy_hit(&[bullet(10, 0.0, 5.0)], &[target], 0.6).is_none());
    }

    #[test]
    fn test_powerup_pickup() {
        let powerups = vec![PowerUp {
            id: EntityId(7),
            kind: PowerUpKind::Blue,
            pos: Vec3::new(0.5, -9.0, 0.0),
            fall_speed: 0.05,
            pulse: 0.0,
        }];
        assert_eq!(
            player_powerup_hit(Vec3::new(0.0, -9.0, 0.0), &powerups, 0.9),
            Some(EntityId(7))
        );
        assert!(player_powerup_hit(Vec3::new(5.0, -9.0, 0.0), &powerups, 0.9).is_none());
    }

    #[test]
    fn test_wing_hit_needs_attached_wing() {
        let mut player = Player::new(false);
        let wing = player.wing_position(WingSide::Right);
        let enemies = vec![enemy(1, wing.x, wing.y)];
        assert!(wing_enemy_hit(&player, WingSide::Right, &enemies, 0.6).is_none());

        player.attach_wing(WingSide::Right);
        let hit = wing_enemy_hit(&player, WingSide::Right, &enemies, 0.6);
        assert_eq!(
            hit,
            Some(WingHit {
                side: WingSide::Right,
                enemy: EntityId(1),
                wing_pos: wing
            })
        );
        assert!(wing_enemy_hit(&player, WingSide::Left, &enemies, 0.6).is_none());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_reported_hit_is_within_radius(
                bullets in prop::collection::vec((-10.0f32..10.0, -12.0f32..12.0), 0..8),
                enemies in prop::collection::vec((-10.0f32..10.0, -12.0f32..12.0), 0..8),
            ) {
                let bullets: Vec<Bullet> = bullets
                    .into_iter()
                    .enumerate()
                    .map(|(i, (x, y))| bullet(100 + i as u32, x, y))
                    .collect();
                let enemies: Vec<Enemy> = enemies
                    .into_iter()
                    .enumerate()
                    .map(|(i, (x, y))| enemy(i as u32, x, y))
                    .collect();
                if let Some(hit) = bullet_enemy_hit(&bullets, &enemies, 0.6) {
                    let b = bullets.iter().find(|b| b.id == hit.bullet).unwrap();
                    let e = enemies.iter().find(|e| e.id == hit.enemy).unwrap();
                    prop_assert!(distance(b.pos, e.pos) < 0.6);
                }
            }
        }
    }
}
