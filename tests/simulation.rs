//! Whole-tick scenarios driven through the public `tick` entry point

use glam::Vec3;

use star_swoop::audio::SoundEffect;
use star_swoop::sim::{
    Bullet, BulletOwner, DiveCurve, Enemy, EnemyFleet, EnemyState, EntityId, EntityKind,
    GameEvent, PowerUpKind, TickInput, WingSide, World, tick,
};
use star_swoop::{RunSettings, Tuning};

/// Tuning that keeps the formation still and the sky empty unless a test
/// asks otherwise
fn quiet_tuning() -> Tuning {
    Tuning {
        first_dive_delay_ticks: u32::MAX,
        powerup_spawn_interval: u32::MAX,
        ..Default::default()
    }
}

fn world_with(tuning: Tuning, enemies: Vec<Enemy>) -> World {
    let mut world = World::new(RunSettings::default(), tuning);
    world.fleet = EnemyFleet::from_enemies(enemies);
    world.drain_events();
    world
}

/// An enemy pinned at `pos` (a dive whose curve is a single point)
fn parked(id: u32, column: u32, pos: Vec3) -> Enemy {
    let mut enemy = Enemy::new(EntityId(id), column, 0, (pos.x, 8.0), 0.8);
    enemy.pos = pos;
    enemy.state = EnemyState::Diving {
        curve: DiveCurve::new(pos, pos, pos),
        elapsed: 0,
        duration: 1_000_000,
    };
    enemy
}

fn count(events: &[GameEvent], wanted: &GameEvent) -> usize {
    events.iter().filter(|e| *e == wanted).count()
}

fn shoot() -> TickInput {
    TickInput {
        shoot: true,
        ..Default::default()
    }
}

fn push_bullet(world: &mut World, id: u32, owner: BulletOwner, x: f32, y: f32) {
    let Some(player) = world.player.as_mut() else {
        panic!("no player");
    };
    let bullet = Bullet {
        id: EntityId(id),
        pos: Vec3::new(x, y, 0.0),
        owner,
    };
    match owner {
        BulletOwner::Main => player.bullets.push(bullet),
        BulletOwner::Wing(_) => player.wing_bullets.push(bullet),
    }
}

#[test]
fn level_one_and_three_formation_sizes() {
    let world = World::new(RunSettings::default(), Tuning::default());
    assert_eq!(world.live_enemy_count(), 32);

    let settings = RunSettings {
        start_level: 3,
        ..Default::default()
    };
    let world = World::new(settings, Tuning::default());
    assert_eq!(world.live_enemy_count(), 36);
}

#[test]
fn level_transition_clears_before_repopulating() {
    let mut world = World::new(RunSettings::default(), quiet_tuning());
    tick(
        &mut world,
        &TickInput {
            shoot: true,
            spawn_powerup: true,
            ..Default::default()
        },
    );
    let mut events = world.drain_events();
    let before: Vec<EntityId> = events
        .iter()
        .filter_map(|e| match e {
            GameEvent::Spawned { id, .. } => Some(*id),
            _ => None,
        })
        .collect();
    assert!(!before.is_empty());

    world.next_level();
    events = world.drain_events();

    let first_spawn = events
        .iter()
        .position(|e| matches!(e, GameEvent::Spawned { .. }))
        .unwrap();
    for id in &before {
        let despawn = events
            .iter()
            .position(|e| *e == GameEvent::Despawned { id: *id })
            .unwrap_or_else(|| panic!("{id:?} never despawned"));
        assert!(despawn < first_spawn);
    }

    assert_eq!(world.level(), 2);
    assert_eq!(world.live_enemy_count(), 32);
    assert!(world.powerups.is_empty());
    assert!(world.effects.is_empty());
    assert!(world.player().is_some_and(|p| p.bullets.is_empty()));
    assert!(events.contains(&GameEvent::LevelStarted(2)));
}

#[test]
fn bullet_and_wing_bullet_on_same_enemy_kill_once() {
    // Main gun fires from x = 0, right wing gun from x = 0.9; both bullets
    // sit 0.45 from this enemy after their first step
    let target = Vec3::new(0.45, -7.9, 0.0);
    let mut world = world_with(
        quiet_tuning(),
        vec![parked(1000, 0, target), parked(1001, 5, Vec3::new(-8.0, 8.0, 0.0))],
    );
    if let Some(player) = world.player.as_mut() {
        player.attach_wing(WingSide::Left);
        player.attach_wing(WingSide::Right);
    }

    tick(&mut world, &shoot());
    let mut events = world.drain_events();
    for _ in 0..5 {
        tick(&mut world, &TickInput::default());
        events.extend(world.drain_events());
    }

    assert_eq!(count(&events, &GameEvent::Despawned { id: EntityId(1000) }), 1);
    assert_eq!(count(&events, &GameEvent::Sound(SoundEffect::Hit)), 1);
    assert_eq!(count(&events, &GameEvent::ColumnCleared { column: 0 }), 1);
    assert_eq!(world.live_enemy_count(), 1);
    // The wing bullet was not spent on the already-claimed enemy
    assert!(world.player().is_some_and(|p| p.wing_bullets.len() == 2));
    // One column drop, not two
    let spawned_powerups = events
        .iter()
        .filter(|e| {
            matches!(
                e,
                GameEvent::Spawned {
                    kind: EntityKind::PowerUp(_),
                    ..
                }
            )
        })
        .count();
    assert_eq!(spawned_powerups, 1);
}

#[test]
fn only_first_bullet_match_resolves_per_tick() {
    let mut world = world_with(
        quiet_tuning(),
        vec![
            parked(1000, 0, Vec3::new(-3.0, 0.0, 0.0)),
            parked(1001, 1, Vec3::new(3.0, 0.0, 0.0)),
            parked(1002, 2, Vec3::new(-8.0, 8.0, 0.0)),
        ],
    );
    for (id, x) in [(2000, -3.0), (2001, 3.0)] {
        push_bullet(&mut world, id, BulletOwner::Main, x, -0.5);
    }

    tick(&mut world, &TickInput::default());
    assert_eq!(world.live_enemy_count(), 2);

    tick(&mut world, &TickInput::default());
    assert_eq!(world.live_enemy_count(), 1);
}

#[test]
fn shooting_one_enemy_does_not_shield_the_ship_from_another() {
    // Both enemies touch the ship; the bullet (after its 0.5 step) only
    // overlaps the first. The column drop lands on the ship, keep it Blue.
    let tuning = Tuning {
        red_powerup_chance: 0.0,
        ..quiet_tuning()
    };
    let mut world = world_with(
        tuning,
        vec![
            parked(1000, 0, Vec3::new(0.0, -9.0, 0.0)),
            parked(1001, 1, Vec3::new(0.8, -9.0, 0.0)),
            parked(1002, 2, Vec3::new(-8.0, 8.0, 0.0)),
        ],
    );
    push_bullet(&mut world, 2000, BulletOwner::Main, -0.3, -9.5);

    tick(&mut world, &TickInput::default());
    let events = world.drain_events();

    assert_eq!(count(&events, &GameEvent::Despawned { id: EntityId(1000) }), 1);
    assert!(events.contains(&GameEvent::PlayerDestroyed));
    assert!(world.player().is_none());
    assert!(world.flags().player_destroyed);
}

#[test]
fn wing_bullet_takes_a_different_enemy_after_main_gun_kill() {
    // Listed so the newest-first scan prefers 1000 for both bullets
    let mut world = world_with(
        quiet_tuning(),
        vec![
            parked(1001, 1, Vec3::new(-2.5, 0.0, 0.0)),
            parked(1000, 0, Vec3::new(-3.0, 0.0, 0.0)),
            parked(1002, 2, Vec3::new(-8.0, 8.0, 0.0)),
        ],
    );
    push_bullet(&mut world, 2000, BulletOwner::Main, -3.2, -0.5);
    push_bullet(&mut world, 2001, BulletOwner::Wing(WingSide::Left), -2.8, -0.5);

    tick(&mut world, &TickInput::default());
    let events = world.drain_events();

    assert_eq!(count(&events, &GameEvent::Despawned { id: EntityId(1000) }), 1);
    assert_eq!(count(&events, &GameEvent::Despawned { id: EntityId(1001) }), 1);
    assert_eq!(count(&events, &GameEvent::Sound(SoundEffect::Hit)), 2);
    assert_eq!(world.live_enemy_count(), 1);
    assert!(
        world
            .player()
            .is_some_and(|p| p.bullets.is_empty() && p.wing_bullets.is_empty())
    );
}

#[test]
fn red_powerup_with_both_wings_adds_nothing() {
    let mut world = world_with(
        quiet_tuning(),
        vec![parked(1000, 0, Vec3::new(-8.0, 8.0, 0.0))],
    );
    let player_pos = {
        let player = world.player.as_mut().unwrap();
        player.attach_wing(WingSide::Left);
        player.attach_wing(WingSide::Right);
        player.pos
    };
    let tuning = world.tuning.clone();
    world
        .powerups
        .spawn_at(PowerUpKind::Red, player_pos, &tuning, &mut world.ids, &mut world.events);
    world.drain_events();

    tick(&mut world, &TickInput::default());
    let events = world.drain_events();

    assert!(events.contains(&GameEvent::WingsAdded {
        left: false,
        right: false
    }));
    assert!(events.contains(&GameEvent::Sound(SoundEffect::PowerUpCollected)));
    assert_eq!(world.chain(), 0);
    assert!(world.player().is_some_and(|p| p.has_both_wings()));
}

#[test]
fn blue_pickups_build_a_chain() {
    let mut world = world_with(
        quiet_tuning(),
        vec![parked(1000, 0, Vec3::new(-8.0, 8.0, 0.0))],
    );
    let tuning = world.tuning.clone();
    for expected in 1..=3 {
        let pos = world.player().unwrap().pos;
        world
            .powerups
            .spawn_at(PowerUpKind::Blue, pos, &tuning, &mut world.ids, &mut world.events);
        tick(&mut world, &TickInput::default());
        assert!(world.drain_events().contains(&GameEvent::ChainChanged(expected)));
    }
    assert_eq!(world.chain(), 3);
}

#[test]
fn periodic_drop_with_both_wings_is_blue() {
    let tuning = Tuning {
        powerup_spawn_interval: 5,
        red_powerup_chance: 1.0,
        ..quiet_tuning()
    };
    let mut world = world_with(tuning, vec![parked(1000, 0, Vec3::new(-8.0, 8.0, 0.0))]);
    if let Some(player) = world.player.as_mut() {
        player.attach_wing(WingSide::Left);
        player.attach_wing(WingSide::Right);
    }

    for _ in 0..50 {
        tick(&mut world, &TickInput::default());
    }
    assert!(!world.powerups.is_empty());
    assert!(
        world
            .powerups
            .powerups()
            .iter()
            .all(|p| p.kind == PowerUpKind::Blue)
    );
}

#[test]
fn death_shows_game_over_once_then_restarts() {
    let mut world = world_with(
        quiet_tuning(),
        vec![parked(1000, 0, Vec3::new(0.0, -9.0, 0.0))],
    );

    tick(&mut world, &TickInput::default());
    let mut events = world.drain_events();
    assert!(events.contains(&GameEvent::PlayerDestroyed));
    assert!(world.player().is_none());
    assert!(!world.flags().is_playing);

    for _ in 0..400 {
        tick(&mut world, &TickInput::default());
        events.extend(world.drain_events());
    }
    assert_eq!(count(&events, &GameEvent::GameOverShown), 1);
    assert_eq!(count(&events, &GameEvent::Sound(SoundEffect::GameOver)), 1);
    assert!(world.flags().explosion_complete);
    assert!(world.flow.game_over().is_finished());

    tick(&mut world, &shoot());
    let events = world.drain_events();
    assert!(events.contains(&GameEvent::LevelStarted(1)));
    assert!(world.player().is_some());
    assert!(world.flags().is_playing);
    assert!(!world.flags().player_destroyed);
    assert_eq!(world.live_enemy_count(), 32);
    assert!(world.flow.game_over().is_hidden());
}

#[test]
fn invulnerable_player_survives_contact() {
    let settings = RunSettings {
        invulnerable: true,
        ..Default::default()
    };
    let mut world = World::new(settings, quiet_tuning());
    world.fleet = EnemyFleet::from_enemies(vec![parked(1000, 0, Vec3::new(0.0, -9.0, 0.0))]);

    for _ in 0..10 {
        tick(&mut world, &TickInput::default());
    }
    assert!(world.player().is_some());
    assert!(world.is_invulnerable());
    assert!(!world.drain_events().contains(&GameEvent::PlayerDestroyed));
}

#[test]
fn clearing_the_formation_advances_the_level() {
    let tuning = Tuning {
        level_complete_ticks: 10,
        ..quiet_tuning()
    };
    let target = Vec3::new(0.0, -7.9, 0.0);
    let mut world = world_with(tuning, vec![parked(1000, 0, target)]);

    tick(&mut world, &shoot());
    let mut events = world.drain_events();
    assert_eq!(world.live_enemy_count(), 0);
    assert!(events.contains(&GameEvent::LevelCompleteShown));

    for _ in 0..10 {
        tick(&mut world, &TickInput::default());
        events.extend(world.drain_events());
    }
    assert_eq!(world.level(), 2);
    assert_eq!(world.live_enemy_count(), 32);
    assert_eq!(count(&events, &GameEvent::LevelCompleteShown), 1);
    assert!(events.contains(&GameEvent::LevelStarted(2)));
}

#[test]
fn demo_pilot_runs_deterministically() {
    let settings = RunSettings {
        seed: 42,
        ..Default::default()
    };
    let input = TickInput {
        idle_mode: true,
        ..Default::default()
    };
    let mut a = World::new(settings.clone(), Tuning::default());
    let mut b = World::new(settings, Tuning::default());
    for _ in 0..3000 {
        tick(&mut a, &input);
        tick(&mut b, &input);
        assert_eq!(a.drain_events(), b.drain_events());
    }
    assert_eq!(a.level(), b.level());
    assert_eq!(a.live_enemy_count(), b.live_enemy_count());
}
