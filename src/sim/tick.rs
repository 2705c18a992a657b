//! Fixed timestep simulation tick
//!
//! Core game loop that advances the world deterministically, one frame per
//! call, in this order: input, player, enemies, power-ups, effects, collision
//! detection, collision resolution, state machine, level/restart action.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::curve::DiveTarget;
use super::effects::Effects;
use super::enemies::{EnemyFleet, FleetContext};
use super::flow::{FlowAction, FlowInput, LevelFlow};
use super::player::Player;
use super::powerups::{DropContext, PowerUpField};
use super::resolve::resolve;
use super::state::{GameEvent, GameFlags, IdAllocator, PowerUpKind};
use crate::consts::*;
use crate::settings::{RunSettings, clamp_level};
use crate::tuning::Tuning;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub move_left: bool,
    pub move_right: bool,
    /// Fire (also confirms restart on the game-over banner)
    pub shoot: bool,
    /// Debug: drop a Blue power-up
    pub spawn_powerup: bool,
    /// Debug: drop a Red power-up
    pub spawn_red_powerup: bool,
    /// Restart confirmation
    pub confirm: bool,
    /// Debug: flip invulnerability
    pub toggle_invulnerable: bool,
    /// Idle/demo mode - AI plays the game
    pub idle_mode: bool,
}

/// All mutable run state, owned by the frame driver
#[derive(Debug, Clone)]
pub struct World {
    pub settings: RunSettings,
    pub tuning: Tuning,
    /// Ticks since the run started
    pub time_ticks: u64,
    pub level: u32,
    /// `None` between a fatal hit and the restart
    pub player: Option<Player>,
    pub fleet: EnemyFleet,
    pub powerups: PowerUpField,
    pub effects: Effects,
    pub flow: LevelFlow,
    pub flags: GameFlags,
    pub invulnerable: bool,
    pub rng: Pcg32,
    pub ids: IdAllocator,
    /// Pending notifications, drained by the caller
    pub events: Vec<GameEvent>,
}

impl World {
    pub fn new(settings: RunSettings, mut tuning: Tuning) -> Self {
        tuning.sanitize();
        let mut world = Self {
            level: clamp_level(settings.start_level),
            invulnerable: settings.invulnerable,
            player: Some(Player::new(settings.invulnerable)),
            rng: Pcg32::seed_from_u64(settings.seed),
            settings,
            tuning,
            time_ticks: 0,
            fleet: EnemyFleet::new(),
            powerups: PowerUpField::new(),
            effects: Effects::new(),
            flow: LevelFlow::new(),
            flags: GameFlags::default(),
            ids: IdAllocator::default(),
            events: Vec::new(),
        };
        world.populate();
        world
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn flags(&self) -> GameFlags {
        self.flags
    }

    pub fn live_enemy_count(&self) -> usize {
        self.fleet.live_count()
    }

    pub fn chain(&self) -> u32 {
        self.powerups.chain()
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable
    }

    pub fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }

    /// Take every event produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn set_invulnerable(&mut self, on: bool) {
        self.invulnerable = on;
        if let Some(player) = self.player.as_mut() {
            player.invulnerable = on;
        }
        log::info!("Invulnerability {}", if on { "on" } else { "off" });
    }

    /// Advance to the next level (capped at the last one)
    pub fn next_level(&mut self) {
        self.level = (self.level + 1).min(MAX_LEVEL);
        self.clear_transients();
        if let Some(player) = self.player.as_mut() {
            player.reposition();
        }
        self.flags.is_playing = true;
        self.populate();
    }

    /// Start over from the configured level with a fresh ship
    pub fn restart(&mut self) {
        log::info!("Restarting at level {}", self.settings.start_level);
        self.level = clamp_level(self.settings.start_level);
        self.clear_transients();
        self.flow.reset();
        self.flags = GameFlags::default();
        self.player = Some(Player::new(self.invulnerable));
        self.populate();
    }

    /// Drop every bullet, enemy, power-up and explosion
    fn clear_transients(&mut self) {
        if let Some(player) = self.player.as_mut() {
            player.clear_all(&mut self.events);
        }
        self.fleet.clear_all(&mut self.events);
        self.powerups.clear_all(&mut self.events);
        self.effects.clear_all(&mut self.events);
        if self.powerups.chain() != 0 {
            self.powerups.reset_chain();
            self.events.push(GameEvent::ChainChanged(0));
        }
    }

    fn populate(&mut self) {
        self.fleet
            .create_enemies(self.level, &mut self.ids, &mut self.events);
        self.events.push(GameEvent::LevelStarted(self.level));
    }

    fn dive_target(&self) -> DiveTarget {
        match &self.player {
            Some(player) => DiveTarget {
                pos: player.pos,
                velocity: player.velocity,
            },
            None => DiveTarget {
                pos: Vec3::new(0.0, PLAYER_START_Y, 0.0),
                velocity: Vec3::ZERO,
            },
        }
    }
}

/// Advance the world by one fixed timestep
pub fn tick(world: &mut World, input: &TickInput) {
    world.time_ticks += 1;
    let now = world.time_ticks;

    let mut input = input.clone();
    if input.idle_mode {
        autopilot(world, &mut input);
    }

    if input.toggle_invulnerable {
        let on = !world.invulnerable;
        world.set_invulnerable(on);
    }
    if input.spawn_powerup {
        world.powerups.spawn_from_top(
            PowerUpKind::Blue,
            &world.tuning,
            &mut world.rng,
            &mut world.ids,
            &mut world.events,
        );
    }
    if input.spawn_red_powerup {
        world.powerups.spawn_from_top(
            PowerUpKind::Red,
            &world.tuning,
            &mut world.rng,
            &mut world.ids,
            &mut world.events,
        );
    }

    if let Some(player) = world.player.as_mut() {
        player.update(&input, now, &world.tuning, &mut world.ids, &mut world.events);
    }

    let fleet_ctx = FleetContext {
        allow_dives: world.flags.is_playing && world.player.is_some(),
        target: world.dive_target(),
    };
    world
        .fleet
        .update(&fleet_ctx, &world.tuning, &mut world.rng, &mut world.events);

    let drop_ctx = DropContext {
        playing: world.flags.is_playing,
        wings_full: world.player.as_ref().is_some_and(Player::has_both_wings),
    };
    world.powerups.update(
        drop_ctx,
        &world.tuning,
        &mut world.rng,
        &mut world.ids,
        &mut world.events,
    );

    let effects = world.effects.update(&mut world.events);

    let outcome = resolve(world);
    if let Some(kind) = outcome.collected {
        let chain = world.powerups.record_collected(kind);
        world.events.push(GameEvent::ChainChanged(chain));
    }

    for column in world.fleet.columns_mut().newly_cleared() {
        world.events.push(GameEvent::ColumnCleared { column });
    }

    let flow_input = FlowInput {
        player_explosion_completed: effects.player_explosion_completed,
        player_explosion_pending: world.effects.player_explosion_pending(),
        shoot_or_confirm: input.shoot || input.confirm,
        live_enemies: world.fleet.live_count(),
        level: world.level,
    };
    match world
        .flow
        .evaluate(&mut world.flags, flow_input, &world.tuning, &mut world.events)
    {
        FlowAction::Restart => world.restart(),
        FlowAction::NextLevel => world.next_level(),
        FlowAction::None => {}
    }
}

/// Demo pilot: dodge low divers, chase falling power-ups, otherwise line up
/// under the nearest enemy. Always shooting, so it also confirms restarts.
fn autopilot(world: &World, input: &mut TickInput) {
    input.shoot = true;
    input.confirm = true;

    let Some(player) = world.player.as_ref() else {
        return;
    };
    let px = player.pos.x;

    let threat = world.fleet.enemies().iter().find(|e| {
        e.state.is_diving() && e.pos.y - player.pos.y < 3.0 && (e.pos.x - px).abs() < 1.5
    });
    let pickup = world
        .powerups
        .powerups()
        .iter()
        .filter(|p| p.pos.y < 0.0)
        .min_by(|a, b| {
            let da = (a.pos.y - player.pos.y).abs();
            let db = (b.pos.y - player.pos.y).abs();
            da.total_cmp(&db)
        });
    let nearest_enemy = world
        .fleet
        .enemies()
        .iter()
        .filter(|e| e.state.is_formation())
        .min_by(|a, b| (a.pos.x - px).abs().total_cmp(&(b.pos.x - px).abs()));

    let target_x = if let Some(threat) = threat {
        if threat.pos.x > px { px - 3.0 } else { px + 3.0 }
    } else if let Some(pickup) = pickup {
        pickup.pos.x
    } else if let Some(enemy) = nearest_enemy {
        enemy.pos.x
    } else {
        px
    };

    let deadband = PLAYER_SPEED * 0.5;
    input.move_left = target_x < px - deadband;
    input.move_right = target_x > px + deadband;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> World {
        World::new(RunSettings::default(), Tuning::default())
    }

    #[test]
    fn test_new_world_spawns_level() {
        let mut world = world();
        assert_eq!(world.level(), 1);
        assert_eq!(world.live_enemy_count(), 32);
        assert!(world.flags().is_playing);
        assert!(world.player().is_some());
        let events = world.drain_events();
        assert!(events.contains(&GameEvent::LevelStarted(1)));
        assert!(world.drain_events().is_empty());
    }

    #[test]
    fn test_start_level_is_clamped() {
        let settings = RunSettings {
            start_level: 500,
            ..Default::default()
        };
        let world = World::new(settings, Tuning::default());
        assert_eq!(world.level(), MAX_LEVEL);
        assert_eq!(world.live_enemy_count(), (MAX_ROWS * MAX_COLS) as usize);
    }

    #[test]
    fn test_toggle_invulnerable() {
        let mut world = world();
        let input = TickInput {
            toggle_invulnerable: true,
            ..Default::default()
        };
        tick(&mut world, &input);
        assert!(world.is_invulnerable());
        assert!(world.player().is_some_and(|p| p.invulnerable));
        tick(&mut world, &input);
        assert!(!world.is_invulnerable());
    }

    #[test]
    fn test_manual_spawns() {
        let mut world = world();
        let input = TickInput {
            spawn_powerup: true,
            spawn_red_powerup: true,
            ..Default::default()
        };
        tick(&mut world, &input);
        let kinds: Vec<_> = world.powerups.powerups().iter().map(|p| p.kind).collect();
        assert_eq!(kinds, vec![PowerUpKind::Blue, PowerUpKind::Red]);
    }

    #[test]
    fn test_next_level_repopulates() {
        let mut world = world();
        world.next_level();
        assert_eq!(world.level(), 2);
        // level 2: rows 4, cols 8 + 1/2 = 8
        assert_eq!(world.live_enemy_count(), 32);
        world.next_level();
        assert_eq!(world.live_enemy_count(), 36);
    }

    #[test]
    fn test_level_is_capped() {
        let settings = RunSettings {
            start_level: MAX_LEVEL,
            ..Default::default()
        };
        let mut world = World::new(settings, Tuning::default());
        world.next_level();
        assert_eq!(world.level(), MAX_LEVEL);
    }

    #[test]
    fn test_determinism() {
        let mut a = world();
        let mut b = world();
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        for _ in 0..600 {
            tick(&mut a, &input);
            tick(&mut b, &input);
        }
        assert_eq!(a.time_ticks, b.time_ticks);
        assert_eq!(a.live_enemy_count(), b.live_enemy_count());
        assert_eq!(a.drain_events(), b.drain_events());
    }

    #[test]
    fn test_autopilot_holds_fire() {
        let world = world();
        let mut input = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        autopilot(&world, &mut input);
        assert!(input.shoot);
        assert!(!(input.move_left && input.move_right));
    }
}
