//! Enemy fleet: formation layout, dive state machine, column bookkeeping
//!
//! Enemies cycle Formation -> Diving -> Returning -> Formation. The only way
//! out of the cycle is removal after a collision.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec3;
use rand::Rng;

use super::curve::{DivePattern, DiveTarget, group_curve, pattern_curve};
use super::state::{Enemy, EnemyState, EntityId, EntityKind, GameEvent, IdAllocator};
use crate::audio::SoundEffect;
use crate::consts::*;
use crate::lerp;
use crate::settings::clamp_level;
use crate::tuning::Tuning;

/// Grid dimensions and spacing for a level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormationLayout {
    pub rows: u32,
    pub cols: u32,
    pub spacing_x: f32,
    pub spacing_y: f32,
    pub enemy_size: f32,
}

impl FormationLayout {
    /// Rows grow every third level, columns every second, both capped.
    /// Spacing and size shrink with the square root of the grid area so the
    /// formation keeps roughly the same footprint.
    pub fn for_level(level: u32) -> Self {
        let step = clamp_level(level) - 1;
        let rows = (BASE_ROWS + step / 3).min(MAX_ROWS);
        let cols = (BASE_COLS + step / 2).min(MAX_COLS);
        let scale = ((BASE_ROWS * BASE_COLS) as f32 / (rows * cols) as f32).sqrt();
        Self {
            rows,
            cols,
            spacing_x: BASE_SPACING_X * scale,
            spacing_y: BASE_SPACING_Y * scale,
            enemy_size: BASE_ENEMY_SIZE * scale,
        }
    }

    pub fn count(&self) -> usize {
        (self.rows * self.cols) as usize
    }

    /// Formation slot of a grid cell, centred horizontally
    pub fn home(&self, column: u32, row: u32) -> (f32, f32) {
        let x = (column as f32 - (self.cols - 1) as f32 / 2.0) * self.spacing_x;
        let y = FORMATION_TOP_Y - row as f32 * self.spacing_y;
        (x, y)
    }
}

/// Live enemies per column, with a once-only "column cleared" report
#[derive(Debug, Clone, Default)]
pub struct ColumnTracker {
    initial: BTreeMap<u32, u32>,
    live: BTreeMap<u32, u32>,
    reported: BTreeSet<u32>,
}

impl ColumnTracker {
    /// Take the spawn snapshot
    pub fn snapshot(&mut self, enemies: &[Enemy]) {
        self.clear();
        for enemy in enemies {
            *self.initial.entry(enemy.column).or_default() += 1;
        }
        self.live = self.initial.clone();
    }

    pub fn clear(&mut self) {
        self.initial.clear();
        self.live.clear();
        self.reported.clear();
    }

    /// Live count for a column
    pub fn live_in(&self, column: u32) -> u32 {
        self.live.get(&column).copied().unwrap_or(0)
    }

    /// Initial count for a column
    pub fn initial_in(&self, column: u32) -> u32 {
        self.initial.get(&column).copied().unwrap_or(0)
    }

    fn record_removal(&mut self, column: u32) {
        if let Some(count) = self.live.get_mut(&column) {
            *count = count.saturating_sub(1);
        }
    }

    /// Columns that have emptied since the last call. Each column is reported
    /// at most once until the next snapshot.
    pub fn newly_cleared(&mut self) -> Vec<u32> {
        let mut cleared = Vec::new();
        for (&column, &initial) in &self.initial {
            if initial > 0 && self.live_in(column) == 0 && self.reported.insert(column) {
                cleared.push(column);
            }
        }
        cleared
    }
}

/// Per-tick inputs the fleet needs from the rest of the world
#[derive(Debug, Clone, Copy)]
pub struct FleetContext {
    /// Game is playing and the player is alive
    pub allow_dives: bool,
    pub target: DiveTarget,
}

/// Result of removing an enemy
#[derive(Debug, Clone)]
pub struct Removal {
    pub enemy: Enemy,
    /// It was the last live enemy of its column
    pub last_in_column: bool,
}

/// Every enemy of the current level
#[derive(Debug, Clone, Default)]
pub struct EnemyFleet {
    enemies: Vec<Enemy>,
    columns: ColumnTracker,
    /// Ticks until another dive may launch
    dive_cooldown: u32,
    /// Ticks since this wave spawned
    wave_ticks: u32,
}

impl EnemyFleet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fleet made of hand-placed enemies
    pub fn from_enemies(enemies: Vec<Enemy>) -> Self {
        let mut fleet = Self {
            enemies,
            ..Self::default()
        };
        fleet.columns.snapshot(&fleet.enemies);
        fleet
    }

    /// Replace the fleet with a fresh formation for `level`
    pub fn create_enemies(
        &mut self,
        level: u32,
        ids: &mut IdAllocator,
        events: &mut Vec<GameEvent>,
    ) -> usize {
        self.clear_all(events);

        let layout = FormationLayout::for_level(level);
        for row in 0..layout.rows {
            for column in 0..layout.cols {
                let enemy = Enemy::new(
                    ids.next_id(),
                    column,
                    row,
                    layout.home(column, row),
                    layout.enemy_size,
                );
                events.push(GameEvent::Spawned {
                    id: enemy.id,
                    kind: EntityKind::Enemy,
                    pos: enemy.pos,
                });
                self.enemies.push(enemy);
            }
        }
        self.columns.snapshot(&self.enemies);

        log::info!(
            "Level {}: {}x{} formation ({} enemies)",
            level,
            layout.rows,
            layout.cols,
            self.enemies.len()
        );
        self.enemies.len()
    }

    /// Drop every enemy and reset dive timing
    pub fn clear_all(&mut self, events: &mut Vec<GameEvent>) {
        events.extend(self.enemies.drain(..).map(|e| GameEvent::Despawned { id: e.id }));
        self.columns.clear();
        self.dive_cooldown = 0;
        self.wave_ticks = 0;
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn get(&self, id: EntityId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|e| e.id == id)
    }

    /// Enemies not yet destroyed
    pub fn live_count(&self) -> usize {
        self.enemies.iter().filter(|e| !e.destroyed).count()
    }

    pub fn columns(&self) -> &ColumnTracker {
        &self.columns
    }

    pub fn columns_mut(&mut self) -> &mut ColumnTracker {
        &mut self.columns
    }

    pub fn dive_cooldown(&self) -> u32 {
        self.dive_cooldown
    }

    /// Flag an enemy as destroyed. Returns false if it was already flagged
    /// (or is unknown), so callers can skip double-processing.
    pub fn mark_destroyed(&mut self, id: EntityId) -> bool {
        match self.get_mut(id) {
            Some(enemy) if !enemy.destroyed => {
                enemy.destroyed = true;
                true
            }
            _ => false,
        }
    }

    /// Remove an enemy, reporting whether it emptied its column
    pub fn remove(&mut self, id: EntityId, events: &mut Vec<GameEvent>) -> Option<Removal> {
        let idx = self.enemies.iter().position(|e| e.id == id)?;
        let column = self.enemies[idx].column;
        let last_in_column = self.columns.live_in(column) == 1;
        self.columns.record_removal(column);
        let enemy = self.enemies.remove(idx);
        events.push(GameEvent::Despawned { id });
        Some(Removal {
            enemy,
            last_in_column,
        })
    }

    /// Advance every enemy one tick and maybe launch a dive
    pub fn update<R: Rng>(
        &mut self,
        ctx: &FleetContext,
        tuning: &Tuning,
        rng: &mut R,
        events: &mut Vec<GameEvent>,
    ) {
        self.wave_ticks = self.wave_ticks.saturating_add(1);
        self.dive_cooldown = self.dive_cooldown.saturating_sub(1);

        for enemy in &mut self.enemies {
            advance(enemy, self.wave_ticks, tuning);
        }

        if self.dive_cooldown == 0
            && self.wave_ticks >= tuning.first_dive_delay_ticks
            && ctx.allow_dives
            && rng.random_bool(tuning.dive_chance)
        {
            self.dive_cooldown = rng.random_range(tuning.dive_cooldown_min..=tuning.dive_cooldown_max);
            self.launch_dive(ctx.target, tuning, rng, events);
        }
    }

    /// Pick a group or a single enemy and send it diving
    fn launch_dive<R: Rng>(
        &mut self,
        target: DiveTarget,
        tuning: &Tuning,
        rng: &mut R,
        events: &mut Vec<GameEvent>,
    ) {
        let eligible: Vec<EntityId> = self
            .enemies
            .iter()
            .filter(|e| e.state.is_formation() && !e.destroyed)
            .map(|e| e.id)
            .collect();
        if eligible.is_empty() {
            return;
        }

        let groups = self.formation_groups(tuning.group_radius);
        if !groups.is_empty() && rng.random_bool(tuning.group_dive_chance) {
            let group = &groups[rng.random_range(0..groups.len())];
            self.start_group_dive(group, target, tuning, rng, events);
        } else {
            let id = eligible[rng.random_range(0..eligible.len())];
            let pattern = DivePattern::from_roll(rng.random::<f32>(), tuning.pattern_thresholds);
            self.start_dive(id, pattern, target, tuning, rng, events);
        }
    }

    /// Send one Formation enemy on a dive. Returns false if it cannot dive.
    pub fn start_dive<R: Rng>(
        &mut self,
        id: EntityId,
        pattern: DivePattern,
        target: DiveTarget,
        tuning: &Tuning,
        rng: &mut R,
        events: &mut Vec<GameEvent>,
    ) -> bool {
        let duration = rng.random_range(tuning.dive_duration_min..=tuning.dive_duration_max);
        let Some(enemy) = self.get_mut(id) else {
            return false;
        };
        if !enemy.state.is_formation() || enemy.destroyed {
            return false;
        }

        let start = enemy.home();
        let curve = pattern_curve(pattern, start, target, tuning, rng);
        enemy.pos = start;
        enemy.state = EnemyState::Diving {
            curve,
            elapsed: 0,
            duration,
        };
        log::debug!("Enemy {:?} dives ({:?}, {} ticks)", id, pattern, duration);
        events.push(GameEvent::Sound(SoundEffect::DiveStarted));
        true
    }

    /// Dive a group toward the player while keeping its shape
    pub fn start_group_dive<R: Rng>(
        &mut self,
        members: &[EntityId],
        target: DiveTarget,
        tuning: &Tuning,
        rng: &mut R,
        events: &mut Vec<GameEvent>,
    ) -> usize {
        let homes: Vec<(EntityId, Vec3)> = members
            .iter()
            .filter_map(|&id| self.get(id))
            .filter(|e| e.state.is_formation() && !e.destroyed)
            .map(|e| (e.id, e.home()))
            .collect();
        if homes.is_empty() {
            return 0;
        }

        let centroid = homes.iter().map(|(_, h)| *h).sum::<Vec3>() / homes.len() as f32;
        let duration = rng.random_range(tuning.dive_duration_min..=tuning.dive_duration_max);

        for &(id, home) in &homes {
            let end = target.pos + (home - centroid);
            let curve = group_curve(home, end, tuning, rng);
            if let Some(enemy) = self.get_mut(id) {
                enemy.pos = home;
                enemy.state = EnemyState::Diving {
                    curve,
                    elapsed: 0,
                    duration,
                };
            }
        }
        log::debug!("Group of {} dives ({} ticks)", homes.len(), duration);
        events.push(GameEvent::Sound(SoundEffect::DiveStarted));
        homes.len()
    }

    /// Partition Formation enemies into clusters: each unprocessed enemy
    /// claims every other unprocessed enemy within `radius`. Singletons are
    /// dropped.
    pub fn formation_groups(&self, radius: f32) -> Vec<Vec<EntityId>> {
        let candidates: Vec<&Enemy> = self
            .enemies
            .iter()
            .filter(|e| e.state.is_formation() && !e.destroyed)
            .collect();
        let mut processed = vec![false; candidates.len()];
        let mut groups = Vec::new();

        for i in 0..candidates.len() {
            if processed[i] {
                continue;
            }
            processed[i] = true;
            let mut group = vec![candidates[i].id];
            for j in 0..candidates.len() {
                if !processed[j] && candidates[i].pos.distance(candidates[j].pos) <= radius {
                    processed[j] = true;
                    group.push(candidates[j].id);
                }
            }
            if group.len() >= 2 {
                groups.push(group);
            }
        }
        groups
    }
}

/// Cosmetic sway around the formation slot
fn formation_drift(wave_ticks: u32, column: u32, row: u32) -> Vec3 {
    let phase = column as f32 * 0.4 + row as f32 * 0.2;
    let t = wave_ticks as f32 * DRIFT_FREQUENCY + phase;
    Vec3::new(t.sin() * DRIFT_AMPLITUDE_X, t.cos() * DRIFT_AMPLITUDE_Y, 0.0)
}

/// One tick of the per-enemy state machine
fn advance(enemy: &mut Enemy, wave_ticks: u32, tuning: &Tuning) {
    let home = enemy.home();
    let next = match &mut enemy.state {
        EnemyState::Formation => {
            enemy.pos = home + formation_drift(wave_ticks, enemy.column, enemy.row);
            None
        }
        EnemyState::Diving {
            curve,
            elapsed,
            duration,
        } => {
            *elapsed += 1;
            let t = *elapsed as f32 / *duration as f32;
            enemy.pos = curve.point_at(t);
            // Survived the whole dive: head home from wherever it ended
            (t >= 1.0).then(|| EnemyState::Returning {
                start: enemy.pos,
                elapsed: 0,
                duration: tuning.return_duration,
            })
        }
        EnemyState::Returning {
            start,
            elapsed,
            duration,
        } => {
            *elapsed += 1;
            if *elapsed >= *duration {
                enemy.pos = home;
                Some(EnemyState::Formation)
            } else {
                enemy.pos = lerp(*start, home, *elapsed as f32 / *duration as f32);
                None
            }
        }
    };
    if let Some(next) = next {
        enemy.state = next;
    }
}
