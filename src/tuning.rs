//! Data-driven game balance
//!
//! Every tuned constant the simulation reads lives here so a JSON file can
//! override it. Missing fields fall back to the defaults below.

use serde::{Deserialize, Serialize};

/// Tunable simulation constants (all durations in ticks at 60 Hz)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Dives ===
    /// Per-tick chance of launching a dive once the cooldown is clear
    pub dive_chance: f64,
    /// Chance a dive launches a whole formation group instead of one enemy
    pub group_dive_chance: f64,
    /// Upper bounds of the Direct / Predictive / SideApproach buckets;
    /// anything above the last is CircularArc
    pub pattern_thresholds: [f32; 3],
    /// Cooldown window after a dive starts
    pub dive_cooldown_min: u32,
    pub dive_cooldown_max: u32,
    /// No dives until the wave has existed this long
    pub first_dive_delay_ticks: u32,
    /// Dive duration window
    pub dive_duration_min: u32,
    pub dive_duration_max: u32,
    /// Time to glide back to the formation slot after a miss
    pub return_duration: u32,
    /// Enemies closer than this form a group
    pub group_radius: f32,
    /// Random jitter applied to the dive control point
    pub dive_jitter: f32,
    /// Lead time used by the predictive pattern
    pub predictive_lead_ticks: f32,
    /// Sideways reach of the circular-arc pattern
    pub arc_radius: f32,

    // === Player ===
    /// Ticks between shots
    pub shoot_cooldown_ticks: u64,

    // === Power-ups ===
    /// Ticks between periodic power-up drops
    pub powerup_spawn_interval: u32,
    /// Chance a periodic drop is Red while a wing is missing
    pub red_powerup_chance: f64,
    /// Fall speed (units per tick)
    pub powerup_fall_speed: f32,

    // === Collision thresholds ===
    pub bullet_hit_radius: f32,
    pub wing_hit_radius: f32,
    pub player_hit_radius: f32,
    pub powerup_pickup_radius: f32,

    // === Effects / banners ===
    pub explosion_ticks: u32,
    pub game_over_ticks: u32,
    pub level_complete_ticks: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            dive_chance: 0.02,
            group_dive_chance: 0.3,
            pattern_thresholds: [0.3, 0.6, 0.8],
            dive_cooldown_min: 60,
            dive_cooldown_max: 120,
            first_dive_delay_ticks: 120,
            dive_duration_min: 90,
            dive_duration_max: 150,
            return_duration: 60,
            group_radius: 1.8,
            dive_jitter: 2.0,
            predictive_lead_ticks: 40.0,
            arc_radius: 6.0,

            shoot_cooldown_ticks: 15,

            powerup_spawn_interval: 600,
            red_powerup_chance: 0.35,
            powerup_fall_speed: 0.05,

            bullet_hit_radius: 0.6,
            wing_hit_radius: 0.6,
            player_hit_radius: 0.9,
            powerup_pickup_radius: 0.9,

            explosion_ticks: 45,
            game_over_ticks: 120,
            level_complete_ticks: 150,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) tuning file
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut tuning: Self = serde_json::from_str(json)?;
        tuning.sanitize();
        Ok(tuning)
    }

    /// Serialize for dumping the active balance
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Repair inverted ranges and zero durations so the simulation never
    /// divides by zero or samples an empty range
    pub fn sanitize(&mut self) {
        if self.dive_cooldown_max < self.dive_cooldown_min {
            std::mem::swap(&mut self.dive_cooldown_min, &mut self.dive_cooldown_max);
        }
        if self.dive_duration_max < self.dive_duration_min {
            std::mem::swap(&mut self.dive_duration_min, &mut self.dive_duration_max);
        }
        self.dive_duration_min = self.dive_duration_min.max(1);
        self.dive_duration_max = self.dive_duration_max.max(1);
        self.return_duration = self.return_duration.max(1);
        self.powerup_spawn_interval = self.powerup_spawn_interval.max(1);
        self.dive_chance = self.dive_chance.clamp(0.0, 1.0);
        self.group_dive_chance = self.group_dive_chance.clamp(0.0, 1.0);
        self.red_powerup_chance = self.red_powerup_chance.clamp(0.0, 1.0);
    }
}
