//! Run settings
//!
//! Parameters fixed for the lifetime of a run: where the level counter starts,
//! the RNG seed, and the invulnerability cheat.

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_LEVEL, MIN_LEVEL};

/// Parameters read once at construction (and again on restart)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSettings {
    /// Level the run starts at and returns to on restart
    pub start_level: u32,
    /// Seed for the simulation RNG
    pub seed: u64,
    /// Player ignores fatal collisions
    pub invulnerable: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            start_level: MIN_LEVEL,
            seed: 0x5EED,
            invulnerable: false,
        }
    }
}

impl RunSettings {
    /// Build settings from an optional raw level parameter
    pub fn from_level_param(raw: Option<&str>, seed: u64) -> Self {
        Self {
            start_level: parse_level_param(raw),
            seed,
            ..Self::default()
        }
    }
}

/// Interpret a raw level parameter.
///
/// Absent, blank or non-numeric input counts as absent and yields level 1.
/// Numeric input is clamped into `[MIN_LEVEL, MAX_LEVEL]`.
pub fn parse_level_param(raw: Option<&str>) -> u32 {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return MIN_LEVEL;
    };
    match raw.parse::<i64>() {
        Ok(level) => level.clamp(MIN_LEVEL as i64, MAX_LEVEL as i64) as u32,
        // Integer too wide for i64: still numeric, clamp by sign
        Err(_) if is_integer_literal(raw) => {
            if raw.starts_with('-') {
                MIN_LEVEL
            } else {
                MAX_LEVEL
            }
        }
        Err(_) => {
            log::warn!("Ignoring non-numeric level parameter {:?}", raw);
            MIN_LEVEL
        }
    }
}

fn is_integer_literal(raw: &str) -> bool {
    let digits = raw.strip_prefix(['-', '+']).unwrap_or(raw);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

/// Clamp an already-numeric level into range
pub fn clamp_level(level: u32) -> u32 {
    level.clamp(MIN_LEVEL, MAX_LEVEL)
}
