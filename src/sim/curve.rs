//! Dive curves and attack patterns
//!
//! A dive is a quadratic Bezier from the formation slot, bent through a
//! pattern-specific control point, to an end point chosen near the player at
//! the moment the dive starts. The end point is never re-tracked.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::PLAY_HALF_WIDTH;
use crate::quadratic_bezier;
use crate::tuning::Tuning;

/// Three control points of a dive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiveCurve {
    pub start: Vec3,
    pub control: Vec3,
    pub end: Vec3,
}

impl DiveCurve {
    pub fn new(start: Vec3, control: Vec3, end: Vec3) -> Self {
        Self {
            start,
            control,
            end,
        }
    }

    /// Position at normalized time `t` (clamped to [0, 1])
    pub fn point_at(&self, t: f32) -> Vec3 {
        quadratic_bezier(self.start, self.control, self.end, t.clamp(0.0, 1.0))
    }
}

/// Single-enemy attack patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DivePattern {
    /// Straight at where the player is now
    Direct,
    /// At where the player will be if they keep moving
    Predictive,
    /// Swing out to a wall, then cut in beside the player
    SideApproach,
    /// Wide sideways loop ending near the player
    CircularArc,
}

impl DivePattern {
    /// Bucket a uniform roll in [0, 1) using ascending thresholds
    pub fn from_roll(roll: f32, thresholds: [f32; 3]) -> Self {
        if roll < thresholds[0] {
            DivePattern::Direct
        } else if roll < thresholds[1] {
            DivePattern::Predictive
        } else if roll < thresholds[2] {
            DivePattern::SideApproach
        } else {
            DivePattern::CircularArc
        }
    }
}

/// Player snapshot taken when a dive launches
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiveTarget {
    pub pos: Vec3,
    /// Per-tick movement of the player
    pub velocity: Vec3,
}

fn jitter<R: Rng>(rng: &mut R, amount: f32) -> f32 {
    if amount <= 0.0 {
        0.0
    } else {
        rng.random_range(-amount..=amount)
    }
}

fn random_side<R: Rng>(rng: &mut R) -> f32 {
    if rng.random_bool(0.5) { 1.0 } else { -1.0 }
}

fn clamp_to_arena(mut p: Vec3) -> Vec3 {
    p.x = p.x.clamp(-PLAY_HALF_WIDTH, PLAY_HALF_WIDTH);
    p
}

/// Build the curve for a single-enemy dive
pub fn pattern_curve<R: Rng>(
    pattern: DivePattern,
    start: Vec3,
    target: DiveTarget,
    tuning: &Tuning,
    rng: &mut R,
) -> DiveCurve {
    let j = tuning.dive_jitter;
    match pattern {
        DivePattern::Direct => {
            let end = target.pos;
            let mid = start.lerp(end, 0.5);
            let control = mid + Vec3::new(jitter(rng, j), jitter(rng, j * 0.5), 0.0);
            DiveCurve::new(start, control, end)
        }
        DivePattern::Predictive => {
            let lead = target.velocity * tuning.predictive_lead_ticks;
            let end = clamp_to_arena(Vec3::new(target.pos.x + lead.x, target.pos.y, 0.0));
            let control = Vec3::new(
                start.x + jitter(rng, j),
                (start.y + end.y) * 0.5 + jitter(rng, j * 0.5),
                0.0,
            );
            DiveCurve::new(start, control, end)
        }
        DivePattern::SideApproach => {
            let side = random_side(rng);
            let end = clamp_to_arena(target.pos + Vec3::new(side * 1.5, 0.0, 0.0));
            let control = Vec3::new(
                side * PLAY_HALF_WIDTH,
                (start.y + end.y) * 0.5 + jitter(rng, j * 0.5),
                0.0,
            );
            DiveCurve::new(start, control, end)
        }
        DivePattern::CircularArc => {
            let side = random_side(rng);
            let end = clamp_to_arena(target.pos + Vec3::new(jitter(rng, 1.0), 0.0, 0.0));
            let control = clamp_to_arena(Vec3::new(
                start.x + side * tuning.arc_radius,
                start.y - tuning.arc_radius * 0.5 + jitter(rng, j * 0.5),
                0.0,
            ));
            DiveCurve::new(start, control, end)
        }
    }
}

/// Curve for one member of a group dive: straight-ish with a little wobble
pub fn group_curve<R: Rng>(start: Vec3, end: Vec3, tuning: &Tuning, rng: &mut R) -> DiveCurve {
    let wobble = tuning.dive_jitter * 0.25;
    let control = start.lerp(end, 0.5) + Vec3::new(jitter(rng, wobble), jitter(rng, wobble), 0.0);
    DiveCurve::new(start, control, end)
}
