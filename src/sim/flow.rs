//! Game/level state machine
//!
//! Two orthogonal tracks hang off [`GameFlags`]:
//!
//! - player destroyed -> explosion finished -> game-over banner -> restart
//! - formation wiped out -> level-complete banner -> next level
//!
//! The banners are tick timers standing in for the presentation layer's
//! animations.

use serde::{Deserialize, Serialize};

use super::state::{GameEvent, GameFlags};
use crate::audio::SoundEffect;
use crate::consts::MAX_LEVEL;
use crate::tuning::Tuning;

/// Lifecycle of a timed banner
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Banner {
    #[default]
    Hidden,
    Running {
        remaining: u32,
    },
    Finished,
}

impl Banner {
    pub fn is_hidden(&self) -> bool {
        matches!(self, Banner::Hidden)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Banner::Running { .. })
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Banner::Finished)
    }

    /// Start from Hidden; returns false if already started
    fn start(&mut self, ticks: u32) -> bool {
        if !self.is_hidden() {
            return false;
        }
        *self = Banner::Running {
            remaining: ticks.max(1),
        };
        true
    }

    fn advance(&mut self) {
        if let Banner::Running { remaining } = self {
            *remaining -= 1;
            if *remaining == 0 {
                *self = Banner::Finished;
            }
        }
    }
}

/// What the state machine sees this tick
#[derive(Debug, Clone, Copy, Default)]
pub struct FlowInput {
    /// The player's explosion finished during this tick's effects update
    pub player_explosion_completed: bool,
    /// A player explosion is still playing
    pub player_explosion_pending: bool,
    pub shoot_or_confirm: bool,
    pub live_enemies: usize,
    pub level: u32,
}

/// Transition requested of the frame driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowAction {
    None,
    Restart,
    NextLevel,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LevelFlow {
    game_over: Banner,
    level_complete: Banner,
}

impl LevelFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn game_over(&self) -> Banner {
        self.game_over
    }

    pub fn level_complete(&self) -> Banner {
        self.level_complete
    }

    /// Hide both banners (restart)
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Advance the banners and apply the first matching rule.
    ///
    /// At most one action is returned per tick.
    pub fn evaluate(
        &mut self,
        flags: &mut GameFlags,
        input: FlowInput,
        tuning: &Tuning,
        events: &mut Vec<GameEvent>,
    ) -> FlowAction {
        self.game_over.advance();
        self.level_complete.advance();

        if input.player_explosion_completed && flags.player_destroyed && !flags.explosion_complete {
            flags.explosion_complete = true;
            self.show_game_over(tuning, events);
        }

        // Covers a player explosion lost to a clear or never spawned
        if flags.player_destroyed && !input.player_explosion_pending && self.game_over.is_hidden() {
            log::warn!("Player destroyed without a pending explosion, showing game over");
            flags.explosion_complete = true;
            self.show_game_over(tuning, events);
        }

        if self.game_over.is_finished() && input.shoot_or_confirm {
            log::info!("Restart requested");
            return FlowAction::Restart;
        }

        if input.live_enemies == 0 && flags.is_playing && self.level_complete.is_hidden() {
            self.level_complete.start(tuning.level_complete_ticks);
            events.push(GameEvent::LevelCompleteShown);
            events.push(GameEvent::Sound(SoundEffect::LevelComplete));
            if input.level >= MAX_LEVEL {
                events.push(GameEvent::Sound(SoundEffect::Win));
            }
            log::info!("Level {} complete", input.level);
        }

        if self.level_complete.is_finished() {
            self.level_complete = Banner::Hidden;
            return FlowAction::NextLevel;
        }

        FlowAction::None
    }

    fn show_game_over(&mut self, tuning: &Tuning, events: &mut Vec<GameEvent>) {
        if self.game_over.start(tuning.game_over_ticks) {
            events.push(GameEvent::GameOverShown);
            events.push(GameEvent::Sound(SoundEffect::GameOver));
        }
    }
}
