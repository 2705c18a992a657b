//! Audio cues
//!
//! The simulation only names sounds. Synthesis lives behind [`SoundBackend`];
//! without one every call is a silent no-op.

use serde::{Deserialize, Serialize};

use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Bullet kills an enemy
    Hit,
    /// An enemy (or group) leaves the formation
    DiveStarted,
    /// Wing or player ship destroyed
    Explosion,
    /// Power-up collected
    PowerUpCollected,
    /// Game over
    GameOver,
    /// Formation wiped out
    LevelComplete,
    /// Last level cleared
    Win,
    /// Player fired
    Shoot,
}

/// Something that can actually make noise
pub trait SoundBackend {
    /// Play `effect` at `volume` (0.0 - 1.0). Must not block.
    fn play(&mut self, effect: SoundEffect, volume: f32);
}

/// Backend that writes each cue to the log (headless runs)
#[derive(Debug, Default)]
pub struct LogBackend;

impl SoundBackend for LogBackend {
    fn play(&mut self, effect: SoundEffect, volume: f32) {
        log::trace!("sfx {:?} @ {:.2}", effect, volume);
    }
}

/// Audio manager for the game
pub struct AudioManager {
    backend: Option<Box<dyn SoundBackend>>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    /// Manager with no backend; audio disabled
    pub fn new() -> Self {
        log::warn!("No audio backend - audio disabled");
        Self::build(None)
    }

    pub fn with_backend(backend: Box<dyn SoundBackend>) -> Self {
        Self::build(Some(backend))
    }

    fn build(backend: Option<Box<dyn SoundBackend>>) -> Self {
        Self {
            backend,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Get effective volume
    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a sound effect
    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        let Some(backend) = self.backend.as_mut() else {
            return;
        };
        backend.play(effect, vol);
    }

    /// Play every sound cue in a batch of simulation events
    pub fn handle_events(&mut self, events: &[GameEvent]) {
        for event in events {
            if let GameEvent::Sound(effect) = event {
                self.play(*effect);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default, Clone)]
    struct Recorder(Rc<RefCell<Vec<(SoundEffect, f32)>>>);

    impl SoundBackend for Recorder {
        fn play(&mut self, effect: SoundEffect, volume: f32) {
            self.0.borrow_mut().push((effect, volume));
        }
    }

    #[test]
    fn test_without_backend_is_silent() {
        let mut audio = AudioManager::new();
        assert!(!audio.is_enabled());
        audio.play(SoundEffect::Hit);
    }

    #[test]
    fn test_volume_and_mute() {
        let recorder = Recorder::default();
        let mut audio = AudioManager::with_backend(Box::new(recorder.clone()));
        audio.set_master_volume(0.5);
        audio.set_sfx_volume(2.0);
        audio.play(SoundEffect::Hit);

        audio.set_muted(true);
        audio.play(SoundEffect::Explosion);

        let played = recorder.0.borrow();
        assert_eq!(played.as_slice(), &[(SoundEffect::Hit, 0.5)]);
    }

    #[test]
    fn test_handle_events_plays_only_sounds() {
        let recorder = Recorder::default();
        let mut audio = AudioManager::with_backend(Box::new(recorder.clone()));
        audio.handle_events(&[
            GameEvent::Sound(SoundEffect::DiveStarted),
            GameEvent::PlayerDestroyed,
            GameEvent::Sound(SoundEffect::GameOver),
        ]);
        let played: Vec<_> = recorder.0.borrow().iter().map(|(e, _)| *e).collect();
        assert_eq!(played, vec![SoundEffect::DiveStarted, SoundEffect::GameOver]);
    }
}
