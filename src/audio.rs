//! Audio collaborator contract
//!
//! Sound synthesis lives outside the core. The game talks to it through a
//! small fire-and-forget interface, and the `AudioDirector` translates
//! drained game events into cues, enforcing the per-player collision
//! cooldown so hull grinding does not machine-gun the speaker.

use crate::consts::sub;
use crate::sim::{GameEvent, MatchState, MatchStatus};

/// One-shot sound effects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    TorpedoLaunch,
    Explosion,
    Collision { player: u8 },
}

/// Output side of the audio collaborator. No return values feed back into
/// the simulation.
pub trait AudioBackend {
    fn play(&mut self, cue: SoundCue);
    /// Continuous engine parameter, called every frame
    fn update_engine(&mut self, moving: bool, speed: f32, max_speed: f32);
    fn start_ambient(&mut self);
    fn stop_ambient(&mut self);
}

/// Headless backend: traces cues to the log and drops them
#[derive(Debug, Default)]
pub struct NullBackend;

impl AudioBackend for NullBackend {
    fn play(&mut self, cue: SoundCue) {
        log::debug!("audio cue: {cue:?}");
    }

    fn update_engine(&mut self, _moving: bool, _speed: f32, _max_speed: f32) {}

    fn start_ambient(&mut self) {
        log::debug!("ambient loop started");
    }

    fn stop_ambient(&mut self) {
        log::debug!("ambient loop stopped");
    }
}

/// Minimum spacing between collision cues for the same player (seconds)
const COLLISION_COOLDOWN_SECS: f32 = 0.2;

/// Maps game events to backend cues and drives the continuous channels
pub struct AudioDirector {
    clock: f32,
    last_collision: [f32; 2],
    ambient_on: bool,
}

impl Default for AudioDirector {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioDirector {
    pub fn new() -> Self {
        Self {
            clock: 0.0,
            last_collision: [f32::NEG_INFINITY; 2],
            ambient_on: false,
        }
    }

    /// Feed one frame's worth of events and telemetry to the backend.
    pub fn update(
        &mut self,
        backend: &mut impl AudioBackend,
        state: &MatchState,
        events: &[GameEvent],
        dt: f32,
    ) {
        self.clock += dt;

        let playing = state.status == MatchStatus::Playing;
        if playing && !self.ambient_on {
            backend.start_ambient();
            self.ambient_on = true;
        } else if !playing && self.ambient_on {
            backend.stop_ambient();
            self.ambient_on = false;
        }

        let (moving, speed) = state.engine_state();
        backend.update_engine(moving, speed, sub::MAX_SPEED);

        for event in events {
            match event {
                GameEvent::TorpedoLaunched { .. } => backend.play(SoundCue::TorpedoLaunch),
                GameEvent::MatchOver { .. } => backend.play(SoundCue::Explosion),
                GameEvent::HullContact => {
                    self.play_collision(backend, 1);
                    self.play_collision(backend, 2);
                }
                // The hit itself is silent; the match-over explosion covers it
                GameEvent::SubmarineHit { .. } => {}
            }
        }
    }

    fn play_collision(&mut self, backend: &mut impl AudioBackend, player: u8) {
        let slot = (player - 1) as usize;
        if self.clock - self.last_collision[slot] < COLLISION_COOLDOWN_SECS {
            return;
        }
        self.last_collision[slot] = self.clock;
        backend.play(SoundCue::Collision { player });
    }
}
