//! Game state and core simulation types
//!
//! Everything that must survive a snapshot lives here. Visual-only state
//! (particles, pending events) is skipped during serialization.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::terrain::Terrain;
use crate::consts::{self, colors, particles, sub, torpedo};
use crate::{heading_vec, lerp, sanitize};

/// Whether the match is still being played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    Playing,
    /// Terminal; the winner is the surviving player
    Over { winner: u8 },
}

/// Things that happened during a tick, drained by the caller for audio
/// and any other collaborators. Never fed back into the simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    TorpedoLaunched { player: u8 },
    SubmarineHit { player: u8, pos: Vec2 },
    HullContact,
    MatchOver { winner: u8 },
}

/// Common view of anything that can be hit or sampled
pub trait Entity {
    fn position(&self) -> Vec2;
    fn is_alive(&self) -> bool;
}

/// A player's submarine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submarine {
    /// Player number, 1 or 2
    pub player: u8,
    pub pos: Vec2,
    /// Heading in radians; unbounded, only ever used through sin/cos
    pub heading: f32,
    pub vel: Vec2,
    /// Scalar speed maintained by the controls, separate from `vel` so
    /// braking and friction can decay them independently
    pub speed: f32,
    pub alive: bool,
    /// Ticks until the next torpedo may fire
    pub torpedo_cooldown: u32,
    /// Seconds spent below the stop threshold without steering
    pub idle_time: f32,
    /// Set by `turn`, cleared at the end of each update
    #[serde(skip)]
    pub steering: bool,
}

impl Entity for Submarine {
    fn position(&self) -> Vec2 {
        self.pos
    }
    fn is_alive(&self) -> bool {
        self.alive
    }
}

impl Submarine {
    pub fn new(pos: Vec2, player: u8) -> Self {
        Self {
            player,
            pos,
            // Face each other across the arena
            heading: if player == 1 { 0.0 } else { std::f32::consts::PI },
            vel: Vec2::ZERO,
            speed: 0.0,
            alive: true,
            torpedo_cooldown: 0,
            idle_time: 0.0,
            steering: false,
        }
    }

    /// Half extents of the unrotated footprint used for terrain collision
    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(sub::WIDTH / 2.0, sub::HEIGHT / 2.0)
    }

    /// Moving for engine/idle purposes: above the stop threshold, or
    /// actively steering in place
    pub fn is_moving(&self) -> bool {
        self.vel.length() > sub::STOP_THRESHOLD || self.steering
    }

    /// Per-tick physics update. `dt` is wall time (already clamped by the
    /// tick) and only feeds the idle timer; movement itself is per-tick.
    pub fn update(&mut self, terrain: &Terrain, dt: f32) {
        if !self.alive {
            return;
        }

        if self.torpedo_cooldown > 0 {
            self.torpedo_cooldown -= 1;
        }

        if self.is_moving() {
            self.idle_time = 0.0;
        } else {
            self.idle_time += dt;
        }
        self.steering = false;

        self.vel *= sub::FRICTION;

        // Axis-separated moves against the terrain footprint: a blocked axis
        // zeroes its velocity while the other may still advance, which lets
        // the submarine slide along walls.
        let half = self.half_extents();
        let new_x = self.pos.x + self.vel.x;
        if terrain.rect_overlaps_solid(Vec2::new(new_x, self.pos.y), half) {
            self.vel.x = 0.0;
        } else {
            self.pos.x = new_x;
        }
        let new_y = self.pos.y + self.vel.y;
        if terrain.rect_overlaps_solid(Vec2::new(self.pos.x, new_y), half) {
            self.vel.y = 0.0;
        } else {
            self.pos.y = new_y;
        }

        let limit = terrain.map_size() - sub::COLLISION_RADIUS;
        let clamped_x = self.pos.x.clamp(sub::COLLISION_RADIUS, limit);
        if clamped_x != self.pos.x {
            self.pos.x = clamped_x;
            self.vel.x = 0.0;
        }
        let clamped_y = self.pos.y.clamp(sub::COLLISION_RADIUS, limit);
        if clamped_y != self.pos.y {
            self.pos.y = clamped_y;
            self.vel.y = 0.0;
        }

        self.vel.x = sanitize(self.vel.x);
        self.vel.y = sanitize(self.vel.y);
    }

    /// Forward thrust only; non-positive directions are ignored (braking is
    /// the only way to shed speed)
    pub fn accelerate(&mut self, direction: f32) {
        if !self.alive || direction <= 0.0 {
            return;
        }
        self.speed = (self.speed + sub::ACCELERATION).clamp(0.0, sub::MAX_SPEED);
        self.vel = heading_vec(self.heading) * self.speed;
    }

    /// Decay velocity harder than friction does and resync scalar speed
    pub fn brake(&mut self) {
        if !self.alive {
            return;
        }
        self.vel *= sub::BRAKE_FACTOR;
        self.speed = self.vel.length();
    }

    pub fn turn(&mut self, direction: f32) {
        if !self.alive {
            return;
        }
        self.heading += sub::TURN_SPEED * direction;
        self.steering = true;
    }

    /// Launch a torpedo if alive and off cooldown
    pub fn fire_torpedo(&mut self) -> Option<Torpedo> {
        if !self.alive || self.torpedo_cooldown > 0 {
            return None;
        }
        self.torpedo_cooldown = torpedo::COOLDOWN;
        let spawn = self.pos + heading_vec(self.heading) * torpedo::SPAWN_DISTANCE;
        Some(Torpedo::new(spawn, self.heading, self.player))
    }

    /// Idempotent; terrain and bounds never call this, only torpedo hits do
    pub fn kill(&mut self) {
        self.alive = false;
    }

    /// Heat blend: 1.0 while recently moving, fading linearly to 0.0 after
    /// the hold window. Recomputed on every query.
    pub fn heat(&self) -> f32 {
        if self.idle_time <= sub::HOLD_HOT_SECONDS {
            1.0
        } else {
            (1.0 - (self.idle_time - sub::HOLD_HOT_SECONDS) / sub::FADE_SECONDS).clamp(0.0, 1.0)
        }
    }

    /// Display color: cold green at rest, hot red underway
    pub fn color(&self) -> [u8; 3] {
        let t = self.heat();
        [
            lerp(colors::SUB_COLD[0] as f32, colors::SUB_HOT[0] as f32, t) as u8,
            lerp(colors::SUB_COLD[1] as f32, colors::SUB_HOT[1] as f32, t) as u8,
            lerp(colors::SUB_COLD[2] as f32, colors::SUB_HOT[2] as f32, t) as u8,
        ]
    }
}

/// A torpedo in flight. Constant velocity, fixed heading, one-hit kill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Torpedo {
    pub pos: Vec2,
    pub heading: f32,
    pub vel: Vec2,
    /// Player that fired it; immune to its own torpedoes
    pub owner: u8,
    pub age: u32,
    pub alive: bool,
}

impl Entity for Torpedo {
    fn position(&self) -> Vec2 {
        self.pos
    }
    fn is_alive(&self) -> bool {
        self.alive
    }
}

impl Torpedo {
    pub fn new(pos: Vec2, heading: f32, owner: u8) -> Self {
        Self {
            pos,
            heading,
            vel: heading_vec(heading) * torpedo::SPEED,
            owner,
            age: 0,
            alive: true,
        }
    }

    /// Advance one tick. Check order: bounds (silent), terrain (explode),
    /// lifetime (silent expiry).
    pub fn update(&mut self, terrain: &Terrain) {
        if !self.alive {
            return;
        }

        self.vel.x = sanitize(self.vel.x);
        self.vel.y = sanitize(self.vel.y);
        self.pos += self.vel;
        self.age += 1;

        let map_size = terrain.map_size();
        if self.pos.x < 0.0 || self.pos.x > map_size || self.pos.y < 0.0 || self.pos.y > map_size {
            self.alive = false;
            return;
        }

        if terrain.is_solid(self.pos) {
            self.explode();
            return;
        }

        if self.age > torpedo::LIFETIME {
            self.alive = false;
        }
    }

    /// Terrain is permanent; only the torpedo dies
    pub fn explode(&mut self) {
        self.alive = false;
    }
}

/// Decorative point with velocity decay and a frame-counted lifespan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub lifespan: f32,
    pub max_lifespan: f32,
}

impl Particle {
    pub fn update(&mut self) {
        self.pos += self.vel;
        self.vel *= particles::FRICTION;
        self.lifespan -= 1.0;
    }

    pub fn is_dead(&self) -> bool {
        self.lifespan <= 0.0
    }

    /// Fade-out alpha derived from remaining lifespan
    pub fn alpha(&self) -> u8 {
        ((self.lifespan / self.max_lifespan).clamp(0.0, 1.0) * 255.0) as u8
    }
}

fn spawn_burst(
    out: &mut Vec<Particle>,
    pos: Vec2,
    count: u32,
    speed_range: (f32, f32),
    life_range: (f32, f32),
    rng: &mut impl Rng,
) {
    for _ in 0..count {
        let angle = rng.random_range(0.0..std::f32::consts::TAU);
        let speed = rng.random_range(speed_range.0..speed_range.1);
        let lifespan = rng.random_range(life_range.0..life_range.1);
        out.push(Particle {
            pos,
            vel: heading_vec(angle) * speed,
            size: rng.random_range(particles::MIN_SIZE..particles::MAX_SIZE),
            lifespan,
            max_lifespan: lifespan,
        });
    }
}

/// Fast, short-lived burst for torpedo impacts
pub fn spawn_explosion(out: &mut Vec<Particle>, pos: Vec2, count: u32, rng: &mut impl Rng) {
    spawn_burst(
        out,
        pos,
        count,
        (particles::EXPLOSION_SPEED_MIN, particles::EXPLOSION_SPEED_MAX),
        (particles::EXPLOSION_LIFE_MIN, particles::EXPLOSION_LIFE_MAX),
        rng,
    );
}

/// Slower, longer-lived scatter for a destroyed submarine
pub fn spawn_debris(out: &mut Vec<Particle>, pos: Vec2, count: u32, rng: &mut impl Rng) {
    spawn_burst(
        out,
        pos,
        count,
        (particles::DEBRIS_SPEED_MIN, particles::DEBRIS_SPEED_MAX),
        (particles::DEBRIS_LIFE_MIN, particles::DEBRIS_LIFE_MAX),
        rng,
    );
}

/// Complete per-match state: terrain, both submarines, live torpedoes,
/// decorative particles, and the match RNG. Rebuilt wholesale on restart.
#[derive(Clone, Serialize, Deserialize)]
pub struct MatchState {
    /// Seed this match was built from, for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub time_ticks: u64,
    pub status: MatchStatus,
    pub terrain: Terrain,
    pub subs: [Submarine; 2],
    pub torpedoes: Vec<Torpedo>,
    #[serde(skip)]
    pub particles: Vec<Particle>,
    #[serde(skip)]
    events: Vec<GameEvent>,
}

impl MatchState {
    /// Build a fresh match: generate terrain, then place both submarines at
    /// safe spawns in opposite corners.
    pub fn new(seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let terrain = Terrain::generate(consts::MAP_SIZE, &mut rng);

        let spawn1 = terrain.find_safe_spawn(Vec2::new(20.0, 20.0), None);
        let spawn2 = terrain.find_safe_spawn(
            Vec2::new(consts::MAP_SIZE - 20.0, consts::MAP_SIZE - 20.0),
            Some(spawn1),
        );
        log::info!(
            "match {seed:#x}: spawns ({:.0}, {:.0}) / ({:.0}, {:.0})",
            spawn1.x,
            spawn1.y,
            spawn2.x,
            spawn2.y
        );

        Self {
            seed,
            rng,
            time_ticks: 0,
            status: MatchStatus::Playing,
            terrain,
            subs: [Submarine::new(spawn1, 1), Submarine::new(spawn2, 2)],
            torpedoes: Vec::new(),
            particles: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Next match seed, drawn from this match's RNG so a whole session
    /// replays from the initial seed
    pub fn next_seed(&mut self) -> u64 {
        self.rng.random()
    }

    pub fn submarine(&self, player: u8) -> &Submarine {
        &self.subs[(player - 1) as usize]
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Drain the events produced since the last call
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Engine telemetry for the audio collaborator: is either submarine
    /// moving, and the faster of the two speeds
    pub fn engine_state(&self) -> (bool, f32) {
        let moving = self.subs.iter().any(|s| s.alive && s.is_moving());
        let speed = self
            .subs
            .iter()
            .map(|s| s.vel.length())
            .fold(0.0f32, f32::max);
        (moving, speed)
    }
}
