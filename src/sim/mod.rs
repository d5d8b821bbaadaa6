//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure and
//! deterministic:
//! - Fixed timestep only (wall time appears solely as a clamped dt)
//! - Seeded RNG only, injected through the match state
//! - Single mutator: the tick routine; terrain is read-only after build
//! - No rendering or platform dependencies

pub mod collision;
pub mod state;
pub mod terrain;
pub mod tick;
pub mod visibility;

pub use collision::{hitbox_contains, torpedo_hits};
pub use state::{
    Entity, GameEvent, MatchState, MatchStatus, Particle, Submarine, Torpedo, spawn_debris,
    spawn_explosion,
};
pub use terrain::Terrain;
pub use tick::{PlayerInput, TickInput, tick};
pub use visibility::{
    ChunkEcho, in_annulus, mask_center, preview_rotation, sample_sonar_ring, sonar_rotation,
};
