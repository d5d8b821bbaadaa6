//! Sonar Duel - a two-player submarine arena game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (terrain, physics, combat, sonar sampling)
//! - `render`: CPU raster output (scene composition, visibility masking)
//! - `audio`: Sound collaborator contract and event-driven cue dispatch

pub mod audio;
pub mod render;
pub mod sim;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Nominal simulation timestep (60 Hz frame-stepped)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum elapsed time fed into a single tick (seconds); bounds the
    /// effect of frame stalls on idle timers
    pub const MAX_TICK_DT: f32 = 0.1;

    /// Arena dimensions (map units)
    pub const MAP_SIZE: f32 = 150.0;
    /// Display scale: screen pixels per map unit
    pub const SCALE: f32 = 4.0;
    /// Border padding around the arena in screen pixels
    pub const PADDING: f32 = 70.0;
    /// Extra border around the periscope preview buffer
    pub const ANNULUS_BORDER: f32 = 10.0;

    /// Visibility ring (screen pixels, around the forward-offset mask center)
    pub mod visibility {
        pub const INNER_RADIUS: f32 = 100.0;
        pub const OUTER_RADIUS: f32 = 125.0;
        pub const INNER_RADIUS_SQ: f32 = INNER_RADIUS * INNER_RADIUS;
        pub const OUTER_RADIUS_SQ: f32 = OUTER_RADIUS * OUTER_RADIUS;
        /// How far ahead of the submarine the ring is centered
        pub const MASK_FORWARD_OFFSET: f32 = 40.0;
        /// Brightness multiplier applied outside both rings
        pub const DIM_FACTOR: f32 = 0.1;
    }

    /// Low-resolution sonar ring readout
    pub mod sonar {
        /// Angular chunks around the full circle
        pub const SEGMENTS: usize = 50;
        /// Radial samples per chunk (endpoints included)
        pub const SAMPLES: usize = 3;
        /// Display ring radii (screen pixels)
        pub const RING_INNER: f32 = 100.0;
        pub const RING_OUTER: f32 = 125.0;
        /// Visual width of each chunk bar
        pub const CHUNK_WIDTH: f32 = 12.0;
        /// Gap between adjacent chunk bars
        pub const CHUNK_GAP: f32 = 1.0;
    }

    /// Submarine tuning
    pub mod sub {
        pub const WIDTH: f32 = 8.0;
        pub const HEIGHT: f32 = 4.0;
        pub const MAX_SPEED: f32 = 0.375;
        pub const ACCELERATION: f32 = 0.0125;
        pub const TURN_SPEED: f32 = 0.0125;
        pub const FRICTION: f32 = 0.98;
        /// Stronger decay than friction; braking only, no reverse thrust
        pub const BRAKE_FACTOR: f32 = 0.92;
        /// Speed below which the submarine counts as stopped
        pub const STOP_THRESHOLD: f32 = 0.05;
        /// Heat tint stays fully hot for this long after stopping
        pub const HOLD_HOT_SECONDS: f32 = 0.5;
        /// Then fades to cold over this duration
        pub const FADE_SECONDS: f32 = 1.5;
        /// Radius used for map-bounds clamping
        pub const COLLISION_RADIUS: f32 = 5.0;
        pub const SPAWN_CLEAR_RADIUS: f32 = 15.0;
        pub const MIN_SPAWN_DISTANCE: f32 = 80.0;
        /// Nose indicator extends this far past the hull
        pub const NOSE_LENGTH: f32 = 4.0;
        pub const TOWER_WIDTH: f32 = 2.0;
        pub const TOWER_HEIGHT: f32 = 2.0;
    }

    /// Torpedo tuning
    pub mod torpedo {
        /// Constant velocity magnitude (map units per tick)
        pub const SPEED: f32 = 1.5;
        /// Ticks before silent despawn
        pub const LIFETIME: u32 = 200;
        /// Ticks between shots
        pub const COOLDOWN: u32 = 30;
        /// Spawn distance in front of the submarine
        pub const SPAWN_DISTANCE: f32 = 8.0;
        pub const WIDTH: f32 = 4.0;
        pub const HEIGHT: f32 = 2.0;
        pub const TRAIL_WIDTH: f32 = 2.0;
        pub const TRAIL_HEIGHT: f32 = 1.0;
        pub const TRAIL_OFFSET: f32 = -2.0;
    }

    /// Terrain generation
    pub mod terrain {
        /// World units per grid cell
        pub const PIXEL_SIZE: f32 = 2.0;
        /// How far edge terrain extends inward (fraction of grid size)
        pub const EDGE_GROWTH_DEPTH: f32 = 0.25;
        pub const GROWTH_PROBABILITY: f32 = 0.25;
        pub const MIN_BLOBS: u32 = 3;
        pub const MAX_BLOBS: u32 = 6;
        pub const BLOB_MIN_SIZE: u32 = 40;
        pub const BLOB_MAX_SIZE: u32 = 80;
        /// World units a blob seed must keep from the border
        pub const BLOB_EDGE_MARGIN: f32 = 25.0;
        /// Grid cells that must be clear around a blob seed (Chebyshev)
        pub const BLOB_CLEAR_RADIUS: i32 = 3;
        pub const BLOB_GROWTH_PROBABILITY: f32 = 0.6;
        /// Solid neighbors (of 8) for a solid cell to survive smoothing
        pub const SMOOTH_SURVIVE_THRESHOLD: u32 = 3;
        /// Solid neighbors (of 8) for an open cell to be born
        pub const SMOOTH_BIRTH_THRESHOLD: u32 = 5;
    }

    /// Particle effects
    pub mod particles {
        pub const EXPLOSION_COUNT: u32 = 15;
        pub const DEBRIS_COUNT: u32 = 30;
        pub const MIN_SIZE: f32 = 1.0;
        pub const MAX_SIZE: f32 = 3.0;
        pub const EXPLOSION_SPEED_MIN: f32 = 0.5;
        pub const EXPLOSION_SPEED_MAX: f32 = 2.0;
        pub const EXPLOSION_LIFE_MIN: f32 = 20.0;
        pub const EXPLOSION_LIFE_MAX: f32 = 40.0;
        pub const DEBRIS_SPEED_MIN: f32 = 0.2;
        pub const DEBRIS_SPEED_MAX: f32 = 1.5;
        pub const DEBRIS_LIFE_MIN: f32 = 30.0;
        pub const DEBRIS_LIFE_MAX: f32 = 60.0;
        pub const FRICTION: f32 = 0.95;
    }

    /// Collision resolution
    pub mod collision {
        /// Fraction of penetration depth applied as separation per submarine
        pub const PUSH_FACTOR: f32 = 0.5;
        /// Velocity multiplier on hull contact (applied negated: a bounce)
        pub const BOUNCE_DAMPING: f32 = 0.5;
        /// Proximity radius for torpedo detection in sonar sampling
        pub const TORPEDO_CHECK_RADIUS: f32 = 3.0;
    }

    /// Console-green display palette, RGB
    pub mod colors {
        pub const BACKGROUND: [u8; 3] = [0, 255, 0];
        pub const ARENA: [u8; 3] = [0, 0, 0];
        pub const TERRAIN: [u8; 3] = [0, 255, 0];
        pub const TORPEDO: [u8; 3] = [255, 0, 0];
        pub const TORPEDO_TRAIL_ALPHA: u8 = 100;
        pub const PARTICLE: [u8; 3] = [0, 255, 0];
        /// Heat tint endpoints: cold (idle) and hot (moving)
        pub const SUB_COLD: [u8; 3] = [0, 255, 0];
        pub const SUB_HOT: [u8; 3] = [255, 0, 0];
    }
}

/// Unit vector for a heading angle
#[inline]
pub fn heading_vec(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Rotate a vector by an angle (counter-clockwise)
#[inline]
pub fn rotate_vec(v: Vec2, angle: f32) -> Vec2 {
    let (sin_a, cos_a) = angle.sin_cos();
    Vec2::new(v.x * cos_a - v.y * sin_a, v.x * sin_a + v.y * cos_a)
}

/// Linear interpolation
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Replace a non-finite value with zero
#[inline]
pub fn sanitize(value: f32) -> f32 {
    if value.is_finite() { value } else { 0.0 }
}

/// Convert a map-space position to screen space
#[inline]
pub fn map_to_screen(pos: Vec2) -> Vec2 {
    Vec2::splat(consts::PADDING) + pos * consts::SCALE
}

/// Convert a screen-space position back to map space
#[inline]
pub fn screen_to_map(pos: Vec2) -> Vec2 {
    (pos - Vec2::splat(consts::PADDING)) / consts::SCALE
}
