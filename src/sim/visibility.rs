//! Visibility geometry: forward-offset mask centers, annulus membership,
//! and the low-resolution sonar ring sampler.
//!
//! Everything here is pure math over the match state; the render layer
//! turns these answers into pixels. Screen space means arena pixels
//! (`PADDING + map * SCALE`), which is where the ring radii are defined.

use glam::Vec2;

use super::state::{MatchState, Submarine};
use crate::consts::{collision, colors, sonar, sub, visibility};
use crate::{heading_vec, lerp, map_to_screen, rotate_vec, screen_to_map};

use std::f32::consts::{FRAC_PI_2, PI};

/// Extra reach around the hull when a sonar sample looks for a submarine
const SUB_ECHO_MARGIN: f32 = 2.0;

/// Center of a submarine's visibility ring, offset ahead of the submarine
/// along its heading (screen space).
pub fn mask_center(submarine: &Submarine) -> Vec2 {
    map_to_screen(submarine.pos) + heading_vec(submarine.heading) * visibility::MASK_FORWARD_OFFSET
}

/// Ring membership for a squared distance from a mask center. The interval
/// is closed: both radii are part of the ring.
pub fn in_annulus(dist_sq: f32) -> bool {
    dist_sq >= visibility::INNER_RADIUS_SQ && dist_sq <= visibility::OUTER_RADIUS_SQ
}

/// Rotation applied to the periscope preview so the submarine's heading
/// points screen-up, flipped so its own marker sits at the bottom of the
/// ring looking ahead.
pub fn preview_rotation(submarine: &Submarine) -> f32 {
    FRAC_PI_2 - submarine.heading + PI
}

/// The sonar ring rotates a quarter turn further than the preview.
pub fn sonar_rotation(submarine: &Submarine) -> f32 {
    preview_rotation(submarine) + FRAC_PI_2
}

/// What one angular chunk of the sonar ring reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkEcho {
    /// A submarine contact, carrying its current heat tint
    Submarine { player: u8, color: [u8; 3] },
    Torpedo,
    Terrain,
    Empty,
}

impl ChunkEcho {
    /// Display color for the chunk bar
    pub fn color(self) -> [u8; 3] {
        match self {
            ChunkEcho::Submarine { color, .. } => color,
            ChunkEcho::Torpedo => colors::TORPEDO,
            ChunkEcho::Terrain => colors::TERRAIN,
            ChunkEcho::Empty => colors::ARENA,
        }
    }
}

/// Category priority across a chunk's samples: any submarine echo wins,
/// then torpedoes, then terrain, then open water.
fn resolve_echo(
    submarine: Option<(u8, [u8; 3])>,
    torpedo_seen: bool,
    terrain_seen: bool,
) -> ChunkEcho {
    if let Some((player, color)) = submarine {
        ChunkEcho::Submarine { player, color }
    } else if torpedo_seen {
        ChunkEcho::Torpedo
    } else if terrain_seen {
        ChunkEcho::Terrain
    } else {
        ChunkEcho::Empty
    }
}

/// Whether a map-space point registers as a submarine echo
pub fn near_submarine(point: Vec2, submarine: &Submarine) -> bool {
    submarine.alive && point.distance(submarine.pos) < sub::WIDTH / 2.0 + SUB_ECHO_MARGIN
}

/// World-map position of one sonar sample: a point on the ring at
/// `chunk_angle`/`radius`, carried back through the inverse ring rotation
/// and re-anchored at the mask center.
pub fn sample_position(mask_center: Vec2, chunk_angle: f32, radius: f32, rotation: f32) -> Vec2 {
    let local = heading_vec(chunk_angle) * radius;
    screen_to_map(mask_center + rotate_vec(local, -rotation))
}

/// Classify one chunk of the sonar ring for the given observer.
pub fn sample_chunk(state: &MatchState, observer: u8, chunk_angle: f32) -> ChunkEcho {
    let me = state.submarine(observer);
    let center = mask_center(me);
    let rotation = sonar_rotation(me);

    let mut submarine = None;
    let mut torpedo_seen = false;
    let mut terrain_seen = false;

    for s in 0..sonar::SAMPLES {
        let radius = lerp(
            visibility::INNER_RADIUS,
            visibility::OUTER_RADIUS,
            s as f32 / (sonar::SAMPLES - 1) as f32,
        );
        let point = sample_position(center, chunk_angle, radius, rotation);

        for other in &state.subs {
            if near_submarine(point, other) {
                submarine = Some((other.player, other.color()));
            }
        }

        if !torpedo_seen {
            torpedo_seen = state.torpedoes.iter().any(|t| {
                t.alive && point.distance(t.pos) < collision::TORPEDO_CHECK_RADIUS
            });
        }

        if state.terrain.is_solid(point) {
            terrain_seen = true;
        }
    }

    resolve_echo(submarine, torpedo_seen, terrain_seen)
}

/// Classify the full ring: one echo per angular chunk.
pub fn sample_sonar_ring(state: &MatchState, observer: u8) -> Vec<ChunkEcho> {
    (0..sonar::SEGMENTS)
        .map(|i| {
            let chunk_angle = i as f32 / sonar::SEGMENTS as f32 * std::f32::consts::TAU;
            sample_chunk(state, observer, chunk_angle)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Torpedo;

    #[test]
    fn annulus_boundaries_are_inclusive() {
        assert!(in_annulus(visibility::INNER_RADIUS_SQ));
        assert!(in_annulus(visibility::OUTER_RADIUS_SQ));
        assert!(in_annulus((visibility::INNER_RADIUS_SQ + visibility::OUTER_RADIUS_SQ) / 2.0));
        assert!(!in_annulus(visibility::INNER_RADIUS_SQ - 1.0));
        assert!(!in_annulus(visibility::OUTER_RADIUS_SQ + 1.0));
    }

    #[test]
    fn mask_center_sits_ahead_of_the_submarine() {
        let mut s = Submarine::new(Vec2::new(75.0, 75.0), 1);
        s.heading = 0.0;
        let center = mask_center(&s);
        let screen = map_to_screen(s.pos);
        assert!((center.x - (screen.x + visibility::MASK_FORWARD_OFFSET)).abs() < 1e-4);
        assert!((center.y - screen.y).abs() < 1e-4);
    }

    #[test]
    fn echo_priority_submarine_beats_torpedo_beats_terrain() {
        let sub_echo = Some((2u8, colors::SUB_COLD));
        assert_eq!(
            resolve_echo(sub_echo, true, true),
            ChunkEcho::Submarine { player: 2, color: colors::SUB_COLD }
        );
        // A sample on both a live torpedo and solid terrain reads torpedo
        assert_eq!(resolve_echo(None, true, true), ChunkEcho::Torpedo);
        assert_eq!(resolve_echo(None, false, true), ChunkEcho::Terrain);
        assert_eq!(resolve_echo(None, false, false), ChunkEcho::Empty);
    }

    #[test]
    fn torpedo_on_a_sample_point_is_reported() {
        let mut state = MatchState::new(3);
        state.subs[0].pos = Vec2::new(75.0, 75.0);
        state.subs[0].heading = 0.0;
        // Keep the other submarine out of every chunk's reach
        state.subs[1].pos = Vec2::new(5.0, 145.0);

        let me = state.submarine(1);
        let center = mask_center(me);
        let rotation = sonar_rotation(me);
        let chunk_angle = 3.0 / sonar::SEGMENTS as f32 * std::f32::consts::TAU;
        let mid_radius = lerp(visibility::INNER_RADIUS, visibility::OUTER_RADIUS, 0.5);
        let point = sample_position(center, chunk_angle, mid_radius, rotation);

        state.torpedoes.push(Torpedo::new(point, 0.0, 2));

        let echo = sample_chunk(&state, 1, chunk_angle);
        assert_eq!(echo, ChunkEcho::Torpedo);
    }

    #[test]
    fn dead_submarines_leave_no_echo() {
        let mut s = Submarine::new(Vec2::new(75.0, 75.0), 1);
        assert!(near_submarine(Vec2::new(75.0, 75.0), &s));
        s.kill();
        assert!(!near_submarine(Vec2::new(75.0, 75.0), &s));
    }

    #[test]
    fn ring_covers_every_segment() {
        let state = MatchState::new(11);
        let ring = sample_sonar_ring(&state, 1);
        assert_eq!(ring.len(), sonar::SEGMENTS);
    }
}
