//! Combat resolution: torpedo hit detection against the composite hitbox,
//! and the hull-contact bounce between the two submarines.
//!
//! The tricky part is the hit test: the submarine's silhouette is not a
//! circle but the union of three rectangles (hull, nose, conning tower) in
//! its own rotated frame, so the torpedo's point is carried into that frame
//! before three plain containment checks.

use glam::Vec2;

use super::state::{
    GameEvent, MatchState, MatchStatus, Submarine, spawn_debris, spawn_explosion,
};
use crate::consts::{collision, particles, sub};
use crate::rotate_vec;

/// Half height of the nose indicator rect in the local frame
const NOSE_HALF_HEIGHT: f32 = 1.0;

/// Test a world-space point against the submarine's composite hitbox:
/// hull rect, forward nose rect, and conning tower rect, all in the
/// submarine's rotated local frame.
pub fn hitbox_contains(submarine: &Submarine, point: Vec2) -> bool {
    let local = rotate_vec(point - submarine.pos, -submarine.heading);

    let half_w = sub::WIDTH / 2.0;
    let half_h = sub::HEIGHT / 2.0;

    // Main hull
    if local.x.abs() <= half_w && local.y.abs() <= half_h {
        return true;
    }

    // Extended nose, ahead of the hull
    if local.x >= half_w
        && local.x <= half_w + sub::NOSE_LENGTH
        && local.y.abs() <= NOSE_HALF_HEIGHT
    {
        return true;
    }

    // Conning tower, above the hull on the local -y side
    let tower_x0 = -sub::TOWER_WIDTH / 2.0;
    let tower_y0 = -half_h - 1.0;
    local.x >= tower_x0
        && local.x <= tower_x0 + sub::TOWER_WIDTH
        && local.y >= tower_y0
        && local.y <= tower_y0 + sub::TOWER_HEIGHT
}

/// Whether a live torpedo hits a live, opposing submarine at its current
/// position. A torpedo never reports a hit against its own owner.
pub fn torpedo_hits(owner: u8, torpedo_pos: Vec2, submarine: &Submarine) -> bool {
    if !submarine.alive || owner == submarine.player {
        return false;
    }
    hitbox_contains(submarine, torpedo_pos)
}

/// Run torpedo-vs-submarine resolution for the tick. Torpedoes are checked
/// newest to oldest; each can kill at most one submarine, after which it is
/// dead and spawns an explosion burst. Dead torpedoes are dropped afterwards
/// with a stable `retain` pass.
pub fn resolve_torpedo_hits(state: &mut MatchState) {
    let mut hits: Vec<(u8, Vec2)> = Vec::new();

    for i in (0..state.torpedoes.len()).rev() {
        if !state.torpedoes[i].alive {
            continue;
        }
        let (owner, pos) = (state.torpedoes[i].owner, state.torpedoes[i].pos);

        for s in state.subs.iter_mut() {
            if torpedo_hits(owner, pos, s) {
                s.kill();
                state.torpedoes[i].alive = false;
                hits.push((s.player, pos));
                break;
            }
        }
    }

    for (player, pos) in hits {
        spawn_explosion(
            &mut state.particles,
            pos,
            particles::EXPLOSION_COUNT,
            &mut state.rng,
        );
        state.push_event(GameEvent::SubmarineHit { player, pos });
    }

    state.torpedoes.retain(|t| t.alive);
}

/// Push overlapping submarines apart and bounce their velocities. Purely
/// positional; hull contact never deals damage.
pub fn resolve_submarine_contact(state: &mut MatchState) {
    {
        let [s1, s2] = &mut state.subs;
        if !s1.alive || !s2.alive {
            return;
        }

        let delta = s2.pos - s1.pos;
        let dist = delta.length();
        let min_dist = (sub::WIDTH + sub::WIDTH) / 2.0;

        // Zero distance has no separation axis; leave it to the next tick
        if dist >= min_dist || dist <= 0.0 {
            return;
        }

        let dir = delta / dist;
        let push = (min_dist - dist) * collision::PUSH_FACTOR;
        s1.pos -= dir * push;
        s2.pos += dir * push;

        s1.vel *= -collision::BOUNCE_DAMPING;
        s2.vel *= -collision::BOUNCE_DAMPING;
    }

    state.push_event(GameEvent::HullContact);
}

/// Flip the match to its terminal state when a submarine has died this
/// tick, crediting the surviving player and scattering debris.
pub fn detect_match_over(state: &mut MatchState) {
    if state.status != MatchStatus::Playing {
        return;
    }

    let loser = if !state.subs[0].alive {
        Some(0)
    } else if !state.subs[1].alive {
        Some(1)
    } else {
        None
    };

    if let Some(loser) = loser {
        let winner = if loser == 0 { 2 } else { 1 };
        let pos = state.subs[loser].pos;
        spawn_debris(
            &mut state.particles,
            pos,
            particles::DEBRIS_COUNT,
            &mut state.rng,
        );
        state.status = MatchStatus::Over { winner };
        state.push_event(GameEvent::MatchOver { winner });
        log::info!("player {winner} wins after {} ticks", state.time_ticks);
    }
}
