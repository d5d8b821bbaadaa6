//! Scene composition: the main arena view with its visibility dim pass,
//! the per-player periscope preview, and the sonar ring panel.
//!
//! All three derive from the same mask center per submarine. The main view
//! dims everything outside both rings and then redraws the entities at full
//! brightness; the periscope renders the scene rotated heading-up and cuts
//! a ring out of it; the sonar panel never touches scene pixels at all and
//! just draws the sampled chunk colors.

use glam::Vec2;

use super::frame::Frame;
use crate::consts::{self, colors, sonar, sub, torpedo, visibility};
use crate::sim::{
    MatchState, Submarine, in_annulus, mask_center, preview_rotation, sample_sonar_ring,
    sonar_rotation,
};
use crate::{map_to_screen, rotate_vec};

#[inline]
fn opaque(rgb: [u8; 3]) -> [u8; 4] {
    [rgb[0], rgb[1], rgb[2], 255]
}

/// Edge length of the square main view
pub fn main_view_size() -> usize {
    (consts::MAP_SIZE * consts::SCALE + consts::PADDING * 2.0) as usize
}

/// Edge length of the square periscope preview buffer
pub fn periscope_size() -> usize {
    (visibility::OUTER_RADIUS * 2.0 + consts::ANNULUS_BORDER) as usize
}

/// Edge length of the square sonar panel
pub fn sonar_panel_size() -> usize {
    (sonar::RING_OUTER * 2.0) as usize
}

fn draw_terrain(frame: &mut Frame, state: &MatchState) {
    let terrain = &state.terrain;
    let ps = crate::consts::terrain::PIXEL_SIZE;
    let color = opaque(colors::TERRAIN);
    for y in 0..terrain.grid_size() {
        for x in 0..terrain.grid_size() {
            if terrain.cell(x, y) {
                frame.fill_rect(x as f32 * ps, y as f32 * ps, ps, ps, color);
            }
        }
    }
}

fn draw_particles(frame: &mut Frame, state: &MatchState) {
    for p in &state.particles {
        let [r, g, b] = colors::PARTICLE;
        frame.fill_ellipse(p.pos.x, p.pos.y, p.size, p.size, [r, g, b, p.alpha()]);
    }
}

fn draw_torpedoes(frame: &mut Frame, state: &MatchState) {
    for t in &state.torpedoes {
        if !t.alive {
            continue;
        }
        frame.push();
        frame.translate(t.pos);
        frame.rotate(t.heading);
        frame.fill_ellipse(0.0, 0.0, torpedo::WIDTH, torpedo::HEIGHT, opaque(colors::TORPEDO));
        let [r, g, b] = colors::TORPEDO;
        frame.fill_ellipse(
            torpedo::TRAIL_OFFSET,
            0.0,
            torpedo::TRAIL_WIDTH,
            torpedo::TRAIL_HEIGHT,
            [r, g, b, colors::TORPEDO_TRAIL_ALPHA],
        );
        frame.pop();
    }
}

fn draw_submarine(frame: &mut Frame, submarine: &Submarine) {
    if !submarine.alive {
        return;
    }
    let color = opaque(submarine.color());

    frame.push();
    frame.translate(submarine.pos);
    frame.rotate(submarine.heading);

    // Main hull
    frame.fill_rect(
        -sub::WIDTH / 2.0,
        -sub::HEIGHT / 2.0,
        sub::WIDTH,
        sub::HEIGHT,
        color,
    );
    // Extended nose for clearer direction
    frame.fill_rect(sub::WIDTH / 2.0, -1.0, sub::NOSE_LENGTH, 2.0, color);
    // Conning tower
    frame.fill_rect(
        -sub::TOWER_WIDTH / 2.0,
        -sub::HEIGHT / 2.0 - 1.0,
        sub::TOWER_WIDTH,
        sub::TOWER_HEIGHT,
        color,
    );

    frame.pop();
}

/// Directional self marker used inside the periscope and sonar displays:
/// a dot with a bow rect pointing screen-up.
fn draw_self_marker(frame: &mut Frame, pos: Vec2, submarine: &Submarine) {
    let ring_thickness = visibility::OUTER_RADIUS - visibility::INNER_RADIUS;
    let size = ring_thickness * 0.5;
    let color = opaque(submarine.color());

    frame.push();
    frame.translate(pos);
    frame.fill_ellipse(0.0, size * 0.1, size * 0.8, size * 0.8, color);
    frame.fill_rect(-size * 0.1, -size * 0.6, size * 0.2, size * 0.5, color);
    frame.pop();
}

/// Draw the arena and everything in it under the current transform. Used
/// both by the main view (identity) and the periscope (rotated).
fn draw_world(frame: &mut Frame, state: &MatchState) {
    frame.push();
    frame.translate(Vec2::splat(consts::PADDING));

    let arena_px = consts::MAP_SIZE * consts::SCALE;
    frame.fill_rect(0.0, 0.0, arena_px, arena_px, opaque(colors::ARENA));

    frame.scale(consts::SCALE);
    draw_terrain(frame, state);
    draw_particles(frame, state);
    draw_torpedoes(frame, state);
    for s in &state.subs {
        draw_submarine(frame, s);
    }

    frame.pop();
}

/// Dim every pixel outside both players' visibility rings. RGB only;
/// alpha stays as rendered.
pub fn apply_visibility_mask(frame: &mut Frame, state: &MatchState) {
    let centers = [mask_center(&state.subs[0]), mask_center(&state.subs[1])];

    for y in 0..frame.height() {
        for x in 0..frame.width() {
            let p = Vec2::new(x as f32, y as f32);
            let visible = centers
                .iter()
                .any(|c| in_annulus(p.distance_squared(*c)));
            if !visible {
                frame.dim_rgb(x, y, visibility::DIM_FACTOR);
            }
        }
    }
}

/// Full main view: scene, dim pass, then entities redrawn at full
/// brightness so they are never hidden by the mask.
pub fn render_main_view(frame: &mut Frame, state: &MatchState) {
    frame.clear(colors::BACKGROUND);
    draw_world(frame, state);
    apply_visibility_mask(frame, state);

    frame.push();
    frame.translate(Vec2::splat(consts::PADDING));
    frame.scale(consts::SCALE);
    for s in &state.subs {
        draw_submarine(frame, s);
    }
    draw_torpedoes(frame, state);
    frame.pop();
}

/// Periscope preview for one player: the scene rendered heading-up around
/// the mask center, cut down to the ring, with the submarine's own marker
/// at its transformed position.
pub fn render_periscope(frame: &mut Frame, state: &MatchState, player: u8) {
    let submarine = state.submarine(player);
    let size = frame.width() as f32;
    let buffer_center = Vec2::splat(size / 2.0);
    let center = mask_center(submarine);
    let rotation = preview_rotation(submarine);

    frame.clear(colors::BACKGROUND);

    frame.push();
    frame.translate(buffer_center);
    frame.rotate(rotation);
    frame.translate(-center);
    draw_world(frame, state);
    frame.pop();

    // Ring-shaped cutout of the square buffer
    for y in 0..frame.height() {
        for x in 0..frame.width() {
            let p = Vec2::new(x as f32, y as f32);
            if !in_annulus(p.distance_squared(buffer_center)) {
                frame.zero_alpha(x, y);
            }
        }
    }

    let to_sub = map_to_screen(submarine.pos) - center;
    let marker = buffer_center + rotate_vec(to_sub, rotation);
    draw_self_marker(frame, marker, submarine);
}

/// Sonar panel for one player: one colored bar per sampled chunk, plus the
/// self marker rotated a quarter turn past the periscope frame.
pub fn render_sonar_panel(frame: &mut Frame, state: &MatchState, player: u8) {
    let submarine = state.submarine(player);
    let size = frame.width() as f32;
    let panel_center = Vec2::splat(size / 2.0);

    frame.clear(colors::ARENA);

    let echoes = sample_sonar_ring(state, player);
    let avg_radius = (sonar::RING_INNER + sonar::RING_OUTER) / 2.0;
    let bar_height = sonar::RING_OUTER - sonar::RING_INNER - sonar::CHUNK_GAP;

    for (i, echo) in echoes.iter().enumerate() {
        let chunk_angle = i as f32 / sonar::SEGMENTS as f32 * std::f32::consts::TAU;
        frame.push();
        frame.translate(panel_center);
        frame.rotate(chunk_angle);
        frame.fill_rect(
            -sonar::CHUNK_WIDTH / 2.0,
            -avg_radius - bar_height / 2.0,
            sonar::CHUNK_WIDTH,
            bar_height,
            opaque(echo.color()),
        );
        frame.pop();
    }

    let to_sub = map_to_screen(submarine.pos) - mask_center(submarine);
    let rotated = rotate_vec(to_sub, sonar_rotation(submarine));
    // Marker sits a quarter turn counter-clockwise from the ring frame
    let marker = panel_center + Vec2::new(rotated.y, -rotated.x);
    draw_self_marker(frame, marker, submarine);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn centered_state() -> MatchState {
        let mut state = MatchState::new(17);
        state.subs[0].pos = Vec2::new(75.0, 75.0);
        state.subs[0].heading = 0.0;
        state.subs[1].pos = Vec2::new(30.0, 120.0);
        state
    }

    #[test]
    fn mask_dims_far_pixels_and_keeps_ring_pixels() {
        let state = centered_state();
        let size = main_view_size();
        let mut frame = Frame::new(size, size);
        frame.clear([200, 200, 200]);
        apply_visibility_mask(&mut frame, &state);

        let center = mask_center(&state.subs[0]);

        // A pixel squarely inside player 1's ring keeps full brightness
        let mid_r = (visibility::INNER_RADIUS + visibility::OUTER_RADIUS) / 2.0;
        let in_ring = center + Vec2::new(mid_r, 0.0);
        let kept = frame.pixel(in_ring.x as usize, in_ring.y as usize);
        assert_eq!(kept, [200, 200, 200, 255]);

        // The arena corner is far outside both rings and gets dimmed
        let dimmed = frame.pixel(1, 1);
        assert_eq!(dimmed, [20, 20, 20, 255]);
    }

    #[test]
    fn dim_pass_preserves_alpha() {
        let state = centered_state();
        let size = main_view_size();
        let mut frame = Frame::new(size, size);
        frame.clear([100, 100, 100]);
        apply_visibility_mask(&mut frame, &state);
        assert_eq!(frame.pixel(0, 0)[3], 255);
    }

    #[test]
    fn periscope_is_transparent_outside_the_ring() {
        let state = centered_state();
        let size = periscope_size();
        let mut frame = Frame::new(size, size);
        render_periscope(&mut frame, &state, 1);

        let c = size / 2;
        // Buffer center is inside the inner hole
        assert_eq!(frame.pixel(c, c)[3], 0);
        // A point at the ring's average radius keeps its alpha
        let mid_r = (visibility::INNER_RADIUS + visibility::OUTER_RADIUS) / 2.0;
        assert_eq!(frame.pixel(c + mid_r as usize, c)[3], 255);
        // Corners are outside the outer radius
        assert_eq!(frame.pixel(0, 0)[3], 0);
    }

    #[test]
    fn sonar_panel_draws_all_chunks() {
        let state = centered_state();
        let size = sonar_panel_size();
        let mut frame = Frame::new(size, size);
        render_sonar_panel(&mut frame, &state, 1);

        // The bar for chunk 0 sits directly above the panel center and is
        // painted with that chunk's sampled color
        let echoes = sample_sonar_ring(&state, 1);
        let c = size / 2;
        let avg = ((sonar::RING_INNER + sonar::RING_OUTER) / 2.0) as usize;
        let [r, g, b, a] = frame.pixel(c, c - avg);
        assert_eq!([r, g, b], echoes[0].color());
        assert_eq!(a, 255);
    }
}
