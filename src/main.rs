//! Sonar Duel entry point
//!
//! Headless demo driver: runs a scripted two-player match, then writes the
//! main view, the periscope previews, and the sonar panels as PNGs along
//! with a JSON snapshot of the final match state.
//!
//! Usage: sonar-duel [seed] [max_ticks] [out_dir]

use std::error::Error;
use std::path::{Path, PathBuf};

use sonar_duel::audio::{AudioDirector, NullBackend};
use sonar_duel::consts;
use sonar_duel::render::{self, Frame};
use sonar_duel::sim::{self, MatchState, MatchStatus, TickInput};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed: u64 = args.next().map(|s| s.parse()).transpose()?.unwrap_or(0xD1CE);
    let max_ticks: u64 = args.next().map(|s| s.parse()).transpose()?.unwrap_or(3600);
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| "out".into()));
    std::fs::create_dir_all(&out_dir)?;

    log::info!("running demo match: seed {seed:#x}, up to {max_ticks} ticks");

    let mut state = MatchState::new(seed);
    let mut director = AudioDirector::new();
    let mut backend = NullBackend;

    for tick_no in 0..max_ticks {
        let input = scripted_input(tick_no);
        sim::tick(&mut state, &input, consts::SIM_DT);

        let events = state.take_events();
        director.update(&mut backend, &state, &events, consts::SIM_DT);

        if let MatchStatus::Over { winner } = state.status {
            log::info!("player {winner} wins at tick {tick_no}");
            break;
        }
    }
    if state.status == MatchStatus::Playing {
        log::info!("no kill after {max_ticks} ticks; rendering the standoff");
    }

    let size = render::main_view_size();
    let mut main_frame = Frame::new(size, size);
    render::render_main_view(&mut main_frame, &state);
    save_png(&main_frame, &out_dir.join("main_view.png"))?;

    let size = render::periscope_size();
    let mut periscope = Frame::new(size, size);
    for player in [1u8, 2] {
        render::render_periscope(&mut periscope, &state, player);
        save_png(&periscope, &out_dir.join(format!("periscope_p{player}.png")))?;
    }

    let size = render::sonar_panel_size();
    let mut panel = Frame::new(size, size);
    for player in [1u8, 2] {
        render::render_sonar_panel(&mut panel, &state, player);
        save_png(&panel, &out_dir.join(format!("sonar_p{player}.png")))?;
    }

    let snapshot = serde_json::to_string_pretty(&state)?;
    std::fs::write(out_dir.join("match_state.json"), snapshot)?;
    log::info!("wrote snapshot and views to {}", out_dir.display());

    Ok(())
}

/// Canned two-player inputs: both push forward, weave on a slow beat, and
/// fire on offset rhythms so torpedoes cross the arena.
fn scripted_input(tick: u64) -> TickInput {
    let mut input = TickInput::default();
    for (i, player) in input.players.iter_mut().enumerate() {
        let weave = (tick / 150 + i as u64) % 3;
        player.forward = true;
        player.turn_left = weave == 1;
        player.turn_right = weave == 2;
        player.fire = tick % 45 == i as u64 * 15;
    }
    input
}

fn save_png(frame: &Frame, path: &Path) -> Result<(), Box<dyn Error>> {
    let img = image::RgbaImage::from_raw(
        frame.width() as u32,
        frame.height() as u32,
        frame.data().to_vec(),
    )
    .ok_or("framebuffer dimensions disagree with pixel data")?;
    img.save(path)?;
    log::info!("wrote {}", path.display());
    Ok(())
}
