//! CPU raster rendering
//!
//! A small software pipeline: `frame` is the drawing surface (shapes plus
//! the raw pixel access the visibility passes require), `scene` composes
//! the three game views onto it.

pub mod frame;
pub mod scene;

pub use frame::Frame;
pub use scene::{
    apply_visibility_mask, main_view_size, periscope_size, render_main_view, render_periscope,
    render_sonar_panel, sonar_panel_size,
};
