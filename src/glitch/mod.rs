//! Layered glitch animation, independent of the DOM.
//!
//! An element is stacked with N clipped clones ("slices"). Each applied frame
//! rolls a pose per slice plus a shake for the base layer; `wasm::glitch`
//! writes those poses onto real elements.

mod animator;
mod config;
mod control;
mod crawler;
mod envelope;
mod interpolate;
mod pose;
mod registry;

pub use animator::{Animator, LayerSurface};
pub use config::{
    GlitchConfig, GlitchTimeSpan, PlayMode, SliceConfig, TimeWindow, MAX_FPS, MAX_LAYERS,
};
pub use control::{GlitchCore, RunState};
pub use crawler::is_crawler;
pub use envelope::{cycle_progress, glitch_factor, pulse_scale, CYCLE_MS};
pub use interpolate::{ease_out_quad, Keyframes, SliceTween, Tween};
pub use pose::{roll_shake, roll_slice, LayerStyle, Shake, SlicePose};
pub use registry::{GlitchToken, Registry};
