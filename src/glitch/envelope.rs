//! Time shaping over the fixed 2 second animation cycle.

use std::f64::consts::TAU;

use super::config::TimeWindow;

pub const CYCLE_MS: f64 = 2000.0;
pub const PULSE_AMPLITUDE: f64 = 0.02;

/// Position within the current cycle, in `[0, 1)`.
pub fn cycle_progress(elapsed_ms: f64) -> f64 {
    if !elapsed_ms.is_finite() || elapsed_ms <= 0.0 {
        return 0.0;
    }
    (elapsed_ms % CYCLE_MS) / CYCLE_MS
}

/// Multiplier applied to the configured intensity.
///
/// Without a window the glitch runs at full strength all cycle. With one, it
/// ramps linearly from zero at `start` to one at the midpoint and back to
/// zero at `end`; outside the window it is zero.
pub fn glitch_factor(window: Option<TimeWindow>, progress: f64) -> f64 {
    let Some(TimeWindow { start, end }) = window else {
        return 1.0;
    };
    if progress <= start || progress >= end {
        return 0.0;
    }
    let mid = (start + end) / 2.0;
    let half = (end - start) / 2.0;
    (1.0 - (progress - mid).abs() / half).clamp(0.0, 1.0)
}

/// Uniform scale for the `pulse` option.
pub fn pulse_scale(progress: f64) -> f64 {
    1.0 + PULSE_AMPLITUDE * (TAU * progress).sin()
}
