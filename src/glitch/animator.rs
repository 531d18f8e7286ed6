//! Per-instance frame driver.
//!
//! Called on every display refresh; applies an update only when
//! `1000 / fps` ms have passed since the last applied one.

use rand::rngs::SmallRng;
use rand::SeedableRng;

use super::config::GlitchConfig;
use super::envelope::{cycle_progress, glitch_factor, pulse_scale};
use super::interpolate::Keyframes;
use super::pose::{roll_shake, roll_slice, LayerStyle, Shake, SlicePose};

/// Where poses get written. The browser implementation sets inline styles on
/// the base element and its clones.
pub trait LayerSurface {
    fn slice_count(&self) -> usize;
    fn apply_base(&mut self, style: &LayerStyle);
    fn apply_slice(&mut self, index: usize, style: &LayerStyle);
}

#[derive(Debug, Clone)]
enum Strategy {
    /// Fresh, uncorrelated randomness every applied frame.
    Instant,
    /// Low-frequency keyframes eased across the frames in between.
    Interpolated(Keyframes),
}

#[derive(Debug, Clone)]
pub struct Animator {
    config: GlitchConfig,
    rng: SmallRng,
    strategy: Strategy,
    started_at: f64,
    last_applied: Option<f64>,
}

impl Animator {
    /// The update strategy is fixed here for the lifetime of the animator.
    pub fn new(config: GlitchConfig, seed: u64) -> Self {
        let strategy = if config.smooth_transitions {
            Strategy::Interpolated(Keyframes::new(
                config.layers,
                config.keyframe_interval_ms(),
                config.visibility_snap,
            ))
        } else {
            Strategy::Instant
        };
        Self {
            config,
            rng: SmallRng::seed_from_u64(seed),
            strategy,
            started_at: 0.0,
            last_applied: None,
        }
    }

    pub fn config(&self) -> &GlitchConfig {
        &self.config
    }

    pub fn is_interpolated(&self) -> bool {
        matches!(self.strategy, Strategy::Interpolated(_))
    }

    /// Mark the start of a run at `now` (ms).
    pub fn begin(&mut self, now: f64) {
        self.started_at = now;
        self.last_applied = None;
        if let Strategy::Interpolated(keyframes) = &mut self.strategy {
            keyframes.reset();
        }
    }

    /// Offer a display frame. Returns whether an update was applied.
    pub fn frame<S: LayerSurface + ?Sized>(&mut self, now: f64, surface: &mut S) -> bool {
        if let Some(last) = self.last_applied {
            if now - last < self.config.frame_interval_ms() {
                return false;
            }
        }
        self.last_applied = Some(now);

        let progress = cycle_progress(now - self.started_at);
        let strength =
            self.config.intensity * glitch_factor(self.config.glitch_time_span.window(), progress);
        let scale = if self.config.pulse {
            pulse_scale(progress)
        } else {
            1.0
        };
        let count = surface.slice_count();

        match &mut self.strategy {
            Strategy::Instant => {
                for index in 0..count {
                    let pose = roll_slice(&mut self.rng, &self.config, strength);
                    surface.apply_slice(index, &LayerStyle::slice(&pose, scale));
                }
                let shake = roll_shake(&mut self.rng, &self.config, strength);
                surface.apply_base(&LayerStyle::base(shake, scale));
            }
            Strategy::Interpolated(keyframes) if strength <= 0.0 => {
                // A keyframe rolled inside the window must not keep easing
                // once the window has closed.
                keyframes.reset();
                for index in 0..count {
                    surface.apply_slice(index, &LayerStyle::slice_rest());
                }
                surface.apply_base(&LayerStyle::base(Shake::default(), scale));
            }
            Strategy::Interpolated(keyframes) => {
                if keyframes.due(now) {
                    let slices: Vec<SlicePose> = (0..count)
                        .map(|_| roll_slice(&mut self.rng, &self.config, strength))
                        .collect();
                    let shake = roll_shake(&mut self.rng, &self.config, strength);
                    keyframes.push(now, &slices, shake);
                }
                let (slices, shake) = keyframes.sample(now);
                for (index, pose) in slices.iter().enumerate().take(count) {
                    surface.apply_slice(index, &LayerStyle::slice(pose, scale));
                }
                surface.apply_base(&LayerStyle::base(shake, scale));
            }
        }
        true
    }

    /// Write the neutral pose: decorative layers hidden, base opaque and
    /// untransformed.
    pub fn rest<S: LayerSurface + ?Sized>(&self, surface: &mut S) {
        for index in 0..surface.slice_count() {
            surface.apply_slice(index, &LayerStyle::slice_rest());
        }
        surface.apply_base(&LayerStyle::base_rest());
    }
}
