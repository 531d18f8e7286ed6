//! Random glitch poses and their inline-style rendering.

use rand::Rng;

use super::config::GlitchConfig;

/// One frame's worth of state for a slice layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlicePose {
    pub visible: bool,
    /// Horizontal displacement in px.
    pub offset_x: f64,
    /// Top of the visible band, as a fraction of the element height.
    pub clip_top: f64,
    /// Height of the visible band, as a fraction of the element height.
    pub clip_height: f64,
    /// Hue rotation in degrees.
    pub hue: f64,
    pub saturate: bool,
    pub invert: bool,
}

impl SlicePose {
    pub const HIDDEN: SlicePose = SlicePose {
        visible: false,
        offset_x: 0.0,
        clip_top: 0.0,
        clip_height: 0.0,
        hue: 0.0,
        saturate: false,
        invert: false,
    };
}

/// Jitter applied to the base layer, in px.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Shake {
    pub x: f64,
    pub y: f64,
}

/// Roll a fresh slice pose. `strength` is the effective intensity for this
/// tick (configured intensity times the time-span factor).
pub fn roll_slice<R: Rng>(rng: &mut R, cfg: &GlitchConfig, strength: f64) -> SlicePose {
    let strength = strength.clamp(0.0, 1.0);
    let visible = rng.random_bool(strength);
    let (lo, hi) = (cfg.slice.min_height, cfg.slice.max_height);
    let clip_height = if hi > lo { rng.random_range(lo..=hi) } else { lo };
    let clip_top = rng.random::<f64>() * (1.0 - clip_height);
    let offset_x = rng.random_range(-1.0..=1.0) * cfg.slice.max_offset * strength;
    let (hue, saturate, invert) = if cfg.filters {
        let hue = if cfg.slice.hue_rotate {
            rng.random::<f64>() * 360.0
        } else {
            0.0
        };
        (
            hue,
            rng.random_bool(0.3 * strength),
            rng.random_bool(0.1 * strength),
        )
    } else {
        (0.0, false, false)
    };
    SlicePose {
        visible,
        offset_x,
        clip_top,
        clip_height,
        hue,
        saturate,
        invert,
    }
}

pub fn roll_shake<R: Rng>(rng: &mut R, cfg: &GlitchConfig, strength: f64) -> Shake {
    let amplitude = cfg.shake_intensity * strength.clamp(0.0, 1.0);
    if !cfg.shake || amplitude <= 0.0 {
        return Shake::default();
    }
    Shake {
        x: rng.random_range(-amplitude..=amplitude),
        y: rng.random_range(-amplitude..=amplitude),
    }
}

/// Inline style values written to one layer element. `None` renders as the
/// property's neutral value.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerStyle {
    pub opacity: f64,
    pub transform: Option<String>,
    pub clip_path: Option<String>,
    pub filter: Option<String>,
}

impl LayerStyle {
    /// Base layer at rest: fully visible, untransformed.
    pub fn base_rest() -> Self {
        Self {
            opacity: 1.0,
            transform: None,
            clip_path: None,
            filter: None,
        }
    }

    /// Decorative layer at rest: hidden.
    pub fn slice_rest() -> Self {
        Self {
            opacity: 0.0,
            ..Self::base_rest()
        }
    }

    pub fn base(shake: Shake, scale: f64) -> Self {
        let moved = shake.x != 0.0 || shake.y != 0.0;
        let transform = match (moved, scale != 1.0) {
            (false, false) => None,
            (true, false) => Some(format!("translate({:.2}px, {:.2}px)", shake.x, shake.y)),
            (false, true) => Some(format!("scale({scale:.4})")),
            (true, true) => Some(format!(
                "translate({:.2}px, {:.2}px) scale({scale:.4})",
                shake.x, shake.y
            )),
        };
        Self {
            transform,
            ..Self::base_rest()
        }
    }

    pub fn slice(pose: &SlicePose, scale: f64) -> Self {
        if !pose.visible {
            return Self::slice_rest();
        }
        let mut transform = format!("translate({:.2}px, 0px)", pose.offset_x);
        if scale != 1.0 {
            transform.push_str(&format!(" scale({scale:.4})"));
        }
        let top = pose.clip_top * 100.0;
        let bottom = ((1.0 - pose.clip_top - pose.clip_height) * 100.0).max(0.0);
        let mut filters = Vec::new();
        if pose.hue != 0.0 {
            filters.push(format!("hue-rotate({:.1}deg)", pose.hue));
        }
        if pose.saturate {
            filters.push("saturate(2)".to_string());
        }
        if pose.invert {
            filters.push("invert(1)".to_string());
        }
        Self {
            opacity: 1.0,
            transform: Some(transform),
            clip_path: Some(format!("inset({top:.2}% 0 {bottom:.2}% 0)")),
            filter: (!filters.is_empty()).then(|| filters.join(" ")),
        }
    }
}
