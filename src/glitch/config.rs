use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::UiError;

/// How start/stop are wired to user interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayMode {
    #[default]
    Always,
    Hover,
    Click,
    Manual,
}

/// Fraction of the 2 second cycle during which the glitch is active.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: f64,
    pub end: f64,
}

impl TimeWindow {
    pub const MIDDLE_HALF: TimeWindow = TimeWindow {
        start: 0.25,
        end: 0.75,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GlitchTimeSpan {
    Enabled(bool),
    Window(TimeWindow),
}

impl Default for GlitchTimeSpan {
    fn default() -> Self {
        GlitchTimeSpan::Enabled(false)
    }
}

impl GlitchTimeSpan {
    pub fn window(&self) -> Option<TimeWindow> {
        match *self {
            GlitchTimeSpan::Enabled(false) => None,
            GlitchTimeSpan::Enabled(true) => Some(TimeWindow::MIDDLE_HALF),
            GlitchTimeSpan::Window(w) => Some(w),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SliceConfig {
    /// Smallest band height, as a fraction of the element height.
    pub min_height: f64,
    /// Largest band height, as a fraction of the element height.
    pub max_height: f64,
    pub hue_rotate: bool,
    /// Largest horizontal displacement of a band, in px.
    pub max_offset: f64,
}

impl Default for SliceConfig {
    fn default() -> Self {
        Self {
            min_height: 0.02,
            max_height: 0.15,
            hue_rotate: true,
            max_offset: 12.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GlitchConfig {
    pub play_mode: PlayMode,
    pub intensity: f64,
    pub fps: f64,
    pub layers: usize,
    pub slice: SliceConfig,
    pub shake: bool,
    pub shake_intensity: f64,
    pub pulse: bool,
    pub glitch_time_span: GlitchTimeSpan,
    pub filters: bool,
    pub hide_overflow: bool,
    pub create_containers: bool,
    pub smooth_transitions: bool,
    pub glitch_frequency: f64,
    pub optimize_seo: bool,
    /// Pause between the stop and restart of a click-triggered burst, in ms.
    pub click_restart_delay: u32,
    /// Point of an interpolation window at which slice visibility snaps.
    pub visibility_snap: f64,
}

impl Default for GlitchConfig {
    fn default() -> Self {
        Self {
            play_mode: PlayMode::Always,
            intensity: 0.5,
            fps: 15.0,
            layers: 3,
            slice: SliceConfig::default(),
            shake: true,
            shake_intensity: 4.0,
            pulse: false,
            glitch_time_span: GlitchTimeSpan::default(),
            filters: true,
            hide_overflow: true,
            create_containers: true,
            smooth_transitions: false,
            glitch_frequency: 4.0,
            optimize_seo: true,
            click_restart_delay: 100,
            visibility_snap: 0.5,
        }
    }
}

pub const MAX_LAYERS: usize = 16;
pub const MAX_FPS: f64 = 240.0;

impl GlitchConfig {
    /// Parse a JSON options object. Missing keys take their defaults, and so
    /// does any key whose value has the wrong type: it is logged and dropped
    /// without discarding the rest of the options.
    pub fn from_json(json: &str) -> Result<Self, UiError> {
        let merged = match serde_json::from_str::<Value>(json)? {
            Value::Object(overrides) => {
                let mut merged = serde_json::to_value(GlitchConfig::default())?;
                merge_valid(&mut merged, &[], overrides);
                merged
            }
            // Not an options object at all; let serde report the mismatch.
            other => other,
        };
        let config: GlitchConfig = serde_json::from_value(merged)?;
        Ok(config.sanitized())
    }

    /// Clamp every numeric knob into its usable range.
    pub fn sanitized(mut self) -> Self {
        self.intensity = clamp_unit(self.intensity);
        self.fps = finite_or(self.fps, 15.0).clamp(1.0, MAX_FPS);
        self.layers = self.layers.min(MAX_LAYERS);
        let lo = clamp_unit(self.slice.min_height);
        let hi = clamp_unit(self.slice.max_height);
        self.slice.min_height = lo.min(hi);
        self.slice.max_height = lo.max(hi);
        self.slice.max_offset = finite_or(self.slice.max_offset, 0.0).abs();
        self.shake_intensity = finite_or(self.shake_intensity, 0.0).abs();
        self.glitch_frequency = finite_or(self.glitch_frequency, 4.0).clamp(0.1, self.fps);
        self.visibility_snap = clamp_unit(self.visibility_snap);
        if let GlitchTimeSpan::Window(w) = self.glitch_time_span {
            let a = clamp_unit(w.start);
            let b = clamp_unit(w.end);
            self.glitch_time_span = GlitchTimeSpan::Window(TimeWindow {
                start: a.min(b),
                end: a.max(b),
            });
        }
        self
    }

    /// Minimum spacing between applied animation updates, in ms.
    pub fn frame_interval_ms(&self) -> f64 {
        1000.0 / self.fps
    }

    /// Spacing between keyframes in interpolated mode, in ms.
    pub fn keyframe_interval_ms(&self) -> f64 {
        1000.0 / self.glitch_frequency
    }
}

/// Copy `overrides` into the object at `path` inside `root`, one key at a
/// time, keeping only the keys that still leave `root` a valid config.
/// Nested objects (`slice`) are merged key by key as well.
fn merge_valid(root: &mut Value, path: &[String], overrides: Map<String, Value>) {
    for (key, value) in overrides {
        let mut child = path.to_vec();
        child.push(key.clone());
        let nested = value.is_object() && lookup(root, &child).is_some_and(Value::is_object);
        if nested {
            if let Value::Object(inner) = value {
                merge_valid(root, &child, inner);
            }
            continue;
        }

        let Some(Value::Object(parent)) = lookup_mut(root, path) else {
            return;
        };
        let previous = parent.insert(key.clone(), value);
        if GlitchConfig::deserialize(&*root).is_ok() {
            continue;
        }
        log::warn!("ignoring invalid glitch option `{}`", child.join("."));
        if let Some(Value::Object(parent)) = lookup_mut(root, path) {
            match previous {
                Some(previous) => {
                    parent.insert(key, previous);
                }
                None => {
                    parent.remove(&key);
                }
            }
        }
    }
}

fn lookup<'a>(root: &'a Value, path: &[String]) -> Option<&'a Value> {
    path.iter().try_fold(root, |value, key| value.get(key))
}

fn lookup_mut<'a>(root: &'a mut Value, path: &[String]) -> Option<&'a mut Value> {
    path.iter().try_fold(root, |value, key| value.get_mut(key))
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

fn clamp_unit(value: f64) -> f64 {
    finite_or(value, 0.0).clamp(0.0, 1.0)
}
