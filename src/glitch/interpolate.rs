//! Keyframe easing for smooth-transition mode.
//!
//! Keyframes are rolled at `glitchFrequency` with the same rules as instant
//! mode; every animation tick in between eases from the previous keyframe to
//! the new one. Binary properties do not fade: they flip once the window
//! passes the snap point.

use super::pose::{Shake, SlicePose};

/// A value moving from the previously committed keyframe to the new one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween<T> {
    pub current: T,
    pub target: T,
}

impl<T: Copy> Tween<T> {
    pub fn at(value: T) -> Self {
        Self {
            current: value,
            target: value,
        }
    }

    /// Commit the old target and aim at `next`.
    pub fn retarget(&mut self, next: T) {
        self.current = self.target;
        self.target = next;
    }
}

impl Tween<f64> {
    fn lerp(&self, t: f64) -> f64 {
        self.current + (self.target - self.current) * t
    }
}

impl Tween<bool> {
    fn snap(&self, progress: f64, threshold: f64) -> bool {
        if progress >= threshold {
            self.target
        } else {
            self.current
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliceTween {
    pub offset_x: Tween<f64>,
    pub clip_top: Tween<f64>,
    pub clip_height: Tween<f64>,
    pub visible: Tween<bool>,
    pub hue: Tween<f64>,
    pub saturate: Tween<bool>,
    pub invert: Tween<bool>,
}

impl SliceTween {
    fn at(pose: SlicePose) -> Self {
        Self {
            offset_x: Tween::at(pose.offset_x),
            clip_top: Tween::at(pose.clip_top),
            clip_height: Tween::at(pose.clip_height),
            visible: Tween::at(pose.visible),
            hue: Tween::at(pose.hue),
            saturate: Tween::at(pose.saturate),
            invert: Tween::at(pose.invert),
        }
    }

    fn retarget(&mut self, next: &SlicePose) {
        self.offset_x.retarget(next.offset_x);
        self.clip_top.retarget(next.clip_top);
        self.clip_height.retarget(next.clip_height);
        self.visible.retarget(next.visible);
        self.hue.retarget(next.hue);
        self.saturate.retarget(next.saturate);
        self.invert.retarget(next.invert);
    }

    fn sample(&self, progress: f64, snap: f64) -> SlicePose {
        let t = ease_out_quad(progress);
        SlicePose {
            visible: self.visible.snap(progress, snap),
            offset_x: self.offset_x.lerp(t),
            clip_top: self.clip_top.lerp(t),
            clip_height: self.clip_height.lerp(t),
            hue: self.hue.lerp(t),
            saturate: self.saturate.snap(progress, snap),
            invert: self.invert.snap(progress, snap),
        }
    }
}

pub fn ease_out_quad(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * (2.0 - t)
}

#[derive(Debug, Clone)]
pub struct Keyframes {
    slices: Vec<SliceTween>,
    shake: Tween<Shake>,
    keyframe_at: Option<f64>,
    interval_ms: f64,
    snap: f64,
}

impl Keyframes {
    pub fn new(slice_count: usize, interval_ms: f64, snap: f64) -> Self {
        Self {
            slices: vec![SliceTween::at(SlicePose::HIDDEN); slice_count],
            shake: Tween::at(Shake::default()),
            keyframe_at: None,
            interval_ms,
            snap,
        }
    }

    /// Back to the rest pose, with a keyframe due immediately.
    pub fn reset(&mut self) {
        for slice in &mut self.slices {
            *slice = SliceTween::at(SlicePose::HIDDEN);
        }
        self.shake = Tween::at(Shake::default());
        self.keyframe_at = None;
    }

    pub fn due(&self, now: f64) -> bool {
        self.keyframe_at
            .map_or(true, |at| now - at >= self.interval_ms)
    }

    pub fn push(&mut self, now: f64, slices: &[SlicePose], shake: Shake) {
        for (tween, next) in self.slices.iter_mut().zip(slices) {
            tween.retarget(next);
        }
        self.shake.retarget(shake);
        self.keyframe_at = Some(now);
    }

    /// Position within the current interpolation window, clamped to `[0, 1]`.
    pub fn progress(&self, now: f64) -> f64 {
        match self.keyframe_at {
            Some(at) if self.interval_ms > 0.0 => ((now - at) / self.interval_ms).clamp(0.0, 1.0),
            _ => 1.0,
        }
    }

    pub fn sample(&self, now: f64) -> (Vec<SlicePose>, Shake) {
        let progress = self.progress(now);
        let t = ease_out_quad(progress);
        let slices = self
            .slices
            .iter()
            .map(|s| s.sample(progress, self.snap))
            .collect();
        let shake = Shake {
            x: self.shake.current.x + (self.shake.target.x - self.shake.current.x) * t,
            y: self.shake.current.y + (self.shake.target.y - self.shake.current.y) * t,
        };
        (slices, shake)
    }

    pub fn slices(&self) -> &[SliceTween] {
        &self.slices
    }
}
