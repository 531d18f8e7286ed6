use super::animator::{Animator, LayerSurface};
use super::config::GlitchConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running,
}

/// Start/stop state machine for one glitched element.
#[derive(Debug, Clone)]
pub struct GlitchCore {
    animator: Animator,
    state: RunState,
}

impl GlitchCore {
    pub fn new(config: GlitchConfig, seed: u64) -> Self {
        Self {
            animator: Animator::new(config, seed),
            state: RunState::Idle,
        }
    }

    pub fn config(&self) -> &GlitchConfig {
        self.animator.config()
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    /// Idle -> Running. Returns false (and changes nothing) when already
    /// running, so a second frame loop is never started.
    pub fn start(&mut self, now: f64) -> bool {
        if self.is_running() {
            return false;
        }
        self.state = RunState::Running;
        self.animator.begin(now);
        true
    }

    /// Running -> Idle. The rest pose is written even when already idle.
    /// Returns whether the state changed.
    pub fn stop<S: LayerSurface + ?Sized>(&mut self, surface: &mut S) -> bool {
        let was_running = self.is_running();
        self.state = RunState::Idle;
        self.animator.rest(surface);
        was_running
    }

    /// Offer a display frame; ignored while idle.
    pub fn frame<S: LayerSurface + ?Sized>(&mut self, now: f64, surface: &mut S) -> bool {
        self.is_running() && self.animator.frame(now, surface)
    }
}
