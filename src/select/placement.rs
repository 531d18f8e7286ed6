//! Viewport-aware drop direction for the options panel.
//!
//! Recomputed from scratch on every open and every coalesced resize/scroll
//! tick while open. There is no hysteresis, so the direction may flip while
//! the page scrolls.

/// Space kept between the panel and the viewport edge.
pub const GUTTER_PX: f64 = 8.0;

/// Panel height used when the theme does not configure one.
pub const FALLBACK_MAX_HEIGHT_PX: f64 = 300.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DropDirection {
    Up,
    #[default]
    Down,
}

impl DropDirection {
    pub fn class_name(self) -> &'static str {
        match self {
            DropDirection::Up => "drop-up",
            DropDirection::Down => "drop-down",
        }
    }
}

/// Where the select's container currently sits, in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub top: f64,
    pub bottom: f64,
    pub viewport_height: f64,
}

impl Anchor {
    pub fn space_below(&self) -> f64 {
        self.viewport_height - self.bottom
    }

    pub fn space_above(&self) -> f64 {
        self.top
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub direction: DropDirection,
    pub max_height: f64,
}

pub fn place(anchor: &Anchor, desired_height: f64) -> Placement {
    let below = anchor.space_below();
    let above = anchor.space_above();
    let direction = if below < desired_height && above > below {
        DropDirection::Up
    } else {
        DropDirection::Down
    };
    let available = match direction {
        DropDirection::Up => above,
        DropDirection::Down => below,
    };
    let max_height = desired_height.min(available - GUTTER_PX).max(0.0);
    Placement {
        direction,
        max_height,
    }
}
