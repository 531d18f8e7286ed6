#![cfg_attr(target_arch = "wasm32", allow(dead_code))]

//! Severitium UI widgets: a dropdown select and a layered glitch animator.
//!
//! The decision logic lives in target-independent modules so it can be
//! tested on the host; the browser bindings are compiled only for wasm32.

pub mod css;
pub mod error;
pub mod glitch;
pub mod logging;
pub mod select;

pub use error::UiError;

// Only compile wasm-specific code when targeting wasm32.

#[cfg(target_arch = "wasm32")]
mod wasm {
    use wasm_bindgen::prelude::*;

    mod convert;
    mod dom;
    mod glitch;
    mod select;

    pub use glitch::{GlitchControl, Glitchium};
    pub use select::BreeziumSelect;

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        crate::logging::init();
        log::debug!("severitium-ui loaded");
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm::{BreeziumSelect, GlitchControl, Glitchium};
