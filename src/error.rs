use thiserror::Error;

/// Failures surfaced by the widget core.
///
/// None of these reach the page as exceptions: the DOM layer logs them and
/// falls back to the most conservative behavior.
#[derive(Debug, Error)]
pub enum UiError {
    #[error("invalid css length `{0}`")]
    InvalidLength(String),
    #[error("unsupported css unit `{0}`")]
    UnknownUnit(String),
    #[error("invalid options: {0}")]
    InvalidConfig(#[from] serde_json::Error),
    #[error("dom operation failed: {0}")]
    Dom(String),
}

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for UiError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        UiError::Dom(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

#[cfg(target_arch = "wasm32")]
impl From<UiError> for wasm_bindgen::JsValue {
    fn from(err: UiError) -> Self {
        wasm_bindgen::JsValue::from_str(&err.to_string())
    }
}
