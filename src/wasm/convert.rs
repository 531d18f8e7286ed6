use js_sys::JSON;
use serde_json::Value;
use wasm_bindgen::JsValue;

use crate::error::UiError;

/// Serialize a JS value to JSON text. `None` for values JSON cannot express
/// (undefined, functions, symbols).
pub fn to_json_string(value: &JsValue) -> Result<Option<String>, UiError> {
    if value.is_undefined() || value.is_null() {
        return Ok(None);
    }
    let text = JSON::stringify(value)?;
    Ok(JsValue::from(text).as_string())
}

/// Best-effort conversion into a `serde_json::Value`; anything that fails to
/// convert becomes `Null`.
pub fn to_json_value(value: &JsValue) -> Value {
    let parsed = to_json_string(value).and_then(|text| match text {
        Some(text) => Ok(serde_json::from_str(&text)?),
        None => Ok(Value::Null),
    });
    match parsed {
        Ok(value) => value,
        Err(err) => {
            log::warn!("{err}");
            Value::Null
        }
    }
}

/// Read a boolean property off an options bag, e.g. `{ trigger: false }`.
pub fn bool_field(options: &JsValue, key: &str, default: bool) -> bool {
    if !options.is_object() {
        return default;
    }
    js_sys::Reflect::get(options, &JsValue::from_str(key))
        .ok()
        .and_then(|v| v.as_bool())
        .unwrap_or(default)
}
