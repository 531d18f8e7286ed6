//! Small helpers over `web_sys` shared by both widgets.

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, Window};

use crate::css::LengthContext;
use crate::error::UiError;

pub fn window() -> Result<Window, UiError> {
    web_sys::window().ok_or_else(|| UiError::Dom("no window".into()))
}

pub fn document() -> Result<Document, UiError> {
    window()?
        .document()
        .ok_or_else(|| UiError::Dom("no document".into()))
}

pub fn create_div(document: &Document, class: &str) -> Result<HtmlElement, UiError> {
    let element = as_html(document.create_element("div")?)?;
    element.set_class_name(class);
    Ok(element)
}

pub fn as_html(element: Element) -> Result<HtmlElement, UiError> {
    element
        .dyn_into::<HtmlElement>()
        .map_err(|other| UiError::Dom(format!("<{}> is not an html element", other.tag_name())))
}

/// High resolution timestamp in ms, on the same clock as animation frames.
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

pub fn viewport_size(window: &Window) -> (f64, f64) {
    let read = |v: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>| {
        v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
    };
    (read(window.inner_width()), read(window.inner_height()))
}

pub fn computed_property(window: &Window, element: &Element, property: &str) -> String {
    window
        .get_computed_style(element)
        .ok()
        .flatten()
        .and_then(|style| style.get_property_value(property).ok())
        .map(|value| value.trim().to_string())
        .unwrap_or_default()
}

fn font_size_px(window: &Window, element: &Element) -> Option<f64> {
    let raw = computed_property(window, element, "font-size");
    raw.trim_end_matches("px").parse().ok()
}

/// Everything relative CSS units need, measured around `element`.
pub fn length_context(window: &Window, element: &Element) -> LengthContext {
    let defaults = LengthContext::default();
    let (viewport_width, viewport_height) = viewport_size(window);
    let root_font_size = window
        .document()
        .and_then(|d| d.document_element())
        .and_then(|root| font_size_px(window, &root))
        .unwrap_or(defaults.root_font_size);
    LengthContext {
        root_font_size,
        font_size: font_size_px(window, element).unwrap_or(root_font_size),
        viewport_width,
        viewport_height,
    }
}

pub fn user_agent() -> String {
    web_sys::window()
        .and_then(|w| w.navigator().user_agent().ok())
        .unwrap_or_default()
}

/// Set or clear one inline style property.
pub fn set_style(element: &HtmlElement, property: &str, value: Option<&str>) {
    let style = element.style();
    let result = match value {
        Some(value) => style.set_property(property, value),
        None => style.remove_property(property).map(|_| ()),
    };
    if let Err(err) = result {
        log::debug!("style {property}: {}", UiError::from(err));
    }
}
