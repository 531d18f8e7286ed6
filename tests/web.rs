#![cfg(target_arch = "wasm32")]

use std::cell::Cell;
use std::rc::Rc;

use gloo::timers::future::TimeoutFuture;
use severitium_ui::glitch::is_crawler;
use severitium_ui::{BreeziumSelect, Glitchium};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_test::*;
use web_sys::{Document, Element, Event, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

// Headless test browsers identify as crawlers, so effects that must mount
// pass `optimizeSeo: false`.

fn document() -> Document {
    web_sys::window().unwrap().document().unwrap()
}

fn json(text: &str) -> JsValue {
    js_sys::JSON::parse(text).unwrap()
}

fn host() -> HtmlElement {
    let doc = document();
    let host: HtmlElement = doc.create_element("div").unwrap().dyn_into().unwrap();
    doc.body().unwrap().append_child(&host).unwrap();
    host
}

/// A JS callback that counts its calls.
fn counter() -> (js_sys::Function, Rc<Cell<u32>>, Closure<dyn FnMut(JsValue)>) {
    let calls = Rc::new(Cell::new(0));
    let seen = Rc::clone(&calls);
    let closure = Closure::<dyn FnMut(JsValue)>::new(move |_value: JsValue| {
        seen.set(seen.get() + 1);
    });
    let function = closure.as_ref().unchecked_ref::<js_sys::Function>().clone();
    (function, calls, closure)
}

fn langs() -> JsValue {
    json(
        r#"[{"name":"English","value":"en"},
            {"name":"Русский","code":"ru"},
            {"name":"Deutsch","value":"de","disabled":true}]"#,
    )
}

fn dispatch(target: &web_sys::EventTarget, name: &str) {
    target.dispatch_event(&Event::new(name).unwrap()).unwrap();
}

/// An element with id `id` inside a fresh host.
fn glitch_target(id: &str) -> (HtmlElement, HtmlElement) {
    let host = host();
    let target: HtmlElement = document().create_element("p").unwrap().dyn_into().unwrap();
    target.set_id(id);
    target.set_text_content(Some("SEVERITIUM"));
    host.append_child(&target).unwrap();
    (host, target)
}

fn option_item(host: &Element, value: &str) -> HtmlElement {
    host.query_selector(&format!(".breezium-select__option[data-value=\"{value}\"]"))
        .unwrap()
        .unwrap()
        .dyn_into()
        .unwrap()
}

#[wasm_bindgen_test]
fn select_fires_callback_once_per_change() {
    let (callback, calls, _keep) = counter();
    let select = BreeziumSelect::new(langs(), Some(callback), JsValue::NULL).unwrap();
    select.set_value("ru", JsValue::UNDEFINED);
    select.set_value("ru", json(r#"{"trigger":true}"#));
    assert_eq!(calls.get(), 1);
    assert_eq!(select.get_value(), "ru");
    assert_eq!(select.get_label(), "Русский");

    select.set_value("en", json(r#"{"trigger":false}"#));
    assert_eq!(calls.get(), 1);
    assert_eq!(select.get_value(), "en");
}

#[wasm_bindgen_test]
fn select_update_options_falls_back_silently() {
    let (callback, calls, _keep) = counter();
    let select = BreeziumSelect::new(langs(), Some(callback), JsValue::from_str("ru")).unwrap();
    select.update_options(json(r#"[{"value":"x","name":"X"}]"#), Some("nonexistent".into()));
    assert_eq!(select.get_value(), "x");
    assert_eq!(calls.get(), 0);
}

#[wasm_bindgen_test]
fn select_empty_shows_placeholder() {
    let select = BreeziumSelect::new(json("[]"), None, JsValue::NULL).unwrap();
    assert_eq!(select.get_label(), "Select Option");
    select.set_value("", JsValue::UNDEFINED);
    assert_eq!(select.get_value(), "");
}

#[wasm_bindgen_test]
fn select_disabled_option_is_inert() {
    let (callback, calls, _keep) = counter();
    let host = host();
    let select = BreeziumSelect::new(langs(), Some(callback), JsValue::NULL).unwrap();
    select.render(&host, None, None).unwrap();
    select.open();
    assert!(select.is_open());

    option_item(&host, "de").click();
    assert!(select.is_open());
    assert_eq!(select.get_value(), "en");
    assert_eq!(calls.get(), 0);

    option_item(&host, "ru").click();
    assert!(!select.is_open());
    assert_eq!(select.get_value(), "ru");
    assert_eq!(calls.get(), 1);

    select.destroy();
    host.remove();
}

#[wasm_bindgen_test]
fn select_outside_click_closes_and_destroy_detaches() {
    let host = host();
    let select = BreeziumSelect::new(langs(), None, JsValue::NULL).unwrap();
    select.render(&host, None, None).unwrap();
    select.open();
    document().body().unwrap().click();
    assert!(!select.is_open());

    select.destroy();
    select.destroy();
    assert!(host.query_selector(".breezium-select").unwrap().is_none());

    // A destroyed widget stays detached and inert.
    select.render(&host, None, None).unwrap();
    assert!(host.query_selector(".breezium-select").unwrap().is_none());
    select.open();
    assert!(!select.is_open());
    host.remove();
}

#[wasm_bindgen_test]
fn select_option_click_ignores_tampered_attributes() {
    let host = host();
    let select = BreeziumSelect::new(langs(), None, JsValue::NULL).unwrap();
    select.render(&host, None, None).unwrap();
    select.open();

    let ru = option_item(&host, "ru");
    ru.set_attribute("data-value", "en").unwrap();
    ru.set_attribute("data-index", "0").unwrap();
    ru.click();
    assert_eq!(select.get_value(), "ru");

    select.destroy();
    host.remove();
}

#[wasm_bindgen_test]
fn select_drop_direction_follows_space() {
    let window = web_sys::window().unwrap();
    let viewport = window.inner_height().unwrap().as_f64().unwrap();
    let host = host();
    let select = BreeziumSelect::new(langs(), None, JsValue::NULL).unwrap();
    select.render(&host, None, None).unwrap();
    let container: HtmlElement = host
        .query_selector(".breezium-select")
        .unwrap()
        .unwrap()
        .dyn_into()
        .unwrap();
    let style = container.style();
    style.set_property("position", "fixed").unwrap();
    style.set_property("height", "30px").unwrap();
    style.set_property("overflow", "visible").unwrap();
    style.set_property("--breezium-select-max-height", "300px").unwrap();

    // 50px below, the rest above.
    style
        .set_property("top", &format!("{}px", viewport - 80.0))
        .unwrap();
    select.open();
    assert!(container.class_list().contains("drop-up"));
    select.close();

    // 50px above, the rest below.
    style.set_property("top", "50px").unwrap();
    select.open();
    assert!(container.class_list().contains("drop-down"));

    select.destroy();
    host.remove();
}

#[wasm_bindgen_test]
async fn select_repositions_on_resize_and_scroll_while_open() {
    let window = web_sys::window().unwrap();
    let viewport = window.inner_height().unwrap().as_f64().unwrap();
    let host = host();
    let select = BreeziumSelect::new(langs(), None, JsValue::NULL).unwrap();
    select.render(&host, None, None).unwrap();
    let container: HtmlElement = host
        .query_selector(".breezium-select")
        .unwrap()
        .unwrap()
        .dyn_into()
        .unwrap();
    let style = container.style();
    style.set_property("position", "fixed").unwrap();
    style.set_property("height", "30px").unwrap();
    style.set_property("--breezium-select-max-height", "300px").unwrap();
    style.set_property("top", "50px").unwrap();
    select.open();
    assert!(container.class_list().contains("drop-down"));

    let near_bottom = format!("{}px", viewport - 80.0);
    style.set_property("top", &near_bottom).unwrap();
    dispatch(&window, "resize");
    TimeoutFuture::new(100).await;
    assert!(container.class_list().contains("drop-up"));

    style.set_property("top", "50px").unwrap();
    dispatch(&document(), "scroll");
    TimeoutFuture::new(100).await;
    assert!(container.class_list().contains("drop-down"));

    // Closed widgets are not re-measured.
    select.close();
    style.set_property("top", &near_bottom).unwrap();
    dispatch(&window, "resize");
    TimeoutFuture::new(100).await;
    assert!(container.class_list().contains("drop-down"));

    select.destroy();
    host.remove();
}

#[wasm_bindgen_test]
fn glitch_wraps_and_restores() {
    let (host, target) = glitch_target("title");

    let engine = Glitchium::new();
    let control = engine.glitch(
        target.clone().into(),
        json(r#"{"playMode":"manual","layers":2,"optimizeSeo":false}"#),
    );
    assert_eq!(control.size(), 1);
    assert_eq!(engine.active_count(), 1);
    let wrapper = target.parent_element().unwrap();
    assert!(wrapper.class_list().contains("glitchium-container"));
    assert_eq!(wrapper.query_selector_all(".glitchium-layer").unwrap().length(), 2);
    assert_eq!(document().query_selector_all("#title").unwrap().length(), 1);

    control.start();
    assert!(control.is_running());
    control.stop();
    assert!(!control.is_running());
    let layers = wrapper.query_selector_all(".glitchium-layer").unwrap();
    for i in 0..layers.length() {
        let layer: HtmlElement = layers.get(i).unwrap().dyn_into().unwrap();
        assert_eq!(layer.style().get_property_value("opacity").unwrap(), "0");
    }
    assert_eq!(target.style().get_property_value("opacity").unwrap(), "1");
    assert_eq!(target.style().get_property_value("transform").unwrap(), "none");

    control.destroy();
    control.destroy();
    control.stop();
    control.start();
    assert!(!control.is_running());
    assert_eq!(engine.active_count(), 0);
    let parent: Element = target.parent_element().unwrap();
    let host_node: &web_sys::Node = &host;
    assert!(parent.is_same_node(Some(host_node)));
    assert!(host.query_selector(".glitchium-container").unwrap().is_none());
    assert!(target.get_attribute("style").is_none());
    host.remove();
}

#[wasm_bindgen_test]
fn glitch_nothing_matched_is_noop() {
    let engine = Glitchium::new();
    let before = document().body().unwrap().inner_html();
    let options = json(r#"{"optimizeSeo":false}"#);
    let control = engine.glitch(JsValue::from_str(".nonexistent-class"), options.clone());
    assert_eq!(control.size(), 0);
    control.start();
    control.stop();
    control.destroy();
    assert!(!control.is_running());

    let invalid = engine.glitch(JsValue::from_str("[[[oops"), options);
    assert_eq!(invalid.size(), 0);
    invalid.start();
    invalid.destroy();
    assert_eq!(document().body().unwrap().inner_html(), before);
}

#[wasm_bindgen_test]
fn glitch_stop_all_and_destroy_all() {
    let host = host();
    host.set_inner_html(r#"<span class="g">a</span><span class="g">b</span>"#);
    let engine = Glitchium::new();
    let control = engine.glitch(JsValue::from_str(".g"), json(r#"{"playMode":"always","optimizeSeo":false}"#));
    assert_eq!(control.size(), 2);
    assert!(control.is_running());

    engine.stop_all();
    assert!(!control.is_running());
    assert_eq!(engine.active_count(), 2);

    engine.destroy_all();
    assert_eq!(engine.active_count(), 0);
    assert!(host.query_selector(".glitchium-container").unwrap().is_none());
    control.destroy();
    assert_eq!(host.query_selector_all(".g").unwrap().length(), 2);
    host.remove();
}

#[wasm_bindgen_test]
fn glitch_without_containers_uses_siblings() {
    let host = host();
    host.set_inner_html(r#"<div class="stack"><b id="x">x</b></div>"#);
    let engine = Glitchium::new();
    let control = engine.glitch(
        JsValue::from_str("#x"),
        json(r#"{"playMode":"manual","createContainers":false,"layers":3,"optimizeSeo":false}"#),
    );
    let stack = host.query_selector(".stack").unwrap().unwrap();
    assert_eq!(stack.children().length(), 4);
    control.destroy();
    assert_eq!(stack.children().length(), 1);
    host.remove();
}

#[wasm_bindgen_test]
fn glitch_skips_crawlers_unless_told_otherwise() {
    let (host, target) = glitch_target("seo");
    let agent = web_sys::window().unwrap().navigator().user_agent().unwrap();
    let engine = Glitchium::new();

    let control = engine.glitch(target.clone().into(), json(r#"{"playMode":"manual"}"#));
    let expected = if is_crawler(&agent) { 0 } else { 1 };
    assert_eq!(control.size(), expected);
    control.destroy();

    let forced = engine.glitch(
        target.into(),
        json(r#"{"playMode":"manual","optimizeSeo":false}"#),
    );
    assert_eq!(forced.size(), 1);
    forced.destroy();
    host.remove();
}

#[wasm_bindgen_test]
fn glitch_hover_follows_pointer() {
    let (host, target) = glitch_target("hover");
    let engine = Glitchium::new();
    let control = engine.glitch(
        target.clone().into(),
        json(r#"{"playMode":"hover","optimizeSeo":false}"#),
    );
    assert!(!control.is_running());
    dispatch(&target, "mouseenter");
    assert!(control.is_running());
    dispatch(&target, "mouseleave");
    assert!(!control.is_running());
    control.destroy();
    host.remove();
}

#[wasm_bindgen_test]
fn glitch_hover_uses_trigger_or_falls_back_to_element() {
    let (host, target) = glitch_target("triggered");
    let button: HtmlElement = document().create_element("button").unwrap().dyn_into().unwrap();
    button.set_class_name("glitch-trigger");
    host.append_child(&button).unwrap();
    let engine = Glitchium::new();

    let control = engine.glitch(
        target.clone().into(),
        json(r#"{"playMode":"hover","trigger":".glitch-trigger","optimizeSeo":false}"#),
    );
    dispatch(&target, "mouseenter");
    assert!(!control.is_running());
    dispatch(&button, "mouseenter");
    assert!(control.is_running());
    control.destroy();

    let fallback = engine.glitch(
        target.clone().into(),
        json(r##"{"playMode":"hover","trigger":"#no-such-trigger","optimizeSeo":false}"##),
    );
    dispatch(&target, "mouseenter");
    assert!(fallback.is_running());
    fallback.destroy();
    host.remove();
}

#[wasm_bindgen_test]
async fn glitch_click_restarts_after_delay() {
    let (host, target) = glitch_target("clicky");
    let engine = Glitchium::new();
    let control = engine.glitch(
        target.clone().into(),
        json(r#"{"playMode":"click","clickRestartDelay":20,"optimizeSeo":false}"#),
    );
    control.start();
    assert!(control.is_running());

    target.click();
    assert!(!control.is_running());
    TimeoutFuture::new(120).await;
    assert!(control.is_running());

    // A pending restart is cancelled by destroy.
    target.click();
    control.destroy();
    TimeoutFuture::new(120).await;
    assert!(!control.is_running());
    host.remove();
}
