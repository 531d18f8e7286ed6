use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use gloo::events::EventListener;
use gloo::render::{request_animation_frame, AnimationFrame};
use gloo::timers::callback::Timeout;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, EventTarget, HtmlCollection, HtmlElement, Node, NodeList};

use super::{convert, dom};
use crate::error::UiError;
use crate::glitch::{
    is_crawler, GlitchConfig, GlitchCore, GlitchToken, LayerStyle, LayerSurface, PlayMode,
    Registry,
};

const CONTAINER_CLASS: &str = "glitchium-container";
const LAYER_CLASS: &str = "glitchium-layer";

/// The base element plus its decorative clones.
struct DomLayers {
    base: HtmlElement,
    slices: Vec<HtmlElement>,
}

fn write_style(element: &HtmlElement, style: &LayerStyle) {
    dom::set_style(element, "opacity", Some(&style.opacity.to_string()));
    dom::set_style(
        element,
        "transform",
        Some(style.transform.as_deref().unwrap_or("none")),
    );
    dom::set_style(
        element,
        "clip-path",
        Some(style.clip_path.as_deref().unwrap_or("none")),
    );
    dom::set_style(
        element,
        "filter",
        Some(style.filter.as_deref().unwrap_or("none")),
    );
}

impl LayerSurface for DomLayers {
    fn slice_count(&self) -> usize {
        self.slices.len()
    }

    fn apply_base(&mut self, style: &LayerStyle) {
        write_style(&self.base, style);
    }

    fn apply_slice(&mut self, index: usize, style: &LayerStyle) {
        if let Some(slice) = self.slices.get(index) {
            write_style(slice, style);
        }
    }
}

/// DOM the engine inserted, and what it needs to put things back.
struct Mount {
    wrapper: Option<HtmlElement>,
    original_style: Option<String>,
}

struct GlitchInstance {
    element: HtmlElement,
    layers: RefCell<DomLayers>,
    core: RefCell<GlitchCore>,
    mount: RefCell<Option<Mount>>,
    frame: RefCell<Option<AnimationFrame>>,
    listeners: RefCell<Vec<EventListener>>,
    restart: RefCell<Option<Timeout>>,
    destroyed: Cell<bool>,
}

impl GlitchInstance {
    fn mount(element: HtmlElement, config: GlitchConfig, seed: u64) -> Result<Rc<Self>, UiError> {
        let parent = element
            .parent_node()
            .ok_or_else(|| UiError::Dom("glitch target is not attached".into()))?;
        let original_style = element.get_attribute("style");

        let wrapper = if config.create_containers {
            let document = dom::document()?;
            let wrapper = dom::create_div(&document, CONTAINER_CLASS)?;
            dom::set_style(&wrapper, "display", Some("grid"));
            dom::set_style(&wrapper, "position", Some("relative"));
            if config.hide_overflow {
                dom::set_style(&wrapper, "overflow", Some("hidden"));
            }
            let anchor: &Node = &element;
            parent.insert_before(&wrapper, Some(anchor))?;
            wrapper.append_child(&element)?;
            Some(wrapper)
        } else {
            None
        };
        dom::set_style(&element, "grid-area", Some("1 / 1"));

        let mut slices = Vec::with_capacity(config.layers);
        let mut cursor: Node = element.clone().into();
        for _ in 0..config.layers {
            let clone = element.clone_node_with_deep(true)?;
            let clone = dom::as_html(clone.dyn_into::<Element>().map_err(|_| {
                UiError::Dom("clone is not an element".into())
            })?)?;
            clone.remove_attribute("id")?;
            clone.class_list().add_1(LAYER_CLASS)?;
            clone.set_attribute("aria-hidden", "true")?;
            dom::set_style(&clone, "pointer-events", Some("none"));
            dom::set_style(&clone, "user-select", Some("none"));
            write_style(&clone, &LayerStyle::slice_rest());
            let host = cursor
                .parent_node()
                .ok_or_else(|| UiError::Dom("glitch layer lost its parent".into()))?;
            host.insert_before(&clone, cursor.next_sibling().as_ref())?;
            cursor = clone.clone().into();
            slices.push(clone);
        }

        let instance = Rc::new(Self {
            element: element.clone(),
            layers: RefCell::new(DomLayers {
                base: element,
                slices,
            }),
            core: RefCell::new(GlitchCore::new(config, seed)),
            mount: RefCell::new(Some(Mount {
                wrapper,
                original_style,
            })),
            frame: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
            restart: RefCell::new(None),
            destroyed: Cell::new(false),
        });
        instance.rest();
        Ok(instance)
    }

    fn is_running(&self) -> bool {
        self.core.borrow().is_running()
    }

    fn start(self: &Rc<Self>) {
        if self.destroyed.get() {
            return;
        }
        let started = self.core.borrow_mut().start(dom::now_ms());
        if started {
            self.schedule();
        }
    }

    fn schedule(self: &Rc<Self>) {
        let weak = Rc::downgrade(self);
        let handle = request_animation_frame(move |now| {
            if let Some(instance) = weak.upgrade() {
                instance.on_frame(now);
            }
        });
        *self.frame.borrow_mut() = Some(handle);
    }

    fn on_frame(self: &Rc<Self>, now: f64) {
        self.frame.borrow_mut().take();
        if !self.is_running() {
            return;
        }
        self.core
            .borrow_mut()
            .frame(now, &mut *self.layers.borrow_mut());
        // Keep polling at display rate; the core decides when to apply.
        self.schedule();
    }

    fn rest(&self) {
        self.core
            .borrow_mut()
            .stop(&mut *self.layers.borrow_mut());
    }

    fn stop(&self) {
        if self.destroyed.get() {
            return;
        }
        self.frame.borrow_mut().take();
        self.restart.borrow_mut().take();
        self.rest();
    }

    /// Click mode: cut the current burst and replay it after a short pause.
    fn retrigger(self: &Rc<Self>) {
        self.stop();
        let delay = self.core.borrow().config().click_restart_delay;
        let weak = Rc::downgrade(self);
        let timeout = Timeout::new(delay, move || {
            if let Some(instance) = weak.upgrade() {
                instance.start();
            }
        });
        *self.restart.borrow_mut() = Some(timeout);
    }

    fn wire(self: &Rc<Self>, trigger: &EventTarget) {
        let mode = self.core.borrow().config().play_mode;
        let mut listeners = Vec::new();
        match mode {
            PlayMode::Always => self.start(),
            PlayMode::Hover => {
                let weak = Rc::downgrade(self);
                listeners.push(EventListener::new(trigger, "mouseenter", move |_| {
                    if let Some(instance) = weak.upgrade() {
                        instance.start();
                    }
                }));
                let weak = Rc::downgrade(self);
                listeners.push(EventListener::new(trigger, "mouseleave", move |_| {
                    if let Some(instance) = weak.upgrade() {
                        instance.stop();
                    }
                }));
            }
            PlayMode::Click => {
                let weak = Rc::downgrade(self);
                listeners.push(EventListener::new(trigger, "click", move |_| {
                    if let Some(instance) = weak.upgrade() {
                        instance.retrigger();
                    }
                }));
            }
            PlayMode::Manual => {}
        }
        *self.listeners.borrow_mut() = listeners;
    }

    fn destroy(&self) {
        if self.destroyed.get() {
            return;
        }
        self.stop();
        self.destroyed.set(true);
        self.listeners.borrow_mut().clear();
        if let Err(err) = self.unmount() {
            log::warn!("glitch teardown incomplete: {err}");
        }
    }

    fn unmount(&self) -> Result<(), UiError> {
        let Some(mount) = self.mount.borrow_mut().take() else {
            return Ok(());
        };
        for slice in self.layers.borrow_mut().slices.drain(..) {
            slice.remove();
        }
        if let Some(wrapper) = mount.wrapper {
            if let Some(parent) = wrapper.parent_node() {
                let anchor: &Node = &wrapper;
                parent.insert_before(&self.element, Some(anchor))?;
            }
            wrapper.remove();
        }
        match mount.original_style {
            Some(style) => self.element.set_attribute("style", &style)?,
            None => self.element.remove_attribute("style")?,
        }
        Ok(())
    }
}

type SharedRegistry = Rc<RefCell<Registry<Rc<GlitchInstance>>>>;

/// Glitch effect engine. Every control it hands out stays reachable through
/// `stopAll` / `destroyAll` until destroyed.
#[wasm_bindgen]
pub struct Glitchium {
    registry: SharedRegistry,
    next_seed: Cell<u64>,
}

impl Default for Glitchium {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl Glitchium {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        crate::logging::init();
        let seed = (js_sys::Math::random() * (1u64 << 53) as f64) as u64;
        Self {
            registry: Rc::new(RefCell::new(Registry::new())),
            next_seed: Cell::new(seed),
        }
    }

    /// Glitch every element matched by `target` (a selector, an element, an
    /// array of elements, or a node collection).
    pub fn glitch(&self, target: JsValue, options: JsValue) -> GlitchControl {
        let config = parse_config(&options);
        let noop = GlitchControl {
            members: Vec::new(),
            registry: Rc::downgrade(&self.registry),
        };
        if config.optimize_seo && is_crawler(&dom::user_agent()) {
            log::debug!("crawler user agent, glitch skipped");
            return noop;
        }
        let elements = resolve_targets(&target);
        if elements.is_empty() {
            return noop;
        }
        let trigger_option = js_sys::Reflect::get(&options, &JsValue::from_str("trigger"))
            .unwrap_or(JsValue::UNDEFINED);
        let shared_trigger = resolve_trigger(&trigger_option);

        let mut members = Vec::with_capacity(elements.len());
        for element in elements {
            let seed = self.next_seed.get();
            self.next_seed.set(seed.wrapping_add(0x9E37_79B9_7F4A_7C15));
            let instance = match GlitchInstance::mount(element.clone(), config.clone(), seed) {
                Ok(instance) => instance,
                Err(err) => {
                    log::warn!("glitch skipped for element: {err}");
                    continue;
                }
            };
            let trigger: EventTarget = match &shared_trigger {
                Some(trigger) => trigger.clone().into(),
                None => element.into(),
            };
            instance.wire(&trigger);
            let token = self.registry.borrow_mut().insert(Rc::clone(&instance));
            members.push((token, instance));
        }
        GlitchControl {
            members,
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Stop every effect this engine created, without destroying them.
    #[wasm_bindgen(js_name = stopAll)]
    pub fn stop_all(&self) {
        let live: Vec<_> = self.registry.borrow().iter().cloned().collect();
        for instance in live {
            instance.stop();
        }
    }

    /// Destroy and forget every effect this engine created.
    #[wasm_bindgen(js_name = destroyAll)]
    pub fn destroy_all(&self) {
        let live = self.registry.borrow_mut().drain();
        for instance in live {
            instance.destroy();
        }
    }

    #[wasm_bindgen(js_name = activeCount)]
    pub fn active_count(&self) -> usize {
        self.registry.borrow().len()
    }
}

/// Handle for the effects created by one `glitch()` call. Empty when nothing
/// matched or the visitor is a crawler; every method is then a no-op.
#[wasm_bindgen]
pub struct GlitchControl {
    members: Vec<(GlitchToken, Rc<GlitchInstance>)>,
    registry: Weak<RefCell<Registry<Rc<GlitchInstance>>>>,
}

#[wasm_bindgen]
impl GlitchControl {
    pub fn start(&self) {
        for (_, instance) in &self.members {
            instance.start();
        }
    }

    pub fn stop(&self) {
        for (_, instance) in &self.members {
            instance.stop();
        }
    }

    /// Stop, unregister, and restore the original DOM. Safe to call more
    /// than once, and before `start`.
    pub fn destroy(&self) {
        for (token, instance) in &self.members {
            if let Some(registry) = self.registry.upgrade() {
                registry.borrow_mut().remove(*token);
            }
            instance.destroy();
        }
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.members.iter().any(|(_, instance)| instance.is_running())
    }

    /// Number of elements this control drives.
    #[wasm_bindgen(getter)]
    pub fn size(&self) -> usize {
        self.members.len()
    }
}

fn parse_config(options: &JsValue) -> GlitchConfig {
    let parsed = convert::to_json_string(options).and_then(|json| match json {
        Some(json) => GlitchConfig::from_json(&json),
        None => Ok(GlitchConfig::default()),
    });
    parsed.unwrap_or_else(|err| {
        log::warn!("{err}; using default glitch options");
        GlitchConfig::default()
    })
}

fn resolve_targets(target: &JsValue) -> Vec<HtmlElement> {
    if let Some(selector) = target.as_string() {
        let Ok(document) = dom::document() else {
            return Vec::new();
        };
        return match document.query_selector_all(&selector) {
            Ok(list) => from_node_list(&list),
            Err(_) => {
                log::warn!("invalid glitch selector `{selector}`");
                Vec::new()
            }
        };
    }
    if let Some(element) = target.dyn_ref::<HtmlElement>() {
        return vec![element.clone()];
    }
    if let Some(list) = target.dyn_ref::<NodeList>() {
        return from_node_list(list);
    }
    if let Some(collection) = target.dyn_ref::<HtmlCollection>() {
        return (0..collection.length())
            .filter_map(|i| collection.item(i))
            .filter_map(|e| e.dyn_into::<HtmlElement>().ok())
            .collect();
    }
    if js_sys::Array::is_array(target) {
        return js_sys::Array::from(target)
            .iter()
            .filter_map(|v| v.dyn_into::<HtmlElement>().ok())
            .collect();
    }
    Vec::new()
}

fn from_node_list(list: &NodeList) -> Vec<HtmlElement> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|n| n.dyn_into::<HtmlElement>().ok())
        .collect()
}

/// `None` means "use the glitched element itself".
fn resolve_trigger(option: &JsValue) -> Option<Element> {
    if option.is_undefined() || option.is_null() {
        return None;
    }
    if let Some(element) = option.dyn_ref::<Element>() {
        return Some(element.clone());
    }
    if let Some(selector) = option.as_string() {
        let found = dom::document()
            .ok()
            .and_then(|d| d.query_selector(&selector).ok().flatten());
        if found.is_none() {
            log::warn!("glitch trigger `{selector}` not found; using the element itself");
        }
        return found;
    }
    log::warn!("unsupported glitch trigger; using the element itself");
    None
}
