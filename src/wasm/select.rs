use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo::events::{EventListener, EventListenerOptions, EventListenerPhase};
use gloo::render::{request_animation_frame, AnimationFrame};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, HtmlElement, KeyboardEvent, Node};

use super::{convert, dom};
use crate::css::length_to_px;
use crate::error::UiError;
use crate::select::{
    normalize_options, Anchor, DefaultOption, DropDirection, OptionClick, SelectState,
    FALLBACK_MAX_HEIGHT_PX,
};

/// Theme hook for the panel's desired height; any CSS length unit.
const MAX_HEIGHT_VAR: &str = "--breezium-select-max-height";

const CONTAINER_CLASS: &str = "breezium-select";
const DISPLAY_CLASS: &str = "breezium-select__selected";
const PANEL_CLASS: &str = "breezium-select__options";
const OPTION_CLASS: &str = "breezium-select__option";

struct SelectView {
    container: HtmlElement,
    display: HtmlElement,
    panel: HtmlElement,
}

struct SelectInner {
    state: RefCell<SelectState>,
    view: SelectView,
    callback: Option<js_sys::Function>,
    /// Listeners on the widget's own nodes.
    own_listeners: RefCell<Vec<EventListener>>,
    /// Document/window listeners, installed by `render`.
    page_listeners: RefCell<Vec<EventListener>>,
    reflow_frame: RefCell<Option<AnimationFrame>>,
}

/// Dropdown replacement for `<select>`.
#[wasm_bindgen]
pub struct BreeziumSelect {
    inner: Rc<SelectInner>,
}

#[wasm_bindgen]
impl BreeziumSelect {
    /// `options` is an array of `{name, value | code, disabled}` objects (or
    /// bare strings); `default_option` an option object, a value string, or
    /// null.
    #[wasm_bindgen(constructor)]
    pub fn new(
        options: JsValue,
        callback: Option<js_sys::Function>,
        default_option: JsValue,
    ) -> Result<BreeziumSelect, JsValue> {
        let options = normalize_options(&convert::to_json_value(&options));
        let default = DefaultOption::from_json(&convert::to_json_value(&default_option));
        let state = SelectState::new(options, default);

        let document = dom::document()?;
        let container = dom::create_div(&document, CONTAINER_CLASS)?;
        let display = dom::create_div(&document, DISPLAY_CLASS)?;
        let panel = dom::create_div(&document, PANEL_CLASS)?;
        container.set_attribute("role", "combobox")?;
        panel.set_attribute("role", "listbox")?;
        container.append_child(&display)?;
        container.append_child(&panel)?;

        let inner = Rc::new(SelectInner {
            state: RefCell::new(state),
            view: SelectView {
                container,
                display,
                panel,
            },
            callback,
            own_listeners: RefCell::new(Vec::new()),
            page_listeners: RefCell::new(Vec::new()),
            reflow_frame: RefCell::new(None),
        });
        inner.rebuild_items()?;
        inner.sync();
        inner.install_own_listeners();
        Ok(BreeziumSelect { inner })
    }

    /// Attach the widget to `parent`, before `sibling` (or after it when
    /// `insert_after` is true), and start listening to the page.
    pub fn render(
        &self,
        parent: &Element,
        sibling: Option<Element>,
        insert_after: Option<bool>,
    ) -> Result<(), JsValue> {
        if self.inner.state.borrow().is_destroyed() {
            log::debug!("render after destroy ignored");
            return Ok(());
        }
        let container: &Node = &self.inner.view.container;
        match sibling {
            Some(sibling) if insert_after.unwrap_or(false) => {
                parent.insert_before(container, sibling.next_sibling().as_ref())?;
            }
            Some(sibling) => {
                let sibling: &Node = &sibling;
                parent.insert_before(container, Some(sibling))?;
            }
            None => {
                parent.append_child(container)?;
            }
        }
        self.inner.install_page_listeners();
        Ok(())
    }

    pub fn open(&self) {
        self.inner.open();
    }

    pub fn close(&self) {
        self.inner.close();
    }

    pub fn toggle(&self) {
        self.inner.toggle();
    }

    #[wasm_bindgen(js_name = isOpen)]
    pub fn is_open(&self) -> bool {
        self.inner.state.borrow().is_open()
    }

    /// Select by value. `options.trigger` (default true) controls whether the
    /// change callback may fire; it never fires for an unchanged value.
    #[wasm_bindgen(js_name = setValue)]
    pub fn set_value(&self, value: &str, options: JsValue) {
        let trigger = convert::bool_field(&options, "trigger", true);
        let notify = self.inner.state.borrow_mut().set_value(value, trigger);
        self.inner.sync();
        if let Some(value) = notify {
            self.inner.notify(&value);
        }
    }

    /// Replace the option list, keeping the current value (or `keep_value`)
    /// when possible. Never fires the callback.
    #[wasm_bindgen(js_name = updateOptions)]
    pub fn update_options(&self, options: JsValue, keep_value: Option<String>) {
        let options = normalize_options(&convert::to_json_value(&options));
        self.inner
            .state
            .borrow_mut()
            .update_options(options, keep_value.as_deref());
        if let Err(err) = self.inner.rebuild_items() {
            log::warn!("rebuilding options failed: {err}");
        }
        self.inner.sync();
    }

    #[wasm_bindgen(js_name = getValue)]
    pub fn get_value(&self) -> String {
        self.inner
            .state
            .try_borrow()
            .map(|s| s.value().to_string())
            .unwrap_or_default()
    }

    #[wasm_bindgen(js_name = getLabel)]
    pub fn get_label(&self) -> String {
        self.inner
            .state
            .try_borrow()
            .map(|s| s.label().to_string())
            .unwrap_or_default()
    }

    /// The normalized option list as plain objects.
    #[wasm_bindgen(js_name = getOptions)]
    pub fn get_options(&self) -> Result<JsValue, JsValue> {
        let json = serde_json::to_string(self.inner.state.borrow().options())
            .map_err(|err| JsValue::from_str(&UiError::from(err).to_string()))?;
        js_sys::JSON::parse(&json)
    }

    /// Detach every listener and remove the widget from the page. Safe to
    /// call repeatedly.
    pub fn destroy(&self) {
        self.inner.destroy();
    }
}

impl SelectInner {
    fn anchor_and_desired(&self) -> Option<(Anchor, f64)> {
        let window = dom::window().ok()?;
        let container: &Element = &self.view.container;
        let rect = container.get_bounding_client_rect();
        let (_, viewport_height) = dom::viewport_size(&window);
        let anchor = Anchor {
            top: rect.top(),
            bottom: rect.bottom(),
            viewport_height,
        };

        let ctx = dom::length_context(&window, container);
        let mut raw = dom::computed_property(&window, container, MAX_HEIGHT_VAR);
        if raw.is_empty() {
            // Drop our own inline limit so the themed value shows through.
            dom::set_style(&self.view.panel, "max-height", None);
            raw = dom::computed_property(&window, &self.view.panel, "max-height");
        }
        Some((anchor, length_to_px(&raw, &ctx, FALLBACK_MAX_HEIGHT_PX)))
    }

    fn open(&self) {
        let Some((anchor, desired)) = self.anchor_and_desired() else {
            return;
        };
        if self.state.borrow_mut().open(&anchor, desired).is_some() {
            self.sync();
        }
    }

    fn close(&self) {
        self.state.borrow_mut().close();
        self.sync();
    }

    fn toggle(&self) {
        let open = self.state.borrow().is_open();
        if open {
            self.close();
        } else {
            self.open();
        }
    }

    fn reposition(&self) {
        if !self.state.borrow().is_open() {
            return;
        }
        let Some((anchor, desired)) = self.anchor_and_desired() else {
            return;
        };
        if self.state.borrow_mut().reposition(&anchor, desired).is_some() {
            self.sync();
        }
    }

    /// Coalesce resize/scroll bursts into one placement pass per frame.
    fn schedule_reposition(self: &Rc<Self>) {
        if !self.state.borrow().is_open() || self.reflow_frame.borrow().is_some() {
            return;
        }
        let weak = Rc::downgrade(self);
        let handle = request_animation_frame(move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.reflow_frame.borrow_mut().take();
                inner.reposition();
            }
        });
        *self.reflow_frame.borrow_mut() = Some(handle);
    }

    fn click_option(&self, index: usize) {
        let outcome = self.state.borrow_mut().click_option(index);
        if let OptionClick::Chosen { notify } = outcome {
            self.sync();
            if let Some(value) = notify {
                self.notify(&value);
            }
        }
    }

    fn notify(&self, value: &str) {
        let Some(callback) = &self.callback else {
            return;
        };
        if let Err(err) = callback.call1(&JsValue::NULL, &JsValue::from_str(value)) {
            log::warn!("select callback threw: {}", UiError::from(err));
        }
    }

    fn rebuild_items(&self) -> Result<(), UiError> {
        let document = dom::document()?;
        self.view.panel.set_inner_html("");
        let state = self.state.borrow();
        for option in state.options() {
            let item = dom::create_div(&document, OPTION_CLASS)?;
            item.set_text_content(Some(&option.name));
            item.set_attribute("data-value", &option.value)?;
            item.set_attribute("role", "option")?;
            if option.disabled {
                item.class_list().add_1("is-disabled")?;
                item.set_attribute("aria-disabled", "true")?;
            }
            self.view.panel.append_child(&item)?;
        }
        Ok(())
    }

    /// Render state into the DOM. Attributes written here are output only.
    fn sync(&self) {
        if let Err(err) = self.try_sync() {
            log::warn!("select render failed: {err}");
        }
    }

    fn try_sync(&self) -> Result<(), UiError> {
        let state = self.state.borrow();
        let view = &self.view;
        view.display.set_text_content(Some(state.label()));
        view.display.set_attribute("data-value", state.value())?;

        let classes = view.container.class_list();
        let open = state.is_open();
        let direction = state.placement().direction;
        classes.toggle_with_force("is-open", open)?;
        classes.toggle_with_force(DropDirection::Up.class_name(), direction == DropDirection::Up)?;
        classes.toggle_with_force(
            DropDirection::Down.class_name(),
            direction == DropDirection::Down,
        )?;
        view.container
            .set_attribute("aria-expanded", if open { "true" } else { "false" })?;
        if open {
            let height = format!("{:.0}px", state.placement().max_height);
            dom::set_style(&view.panel, "max-height", Some(&height));
        }

        let selected = state.selected_index();
        let items = view.panel.children();
        for index in 0..items.length() {
            let Some(item) = items.item(index) else {
                continue;
            };
            let is_selected = selected == Some(index as usize);
            item.class_list().toggle_with_force("is-selected", is_selected)?;
            item.set_attribute("aria-selected", if is_selected { "true" } else { "false" })?;
        }
        Ok(())
    }

    fn install_own_listeners(self: &Rc<Self>) {
        let mut listeners = Vec::new();

        let weak = Rc::downgrade(self);
        listeners.push(EventListener::new(&self.view.display, "click", move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.toggle();
            }
        }));

        let weak = Rc::downgrade(self);
        listeners.push(EventListener::new(&self.view.panel, "click", move |event| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if let Some(index) = option_index(event, &inner.view.panel) {
                inner.click_option(index);
            }
        }));

        *self.own_listeners.borrow_mut() = listeners;
    }

    fn install_page_listeners(self: &Rc<Self>) {
        let (Ok(window), Ok(document)) = (dom::window(), dom::document()) else {
            return;
        };
        let mut listeners = Vec::new();

        let weak: Weak<Self> = Rc::downgrade(self);
        listeners.push(EventListener::new(&document, "click", move |event| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let target = event.target().and_then(|t| t.dyn_into::<Node>().ok());
            let container: &Node = &inner.view.container;
            if !container.contains(target.as_ref()) && inner.state.borrow().is_open() {
                inner.close();
            }
        }));

        let weak = Rc::downgrade(self);
        listeners.push(EventListener::new(&document, "keydown", move |event| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let escape = event
                .dyn_ref::<KeyboardEvent>()
                .is_some_and(|key| key.key() == "Escape");
            if escape && inner.state.borrow().is_open() {
                inner.close();
            }
        }));

        let weak = Rc::downgrade(self);
        listeners.push(EventListener::new(&window, "resize", move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.schedule_reposition();
            }
        }));

        // Capture so scrolling inside any ancestor is seen too.
        let weak = Rc::downgrade(self);
        listeners.push(EventListener::new_with_options(
            &window,
            "scroll",
            EventListenerOptions {
                phase: EventListenerPhase::Capture,
                passive: true,
            },
            move |_| {
                if let Some(inner) = weak.upgrade() {
                    inner.schedule_reposition();
                }
            },
        ));

        // Rendering twice must not stack duplicate listeners.
        *self.page_listeners.borrow_mut() = listeners;
    }

    fn destroy(&self) {
        self.state.borrow_mut().destroy();
        self.page_listeners.borrow_mut().clear();
        self.own_listeners.borrow_mut().clear();
        self.reflow_frame.borrow_mut().take();
        self.view.container.remove();
    }
}

/// Position of the clicked option among the panel's children.
fn option_index(event: &Event, panel: &Element) -> Option<usize> {
    let target = event.target()?.dyn_into::<Element>().ok()?;
    let item: Node = target
        .closest(&format!(".{OPTION_CLASS}"))
        .ok()
        .flatten()?
        .into();
    let items = panel.children();
    (0..items.length())
        .find(|&i| {
            items
                .item(i)
                .is_some_and(|candidate| candidate.is_same_node(Some(&item)))
        })
        .map(|i| i as usize)
}
