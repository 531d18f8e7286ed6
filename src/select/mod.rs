//! Dropdown select state, independent of the DOM.
//!
//! The browser widget in `wasm::select` renders this state and forwards
//! events into it; everything that decides *what* happens lives here.

mod option;
mod placement;

pub use option::{normalize_options, DefaultOption, SelectOption, PLACEHOLDER_LABEL};
pub use placement::{place, Anchor, DropDirection, Placement, FALLBACK_MAX_HEIGHT_PX, GUTTER_PX};

/// Result of clicking an entry in the options panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionClick {
    /// Disabled or out of range: nothing changes and the panel stays open.
    Ignored,
    /// The option was chosen and the panel closed. `notify` carries the new
    /// value when the selection actually changed.
    Chosen { notify: Option<String> },
}

#[derive(Debug, Clone)]
pub struct SelectState {
    options: Vec<SelectOption>,
    selected: SelectOption,
    open: bool,
    placement: Placement,
    destroyed: bool,
}

impl SelectState {
    pub fn new(options: Vec<SelectOption>, default: DefaultOption) -> Self {
        let selected = default
            .value()
            .and_then(|value| find(&options, value))
            .or_else(|| options.first())
            .cloned()
            .unwrap_or_else(SelectOption::placeholder);
        Self {
            options,
            selected,
            open: false,
            placement: Placement {
                direction: DropDirection::Down,
                max_height: FALLBACK_MAX_HEIGHT_PX,
            },
            destroyed: false,
        }
    }

    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    pub fn value(&self) -> &str {
        &self.selected.value
    }

    pub fn label(&self) -> &str {
        &self.selected.name
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Index of the highlighted entry, if the selection is a real option.
    pub fn selected_index(&self) -> Option<usize> {
        self.options
            .iter()
            .position(|o| o.value == self.selected.value)
    }

    /// Open the panel, choosing its direction from the current geometry.
    pub fn open(&mut self, anchor: &Anchor, desired_height: f64) -> Option<Placement> {
        if self.destroyed {
            return None;
        }
        self.placement = place(anchor, desired_height);
        self.open = true;
        Some(self.placement)
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn toggle(&mut self, anchor: &Anchor, desired_height: f64) {
        if self.open {
            self.close();
        } else {
            self.open(anchor, desired_height);
        }
    }

    /// Re-evaluate placement after a resize or scroll. Does nothing while
    /// closed.
    pub fn reposition(&mut self, anchor: &Anchor, desired_height: f64) -> Option<Placement> {
        if !self.open || self.destroyed {
            return None;
        }
        self.placement = place(anchor, desired_height);
        Some(self.placement)
    }

    /// Select the first option whose value (or legacy code) matches.
    ///
    /// Returns the value the change callback should receive: only when
    /// `trigger` is set and the selection really changed.
    pub fn set_value(&mut self, value: &str, trigger: bool) -> Option<String> {
        let option = find(&self.options, value)?;
        if option.disabled {
            return None;
        }
        let changed = self.selected.value != option.value;
        self.selected = option.clone();
        (trigger && changed).then(|| self.selected.value.clone())
    }

    /// Swap the option list. Keeps the current value (or `keep_value` when
    /// given) if the new list has it, else falls back to the first option.
    /// Never produces a notification.
    pub fn update_options(&mut self, options: Vec<SelectOption>, keep_value: Option<&str>) {
        let wanted = keep_value.unwrap_or(&self.selected.value).to_string();
        self.options = options;
        self.selected = find(&self.options, &wanted)
            .or_else(|| self.options.first())
            .cloned()
            .unwrap_or_else(SelectOption::placeholder);
    }

    pub fn click_option(&mut self, index: usize) -> OptionClick {
        match self.options.get(index) {
            Some(option) if !option.disabled && !self.destroyed => {
                let value = option.value.clone();
                let notify = self.set_value(&value, true);
                self.close();
                OptionClick::Chosen { notify }
            }
            _ => OptionClick::Ignored,
        }
    }

    pub fn destroy(&mut self) {
        self.open = false;
        self.destroyed = true;
    }
}

fn find<'a>(options: &'a [SelectOption], value: &str) -> Option<&'a SelectOption> {
    options.iter().find(|o| o.value == value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn langs() -> Vec<SelectOption> {
        vec![
            SelectOption::new("English", "en"),
            SelectOption::new("Русский", "ru"),
            SelectOption::new("Deutsch", "de").disabled(),
        ]
    }

    fn cramped_below() -> Anchor {
        Anchor {
            top: 400.0,
            bottom: 430.0,
            viewport_height: 480.0,
        }
    }

    fn roomy_below() -> Anchor {
        Anchor {
            top: 50.0,
            bottom: 80.0,
            viewport_height: 480.0,
        }
    }

    #[test]
    fn default_resolution() {
        let s = SelectState::new(langs(), DefaultOption::Value("ru".into()));
        assert_eq!(s.value(), "ru");
        assert_eq!(s.label(), "Русский");

        let s = SelectState::new(langs(), DefaultOption::Value("xx".into()));
        assert_eq!(s.value(), "en");

        let s = SelectState::new(langs(), DefaultOption::Option(SelectOption::new("?", "ru")));
        assert_eq!(s.value(), "ru");

        let s = SelectState::new(Vec::new(), DefaultOption::None);
        assert_eq!(s.value(), "");
        assert_eq!(s.label(), PLACEHOLDER_LABEL);
        assert_eq!(s.selected_index(), None);
    }

    #[test]
    fn callback_fires_once_for_repeated_value() {
        let mut s = SelectState::new(langs(), DefaultOption::None);
        assert_eq!(s.set_value("ru", true), Some("ru".to_string()));
        assert_eq!(s.set_value("ru", true), None);
        assert_eq!(s.value(), "ru");
    }

    #[test]
    fn silent_set_value_updates_without_notifying() {
        let mut s = SelectState::new(langs(), DefaultOption::None);
        assert_eq!(s.set_value("ru", false), None);
        assert_eq!(s.value(), "ru");
        assert_eq!(s.selected_index(), Some(1));
    }

    #[test]
    fn unknown_and_disabled_values_are_ignored() {
        let mut s = SelectState::new(langs(), DefaultOption::None);
        assert_eq!(s.set_value("zz", true), None);
        assert_eq!(s.set_value("de", true), None);
        assert_eq!(s.value(), "en");
    }

    #[test]
    fn empty_widget_never_selects() {
        let mut s = SelectState::new(Vec::new(), DefaultOption::None);
        assert_eq!(s.set_value("", true), None);
        assert_eq!(s.set_value("x", true), None);
        assert_eq!(s.label(), PLACEHOLDER_LABEL);
    }

    #[test]
    fn update_options_falls_back_silently() {
        let mut s = SelectState::new(langs(), DefaultOption::None);
        s.update_options(vec![SelectOption::new("X", "x")], Some("nonexistent"));
        assert_eq!(s.value(), "x");
        assert_eq!(s.label(), "X");
    }

    #[test]
    fn update_options_preserves_or_forces() {
        let mut s = SelectState::new(langs(), DefaultOption::Value("ru".into()));
        let mut next = langs();
        next.reverse();
        s.update_options(next.clone(), None);
        assert_eq!(s.value(), "ru");

        s.update_options(next, Some("en"));
        assert_eq!(s.value(), "en");

        s.update_options(Vec::new(), None);
        assert_eq!(s.label(), PLACEHOLDER_LABEL);
    }

    #[test]
    fn open_chooses_direction() {
        let mut s = SelectState::new(langs(), DefaultOption::None);
        let p = s.open(&cramped_below(), 300.0).unwrap();
        assert_eq!(p.direction, DropDirection::Up);
        assert!(s.is_open());
        s.close();

        let p = s.open(&roomy_below(), 300.0).unwrap();
        assert_eq!(p.direction, DropDirection::Down);
    }

    #[test]
    fn reposition_only_while_open() {
        let mut s = SelectState::new(langs(), DefaultOption::None);
        assert_eq!(s.reposition(&cramped_below(), 300.0), None);
        s.open(&roomy_below(), 300.0);
        let p = s.reposition(&cramped_below(), 300.0).unwrap();
        assert_eq!(p.direction, DropDirection::Up);
        assert_eq!(s.placement().direction, DropDirection::Up);
    }

    #[test]
    fn toggle_flips_open_state() {
        let mut s = SelectState::new(langs(), DefaultOption::None);
        s.toggle(&roomy_below(), 300.0);
        assert!(s.is_open());
        s.toggle(&roomy_below(), 300.0);
        assert!(!s.is_open());
    }

    #[test]
    fn disabled_click_keeps_panel_open() {
        let mut s = SelectState::new(langs(), DefaultOption::None);
        s.open(&roomy_below(), 300.0);
        assert_eq!(s.click_option(2), OptionClick::Ignored);
        assert!(s.is_open());
        assert_eq!(s.value(), "en");
        assert_eq!(s.click_option(99), OptionClick::Ignored);
    }

    #[test]
    fn enabled_click_selects_and_closes() {
        let mut s = SelectState::new(langs(), DefaultOption::None);
        s.open(&roomy_below(), 300.0);
        assert_eq!(
            s.click_option(1),
            OptionClick::Chosen {
                notify: Some("ru".into())
            }
        );
        assert!(!s.is_open());

        s.open(&roomy_below(), 300.0);
        assert_eq!(s.click_option(1), OptionClick::Chosen { notify: None });
    }

    #[test]
    fn destroyed_state_ignores_interaction() {
        let mut s = SelectState::new(langs(), DefaultOption::None);
        s.open(&roomy_below(), 300.0);
        s.destroy();
        s.destroy();
        assert!(!s.is_open());
        assert_eq!(s.open(&roomy_below(), 300.0), None);
        assert_eq!(s.reposition(&roomy_below(), 300.0), None);
        assert_eq!(s.click_option(1), OptionClick::Ignored);
        assert_eq!(s.value(), "en");
    }
}
