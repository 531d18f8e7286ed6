use serde::Serialize;
use serde_json::Value;

pub const PLACEHOLDER_LABEL: &str = "Select Option";

/// One entry of a dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub name: String,
    pub value: String,
    pub disabled: bool,
}

impl SelectOption {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            disabled: false,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Stand-in shown when a widget has no options at all.
    pub fn placeholder() -> Self {
        Self::new(PLACEHOLDER_LABEL, "")
    }

    /// Coerce an arbitrary caller-supplied value into an option.
    ///
    /// `code` is accepted as a legacy spelling of `value`. A missing `name`
    /// displays the value.
    pub fn from_json(raw: &Value) -> Self {
        match raw {
            Value::Object(map) => {
                let value = map
                    .get("value")
                    .filter(|v| !v.is_null())
                    .or_else(|| map.get("code"))
                    .map(scalar_to_string)
                    .unwrap_or_default();
                let name = map
                    .get("name")
                    .filter(|v| !v.is_null())
                    .map(scalar_to_string)
                    .unwrap_or_else(|| value.clone());
                let disabled = map.get("disabled").is_some_and(truthy);
                Self {
                    name,
                    value,
                    disabled,
                }
            }
            other => {
                let text = scalar_to_string(other);
                Self::new(text.clone(), text)
            }
        }
    }
}

/// Normalize a raw options list. Anything that is not an array is treated as
/// an empty list.
pub fn normalize_options(raw: &Value) -> Vec<SelectOption> {
    match raw {
        Value::Array(items) => items.iter().map(SelectOption::from_json).collect(),
        _ => Vec::new(),
    }
}

/// How a caller named the initial selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DefaultOption {
    #[default]
    None,
    Value(String),
    Option(SelectOption),
}

impl DefaultOption {
    pub fn from_json(raw: &Value) -> Self {
        match raw {
            Value::Null => DefaultOption::None,
            Value::Object(_) => DefaultOption::Option(SelectOption::from_json(raw)),
            other => DefaultOption::Value(scalar_to_string(other)),
        }
    }

    pub(crate) fn value(&self) -> Option<&str> {
        match self {
            DefaultOption::None => None,
            DefaultOption::Value(value) => Some(value),
            DefaultOption::Option(option) => Some(&option.value),
        }
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => String::new(),
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
