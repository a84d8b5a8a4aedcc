//! # Admin View Partials
//!
//! Small HTML fragments rendered from an argument bag. Every partial is a
//! pure function of its arguments; all dynamic text is escaped.

pub mod escape;
pub mod heading;
pub mod number_setting;
pub mod text_field;

pub use escape::{escape_attr, escape_html};
pub use heading::render_heading;
pub use number_setting::render_number_setting;
pub use text_field::render_text_field;

use serde_json::{Map, Value};

/// Arguments passed to a partial
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewArgs(Map<String, Value>);

impl ViewArgs {
    pub fn new(values: Map<String, Value>) -> Self {
        Self(values)
    }

    /// Build from a JSON value; anything other than a map gives no arguments
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    /// A key counts as set unless it is missing or null
    pub fn is_set(&self, key: &str) -> bool {
        self.0.get(key).map_or(false, |v| !v.is_null())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    /// Scalar argument as display text
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).and_then(value_text)
    }

    /// Text of an argument, empty when unset
    pub fn text_or_empty(&self, key: &str) -> String {
        self.text(key).unwrap_or_default()
    }

    /// A key path given either as a list of segments or a single string
    pub fn key_path(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(Value::Array(items)) => items.iter().filter_map(value_text).collect(),
            Some(other) => value_text(other).into_iter().collect(),
            None => Vec::new(),
        }
    }
}

/// Render a scalar the way the stored option prints; maps and lists have no text
pub(crate) fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("1".to_string()),
        Value::Bool(false) => Some(String::new()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Renderer consulted before a field partial draws anything
pub trait FormView {
    fn field_has_required_args(&self, args: &ViewArgs) -> bool;
}

/// Form view of the donation admin metaboxes
#[derive(Debug, Clone, Copy, Default)]
pub struct AdminFormView;

impl AdminFormView {
    const REQUIRED_ARGS: [&'static str; 3] = ["id", "key", "value"];
}

impl FormView for AdminFormView {
    fn field_has_required_args(&self, args: &ViewArgs) -> bool {
        Self::REQUIRED_ARGS.iter().all(|key| args.is_set(key))
    }
}
