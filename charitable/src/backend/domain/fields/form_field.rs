//! Presentation specs shared by the donation form and admin form settings.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::warn;

use super::FieldError;

/// Widget types whose `options` list is mandatory.
const OPTION_WIDGETS: [&str; 3] = ["select", "radio", "multi-checkbox"];

/// How a field is rendered in a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    #[serde(rename = "type")]
    pub field_type: String,
    pub required: bool,
    pub fullwidth: bool,
    pub default: Value,
    pub attrs: Map<String, Value>,
    /// Stored value => visible label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Map<String, Value>>,
    /// Explicit position; overrides `show_after` and `show_before`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_after: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_before: Option<String>,
    /// Layout hints and anything else callers attach
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for FormField {
    fn default() -> Self {
        Self {
            field_type: "text".to_string(),
            required: false,
            fullwidth: false,
            default: Value::String(String::new()),
            attrs: Map::new(),
            options: None,
            priority: None,
            show_after: None,
            show_before: None,
            extra: Map::new(),
        }
    }
}

fn default_widget_args() -> Map<String, Value> {
    let defaults = json!({
        "type": "text",
        "required": false,
        "fullwidth": false,
        "default": "",
        "attrs": {},
    });
    match defaults {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

impl FormField {
    /// Build a widget from caller overrides, merged over the default widget at
    /// the top level only. A nested `attrs` map replaces the default wholesale.
    pub fn from_overrides(key: &str, overrides: &Map<String, Value>) -> Result<Self, FieldError> {
        let mut merged = default_widget_args();
        for (name, value) in overrides {
            merged.insert(name.clone(), value.clone());
        }
        coerce_loose_values(key, &mut merged);

        let field: FormField =
            serde_json::from_value(Value::Object(merged)).map_err(|source| {
                FieldError::InvalidArguments {
                    key: key.to_string(),
                    source,
                }
            })?;

        if OPTION_WIDGETS.contains(&field.field_type.as_str()) && field.options.is_none() {
            warn!(
                "Field '{}' uses a {} widget without any options",
                key, field.field_type
            );
        }

        Ok(field)
    }

    /// Normalise a donation form setting: falsy suppresses the field, a
    /// non-map truthy value yields the default widget, a map is merged.
    pub fn sanitize_setting(key: &str, value: &Value) -> Result<Option<Self>, FieldError> {
        if !is_truthy(value) {
            return Ok(None);
        }
        match value {
            Value::Object(overrides) => Self::from_overrides(key, overrides).map(Some),
            _ => Ok(Some(Self::default())),
        }
    }

}

/// Bring loosely typed widget arguments into the shape the struct expects
fn coerce_loose_values(key: &str, args: &mut Map<String, Value>) {
    for flag in ["required", "fullwidth"] {
        if let Some(value) = args.get_mut(flag) {
            *value = Value::Bool(is_truthy(value));
        }
    }

    if matches!(args.get("attrs"), Some(value) if !value.is_object()) {
        args.insert("attrs".to_string(), Value::Object(Map::new()));
    }

    if matches!(args.get("options"), Some(Value::Null)) {
        args.remove("options");
    }

    for anchor in ["show_after", "show_before"] {
        if matches!(args.get(anchor), Some(value) if !is_truthy(value)) {
            args.remove(anchor);
        }
    }

    let priority = match args.get("priority") {
        Some(Value::String(text)) => Some(text.trim().parse::<f64>().ok()),
        Some(Value::Null) => Some(None),
        _ => None,
    };
    if let Some(parsed) = priority {
        match parsed.and_then(serde_json::Number::from_f64) {
            Some(number) => {
                args.insert("priority".to_string(), Value::Number(number));
            }
            None => {
                if args.get("priority").map_or(false, |v| !v.is_null()) {
                    warn!("Ignoring non-numeric priority for field '{}'", key);
                }
                args.remove("priority");
            }
        }
    }
}

/// Loose truthiness of an argument value: `false`, `null`, zero, `""`, `"0"`
/// and empty arrays or maps are falsy
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |v| v != 0.0),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
