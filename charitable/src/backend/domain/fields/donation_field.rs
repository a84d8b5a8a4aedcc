//! # Donation Field
//!
//! Declarative description of a donation-related value: where it is stored,
//! and whether it appears in the donation form, the admin form, the donation
//! details meta box, exports and email tags.
//!
//! Fields are declared with a loose argument bag (typically JSON or YAML)
//! and normalised once at registration. Omitted top-level keys take these
//! defaults:
//!
//! | key              | default |
//! |------------------|---------|
//! | `label`          | `""`    |
//! | `admin_label`    | `""`    |
//! | `data_type`      | `meta`  |
//! | `donation_form`  | `true`  |
//! | `admin_form`     | `true`  |
//! | `show_in_meta`   | `true`  |
//! | `show_in_export` | `true`  |
//! | `email_tag`      | `true`  |
//!
//! The bag cannot carry a value callback; any `value_callback` entry in it is
//! discarded. Callbacks are attached with [`DonationField::with_value_callback`].

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

use super::form_field::{is_truthy, FormField};
use super::FieldError;

/// Resolves a field's value from a donation and the field key.
pub type ValueCallback = Arc<dyn Fn(&Value, &str) -> Value + Send + Sync>;

/// Which storage backend holds the field's value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Meta,
    User,
    /// Reserved for fields built into the plugin itself
    Core,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Meta => "meta",
            DataType::User => "user",
            DataType::Core => "core",
        }
    }
}

impl FromStr for DataType {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "meta" => Ok(DataType::Meta),
            "user" => Ok(DataType::User),
            "core" => Ok(DataType::Core),
            other => Err(FieldError::InvalidDataType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailTag {
    pub tag: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
}

#[derive(Clone)]
pub struct DonationField {
    key: String,
    label: String,
    admin_label: String,
    data_type: DataType,
    value_callback: Option<ValueCallback>,
    donation_form: Option<FormField>,
    admin_form: Option<FormField>,
    show_in_meta: bool,
    show_in_export: bool,
    email_tag: Option<EmailTag>,
}

fn field_defaults() -> Map<String, Value> {
    match json!({
        "label": "",
        "admin_label": "",
        "data_type": "meta",
        "donation_form": true,
        "admin_form": true,
        "show_in_meta": true,
        "show_in_export": true,
        "email_tag": true,
    }) {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

static NULL: Value = Value::Null;

fn arg<'a>(args: &'a Map<String, Value>, name: &str) -> &'a Value {
    args.get(name).unwrap_or(&NULL)
}

fn string_arg(args: &Map<String, Value>, name: &str) -> String {
    match args.get(name) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

impl DonationField {
    /// Normalise an argument bag into a field definition
    pub fn new(key: impl Into<String>, args: Value) -> Result<Self, FieldError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(FieldError::EmptyKey);
        }

        let overrides = match args {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            _ => return Err(FieldError::NotAnObject(key)),
        };

        let mut args = field_defaults();
        for (name, value) in overrides {
            args.insert(name, value);
        }

        if args.get("value_callback").map_or(false, is_truthy) {
            debug!("Discarding value_callback argument for field '{}'", key);
        }

        let label = string_arg(&args, "label");
        let admin_label = string_arg(&args, "admin_label");
        let data_type = string_arg(&args, "data_type").parse::<DataType>()?;

        let donation_form = FormField::sanitize_setting(&key, arg(&args, "donation_form"))?;
        let admin_form = match arg(&args, "admin_form") {
            value if !is_truthy(value) => None,
            Value::Object(overrides) => Some(FormField::from_overrides(&key, overrides)?),
            _ => Some(donation_form.clone().unwrap_or_default()),
        };

        let email_tag = match arg(&args, "email_tag") {
            value if !is_truthy(value) => None,
            value => {
                let settings = value.as_object();
                let setting = |name: &str| {
                    settings
                        .and_then(|map| map.get(name))
                        .and_then(Value::as_str)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                };
                let fallback_description = if admin_label.is_empty() {
                    label.clone()
                } else {
                    admin_label.clone()
                };
                Some(EmailTag {
                    tag: setting("tag").unwrap_or_else(|| key.clone()),
                    description: setting("description").unwrap_or(fallback_description),
                    preview: setting("preview"),
                })
            }
        };

        Ok(Self {
            show_in_meta: is_truthy(arg(&args, "show_in_meta")),
            show_in_export: is_truthy(arg(&args, "show_in_export")),
            key,
            label,
            admin_label,
            data_type,
            value_callback: None,
            donation_form,
            admin_form,
            email_tag,
        })
    }

    /// Attach a callback that resolves this field's value for a donation
    pub fn with_value_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Value, &str) -> Value + Send + Sync + 'static,
    {
        self.value_callback = Some(Arc::new(callback));
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Label used in the admin form, meta box and export
    pub fn admin_label(&self) -> &str {
        if self.admin_label.is_empty() {
            &self.label
        } else {
            &self.admin_label
        }
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn donation_form(&self) -> Option<&FormField> {
        self.donation_form.as_ref()
    }

    pub fn admin_form(&self) -> Option<&FormField> {
        self.admin_form.as_ref()
    }

    pub fn show_in_meta(&self) -> bool {
        self.show_in_meta
    }

    pub fn show_in_export(&self) -> bool {
        self.show_in_export
    }

    pub fn email_tag(&self) -> Option<&EmailTag> {
        self.email_tag.as_ref()
    }

    pub fn has_value_callback(&self) -> bool {
        self.value_callback.is_some()
    }

    /// Value of this field for a donation. Without a callback the donation's
    /// own property named after the key is used.
    pub fn resolve_value(&self, donation: &Value) -> Value {
        match &self.value_callback {
            Some(callback) => callback(donation, &self.key),
            None => donation.get(&self.key).cloned().unwrap_or(Value::Null),
        }
    }
}

impl fmt::Debug for DonationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DonationField")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("admin_label", &self.admin_label)
            .field("data_type", &self.data_type)
            .field("has_value_callback", &self.value_callback.is_some())
            .field("donation_form", &self.donation_form)
            .field("admin_form", &self.admin_form)
            .field("show_in_meta", &self.show_in_meta)
            .field("show_in_export", &self.show_in_export)
            .field("email_tag", &self.email_tag)
            .finish()
    }
}
