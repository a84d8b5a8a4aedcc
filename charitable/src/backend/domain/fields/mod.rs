//! # Donation Fields
//!
//! Field definitions describe how a donation-related value is stored,
//! validated and displayed. They are registered once at startup, by the core
//! plugin and by addons, and read many times afterwards.

pub mod core_fields;
pub mod donation_field;
pub mod form_field;
pub mod registry;

pub use core_fields::register_core_fields;
pub use donation_field::{DataType, DonationField, EmailTag, ValueCallback};
pub use form_field::{is_truthy, FormField};
pub use registry::{FieldRegistry, FormKind};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FieldError {
    #[error("field key cannot be empty")]
    EmptyKey,
    #[error("field '{0}' is already registered")]
    DuplicateKey(String),
    #[error("invalid data type '{0}', expected meta, user or core")]
    InvalidDataType(String),
    #[error("arguments for field '{0}' must be a map")]
    NotAnObject(String),
    #[error("invalid arguments for field '{key}': {source}")]
    InvalidArguments {
        key: String,
        source: serde_json::Error,
    },
}
