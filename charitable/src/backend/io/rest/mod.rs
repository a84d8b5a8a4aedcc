//! # REST API Interface Layer
//!
//! HTTP endpoints over the donor service and the field registry, plus the
//! admin pages built from the view partials. JSON handlers translate between
//! the `shared` DTOs and domain types, log each request and map domain errors
//! to status codes.

pub mod admin_apis;
pub mod donor_apis;
pub mod field_apis;
pub mod mappers;
pub mod privacy_apis;

pub use admin_apis::*;
pub use donor_apis::*;
pub use field_apis::*;
pub use privacy_apis::*;
