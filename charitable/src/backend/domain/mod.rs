//! # Domain Module
//!
//! Business logic for donors, donation fields and addons.
//!
//! - **models**: donor and donation records as the domain sees them
//! - **commands**: service inputs and results that never cross the API
//! - **donor_service**: registration, lookups, counts and privacy requests
//! - **fields**: declarative donation field definitions and their registry
//! - **addons**: optional feature modules and their dispatcher

pub mod addons;
pub mod commands;
pub mod donor_service;
pub mod fields;
pub mod models;

pub use donor_service::{DonorError, DonorService};
