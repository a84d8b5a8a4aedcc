//! # IO Module
//!
//! Interface layer between callers and the domain: the REST API and the
//! admin HTML partials.

pub mod rest;
pub mod views;

pub use rest::*;
