//! # Storage Module
//!
//! Handles all data persistence for donors and the donation rows their
//! queries join against.
//!
//! The domain layer only sees the traits in `traits.rs`; the SQLite
//! repositories are wired in by `initialize_backend`. Storage errors are
//! propagated unchanged to the caller.

pub mod sqlite;
pub mod traits;

pub use sqlite::{DbConnection, DonationRepository, DonorRepository};
pub use traits::{DonationStorage, DonorStorage};
