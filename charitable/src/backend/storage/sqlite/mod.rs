//! # SQLite Storage Module
//!
//! SQLite-backed implementations of the storage traits.
//!
//! - **connection.rs** - pool management and table prefixing
//! - **repositories/** - donor and donation repositories

pub mod connection;
pub mod repositories;

pub use connection::DbConnection;
pub use repositories::{DonationRepository, DonorRepository};
