//! # Storage Traits
//!
//! Storage abstractions used by the domain layer. The SQLite repositories in
//! `storage::sqlite` are the production implementations.

use anyhow::Result;
use async_trait::async_trait;

use crate::backend::domain::models::{
    DonationStatus, Donor, DonorChanges, NewDonation, NewDonor, PersonalData,
};

/// Sole gateway to the donor table
#[async_trait]
pub trait DonorStorage: Send + Sync {
    /// Create the donor table and its indexes if they do not exist
    async fn create_table(&self) -> Result<()>;

    /// Insert a donor, applying column defaults. Returns the new donor ID.
    async fn insert(&self, donor: &NewDonor) -> Result<i64>;

    /// Fetch a full donor record
    async fn get(&self, donor_id: i64) -> Result<Option<Donor>>;

    /// Update the supplied columns of a donor. Returns the affected row count.
    async fn update(&self, donor_id: i64, changes: &DonorChanges) -> Result<u64>;

    /// User ID linked to a donor
    async fn get_user_id(&self, donor_id: i64) -> Result<Option<i64>>;

    /// Donor ID linked to a user
    async fn get_donor_id(&self, user_id: i64) -> Result<Option<i64>>;

    /// Donor ID for an email address. Emails are not unique; the first match wins.
    async fn get_donor_id_by_email(&self, email: &str) -> Result<Option<i64>>;

    /// Personal data of every donor row with this email
    async fn get_personal_data(&self, email: &str) -> Result<Vec<PersonalData>>;

    /// Count distinct donors who have donations in any of the given statuses.
    ///
    /// Statuses that fail the whitelist are dropped first. If nothing is left
    /// the count covers donations of every status.
    async fn count_donors_with_donations(&self, statuses: &[String]) -> Result<i64>;

    /// Anonymise the given donors. Non-positive IDs are ignored.
    ///
    /// Returns `None` when no valid ID remained, otherwise the number of
    /// rows affected.
    async fn erase_donor_data(&self, donor_ids: &[i64]) -> Result<Option<u64>>;
}

/// Donation records joined by the donor count queries
#[async_trait]
pub trait DonationStorage: Send + Sync {
    async fn create_tables(&self) -> Result<()>;

    /// Record a donation. Returns the donation ID.
    async fn record_donation(&self, donation: &NewDonation) -> Result<i64>;

    /// Change the status of a donation. Returns true if the donation existed.
    async fn update_status(&self, donation_id: i64, status: DonationStatus) -> Result<bool>;
}
