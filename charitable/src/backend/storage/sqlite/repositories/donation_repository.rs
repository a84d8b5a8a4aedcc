use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info};

use super::donor_repository::{CAMPAIGN_DONATIONS_TABLE, POSTS_TABLE};
use crate::backend::domain::models::{current_datetime, format_datetime, DonationStatus, NewDonation};
use crate::backend::storage::sqlite::connection::DbConnection;
use crate::backend::storage::DonationStorage;

const DONATION_POST_TYPE: &str = "donation";

/// Repository for donation posts and their campaign donation rows
#[derive(Clone)]
pub struct DonationRepository {
    db: DbConnection,
}

impl DonationRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DonationStorage for DonationRepository {
    async fn create_tables(&self) -> Result<()> {
        let posts = self.db.table(POSTS_TABLE);
        let campaign_donations = self.db.table(CAMPAIGN_DONATIONS_TABLE);

        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                ID INTEGER PRIMARY KEY AUTOINCREMENT,
                post_type TEXT NOT NULL DEFAULT 'post',
                post_status TEXT NOT NULL DEFAULT 'publish',
                post_date TEXT NOT NULL DEFAULT '0000-00-00 00:00:00'
            );
            "#,
            posts
        ))
        .execute(self.db.pool())
        .await?;

        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                campaign_donation_id INTEGER PRIMARY KEY AUTOINCREMENT,
                donation_id INTEGER NOT NULL,
                donor_id INTEGER NOT NULL,
                campaign_id INTEGER NOT NULL,
                amount REAL NOT NULL
            );
            "#,
            campaign_donations
        ))
        .execute(self.db.pool())
        .await?;

        for column in ["donation_id", "donor_id", "campaign_id"] {
            sqlx::query(&format!(
                "CREATE INDEX IF NOT EXISTS idx_{table}_{column} ON {table}({column});",
                table = campaign_donations,
                column = column,
            ))
            .execute(self.db.pool())
            .await?;
        }

        debug!("Ensured tables {} and {}", posts, campaign_donations);
        Ok(())
    }

    async fn record_donation(&self, donation: &NewDonation) -> Result<i64> {
        let mut tx = self.db.pool().begin().await?;

        let donation_id = sqlx::query(&format!(
            "INSERT INTO {} (post_type, post_status, post_date) VALUES (?, ?, ?)",
            self.db.table(POSTS_TABLE)
        ))
        .bind(DONATION_POST_TYPE)
        .bind(donation.status.as_str())
        .bind(format_datetime(&current_datetime()))
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        sqlx::query(&format!(
            "INSERT INTO {} (donation_id, donor_id, campaign_id, amount) VALUES (?, ?, ?, ?)",
            self.db.table(CAMPAIGN_DONATIONS_TABLE)
        ))
        .bind(donation_id)
        .bind(donation.donor_id)
        .bind(donation.campaign_id)
        .bind(donation.amount)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            "Recorded donation {} for donor {} ({})",
            donation_id, donation.donor_id, donation.status
        );
        Ok(donation_id)
    }

    async fn update_status(&self, donation_id: i64, status: DonationStatus) -> Result<bool> {
        let result = sqlx::query(&format!(
            "UPDATE {} SET post_status = ? WHERE ID = ? AND post_type = ?",
            self.db.table(POSTS_TABLE)
        ))
        .bind(status.as_str())
        .bind(donation_id)
        .bind(DONATION_POST_TYPE)
        .execute(self.db.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
