use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite};
use tracing::{debug, info};

use super::query_placeholders;
use crate::backend::domain::models::{
    current_datetime, format_datetime, parse_optional_datetime, DonationStatus, Donor,
    DonorChanges, NewDonor, PersonalData, ANONYMIZED_EMAIL, DATETIME_FORMAT, ZERO_DATETIME,
};
use crate::backend::storage::sqlite::connection::DbConnection;
use crate::backend::storage::DonorStorage;

pub const DONORS_TABLE: &str = "charitable_donors";
pub const CAMPAIGN_DONATIONS_TABLE: &str = "charitable_campaign_donations";
pub const POSTS_TABLE: &str = "posts";

/// Whitelisted donor columns that lookups may select or filter by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DonorColumn {
    DonorId,
    UserId,
    Email,
}

impl DonorColumn {
    fn as_str(&self) -> &'static str {
        match self {
            DonorColumn::DonorId => "donor_id",
            DonorColumn::UserId => "user_id",
            DonorColumn::Email => "email",
        }
    }
}

enum ColumnValue<'a> {
    Int(i64),
    Text(&'a str),
}

/// Repository for the donor table
#[derive(Clone)]
pub struct DonorRepository {
    db: DbConnection,
    table: String,
}

impl DonorRepository {
    pub fn new(db: DbConnection) -> Self {
        let table = db.table(DONORS_TABLE);
        Self { db, table }
    }

    /// Select a single integer column from the first row matching `by = value`
    async fn get_column_by(
        &self,
        column: DonorColumn,
        by: DonorColumn,
        value: ColumnValue<'_>,
    ) -> Result<Option<i64>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ? ORDER BY donor_id ASC LIMIT 1",
            column.as_str(),
            self.table,
            by.as_str()
        );

        let query = sqlx::query_scalar::<_, i64>(&sql);
        let query = match value {
            ColumnValue::Int(v) => query.bind(v),
            ColumnValue::Text(v) => query.bind(v),
        };

        Ok(query.fetch_optional(self.db.pool()).await?)
    }

    fn row_to_donor(row: &SqliteRow) -> Result<Donor> {
        let date_joined: String = row.try_get("date_joined")?;
        let data_erased: Option<String> = row.try_get("data_erased")?;
        let contact_consent: Option<i64> = row.try_get("contact_consent")?;

        Ok(Donor {
            donor_id: row.try_get("donor_id")?,
            user_id: row.try_get("user_id")?,
            email: row.try_get("email")?,
            first_name: row.try_get::<Option<String>, _>("first_name")?.unwrap_or_default(),
            last_name: row.try_get::<Option<String>, _>("last_name")?.unwrap_or_default(),
            date_joined: chrono::NaiveDateTime::parse_from_str(&date_joined, DATETIME_FORMAT)
                .with_context(|| format!("Invalid date_joined '{}'", date_joined))?,
            data_erased: match data_erased {
                Some(value) => parse_optional_datetime(&value)?,
                None => None,
            },
            contact_consent: contact_consent.map(|v| v != 0),
        })
    }

    fn row_to_personal_data(row: &SqliteRow) -> Result<PersonalData> {
        Ok(PersonalData {
            donor_id: row.try_get("donor_id")?,
            email: row.try_get("email")?,
            first_name: row.try_get::<Option<String>, _>("first_name")?.unwrap_or_default(),
            last_name: row.try_get::<Option<String>, _>("last_name")?.unwrap_or_default(),
        })
    }
}

#[async_trait]
impl DonorStorage for DonorRepository {
    async fn create_table(&self) -> Result<()> {
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                donor_id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL DEFAULT 0,
                email TEXT NOT NULL,
                first_name TEXT DEFAULT '',
                last_name TEXT DEFAULT '',
                date_joined TEXT NOT NULL DEFAULT '{zero}',
                data_erased TEXT DEFAULT '{zero}',
                contact_consent INTEGER DEFAULT NULL
            );
            "#,
            table = self.table,
            zero = ZERO_DATETIME,
        ))
        .execute(self.db.pool())
        .await?;

        for column in ["user_id", "email", "data_erased", "contact_consent"] {
            sqlx::query(&format!(
                "CREATE INDEX IF NOT EXISTS idx_{table}_{column} ON {table}({column});",
                table = self.table,
                column = column,
            ))
            .execute(self.db.pool())
            .await?;
        }

        debug!("Ensured table {}", self.table);
        Ok(())
    }

    async fn insert(&self, donor: &NewDonor) -> Result<i64> {
        let date_joined = donor.date_joined.unwrap_or_else(current_datetime);

        let result = sqlx::query(&format!(
            r#"
            INSERT INTO {} (user_id, email, first_name, last_name, date_joined, data_erased, contact_consent)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            self.table
        ))
        .bind(donor.user_id.unwrap_or(0))
        .bind(&donor.email)
        .bind(donor.first_name.as_deref().unwrap_or(""))
        .bind(donor.last_name.as_deref().unwrap_or(""))
        .bind(format_datetime(&date_joined))
        .bind(ZERO_DATETIME)
        .bind(donor.contact_consent.map(i64::from))
        .execute(self.db.pool())
        .await?;

        let donor_id = result.last_insert_rowid();
        info!("Inserted donor {}", donor_id);
        Ok(donor_id)
    }

    async fn get(&self, donor_id: i64) -> Result<Option<Donor>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT donor_id, user_id, email, first_name, last_name, date_joined, data_erased, contact_consent
            FROM {}
            WHERE donor_id = ?
            "#,
            self.table
        ))
        .bind(donor_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::row_to_donor).transpose()
    }

    async fn update(&self, donor_id: i64, changes: &DonorChanges) -> Result<u64> {
        if changes.is_empty() {
            return Ok(0);
        }

        let mut builder = QueryBuilder::<Sqlite>::new(format!("UPDATE {} SET ", self.table));
        {
            let mut set = builder.separated(", ");
            if let Some(user_id) = changes.user_id {
                set.push("user_id = ").push_bind_unseparated(user_id);
            }
            if let Some(email) = &changes.email {
                set.push("email = ").push_bind_unseparated(email.clone());
            }
            if let Some(first_name) = &changes.first_name {
                set.push("first_name = ").push_bind_unseparated(first_name.clone());
            }
            if let Some(last_name) = &changes.last_name {
                set.push("last_name = ").push_bind_unseparated(last_name.clone());
            }
            if let Some(consent) = changes.contact_consent {
                set.push("contact_consent = ")
                    .push_bind_unseparated(consent.map(i64::from));
            }
        }
        builder.push(" WHERE donor_id = ").push_bind(donor_id);

        let result = builder.build().execute(self.db.pool()).await?;
        Ok(result.rows_affected())
    }

    async fn get_user_id(&self, donor_id: i64) -> Result<Option<i64>> {
        self.get_column_by(DonorColumn::UserId, DonorColumn::DonorId, ColumnValue::Int(donor_id))
            .await
    }

    async fn get_donor_id(&self, user_id: i64) -> Result<Option<i64>> {
        self.get_column_by(DonorColumn::DonorId, DonorColumn::UserId, ColumnValue::Int(user_id))
            .await
    }

    async fn get_donor_id_by_email(&self, email: &str) -> Result<Option<i64>> {
        self.get_column_by(DonorColumn::DonorId, DonorColumn::Email, ColumnValue::Text(email))
            .await
    }

    async fn get_personal_data(&self, email: &str) -> Result<Vec<PersonalData>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT donor_id, email, first_name, last_name
            FROM {}
            WHERE email = ?
            ORDER BY donor_id ASC
            "#,
            self.table
        ))
        .bind(email)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::row_to_personal_data).collect()
    }

    async fn count_donors_with_donations(&self, statuses: &[String]) -> Result<i64> {
        let statuses: Vec<&String> = statuses
            .iter()
            .filter(|status| DonationStatus::is_valid(status))
            .collect();

        let mut sql = format!(
            r#"
            SELECT COUNT(DISTINCT d.donor_id)
            FROM {donors} d
            INNER JOIN {campaign_donations} cd ON cd.donor_id = d.donor_id
            INNER JOIN {posts} p ON cd.donation_id = p.ID
            WHERE 1 = 1
            "#,
            donors = self.table,
            campaign_donations = self.db.table(CAMPAIGN_DONATIONS_TABLE),
            posts = self.db.table(POSTS_TABLE),
        );
        if !statuses.is_empty() {
            sql.push_str(&format!(
                "AND p.post_status IN ( {} )",
                query_placeholders(statuses.len())
            ));
        }

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        for status in &statuses {
            query = query.bind(status.as_str());
        }

        Ok(query.fetch_one(self.db.pool()).await?)
    }

    async fn erase_donor_data(&self, donor_ids: &[i64]) -> Result<Option<u64>> {
        let mut ids: Vec<i64> = donor_ids.iter().copied().filter(|id| *id > 0).collect();
        ids.sort_unstable();
        ids.dedup();

        if ids.is_empty() {
            debug!("No valid donor IDs to erase in {:?}", donor_ids);
            return Ok(None);
        }

        let sql = format!(
            r#"
            UPDATE {}
            SET email = ?, first_name = '', last_name = '', data_erased = ?
            WHERE donor_id IN ( {} )
            "#,
            self.table,
            query_placeholders(ids.len())
        );

        let mut query = sqlx::query(&sql)
            .bind(ANONYMIZED_EMAIL)
            .bind(format_datetime(&current_datetime()));
        for id in &ids {
            query = query.bind(*id);
        }

        let result = query.execute(self.db.pool()).await?;
        info!("Erased personal data for {} donors", result.rows_affected());
        Ok(Some(result.rows_affected()))
    }
}
