//! Domain model for a donor.
use chrono::{Local, NaiveDateTime, Timelike};

/// Storage format for every donor timestamp column.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Value stored in datetime columns that have never been set.
pub const ZERO_DATETIME: &str = "0000-00-00 00:00:00";

/// Replacement written over a donor's email during erasure.
pub const ANONYMIZED_EMAIL: &str = "deleted@site.invalid";

#[derive(Debug, Clone, PartialEq)]
pub struct Donor {
    pub donor_id: i64,
    pub user_id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub date_joined: NaiveDateTime,
    pub data_erased: Option<NaiveDateTime>,
    pub contact_consent: Option<bool>,
}

impl Donor {
    pub fn is_erased(&self) -> bool {
        self.data_erased.is_some()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Payload for inserting a donor. Omitted columns take the table defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewDonor {
    pub user_id: Option<i64>,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_joined: Option<NaiveDateTime>,
    pub contact_consent: Option<bool>,
}

impl NewDonor {
    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Self::default()
        }
    }
}

/// Partial update of a donor row. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DonorChanges {
    pub user_id: Option<i64>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// `Some(None)` clears the consent flag back to unset
    pub contact_consent: Option<Option<bool>>,
}

impl DonorChanges {
    pub fn is_empty(&self) -> bool {
        self.user_id.is_none()
            && self.email.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.contact_consent.is_none()
    }
}

/// Personal data columns returned by an email lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonalData {
    pub donor_id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

pub fn format_datetime(value: &NaiveDateTime) -> String {
    value.format(DATETIME_FORMAT).to_string()
}

/// Parse a stored datetime, mapping the zero sentinel (and blanks) to `None`
pub fn parse_optional_datetime(value: &str) -> anyhow::Result<Option<NaiveDateTime>> {
    if value.is_empty() || value == ZERO_DATETIME {
        return Ok(None);
    }
    let parsed = NaiveDateTime::parse_from_str(value, DATETIME_FORMAT)
        .map_err(|e| anyhow::anyhow!("Invalid datetime '{}': {}", value, e))?;
    Ok(Some(parsed))
}

pub fn current_datetime() -> NaiveDateTime {
    let now = Local::now().naive_local();
    // Second precision, matching the column format
    now.with_nanosecond(0).unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_optional_datetime() {
        assert_eq!(parse_optional_datetime(ZERO_DATETIME).unwrap(), None);
        assert_eq!(parse_optional_datetime("").unwrap(), None);

        let parsed = parse_optional_datetime("2018-05-24 10:11:12").unwrap().unwrap();
        assert_eq!(format_datetime(&parsed), "2018-05-24 10:11:12");

        assert!(parse_optional_datetime("yesterday").is_err());
    }

    #[test]
    fn test_current_datetime_has_second_precision() {
        let now = current_datetime();
        assert_eq!(now.nanosecond(), 0);
    }

    #[test]
    fn test_donor_changes_is_empty() {
        assert!(DonorChanges::default().is_empty());
        let changes = DonorChanges {
            contact_consent: Some(None),
            ..DonorChanges::default()
        };
        assert!(!changes.is_empty());
    }
}
