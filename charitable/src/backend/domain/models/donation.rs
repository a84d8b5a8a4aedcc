//! Domain model for donations, as far as donor queries need them.
use std::fmt;
use std::str::FromStr;

/// Donation post statuses recognised by the donor queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DonationStatus {
    Completed,
    Pending,
    Failed,
    Cancelled,
    Refunded,
    Preapproved,
}

impl DonationStatus {
    pub const ALL: [DonationStatus; 6] = [
        DonationStatus::Completed,
        DonationStatus::Pending,
        DonationStatus::Failed,
        DonationStatus::Cancelled,
        DonationStatus::Refunded,
        DonationStatus::Preapproved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DonationStatus::Completed => "charitable-completed",
            DonationStatus::Pending => "charitable-pending",
            DonationStatus::Failed => "charitable-failed",
            DonationStatus::Cancelled => "charitable-cancelled",
            DonationStatus::Refunded => "charitable-refunded",
            DonationStatus::Preapproved => "charitable-preapproved",
        }
    }

    /// Whitelist predicate for raw status strings
    pub fn is_valid(status: &str) -> bool {
        status.parse::<DonationStatus>().is_ok()
    }

    /// Statuses counted when the caller does not specify any
    pub fn default_counted() -> Vec<String> {
        vec![DonationStatus::Completed.as_str().to_string()]
    }
}

impl fmt::Display for DonationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DonationStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DonationStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Unknown donation status: {}", s))
    }
}

/// A donation made by a donor to a campaign.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDonation {
    pub donor_id: i64,
    pub campaign_id: i64,
    pub amount: f64,
    pub status: DonationStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_whitelist() {
        assert!(DonationStatus::is_valid("charitable-completed"));
        assert!(DonationStatus::is_valid("charitable-refunded"));
        assert!(!DonationStatus::is_valid("publish"));
        assert!(!DonationStatus::is_valid("completed"));
        assert!(!DonationStatus::is_valid(""));
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in DonationStatus::ALL {
            assert_eq!(status.as_str().parse::<DonationStatus>().unwrap(), status);
        }
    }
}
