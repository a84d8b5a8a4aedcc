use anyhow::Result;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::backend::domain::commands::donors::RegisterDonorCommand;
use crate::backend::domain::commands::privacy::{ErasureReport, ExportItem, PersonalDataExport};
use crate::backend::domain::models::{DonationStatus, Donor, NewDonor};
use crate::backend::storage::DonorStorage;

const MAX_EMAIL_LENGTH: usize = 100;
const MAX_NAME_LENGTH: usize = 255;

/// Rejections of caller input; every other error is a storage failure
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DonorError {
    #[error("{0}")]
    Invalid(String),
}

/// Service for donor registration, lookups and privacy requests
#[derive(Clone)]
pub struct DonorService {
    storage: Arc<dyn DonorStorage>,
}

impl DonorService {
    pub fn new(storage: Arc<dyn DonorStorage>) -> Self {
        Self { storage }
    }

    /// Validate and insert a new donor. Returns the donor ID.
    pub async fn register_donor(&self, command: RegisterDonorCommand) -> Result<i64> {
        info!("Registering donor: email={}", command.email);

        self.validate_register_command(&command)?;

        let donor = NewDonor {
            user_id: command.user_id,
            email: command.email.trim().to_string(),
            first_name: command.first_name.map(|name| name.trim().to_string()),
            last_name: command.last_name.map(|name| name.trim().to_string()),
            date_joined: None,
            contact_consent: command.contact_consent,
        };

        self.storage.insert(&donor).await
    }

    pub async fn get_donor(&self, donor_id: i64) -> Result<Option<Donor>> {
        let donor = self.storage.get(donor_id).await?;
        if donor.is_none() {
            warn!("Donor not found: {}", donor_id);
        }
        Ok(donor)
    }

    pub async fn find_donor_id_by_email(&self, email: &str) -> Result<Option<i64>> {
        self.storage.get_donor_id_by_email(email.trim()).await
    }

    pub async fn find_donor_id_by_user(&self, user_id: i64) -> Result<Option<i64>> {
        self.storage.get_donor_id(user_id).await
    }

    pub async fn find_user_id(&self, donor_id: i64) -> Result<Option<i64>> {
        self.storage.get_user_id(donor_id).await
    }

    /// Count donors with donations; `None` counts completed donations only
    pub async fn count_donors_with_donations(&self, statuses: Option<Vec<String>>) -> Result<i64> {
        let statuses = statuses.unwrap_or_else(DonationStatus::default_counted);
        let count = self.storage.count_donors_with_donations(&statuses).await?;
        info!("Counted {} donors with donations in {:?}", count, statuses);
        Ok(count)
    }

    /// Collect every donor row's personal data for an email address
    pub async fn export_personal_data(&self, email: &str) -> Result<PersonalDataExport> {
        info!("Exporting personal data for {}", email);

        let records = self.storage.get_personal_data(email.trim()).await?;
        let items = records
            .into_iter()
            .map(|record| ExportItem {
                group_id: "donors".to_string(),
                group_label: "Donor".to_string(),
                item_id: format!("donor-{}", record.donor_id),
                data: vec![
                    ("Donor ID".to_string(), record.donor_id.to_string()),
                    ("Email".to_string(), record.email),
                    ("First Name".to_string(), record.first_name),
                    ("Last Name".to_string(), record.last_name),
                ],
            })
            .collect();

        Ok(PersonalDataExport { items })
    }

    /// Erase every donor row linked to an email address
    pub async fn erase_personal_data(&self, email: &str) -> Result<ErasureReport> {
        info!("Erasing personal data for {}", email);

        let donor_ids: Vec<i64> = self
            .storage
            .get_personal_data(email.trim())
            .await?
            .into_iter()
            .map(|record| record.donor_id)
            .collect();

        match self.storage.erase_donor_data(&donor_ids).await? {
            None => Ok(ErasureReport {
                items_removed: false,
                items_retained: false,
                messages: vec!["No donor records found for this email address.".to_string()],
            }),
            Some(affected) => {
                let retained = (affected as usize) < donor_ids.len();
                let mut messages = Vec::new();
                if retained {
                    warn!(
                        "Erased {} of {} donor records for {}",
                        affected,
                        donor_ids.len(),
                        email
                    );
                    messages.push(format!(
                        "{} donor records could not be erased.",
                        donor_ids.len() - affected as usize
                    ));
                }
                Ok(ErasureReport {
                    items_removed: affected > 0,
                    items_retained: retained,
                    messages,
                })
            }
        }
    }

    fn validate_register_command(&self, command: &RegisterDonorCommand) -> Result<(), DonorError> {
        let email = command.email.trim();
        if email.is_empty() {
            return Err(DonorError::Invalid("Donor email cannot be empty".to_string()));
        }
        if !email.contains('@') {
            return Err(DonorError::Invalid("Donor email must contain '@'".to_string()));
        }
        if email.chars().count() > MAX_EMAIL_LENGTH {
            return Err(DonorError::Invalid(format!(
                "Donor email cannot exceed {} characters",
                MAX_EMAIL_LENGTH
            )));
        }

        for name in [&command.first_name, &command.last_name].into_iter().flatten() {
            if name.trim().chars().count() > MAX_NAME_LENGTH {
                return Err(DonorError::Invalid(format!(
                    "Donor names cannot exceed {} characters",
                    MAX_NAME_LENGTH
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::models::{NewDonation, ANONYMIZED_EMAIL};
    use crate::backend::storage::{DbConnection, DonationRepository, DonationStorage, DonorRepository};

    async fn setup_test() -> (DonorService, DonationRepository) {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let donors = DonorRepository::new(db.clone());
        let donations = DonationRepository::new(db);
        donors.create_table().await.unwrap();
        donations.create_tables().await.unwrap();
        (DonorService::new(Arc::new(donors)), donations)
    }

    fn register(email: &str) -> RegisterDonorCommand {
        RegisterDonorCommand {
            email: email.to_string(),
            first_name: Some("Jane".to_string()),
            last_name: Some("Giver".to_string()),
            ..RegisterDonorCommand::default()
        }
    }

    #[tokio::test]
    async fn test_register_donor() {
        let (service, _) = setup_test().await;

        let donor_id = service
            .register_donor(register("  jane@example.com "))
            .await
            .expect("Failed to register donor");

        let donor = service.get_donor(donor_id).await.unwrap().expect("Donor should exist");
        assert_eq!(donor.email, "jane@example.com");
        assert_eq!(donor.full_name(), "Jane Giver");
        assert_eq!(
            service.find_donor_id_by_email("jane@example.com").await.unwrap(),
            Some(donor_id)
        );
    }

    #[tokio::test]
    async fn test_register_donor_validation() {
        let (service, _) = setup_test().await;

        assert!(service.register_donor(register("")).await.is_err());
        assert!(service.register_donor(register("not-an-email")).await.is_err());

        let long_email = format!("{}@example.com", "a".repeat(100));
        assert!(service.register_donor(register(&long_email)).await.is_err());

        let mut command = register("ok@example.com");
        command.last_name = Some("x".repeat(256));
        let error = service.register_donor(command).await.unwrap_err();
        assert!(matches!(error.downcast_ref::<DonorError>(), Some(DonorError::Invalid(_))));
    }

    #[tokio::test]
    async fn test_length_limits_count_characters() {
        let (service, _) = setup_test().await;

        // 95 two-byte characters plus the domain stay under 100 characters
        let email = format!("{}@b.io", "é".repeat(95));
        assert!(email.len() > MAX_EMAIL_LENGTH);
        assert!(service.register_donor(register(&email)).await.is_ok());

        let mut command = register("names@example.com");
        command.first_name = Some("ü".repeat(255));
        assert!(service.register_donor(command).await.is_ok());
    }

    #[tokio::test]
    async fn test_user_lookups() {
        let (service, _) = setup_test().await;

        let mut command = register("member@example.com");
        command.user_id = Some(42);
        let donor_id = service.register_donor(command).await.unwrap();

        assert_eq!(service.find_donor_id_by_user(42).await.unwrap(), Some(donor_id));
        assert_eq!(service.find_user_id(donor_id).await.unwrap(), Some(42));
        assert_eq!(service.find_donor_id_by_user(7).await.unwrap(), None);
        assert_eq!(service.find_user_id(donor_id + 100).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_storage_failures_are_not_validation_errors() {
        let db = DbConnection::init_test().await.unwrap();
        // No table has been created
        let service = DonorService::new(Arc::new(DonorRepository::new(db)));

        let error = service.register_donor(register("jane@example.com")).await.unwrap_err();
        assert!(error.downcast_ref::<DonorError>().is_none());
    }

    #[tokio::test]
    async fn test_export_personal_data() {
        let (service, _) = setup_test().await;

        let first = service.register_donor(register("twice@example.com")).await.unwrap();
        let second = service.register_donor(register("twice@example.com")).await.unwrap();

        let export = service.export_personal_data("twice@example.com").await.unwrap();
        assert_eq!(export.items.len(), 2);
        assert_eq!(export.items[0].item_id, format!("donor-{}", first));
        assert_eq!(export.items[1].item_id, format!("donor-{}", second));
        assert_eq!(export.items[0].group_id, "donors");
        assert!(export.items[0]
            .data
            .contains(&("Email".to_string(), "twice@example.com".to_string())));

        let empty = service.export_personal_data("nobody@example.com").await.unwrap();
        assert!(empty.items.is_empty());
    }

    #[tokio::test]
    async fn test_erase_personal_data() {
        let (service, _) = setup_test().await;

        let donor_id = service.register_donor(register("gone@example.com")).await.unwrap();

        let report = service.erase_personal_data("gone@example.com").await.unwrap();
        assert!(report.items_removed);
        assert!(!report.items_retained);

        let donor = service.get_donor(donor_id).await.unwrap().unwrap();
        assert_eq!(donor.email, ANONYMIZED_EMAIL);
        assert!(donor.is_erased());
        assert!(service
            .export_personal_data("gone@example.com")
            .await
            .unwrap()
            .items
            .is_empty());
    }

    #[tokio::test]
    async fn test_erase_unknown_email_reports_nothing_removed() {
        let (service, _) = setup_test().await;

        let report = service.erase_personal_data("unknown@example.com").await.unwrap();
        assert!(!report.items_removed);
        assert!(!report.items_retained);
        assert_eq!(report.messages.len(), 1);
    }

    #[tokio::test]
    async fn test_count_defaults_to_completed_donations() {
        let (service, donations) = setup_test().await;

        let donor_id = service.register_donor(register("count@example.com")).await.unwrap();
        donations
            .record_donation(&NewDonation {
                donor_id,
                campaign_id: 1,
                amount: 5.0,
                status: DonationStatus::Pending,
            })
            .await
            .unwrap();

        assert_eq!(service.count_donors_with_donations(None).await.unwrap(), 0);
        assert_eq!(
            service
                .count_donors_with_donations(Some(vec!["charitable-pending".to_string()]))
                .await
                .unwrap(),
            1
        );
        assert_eq!(service.count_donors_with_donations(Some(Vec::new())).await.unwrap(), 1);
    }
}
