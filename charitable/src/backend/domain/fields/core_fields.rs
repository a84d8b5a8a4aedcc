//! Fields built into the plugin. Donor name and email live on the donor
//! record, so they use the `user` data type.

use serde_json::json;

use super::{DonationField, FieldError, FieldRegistry};

pub fn register_core_fields(registry: &mut FieldRegistry) -> Result<(), FieldError> {
    let fields = [
        (
            "first_name",
            json!({
                "label": "First name",
                "data_type": "user",
                "donation_form": { "type": "text", "required": true, "priority": 4 },
                "email_tag": { "tag": "donor_first_name", "preview": "John" },
            }),
        ),
        (
            "last_name",
            json!({
                "label": "Last name",
                "data_type": "user",
                "donation_form": { "type": "text", "required": true, "priority": 6 },
                "email_tag": { "tag": "donor_last_name", "preview": "Deere" },
            }),
        ),
        (
            "email",
            json!({
                "label": "Email",
                "data_type": "user",
                "donation_form": { "type": "email", "required": true, "priority": 8 },
                "email_tag": { "tag": "donor_email", "preview": "john@example.com" },
            }),
        ),
    ];

    for (key, args) in fields {
        registry.register(DonationField::new(key, args)?)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::fields::DataType;

    #[test]
    fn test_core_fields_registered_in_order() {
        let mut registry = FieldRegistry::new();
        register_core_fields(&mut registry).unwrap();

        let keys: Vec<&str> = registry.donation_form_fields().iter().map(|f| f.key()).collect();
        assert_eq!(keys, vec!["first_name", "last_name", "email"]);

        let email = registry.get("email").unwrap();
        assert_eq!(email.data_type(), DataType::User);
        assert_eq!(email.donation_form().unwrap().field_type, "email");
        assert!(email.donation_form().unwrap().required);
    }

    #[test]
    fn test_core_fields_register_once() {
        let mut registry = FieldRegistry::new();
        register_core_fields(&mut registry).unwrap();
        assert!(register_core_fields(&mut registry).is_err());
    }
}
