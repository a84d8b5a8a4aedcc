use crate::backend::domain::fields::DonationField;
use shared::FieldSummary;

pub struct FieldMapper;

impl FieldMapper {
    pub fn to_summary(field: &DonationField) -> FieldSummary {
        FieldSummary {
            key: field.key().to_string(),
            label: field.label().to_string(),
            admin_label: field.admin_label().to_string(),
            data_type: field.data_type().as_str().to_string(),
            in_donation_form: field.donation_form().is_some(),
            in_admin_form: field.admin_form().is_some(),
            show_in_meta: field.show_in_meta(),
            show_in_export: field.show_in_export(),
            email_tag: field.email_tag().map(|tag| tag.tag.clone()),
        }
    }
}
