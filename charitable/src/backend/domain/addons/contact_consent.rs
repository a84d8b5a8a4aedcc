use anyhow::Result;
use serde_json::json;
use tracing::info;

use super::{Addon, AddonContext};
use crate::backend::config::Settings;
use crate::backend::domain::fields::DonationField;

/// Adds an opt-in checkbox asking donors whether they may be contacted
pub struct ContactConsentAddon;

impl ContactConsentAddon {
    pub const SLUG: &'static str = "contact-consent";
    pub const FIELD_KEY: &'static str = "contact_consent";

    fn label(settings: &Settings) -> String {
        settings
            .get_option(&["contact_consent_label"])
            .and_then(|v| v.as_str())
            .unwrap_or("Yes, I am happy for you to contact me via email.")
            .to_string()
    }
}

impl Addon for ContactConsentAddon {
    fn slug(&self) -> &str {
        Self::SLUG
    }

    fn activate(&self, _ctx: &mut AddonContext<'_>) -> Result<()> {
        info!("Contact consent collection enabled");
        Ok(())
    }

    fn load(&self, ctx: &mut AddonContext<'_>) -> Result<()> {
        let field = DonationField::new(
            Self::FIELD_KEY,
            json!({
                "label": Self::label(ctx.settings),
                "admin_label": "Contact Consent",
                "data_type": "user",
                "donation_form": {
                    "type": "checkbox",
                    "show_after": "email",
                    "default": false,
                },
                "email_tag": false,
            }),
        )?;
        ctx.fields.register(field)?;
        Ok(())
    }
}
