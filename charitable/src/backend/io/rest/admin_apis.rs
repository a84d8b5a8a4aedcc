use axum::{extract::State, response::Html};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::backend::domain::fields::DonationField;
use crate::backend::io::views::{
    render_heading, render_number_setting, render_text_field, AdminFormView, ViewArgs,
};
use crate::backend::AppState;

/// Admin widgets drawn with the text input partial
const TEXT_WIDGETS: [&str; 2] = ["text", "email"];

/// Admin metabox with a text input for every text-like admin form field
pub async fn admin_fields_page(State(state): State<AppState>) -> Html<String> {
    info!("GET /admin/fields");

    let mut html = render_heading(&ViewArgs::from_value(json!({
        "description": "Donor details",
    })));

    for (position, field) in state.fields.admin_form_fields().into_iter().enumerate() {
        match text_field_args(field, position + 1) {
            Some(args) => html.push_str(&render_text_field(&args, Some(&AdminFormView))),
            None => debug!("No admin text input for field '{}'", field.key()),
        }
    }

    Html(html)
}

/// Donation settings with values read from the option store
pub async fn admin_settings_page(State(state): State<AppState>) -> Html<String> {
    info!("GET /admin/settings");

    let mut html = render_heading(&ViewArgs::from_value(json!({
        "description": "Donation amounts",
    })));
    for args in [
        json!({
            "key": ["general", "minimum_donation"],
            "name": "minimum_donation",
            "default": 0,
            "min": 0,
            "help": "The smallest donation accepted on donation forms.",
        }),
        json!({
            "key": ["general", "maximum_donation"],
            "name": "maximum_donation",
            "min": 0,
            "help": "Leave empty to accept donations of any size.",
        }),
    ] {
        html.push_str(&render_number_setting(&ViewArgs::from_value(args), &state.settings));
    }

    Html(html)
}

fn text_field_args(field: &DonationField, tabindex: usize) -> Option<ViewArgs> {
    let form = field.admin_form()?;
    if !TEXT_WIDGETS.contains(&form.field_type.as_str()) {
        return None;
    }

    let key = field.key();
    Some(ViewArgs::from_value(json!({
        "id": format!("charitable-field-{}", key),
        "key": key,
        "value": form.default.clone(),
        "label": field.admin_label(),
        "wrapper_id": format!("charitable-{}-wrap", key),
        "wrapper_class": "charitable-metabox-wrap",
        "tabindex": tabindex,
        "placeholder": form.extra.get("placeholder").cloned().unwrap_or(Value::Null),
        "description": form.extra.get("description").cloned().unwrap_or(Value::Null),
    })))
}
