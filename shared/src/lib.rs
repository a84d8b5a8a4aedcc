use serde::{Deserialize, Serialize};

/// Donor record as exposed over the API.
///
/// Timestamps are formatted `YYYY-MM-DD HH:MM:SS`; `data_erased` is `None`
/// until a privacy erasure has run for this donor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donor {
    pub donor_id: i64,
    pub user_id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub date_joined: String,
    pub data_erased: Option<String>,
    /// Unset until the donor has answered the consent question
    pub contact_consent: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateDonorRequest {
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    /// Linked user account, if the donor registered one
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub contact_consent: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateDonorResponse {
    pub donor_id: i64,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonorIdResponse {
    pub donor_id: i64,
}

/// Linked user account of a donor; `0` when the donor has no account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserIdResponse {
    pub user_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonorLookupQuery {
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonorCountQuery {
    /// Comma separated donation statuses
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonorCountResponse {
    pub count: i64,
}

/// Request body shared by the personal data exporter and eraser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalDataRequest {
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalDataPair {
    pub name: String,
    pub value: String,
}

/// One exported item, grouped the way privacy export files group data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalDataItem {
    pub group_id: String,
    pub group_label: String,
    pub item_id: String,
    pub data: Vec<PersonalDataPair>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalDataExportResponse {
    pub data: Vec<PersonalDataItem>,
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalDataErasureResponse {
    pub items_removed: bool,
    pub items_retained: bool,
    pub messages: Vec<String>,
    pub done: bool,
}

/// Summary of a registered donation field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSummary {
    pub key: String,
    pub label: String,
    pub admin_label: String,
    pub data_type: String,
    pub in_donation_form: bool,
    pub in_admin_form: bool,
    pub show_in_meta: bool,
    pub show_in_export: bool,
    pub email_tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldListResponse {
    pub fields: Vec<FieldSummary>,
}
