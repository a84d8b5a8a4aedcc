//! Domain-level command and result types.
//! These are used by services inside the domain layer and are not exposed
//! over the public API. The REST layer maps the DTOs in the `shared` crate
//! to and from these types.

pub mod donors {
    /// Input for registering a new donor.
    #[derive(Debug, Clone, Default)]
    pub struct RegisterDonorCommand {
        pub email: String,
        pub first_name: Option<String>,
        pub last_name: Option<String>,
        pub user_id: Option<i64>,
        pub contact_consent: Option<bool>,
    }
}

pub mod privacy {
    /// One exported personal data item.
    #[derive(Debug, Clone, PartialEq)]
    pub struct ExportItem {
        pub group_id: String,
        pub group_label: String,
        pub item_id: String,
        pub data: Vec<(String, String)>,
    }

    /// Result of a personal data export.
    #[derive(Debug, Clone, PartialEq)]
    pub struct PersonalDataExport {
        pub items: Vec<ExportItem>,
    }

    /// Result of a personal data erasure.
    #[derive(Debug, Clone, PartialEq)]
    pub struct ErasureReport {
        pub items_removed: bool,
        pub items_retained: bool,
        pub messages: Vec<String>,
    }
}
