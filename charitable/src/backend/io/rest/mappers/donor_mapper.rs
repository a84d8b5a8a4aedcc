use crate::backend::domain::commands::donors::RegisterDonorCommand;
use crate::backend::domain::commands::privacy::{ErasureReport, PersonalDataExport};
use crate::backend::domain::models::{format_datetime, Donor as DomainDonor};
use shared::{
    CreateDonorRequest, CreateDonorResponse, Donor as SharedDonor, PersonalDataErasureResponse,
    PersonalDataExportResponse, PersonalDataItem, PersonalDataPair,
};

/// Mapper between the donor DTOs in `shared` and the domain types.
pub struct DonorMapper;

impl DonorMapper {
    pub fn to_dto(domain: DomainDonor) -> SharedDonor {
        SharedDonor {
            donor_id: domain.donor_id,
            user_id: domain.user_id,
            email: domain.email,
            first_name: domain.first_name,
            last_name: domain.last_name,
            date_joined: format_datetime(&domain.date_joined),
            data_erased: domain.data_erased.as_ref().map(format_datetime),
            contact_consent: domain.contact_consent,
        }
    }

    pub fn to_register_command(dto: CreateDonorRequest) -> RegisterDonorCommand {
        RegisterDonorCommand {
            email: dto.email,
            first_name: dto.first_name,
            last_name: dto.last_name,
            user_id: dto.user_id,
            contact_consent: dto.contact_consent,
        }
    }

    pub fn to_create_response(donor_id: i64) -> CreateDonorResponse {
        CreateDonorResponse {
            donor_id,
            success_message: "Donor registered successfully".to_string(),
        }
    }

    /// Exports are produced in a single batch, so they are always done
    pub fn to_export_response(export: PersonalDataExport) -> PersonalDataExportResponse {
        PersonalDataExportResponse {
            data: export
                .items
                .into_iter()
                .map(|item| PersonalDataItem {
                    group_id: item.group_id,
                    group_label: item.group_label,
                    item_id: item.item_id,
                    data: item
                        .data
                        .into_iter()
                        .map(|(name, value)| PersonalDataPair { name, value })
                        .collect(),
                })
                .collect(),
            done: true,
        }
    }

    pub fn to_erasure_response(report: ErasureReport) -> PersonalDataErasureResponse {
        PersonalDataErasureResponse {
            items_removed: report.items_removed,
            items_retained: report.items_retained,
            messages: report.messages,
            done: true,
        }
    }
}
