pub mod donation_repository;
pub mod donor_repository;

pub use donation_repository::DonationRepository;
pub use donor_repository::DonorRepository;

/// Comma separated `?` placeholders for an `IN ( ... )` clause
pub(crate) fn query_placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}
