pub mod donor_mapper;
pub mod field_mapper;
