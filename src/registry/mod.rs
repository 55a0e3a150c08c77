// Registry API access: typed records + authenticated client

pub mod client;
pub mod models;

pub use client::{RegistryClient, DEFAULT_API_BASE};
pub use models::{
    value_text, Appointment, AppointmentLinks, CompanyOfficer, CompanyProfile, DocumentLinks,
    DocumentMetadata, Filing, FilingLinks, FilingLinksRecord, ItemList, OfficerAppointmentsLink,
    OfficerLinks,
};
