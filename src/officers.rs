// 👥 Officer views
// Grouping of a company's officer records by display name, and summaries of
// one officer's appointments across companies.

use crate::registry::{Appointment, CompanyOfficer};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleStatus {
    pub role: String,
    /// True while the appointment has no resignation date
    pub active: bool,
}

impl RoleStatus {
    /// Role code for display, underscores as spaces.
    pub fn label(&self) -> String {
        self.role.replace('_', " ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OfficerGroup {
    pub name: String,
    /// Parsed from the appointments link; None when the link is unusable
    pub officer_id: Option<String>,
    pub roles: Vec<RoleStatus>,
}

/// Officer id from "/officers/{id}/appointments".
pub fn officer_id_from_link(link: &str) -> Option<String> {
    link.split('/')
        .nth(2)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

/// Group officer records by name, in first-seen order.
///
/// The officer id comes from the first record seen for a name.
pub fn group_officers(officers: &[CompanyOfficer]) -> Vec<OfficerGroup> {
    let mut groups: Vec<OfficerGroup> = Vec::new();

    for officer in officers {
        let role = RoleStatus {
            role: officer.officer_role.clone(),
            active: officer.resigned_on.is_none(),
        };

        match groups.iter_mut().find(|g| g.name == officer.name) {
            Some(group) => group.roles.push(role),
            None => groups.push(OfficerGroup {
                name: officer.name.clone(),
                officer_id: officer_id_from_link(&officer.links.officer.appointments),
                roles: vec![role],
            }),
        }
    }

    groups
}

// ============================================================================
// APPOINTMENTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppointmentSummary {
    pub company_number: String,
    pub company_name: String,
}

/// Heading for an officer page: first appointment's officer name, else "Officer #{id}".
pub fn officer_title(officer_id: &str, appointments: &[Appointment]) -> String {
    appointments
        .first()
        .and_then(|a| a.officer_name.clone())
        .unwrap_or_else(|| format!("Officer #{officer_id}"))
}

/// Company number and display name per appointment.
///
/// The number falls back to the "/company/{number}" link; entries with
/// neither are dropped. The name falls back to "#{number}".
pub fn summarize_appointments(appointments: &[Appointment]) -> Vec<AppointmentSummary> {
    appointments
        .iter()
        .filter_map(|a| {
            let company_number = a
                .company_number
                .clone()
                .filter(|n| !n.is_empty())
                .or_else(|| {
                    a.links
                        .as_ref()
                        .and_then(|l| l.company.as_deref())
                        .and_then(|link| link.split('/').nth(2))
                        .filter(|n| !n.is_empty())
                        .map(str::to_string)
                })?;

            let company_name = a
                .company_name
                .clone()
                .unwrap_or_else(|| format!("#{company_number}"));

            Some(AppointmentSummary {
                company_number,
                company_name,
            })
        })
        .collect()
}
