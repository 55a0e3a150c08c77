// Typed registry records
// Only the fields the dashboard reads are modelled; unknown fields are ignored.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

// ============================================================================
// LIST ENVELOPE
// ============================================================================

/// Paged list as returned by the registry (`{"items": [...]}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemList<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

impl<T> Default for ItemList<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

// ============================================================================
// COMPANY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub company_name: String,
    pub company_number: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_creation: Option<NaiveDate>,
}

// ============================================================================
// FILING
// ============================================================================

/// One event in a company's filing history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filing {
    pub transaction_id: String,

    /// Filing type code, e.g. "PSC01"
    #[serde(rename = "type")]
    pub filing_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Template values for `description`; mostly strings, but capital
    /// statements carry arrays of `{currency, figure}` objects
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_values: Option<BTreeMap<String, Value>>,

    pub date: NaiveDate,

    #[serde(default)]
    pub links: FilingLinks,
}

impl Filing {
    /// `description_values` as display pairs, keys with spaces for underscores.
    pub fn details(&self) -> Vec<(String, String)> {
        self.description_values
            .iter()
            .flatten()
            .map(|(key, value)| (key.replace('_', " "), value_text(value)))
            .collect()
    }
}

/// Compact text for a loosely typed JSON value.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        Value::Array(items) => items.iter().map(value_text).collect::<Vec<_>>().join(", "),
        Value::Object(map) => {
            let sorted: BTreeMap<_, _> = map.iter().collect();
            sorted
                .values()
                .map(|v| value_text(v))
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        }
    }
}

/// Only the links of a filing record; enough to find its document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FilingLinksRecord {
    #[serde(default)]
    pub links: FilingLinks,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilingLinks {
    /// Path or absolute URL of the document metadata resource
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_metadata: Option<String>,

    #[serde(default, rename = "self", skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
}

// ============================================================================
// DOCUMENT METADATA
// ============================================================================

/// Resolved metadata object; `links.document` is where the binary lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,

    #[serde(default)]
    pub links: DocumentLinks,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
}

// ============================================================================
// OFFICERS
// ============================================================================

/// Entry of `/company/{number}/officers`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyOfficer {
    pub name: String,
    pub officer_role: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointed_on: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resigned_on: Option<NaiveDate>,

    #[serde(default)]
    pub links: OfficerLinks,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OfficerLinks {
    #[serde(default, rename = "self", skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,

    #[serde(default)]
    pub officer: OfficerAppointmentsLink,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OfficerAppointmentsLink {
    /// "/officers/{id}/appointments"
    #[serde(default)]
    pub appointments: String,
}

/// Entry of `/officers/{id}/appointments`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub officer_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<AppointmentLinks>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppointmentLinks {
    /// e.g. "/company/05788582"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,

    #[serde(default, rename = "self", skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
}
