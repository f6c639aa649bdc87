//! Field contracts for each importable entity.
//!
//! Target keys match the column names of the corresponding tables, so a
//! validated record maps onto an insert without a second translation table.

use std::str::FromStr;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use super::field_spec::FieldSpec;
use crate::error::CoreError;

/// Entities that can be bulk-imported from a spreadsheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    #[serde(rename = "companies")]
    Company,
    #[serde(rename = "employees")]
    Employee,
    #[serde(rename = "leads")]
    Lead,
    #[serde(rename = "projects")]
    Project,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Company => "companies",
            Self::Employee => "employees",
            Self::Lead => "leads",
            Self::Project => "projects",
        }
    }

    pub const ALL: &'static [&'static str] = &["companies", "employees", "leads", "projects"];

    pub fn field_specs(&self) -> &'static [FieldSpec] {
        match self {
            Self::Company => &COMPANY_FIELDS,
            Self::Employee => &EMPLOYEE_FIELDS,
            Self::Lead => &LEAD_FIELDS,
            Self::Project => &PROJECT_FIELDS,
        }
    }
}

/// Parses the path segment form (`companies`, `employees`, `leads`,
/// `projects`).
impl FromStr for EntityKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "companies" => Ok(Self::Company),
            "employees" => Ok(Self::Employee),
            "leads" => Ok(Self::Lead),
            "projects" => Ok(Self::Project),
            other => Err(CoreError::Validation(format!(
                "Unknown import entity '{other}'. Expected one of: {}",
                Self::ALL.join(", ")
            ))),
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Enum values
// ---------------------------------------------------------------------------

pub const COMPANY_STATUSES: &[&str] = &["Active", "Inactive", "Prospect"];

pub const EMPLOYEE_STATUSES: &[&str] = &["Active", "On Leave", "Inactive"];

pub const LEAD_SOURCES: &[&str] = &[
    "Website",
    "Referral",
    "Social Media",
    "Cold Call",
    "Email Campaign",
    "Event",
    "Other",
];

pub const LEAD_STATUSES: &[&str] = &[
    "New",
    "Contacted",
    "Qualified",
    "Proposal",
    "Negotiation",
    "Won",
    "Lost",
];

pub const PROJECT_STATUSES: &[&str] = &[
    "Planning",
    "In Progress",
    "On Hold",
    "Completed",
    "Cancelled",
];

// ---------------------------------------------------------------------------
// Contracts
// ---------------------------------------------------------------------------

static COMPANY_FIELDS: LazyLock<Vec<FieldSpec>> = LazyLock::new(|| {
    vec![
        FieldSpec::string("name", "Company Name")
            .aliases(&["Company Name", "company", "Company"])
            .required(),
        FieldSpec::string("industry", "Industry").aliases(&["Sector"]),
        FieldSpec::string("email", "Email").aliases(&["Email Address", "E-mail"]),
        FieldSpec::string("phone", "Phone").aliases(&["Phone Number", "Contact Number"]),
        FieldSpec::string("website", "Website").aliases(&["Web Site", "URL"]),
        FieldSpec::string("address", "Address"),
        FieldSpec::string("city", "City"),
        FieldSpec::string("state", "State"),
        FieldSpec::string("country", "Country"),
        FieldSpec::enumeration("status", "Status", COMPANY_STATUSES),
    ]
});

static EMPLOYEE_FIELDS: LazyLock<Vec<FieldSpec>> = LazyLock::new(|| {
    vec![
        FieldSpec::string("name", "Employee Name")
            .aliases(&["Employee Name", "Full Name"])
            .required(),
        FieldSpec::string("email", "Email")
            .aliases(&["Email Address", "E-mail"])
            .required(),
        FieldSpec::string("phone", "Phone").aliases(&["Phone Number", "Mobile"]),
        FieldSpec::string("department", "Department").aliases(&["Dept"]),
        FieldSpec::string("designation", "Designation").aliases(&["Job Title", "Position"]),
        FieldSpec::date("joining_date", "Joining Date").aliases(&["Joining Date", "Date of Joining"]),
        FieldSpec::number("salary", "Salary").aliases(&["CTC"]),
        FieldSpec::enumeration("status", "Status", EMPLOYEE_STATUSES),
    ]
});

static LEAD_FIELDS: LazyLock<Vec<FieldSpec>> = LazyLock::new(|| {
    vec![
        FieldSpec::string("name", "Lead Name")
            .aliases(&["Lead Name", "Contact Name"])
            .required(),
        FieldSpec::string("company", "Company").aliases(&["Company Name", "Organization"]),
        FieldSpec::string("email", "Email").aliases(&["Email Address", "E-mail"]),
        FieldSpec::string("phone", "Phone").aliases(&["Phone Number", "Mobile"]),
        FieldSpec::enumeration("source", "Source", LEAD_SOURCES).aliases(&["Lead Source"]),
        FieldSpec::enumeration("status", "Status", LEAD_STATUSES).aliases(&["Lead Status"]),
        FieldSpec::number("value", "Deal Value").aliases(&["Deal Value", "Value", "Amount"]),
        FieldSpec::date("follow_up_date", "Follow-up Date")
            .aliases(&["Follow-up Date", "Follow Up Date", "Next Follow Up"]),
    ]
});

static PROJECT_FIELDS: LazyLock<Vec<FieldSpec>> = LazyLock::new(|| {
    vec![
        FieldSpec::string("name", "Project Name")
            .aliases(&["Project Name", "Project"])
            .required(),
        FieldSpec::string("client_name", "Client").aliases(&["Client", "Client Name", "Company"]),
        FieldSpec::date("start_date", "Start Date").aliases(&["Start Date"]),
        FieldSpec::date("end_date", "End Date").aliases(&["End Date", "Deadline"]),
        FieldSpec::number("budget", "Budget"),
        FieldSpec::enumeration("status", "Status", PROJECT_STATUSES),
        FieldSpec::number("progress", "Progress").aliases(&["Progress %", "Completion"]),
        FieldSpec::string("description", "Description").aliases(&["Details", "Notes"]),
    ]
});
