//! Lead entity model and DTOs.

use chrono::NaiveDate;
use crm_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `leads` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Lead {
    pub id: DbId,
    pub name: String,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub source: Option<String>,
    pub status: String,
    pub value: Option<f64>,
    pub follow_up_date: Option<NaiveDate>,
    pub created_by: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new lead.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateLead {
    pub name: String,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub source: Option<String>,
    /// Defaults to `New` if omitted.
    pub status: Option<String>,
    pub value: Option<f64>,
    pub follow_up_date: Option<NaiveDate>,
    pub created_by: Option<String>,
}
