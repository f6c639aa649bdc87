//! Project entity model and DTOs.

use chrono::NaiveDate;
use crm_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub name: String,
    /// Company name as typed; not a foreign key.
    pub client_name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub budget: Option<f64>,
    pub status: String,
    pub progress: f64,
    pub description: Option<String>,
    pub created_by: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new project.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateProject {
    pub name: String,
    pub client_name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub budget: Option<f64>,
    /// Defaults to `Planning` if omitted.
    pub status: Option<String>,
    /// Defaults to 0 if omitted.
    pub progress: Option<f64>,
    pub description: Option<String>,
    pub created_by: Option<String>,
}
