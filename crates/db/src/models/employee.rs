//! Employee entity model and DTOs.

use chrono::NaiveDate;
use crm_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `employees` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Employee {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub designation: Option<String>,
    pub joining_date: Option<NaiveDate>,
    pub salary: Option<f64>,
    pub status: String,
    pub created_by: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new employee.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateEmployee {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub designation: Option<String>,
    pub joining_date: Option<NaiveDate>,
    pub salary: Option<f64>,
    /// Defaults to `Active` if omitted.
    pub status: Option<String>,
    pub created_by: Option<String>,
}
