//! Target store writer: one row insert per validated import record.

use async_trait::async_trait;
use crm_core::error::WriteError;
use crm_core::import::{EntityKind, ImportContext, RecordFields, RecordWriter};
use sqlx::PgPool;

use crate::models::company::CreateCompany;
use crate::models::employee::CreateEmployee;
use crate::models::lead::CreateLead;
use crate::models::project::CreateProject;
use crate::repositories::{CompanyRepo, EmployeeRepo, LeadRepo, ProjectRepo};

/// Inserts validated records into the table backing one entity.
#[derive(Debug, Clone)]
pub struct EntityWriter {
    pool: PgPool,
    entity: EntityKind,
}

impl EntityWriter {
    pub fn new(pool: PgPool, entity: EntityKind) -> Self {
        Self { pool, entity }
    }

    pub fn entity(&self) -> EntityKind {
        self.entity
    }
}

#[async_trait]
impl RecordWriter for EntityWriter {
    async fn write(&self, ctx: &ImportContext, fields: &RecordFields) -> Result<(), WriteError> {
        let created_by = ctx.imported_by.clone();
        let inserted = match self.entity {
            EntityKind::Company => {
                let input = company_from_fields(fields, created_by)?;
                CompanyRepo::create(&self.pool, &input).await.map(|row| row.id)
            }
            EntityKind::Employee => {
                let input = employee_from_fields(fields, created_by)?;
                EmployeeRepo::create(&self.pool, &input).await.map(|row| row.id)
            }
            EntityKind::Lead => {
                let input = lead_from_fields(fields, created_by)?;
                LeadRepo::create(&self.pool, &input).await.map(|row| row.id)
            }
            EntityKind::Project => {
                let input = project_from_fields(fields, created_by)?;
                ProjectRepo::create(&self.pool, &input).await.map(|row| row.id)
            }
        };

        let id = inserted.map_err(classify_write_error)?;
        tracing::debug!(entity = %self.entity, id, "Imported record");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Record -> DTO
// ---------------------------------------------------------------------------

fn text(fields: &RecordFields, key: &str) -> Option<String> {
    fields.text(key).map(str::to_string)
}

fn required_text(fields: &RecordFields, key: &str) -> Result<String, WriteError> {
    text(fields, key).ok_or_else(|| WriteError::Rejected(format!("missing value for {key}")))
}

fn company_from_fields(
    fields: &RecordFields,
    created_by: Option<String>,
) -> Result<CreateCompany, WriteError> {
    Ok(CreateCompany {
        name: required_text(fields, "name")?,
        industry: text(fields, "industry"),
        email: text(fields, "email"),
        phone: text(fields, "phone"),
        website: text(fields, "website"),
        address: text(fields, "address"),
        city: text(fields, "city"),
        state: text(fields, "state"),
        country: text(fields, "country"),
        status: text(fields, "status"),
        created_by,
    })
}

fn employee_from_fields(
    fields: &RecordFields,
    created_by: Option<String>,
) -> Result<CreateEmployee, WriteError> {
    Ok(CreateEmployee {
        name: required_text(fields, "name")?,
        email: required_text(fields, "email")?,
        phone: text(fields, "phone"),
        department: text(fields, "department"),
        designation: text(fields, "designation"),
        joining_date: fields.date("joining_date"),
        salary: fields.number("salary"),
        status: text(fields, "status"),
        created_by,
    })
}

fn lead_from_fields(
    fields: &RecordFields,
    created_by: Option<String>,
) -> Result<CreateLead, WriteError> {
    Ok(CreateLead {
        name: required_text(fields, "name")?,
        company: text(fields, "company"),
        email: text(fields, "email"),
        phone: text(fields, "phone"),
        source: text(fields, "source"),
        status: text(fields, "status"),
        value: fields.number("value"),
        follow_up_date: fields.date("follow_up_date"),
        created_by,
    })
}

fn project_from_fields(
    fields: &RecordFields,
    created_by: Option<String>,
) -> Result<CreateProject, WriteError> {
    Ok(CreateProject {
        name: required_text(fields, "name")?,
        client_name: text(fields, "client_name"),
        start_date: fields.date("start_date"),
        end_date: fields.date("end_date"),
        budget: fields.number("budget"),
        status: text(fields, "status"),
        progress: fields.number("progress"),
        description: text(fields, "description"),
        created_by,
    })
}

// ---------------------------------------------------------------------------
// Error classification
// ---------------------------------------------------------------------------

/// Classify a sqlx error from a single insert.
///
/// - Integrity (`23xxx`) and data (`22xxx`) violations reject the row only.
/// - Connection (`08xxx`) and shutdown (`57P0x`) states, pool exhaustion,
///   closed pools and transport failures mean the store is unavailable.
/// - Anything else rejects the row with the database message.
pub fn classify_write_error(err: sqlx::Error) -> WriteError {
    match &err {
        sqlx::Error::Database(db_err) => {
            let code = db_err.code().unwrap_or_default();
            let constraint = db_err.constraint().unwrap_or("unknown");
            match code.as_ref() {
                "23505" => WriteError::Rejected(format!("duplicate key ({constraint})")),
                "23503" => WriteError::Rejected(format!("foreign key violation ({constraint})")),
                "23502" => WriteError::Rejected(format!(
                    "missing required value ({})",
                    db_err.message()
                )),
                "23514" => WriteError::Rejected(format!("check constraint failed ({constraint})")),
                c if c.starts_with("22") => {
                    WriteError::Rejected(format!("invalid value: {}", db_err.message()))
                }
                c if c.starts_with("08") || c.starts_with("57P") => {
                    WriteError::Unavailable(db_err.message().to_string())
                }
                _ => WriteError::Rejected(db_err.message().to_string()),
            }
        }
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::WorkerCrashed => WriteError::Unavailable(err.to_string()),
        other => WriteError::Rejected(other.to_string()),
    }
}
