//! Repository for the `leads` table.

use crm_core::types::DbId;
use sqlx::PgPool;

use crate::models::lead::{CreateLead, Lead};

const COLUMNS: &str = "id, name, company, email, phone, source, status, value, follow_up_date, \
                       created_by, created_at, updated_at";

pub struct LeadRepo;

impl LeadRepo {
    /// Insert a new lead, returning the created row. Status defaults to `New`.
    pub async fn create(pool: &PgPool, input: &CreateLead) -> Result<Lead, sqlx::Error> {
        let query = format!(
            "INSERT INTO leads
                (name, company, email, phone, source, status, value, follow_up_date, created_by)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, 'New'), $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Lead>(&query)
            .bind(&input.name)
            .bind(&input.company)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.source)
            .bind(&input.status)
            .bind(input.value)
            .bind(input.follow_up_date)
            .bind(&input.created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Lead>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM leads WHERE id = $1");
        sqlx::query_as::<_, Lead>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Lead>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM leads ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Lead>(&query).fetch_all(pool).await
    }
}
