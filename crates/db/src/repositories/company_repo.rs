//! Repository for the `companies` table.

use crm_core::types::DbId;
use sqlx::PgPool;

use crate::models::company::{Company, CreateCompany};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, industry, email, phone, website, address, city, state, \
                       country, status, created_by, created_at, updated_at";

/// Provides CRUD operations for companies.
pub struct CompanyRepo;

impl CompanyRepo {
    /// Insert a new company, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateCompany) -> Result<Company, sqlx::Error> {
        let query = format!(
            "INSERT INTO companies
                (name, industry, email, phone, website, address, city, state, country,
                 status, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, COALESCE($10, 'Active'), $11)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Company>(&query)
            .bind(&input.name)
            .bind(&input.industry)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.website)
            .bind(&input.address)
            .bind(&input.city)
            .bind(&input.state)
            .bind(&input.country)
            .bind(&input.status)
            .bind(&input.created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Company>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM companies WHERE id = $1");
        sqlx::query_as::<_, Company>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all companies, most recently created first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Company>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM companies ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Company>(&query).fetch_all(pool).await
    }
}
