//! Repository for the `projects` table.

use crm_core::types::DbId;
use sqlx::PgPool;

use crate::models::project::{CreateProject, Project};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, client_name, start_date, end_date, budget, status, progress, \
                       description, created_by, created_at, updated_at";

/// Provides CRUD operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project, returning the created row.
    ///
    /// If `status` is `None` in the input, defaults to `Planning`; a missing
    /// `progress` defaults to 0.
    pub async fn create(pool: &PgPool, input: &CreateProject) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects
                (name, client_name, start_date, end_date, budget, status, progress,
                 description, created_by)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, 'Planning'), COALESCE($7, 0), $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(&input.name)
            .bind(&input.client_name)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.budget)
            .bind(&input.status)
            .bind(input.progress)
            .bind(&input.description)
            .bind(&input.created_by)
            .fetch_one(pool)
            .await
    }

    /// Find a project by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all projects ordered by most recently created first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Project>(&query).fetch_all(pool).await
    }
}
