//! Repository for the `employees` table.

use crm_core::types::DbId;
use sqlx::PgPool;

use crate::models::employee::{CreateEmployee, Employee};

const COLUMNS: &str = "id, name, email, phone, department, designation, joining_date, salary, \
                       status, created_by, created_at, updated_at";

/// Provides CRUD operations for employees.
pub struct EmployeeRepo;

impl EmployeeRepo {
    /// Insert a new employee, returning the created row.
    ///
    /// Fails with a unique violation (`uq_employees_email`) when the email is
    /// already on file.
    pub async fn create(pool: &PgPool, input: &CreateEmployee) -> Result<Employee, sqlx::Error> {
        let query = format!(
            "INSERT INTO employees
                (name, email, phone, department, designation, joining_date, salary,
                 status, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, 'Active'), $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Employee>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.department)
            .bind(&input.designation)
            .bind(input.joining_date)
            .bind(input.salary)
            .bind(&input.status)
            .bind(&input.created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Employee>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM employees WHERE id = $1");
        sqlx::query_as::<_, Employee>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Employee>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM employees ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Employee>(&query).fetch_all(pool).await
    }
}
