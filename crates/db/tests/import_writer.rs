//! Integration tests for the import writer and repositories.
//!
//! Runs against a real database:
//! - One insert per valid record, `created_by` carried through
//! - Unique constraint violations reported per row
//! - Check constraint violations reported per row
//! - Closed pool stops the commit

use assert_matches::assert_matches;
use chrono::NaiveDate;
use crm_core::error::WriteError;
use crm_core::import::{
    commit, validate_file, EntityKind, ImportContext, ImportResult, RecordWriter, UploadedFile,
};
use crm_db::models::company::CreateCompany;
use crm_db::repositories::{CompanyRepo, EmployeeRepo, LeadRepo, ProjectRepo};
use crm_db::EntityWriter;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn csv(body: &str) -> UploadedFile {
    UploadedFile::new("upload.csv", body.as_bytes().to_vec())
}

async fn import(pool: &PgPool, entity: EntityKind, body: &str) -> ImportResult {
    let records = validate_file(&csv(body), entity.field_specs()).unwrap();
    let writer = EntityWriter::new(pool.clone(), entity);
    commit(&records, &writer, &ImportContext::imported_by("tester")).await
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_health_check(pool: PgPool) {
    crm_db::health_check(&pool).await.unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unique_constraints_named_uq(pool: PgPool) {
    let names: Vec<(String,)> = sqlx::query_as(
        "SELECT constraint_name::text
         FROM information_schema.table_constraints
         WHERE constraint_type = 'UNIQUE' AND table_schema = 'public'
         ORDER BY constraint_name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();
    let names: Vec<_> = names.into_iter().map(|(n,)| n).collect();
    assert_eq!(
        names,
        vec!["uq_companies_name", "uq_employees_email", "uq_leads_email", "uq_projects_name"]
    );
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_company_import_writes_rows(pool: PgPool) {
    let result = import(
        &pool,
        EntityKind::Company,
        "Company Name,City,Status\nAcme,Pune,active\n,Mumbai,\nGlobex,Delhi,\n",
    )
    .await;

    assert_eq!(result.imported_count, 2);
    assert_eq!(result.failed_count, 0);

    let companies = CompanyRepo::list(&pool).await.unwrap();
    assert_eq!(companies.len(), 2);
    let acme = companies.iter().find(|c| c.name == "Acme").unwrap();
    assert_eq!(acme.status, "Active");
    assert_eq!(acme.city.as_deref(), Some("Pune"));
    assert_eq!(acme.created_by.as_deref(), Some("tester"));

    let globex = companies.iter().find(|c| c.name == "Globex").unwrap();
    assert_eq!(globex.status, "Active");

    let found = CompanyRepo::find_by_id(&pool, acme.id).await.unwrap();
    assert_eq!(found.map(|c| c.name), Some("Acme".to_string()));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_email_fails_only_its_row(pool: PgPool) {
    let body = "Employee Name,Email,Joining Date,Salary\n\
                Asha,asha@example.com,2023-06-01,85000\n\
                Ravi,ravi@example.com,01/07/2023,70000\n\
                Asha Again,asha@example.com,2023-08-01,90000\n\
                Meera,meera@example.com,,\n\
                Dev,dev@example.com,15-Sep-2023,\"1,20,000\"\n";
    let result = import(&pool, EntityKind::Employee, body).await;

    assert_eq!(result.imported_count, 4);
    assert_eq!(result.failed_count, 1);
    assert_eq!(result.failure_details[0].row_number, 3);
    assert_eq!(result.failure_details[0].reason, "duplicate key (uq_employees_email)");
    assert!(!result.interrupted);

    let employees = EmployeeRepo::list(&pool).await.unwrap();
    assert_eq!(employees.len(), 4);
    let ravi = employees.iter().find(|e| e.name == "Ravi").unwrap();
    assert_eq!(ravi.joining_date, NaiveDate::from_ymd_opt(2023, 7, 1));
    let dev = employees.iter().find(|e| e.name == "Dev").unwrap();
    assert_eq!(dev.salary, Some(120000.0));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_check_constraint_rejects_row(pool: PgPool) {
    let body = "Project Name,Start Date,End Date,Progress\n\
                Apollo,2024-01-01,2024-06-30,40\n\
                Backwards,2024-06-30,2024-01-01,10\n\
                Overdone,2024-01-01,,150\n";
    let result = import(&pool, EntityKind::Project, body).await;

    assert_eq!(result.imported_count, 1);
    assert_eq!(result.failed_count, 2);
    assert_eq!(result.failure_details[0].row_number, 2);
    assert_eq!(
        result.failure_details[0].reason,
        "check constraint failed (ck_projects_dates)"
    );
    assert_eq!(result.failure_details[1].row_number, 3);
    assert_eq!(
        result.failure_details[1].reason,
        "check constraint failed (ck_projects_progress)"
    );

    let projects = ProjectRepo::list(&pool).await.unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].status, "Planning");
    assert_eq!(projects[0].progress, 40.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_leads_without_email_do_not_collide(pool: PgPool) {
    let body = "Lead Name,Source,Deal Value\nA,website,100\nB,Referral,\nC,,5000\n";
    let result = import(&pool, EntityKind::Lead, body).await;
    assert_eq!(result.imported_count, 3);

    let leads = LeadRepo::list(&pool).await.unwrap();
    assert!(leads.iter().all(|l| l.status == "New"));
    let a = leads.iter().find(|l| l.name == "A").unwrap();
    assert_eq!(a.source.as_deref(), Some("Website"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_repo_create_duplicate_is_unique_violation(pool: PgPool) {
    let input = CreateCompany {
        name: "Initech".to_string(),
        ..Default::default()
    };
    CompanyRepo::create(&pool, &input).await.unwrap();
    let err = CompanyRepo::create(&pool, &input).await.unwrap_err();
    let db_err = err.as_database_error().unwrap();
    assert_eq!(db_err.code().as_deref(), Some("23505"));
    assert_eq!(db_err.constraint(), Some("uq_companies_name"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_closed_pool_is_unavailable(pool: PgPool) {
    let records = validate_file(
        &csv("Company Name\nAcme\nGlobex\nInitech\n"),
        EntityKind::Company.field_specs(),
    )
    .unwrap();
    let writer = EntityWriter::new(pool.clone(), EntityKind::Company);
    pool.close().await;

    let first = writer
        .write(&ImportContext::default(), &records[0].fields)
        .await;
    assert_matches!(first, Err(WriteError::Unavailable(_)));

    let result = commit(&records, &writer, &ImportContext::default()).await;
    assert_eq!(result.imported_count, 0);
    assert_eq!(result.failed_count, 1);
    assert!(result.interrupted);
    assert_eq!(result.not_attempted, 2);
}
