//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod company_repo;
pub mod employee_repo;
pub mod lead_repo;
pub mod project_repo;

pub use company_repo::CompanyRepo;
pub use employee_repo::EmployeeRepo;
pub use lead_repo::LeadRepo;
pub use project_repo::ProjectRepo;
