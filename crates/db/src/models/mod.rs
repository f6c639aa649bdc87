//! Row structs and create DTOs for the import target tables.
//!
//! Each submodule contains a `FromRow` + `Serialize` struct matching the
//! database row and a `Deserialize` create DTO for inserts.

pub mod company;
pub mod employee;
pub mod lead;
pub mod project;
