//! Pure logic for the CRM tabular import pipeline.
//!
//! Nothing in this crate touches the database or the network. The
//! [`import`] module decodes uploaded spreadsheets, validates rows against
//! per-entity field contracts, summarises the result for preview and
//! drives the row-by-row commit through an injected writer.

pub mod error;
pub mod import;
pub mod types;
