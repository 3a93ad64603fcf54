//! Airtable to NocoDB migration
//!
//! - [`airtable`]: read-only Airtable client (metadata + records)
//! - [`nocodb`]: NocoDB v1/v2 client with retry
//! - [`schema`]: field type mapping table and column payloads
//! - [`records`]: record conversion and column filtering
//! - [`migrator`]: the base/table/record loop
//! - [`report`]: counters, summary and JSON report
//! - [`maintenance`]: reorder, back-fill, purge and status checks

pub mod airtable;
pub mod error;
pub mod maintenance;
pub mod migrator;
pub mod nocodb;
pub mod records;
pub mod report;
pub mod retry;
pub mod schema;

pub use airtable::AirtableClient;
pub use error::{MigrationError, MigrationResult};
pub use migrator::{Migrator, MigratorOptions, ProjectTarget, plan_base};
pub use nocodb::NocoDbClient;
pub use report::MigrationReport;
pub use retry::RetryPolicy;
