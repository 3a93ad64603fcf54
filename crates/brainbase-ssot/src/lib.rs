//! Brainbase SSOT data layer for `PostgreSQL`
//!
//! Member directory and business card imports, written through the
//! [`SsotRepository`] trait so the importers can run against an in-memory mock.

pub mod contacts;
pub mod error;
pub mod members;
pub mod models;
pub mod repository;
pub mod traits;

pub mod mock;
pub use mock::MockSsotRepository;

pub use brainbase_config::DatabaseConfig;
pub use contacts::{
    discover_contact_files, generate_contact_id, import_contacts, load_contacts, parse_contacts,
    preview_contacts,
};
pub use error::{
    DatabaseError, DatabaseErrorExt, DatabaseOperation, DatabaseResult, ImportError, ImportResult,
};
pub use members::{MemberImportReport, import_members_file, load_members};
pub use models::*;
pub use repository::DbSsotRepository;
pub use traits::SsotRepository;
