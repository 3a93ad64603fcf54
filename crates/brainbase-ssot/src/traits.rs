//! Repository trait for dependency injection and testing

use async_trait::async_trait;

use crate::error::DatabaseResult;
use crate::models::{ContactPayload, MemberDirectory, MemberImportSummary, MemberStatistics};

/// Every write the SSOT importers perform
#[async_trait]
pub trait SsotRepository: Send + Sync {
    /// Upsert people, users and user organizations in one transaction
    async fn import_members(&self, directory: &MemberDirectory)
    -> DatabaseResult<MemberImportSummary>;

    /// Account counts after an import
    async fn member_statistics(&self) -> DatabaseResult<MemberStatistics>;

    /// Insert a contact entity
    ///
    /// Returns `false` when a row with the same id already exists
    async fn insert_contact(&self, id: &str, payload: &ContactPayload) -> DatabaseResult<bool>;
}
