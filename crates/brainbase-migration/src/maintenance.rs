//! Follow-up operations on already migrated NocoDB tables
//!
//! Column reordering, back-filling tables that were created without data,
//! purging a table before a clean re-insert, and record count comparison.
//! Like the migrator, these continue past per-column / per-batch / per-table
//! failures and report counts.

use std::fmt;

use brainbase_config::PacingConfig;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::airtable::AirtableClient;
use crate::error::MigrationResult;
use crate::nocodb::{NocoColumn, NocoDbClient};
use crate::records::ColumnFilter;

/// NocoDB caps v2 list pages at 1000 rows
const PURGE_PAGE_LIMIT: u32 = 1000;

/// Counts from a reorder pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReorderSummary {
    pub updated: usize,
    pub failed: usize,
}

/// Outcome of back-filling one table
#[derive(Debug, Clone, Default, Serialize)]
pub struct InsertMissingSummary {
    pub table: String,
    pub table_id: String,
    pub fetched: usize,
    pub inserted: usize,
    pub failed_batches: usize,
}

/// Outcome of purging one table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PurgeSummary {
    pub table_id: String,
    pub found: usize,
    pub deleted: usize,
    pub failed_batches: usize,
}

/// One table to compare between Airtable and NocoDB
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableTarget {
    pub airtable_base: String,
    pub nocodb_base: String,
    pub table: String,
}

/// Record count comparison result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TableStatus {
    Ok { count: u64 },
    Mismatch { airtable: u64, nocodb: u64 },
    Error { message: String },
}

impl fmt::Display for TableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok { count } => write!(f, "OK ({count})"),
            Self::Mismatch { airtable, nocodb } => {
                write!(f, "MISMATCH (Airtable: {airtable}, NocoDB: {nocodb})")
            }
            Self::Error { message } => write!(f, "ERROR: {message}"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusRow {
    pub airtable_base: String,
    pub nocodb_base: String,
    pub table: String,
    pub status: TableStatus,
}

/// Column order NocoDB should show: primary key, regular columns, system columns
pub fn column_order(columns: &[NocoColumn]) -> Vec<&NocoColumn> {
    let primary = columns.iter().filter(|c| c.pk);
    let regular = columns.iter().filter(|c| !c.pk && !c.system);
    let system = columns.iter().filter(|c| !c.pk && c.system);
    primary.chain(regular).chain(system).collect()
}

/// Move system columns to the end of a table, PATCHing `order` 1..n
///
/// # Errors
/// Returns an error only if the table metadata cannot be read; per-column
/// failures are logged and counted
pub async fn reorder_system_columns(
    nocodb: &NocoDbClient,
    table_id: &str,
) -> MigrationResult<ReorderSummary> {
    let table = nocodb.get_table(table_id).await?;
    let mut summary = ReorderSummary::default();

    for (position, column) in (1_u32..).zip(column_order(&table.columns)) {
        match nocodb
            .update_column(&column.id, &json!({ "order": position }))
            .await
        {
            Ok(_) => {
                debug!("{}: order={position}", column.title);
                summary.updated += 1;
            }
            Err(e) => {
                warn!("Failed to reorder column {}: {e}", column.title);
                summary.failed += 1;
            }
        }
    }

    info!(
        "Reordered {} columns of {} ({} failed)",
        summary.updated, table.title, summary.failed
    );
    Ok(summary)
}

/// Insert Airtable records into an existing NocoDB table (found by title)
///
/// Only keys the table already has are sent, link fields are dropped and
/// floats headed for `bigint` columns are rounded. Failed batches are counted
/// and skipped.
///
/// # Errors
/// Returns an error if the table cannot be found or the Airtable fetch fails
pub async fn insert_missing_records(
    airtable: &AirtableClient,
    nocodb: &NocoDbClient,
    pacing: &PacingConfig,
    target: &TableTarget,
) -> MigrationResult<InsertMissingSummary> {
    let table_id = nocodb
        .find_table_id(&target.nocodb_base, &target.table)
        .await?;
    info!("Table {} -> {table_id}", target.table);

    let table = nocodb.get_table_v2(&table_id).await?;
    let filter = ColumnFilter::from_columns(&table.columns);
    info!("Valid columns: {}", filter.valid_columns.len());
    if !filter.bigint_columns.is_empty() {
        let mut bigint: Vec<&str> = filter.bigint_columns.iter().map(String::as_str).collect();
        bigint.sort_unstable();
        info!("Bigint columns: {}", bigint.join(", "));
    }

    let records = airtable
        .list_records(&target.airtable_base, &target.table)
        .await?;
    info!("Fetched {} records from Airtable", records.len());

    let mut summary = InsertMissingSummary {
        table: target.table.clone(),
        table_id: table_id.clone(),
        fetched: records.len(),
        ..InsertMissingSummary::default()
    };

    let batch_size = pacing.maintenance_batch_size.max(1);
    let batches: Vec<_> = records.chunks(batch_size).collect();
    let batch_count = batches.len();

    for (index, batch) in batches.into_iter().enumerate() {
        let cleaned: Vec<_> = batch.iter().map(|r| filter.apply(&r.fields)).collect();

        match nocodb.insert_table_records(&table_id, &cleaned).await {
            Ok(_) => {
                summary.inserted += batch.len();
                info!(
                    "Inserted {} records ({}/{})",
                    batch.len(),
                    summary.inserted,
                    summary.fetched
                );
            }
            Err(e) => {
                summary.failed_batches += 1;
                let sample = cleaned
                    .first()
                    .map(|r| Value::Object(r.clone()).to_string())
                    .unwrap_or_default();
                warn!(
                    "Batch {} failed: {e}; sample record: {}",
                    index + 1,
                    sample.chars().take(200).collect::<String>()
                );
            }
        }

        if index + 1 < batch_count {
            tokio::time::sleep(pacing.maintenance_batch_delay()).await;
        }
    }

    Ok(summary)
}

/// Back-fill several tables, pausing between them
pub async fn insert_missing_for_tables(
    airtable: &AirtableClient,
    nocodb: &NocoDbClient,
    pacing: &PacingConfig,
    targets: &[TableTarget],
) -> Vec<(TableTarget, MigrationResult<InsertMissingSummary>)> {
    let mut results = Vec::with_capacity(targets.len());
    for (index, target) in targets.iter().enumerate() {
        if index > 0 {
            tokio::time::sleep(pacing.table_delay()).await;
        }
        info!("{}", "=".repeat(60));
        info!("Processing: {} ({})", target.table, target.nocodb_base);
        let result = insert_missing_records(airtable, nocodb, pacing, target).await;
        if let Err(e) = &result {
            warn!("Failed to back-fill {}: {e}", target.table);
        }
        results.push((target.clone(), result));
    }
    results
}

/// Delete every record of a table (up to one page of 1000)
///
/// # Errors
/// Returns an error if the records cannot be listed; failed delete batches
/// are counted
pub async fn purge_table_records(
    nocodb: &NocoDbClient,
    pacing: &PacingConfig,
    table_id: &str,
) -> MigrationResult<PurgeSummary> {
    let records = nocodb.list_table_records(table_id, PURGE_PAGE_LIMIT).await?;
    info!("Found {} records to delete in {table_id}", records.len());

    let mut summary = PurgeSummary {
        table_id: table_id.to_string(),
        found: records.len(),
        ..PurgeSummary::default()
    };

    let ids: Vec<Value> = records
        .iter()
        .filter_map(|record| record.get("Id").or_else(|| record.get("id")).cloned())
        .collect();
    if ids.len() < records.len() {
        warn!("{} records had no Id and were left alone", records.len() - ids.len());
    }

    let batch_size = pacing.maintenance_batch_size.max(1);
    for batch in ids.chunks(batch_size) {
        match nocodb.delete_table_records(table_id, batch).await {
            Ok(_) => {
                summary.deleted += batch.len();
                info!("Deleted {} records ({}/{})", batch.len(), summary.deleted, summary.found);
            }
            Err(e) => {
                summary.failed_batches += 1;
                warn!("Delete batch failed: {e}");
            }
        }
        tokio::time::sleep(pacing.maintenance_batch_delay()).await;
    }

    Ok(summary)
}

/// Compare Airtable and NocoDB record counts table by table
pub async fn migration_status(
    airtable: &AirtableClient,
    nocodb: &NocoDbClient,
    targets: &[TableTarget],
) -> Vec<StatusRow> {
    let mut rows = Vec::with_capacity(targets.len());

    for target in targets {
        let airtable_count = airtable
            .count_records(&target.airtable_base, &target.table)
            .await
            .map(|n| n as u64);
        let nocodb_count = match nocodb
            .find_table_id(&target.nocodb_base, &target.table)
            .await
        {
            Ok(table_id) => nocodb.count_table_records(&table_id).await,
            Err(e) => Err(e),
        };

        let status = match (airtable_count, nocodb_count) {
            (Ok(a), Ok(n)) if a == n => TableStatus::Ok { count: a },
            (Ok(a), Ok(n)) => TableStatus::Mismatch {
                airtable: a,
                nocodb: n,
            },
            (Err(e), _) => TableStatus::Error {
                message: format!("Airtable: {e}"),
            },
            (_, Err(e)) => TableStatus::Error {
                message: format!("NocoDB: {e}"),
            },
        };

        info!("{:15}  {status}", target.table);
        rows.push(StatusRow {
            airtable_base: target.airtable_base.clone(),
            nocodb_base: target.nocodb_base.clone(),
            table: target.table.clone(),
            status,
        });
    }

    rows
}
