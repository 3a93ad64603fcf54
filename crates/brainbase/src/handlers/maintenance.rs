//! Table maintenance commands: reorder, back-fill, purge and status

use brainbase_migration::maintenance::{
    TableTarget, insert_missing_for_tables, migration_status, purge_table_records,
    reorder_system_columns,
};
use tracing::{info, warn};

use super::Outcome;
use super::migrate::{airtable_client, nocodb_client, pacing};
use crate::cli::TableSetArgs;

fn table_targets(args: &TableSetArgs) -> Vec<TableTarget> {
    args.tables
        .iter()
        .map(|table| TableTarget {
            airtable_base: args.airtable_base.clone(),
            nocodb_base: args.nocodb_base.clone(),
            table: table.clone(),
        })
        .collect()
}

pub async fn reorder_columns(table_ids: &[String]) -> anyhow::Result<Outcome> {
    let nocodb = nocodb_client()?;
    for table_id in table_ids {
        match reorder_system_columns(&nocodb, table_id).await {
            Ok(summary) => println!(
                "{table_id}: {} columns reordered, {} failed",
                summary.updated, summary.failed
            ),
            Err(e) => warn!("Failed to reorder {table_id}: {e}"),
        }
    }
    Ok(Outcome::Success)
}

pub async fn insert_missing(args: &TableSetArgs) -> anyhow::Result<Outcome> {
    let airtable = airtable_client()?;
    let nocodb = nocodb_client()?;
    let pacing = pacing()?;

    let results = insert_missing_for_tables(&airtable, &nocodb, &pacing, &table_targets(args)).await;
    for (target, result) in results {
        match result {
            Ok(summary) => println!(
                "{}: fetched {}, inserted {}, failed batches {}",
                summary.table, summary.fetched, summary.inserted, summary.failed_batches
            ),
            Err(e) => println!("{}: failed ({e})", target.table),
        }
    }
    Ok(Outcome::Success)
}

pub async fn purge_records(table_ids: &[String]) -> anyhow::Result<Outcome> {
    let nocodb = nocodb_client()?;
    let pacing = pacing()?;

    for (index, table_id) in table_ids.iter().enumerate() {
        if index > 0 {
            tokio::time::sleep(pacing.table_delay()).await;
        }
        info!("Purging {table_id}");
        match purge_table_records(&nocodb, &pacing, table_id).await {
            Ok(summary) => println!(
                "{table_id}: deleted {} of {}, failed batches {}",
                summary.deleted, summary.found, summary.failed_batches
            ),
            Err(e) => warn!("Failed to purge {table_id}: {e}"),
        }
    }
    Ok(Outcome::Success)
}

pub async fn status(args: &TableSetArgs) -> anyhow::Result<Outcome> {
    let airtable = airtable_client()?;
    let nocodb = nocodb_client()?;

    let rows = migration_status(&airtable, &nocodb, &table_targets(args)).await;
    let width = rows.iter().map(|row| row.table.chars().count()).max().unwrap_or(0);
    for row in rows {
        println!("{:<width$}  {}", row.table, row.status);
    }
    Ok(Outcome::Success)
}
