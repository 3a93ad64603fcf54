//! Airtable to NocoDB migration orchestration
//!
//! Strictly sequential: bases, then tables, then record batches. A failure is
//! recorded at the level it happened (record, column, table, base) and the
//! loop moves on to the next item.

use std::collections::BTreeMap;

use brainbase_common::ReportContext;
use brainbase_config::{AirtableBaseRef, PacingConfig};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::airtable::{AirtableClient, AirtableTable};
use crate::error::{MigrationError, MigrationResult};
use crate::maintenance::reorder_system_columns;
use crate::nocodb::{NocoDbClient, NocoRecord};
use crate::records::convert_record;
use crate::report::{BaseResult, MigrationReport, TableResult};
use crate::schema::{ColumnDefinition, TableSchemaPlan, map_table};

/// Where migrated tables land
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectTarget {
    /// One new NocoDB project per Airtable base, titled with the base name
    PerBase,
    /// Every base into one existing project; table titles get a `{base}_` prefix
    Shared { project_id: String },
}

impl ProjectTarget {
    /// NocoDB title for an Airtable table
    pub fn table_title(&self, base_name: &str, table_name: &str) -> String {
        match self {
            Self::PerBase => table_name.to_string(),
            Self::Shared { .. } => format!("{base_name}_{table_name}"),
        }
    }
}

/// Knobs for a migration run
#[derive(Debug, Clone)]
pub struct MigratorOptions {
    pub target: ProjectTarget,
    pub pacing: PacingConfig,
    /// Airtable base ids never migrated
    pub skip_bases: Vec<String>,
    /// System column name to title
    pub system_field_titles: BTreeMap<String, String>,
    pub reorder_columns: bool,
    /// Fetch and plan only; nothing is written to NocoDB
    pub dry_run: bool,
}

impl Default for MigratorOptions {
    fn default() -> Self {
        Self {
            target: ProjectTarget::PerBase,
            pacing: PacingConfig::default(),
            skip_bases: Vec::new(),
            system_field_titles: BTreeMap::new(),
            reorder_columns: false,
            dry_run: false,
        }
    }
}

/// Fetch a base's schema and map every table without touching NocoDB
///
/// # Errors
/// Returns an error if the Airtable schema cannot be fetched
pub async fn plan_base(
    airtable: &AirtableClient,
    base: &AirtableBaseRef,
) -> MigrationResult<Vec<TableSchemaPlan>> {
    let tables = airtable.list_tables(&base.base_id).await?;
    Ok(tables.iter().map(map_table).collect())
}

pub struct Migrator {
    airtable: AirtableClient,
    nocodb: NocoDbClient,
    options: MigratorOptions,
}

impl Migrator {
    pub const fn new(airtable: AirtableClient, nocodb: NocoDbClient, options: MigratorOptions) -> Self {
        Self {
            airtable,
            nocodb,
            options,
        }
    }

    pub const fn options(&self) -> &MigratorOptions {
        &self.options
    }

    /// Bases this run will touch
    ///
    /// Without `only`, configured bases minus the skip list. With `only`, the
    /// single base matching that name or id, even if it is on the skip list.
    ///
    /// # Errors
    /// Returns `MigrationError::UnknownBase` if `only` matches nothing
    pub fn select_bases(
        &self,
        bases: &[AirtableBaseRef],
        only: Option<&str>,
    ) -> MigrationResult<Vec<AirtableBaseRef>> {
        match only {
            Some(wanted) => {
                let base = bases
                    .iter()
                    .find(|b| b.base_name == wanted || b.base_id == wanted)
                    .ok_or_else(|| MigrationError::UnknownBase(wanted.to_string()))?;
                if self.options.skip_bases.contains(&base.base_id) {
                    warn!("{} is on the skip list; migrating it because it was named explicitly", base.base_name);
                }
                Ok(vec![base.clone()])
            }
            None => Ok(bases
                .iter()
                .filter(|b| !self.options.skip_bases.contains(&b.base_id))
                .cloned()
                .collect()),
        }
    }

    /// Migrate every selected base and return the finished report
    ///
    /// # Errors
    /// Returns an error only for an unknown `only` base; everything else is
    /// recorded in the report
    pub async fn migrate_all(
        &self,
        bases: &[AirtableBaseRef],
        only: Option<&str>,
    ) -> MigrationResult<MigrationReport> {
        let selected = self.select_bases(bases, only)?;
        info!("Bases to migrate: {}", selected.len());

        let mut report = MigrationReport::start(self.options.dry_run);
        for base in &selected {
            let result = self.migrate_base(base).await;
            if result.failed() {
                warn!("✗ {} failed: {}", base.base_name, result.errors.join("; "));
            } else {
                info!("✓ {} done", base.base_name);
            }
            report.push_base(result);
        }

        report.finish();
        Ok(report)
    }

    /// Migrate one base; errors end up in the returned result
    pub async fn migrate_base(&self, base: &AirtableBaseRef) -> BaseResult {
        info!("{}", "=".repeat(60));
        info!("Migrating base: {} ({})", base.base_name, base.base_id);
        info!("{}", "=".repeat(60));

        let mut result = BaseResult::new(&base.base_id, &base.base_name);

        let tables = match self
            .airtable
            .list_tables(&base.base_id)
            .await
            .report_context("schema fetch failed")
        {
            Ok(tables) => tables,
            Err(line) => {
                result.errors.push(line);
                return result;
            }
        };

        if self.options.dry_run {
            result.tables = tables.iter().map(|t| self.plan_table(base, t)).collect();
            return result;
        }

        let project_id = match self
            .resolve_project(base)
            .await
            .report_context("project setup failed")
        {
            Ok(id) => id,
            Err(line) => {
                result.errors.push(line);
                return result;
            }
        };
        result.nocodb_project_id = Some(project_id.clone());

        for table in &tables {
            let table_result = self.migrate_table(&project_id, base, table).await;
            result.tables.push(table_result);
        }

        result
    }

    async fn resolve_project(&self, base: &AirtableBaseRef) -> MigrationResult<String> {
        match &self.options.target {
            ProjectTarget::Shared { project_id } => Ok(project_id.clone()),
            ProjectTarget::PerBase => {
                let description = format!("Migrated from Airtable base {}", base.base_id);
                let project = self
                    .nocodb
                    .create_project(&base.base_name, &description)
                    .await?;
                info!("Created NocoDB project {} ({})", project.title, project.id);
                Ok(project.id)
            }
        }
    }

    fn plan_table(&self, base: &AirtableBaseRef, table: &AirtableTable) -> TableResult {
        let plan = map_table(table);
        let title = self.options.target.table_title(&base.base_name, &table.name);
        info!(
            "[dry run] {} -> {title}: {} columns, {} manual",
            table.name,
            plan.columns.len(),
            plan.manual_fields.len()
        );

        let mut result = TableResult::new(&table.name, title);
        result.manual_fields = plan.manual_fields;
        result.formula_fields = plan.formula_fields;
        result
    }

    /// Create the table, its columns and its rows
    pub async fn migrate_table(
        &self,
        project_id: &str,
        base: &AirtableBaseRef,
        table: &AirtableTable,
    ) -> TableResult {
        let title = self.options.target.table_title(&base.base_name, &table.name);
        info!("--- Table: {} -> {title} ---", table.name);

        let plan = map_table(table);
        let mut result = TableResult::new(&table.name, &title);
        result.manual_fields = plan.manual_fields;
        result.formula_fields = plan.formula_fields;

        let created = match self
            .nocodb
            .create_table(project_id, &title, &[ColumnDefinition::primary_key()])
            .await
            .report_context("table creation failed")
        {
            Ok(created) => created,
            Err(line) => {
                result.errors.push(line);
                return result;
            }
        };
        result.nocodb_table_id = Some(created.id.clone());
        info!("Created table {}", created.id);

        for column in &plan.columns {
            match self.nocodb.create_column(&created.id, column).await {
                Ok(_) => {
                    debug!("✓ column {}", column.title);
                    result.columns_created += 1;
                }
                Err(e) => {
                    warn!("✗ column {}: {e}", column.title);
                    result.columns_failed += 1;
                    result.errors.push(format!("column {}: {e}", column.title));
                }
            }
        }

        match self.airtable.list_records(&base.base_id, &table.name).await {
            Ok(records) => {
                let rows: Vec<NocoRecord> = records.iter().map(convert_record).collect();
                self.insert_rows(project_id, &title, &rows, &mut result).await;
            }
            Err(e) => result.errors.push(format!("record fetch failed: {e}")),
        }
        info!(
            "Records: {} migrated, {} failed",
            result.records_migrated, result.records_failed
        );

        if let Err(e) = self.retitle_system_columns(&created.id).await {
            warn!("✗ system column titles: {e}");
        }

        if self.options.reorder_columns {
            if let Err(e) = reorder_system_columns(&self.nocodb, &created.id).await {
                warn!("✗ column reorder: {e}");
            }
        }

        result
    }

    /// Bulk insert in batches; a failed batch is retried row by row
    async fn insert_rows(
        &self,
        project_id: &str,
        table_title: &str,
        rows: &[NocoRecord],
        result: &mut TableResult,
    ) {
        let pacing = &self.options.pacing;
        let batches: Vec<&[NocoRecord]> = rows.chunks(pacing.batch_size.max(1)).collect();
        let batch_count = batches.len();

        for (index, batch) in batches.into_iter().enumerate() {
            match self
                .nocodb
                .bulk_create_records(project_id, table_title, batch)
                .await
            {
                Ok(_) => result.records_migrated += batch.len(),
                Err(e) => {
                    warn!(
                        "Batch {}/{batch_count} failed ({e}); inserting one by one",
                        index + 1
                    );
                    for row in batch {
                        match self.nocodb.create_record(project_id, table_title, row).await {
                            Ok(_) => result.records_migrated += 1,
                            Err(e) => {
                                debug!("Record insert failed: {e}");
                                result.records_failed += 1;
                            }
                        }
                    }
                }
            }

            if index + 1 < batch_count {
                tokio::time::sleep(pacing.batch_delay()).await;
            }
        }
    }

    /// Give NocoDB's system columns readable titles
    async fn retitle_system_columns(&self, table_id: &str) -> MigrationResult<()> {
        let titles = &self.options.system_field_titles;
        if titles.is_empty() {
            return Ok(());
        }

        let table = self.nocodb.get_table(table_id).await?;
        for column in table.columns.iter().filter(|c| c.system) {
            let Some(title) = titles.get(column.physical_name()) else {
                continue;
            };
            self.nocodb
                .update_column(&column.id, &json!({ "title": title }))
                .await?;
        }
        debug!("✓ system column titles set");
        Ok(())
    }
}
