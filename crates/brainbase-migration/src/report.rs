//! Migration report: per base / per table counters, summary logging and JSON output

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::MigrationResult;
use crate::schema::{FormulaField, ManualField};

/// Default report file written next to the working directory
pub const DEFAULT_REPORT_FILE: &str = "migration_report.json";

const SUMMARY_MANUAL_FIELDS: usize = 10;
const SUMMARY_ERRORS: usize = 5;

/// Result of migrating one Airtable table
#[derive(Debug, Clone, Default, Serialize)]
pub struct TableResult {
    pub airtable_table: String,
    pub nocodb_table: String,
    pub nocodb_table_id: Option<String>,
    pub columns_created: usize,
    pub columns_failed: usize,
    pub records_migrated: usize,
    pub records_failed: usize,
    pub manual_fields: Vec<ManualField>,
    pub formula_fields: Vec<FormulaField>,
    pub errors: Vec<String>,
}

impl TableResult {
    pub fn new(airtable_table: impl Into<String>, nocodb_table: impl Into<String>) -> Self {
        Self {
            airtable_table: airtable_table.into(),
            nocodb_table: nocodb_table.into(),
            ..Self::default()
        }
    }
}

/// Result of migrating one Airtable base
#[derive(Debug, Clone, Default, Serialize)]
pub struct BaseResult {
    pub base_id: String,
    pub base_name: String,
    pub nocodb_project_id: Option<String>,
    pub tables: Vec<TableResult>,
    pub errors: Vec<String>,
}

impl BaseResult {
    pub fn new(base_id: impl Into<String>, base_name: impl Into<String>) -> Self {
        Self {
            base_id: base_id.into(),
            base_name: base_name.into(),
            ..Self::default()
        }
    }

    /// A base failed if it recorded an error of its own (project or schema level)
    pub fn failed(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Aggregated counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportTotals {
    pub bases: usize,
    pub bases_failed: usize,
    pub tables: usize,
    pub tables_with_errors: usize,
    pub columns_created: usize,
    pub columns_failed: usize,
    pub records_migrated: usize,
    pub records_failed: usize,
    pub manual_fields: usize,
}

/// Whole-run report
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub dry_run: bool,
    pub bases: Vec<BaseResult>,
    pub totals: ReportTotals,
}

impl MigrationReport {
    pub fn start(dry_run: bool) -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            dry_run,
            bases: Vec::new(),
            totals: ReportTotals::default(),
        }
    }

    pub fn push_base(&mut self, base: BaseResult) {
        self.bases.push(base);
    }

    /// Stamp the finish time and recompute totals
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
        self.totals = self.compute_totals();
    }

    pub fn compute_totals(&self) -> ReportTotals {
        let mut totals = ReportTotals {
            bases: self.bases.len(),
            bases_failed: self.bases.iter().filter(|b| b.failed()).count(),
            ..ReportTotals::default()
        };
        for table in self.tables() {
            totals.tables += 1;
            if !table.errors.is_empty() {
                totals.tables_with_errors += 1;
            }
            totals.columns_created += table.columns_created;
            totals.columns_failed += table.columns_failed;
            totals.records_migrated += table.records_migrated;
            totals.records_failed += table.records_failed;
            totals.manual_fields += table.manual_fields.len();
        }
        totals
    }

    fn tables(&self) -> impl Iterator<Item = &TableResult> {
        self.bases.iter().flat_map(|base| base.tables.iter())
    }

    /// `table.field (type)` for every field that needs manual work
    pub fn manual_field_lines(&self) -> Vec<String> {
        self.tables()
            .flat_map(|table| {
                table.manual_fields.iter().map(move |field| {
                    format!("{}.{} ({})", table.airtable_table, field.name, field.field_type)
                })
            })
            .collect()
    }

    /// Every error, prefixed with where it happened
    pub fn error_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for base in &self.bases {
            lines.extend(base.errors.iter().map(|e| format!("{}: {e}", base.base_name)));
            for table in &base.tables {
                lines.extend(
                    table
                        .errors
                        .iter()
                        .map(|e| format!("{}/{}: {e}", base.base_name, table.airtable_table)),
                );
            }
        }
        lines
    }

    /// Log the end-of-run summary
    pub fn log_summary(&self) {
        let totals = self.compute_totals();
        info!("{}", "=".repeat(60));
        info!("Migration summary{}", if self.dry_run { " (dry run)" } else { "" });
        info!("{}", "=".repeat(60));
        info!(
            "Bases: {} ({} failed)",
            totals.bases, totals.bases_failed
        );
        info!(
            "Tables: {} ({} with errors)",
            totals.tables, totals.tables_with_errors
        );
        info!(
            "Columns: {} created, {} failed",
            totals.columns_created, totals.columns_failed
        );
        info!(
            "Records: {} migrated, {} failed",
            totals.records_migrated, totals.records_failed
        );

        let manual = self.manual_field_lines();
        if !manual.is_empty() {
            warn!("Fields needing manual migration: {}", manual.len());
            for line in manual.iter().take(SUMMARY_MANUAL_FIELDS) {
                warn!("  - {line}");
            }
            if manual.len() > SUMMARY_MANUAL_FIELDS {
                warn!("  ... and {} more", manual.len() - SUMMARY_MANUAL_FIELDS);
            }
        }

        let errors = self.error_lines();
        if !errors.is_empty() {
            warn!("Errors: {}", errors.len());
            for line in errors.iter().take(SUMMARY_ERRORS) {
                warn!("  - {line}");
            }
        }
    }

    /// Write the report as pretty JSON
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails
    pub fn save(&self, path: &Path) -> MigrationResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        info!("Report saved: {}", path.display());
        Ok(())
    }
}
