//! `migrate` and `plan`

use std::path::Path;

use anyhow::Context as _;
use brainbase_config::validation::Validate;
use brainbase_config::{AirtableConfig, NocoDbConfig, PacingConfig, WorkspaceConfig};
use brainbase_migration::{
    AirtableClient, Migrator, MigratorOptions, NocoDbClient, ProjectTarget, RetryPolicy, plan_base,
};
use tracing::{info, warn};

use super::{Outcome, checked, load_workspace};
use crate::cli::MigrateArgs;

/// Migrator settings from `config.yml` plus the command line
fn migrator_options(workspace: &WorkspaceConfig, pacing: PacingConfig, dry_run: bool) -> MigratorOptions {
    let settings = &workspace.migration;
    let target = settings
        .nocodb_project_id
        .clone()
        .map_or(ProjectTarget::PerBase, |project_id| ProjectTarget::Shared { project_id });

    MigratorOptions {
        target,
        pacing,
        skip_bases: settings.skip_bases.clone(),
        system_field_titles: settings.system_field_titles(),
        reorder_columns: settings.reorder_system_fields,
        dry_run,
    }
}

pub fn airtable_client() -> anyhow::Result<AirtableClient> {
    let config = checked(AirtableConfig::from_env()).context("Airtable settings")?;
    info!("Airtable: {}", config.describe());
    Ok(AirtableClient::new(&config, RetryPolicy::default())?)
}

pub fn nocodb_client() -> anyhow::Result<NocoDbClient> {
    let config = checked(NocoDbConfig::from_env()).context("NocoDB settings")?;
    info!("NocoDB: {}", config.describe());
    Ok(NocoDbClient::new(&config)?)
}

pub fn pacing() -> anyhow::Result<PacingConfig> {
    let pacing = PacingConfig::from_env();
    pacing.validate().context("pacing settings")?;
    Ok(pacing)
}

pub async fn migrate(config_path: &Path, args: &MigrateArgs) -> anyhow::Result<Outcome> {
    let workspace = load_workspace(config_path)?;

    let bases = workspace.airtable_bases();
    if bases.is_empty() {
        warn!("No project in {} has an airtable block", config_path.display());
    }

    let options = migrator_options(&workspace, pacing()?, args.dry_run);
    info!(
        project = ?options.target,
        dry_run = options.dry_run,
        skipped = options.skip_bases.len(),
        "Starting migration"
    );

    let migrator = Migrator::new(airtable_client()?, nocodb_client()?, options);
    let report = migrator
        .migrate_all(&bases, args.base.as_deref())
        .await
        .context("migration run")?;

    report.log_summary();
    report
        .save(&args.report)
        .with_context(|| format!("writing {}", args.report.display()))?;
    info!("Report saved to {}", args.report.display());

    Ok(Outcome::Success)
}

pub async fn plan(config_path: &Path, only: Option<&str>) -> anyhow::Result<Outcome> {
    let workspace = load_workspace(config_path)?;

    let bases = match only {
        Some(wanted) => vec![
            workspace
                .find_base(wanted)
                .with_context(|| format!("no Airtable base named {wanted} in {}", config_path.display()))?,
        ],
        None => workspace.migration_targets(),
    };

    let airtable = airtable_client()?;
    for base in &bases {
        println!("{} ({})", base.base_name, base.base_id);
        let tables = match plan_base(&airtable, base).await {
            Ok(tables) => tables,
            Err(e) => {
                warn!("Failed to fetch schema for {}: {e}", base.base_name);
                continue;
            }
        };
        for table in tables {
            println!("  {}", table.title);
            for column in &table.columns {
                println!("    {} -> {}", column.title, column.uidt);
            }
            for field in &table.manual_fields {
                println!("    [manual] {} ({}): {}", field.name, field.field_type, field.reason);
            }
            for formula in &table.formula_fields {
                println!("    [formula] {} = {}", formula.field_name, formula.formula);
            }
        }
    }

    Ok(Outcome::Success)
}
