//! One handler module per command family

pub mod import;
pub mod maintenance;
pub mod migrate;
pub mod social;

use std::path::Path;

use anyhow::Context as _;
use brainbase_config::validation::Validate;
use brainbase_config::{ConfigError, WorkspaceConfig};
use brainbase_migration::MigrationError;
use brainbase_social::SocialError;
use brainbase_ssot::ImportError;

use crate::cli::{Cli, Command};

pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_CONFIG: u8 = 2;

/// How a command ended when it did not error out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// Ran to completion but the operation itself did not succeed
    Failed,
}

/// Route a parsed command line to its handler
///
/// # Errors
/// Returns whatever the handler returns; see [`exit_code`]
pub async fn dispatch(cli: Cli) -> anyhow::Result<Outcome> {
    let config_path = cli.config;
    match cli.command {
        Command::Migrate(args) => migrate::migrate(&config_path, &args).await,
        Command::Plan { base } => migrate::plan(&config_path, base.as_deref()).await,
        Command::ReorderColumns { table_ids } => maintenance::reorder_columns(&table_ids).await,
        Command::InsertMissing(args) => maintenance::insert_missing(&args).await,
        Command::PurgeRecords { table_ids } => maintenance::purge_records(&table_ids).await,
        Command::Status(args) => maintenance::status(&args).await,
        Command::ImportMembers { members } => import::import_members(members.as_deref()).await,
        Command::ImportContacts { dry_run, files } => {
            import::import_contacts(&files, dry_run).await
        }
        Command::Post(args) => social::post(&args).await,
        Command::VerifyX { json } => social::verify_x(json).await,
        Command::Infographic {
            topic,
            points,
            output,
        } => social::infographic(&topic, &points, output.as_deref()).await,
    }
}

/// 2 for configuration problems, 1 for everything else
pub fn exit_code(err: &anyhow::Error) -> u8 {
    if is_configuration_error(err) {
        EXIT_CONFIG
    } else {
        EXIT_FAILURE
    }
}

fn is_configuration_error(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause.is::<ConfigError>()
            || matches!(
                cause.downcast_ref::<MigrationError>(),
                Some(MigrationError::Config(_))
            )
            || matches!(
                cause.downcast_ref::<SocialError>(),
                Some(SocialError::Configuration(_))
            )
            || matches!(
                cause.downcast_ref::<ImportError>(),
                Some(ImportError::FileNotFound { .. })
            )
    })
}

/// Load and validate a config section, tagging failures as configuration errors
pub fn checked<T: Validate>(config: Result<T, ConfigError>) -> Result<T, ConfigError> {
    let config = config?;
    config.validate()?;
    Ok(config)
}

/// Load `config.yml`
///
/// # Errors
/// Missing or invalid files are configuration errors
pub fn load_workspace(path: &Path) -> anyhow::Result<WorkspaceConfig> {
    WorkspaceConfig::load(path).with_context(|| format!("loading {}", path.display()))
}
