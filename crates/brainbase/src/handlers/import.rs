//! SSOT imports: members directory and business cards

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use brainbase_config::{DatabaseConfig, PathsConfig};
use brainbase_ssot::{
    DbSsotRepository, discover_contact_files, import_contacts as insert_contacts,
    import_members_file, load_contacts, preview_contacts,
};
use tracing::info;

use super::{Outcome, checked};

async fn connect() -> anyhow::Result<DbSsotRepository> {
    let config = checked(DatabaseConfig::from_env()).context("SSOT database settings")?;
    Ok(DbSsotRepository::connect(&config).await?)
}

pub async fn import_members(members: Option<&Path>) -> anyhow::Result<Outcome> {
    let path = match members {
        Some(path) => path.to_path_buf(),
        None => PathsConfig::from_env()
            .members_file()
            .context("locating members.yml")?,
    };
    info!(path = %path.display(), "Importing members");

    let repo = connect().await?;
    let report = import_members_file(&repo, &path).await?;

    println!(
        "Imported {} people and {} accounts",
        report.summary.people, report.summary.accounts
    );
    println!(
        "Users: {} active, {} inactive",
        report.statistics.active, report.statistics.inactive
    );
    for (person_id, accounts) in &report.statistics.multi_account_people {
        println!("  {person_id}: {accounts} accounts");
    }
    Ok(Outcome::Success)
}

/// Explicit files win; otherwise every CSV in the contacts directory
fn contact_files(files: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    if !files.is_empty() {
        return Ok(files.to_vec());
    }
    let dir = PathsConfig::from_env()
        .contacts_dir()
        .context("locating the contacts directory")?;
    Ok(discover_contact_files(&dir)?)
}

pub async fn import_contacts(files: &[PathBuf], dry_run: bool) -> anyhow::Result<Outcome> {
    let files = contact_files(files)?;
    info!(files = files.len(), dry_run, "Importing contacts");

    let contacts = load_contacts(&files)?;
    let summary = if dry_run {
        preview_contacts(&contacts)
    } else {
        let repo = connect().await?;
        insert_contacts(&repo, &contacts, false).await
    };

    println!(
        "Contacts: {} total, {} inserted, {} skipped",
        summary.total, summary.inserted, summary.skipped
    );
    Ok(Outcome::Success)
}
