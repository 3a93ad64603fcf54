//! Organization member import from `members.yml`

use std::path::Path;

use serde::Serialize;

use crate::error::{ImportError, ImportResult};
use crate::models::{MemberDirectory, MemberImportSummary, MemberStatistics};
use crate::traits::SsotRepository;

/// Import outcome together with the statistics read back afterwards
#[derive(Debug, Clone, Serialize)]
pub struct MemberImportReport {
    pub summary: MemberImportSummary,
    pub statistics: MemberStatistics,
}

/// Load and parse a members directory file
///
/// # Errors
///
/// Returns `ImportError::FileNotFound` if the file is missing, `Io` if it
/// cannot be read and `Yaml` if it does not parse
pub fn load_members(path: &Path) -> ImportResult<MemberDirectory> {
    if !path.exists() {
        return Err(ImportError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let text = std::fs::read_to_string(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&text).map_err(|source| ImportError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

/// Load `path`, upsert every member and read back account statistics
///
/// # Errors
///
/// Returns the load error, or the database error that aborted the transaction
pub async fn import_members_file<R>(repo: &R, path: &Path) -> ImportResult<MemberImportReport>
where
    R: SsotRepository + ?Sized,
{
    let directory = load_members(path)?;
    tracing::info!(
        path = %path.display(),
        members = directory.members.len(),
        "Loaded members directory"
    );

    let summary = repo.import_members(&directory).await?;
    let statistics = repo.member_statistics().await?;

    tracing::info!(
        people = summary.people,
        accounts = summary.accounts,
        active = statistics.active,
        inactive = statistics.inactive,
        "Member import complete"
    );
    for (person_id, count) in &statistics.multi_account_people {
        tracing::info!(person_id = %person_id, accounts = count, "Person with multiple Slack accounts");
    }

    Ok(MemberImportReport {
        summary,
        statistics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_members(&dir.path().join("members.yml")).unwrap_err();
        assert!(matches!(err, ImportError::FileNotFound { .. }));
    }

    #[test]
    fn test_invalid_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("members.yml");
        std::fs::write(&path, "members:\n  - slack_id: [unterminated\n").unwrap();
        assert!(matches!(
            load_members(&path).unwrap_err(),
            ImportError::Yaml { .. }
        ));
    }

    #[test]
    fn test_empty_directory_is_valid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("members.yml");
        std::fs::write(&path, "members: []\n").unwrap();
        assert!(load_members(&path).unwrap().members.is_empty());
    }
}
