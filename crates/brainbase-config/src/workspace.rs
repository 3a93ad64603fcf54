//! `config.yml` loading
//!
//! The workspace file lists the organization's projects. Projects with an
//! `airtable` block are migration sources; the optional `migration` block
//! tunes which bases run and where they land.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::validation::{self, Validate};
use crate::{ConfigError, ConfigResult};

/// Default file name looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "config.yml";

/// NocoDB system columns and the titles they get after migration
const DEFAULT_SYSTEM_FIELD_TITLES: [(&str, &str); 5] = [
    ("created_at", "作成日時"),
    ("updated_at", "更新日時"),
    ("created_by", "作成者"),
    ("updated_by", "更新者"),
    ("nc_order", "順序"),
];

/// Parsed `config.yml`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkspaceConfig {
    #[serde(default)]
    pub projects: Vec<ProjectEntry>,
    #[serde(default)]
    pub migration: MigrationSettings,
}

/// One `projects[]` entry; unrelated keys are ignored
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectEntry {
    pub id: String,
    #[serde(default)]
    pub airtable: Option<AirtableSection>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AirtableSection {
    pub base_id: String,
    pub base_name: String,
}

/// Optional `migration:` block
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MigrationSettings {
    /// Airtable base ids that are never migrated (done already, rate limited, ...)
    #[serde(default)]
    pub skip_bases: Vec<String>,
    /// Migrate every base into this existing NocoDB project instead of one project per base
    #[serde(default)]
    pub nocodb_project_id: Option<String>,
    /// Overrides for system column titles, keyed by column name
    #[serde(default)]
    pub system_field_titles: BTreeMap<String, String>,
    /// Reorder columns (PK, regular, system) after each table migration
    #[serde(default)]
    pub reorder_system_fields: bool,
}

/// A migration source resolved from a project entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirtableBaseRef {
    pub project_id: String,
    pub base_id: String,
    pub base_name: String,
}

impl WorkspaceConfig {
    /// Load and validate a workspace file
    ///
    /// # Errors
    /// Returns `ConfigError::FileNotFound` if the file does not exist,
    /// `ConfigError::YamlParsing` if it is not valid YAML for this shape, or a
    /// validation error for empty base ids/names
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::parse(&content).map_err(|source| ConfigError::YamlParsing {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;

        tracing::debug!(
            path = %path.display(),
            projects = config.projects.len(),
            "Loaded workspace config"
        );
        Ok(config)
    }

    /// Parse YAML without touching the filesystem
    ///
    /// # Errors
    /// Returns the underlying `serde_yaml` error
    pub fn parse(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Every project that carries an Airtable base, in file order
    pub fn airtable_bases(&self) -> Vec<AirtableBaseRef> {
        self.projects
            .iter()
            .filter_map(|project| {
                project.airtable.as_ref().map(|airtable| AirtableBaseRef {
                    project_id: project.id.clone(),
                    base_id: airtable.base_id.clone(),
                    base_name: airtable.base_name.clone(),
                })
            })
            .collect()
    }

    /// Airtable bases minus `migration.skip_bases`
    pub fn migration_targets(&self) -> Vec<AirtableBaseRef> {
        self.airtable_bases()
            .into_iter()
            .filter(|base| !self.migration.skip_bases.contains(&base.base_id))
            .collect()
    }

    /// Look up a base by its Airtable name or id
    pub fn find_base(&self, name_or_id: &str) -> Option<AirtableBaseRef> {
        self.airtable_bases()
            .into_iter()
            .find(|base| base.base_name == name_or_id || base.base_id == name_or_id)
    }
}

impl MigrationSettings {
    /// Default system titles with file overrides applied
    pub fn system_field_titles(&self) -> BTreeMap<String, String> {
        let mut titles: BTreeMap<String, String> = DEFAULT_SYSTEM_FIELD_TITLES
            .iter()
            .map(|(column, title)| ((*column).to_string(), (*title).to_string()))
            .collect();
        for (column, title) in &self.system_field_titles {
            titles.insert(column.clone(), title.clone());
        }
        titles
    }
}

impl Validate for WorkspaceConfig {
    fn validate(&self) -> ConfigResult<()> {
        for base in self.airtable_bases() {
            validation::validate_non_empty(&base.base_id, "airtable.base_id")?;
            validation::validate_non_empty(&base.base_name, "airtable.base_name")?;
        }
        Ok(())
    }
}

/// Resolve the config path: an explicit path wins, otherwise `./config.yml`
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    explicit.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), Path::to_path_buf)
}
