//! Domain models for the SSOT imports

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Status written when a member entry omits one
pub const DEFAULT_MEMBER_STATUS: &str = "active";

/// Root of `members.yml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberDirectory {
    #[serde(default)]
    pub members: Vec<Member>,
}

/// One Slack account of a person
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    /// Slack user id, primary key of `users`
    pub slack_id: String,
    /// Person the account belongs to; one person may own several accounts
    pub person_id: String,
    /// Slack workspace, doubles as the organization id
    pub workspace: String,
    pub brainbase_name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub access_level: String,
    pub employment_type: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub projects: Vec<ProjectRef>,
    #[serde(default)]
    pub departments: Vec<String>,
}

fn default_status() -> String {
    DEFAULT_MEMBER_STATUS.to_string()
}

impl Member {
    /// Project names, whichever way they were written
    pub fn project_names(&self) -> Vec<String> {
        self.projects.iter().map(|p| p.name().to_string()).collect()
    }
}

/// A project membership, either `- baao` or `- name: baao`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProjectRef {
    Name(String),
    Detailed { name: String },
}

impl ProjectRef {
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) | Self::Detailed { name } => name,
        }
    }
}

/// A row of the `people` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub id: String,
    pub name: String,
}

impl MemberDirectory {
    /// Distinct people in file order; the first entry for a `person_id` names it
    pub fn people(&self) -> Vec<Person> {
        let mut seen = std::collections::HashSet::new();
        self.members
            .iter()
            .filter(|m| seen.insert(m.person_id.as_str()))
            .map(|m| Person {
                id: m.person_id.clone(),
                name: m.brainbase_name.clone(),
            })
            .collect()
    }
}

/// What a member import wrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MemberImportSummary {
    pub people: usize,
    pub accounts: usize,
}

/// Post-import account statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MemberStatistics {
    pub active: i64,
    pub inactive: i64,
    /// `(person_id, account_count)` for people with more than one account, largest first
    pub multi_account_people: Vec<(String, i64)>,
}

/// A business card contact ready for `graph_entities.payload`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactPayload(pub BTreeMap<String, String>);

impl ContactPayload {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.get("name")
    }

    /// `name (company)` for listings
    pub fn label(&self) -> String {
        format!(
            "{} ({})",
            self.name().unwrap_or_default(),
            self.get("company_name").unwrap_or_default()
        )
    }
}

/// Outcome of a contact import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ContactImportSummary {
    pub inserted: usize,
    pub skipped: usize,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEMBERS: &str = r"
members:
  - slack_id: U01
    person_id: p_sato
    workspace: unson
    brainbase_name: Sato
    email: sato@example.com
    access_level: admin
    employment_type: fulltime
    projects:
      - baao
      - name: zeims
    departments: [dev]
  - slack_id: U02
    person_id: p_sato
    workspace: techknight
    brainbase_name: Sato (TK)
    access_level: member
    employment_type: contractor
    status: inactive
  - slack_id: U03
    person_id: p_kim
    workspace: unson
    brainbase_name: Kim
    access_level: member
    employment_type: parttime
";

    #[test]
    fn test_members_parse_with_defaults() {
        let directory: MemberDirectory = serde_yaml::from_str(MEMBERS).unwrap();
        assert_eq!(directory.members.len(), 3);

        let sato = &directory.members[0];
        assert_eq!(sato.status, "active");
        assert_eq!(sato.project_names(), vec!["baao", "zeims"]);
        assert_eq!(sato.departments, vec!["dev"]);

        let tk = &directory.members[1];
        assert_eq!(tk.status, "inactive");
        assert!(tk.email.is_none());
        assert!(tk.projects.is_empty());
    }

    #[test]
    fn test_people_first_occurrence_wins() {
        let directory: MemberDirectory = serde_yaml::from_str(MEMBERS).unwrap();
        let people = directory.people();
        assert_eq!(
            people,
            vec![
                Person {
                    id: "p_sato".to_string(),
                    name: "Sato".to_string()
                },
                Person {
                    id: "p_kim".to_string(),
                    name: "Kim".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_contact_label() {
        let mut fields = BTreeMap::new();
        fields.insert("name".to_string(), "山田太郎".to_string());
        let contact = ContactPayload(fields);
        assert_eq!(contact.label(), "山田太郎 ()");
    }
}
