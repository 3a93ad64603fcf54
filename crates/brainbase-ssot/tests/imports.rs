//! Importers against the in-memory repository

use std::path::PathBuf;

use brainbase_ssot::{
    ImportError, MockSsotRepository, SsotRepository, import_contacts, import_members_file,
    load_contacts,
};

const MEMBERS: &str = r"
members:
  - slack_id: U01
    person_id: p_sato
    workspace: unson
    brainbase_name: Sato
    access_level: admin
    employment_type: fulltime
  - slack_id: U02
    person_id: p_sato
    workspace: techknight
    brainbase_name: Sato TK
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

fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[tokio::test]
async fn test_member_import_and_statistics() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "members.yml", MEMBERS);
    let repo = MockSsotRepository::new();

    let report = import_members_file(&repo, &path).await.unwrap();

    assert_eq!(report.summary.people, 2);
    assert_eq!(report.summary.accounts, 3);
    assert_eq!(report.statistics.active, 2);
    assert_eq!(report.statistics.inactive, 1);
    assert_eq!(
        report.statistics.multi_account_people,
        vec![("p_sato".to_string(), 2)]
    );
    assert_eq!(
        repo.people.lock().unwrap().get("p_sato").map(String::as_str),
        Some("Sato")
    );
}

#[tokio::test]
async fn test_member_import_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "members.yml", MEMBERS);
    let repo = MockSsotRepository::new();

    import_members_file(&repo, &path).await.unwrap();
    let second = import_members_file(&repo, &path).await.unwrap();

    assert_eq!(second.statistics.active, 2);
    assert_eq!(repo.users.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn test_member_import_surfaces_database_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "members.yml", MEMBERS);
    let repo = MockSsotRepository::new();
    repo.fail_next("connection reset");

    let err = import_members_file(&repo, &path).await.unwrap_err();
    assert!(matches!(err, ImportError::Database(_)));
    assert!(repo.users.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_contact_import_counts_failures_as_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let scanned = write_file(
        &dir,
        "scanned_2026-01.csv",
        "会社名,氏名\nAcme,Jane Doe\nGlobex,John Roe\nInitech,Bill L\n",
    );
    let missing = dir.path().join("scanned_2099-01.csv");

    let contacts = load_contacts(&[scanned, missing]).unwrap();
    assert_eq!(contacts.len(), 3);

    let repo = MockSsotRepository::new();
    repo.fail_contact("John Roe");

    let summary = import_contacts(&repo, &contacts, false).await;
    assert_eq!(summary.total, 3);
    assert_eq!(summary.inserted, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(repo.contact_count(), 2);
}

#[tokio::test]
async fn test_contact_dry_run_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let scanned = write_file(&dir, "scanned.csv", "氏名\nJane Doe\n");
    let contacts = load_contacts(&[scanned]).unwrap();

    let repo = MockSsotRepository::new();
    let summary = import_contacts(&repo, &contacts, true).await;

    assert_eq!(summary.total, 1);
    assert_eq!(summary.inserted, 0);
    assert_eq!(repo.contact_count(), 0);
}

#[tokio::test]
async fn test_existing_contact_id_is_skipped() {
    let repo = MockSsotRepository::new();
    let contacts = brainbase_ssot::parse_contacts("氏名\nJane Doe\n", "scanned.csv").unwrap();

    assert!(repo.insert_contact("cnt_fixed", &contacts[0]).await.unwrap());
    assert!(!repo.insert_contact("cnt_fixed", &contacts[0]).await.unwrap());
}
