//! Live `PostgreSQL` round trip
//!
//! Needs `INFO_SSOT_DATABASE_URL` pointing at a database with the SSOT schema.
//! Run with `cargo test -p brainbase-ssot -- --ignored`.

use brainbase_ssot::{
    DatabaseConfig, DbSsotRepository, SsotRepository, generate_contact_id, parse_contacts,
};

#[tokio::test]
#[ignore = "requires INFO_SSOT_DATABASE_URL"]
async fn test_contact_insert_conflict() {
    let config = DatabaseConfig::from_env().unwrap();
    let repo = DbSsotRepository::connect(&config).await.unwrap();

    let contacts = parse_contacts("氏名,会社名\nLive Test,Brainbase\n", "scanned_test.csv").unwrap();
    let id = generate_contact_id();

    assert!(repo.insert_contact(&id, &contacts[0]).await.unwrap());
    assert!(!repo.insert_contact(&id, &contacts[0]).await.unwrap());

    sqlx::query("DELETE FROM graph_entities WHERE id = $1")
        .bind(&id)
        .execute(repo.pool())
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "requires INFO_SSOT_DATABASE_URL"]
async fn test_member_statistics_query() {
    let config = DatabaseConfig::from_env().unwrap();
    let repo = DbSsotRepository::connect(&config).await.unwrap();

    let stats = repo.member_statistics().await.unwrap();
    assert!(stats.active >= 0);
    assert!(stats.multi_account_people.len() <= 10);
}
