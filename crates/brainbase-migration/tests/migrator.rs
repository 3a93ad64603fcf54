//! End-to-end migration runs against mocked Airtable and NocoDB servers

mod common;

use std::collections::BTreeMap;

use brainbase_config::{AirtableBaseRef, PacingConfig};
use brainbase_migration::{Migrator, MigratorOptions, ProjectTarget};
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn baao() -> AirtableBaseRef {
    AirtableBaseRef {
        project_id: "baao".to_string(),
        base_id: "app1".to_string(),
        base_name: "BAAO".to_string(),
    }
}

fn zeims() -> AirtableBaseRef {
    AirtableBaseRef {
        project_id: "zeims".to_string(),
        base_id: "app2".to_string(),
        base_name: "Zeims".to_string(),
    }
}

async fn mount_airtable_base(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v0/meta/bases/app1/tables"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tables": [{
                "id": "tbl1",
                "name": "Customers",
                "fields": [
                    {"id": "f1", "name": "Name", "type": "singleLineText"},
                    {"id": "f2", "name": "ID", "type": "singleLineText"},
                    {"id": "f3", "name": "Stage", "type": "singleSelect",
                     "options": {"choices": [{"name": "Lead"}, {"name": "Won"}]}},
                    {"id": "f4", "name": "Client", "type": "multipleRecordLinks"},
                    {"id": "f5", "name": "Margin", "type": "formula",
                     "options": {"formula": "{Price} - {Cost}"}}
                ]
            }]
        })))
        .mount(server)
        .await;

    // second page first so the more specific mock wins
    Mock::given(method("GET"))
        .and(path("/v0/app1/Customers"))
        .and(query_param("offset", "page2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [
                {"id": "rec3", "fields": {"Name": "Initech", "ID": "C-3"}}
            ]
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v0/app1/Customers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [
                {"id": "rec1", "fields": {"Name": "Acme", "ID": "C-1", "Client": ["recX1"], "Stage": "Lead"}},
                {"id": "rec2", "fields": {"Name": "Globex", "ID": "C-2", "Stage": "Won"}}
            ],
            "offset": "page2"
        })))
        .mount(server)
        .await;
}

async fn mount_nocodb_table(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/v1/db/meta/projects/p1/tables"))
        .and(body_partial_json(json!({"title": "BAAO_Customers"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "m1", "title": "BAAO_Customers"
        })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/db/meta/tables/m1/columns"))
        .and(body_partial_json(json!({"title": "Stage"})))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"msg": "Invalid colOptions"})))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/db/meta/tables/m1/columns"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "m1"})))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/db/meta/tables/m1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "m1",
            "title": "BAAO_Customers",
            "columns": [
                {"id": "c1", "title": "ID", "column_name": "id", "uidt": "ID", "pk": true},
                {"id": "c2", "title": "Name", "column_name": "Name", "uidt": "SingleLineText"},
                {"id": "c3", "title": "CreatedAt", "column_name": "created_at", "uidt": "CreatedTime", "system": true}
            ]
        })))
        .mount(server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/db/meta/columns/c3"))
        .and(body_partial_json(json!({"title": "作成日時"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(server)
        .await;
}

fn shared_options() -> MigratorOptions {
    let mut titles = BTreeMap::new();
    titles.insert("created_at".to_string(), "作成日時".to_string());

    MigratorOptions {
        target: ProjectTarget::Shared {
            project_id: "p1".to_string(),
        },
        pacing: PacingConfig {
            batch_size: 2,
            ..PacingConfig::immediate()
        },
        system_field_titles: titles,
        ..MigratorOptions::default()
    }
}

#[tokio::test]
async fn test_migrates_table_with_batch_fallback() {
    let airtable = MockServer::start().await;
    let nocodb = MockServer::start().await;
    mount_airtable_base(&airtable).await;
    mount_nocodb_table(&nocodb).await;

    // first batch goes through in bulk, the second one falls back to single inserts
    Mock::given(method("POST"))
        .and(path("/api/v1/db/data/bulk/noco/p1/BAAO_Customers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}, {"id": 2}])))
        .up_to_n_times(1)
        .mount(&nocodb)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/db/data/bulk/noco/p1/BAAO_Customers"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&nocodb)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/db/data/noco/p1/BAAO_Customers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 3})))
        .expect(1)
        .mount(&nocodb)
        .await;

    let migrator = Migrator::new(
        common::airtable_client(&airtable),
        common::nocodb_client(&nocodb),
        shared_options(),
    );
    let report = migrator.migrate_all(&[baao()], None).await.unwrap();

    let totals = report.totals;
    assert_eq!(totals.bases, 1);
    assert_eq!(totals.bases_failed, 0);
    assert_eq!(totals.tables, 1);
    assert_eq!(totals.columns_created, 2);
    assert_eq!(totals.columns_failed, 1);
    assert_eq!(totals.records_migrated, 3);
    assert_eq!(totals.records_failed, 0);
    assert_eq!(totals.manual_fields, 2);

    let table = &report.bases[0].tables[0];
    assert_eq!(table.nocodb_table, "BAAO_Customers");
    assert_eq!(table.nocodb_table_id.as_deref(), Some("m1"));
    assert_eq!(table.formula_fields.len(), 1);
    assert_eq!(report.bases[0].nocodb_project_id.as_deref(), Some("p1"));

    // rows were renamed and stripped of link fields before going out
    let bulk = common::bodies_for(&nocodb, "POST", "/bulk/").await;
    let first_row = &bulk[0][0];
    assert_eq!(first_row["Airtable_ID"], "C-1");
    assert!(first_row.get("Client").is_none());
    assert!(first_row.get("ID").is_none());
}

#[tokio::test]
async fn test_project_per_base_with_column_reorder() {
    let airtable = MockServer::start().await;
    let nocodb = MockServer::start().await;
    mount_airtable_base(&airtable).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/db/meta/projects"))
        .and(body_json(json!({
            "title": "BAAO",
            "description": "Migrated from Airtable base app1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "p7", "title": "BAAO"})))
        .expect(1)
        .mount(&nocodb)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/db/meta/projects/p7/tables"))
        .and(body_partial_json(json!({"title": "Customers"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "m7", "title": "Customers"
        })))
        .expect(1)
        .mount(&nocodb)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/db/meta/tables/m7/columns"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "m7"})))
        .mount(&nocodb)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/db/data/bulk/noco/p7/Customers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(2)
        .mount(&nocodb)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/db/meta/tables/m7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "m7",
            "title": "Customers",
            "columns": [
                {"id": "c1", "title": "CreatedAt", "column_name": "created_at", "uidt": "CreatedTime", "system": true},
                {"id": "c2", "title": "Name", "column_name": "Name", "uidt": "SingleLineText"},
                {"id": "c3", "title": "ID", "column_name": "id", "uidt": "ID", "pk": true}
            ]
        })))
        .mount(&nocodb)
        .await;
    Mock::given(method("PATCH"))
        .and(path_regex(r"^/api/v1/db/meta/columns/c[0-9]+$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(3)
        .mount(&nocodb)
        .await;

    let migrator = Migrator::new(
        common::airtable_client(&airtable),
        common::nocodb_client(&nocodb),
        MigratorOptions {
            pacing: PacingConfig {
                batch_size: 2,
                ..PacingConfig::immediate()
            },
            reorder_columns: true,
            ..MigratorOptions::default()
        },
    );
    let report = migrator.migrate_all(&[baao()], None).await.unwrap();

    assert_eq!(report.bases[0].nocodb_project_id.as_deref(), Some("p7"));
    let table = &report.bases[0].tables[0];
    assert_eq!(table.nocodb_table, "Customers");
    assert_eq!(table.records_migrated, 3);

    // primary key, regular columns, system columns
    let patches: Vec<_> = nocodb
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.method.as_str() == "PATCH")
        .map(|r| {
            let body: serde_json::Value = serde_json::from_slice(&r.body).unwrap();
            (r.url.path().to_string(), body)
        })
        .collect();
    assert_eq!(
        patches,
        vec![
            ("/api/v1/db/meta/columns/c3".to_string(), json!({"order": 1})),
            ("/api/v1/db/meta/columns/c2".to_string(), json!({"order": 2})),
            ("/api/v1/db/meta/columns/c1".to_string(), json!({"order": 3})),
        ]
    );

    // columns are reordered only after every row went in
    let requests = nocodb.received_requests().await.unwrap();
    let last_insert = requests
        .iter()
        .rposition(|r| r.url.path().contains("/bulk/"))
        .unwrap();
    let first_patch = requests
        .iter()
        .position(|r| r.method.as_str() == "PATCH")
        .unwrap();
    assert!(last_insert < first_patch);
}

#[tokio::test]
async fn test_base_failure_does_not_stop_the_run() {
    let airtable = MockServer::start().await;
    let nocodb = MockServer::start().await;
    mount_airtable_base(&airtable).await;

    Mock::given(method("GET"))
        .and(path("/v0/meta/bases/app2/tables"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({"errors": [{"error": "RATE_LIMIT_REACHED"}]})))
        .mount(&airtable)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/db/meta/projects"))
        .respond_with(ResponseTemplate::new(500).set_body_string("db down"))
        .mount(&nocodb)
        .await;

    let migrator = Migrator::new(
        common::airtable_client(&airtable),
        common::nocodb_client(&nocodb),
        MigratorOptions {
            pacing: PacingConfig::immediate(),
            ..MigratorOptions::default()
        },
    );
    let report = migrator.migrate_all(&[zeims(), baao()], None).await.unwrap();

    assert_eq!(report.totals.bases, 2);
    assert_eq!(report.totals.bases_failed, 2);
    assert!(report.bases[0].errors[0].contains("schema fetch failed"));
    assert!(report.bases[1].errors[0].contains("project setup failed"));
}

#[tokio::test]
async fn test_dry_run_never_touches_nocodb() {
    let airtable = MockServer::start().await;
    let nocodb = MockServer::start().await;
    mount_airtable_base(&airtable).await;

    let migrator = Migrator::new(
        common::airtable_client(&airtable),
        common::nocodb_client(&nocodb),
        MigratorOptions {
            dry_run: true,
            ..shared_options()
        },
    );
    let report = migrator.migrate_all(&[baao()], Some("BAAO")).await.unwrap();

    assert!(report.dry_run);
    assert_eq!(report.totals.tables, 1);
    assert_eq!(report.totals.manual_fields, 2);
    assert_eq!(report.totals.records_migrated, 0);
    assert!(nocodb.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_base_is_an_error() {
    let airtable = MockServer::start().await;
    let nocodb = MockServer::start().await;

    let migrator = Migrator::new(
        common::airtable_client(&airtable),
        common::nocodb_client(&nocodb),
        MigratorOptions::default(),
    );
    assert!(migrator.migrate_all(&[baao()], Some("Nope")).await.is_err());
}
