//! Shared helpers for the HTTP integration tests

#![allow(dead_code)]

use std::time::Duration;

use brainbase_config::{AirtableConfig, NocoDbConfig};
use brainbase_migration::{AirtableClient, NocoDbClient, RetryPolicy};
use serde_json::Value;
use wiremock::MockServer;

pub const NOCODB_TOKEN: &str = "nc-test-token";

/// Three attempts, no sleeping
pub fn fast_retry() -> RetryPolicy {
    RetryPolicy::new(3, Duration::ZERO)
}

pub fn nocodb_client(server: &MockServer) -> NocoDbClient {
    let uri = server.uri();
    let config = NocoDbConfig::from_lookup(|key| match key {
        "NOCODB_URL" => Some(uri.clone()),
        "NOCODB_TOKEN" => Some(NOCODB_TOKEN.to_string()),
        _ => None,
    })
    .unwrap();
    NocoDbClient::with_retry(&config, fast_retry()).unwrap()
}

pub fn airtable_client(server: &MockServer) -> AirtableClient {
    let uri = server.uri();
    let config = AirtableConfig::from_lookup(|key| match key {
        "AIRTABLE_API_KEY" => Some("patTest".to_string()),
        "BRAINBASE_AIRTABLE_API_URL" => Some(uri.clone()),
        "BRAINBASE_AIRTABLE_REQUEST_DELAY_MS" => Some("0".to_string()),
        _ => None,
    })
    .unwrap();
    AirtableClient::new(&config, fast_retry()).unwrap()
}

/// JSON bodies of every request whose path contains `fragment`, in arrival order
pub async fn bodies_for(server: &MockServer, method: &str, fragment: &str) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.method.as_str() == method && r.url.path().contains(fragment))
        .map(|r| serde_json::from_slice(&r.body).unwrap_or(Value::Null))
        .collect()
}
