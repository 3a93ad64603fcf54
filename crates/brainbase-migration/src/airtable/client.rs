//! Airtable REST client (metadata + records)

use std::time::Duration;

use brainbase_config::AirtableConfig;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::models::{AirtableRecord, AirtableTable, ListRecordsResponse, ListTablesResponse};
use crate::error::{MigrationError, MigrationResult};
use crate::retry::RetryPolicy;

/// Maximum page size the records endpoint accepts
const PAGE_SIZE: u32 = 100;

/// Read-only Airtable client
#[derive(Debug, Clone)]
pub struct AirtableClient {
    http: Client,
    api_url: String,
    api_key: String,
    request_delay: Duration,
    retry: RetryPolicy,
}

impl AirtableClient {
    /// Build a client from configuration
    ///
    /// # Errors
    /// Returns `MigrationError::Http` if the HTTP client cannot be built
    pub fn new(config: &AirtableConfig, retry: RetryPolicy) -> MigrationResult<Self> {
        let http = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            request_delay: config.request_delay(),
            retry,
        })
    }

    /// Table definitions of a base
    ///
    /// # Errors
    /// Returns an error if the metadata request fails after retries
    pub async fn list_tables(&self, base_id: &str) -> MigrationResult<Vec<AirtableTable>> {
        let path = format!("/v0/meta/bases/{base_id}/tables");
        let response: ListTablesResponse = self.get_json(&path, &[]).await?;
        tokio::time::sleep(self.request_delay).await;

        info!("Airtable base {base_id}: {} tables", response.tables.len());
        Ok(response.tables)
    }

    /// Every record of a table, following `offset` pagination
    ///
    /// # Errors
    /// Returns an error if any page fails after retries
    pub async fn list_records(
        &self,
        base_id: &str,
        table: &str,
    ) -> MigrationResult<Vec<AirtableRecord>> {
        let path = format!("/v0/{base_id}/{}", urlencoding::encode(table));
        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let mut query = vec![("pageSize", PAGE_SIZE.to_string())];
            if let Some(offset) = &offset {
                query.push(("offset", offset.clone()));
            }

            let page: ListRecordsResponse = self.get_json(&path, &query).await?;
            debug!("Fetched {} records from {table}", page.records.len());
            records.extend(page.records);

            match page.offset {
                Some(next) => {
                    offset = Some(next);
                    tokio::time::sleep(self.request_delay).await;
                }
                None => break,
            }
        }

        Ok(records)
    }

    /// Number of records in a table
    ///
    /// Airtable has no count endpoint, so this pages through the table.
    ///
    /// # Errors
    /// Returns an error if any page fails after retries
    pub async fn count_records(&self, base_id: &str, table: &str) -> MigrationResult<usize> {
        Ok(self.list_records(base_id, table).await?.len())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> MigrationResult<T> {
        let url = format!("{}{path}", self.api_url);
        let url = url.as_str();
        let label = format!("Airtable GET {path}");

        self.retry
            .run(&label, move || async move {
                let response = self
                    .http
                    .get(url)
                    .bearer_auth(&self.api_key)
                    .query(query)
                    .send()
                    .await?;

                let status = response.status();
                if !status.is_success() {
                    return Err(api_error(status, path, response.text().await.unwrap_or_default()));
                }
                Ok(response.json::<T>().await?)
            })
            .await
    }
}

fn api_error(status: StatusCode, path: &str, body: String) -> MigrationError {
    MigrationError::Api {
        service: "Airtable",
        method: "GET".to_string(),
        path: path.to_string(),
        status: status.as_u16(),
        body: body.chars().take(500).collect(),
    }
}
