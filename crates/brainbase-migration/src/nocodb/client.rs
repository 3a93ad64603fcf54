//! NocoDB REST client
//!
//! Meta and data endpoints of the v1 API plus the v2 table/record endpoints
//! used by the maintenance commands. Every call goes through the same retry
//! loop; after the last attempt the error is returned to the caller.

use std::time::Duration;

use brainbase_config::NocoDbConfig;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use tracing::{debug, error, info};

use super::models::{CountResponse, ListResponse, NocoColumn, NocoProject, NocoTable};
use crate::error::{MigrationError, MigrationResult};
use crate::retry::RetryPolicy;
use crate::schema::ColumnDefinition;

/// How much of a non-JSON error body is logged and kept
const ERROR_BODY_LIMIT: usize = 500;

/// A NocoDB row as sent and received over the wire
pub type NocoRecord = Map<String, Value>;

#[derive(Debug, Clone, Copy)]
enum ApiVersion {
    V1,
    V2,
}

impl ApiVersion {
    const fn prefix(self) -> &'static str {
        match self {
            Self::V1 => "/api/v1",
            Self::V2 => "/api/v2",
        }
    }
}

/// Token-authenticated NocoDB client
#[derive(Debug, Clone)]
pub struct NocoDbClient {
    http: Client,
    base_url: String,
    token: String,
    retry: RetryPolicy,
}

impl NocoDbClient {
    /// Build a client from configuration; retry settings come from the config too
    ///
    /// # Errors
    /// Returns `MigrationError::Http` if the HTTP client cannot be built
    pub fn new(config: &NocoDbConfig) -> MigrationResult<Self> {
        let retry = RetryPolicy::new(config.max_retries, config.retry_delay());
        Self::with_retry(config, retry)
    }

    /// Build a client with an explicit retry policy
    ///
    /// # Errors
    /// Returns `MigrationError::Http` if the HTTP client cannot be built
    pub fn with_retry(config: &NocoDbConfig, retry: RetryPolicy) -> MigrationResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            base_url: config.url.clone(),
            token: config.token.clone(),
            retry,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // === Projects (v1 meta) ===

    /// # Errors
    /// Returns an error if the request fails after retries
    pub async fn create_project(&self, title: &str, description: &str) -> MigrationResult<NocoProject> {
        info!("Creating NocoDB project: {title}");
        let body = json!({ "title": title, "description": description });
        self.send_typed(ApiVersion::V1, Method::POST, "/db/meta/projects", &[], Some(&body))
            .await
    }

    /// # Errors
    /// Returns an error if the request fails after retries
    pub async fn list_projects(&self) -> MigrationResult<Vec<NocoProject>> {
        let response: ListResponse<NocoProject> = self
            .send_typed(ApiVersion::V1, Method::GET, "/db/meta/projects", &[], None)
            .await?;
        Ok(response.list)
    }

    /// # Errors
    /// Returns an error if the request fails after retries
    pub async fn get_project(&self, project_id: &str) -> MigrationResult<NocoProject> {
        let path = format!("/db/meta/projects/{project_id}");
        self.send_typed(ApiVersion::V1, Method::GET, &path, &[], None).await
    }

    // === Tables (v1 meta) ===

    /// Create a table with the given initial columns
    ///
    /// # Errors
    /// Returns an error if the request fails after retries
    pub async fn create_table(
        &self,
        project_id: &str,
        title: &str,
        columns: &[ColumnDefinition],
    ) -> MigrationResult<NocoTable> {
        info!("Creating NocoDB table: {title}");
        let path = format!("/db/meta/projects/{project_id}/tables");
        let body = json!({ "table_name": title, "title": title, "columns": columns });
        self.send_typed(ApiVersion::V1, Method::POST, &path, &[], Some(&body))
            .await
    }

    /// # Errors
    /// Returns an error if the request fails after retries
    pub async fn list_tables(&self, project_id: &str) -> MigrationResult<Vec<NocoTable>> {
        let path = format!("/db/meta/projects/{project_id}/tables");
        let response: ListResponse<NocoTable> =
            self.send_typed(ApiVersion::V1, Method::GET, &path, &[], None).await?;
        Ok(response.list)
    }

    /// Table metadata including its columns
    ///
    /// # Errors
    /// Returns an error if the request fails after retries
    pub async fn get_table(&self, table_id: &str) -> MigrationResult<NocoTable> {
        let path = format!("/db/meta/tables/{table_id}");
        self.send_typed(ApiVersion::V1, Method::GET, &path, &[], None).await
    }

    // === Columns (v1 meta) ===

    /// # Errors
    /// Returns an error if the request fails after retries
    pub async fn create_column(
        &self,
        table_id: &str,
        column: &ColumnDefinition,
    ) -> MigrationResult<Value> {
        debug!("Creating column: {}", column.column_name);
        let path = format!("/db/meta/tables/{table_id}/columns");
        let body = serde_json::to_value(column)?;
        self.send(ApiVersion::V1, Method::POST, &path, &[], Some(&body))
            .await
    }

    /// Columns of a table, read from the table metadata
    ///
    /// # Errors
    /// Returns an error if the request fails after retries
    pub async fn list_columns(&self, table_id: &str) -> MigrationResult<Vec<NocoColumn>> {
        Ok(self.get_table(table_id).await?.columns)
    }

    /// Patch column metadata (`title`, `order`, ...)
    ///
    /// # Errors
    /// Returns an error if the request fails after retries
    pub async fn update_column(&self, column_id: &str, patch: &Value) -> MigrationResult<Value> {
        let path = format!("/db/meta/columns/{column_id}");
        self.send(ApiVersion::V1, Method::PATCH, &path, &[], Some(patch))
            .await
    }

    // === Records (v1 data) ===

    /// # Errors
    /// Returns an error if the request fails after retries
    pub async fn create_record(
        &self,
        project_id: &str,
        table_name: &str,
        record: &NocoRecord,
    ) -> MigrationResult<Value> {
        let path = data_path("/db/data/noco", project_id, table_name);
        let body = Value::Object(record.clone());
        self.send(ApiVersion::V1, Method::POST, &path, &[], Some(&body))
            .await
    }

    /// # Errors
    /// Returns an error if the request fails after retries
    pub async fn bulk_create_records(
        &self,
        project_id: &str,
        table_name: &str,
        records: &[NocoRecord],
    ) -> MigrationResult<Value> {
        debug!("Bulk creating {} records in {table_name}", records.len());
        let path = data_path("/db/data/bulk/noco", project_id, table_name);
        let body = serde_json::to_value(records)?;
        self.send(ApiVersion::V1, Method::POST, &path, &[], Some(&body))
            .await
    }

    /// One page of records plus paging info
    ///
    /// # Errors
    /// Returns an error if the request fails after retries
    pub async fn list_records(
        &self,
        project_id: &str,
        table_name: &str,
        limit: u32,
        offset: u32,
        filter: Option<&str>,
    ) -> MigrationResult<ListResponse<NocoRecord>> {
        let path = data_path("/db/data/noco", project_id, table_name);
        let mut query = vec![("limit", limit.to_string()), ("offset", offset.to_string())];
        if let Some(filter) = filter {
            query.push(("where", filter.to_string()));
        }
        self.send_typed(ApiVersion::V1, Method::GET, &path, &query, None)
            .await
    }

    /// # Errors
    /// Returns an error if the request fails after retries
    pub async fn update_record(
        &self,
        project_id: &str,
        table_name: &str,
        record_id: &str,
        data: &NocoRecord,
    ) -> MigrationResult<Value> {
        let path = format!("{}/{record_id}", data_path("/db/data/noco", project_id, table_name));
        let body = Value::Object(data.clone());
        self.send(ApiVersion::V1, Method::PATCH, &path, &[], Some(&body))
            .await
    }

    /// # Errors
    /// Returns an error if the request fails after retries
    pub async fn delete_record(
        &self,
        project_id: &str,
        table_name: &str,
        record_id: &str,
    ) -> MigrationResult<()> {
        let path = format!("{}/{record_id}", data_path("/db/data/noco", project_id, table_name));
        self.send(ApiVersion::V1, Method::DELETE, &path, &[], None)
            .await
            .map(|_| ())
    }

    // === v2 ===

    /// Tables of a base (v2 meta)
    ///
    /// # Errors
    /// Returns an error if the request fails after retries
    pub async fn list_base_tables(&self, base_id: &str) -> MigrationResult<Vec<NocoTable>> {
        let path = format!("/meta/bases/{base_id}/tables");
        let response: ListResponse<NocoTable> =
            self.send_typed(ApiVersion::V2, Method::GET, &path, &[], None).await?;
        Ok(response.list)
    }

    /// Resolve a table id from its title
    ///
    /// # Errors
    /// Returns `MigrationError::TableNotFound` if no table has that title
    pub async fn find_table_id(&self, base_id: &str, title: &str) -> MigrationResult<String> {
        self.list_base_tables(base_id)
            .await?
            .into_iter()
            .find(|table| table.title == title)
            .map(|table| table.id)
            .ok_or_else(|| MigrationError::TableNotFound {
                table: title.to_string(),
                base: base_id.to_string(),
            })
    }

    /// Table metadata including columns (v2 meta)
    ///
    /// # Errors
    /// Returns an error if the request fails after retries
    pub async fn get_table_v2(&self, table_id: &str) -> MigrationResult<NocoTable> {
        let path = format!("/meta/tables/{table_id}");
        self.send_typed(ApiVersion::V2, Method::GET, &path, &[], None).await
    }

    /// # Errors
    /// Returns an error if the request fails after retries
    pub async fn list_table_records(
        &self,
        table_id: &str,
        limit: u32,
    ) -> MigrationResult<Vec<NocoRecord>> {
        let path = format!("/tables/{table_id}/records");
        let query = [("limit", limit.to_string())];
        let response: ListResponse<NocoRecord> = self
            .send_typed(ApiVersion::V2, Method::GET, &path, &query, None)
            .await?;
        Ok(response.list)
    }

    /// # Errors
    /// Returns an error if the request fails after retries
    pub async fn insert_table_records(
        &self,
        table_id: &str,
        records: &[NocoRecord],
    ) -> MigrationResult<Value> {
        let path = format!("/tables/{table_id}/records");
        let body = serde_json::to_value(records)?;
        self.send(ApiVersion::V2, Method::POST, &path, &[], Some(&body))
            .await
    }

    /// Delete records by primary key; the body is `[{"Id": ..}, ...]`
    ///
    /// # Errors
    /// Returns an error if the request fails after retries
    pub async fn delete_table_records(&self, table_id: &str, ids: &[Value]) -> MigrationResult<Value> {
        let path = format!("/tables/{table_id}/records");
        let body = Value::Array(ids.iter().map(|id| json!({ "Id": id })).collect());
        self.send(ApiVersion::V2, Method::DELETE, &path, &[], Some(&body))
            .await
    }

    /// # Errors
    /// Returns an error if the request fails after retries
    pub async fn count_table_records(&self, table_id: &str) -> MigrationResult<u64> {
        let path = format!("/tables/{table_id}/records/count");
        let response: CountResponse =
            self.send_typed(ApiVersion::V2, Method::GET, &path, &[], None).await?;
        Ok(response.count)
    }

    // === plumbing ===

    async fn send_typed<T: DeserializeOwned>(
        &self,
        version: ApiVersion,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> MigrationResult<T> {
        let value = self.send(version, method, path, query, body).await?;
        serde_json::from_value(value).map_err(|e| MigrationError::unexpected(path, e.to_string()))
    }

    async fn send(
        &self,
        version: ApiVersion,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> MigrationResult<Value> {
        let url = format!("{}{}{path}", self.base_url, version.prefix());
        let url = url.as_str();
        let label = format!("NocoDB {method} {path}");
        let method = &method;

        self.retry
            .run(&label, move || async move {
                let mut request = self
                    .http
                    .request(method.clone(), url)
                    .header("xc-token", &self.token)
                    .query(query);
                if let Some(body) = body {
                    request = request.json(body);
                }

                let response = request.send().await?;
                let status = response.status();
                let text = response.text().await?;

                if !status.is_success() {
                    let body = error_body(&text);
                    error!("NocoDB error response ({status}): {body}");
                    return Err(MigrationError::Api {
                        service: "NocoDB",
                        method: method.to_string(),
                        path: path.to_string(),
                        status: status.as_u16(),
                        body,
                    });
                }

                Ok(parse_body(&text))
            })
            .await
    }
}

/// v1 data paths address tables by (URL encoded) name
fn data_path(prefix: &str, project_id: &str, table_name: &str) -> String {
    format!("{prefix}/{project_id}/{}", urlencoding::encode(table_name))
}

/// Success bodies: JSON when possible, raw text otherwise, `null` when empty
fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Error bodies: compact JSON when possible, otherwise the first 500 chars
fn error_body(text: &str) -> String {
    serde_json::from_str::<Value>(text).map_or_else(
        |_| text.chars().take(ERROR_BODY_LIMIT).collect(),
        |json| json.to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_path_encodes_japanese_titles() {
        assert_eq!(
            data_path("/db/data/noco", "p1", "BAAO_要求"),
            "/db/data/noco/p1/BAAO_%E8%A6%81%E6%B1%82"
        );
    }

    #[test]
    fn test_parse_body_variants() {
        assert_eq!(parse_body(""), Value::Null);
        assert_eq!(parse_body("3"), json!(3));
        assert_eq!(parse_body("ok"), json!("ok"));
    }

    #[test]
    fn test_error_body_truncates_text() {
        let long = "x".repeat(2000);
        assert_eq!(error_body(&long).len(), ERROR_BODY_LIMIT);
        assert_eq!(error_body(r#"{"msg": "bad"}"#), r#"{"msg":"bad"}"#);
    }
}
