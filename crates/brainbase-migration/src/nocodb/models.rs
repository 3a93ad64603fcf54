//! NocoDB API payloads
//!
//! Only the fields the tools read are modelled; everything else is ignored.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A NocoDB project (called "base" in the v2 API)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NocoProject {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Table metadata; `columns` is only filled by the single-table endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NocoTable {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub table_name: Option<String>,
    #[serde(default)]
    pub columns: Vec<NocoColumn>,
}

/// Column metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NocoColumn {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub column_name: Option<String>,
    #[serde(default)]
    pub uidt: String,
    /// Physical data type (`bigint`, `varchar`, ...)
    #[serde(default)]
    pub dt: Option<String>,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub pk: bool,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub system: bool,
    #[serde(default)]
    pub order: Option<f64>,
}

impl NocoColumn {
    /// Name used for title lookups (`column_name` wins when present)
    pub fn physical_name(&self) -> &str {
        self.column_name.as_deref().unwrap_or(&self.title)
    }
}

/// `{ "list": [...], "pageInfo": {...} }` envelope
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub list: Vec<T>,
    #[serde(default, rename = "pageInfo")]
    pub page_info: Option<PageInfo>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub total_rows: Option<u64>,
    #[serde(default)]
    pub is_last_page: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CountResponse {
    pub count: u64,
}

/// NocoDB reports booleans as `true`, `1` or `null` depending on the backing database
fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_i64().is_some_and(|n| n != 0),
        Value::String(s) => matches!(s.as_str(), "1" | "true"),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_flags_accept_ints_and_nulls() {
        let columns: Vec<NocoColumn> = serde_json::from_value(serde_json::json!([
            {"id": "c1", "title": "ID", "column_name": "id", "uidt": "ID", "pk": 1, "system": 0},
            {"id": "c2", "title": "CreatedAt", "column_name": "created_at", "uidt": "CreatedTime", "system": true, "pk": null},
            {"id": "c3", "title": "Amount", "uidt": "Number", "dt": "bigint"}
        ]))
        .unwrap();

        assert!(columns[0].pk && !columns[0].system);
        assert!(columns[1].system && !columns[1].pk);
        assert_eq!(columns[2].dt.as_deref(), Some("bigint"));
        assert_eq!(columns[2].physical_name(), "Amount");
    }

    #[test]
    fn test_list_envelope() {
        let response: ListResponse<NocoProject> = serde_json::from_str(
            r#"{"list": [{"id": "p1", "title": "BAAO"}], "pageInfo": {"totalRows": 1, "isLastPage": true}}"#,
        )
        .unwrap();
        assert_eq!(response.list.len(), 1);
        assert_eq!(response.page_info.and_then(|p| p.total_rows), Some(1));
    }
}
