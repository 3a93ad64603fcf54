//! Airtable API payloads

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::schema::AirtableFieldType;

/// Table definition from the metadata API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirtableTable {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub primary_field_id: Option<String>,
    #[serde(default)]
    pub fields: Vec<AirtableField>,
}

/// Field definition; `options` is type specific and kept raw
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirtableField {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: AirtableFieldType,
    #[serde(default)]
    pub options: Option<Value>,
}

impl AirtableField {
    pub fn new(name: impl Into<String>, field_type: impl Into<AirtableFieldType>) -> Self {
        Self {
            id: None,
            name: name.into(),
            field_type: field_type.into(),
            options: None,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: Value) -> Self {
        self.options = Some(options);
        self
    }

    /// Read `options.<key>`
    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options.as_ref().and_then(|options| options.get(key))
    }
}

/// A single row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirtableRecord {
    pub id: String,
    #[serde(default)]
    pub created_time: Option<String>,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListTablesResponse {
    #[serde(default)]
    pub tables: Vec<AirtableTable>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListRecordsResponse {
    #[serde(default)]
    pub records: Vec<AirtableRecord>,
    #[serde(default)]
    pub offset: Option<String>,
}
