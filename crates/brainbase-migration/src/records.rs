//! Airtable record to NocoDB row conversion

use std::collections::HashSet;

use serde_json::{Map, Number, Value};

use crate::airtable::AirtableRecord;
use crate::nocodb::{NocoColumn, NocoRecord};
use crate::schema::{Uidt, nocodb_field_title};

/// Airtable link values are arrays of record ids (`recXXXXXXXXXXXXXX`)
const RECORD_ID_PREFIX: &str = "rec";

/// True for a non-empty array whose elements are all record-id strings
pub fn is_linked_records(value: &Value) -> bool {
    match value {
        Value::Array(items) => {
            !items.is_empty()
                && items
                    .iter()
                    .all(|item| item.as_str().is_some_and(|s| s.starts_with(RECORD_ID_PREFIX)))
        }
        _ => false,
    }
}

/// Pass fields through 1:1, dropping link fields and renaming `ID`/`id`
pub fn convert_record(record: &AirtableRecord) -> NocoRecord {
    record
        .fields
        .iter()
        .filter(|(_, value)| !is_linked_records(value))
        .map(|(name, value)| (nocodb_field_title(name), value.clone()))
        .collect()
}

/// Which keys an existing NocoDB table accepts
///
/// Used when inserting into tables created by an earlier run, whose columns
/// may not match the Airtable schema any more.
#[derive(Debug, Clone, Default)]
pub struct ColumnFilter {
    pub valid_columns: HashSet<String>,
    /// Columns whose physical type is `bigint`; floats are rounded for them
    pub bigint_columns: HashSet<String>,
}

impl ColumnFilter {
    /// Build from table columns, skipping the primary key and the columns
    /// NocoDB maintains itself
    pub fn from_columns(columns: &[NocoColumn]) -> Self {
        let mut filter = Self::default();
        for column in columns
            .iter()
            .filter(|c| !c.pk && !Uidt::is_system_name(&c.uidt))
        {
            filter.valid_columns.insert(column.title.clone());
            if column.dt.as_deref() == Some("bigint") {
                filter.bigint_columns.insert(column.title.clone());
            }
        }
        filter
    }

    /// Rename `ID`/`id`, keep known columns only, drop link fields and
    /// coerce bigint values
    pub fn apply(&self, fields: &Map<String, Value>) -> NocoRecord {
        fields
            .iter()
            .filter(|(_, value)| !is_linked_records(value))
            .map(|(name, value)| (nocodb_field_title(name), value))
            .filter(|(title, _)| self.valid_columns.contains(title.as_str()))
            .map(|(title, value)| {
                let value = if self.bigint_columns.contains(title.as_str()) {
                    round_to_integer(value)
                } else {
                    value.clone()
                };
                (title, value)
            })
            .collect()
    }
}

#[allow(clippy::cast_possible_truncation)]
fn round_to_integer(value: &Value) -> Value {
    match value.as_f64() {
        Some(f) if !value.is_i64() && !value.is_u64() => {
            Value::Number(Number::from(f.round() as i64))
        }
        _ => value.clone(),
    }
}
