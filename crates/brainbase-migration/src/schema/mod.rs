//! Airtable to NocoDB schema translation

pub mod field_types;
pub mod mapper;

pub use field_types::{AirtableFieldType, FieldMapping, Uidt, mapping_for};
pub use mapper::{
    ColumnDefinition, FormulaField, ManualField, MappedField, TableSchemaPlan, map_field,
    map_rollup_function, map_table, nocodb_field_title, sanitize_column_name,
};
