//! Airtable table definitions to NocoDB column payloads
//!
//! Only the shape is translated here. Anything that cannot be created
//! automatically comes back as a [`ManualField`] so it ends up in the report.

use serde::Serialize;
use serde_json::{Map, Value, json};

use super::field_types::{AirtableFieldType, Uidt, mapping_for};
use crate::airtable::{AirtableField, AirtableTable};

/// Airtable field names that collide with NocoDB's synthetic primary key
const RESERVED_ID_NAMES: [&str; 2] = ["ID", "id"];

/// Formula fields with these names hold business identifiers and are kept as text
const ID_LIKE_FORMULA_NAMES: [&str; 6] = ["ID", "id", "番号", "No", "NO", "Number"];

/// Neutral grey used for every migrated select option
const SELECT_OPTION_COLOR: &str = "#808080";

const DEFAULT_CURRENCY_LOCALE: &str = "en-US";
const DEFAULT_CURRENCY_CODE: &str = "USD";
const DEFAULT_DATE_FORMAT: &str = "YYYY-MM-DD";
const DEFAULT_TIME_FORMAT: &str = "HH:mm";
const DEFAULT_RATING_MAX: u64 = 5;

/// Column payload for `POST /api/v1/db/meta/tables/{id}/columns`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDefinition {
    pub column_name: String,
    pub title: String,
    pub uidt: Uidt,
    pub rqd: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub pk: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub ai: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dtxp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
    #[serde(rename = "colOptions", skip_serializing_if = "Option::is_none")]
    pub col_options: Option<Value>,
}

impl ColumnDefinition {
    pub fn new(title: impl Into<String>, uidt: Uidt) -> Self {
        let title = title.into();
        Self {
            column_name: sanitize_column_name(&title),
            title,
            uidt,
            rqd: false,
            pk: false,
            ai: false,
            dtxp: None,
            meta: None,
            col_options: None,
        }
    }

    /// The only column a freshly created table gets: auto-increment `id`
    pub fn primary_key() -> Self {
        Self {
            column_name: "id".to_string(),
            title: "ID".to_string(),
            uidt: Uidt::ID,
            rqd: true,
            pk: true,
            ai: true,
            dtxp: None,
            meta: None,
            col_options: None,
        }
    }
}

/// A field that needs a human to recreate it in NocoDB
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManualField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub reason: String,
}

/// Formula text preserved for manual conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormulaField {
    pub table: String,
    pub field_name: String,
    pub formula: String,
    pub notes: String,
}

/// Outcome of mapping one field
#[derive(Debug, Clone, PartialEq)]
pub enum MappedField {
    Column(ColumnDefinition),
    Manual(ManualField),
}

/// Everything needed to recreate one Airtable table
#[derive(Debug, Clone, Serialize)]
pub struct TableSchemaPlan {
    pub title: String,
    pub columns: Vec<ColumnDefinition>,
    pub manual_fields: Vec<ManualField>,
    pub formula_fields: Vec<FormulaField>,
}

/// Title a field gets in NocoDB (`ID` becomes `Airtable_ID`)
pub fn nocodb_field_title(name: &str) -> String {
    if RESERVED_ID_NAMES.contains(&name) {
        format!("Airtable_{name}")
    } else {
        name.to_string()
    }
}

/// Map one Airtable field
pub fn map_field(field: &AirtableField) -> MappedField {
    let title = nocodb_field_title(&field.name);

    if field.field_type == AirtableFieldType::Formula
        && ID_LIKE_FORMULA_NAMES.contains(&field.name.as_str())
    {
        tracing::debug!("ID-like formula field kept as text: {}", field.name);
        return MappedField::Column(ColumnDefinition::new(title, Uidt::SingleLineText));
    }

    let mapping = mapping_for(&field.field_type);
    let uidt = match mapping.uidt {
        Some(uidt) if mapping.auto_migrate => uidt,
        _ => {
            let mut reason = mapping.notes.to_string();
            if field.field_type == AirtableFieldType::Rollup {
                if let Some(function) = rollup_function_of(field) {
                    reason = format!("{reason} (NocoDB rollup: {})", map_rollup_function(&function));
                }
            }
            return MappedField::Manual(ManualField {
                name: field.name.clone(),
                field_type: field.field_type.to_string(),
                reason,
            });
        }
    };

    let mut column = ColumnDefinition::new(title, uidt);
    match field.field_type {
        AirtableFieldType::SingleSelect | AirtableFieldType::MultipleSelects => {
            column.col_options = select_options(field);
        }
        AirtableFieldType::Number | AirtableFieldType::Percent => {
            column.dtxp = Some(precision(field, 0).to_string());
        }
        AirtableFieldType::Currency => {
            column.dtxp = Some(precision(field, 2).to_string());
            column.meta = Some(json!({
                "currency_locale": DEFAULT_CURRENCY_LOCALE,
                "currency_code": DEFAULT_CURRENCY_CODE,
            }));
        }
        AirtableFieldType::Date => {
            column.meta = Some(json!({ "date_format": date_format(field) }));
        }
        AirtableFieldType::DateTime => {
            column.meta = Some(json!({
                "date_format": date_format(field),
                "time_format": time_format(field),
            }));
        }
        AirtableFieldType::Rating => {
            let max = field
                .option("max")
                .and_then(Value::as_u64)
                .unwrap_or(DEFAULT_RATING_MAX);
            column.meta = Some(json!({ "max": max }));
        }
        _ => {}
    }

    MappedField::Column(column)
}

/// Map a whole table, collecting manual and formula fields along the way
pub fn map_table(table: &AirtableTable) -> TableSchemaPlan {
    let mut columns = Vec::new();
    let mut manual_fields = Vec::new();
    let mut formula_fields = Vec::new();

    for field in &table.fields {
        if field.field_type == AirtableFieldType::Formula {
            formula_fields.push(FormulaField {
                table: table.name.clone(),
                field_name: field.name.clone(),
                formula: field
                    .option("formula")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                notes: "Convert Airtable formula syntax to NocoDB formula syntax".to_string(),
            });
        }

        match map_field(field) {
            MappedField::Column(column) => columns.push(column),
            MappedField::Manual(manual) => {
                tracing::debug!(
                    "Field '{}' ({}) needs manual migration: {}",
                    manual.name,
                    manual.field_type,
                    manual.reason
                );
                manual_fields.push(manual);
            }
        }
    }

    TableSchemaPlan {
        title: table.name.clone(),
        columns,
        manual_fields,
        formula_fields,
    }
}

/// Translate an Airtable rollup aggregate to the closest NocoDB function
pub fn map_rollup_function(airtable_function: &str) -> &'static str {
    match airtable_function.to_ascii_lowercase().as_str() {
        "sum" => "sum",
        "average" | "avg" => "avg",
        "count" | "countall" | "arrayflatten" | "arrayunique" | "arraycompact" | "and" | "or"
        | "xor" => "count",
        "max" => "max",
        "min" => "min",
        _ => "sum",
    }
}

/// Make a title safe as a physical column name
///
/// Spaces become underscores, anything that is not alphanumeric (Unicode
/// aware) or `_` is dropped, and a leading digit (any script) gets an `_` prefix.
pub fn sanitize_column_name(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| if c == ' ' { '_' } else { c })
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect();

    match sanitized.chars().next() {
        None => "field".to_string(),
        Some(first) if first.is_numeric() => format!("_{sanitized}"),
        Some(_) => sanitized,
    }
}

fn select_options(field: &AirtableField) -> Option<Value> {
    let choices = field.option("choices").and_then(Value::as_array)?;
    let options: Vec<Value> = choices
        .iter()
        .filter_map(|choice| choice.get("name").and_then(Value::as_str))
        .map(|name| json!({ "title": name, "color": SELECT_OPTION_COLOR }))
        .collect();

    if options.is_empty() {
        None
    } else {
        let mut col_options = Map::new();
        col_options.insert("options".to_string(), Value::Array(options));
        Some(Value::Object(col_options))
    }
}

fn precision(field: &AirtableField, default: u64) -> u64 {
    field
        .option("precision")
        .and_then(Value::as_u64)
        .unwrap_or(default)
}

fn date_format(field: &AirtableField) -> String {
    nested_format(field, "dateFormat").unwrap_or_else(|| DEFAULT_DATE_FORMAT.to_string())
}

fn time_format(field: &AirtableField) -> String {
    nested_format(field, "timeFormat").unwrap_or_else(|| DEFAULT_TIME_FORMAT.to_string())
}

fn nested_format(field: &AirtableField, key: &str) -> Option<String> {
    field
        .option(key)
        .and_then(|format| format.get("format"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Aggregate name of a rollup, from `options.formula` such as `SUM(values)`
fn rollup_function_of(field: &AirtableField) -> Option<String> {
    let formula = field.option("formula").and_then(Value::as_str)?;
    let name = formula.split('(').next()?.trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expect_column(mapped: MappedField) -> ColumnDefinition {
        match mapped {
            MappedField::Column(column) => column,
            MappedField::Manual(manual) => panic!("expected a column, got {manual:?}"),
        }
    }

    #[test]
    fn test_single_select_options() {
        let field = AirtableField::new("Stage", "singleSelect").with_options(json!({
            "choices": [{"id": "s1", "name": "Lead"}, {"id": "s2", "name": "Won"}]
        }));

        let column = expect_column(map_field(&field));
        assert_eq!(column.uidt, Uidt::SingleSelect);
        assert_eq!(
            column.col_options,
            Some(json!({"options": [
                {"title": "Lead", "color": "#808080"},
                {"title": "Won", "color": "#808080"}
            ]}))
        );
    }

    #[test]
    fn test_select_without_choices_has_no_options() {
        let field = AirtableField::new("Tags", "multipleSelects");
        let column = expect_column(map_field(&field));
        assert_eq!(column.uidt, Uidt::MultiSelect);
        assert!(column.col_options.is_none());
    }

    #[test]
    fn test_numeric_precision() {
        let cases = [
            (AirtableField::new("Qty", "number"), "0"),
            (
                AirtableField::new("Rate", "percent").with_options(json!({"precision": 1})),
                "1",
            ),
            (AirtableField::new("Price", "currency"), "2"),
            (
                AirtableField::new("Price", "currency").with_options(json!({"precision": 0})),
                "0",
            ),
        ];

        for (field, expected) in cases {
            let column = expect_column(map_field(&field));
            assert_eq!(column.dtxp.as_deref(), Some(expected), "{}", field.name);
        }
    }

    #[test]
    fn test_currency_meta() {
        let column = expect_column(map_field(&AirtableField::new("Price", "currency")));
        assert_eq!(
            column.meta,
            Some(json!({"currency_locale": "en-US", "currency_code": "USD"}))
        );
    }

    #[test]
    fn test_date_formats() {
        let date = expect_column(map_field(
            &AirtableField::new("Due", "date")
                .with_options(json!({"dateFormat": {"name": "iso", "format": "YYYY/MM/DD"}})),
        ));
        assert_eq!(date.meta, Some(json!({"date_format": "YYYY/MM/DD"})));

        let date_time = expect_column(map_field(&AirtableField::new("At", "dateTime")));
        assert_eq!(
            date_time.meta,
            Some(json!({"date_format": "YYYY-MM-DD", "time_format": "HH:mm"}))
        );
    }

    #[test]
    fn test_rating_max() {
        let default = expect_column(map_field(&AirtableField::new("Stars", "rating")));
        assert_eq!(default.meta, Some(json!({"max": 5})));

        let ten = expect_column(map_field(
            &AirtableField::new("Stars", "rating").with_options(json!({"max": 10})),
        ));
        assert_eq!(ten.meta, Some(json!({"max": 10})));
    }

    #[test]
    fn test_id_fields_are_renamed() {
        let column = expect_column(map_field(&AirtableField::new("ID", "singleLineText")));
        assert_eq!(column.title, "Airtable_ID");
        assert_eq!(column.column_name, "Airtable_ID");

        let lower = column_title(&AirtableField::new("id", "number"));
        assert_eq!(lower, "Airtable_id");
    }

    fn column_title(field: &AirtableField) -> String {
        expect_column(map_field(field)).title
    }

    #[test]
    fn test_id_like_formula_becomes_text() {
        for name in ID_LIKE_FORMULA_NAMES {
            let column = expect_column(map_field(&AirtableField::new(name, "formula")));
            assert_eq!(column.uidt, Uidt::SingleLineText, "{name}");
        }

        let other = map_field(&AirtableField::new("Total", "formula"));
        assert!(matches!(other, MappedField::Manual(_)));
    }

    #[test]
    fn test_manual_fields_carry_reasons() {
        let rollup = AirtableField::new("Avg score", "rollup")
            .with_options(json!({"formula": "AVERAGE(values)"}));
        match map_field(&rollup) {
            MappedField::Manual(manual) => {
                assert_eq!(manual.field_type, "rollup");
                assert!(manual.reason.contains("avg"));
            }
            MappedField::Column(_) => panic!("rollup should be manual"),
        }

        let unknown = map_field(&AirtableField::new("Odd", "quantumField"));
        assert!(matches!(unknown, MappedField::Manual(m) if m.field_type == "quantumField"));
    }

    #[test]
    fn test_map_table_collects_formulas() {
        let table = AirtableTable {
            id: "tbl1".to_string(),
            name: "案件".to_string(),
            primary_field_id: None,
            fields: vec![
                AirtableField::new("Name", "singleLineText"),
                AirtableField::new("番号", "formula")
                    .with_options(json!({"formula": "RECORD_ID()"})),
                AirtableField::new("Margin", "formula")
                    .with_options(json!({"formula": "{Price} - {Cost}"})),
                AirtableField::new("Client", "multipleRecordLinks"),
            ],
        };

        let plan = map_table(&table);
        assert_eq!(plan.title, "案件");
        assert_eq!(plan.columns.len(), 2);
        assert_eq!(plan.manual_fields.len(), 2);
        assert_eq!(plan.formula_fields.len(), 2);
        assert_eq!(plan.formula_fields[1].formula, "{Price} - {Cost}");
    }

    #[test]
    fn test_rollup_function_table() {
        let cases = [
            ("sum", "sum"),
            ("average", "avg"),
            ("count", "count"),
            ("countAll", "count"),
            ("arrayUnique", "count"),
            ("max", "max"),
            ("min", "min"),
            ("xor", "count"),
            ("CONCATENATE", "sum"),
        ];
        for (airtable, nocodb) in cases {
            assert_eq!(map_rollup_function(airtable), nocodb, "{airtable}");
        }
    }

    #[test]
    fn test_sanitize_column_name() {
        let cases = [
            ("Deal Name", "Deal_Name"),
            ("2024 Revenue", "_2024_Revenue"),
            ("１月売上", "_１月売上"),
            ("顧客 名", "顧客_名"),
            ("Price ($)", "Price_"),
            ("!!!", "field"),
        ];
        for (input, expected) in cases {
            assert_eq!(sanitize_column_name(input), expected, "{input}");
        }
    }

    #[test]
    fn test_primary_key_payload() {
        let value = serde_json::to_value(ColumnDefinition::primary_key()).unwrap();
        assert_eq!(
            value,
            json!({"column_name": "id", "title": "ID", "uidt": "ID", "rqd": true, "pk": true, "ai": true})
        );
    }
}
