//! Airtable field types, NocoDB UI data types and the static table between them

use std::fmt;

use serde::{Deserialize, Serialize};

/// Airtable field type as reported by the metadata API
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AirtableFieldType {
    SingleLineText,
    MultilineText,
    RichText,
    Email,
    Url,
    PhoneNumber,
    Number,
    Percent,
    Currency,
    SingleSelect,
    MultipleSelects,
    Date,
    DateTime,
    Checkbox,
    Rating,
    Duration,
    MultipleAttachments,
    MultipleRecordLinks,
    Lookup,
    MultipleLookupValues,
    Rollup,
    Count,
    Formula,
    AutoNumber,
    Barcode,
    CreatedTime,
    LastModifiedTime,
    CreatedBy,
    LastModifiedBy,
    SingleCollaborator,
    MultipleCollaborators,
    Button,
    AiText,
    ExternalSyncSource,
    /// Anything Airtable adds later
    Unknown(String),
}

impl AirtableFieldType {
    /// Wire name used by the Airtable API
    pub fn as_str(&self) -> &str {
        match self {
            Self::SingleLineText => "singleLineText",
            Self::MultilineText => "multilineText",
            Self::RichText => "richText",
            Self::Email => "email",
            Self::Url => "url",
            Self::PhoneNumber => "phoneNumber",
            Self::Number => "number",
            Self::Percent => "percent",
            Self::Currency => "currency",
            Self::SingleSelect => "singleSelect",
            Self::MultipleSelects => "multipleSelects",
            Self::Date => "date",
            Self::DateTime => "dateTime",
            Self::Checkbox => "checkbox",
            Self::Rating => "rating",
            Self::Duration => "duration",
            Self::MultipleAttachments => "multipleAttachments",
            Self::MultipleRecordLinks => "multipleRecordLinks",
            Self::Lookup => "lookup",
            Self::MultipleLookupValues => "multipleLookupValues",
            Self::Rollup => "rollup",
            Self::Count => "count",
            Self::Formula => "formula",
            Self::AutoNumber => "autoNumber",
            Self::Barcode => "barcode",
            Self::CreatedTime => "createdTime",
            Self::LastModifiedTime => "lastModifiedTime",
            Self::CreatedBy => "createdBy",
            Self::LastModifiedBy => "lastModifiedBy",
            Self::SingleCollaborator => "singleCollaborator",
            Self::MultipleCollaborators => "multipleCollaborators",
            Self::Button => "button",
            Self::AiText => "aiText",
            Self::ExternalSyncSource => "externalSyncSource",
            Self::Unknown(name) => name,
        }
    }
}

impl From<&str> for AirtableFieldType {
    fn from(value: &str) -> Self {
        match value {
            "singleLineText" => Self::SingleLineText,
            "multilineText" => Self::MultilineText,
            "richText" => Self::RichText,
            "email" => Self::Email,
            "url" => Self::Url,
            "phoneNumber" => Self::PhoneNumber,
            "number" => Self::Number,
            "percent" => Self::Percent,
            "currency" => Self::Currency,
            "singleSelect" => Self::SingleSelect,
            "multipleSelects" => Self::MultipleSelects,
            "date" => Self::Date,
            "dateTime" => Self::DateTime,
            "checkbox" => Self::Checkbox,
            "rating" => Self::Rating,
            "duration" => Self::Duration,
            "multipleAttachments" => Self::MultipleAttachments,
            "multipleRecordLinks" => Self::MultipleRecordLinks,
            "lookup" => Self::Lookup,
            "multipleLookupValues" => Self::MultipleLookupValues,
            "rollup" => Self::Rollup,
            "count" => Self::Count,
            "formula" => Self::Formula,
            "autoNumber" => Self::AutoNumber,
            "barcode" => Self::Barcode,
            "createdTime" => Self::CreatedTime,
            "lastModifiedTime" => Self::LastModifiedTime,
            "createdBy" => Self::CreatedBy,
            "lastModifiedBy" => Self::LastModifiedBy,
            "singleCollaborator" => Self::SingleCollaborator,
            "multipleCollaborators" => Self::MultipleCollaborators,
            "button" => Self::Button,
            "aiText" => Self::AiText,
            "externalSyncSource" => Self::ExternalSyncSource,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl From<String> for AirtableFieldType {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<AirtableFieldType> for String {
    fn from(value: AirtableFieldType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for AirtableFieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// NocoDB UI data type (`uidt`), spelled as NocoDB spells it
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Uidt {
    ID,
    SingleLineText,
    LongText,
    Email,
    URL,
    PhoneNumber,
    Number,
    Decimal,
    Percent,
    Currency,
    SingleSelect,
    MultiSelect,
    Date,
    DateTime,
    Checkbox,
    Rating,
    Duration,
    Attachment,
    LinkToAnotherRecord,
    Lookup,
    Rollup,
    Count,
    Formula,
    CreatedTime,
    LastModifiedTime,
    CreatedBy,
    LastModifiedBy,
    User,
    Order,
}

impl Uidt {
    /// Columns NocoDB maintains itself; never written by inserts
    pub const SYSTEM: [Self; 5] = [
        Self::CreatedTime,
        Self::LastModifiedTime,
        Self::CreatedBy,
        Self::LastModifiedBy,
        Self::Order,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ID => "ID",
            Self::SingleLineText => "SingleLineText",
            Self::LongText => "LongText",
            Self::Email => "Email",
            Self::URL => "URL",
            Self::PhoneNumber => "PhoneNumber",
            Self::Number => "Number",
            Self::Decimal => "Decimal",
            Self::Percent => "Percent",
            Self::Currency => "Currency",
            Self::SingleSelect => "SingleSelect",
            Self::MultiSelect => "MultiSelect",
            Self::Date => "Date",
            Self::DateTime => "DateTime",
            Self::Checkbox => "Checkbox",
            Self::Rating => "Rating",
            Self::Duration => "Duration",
            Self::Attachment => "Attachment",
            Self::LinkToAnotherRecord => "LinkToAnotherRecord",
            Self::Lookup => "Lookup",
            Self::Rollup => "Rollup",
            Self::Count => "Count",
            Self::Formula => "Formula",
            Self::CreatedTime => "CreatedTime",
            Self::LastModifiedTime => "LastModifiedTime",
            Self::CreatedBy => "CreatedBy",
            Self::LastModifiedBy => "LastModifiedBy",
            Self::User => "User",
            Self::Order => "Order",
        }
    }

    /// Whether a column with this wire `uidt` is maintained by NocoDB
    pub fn is_system_name(uidt: &str) -> bool {
        Self::SYSTEM.iter().any(|system| system.as_str() == uidt)
    }
}

impl fmt::Display for Uidt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the mapping table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldMapping {
    pub airtable: AirtableFieldType,
    /// Target type; `None` when NocoDB has no equivalent
    pub uidt: Option<Uidt>,
    /// Whether the column is created automatically
    pub auto_migrate: bool,
    pub notes: &'static str,
}

impl FieldMapping {
    fn auto(airtable: AirtableFieldType, uidt: Uidt) -> Self {
        Self {
            airtable,
            uidt: Some(uidt),
            auto_migrate: true,
            notes: "",
        }
    }

    fn manual(airtable: AirtableFieldType, uidt: Option<Uidt>, notes: &'static str) -> Self {
        Self {
            airtable,
            uidt,
            auto_migrate: false,
            notes,
        }
    }
}

/// Look up how an Airtable field type is carried over
pub fn mapping_for(field_type: &AirtableFieldType) -> FieldMapping {
    use AirtableFieldType as A;

    let airtable = field_type.clone();
    match field_type {
        A::SingleLineText | A::AutoNumber | A::Barcode => {
            FieldMapping::auto(airtable, Uidt::SingleLineText)
        }
        A::MultilineText | A::RichText | A::AiText => FieldMapping::auto(airtable, Uidt::LongText),
        A::Email => FieldMapping::auto(airtable, Uidt::Email),
        A::Url => FieldMapping::auto(airtable, Uidt::URL),
        A::PhoneNumber => FieldMapping::auto(airtable, Uidt::PhoneNumber),
        A::Number => FieldMapping::auto(airtable, Uidt::Number),
        A::Percent => FieldMapping::auto(airtable, Uidt::Percent),
        A::Currency => FieldMapping::auto(airtable, Uidt::Currency),
        A::SingleSelect => FieldMapping::auto(airtable, Uidt::SingleSelect),
        A::MultipleSelects => FieldMapping::auto(airtable, Uidt::MultiSelect),
        A::Date => FieldMapping::auto(airtable, Uidt::Date),
        A::DateTime => FieldMapping::auto(airtable, Uidt::DateTime),
        A::Checkbox => FieldMapping::auto(airtable, Uidt::Checkbox),
        A::Rating => FieldMapping::auto(airtable, Uidt::Rating),
        A::Duration => FieldMapping::auto(airtable, Uidt::Duration),
        A::MultipleAttachments => FieldMapping::auto(airtable, Uidt::Attachment),
        A::CreatedTime => FieldMapping::auto(airtable, Uidt::CreatedTime),
        A::LastModifiedTime => FieldMapping::auto(airtable, Uidt::LastModifiedTime),
        A::CreatedBy => FieldMapping::auto(airtable, Uidt::CreatedBy),
        A::LastModifiedBy => FieldMapping::auto(airtable, Uidt::LastModifiedBy),
        A::MultipleRecordLinks => FieldMapping::manual(
            airtable,
            Some(Uidt::LinkToAnotherRecord),
            "Links need both tables in place; recreate the relation after migration",
        ),
        A::Lookup | A::MultipleLookupValues => FieldMapping::manual(
            airtable,
            Some(Uidt::Lookup),
            "Depends on a link field; recreate after relations exist",
        ),
        A::Rollup => FieldMapping::manual(
            airtable,
            Some(Uidt::Rollup),
            "Depends on a link field; recreate with the mapped rollup function",
        ),
        A::Count => FieldMapping::manual(
            airtable,
            Some(Uidt::Count),
            "Depends on a link field; recreate after relations exist",
        ),
        A::Formula => FieldMapping::manual(
            airtable,
            Some(Uidt::Formula),
            "Convert Airtable formula syntax to NocoDB formula syntax",
        ),
        A::SingleCollaborator | A::MultipleCollaborators => FieldMapping::manual(
            airtable,
            Some(Uidt::User),
            "Collaborators are Airtable accounts; map users by hand",
        ),
        A::Button => FieldMapping::manual(airtable, None, "Buttons have no NocoDB equivalent"),
        A::ExternalSyncSource => {
            FieldMapping::manual(airtable, None, "Sync source metadata is not migrated")
        }
        A::Unknown(_) => FieldMapping::manual(airtable, None, "Unknown Airtable field type"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_migrated_types() {
        let cases = [
            ("singleLineText", Uidt::SingleLineText),
            ("multilineText", Uidt::LongText),
            ("richText", Uidt::LongText),
            ("aiText", Uidt::LongText),
            ("email", Uidt::Email),
            ("url", Uidt::URL),
            ("phoneNumber", Uidt::PhoneNumber),
            ("number", Uidt::Number),
            ("percent", Uidt::Percent),
            ("currency", Uidt::Currency),
            ("singleSelect", Uidt::SingleSelect),
            ("multipleSelects", Uidt::MultiSelect),
            ("date", Uidt::Date),
            ("dateTime", Uidt::DateTime),
            ("checkbox", Uidt::Checkbox),
            ("rating", Uidt::Rating),
            ("duration", Uidt::Duration),
            ("multipleAttachments", Uidt::Attachment),
            ("autoNumber", Uidt::SingleLineText),
            ("barcode", Uidt::SingleLineText),
            ("createdTime", Uidt::CreatedTime),
            ("lastModifiedTime", Uidt::LastModifiedTime),
            ("createdBy", Uidt::CreatedBy),
            ("lastModifiedBy", Uidt::LastModifiedBy),
        ];

        for (wire, expected) in cases {
            let mapping = mapping_for(&AirtableFieldType::from(wire));
            assert!(mapping.auto_migrate, "{wire} should migrate automatically");
            assert_eq!(mapping.uidt, Some(expected), "{wire}");
        }
    }

    #[test]
    fn test_manual_types() {
        let cases = [
            "formula",
            "rollup",
            "count",
            "lookup",
            "multipleLookupValues",
            "multipleRecordLinks",
            "singleCollaborator",
            "multipleCollaborators",
            "button",
            "externalSyncSource",
            "somethingNew",
        ];

        for wire in cases {
            let mapping = mapping_for(&AirtableFieldType::from(wire));
            assert!(!mapping.auto_migrate, "{wire} should need manual review");
            assert!(!mapping.notes.is_empty(), "{wire} needs a reason");
        }
    }

    #[test]
    fn test_wire_names_are_stable() {
        for wire in ["dateTime", "multipleRecordLinks", "aiText", "mysteryType"] {
            assert_eq!(AirtableFieldType::from(wire).as_str(), wire);
        }
        let parsed: AirtableFieldType = serde_json::from_str("\"checkbox\"").unwrap();
        assert_eq!(parsed, AirtableFieldType::Checkbox);
        assert_eq!(serde_json::to_string(&Uidt::LongText).unwrap(), "\"LongText\"");
    }

    #[test]
    fn test_system_uidts() {
        assert!(Uidt::is_system_name("CreatedTime"));
        assert!(Uidt::is_system_name("Order"));
        assert!(!Uidt::is_system_name("SingleLineText"));
    }
}
