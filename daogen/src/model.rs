//! Column-mapping model extracted from an entity declaration.

use serde::Serialize;

use crate::errors::{Error, Result};
use crate::tag::FieldTag;

/// Tag key holding the database column name.
pub const COLUMN_KEY: &str = "column";
/// Tag key marking the field as part of the primary key.
pub const IDENTITY_KEY: &str = "identity";
/// Tag key controlling INSERT participation.
pub const INSERTABLE_KEY: &str = "insertable";
/// Tag key controlling UPDATE participation.
pub const UPDATABLE_KEY: &str = "updatable";

const RECOGNIZED_KEYS: [&str; 4] = [COLUMN_KEY, IDENTITY_KEY, INSERTABLE_KEY, UPDATABLE_KEY];

/// Mapping of one annotated field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldMapping {
    /// Field identifier as declared in source
    pub field_name: String,
    /// Database column, empty when the annotation has no `column` key
    pub column_name: String,
    pub is_identity: bool,
    pub is_insertable: bool,
    pub is_updatable: bool,
}

impl FieldMapping {
    /// Field with the default participation flags.
    pub fn new(field_name: impl Into<String>, column_name: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            column_name: column_name.into(),
            is_identity: false,
            is_insertable: true,
            is_updatable: true,
        }
    }

    pub fn identity(mut self) -> Self {
        self.is_identity = true;
        self
    }

    pub fn insertable(mut self, value: bool) -> Self {
        self.is_insertable = value;
        self
    }

    pub fn updatable(mut self, value: bool) -> Self {
        self.is_updatable = value;
        self
    }

    /// Build a mapping from a parsed annotation.
    ///
    /// Returns `Ok(None)` when the annotation carries none of the recognized
    /// keys. A boolean key that is present and non-empty but is not `true` or
    /// `false` fails the whole entity.
    pub fn from_tag(entity: &str, field_name: &str, tag: &FieldTag) -> Result<Option<Self>> {
        if !RECOGNIZED_KEYS.iter().any(|key| tag.contains_key(key)) {
            return Ok(None);
        }

        let mut mapping = Self::new(field_name, tag.get(COLUMN_KEY).unwrap_or_default());
        if let Some(value) = parse_flag(entity, field_name, tag, UPDATABLE_KEY)? {
            mapping.is_updatable = value;
        }
        if let Some(value) = parse_flag(entity, field_name, tag, INSERTABLE_KEY)? {
            mapping.is_insertable = value;
        }
        if let Some(value) = parse_flag(entity, field_name, tag, IDENTITY_KEY)? {
            mapping.is_identity = value;
        }

        Ok(Some(mapping))
    }
}

/// An empty value counts as absent.
fn parse_flag(entity: &str, field_name: &str, tag: &FieldTag, key: &str) -> Result<Option<bool>> {
    match tag.get(key) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse::<bool>().map(Some).map_err(|_| Error::MalformedAnnotation {
            entity: entity.to_string(),
            field: field_name.to_string(),
            key: Some(key.to_string()),
            value: Some(raw.to_string()),
            reason: format!("`{key}` must be `true` or `false`, got {raw:?}"),
        }),
    }
}

/// Full mapping of one entity to its table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntityMapping {
    pub table_name: String,
    /// Declaration order
    pub fields: Vec<FieldMapping>,
}

impl EntityMapping {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_fields(table_name: impl Into<String>, fields: Vec<FieldMapping>) -> Self {
        Self {
            table_name: table_name.into(),
            fields,
        }
    }

    /// True when no field was mapped, including the entity-not-found case.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn identity_fields(&self) -> impl Iterator<Item = &FieldMapping> {
        self.fields.iter().filter(|f| f.is_identity)
    }

    pub fn value_fields(&self) -> impl Iterator<Item = &FieldMapping> {
        self.fields.iter().filter(|f| !f.is_identity)
    }

    /// First field whose column name is empty.
    pub fn unmapped_field(&self) -> Option<&FieldMapping> {
        self.fields.iter().find(|f| f.column_name.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(input: &str) -> FieldTag {
        FieldTag::parse(input).unwrap()
    }

    #[test]
    fn test_defaults() {
        let mapping = FieldMapping::from_tag("Person", "first_name", &tag(r#"column:"first_name""#))
            .unwrap()
            .unwrap();
        assert_eq!(mapping, FieldMapping::new("first_name", "first_name"));
        assert!(!mapping.is_identity);
        assert!(mapping.is_insertable);
        assert!(mapping.is_updatable);
    }

    #[test]
    fn test_flags_override_defaults() {
        let mapping = FieldMapping::from_tag(
            "Person",
            "id",
            &tag(r#"column:"id" identity:"true" insertable:"false" updatable:"false""#),
        )
        .unwrap()
        .unwrap();
        assert!(mapping.is_identity);
        assert!(!mapping.is_insertable);
        assert!(!mapping.is_updatable);
    }

    #[test]
    fn test_missing_column_is_recorded_empty() {
        let mapping = FieldMapping::from_tag("Person", "id", &tag(r#"identity:"true""#))
            .unwrap()
            .unwrap();
        assert_eq!(mapping.column_name, "");
        assert!(mapping.is_identity);
    }

    #[test]
    fn test_unrecognized_keys_only() {
        let mapping = FieldMapping::from_tag("Person", "email", &tag(r#"json:"email""#)).unwrap();
        assert!(mapping.is_none());
    }

    #[test]
    fn test_empty_flag_counts_as_absent() {
        let mapping = FieldMapping::from_tag("Person", "email", &tag(r#"column:"email" updatable:"""#))
            .unwrap()
            .unwrap();
        assert!(mapping.is_updatable);
    }

    #[test]
    fn test_invalid_flag_is_rejected() {
        let err = FieldMapping::from_tag("Person", "email", &tag(r#"column:"email" updatable:"notabool""#))
            .unwrap_err();
        match err {
            Error::MalformedAnnotation {
                entity, field, key, value, ..
            } => {
                assert_eq!(entity, "Person");
                assert_eq!(field, "email");
                assert_eq!(key.as_deref(), Some("updatable"));
                assert_eq!(value.as_deref(), Some("notabool"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_only_rust_bool_literals_are_accepted() {
        for raw in ["1", "t", "TRUE", "True"] {
            let input = format!(r#"identity:"{raw}""#);
            assert!(FieldMapping::from_tag("Person", "id", &tag(&input)).is_err(), "{raw}");
        }
    }

    #[test]
    fn test_entity_helpers() {
        let mapping = EntityMapping::with_fields(
            "people",
            vec![
                FieldMapping::new("id", "id").identity(),
                FieldMapping::new("name", ""),
            ],
        );
        assert!(!mapping.is_empty());
        assert_eq!(mapping.identity_fields().count(), 1);
        assert_eq!(mapping.value_fields().count(), 1);
        assert_eq!(mapping.unmapped_field().map(|f| f.field_name.as_str()), Some("name"));
        assert!(EntityMapping::new("people").is_empty());
    }
}
