//! Validation schema and the loader that supplies it.
//!
//! A schema document looks like:
//!
//! ```json
//! {
//!   "required_fields": { "event_type": "string", "appointment_id": "string" },
//!   "optional_fields": { "notes": "string" },
//!   "valid_event_types": ["appointment.scheduled"]
//! }
//! ```
//!
//! Field declaration order is significant: missing fields are reported, and
//! type checks run, in the order the document lists them.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{error, info, warn};

/// Event types accepted by the built-in schema.
pub const DEFAULT_EVENT_TYPES: [&str; 3] = [
    "appointment.scheduled",
    "appointment.cancelled",
    "appointment.updated",
];

/// Errors reading or parsing a schema document.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The document could not be read.
    #[error("failed to read schema: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not valid JSON or has the wrong shape.
    #[error("failed to parse schema: {0}")]
    Parse(#[from] serde_json::Error),

    /// A field declaration's type is not a string.
    #[error("field '{0}' must declare its type as a string")]
    InvalidFieldType(String),
}

/// Primitive type a schema declares for a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// JSON string.
    String,
    /// Any JSON number.
    Number,
    /// JSON number without a fractional part.
    Integer,
    /// JSON boolean.
    Boolean,
    /// JSON object.
    Object,
    /// JSON array.
    Array,
    /// A type name this validator does not check; any value passes.
    Unchecked(String),
}

impl FieldType {
    fn from_name(name: &str) -> Self {
        match name {
            "string" => Self::String,
            "number" => Self::Number,
            "integer" => Self::Integer,
            "boolean" => Self::Boolean,
            "object" => Self::Object,
            "array" => Self::Array,
            other => Self::Unchecked(other.to_owned()),
        }
    }

    /// The declared type name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
            Self::Unchecked(name) => name,
        }
    }

    /// Whether `value` satisfies this type. `null` never does.
    #[must_use]
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Boolean => value.is_boolean(),
            Self::Object => value.is_object(),
            Self::Array => value.is_array(),
            Self::Unchecked(_) => true,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The rules a payload is validated against. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationSchema {
    required_fields: Vec<(String, FieldType)>,
    optional_fields: Vec<(String, FieldType)>,
    valid_event_types: BTreeSet<String>,
}

#[derive(Debug, Deserialize)]
struct SchemaDocument {
    #[serde(default)]
    required_fields: Map<String, Value>,
    #[serde(default)]
    optional_fields: Map<String, Value>,
    valid_event_types: Option<Vec<String>>,
}

fn field_list(fields: Map<String, Value>) -> Result<Vec<(String, FieldType)>, SchemaError> {
    fields
        .into_iter()
        .map(|(name, declared)| match declared.as_str() {
            Some(type_name) => {
                let field_type = FieldType::from_name(type_name);
                Ok((name, field_type))
            }
            None => Err(SchemaError::InvalidFieldType(name)),
        })
        .collect()
}

impl ValidationSchema {
    /// Builds a schema from explicit parts.
    #[must_use]
    pub fn new<R, O, E>(required_fields: R, optional_fields: O, valid_event_types: E) -> Self
    where
        R: IntoIterator<Item = (String, FieldType)>,
        O: IntoIterator<Item = (String, FieldType)>,
        E: IntoIterator<Item = String>,
    {
        Self {
            required_fields: required_fields.into_iter().collect(),
            optional_fields: optional_fields.into_iter().collect(),
            valid_event_types: valid_event_types.into_iter().collect(),
        }
    }

    /// Parses a schema document.
    ///
    /// A document without `valid_event_types` accepts the built-in event
    /// types; missing field maps are empty.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::Parse` for malformed JSON or a wrong shape and
    /// `SchemaError::InvalidFieldType` when a declared type is not a string.
    pub fn from_json_str(document: &str) -> Result<Self, SchemaError> {
        let document: SchemaDocument = serde_json::from_str(document)?;
        let valid_event_types = match document.valid_event_types {
            Some(types) => types.into_iter().collect(),
            None => DEFAULT_EVENT_TYPES.iter().map(|t| (*t).to_owned()).collect(),
        };

        Ok(Self {
            required_fields: field_list(document.required_fields)?,
            optional_fields: field_list(document.optional_fields)?,
            valid_event_types,
        })
    }

    /// Required fields in declaration order.
    #[must_use]
    pub fn required_fields(&self) -> &[(String, FieldType)] {
        &self.required_fields
    }

    /// Optional fields in declaration order.
    #[must_use]
    pub fn optional_fields(&self) -> &[(String, FieldType)] {
        &self.optional_fields
    }

    /// Allowed `event_type` values, sorted.
    #[must_use]
    pub fn valid_event_types(&self) -> &BTreeSet<String> {
        &self.valid_event_types
    }
}

impl Default for ValidationSchema {
    fn default() -> Self {
        let string_field = |name: &str| (name.to_owned(), FieldType::String);
        Self::new(
            ["event_type", "appointment_id", "patient_id", "timestamp"].map(string_field),
            [string_field("notes")],
            DEFAULT_EVENT_TYPES.map(str::to_owned),
        )
    }
}

/// Why the built-in schema is in use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// Nothing exists at the configured path.
    NotFound,
    /// The file exists but could not be read or parsed.
    Invalid(String),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => f.write_str("schema file not found"),
            Self::Invalid(detail) => f.write_str(detail),
        }
    }
}

/// Where the active schema came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource {
    /// Loaded from this file.
    File(PathBuf),
    /// The built-in schema, substituted for the configured path.
    Default {
        /// The path that was tried.
        path: PathBuf,
        /// Why it was not used.
        reason: FallbackReason,
    },
}

/// A schema together with its provenance.
#[derive(Debug, Clone)]
pub struct LoadedSchema {
    /// The schema to validate against.
    pub schema: ValidationSchema,
    /// Where it came from.
    pub source: SchemaSource,
}

impl LoadedSchema {
    /// Whether the built-in fallback is in use.
    #[must_use]
    pub fn is_default(&self) -> bool {
        matches!(self.source, SchemaSource::Default { .. })
    }
}

/// Loads the validation schema from a file.
#[derive(Debug, Clone, Copy)]
pub struct SchemaStore;

impl SchemaStore {
    /// Loads the schema at `path`, substituting the built-in schema when the
    /// file is absent, unreadable or invalid. Never fails; the fallback is
    /// reported through [`LoadedSchema::source`] and a log event.
    pub fn load(path: impl AsRef<Path>) -> LoadedSchema {
        let path = path.as_ref();

        if !path.exists() {
            warn!(
                schema_path = %path.display(),
                "schema file not found, using default schema"
            );
            return Self::fallback(path, FallbackReason::NotFound);
        }

        let loaded = std::fs::read_to_string(path)
            .map_err(SchemaError::from)
            .and_then(|document| ValidationSchema::from_json_str(&document));

        match loaded {
            Ok(schema) => {
                info!(
                    schema_path = %path.display(),
                    required = schema.required_fields.len(),
                    optional = schema.optional_fields.len(),
                    event_types = schema.valid_event_types.len(),
                    "loaded validation schema"
                );
                LoadedSchema {
                    schema,
                    source: SchemaSource::File(path.to_path_buf()),
                }
            }
            Err(e) => {
                error!(
                    schema_path = %path.display(),
                    error = %e,
                    "failed to load schema, using default schema"
                );
                Self::fallback(path, FallbackReason::Invalid(e.to_string()))
            }
        }
    }

    fn fallback(path: &Path, reason: FallbackReason) -> LoadedSchema {
        LoadedSchema {
            schema: ValidationSchema::default(),
            source: SchemaSource::Default {
                path: path.to_path_buf(),
                reason,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn names(fields: &[(String, FieldType)]) -> Vec<&str> {
        fields.iter().map(|(name, _)| name.as_str()).collect()
    }

    #[test]
    fn test_default_schema_covers_canonical_fields_and_types() {
        let schema = ValidationSchema::default();

        assert_eq!(
            names(schema.required_fields()),
            ["event_type", "appointment_id", "patient_id", "timestamp"]
        );
        assert_eq!(names(schema.optional_fields()), ["notes"]);
        assert_eq!(
            schema.valid_event_types().iter().collect::<Vec<_>>(),
            [
                "appointment.cancelled",
                "appointment.scheduled",
                "appointment.updated"
            ]
        );
    }

    #[test]
    fn test_from_json_str_preserves_declaration_order() {
        let schema = ValidationSchema::from_json_str(
            r#"{
                "required_fields": {"timestamp": "string", "event_type": "string", "count": "integer"},
                "valid_event_types": ["x"]
            }"#,
        )
        .unwrap();

        assert_eq!(
            names(schema.required_fields()),
            ["timestamp", "event_type", "count"]
        );
        assert_eq!(schema.required_fields()[2].1, FieldType::Integer);
        assert!(schema.optional_fields().is_empty());
    }

    #[test]
    fn test_from_json_str_defaults_event_types_when_absent() {
        let schema =
            ValidationSchema::from_json_str(r#"{"required_fields": {"event_type": "string"}}"#)
                .unwrap();

        assert_eq!(schema.valid_event_types().len(), 3);
    }

    #[test]
    fn test_from_json_str_rejects_non_string_type_declaration() {
        let result = ValidationSchema::from_json_str(r#"{"required_fields": {"a": 1}}"#);

        assert!(matches!(result, Err(SchemaError::InvalidFieldType(f)) if f == "a"));
    }

    #[test]
    fn test_unknown_type_name_is_unchecked() {
        let field_type = FieldType::from_name("date");

        assert_eq!(field_type.name(), "date");
        assert!(field_type.accepts(&serde_json::json!(42)));
    }

    #[test]
    fn test_load_missing_file_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");

        let loaded = SchemaStore::load(&path);

        assert!(loaded.is_default());
        assert_eq!(loaded.schema, ValidationSchema::default());
        assert_eq!(
            loaded.source,
            SchemaSource::Default {
                path,
                reason: FallbackReason::NotFound
            }
        );
    }

    #[test]
    fn test_load_invalid_file_falls_back_to_default() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();

        let loaded = SchemaStore::load(file.path());

        assert!(loaded.is_default());
        assert!(matches!(
            loaded.source,
            SchemaSource::Default {
                reason: FallbackReason::Invalid(_),
                ..
            }
        ));
    }

    #[test]
    fn test_load_valid_file_uses_its_rules() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"{
                "required_fields": {"event_type": "string"},
                "optional_fields": {},
                "valid_event_types": ["appointment.noshow"]
            }"#,
        )
        .unwrap();

        let loaded = SchemaStore::load(file.path());

        assert!(!loaded.is_default());
        assert_eq!(loaded.source, SchemaSource::File(file.path().to_path_buf()));
        assert!(
            loaded
                .schema
                .valid_event_types()
                .contains("appointment.noshow")
        );
    }
}
