//! Schema-driven payload validation.
//!
//! [`Validator::validate`] turns an untyped JSON payload into an
//! [`AppointmentEvent`] or a [`ValidationFailure`]. Checks run in a fixed
//! order and stop at the first failure:
//!
//! 1. the payload is an object;
//! 2. every required field is present (all missing names are reported);
//! 3. required fields are non-null and of the declared type;
//! 4. optional fields, when present and non-null, are of the declared type;
//! 5. `event_type` is one of the allowed values;
//! 6. `timestamp` parses as ISO-8601;
//! 7. `appointment_id` and `patient_id` are not blank.
//!
//! The result depends only on the payload and the schema.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

use crate::error::ValidationFailure;
use crate::event::AppointmentEvent;
use crate::schema::{FieldType, ValidationSchema};

const EVENT_TYPE: &str = "event_type";
const APPOINTMENT_ID: &str = "appointment_id";
const PATIENT_ID: &str = "patient_id";
const TIMESTAMP: &str = "timestamp";
const NOTES: &str = "notes";
const CORE_FIELDS: [&str; 4] = [EVENT_TYPE, APPOINTMENT_ID, PATIENT_ID, TIMESTAMP];

/// Validates payloads against a fixed schema.
///
/// Holds no mutable state; share it freely between concurrent requests.
#[derive(Debug, Clone)]
pub struct Validator {
    schema: ValidationSchema,
}

impl Validator {
    /// Creates a validator for `schema`.
    #[must_use]
    pub fn new(schema: ValidationSchema) -> Self {
        Self { schema }
    }

    /// Validates `payload`.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationFailure`] encountered, in the order
    /// described in the module documentation.
    pub fn validate(&self, payload: &Value) -> Result<AppointmentEvent, ValidationFailure> {
        let Value::Object(fields) = payload else {
            return Err(ValidationFailure::MalformedPayload);
        };

        let required = self.schema.required_fields();
        let mut missing: Vec<String> = required
            .iter()
            .filter(|(name, _)| !fields.contains_key(name))
            .map(|(name, _)| name.clone())
            .collect();
        // Core fields the schema leaves out are still required, after the
        // declared ones.
        missing.extend(
            CORE_FIELDS
                .into_iter()
                .filter(|core| !fields.contains_key(*core))
                .filter(|core| !required.iter().any(|(name, _)| name == core))
                .map(str::to_owned),
        );
        if !missing.is_empty() {
            return Err(ValidationFailure::MissingFields(missing));
        }

        for (name, field_type) in self.schema.required_fields() {
            let value = &fields[name.as_str()];
            if value.is_null() {
                return Err(ValidationFailure::NullField(name.clone()));
            }
            check_type(name, field_type, value)?;
        }

        for (name, field_type) in self.schema.optional_fields() {
            match fields.get(name) {
                Some(value) if !value.is_null() => check_type(name, field_type, value)?,
                _ => {}
            }
        }

        // The event itself always needs these as strings, whatever the
        // schema declares.
        let event_type = core_string(fields, EVENT_TYPE)?;
        let appointment_id = core_string(fields, APPOINTMENT_ID)?;
        let patient_id = core_string(fields, PATIENT_ID)?;
        let timestamp = core_string(fields, TIMESTAMP)?;

        let allowed = self.schema.valid_event_types();
        if !allowed.contains(event_type) {
            return Err(ValidationFailure::InvalidEventType {
                value: event_type.to_owned(),
                allowed: allowed.iter().cloned().collect(),
            });
        }

        parse_iso8601(timestamp).map_err(ValidationFailure::InvalidTimestamp)?;

        for (name, value) in [(APPOINTMENT_ID, appointment_id), (PATIENT_ID, patient_id)] {
            if value.trim().is_empty() {
                return Err(ValidationFailure::EmptyIdentifier(name.to_owned()));
            }
        }

        let notes = match fields.get(NOTES) {
            Some(Value::String(notes)) => Some(notes.clone()),
            Some(Value::Null) | None => None,
            // A schema may declare `notes` as another type; keep its JSON text.
            Some(other) => Some(other.to_string()),
        };

        Ok(AppointmentEvent::new(
            event_type.to_owned(),
            appointment_id.to_owned(),
            patient_id.to_owned(),
            timestamp.to_owned(),
            notes,
        ))
    }
}

fn check_type(name: &str, field_type: &FieldType, value: &Value) -> Result<(), ValidationFailure> {
    if field_type.accepts(value) {
        Ok(())
    } else {
        Err(ValidationFailure::TypeMismatch {
            field: name.to_owned(),
            expected: field_type.name().to_owned(),
            actual: json_type_name(value),
        })
    }
}

fn core_string<'a>(fields: &'a Map<String, Value>, name: &str) -> Result<&'a str, ValidationFailure> {
    match fields.get(name) {
        None => Err(ValidationFailure::MissingFields(vec![name.to_owned()])),
        Some(Value::Null) => Err(ValidationFailure::NullField(name.to_owned())),
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(other) => Err(ValidationFailure::TypeMismatch {
            field: name.to_owned(),
            expected: FieldType::String.name().to_owned(),
            actual: json_type_name(other),
        }),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Checks that `text` is an ISO-8601 date or date-time.
///
/// A trailing `Z` is read as `+00:00`. Accepted forms: date-time with
/// or without an offset (`T` or space separated, minute or second precision,
/// optional fractional seconds) and a bare date. On failure returns the parser's
/// message.
fn parse_iso8601(text: &str) -> Result<(), String> {
    let normalized = match text.strip_suffix('Z') {
        Some(prefix) => format!("{prefix}+00:00"),
        None => text.to_owned(),
    };

    let offset_err = match DateTime::parse_from_rfc3339(&normalized) {
        Ok(_) => return Ok(()),
        Err(e) => e,
    };
    for format in [
        "%Y-%m-%dT%H:%M:%S%.f%:z",
        "%Y-%m-%d %H:%M:%S%.f%:z",
        "%Y-%m-%dT%H:%M%:z",
        "%Y-%m-%d %H:%M%:z",
    ] {
        if DateTime::parse_from_str(&normalized, format).is_ok() {
            return Ok(());
        }
    }
    for format in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ] {
        if NaiveDateTime::parse_from_str(&normalized, format).is_ok() {
            return Ok(());
        }
    }
    if NaiveDate::parse_from_str(&normalized, "%Y-%m-%d").is_ok() {
        return Ok(());
    }

    Err(format!("invalid isoformat string '{text}': {offset_err}"))
}
