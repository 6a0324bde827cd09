//! Param normalizer
//!
//! Two passes over the input:
//! 1. coercion, in raw param order: each known field is converted to its
//!    declared type, unknown fields are reported and dropped
//! 2. required check, in schema declaration order
//!
//! Every error from pass 1 precedes every error from pass 2. Normalization
//! does not log, does not allocate shared state and never fails; problems
//! are collected into `Validation`.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::{Map, Value};

use super::errors::{ParamError, Validation};
use super::types::{FieldType, Schema};
use super::value::{is_empty_like, ParamValue};

/// Params after coercion, in the order they were first seen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessedParams {
    entries: Vec<(String, ParamValue)>,
}

impl ProcessedParams {
    fn set(&mut self, name: &str, value: ParamValue) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Converts to a JSON object. Non-finite numbers become null.
    pub fn to_json(&self) -> Map<String, Value> {
        self.entries
            .iter()
            .map(|(n, v)| {
                let value = serde_json::to_value(v).unwrap_or(Value::Null);
                (n.clone(), value)
            })
            .collect()
    }
}

impl Serialize for ProcessedParams {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Result of a normalization run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Normalized {
    pub processed: ProcessedParams,
    pub validated: Validation,
}

impl Normalized {
    /// Shortcut for `validated.status()`
    pub fn is_valid(&self) -> bool {
        self.validated.status()
    }
}

/// Normalizes a JSON object against a schema.
pub fn normalize(params: &Map<String, Value>, schema: &Schema) -> Normalized {
    normalize_values(
        params.iter().map(|(k, v)| (k.as_str(), ParamValue::from(v))),
        schema,
    )
}

/// Normalizes arbitrary `(name, value)` pairs against a schema.
///
/// Pairs are visited in iteration order. A name repeated in the input is
/// coerced again and overwrites the earlier processed value.
pub fn normalize_values<'a, I>(params: I, schema: &Schema) -> Normalized
where
    I: IntoIterator<Item = (&'a str, ParamValue)>,
{
    let mut processed = ProcessedParams::default();
    let mut validated = Validation::new();

    for (name, raw) in params {
        let Some(def) = schema.get(name) else {
            validated.push(ParamError::UnknownField {
                field: name.to_string(),
            });
            continue;
        };

        coerce_field(name, raw, def.field_type, &mut processed, &mut validated);
    }

    check_required(schema, &processed, &mut validated);

    Normalized {
        processed,
        validated,
    }
}

fn coerce_field(
    name: &str,
    raw: ParamValue,
    field_type: FieldType,
    processed: &mut ProcessedParams,
    validated: &mut Validation,
) {
    match field_type {
        FieldType::String => {
            let value = match raw {
                ParamValue::String(_) => raw,
                other => ParamValue::String(other.to_js_string()),
            };
            processed.set(name, value);
        }
        FieldType::Number => {
            // falsy input leaves the field unset without an error
            if !raw.is_truthy() {
                return;
            }
            let value = match raw {
                ParamValue::Number(_) => raw,
                other => ParamValue::Number(other.to_number()),
            };
            let valid = value.is_finite_number();
            processed.set(name, value);
            if !valid {
                validated.push(type_mismatch(name, field_type));
            }
        }
        FieldType::Boolean => {
            let already = matches!(raw, ParamValue::Bool(_));
            parse_or_copy(name, raw, field_type, already, processed, validated);
            if !matches!(processed.get(name), Some(ParamValue::Bool(_))) {
                validated.push(type_mismatch(name, field_type));
            }
        }
        FieldType::Array => {
            let already = matches!(raw, ParamValue::Array(_));
            parse_or_copy(name, raw, field_type, already, processed, validated);
            if !matches!(processed.get(name), Some(ParamValue::Array(_))) {
                validated.push(type_mismatch(name, field_type));
            }
        }
        FieldType::Object => {
            let already = matches!(raw, ParamValue::Object(_));
            parse_or_copy(name, raw, field_type, already, processed, validated);
            // null counts as an object here; emptiness is judged by the
            // required check
            if !matches!(
                processed.get(name),
                Some(ParamValue::Object(_)) | Some(ParamValue::Null)
            ) {
                validated.push(type_mismatch(name, field_type));
            }
        }
    }
}

/// Copies empty-like and already-typed values, JSON-parses everything else.
/// A parse failure is reported and leaves the field unset.
fn parse_or_copy(
    name: &str,
    raw: ParamValue,
    field_type: FieldType,
    already_typed: bool,
    processed: &mut ProcessedParams,
    validated: &mut Validation,
) {
    if already_typed || is_empty_like(&raw) {
        processed.set(name, raw);
        return;
    }

    match raw.parse_json() {
        Ok(value) => processed.set(name, value),
        Err(reason) => validated.push(ParamError::CoercionFailed {
            field: name.to_string(),
            expected: field_type,
            reason,
        }),
    }
}

fn check_required(schema: &Schema, processed: &ProcessedParams, validated: &mut Validation) {
    for (name, def) in schema.required_fields() {
        let Some(value) = processed.get(name) else {
            validated.push(ParamError::MissingRequired {
                field: name.to_string(),
            });
            continue;
        };

        let empty = match def.field_type {
            FieldType::String | FieldType::Array | FieldType::Object => is_empty_like(value),
            // a coerced 0 is a valid number and passes
            FieldType::Number => !value.is_finite_number(),
            FieldType::Boolean => value.is_nil(),
        };

        if empty {
            validated.push(ParamError::EmptyRequired {
                field: name.to_string(),
            });
        }
    }
}

fn type_mismatch(name: &str, expected: FieldType) -> ParamError {
    ParamError::TypeMismatch {
        field: name.to_string(),
        expected,
    }
}
