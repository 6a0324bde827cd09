//! Normalization error types
//!
//! None of these abort normalization. Every problem found is collected into
//! the validation result and rendered as a message string.
//!
//! Kinds:
//! - UnknownField: raw field has no schema entry
//! - CoercionFailed: JSON parse failed while coercing to boolean/array/object
//! - TypeMismatch: coerced value does not have the declared type
//! - MissingRequired: required field absent from processed params
//! - EmptyRequired: required field present but empty for its type

use serde::ser::{Serialize, SerializeStruct, Serializer};
use thiserror::Error;

use super::types::FieldType;

/// A single problem found while normalizing params
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    #[error("Param property '{field}' hasn't specified in schema")]
    UnknownField { field: String },

    #[error("Param property '{field}' caught an error '{reason}' trying beeing converted to type {expected}")]
    CoercionFailed {
        field: String,
        expected: FieldType,
        reason: String,
    },

    #[error("Param property '{field}' must be a type of {expected}")]
    TypeMismatch { field: String, expected: FieldType },

    #[error("Required property '{field}' hasn't found in params")]
    MissingRequired { field: String },

    #[error("Required property '{field}' is empty or has no value")]
    EmptyRequired { field: String },
}

impl ParamError {
    /// Returns the field the error refers to
    pub fn field(&self) -> &str {
        match self {
            ParamError::UnknownField { field }
            | ParamError::CoercionFailed { field, .. }
            | ParamError::TypeMismatch { field, .. }
            | ParamError::MissingRequired { field }
            | ParamError::EmptyRequired { field } => field,
        }
    }

    /// Stable kind name used in log fields
    pub fn kind(&self) -> &'static str {
        match self {
            ParamError::UnknownField { .. } => "unknown_field",
            ParamError::CoercionFailed { .. } => "coercion_failed",
            ParamError::TypeMismatch { .. } => "type_mismatch",
            ParamError::MissingRequired { .. } => "missing_required",
            ParamError::EmptyRequired { .. } => "empty_required",
        }
    }
}

/// Outcome of the validation passes.
///
/// `status` is derived from the collected errors, so a result can never
/// report success while carrying errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
    errors: Vec<ParamError>,
}

impl Validation {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, error: ParamError) {
        self.errors.push(error);
    }

    /// True iff no errors were collected
    pub fn status(&self) -> bool {
        self.errors.is_empty()
    }

    /// Collected errors in report order
    pub fn issues(&self) -> &[ParamError] {
        &self.errors
    }

    /// Collected errors rendered as messages
    pub fn errors(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    /// Messages joined the way the HTTP rejection body expects
    pub fn message(&self) -> String {
        self.errors().join("; \n")
    }
}

impl Serialize for Validation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Validation", 2)?;
        state.serialize_field("status", &self.status())?;
        state.serialize_field("errors", &self.errors())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_match_contract() {
        let cases = [
            (
                ParamError::UnknownField { field: "x".into() },
                "Param property 'x' hasn't specified in schema",
            ),
            (
                ParamError::CoercionFailed {
                    field: "flag".into(),
                    expected: FieldType::Boolean,
                    reason: "expected value at line 1 column 1".into(),
                },
                "Param property 'flag' caught an error 'expected value at line 1 column 1' trying beeing converted to type boolean",
            ),
            (
                ParamError::TypeMismatch {
                    field: "price".into(),
                    expected: FieldType::Number,
                },
                "Param property 'price' must be a type of number",
            ),
            (
                ParamError::MissingRequired { field: "name".into() },
                "Required property 'name' hasn't found in params",
            ),
            (
                ParamError::EmptyRequired { field: "name".into() },
                "Required property 'name' is empty or has no value",
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_status_follows_errors() {
        let mut validation = Validation::new();
        assert!(validation.status());

        validation.push(ParamError::MissingRequired { field: "a".into() });
        assert!(!validation.status());
        assert_eq!(validation.issues()[0].field(), "a");
        assert_eq!(validation.issues()[0].kind(), "missing_required");
    }

    #[test]
    fn test_message_joins_errors() {
        let mut validation = Validation::new();
        validation.push(ParamError::UnknownField { field: "a".into() });
        validation.push(ParamError::MissingRequired { field: "b".into() });

        assert_eq!(
            validation.message(),
            "Param property 'a' hasn't specified in schema; \nRequired property 'b' hasn't found in params"
        );
    }

    #[test]
    fn test_serialized_shape() {
        let mut validation = Validation::new();
        validation.push(ParamError::EmptyRequired { field: "a".into() });

        let json = serde_json::to_value(&validation).unwrap();
        assert_eq!(json["status"], false);
        assert_eq!(json["errors"][0], "Required property 'a' is empty or has no value");
    }
}
