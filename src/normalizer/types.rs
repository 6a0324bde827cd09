//! Schema type definitions
//!
//! Supported types:
//! - string
//! - number
//! - boolean
//! - array
//! - object
//!
//! A schema is flat: field name -> `{ "type": ..., "required": ... }`.
//! Declaration order is kept because required-field errors are reported in
//! that order.

use std::fmt;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// Supported field types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Array,
    Object,
}

impl FieldType {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Array => "array",
            FieldType::Object => "object",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Field definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Declared type
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Whether the field must be present and non-empty
    #[serde(default)]
    pub required: bool,
}

impl FieldDef {
    pub fn new(field_type: FieldType, required: bool) -> Self {
        Self {
            field_type,
            required,
        }
    }

    pub fn required(field_type: FieldType) -> Self {
        Self::new(field_type, true)
    }

    pub fn optional(field_type: FieldType) -> Self {
        Self::new(field_type, false)
    }
}

/// Ordered set of field definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<(String, FieldDef)>,
}

impl Schema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field, builder style. A field declared twice keeps its first
    /// position and takes the latest definition.
    pub fn field(mut self, name: impl Into<String>, def: FieldDef) -> Self {
        self.insert(name, def);
        self
    }

    /// Inserts or replaces a field definition.
    ///
    /// Returns the previous definition if the name was already declared.
    pub fn insert(&mut self, name: impl Into<String>, def: FieldDef) -> Option<FieldDef> {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => Some(std::mem::replace(existing, def)),
            None => {
                self.fields.push((name, def));
                None
            }
        }
    }

    /// Looks up a field definition
    pub fn get(&self, name: &str) -> Option<&FieldDef> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, def)| def)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates fields in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldDef)> {
        self.fields.iter().map(|(n, def)| (n.as_str(), def))
    }

    /// Iterates required fields in declaration order
    pub fn required_fields(&self) -> impl Iterator<Item = (&str, &FieldDef)> {
        self.iter().filter(|(_, def)| def.required)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, def) in &self.fields {
            map.serialize_entry(name, def)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SchemaVisitor;

        impl<'de> Visitor<'de> for SchemaVisitor {
            type Value = Schema;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of field name to {type, required}")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Schema, A::Error> {
                let mut schema = Schema::new();
                while let Some((name, def)) = access.next_entry::<String, FieldDef>()? {
                    if schema.contains(&name) {
                        return Err(de::Error::custom(format!(
                            "field '{}' is declared more than once",
                            name
                        )));
                    }
                    schema.fields.push((name, def));
                }
                Ok(schema)
            }
        }

        deserializer.deserialize_map(SchemaVisitor)
    }
}

impl<N: Into<String>> FromIterator<(N, FieldDef)> for Schema {
    fn from_iter<I: IntoIterator<Item = (N, FieldDef)>>(iter: I) -> Self {
        let mut schema = Schema::new();
        for (name, def) in iter {
            schema.insert(name, def);
        }
        schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schema() -> Schema {
        Schema::new()
            .field("name", FieldDef::required(FieldType::String))
            .field("price", FieldDef::required(FieldType::Number))
            .field("tags", FieldDef::optional(FieldType::Array))
    }

    #[test]
    fn test_declaration_order_kept() {
        let schema = sample_schema();
        let names: Vec<_> = schema.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["name", "price", "tags"]);
    }

    #[test]
    fn test_required_fields() {
        let schema = sample_schema();
        let names: Vec<_> = schema.required_fields().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["name", "price"]);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut schema = sample_schema();
        let previous = schema.insert("name", FieldDef::optional(FieldType::String));
        assert_eq!(previous, Some(FieldDef::required(FieldType::String)));
        assert_eq!(schema.len(), 3);
        assert!(!schema.get("name").unwrap().required);
    }

    #[test]
    fn test_deserialize_preserves_order() {
        let schema: Schema = serde_json::from_str(
            r#"{"zeta": {"type": "boolean", "required": true},
                "alpha": {"type": "object"}}"#,
        )
        .unwrap();

        let fields: Vec<_> = schema.iter().collect();
        assert_eq!(fields[0].0, "zeta");
        assert_eq!(fields[0].1.field_type, FieldType::Boolean);
        assert_eq!(fields[1].0, "alpha");
        assert!(!fields[1].1.required);
    }

    #[test]
    fn test_deserialize_rejects_unknown_type() {
        let result: Result<Schema, _> =
            serde_json::from_str(r#"{"when": {"type": "date", "required": true}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_rejects_duplicate_field() {
        let result: Result<Schema, _> = serde_json::from_str(
            r#"{"a": {"type": "string"}, "a": {"type": "number"}}"#,
        );
        let err = result.unwrap_err().to_string();
        assert!(err.contains("more than once"));
    }

    #[test]
    fn test_serialize_round_trip() {
        let schema = sample_schema();
        let json = serde_json::to_string(&schema).unwrap();
        assert!(json.starts_with(r#"{"name":{"type":"string","required":true}"#));
        let back: Schema = serde_json::from_str(&json).unwrap();
        assert_eq!(back, schema);
    }

    #[test]
    fn test_field_type_names() {
        assert_eq!(FieldType::String.type_name(), "string");
        assert_eq!(FieldType::Number.type_name(), "number");
        assert_eq!(FieldType::Boolean.type_name(), "boolean");
        assert_eq!(FieldType::Array.type_name(), "array");
        assert_eq!(FieldType::Object.to_string(), "object");
    }
}
