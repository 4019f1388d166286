//! Translation of externally declared capability input schemas.
//!
//! Capability providers describe their inputs with a loosely typed JSON
//! schema. [`translate`] turns one of those into a [`ParamSpec`] that can
//! validate call arguments at the boundary. Translation is total: anything
//! the translator does not understand degrades to "accept any value" so that
//! listing capabilities can never be blocked by an unusual descriptor.
//!
//! Array parameters are checked only for being arrays. Element types are
//! deliberately left unchecked.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::HashSet;
use std::fmt;

use crate::error::{FieldIssue, ValidationError};

/// The closed set of parameter kinds the translator understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    String,
    Number,
    Boolean,
    Array,
    /// Undeclared or unsupported kind; accepts any value.
    Unknown,
}

impl PrimitiveKind {
    /// Map a declared `type` entry to a kind.
    ///
    /// Only the four literal kind names are recognised. Everything else,
    /// including `integer`, `object`, type unions and missing entries, maps
    /// to [`PrimitiveKind::Unknown`].
    pub fn from_declared(declared: Option<&Value>) -> Self {
        match declared.and_then(Value::as_str) {
            Some("string") => PrimitiveKind::String,
            Some("number") => PrimitiveKind::Number,
            Some("boolean") => PrimitiveKind::Boolean,
            Some("array") => PrimitiveKind::Array,
            _ => PrimitiveKind::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveKind::String => "string",
            PrimitiveKind::Number => "number",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Array => "array",
            PrimitiveKind::Unknown => "unknown",
        }
    }

    /// Whether a present value satisfies this kind.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            PrimitiveKind::String => value.is_string(),
            PrimitiveKind::Number => value.is_number(),
            PrimitiveKind::Boolean => value.is_boolean(),
            PrimitiveKind::Array => value.is_array(),
            PrimitiveKind::Unknown => true,
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declared parameter of a capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamField {
    pub name: String,
    pub kind: PrimitiveKind,
    pub description: String,
    pub required: bool,
}

/// Validated parameter specification for one capability.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    fields: Vec<ParamField>,
}

impl ParamSpec {
    pub fn new(fields: Vec<ParamField>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[ParamField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&ParamField> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &ParamField> {
        self.fields.iter().filter(|field| field.required)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Validate call arguments and return the arguments to forward.
    ///
    /// `null` is treated as an empty argument object. Undeclared keys are
    /// dropped from the returned map rather than rejected. A present `null`
    /// value only satisfies [`PrimitiveKind::Unknown`].
    pub fn validate(&self, args: &Value) -> Result<Map<String, Value>, ValidationError> {
        let empty = Map::new();
        let provided = match args {
            Value::Object(map) => map,
            Value::Null => &empty,
            other => {
                return Err(ValidationError::new(vec![FieldIssue::NotAnObject {
                    found: json_type_name(other),
                }]));
            }
        };

        let mut issues = Vec::new();
        let mut accepted = Map::new();

        for field in &self.fields {
            match provided.get(&field.name) {
                None if field.required => issues.push(FieldIssue::Missing {
                    field: field.name.clone(),
                }),
                None => {}
                Some(value) if field.kind.accepts(value) => {
                    accepted.insert(field.name.clone(), value.clone());
                }
                Some(value) => issues.push(FieldIssue::WrongType {
                    field: field.name.clone(),
                    expected: field.kind,
                    found: json_type_name(value),
                }),
            }
        }

        if issues.is_empty() {
            Ok(accepted)
        } else {
            Err(ValidationError::new(issues))
        }
    }

    /// Render the spec as a JSON schema object for binding to a model.
    pub fn to_json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|field| {
                let mut property = Map::new();
                match field.kind {
                    PrimitiveKind::Unknown => {}
                    PrimitiveKind::Array => {
                        property.insert("type".into(), json!("array"));
                        property.insert("items".into(), json!({}));
                    }
                    kind => {
                        property.insert("type".into(), json!(kind.as_str()));
                    }
                }
                if !field.description.is_empty() {
                    property.insert("description".into(), json!(field.description));
                }
                (field.name.clone(), Value::Object(property))
            })
            .collect();

        let required: Vec<&str> = self
            .required_fields()
            .map(|field| field.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

/// Translate one declared input schema into a [`ParamSpec`].
///
/// Never fails. Missing or malformed `properties` yield an empty spec,
/// non-string `required` entries are ignored, and names in `required` that
/// are not declared properties have no effect.
pub fn translate(schema: &Value) -> ParamSpec {
    let required: HashSet<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let fields = schema
        .get("properties")
        .and_then(Value::as_object)
        .map(|properties| {
            properties
                .iter()
                .map(|(name, property)| ParamField {
                    name: name.clone(),
                    kind: PrimitiveKind::from_declared(property.get("type")),
                    description: property
                        .get("description")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                    required: required.contains(name.as_str()),
                })
                .collect()
        })
        .unwrap_or_default();

    ParamSpec { fields }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn two_field_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "a": { "type": "string", "description": "first" },
                "b": { "type": "number" }
            },
            "required": ["a"]
        })
    }

    #[test]
    fn test_required_string_rejects_null() {
        let spec = translate(&two_field_schema());
        let err = spec.validate(&json!({ "a": null })).unwrap_err();
        assert!(err.mentions("a"));
    }

    #[test]
    fn test_optional_field_may_be_omitted() {
        let spec = translate(&two_field_schema());
        let accepted = spec.validate(&json!({ "a": "x" })).unwrap();
        assert_eq!(accepted.get("a"), Some(&json!("x")));
        assert!(!accepted.contains_key("b"));
    }

    #[test]
    fn test_optional_field_is_still_type_checked() {
        let spec = translate(&two_field_schema());
        let err = spec
            .validate(&json!({ "a": "x", "b": "not-a-number" }))
            .unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert!(err.mentions("b"));
    }

    #[test]
    fn test_missing_required_reported_with_type_errors() {
        let spec = translate(&two_field_schema());
        let err = spec.validate(&json!({ "b": true })).unwrap_err();
        assert_eq!(err.issues.len(), 2);
        assert!(err.mentions("a"));
        assert!(err.mentions("b"));
    }

    #[test]
    fn test_undeclared_arguments_are_stripped() {
        let spec = translate(&two_field_schema());
        let accepted = spec
            .validate(&json!({ "a": "x", "unexpected": 1 }))
            .unwrap();
        assert_eq!(accepted.len(), 1);
    }

    #[test]
    fn test_null_arguments_mean_no_arguments() {
        let spec = translate(&json!({ "type": "object", "properties": {} }));
        assert!(spec.validate(&Value::Null).unwrap().is_empty());

        let spec = translate(&two_field_schema());
        assert!(spec.validate(&Value::Null).unwrap_err().mentions("a"));
    }

    #[test]
    fn test_non_object_arguments_rejected() {
        let spec = translate(&two_field_schema());
        let err = spec.validate(&json!(["a"])).unwrap_err();
        assert_eq!(
            err.issues,
            vec![FieldIssue::NotAnObject { found: "array" }]
        );
    }

    #[rstest]
    #[case("string", PrimitiveKind::String)]
    #[case("number", PrimitiveKind::Number)]
    #[case("boolean", PrimitiveKind::Boolean)]
    #[case("array", PrimitiveKind::Array)]
    #[case("integer", PrimitiveKind::Unknown)]
    #[case("object", PrimitiveKind::Unknown)]
    #[case("date-time", PrimitiveKind::Unknown)]
    fn test_declared_kind_mapping(#[case] declared: &str, #[case] expected: PrimitiveKind) {
        let spec = translate(&json!({ "properties": { "p": { "type": declared } } }));
        assert_eq!(spec.field("p").map(|f| f.kind), Some(expected));
    }

    #[test]
    fn test_type_union_degrades_to_unknown() {
        let spec = translate(&json!({
            "properties": { "p": { "type": ["string", "null"] } },
            "required": ["p"]
        }));
        let field = spec.field("p").unwrap();
        assert_eq!(field.kind, PrimitiveKind::Unknown);
        assert!(spec.validate(&json!({ "p": null })).is_ok());
    }

    #[test]
    fn test_array_elements_are_not_checked() {
        let spec = translate(&json!({
            "properties": { "tags": { "type": "array" } },
            "required": ["tags"]
        }));
        assert!(spec.validate(&json!({ "tags": [1, "two", null, [3]] })).is_ok());
        assert!(spec.validate(&json!({ "tags": "one" })).is_err());
    }

    #[test]
    fn test_malformed_schemas_translate_permissively() {
        assert!(translate(&json!(null)).is_empty());
        assert!(translate(&json!({ "properties": "nope" })).is_empty());

        let spec = translate(&json!({
            "properties": { "p": { "type": "string" } },
            "required": [42, "p", "ghost"]
        }));
        assert_eq!(spec.fields().len(), 1);
        assert!(spec.field("p").unwrap().required);
    }

    #[test]
    fn test_json_schema_rendering() {
        let spec = translate(&json!({
            "properties": {
                "amount": { "type": "number", "description": "how much" },
                "extra": {},
                "tags": { "type": "array" }
            },
            "required": ["amount"]
        }));

        let schema = spec.to_json_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["amount"]["type"], "number");
        assert_eq!(schema["properties"]["amount"]["description"], "how much");
        assert!(schema["properties"]["extra"].get("type").is_none());
        assert_eq!(schema["properties"]["tags"]["type"], "array");
        assert_eq!(schema["required"], json!(["amount"]));
    }

    proptest! {
        #[test]
        fn prop_translate_is_total(kind in ".*", required in any::<bool>()) {
            let schema = json!({
                "properties": { "p": { "type": kind } },
                "required": if required { json!(["p"]) } else { json!([]) }
            });
            let spec = translate(&schema);
            prop_assert_eq!(spec.fields().len(), 1);
            prop_assert_eq!(spec.field("p").unwrap().required, required);
            prop_assert_eq!(translate(&schema), spec);
        }
    }
}
