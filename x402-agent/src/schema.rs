//! Conversion of declared parameter schemas into runtime argument validators.
//!
//! A [`ParameterSchema`] is a declarative, JSON-Schema-like description of
//! the arguments an endpoint accepts. [`convert`] walks it once at
//! registration time and produces a composable validator tree
//! ([`ArgumentShape`]) that tool invocations are checked against.
//!
//! The conversion is a pure transformation: it has no side effects and
//! fails only on malformed schemas (non-object root, empty enums, arrays
//! without `items`).

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::config::{ParameterSchema, SchemaType};
use crate::error::{SchemaConversionError, ValidationError};

/// Runtime validator for a single argument value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueValidator {
    /// Accepts any JSON string, or only the listed values when restricted.
    String {
        /// Exact-match enumeration, when the schema declared `enum`.
        allowed: Option<Vec<String>>,
    },
    /// Accepts any JSON number.
    Number,
    /// Accepts a JSON boolean.
    Boolean,
    /// Accepts a JSON array whose elements all satisfy the inner validator.
    Array(Box<ValueValidator>),
    /// Accepts a JSON object conforming to the nested shape.
    Object(ArgumentShape),
}

impl ValueValidator {
    /// Checks a value against this validator.
    ///
    /// `path` names the argument for diagnostics (e.g. `tags[2]`).
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the offending path on mismatch.
    pub fn check(&self, value: &Value, path: &str) -> Result<(), ValidationError> {
        match self {
            Self::String { allowed } => {
                let Some(s) = value.as_str() else {
                    return Err(mismatch(path, "a string"));
                };
                if let Some(allowed) = allowed {
                    if !allowed.iter().any(|candidate| candidate == s) {
                        return Err(ValidationError::new(format!(
                            "Parameter \"{path}\" must be one of: {}",
                            allowed.join(", ")
                        ))
                        .with_field(path));
                    }
                }
                Ok(())
            }
            Self::Number => {
                if value.is_number() {
                    Ok(())
                } else {
                    Err(mismatch(path, "a number"))
                }
            }
            Self::Boolean => {
                if value.is_boolean() {
                    Ok(())
                } else {
                    Err(mismatch(path, "a boolean"))
                }
            }
            Self::Array(items) => {
                let Some(elements) = value.as_array() else {
                    return Err(mismatch(path, "an array"));
                };
                for (i, element) in elements.iter().enumerate() {
                    items.check(element, &format!("{path}[{i}]"))?;
                }
                Ok(())
            }
            Self::Object(shape) => {
                let Some(map) = value.as_object() else {
                    return Err(mismatch(path, "an object"));
                };
                shape.validate(map)
            }
        }
    }
}

fn mismatch(path: &str, expected: &str) -> ValidationError {
    ValidationError::new(format!("Parameter \"{path}\" must be {expected}")).with_field(path)
}

/// Validator for one declared property: the value check, whether the
/// property is required, and its documentation metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyValidator {
    /// The value-level validator.
    pub validator: ValueValidator,
    /// Whether the property appears in the schema's `required` set.
    pub required: bool,
    /// Documentation carried over from the schema (non-functional).
    pub description: Option<String>,
}

/// Validator tree for an object-typed argument set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentShape {
    /// Declared properties, keyed by name.
    pub properties: BTreeMap<String, PropertyValidator>,
}

impl ArgumentShape {
    /// Validates a supplied argument object against this shape.
    ///
    /// Required properties are checked first (presence and non-null), then
    /// every supplied declared property is type-checked. Properties not
    /// declared in the shape are ignored.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the first offending parameter.
    pub fn validate(&self, args: &Map<String, Value>) -> Result<(), ValidationError> {
        for (name, property) in &self.properties {
            if !property.required {
                continue;
            }
            match args.get(name) {
                None => {
                    return Err(ValidationError::new(format!(
                        "Missing required parameter: \"{name}\""
                    ))
                    .with_field(name));
                }
                Some(Value::Null) => {
                    return Err(ValidationError::new(format!(
                        "Parameter \"{name}\" cannot be null or undefined"
                    ))
                    .with_field(name));
                }
                Some(_) => {}
            }
        }

        for (name, value) in args {
            if value.is_null() {
                // Optional null arguments are treated as absent
                continue;
            }
            if let Some(property) = self.properties.get(name) {
                property.validator.check(value, name)?;
            }
        }

        Ok(())
    }
}

/// Converts a declared parameter schema into a runtime argument validator.
///
/// Returns `None` when the schema declares no properties: the endpoint
/// takes no arguments, which callers must distinguish from an object shape
/// with zero required fields.
///
/// # Errors
///
/// Returns a [`SchemaConversionError`] if the root is not `object`, a
/// string enum is empty, or an array lacks `items`.
pub fn convert(schema: &ParameterSchema) -> Result<Option<ArgumentShape>, SchemaConversionError> {
    if schema.schema_type != SchemaType::Object {
        return Err(SchemaConversionError::new("Root schema must be type \"object\"")
            .with_schema_type(schema.schema_type.as_str()));
    }
    convert_shape(schema, "")
}

/// Converts an object-typed schema node into a shape, or `None` if it
/// declares no properties.
fn convert_shape(
    schema: &ParameterSchema,
    path: &str,
) -> Result<Option<ArgumentShape>, SchemaConversionError> {
    let Some(properties) = schema.properties.as_ref().filter(|p| !p.is_empty()) else {
        return Ok(None);
    };

    let required: &[String] = schema.required.as_deref().unwrap_or_default();
    let mut shape = ArgumentShape::default();
    for (name, property_schema) in properties {
        let property_path = if path.is_empty() {
            name.clone()
        } else {
            format!("{path}.{name}")
        };
        let validator = convert_property(property_schema, &property_path)?;
        shape.properties.insert(
            name.clone(),
            PropertyValidator {
                validator,
                required: required.contains(name),
                description: property_schema.description.clone(),
            },
        );
    }
    Ok(Some(shape))
}

/// Converts a single property schema node into a value validator.
fn convert_property(
    schema: &ParameterSchema,
    path: &str,
) -> Result<ValueValidator, SchemaConversionError> {
    match schema.schema_type {
        SchemaType::String => {
            if let Some(values) = &schema.enum_values {
                if values.is_empty() {
                    return Err(SchemaConversionError::new(format!(
                        "Empty enum array for property \"{path}\""
                    ))
                    .with_schema_type("string")
                    .with_property_path(path));
                }
                return Ok(ValueValidator::String {
                    allowed: Some(values.clone()),
                });
            }
            Ok(ValueValidator::String { allowed: None })
        }
        SchemaType::Number => Ok(ValueValidator::Number),
        SchemaType::Boolean => Ok(ValueValidator::Boolean),
        SchemaType::Array => {
            let Some(items) = &schema.items else {
                return Err(SchemaConversionError::new(format!(
                    "Array type missing \"items\" definition for property \"{path}\""
                ))
                .with_schema_type("array")
                .with_property_path(path));
            };
            let inner = convert_property(items, &format!("{path}[]"))?;
            Ok(ValueValidator::Array(Box::new(inner)))
        }
        SchemaType::Object => {
            let nested = convert_shape(schema, path)?.unwrap_or_default();
            Ok(ValueValidator::Object(nested))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(value: Value) -> ParameterSchema {
        serde_json::from_value(value).unwrap()
    }

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn non_object_root_fails() {
        let err = convert(&schema(json!({"type": "string"}))).unwrap_err();
        assert!(err.message.contains("object"), "{err}");
        assert_eq!(err.schema_type.as_deref(), Some("string"));
    }

    #[test]
    fn schema_without_properties_is_the_no_shape_sentinel() {
        assert!(convert(&schema(json!({"type": "object"}))).unwrap().is_none());
        assert!(
            convert(&schema(json!({"type": "object", "properties": {}})))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn required_field_presence_is_enforced() {
        let shape = convert(&schema(json!({
            "type": "object",
            "properties": { "q": { "type": "string" } },
            "required": ["q"]
        })))
        .unwrap()
        .unwrap();

        let err = shape.validate(&args(json!({}))).unwrap_err();
        assert!(err.message.contains("\"q\""), "{err}");
        assert_eq!(err.field.as_deref(), Some("q"));

        let err = shape.validate(&args(json!({"q": null}))).unwrap_err();
        assert!(err.message.contains("null"), "{err}");

        shape.validate(&args(json!({"q": "x"}))).unwrap();
    }

    #[test]
    fn optional_fields_may_be_absent() {
        let shape = convert(&schema(json!({
            "type": "object",
            "properties": { "limit": { "type": "number" } }
        })))
        .unwrap()
        .unwrap();

        shape.validate(&args(json!({}))).unwrap();
        shape.validate(&args(json!({"limit": 10}))).unwrap();
        let err = shape.validate(&args(json!({"limit": "ten"}))).unwrap_err();
        assert!(err.message.contains("number"), "{err}");
    }

    #[test]
    fn enum_refinement_matches_exactly() {
        let shape = convert(&schema(json!({
            "type": "object",
            "properties": {
                "size": { "type": "string", "enum": ["small", "large"] }
            }
        })))
        .unwrap()
        .unwrap();

        shape.validate(&args(json!({"size": "small"}))).unwrap();
        let err = shape.validate(&args(json!({"size": "medium"}))).unwrap_err();
        assert!(err.message.contains("small, large"), "{err}");
    }

    #[test]
    fn empty_enum_fails_conversion() {
        let err = convert(&schema(json!({
            "type": "object",
            "properties": { "size": { "type": "string", "enum": [] } }
        })))
        .unwrap_err();
        assert_eq!(err.property_path.as_deref(), Some("size"));
    }

    #[test]
    fn array_without_items_fails_naming_the_path() {
        let err = convert(&schema(json!({
            "type": "object",
            "properties": { "tags": { "type": "array" } }
        })))
        .unwrap_err();
        assert!(err.message.contains("items"), "{err}");
        assert_eq!(err.property_path.as_deref(), Some("tags"));
        assert_eq!(err.schema_type.as_deref(), Some("array"));
    }

    #[test]
    fn nested_arrays_validate_elements() {
        let shape = convert(&schema(json!({
            "type": "object",
            "properties": {
                "tags": { "type": "array", "items": { "type": "string" } }
            }
        })))
        .unwrap()
        .unwrap();

        shape.validate(&args(json!({"tags": ["a", "b"]}))).unwrap();
        let err = shape
            .validate(&args(json!({"tags": ["a", 1]})))
            .unwrap_err();
        assert!(err.message.contains("tags[1]"), "{err}");
    }

    #[test]
    fn nested_objects_recurse() {
        let shape = convert(&schema(json!({
            "type": "object",
            "properties": {
                "filter": {
                    "type": "object",
                    "properties": { "field": { "type": "string" } },
                    "required": ["field"]
                }
            }
        })))
        .unwrap()
        .unwrap();

        shape
            .validate(&args(json!({"filter": {"field": "name"}})))
            .unwrap();
        let err = shape.validate(&args(json!({"filter": {}}))).unwrap_err();
        assert!(err.message.contains("field"), "{err}");
        let err = shape.validate(&args(json!({"filter": 3}))).unwrap_err();
        assert!(err.message.contains("object"), "{err}");
    }

    #[test]
    fn description_is_attached_as_metadata() {
        let shape = convert(&schema(json!({
            "type": "object",
            "properties": {
                "q": { "type": "string", "description": "Search query" }
            }
        })))
        .unwrap()
        .unwrap();
        let property = &shape.properties["q"];
        assert_eq!(property.description.as_deref(), Some("Search query"));
        assert!(!property.required);
    }

    #[test]
    fn conforming_arguments_are_never_rejected() {
        let shape = convert(&schema(json!({
            "type": "object",
            "properties": {
                "q": { "type": "string" },
                "limit": { "type": "number" },
                "strict": { "type": "boolean" },
                "tags": { "type": "array", "items": { "type": "string" } }
            },
            "required": ["q"]
        })))
        .unwrap()
        .unwrap();

        shape
            .validate(&args(json!({
                "q": "rust",
                "limit": 5,
                "strict": true,
                "tags": ["lang"]
            })))
            .unwrap();
    }
}
