//! Argument validation against declared field shapes.
//!
//! Validation runs before any request is built. It reports every violation it finds rather
//! than stopping at the first one. `null` is treated the same as an absent value, and keys that
//! no field or property declares are left alone.

use crate::config::{FieldConfig, FieldLocation, MissingPathParam, Shape, ValueKind};
use serde_json::{Map, Value};

/// Validate an argument object against an operation's fields.
///
/// Returns the list of violations (empty when the arguments are acceptable).
#[must_use]
pub fn validate_arguments(
    fields: &[FieldConfig],
    arguments: &Map<String, Value>,
    missing_path_params: MissingPathParam,
) -> Vec<String> {
    let mut violations = Vec::new();

    for field in fields {
        match present(arguments.get(&field.name)) {
            Some(value) => check_shape(&field.name, &field.shape, value, &mut violations),
            None if presence_required(field, missing_path_params) => {
                violations.push(format!("{} is required", field.name));
            }
            None => {}
        }
    }

    violations
}

/// Argument keys not declared by any field.
#[must_use]
pub fn undeclared_keys<'a>(fields: &[FieldConfig], arguments: &'a Map<String, Value>) -> Vec<&'a str> {
    arguments
        .keys()
        .filter(|k| !fields.iter().any(|f| &f.name == *k))
        .map(String::as_str)
        .collect()
}

fn presence_required(field: &FieldConfig, missing_path_params: MissingPathParam) -> bool {
    match field.location {
        // Absent path params become an empty segment unless strict mode is on.
        FieldLocation::Path => missing_path_params == MissingPathParam::Reject,
        FieldLocation::Query | FieldLocation::Body => field.required,
    }
}

pub(crate) fn present(value: Option<&Value>) -> Option<&Value> {
    match value {
        None | Some(Value::Null) => None,
        Some(v) => Some(v),
    }
}

fn check_shape(at: &str, shape: &Shape, value: &Value, violations: &mut Vec<String>) {
    if !kind_matches(shape.kind, value) {
        violations.push(format!(
            "{at} must be of type {}, got {}",
            shape.kind.as_str(),
            describe(value)
        ));
        return;
    }

    if let Some(allowed) = &shape.allowed_values {
        let repr = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        if !allowed.iter().any(|a| *a == repr) {
            violations.push(format!(
                "{at} must be one of [{}], got {value}",
                allowed.join(", ")
            ));
        }
    }

    match value {
        Value::Object(map) => {
            for prop in &shape.properties {
                let nested = format!("{at}.{}", prop.name);
                match present(map.get(&prop.name)) {
                    Some(v) => check_shape(&nested, &prop.shape, v, violations),
                    None if prop.required => violations.push(format!("{nested} is required")),
                    None => {}
                }
            }
        }
        Value::Array(items) => {
            if let Some(item_shape) = shape.items.as_deref() {
                for (i, item) in items.iter().enumerate() {
                    check_shape(&format!("{at}[{i}]"), item_shape, item, violations);
                }
            }
        }
        _ => {}
    }
}

fn kind_matches(kind: ValueKind, value: &Value) -> bool {
    match kind {
        ValueKind::String => value.is_string(),
        ValueKind::Integer => is_integer(value),
        ValueKind::Number => value.is_number(),
        ValueKind::Boolean => value.is_boolean(),
        ValueKind::Object => value.is_object(),
        ValueKind::Array => value.is_array(),
    }
}

fn is_integer(value: &Value) -> bool {
    match value {
        Value::Number(n) => {
            n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0)
        }
        _ => false,
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
