//! Declarative operation DSL + client configuration.
//!
//! An operation is pure data: an HTTP method, a URL template with `{placeholder}` segments and
//! an ordered list of input fields. The same types are used for the built-in pet-store catalog
//! and for catalogs loaded from YAML.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Public pet-store endpoint used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://petstore.swagger.io/v2";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Root of a YAML catalog document.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogConfig {
    #[serde(default)]
    pub operations: Vec<OperationConfig>,
}

/// One operation: a named HTTP request template plus its input fields.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationConfig {
    /// Stable tool name (unique within a catalog).
    pub name: String,
    /// HTTP method, e.g. `GET`.
    pub method: String,
    /// URL template relative to the base URL, e.g. `/pet/{petId}`.
    pub path: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

/// An input field declared by an operation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConfig {
    pub name: String,
    #[serde(rename = "in")]
    pub location: FieldLocation,
    #[serde(default)]
    pub required: bool,
    #[serde(flatten)]
    pub shape: Shape,
}

/// Where a field ends up in the outbound request.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldLocation {
    Path,
    Query,
    Body,
}

/// JSON value kinds accepted by the validator.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    String,
    Integer,
    Number,
    Boolean,
    Object,
    Array,
}

impl ValueKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
        }
    }
}

/// Shape of a value: its kind plus optional enum, nested properties and item shape.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    #[serde(rename = "type")]
    pub kind: ValueKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<Property>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Shape>>,
}

/// A named property of an object shape.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(flatten)]
    pub shape: Shape,
}

impl Shape {
    #[must_use]
    pub fn new(kind: ValueKind) -> Self {
        Self {
            kind,
            description: None,
            allowed_values: None,
            properties: Vec::new(),
            items: None,
        }
    }

    #[must_use]
    pub fn string() -> Self {
        Self::new(ValueKind::String)
    }

    #[must_use]
    pub fn integer() -> Self {
        Self::new(ValueKind::Integer)
    }

    #[must_use]
    pub fn boolean() -> Self {
        Self::new(ValueKind::Boolean)
    }

    #[must_use]
    pub fn object(properties: Vec<Property>) -> Self {
        Self {
            properties,
            ..Self::new(ValueKind::Object)
        }
    }

    #[must_use]
    pub fn array(items: Shape) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::new(ValueKind::Array)
        }
    }

    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn one_of(mut self, values: &[&str]) -> Self {
        self.allowed_values = Some(values.iter().map(|v| (*v).to_string()).collect());
        self
    }

    /// Render this shape as a JSON Schema fragment.
    #[must_use]
    pub fn to_json_schema(&self) -> serde_json::Value {
        let mut schema = serde_json::json!({ "type": self.kind.as_str() });
        if let Some(d) = &self.description {
            schema["description"] = serde_json::json!(d);
        }
        if let Some(values) = &self.allowed_values {
            schema["enum"] = serde_json::json!(values);
        }
        if self.kind == ValueKind::Object && !self.properties.is_empty() {
            let mut props = serde_json::Map::new();
            let mut required = Vec::new();
            for p in &self.properties {
                props.insert(p.name.clone(), p.shape.to_json_schema());
                if p.required {
                    required.push(p.name.clone());
                }
            }
            schema["properties"] = serde_json::Value::Object(props);
            if !required.is_empty() {
                schema["required"] = serde_json::json!(required);
            }
        }
        if let Some(items) = &self.items {
            schema["items"] = items.to_json_schema();
        }
        schema
    }
}

impl Property {
    #[must_use]
    pub fn required(name: &str, shape: Shape) -> Self {
        Self {
            name: name.to_string(),
            required: true,
            shape,
        }
    }

    #[must_use]
    pub fn optional(name: &str, shape: Shape) -> Self {
        Self {
            name: name.to_string(),
            required: false,
            shape,
        }
    }
}

/// What to do when a `path` field used by the URL template is absent.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MissingPathParam {
    /// Substitute an empty string (e.g. `/pet/{petId}` becomes `/pet/`).
    #[default]
    Empty,
    /// Fail validation before any request is sent.
    Reject,
}

/// Process-wide client settings, read once at startup.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Static bearer token. `None` means unauthenticated calls.
    pub auth_token: Option<String>,
    /// Per-request timeout. `None` disables it.
    pub timeout: Option<Duration>,
    pub missing_path_params: MissingPathParam,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            auth_token: None,
            timeout: Some(DEFAULT_TIMEOUT),
            missing_path_params: MissingPathParam::Empty,
        }
    }
}

impl ClientConfig {
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}
