//! Dispatcher: the one generic interpreter for every catalog operation.
//!
//! `invoke` resolves an operation, validates the argument bag, builds a concrete request
//! (path substitution, query pairs, JSON body, auth header), sends it through the configured
//! [`HttpTransport`] and returns the remote body untouched.

use crate::catalog::{Catalog, Operation, OperationSummary};
use crate::config::{ClientConfig, FieldLocation, MissingPathParam};
use crate::error::{HttpToolsError, Result};
use crate::safety::redact_url;
use crate::transport::{HttpTransport, PreparedRequest, RawResponse, ReqwestTransport};
use crate::validation::{present, undeclared_keys, validate_arguments};
use base64::Engine as _;
use parking_lot::RwLock;
use rmcp::model::{CallToolResult, Content, Tool};
use serde_json::{Map, Value, json};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

struct DispatcherInner {
    catalog: Arc<Catalog>,
    base_url: String,
    auth_token: RwLock<Option<Arc<str>>>,
    timeout: Option<Duration>,
    missing_path_params: MissingPathParam,
    transport: Arc<dyn HttpTransport>,
}

impl Dispatcher {
    /// Build a dispatcher that talks to the remote service over `reqwest`.
    ///
    /// The resulting instance is cheap to clone and safe to share across tasks.
    ///
    /// # Errors
    ///
    /// Returns a config error if the base URL is invalid.
    pub fn new(catalog: Arc<Catalog>, config: ClientConfig) -> Result<Self> {
        Self::with_transport(catalog, config, Arc::new(ReqwestTransport::default()))
    }

    /// Build a dispatcher with an explicit transport.
    ///
    /// # Errors
    ///
    /// Returns a config error if the base URL is invalid.
    pub fn with_transport(
        catalog: Arc<Catalog>,
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self> {
        let base = Url::parse(&config.base_url).map_err(|e| {
            HttpToolsError::Config(format!("Invalid base URL '{}': {e}", config.base_url))
        })?;
        if base.scheme() != "http" && base.scheme() != "https" {
            return Err(HttpToolsError::Config(format!(
                "Unsupported base URL scheme '{}'",
                base.scheme()
            )));
        }
        if base.query().is_some() || base.fragment().is_some() {
            return Err(HttpToolsError::Config(format!(
                "Base URL '{}' must not carry a query string or fragment",
                redact_url(&base)
            )));
        }

        Ok(Self {
            inner: Arc::new(DispatcherInner {
                catalog,
                base_url: config.base_url.trim_end_matches('/').to_string(),
                auth_token: RwLock::new(non_empty_token(config.auth_token.as_deref())),
                timeout: config.timeout,
                missing_path_params: config.missing_path_params,
                transport,
            }),
        })
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Discovery listing, in catalog order.
    #[must_use]
    pub fn list_operations(&self) -> Vec<OperationSummary> {
        self.inner.catalog.summaries()
    }

    /// The MCP `Tool`s exposed by this dispatcher.
    #[must_use]
    pub fn list_tools(&self) -> Vec<Tool> {
        self.inner.catalog.tools()
    }

    /// Replace the process-wide bearer token. Empty strings clear it.
    pub fn set_auth_token(&self, token: Option<&str>) {
        *self.inner.auth_token.write() = non_empty_token(token);
    }

    /// Resolve, validate and build the request for one call without sending it.
    ///
    /// `auth_token` overrides the process-wide token for this call only.
    ///
    /// # Errors
    ///
    /// Returns [`HttpToolsError::UnknownOperation`] or [`HttpToolsError::Validation`].
    pub fn prepare(
        &self,
        name: &str,
        arguments: &Value,
        auth_token: Option<&str>,
    ) -> Result<PreparedRequest> {
        let op = self.inner.catalog.lookup(name)?;

        let empty = Map::new();
        let args = match arguments {
            Value::Object(map) => map,
            Value::Null => &empty,
            other => {
                return Err(HttpToolsError::Validation {
                    operation: name.to_string(),
                    violations: vec![format!("arguments must be an object, got {other}")],
                });
            }
        };

        let violations = validate_arguments(op.fields(), args, self.inner.missing_path_params);
        if !violations.is_empty() {
            return Err(HttpToolsError::Validation {
                operation: name.to_string(),
                violations,
            });
        }

        let ignored = undeclared_keys(op.fields(), args);
        if !ignored.is_empty() {
            debug!(operation = %name, ignored = ?ignored, "ignoring undeclared arguments");
        }

        let parts = build_request_parts(op, args);
        let url = build_url(&self.inner.base_url, &parts.path, &parts.query)?;

        let mut headers = vec![("Accept".to_string(), "application/json".to_string())];
        let token = non_empty_token(auth_token).or_else(|| self.inner.auth_token.read().clone());
        if let Some(token) = token {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }
        if parts.body.is_some() {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }

        Ok(PreparedRequest {
            operation: op.name().to_string(),
            method: op.method().clone(),
            url,
            headers,
            query: parts.query,
            body: parts.body,
        })
    }

    /// Execute one operation end-to-end and return the remote body unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the operation name is unknown
    /// - the arguments do not match the declared shape (no request is sent)
    /// - the HTTP request fails (transport or non-2xx response)
    pub async fn invoke(
        &self,
        name: &str,
        arguments: &Value,
        auth_token: Option<&str>,
    ) -> Result<Value> {
        let request = self.prepare(name, arguments, auth_token)?;

        debug!(
            operation = %request.operation,
            method = %request.method,
            url = %redact_url(&request.url),
            "dispatching request"
        );

        let raw = self
            .inner
            .transport
            .send(&request, self.inner.timeout)
            .await?;
        interpret_response(raw)
    }

    /// Execute a tool call and shape the outcome as an MCP result.
    ///
    /// Validation and transport failures become `isError` results carrying the failure record
    /// as structured content; only an unknown tool name is returned as `Err`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpToolsError::UnknownOperation`] if the tool is not in the catalog.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<CallToolResult> {
        match self.invoke(name, &arguments, None).await {
            Ok(body) => Ok(CallToolResult::success(vec![Content::text(render_body(
                &body,
            ))])),
            Err(e) if e.is_unknown_operation() => Err(e),
            Err(e) => {
                let failure = e.to_failure();
                warn!(
                    tool = %name,
                    status = failure.status,
                    error = %failure.message,
                    "tool call failed"
                );
                let text = match &failure.details {
                    Some(d) => format!("Error: {}: {d}", failure.message),
                    None => format!("Error: {}", failure.message),
                };
                let mut result = CallToolResult::error(vec![Content::text(text)]);
                result.structured_content = serde_json::to_value(&failure).ok();
                Ok(result)
            }
        }
    }
}

fn non_empty_token(token: Option<&str>) -> Option<Arc<str>> {
    token.map(str::trim).filter(|t| !t.is_empty()).map(Arc::from)
}

struct RequestParts {
    path: String,
    query: Vec<(String, String)>,
    body: Option<Value>,
}

fn build_request_parts(op: &Operation, args: &Map<String, Value>) -> RequestParts {
    let mut path = op.path().to_string();
    let mut query: Vec<(String, String)> = Vec::new();
    let mut body_fields: Map<String, Value> = Map::new();
    let mut body_payload: Option<Value> = None;

    for field in op.fields() {
        let value = present(args.get(&field.name));
        match field.location {
            FieldLocation::Path => {
                // Absent path values substitute as "" (validation already ran in strict mode).
                let segment = value
                    .map(|v| encode_component(&value_to_string(v)))
                    .unwrap_or_default();
                path = path.replace(&format!("{{{}}}", field.name), &segment);
            }
            FieldLocation::Query => match value {
                Some(Value::Array(items)) => {
                    query.extend(
                        items
                            .iter()
                            .map(|item| (field.name.clone(), value_to_string(item))),
                    );
                }
                Some(v) => query.push((field.name.clone(), value_to_string(v))),
                None => {}
            },
            FieldLocation::Body => {
                if let Some(v) = value {
                    if field.name == "body" {
                        body_payload = Some(v.clone());
                    } else {
                        body_fields.insert(field.name.clone(), v.clone());
                    }
                }
            }
        }
    }

    let body = body_payload.or_else(|| {
        (!body_fields.is_empty()).then(|| Value::Object(body_fields))
    });

    RequestParts { path, query, body }
}

fn build_url(base_url: &str, path: &str, query: &[(String, String)]) -> Result<Url> {
    let url = format!("{base_url}{path}");
    let mut url = Url::parse(&url)
        .map_err(|e| HttpToolsError::Config(format!("Invalid request URL '{url}': {e}")))?;

    if !query.is_empty() {
        let encoded: Vec<String> = query
            .iter()
            .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
            .collect();
        url.set_query(Some(&encoded.join("&")));
    }

    Ok(url)
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
fn encode_component(s: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = String::with_capacity(s.len());
    for &b in s.as_bytes() {
        if matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~') {
            out.push(b as char);
        } else {
            out.push('%');
            out.push(HEX[(b >> 4) as usize] as char);
            out.push(HEX[(b & 0x0F) as usize] as char);
        }
    }
    out
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => value.to_string(),
    }
}

fn interpret_response(raw: RawResponse) -> Result<Value> {
    let body = decode_body(&raw.body, raw.content_type.as_deref());
    if (200..300).contains(&raw.status) {
        return Ok(body);
    }

    let reason = reqwest::StatusCode::from_u16(raw.status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown");
    Err(HttpToolsError::Transport {
        status: Some(raw.status),
        message: format!("API returned {} {reason}", raw.status),
        details: (!body.is_null()).then_some(body),
    })
}

/// JSON when the body parses, text otherwise; `null` for an empty body and a base64 envelope
/// for non-UTF-8 bytes.
fn decode_body(bytes: &[u8], content_type: Option<&str>) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    match std::str::from_utf8(bytes) {
        Ok(s) => serde_json::from_str(s).unwrap_or_else(|_| json!(s)),
        Err(_) => {
            let b64 = base64::engine::general_purpose::STANDARD.encode(bytes);
            json!({
                "encoding": "base64",
                "mimeType": content_type,
                "data": b64
            })
        }
    }
}

fn render_body(body: &Value) -> String {
    match body {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}
