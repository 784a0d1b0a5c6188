//! HTTP method semantics for catalog operations.
//!
//! Every pet-store tool is advertised with MCP `ToolAnnotations` derived from its RFC 9110
//! method, so clients can tell a lookup (`getPetById`) from a removal (`deletePet`).

use reqwest::Method;
use rmcp::model::ToolAnnotations;

/// `(read_only, destructive, idempotent)` hints for a method; `None` where unknown.
fn method_hints(method: &Method) -> (Option<bool>, Option<bool>, Option<bool>) {
    match *method {
        Method::GET | Method::HEAD | Method::OPTIONS => (Some(true), Some(false), Some(true)),
        Method::POST => (Some(false), Some(false), Some(false)),
        Method::PUT | Method::DELETE => (Some(false), Some(true), Some(true)),
        // PATCH may or may not be idempotent; do not guess.
        Method::PATCH => (Some(false), Some(true), None),
        _ => (None, None, None),
    }
}

/// Generate MCP tool annotations for an operation's HTTP method.
///
/// `openWorldHint` is always `true`: every operation talks to the remote pet-store.
#[must_use]
pub fn annotations_for_method(method: &Method) -> ToolAnnotations {
    let (read_only_hint, destructive_hint, idempotent_hint) = method_hints(method);
    ToolAnnotations {
        title: None,
        read_only_hint,
        destructive_hint,
        idempotent_hint,
        open_world_hint: Some(true),
    }
}
