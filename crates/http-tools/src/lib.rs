//! Pet-store operation catalog and the generic HTTP dispatcher behind it.
//!
//! Used by:
//! - `petstore-mcp-adapter` (MCP server over stdio or streamable HTTP)
//! - the adapter's test console (`POST /api/call`)
//!
//! Every operation is a [`catalog::Operation`] record; [`runtime::Dispatcher`] is the only code
//! that turns one into an HTTP request.

pub mod catalog;
pub mod config;
pub mod error;
pub mod runtime;
pub mod safety;
pub mod semantics;
pub mod transport;
pub mod validation;

pub use catalog::{Catalog, Operation, OperationSummary};
pub use config::{ClientConfig, MissingPathParam};
pub use error::{Failure, HttpToolsError};
pub use runtime::Dispatcher;
