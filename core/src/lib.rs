//! Synchronous store client core for the todo list.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values for the
//! Elasticsearch endpoints the todo commands use, without touching the
//! network (host-does-IO pattern). The caller executes the actual HTTP
//! round-trip, making the core fully deterministic and testable.
//!
//! # Design
//! - `StoreClient` is stateless: base URL, index name, optional credentials.
//! - Each store operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - DTOs are defined independently from the mock-store crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod error;
pub mod http;
pub mod types;

pub use client::{Credentials, StoreClient};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{ByQueryResponse, IndexResponse, Item, Query, Script, SearchResponse};
