//! API client core for the query record service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). `RecordService` pairs the
//! client with a `Transport` to run complete operations; `UreqTransport` is
//! the bundled blocking implementation.
//!
//! # Design
//! - `QueryRecordClient` is stateless; it holds only a `ClientConfig`.
//! - Each operation is split into `build_*` and `parse_*` so the I/O
//!   boundary is explicit.
//! - Every record passes through `normalize` before reaching a caller.
//! - Failures are a single `ApiError` whose `Display` is the user-facing
//!   message and whose `kind()` is the classification.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod normalize;
pub mod service;
pub mod transport;
pub mod types;

pub use client::QueryRecordClient;
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, ErrorKind};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use normalize::normalize;
pub use service::RecordService;
pub use transport::{Transport, UreqTransport};
pub use types::{QueryRecord, RecordId, RecordStatus, StatusUpdate, WireQueryRecord};
