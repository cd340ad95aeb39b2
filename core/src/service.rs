//! End-to-end record operations: build, send, parse.
//!
//! `RecordService` pairs a `QueryRecordClient` with a `Transport`. Each call
//! issues exactly one request, never retries, and logs every failure with the
//! request it belongs to before handing the classified `ApiError` back.

use log::{debug, error, warn};

use crate::client::QueryRecordClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};
use crate::types::{QueryRecord, RecordId, RecordStatus};

pub struct RecordService<T = UreqTransport> {
    client: QueryRecordClient,
    transport: T,
}

impl RecordService<UreqTransport> {
    /// Service over the blocking ureq transport.
    pub fn connect(config: ClientConfig) -> Self {
        Self::new(config, UreqTransport::new())
    }
}

impl<T: Transport> RecordService<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Self {
            client: QueryRecordClient::new(config),
            transport,
        }
    }

    pub fn client(&self) -> &QueryRecordClient {
        &self.client
    }

    /// Run a query without persisting it; returns the backend's raw text.
    pub fn execute_query(&self, query: &str) -> Result<String, ApiError> {
        let request = self.client.build_execute_query(query);
        self.run(request, |c, r| c.parse_execute_query(r))
    }

    pub fn execute_query_and_store(&self, query: &str) -> Result<QueryRecord, ApiError> {
        let request = self.client.build_execute_query_and_store(query);
        self.run(request, |c, r| c.parse_execute_query_and_store(r))
    }

    pub fn list_active(&self) -> Result<Vec<QueryRecord>, ApiError> {
        let request = self.client.build_list_active();
        self.run(request, |c, r| c.parse_list_active(r))
    }

    pub fn list_all(&self) -> Result<Vec<QueryRecord>, ApiError> {
        let request = self.client.build_list_all();
        self.run(request, |c, r| c.parse_list_all(r))
    }

    /// `Ok(None)` for an inactive record, `Err(ApiError::NotFound)` for a
    /// missing one.
    pub fn get_by_id(&self, id: &RecordId) -> Result<Option<QueryRecord>, ApiError> {
        let request = self.client.build_get_by_id(id);
        self.run(request, |c, r| c.parse_get_by_id(r))
    }

    pub fn set_status(&self, id: &RecordId, status: RecordStatus) -> Result<QueryRecord, ApiError> {
        let request = self.client.build_set_status(id, status)?;
        self.run(request, |c, r| c.parse_set_status(r))
    }

    pub fn soft_delete(&self, id: &RecordId) -> Result<QueryRecord, ApiError> {
        self.set_status(id, RecordStatus::Inactive)
    }

    pub fn restore(&self, id: &RecordId) -> Result<QueryRecord, ApiError> {
        self.set_status(id, RecordStatus::Active)
    }

    /// `Ok(true)` when the backend answers the health check with a 2xx. Any
    /// failure is an `ApiError::ConnectionCheck`, never `Ok(false)`.
    pub fn check_connection(&self) -> Result<bool, ApiError> {
        let request = self.client.build_check_connection();
        self.run(request, |c, r| c.parse_check_connection(r)).map_err(|e| {
            warn!("No se pudo establecer conexión con el servidor");
            ApiError::ConnectionCheck(Box::new(e))
        })
    }

    fn run<R>(
        &self,
        request: HttpRequest,
        parse: impl FnOnce(&QueryRecordClient, HttpResponse) -> Result<R, ApiError>,
    ) -> Result<R, ApiError> {
        debug!(
            "{} {} (timeout {:?})",
            request.method.as_str(),
            request.url,
            request.timeout
        );
        let response = self.transport.execute(&request)?;
        let rejected = !response.is_success();
        if rejected {
            error!(
                "{} {} returned {}: {}",
                request.method.as_str(),
                request.url,
                response.status,
                response.body
            );
        }
        // Non-2xx responses are already logged above with their raw body.
        parse(&self.client, response).inspect_err(|e| {
            if !rejected {
                error!("{} {}: {e}", request.method.as_str(), request.url);
            }
        })
    }
}
